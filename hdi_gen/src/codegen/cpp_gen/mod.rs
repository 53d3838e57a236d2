//! C++ backend over `OHOS::MessageParcel`.
//!
//! Storage is owned by `std::string` / `std::vector` / `sptr`, so no release
//! is ever emitted; a failure branch logs and returns.

pub mod block;

pub use block::{emit_declarations, CppDeclarations};

use crate::codegen::emitter::Family;
use crate::codegen::shared::decoration::cpp_type;
use crate::codegen::shared::{EmitContext, EmitError, EmitResult, ErrorCode, Language, Site, TAB};
use hdi_types::{EnumType, InterfaceType, SequenceableType, Type, TypeKind, TypeMode, UnionType};
use std::fmt::Write;

pub fn emit(
    cx: &EmitContext<'_>,
    family: Family,
    ty: &Type,
    site: &Site,
    output: &mut String,
) -> EmitResult<()> {
    let emitter = CppEmitter::for_family(cx, family);
    match family {
        Family::WriteVar | Family::Marshal => emitter.write(ty, site, output),
        Family::StubReadVar => emitter.read(ty, site, true, output),
        Family::ProxyReadVar | Family::Unmarshal => emitter.read(ty, site, false, output),
        Family::StubReadOutVar => emitter.declare(ty, site, output),
        Family::ProxyWriteOutVar | Family::ProxyReadOutVar | Family::MemoryRecycle { .. } => {
            Ok(())
        }
    }
}

/* MessageParcel accessor suffix of a scalar kind */
fn parcel_method(kind: TypeKind) -> Option<&'static str> {
    let method = match kind {
        TypeKind::Bool => "Bool",
        TypeKind::Byte => "Int8",
        TypeKind::Short => "Int16",
        TypeKind::Int => "Int32",
        TypeKind::Long => "Int64",
        TypeKind::UInt => "Uint32",
        TypeKind::UShort => "Uint16",
        TypeKind::ULong => "Uint64",
        TypeKind::Float => "Float",
        TypeKind::Double => "Double",
        _ => return None,
    };
    Some(method)
}

#[derive(Debug, Clone, Copy)]
pub struct CppEmitter<'a> {
    pub cx: &'a EmitContext<'a>,
    /* standalone block functions return bool, RPC bodies return a status */
    block: bool,
}

impl<'a> CppEmitter<'a> {
    pub fn for_family(cx: &'a EmitContext<'a>, family: Family) -> Self {
        Self {
            cx,
            block: family.is_block(),
        }
    }

    fn parcel(&self) -> &'a str {
        self.cx.parcel
    }

    fn check(&self, output: &mut String, prefix: &str, condition: &str, message: &str) -> EmitResult<()> {
        let protocol = self.cx.protocol;
        writeln!(output, "{}if ({}) {{", prefix, condition)?;
        writeln!(output, "{}{}{}", prefix, TAB, protocol.log_line(message))?;
        if self.block {
            writeln!(output, "{}{}return false;", prefix, TAB)?;
        } else {
            writeln!(
                output,
                "{}{}return {};",
                prefix,
                TAB,
                protocol.code(ErrorCode::InvalidParameter)
            )?;
        }
        writeln!(output, "{}}}", prefix)?;
        Ok(())
    }

    pub fn write(&self, ty: &Type, site: &Site, output: &mut String) -> EmitResult<()> {
        let name = &site.name;
        let message = format!("write {} failed!", name);
        let parcel = self.parcel();
        match ty {
            Type::String => self.check(
                output,
                &site.prefix,
                &format!("!{}.WriteCString({}.c_str())", parcel, name),
                &message,
            ),
            Type::FileDescriptor => self.check(
                output,
                &site.prefix,
                &format!("!{}.WriteFileDescriptor({})", parcel, name),
                &message,
            ),
            Type::Enum(_) => self.check(
                output,
                &site.prefix,
                &format!("!{}.WriteUint64(static_cast<uint64_t>({}))", parcel, name),
                &message,
            ),
            Type::Struct(s) => self.check(
                output,
                &site.prefix,
                &format!("!{}BlockMarshalling({}, {})", s.name, parcel, name),
                &message,
            ),
            Type::Union(u) => self.check(
                output,
                &site.prefix,
                &format!(
                    "!{}.WriteUnpadBuffer((const void*)&{}, sizeof({}))",
                    parcel, name, u.name
                ),
                &message,
            ),
            Type::Interface(i) => self.write_interface(i, site, output),
            Type::Sequenceable(_) => self.check(
                output,
                &site.prefix,
                &format!("!{}.WriteStrongParcelable({})", parcel, name),
                &message,
            ),
            Type::List(_) | Type::Array(_) => self.write_container(ty, site, output),
            scalar => {
                let kind = scalar.classify();
                let method =
                    parcel_method(kind).ok_or_else(|| EmitError::unsupported(kind, Language::Cpp))?;
                self.check(
                    output,
                    &site.prefix,
                    &format!("!{}.Write{}({})", parcel, method, name),
                    &message,
                )
            }
        }
    }

    fn write_interface(&self, interface: &InterfaceType, site: &Site, output: &mut String) -> EmitResult<()> {
        let name = &site.name;
        self.check(
            output,
            &site.prefix,
            &format!("{} == nullptr", name),
            &format!("parameter {} is nullptr!", name),
        )?;
        self.check(
            output,
            &site.prefix,
            &format!(
                "!{}.WriteRemoteObject(OHOS::HDI::ObjectCollector::GetInstance().GetOrNewObject({}, {}::GetDescriptor()))",
                self.parcel(),
                name,
                interface.name
            ),
            &format!("write {} failed!", name),
        )
    }

    fn write_container(&self, ty: &Type, site: &Site, output: &mut String) -> EmitResult<()> {
        let element = element_of(ty)?;
        let prefix = &site.prefix;
        self.check(
            output,
            prefix,
            &format!("!{}.WriteUint32({}.size())", self.parcel(), site.name),
            &format!("write {} size failed!", site.name),
        )?;
        let it = format!("it{}", site.depth);
        writeln!(output, "{}for (const auto& {} : {}) {{", prefix, it, site.name)?;
        self.write(element, &site.nested(it), output)?;
        writeln!(output, "{}}}", prefix)?;
        Ok(())
    }

    /* `declare` puts the local declaration in front of the read */
    pub fn read(&self, ty: &Type, site: &Site, declare: bool, output: &mut String) -> EmitResult<()> {
        match ty {
            Type::String => self.read_string(site, declare, output),
            Type::FileDescriptor => self.read_file_descriptor(site, declare, output),
            Type::Enum(e) => self.read_enum(e, site, declare, output),
            Type::Struct(s) => {
                if declare {
                    self.declare(ty, site, output)?;
                }
                self.check(
                    output,
                    &site.prefix,
                    &format!("!{}BlockUnmarshalling({}, {})", s.name, self.parcel(), site.name),
                    &format!("read {} failed!", site.name),
                )
            }
            Type::Union(u) => self.read_union(u, site, declare, output),
            Type::Interface(i) => self.read_interface(i, site, declare, output),
            Type::Sequenceable(s) => self.read_sequenceable(s, site, declare, output),
            Type::List(_) | Type::Array(_) => self.read_container(ty, site, declare, output),
            scalar => {
                let kind = scalar.classify();
                let method =
                    parcel_method(kind).ok_or_else(|| EmitError::unsupported(kind, Language::Cpp))?;
                if declare {
                    self.declare(ty, site, output)?;
                }
                self.check(
                    output,
                    &site.prefix,
                    &format!("!{}.Read{}({})", self.parcel(), method, site.name),
                    &format!("read {} failed!", site.name),
                )
            }
        }
    }

    /* Stack local with a zero value where the type has one */
    pub fn declare(&self, ty: &Type, site: &Site, output: &mut String) -> EmitResult<()> {
        let local = cpp_type(ty, TypeMode::LocalVar)?;
        match ty {
            Type::Bool => writeln!(output, "{}{} {} = false;", site.prefix, local, site.name)?,
            Type::FileDescriptor => writeln!(output, "{}{} {} = -1;", site.prefix, local, site.name)?,
            Type::Enum(_) => writeln!(
                output,
                "{}{} {} = static_cast<{}>(0);",
                site.prefix, local, site.name, local
            )?,
            _ if ty.classify().is_scalar() => {
                writeln!(output, "{}{} {} = 0;", site.prefix, local, site.name)?
            }
            _ => writeln!(output, "{}{} {};", site.prefix, local, site.name)?,
        }
        Ok(())
    }

    fn read_string(&self, site: &Site, declare: bool, output: &mut String) -> EmitResult<()> {
        let staged = format!("{}Cp", site.ident());
        writeln!(
            output,
            "{}const char* {} = {}.ReadCString();",
            site.prefix,
            staged,
            self.parcel()
        )?;
        self.check(
            output,
            &site.prefix,
            &format!("{} == nullptr", staged),
            &format!("read {} failed!", site.name),
        )?;
        if declare {
            writeln!(output, "{}std::string {} = {};", site.prefix, site.name, staged)?;
        } else {
            writeln!(output, "{}{} = {};", site.prefix, site.name, staged)?;
        }
        Ok(())
    }

    fn read_file_descriptor(&self, site: &Site, declare: bool, output: &mut String) -> EmitResult<()> {
        let decl = if declare { "int " } else { "" };
        writeln!(
            output,
            "{}{}{} = {}.ReadFileDescriptor();",
            site.prefix,
            decl,
            site.name,
            self.parcel()
        )?;
        self.check(
            output,
            &site.prefix,
            &format!("{} < 0", site.name),
            &format!("read {} failed!", site.name),
        )
    }

    fn read_enum(&self, enum_type: &EnumType, site: &Site, declare: bool, output: &mut String) -> EmitResult<()> {
        if declare {
            self.declare(&Type::Enum(enum_type.clone()), site, output)?;
        }
        let inner = site.inner_prefix();
        writeln!(output, "{}{{", site.prefix)?;
        writeln!(output, "{}uint64_t enumTmp = 0;", inner)?;
        self.check(
            output,
            &inner,
            &format!("!{}.ReadUint64(enumTmp)", self.parcel()),
            &format!("read {} failed!", site.name),
        )?;
        writeln!(
            output,
            "{}{} = static_cast<{}>(enumTmp);",
            inner, site.name, enum_type.name
        )?;
        writeln!(output, "{}}}", site.prefix)?;
        Ok(())
    }

    fn read_union(&self, union_type: &UnionType, site: &Site, declare: bool, output: &mut String) -> EmitResult<()> {
        if declare {
            writeln!(output, "{}{} {};", site.prefix, union_type.name, site.name)?;
        }
        let staged = format!("{}Cp", site.ident());
        writeln!(
            output,
            "{}const {} *{} = reinterpret_cast<const {} *>({}.ReadUnpadBuffer(sizeof({})));",
            site.prefix,
            union_type.name,
            staged,
            union_type.name,
            self.parcel(),
            union_type.name
        )?;
        self.check(
            output,
            &site.prefix,
            &format!("{} == nullptr", staged),
            &format!("read {} failed!", site.name),
        )?;
        self.check(
            output,
            &site.prefix,
            &format!(
                "memcpy_s(&{}, sizeof({}), {}, sizeof({})) != EOK",
                site.name, union_type.name, staged, union_type.name
            ),
            &format!("copy {} failed!", site.name),
        )
    }

    fn read_interface(
        &self,
        interface: &InterfaceType,
        site: &Site,
        declare: bool,
        output: &mut String,
    ) -> EmitResult<()> {
        let remote = format!("{}Remote", site.ident());
        writeln!(
            output,
            "{}sptr<IRemoteObject> {} = {}.ReadRemoteObject();",
            site.prefix,
            remote,
            self.parcel()
        )?;
        self.check(
            output,
            &site.prefix,
            &format!("{} == nullptr", remote),
            &format!("read {} failed!", site.name),
        )?;
        let decl = if declare {
            format!("sptr<{}> ", interface.name)
        } else {
            String::new()
        };
        writeln!(
            output,
            "{}{}{} = OHOS::HDI::hdi_facecast<{}>({});",
            site.prefix, decl, site.name, interface.name, remote
        )?;
        Ok(())
    }

    fn read_sequenceable(
        &self,
        sequenceable: &SequenceableType,
        site: &Site,
        declare: bool,
        output: &mut String,
    ) -> EmitResult<()> {
        let ty = Type::Sequenceable(sequenceable.clone());
        let decl = if declare {
            format!("{} ", cpp_type(&ty, TypeMode::LocalVar)?)
        } else {
            String::new()
        };
        let qualified = match &sequenceable.namespace {
            Some(namespace) => format!("{}::{}", namespace.replace('.', "::"), sequenceable.name),
            None => sequenceable.name.clone(),
        };
        writeln!(
            output,
            "{}{}{} = {}.ReadStrongParcelable<{}>();",
            site.prefix,
            decl,
            site.name,
            self.parcel(),
            qualified
        )?;
        self.check(
            output,
            &site.prefix,
            &format!("{} == nullptr", site.name),
            &format!("read {} failed!", site.name),
        )
    }

    /// Size prefix, bound check against the buffer limit, then element by
    /// element into a reserved vector. Elements are read into `value<d>`
    /// temporaries so nested containers get distinct names.
    fn read_container(&self, ty: &Type, site: &Site, declare: bool, output: &mut String) -> EmitResult<()> {
        let element = element_of(ty)?;
        let prefix = &site.prefix;
        let size = format!("{}Size", site.ident());
        let element_type = cpp_type(element, TypeMode::NoMode)?;

        if declare {
            self.declare(ty, site, output)?;
        }
        writeln!(output, "{}uint32_t {} = 0;", prefix, size)?;
        self.check(
            output,
            prefix,
            &format!("!{}.ReadUint32({})", self.parcel(), size),
            &format!("failed to read {}", size),
        )?;
        self.check(
            output,
            prefix,
            &format!(
                "{} > {} / sizeof({})",
                size, self.cx.protocol.max_buff_size, element_type
            ),
            &format!("{} is invalid data", size),
        )?;
        writeln!(output, "{}{}.clear();", prefix, site.name)?;
        writeln!(output, "{}{}.reserve({});", prefix, site.name, size)?;

        let counter = format!("i{}", site.depth);
        writeln!(
            output,
            "{}for (uint32_t {c} = 0; {c} < {s}; ++{c}) {{",
            prefix,
            c = counter,
            s = size
        )?;
        let value = site.nested(format!("value{}", site.depth));
        self.read(element, &value, true, output)?;
        writeln!(output, "{}{}.push_back({});", value.prefix, site.name, value.name)?;
        writeln!(output, "{}}}", prefix)?;
        Ok(())
    }
}

fn element_of(ty: &Type) -> EmitResult<&Type> {
    ty.element_type()
        .ok_or_else(|| EmitError::unsupported(ty.classify(), Language::Cpp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::shared::{Dialect, Protocol};
    use pretty_assertions::assert_eq;

    fn emit_text(family: Family, ty: &Type, name: &str) -> String {
        let protocol = Protocol::default();
        let cx = EmitContext::new(&protocol, Dialect::User);
        let mut text = String::new();
        emit(&cx, family, ty, &Site::new(name), &mut text).unwrap();
        text
    }

    #[test]
    fn list_write_iterates_by_reference() {
        let text = emit_text(Family::WriteVar, &Type::list(Type::UInt), "values");
        assert_eq!(
            text,
            "if (!data.WriteUint32(values.size())) {\n\
             \x20   HDF_LOGE(\"%{public}s: write values size failed!\", __func__);\n\
             \x20   return HDF_ERR_INVALID_PARAM;\n\
             }\n\
             for (const auto& it0 : values) {\n\
             \x20   if (!data.WriteUint32(it0)) {\n\
             \x20       HDF_LOGE(\"%{public}s: write it0 failed!\", __func__);\n\
             \x20       return HDF_ERR_INVALID_PARAM;\n\
             \x20   }\n\
             }\n"
        );
    }

    #[test]
    fn nested_list_read_uses_distinct_temporaries() {
        let text = emit_text(Family::StubReadVar, &Type::list(Type::list(Type::Int)), "grid");
        assert!(text.starts_with("std::vector<std::vector<int32_t>> grid;\nuint32_t gridSize = 0;\n"));
        assert!(text.contains("if (gridSize > HDI_BUFF_MAX_SIZE / sizeof(std::vector<int32_t>)) {\n"));
        assert!(text.contains("for (uint32_t i0 = 0; i0 < gridSize; ++i0) {\n"));
        assert!(text.contains("    std::vector<int32_t> value0;\n"));
        assert!(text.contains("    for (uint32_t i1 = 0; i1 < value0Size; ++i1) {\n"));
        assert!(text.contains("        int32_t value1 = 0;\n"));
        assert!(text.contains("        value0.push_back(value1);\n"));
        assert!(text.contains("    grid.push_back(value0);\n"));
    }

    #[test]
    fn block_families_return_false() {
        let text = emit_text(Family::Unmarshal, &Type::String, "dataBlock.label");
        assert!(text.contains("return false;"));
        assert!(!text.contains("HDF_ERR_INVALID_PARAM"));
        assert!(text.ends_with("dataBlock.label = labelCp;\n"));
    }

    #[test]
    fn out_and_recycle_families_are_empty() {
        for family in [
            Family::ProxyWriteOutVar,
            Family::ProxyReadOutVar,
            Family::MemoryRecycle { client: true },
        ] {
            assert!(emit_text(family, &Type::list(Type::String), "names").is_empty());
        }
        assert_eq!(
            emit_text(Family::StubReadOutVar, &Type::Long, "count"),
            "int64_t count = 0;\n"
        );
    }
}
