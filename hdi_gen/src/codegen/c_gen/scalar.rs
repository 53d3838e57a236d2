use super::helpers::{scalar_spec, CEmitter};
use crate::codegen::shared::context::address_of;
use crate::codegen::shared::{CleanupStack, EmitError, EmitResult, ErrorCode, Language, Site, TAB};
use hdi_types::{EnumType, Type, TypeKind};
use std::fmt::Write;

impl<'a> CEmitter<'a> {
    /* Fixed-width scalar write; bool travels as int8 */
    pub fn write_scalar(
        &self,
        ty: &Type,
        site: &Site,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<()> {
        let kind = ty.classify();
        let spec = scalar_spec(kind).ok_or_else(|| EmitError::unsupported(kind, Language::C))?;
        let value = if kind == TypeKind::Bool {
            format!("{} ? 1 : 0", site.name)
        } else {
            site.name.clone()
        };
        self.check(
            output,
            &site.prefix,
            &format!("!HdfSbufWrite{}({}, {})", spec.method, self.parcel(), value),
            &format!("write {} failed!", site.name),
            ErrorCode::InvalidParameter,
            cleanup,
        )?;
        Ok(())
    }

    pub fn read_scalar(
        &self,
        ty: &Type,
        site: &Site,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<()> {
        let kind = ty.classify();
        let spec = scalar_spec(kind).ok_or_else(|| EmitError::unsupported(kind, Language::C))?;
        let target = if kind == TypeKind::Bool {
            format!("({} *){}", spec.c_type, address_of(&site.name))
        } else {
            address_of(&site.name)
        };
        self.check(
            output,
            &site.prefix,
            &format!("!HdfSbufRead{}({}, {})", spec.method, self.parcel(), target),
            &format!("read {} failed!", site.name),
            ErrorCode::InvalidParameter,
            cleanup,
        )?;
        Ok(())
    }

    pub fn write_file_descriptor(
        &self,
        site: &Site,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<()> {
        self.check(
            output,
            &site.prefix,
            &format!("!HdfSbufWriteFileDescriptor({}, {})", self.parcel(), site.name),
            &format!("write {} failed!", site.name),
            ErrorCode::InvalidParameter,
            cleanup,
        )?;
        Ok(())
    }

    /* Descriptors are stored by value; a negative handle means failure */
    pub fn read_file_descriptor(
        &self,
        site: &Site,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<()> {
        writeln!(
            output,
            "{}{} = HdfSbufReadFileDescriptor({});",
            site.prefix,
            site.name,
            self.parcel()
        )?;
        self.check(
            output,
            &site.prefix,
            &format!("{} < 0", site.name),
            &format!("read {} failed!", site.name),
            ErrorCode::InvalidParameter,
            cleanup,
        )?;
        Ok(())
    }

    /* Enums travel as uint64 regardless of the C enum width */
    pub fn write_enum(
        &self,
        site: &Site,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<()> {
        self.check(
            output,
            &site.prefix,
            &format!("!HdfSbufWriteUint64({}, (uint64_t){})", self.parcel(), site.name),
            &format!("write {} failed!", site.name),
            ErrorCode::InvalidParameter,
            cleanup,
        )?;
        Ok(())
    }

    pub fn read_enum(
        &self,
        enum_type: &EnumType,
        site: &Site,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<()> {
        let inner = format!("{}{}", site.prefix, TAB);
        writeln!(output, "{}{{", site.prefix)?;
        writeln!(output, "{}uint64_t enumTmp = 0;", inner)?;
        self.check(
            output,
            &inner,
            &format!("!HdfSbufReadUint64({}, &enumTmp)", self.parcel()),
            &format!("read {} failed!", site.name),
            ErrorCode::InvalidParameter,
            cleanup,
        )?;
        writeln!(output, "{}{} = (enum {})enumTmp;", inner, site.name, enum_type.name)?;
        writeln!(output, "{}}}", site.prefix)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::emitter::Family;
    use crate::codegen::shared::{Dialect, EmitContext, Protocol};
    use pretty_assertions::assert_eq;

    #[test]
    fn uint_write_and_read() {
        let protocol = Protocol::default();
        let cx = EmitContext::new(&protocol, Dialect::User);
        let emitter = CEmitter::for_family(&cx, Family::WriteVar);

        let mut text = String::new();
        emitter
            .write_scalar(&Type::UInt, &Site::new("count"), &CleanupStack::new(), &mut text)
            .unwrap();
        assert!(text.starts_with("if (!HdfSbufWriteUint32(data, count)) {\n"));

        let mut text = String::new();
        emitter
            .read_scalar(&Type::UInt, &Site::new("count"), &CleanupStack::new(), &mut text)
            .unwrap();
        assert!(text.starts_with("if (!HdfSbufReadUint32(data, &count)) {\n"));

        /* out parameters are already pointers */
        let mut text = String::new();
        emitter
            .read_scalar(&Type::UInt, &Site::new("*count"), &CleanupStack::new(), &mut text)
            .unwrap();
        assert!(text.starts_with("if (!HdfSbufReadUint32(data, count)) {\n"));
    }

    #[test]
    fn bool_travels_as_int8() {
        let protocol = Protocol::default();
        let cx = EmitContext::new(&protocol, Dialect::User);
        let emitter = CEmitter::for_family(&cx, Family::WriteVar);

        let mut text = String::new();
        emitter
            .write_scalar(&Type::Bool, &Site::new("enabled"), &CleanupStack::new(), &mut text)
            .unwrap();
        assert!(text.starts_with("if (!HdfSbufWriteInt8(data, enabled ? 1 : 0)) {\n"));

        let mut text = String::new();
        emitter
            .read_scalar(&Type::Bool, &Site::new("enabled"), &CleanupStack::new(), &mut text)
            .unwrap();
        assert!(text.starts_with("if (!HdfSbufReadInt8(data, (int8_t *)&enabled)) {\n"));
    }

    #[test]
    fn enum_read_goes_through_temporary() {
        let protocol = Protocol::default();
        let cx = EmitContext::new(&protocol, Dialect::User);
        let emitter = CEmitter::for_family(&cx, Family::StubReadVar);
        let mode = EnumType {
            name: "Mode".into(),
            members: Vec::new(),
        };

        let mut text = String::new();
        emitter
            .read_enum(&mode, &Site::new("mode"), &CleanupStack::new(), &mut text)
            .unwrap();
        assert_eq!(
            text,
            "{\n\
             \x20   uint64_t enumTmp = 0;\n\
             \x20   if (!HdfSbufReadUint64(data, &enumTmp)) {\n\
             \x20       HDF_LOGE(\"%{public}s: read mode failed!\", __func__);\n\
             \x20       ec = HDF_ERR_INVALID_PARAM;\n\
             \x20       goto FINISHED;\n\
             \x20   }\n\
             \x20   mode = (enum Mode)enumTmp;\n\
             }\n"
        );
    }
}
