//! Java backend over `ohos.rpc.MessageParcel`.
//!
//! Transport failures surface as exceptions thrown by the parcel itself, so
//! the only generated check is the bound on wire-supplied sizes.

use crate::codegen::emitter::Family;
use crate::codegen::shared::decoration::java_type;
use crate::codegen::shared::{EmitContext, EmitError, EmitResult, Language, Site, TAB};
use hdi_types::Type;
use std::fmt::Write;

pub fn emit(
    cx: &EmitContext<'_>,
    family: Family,
    ty: &Type,
    site: &Site,
    output: &mut String,
) -> EmitResult<()> {
    /* spelling check up front: unsupported kinds fail before any text is written */
    java_type(ty, false)?;
    let emitter = JavaEmitter { cx };
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

/* Parcel accessor suffix of the types with a direct read/write pair */
fn parcel_method(ty: &Type) -> Option<&'static str> {
    let method = match ty {
        Type::Bool => "Boolean",
        Type::Byte => "Byte",
        Type::Short => "Short",
        Type::Int => "Int",
        Type::Long => "Long",
        Type::Float => "Float",
        Type::Double => "Double",
        Type::String => "String",
        Type::FileDescriptor => "FileDescriptor",
        _ => return None,
    };
    Some(method)
}

/// Bytes one element occupies on the wire; used to bound sizes before
/// allocating. Types without a fixed width count as their length prefix.
pub fn java_wire_width(ty: &Type) -> usize {
    match ty {
        Type::Bool | Type::Byte => 1,
        Type::Short => 2,
        Type::Long | Type::Double => 8,
        _ => 4,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct JavaEmitter<'a> {
    pub cx: &'a EmitContext<'a>,
}

impl<'a> JavaEmitter<'a> {
    fn parcel(&self) -> &'a str {
        self.cx.parcel
    }

    pub fn write(&self, ty: &Type, site: &Site, output: &mut String) -> EmitResult<()> {
        let prefix = &site.prefix;
        let name = &site.name;
        if let Some(method) = parcel_method(ty) {
            writeln!(output, "{}{}.write{}({});", prefix, self.parcel(), method, name)?;
            return Ok(());
        }
        match ty {
            Type::Interface(_) => {
                writeln!(output, "{}{}.writeRemoteObject({}.asObject());", prefix, self.parcel(), name)?
            }
            Type::Sequenceable(_) => {
                writeln!(output, "{}{}.writeSequenceable({});", prefix, self.parcel(), name)?
            }
            Type::List(l) => {
                writeln!(output, "{}{}.writeInt({}.size());", prefix, self.parcel(), name)?;
                self.write_elements(&l.element_type, true, site, output)?;
            }
            Type::Array(a) => {
                writeln!(output, "{}{}.writeInt({}.length);", prefix, self.parcel(), name)?;
                self.write_elements(&a.element_type, false, site, output)?;
            }
            other => return Err(EmitError::unsupported(other.classify(), Language::Java)),
        }
        Ok(())
    }

    fn write_elements(&self, element: &Type, boxed: bool, site: &Site, output: &mut String) -> EmitResult<()> {
        let var = format!("element{}", site.depth);
        writeln!(
            output,
            "{}for ({} {} : {}) {{",
            site.prefix,
            java_type(element, boxed)?,
            var,
            site.name
        )?;
        self.write(element, &site.nested(var), output)?;
        writeln!(output, "{}}}", site.prefix)?;
        Ok(())
    }

    /* `declare` spells the local type in front of the assignment */
    pub fn read(&self, ty: &Type, site: &Site, declare: bool, output: &mut String) -> EmitResult<()> {
        let prefix = &site.prefix;
        let decl = if declare {
            format!("{} ", java_type(ty, false)?)
        } else {
            String::new()
        };
        if let Some(method) = parcel_method(ty) {
            writeln!(
                output,
                "{}{}{} = {}.read{}();",
                prefix,
                decl,
                site.name,
                self.parcel(),
                method
            )?;
            return Ok(());
        }
        match ty {
            Type::Interface(i) => writeln!(
                output,
                "{}{}{} = {}Stub.asInterface({}.readRemoteObject());",
                prefix,
                decl,
                site.name,
                i.name,
                self.parcel()
            )?,
            Type::Sequenceable(s) => {
                if declare {
                    writeln!(output, "{}{} {} = new {}();", prefix, s.name, site.name, s.name)?;
                }
                writeln!(output, "{}{}.readSequenceable({});", prefix, self.parcel(), site.name)?;
            }
            Type::List(l) => {
                if declare {
                    writeln!(output, "{}{}{} = new ArrayList<>();", prefix, decl, site.name)?;
                } else {
                    writeln!(output, "{}{}.clear();", prefix, site.name)?;
                }
                let size = self.read_size(&l.element_type, site, output)?;
                self.read_elements(&l.element_type, site, &size, output, |value| {
                    format!("{}.add({});", site.name, value)
                })?;
            }
            Type::Array(a) => {
                let size = self.read_size(&a.element_type, site, output)?;
                writeln!(
                    output,
                    "{}{}{} = new {}[{}];",
                    prefix,
                    decl,
                    site.name,
                    java_type(&a.element_type, false)?,
                    size
                )?;
                let counter = format!("i{}", site.depth);
                self.read_elements(&a.element_type, site, &size, output, |value| {
                    format!("{}[{}] = {};", site.name, counter, value)
                })?;
            }
            other => return Err(EmitError::unsupported(other.classify(), Language::Java)),
        }
        Ok(())
    }

    /* Reads the element count and rejects it before anything is sized from it */
    fn read_size(&self, element: &Type, site: &Site, output: &mut String) -> EmitResult<String> {
        let prefix = &site.prefix;
        let size = format!("{}Size", site.ident());
        writeln!(output, "{}int {} = {}.readInt();", prefix, size, self.parcel())?;
        writeln!(
            output,
            "{}if ({s} < 0 || {s} > {max} / {w}) {{",
            prefix,
            s = size,
            max = self.cx.protocol.max_buff_size,
            w = java_wire_width(element)
        )?;
        writeln!(
            output,
            "{}{}throw new IllegalArgumentException(\"{} is invalid data\");",
            prefix,
            TAB,
            size
        )?;
        writeln!(output, "{}}}", prefix)?;
        Ok(size)
    }

    fn read_elements<F>(
        &self,
        element: &Type,
        site: &Site,
        size: &str,
        output: &mut String,
        store: F,
    ) -> EmitResult<()>
    where
        F: Fn(&str) -> String,
    {
        let counter = format!("i{}", site.depth);
        writeln!(
            output,
            "{}for (int {c} = 0; {c} < {s}; ++{c}) {{",
            site.prefix,
            c = counter,
            s = size
        )?;
        let value = site.nested(format!("value{}", site.depth));
        self.read(element, &value, true, output)?;
        writeln!(output, "{}{}", value.prefix, store(&value.name))?;
        writeln!(output, "{}}}", site.prefix)?;
        Ok(())
    }

    /* Stub-side local for an out parameter, filled by the service */
    pub fn declare(&self, ty: &Type, site: &Site, output: &mut String) -> EmitResult<()> {
        let local = java_type(ty, false)?;
        let init = match ty {
            Type::Bool => "false",
            Type::FileDescriptor => "-1",
            Type::String => "\"\"",
            Type::List(_) => "new ArrayList<>()",
            Type::Array(_) | Type::Interface(_) | Type::Sequenceable(_) => "null",
            _ => "0",
        };
        writeln!(output, "{}{} {} = {};", site.prefix, local, site.name, init)?;
        Ok(())
    }
}
