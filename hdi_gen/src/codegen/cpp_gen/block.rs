use super::CppEmitter;
use crate::codegen::emitter::Family;
use crate::codegen::shared::decoration::cpp_type;
use crate::codegen::shared::{
    ordered_declarations, EmitContext, EmitError, EmitResult, Language, Site, TAB,
};
use hdi_types::{EnumType, StructType, Type, TypeKind, TypeMode, TypesFile, UnionType};
use std::fmt::Write;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CppDeclarations {
    pub header: String,
    pub source: String,
}

/* `ohos.hdi.sample` -> `ohos::hdi::sample` */
fn namespace_of(package: &str) -> String {
    package.replace('.', "::")
}

pub fn emit_declarations(file: &TypesFile, cx: &EmitContext<'_>) -> EmitResult<CppDeclarations> {
    let guard = format!("{}_TYPES_H", file.package_ident().to_uppercase());
    let namespace = namespace_of(&file.package);

    let mut header = String::new();
    writeln!(header, "#ifndef {}", guard)?;
    writeln!(header, "#define {}", guard)?;
    writeln!(header)?;
    writeln!(header, "#include <cstdbool>")?;
    writeln!(header, "#include <cstdint>")?;
    writeln!(header, "#include <string>")?;
    writeln!(header, "#include <vector>")?;
    writeln!(header, "#include <message_parcel.h>")?;
    writeln!(header)?;
    writeln!(header, "namespace {} {{", namespace)?;
    writeln!(header)?;
    writeln!(header, "using namespace OHOS;")?;
    writeln!(header)?;
    let declarations = ordered_declarations(file)?;
    for ty in &declarations {
        emit_type_definition(ty, &mut header)?;
    }
    for ty in &declarations {
        if let Type::Struct(s) = ty {
            writeln!(header, "{};", marshalling_signature(s))?;
            writeln!(header, "{};", unmarshalling_signature(s))?;
            writeln!(header)?;
        }
    }
    writeln!(header, "}} // {}", namespace)?;
    writeln!(header)?;
    writeln!(header, "#endif // {}", guard)?;

    let mut source = String::new();
    writeln!(source, "#include \"types.h\"")?;
    writeln!(source, "#include <hdf_log.h>")?;
    writeln!(source, "#include <securec.h>")?;
    writeln!(source)?;
    writeln!(source, "namespace {} {{", namespace)?;
    writeln!(source)?;
    for ty in &declarations {
        if let Type::Struct(s) = ty {
            emit_block_functions(s, cx, &mut source)?;
        }
    }
    writeln!(source, "}} // {}", namespace)?;

    Ok(CppDeclarations { header, source })
}

pub fn emit_type_definition(ty: &Type, output: &mut String) -> EmitResult<()> {
    match ty {
        Type::Struct(s) => emit_struct_definition(s, output),
        Type::Union(u) => emit_union_definition(u, output),
        Type::Enum(e) => emit_enum_definition(e, output),
        other => {
            debug!(ty = %other, "no C++ definition for declaration");
            Ok(())
        }
    }
}

fn emit_struct_definition(struct_type: &StructType, output: &mut String) -> EmitResult<()> {
    if let Some(comment) = &struct_type.comment {
        writeln!(output, "// {}", comment)?;
    }
    writeln!(output, "struct {} {{", struct_type.name)?;
    for field in &struct_type.fields {
        writeln!(
            output,
            "{}{} {};",
            TAB,
            cpp_type(&field.field_type, TypeMode::NoMode)?,
            field.name
        )?;
    }
    writeln!(output, "}};")?;
    writeln!(output)?;
    Ok(())
}

fn emit_union_definition(union_type: &UnionType, output: &mut String) -> EmitResult<()> {
    writeln!(output, "union {} {{", union_type.name)?;
    for field in &union_type.fields {
        let kind = field.field_type.classify();
        if field.field_type.owns_storage()
            || matches!(kind, TypeKind::Interface | TypeKind::Sequenceable)
        {
            return Err(EmitError::unsupported(kind, Language::Cpp));
        }
        writeln!(
            output,
            "{}{} {};",
            TAB,
            cpp_type(&field.field_type, TypeMode::NoMode)?,
            field.name
        )?;
    }
    writeln!(output, "}}  __attribute__ ((aligned(8)));")?;
    writeln!(output)?;
    Ok(())
}

fn emit_enum_definition(enum_type: &EnumType, output: &mut String) -> EmitResult<()> {
    writeln!(output, "enum {} : int32_t {{", enum_type.name)?;
    for member in &enum_type.members {
        match member.value {
            Some(value) => writeln!(output, "{}{} = {},", TAB, member.name, value)?,
            None => writeln!(output, "{}{},", TAB, member.name)?,
        }
    }
    writeln!(output, "}};")?;
    writeln!(output)?;
    Ok(())
}

fn marshalling_signature(struct_type: &StructType) -> String {
    format!(
        "bool {}BlockMarshalling(OHOS::MessageParcel &data, const {}& dataBlock)",
        struct_type.name, struct_type.name
    )
}

fn unmarshalling_signature(struct_type: &StructType) -> String {
    format!(
        "bool {}BlockUnmarshalling(OHOS::MessageParcel &data, {}& dataBlock)",
        struct_type.name, struct_type.name
    )
}

#[tracing::instrument(level = "debug", skip_all, fields(name = %struct_type.name))]
fn emit_block_functions(
    struct_type: &StructType,
    cx: &EmitContext<'_>,
    output: &mut String,
) -> EmitResult<()> {
    let block_cx = cx.with_parcel("data");

    let writer = CppEmitter::for_family(&block_cx, Family::Marshal);
    writeln!(output, "{}", marshalling_signature(struct_type))?;
    writeln!(output, "{{")?;
    for field in &struct_type.fields {
        let site = Site::new(format!("dataBlock.{}", field.name)).with_prefix(TAB);
        writer.write(&field.field_type, &site, output)?;
    }
    writeln!(output, "{}return true;", TAB)?;
    writeln!(output, "}}")?;
    writeln!(output)?;

    let reader = CppEmitter::for_family(&block_cx, Family::Unmarshal);
    writeln!(output, "{}", unmarshalling_signature(struct_type))?;
    writeln!(output, "{{")?;
    for field in &struct_type.fields {
        let site = Site::new(format!("dataBlock.{}", field.name)).with_prefix(TAB);
        reader.read(&field.field_type, &site, false, output)?;
    }
    writeln!(output, "{}return true;", TAB)?;
    writeln!(output, "}}")?;
    writeln!(output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::shared::{Dialect, Protocol};
    use pretty_assertions::assert_eq;

    #[test]
    fn struct_fields_are_value_members() {
        let sample = StructType::new("Sample")
            .field("values", Type::list(Type::UInt))
            .field("label", Type::String);
        let mut text = String::new();
        emit_type_definition(&Type::Struct(sample), &mut text).unwrap();
        assert_eq!(
            text,
            "struct Sample {\n\
             \x20   std::vector<uint32_t> values;\n\
             \x20   std::string label;\n\
             };\n\n"
        );
    }

    #[test]
    fn declarations_are_namespaced() {
        let file = TypesFile {
            package: "ohos.hdi.sample".into(),
            types: vec![Type::Struct(StructType::new("Point").field("x", Type::Int))],
        };
        let protocol = Protocol::default();
        let cx = EmitContext::new(&protocol, Dialect::User);
        let out = emit_declarations(&file, &cx).unwrap();
        assert!(out.header.contains("namespace ohos::hdi::sample {\n"));
        assert!(out
            .header
            .contains("bool PointBlockMarshalling(OHOS::MessageParcel &data, const Point& dataBlock);\n"));
        assert!(out.source.contains("    if (!data.ReadInt32(dataBlock.x)) {\n"));
    }
}
