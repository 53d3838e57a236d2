//! Standalone C declarations: type definitions plus the
//! `BlockMarshalling` / `BlockUnmarshalling` / `Free` functions of every
//! struct.

use super::helpers::{escape_c_keyword, CEmitter};
use crate::codegen::emitter::Family;
use crate::codegen::shared::context::{loop_counter, unwind_counter};
use crate::codegen::shared::decoration::c_type;
use crate::codegen::shared::{
    ordered_declarations, CleanupStack, EmitContext, EmitError, EmitResult, Language, Site, TAB,
};
use hdi_types::{EnumType, StructType, Type, TypeKind, TypeMode, TypesFile, UnionType};
use indexmap::IndexSet;
use std::fmt::Write;
use tracing::debug;

pub const BLOCK_ERROR_LABEL: &str = "errors";

/* Generated header and source of one package */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CDeclarations {
    pub header: String,
    pub source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockFn {
    Marshalling,
    Unmarshalling,
    Free,
}

pub fn emit_declarations(file: &TypesFile, cx: &EmitContext<'_>) -> EmitResult<CDeclarations> {
    let guard = format!("{}_TYPES_H", file.package_ident().to_uppercase());
    let mut header = String::new();
    writeln!(header, "#ifndef {}", guard)?;
    writeln!(header, "#define {}", guard)?;
    writeln!(header)?;
    writeln!(header, "#include <stdbool.h>")?;
    writeln!(header, "#include <stdint.h>")?;
    writeln!(header)?;
    writeln!(header, "struct HdfSBuf;")?;
    writeln!(header)?;

    let mut source = String::new();
    writeln!(source, "#include \"types.h\"")?;
    writeln!(source, "#include <hdf_base.h>")?;
    writeln!(source, "#include <hdf_log.h>")?;
    writeln!(source, "#include <hdf_sbuf.h>")?;
    writeln!(source, "#include <osal_mem.h>")?;
    writeln!(source, "#include <securec.h>")?;
    if !cx.dialect.is_kernel() {
        writeln!(source, "#include <string.h>")?;
    }
    writeln!(source)?;

    let declarations = ordered_declarations(file)?;
    for ty in &declarations {
        emit_type_definition(ty, &mut header)?;
    }
    for ty in &declarations {
        emit_prototypes(ty, &mut header)?;
    }
    writeln!(header)?;
    writeln!(header, "#endif /* {} */", guard)?;

    for ty in &declarations {
        emit_block_functions(ty, cx, &mut source)?;
    }

    Ok(CDeclarations { header, source })
}

pub fn emit_type_definition(ty: &Type, output: &mut String) -> EmitResult<()> {
    match ty {
        Type::Struct(s) => emit_struct_definition(s, output),
        Type::Union(u) => emit_union_definition(u, output),
        Type::Enum(e) => emit_enum_definition(e, output),
        other => {
            debug!(ty = %other, "no C definition for declaration");
            Ok(())
        }
    }
}

fn emit_struct_definition(struct_type: &StructType, output: &mut String) -> EmitResult<()> {
    if let Some(comment) = &struct_type.comment {
        writeln!(output, "/* {} */", comment)?;
    }
    writeln!(output, "struct {} {{", struct_type.name)?;
    for field in &struct_type.fields {
        let name = escape_c_keyword(&field.name);
        writeln!(output, "{}{} {};", TAB, c_type(&field.field_type, TypeMode::NoMode)?, name)?;
        if field.field_type.is_container() {
            writeln!(output, "{}uint32_t {}Len;", TAB, name)?;
        }
    }
    writeln!(output, "}};")?;
    writeln!(output)?;
    Ok(())
}

/* Union members are copied bytewise, so none of them may own storage */
fn emit_union_definition(union_type: &UnionType, output: &mut String) -> EmitResult<()> {
    writeln!(output, "union {} {{", union_type.name)?;
    for field in &union_type.fields {
        if field.field_type.owns_storage() || field.field_type.classify() == TypeKind::Interface {
            return Err(EmitError::unsupported(field.field_type.classify(), Language::C));
        }
        writeln!(
            output,
            "{}{} {};",
            TAB,
            c_type(&field.field_type, TypeMode::NoMode)?,
            escape_c_keyword(&field.name)
        )?;
    }
    writeln!(output, "}}  __attribute__ ((aligned(8)));")?;
    writeln!(output)?;
    Ok(())
}

fn emit_enum_definition(enum_type: &EnumType, output: &mut String) -> EmitResult<()> {
    writeln!(output, "enum {} {{", enum_type.name)?;
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

pub fn emit_prototypes(ty: &Type, output: &mut String) -> EmitResult<()> {
    if let Type::Struct(s) = ty {
        writeln!(output, "{};", marshalling_signature(s))?;
        writeln!(output, "{};", unmarshalling_signature(s))?;
        writeln!(output, "{};", free_signature(s))?;
        writeln!(output)?;
    }
    Ok(())
}

fn marshalling_signature(struct_type: &StructType) -> String {
    format!(
        "bool {}BlockMarshalling(struct HdfSBuf *data, const struct {} *dataBlock)",
        struct_type.name, struct_type.name
    )
}

fn unmarshalling_signature(struct_type: &StructType) -> String {
    format!(
        "bool {}BlockUnmarshalling(struct HdfSBuf *data, struct {} *dataBlock)",
        struct_type.name, struct_type.name
    )
}

fn free_signature(struct_type: &StructType) -> String {
    format!(
        "void {}Free(struct {} *dataBlock, bool freeSelf)",
        struct_type.name, struct_type.name
    )
}

pub fn emit_block_functions(
    ty: &Type,
    cx: &EmitContext<'_>,
    output: &mut String,
) -> EmitResult<()> {
    let Type::Struct(struct_type) = ty else {
        return Ok(());
    };
    let block_cx = cx
        .with_parcel("data")
        .with_error_label(BLOCK_ERROR_LABEL);
    emit_marshalling(struct_type, &block_cx, output)?;
    emit_unmarshalling(struct_type, &block_cx, output)?;
    emit_free(struct_type, &block_cx, output)?;
    Ok(())
}

fn field_site(field_name: &str) -> Site {
    Site::new(format!("dataBlock->{}", escape_c_keyword(field_name))).with_prefix(TAB)
}

#[tracing::instrument(level = "debug", skip_all, fields(name = %struct_type.name))]
fn emit_marshalling(
    struct_type: &StructType,
    cx: &EmitContext<'_>,
    output: &mut String,
) -> EmitResult<()> {
    let emitter = CEmitter::for_family(cx, Family::Marshal);
    writeln!(output, "{}", marshalling_signature(struct_type))?;
    writeln!(output, "{{")?;
    emit_kernel_counters(struct_type, BlockFn::Marshalling, cx, output)?;
    emit_null_guard(cx, output)?;

    let cleanup = CleanupStack::new();
    for field in &struct_type.fields {
        emitter.write(&field.field_type, &field_site(&field.name), &cleanup, output)?;
        writeln!(output)?;
    }
    writeln!(output, "{}return true;", TAB)?;
    writeln!(output, "}}")?;
    writeln!(output)?;
    Ok(())
}

/// Fields are decoded in declaration order; each field's releases join the
/// stack used by the fields after it, so a failure releases every earlier
/// field before jumping to the error label.
#[tracing::instrument(level = "debug", skip_all, fields(name = %struct_type.name))]
fn emit_unmarshalling(
    struct_type: &StructType,
    cx: &EmitContext<'_>,
    output: &mut String,
) -> EmitResult<()> {
    let emitter = CEmitter::for_family(cx, Family::Unmarshal);
    writeln!(output, "{}", unmarshalling_signature(struct_type))?;
    writeln!(output, "{{")?;
    emit_kernel_counters(struct_type, BlockFn::Unmarshalling, cx, output)?;
    emit_null_guard(cx, output)?;

    let mut cleanup = CleanupStack::new();
    for field in &struct_type.fields {
        let releases = emitter.read(
            &field.field_type,
            &field_site(&field.name),
            super::Storage::Owned,
            &cleanup,
            output,
        )?;
        cleanup = cleanup.extend(&releases);
        writeln!(output)?;
    }
    debug!(pending = cleanup.depth(), "releases owned by the decoded block");

    writeln!(output, "{}return true;", TAB)?;
    writeln!(output, "{}:", BLOCK_ERROR_LABEL)?;
    writeln!(output, "{}return false;", TAB)?;
    writeln!(output, "}}")?;
    writeln!(output)?;
    Ok(())
}

#[tracing::instrument(level = "debug", skip_all, fields(name = %struct_type.name))]
fn emit_free(struct_type: &StructType, cx: &EmitContext<'_>, output: &mut String) -> EmitResult<()> {
    let emitter = CEmitter::for_family(cx, Family::MemoryRecycle { client: false });
    writeln!(output, "{}", free_signature(struct_type))?;
    writeln!(output, "{{")?;
    emit_kernel_counters(struct_type, BlockFn::Free, cx, output)?;
    writeln!(output, "{}if (dataBlock == NULL) {{", TAB)?;
    writeln!(output, "{}{}return;", TAB, TAB)?;
    writeln!(output, "{}}}", TAB)?;
    writeln!(output)?;

    for field in &struct_type.fields {
        if field.field_type.owns_storage() {
            emitter.recycle(&field.field_type, &field_site(&field.name), false, output)?;
            writeln!(output)?;
        }
    }

    writeln!(output, "{}if (freeSelf) {{", TAB)?;
    writeln!(output, "{}{}{}(dataBlock);", TAB, TAB, cx.protocol.free_fn)?;
    writeln!(output, "{}}}", TAB)?;
    writeln!(output, "}}")?;
    writeln!(output)?;
    Ok(())
}

fn emit_null_guard(cx: &EmitContext<'_>, output: &mut String) -> EmitResult<()> {
    writeln!(output, "{}if (data == NULL || dataBlock == NULL) {{", TAB)?;
    writeln!(
        output,
        "{}{}{}",
        TAB,
        TAB,
        cx.protocol.log_line("invalid sbuf or data block")
    )?;
    writeln!(output, "{}{}return false;", TAB, TAB)?;
    writeln!(output, "{}}}", TAB)?;
    writeln!(output)?;
    Ok(())
}

/* Kernel C cannot declare loop counters inline */
fn emit_kernel_counters(
    struct_type: &StructType,
    block: BlockFn,
    cx: &EmitContext<'_>,
    output: &mut String,
) -> EmitResult<()> {
    if !cx.dialect.is_kernel() {
        return Ok(());
    }
    let counters = kernel_counters(struct_type, block);
    if counters.is_empty() {
        return Ok(());
    }
    for counter in &counters {
        writeln!(output, "{}uint32_t {} = 0;", TAB, counter)?;
    }
    writeln!(output)?;
    Ok(())
}

fn kernel_counters(struct_type: &StructType, block: BlockFn) -> IndexSet<String> {
    let mut counters = IndexSet::new();
    for field in &struct_type.fields {
        let Some(element) = field.field_type.element_type() else {
            continue;
        };
        let owning = element.owns_storage();
        match block {
            BlockFn::Marshalling => {
                counters.insert(loop_counter(0));
            }
            BlockFn::Unmarshalling => {
                counters.insert(loop_counter(0));
                if owning {
                    counters.insert(unwind_counter(0));
                }
            }
            BlockFn::Free => {
                if owning {
                    counters.insert(loop_counter(0));
                }
            }
        }
    }
    counters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::shared::{Dialect, Protocol};
    use pretty_assertions::assert_eq;

    fn sample() -> StructType {
        StructType::new("Sample")
            .field("values", Type::list(Type::UInt))
            .field("label", Type::String)
    }

    #[test]
    fn struct_definition_carries_lengths() {
        let mut text = String::new();
        emit_type_definition(&Type::Struct(sample()), &mut text).unwrap();
        assert_eq!(
            text,
            "struct Sample {\n\
             \x20   uint32_t* values;\n\
             \x20   uint32_t valuesLen;\n\
             \x20   char* label;\n\
             };\n\n"
        );
    }

    #[test]
    fn kernel_counters_per_function() {
        let names = StructType::new("Names").field("names", Type::list(Type::String));
        let unmarshal: Vec<String> = kernel_counters(&names, BlockFn::Unmarshalling)
            .into_iter()
            .collect();
        assert_eq!(unmarshal, vec!["i".to_string(), "j".to_string()]);

        let free: Vec<String> = kernel_counters(&sample(), BlockFn::Free).into_iter().collect();
        assert!(free.is_empty());
    }

    #[test]
    fn later_field_failure_releases_earlier_fields() {
        let protocol = Protocol::default();
        let cx = EmitContext::new(&protocol, Dialect::User);
        let mut text = String::new();
        emit_block_functions(&Type::Struct(sample()), &cx, &mut text).unwrap();

        assert!(text.contains(
            "    if (labelCp == NULL) {\n\
             \x20       HDF_LOGE(\"%{public}s: read labelCp failed!\", __func__);\n\
             \x20       if (dataBlock->valuesLen > 0 && dataBlock->values != NULL) {\n\
             \x20           OsalMemFree(dataBlock->values);\n\
             \x20           dataBlock->values = NULL;\n\
             \x20       }\n\
             \x20       goto errors;\n\
             \x20   }\n"
        ));
        assert!(text.contains("    return true;\nerrors:\n    return false;\n}\n"));
    }

    #[test]
    fn union_members_may_not_own_storage() {
        let bad = UnionType::new("Bad").field("name", Type::String);
        let mut text = String::new();
        assert!(emit_type_definition(&Type::Union(bad), &mut text).is_err());
    }
}
