//! Named types a package must define, including the ones written inline as
//! field or element types.
//!
//! A definition precedes every type that uses it, so the emitted header
//! compiles in one pass. A name seen twice must carry the same definition.

use super::error::{EmitError, EmitResult};
use hdi_types::{Type, TypesFile};
use indexmap::IndexMap;

pub fn ordered_declarations(file: &TypesFile) -> EmitResult<Vec<&Type>> {
    let mut found = IndexMap::new();
    for ty in &file.types {
        collect(ty, &mut found)?;
    }
    Ok(found.into_values().collect())
}

fn collect<'t>(ty: &'t Type, found: &mut IndexMap<&'t str, &'t Type>) -> EmitResult<()> {
    let name = match ty {
        Type::Struct(s) => {
            for field in &s.fields {
                collect(&field.field_type, found)?;
            }
            &s.name
        }
        Type::Union(u) => {
            for field in &u.fields {
                collect(&field.field_type, found)?;
            }
            &u.name
        }
        Type::Enum(e) => &e.name,
        Type::List(l) => return collect(&l.element_type, found),
        Type::Array(a) => return collect(&a.element_type, found),
        _ => return Ok(()),
    };
    match found.get(name.as_str()) {
        Some(existing) if *existing != ty => Err(EmitError::ConflictingDeclaration {
            name: name.clone(),
        }),
        Some(_) => Ok(()),
        None => {
            found.insert(name, ty);
            Ok(())
        }
    }
}
