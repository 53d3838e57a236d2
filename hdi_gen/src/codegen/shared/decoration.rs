//! Native type spelling per output language and parameter mode.
//!
//! Composite spellings are always built from the child at `NoMode`; only the
//! outermost type sees the caller's mode.

use super::context::Language;
use super::error::{EmitError, EmitResult};
use hdi_types::{ArrayType, ListType, Type, TypeKind, TypeMode};

pub fn native_type(ty: &Type, language: Language, mode: TypeMode) -> EmitResult<String> {
    match language {
        Language::C => c_type(ty, mode),
        Language::Cpp => cpp_type(ty, mode),
        Language::Java => java_type(ty, false),
    }
}

/* Width-exact C scalar spelling, shared with sizeof() and casts */
pub fn c_scalar(kind: TypeKind) -> Option<&'static str> {
    let spelling = match kind {
        TypeKind::Bool => "bool",
        TypeKind::Byte => "int8_t",
        TypeKind::Short => "int16_t",
        TypeKind::Int => "int32_t",
        TypeKind::Long => "int64_t",
        TypeKind::UInt => "uint32_t",
        TypeKind::UShort => "uint16_t",
        TypeKind::ULong => "uint64_t",
        TypeKind::Float => "float",
        TypeKind::Double => "double",
        _ => return None,
    };
    Some(spelling)
}

pub fn c_type(ty: &Type, mode: TypeMode) -> EmitResult<String> {
    let spelling = match ty {
        Type::String => match mode {
            TypeMode::ParamIn => "const char*".to_string(),
            _ => "char*".to_string(),
        },
        Type::FileDescriptor => out_pointer("int".to_string(), mode),
        Type::Enum(e) => out_pointer(format!("enum {}", e.name), mode),
        Type::Struct(s) => by_address(format!("struct {}", s.name), mode),
        Type::Union(u) => by_address(format!("union {}", u.name), mode),
        Type::List(ListType { element_type: element })
        | Type::Array(ArrayType { element_type: element }) => {
            let base = c_type(element, TypeMode::NoMode)?;
            match mode {
                /* string elements stay mutable: the read path takes ownership of them */
                TypeMode::ParamIn if !element.is_string_like() => format!("const {}*", base),
                _ => format!("{}*", base),
            }
        }
        Type::Interface(i) => match mode {
            TypeMode::ParamOut => format!("struct {}**", i.name),
            _ => format!("struct {}*", i.name),
        },
        Type::Sequenceable(_) => {
            return Err(EmitError::unsupported(TypeKind::Sequenceable, Language::C))
        }
        scalar => {
            let base = c_scalar(scalar.classify())
                .ok_or_else(|| EmitError::unsupported(scalar.classify(), Language::C))?;
            out_pointer(base.to_string(), mode)
        }
    };
    Ok(spelling)
}

fn out_pointer(base: String, mode: TypeMode) -> String {
    match mode {
        TypeMode::ParamOut => format!("{}*", base),
        _ => base,
    }
}

fn by_address(base: String, mode: TypeMode) -> String {
    match mode {
        TypeMode::ParamIn => format!("const {}*", base),
        TypeMode::ParamOut => format!("{}*", base),
        TypeMode::NoMode | TypeMode::LocalVar => base,
    }
}

pub fn cpp_type(ty: &Type, mode: TypeMode) -> EmitResult<String> {
    let base = match ty {
        Type::String => "std::string".to_string(),
        Type::FileDescriptor => "int".to_string(),
        Type::Enum(e) => e.name.clone(),
        Type::Struct(s) => s.name.clone(),
        Type::Union(u) => u.name.clone(),
        Type::List(l) => format!("std::vector<{}>", cpp_type(&l.element_type, TypeMode::NoMode)?),
        Type::Array(a) => format!("std::vector<{}>", cpp_type(&a.element_type, TypeMode::NoMode)?),
        Type::Interface(i) => format!("sptr<{}>", i.name),
        Type::Sequenceable(s) => match &s.namespace {
            Some(namespace) => format!("sptr<{}::{}>", namespace.replace('.', "::"), s.name),
            None => format!("sptr<{}>", s.name),
        },
        scalar => c_scalar(scalar.classify())
            .ok_or_else(|| EmitError::unsupported(scalar.classify(), Language::Cpp))?
            .to_string(),
    };

    /* scalars, descriptors and enums are passed by value */
    let by_value = ty.classify().is_scalar() || matches!(ty, Type::FileDescriptor | Type::Enum(_));
    let spelling = match mode {
        TypeMode::NoMode | TypeMode::LocalVar => base,
        TypeMode::ParamIn if by_value => base,
        TypeMode::ParamIn => format!("const {}&", base),
        TypeMode::ParamOut => format!("{}&", base),
    };
    Ok(spelling)
}

/// Java spelling. Direction is not encoded; `inner` selects the boxed form
/// used inside generic containers.
pub fn java_type(ty: &Type, inner: bool) -> EmitResult<String> {
    let boxed = |primitive: &str, object: &str| {
        if inner {
            object.to_string()
        } else {
            primitive.to_string()
        }
    };
    let spelling = match ty {
        Type::Bool => boxed("boolean", "Boolean"),
        Type::Byte => boxed("byte", "Byte"),
        Type::Short => boxed("short", "Short"),
        Type::Int | Type::FileDescriptor => boxed("int", "Integer"),
        Type::Long => boxed("long", "Long"),
        Type::Float => boxed("float", "Float"),
        Type::Double => boxed("double", "Double"),
        Type::String => "String".to_string(),
        Type::List(l) => format!("List<{}>", java_type(&l.element_type, true)?),
        Type::Array(a) => {
            if a.element_type.is_container() {
                return Err(EmitError::NestedContainer {
                    description: ty.describe(),
                    language: Language::Java,
                });
            }
            format!("{}[]", java_type(&a.element_type, false)?)
        }
        Type::Interface(i) => i.name.clone(),
        Type::Sequenceable(s) => s.name.clone(),
        Type::UInt | Type::UShort | Type::ULong | Type::Enum(_) | Type::Struct(_) | Type::Union(_) => {
            return Err(EmitError::unsupported(ty.classify(), Language::Java))
        }
    };
    Ok(spelling)
}
