/* Decoration Tests
 *
 * Native spellings per language and parameter mode, resolved through the
 * public emitter front end.
 */

use hdi_gen::codegen::{Dialect, EmitContext, EmitError, Language, Protocol, TypeEmitter};
use hdi_types::{InterfaceType, SequenceableType, StructType, Type, TypeMode};
use pretty_assertions::assert_eq;

fn scalars() -> Vec<(Type, &'static str)> {
    vec![
        (Type::Bool, "bool"),
        (Type::Byte, "int8_t"),
        (Type::Short, "int16_t"),
        (Type::Int, "int32_t"),
        (Type::Long, "int64_t"),
        (Type::UInt, "uint32_t"),
        (Type::UShort, "uint16_t"),
        (Type::ULong, "uint64_t"),
        (Type::Float, "float"),
        (Type::Double, "double"),
    ]
}

fn spell(language: Language, ty: &Type, mode: TypeMode) -> Result<String, EmitError> {
    let protocol = Protocol::default();
    TypeEmitter::new(language, EmitContext::new(&protocol, Dialect::User)).native_type(ty, mode)
}

#[test]
fn test_c_in_containers_are_const_unless_string_like() {
    for (scalar, spelling) in scalars() {
        for container in [Type::list(scalar.clone()), Type::array(scalar)] {
            assert_eq!(
                spell(Language::C, &container, TypeMode::ParamIn).unwrap(),
                format!("const {}*", spelling)
            );
            assert_eq!(
                spell(Language::C, &container, TypeMode::ParamOut).unwrap(),
                format!("{}*", spelling)
            );
        }
    }

    for container in [Type::list(Type::String), Type::array(Type::String)] {
        assert_eq!(spell(Language::C, &container, TypeMode::ParamIn).unwrap(), "char**");
        assert_eq!(spell(Language::C, &container, TypeMode::NoMode).unwrap(), "char**");
    }
    assert_eq!(spell(Language::C, &Type::String, TypeMode::ParamIn).unwrap(), "const char*");
    assert_eq!(spell(Language::C, &Type::String, TypeMode::ParamOut).unwrap(), "char*");
}

#[test]
fn test_c_scalars_gain_pointer_only_for_out() {
    for (ty, spelling) in scalars() {
        assert_eq!(spell(Language::C, &ty, TypeMode::NoMode).unwrap(), spelling);
        assert_eq!(spell(Language::C, &ty, TypeMode::ParamIn).unwrap(), spelling);
        assert_eq!(spell(Language::C, &ty, TypeMode::LocalVar).unwrap(), spelling);
        assert_eq!(
            spell(Language::C, &ty, TypeMode::ParamOut).unwrap(),
            format!("{}*", spelling)
        );
    }
}

#[test]
fn test_c_interfaces_and_descriptors() {
    let service = Type::Interface(InterfaceType {
        name: "IFoo".into(),
    });
    assert_eq!(spell(Language::C, &service, TypeMode::ParamIn).unwrap(), "struct IFoo*");
    assert_eq!(spell(Language::C, &service, TypeMode::ParamOut).unwrap(), "struct IFoo**");
    assert_eq!(spell(Language::C, &Type::FileDescriptor, TypeMode::ParamOut).unwrap(), "int*");
}

#[test]
fn test_cpp_passes_records_by_reference() {
    let point = Type::Struct(StructType::new("Point").field("x", Type::Int));
    assert_eq!(spell(Language::Cpp, &point, TypeMode::ParamIn).unwrap(), "const Point&");
    assert_eq!(spell(Language::Cpp, &point, TypeMode::ParamOut).unwrap(), "Point&");
    assert_eq!(
        spell(Language::Cpp, &Type::list(Type::String), TypeMode::ParamIn).unwrap(),
        "const std::vector<std::string>&"
    );
    assert_eq!(spell(Language::Cpp, &Type::ULong, TypeMode::ParamIn).unwrap(), "uint64_t");
    assert_eq!(spell(Language::Cpp, &Type::ULong, TypeMode::ParamOut).unwrap(), "uint64_t&");

    let blob = Type::Sequenceable(SequenceableType {
        name: "Blob".into(),
        namespace: Some("ohos.hdi".into()),
    });
    assert_eq!(spell(Language::Cpp, &blob, TypeMode::LocalVar).unwrap(), "sptr<ohos::hdi::Blob>");
}

#[test]
fn test_java_ignores_mode_and_boxes_list_elements() {
    for mode in TypeMode::ALL {
        assert_eq!(
            spell(Language::Java, &Type::list(Type::Int), mode).unwrap(),
            "List<Integer>"
        );
        assert_eq!(spell(Language::Java, &Type::array(Type::Bool), mode).unwrap(), "boolean[]");
    }
    assert_eq!(
        spell(Language::Java, &Type::list(Type::FileDescriptor), TypeMode::NoMode).unwrap(),
        "List<Integer>"
    );
}

#[test]
fn test_unsupported_combinations_are_errors() {
    assert!(spell(Language::Java, &Type::UInt, TypeMode::NoMode).is_err());
    assert!(spell(Language::Java, &Type::list(Type::UShort), TypeMode::NoMode).is_err());
    assert!(matches!(
        spell(Language::Java, &Type::array(Type::list(Type::Int)), TypeMode::NoMode),
        Err(EmitError::NestedContainer { .. })
    ));

    let blob = Type::Sequenceable(SequenceableType {
        name: "Blob".into(),
        namespace: None,
    });
    assert!(spell(Language::C, &blob, TypeMode::ParamIn).is_err());
}
