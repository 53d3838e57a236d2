/* Java Code Generation Tests */

use hdi_gen::codegen::shared::Site;
use hdi_gen::codegen::{
    CodeGenerator, CodegenError, CodegenOptions, Dialect, EmitContext, Family, Language, Protocol,
    TypeEmitter,
};
use hdi_types::{InterfaceType, SequenceableType, StructType, Type, TypesFile};
use pretty_assertions::assert_eq;

fn emit(family: Family, ty: &Type, name: &str) -> Result<String, hdi_gen::codegen::EmitError> {
    let protocol = Protocol::default();
    let emitter = TypeEmitter::new(Language::Java, EmitContext::new(&protocol, Dialect::User));
    emitter.emit_to_string(ty, family, &Site::new(name))
}

#[test]
fn test_nested_list_read_uses_depth_temporaries() {
    let text = emit(Family::StubReadVar, &Type::list(Type::list(Type::Int)), "grid").unwrap();
    assert_eq!(
        text,
        r#"List<List<Integer>> grid = new ArrayList<>();
int gridSize = data.readInt();
if (gridSize < 0 || gridSize > HDI_BUFF_MAX_SIZE / 4) {
    throw new IllegalArgumentException("gridSize is invalid data");
}
for (int i0 = 0; i0 < gridSize; ++i0) {
    List<Integer> value0 = new ArrayList<>();
    int value0Size = data.readInt();
    if (value0Size < 0 || value0Size > HDI_BUFF_MAX_SIZE / 4) {
        throw new IllegalArgumentException("value0Size is invalid data");
    }
    for (int i1 = 0; i1 < value0Size; ++i1) {
        int value1 = data.readInt();
        value0.add(value1);
    }
    grid.add(value0);
}
"#
    );
}

#[test]
fn test_nested_list_write_boxes_elements() {
    let text = emit(Family::WriteVar, &Type::list(Type::list(Type::Double)), "rows").unwrap();
    assert_eq!(
        text,
        r#"data.writeInt(rows.size());
for (List<Double> element0 : rows) {
    data.writeInt(element0.size());
    for (Double element1 : element0) {
        data.writeDouble(element1);
    }
}
"#
    );
}

#[test]
fn test_proxy_reply_clears_existing_list() {
    let text = emit(Family::ProxyReadVar, &Type::list(Type::Bool), "flags").unwrap();
    assert!(text.starts_with("flags.clear();\nint flagsSize = data.readInt();\n"));
    assert!(text.contains("flagsSize > HDI_BUFF_MAX_SIZE / 1"));
}

#[test]
fn test_objects_and_descriptors() {
    let callback = Type::Interface(InterfaceType {
        name: "IFooCallback".into(),
    });
    assert_eq!(
        emit(Family::WriteVar, &callback, "cb").unwrap(),
        "data.writeRemoteObject(cb.asObject());\n"
    );
    assert_eq!(
        emit(Family::StubReadVar, &callback, "cb").unwrap(),
        "IFooCallback cb = IFooCallbackStub.asInterface(data.readRemoteObject());\n"
    );

    let blob = Type::Sequenceable(SequenceableType {
        name: "Blob".into(),
        namespace: None,
    });
    assert_eq!(
        emit(Family::StubReadVar, &blob, "blob").unwrap(),
        "Blob blob = new Blob();\ndata.readSequenceable(blob);\n"
    );
    assert_eq!(
        emit(Family::StubReadVar, &Type::FileDescriptor, "fd").unwrap(),
        "int fd = data.readFileDescriptor();\n"
    );
}

#[test]
fn test_out_locals_and_silent_families() {
    assert_eq!(
        emit(Family::StubReadOutVar, &Type::list(Type::String), "names").unwrap(),
        "List<String> names = new ArrayList<>();\n"
    );
    assert_eq!(
        emit(Family::StubReadOutVar, &Type::String, "label").unwrap(),
        "String label = \"\";\n"
    );
    for family in [
        Family::ProxyWriteOutVar,
        Family::ProxyReadOutVar,
        Family::MemoryRecycle { client: false },
    ] {
        assert!(emit(family, &Type::list(Type::Int), "values").unwrap().is_empty());
    }
}

#[test]
fn test_records_have_no_java_form() {
    let point = Type::Struct(StructType::new("Point").field("x", Type::Int));
    for family in Family::ALL {
        assert!(emit(family, &point, "point").is_err(), "{}", family);
        assert!(emit(family, &Type::ULong, "id").is_err(), "{}", family);
    }

    let generator = CodeGenerator::new(CodegenOptions {
        language: Language::Java,
        ..CodegenOptions::default()
    });
    let file = TypesFile {
        package: "ohos.hdi.sample".into(),
        types: vec![point],
    };
    assert!(matches!(
        generator.render(&file),
        Err(CodegenError::NoDeclarations(Language::Java))
    ));
}
