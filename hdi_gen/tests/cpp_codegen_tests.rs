/* C++ Code Generation Tests
 *
 * The C++ backend relies on owning containers, so the tests focus on the
 * parcel calls, bound checks and the two failure returns.
 */

use hdi_gen::codegen::shared::Site;
use hdi_gen::codegen::{
    CodeGenerator, CodegenOptions, Dialect, EmitContext, Family, Language, Protocol, TypeEmitter,
};
use hdi_types::{
    EnumMember, EnumType, InterfaceType, SequenceableType, StructType, Type, TypesFile, UnionType,
};
use pretty_assertions::assert_eq;

fn emit(family: Family, ty: &Type, name: &str) -> String {
    let protocol = Protocol::default();
    let emitter = TypeEmitter::new(Language::Cpp, EmitContext::new(&protocol, Dialect::User));
    emitter
        .emit_to_string(ty, family, &Site::new(name))
        .expect("C++ emission")
}

fn color() -> Type {
    Type::Enum(EnumType {
        name: "Color".into(),
        members: vec![EnumMember {
            name: "RED".into(),
            value: Some(1),
        }],
    })
}

#[test]
fn test_stub_reads_enum_through_wide_temporary() {
    let text = emit(Family::StubReadVar, &color(), "color");
    assert_eq!(
        text,
        r#"Color color = static_cast<Color>(0);
{
    uint64_t enumTmp = 0;
    if (!data.ReadUint64(enumTmp)) {
        HDF_LOGE("%{public}s: read color failed!", __func__);
        return HDF_ERR_INVALID_PARAM;
    }
    color = static_cast<Color>(enumTmp);
}
"#
    );
}

#[test]
fn test_string_list_read_bounds_before_reserve() {
    let text = emit(Family::StubReadVar, &Type::list(Type::String), "names");
    let bound = text
        .find("if (namesSize > HDI_BUFF_MAX_SIZE / sizeof(std::string)) {")
        .expect("bound check");
    let reserve = text.find("names.reserve(namesSize);").expect("reserve");
    assert!(bound < reserve);
    assert!(text.contains("    const char* value0Cp = data.ReadCString();\n"));
    assert!(text.contains("    std::string value0 = value0Cp;\n"));
    assert!(text.contains("    names.push_back(value0);\n"));
}

#[test]
fn test_proxy_reply_reads_without_declaring() {
    let text = emit(Family::ProxyReadVar, &Type::list(Type::Int), "values");
    assert!(text.starts_with("uint32_t valuesSize = 0;\n"));
    assert!(!text.contains("std::vector<int32_t> values;"));
}

#[test]
fn test_union_read_copies_staged_bytes() {
    let number = Type::Union(UnionType::new("Number").field("asInt", Type::Int));
    let text = emit(Family::StubReadVar, &number, "number");
    assert!(text.starts_with("Number number;\n"));
    assert!(text.contains(
        "const Number *numberCp = reinterpret_cast<const Number *>(data.ReadUnpadBuffer(sizeof(Number)));\n"
    ));
    assert!(text.contains("if (memcpy_s(&number, sizeof(Number), numberCp, sizeof(Number)) != EOK) {\n"));
}

#[test]
fn test_interface_write_rejects_null_first() {
    let service = Type::Interface(InterfaceType {
        name: "IFooCallback".into(),
    });
    let text = emit(Family::WriteVar, &service, "callback");
    let null_check = text.find("if (callback == nullptr) {").expect("null check");
    let write = text.find("WriteRemoteObject").expect("remote write");
    assert!(null_check < write);

    let read = emit(Family::StubReadVar, &service, "callback");
    assert!(read.ends_with(
        "sptr<IFooCallback> callback = OHOS::HDI::hdi_facecast<IFooCallback>(callbackRemote);\n"
    ));
}

#[test]
fn test_sequenceable_read_rejects_null() {
    let blob = Type::Sequenceable(SequenceableType {
        name: "Blob".into(),
        namespace: Some("ohos.hdi".into()),
    });
    assert_eq!(
        emit(Family::StubReadVar, &blob, "blob"),
        r#"sptr<ohos::hdi::Blob> blob = data.ReadStrongParcelable<ohos::hdi::Blob>();
if (blob == nullptr) {
    HDF_LOGE("%{public}s: read blob failed!", __func__);
    return HDF_ERR_INVALID_PARAM;
}
"#
    );

    let block = emit(Family::Unmarshal, &blob, "dataBlock.blob");
    assert!(block.contains("if (dataBlock.blob == nullptr) {\n"));
    assert!(block.contains("    return false;\n"));
}

#[test]
fn test_package_block_functions() {
    let file = TypesFile {
        package: "ohos.hdi.sample".into(),
        types: vec![
            color(),
            Type::Struct(
                StructType::new("Sample")
                    .field("color", color())
                    .field("names", Type::list(Type::String)),
            ),
        ],
    };
    let generator = CodeGenerator::new(CodegenOptions {
        language: Language::Cpp,
        ..CodegenOptions::default()
    });
    let rendered = generator.render(&file).unwrap();

    assert!(rendered.header.contains("namespace ohos::hdi::sample {\n"));
    assert!(rendered.header.contains("enum Color : int32_t {\n"));
    assert!(rendered
        .header
        .contains("bool SampleBlockMarshalling(OHOS::MessageParcel &data, const Sample& dataBlock);\n"));
    assert!(rendered.source.contains("if (!data.WriteUint32(dataBlock.names.size())) {\n"));
    assert!(rendered.source.contains("return false;"));
    assert!(!rendered.source.contains("HDF_ERR_INVALID_PARAM"));
}

#[test]
fn test_inline_types_are_declared_before_use() {
    let inner = StructType::new("Inner")
        .field("label", Type::String)
        .field("color", color());
    let file = TypesFile {
        package: "ohos.hdi.sample".into(),
        types: vec![Type::Struct(
            StructType::new("Outer").field("inner", Type::Struct(inner)),
        )],
    };
    let generator = CodeGenerator::new(CodegenOptions {
        language: Language::Cpp,
        ..CodegenOptions::default()
    });
    let rendered = generator.render(&file).unwrap();

    let color_at = rendered.header.find("enum Color : int32_t {").expect("enum definition");
    let inner_at = rendered.header.find("struct Inner {").expect("inner definition");
    let outer_at = rendered.header.find("struct Outer {").expect("outer definition");
    assert!(color_at < inner_at && inner_at < outer_at);
    assert!(rendered
        .header
        .contains("bool InnerBlockUnmarshalling(OHOS::MessageParcel &data, Inner& dataBlock);\n"));

    let inner_fn = rendered
        .source
        .find("bool InnerBlockUnmarshalling(OHOS::MessageParcel &data, Inner& dataBlock)\n{")
        .expect("inner function");
    let call = rendered
        .source
        .find("InnerBlockUnmarshalling(data, dataBlock.inner)")
        .expect("outer calls inner");
    assert!(inner_fn < call);
}
