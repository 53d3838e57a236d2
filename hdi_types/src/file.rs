use crate::types::Type;
use serde_derive::{Deserialize, Serialize};

/* ============================================================================
   Declaration file
   ============================================================================ */

/* A package worth of named type declarations (struct, union, enum, ...) */
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct TypesFile {
    pub package: String,
    #[serde(with = "serde_yml::with::singleton_map_recursive")]
    pub types: Vec<Type>,
}

impl TypesFile {
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yml::Error> {
        serde_yml::from_str(content)
    }

    /* Named declarations in file order; anonymous entries are skipped */
    pub fn declarations(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.types
            .iter()
            .filter_map(|ty| ty.declaration_name().map(|name| (name, ty)))
    }

    /* Package name as a C identifier prefix (`ohos.hdi.foo` -> `ohos_hdi_foo`) */
    pub fn package_ident(&self) -> String {
        self.package.replace('.', "_")
    }
}

/* A single type written inline, e.g. `list: {element-type: uint}` */
pub fn type_from_yaml_str(content: &str) -> Result<Type, serde_yml::Error> {
    serde_yml::with::singleton_map_recursive::deserialize(serde_yml::Deserializer::from_str(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{StructType, TypeKind};
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
package: "ohos.hdi.sample"
types:
  - struct:
      name: "Sample"
      fields:
        - name: "values"
          field-type:
            list:
              element-type: uint
        - name: "label"
          field-type: string
  - enum:
      name: "Mode"
      members:
        - name: "MODE_A"
          value: 0
        - name: "MODE_B"
"#;

    #[test]
    fn parses_declarations_in_order() {
        let file = TypesFile::from_yaml_str(SAMPLE).expect("sample parses");
        assert_eq!(file.package_ident(), "ohos_hdi_sample");

        let names: Vec<&str> = file.declarations().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Sample", "Mode"]);

        let expected = Type::Struct(
            StructType::new("Sample")
                .field("values", Type::list(Type::UInt))
                .field("label", Type::String),
        );
        assert_eq!(file.types[0], expected);
        assert_eq!(file.types[1].classify(), TypeKind::Enum);
    }

    #[test]
    fn inline_type_parses() {
        let ty = type_from_yaml_str("list:\n  element-type: string\n").expect("inline type");
        assert_eq!(ty, Type::list(Type::String));
    }
}
