use serde_derive::{Deserialize, Serialize};
use std::fmt;

/* Closed set of type categories understood by the generator */
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum TypeKind {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    UInt,
    UShort,
    ULong,
    Float,
    Double,
    String,
    Enum,
    Struct,
    Union,
    List,
    Array,
    Interface,
    FileDescriptor,
    Sequenceable,
}

impl TypeKind {
    /* Fixed-width numeric or boolean category */
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            TypeKind::Bool
                | TypeKind::Byte
                | TypeKind::Short
                | TypeKind::Int
                | TypeKind::Long
                | TypeKind::UInt
                | TypeKind::UShort
                | TypeKind::ULong
                | TypeKind::Float
                | TypeKind::Double
        )
    }

    pub fn is_container(self) -> bool {
        matches!(self, TypeKind::List | TypeKind::Array)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TypeKind::Bool => "bool",
            TypeKind::Byte => "byte",
            TypeKind::Short => "short",
            TypeKind::Int => "int",
            TypeKind::Long => "long",
            TypeKind::UInt => "uint",
            TypeKind::UShort => "ushort",
            TypeKind::ULong => "ulong",
            TypeKind::Float => "float",
            TypeKind::Double => "double",
            TypeKind::String => "string",
            TypeKind::Enum => "enum",
            TypeKind::Struct => "struct",
            TypeKind::Union => "union",
            TypeKind::List => "list",
            TypeKind::Array => "array",
            TypeKind::Interface => "interface",
            TypeKind::FileDescriptor => "file-descriptor",
            TypeKind::Sequenceable => "sequenceable",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameter-direction mode that selects how a native type is decorated.
///
/// The mode is orthogonal to [`TypeKind`]: every category can be spelled in
/// every mode, the decoration resolver decides what each combination means
/// for a given output language.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, Copy, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TypeMode {
    /// Plain value spelling, used for generic arguments and `sizeof`.
    #[default]
    NoMode,
    /// Input parameter (const-qualified where the language allows it).
    ParamIn,
    /// Output parameter (mutable pointer / reference).
    ParamOut,
    /// Stack-local variable in a generated stub or proxy body.
    LocalVar,
}

impl TypeMode {
    pub const ALL: [TypeMode; 4] = [
        TypeMode::NoMode,
        TypeMode::ParamIn,
        TypeMode::ParamOut,
        TypeMode::LocalVar,
    ];
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct StructField {
    pub name: String,
    pub field_type: Type,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct StructType {
    pub name: String,
    pub fields: Vec<StructField>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl StructType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            comment: None,
        }
    }

    /* Builder-style field append, keeps declaration order */
    pub fn field(mut self, name: impl Into<String>, field_type: Type) -> Self {
        self.fields.push(StructField {
            name: name.into(),
            field_type,
        });
        self
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct UnionType {
    pub name: String,
    pub fields: Vec<StructField>,
}

impl UnionType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, field_type: Type) -> Self {
        self.fields.push(StructField {
            name: name.into(),
            field_type,
        });
        self
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct EnumMember {
    pub name: String,
    #[serde(default)]
    pub value: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct EnumType {
    pub name: String,
    #[serde(default)]
    pub members: Vec<EnumMember>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ListType {
    pub element_type: Box<Type>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ArrayType {
    pub element_type: Box<Type>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct InterfaceType {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct SequenceableType {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

/// A node of the type tree handed to the emitters.
///
/// Composite variants own their children exclusively, so the tree is acyclic
/// and can be walked recursively without a visited set.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub enum Type {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    #[serde(rename = "uint")]
    UInt,
    #[serde(rename = "ushort")]
    UShort,
    #[serde(rename = "ulong")]
    ULong,
    Float,
    Double,
    String,
    FileDescriptor,
    Enum(EnumType),
    Struct(StructType),
    Union(UnionType),
    List(ListType),
    Array(ArrayType),
    Interface(InterfaceType),
    Sequenceable(SequenceableType),
}

impl Type {
    pub fn list(element_type: Type) -> Self {
        Type::List(ListType {
            element_type: Box::new(element_type),
        })
    }

    pub fn array(element_type: Type) -> Self {
        Type::Array(ArrayType {
            element_type: Box::new(element_type),
        })
    }

    pub fn classify(&self) -> TypeKind {
        match self {
            Type::Bool => TypeKind::Bool,
            Type::Byte => TypeKind::Byte,
            Type::Short => TypeKind::Short,
            Type::Int => TypeKind::Int,
            Type::Long => TypeKind::Long,
            Type::UInt => TypeKind::UInt,
            Type::UShort => TypeKind::UShort,
            Type::ULong => TypeKind::ULong,
            Type::Float => TypeKind::Float,
            Type::Double => TypeKind::Double,
            Type::String => TypeKind::String,
            Type::FileDescriptor => TypeKind::FileDescriptor,
            Type::Enum(_) => TypeKind::Enum,
            Type::Struct(_) => TypeKind::Struct,
            Type::Union(_) => TypeKind::Union,
            Type::List(_) => TypeKind::List,
            Type::Array(_) => TypeKind::Array,
            Type::Interface(_) => TypeKind::Interface,
            Type::Sequenceable(_) => TypeKind::Sequenceable,
        }
    }

    /* Human readable spelling, as written in IDL sources */
    pub fn describe(&self) -> String {
        match self {
            Type::Bool => "boolean".to_string(),
            Type::Byte => "byte".to_string(),
            Type::Short => "short".to_string(),
            Type::Int => "int".to_string(),
            Type::Long => "long".to_string(),
            Type::UInt => "unsigned int".to_string(),
            Type::UShort => "unsigned short".to_string(),
            Type::ULong => "unsigned long".to_string(),
            Type::Float => "float".to_string(),
            Type::Double => "double".to_string(),
            Type::String => "String".to_string(),
            Type::FileDescriptor => "FileDescriptor".to_string(),
            Type::Enum(e) => format!("enum {}", e.name),
            Type::Struct(s) => format!("struct {}", s.name),
            Type::Union(u) => format!("union {}", u.name),
            Type::List(l) => format!("List<{}>", l.element_type.describe()),
            Type::Array(a) => format!("{}[]", a.element_type.describe()),
            Type::Interface(i) => i.name.clone(),
            Type::Sequenceable(s) => s.name.clone(),
        }
    }

    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::List(l) => Some(&l.element_type),
            Type::Array(a) => Some(&a.element_type),
            _ => None,
        }
    }

    pub fn is_container(&self) -> bool {
        self.classify().is_container()
    }

    pub fn declaration_name(&self) -> Option<&str> {
        match self {
            Type::Enum(e) => Some(&e.name),
            Type::Struct(s) => Some(&s.name),
            Type::Union(u) => Some(&u.name),
            Type::Interface(i) => Some(&i.name),
            Type::Sequenceable(s) => Some(&s.name),
            _ => None,
        }
    }

    /// True for a string or a container whose element chain ends in a string.
    ///
    /// Struct and union members are deliberately not inspected: only the
    /// container spellings change with this property.
    pub fn is_string_like(&self) -> bool {
        match self {
            Type::String => true,
            Type::List(l) => l.element_type.is_string_like(),
            Type::Array(a) => a.element_type.is_string_like(),
            _ => false,
        }
    }

    /// True when a decoded value of this type holds heap storage that the
    /// manual-memory backend must release.
    pub fn owns_storage(&self) -> bool {
        match self {
            Type::String | Type::List(_) | Type::Array(_) => true,
            Type::Struct(s) => s.fields.iter().any(|f| f.field_type.owns_storage()),
            _ => false,
        }
    }

    /// Number of nested container levels (`List<List<T>>` is 2).
    pub fn container_depth(&self) -> usize {
        match self.element_type() {
            Some(element) => 1 + element.container_depth(),
            None => 0,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
