use super::context::Language;
use hdi_types::TypeKind;
use thiserror::Error;

/* Generator-side failures; generated-code failures are text, not errors */
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("type kind '{kind}' has no {language} emission")]
    Unsupported { kind: TypeKind, language: Language },
    #[error("nested container '{description}' is not supported by the {language} backend")]
    NestedContainer {
        description: String,
        language: Language,
    },
    #[error("type '{name}' is defined more than once with different members")]
    ConflictingDeclaration { name: String },
    #[error("failed to format generated code")]
    Fmt(#[from] std::fmt::Error),
}

pub type EmitResult<T> = Result<T, EmitError>;

impl EmitError {
    pub fn unsupported(kind: TypeKind, language: Language) -> Self {
        EmitError::Unsupported { kind, language }
    }
}
