pub mod c_gen;
pub mod cpp_gen;
pub mod emitter;
pub mod java_gen;
pub mod shared;

pub use emitter::{Direction, Family, Role, TypeEmitter};
pub use shared::{Dialect, EmitContext, EmitError, Language, Protocol};

use hdi_types::TypesFile;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const OUTPUT_DIR: &str = "generated";

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error(transparent)]
    Emit(#[from] EmitError),
    #[error("{0} has no standalone type declarations")]
    NoDeclarations(Language),
    #[error("failed to write {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub struct CodegenOptions {
    pub output_dir: String,
    pub language: Language,
    pub dialect: Dialect,
    pub protocol: Protocol,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            output_dir: OUTPUT_DIR.to_string(),
            language: Language::C,
            dialect: Dialect::User,
            protocol: Protocol::default(),
        }
    }
}

/* Rendered declaration pair of one package, before it touches the disk */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPackage {
    /* `ohos.hdi.sample` -> `ohos/hdi/sample` */
    pub package_path: PathBuf,
    pub header: String,
    pub source: String,
    pub source_name: String,
}

pub struct CodeGenerator {
    options: CodegenOptions,
}

impl CodeGenerator {
    pub fn new(options: CodegenOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CodegenOptions {
        &self.options
    }

    pub fn render(&self, file: &TypesFile) -> Result<RenderedPackage, CodegenError> {
        let cx = EmitContext::new(&self.options.protocol, self.options.dialect);
        let (header, source) = match self.options.language {
            Language::C => {
                let out = c_gen::emit_declarations(file, &cx)?;
                (out.header, out.source)
            }
            Language::Cpp => {
                let out = cpp_gen::emit_declarations(file, &cx)?;
                (out.header, out.source)
            }
            Language::Java => return Err(CodegenError::NoDeclarations(Language::Java)),
        };
        debug!(
            package = %file.package,
            types = file.types.len(),
            "rendered package declarations"
        );
        Ok(RenderedPackage {
            package_path: PathBuf::from(file.package.replace('.', "/")),
            header,
            source,
            source_name: format!("types.{}", self.options.language.file_extension()),
        })
    }

    /* Writes `<output>/<package path>/types.h` and the matching source */
    pub fn emit_code(&self, file: &TypesFile) -> Result<Vec<PathBuf>, CodegenError> {
        let rendered = self.render(file)?;
        let dir = Path::new(&self.options.output_dir).join(&rendered.package_path);
        fs::create_dir_all(&dir).map_err(|source| CodegenError::Io {
            path: dir.clone(),
            source,
        })?;

        let header_path = dir.join("types.h");
        let source_path = dir.join(&rendered.source_name);
        for (path, content) in [(&header_path, &rendered.header), (&source_path, &rendered.source)] {
            fs::write(path, content).map_err(|source| CodegenError::Io {
                path: path.clone(),
                source,
            })?;
        }
        info!(
            header = %header_path.display(),
            source = %source_path.display(),
            "wrote generated files"
        );
        Ok(vec![header_path, source_path])
    }
}
