//! HDI Type Definitions
//!
//! This crate contains the type model consumed by the HDI code generator:
//! the closed set of type categories, the parameter-direction modes used to
//! decorate native spellings, and the declaration file format. It holds pure
//! data only; no code generation or file I/O lives here.

pub mod file;
pub mod types;

// Re-export commonly used types at the crate root
pub use file::*;
pub use types::*;
