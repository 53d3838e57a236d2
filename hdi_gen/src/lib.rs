//! HDI binding generator: type decoration, wire codec emission for the C,
//! C++ and Java bindings, and a reference model of the wire format.

pub mod codegen;
pub mod wire;

pub use codegen::{CodeGenerator, CodegenError, CodegenOptions, TypeEmitter};
