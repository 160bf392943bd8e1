//! Backend module - Code generation

pub mod codegen;

// Python emitter
pub mod python;

pub use codegen::CodeGen;
pub use python::PyCodeGen;
