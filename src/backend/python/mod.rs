//! Python Backend - Generate Python source from the AST
//!
//! Constructs Python lacks (the three-clause `for`, `.length`, the
//! JavaScript built-ins) are rewritten into plain Python equivalents.

mod py_codegen;

pub use py_codegen::PyCodeGen;
