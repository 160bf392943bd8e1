//! Code Generation trait - Backend abstraction
//!
//! Emitters take a parsed program and produce target source text.

use crate::frontend::ast::Program;
use crate::utils::Result;

/// Code generation backend trait
pub trait CodeGen {
    /// Generate target source text from a program
    fn generate(&mut self, program: &Program) -> Result<String>;

    /// Get the backend name
    fn name(&self) -> &str;
}
