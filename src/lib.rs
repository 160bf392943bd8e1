//! jspy
//!
//! Translates a small JavaScript subset into Python source text through a
//! four-stage pipeline: lexing, parsing, semantic analysis and code
//! generation.

pub mod frontend;
pub mod backend;
pub mod utils;
pub mod feedback;
pub mod driver;

pub use driver::{check, parse, translate, Mode, Options, Translation};
pub use utils::{Error, Result};
