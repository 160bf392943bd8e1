//! Error handling for jspy

use crate::utils::Span;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage an error originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Lexical,
    Syntax,
    Semantic,
    Generation,
    Io,
}

/// How an error affects the rest of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    /// Recovered locally, scanning continued
    Warning,
    /// Recorded, the pass continued
    Error,
    /// The run stopped
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Fatal => write!(f, "fatal"),
        }
    }
}

/// What kind of name a declaration introduced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NameKind {
    Variable,
    Function,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameKind::Variable => write!(f, "Variable"),
            NameKind::Function => write!(f, "Function"),
        }
    }
}

/// Translator error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ==================== Lexical Errors ====================

    #[error("Illegal character '{ch}' at {span}")]
    IllegalCharacter { ch: char, span: Span },

    #[error("Unterminated string literal at {span}")]
    UnterminatedString { span: Span },

    #[error("Number literal '{literal}' out of range at {span}")]
    NumberOverflow { literal: String, span: Span },

    // ==================== Parser Errors ====================

    #[error("Unexpected token: expected {expected}, got {got} at {span}")]
    UnexpectedToken {
        expected: String,
        got: String,
        span: Span,
    },

    #[error("Unexpected end of input: expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("Invalid assignment target at {span}")]
    InvalidAssignmentTarget { span: Span },

    #[error("Nesting deeper than {limit} levels at {span}")]
    NestingTooDeep { limit: usize, span: Span },

    // ==================== Semantic Errors ====================

    #[error("{kind} '{name}' already declared")]
    Redeclared { name: String, kind: NameKind },

    #[error("Use of undeclared variable '{name}'")]
    UndeclaredVariable { name: String },

    #[error("Use of uninitialized variable '{name}'")]
    UninitializedVariable { name: String },

    #[error("Assignment to undeclared variable '{name}'")]
    UndeclaredAssignment { name: String },

    #[error("Call to undeclared function '{name}'")]
    UndeclaredFunction { name: String },

    #[error("Function '{name}' called with {got} argument(s), expected {expected}")]
    ArgCountMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("'{keyword}' outside of a loop")]
    JumpOutsideLoop { keyword: &'static str },

    #[error("'return' outside of a function")]
    ReturnOutsideFunction,

    // ==================== Generation Errors ====================

    #[error("Unsupported property: {property}")]
    UnsupportedProperty { property: String },

    #[error("Unsupported construct: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Get the span associated with this error
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::IllegalCharacter { span, .. } => Some(*span),
            Self::UnterminatedString { span } => Some(*span),
            Self::NumberOverflow { span, .. } => Some(*span),
            Self::UnexpectedToken { span, .. } => Some(*span),
            Self::InvalidAssignmentTarget { span } => Some(*span),
            Self::NestingTooDeep { span, .. } => Some(*span),
            Self::UnexpectedEof { .. }
            | Self::Redeclared { .. }
            | Self::UndeclaredVariable { .. }
            | Self::UninitializedVariable { .. }
            | Self::UndeclaredAssignment { .. }
            | Self::UndeclaredFunction { .. }
            | Self::ArgCountMismatch { .. }
            | Self::JumpOutsideLoop { .. }
            | Self::ReturnOutsideFunction
            | Self::UnsupportedProperty { .. }
            | Self::Unsupported(_)
            | Self::Io(_) => None,
        }
    }

    /// Stage that produced this error
    pub fn stage(&self) -> Stage {
        match self {
            Self::IllegalCharacter { .. }
            | Self::UnterminatedString { .. }
            | Self::NumberOverflow { .. } => Stage::Lexical,
            Self::UnexpectedToken { .. }
            | Self::UnexpectedEof { .. }
            | Self::InvalidAssignmentTarget { .. }
            | Self::NestingTooDeep { .. } => Stage::Syntax,
            Self::Redeclared { .. }
            | Self::UndeclaredVariable { .. }
            | Self::UninitializedVariable { .. }
            | Self::UndeclaredAssignment { .. }
            | Self::UndeclaredFunction { .. }
            | Self::ArgCountMismatch { .. }
            | Self::JumpOutsideLoop { .. }
            | Self::ReturnOutsideFunction => Stage::Semantic,
            Self::UnsupportedProperty { .. } | Self::Unsupported(_) => Stage::Generation,
            Self::Io(_) => Stage::Io,
        }
    }

    /// Lexical problems are recovered, semantic ones accumulate,
    /// everything else ends the run.
    pub fn severity(&self) -> Severity {
        match self.stage() {
            Stage::Lexical => Severity::Warning,
            Stage::Semantic => Severity::Error,
            Stage::Syntax | Stage::Generation | Stage::Io => Severity::Fatal,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Stable error code for machine-readable reports
    pub fn code(&self) -> &'static str {
        match self {
            Self::IllegalCharacter { .. } => "E0001",
            Self::UnterminatedString { .. } => "E0002",
            Self::NumberOverflow { .. } => "E0003",
            Self::UnexpectedToken { .. } => "E0101",
            Self::UnexpectedEof { .. } => "E0102",
            Self::InvalidAssignmentTarget { .. } => "E0103",
            Self::NestingTooDeep { .. } => "E0104",
            Self::Redeclared { .. } => "E0201",
            Self::UndeclaredVariable { .. } => "E0202",
            Self::UninitializedVariable { .. } => "E0203",
            Self::UndeclaredAssignment { .. } => "E0204",
            Self::UndeclaredFunction { .. } => "E0205",
            Self::ArgCountMismatch { .. } => "E0206",
            Self::JumpOutsideLoop { .. } => "E0207",
            Self::ReturnOutsideFunction => "E0208",
            Self::UnsupportedProperty { .. } => "E0301",
            Self::Unsupported(_) => "E0302",
            Self::Io(_) => "E0401",
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let lex = Error::IllegalCharacter {
            ch: '#',
            span: Span::new(3, 4, 2),
        };
        assert_eq!(lex.stage(), Stage::Lexical);
        assert_eq!(lex.severity(), Severity::Warning);
        assert_eq!(lex.span().map(|s| s.line), Some(2));

        let sem = Error::UndeclaredVariable {
            name: "y".to_string(),
        };
        assert_eq!(sem.severity(), Severity::Error);
        assert!(sem.span().is_none());

        let eof = Error::UnexpectedEof {
            expected: "identifier".to_string(),
        };
        assert!(eof.is_fatal());

        let unsupported = Error::UnsupportedProperty {
            property: "push".to_string(),
        };
        assert!(unsupported.is_fatal());

        let deep = Error::NestingTooDeep {
            limit: 256,
            span: Span::new(900, 901, 1),
        };
        assert_eq!(deep.stage(), Stage::Syntax);
        assert!(deep.is_fatal());
        assert_eq!(deep.code(), "E0104");
    }

    #[test]
    fn test_io_conversion() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.js").into();
        assert_eq!(err.stage(), Stage::Io);
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "IO error: missing.js");
    }

    #[test]
    fn test_messages() {
        let err = Error::Redeclared {
            name: "a".to_string(),
            kind: NameKind::Variable,
        };
        assert_eq!(err.to_string(), "Variable 'a' already declared");

        let err = Error::ArgCountMismatch {
            name: "add".to_string(),
            expected: 2,
            got: 3,
        };
        assert_eq!(err.to_string(), "Function 'add' called with 3 argument(s), expected 2");

        let err = Error::IllegalCharacter {
            ch: '@',
            span: Span::new(0, 1, 7),
        };
        assert_eq!(err.to_string(), "Illegal character '@' at line 7");
    }
}
