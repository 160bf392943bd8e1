//! Structured Feedback Module
//!
//! Machine-readable output for tools driving the translator:
//! - JSON diagnostic reports with fix suggestions
//! - Translation statistics

use serde::Serialize;

use crate::driver::Translation;
use crate::utils::{Error, Severity, Stage};

// ==================== Diagnostic Report ====================

/// One diagnostic, flattened for serialization
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    /// Error code (e.g., "E0202")
    pub code: String,

    pub severity: Severity,

    pub stage: Stage,

    /// Human-readable message
    pub message: String,

    /// Source line, when the stage tracks one
    pub line: Option<usize>,

    /// Suggested fix
    pub suggestion: Option<String>,
}

impl DiagnosticReport {
    pub fn from_error(error: &Error) -> Self {
        Self {
            code: error.code().to_string(),
            severity: error.severity(),
            stage: error.stage(),
            message: error.to_string(),
            line: error.span().map(|s| s.line),
            suggestion: suggestion_for(error),
        }
    }
}

fn suggestion_for(error: &Error) -> Option<String> {
    let text = match error {
        Error::IllegalCharacter { ch, .. } => format!("Remove '{}'", ch),
        Error::UnterminatedString { .. } => "Close the string with '\"'".to_string(),
        Error::NestingTooDeep { .. } => {
            "Split the expression or block into smaller statements".to_string()
        }
        Error::Redeclared { name, .. } => {
            format!("Rename the second declaration or assign to '{}' instead", name)
        }
        Error::UndeclaredVariable { name } => {
            format!("Declare '{}' with var, let or const before using it", name)
        }
        Error::UninitializedVariable { name } => {
            format!("Assign a value to '{}' before reading it", name)
        }
        Error::UndeclaredAssignment { name } => format!("Add 'var {}' before the assignment", name),
        Error::UndeclaredFunction { name } => {
            format!("Declare function '{}' before calling it", name)
        }
        Error::ArgCountMismatch { expected, got, .. } => {
            if got < expected {
                format!("Add {} more argument(s)", expected - got)
            } else {
                format!("Remove {} extra argument(s)", got - expected)
            }
        }
        Error::UnsupportedProperty { .. } => "Only '.length' has a Python equivalent".to_string(),
        _ => return None,
    };
    Some(text)
}

// ==================== Translation Feedback ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TranslationStats {
    pub token_count: usize,
    pub statement_count: usize,
    /// Lines of generated output
    pub line_count: usize,
}

/// Complete report for one translation run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// No errors or fatal problems were found
    pub success: bool,

    pub source_file: String,

    /// Generated code, if generation ran and succeeded
    pub output: Option<String>,

    pub diagnostics: Vec<DiagnosticReport>,

    pub stats: TranslationStats,
}

impl Report {
    pub fn new(source_file: &str, translation: &Translation) -> Self {
        Self {
            success: translation.is_success(),
            source_file: source_file.to_string(),
            output: translation.output.clone(),
            diagnostics: translation
                .diagnostics
                .iter()
                .map(DiagnosticReport::from_error)
                .collect(),
            stats: translation.stats.clone(),
        }
    }

    /// Output as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{translate, Options};

    #[test]
    fn test_report_from_translation() {
        let translation = translate("console.log(y);", &Options::default());
        let report = Report::new("demo.js", &translation);

        assert!(!report.success);
        assert_eq!(report.output.as_deref(), Some("print(y)"));
        assert_eq!(report.diagnostics.len(), 1);

        let diagnostic = &report.diagnostics[0];
        assert_eq!(diagnostic.code, "E0202");
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.line, None);
        assert!(diagnostic.suggestion.as_deref().unwrap().contains("'y'"));
    }

    #[test]
    fn test_json_shape() {
        let translation = translate("var a = 1;\n@", &Options::default());
        let report = Report::new("demo.js", &translation);
        let value: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["output"], "a = 1");
        assert_eq!(value["diagnostics"][0]["severity"], "Warning");
        assert_eq!(value["diagnostics"][0]["stage"], "Lexical");
        assert_eq!(value["diagnostics"][0]["line"], 2);
        assert_eq!(value["stats"]["token_count"], 5);
        assert!(report.to_json().contains("\"source_file\": \"demo.js\""));
    }

    #[test]
    fn test_arity_suggestion() {
        let missing = Error::ArgCountMismatch {
            name: "f".to_string(),
            expected: 2,
            got: 1,
        };
        let extra = Error::ArgCountMismatch {
            name: "f".to_string(),
            expected: 2,
            got: 3,
        };

        assert_eq!(suggestion_for(&missing).as_deref(), Some("Add 1 more argument(s)"));
        assert_eq!(suggestion_for(&extra).as_deref(), Some("Remove 1 extra argument(s)"));
        assert!(suggestion_for(&Error::ReturnOutsideFunction).is_none());
    }
}
