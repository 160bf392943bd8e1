//! Translation pipeline
//!
//! Runs Lexer → Parser → SemanticAnalyzer → PyCodeGen over one source
//! text. Every call builds fresh stage state.

use crate::backend::{CodeGen, PyCodeGen};
use crate::feedback::TranslationStats;
use crate::frontend::ast::Program;
use crate::frontend::lexer::Lexer;
use crate::frontend::parser::Parser;
use crate::frontend::semantic::SemanticAnalyzer;
use crate::utils::{Error, Result, Severity, Stage};

/// What semantic errors do to code generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Generate code even when semantic errors were found
    #[default]
    Lenient,
    /// Skip generation when semantic errors were found
    Strict,
}

/// Translation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub mode: Mode,
    /// Spaces per indentation level in the output
    pub indent_width: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            mode: Mode::Lenient,
            indent_width: 4,
        }
    }
}

/// Result of one run: generated code (if any) and every diagnostic, in
/// the order the stages produced them. A fatal diagnostic is always last.
#[derive(Debug, Clone, Default)]
pub struct Translation {
    pub output: Option<String>,
    pub diagnostics: Vec<Error>,
    pub stats: TranslationStats,
}

impl Translation {
    /// The error that stopped the run, if any
    pub fn fatal(&self) -> Option<&Error> {
        self.diagnostics.iter().find(|e| e.is_fatal())
    }

    /// Any diagnostic at error severity or above
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|e| e.severity() >= Severity::Error)
    }

    /// Nothing at error severity or above was reported
    pub fn is_success(&self) -> bool {
        !self.has_errors()
    }

    pub fn errors_of(&self, stage: Stage) -> impl Iterator<Item = &Error> {
        self.diagnostics.iter().filter(move |e| e.stage() == stage)
    }
}

/// Translate source text into Python
pub fn translate(source: &str, options: &Options) -> Translation {
    let mut translation = Translation::default();
    let Some(program) = front_end(source, &mut translation) else {
        return translation;
    };

    if options.mode == Mode::Strict && translation.errors_of(Stage::Semantic).next().is_some() {
        log::info!("strict mode: skipping generation after semantic errors");
        return translation;
    }

    let mut codegen = PyCodeGen::new().with_indent_width(options.indent_width);
    match codegen.generate_lines(&program) {
        Ok(lines) => {
            log::debug!("{} backend emitted {} lines", codegen.name(), lines.len());
            translation.stats.line_count = lines.len();
            translation.output = Some(lines.join("\n"));
        }
        Err(e) => translation.diagnostics.push(e),
    }

    translation
}

/// Run every stage except generation
pub fn check(source: &str) -> Translation {
    let mut translation = Translation::default();
    front_end(source, &mut translation);
    translation
}

/// Lex and parse only. Lexical problems are returned alongside the tree.
pub fn parse(source: &str) -> Result<(Program, Vec<Error>)> {
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize();
    let program = Parser::new(tokens).parse_program()?;
    Ok((program, lexer.into_errors()))
}

fn front_end(source: &str, translation: &mut Translation) -> Option<Program> {
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize();
    translation.stats.token_count = tokens.len();
    translation.diagnostics.extend(lexer.into_errors());

    let program = match Parser::new(tokens).parse_program() {
        Ok(program) => program,
        Err(e) => {
            log::debug!("parse failed: {}", e);
            translation.diagnostics.push(e);
            return None;
        }
    };
    translation.stats.statement_count = program.body.len();

    let mut analyzer = SemanticAnalyzer::new();
    translation.diagnostics.extend(analyzer.analyze(&program));

    Some(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lenient_generates_despite_errors() {
        let t = translate("var a = 1; var a = 2;", &Options::default());
        assert_eq!(t.output.as_deref(), Some("a = 1\na = 2"));
        assert_eq!(t.errors_of(Stage::Semantic).count(), 1);
        assert!(t.fatal().is_none());
    }

    #[test]
    fn test_strict_suppresses_output() {
        let options = Options {
            mode: Mode::Strict,
            ..Options::default()
        };
        let t = translate("console.log(y);", &options);
        assert!(t.output.is_none());
        assert!(t.has_errors());
        assert!(t.fatal().is_none());

        let clean = translate("var y = 2; console.log(y);", &options);
        assert_eq!(clean.output.as_deref(), Some("y = 2\nprint(y)"));
    }

    #[test]
    fn test_syntax_error_is_fatal() {
        let t = translate("var x = 1; var", &Options::default());
        assert!(t.output.is_none());
        assert!(matches!(t.fatal(), Some(Error::UnexpectedEof { .. })));
        assert_eq!(t.stats.statement_count, 0);
    }

    #[test]
    fn test_generation_error_keeps_semantic_diagnostics() {
        let t = translate("console.log(q.size);", &Options::default());
        assert!(t.output.is_none());
        assert_eq!(t.diagnostics.len(), 2);
        assert!(matches!(t.diagnostics[0], Error::UndeclaredVariable { .. }));
        assert!(matches!(t.diagnostics.last(), Some(Error::UnsupportedProperty { .. })));
    }

    #[test]
    fn test_lexical_errors_recovered() {
        let t = translate("var a = 1 # 2;", &Options::default());
        assert!(t.output.is_some());
        assert_eq!(t.errors_of(Stage::Lexical).count(), 1);
        assert!(!t.has_errors());
    }

    #[test]
    fn test_check_skips_generation() {
        let t = check("var a = 1; console.log(a.size);");
        assert!(t.output.is_none());
        assert!(t.diagnostics.is_empty());
        assert_eq!(t.stats.token_count, 12);
        assert_eq!(t.stats.statement_count, 2);
    }

    #[test]
    fn test_parse_only() {
        let (program, warnings) = parse("let v = 3; $").unwrap();
        assert_eq!(program.body.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert!(parse("let = 3").is_err());
    }
}
