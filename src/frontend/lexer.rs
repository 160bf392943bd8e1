//! Lexer for jspy
//!
//! Converts source code into a stream of tokens. Bad characters are
//! reported and skipped; the lexer never gives up on its input.

use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Span};

/// The lexer state
pub struct Lexer {
    /// Source code as chars
    source: Vec<char>,
    /// Current position in source
    pos: usize,
    /// Start position of current token
    start: usize,
    /// Current line (1-based)
    line: usize,
    /// Line the current token started on
    start_line: usize,
    /// Recovered lexical errors, in source order
    errors: Vec<Error>,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            start: 0,
            line: 1,
            start_line: 1,
            errors: Vec::new(),
        }
    }

    /// Get the current character without advancing
    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    /// Get the next character without advancing
    fn peek_next(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    /// Advance to the next character
    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if let Some(c) = c {
            self.pos += 1;
            if c == '\n' {
                self.line += 1;
            }
        }
        c
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn make_span(&self) -> Span {
        Span::new(self.start, self.pos, self.start_line)
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.make_span())
    }

    fn report(&mut self, error: Error) {
        log::warn!("{}", error);
        self.errors.push(error);
    }

    /// Skip whitespace and comments
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                // Line comment
                '/' if self.peek_next() == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                // Block comment
                '/' if self.peek_next() == Some('*') => {
                    self.advance();
                    self.advance();
                    while !self.is_at_end() {
                        if self.peek() == Some('*') && self.peek_next() == Some('/') {
                            self.advance();
                            self.advance();
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn is_ident_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_'
    }

    /// Read an identifier, keyword, or the `console.log` call form
    fn read_identifier(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if Self::is_ident_char(c) {
                self.advance();
            } else {
                break;
            }
        }

        let text: String = self.source[self.start..self.pos].iter().collect();

        if text == "console" && self.at_log_suffix() {
            for _ in 0..".log".len() {
                self.advance();
            }
            return self.make_token(TokenKind::ConsoleLog);
        }

        let kind = TokenKind::keyword_from_str(&text).unwrap_or(TokenKind::Identifier(text));
        self.make_token(kind)
    }

    /// `.log` follows and is not the prefix of a longer name
    fn at_log_suffix(&self) -> bool {
        let suffix = ['.', 'l', 'o', 'g'];
        let end = self.pos + suffix.len();
        end <= self.source.len()
            && self.source[self.pos..end] == suffix
            && !self.source.get(end).copied().map_or(false, Self::is_ident_char)
    }

    /// Read an integer literal
    fn read_number(&mut self) -> Option<Token> {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        let text: String = self.source[self.start..self.pos].iter().collect();
        match text.parse::<i64>() {
            Ok(value) => Some(self.make_token(TokenKind::Number(value))),
            Err(_) => {
                let span = self.make_span();
                self.report(Error::NumberOverflow {
                    literal: text,
                    span,
                });
                None
            }
        }
    }

    /// Read a string literal. The quotes are dropped; escapes stay as written.
    fn read_string(&mut self) -> Token {
        self.advance(); // consume opening quote

        let mut value = String::new();
        let mut terminated = false;

        while let Some(c) = self.peek() {
            match c {
                '"' => {
                    self.advance();
                    terminated = true;
                    break;
                }
                '\\' => {
                    value.push(c);
                    self.advance();
                    match self.peek() {
                        Some('\n') | None => break,
                        Some(escaped) => {
                            value.push(escaped);
                            self.advance();
                        }
                    }
                }
                '\n' => break,
                _ => {
                    value.push(c);
                    self.advance();
                }
            }
        }

        if !terminated {
            let span = self.make_span();
            self.report(Error::UnterminatedString { span });
        }

        self.make_token(TokenKind::String(value))
    }

    /// Get the next token, or `None` at end of input
    pub fn next_token(&mut self) -> Option<Token> {
        loop {
            self.skip_whitespace();
            self.start = self.pos;
            self.start_line = self.line;

            let c = self.peek()?;

            if c.is_ascii_alphabetic() || c == '_' {
                return Some(self.read_identifier());
            }

            if c.is_ascii_digit() {
                match self.read_number() {
                    Some(token) => return Some(token),
                    None => continue,
                }
            }

            if c == '"' {
                return Some(self.read_string());
            }

            self.advance();

            // Two-character operators are tried before their one-character prefixes
            let kind = match c {
                '+' => TokenKind::Plus,
                '-' => TokenKind::Minus,
                '*' => TokenKind::Star,
                '/' => TokenKind::Slash,
                '%' => TokenKind::Percent,
                '=' => {
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::EqEq
                    } else {
                        TokenKind::Assign
                    }
                }
                '!' => {
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::NotEq
                    } else {
                        TokenKind::Not
                    }
                }
                '<' => {
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::LtEq
                    } else {
                        TokenKind::Lt
                    }
                }
                '>' => {
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::GtEq
                    } else {
                        TokenKind::Gt
                    }
                }
                '&' if self.peek() == Some('&') => {
                    self.advance();
                    TokenKind::AndAnd
                }
                '|' if self.peek() == Some('|') => {
                    self.advance();
                    TokenKind::OrOr
                }
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '{' => TokenKind::LBrace,
                '}' => TokenKind::RBrace,
                '[' => TokenKind::LBracket,
                ']' => TokenKind::RBracket,
                ',' => TokenKind::Comma,
                ';' => TokenKind::Semicolon,
                '.' => TokenKind::Dot,
                _ => {
                    let span = self.make_span();
                    self.report(Error::IllegalCharacter { ch: c, span });
                    continue;
                }
            };

            return Some(self.make_token(kind));
        }
    }

    /// Tokenize the entire source and return all tokens
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        log::debug!(
            "lexed {} tokens over {} lines ({} lexical errors)",
            tokens.len(),
            self.line,
            self.errors.len()
        );
        tokens
    }

    /// Lexical errors recorded so far
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<Error> {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_var_declaration() {
        assert_eq!(
            kinds("var x = 1 + 2;"),
            vec![
                TokenKind::Var,
                TokenKind::Identifier("x".to_string()),
                TokenKind::Assign,
                TokenKind::Number(1),
                TokenKind::Plus,
                TokenKind::Number(2),
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn test_keywords() {
        let tokens = kinds("var let const for while if else function return break continue");

        assert!(matches!(tokens[0], TokenKind::Var));
        assert!(matches!(tokens[1], TokenKind::Let));
        assert!(matches!(tokens[2], TokenKind::Const));
        assert!(matches!(tokens[3], TokenKind::For));
        assert!(matches!(tokens[4], TokenKind::While));
        assert!(matches!(tokens[5], TokenKind::If));
        assert!(matches!(tokens[6], TokenKind::Else));
        assert!(matches!(tokens[7], TokenKind::Function));
        assert!(matches!(tokens[8], TokenKind::Return));
        assert!(matches!(tokens[9], TokenKind::Break));
        assert!(matches!(tokens[10], TokenKind::Continue));
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        let tokens = kinds("format iffy variable prompt true");
        assert!(tokens.iter().all(|k| matches!(k, TokenKind::Identifier(_))));
    }

    #[test]
    fn test_console_log() {
        let tokens = kinds("console.log(x) console.logger console.error");

        assert!(matches!(tokens[0], TokenKind::ConsoleLog));
        assert!(matches!(tokens[1], TokenKind::LParen));
        assert!(matches!(tokens[4], TokenKind::Identifier(ref s) if s == "console"));
        assert!(matches!(tokens[5], TokenKind::Dot));
        assert!(matches!(tokens[6], TokenKind::Identifier(ref s) if s == "logger"));
        assert!(matches!(tokens[7], TokenKind::Identifier(ref s) if s == "console"));
    }

    #[test]
    fn test_multi_char_operators() {
        assert_eq!(
            kinds("== != <= >= && || = < > !"),
            vec![
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Assign,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Not,
            ]
        );
    }

    #[test]
    fn test_negative_number_is_two_tokens() {
        assert_eq!(kinds("-5"), vec![TokenKind::Minus, TokenKind::Number(5)]);
    }

    #[test]
    fn test_strings() {
        let tokens = kinds(r#""hello" "say \"hi\"\n""#);

        assert!(matches!(tokens[0], TokenKind::String(ref s) if s == "hello"));
        assert!(matches!(tokens[1], TokenKind::String(ref s) if s == r#"say \"hi\"\n"#));
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("\"abc\nx");
        let tokens = lexer.tokenize();

        assert!(matches!(tokens[0].kind, TokenKind::String(ref s) if s == "abc"));
        assert!(matches!(tokens[1].kind, TokenKind::Identifier(ref s) if s == "x"));
        assert!(matches!(lexer.errors()[0], Error::UnterminatedString { .. }));
    }

    #[test]
    fn test_illegal_character_skipped() {
        let mut lexer = Lexer::new("var @x = 1;\n#");
        let tokens = lexer.tokenize();

        assert_eq!(tokens.len(), 5);
        assert!(matches!(tokens[1].kind, TokenKind::Identifier(ref s) if s == "x"));

        let errors = lexer.into_errors();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], Error::IllegalCharacter { ch: '@', span } if span.line == 1));
        assert!(matches!(errors[1], Error::IllegalCharacter { ch: '#', span } if span.line == 2));
    }

    #[test]
    fn test_lone_ampersand_is_illegal() {
        let mut lexer = Lexer::new("a & b");
        let tokens = lexer.tokenize();
        assert_eq!(tokens.len(), 2);
        assert_eq!(lexer.errors().len(), 1);
    }

    #[test]
    fn test_number_overflow() {
        let mut lexer = Lexer::new("99999999999999999999 1");
        let tokens = lexer.tokenize();
        assert_eq!(tokens.len(), 1);
        assert!(matches!(lexer.errors()[0], Error::NumberOverflow { .. }));
    }

    #[test]
    fn test_comments_and_lines() {
        let tokens = Lexer::new("// header\nvar a; /* multi\nline */ a").tokenize();

        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].span.line, 2);
        assert_eq!(tokens[3].span.line, 3);
    }

    #[test]
    fn test_spans() {
        let tokens = Lexer::new("while (count)").tokenize();
        assert_eq!(tokens[0].span, Span::new(0, 5, 1));
        assert_eq!(tokens[1].span, Span::new(6, 7, 1));
        assert_eq!(tokens[2].span, Span::new(7, 12, 1));
    }
}
