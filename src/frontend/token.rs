//! Token definitions for jspy

use serde::Serialize;
use std::fmt;

use crate::utils::Span;

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Token kinds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenKind {
    // ============ Keywords ============
    /// var
    Var,
    /// let
    Let,
    /// const
    Const,
    /// for
    For,
    /// while
    While,
    /// if
    If,
    /// else
    Else,
    /// function
    Function,
    /// return
    Return,
    /// break
    Break,
    /// continue
    Continue,

    /// console.log, lexed as one unit
    ConsoleLog,

    // ============ Literals ============
    Identifier(String),
    Number(i64),
    /// Text between the quotes, escapes kept as written
    String(String),

    // ============ Operators ============
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// =
    Assign,
    /// ==
    EqEq,
    /// !=
    NotEq,
    /// <
    Lt,
    /// >
    Gt,
    /// <=
    LtEq,
    /// >=
    GtEq,
    /// &&
    AndAnd,
    /// ||
    OrOr,
    /// !
    Not,

    // ============ Punctuation ============
    /// (
    LParen,
    /// )
    RParen,
    /// {
    LBrace,
    /// }
    RBrace,
    /// [
    LBracket,
    /// ]
    RBracket,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// .
    Dot,
}

impl TokenKind {
    /// Reclassify an identifier lexeme as a keyword
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        match s {
            "var" => Some(TokenKind::Var),
            "let" => Some(TokenKind::Let),
            "const" => Some(TokenKind::Const),
            "for" => Some(TokenKind::For),
            "while" => Some(TokenKind::While),
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            "function" => Some(TokenKind::Function),
            "return" => Some(TokenKind::Return),
            "break" => Some(TokenKind::Break),
            "continue" => Some(TokenKind::Continue),
            _ => None,
        }
    }

    /// Whether this token starts a variable declaration
    pub fn is_declaration(&self) -> bool {
        matches!(self, TokenKind::Var | TokenKind::Let | TokenKind::Const)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Var => "'var'",
            TokenKind::Let => "'let'",
            TokenKind::Const => "'const'",
            TokenKind::For => "'for'",
            TokenKind::While => "'while'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::Function => "'function'",
            TokenKind::Return => "'return'",
            TokenKind::Break => "'break'",
            TokenKind::Continue => "'continue'",
            TokenKind::ConsoleLog => "'console.log'",
            TokenKind::Identifier(name) => return write!(f, "identifier '{}'", name),
            TokenKind::Number(n) => return write!(f, "number {}", n),
            TokenKind::String(s) => return write!(f, "string \"{}\"", s),
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Assign => "'='",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::LtEq => "'<='",
            TokenKind::GtEq => "'>='",
            TokenKind::AndAnd => "'&&'",
            TokenKind::OrOr => "'||'",
            TokenKind::Not => "'!'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::Dot => "'.'",
        };
        f.write_str(text)
    }
}
