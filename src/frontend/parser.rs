//! Parser for jspy
//!
//! Recursive descent with one token of lookahead plus `peek()` at the
//! token after it. Binary tiers fold left to right; assignment is right
//! associative. The grammar is written out in `docs/GRAMMAR.md`.
//!
//! Any unexpected token or early end of input aborts the parse, as does
//! nesting past `MAX_NESTING_DEPTH`. The later stages recurse over the
//! tree, so that limit bounds them too.

use crate::frontend::ast::*;
use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Result};

/// Deepest nesting the parser accepts
pub const MAX_NESTING_DEPTH: usize = 256;

/// The parser
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Open blocks, groups and operands around the current position
    depth: usize,
}

impl Parser {
    /// Create a parser from pre-tokenized input
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    // ==================== Helper Methods ====================

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> Option<&TokenKind> {
        self.current().map(|t| &t.kind)
    }

    /// The token after the current one
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind()
            .map_or(false, |k| std::mem::discriminant(k) == std::mem::discriminant(kind))
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Error for the current position: a bad token, or running out of tokens
    fn unexpected(&self, expected: &str) -> Error {
        match self.current() {
            Some(token) => Error::UnexpectedToken {
                expected: expected.to_string(),
                got: token.kind.to_string(),
                span: token.span,
            },
            None => Error::UnexpectedEof {
                expected: expected.to_string(),
            },
        }
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token> {
        if self.check(&expected) {
            self.advance().ok_or_else(|| self.unexpected(&expected.to_string()))
        } else {
            Err(self.unexpected(&expected.to_string()))
        }
    }

    fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn too_deep(&self) -> Error {
        Error::NestingTooDeep {
            limit: MAX_NESTING_DEPTH,
            span: self.current().map(|t| t.span).unwrap_or_default(),
        }
    }

    /// Run `parse` one nesting level down
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.too_deep());
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// A left-folded operator chain adds one tree level per operator
    fn check_chain(&self, length: usize) -> Result<()> {
        if self.depth + length > MAX_NESTING_DEPTH {
            return Err(self.too_deep());
        }
        Ok(())
    }

    fn parse_ident(&mut self) -> Result<String> {
        match self.current_kind() {
            Some(TokenKind::Identifier(name)) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    // ==================== Statements ====================

    /// Parse a complete program; every token is consumed on success
    pub fn parse_program(&mut self) -> Result<Program> {
        let mut body = Vec::new();

        while !self.is_at_end() {
            body.push(self.parse_stmt()?);
        }

        log::debug!("parsed {} top-level statements", body.len());
        Ok(Program { body })
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        match self.current_kind() {
            Some(kind) if kind.is_declaration() => {
                let decl = self.parse_var_decl()?;
                self.consume(&TokenKind::Semicolon);
                Ok(Stmt::VarDeclaration(decl))
            }
            Some(TokenKind::While) => self.parse_while(),
            Some(TokenKind::For) => self.parse_for(),
            Some(TokenKind::If) => self.parse_if(),
            Some(TokenKind::Function) => self.parse_function(),
            Some(TokenKind::Return) => self.parse_return(),
            Some(TokenKind::Break) => {
                self.advance();
                self.consume(&TokenKind::Semicolon);
                Ok(Stmt::Break)
            }
            Some(TokenKind::Continue) => {
                self.advance();
                self.consume(&TokenKind::Semicolon);
                Ok(Stmt::Continue)
            }
            _ => {
                let expr = self.parse_expr()?;
                self.consume(&TokenKind::Semicolon);
                Ok(Stmt::Expression(expr))
            }
        }
    }

    /// `var`/`let`/`const` IDENT (`=` expr)? without the terminator
    fn parse_var_decl(&mut self) -> Result<VarDecl> {
        let kind = match self.current_kind() {
            Some(TokenKind::Var) => DeclKind::Var,
            Some(TokenKind::Let) => DeclKind::Let,
            Some(TokenKind::Const) => DeclKind::Const,
            _ => return Err(self.unexpected("variable declaration")),
        };
        self.advance();

        let name = self.parse_ident()?;
        let init = if self.consume(&TokenKind::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(VarDecl { kind, name, init })
    }

    fn parse_while(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_block()?;

        Ok(Stmt::While(WhileStmt { condition, body }))
    }

    fn parse_for(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::For)?;
        self.expect(TokenKind::LParen)?;

        let init = self.parse_var_decl()?;
        self.expect(TokenKind::Semicolon)?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::Semicolon)?;
        let update = self.parse_expr()?;

        self.expect(TokenKind::RParen)?;
        let body = self.parse_block()?;

        Ok(Stmt::For(ForStmt {
            init,
            condition,
            update,
            body,
        }))
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let then_block = self.parse_block()?;

        let else_block = if self.consume(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                Some(Block {
                    stmts: vec![self.nested(Self::parse_if)?],
                })
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        Ok(Stmt::If(IfStmt {
            condition,
            then_block,
            else_block,
        }))
    }

    fn parse_function(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::Function)?;
        let name = self.parse_ident()?;

        self.expect(TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen)?;

        let body = self.parse_block()?;

        Ok(Stmt::FunctionDeclaration(FunctionDecl { name, params, body }))
    }

    fn parse_params(&mut self) -> Result<Vec<String>> {
        let mut params = Vec::new();

        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.parse_ident()?);
                if !self.consume(&TokenKind::Comma) {
                    break;
                }
            }
        }

        Ok(params)
    }

    fn parse_return(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::Return)?;

        let value = match self.current_kind() {
            None | Some(TokenKind::Semicolon) | Some(TokenKind::RBrace) => None,
            Some(_) => Some(self.parse_expr()?),
        };
        self.consume(&TokenKind::Semicolon);

        Ok(Stmt::Return(ReturnStmt { value }))
    }

    fn parse_block(&mut self) -> Result<Block> {
        self.expect(TokenKind::LBrace)?;

        let stmts = self.nested(|p| {
            let mut stmts = Vec::new();
            while !p.check(&TokenKind::RBrace) && !p.is_at_end() {
                stmts.push(p.parse_stmt()?);
            }
            Ok(stmts)
        })?;

        self.expect(TokenKind::RBrace)?;
        Ok(Block { stmts })
    }

    // ==================== Expressions ====================

    fn parse_expr(&mut self) -> Result<Expr> {
        self.nested(Self::parse_assignment)
    }

    fn parse_assignment(&mut self) -> Result<Expr> {
        let target = self.parse_or()?;

        if self.check(&TokenKind::Assign) {
            let eq = self.advance().ok_or_else(|| self.unexpected("'='"))?;
            let value = self.nested(Self::parse_assignment)?;

            return match target {
                Expr::Identifier(_) | Expr::Index { .. } => Ok(Expr::Assignment {
                    target: Box::new(target),
                    value: Box::new(value),
                }),
                _ => Err(Error::InvalidAssignmentTarget { span: eq.span }),
            };
        }

        Ok(target)
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_and()?;
        let mut chain = 0;

        while self.check(&TokenKind::OrOr) {
            chain += 1;
            self.check_chain(chain)?;
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Logical {
                op: LogicalOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_comparison()?;
        let mut chain = 0;

        while self.check(&TokenKind::AndAnd) {
            chain += 1;
            self.check_chain(chain)?;
            self.advance();
            let right = self.parse_comparison()?;
            left = Expr::Logical {
                op: LogicalOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let mut left = self.parse_additive()?;
        let mut chain = 0;

        while let Some(op) = self.current_kind().and_then(comparison_op) {
            chain += 1;
            self.check_chain(chain)?;
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut left = self.parse_multiplicative()?;
        let mut chain = 0;

        while let Some(op) = self.current_kind().and_then(additive_op) {
            chain += 1;
            self.check_chain(chain)?;
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        let mut chain = 0;

        while let Some(op) = self.current_kind().and_then(multiplicative_op) {
            chain += 1;
            self.check_chain(chain)?;
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let op = match self.current_kind() {
            Some(TokenKind::Minus) => UnaryOp::Neg,
            Some(TokenKind::Not) => UnaryOp::Not,
            _ => return self.parse_postfix(),
        };
        self.advance();

        let operand = self.nested(Self::parse_unary)?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        let mut chain = 0;

        loop {
            if self.check(&TokenKind::Dot) || self.check(&TokenKind::LBracket) {
                chain += 1;
                self.check_chain(chain)?;
            }

            if self.consume(&TokenKind::Dot) {
                let property = self.parse_ident()?;
                if self.check(&TokenKind::LParen) {
                    // Method calls have no counterpart here
                    return Err(self.unexpected("end of property access"));
                }
                expr = Expr::Property {
                    object: Box::new(expr),
                    property,
                };
            } else if self.consume(&TokenKind::LBracket) {
                let index = self.parse_expr()?;
                self.expect(TokenKind::RBracket)?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let kind = match self.current_kind() {
            Some(kind) => kind.clone(),
            None => return Err(self.unexpected("expression")),
        };

        match kind {
            TokenKind::Number(value) => {
                self.advance();
                Ok(Expr::Number(value))
            }
            TokenKind::String(value) => {
                self.advance();
                Ok(Expr::String(value))
            }
            TokenKind::Identifier(name) => {
                let is_call = self
                    .peek()
                    .map_or(false, |t| t.kind == TokenKind::LParen);
                if is_call {
                    return self.parse_call(name);
                }
                self.advance();
                Ok(if name == "true" {
                    Expr::Boolean(true)
                } else if name == "false" {
                    Expr::Boolean(false)
                } else {
                    Expr::Identifier(name)
                })
            }
            TokenKind::ConsoleLog => self.parse_call("console.log".to_string()),
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                while !self.check(&TokenKind::RBracket) && !self.is_at_end() {
                    elements.push(self.parse_expr()?);
                    if !self.consume(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RBracket)?;
                Ok(Expr::Array(elements))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    /// Current token is the callee name
    fn parse_call(&mut self, callee: String) -> Result<Expr> {
        self.advance();
        self.expect(TokenKind::LParen)?;

        let mut args = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            args.push(self.parse_expr()?);
            if !self.consume(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;

        Ok(Expr::Call { callee, args })
    }
}

fn comparison_op(kind: &TokenKind) -> Option<BinOp> {
    match kind {
        TokenKind::EqEq => Some(BinOp::Eq),
        TokenKind::NotEq => Some(BinOp::Ne),
        TokenKind::Lt => Some(BinOp::Lt),
        TokenKind::Gt => Some(BinOp::Gt),
        TokenKind::LtEq => Some(BinOp::Le),
        TokenKind::GtEq => Some(BinOp::Ge),
        _ => None,
    }
}

fn additive_op(kind: &TokenKind) -> Option<BinOp> {
    match kind {
        TokenKind::Plus => Some(BinOp::Add),
        TokenKind::Minus => Some(BinOp::Sub),
        _ => None,
    }
}

fn multiplicative_op(kind: &TokenKind) -> Option<BinOp> {
    match kind {
        TokenKind::Star => Some(BinOp::Mul),
        TokenKind::Slash => Some(BinOp::Div),
        TokenKind::Percent => Some(BinOp::Mod),
        _ => None,
    }
}
