//! Python Code Generator
//!
//! One output line per statement, one inline fragment per expression.
//! The indentation level is passed down explicitly to every statement
//! emitter.

use crate::backend::codegen::CodeGen;
use crate::frontend::ast::*;
use crate::utils::{Error, Result};

/// Python binding strength, loosest first
const PREC_OR: u8 = 1;
const PREC_AND: u8 = 2;
const PREC_NOT: u8 = 3;
const PREC_CMP: u8 = 4;
const PREC_ADD: u8 = 5;
const PREC_MUL: u8 = 6;
const PREC_NEG: u8 = 7;
const PREC_ATOM: u8 = 8;

/// Enclosing loop, innermost last
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopKind {
    While,
    /// A `for` rewritten to `while`; its update line trails the body
    DesugaredFor,
}

/// Python code generator
pub struct PyCodeGen {
    indent_width: usize,
    lines: Vec<String>,
    loops: Vec<LoopKind>,
}

impl PyCodeGen {
    pub fn new() -> Self {
        Self {
            indent_width: 4,
            lines: Vec::new(),
            loops: Vec::new(),
        }
    }

    /// Spaces per indentation level
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    /// Generate the output as separate lines
    pub fn generate_lines(&mut self, program: &Program) -> Result<Vec<String>> {
        self.lines.clear();
        self.loops.clear();

        for stmt in &program.body {
            self.emit_stmt(stmt, 0)?;
        }

        log::debug!("generated {} lines", self.lines.len());
        Ok(std::mem::take(&mut self.lines))
    }

    // --- Statements ---

    fn emit_stmt(&mut self, stmt: &Stmt, indent: usize) -> Result<()> {
        match stmt {
            Stmt::VarDeclaration(decl) => self.emit_var_decl(decl, indent),
            Stmt::FunctionDeclaration(func) => self.emit_function(func, indent),
            Stmt::If(i) => self.emit_if(i, indent, "if"),
            Stmt::While(w) => {
                let condition = self.expr(&w.condition)?;
                self.emit_line(indent, &format!("while {}:", condition));
                self.emit_loop_body(LoopKind::While, &w.body, indent + 1)
            }
            Stmt::For(f) => self.emit_for(f, indent),
            Stmt::Return(r) => {
                let line = match &r.value {
                    Some(value) => format!("return {}", self.expr(value)?),
                    None => "return".to_string(),
                };
                self.emit_line(indent, &line);
                Ok(())
            }
            Stmt::Break => {
                self.emit_line(indent, "break");
                Ok(())
            }
            Stmt::Continue => {
                if self.loops.last() == Some(&LoopKind::DesugaredFor) {
                    return Err(Error::Unsupported(
                        "'continue' directly inside a for loop".to_string(),
                    ));
                }
                self.emit_line(indent, "continue");
                Ok(())
            }
            Stmt::Expression(expr) => {
                let line = self.statement_expr(expr)?;
                self.emit_line(indent, &line);
                Ok(())
            }
        }
    }

    fn emit_var_decl(&mut self, decl: &VarDecl, indent: usize) -> Result<()> {
        let value = match &decl.init {
            Some(init) => self.statement_expr(init)?,
            None => "None".to_string(),
        };
        self.emit_line(indent, &format!("{} = {}", decl.name, value));
        Ok(())
    }

    fn emit_function(&mut self, func: &FunctionDecl, indent: usize) -> Result<()> {
        self.emit_line(indent, &format!("def {}({}):", func.name, func.params.join(", ")));

        // Loops outside the function do not enclose its body
        let outer = std::mem::take(&mut self.loops);
        let result = self.emit_block(&func.body, indent + 1);
        self.loops = outer;
        result
    }

    fn emit_if(&mut self, i: &IfStmt, indent: usize, keyword: &str) -> Result<()> {
        let condition = self.expr(&i.condition)?;
        self.emit_line(indent, &format!("{} {}:", keyword, condition));
        self.emit_block(&i.then_block, indent + 1)?;

        if let Some(block) = &i.else_block {
            if let [Stmt::If(nested)] = block.stmts.as_slice() {
                self.emit_if(nested, indent, "elif")?;
            } else {
                self.emit_line(indent, "else:");
                self.emit_block(block, indent + 1)?;
            }
        }
        Ok(())
    }

    /// init; while condition: body; update
    fn emit_for(&mut self, f: &ForStmt, indent: usize) -> Result<()> {
        self.emit_var_decl(&f.init, indent)?;

        let condition = self.expr(&f.condition)?;
        self.emit_line(indent, &format!("while {}:", condition));

        self.loops.push(LoopKind::DesugaredFor);
        let body = f
            .body
            .stmts
            .iter()
            .try_for_each(|stmt| self.emit_stmt(stmt, indent + 1));
        self.loops.pop();
        body?;

        let update = self.statement_expr(&f.update)?;
        self.emit_line(indent + 1, &update);
        Ok(())
    }

    fn emit_loop_body(&mut self, kind: LoopKind, body: &Block, indent: usize) -> Result<()> {
        self.loops.push(kind);
        let result = self.emit_block(body, indent);
        self.loops.pop();
        result
    }

    fn emit_block(&mut self, block: &Block, indent: usize) -> Result<()> {
        if block.stmts.is_empty() {
            self.emit_line(indent, "pass");
            return Ok(());
        }
        for stmt in &block.stmts {
            self.emit_stmt(stmt, indent)?;
        }
        Ok(())
    }

    fn emit_line(&mut self, indent: usize, text: &str) {
        let pad = " ".repeat(indent * self.indent_width);
        self.lines.push(format!("{}{}", pad, text));
    }

    // --- Expressions ---

    /// Expression in statement position, where assignments may chain
    fn statement_expr(&self, expr: &Expr) -> Result<String> {
        match expr {
            Expr::Assignment { target, value } => Ok(format!(
                "{} = {}",
                self.expr(target)?,
                self.statement_expr(value)?
            )),
            other => self.expr(other),
        }
    }

    fn expr(&self, expr: &Expr) -> Result<String> {
        Ok(self.expr_prec(expr)?.0)
    }

    /// Render `expr`, parenthesized when it binds looser than `min`
    fn operand(&self, expr: &Expr, min: u8) -> Result<String> {
        let (text, prec) = self.expr_prec(expr)?;
        if prec < min {
            Ok(format!("({})", text))
        } else {
            Ok(text)
        }
    }

    fn expr_prec(&self, expr: &Expr) -> Result<(String, u8)> {
        let rendered = match expr {
            Expr::Assignment { .. } => {
                return Err(Error::Unsupported(
                    "assignment used as a value".to_string(),
                ))
            }
            Expr::Logical { op, left, right } => {
                let (word, prec) = match op {
                    LogicalOp::And => ("and", PREC_AND),
                    LogicalOp::Or => ("or", PREC_OR),
                };
                let l = self.operand(left, prec)?;
                let r = self.operand(right, prec + 1)?;
                (format!("{} {} {}", l, word, r), prec)
            }
            Expr::Binary { op, left, right } => {
                let prec = match op {
                    BinOp::Add | BinOp::Sub => PREC_ADD,
                    BinOp::Mul | BinOp::Div | BinOp::Mod => PREC_MUL,
                    _ => PREC_CMP,
                };
                // Python chains comparisons, so neither side may be a bare comparison
                let left_min = if op.is_comparison() { prec + 1 } else { prec };
                let l = self.operand(left, left_min)?;
                let r = self.operand(right, prec + 1)?;
                (format!("{} {} {}", l, op.symbol(), r), prec)
            }
            Expr::Unary { op, operand } => match op {
                UnaryOp::Neg => (format!("-{}", self.operand(operand, PREC_NEG)?), PREC_NEG),
                UnaryOp::Not => (format!("not {}", self.operand(operand, PREC_NOT)?), PREC_NOT),
            },
            Expr::Call { callee, args } => {
                let name = match callee.as_str() {
                    "console.log" => "print",
                    "prompt" => "input",
                    other => other,
                };
                let args = args
                    .iter()
                    .map(|a| self.expr(a))
                    .collect::<Result<Vec<_>>>()?;
                (format!("{}({})", name, args.join(", ")), PREC_ATOM)
            }
            Expr::Identifier(name) => (name.clone(), PREC_ATOM),
            Expr::Number(value) => (value.to_string(), PREC_ATOM),
            Expr::String(value) => (format!("\"{}\"", value), PREC_ATOM),
            Expr::Boolean(value) => {
                let text = if *value { "True" } else { "False" };
                (text.to_string(), PREC_ATOM)
            }
            Expr::Array(elements) => {
                let elems = elements
                    .iter()
                    .map(|e| self.expr(e))
                    .collect::<Result<Vec<_>>>()?;
                (format!("[{}]", elems.join(", ")), PREC_ATOM)
            }
            Expr::Index { object, index } => (
                format!("{}[{}]", self.operand(object, PREC_ATOM)?, self.expr(index)?),
                PREC_ATOM,
            ),
            Expr::Property { object, property } => {
                if property != "length" {
                    return Err(Error::UnsupportedProperty {
                        property: property.clone(),
                    });
                }
                (format!("len({})", self.expr(object)?), PREC_ATOM)
            }
        };
        Ok(rendered)
    }
}

impl Default for PyCodeGen {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGen for PyCodeGen {
    fn generate(&mut self, program: &Program) -> Result<String> {
        Ok(self.generate_lines(program)?.join("\n"))
    }

    fn name(&self) -> &str {
        "python"
    }
}
