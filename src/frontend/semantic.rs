//! Semantic Analysis for jspy
//!
//! Performs:
//! - Symbol table management (declarations, built-ins, parameters)
//! - Declared-before-use and initialized-before-use checks
//! - Call target and argument count checks
//!
//! Analysis is best-effort: every problem is recorded and the walk goes on.

use std::collections::HashMap;

use crate::frontend::ast::*;
use crate::utils::{Error, NameKind, Result};

// ==================== Symbol Table ====================

/// How many arguments a function takes
#[derive(Debug, Clone, PartialEq)]
pub enum Arity {
    /// Exactly these parameters
    Fixed(Vec<String>),
    /// Any number of arguments
    Variadic,
}

/// Kind of symbol
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    Variable { initialized: bool },
    Function { arity: Arity },
    /// Built-in literal names (`true`, `false`)
    Literal,
}

/// Symbol information
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn variable(name: &str, initialized: bool) -> Self {
        Self {
            name: name.to_string(),
            kind: SymbolKind::Variable { initialized },
        }
    }

    pub fn function(name: &str, arity: Arity) -> Self {
        Self {
            name: name.to_string(),
            kind: SymbolKind::Function { arity },
        }
    }

    fn name_kind(&self) -> NameKind {
        match self.kind {
            SymbolKind::Function { .. } => NameKind::Function,
            SymbolKind::Variable { .. } | SymbolKind::Literal => NameKind::Variable,
        }
    }
}

/// Symbol table: one global scope shared by the whole program, function
/// bodies included. Entries are never removed during a run.
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            symbols: HashMap::new(),
        }
    }

    /// Table seeded with the built-in names
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        let builtins = [
            Symbol::function("input", Arity::Fixed(vec!["message".to_string()])),
            Symbol::function("console.log", Arity::Variadic),
            Symbol::function("prompt", Arity::Fixed(vec!["message".to_string()])),
            Symbol {
                name: "true".to_string(),
                kind: SymbolKind::Literal,
            },
            Symbol {
                name: "false".to_string(),
                kind: SymbolKind::Literal,
            },
        ];
        for symbol in builtins {
            table.symbols.insert(symbol.name.clone(), symbol);
        }
        table
    }

    /// Define a symbol. An existing entry is left as is.
    pub fn define(&mut self, symbol: Symbol) -> Result<()> {
        if self.symbols.contains_key(&symbol.name) {
            return Err(Error::Redeclared {
                kind: symbol.name_kind(),
                name: symbol.name,
            });
        }
        self.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// Mark a variable as initialized
    pub fn mark_initialized(&mut self, name: &str) {
        if let Some(Symbol {
            kind: SymbolKind::Variable { initialized },
            ..
        }) = self.symbols.get_mut(name)
        {
            *initialized = true;
        }
    }

    /// Number of entries, built-ins included
    fn len(&self) -> usize {
        self.symbols.len()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

// ==================== Analyzer ====================

/// Walks a program once and collects every semantic problem found
pub struct SemanticAnalyzer {
    symbols: SymbolTable,
    errors: Vec<Error>,
    loop_depth: usize,
    function_depth: usize,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::with_builtins(),
            errors: Vec::new(),
            loop_depth: 0,
            function_depth: 0,
        }
    }

    /// Analyze a program, returning diagnostics in traversal order.
    /// An empty list means the program passed.
    pub fn analyze(&mut self, program: &Program) -> Vec<Error> {
        for stmt in &program.body {
            self.visit_stmt(stmt);
        }
        log::debug!(
            "semantic analysis found {} problem(s), {} symbol(s) defined",
            self.errors.len(),
            self.symbols.len()
        );
        std::mem::take(&mut self.errors)
    }

    fn report(&mut self, error: Error) {
        self.errors.push(error);
    }

    fn visit_block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.visit_stmt(stmt);
        }
    }

    fn visit_loop_body(&mut self, body: &Block) {
        self.loop_depth += 1;
        self.visit_block(body);
        self.loop_depth -= 1;
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::VarDeclaration(decl) => self.visit_var_decl(decl),
            Stmt::FunctionDeclaration(func) => self.visit_function(func),
            Stmt::If(i) => {
                self.visit_expr(&i.condition);
                self.visit_block(&i.then_block);
                if let Some(else_block) = &i.else_block {
                    self.visit_block(else_block);
                }
            }
            Stmt::While(w) => {
                self.visit_expr(&w.condition);
                self.visit_loop_body(&w.body);
            }
            Stmt::For(f) => {
                self.visit_var_decl(&f.init);
                self.visit_expr(&f.condition);
                self.visit_expr(&f.update);
                self.visit_loop_body(&f.body);
            }
            Stmt::Return(r) => {
                if self.function_depth == 0 {
                    self.report(Error::ReturnOutsideFunction);
                }
                if let Some(value) = &r.value {
                    self.visit_expr(value);
                }
            }
            Stmt::Break => self.check_in_loop("break"),
            Stmt::Continue => self.check_in_loop("continue"),
            Stmt::Expression(expr) => self.visit_expr(expr),
        }
    }

    fn check_in_loop(&mut self, keyword: &'static str) {
        if self.loop_depth == 0 {
            self.report(Error::JumpOutsideLoop { keyword });
        }
    }

    fn visit_var_decl(&mut self, decl: &VarDecl) {
        if let Err(e) = self.symbols.define(Symbol::variable(&decl.name, false)) {
            self.report(e);
        }
        if let Some(init) = &decl.init {
            self.visit_expr(init);
            self.symbols.mark_initialized(&decl.name);
        }
    }

    fn visit_function(&mut self, func: &FunctionDecl) {
        // Declared before the body so recursive calls resolve
        let symbol = Symbol::function(&func.name, Arity::Fixed(func.params.clone()));
        if let Err(e) = self.symbols.define(symbol) {
            self.report(e);
        }

        // Parameters share the global table and always hold a value
        for param in &func.params {
            if let Err(e) = self.symbols.define(Symbol::variable(param, true)) {
                self.report(e);
            }
            self.symbols.mark_initialized(param);
        }

        let outer_loops = std::mem::replace(&mut self.loop_depth, 0);
        self.function_depth += 1;
        self.visit_block(&func.body);
        self.function_depth -= 1;
        self.loop_depth = outer_loops;
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Identifier(name) => self.check_use(name),
            Expr::Assignment { target, value } => match target.as_ref() {
                Expr::Identifier(name) => {
                    if self.symbols.lookup(name).is_none() {
                        self.report(Error::UndeclaredAssignment { name: name.clone() });
                    }
                    self.visit_expr(value);
                    self.symbols.mark_initialized(name);
                }
                other => {
                    self.visit_expr(other);
                    self.visit_expr(value);
                }
            },
            Expr::Logical { left, right, .. } | Expr::Binary { left, right, .. } => {
                self.visit_expr(left);
                self.visit_expr(right);
            }
            Expr::Unary { operand, .. } => self.visit_expr(operand),
            Expr::Call { callee, args } => {
                self.check_call(callee, args.len());
                for arg in args {
                    self.visit_expr(arg);
                }
            }
            Expr::Number(_) | Expr::String(_) | Expr::Boolean(_) => {}
            Expr::Array(elements) => {
                for element in elements {
                    self.visit_expr(element);
                }
            }
            Expr::Index { object, index } => {
                self.visit_expr(object);
                self.visit_expr(index);
            }
            Expr::Property { object, .. } => self.visit_expr(object),
        }
    }

    fn check_use(&mut self, name: &str) {
        let error = match self.symbols.lookup(name) {
            None => Error::UndeclaredVariable {
                name: name.to_string(),
            },
            Some(Symbol {
                kind: SymbolKind::Variable { initialized: false },
                ..
            }) => Error::UninitializedVariable {
                name: name.to_string(),
            },
            Some(_) => return,
        };
        self.report(error);
    }

    fn check_call(&mut self, callee: &str, got: usize) {
        let error = match self.symbols.lookup(callee) {
            Some(Symbol {
                kind: SymbolKind::Function { arity },
                ..
            }) => match arity {
                Arity::Fixed(params) if params.len() != got => Error::ArgCountMismatch {
                    name: callee.to_string(),
                    expected: params.len(),
                    got,
                },
                _ => return,
            },
            _ => Error::UndeclaredFunction {
                name: callee.to_string(),
            },
        };
        self.report(error);
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
