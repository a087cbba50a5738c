//! AST shapes consumed by the type checker.
//!
//! These types model the standard forms of the source dialect's grammar
//! (mirroring the usual `ast` module of such a dialect). Building these nodes
//! from source text is the job of an upstream parser and is out of scope
//! here; this crate only ever consumes already-built values.
mod expr;
mod stmt;

pub use expr::*;
pub use stmt::*;

/// A location within a source file, as handed down from the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub lineno: usize,
    pub col_offset: usize,
}

impl Position {
    pub fn new(lineno: usize, col_offset: usize) -> Self {
        Self { lineno, col_offset }
    }
}

/// Top-level compilation unit handed to the checker, mirroring the `mod_ty`
/// variants of the source dialect's grammar (`Module`, `Interactive`,
/// `Expression`, `Suite`).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind")]
pub enum Mod {
    /// A sequence of statements read from a file.
    Module { body: Vec<Stmt> },
    /// A sequence of statements read from an interactive prompt (REPL).
    Interactive { body: Vec<Stmt> },
    /// A single expression, e.g. `eval()`-style input.
    Expression { body: Expr },
    /// Only ever produced internally by the compiler; never legal input here.
    Suite { body: Vec<Stmt> },
}
