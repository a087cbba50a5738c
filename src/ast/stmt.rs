use super::{BinOpKind, Expr, Position};

/// A statement node, mirroring the dialect's standard `stmt_ty` forms.
///
/// `FunctionDef`, `ClassDef`, `Return`, `For`, `While`, `Assert`, `Global`,
/// and `Nonlocal` are legal parser output with no judgment rule in the
/// checked subset; they are rejected as `Unimplemented`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind")]
pub enum Stmt {
    /// `target [: type_annotation] = value`. An annotation present makes
    /// this a declaration; absent, a reassignment. `target` is a single
    /// expression — the source dialect allows a target list, but this
    /// crate only accepts a single target (multi-target assignment is
    /// rejected as `MultipleTargets`); the `targets` field mirrors the
    /// grammar so that shape is representable and checkable.
    Assign {
        targets: Vec<Expr>,
        value: Expr,
        type_annotation: Option<Expr>,
        position: Position,
    },
    /// `target op= value`.
    AugAssign {
        target: Expr,
        op: BinOpKind,
        value: Expr,
        position: Position,
    },
    If {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
        position: Position,
    },
    /// An expression evaluated for its side effects; its type is computed
    /// and discarded.
    Expr {
        value: Expr,
        position: Position,
    },
    Break {
        position: Position,
    },
    Continue {
        position: Position,
    },

    // Reserved / unimplemented statement forms.
    FunctionDef {
        position: Position,
    },
    ClassDef {
        position: Position,
    },
    Return {
        position: Position,
    },
    For {
        position: Position,
    },
    While {
        position: Position,
    },
    Assert {
        position: Position,
    },
    Global {
        position: Position,
    },
    Nonlocal {
        position: Position,
    },
}

impl Stmt {
    pub fn position(&self) -> Position {
        match self {
            Stmt::Assign { position, .. }
            | Stmt::AugAssign { position, .. }
            | Stmt::If { position, .. }
            | Stmt::Expr { position, .. }
            | Stmt::Break { position }
            | Stmt::Continue { position }
            | Stmt::FunctionDef { position }
            | Stmt::ClassDef { position }
            | Stmt::Return { position }
            | Stmt::For { position }
            | Stmt::While { position }
            | Stmt::Assert { position }
            | Stmt::Global { position }
            | Stmt::Nonlocal { position } => *position,
        }
    }
}
