use std::fmt::Display;

use super::Position;

/// A numeric literal's payload. Only `Int` and `Float` are recognized by the
/// checker; `Other` exists so a parser that accepts e.g. complex literals can
/// still hand them down and have them rejected cleanly.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum NumKind {
    Int(i64),
    Float(f64),
    Other,
}

/// The payload of a `NameConstant` node. Only `Bool` is recognized; `None`
/// is the dialect's null literal and is rejected.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum NameConstantKind {
    Bool(bool),
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BoolOpKind {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BinOpKind {
    Add,
    Sub,
    Mult,
    MatMult,
    Div,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
    FloorDiv,
}

impl Display for BinOpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BinOpKind::Add => "+",
            BinOpKind::Sub => "-",
            BinOpKind::Mult => "*",
            BinOpKind::MatMult => "@",
            BinOpKind::Div => "/",
            BinOpKind::Mod => "%",
            BinOpKind::Pow => "**",
            BinOpKind::LShift => "<<",
            BinOpKind::RShift => ">>",
            BinOpKind::BitOr => "|",
            BinOpKind::BitXor => "^",
            BinOpKind::BitAnd => "&",
            BinOpKind::FloorDiv => "//",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum UnaryOpKind {
    Invert,
    Not,
    UAdd,
    USub,
}

impl Display for UnaryOpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UnaryOpKind::Invert => "~",
            UnaryOpKind::Not => "not",
            UnaryOpKind::UAdd => "+",
            UnaryOpKind::USub => "-",
        };
        f.write_str(s)
    }
}

/// A comparison operator, carried only so that `Compare` nodes can be
/// represented and rejected as `Unimplemented` (comparisons are not part of
/// the checked subset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CmpOpKind {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

/// An expression node, mirroring the dialect's standard `expr_ty` forms.
///
/// Every variant the checker actually judges a type for is elaborated in
/// the statement/expression judgment rules; the remaining variants
/// (`Compare`, `Call`, `Attribute`, `Subscript`, `Tuple`, `Set`,
/// `FormattedValue`, `Bytes`) are legal parser output that falls outside the
/// checked subset and is rejected as `Unimplemented`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind")]
pub enum Expr {
    Num {
        value: NumKind,
        position: Position,
    },
    Str {
        value: String,
        position: Position,
    },
    JoinedStr {
        values: Vec<Expr>,
        position: Position,
    },
    Name {
        id: String,
        position: Position,
    },
    NameConstant {
        value: NameConstantKind,
        position: Position,
    },
    BoolOp {
        op: BoolOpKind,
        values: Vec<Expr>,
        position: Position,
    },
    BinOp {
        left: Box<Expr>,
        op: BinOpKind,
        right: Box<Expr>,
        position: Position,
    },
    UnaryOp {
        op: UnaryOpKind,
        operand: Box<Expr>,
        position: Position,
    },
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
        position: Position,
    },
    List {
        elts: Vec<Expr>,
        position: Position,
    },
    Dict {
        keys: Vec<Expr>,
        values: Vec<Expr>,
        position: Position,
    },

    // Standard forms present in the full grammar but outside the checked
    // subset. Always rejected as `Unimplemented`.
    Compare {
        left: Box<Expr>,
        ops: Vec<CmpOpKind>,
        comparators: Vec<Expr>,
        position: Position,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        position: Position,
    },
    Attribute {
        value: Box<Expr>,
        attr: String,
        position: Position,
    },
    Subscript {
        value: Box<Expr>,
        slice: Box<Expr>,
        position: Position,
    },
    Tuple {
        elts: Vec<Expr>,
        position: Position,
    },
    Set {
        elts: Vec<Expr>,
        position: Position,
    },
    FormattedValue {
        value: Box<Expr>,
        position: Position,
    },
    Bytes {
        value: Vec<u8>,
        position: Position,
    },

    /// The `...` literal. Not itself a judged expression; its only legal use
    /// is as the type annotation of an `Assign`, where it means "infer the
    /// declared type from the right-hand side".
    Ellipsis {
        position: Position,
    },
}

impl Expr {
    pub fn position(&self) -> Position {
        match self {
            Expr::Num { position, .. }
            | Expr::Str { position, .. }
            | Expr::JoinedStr { position, .. }
            | Expr::Name { position, .. }
            | Expr::NameConstant { position, .. }
            | Expr::BoolOp { position, .. }
            | Expr::BinOp { position, .. }
            | Expr::UnaryOp { position, .. }
            | Expr::IfExp { position, .. }
            | Expr::List { position, .. }
            | Expr::Dict { position, .. }
            | Expr::Compare { position, .. }
            | Expr::Call { position, .. }
            | Expr::Attribute { position, .. }
            | Expr::Subscript { position, .. }
            | Expr::Tuple { position, .. }
            | Expr::Set { position, .. }
            | Expr::FormattedValue { position, .. }
            | Expr::Bytes { position, .. }
            | Expr::Ellipsis { position } => *position,
        }
    }
}
