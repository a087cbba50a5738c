//! Diagnostics raised by the checker.
//!
//! Each [`TypeError`] variant wraps a small payload struct carrying the
//! specifics of that failure, plus the source location at which it was
//! raised. There are no warnings: the first error raised during a
//! top-level `validate` call aborts that call, and every variant
//! implements `Display`/`std::error::Error` by hand rather than through a
//! derive macro.
use std::{error::Error, fmt::Display};

use crate::ast::Position;
use crate::typechecker::types::Type;

#[derive(Debug, Clone)]
pub struct Located<T> {
    pub detail: T,
    pub filename: String,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub enum TypeError {
    UnknownTypeName(Located<UnknownTypeName>),
    IllegalTypeForm(Located<IllegalTypeForm>),
    IncompleteType(Located<IncompleteType>),
    Undefined(Located<Undefined>),
    Redeclared(Located<Redeclared>),
    ComplexLhs(Located<ComplexLhs>),
    MultipleTargets(Located<MultipleTargets>),
    DeclInNonRoot(Located<DeclInNonRoot>),
    TypeMismatch(Located<TypeMismatch>),
    UnrecognizedNumber(Located<UnrecognizedNumber>),
    UnrecognizedConstant(Located<UnrecognizedConstant>),
    Unimplemented(Located<Unimplemented>),
    InternalError(Located<InternalError>),
}

impl TypeError {
    pub fn position(&self) -> Position {
        self.located_position()
    }

    pub fn filename(&self) -> &str {
        self.located_filename()
    }

    fn located_position(&self) -> Position {
        match self {
            TypeError::UnknownTypeName(l) => l.position,
            TypeError::IllegalTypeForm(l) => l.position,
            TypeError::IncompleteType(l) => l.position,
            TypeError::Undefined(l) => l.position,
            TypeError::Redeclared(l) => l.position,
            TypeError::ComplexLhs(l) => l.position,
            TypeError::MultipleTargets(l) => l.position,
            TypeError::DeclInNonRoot(l) => l.position,
            TypeError::TypeMismatch(l) => l.position,
            TypeError::UnrecognizedNumber(l) => l.position,
            TypeError::UnrecognizedConstant(l) => l.position,
            TypeError::Unimplemented(l) => l.position,
            TypeError::InternalError(l) => l.position,
        }
    }

    fn located_filename(&self) -> &str {
        match self {
            TypeError::UnknownTypeName(l) => &l.filename,
            TypeError::IllegalTypeForm(l) => &l.filename,
            TypeError::IncompleteType(l) => &l.filename,
            TypeError::Undefined(l) => &l.filename,
            TypeError::Redeclared(l) => &l.filename,
            TypeError::ComplexLhs(l) => &l.filename,
            TypeError::MultipleTargets(l) => &l.filename,
            TypeError::DeclInNonRoot(l) => &l.filename,
            TypeError::TypeMismatch(l) => &l.filename,
            TypeError::UnrecognizedNumber(l) => &l.filename,
            TypeError::UnrecognizedConstant(l) => &l.filename,
            TypeError::Unimplemented(l) => &l.filename,
            TypeError::InternalError(l) => &l.filename,
        }
    }

    fn inner(&self) -> Box<dyn Error + '_> {
        match self {
            TypeError::UnknownTypeName(l) => Box::new(l.detail.clone()),
            TypeError::IllegalTypeForm(l) => Box::new(l.detail.clone()),
            TypeError::IncompleteType(l) => Box::new(l.detail.clone()),
            TypeError::Undefined(l) => Box::new(l.detail.clone()),
            TypeError::Redeclared(l) => Box::new(l.detail.clone()),
            TypeError::ComplexLhs(l) => Box::new(l.detail.clone()),
            TypeError::MultipleTargets(l) => Box::new(l.detail.clone()),
            TypeError::DeclInNonRoot(l) => Box::new(l.detail.clone()),
            TypeError::TypeMismatch(l) => Box::new(l.detail.clone()),
            TypeError::UnrecognizedNumber(l) => Box::new(l.detail.clone()),
            TypeError::UnrecognizedConstant(l) => Box::new(l.detail.clone()),
            TypeError::Unimplemented(l) => Box::new(l.detail.clone()),
            TypeError::InternalError(l) => Box::new(l.detail.clone()),
        }
    }
}

impl Display for TypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let position = self.located_position();
        write!(
            f,
            "{} ({}:{}:{})",
            self.inner(),
            self.located_filename(),
            position.lineno,
            position.col_offset
        )
    }
}

impl Error for TypeError {}

#[derive(Debug, Clone)]
pub struct UnknownTypeName {
    pub name: String,
}

impl Display for UnknownTypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown type name '{}'", self.name)
    }
}

impl Error for UnknownTypeName {}

/// The annotation expression is not one of the legal type-annotation shapes
/// (a bare `Name`, an empty `List`/`Dict` display, or `...`).
#[derive(Debug, Clone)]
pub struct IllegalTypeForm;

impl Display for IllegalTypeForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("illegal type annotation form")
    }
}

impl Error for IllegalTypeForm {}

/// A declaration's resolved type is still missing a container payload after
/// unification against the right-hand side, e.g. `x: ... = []`.
#[derive(Debug, Clone)]
pub struct IncompleteType {
    pub annotation: Type,
}

impl Display for IncompleteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "incomplete type '{}'", self.annotation)
    }
}

impl Error for IncompleteType {}

#[derive(Debug, Clone)]
pub struct Undefined {
    pub name: String,
}

impl Display for Undefined {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "name '{}' is not defined", self.name)
    }
}

impl Error for Undefined {}

#[derive(Debug, Clone)]
pub struct Redeclared {
    pub name: String,
}

impl Display for Redeclared {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' is already declared in this scope", self.name)
    }
}

impl Error for Redeclared {}

/// An assignment target other than a bare `Name` (e.g. `a.b = 1`, were
/// `Attribute` in scope).
#[derive(Debug, Clone)]
pub struct ComplexLhs;

impl Display for ComplexLhs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("assignment target must be a single name")
    }
}

impl Error for ComplexLhs {}

/// `a = b = value` — more than one target in a single `Assign`.
#[derive(Debug, Clone)]
pub struct MultipleTargets;

impl Display for MultipleTargets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("assignment may only have a single target")
    }
}

impl Error for MultipleTargets {}

/// A declaration (an `Assign` carrying a type annotation) appearing where
/// `stmt_root_flag` forbids it, e.g. inside an `if` body.
#[derive(Debug, Clone)]
pub struct DeclInNonRoot {
    pub name: String,
}

impl Display for DeclInNonRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "'{}' cannot be declared outside of a statement block's root",
            self.name
        )
    }
}

impl Error for DeclInNonRoot {}

#[derive(Debug, Clone)]
pub struct TypeMismatch {
    pub expected: Type,
    pub actual: Type,
}

impl Display for TypeMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "expected type '{}' but got '{}'",
            self.expected, self.actual
        )
    }
}

impl Error for TypeMismatch {}

/// A `Num` node whose payload is neither `Int` nor `Float`.
#[derive(Debug, Clone)]
pub struct UnrecognizedNumber;

impl Display for UnrecognizedNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("unrecognized numeric literal")
    }
}

impl Error for UnrecognizedNumber {}

/// A `NameConstant` node carrying `None` rather than a `bool`.
#[derive(Debug, Clone)]
pub struct UnrecognizedConstant;

impl Display for UnrecognizedConstant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("unrecognized constant 'None'")
    }
}

impl Error for UnrecognizedConstant {}

/// A syntactically legal node with no judgment rule in the checked subset.
#[derive(Debug, Clone)]
pub struct Unimplemented {
    pub node: String,
}

impl Display for Unimplemented {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' is not supported by this checker", self.node)
    }
}

impl Error for Unimplemented {}

/// A checker invariant was violated, e.g. a scope operation was asked to
/// look up a transaction that was never opened. Never raised by well-formed
/// input; its existence lets validation fail closed instead of panicking.
#[derive(Debug, Clone)]
pub struct InternalError {
    pub message: String,
}

impl Display for InternalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "internal error: {}", self.message)
    }
}

impl Error for InternalError {}
