//! The scope chain: a parent-linked list of binding frames plus the
//! snapshot/rollback machinery that makes one top-level `validate` call
//! atomic.
use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::ast::Position;
use crate::typechecker::error::{InternalError, Located, Redeclared, TypeError};
use crate::typechecker::types::Type;

/// One frame of bindings. Kept behind a `RefCell` so that `declare` can
/// mutate a scope reached through a shared `Rc` parent pointer.
#[derive(Debug, Default)]
struct Frame {
    bindings: RefCell<HashMap<String, Type>>,
}

#[derive(Debug)]
pub struct Scope {
    parent: Option<Rc<Scope>>,
    frame: Frame,
    /// Only ever populated on the root scope: the name of the file currently
    /// being validated, used to stamp diagnostics and to drive source-line
    /// recovery in `validate_bool`.
    filename: RefCell<Option<String>>,
}

/// A point-in-time copy of a scope's own bindings, opened by
/// [`Scope::validation_begin`] and consumed by exactly one of
/// [`Scope::validation_ok`] / [`Scope::validation_fail`].
pub struct Snapshot(HashMap<String, Type>);

impl Scope {
    /// A fresh root scope with no filename set. The root persists across
    /// successive `validate` calls (REPL model); its
    /// `filename` slot is populated only for the duration of one call, by
    /// [`Scope::validation_begin`].
    pub fn new_root() -> Rc<Scope> {
        Rc::new(Scope {
            parent: None,
            frame: Frame::default(),
            filename: RefCell::new(None),
        })
    }

    pub fn new_child(parent: &Rc<Scope>) -> Rc<Scope> {
        Rc::new(Scope {
            parent: Some(Rc::clone(parent)),
            frame: Frame::default(),
            filename: RefCell::new(None),
        })
    }

    /// The file name recorded on the root of this scope's chain, or
    /// `<unknown>` if called outside of an ongoing `validate` call.
    pub fn filename(&self) -> String {
        match &self.parent {
            Some(parent) => parent.filename(),
            None => self
                .filename
                .borrow()
                .clone()
                .unwrap_or_else(|| "<unknown>".to_string()),
        }
    }


    /// Bind `name` to `ty` in this scope. Fails if `name` is already bound
    /// *in this scope* — shadowing an outer scope's binding is legal, but
    /// redeclaring within the same one is not.
    pub fn declare(&self, name: &str, ty: Type, position: Position) -> Result<(), TypeError> {
        let mut bindings = self.frame.bindings.borrow_mut();
        if bindings.contains_key(name) {
            return Err(TypeError::Redeclared(Located {
                detail: Redeclared {
                    name: name.to_string(),
                },
                filename: self.filename(),
                position,
            }));
        }
        bindings.insert(name.to_string(), ty);
        Ok(())
    }

    /// Look up `name`, walking outward from this scope to the root.
    pub fn lookup(&self, name: &str) -> Option<Type> {
        if let Some(ty) = self.frame.bindings.borrow().get(name) {
            return Some(ty.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.lookup(name))
    }

    /// True if `name` is bound in this exact scope (not an ancestor).
    pub fn declared_here(&self, name: &str) -> bool {
        self.frame.bindings.borrow().contains_key(name)
    }

    /// Open a validation transaction on this (root) scope: stamps the
    /// filename for the duration of the call and snapshots the current
    /// bindings so a failed walk can be undone. Fails with
    /// `InternalError` if a filename is already set, i.e. a validation is
    /// already in flight on this root — concurrent `validate` calls on one
    /// scope are not supported.
    pub fn validation_begin(&self, filename: impl Into<String>) -> Result<Snapshot, TypeError> {
        debug_assert!(self.parent.is_none(), "validation_begin called on a non-root scope");
        let mut slot = self.filename.borrow_mut();
        if slot.is_some() {
            return Err(TypeError::InternalError(Located {
                detail: InternalError {
                    message: "validation already in progress on this scope".to_string(),
                },
                filename: slot.clone().unwrap_or_default(),
                position: Position::default(),
            }));
        }
        *slot = Some(filename.into());
        Ok(Snapshot(self.frame.bindings.borrow().clone()))
    }

    /// Commit: the walk validated cleanly. Clears the filename slot and
    /// discards the snapshot.
    pub fn validation_ok(&self, _snapshot: Snapshot) {
        *self.filename.borrow_mut() = None;
    }

    /// Roll back: restore the bindings captured by `validation_begin` and
    /// clear the filename slot, discarding any partial declarations the
    /// failed walk accumulated.
    pub fn validation_fail(&self, snapshot: Snapshot) {
        *self.frame.bindings.borrow_mut() = snapshot.0;
        *self.filename.borrow_mut() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position::new(1, 0)
    }

    #[test]
    fn lookup_walks_to_parent() {
        let root = Scope::new_root();
        root.declare("x", Type::Int, pos()).unwrap();

        let child = Scope::new_child(&root);
        assert!(child.lookup("x").unwrap().equal(&Type::Int));
        assert!(!child.declared_here("x"));
    }

    #[test]
    fn redeclaring_in_same_scope_fails() {
        let root = Scope::new_root();
        root.declare("x", Type::Int, pos()).unwrap();
        assert!(root.declare("x", Type::Str, pos()).is_err());
    }

    #[test]
    fn shadowing_in_child_scope_is_allowed() {
        let root = Scope::new_root();
        root.declare("x", Type::Int, pos()).unwrap();

        let child = Scope::new_child(&root);
        assert!(child.declare("x", Type::Str, pos()).is_ok());
        assert!(child.lookup("x").unwrap().equal(&Type::Str));
        assert!(root.lookup("x").unwrap().equal(&Type::Int));
    }

    #[test]
    fn failed_transaction_rolls_back_partial_declarations() {
        let root = Scope::new_root();
        let snapshot = root.validation_begin("t.gs").unwrap();
        root.declare("x", Type::Int, pos()).unwrap();
        assert!(root.declared_here("x"));

        root.validation_fail(snapshot);
        assert!(!root.declared_here("x"));
        assert_eq!(root.filename(), "<unknown>");
    }

    #[test]
    fn committed_transaction_keeps_declarations() {
        let root = Scope::new_root();
        let snapshot = root.validation_begin("t.gs").unwrap();
        root.declare("x", Type::Int, pos()).unwrap();

        root.validation_ok(snapshot);
        assert!(root.declared_here("x"));
        assert_eq!(root.filename(), "<unknown>");
    }

    #[test]
    fn concurrent_validation_on_same_root_is_rejected() {
        let root = Scope::new_root();
        let _snapshot = root.validation_begin("a.gs").unwrap();
        assert!(root.validation_begin("b.gs").is_err());
    }

    #[test]
    fn filename_is_visible_to_children_during_a_call() {
        let root = Scope::new_root();
        let child = Scope::new_child(&root);
        let snapshot = root.validation_begin("module.gs").unwrap();
        assert_eq!(child.filename(), "module.gs");
        root.validation_ok(snapshot);
    }
}
