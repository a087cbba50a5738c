//! The algebraic type model.
//!
//! `Type` is a tagged variant over the four scalar kinds and the two
//! homogeneous container kinds, plus a reserved `Class` kind. Scalars carry
//! no payload and are trivially `Copy`-cheap; a container's payload lives
//! behind a shared, interior-mutable cell so that [`Type::equal`] can
//! *late-bind* an absent payload in place when it is compared against a
//! complete sibling.
use std::{
    cell::RefCell,
    fmt::{self, Display},
    rc::Rc,
};

/// Opaque identity of a user-defined class. Two `Class` types are equal iff
/// they carry the same identity (pointer equality), never by name — class
/// bodies are not elaborated in this subset, so no code path currently
/// constructs one, but the shape is kept complete per the type model.
#[derive(Debug)]
pub struct ClassIdentity;

pub type ClassId = Rc<ClassIdentity>;

type ListCell = Rc<RefCell<Option<Type>>>;
type DictCell = Rc<RefCell<Option<(Type, Type)>>>;

#[derive(Debug, Clone)]
pub enum Type {
    Int,
    Float,
    Bool,
    Str,
    /// Homogeneous list. `None` payload means "unbound" — produced by an
    /// empty list literal, awaiting late binding.
    List(ListCell),
    /// Homogeneous dict. `None` payload means "unbound".
    Dict(DictCell),
    /// User-defined class. `None` identity means "unbound"; never late-binds.
    Class(Option<ClassId>),
}

impl Type {
    pub fn list(elt: Option<Type>) -> Type {
        Type::List(Rc::new(RefCell::new(elt)))
    }

    pub fn unbound_list() -> Type {
        Type::list(None)
    }

    pub fn dict(kv: Option<(Type, Type)>) -> Type {
        Type::Dict(Rc::new(RefCell::new(kv)))
    }

    pub fn unbound_dict() -> Type {
        Type::dict(None)
    }

    pub fn class(identity: Option<ClassId>) -> Type {
        Type::Class(identity)
    }

    /// A type is complete iff every reachable `List`/`Dict`/`Class` payload
    /// is present and recursively complete. Scalars are always complete.
    pub fn is_complete(&self) -> bool {
        match self {
            Type::Int | Type::Float | Type::Bool | Type::Str => true,
            Type::List(cell) => match &*cell.borrow() {
                Some(elt) => elt.is_complete(),
                None => false,
            },
            Type::Dict(cell) => match &*cell.borrow() {
                Some((k, v)) => k.is_complete() && v.is_complete(),
                None => false,
            },
            Type::Class(identity) => identity.is_some(),
        }
    }

    /// Structural equality, with late unification of absent container
    /// payloads. This call is itself a unification step: if
    /// one side is an unbound `List`/`Dict`, it is mutated in place to adopt
    /// the other side's payload. The mutation is idempotent — a type never
    /// loses information once bound.
    pub fn equal(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Int, Type::Int)
            | (Type::Float, Type::Float)
            | (Type::Bool, Type::Bool)
            | (Type::Str, Type::Str) => true,
            (Type::Class(a), Type::Class(b)) => match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                _ => false,
            },
            (Type::List(a), Type::List(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let a_payload = a.borrow().clone();
                let b_payload = b.borrow().clone();
                match (a_payload, b_payload) {
                    (None, None) => true,
                    (None, Some(b_elt)) => {
                        *a.borrow_mut() = Some(b_elt);
                        true
                    }
                    (Some(a_elt), None) => {
                        *b.borrow_mut() = Some(a_elt);
                        true
                    }
                    (Some(a_elt), Some(b_elt)) => a_elt.equal(&b_elt),
                }
            }
            (Type::Dict(a), Type::Dict(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let a_payload = a.borrow().clone();
                let b_payload = b.borrow().clone();
                match (a_payload, b_payload) {
                    (None, None) => true,
                    (None, Some(b_kv)) => {
                        *a.borrow_mut() = Some(b_kv);
                        true
                    }
                    (Some(a_kv), None) => {
                        *b.borrow_mut() = Some(a_kv);
                        true
                    }
                    (Some((a_k, a_v)), Some((b_k, b_v))) => a_k.equal(&b_k) && a_v.equal(&b_v),
                }
            }
            _ => false,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => f.write_str("int"),
            Type::Float => f.write_str("float"),
            Type::Bool => f.write_str("bool"),
            Type::Str => f.write_str("str"),
            Type::List(cell) => match &*cell.borrow() {
                Some(elt) => write!(f, "[{elt}]"),
                None => f.write_str("[]"),
            },
            Type::Dict(cell) => match &*cell.borrow() {
                Some((k, v)) => write!(f, "{{{k}: {v}}}"),
                None => f.write_str("{}"),
            },
            Type::Class(Some(_)) => f.write_str("<class>"),
            Type::Class(None) => f.write_str("<class?>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_are_complete_and_self_equal() {
        for t in [Type::Int, Type::Float, Type::Bool, Type::Str] {
            assert!(t.is_complete());
            assert!(t.equal(&t));
        }
    }

    #[test]
    fn unbound_list_is_incomplete() {
        assert!(!Type::unbound_list().is_complete());
        assert!(Type::list(Some(Type::Int)).is_complete());
    }

    #[test]
    fn empty_list_equal_is_reflexive_and_vacuously_true() {
        let a = Type::unbound_list();
        let b = Type::unbound_list();
        assert!(a.equal(&a));
        assert!(a.equal(&b));
        assert!(!a.is_complete());
        assert!(!b.is_complete());
    }

    #[test]
    fn late_bind_mutates_unbound_side_and_is_symmetric() {
        let unbound = Type::unbound_list();
        let bound = Type::list(Some(Type::Int));

        assert!(unbound.equal(&bound));
        assert!(unbound.is_complete());

        let unbound2 = Type::unbound_list();
        assert!(bound.equal(&unbound2));
        assert!(unbound2.is_complete());
    }

    #[test]
    fn late_bind_rejects_mismatched_element_type_afterwards() {
        let unbound = Type::unbound_list();
        assert!(unbound.equal(&Type::list(Some(Type::Int))));
        // Now bound to Int; comparing against a Str-list must fail.
        assert!(!unbound.equal(&Type::list(Some(Type::Str))));
    }

    #[test]
    fn dict_late_binds_key_and_value_independently() {
        let unbound = Type::unbound_dict();
        let complete = Type::dict(Some((Type::Str, Type::Int)));
        assert!(unbound.equal(&complete));
        assert!(unbound.is_complete());
    }

    #[test]
    fn different_tags_are_never_equal() {
        assert!(!Type::Int.equal(&Type::Float));
        assert!(!Type::unbound_list().equal(&Type::unbound_dict()));
    }

    #[test]
    fn classless_class_types_are_equal() {
        // Two classless types compare as pointer-equal nulls, i.e. true.
        assert!(Type::class(None).equal(&Type::class(None)));
    }

    #[test]
    fn distinct_class_identities_are_unequal() {
        let a = Type::class(Some(Rc::new(ClassIdentity)));
        let b = Type::class(Some(Rc::new(ClassIdentity)));
        assert!(!a.equal(&b));
        assert!(a.equal(&a.clone()));
    }
}
