//! Expression and statement judgment, and the top-level validation driver.
pub mod error;
pub mod scope;
pub mod types;

use std::rc::Rc;

use crate::ast::{
    BinOpKind, BoolOpKind, Expr, Mod, NameConstantKind, NumKind, Position, Stmt, UnaryOpKind,
};
use error::{
    ComplexLhs, DeclInNonRoot, IllegalTypeForm, IncompleteType, Located, MultipleTargets,
    Redeclared, TypeError, TypeMismatch, Undefined, Unimplemented, UnrecognizedConstant,
    UnrecognizedNumber,
};
use scope::Scope;
use types::Type;

/// A fresh root scope with an empty binding map. The source dialect intends
/// to later seed this with built-in names (`int`, `float`, `bool`, `str`) as
/// reflective type tokens; that extension is not yet exercised, so the
/// binding map starts empty.
pub fn new_global_scope() -> Rc<Scope> {
    Scope::new_root()
}

fn mismatch(expected: Type, actual: Type, scope: &Scope, position: Position) -> TypeError {
    TypeError::TypeMismatch(Located {
        detail: TypeMismatch { expected, actual },
        filename: scope.filename(),
        position,
    })
}

fn unimplemented(node: &str, scope: &Scope, position: Position) -> TypeError {
    TypeError::Unimplemented(Located {
        detail: Unimplemented {
            node: node.to_string(),
        },
        filename: scope.filename(),
        position,
    })
}

fn is_numeric(t: &Type) -> bool {
    matches!(t, Type::Int | Type::Float)
}

/// `true` if both operands are `Int`; the binary-op tables repeatedly test
/// this before falling back to the `Int`/`Float` promotion rule.
fn both_int(l: &Type, r: &Type) -> bool {
    matches!(l, Type::Int) && matches!(r, Type::Int)
}

/// Computes the type of `expr`. `_lvalue_hint` is reserved: a future caller
/// could use it to distinguish an expression judged as an assignment target
/// from one judged as a value, but nothing currently acts on it.
pub fn check_expr(scope: &Rc<Scope>, expr: &Expr, _lvalue_hint: bool) -> Result<Type, TypeError> {
    let position = expr.position();
    match expr {
        Expr::Num { value, .. } => match value {
            NumKind::Int(_) => Ok(Type::Int),
            NumKind::Float(_) => Ok(Type::Float),
            NumKind::Other => Err(TypeError::UnrecognizedNumber(Located {
                detail: UnrecognizedNumber,
                filename: scope.filename(),
                position,
            })),
        },

        Expr::Str { .. } | Expr::JoinedStr { .. } => Ok(Type::Str),

        Expr::Name { id, .. } => scope.lookup(id).ok_or_else(|| {
            TypeError::Undefined(Located {
                detail: Undefined { name: id.clone() },
                filename: scope.filename(),
                position,
            })
        }),

        Expr::NameConstant { value, .. } => match value {
            NameConstantKind::Bool(_) => Ok(Type::Bool),
            NameConstantKind::None => Err(TypeError::UnrecognizedConstant(Located {
                detail: UnrecognizedConstant,
                filename: scope.filename(),
                position,
            })),
        },

        Expr::BoolOp { values, .. } => {
            for operand in values {
                let operand_type = check_expr(scope, operand, false)?;
                if !operand_type.equal(&Type::Bool) {
                    return Err(mismatch(Type::Bool, operand_type, scope, operand.position()));
                }
            }
            Ok(Type::Bool)
        }

        Expr::List { elts, .. } => {
            let mut acc: Option<Type> = None;
            for elt in elts {
                let elt_type = check_expr(scope, elt, false)?;
                match &acc {
                    None => acc = Some(elt_type),
                    Some(prev) => {
                        if !prev.equal(&elt_type) {
                            return Err(mismatch(prev.clone(), elt_type, scope, elt.position()));
                        }
                    }
                }
            }
            Ok(Type::list(acc))
        }

        Expr::Dict { .. } => Err(unimplemented("dict expression", scope, position)),

        Expr::IfExp {
            test, body, orelse, ..
        } => {
            let test_type = check_expr(scope, test, false)?;
            if !test_type.equal(&Type::Bool) {
                return Err(mismatch(Type::Bool, test_type, scope, test.position()));
            }
            let body_type = check_expr(scope, body, false)?;
            let orelse_type = check_expr(scope, orelse, false)?;
            if !body_type.equal(&orelse_type) {
                return Err(mismatch(body_type, orelse_type, scope, orelse.position()));
            }
            Ok(body_type)
        }

        Expr::UnaryOp { op, operand, .. } => {
            let operand_type = check_expr(scope, operand, false)?;
            match op {
                UnaryOpKind::Invert if matches!(operand_type, Type::Int) => Ok(Type::Int),
                UnaryOpKind::Not if matches!(operand_type, Type::Bool) => Ok(Type::Bool),
                UnaryOpKind::UAdd | UnaryOpKind::USub if is_numeric(&operand_type) => {
                    Ok(operand_type)
                }
                _ => Err(mismatch(
                    expected_operand_for(*op),
                    operand_type,
                    scope,
                    operand.position(),
                )),
            }
        }

        Expr::BinOp {
            left, op, right, ..
        } => {
            let left_type = check_expr(scope, left, false)?;
            let right_type = check_expr(scope, right, false)?;
            check_binop(scope, *op, left_type, right_type, position)
        }

        Expr::Compare { .. } => Err(unimplemented("comparison operator", scope, position)),
        Expr::Call { .. } => Err(unimplemented("function call", scope, position)),
        Expr::Attribute { .. } => Err(unimplemented("attribute access", scope, position)),
        Expr::Subscript { .. } => Err(unimplemented("subscript", scope, position)),
        Expr::Tuple { .. } => Err(unimplemented("tuple literal", scope, position)),
        Expr::Set { .. } => Err(unimplemented("set literal", scope, position)),
        Expr::FormattedValue { .. } => Err(unimplemented("formatted value", scope, position)),
        Expr::Bytes { .. } => Err(unimplemented("byte string literal", scope, position)),
        Expr::Ellipsis { .. } => Err(unimplemented(
            "'...' outside of a type annotation",
            scope,
            position,
        )),
    }
}

fn expected_operand_for(op: UnaryOpKind) -> Type {
    match op {
        UnaryOpKind::Invert => Type::Int,
        UnaryOpKind::Not => Type::Bool,
        UnaryOpKind::UAdd | UnaryOpKind::USub => Type::Int,
    }
}

fn check_binop(
    scope: &Rc<Scope>,
    op: BinOpKind,
    left: Type,
    right: Type,
    position: Position,
) -> Result<Type, TypeError> {
    match op {
        BinOpKind::Add => {
            if both_int(&left, &right) {
                Ok(Type::Int)
            } else if is_numeric(&left) && is_numeric(&right) {
                Ok(Type::Float)
            } else if matches!(left, Type::Str) && matches!(right, Type::Str) {
                Ok(Type::Str)
            } else if matches!(left, Type::List(_))
                && matches!(right, Type::List(_))
                && left.equal(&right)
            {
                Ok(left)
            } else {
                Err(mismatch(left, right, scope, position))
            }
        }
        BinOpKind::Sub | BinOpKind::Mult | BinOpKind::Mod | BinOpKind::Pow => {
            if both_int(&left, &right) {
                Ok(Type::Int)
            } else if is_numeric(&left) && is_numeric(&right) {
                Ok(Type::Float)
            } else {
                Err(mismatch(left, right, scope, position))
            }
        }
        BinOpKind::Div => {
            if is_numeric(&left) && is_numeric(&right) {
                Ok(Type::Float)
            } else {
                Err(mismatch(left, right, scope, position))
            }
        }
        BinOpKind::FloorDiv => {
            if is_numeric(&left) && is_numeric(&right) {
                Ok(Type::Int)
            } else {
                Err(mismatch(left, right, scope, position))
            }
        }
        BinOpKind::LShift
        | BinOpKind::RShift
        | BinOpKind::BitOr
        | BinOpKind::BitXor
        | BinOpKind::BitAnd => {
            if both_int(&left, &right) {
                Ok(Type::Int)
            } else {
                Err(mismatch(left, right, scope, position))
            }
        }
        BinOpKind::MatMult => Err(unimplemented(
            "'@' (matrix multiplication)",
            scope,
            position,
        )),
    }
}

/// Elaborates a type-annotation expression into a `Type`.
/// The `...` ellipsis marker is handled by the caller before reaching here —
/// it means "infer from the right-hand side", which only makes sense in the
/// context of an `Assign`'s annotation slot.
pub fn parse_type(scope: &Rc<Scope>, type_expr: &Expr) -> Result<Type, TypeError> {
    let position = type_expr.position();
    match type_expr {
        Expr::Name { id, .. } => match id.as_str() {
            "int" => Ok(Type::Int),
            "float" => Ok(Type::Float),
            "bool" => Ok(Type::Bool),
            "str" => Ok(Type::Str),
            _ => Err(TypeError::UnknownTypeName(Located {
                detail: error::UnknownTypeName { name: id.clone() },
                filename: scope.filename(),
                position,
            })),
        },
        Expr::List { elts, .. } if elts.len() == 1 => {
            Ok(Type::list(Some(parse_type(scope, &elts[0])?)))
        }
        Expr::Dict { keys, values, .. } if keys.len() == 1 && values.len() == 1 => Ok(Type::dict(
            Some((parse_type(scope, &keys[0])?, parse_type(scope, &values[0])?)),
        )),
        _ => Err(TypeError::IllegalTypeForm(Located {
            detail: IllegalTypeForm,
            filename: scope.filename(),
            position,
        })),
    }
}

/// Binds `target` to `ty` in `scope`: the target must be a bare `Name`, and
/// must not already be bound in this exact scope node.
fn check_decl_target(scope: &Rc<Scope>, target: &Expr, ty: Type) -> Result<(), TypeError> {
    match target {
        Expr::Name { id, position } => scope.declare(id, ty, *position),
        other => Err(TypeError::ComplexLhs(Located {
            detail: ComplexLhs,
            filename: scope.filename(),
            position: other.position(),
        })),
    }
}

/// Validates one statement. `stmt_root_flag` is true iff `stmt` sits at a
/// position where declarations are legal — the top of a module body, or (in
/// the future) a function body's root; `If` recurses with it cleared.
pub fn check_stmt(scope: &Rc<Scope>, stmt: &Stmt, stmt_root_flag: bool) -> Result<(), TypeError> {
    match stmt {
        Stmt::Assign {
            targets,
            value,
            type_annotation,
            position,
        } => {
            if targets.len() != 1 {
                return Err(TypeError::MultipleTargets(Located {
                    detail: MultipleTargets,
                    filename: scope.filename(),
                    position: *position,
                }));
            }
            let target = &targets[0];
            let value_type = check_expr(scope, value, false)?;

            let target_type = match type_annotation {
                Some(annotation) => {
                    let target_type = match annotation {
                        Expr::Ellipsis { .. } => value_type.clone(),
                        other => parse_type(scope, other)?,
                    };
                    if !target_type.is_complete() {
                        return Err(TypeError::IncompleteType(Located {
                            detail: IncompleteType {
                                annotation: target_type,
                            },
                            filename: scope.filename(),
                            position: annotation.position(),
                        }));
                    }
                    // `check_decl_target` (binding the name) runs before the
                    // `stmt_root_flag` check here: a failure either way
                    // aborts the whole validation and the driver rolls the
                    // scope back, so the ordering is only observable
                    // through which diagnostic is raised.
                    check_decl_target(scope, target, target_type.clone())?;
                    if !stmt_root_flag {
                        let name = match target {
                            Expr::Name { id, .. } => id.clone(),
                            _ => String::new(),
                        };
                        return Err(TypeError::DeclInNonRoot(Located {
                            detail: DeclInNonRoot { name },
                            filename: scope.filename(),
                            position: *position,
                        }));
                    }
                    target_type
                }
                None => check_expr(scope, target, true)?,
            };

            if !target_type.equal(&value_type) {
                return Err(mismatch(target_type, value_type, scope, *position));
            }
            Ok(())
        }

        Stmt::AugAssign {
            target,
            op,
            value,
            position,
        } => {
            let desugared = Stmt::Assign {
                targets: vec![target.clone()],
                value: Expr::BinOp {
                    left: Box::new(target.clone()),
                    op: *op,
                    right: Box::new(value.clone()),
                    position: *position,
                },
                type_annotation: None,
                position: *position,
            };
            check_stmt(scope, &desugared, stmt_root_flag)
        }

        Stmt::If {
            test, body, orelse, ..
        } => {
            let test_type = check_expr(scope, test, false)?;
            if !test_type.equal(&Type::Bool) {
                return Err(mismatch(Type::Bool, test_type, scope, test.position()));
            }
            check_stmts(scope, body, false)?;
            check_stmts(scope, orelse, false)
        }

        Stmt::Expr { value, .. } => {
            check_expr(scope, value, false)?;
            Ok(())
        }

        Stmt::Break { .. } | Stmt::Continue { .. } => Ok(()),

        Stmt::FunctionDef { position } => Err(unimplemented("function definition", scope, *position)),
        Stmt::ClassDef { position } => Err(unimplemented("class definition", scope, *position)),
        Stmt::Return { position } => Err(unimplemented("return statement", scope, *position)),
        Stmt::For { position } => Err(unimplemented("for loop", scope, *position)),
        Stmt::While { position } => Err(unimplemented("while loop", scope, *position)),
        Stmt::Assert { position } => Err(unimplemented("assert statement", scope, *position)),
        Stmt::Global { position } => Err(unimplemented("global declaration", scope, *position)),
        Stmt::Nonlocal { position } => Err(unimplemented("nonlocal declaration", scope, *position)),
    }
}

/// Validates a statement list in source order, left-to-right, aborting on
/// the first failure.
pub fn check_stmts(scope: &Rc<Scope>, stmts: &[Stmt], stmt_root_flag: bool) -> Result<(), TypeError> {
    for stmt in stmts {
        check_stmt(scope, stmt, stmt_root_flag)?;
    }
    Ok(())
}

/// The top-level driver. Wraps one pass over `ast` in a
/// validation transaction on `root_scope`: on success the scope's new
/// bindings persist, on failure they are rolled back to their state before
/// this call.
pub fn validate(ast: &Mod, filename: &str, root_scope: &Rc<Scope>) -> Result<(), TypeError> {
    let snapshot = root_scope.validation_begin(filename)?;

    let result = match ast {
        Mod::Module { body } | Mod::Interactive { body } => {
            check_stmts(root_scope, body, true)
        }
        Mod::Expression { body } => check_expr(root_scope, body, false).map(|_| ()),
        Mod::Suite { .. } => Err(TypeError::InternalError(Located {
            detail: error::InternalError {
                message: "Suite is not a legal top-level validation input".to_string(),
            },
            filename: filename.to_string(),
            position: Position::default(),
        })),
    };

    match result {
        Ok(()) => {
            root_scope.validation_ok(snapshot);
            Ok(())
        }
        Err(err) => {
            root_scope.validation_fail(snapshot);
            Err(err)
        }
    }
}

/// A thin accept/reject wrapper returning a plain `bool`. On rejection, logs
/// the diagnostic through `log::error!` with a best-effort recovered source
/// line appended when the file is readable.
pub fn validate_bool(ast: &Mod, filename: &str, root_scope: &Rc<Scope>) -> bool {
    match validate(ast, filename, root_scope) {
        Ok(()) => true,
        Err(err) => {
            match source_line(filename, err.position().lineno) {
                Some(line) => log::error!("{err}\n    {line}"),
                None => log::error!("{err}"),
            }
            false
        }
    }
}

/// Reads line `lineno` (1-indexed) of `filename`, or `None` if the file
/// can't be read or doesn't have that many lines.
fn source_line(filename: &str, lineno: usize) -> Option<String> {
    let contents = std::fs::read_to_string(filename).ok()?;
    contents.lines().nth(lineno.checked_sub(1)?).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Position;

    fn pos() -> Position {
        Position::new(1, 0)
    }

    fn name(id: &str) -> Expr {
        Expr::Name {
            id: id.to_string(),
            position: pos(),
        }
    }

    fn int_literal(v: i64) -> Expr {
        Expr::Num {
            value: NumKind::Int(v),
            position: pos(),
        }
    }

    fn declare(target: &str, annotation: Option<Expr>, value: Expr) -> Stmt {
        Stmt::Assign {
            targets: vec![name(target)],
            value,
            type_annotation: annotation,
            position: pos(),
        }
    }

    #[test]
    fn scalar_declaration_accepts_and_binds() {
        let scope = new_global_scope();
        let stmt = declare("x", Some(name("int")), int_literal(3));
        assert!(check_stmt(&scope, &stmt, true).is_ok());
        assert!(scope.lookup("x").unwrap().equal(&Type::Int));
    }

    #[test]
    fn reassignment_with_mismatched_type_is_rejected() {
        let scope = new_global_scope();
        check_stmt(&scope, &declare("x", Some(name("int")), int_literal(3)), true).unwrap();

        let reassign = Stmt::Assign {
            targets: vec![name("x")],
            value: Expr::Num {
                value: NumKind::Float(3.0),
                position: pos(),
            },
            type_annotation: None,
            position: pos(),
        };
        let err = check_stmt(&scope, &reassign, true).unwrap_err();
        assert!(matches!(err, TypeError::TypeMismatch(_)));
    }

    #[test]
    fn redeclaration_is_rejected() {
        let scope = new_global_scope();
        check_stmt(&scope, &declare("x", Some(name("int")), int_literal(3)), true).unwrap();
        let err = check_stmt(&scope, &declare("x", Some(name("int")), int_literal(4)), true)
            .unwrap_err();
        assert!(matches!(err, TypeError::Redeclared(_)));
    }

    #[test]
    fn undeclared_reassignment_is_rejected() {
        let scope = new_global_scope();
        let stmt = Stmt::Assign {
            targets: vec![name("y")],
            value: int_literal(3),
            type_annotation: None,
            position: pos(),
        };
        assert!(matches!(
            check_stmt(&scope, &stmt, true).unwrap_err(),
            TypeError::Undefined(_)
        ));
    }

    #[test]
    fn list_declaration_late_binds_on_augmented_assignment() {
        let scope = new_global_scope();
        let decl = declare(
            "xs",
            Some(Expr::List {
                elts: vec![name("int")],
                position: pos(),
            }),
            Expr::List {
                elts: vec![int_literal(1), int_literal(2), int_literal(3)],
                position: pos(),
            },
        );
        check_stmt(&scope, &decl, true).unwrap();

        let aug = Stmt::AugAssign {
            target: name("xs"),
            op: BinOpKind::Add,
            value: Expr::List {
                elts: vec![int_literal(4)],
                position: pos(),
            },
            position: pos(),
        };
        assert!(check_stmt(&scope, &aug, true).is_ok());
    }

    #[test]
    fn empty_dict_declaration_rejects_on_dict_expression() {
        let scope = new_global_scope();
        let decl = declare(
            "d",
            Some(Expr::Dict {
                keys: vec![name("str")],
                values: vec![name("int")],
                position: pos(),
            }),
            Expr::Dict {
                keys: vec![],
                values: vec![],
                position: pos(),
            },
        );
        assert!(matches!(
            check_stmt(&scope, &decl, true).unwrap_err(),
            TypeError::Unimplemented(_)
        ));
    }

    #[test]
    fn comparison_expression_is_unimplemented() {
        let scope = new_global_scope();
        let decl = declare(
            "b",
            Some(name("bool")),
            Expr::Compare {
                left: Box::new(int_literal(1)),
                ops: vec![crate::ast::CmpOpKind::Lt],
                comparators: vec![int_literal(2)],
                position: pos(),
            },
        );
        assert!(matches!(
            check_stmt(&scope, &decl, true).unwrap_err(),
            TypeError::Unimplemented(_)
        ));
    }

    #[test]
    fn ellipsis_annotation_infers_from_rhs() {
        let scope = new_global_scope();
        let decl = declare(
            "x",
            Some(Expr::Ellipsis { position: pos() }),
            int_literal(5),
        );
        check_stmt(&scope, &decl, true).unwrap();
        assert!(scope.lookup("x").unwrap().equal(&Type::Int));
    }

    #[test]
    fn declaration_outside_stmt_root_is_rejected() {
        let scope = new_global_scope();
        let decl = declare("x", Some(name("int")), int_literal(3));
        assert!(matches!(
            check_stmt(&scope, &decl, false).unwrap_err(),
            TypeError::DeclInNonRoot(_)
        ));
    }

    #[test]
    fn if_recurses_with_stmt_root_cleared() {
        let scope = new_global_scope();
        let inner_decl = declare("x", Some(name("int")), int_literal(3));
        let if_stmt = Stmt::If {
            test: Expr::NameConstant {
                value: NameConstantKind::Bool(true),
                position: pos(),
            },
            body: vec![inner_decl],
            orelse: vec![],
            position: pos(),
        };
        assert!(matches!(
            check_stmt(&scope, &if_stmt, true).unwrap_err(),
            TypeError::DeclInNonRoot(_)
        ));
    }

    #[test]
    fn validate_rolls_back_scope_on_failure() {
        let scope = new_global_scope();
        let ast = Mod::Module {
            body: vec![
                declare("x", Some(name("int")), int_literal(3)),
                declare("x", Some(name("int")), int_literal(4)),
            ],
        };
        assert!(validate(&ast, "t.gs", &scope).is_err());
        assert!(scope.lookup("x").is_none());
    }

    #[test]
    fn validate_commits_scope_on_success() {
        let scope = new_global_scope();
        let ast = Mod::Module {
            body: vec![declare("x", Some(name("int")), int_literal(3))],
        };
        assert!(validate(&ast, "t.gs", &scope).is_ok());
        assert!(scope.lookup("x").unwrap().equal(&Type::Int));
    }

    #[test]
    fn validate_is_idempotent_on_a_fresh_scope_each_time() {
        let ast = Mod::Module {
            body: vec![declare("x", Some(name("int")), int_literal(3))],
        };

        let first = new_global_scope();
        assert!(validate(&ast, "t.gs", &first).is_ok());

        let second = new_global_scope();
        assert!(validate(&ast, "t.gs", &second).is_ok());

        assert!(first.lookup("x").unwrap().equal(&Type::Int));
        assert!(second.lookup("x").unwrap().equal(&Type::Int));
    }
}
