pub mod ast;
pub mod typechecker;

pub use typechecker::error::TypeError;
pub use typechecker::{
    check_expr, check_stmt, check_stmts, new_global_scope, parse_type, validate, validate_bool,
};
