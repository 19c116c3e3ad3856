//! Abstract Syntax Tree for TripleS.

pub mod expr;
pub mod stmt;

pub use expr::{Expr, ExprId, ExprKind, LiteralValue};
pub use stmt::{ClassDecl, FunctionDecl, ImportDecl, ImportItem, Stmt, TryDecl};
