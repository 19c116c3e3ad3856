//! Expression AST nodes.

use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::ast::stmt::FunctionDecl;
use crate::lexer::Token;

static NEXT_EXPR_ID: AtomicUsize = AtomicUsize::new(0);

/// Identity of an expression node, used as the key of the resolver's distance table.
///
/// Ids are unique for the whole process, so nodes from different modules or REPL
/// lines never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(usize);

impl ExprId {
    pub fn fresh() -> Self {
        Self(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// An expression in the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: ExprId,
    pub kind: ExprKind,
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self {
            id: ExprId::fresh(),
            kind,
        }
    }
}

/// Literal values as written in source.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Number(f64),
    String(String),
    Bool(bool),
    Null,
}

/// All expression variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Literal: 42, 'text', true, null
    Literal(LiteralValue),

    /// Variable reference: foo
    Variable(Token),

    /// Assignment: x = 5
    Assign { name: Token, value: Box<Expr> },

    /// Binary operation: a + b
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Short-circuit logic: a && b, a || b
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Unary operation: -x, !x
    Unary { operator: Token, right: Box<Expr> },

    /// Grouping: (expr)
    Grouping(Box<Expr>),

    /// Call: f(a, b)
    Call {
        callee: Box<Expr>,
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// Property access: obj.name
    Get { object: Box<Expr>, name: Token },

    /// Property assignment: obj.name = value
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    /// Indexing: obj[index]
    GetItem {
        object: Box<Expr>,
        bracket: Token,
        index: Box<Expr>,
    },

    /// Indexed assignment: obj[index] = value
    SetItem {
        object: Box<Expr>,
        index: Box<Expr>,
        equals: Token,
        value: Box<Expr>,
    },

    /// this
    This(Token),

    /// super(ClassName).method
    Super {
        keyword: Token,
        class_name: Token,
        method: Token,
    },

    /// Array literal: [1, 2, 3]
    Array(Vec<Expr>),

    /// Map literal: {key: value}
    Map(Vec<(Token, Expr)>),

    /// Arrow function: (a, b) -> a + b
    Lambda(Rc<FunctionDecl>),
}
