//! Statement AST nodes.

use std::rc::Rc;

use crate::ast::expr::Expr;
use crate::lexer::Token;

/// Statement variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Expression statement: expr;
    Expression(Expr),

    /// print expr;
    Print(Expr),

    /// var name = expr;
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    /// Block: { statements }
    Block(Vec<Stmt>),

    /// if (cond) { ... } else { ... }
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// while (cond) { ... }
    While { condition: Expr, body: Box<Stmt> },

    /// Function declaration
    Function(Rc<FunctionDecl>),

    /// return expr;
    Return { keyword: Token, value: Option<Expr> },

    /// Class declaration
    Class(ClassDecl),

    /// from 'path' import a, b as c;
    Import(ImportDecl),

    /// export var/function/class
    Export(Box<Stmt>),

    /// throw expr;
    Throw { keyword: Token, value: Expr },

    /// try { ... } catch (e) { ... } finally { ... }
    Try(TryDecl),
}

/// A function, method or arrow function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
    /// Arrow functions have no name of their own.
    pub anonymous: bool,
}

/// Class declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Token,
    /// Variable expressions naming each direct superclass, in declaration order.
    pub superclasses: Vec<Expr>,
    pub methods: Vec<Rc<FunctionDecl>>,
}

/// One imported name with its optional alias.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportItem {
    pub name: Token,
    pub alias: Option<Token>,
}

impl ImportItem {
    /// The name bound in the importing scope.
    pub fn binding(&self) -> &Token {
        self.alias.as_ref().unwrap_or(&self.name)
    }
}

/// Import declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub path: Token,
    pub items: Vec<ImportItem>,
}

/// Try/catch/finally. At least one of the two handlers is present.
#[derive(Debug, Clone, PartialEq)]
pub struct TryDecl {
    pub try_block: Vec<Stmt>,
    pub catch_param: Option<Token>,
    pub catch_block: Option<Vec<Stmt>>,
    pub finally_block: Option<Vec<Stmt>>,
}
