//! Declaration parsing: classes, functions, variables and exports.

use std::rc::Rc;

use crate::ast::*;
use crate::error::ParserError;
use crate::lexer::{Token, TokenKind};

use super::core::{ParseResult, Parser, MAX_ARGUMENTS};

impl Parser {
    /// Parse one declaration, recovering from errors. `None` means the declaration
    /// was malformed and has been skipped.
    pub(crate) fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.match_token(TokenKind::Export) {
            self.export_declaration()
        } else if self.match_token(TokenKind::Class) {
            self.class_declaration()
        } else if self.match_token(TokenKind::Function) {
            self.function_declaration("function")
                .map(|decl| Stmt::Function(Rc::new(decl)))
        } else if self.match_token(TokenKind::Var) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(error) => {
                self.errors.push(error);
                self.synchronize();
                None
            }
        }
    }

    fn export_declaration(&mut self) -> ParseResult<Stmt> {
        let inner = if self.match_token(TokenKind::Class) {
            self.class_declaration()?
        } else if self.match_token(TokenKind::Function) {
            Stmt::Function(Rc::new(self.function_declaration("function")?))
        } else if self.match_token(TokenKind::Var) {
            self.var_declaration()?
        } else {
            return Err(ParserError::new(
                self.peek().clone(),
                "Expect class, function or variable declaration.",
            ));
        };
        Ok(Stmt::Export(Box::new(inner)))
    }

    fn class_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expect class name.")?;

        let mut superclasses = Vec::new();
        if self.match_token(TokenKind::Extends) {
            loop {
                let superclass = self.consume(TokenKind::Identifier, "Expect superclass name.")?;
                superclasses.push(Expr::new(ExprKind::Variable(superclass)));
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.consume(TokenKind::LeftBrace, "Expect '{' before class body.")?;

        let mut methods = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            methods.push(Rc::new(self.function_declaration("method")?));
        }

        self.consume(TokenKind::RightBrace, "Expect '}' after class body.")?;

        Ok(Stmt::Class(ClassDecl {
            name,
            superclasses,
            methods,
        }))
    }

    pub(crate) fn function_declaration(&mut self, kind: &str) -> ParseResult<FunctionDecl> {
        let name = self.consume(TokenKind::Identifier, &format!("Expect {} name.", kind))?;
        self.consume(
            TokenKind::LeftParen,
            &format!("Expect '(' after {} name.", kind),
        )?;
        let params = self.parameters()?;
        self.consume(
            TokenKind::LeftBrace,
            &format!("Expect '{{' before {} body.", kind),
        )?;
        let body = self.block()?;

        Ok(FunctionDecl {
            name,
            params,
            body,
            anonymous: false,
        })
    }

    /// Parameter list after the opening parenthesis, including the closing one.
    pub(crate) fn parameters(&mut self) -> ParseResult<Vec<Token>> {
        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_ARGUMENTS {
                    let token = self.peek().clone();
                    self.report(token, "Can't have more than 255 parameters.");
                }
                params.push(self.consume(TokenKind::Identifier, "Expect parameter name.")?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after parameters.")?;
        Ok(params)
    }

    pub(crate) fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expect variable name.")?;

        let initializer = if self.match_token(TokenKind::Equal) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(
            TokenKind::Semicolon,
            "Expect ';' after variable declaration.",
        )?;
        Ok(Stmt::Var { name, initializer })
    }
}
