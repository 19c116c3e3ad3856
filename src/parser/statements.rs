//! Statement parsing.

use crate::ast::*;
use crate::error::ParserError;
use crate::lexer::TokenKind;

use super::core::{ParseResult, Parser};

impl Parser {
    pub(crate) fn statement(&mut self) -> ParseResult<Stmt> {
        if self.match_token(TokenKind::From) {
            return self.import_statement();
        }
        if self.match_token(TokenKind::If) {
            return self.if_statement();
        }
        if self.match_token(TokenKind::While) {
            return self.while_statement();
        }
        if self.match_token(TokenKind::For) {
            return self.for_statement();
        }
        if self.match_token(TokenKind::Print) {
            return self.print_statement(true);
        }
        if self.match_token(TokenKind::Return) {
            return self.return_statement(true);
        }
        if self.match_token(TokenKind::Throw) {
            return self.throw_statement();
        }
        if self.match_token(TokenKind::Try) {
            return self.try_statement();
        }
        if self.match_token(TokenKind::LeftBrace) {
            return Ok(Stmt::Block(self.block()?));
        }
        self.expression_statement()
    }

    /// Statements up to and including the closing brace. The opening brace has
    /// already been consumed.
    pub(crate) fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(TokenKind::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn import_statement(&mut self) -> ParseResult<Stmt> {
        let path = self.consume(TokenKind::String, "Expect string after 'from'.")?;

        let mut items = Vec::new();
        if self.match_token(TokenKind::Import) {
            loop {
                let name =
                    self.consume(TokenKind::Identifier, "Expect identifier after 'import'.")?;
                let alias = if self.match_token(TokenKind::As) {
                    Some(self.consume(TokenKind::Identifier, "Expect identifier after 'as'.")?)
                } else {
                    None
                };
                items.push(ImportItem { name, alias });
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.consume(TokenKind::Semicolon, "Expect ';' after import statement.")?;
        if items.is_empty() {
            return Err(ParserError::new(path, "Expect at least one import item."));
        }

        Ok(Stmt::Import(ImportDecl { path, items }))
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after if condition.")?;

        if !self.match_token(TokenKind::LeftBrace) {
            let then_branch = if self.match_token(TokenKind::Return) {
                self.return_statement(true)?
            } else if self.match_token(TokenKind::Print) {
                self.print_statement(true)?
            } else if self.match_token(TokenKind::Throw) {
                self.throw_statement()?
            } else {
                self.expression_statement()?
            };
            return Ok(Stmt::If {
                condition,
                then_branch: Box::new(then_branch),
                else_branch: None,
            });
        }

        let then_branch = Stmt::Block(self.block()?);
        let else_branch = if self.match_token(TokenKind::Else) {
            if self.match_token(TokenKind::If) {
                Some(Box::new(self.if_statement()?))
            } else {
                self.consume(TokenKind::LeftBrace, "Expect '{' after 'else'.")?;
                Some(Box::new(Stmt::Block(self.block()?)))
            }
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch: Box::new(then_branch),
            else_branch,
        })
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after while condition.")?;
        self.consume(TokenKind::LeftBrace, "Expect '{' after while condition.")?;
        let body = Stmt::Block(self.block()?);

        Ok(Stmt::While {
            condition,
            body: Box::new(body),
        })
    }

    /// `for (init; cond; incr) { body }` becomes
    /// `{ init; while (cond) { { body } incr; } }`.
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.match_token(TokenKind::Semicolon) {
            None
        } else if self.match_token(TokenKind::Var) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if self.check(TokenKind::Semicolon) {
            Expr::new(ExprKind::Literal(LiteralValue::Bool(true)))
        } else {
            self.expression()?
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::RightParen, "Expect ')' after for clauses.")?;

        self.consume(TokenKind::LeftBrace, "Expect '{' after for clauses.")?;
        let mut body = Stmt::Block(self.block()?);

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }

        body = Stmt::While {
            condition,
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Ok(body)
    }

    pub(crate) fn print_statement(&mut self, require_semicolon: bool) -> ParseResult<Stmt> {
        let value = self.expression()?;
        if require_semicolon {
            self.consume(TokenKind::Semicolon, "Expect ';' after value.")?;
        }
        Ok(Stmt::Print(value))
    }

    pub(crate) fn return_statement(&mut self, require_semicolon: bool) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        let value = if require_semicolon {
            let value = if self.check(TokenKind::Semicolon) {
                None
            } else {
                Some(self.expression()?)
            };
            self.consume(TokenKind::Semicolon, "Expect ';' after return value.")?;
            value
        } else {
            Some(self.expression()?)
        };
        Ok(Stmt::Return { keyword, value })
    }

    fn throw_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        let value = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after throw value.")?;
        Ok(Stmt::Throw { keyword, value })
    }

    fn try_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftBrace, "Expect '{' after try.")?;
        let try_block = self.block()?;

        let mut catch_param = None;
        let mut catch_block = None;
        if self.match_token(TokenKind::Catch) {
            self.consume(TokenKind::LeftParen, "Expect '(' after catch.")?;
            if self.match_token(TokenKind::Identifier) {
                catch_param = Some(self.previous().clone());
            }
            self.consume(TokenKind::RightParen, "Expect ')' after catch parameter.")?;
            self.consume(TokenKind::LeftBrace, "Expect '{' after catch parameter.")?;
            catch_block = Some(self.block()?);
        }

        let finally_block = if self.match_token(TokenKind::Finally) {
            self.consume(TokenKind::LeftBrace, "Expect '{' after finally.")?;
            Some(self.block()?)
        } else {
            None
        };

        if catch_block.is_none() && finally_block.is_none() {
            return Err(ParserError::new(
                self.peek().clone(),
                "Expect catch or finally block.",
            ));
        }

        Ok(Stmt::Try(TryDecl {
            try_block,
            catch_param,
            catch_block,
            finally_block,
        }))
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }
}

