//! Expression parsing, lowest precedence first.

use std::rc::Rc;

use crate::ast::*;
use crate::error::ParserError;
use crate::lexer::{Literal, Token, TokenKind};

use super::core::{ParseResult, Parser, MAX_ARGUMENTS};

impl Parser {
    pub(crate) fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if self.match_token(TokenKind::Equal) {
            let equals = self.previous().clone();
            let value = Box::new(self.assignment()?);

            return Ok(match expr.kind {
                ExprKind::Variable(name) => Expr::new(ExprKind::Assign { name, value }),
                ExprKind::Get { object, name } => Expr::new(ExprKind::Set {
                    object,
                    name,
                    value,
                }),
                ExprKind::GetItem { object, index, .. } => Expr::new(ExprKind::SetItem {
                    object,
                    index,
                    equals,
                    value,
                }),
                kind => {
                    self.report(equals, "Invalid assignment target.");
                    Expr { id: expr.id, kind }
                }
            });
        }

        Ok(expr)
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;

        while self.match_token(TokenKind::Or) {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = Expr::new(ExprKind::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;

        while self.match_token(TokenKind::And) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::new(ExprKind::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Left-associative binary level: `next (op next)*`.
    fn binary_level(
        &mut self,
        operators: &[TokenKind],
        next: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut expr = next(self)?;

        while self.match_any(operators) {
            let operator = self.previous().clone();
            let right = next(self)?;
            expr = Expr::new(ExprKind::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            &[TokenKind::BangEqual, TokenKind::EqualEqual],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            &[
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
            ],
            Self::term,
        )
    }

    fn term(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            &[
                TokenKind::Minus,
                TokenKind::Plus,
                TokenKind::Pipe,
                TokenKind::Ampersand,
            ],
            Self::factor,
        )
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            &[TokenKind::Slash, TokenKind::Star, TokenKind::Percent],
            Self::exponent,
        )
    }

    fn exponent(&mut self) -> ParseResult<Expr> {
        self.binary_level(&[TokenKind::Caret], Self::unary)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.match_any(&[TokenKind::Bang, TokenKind::Minus]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            return Ok(Expr::new(ExprKind::Unary {
                operator,
                right: Box::new(right),
            }));
        }

        self.call()
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            if self.match_token(TokenKind::LeftParen) {
                expr = self.finish_call(expr)?;
            } else if self.match_token(TokenKind::Dot) {
                let name =
                    self.consume(TokenKind::Identifier, "Expect property name after '.'.")?;
                expr = Expr::new(ExprKind::Get {
                    object: Box::new(expr),
                    name,
                });
            } else if self.match_token(TokenKind::LeftBracket) {
                let index = self.expression()?;
                let bracket =
                    self.consume(TokenKind::RightBracket, "Expect ']' after array index.")?;
                expr = Expr::new(ExprKind::GetItem {
                    object: Box::new(expr),
                    bracket,
                    index: Box::new(index),
                });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = Vec::new();

        if !self.check(TokenKind::RightParen) {
            loop {
                if arguments.len() >= MAX_ARGUMENTS {
                    let token = self.peek().clone();
                    self.report(token, "Can't have more than 255 arguments.");
                }
                arguments.push(self.expression()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        let paren = self.consume(TokenKind::RightParen, "Expect ')' after arguments.")?;

        Ok(Expr::new(ExprKind::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        }))
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if self.match_token(TokenKind::False) {
            return Ok(literal(LiteralValue::Bool(false)));
        }
        if self.match_token(TokenKind::True) {
            return Ok(literal(LiteralValue::Bool(true)));
        }
        if self.match_token(TokenKind::Null) {
            return Ok(literal(LiteralValue::Null));
        }
        if self.match_any(&[TokenKind::Number, TokenKind::String]) {
            let value = match &self.previous().literal {
                Some(Literal::Number(n)) => LiteralValue::Number(*n),
                Some(Literal::String(s)) => LiteralValue::String(s.clone()),
                None => LiteralValue::Null,
            };
            return Ok(literal(value));
        }

        if self.match_token(TokenKind::Super) {
            let keyword = self.previous().clone();
            self.consume(TokenKind::LeftParen, "Expect '(' after super")?;
            let class_name = self.consume(TokenKind::Identifier, "Expect superclass name.")?;
            self.consume(TokenKind::RightParen, "Expect ')' after superclass name.")?;
            self.consume(TokenKind::Dot, "Expect '.' after 'super' call.")?;
            let method =
                self.consume(TokenKind::Identifier, "Expect superclass method name.")?;
            return Ok(Expr::new(ExprKind::Super {
                keyword,
                class_name,
                method,
            }));
        }

        if self.match_token(TokenKind::This) {
            return Ok(Expr::new(ExprKind::This(self.previous().clone())));
        }

        if let Some(params) = self.arrow_parameters()? {
            return self.arrow_function(params);
        }

        if self.match_token(TokenKind::LeftBracket) {
            let mut elements = Vec::new();
            if !self.check(TokenKind::RightBracket) {
                loop {
                    elements.push(self.expression()?);
                    if !self.match_token(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.consume(TokenKind::RightBracket, "Expect ']' after array elements.")?;
            return Ok(Expr::new(ExprKind::Array(elements)));
        }

        if self.match_token(TokenKind::Identifier) {
            return Ok(Expr::new(ExprKind::Variable(self.previous().clone())));
        }

        if self.match_token(TokenKind::LeftParen) {
            let expr = self.expression()?;
            self.consume(TokenKind::RightParen, "Expect ')' after expression.")?;
            return Ok(Expr::new(ExprKind::Grouping(Box::new(expr))));
        }

        if self.match_token(TokenKind::LeftBrace) {
            let mut entries: Vec<(Token, Expr)> = Vec::new();
            if !self.check(TokenKind::RightBrace) {
                loop {
                    let key = self.consume(TokenKind::Identifier, "Expect property name.")?;
                    self.consume(TokenKind::Colon, "Expect ':' after property name.")?;
                    let value = self.expression()?;
                    match entries.iter_mut().find(|(k, _)| k.lexeme == key.lexeme) {
                        Some(entry) => entry.1 = value,
                        None => entries.push((key, value)),
                    }
                    if !self.match_token(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.consume(TokenKind::RightBrace, "Expect '}' after object properties.")?;
            return Ok(Expr::new(ExprKind::Map(entries)));
        }

        Err(ParserError::new(self.peek().clone(), "Expect expression."))
    }

    /// Recognize the head of an arrow function and consume it up to and including
    /// the arrow. Returns `None`, consuming nothing, if the upcoming tokens are not
    /// an arrow function.
    fn arrow_parameters(&mut self) -> ParseResult<Option<Vec<Token>>> {
        if self.match_token(TokenKind::Arrow) {
            return Ok(Some(Vec::new()));
        }

        if !self.check(TokenKind::LeftParen) {
            return Ok(None);
        }

        // ( ) ->  or  ( ident (, ident)* ) ->
        let mut offset = 1;
        if self.peek_nth(offset).kind == TokenKind::Identifier {
            offset += 1;
            while self.peek_nth(offset).kind == TokenKind::Comma
                && self.peek_nth(offset + 1).kind == TokenKind::Identifier
            {
                offset += 2;
            }
        }
        if self.peek_nth(offset).kind != TokenKind::RightParen
            || self.peek_nth(offset + 1).kind != TokenKind::Arrow
        {
            return Ok(None);
        }

        self.advance(); // (
        let params = self.parameters()?;
        self.consume(TokenKind::Arrow, "Expect '->' after parameters.")?;
        Ok(Some(params))
    }

    /// Arrow function body: a block, a single `return`/`print`, or an expression
    /// that is implicitly returned.
    fn arrow_function(&mut self, params: Vec<Token>) -> ParseResult<Expr> {
        let line = self.previous().line;

        let body = if self.match_token(TokenKind::LeftBrace) {
            self.block()?
        } else if self.match_token(TokenKind::Return) {
            vec![self.return_statement(false)?]
        } else if self.match_token(TokenKind::Print) {
            vec![self.print_statement(false)?]
        } else {
            let keyword = Token::new(TokenKind::Return, "return", None, line);
            let value = self.expression()?;
            vec![Stmt::Return {
                keyword,
                value: Some(value),
            }]
        };

        Ok(Expr::new(ExprKind::Lambda(Rc::new(FunctionDecl {
            name: Token::synthetic("anonymous", line),
            params,
            body,
            anonymous: true,
        }))))
    }
}

fn literal(value: LiteralValue) -> Expr {
    Expr::new(ExprKind::Literal(value))
}
