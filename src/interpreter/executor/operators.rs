//! Operator dispatch through magic methods.

use crate::error::RuntimeError;
use crate::interpreter::builtins;
use crate::interpreter::value::Value;
use crate::lexer::{Token, TokenKind};

use super::{Interpreter, RuntimeResult};

/// Magic method implementing a binary operator.
pub(crate) fn binary_method(kind: TokenKind) -> Option<&'static str> {
    let name = match kind {
        TokenKind::Plus => "__add__",
        TokenKind::Minus => "__subtract__",
        TokenKind::Star => "__multiply__",
        TokenKind::Slash => "__divide__",
        TokenKind::Percent => "__modulus__",
        TokenKind::Caret => "__power__",
        TokenKind::Pipe => "__pipe__",
        TokenKind::Ampersand => "__ampersand__",
        TokenKind::EqualEqual => "__equal__",
        TokenKind::BangEqual => "__notequal__",
        TokenKind::Less => "__less__",
        TokenKind::LessEqual => "__lessequal__",
        TokenKind::Greater => "__greater__",
        TokenKind::GreaterEqual => "__greaterequal__",
        _ => return None,
    };
    Some(name)
}

/// Magic method implementing a unary operator.
pub(crate) fn unary_method(kind: TokenKind) -> Option<&'static str> {
    match kind {
        TokenKind::Minus => Some("__negate__"),
        TokenKind::Bang => Some("__not__"),
        _ => None,
    }
}

impl Interpreter {
    /// Whether `value` answers to `name`, inherited methods included.
    pub(crate) fn has_method(&self, value: &Value, name: &str) -> bool {
        match value {
            Value::Instance(instance) => instance.borrow().class.find_method(name, true).is_some(),
            Value::Builtin(builtin) => builtins::has_method(builtin.class(), name),
            _ => false,
        }
    }

    /// `left op right`: the left operand's method, else the right operand's.
    pub(crate) fn binary_operation(
        &mut self,
        left: Value,
        operator: &Token,
        right: Value,
    ) -> RuntimeResult<Value> {
        let method = binary_method(operator.kind)
            .ok_or_else(|| RuntimeError::new("Invalid binary operator.", operator))?;

        if self.has_method(&left, method) {
            return self.call_method(&left, method, vec![right], operator);
        }
        if self.has_method(&right, method) {
            return self.call_method(&right, method, vec![left], operator);
        }

        if left.is_null() && right.is_null() {
            return match operator.kind {
                TokenKind::EqualEqual => Ok(Value::boolean(true)),
                TokenKind::BangEqual => Ok(Value::boolean(false)),
                _ => Err(RuntimeError::new("Invalid binary operator on nulls.", operator).into()),
            };
        }

        Err(RuntimeError::new("Invalid binary operator.", operator).into())
    }

    pub(crate) fn unary_operation(
        &mut self,
        operator: &Token,
        operand: Value,
    ) -> RuntimeResult<Value> {
        match unary_method(operator.kind) {
            Some(method) if self.has_method(&operand, method) => {
                self.call_method(&operand, method, Vec::new(), operator)
            }
            _ => Err(RuntimeError::new("Invalid unary operation.", operator).into()),
        }
    }
}
