//! Statement execution.

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{Stmt, TryDecl};
use crate::error::RuntimeError;
use crate::interpreter::environment::Environment;
use crate::interpreter::value::{BuiltinInstance, ErrorData, Function, Value};
use crate::lexer::Token;

use super::{ControlFlow, Interpreter, RuntimeResult, Unwind};

impl Interpreter {
    /// Execute a statement.
    pub(crate) fn execute(&mut self, stmt: &Stmt) -> RuntimeResult<ControlFlow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(ControlFlow::Normal)
            }

            Stmt::Print(expr) => {
                let value = self.evaluate_value(expr)?;
                self.output.write_line(&value.to_string());
                Ok(ControlFlow::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(init) => self.evaluate_value(init)?,
                    None => Value::Null,
                };
                self.environment.borrow_mut().define(name, value)?;
                Ok(ControlFlow::Normal)
            }

            Stmt::Block(statements) => {
                let env = Environment::child_of(&self.environment);
                self.execute_block(statements, env)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate_value(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(ControlFlow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate_value(condition)?.is_truthy() {
                    if let ControlFlow::Return(value) = self.execute(body)? {
                        return Ok(ControlFlow::Return(value));
                    }
                }
                Ok(ControlFlow::Normal)
            }

            Stmt::Function(decl) => {
                let function = Function::new(
                    decl.clone(),
                    self.environment.clone(),
                    self.active_module()?,
                );
                self.environment
                    .borrow_mut()
                    .define(&decl.name, Value::Function(Rc::new(function)))?;
                Ok(ControlFlow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate_value(expr)?,
                    None => Value::Null,
                };
                Ok(ControlFlow::Return(value))
            }

            Stmt::Class(class) => {
                self.execute_class(class)?;
                Ok(ControlFlow::Normal)
            }

            Stmt::Import(import) => {
                self.execute_import(import)?;
                Ok(ControlFlow::Normal)
            }

            Stmt::Export(inner) => self.execute_export(inner),

            Stmt::Throw { keyword, value } => {
                let value = self.evaluate_value(value)?;
                Err(self.throw_value(value, keyword)?)
            }

            Stmt::Try(decl) => self.execute_try(decl),
        }
    }

    /// Run `try`, then `catch` for user-thrown errors, then `finally` no matter what.
    fn execute_try(&mut self, decl: &TryDecl) -> RuntimeResult<ControlFlow> {
        let env = Environment::child_of(&self.environment);
        let mut result = self.execute_block(&decl.try_block, env);

        if let (Err(Unwind::Throw(error)), Some(catch_block)) = (&result, &decl.catch_block) {
            let error = error.clone();
            let env = Environment::child_of(&self.environment);
            if let Some(param) = &decl.catch_param {
                env.borrow_mut().define(
                    param,
                    Value::Builtin(BuiltinInstance::Error(error)),
                )?;
            }
            result = self.execute_block(catch_block, env);
        }

        if let Some(finally_block) = &decl.finally_block {
            let env = Environment::child_of(&self.environment);
            match self.execute_block(finally_block, env)? {
                ControlFlow::Normal => {}
                // A return inside finally wins over whatever came before.
                flow @ ControlFlow::Return(_) => return Ok(flow),
            }
        }

        result
    }

    /// Turn a thrown value into an unwinding error, tagged with the `throw` token.
    fn throw_value(&mut self, value: Value, keyword: &Token) -> RuntimeResult<Unwind> {
        match value {
            Value::Builtin(BuiltinInstance::Error(error)) => {
                error.borrow_mut().token = Some(keyword.clone());
                Ok(Unwind::Throw(error))
            }
            Value::Instance(instance) if instance.borrow().error_native().is_some() => {
                let message = self.call_method(
                    &Value::Instance(instance.clone()),
                    "getMessage",
                    Vec::new(),
                    keyword,
                )?;
                let message = format!("{}\n{}", message, instance.borrow());
                Ok(Unwind::Throw(Rc::new(RefCell::new(ErrorData {
                    message: Value::string(message),
                    token: Some(keyword.clone()),
                }))))
            }
            _ => Err(RuntimeError::InvalidThrow(keyword.clone()).into()),
        }
    }
}
