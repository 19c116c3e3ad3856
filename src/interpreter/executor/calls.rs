//! Function, method and class calls.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use crate::ast::Expr;
use crate::error::RuntimeError;
use crate::interpreter::builtins;
use crate::interpreter::class::{Class, InitStatus, Instance, Superclass};
use crate::interpreter::environment::Environment;
use crate::interpreter::value::{Function, Value};
use crate::lexer::Token;

use super::{ControlFlow, Interpreter, RuntimeResult};

impl Interpreter {
    pub(crate) fn evaluate_call(
        &mut self,
        callee: &Expr,
        paren: &Token,
        arguments: &[Expr],
    ) -> RuntimeResult<Value> {
        let callee = self.evaluate(callee)?;

        let mut args = Vec::with_capacity(arguments.len());
        for argument in arguments {
            args.push(self.evaluate_value(argument)?);
        }

        if let Value::Imported(import) = &callee {
            let target = self.deref(callee.clone())?;
            let previous = self.active.replace(import.module);
            let result = self.call_value(target, args, paren);
            self.active = previous;
            if let Ok(value) = &result {
                import.refresh(value.clone());
            }
            return result;
        }

        self.call_value(callee, args, paren)
    }

    /// Call any callable value.
    pub(crate) fn call_value(
        &mut self,
        callee: Value,
        args: Vec<Value>,
        paren: &Token,
    ) -> RuntimeResult<Value> {
        match callee {
            Value::Function(function) => {
                check_arity(function.arity(), args.len(), paren)?;
                self.call_function(&function, args)
            }
            Value::NativeFunction(native) => {
                check_arity(native.arity, args.len(), paren)?;
                trace!(function = %native.name, "calling native function");
                native
                    .call(args)
                    .map_err(|message| RuntimeError::new(message, paren).into())
            }
            Value::Class(class) => {
                check_arity(class.arity(), args.len(), paren)?;
                self.instantiate(class, args, paren)
            }
            Value::BuiltinClass(class) => {
                check_arity(builtins::class_arity(class), args.len(), paren)?;
                builtins::construct(class, &args)
                    .map(Value::Builtin)
                    .map_err(|message| RuntimeError::new(message, paren).into())
            }
            Value::Imported(_) => {
                let target = self.deref(callee)?;
                self.call_value(target, args, paren)
            }
            _ => Err(RuntimeError::NotCallable(paren.clone()).into()),
        }
    }

    /// Run a user function in a fresh frame holding its parameters.
    pub(crate) fn call_function(
        &mut self,
        function: &Rc<Function>,
        args: Vec<Value>,
    ) -> RuntimeResult<Value> {
        trace!(function = function.name(), args = args.len(), "calling function");

        let env = Environment::child_of(&function.closure);
        {
            let mut frame = env.borrow_mut();
            let mut args = args.into_iter();
            for param in &function.declaration.params {
                frame.define_value(param.lexeme.clone(), args.next().unwrap_or(Value::Null));
            }
        }

        let previous = self.active.replace(function.module);
        let result = self.execute_block(&function.declaration.body, env);
        self.active = previous;

        let value = match result? {
            ControlFlow::Return(value) => value,
            ControlFlow::Normal => Value::Null,
        };

        if function.is_initializer {
            let this = function.closure.borrow().get_local("this");
            if let Some(this) = this {
                if let (Value::Instance(instance), Some(class_name)) = (&this, &function.class_name)
                {
                    instance
                        .borrow_mut()
                        .set_status(class_name, InitStatus::Initialized);
                }
                return Ok(this);
            }
        }

        Ok(value)
    }

    /// Invoke a method by name on an instance or built-in value.
    pub(crate) fn call_method(
        &mut self,
        receiver: &Value,
        name: &str,
        args: Vec<Value>,
        token: &Token,
    ) -> RuntimeResult<Value> {
        match receiver {
            Value::Builtin(builtin) => builtins::call_method(builtin, name, args, &self.output)
                .map_err(|message| RuntimeError::new(message, token).into()),
            Value::Instance(_) => {
                let method_token = Token::synthetic(name, token.line);
                let method = self.get_property(receiver, &method_token)?;
                self.call_value(method, args, token)
            }
            _ => Err(RuntimeError::UndefinedMethod(Token::synthetic(name, token.line)).into()),
        }
    }

    /// Create an instance and run the initialization protocol.
    fn instantiate(
        &mut self,
        class: Rc<Class>,
        args: Vec<Value>,
        paren: &Token,
    ) -> RuntimeResult<Value> {
        trace!(class = %class.name, "instantiating class");

        let instance = Rc::new(RefCell::new(Instance::new(class.clone())));
        let value = Value::Instance(instance.clone());

        if let Some(init) = class.own_init() {
            let bound = Rc::new(init.bind(value.clone()));
            self.call_function(&bound, args)?;

            let missing = instance
                .borrow()
                .first_uninitialized()
                .map(str::to_string);
            if let Some(missing) = missing {
                return Err(RuntimeError::new(
                    format!("Superclass '{}' not initialized", missing),
                    paren,
                )
                .into());
            }
            return Ok(value);
        }

        // No initializer of its own: run each superclass initializer, last declared first.
        for superclass in class.superclasses.iter().rev() {
            if !superclass.has_own_init() {
                instance
                    .borrow_mut()
                    .set_status(superclass.name(), InitStatus::Initialized);
                continue;
            }
            instance
                .borrow_mut()
                .set_status(superclass.name(), InitStatus::Initializing);

            let init = match superclass {
                Superclass::Class(parent) => match parent.own_init() {
                    Some(init) => Value::Function(Rc::new(init.bind(value.clone()))),
                    None => continue,
                },
                // Class arity is 0 here, so a built-in ancestor keeps its default backing.
                Superclass::Builtin(_) => {
                    instance
                        .borrow_mut()
                        .set_status(superclass.name(), InitStatus::Initialized);
                    continue;
                }
            };
            self.call_value(init, args.clone(), paren)?;
        }

        Ok(value)
    }
}

fn check_arity(arity: usize, got: usize, paren: &Token) -> Result<(), RuntimeError> {
    if got > arity {
        return Err(RuntimeError::wrong_arity(arity, got, paren));
    }
    Ok(())
}
