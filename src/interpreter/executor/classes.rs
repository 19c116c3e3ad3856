//! Class declarations and `super` access.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::trace;

use crate::ast::{ClassDecl, ExprId, ExprKind};
use crate::error::RuntimeError;
use crate::interpreter::builtins;
use crate::interpreter::class::{Class, InitStatus, Instance, Method, Superclass};
use crate::interpreter::environment::Environment;
use crate::interpreter::resolver::super_binding;
use crate::interpreter::value::{BuiltinClass, Function, Value};
use crate::lexer::Token;

use super::{Interpreter, RuntimeResult};

impl Interpreter {
    pub(crate) fn execute_class(&mut self, class: &ClassDecl) -> RuntimeResult<()> {
        let mut superclasses = Vec::with_capacity(class.superclasses.len());
        let mut bindings = Vec::with_capacity(class.superclasses.len());
        for expr in &class.superclasses {
            let name = match &expr.kind {
                ExprKind::Variable(name) => name,
                _ => &class.name,
            };
            let superclass = match self.evaluate_value(expr)? {
                Value::Class(parent) => Superclass::Class(parent),
                Value::BuiltinClass(builtin) => Superclass::Builtin(builtin),
                _ => return Err(RuntimeError::new("Superclass must be a class.", name).into()),
            };
            bindings.push((super_binding(&name.lexeme), superclass.to_value()));
            superclasses.push(superclass);
        }

        self.environment
            .borrow_mut()
            .define(&class.name, Value::Null)?;

        // Methods of a subclass close over a frame binding each superclass.
        let closure = match superclasses.first() {
            Some(first) => {
                let env = Environment::child_of(&self.environment);
                {
                    let mut frame = env.borrow_mut();
                    frame.define_value("super", first.to_value());
                    for (binding, value) in bindings {
                        frame.define_value(binding, value);
                    }
                }
                env
            }
            None => self.environment.clone(),
        };

        let module = self.active_module()?;
        let methods: HashMap<String, Rc<Function>> = class
            .methods
            .iter()
            .map(|decl| {
                let method =
                    Function::method(decl.clone(), closure.clone(), module, &class.name.lexeme);
                (decl.name.lexeme.clone(), Rc::new(method))
            })
            .collect();

        trace!(class = %class.name.lexeme, methods = methods.len(), "defining class");
        let value = Value::Class(Rc::new(Class::new(
            class.name.lexeme.clone(),
            superclasses,
            methods,
        )));
        self.environment.borrow_mut().assign(&class.name, value)?;
        Ok(())
    }

    /// `super(Name).method`, bound to the current `this`.
    pub(crate) fn evaluate_super(
        &mut self,
        id: ExprId,
        keyword: &Token,
        class_name: &Token,
        method: &Token,
    ) -> RuntimeResult<Value> {
        let module = self.active_module()?;
        let distance = *self
            .modules
            .node(module)
            .locals
            .get(&id)
            .ok_or_else(|| RuntimeError::new("Undefined superclass 'super'.", keyword))?;

        let binding = super_binding(&class_name.lexeme);
        let superclass = Environment::ancestor(&self.environment, distance)?
            .borrow()
            .get_local(&binding)
            .ok_or_else(|| {
                RuntimeError::new(
                    format!("Undefined superclass '{}'.", class_name.lexeme),
                    class_name,
                )
            })?;

        let this_distance = distance
            .checked_sub(1)
            .ok_or_else(|| RuntimeError::internal("No 'this' frame below the superclass frame."))?;
        let this = Environment::get_at(&self.environment, this_distance, "this")?;
        let Value::Instance(instance) = &this else {
            return Err(RuntimeError::internal("'this' is not an instance.").into());
        };

        let is_init = method.lexeme == "init";
        let found = match &superclass {
            Value::Class(parent) => {
                if is_init && parent.own_init().is_none() {
                    // No own init would complete the slot, so the call itself does.
                    instance
                        .borrow_mut()
                        .set_status(&parent.name, InitStatus::Initialized);
                    if parent.find_method("init", true).is_none() {
                        return Ok(empty_super_init(&parent.name));
                    }
                } else if is_init {
                    instance
                        .borrow_mut()
                        .set_status(&parent.name, InitStatus::Initializing);
                }
                parent.find_method(&method.lexeme, true)
            }
            Value::BuiltinClass(builtin) => {
                builtins::has_method(*builtin, &method.lexeme).then_some(Method::Builtin(*builtin))
            }
            _ => return Err(RuntimeError::internal("Superclass binding is not a class.").into()),
        };

        match found {
            Some(Method::User(function)) => Ok(Value::Function(Rc::new(function.bind(this.clone())))),
            Some(Method::Builtin(builtin)) if is_init => {
                instance
                    .borrow_mut()
                    .set_status(builtin.name(), InitStatus::Initializing);
                Ok(builtin_super_init(instance, builtin))
            }
            Some(Method::Builtin(builtin)) => {
                let native = instance.borrow().native(builtin).cloned();
                native
                    .and_then(|native| builtins::bind_method(&native, &method.lexeme, &self.output))
                    .ok_or_else(|| RuntimeError::UndefinedProperty(method.clone()).into())
            }
            None => Err(RuntimeError::UndefinedProperty(method.clone()).into()),
        }
    }
}

/// `super(Name).init` when nothing in the superclass chain declares an `init`.
fn empty_super_init(class_name: &str) -> Value {
    Value::native(format!("{}.init", class_name), 0, |_| Ok(Value::Null))
}

/// The `init` of a built-in superclass: builds the backing instance in place.
pub(crate) fn builtin_super_init(instance: &Rc<RefCell<Instance>>, class: BuiltinClass) -> Value {
    let instance = instance.clone();
    Value::native(
        format!("{}.init", class.name()),
        builtins::class_arity(class),
        move |args| {
            let native = builtins::construct(class, &args)?;
            let mut instance = instance.borrow_mut();
            instance.set_native(class, native);
            instance.set_status(class.name(), InitStatus::Initialized);
            Ok(Value::Null)
        },
    )
}
