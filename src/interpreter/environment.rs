//! Runtime environment for variable scopes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::interpreter::value::Value;
use crate::lexer::Token;

/// A runtime environment containing variable bindings.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Self {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// A fresh frame wrapped for sharing, enclosed by `enclosing`.
    pub fn child_of(enclosing: &Rc<RefCell<Environment>>) -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Self::with_enclosing(enclosing.clone())))
    }

    /// Define a new variable in this frame. A name may be bound only once per frame.
    pub fn define(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if self.values.contains_key(&name.lexeme) {
            return Err(RuntimeError::DuplicateBinding(name.clone()));
        }
        self.values.insert(name.lexeme.clone(), value);
        Ok(())
    }

    /// Bind a name that never appears in source (`this`, `super(A)`, built-ins).
    pub fn define_value(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Get a variable's value, searching up the scope chain.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.get(&name.lexeme) {
            return Ok(value.clone());
        }
        match self.enclosing {
            Some(ref enclosing) => enclosing.borrow().get(name),
            None => Err(RuntimeError::undefined_variable(name)),
        }
    }

    /// Assign to the nearest frame that already binds the name.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            return Ok(());
        }
        match self.enclosing {
            Some(ref enclosing) => enclosing.borrow_mut().assign(name, value),
            None => Err(RuntimeError::undefined_variable(name)),
        }
    }

    /// Get a variable from this frame only.
    #[inline]
    pub fn get_local(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    /// Check if a variable exists in this frame only.
    pub fn contains_local(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Names bound in this frame, for REPL introspection.
    pub fn get_var_names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    pub fn enclosing(&self) -> Option<Rc<RefCell<Environment>>> {
        self.enclosing.clone()
    }

    /// The frame exactly `distance` hops out from `env`.
    pub fn ancestor(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
    ) -> Result<Rc<RefCell<Environment>>, RuntimeError> {
        let mut current = env.clone();
        for _ in 0..distance {
            let next = current.borrow().enclosing.clone().ok_or_else(|| {
                RuntimeError::internal(format!(
                    "Unable to find enclosing environment at distance {}.",
                    distance
                ))
            })?;
            current = next;
        }
        Ok(current)
    }

    /// Read `name` from the frame `distance` hops out. The resolver guarantees the
    /// binding is there, so a miss is an internal error.
    pub fn get_at(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &str,
    ) -> Result<Value, RuntimeError> {
        Self::ancestor(env, distance)?
            .borrow()
            .get_local(name)
            .ok_or_else(|| {
                RuntimeError::internal(format!(
                    "Undefined local variable '{}' at distance {}.",
                    name, distance
                ))
            })
    }

    /// Write `name` in the frame `distance` hops out.
    pub fn assign_at(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &Token,
        value: Value,
    ) -> Result<(), RuntimeError> {
        let frame = Self::ancestor(env, distance)?;
        let mut frame = frame.borrow_mut();
        match frame.values.get_mut(&name.lexeme) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(RuntimeError::undefined_variable(name)),
        }
    }
}
