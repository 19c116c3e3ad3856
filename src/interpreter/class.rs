//! User classes and their instances.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::interpreter::builtins;
use crate::interpreter::value::{BuiltinClass, BuiltinInstance, Function, Value};

/// A direct superclass: either another user class or a built-in one.
#[derive(Debug, Clone)]
pub enum Superclass {
    Class(Rc<Class>),
    Builtin(BuiltinClass),
}

impl Superclass {
    pub fn name(&self) -> &str {
        match self {
            Superclass::Class(class) => &class.name,
            Superclass::Builtin(class) => class.name(),
        }
    }

    /// Built-in classes always have an initializer.
    pub fn has_own_init(&self) -> bool {
        match self {
            Superclass::Class(class) => class.own_init().is_some(),
            Superclass::Builtin(_) => true,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Superclass::Class(class) => Value::Class(class.clone()),
            Superclass::Builtin(class) => Value::BuiltinClass(*class),
        }
    }
}

/// Where a method lookup landed.
#[derive(Debug, Clone)]
pub enum Method {
    User(Rc<Function>),
    /// Served by the backing instance of this built-in superclass.
    Builtin(BuiltinClass),
}

/// User-defined class
#[derive(Debug)]
pub struct Class {
    pub name: String,
    pub superclasses: Vec<Superclass>,
    pub methods: HashMap<String, Rc<Function>>,
}

impl Class {
    pub fn new(
        name: impl Into<String>,
        superclasses: Vec<Superclass>,
        methods: HashMap<String, Rc<Function>>,
    ) -> Self {
        Self {
            name: name.into(),
            superclasses,
            methods,
        }
    }

    pub fn own_init(&self) -> Option<Rc<Function>> {
        self.methods.get("init").cloned()
    }

    /// Number of parameters of the class's own `init`, or 0.
    pub fn arity(&self) -> usize {
        self.own_init().map(|init| init.arity()).unwrap_or(0)
    }

    /// Own methods first, then each direct superclass depth-first in declaration order.
    pub fn find_method(&self, name: &str, include_inheritance: bool) -> Option<Method> {
        if let Some(method) = self.methods.get(name) {
            return Some(Method::User(method.clone()));
        }
        if !include_inheritance {
            return None;
        }
        self.superclasses.iter().find_map(|superclass| match superclass {
            Superclass::Class(class) => class.find_method(name, true),
            Superclass::Builtin(builtin) => {
                builtins::has_method(*builtin, name).then_some(Method::Builtin(*builtin))
            }
        })
    }

    /// Every built-in class reachable through the superclass chain, depth-first.
    pub fn builtin_ancestors(&self) -> Vec<BuiltinClass> {
        let mut found = Vec::new();
        self.collect_builtins(&mut found);
        found
    }

    fn collect_builtins(&self, found: &mut Vec<BuiltinClass>) {
        for superclass in &self.superclasses {
            match superclass {
                Superclass::Class(class) => class.collect_builtins(found),
                Superclass::Builtin(builtin) => {
                    if !found.contains(builtin) {
                        found.push(*builtin);
                    }
                }
            }
        }
    }

    pub fn inherits_from(&self, builtin: BuiltinClass) -> bool {
        self.builtin_ancestors().contains(&builtin)
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} class>", self.name)
    }
}

/// Initialization progress of one class in an instance's hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStatus {
    NotInitialized,
    Initializing,
    Initialized,
}

#[derive(Debug, Clone)]
pub struct StatusSlot {
    pub class_name: String,
    pub status: InitStatus,
}

/// Instance of a user-defined class
#[derive(Debug)]
pub struct Instance {
    pub class: Rc<Class>,
    pub fields: IndexMap<String, Value>,
    /// The class itself plus each direct superclass.
    pub statuses: Vec<StatusSlot>,
    /// Backing built-in instances for built-in ancestors.
    pub natives: Vec<(BuiltinClass, BuiltinInstance)>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        let mut statuses = vec![StatusSlot {
            class_name: class.name.clone(),
            status: InitStatus::Initialized,
        }];
        for superclass in &class.superclasses {
            statuses.push(StatusSlot {
                class_name: superclass.name().to_string(),
                status: InitStatus::NotInitialized,
            });
        }

        let natives = class
            .builtin_ancestors()
            .into_iter()
            .map(|builtin| (builtin, builtins::default_instance(builtin)))
            .collect();

        let mut fields = IndexMap::new();
        fields.insert("className".to_string(), Value::string(class.name.as_str()));

        Self {
            class,
            fields,
            statuses,
            natives,
        }
    }

    pub fn status(&self, class_name: &str) -> Option<InitStatus> {
        self.statuses
            .iter()
            .find(|slot| slot.class_name == class_name)
            .map(|slot| slot.status)
    }

    /// Update the slot for `class_name`; classes outside the direct hierarchy have none.
    pub fn set_status(&mut self, class_name: &str, status: InitStatus) {
        if let Some(slot) = self
            .statuses
            .iter_mut()
            .find(|slot| slot.class_name == class_name)
        {
            slot.status = status;
        }
    }

    pub fn first_uninitialized(&self) -> Option<&str> {
        self.statuses
            .iter()
            .find(|slot| slot.status != InitStatus::Initialized)
            .map(|slot| slot.class_name.as_str())
    }

    pub fn native(&self, class: BuiltinClass) -> Option<&BuiltinInstance> {
        self.natives
            .iter()
            .find(|(builtin, _)| *builtin == class)
            .map(|(_, native)| native)
    }

    pub fn set_native(&mut self, class: BuiltinClass, value: BuiltinInstance) {
        match self.natives.iter_mut().find(|(builtin, _)| *builtin == class) {
            Some(entry) => entry.1 = value,
            None => self.natives.push((class, value)),
        }
    }

    /// The backing instance an `Error` subclass is thrown as.
    pub fn error_native(&self) -> Option<&BuiltinInstance> {
        self.native(BuiltinClass::Error)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} instance>", self.class.name)?;
        let fields: Vec<String> = self
            .fields
            .iter()
            .filter(|(name, _)| name.as_str() != "className")
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect();
        if !fields.is_empty() {
            write!(f, " {}", fields.join(", "))?;
        }
        Ok(())
    }
}
