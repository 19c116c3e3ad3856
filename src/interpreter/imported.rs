//! Lazy references to names imported from another module.
//!
//! An import binds each item to an [`ImportedRef`] instead of a copy of the value,
//! so modules that import each other can be loaded before every name exists, and
//! later reassignments in the exporting module stay visible to importers.

use std::cell::RefCell;
use std::path::PathBuf;

use crate::error::RuntimeError;
use crate::interpreter::module_tree::{ModuleId, ModuleTree};
use crate::interpreter::value::Value;
use crate::lexer::Token;

#[derive(Debug, Clone)]
pub enum ImportState {
    Unresolved,
    Resolved(Value),
}

#[derive(Debug)]
pub struct ImportedRef {
    pub path: PathBuf,
    /// The name as exported, before any alias.
    pub name: Token,
    pub module: ModuleId,
    state: RefCell<ImportState>,
}

impl ImportedRef {
    pub fn new(path: PathBuf, name: Token, module: ModuleId) -> Self {
        Self {
            path,
            name,
            module,
            state: RefCell::new(ImportState::Unresolved),
        }
    }

    /// Read the current binding from the exporting module's globals.
    pub fn resolve(&self, modules: &ModuleTree) -> Result<Value, RuntimeError> {
        let value = modules
            .node(self.module)
            .globals
            .borrow()
            .get_local(&self.name.lexeme)
            .ok_or_else(|| RuntimeError::ExportNotFound(self.name.clone()))?;
        self.refresh(value.clone());
        Ok(value)
    }

    /// Replace the cached value.
    pub fn refresh(&self, value: Value) {
        *self.state.borrow_mut() = ImportState::Resolved(value);
    }

    /// The value seen by the last resolution, if any.
    pub fn cached(&self) -> Option<Value> {
        match &*self.state.borrow() {
            ImportState::Resolved(value) => Some(value.clone()),
            ImportState::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(&*self.state.borrow(), ImportState::Resolved(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::environment::Environment;
    use std::rc::Rc;

    #[test]
    fn test_resolve_is_live() {
        let mut tree = ModuleTree::new(Rc::new(RefCell::new(Environment::new())));
        let lib = tree.create_child(None, "/lib.sss");
        let import = ImportedRef::new(
            PathBuf::from("/lib.sss"),
            Token::synthetic("name", 1),
            lib,
        );
        assert!(!import.is_resolved());

        let err = import.resolve(&tree).unwrap_err();
        assert_eq!(err.to_string(), "Unable to find exported item 'name'");

        let globals = tree.node(lib).globals.clone();
        globals.borrow_mut().define_value("name", Value::string("Victor"));
        assert_eq!(import.resolve(&tree).unwrap().to_string(), "Victor");

        globals.borrow_mut().define_value("name", Value::string("Oliver"));
        assert_eq!(import.cached().unwrap().to_string(), "Victor");
        assert_eq!(import.resolve(&tree).unwrap().to_string(), "Oliver");
    }
}
