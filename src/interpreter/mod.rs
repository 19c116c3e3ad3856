//! Interpreter module for TripleS.

pub mod builtins;
pub mod class;
pub mod environment;
pub mod executor;
pub mod imported;
pub mod module_tree;
pub mod resolver;
pub mod value;

pub use class::{Class, InitStatus, Instance};
pub use environment::Environment;
pub use executor::Interpreter;
pub use imported::ImportedRef;
pub use module_tree::{ModuleId, ModuleState, ModuleTree};
pub use resolver::Resolver;
pub use value::{BuiltinClass, BuiltinInstance, Function, Value};
