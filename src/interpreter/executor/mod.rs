//! Tree-walking interpreter for TripleS.

mod calls;
mod classes;
mod expressions;
mod modules;
mod operators;
mod statements;

#[cfg(test)]
mod tests;

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use tracing::debug;

use crate::ast::Stmt;
use crate::error::{ErrorReporter, RuntimeError};
use crate::interpreter::builtins::register_builtins;
use crate::interpreter::environment::Environment;
use crate::interpreter::module_tree::{ModuleId, ModuleState, ModuleTree};
use crate::interpreter::resolver::Resolver;
use crate::interpreter::value::{ErrorData, Value};
use crate::output::Output;

/// Why evaluation stopped early.
#[derive(Debug)]
pub(crate) enum Unwind {
    /// A failure of the interpreter itself or of a built-in.
    Error(RuntimeError),
    /// A user `throw`; only these are caught by `try/catch`.
    Throw(Rc<RefCell<ErrorData>>),
}

impl From<RuntimeError> for Unwind {
    fn from(error: RuntimeError) -> Self {
        Unwind::Error(error)
    }
}

pub(crate) type RuntimeResult<T> = Result<T, Unwind>;

/// Result of executing a statement.
pub(crate) enum ControlFlow {
    Normal,
    Return(Value),
}

/// The TripleS interpreter.
pub struct Interpreter {
    pub(crate) modules: ModuleTree,
    /// Module whose side-table and globals are in effect.
    pub(crate) active: Option<ModuleId>,
    pub(crate) environment: Rc<RefCell<Environment>>,
    pub(crate) reporter: ErrorReporter,
    pub(crate) output: Output,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Program output on stdout, diagnostics on stderr.
    pub fn new() -> Self {
        Self::with_output(Output::Stdout, ErrorReporter::stderr())
    }

    pub fn with_output(output: Output, reporter: ErrorReporter) -> Self {
        let builtins = Rc::new(RefCell::new(Environment::new()));
        register_builtins(&mut builtins.borrow_mut());

        Self {
            modules: ModuleTree::new(builtins.clone()),
            active: None,
            environment: builtins,
            reporter,
            output,
        }
    }

    pub fn reporter(&self) -> &ErrorReporter {
        &self.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut ErrorReporter {
        &mut self.reporter
    }

    pub fn modules(&self) -> &ModuleTree {
        &self.modules
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Resolve and run one module's statements.
    ///
    /// With no active module this is a top-level run: the module for `path` is
    /// created on first use and reused afterwards, so a REPL keeps its definitions.
    /// Inside an import, a path already present in the import graph is only
    /// re-attached as a child and never runs twice.
    pub fn interpret(&mut self, path: &Path, statements: &[Stmt]) {
        let Some(current) = self.active else {
            let root = match self.modules.lookup(path) {
                Some(root) => root,
                None => self.modules.create_child(None, path),
            };
            debug!(path = %path.display(), "running root module");
            self.run_module(root, statements);
            self.environment = self.modules.builtins().clone();
            return;
        };

        if let Some(existing) = self.modules.search_tree(current, path) {
            debug!(path = %path.display(), "reusing loaded module");
            self.modules.add_child(current, existing);
            return;
        }

        let child = self.modules.create_child(Some(current), path);
        self.modules.add_child(current, child);
        debug!(path = %path.display(), "loading module");

        let previous_env = self.environment.clone();
        self.run_module(child, statements);
        self.active = Some(current);
        self.environment = previous_env;
    }

    fn run_module(&mut self, id: ModuleId, statements: &[Stmt]) {
        self.active = Some(id);
        self.environment = self.modules.node(id).globals.clone();

        match Resolver::new().resolve(statements) {
            Ok(locals) => self.modules.node_mut(id).locals.extend(locals),
            Err(errors) => {
                for error in &errors {
                    self.reporter.resolve_error(error);
                }
                self.modules.node_mut(id).state = ModuleState::Loaded;
                self.active = None;
                return;
            }
        }

        for stmt in statements {
            if let Err(unwind) = self.execute(stmt) {
                self.report(unwind);
                break;
            }
        }

        self.modules.node_mut(id).state = ModuleState::Loaded;
        self.active = None;
    }

    /// Report an uncaught failure.
    pub(crate) fn report(&mut self, unwind: Unwind) {
        match unwind {
            Unwind::Error(error) => self.reporter.runtime_error(&error),
            Unwind::Throw(error) => {
                let error = error.borrow();
                self.reporter
                    .thrown(&error.message.to_string(), error.token.as_ref());
            }
        }
    }

    /// Execute statements in `env`, restoring the previous frame afterwards.
    pub(crate) fn execute_block(
        &mut self,
        statements: &[Stmt],
        env: Rc<RefCell<Environment>>,
    ) -> RuntimeResult<ControlFlow> {
        let previous = std::mem::replace(&mut self.environment, env);

        let mut result = Ok(ControlFlow::Normal);
        for stmt in statements {
            result = self.execute(stmt);
            if !matches!(result, Ok(ControlFlow::Normal)) {
                break;
            }
        }

        self.environment = previous;
        result
    }

    /// Id of the module being executed.
    pub(crate) fn active_module(&self) -> Result<ModuleId, RuntimeError> {
        self.active
            .ok_or_else(|| RuntimeError::internal("No module is being executed."))
    }

    pub(crate) fn globals(&self) -> Result<Rc<RefCell<Environment>>, RuntimeError> {
        Ok(self.modules.node(self.active_module()?).globals.clone())
    }
}
