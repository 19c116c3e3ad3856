//! `import`, `export` and imported references.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::debug;

use crate::ast::{ImportDecl, Stmt};
use crate::error::RuntimeError;
use crate::interpreter::imported::ImportedRef;
use crate::interpreter::module_tree::ModuleState;
use crate::interpreter::value::Value;
use crate::lexer::Scanner;
use crate::parser::Parser;

use super::{ControlFlow, Interpreter, RuntimeResult};

/// Source file extension of TripleS modules.
pub const EXTENSION: &str = "sss";

/// Longest chain of references to references followed before giving up.
const MAX_IMPORT_HOPS: usize = 64;

impl Interpreter {
    /// Scan and parse `source`, reporting every error. `None` if anything failed.
    pub fn compile(&mut self, source: &str) -> Option<Vec<Stmt>> {
        let tokens = match Scanner::new(source).scan_tokens() {
            Ok(tokens) => tokens,
            Err(errors) => {
                for error in &errors {
                    self.reporter.lexer_error(error);
                }
                return None;
            }
        };

        match Parser::new(tokens).parse() {
            Ok(statements) => Some(statements),
            Err(errors) => {
                for error in &errors {
                    self.reporter.parser_error(error);
                }
                None
            }
        }
    }

    /// Follow imported references down to the value they name.
    pub(crate) fn deref(&self, value: Value) -> Result<Value, RuntimeError> {
        let mut value = value;
        for _ in 0..MAX_IMPORT_HOPS {
            match value {
                Value::Imported(import) => value = import.resolve(&self.modules)?,
                other => return Ok(other),
            }
        }
        match value {
            Value::Imported(import) => Err(RuntimeError::new(
                format!("Circular import of '{}'.", import.name.lexeme),
                &import.name,
            )),
            other => Ok(other),
        }
    }

    pub(crate) fn execute_import(&mut self, import: &ImportDecl) -> RuntimeResult<()> {
        let current = self.active_module()?;
        let path = self.import_path(&import.path.string_value());

        if !path.is_file() {
            return Err(RuntimeError::ModuleNotFound {
                path: path.display().to_string(),
                token: import.path.clone(),
            }
            .into());
        }
        let path = path.canonicalize().unwrap_or(path);

        if let Some(existing) = self.modules.search_tree(current, &path) {
            debug!(path = %path.display(), "module already in the import graph");
            self.modules.add_child(current, existing);
        } else {
            let source = std::fs::read_to_string(&path).map_err(|_| RuntimeError::ModuleNotFound {
                path: path.display().to_string(),
                token: import.path.clone(),
            })?;
            let Some(statements) = self.compile(&source) else {
                return Err(RuntimeError::ImportFailed(import.path.clone()).into());
            };
            self.interpret(&path, &statements);
        }

        if self.reporter.had_error() {
            return Err(RuntimeError::ImportFailed(import.path.clone()).into());
        }

        let target = self
            .modules
            .find_child(current, &path)
            .or_else(|| self.modules.lookup(&path))
            .ok_or_else(|| RuntimeError::ImportFailed(import.path.clone()))?;

        for item in &import.items {
            // A module that finished loading must already define the name.
            // One still loading (a cycle) is checked when the reference is first used.
            let node = self.modules.node(target);
            if node.state == ModuleState::Loaded
                && !node.globals.borrow().contains_local(&item.name.lexeme)
            {
                return Err(RuntimeError::ExportNotFound(item.name.clone()).into());
            }

            debug!(
                name = %item.name.lexeme,
                binding = %item.binding().lexeme,
                path = %path.display(),
                "binding import"
            );
            let reference = ImportedRef::new(path.clone(), item.name.clone(), target);
            self.environment
                .borrow_mut()
                .define(item.binding(), Value::Imported(Rc::new(reference)))?;
        }
        Ok(())
    }

    pub(crate) fn execute_export(&mut self, inner: &Stmt) -> RuntimeResult<ControlFlow> {
        let flow = self.execute(inner)?;

        let module = self.active_module()?;
        if !self.modules.node(module).is_imported() {
            return Ok(flow);
        }

        let name = match inner {
            Stmt::Var { name, .. } => name,
            Stmt::Function(decl) => &decl.name,
            Stmt::Class(class) => &class.name,
            _ => return Ok(flow),
        };
        let value = self.environment.borrow().get(name)?;
        self.modules
            .node(module)
            .exports
            .borrow_mut()
            .define_value(name.lexeme.clone(), value);
        Ok(flow)
    }

    /// Paths starting with `.` are relative to the importing module's directory.
    fn import_path(&self, raw: &str) -> PathBuf {
        if !raw.starts_with('.') {
            return PathBuf::from(raw);
        }

        let base = self
            .active
            .and_then(|id| self.modules.node(id).path.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        let mut path = base.join(raw);
        if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
            let mut file = path.into_os_string();
            file.push(".");
            file.push(EXTENSION);
            path = PathBuf::from(file);
        }
        path
    }
}
