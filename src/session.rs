//! One interpreter plus the paths a run is rooted at.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ErrorReporter, TriplesError};
use crate::interpreter::Interpreter;
use crate::output::Output;

/// File name assumed for code that does not come from a file.
pub const DEFAULT_ROOT: &str = "index.sss";

/// A TripleS session: every `run` executes in the same root module, so
/// definitions persist from one call to the next.
pub struct Session {
    interpreter: Interpreter,
    root: PathBuf,
    cwd: PathBuf,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_interpreter(Interpreter::new())
    }

    /// A session writing program output and diagnostics to the given sinks.
    pub fn with_output(output: Output, errors: Output) -> Self {
        Self::with_interpreter(Interpreter::with_output(output, ErrorReporter::new(errors)))
    }

    fn with_interpreter(interpreter: Interpreter) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            interpreter,
            root: cwd.join(DEFAULT_ROOT),
            cwd,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Run source code in the root module.
    pub fn run(&mut self, source: &str) -> Result<(), TriplesError> {
        self.interpreter.reporter_mut().reset();

        let Some(statements) = self.interpreter.compile(source) else {
            return Err(TriplesError::Compile);
        };

        let root = self.root.clone();
        self.interpreter.interpret(&root, &statements);

        let reporter = self.interpreter.reporter();
        if reporter.had_runtime_error() {
            Err(TriplesError::Runtime)
        } else if reporter.had_error() {
            Err(TriplesError::Compile)
        } else {
            Ok(())
        }
    }

    /// Run a file; it becomes the root module and its directory the working directory.
    pub fn run_file(&mut self, path: &Path) -> Result<(), TriplesError> {
        let path = path.canonicalize()?;
        let source = std::fs::read_to_string(&path)?;

        if let Some(dir) = path.parent() {
            self.cwd = dir.to_path_buf();
        }
        self.root = path;
        debug!(root = %self.root.display(), "running file");

        self.run(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_run_keeps_definitions() {
        let out = Output::buffer();
        let mut session = Session::with_output(out.clone(), Output::buffer());
        session.run("var a = 1;").unwrap();
        session.run("print a;").unwrap();
        assert_eq!(out.lines(), vec!["1"]);
    }

    #[test]
    fn test_run_classifies_errors() {
        let errors = Output::buffer();
        let mut session = Session::with_output(Output::buffer(), errors.clone());

        assert!(matches!(session.run("var = 1;"), Err(TriplesError::Compile)));
        assert!(matches!(session.run("print nope;"), Err(TriplesError::Runtime)));
        assert!(matches!(session.run("{ var a; var a; }"), Err(TriplesError::Compile)));
        assert!(session.run("print 1;").is_ok());
        assert_eq!(errors.lines().len(), 3);
    }

    #[test]
    fn test_run_file_sets_root_and_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.sss");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "print 'hi';").unwrap();

        let out = Output::buffer();
        let mut session = Session::with_output(out.clone(), Output::buffer());
        session.run_file(&path).unwrap();

        assert_eq!(out.lines(), vec!["hi"]);
        assert_eq!(session.root(), path.canonicalize().unwrap());
        assert_eq!(session.cwd(), dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_run_file_missing() {
        let mut session = Session::with_output(Output::buffer(), Output::buffer());
        let result = session.run_file(Path::new("/definitely/not/here.sss"));
        assert!(matches!(result, Err(TriplesError::Io(_))));
    }
}
