//! TripleS: a dynamically-typed, class-based scripting language with closures,
//! modules and operator overloading.
//!
//! This is the library root that exports all modules.
//!
//! # Pipeline
//!
//! Source text goes through the [`lexer`], the [`parser`], the resolver and finally
//! the tree-walking [`interpreter`]. Imports run the same pipeline recursively.

#![allow(clippy::module_inception)]
#![allow(clippy::result_large_err)]
#![allow(clippy::new_without_default)]
#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_else_if)]
#![allow(clippy::type_complexity)]

pub mod ast;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod repl;
pub mod session;

use std::path::Path;

use error::TriplesError;
use output::Output;
use session::Session;

/// Run a TripleS program from source code, printing to stdout.
pub fn run(source: &str) -> Result<(), TriplesError> {
    Session::new().run(source)
}

/// Run a TripleS program from a file path with module resolution.
pub fn run_file(path: &Path) -> Result<(), TriplesError> {
    Session::new().run_file(path)
}

/// Run a program and collect what it printed, one entry per line.
pub fn run_captured(source: &str) -> (Result<(), TriplesError>, Vec<String>) {
    let output = Output::buffer();
    let result = Session::with_output(output.clone(), Output::Stderr).run(source);
    (result, output.lines())
}

/// Parse source code into statements without executing.
pub fn parse(source: &str) -> Result<Vec<ast::Stmt>, TriplesError> {
    let tokens = lexer::Scanner::new(source)
        .scan_tokens()
        .map_err(|_| TriplesError::Compile)?;
    parser::Parser::new(tokens)
        .parse()
        .map_err(|_| TriplesError::Compile)
}
