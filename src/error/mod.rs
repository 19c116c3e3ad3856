//! Error types for every phase, plus the reporter that prints them.

mod reporter;

pub use reporter::ErrorReporter;

use crate::lexer::Token;
use thiserror::Error;

/// Lexer errors.
#[derive(Debug, Clone, Error)]
pub enum LexerError {
    #[error("Unexpected character: {0}")]
    UnexpectedChar(char, usize),

    #[error("Unterminated string.")]
    UnterminatedString(usize),

    #[error("Invalid number '{0}'.")]
    InvalidNumber(String, usize),
}

impl LexerError {
    pub fn unexpected_char(c: char, line: usize) -> Self {
        Self::UnexpectedChar(c, line)
    }

    pub fn unterminated_string(line: usize) -> Self {
        Self::UnterminatedString(line)
    }

    pub fn invalid_number(s: String, line: usize) -> Self {
        Self::InvalidNumber(s, line)
    }

    pub fn line(&self) -> usize {
        match self {
            Self::UnexpectedChar(_, line) => *line,
            Self::UnterminatedString(line) => *line,
            Self::InvalidNumber(_, line) => *line,
        }
    }
}

/// Parser error: a message anchored at the offending token.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ParserError {
    pub token: Token,
    pub message: String,
}

impl ParserError {
    pub fn new(token: Token, message: impl Into<String>) -> Self {
        Self {
            token,
            message: message.into(),
        }
    }
}

/// Static resolution errors. These are accumulated; the pass never stops at the first one.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("Already a variable with this name in this scope.")]
    DuplicateInScope(Token),

    #[error("Can't read local variable in its own initializer.")]
    ReadInOwnInitializer(Token),

    #[error("Can't return from top-level code.")]
    TopLevelReturn(Token),

    #[error("Can't return a value from an initializer.")]
    ReturnFromInitializer(Token),

    #[error("Can't use 'this' outside of a class.")]
    ThisOutsideClass(Token),

    #[error("Can't use 'super' outside of a class.")]
    SuperOutsideClass(Token),

    #[error("Can't use 'super' in a class with no superclass.")]
    SuperWithoutSuperclass(Token),

    #[error("A class can't inherit from itself.")]
    InheritsFromItself(Token),
}

impl ResolveError {
    pub fn token(&self) -> &Token {
        match self {
            Self::DuplicateInScope(token)
            | Self::ReadInOwnInitializer(token)
            | Self::TopLevelReturn(token)
            | Self::ReturnFromInitializer(token)
            | Self::ThisOutsideClass(token)
            | Self::SuperOutsideClass(token)
            | Self::SuperWithoutSuperclass(token)
            | Self::InheritsFromItself(token) => token,
        }
    }
}

/// Runtime errors.
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    #[error("Undefined variable '{}'.", .0.lexeme)]
    UndefinedVariable(Token),

    #[error("Variable already exists with the name '{}'.", .0.lexeme)]
    DuplicateBinding(Token),

    #[error("Undefined property '{}'.", .0.lexeme)]
    UndefinedProperty(Token),

    #[error("Undefined method '{}'.", .0.lexeme)]
    UndefinedMethod(Token),

    #[error("Can only call functions and classes.")]
    NotCallable(Token),

    #[error("Expected at most {expected} arguments but got {got}.")]
    WrongArity {
        expected: usize,
        got: usize,
        token: Token,
    },

    #[error("Can only throw 'Error' instance, or instances that inherit the 'Error' class.")]
    InvalidThrow(Token),

    #[error("Unable to find file '{path}'")]
    ModuleNotFound { path: String, token: Token },

    #[error("Unable to resolve import")]
    ImportFailed(Token),

    #[error("Unable to find exported item '{}'", .0.lexeme)]
    ExportNotFound(Token),

    /// The resolver and the evaluator disagree about scopes.
    #[error("{message}")]
    Internal { message: String },

    #[error("{message}")]
    General { message: String, token: Token },
}

impl RuntimeError {
    pub fn new(message: impl Into<String>, token: &Token) -> Self {
        Self::General {
            message: message.into(),
            token: token.clone(),
        }
    }

    pub fn undefined_variable(token: &Token) -> Self {
        Self::UndefinedVariable(token.clone())
    }

    pub fn wrong_arity(expected: usize, got: usize, token: &Token) -> Self {
        Self::WrongArity {
            expected,
            got,
            token: token.clone(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The token the error is reported at. Internal errors have none.
    pub fn token(&self) -> Option<&Token> {
        match self {
            Self::UndefinedVariable(token)
            | Self::DuplicateBinding(token)
            | Self::UndefinedProperty(token)
            | Self::UndefinedMethod(token)
            | Self::NotCallable(token)
            | Self::InvalidThrow(token)
            | Self::ImportFailed(token)
            | Self::ExportNotFound(token) => Some(token),
            Self::WrongArity { token, .. }
            | Self::ModuleNotFound { token, .. }
            | Self::General { token, .. } => Some(token),
            Self::Internal { .. } => None,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

/// Top-level error for a whole run.
#[derive(Debug, Error)]
pub enum TriplesError {
    #[error("compilation failed")]
    Compile,

    #[error("execution failed")]
    Runtime,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
