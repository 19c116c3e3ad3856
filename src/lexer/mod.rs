//! Lexer module for TripleS.

pub mod scanner;
pub mod token;

pub use scanner::Scanner;
pub use token::{Literal, Token, TokenKind};
