//! Parser module for TripleS.

mod core;
mod declarations;
mod expressions;
mod statements;

#[cfg(test)]
mod tests;

pub use self::core::Parser;
