//! Line-oriented output sinks for program output and diagnostics.

use std::cell::RefCell;
use std::io::{self, IsTerminal, Write};
use std::rc::Rc;

/// Where `print`, `Logger.log` and error reports end up.
///
/// Cloning a buffer sink shares the same underlying buffer, so a test can hand one
/// clone to the interpreter and read the other afterwards.
#[derive(Debug, Clone, Default)]
pub enum Output {
    #[default]
    Stdout,
    Stderr,
    Buffer(Rc<RefCell<Vec<String>>>),
}

impl Output {
    /// An in-memory sink.
    pub fn buffer() -> Self {
        Self::Buffer(Rc::new(RefCell::new(Vec::new())))
    }

    pub fn write_line(&self, line: &str) {
        match self {
            Self::Stdout => {
                let mut out = io::stdout().lock();
                let _ = writeln!(out, "{}", line);
                let _ = out.flush();
            }
            Self::Stderr => {
                let _ = writeln!(io::stderr().lock(), "{}", line);
            }
            Self::Buffer(lines) => lines.borrow_mut().push(line.to_string()),
        }
    }

    /// Lines written so far. Always empty for the standard streams.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Buffer(lines) => lines.borrow().clone(),
            _ => Vec::new(),
        }
    }

    /// Whether ANSI styling makes sense for this sink.
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Stdout => io::stdout().is_terminal(),
            Self::Stderr => io::stderr().is_terminal(),
            Self::Buffer(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_clones_share_lines() {
        let out = Output::buffer();
        let other = out.clone();
        other.write_line("hello");
        assert_eq!(out.lines(), vec!["hello".to_string()]);
        assert!(!out.is_terminal());
    }
}
