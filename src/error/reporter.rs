//! Diagnostic reporting in the `[line N] Error at 'x': message` format.

use colored::Colorize;

use crate::error::{LexerError, ParserError, ResolveError, RuntimeError};
use crate::lexer::Token;
use crate::output::Output;

/// Collects the error flags for a run and writes every diagnostic to its sink.
#[derive(Debug, Default)]
pub struct ErrorReporter {
    sink: Output,
    had_error: bool,
    had_runtime_error: bool,
    count: usize,
}

impl ErrorReporter {
    pub fn new(sink: Output) -> Self {
        Self {
            sink,
            had_error: false,
            had_runtime_error: false,
            count: 0,
        }
    }

    pub fn stderr() -> Self {
        Self::new(Output::Stderr)
    }

    /// A compile-time or resolve-time error was reported since the last reset.
    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Total number of diagnostics written.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn reset(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
    }

    pub fn sink(&self) -> &Output {
        &self.sink
    }

    pub fn lexer_error(&mut self, error: &LexerError) {
        self.report(error.line(), "", &error.to_string());
    }

    pub fn parser_error(&mut self, error: &ParserError) {
        self.error_at(&error.token, &error.message);
    }

    pub fn resolve_error(&mut self, error: &ResolveError) {
        self.error_at(error.token(), &error.to_string());
    }

    /// Report an uncaught runtime failure.
    pub fn runtime_error(&mut self, error: &RuntimeError) {
        match error.token() {
            Some(token) => self.error_at(token, &error.to_string()),
            None => self.write(&error.to_string()),
        }
        self.had_runtime_error = true;
    }

    /// Report an uncaught user-thrown error, at its `throw` token when it has one.
    pub fn thrown(&mut self, message: &str, token: Option<&Token>) {
        match token {
            Some(token) => self.error_at(token, message),
            None => self.write(message),
        }
        self.had_runtime_error = true;
    }

    pub fn error_at(&mut self, token: &Token, message: &str) {
        let location = format!("at {}", token);
        self.report(token.line, &location, message);
    }

    pub fn report(&mut self, line: usize, location: &str, message: &str) {
        self.had_error = true;
        let line_tag = format!("[line {}]", line);
        let text = if self.sink.is_terminal() {
            format!(
                "{} {} {}: {}",
                line_tag.dimmed(),
                "Error".red().bold(),
                location,
                message
            )
        } else {
            format!("{} Error {}: {}", line_tag, location, message)
        };
        self.write(&text);
    }

    fn write(&mut self, text: &str) {
        self.count += 1;
        self.sink.write_line(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenKind;

    #[test]
    fn test_error_at_token() {
        let sink = Output::buffer();
        let mut reporter = ErrorReporter::new(sink.clone());
        let token = Token::new(TokenKind::Throw, "throw", None, 3);
        reporter.thrown("boom", Some(&token));
        assert_eq!(sink.lines(), vec!["[line 3] Error at 'throw': boom"]);
        assert!(reporter.had_runtime_error());
    }

    #[test]
    fn test_error_at_end() {
        let sink = Output::buffer();
        let mut reporter = ErrorReporter::new(sink.clone());
        reporter.parser_error(&ParserError::new(Token::eof(7), "Expect expression."));
        assert_eq!(sink.lines(), vec!["[line 7] Error at end: Expect expression."]);
        assert!(reporter.had_error());
        reporter.reset();
        assert!(!reporter.had_error());
    }

    #[test]
    fn test_lexer_error_has_no_location() {
        let sink = Output::buffer();
        let mut reporter = ErrorReporter::new(sink.clone());
        reporter.lexer_error(&LexerError::unexpected_char('#', 2));
        assert_eq!(sink.lines(), vec!["[line 2] Error : Unexpected character: #"]);
    }
}
