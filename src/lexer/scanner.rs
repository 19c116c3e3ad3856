//! Scanner for TripleS source code.

use crate::error::LexerError;
use crate::lexer::token::{Literal, Token, TokenKind};

/// The scanner turns source text into a token stream.
///
/// Scanning does not stop at the first bad character: every lexical error in the
/// source is collected and returned together.
pub struct Scanner {
    source: Vec<char>,
    tokens: Vec<Token>,
    errors: Vec<LexerError>,
    start: usize,
    current: usize,
    line: usize,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            tokens: Vec::new(),
            errors: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
        }
    }

    /// Scan all tokens from the source, terminated by an `Eof` token.
    pub fn scan_tokens(mut self) -> Result<Vec<Token>, Vec<LexerError>> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }
        self.tokens.push(Token::eof(self.line));

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '{' => self.add_token(TokenKind::LeftBrace),
            '}' => self.add_token(TokenKind::RightBrace),
            '[' => self.add_token(TokenKind::LeftBracket),
            ']' => self.add_token(TokenKind::RightBracket),
            ',' => self.add_token(TokenKind::Comma),
            '.' => self.add_token(TokenKind::Dot),
            ':' => self.add_token(TokenKind::Colon),
            ';' => self.add_token(TokenKind::Semicolon),
            '^' => self.add_token(TokenKind::Caret),
            '%' => self.add_token(TokenKind::Percent),
            '*' => self.add_token(TokenKind::Star),
            '+' => self.add_token(TokenKind::Plus),
            '-' => {
                let kind = if self.match_char('>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Minus
                };
                self.add_token(kind);
            }
            '|' => {
                let kind = if self.match_char('|') {
                    TokenKind::Or
                } else {
                    TokenKind::Pipe
                };
                self.add_token(kind);
            }
            '&' => {
                let kind = if self.match_char('&') {
                    TokenKind::And
                } else {
                    TokenKind::Ampersand
                };
                self.add_token(kind);
            }
            '!' => {
                let kind = if self.match_char('=') {
                    TokenKind::BangEqual
                } else {
                    TokenKind::Bang
                };
                self.add_token(kind);
            }
            '=' => {
                let kind = if self.match_char('=') {
                    TokenKind::EqualEqual
                } else {
                    TokenKind::Equal
                };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.match_char('=') {
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                };
                self.add_token(kind);
            }
            '>' => {
                let kind = if self.match_char('=') {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                };
                self.add_token(kind);
            }
            '/' => {
                if self.match_char('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(TokenKind::Slash);
                }
            }
            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,
            '\'' | '"' => self.string(c),
            c if c.is_ascii_digit() => self.number(),
            c if is_alpha(c) => self.identifier(),
            c => self.errors.push(LexerError::unexpected_char(c, self.line)),
        }
    }

    fn string(&mut self, quote: char) {
        let start_line = self.line;
        let mut value = String::new();

        while self.peek() != quote && !self.is_at_end() {
            let c = self.advance();
            match c {
                '\n' => {
                    self.line += 1;
                    value.push(c);
                }
                '\\' if !self.is_at_end() => self.escape(&mut value),
                _ => value.push(c),
            }
        }

        if self.is_at_end() {
            self.errors
                .push(LexerError::unterminated_string(start_line.max(self.line)));
            return;
        }

        // The closing quote.
        self.advance();
        self.add_literal(TokenKind::String, Literal::String(value));
    }

    fn escape(&mut self, value: &mut String) {
        let c = self.advance();
        match c {
            'b' => value.push('\u{8}'),
            'f' => value.push('\u{c}'),
            'r' => value.push('\r'),
            'n' => value.push('\n'),
            't' => value.push('\t'),
            'v' => value.push('\u{b}'),
            '0' => value.push('\0'),
            '\\' | '\'' | '"' => value.push(c),
            'u' => {
                if let Some(ch) = self.unicode_escape() {
                    value.push(ch);
                } else {
                    value.push('\\');
                    value.push('u');
                }
            }
            other => {
                // Unknown escapes are kept verbatim.
                value.push('\\');
                value.push(other);
            }
        }
    }

    /// `\u{XXXX}` with exactly four hex digits.
    fn unicode_escape(&mut self) -> Option<char> {
        if self.peek() != '{' {
            return None;
        }
        let digits: String = self.source.get(self.current + 1..self.current + 5)?.iter().collect();
        if self.source.get(self.current + 5) != Some(&'}') {
            return None;
        }
        let code = u32::from_str_radix(&digits, 16).ok()?;
        let ch = char::from_u32(code)?;
        self.current += 6;
        Some(ch)
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text = self.lexeme();
        match text.parse::<f64>() {
            Ok(n) => self.add_literal(TokenKind::Number, Literal::Number(n)),
            Err(_) => self.errors.push(LexerError::invalid_number(text, self.line)),
        }
    }

    fn identifier(&mut self) {
        while is_alpha_numeric(self.peek()) {
            self.advance();
        }

        let text = self.lexeme();
        let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Identifier);
        self.add_token(kind);
    }

    fn lexeme(&self) -> String {
        self.source[self.start..self.current].iter().collect()
    }

    fn add_token(&mut self, kind: TokenKind) {
        let token = Token::new(kind, self.lexeme(), None, self.line);
        self.tokens.push(token);
    }

    fn add_literal(&mut self, kind: TokenKind, literal: Literal) {
        let token = Token::new(kind, self.lexeme(), Some(literal), self.line);
        self.tokens.push(token);
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == expected && !self.is_at_end() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    fn peek(&self) -> char {
        self.source.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.source.get(self.current + 1).copied().unwrap_or('\0')
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_alpha_numeric(c: char) -> bool {
    is_alpha(c) || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Scanner::new(source)
            .scan_tokens()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("-> || && | & != == <= >= ^"),
            vec![
                TokenKind::Arrow,
                TokenKind::Or,
                TokenKind::And,
                TokenKind::Pipe,
                TokenKind::Ampersand,
                TokenKind::BangEqual,
                TokenKind::EqualEqual,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::Caret,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("from 'x' import a as b;"),
            vec![
                TokenKind::From,
                TokenKind::String,
                TokenKind::Import,
                TokenKind::Identifier,
                TokenKind::As,
                TokenKind::Identifier,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        let tokens = Scanner::new(r#"'it\'s\n\u{0041}'"#).scan_tokens().unwrap();
        assert_eq!(
            tokens[0].literal,
            Some(Literal::String("it's\nA".to_string()))
        );
    }

    #[test]
    fn test_number_literal() {
        let tokens = Scanner::new("12.5 7").scan_tokens().unwrap();
        assert_eq!(tokens[0].literal, Some(Literal::Number(12.5)));
        assert_eq!(tokens[1].literal, Some(Literal::Number(7.0)));
    }

    #[test]
    fn test_comments_and_lines() {
        let tokens = Scanner::new("// comment\nvar a;\n").scan_tokens().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Var);
        assert_eq!(tokens[0].line, 2);
    }

    #[test]
    fn test_errors_are_collected() {
        let errors = Scanner::new("var a = #;\nvar b = @;\n'open").scan_tokens().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].to_string(), "Unexpected character: #");
        assert_eq!(errors[1].line(), 2);
        assert_eq!(errors[2].to_string(), "Unterminated string.");
    }
}
