//! Token definitions for the TripleS lexer.

use std::fmt;

/// All token kinds in TripleS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Delimiters
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Dot,
    Colon,
    Semicolon,

    // Operators
    Caret,
    Percent,
    Star,
    Slash,
    Plus,
    Minus,
    Pipe,
    Ampersand,
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Arrow, // ->
    Or,    // || or `or`
    And,   // && or `and`

    // Literals
    Identifier,
    String,
    Number,

    // Keywords
    True,
    False,
    Null,
    Var,
    Const,
    Print,
    If,
    Else,
    While,
    For,
    Function,
    Return,
    Class,
    This,
    Super,
    Extends,
    From,
    Import,
    As,
    Export,
    Try,
    Catch,
    Finally,
    Throw,

    Eof,
}

impl TokenKind {
    /// Map an identifier to its keyword kind, if it is one.
    pub fn keyword(ident: &str) -> Option<TokenKind> {
        let kind = match ident {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "var" => TokenKind::Var,
            "const" => TokenKind::Const,
            "print" => TokenKind::Print,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "or" => TokenKind::Or,
            "and" => TokenKind::And,
            "function" => TokenKind::Function,
            "return" => TokenKind::Return,
            "class" => TokenKind::Class,
            "this" => TokenKind::This,
            "super" => TokenKind::Super,
            "extends" => TokenKind::Extends,
            "from" => TokenKind::From,
            "import" => TokenKind::Import,
            "as" => TokenKind::As,
            "export" => TokenKind::Export,
            "try" => TokenKind::Try,
            "catch" => TokenKind::Catch,
            "finally" => TokenKind::Finally,
            "throw" => TokenKind::Throw,
            _ => return None,
        };
        Some(kind)
    }

    /// Every keyword spelling, used for REPL completion hints.
    pub const KEYWORDS: &'static [&'static str] = &[
        "true", "false", "null", "var", "const", "print", "if", "else", "while", "for", "or",
        "and", "function", "return", "class", "this", "super", "extends", "from", "import", "as",
        "export", "try", "catch", "finally", "throw",
    ];
}

/// Literal payload carried by string and number tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
}

/// A token with its source text and line.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub literal: Option<Literal>,
    pub line: usize,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        lexeme: impl Into<String>,
        literal: Option<Literal>,
        line: usize,
    ) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            literal,
            line,
        }
    }

    /// An identifier token that never appeared in source, e.g. `this` or a magic method name.
    pub fn synthetic(name: impl Into<String>, line: usize) -> Self {
        Self::new(TokenKind::Identifier, name, None, line)
    }

    pub fn eof(line: usize) -> Self {
        Self::new(TokenKind::Eof, "", None, line)
    }

    /// The unquoted text of a string token.
    pub fn string_value(&self) -> String {
        match &self.literal {
            Some(Literal::String(s)) => s.clone(),
            _ => self
                .lexeme
                .trim_matches(|c| c == '\'' || c == '"')
                .to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == TokenKind::Eof {
            write!(f, "end")
        } else {
            write!(f, "'{}'", self.lexeme)
        }
    }
}
