/// Classification of a single lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Identifier,
    IntegerLiteral,
    StringLiteral,
    Symbol,
}

/// The 21 reserved words of Jack. An identifier lexeme matching one of
/// these is reclassified as `TokenKind::Keyword` at scan time.
pub const KEYWORDS: &[&str] = &[
    "class", "constructor", "function", "method", "field", "static", "var", "int", "char",
    "boolean", "void", "true", "false", "null", "this", "let", "do", "if", "else", "while",
    "return",
];

/// The fixed single-character symbol alphabet.
pub const SYMBOL_CHARS: &str = "{}()[].,;+-*/&|<>=~";

/// A single classified lexeme.
///
/// `lexeme` carries the raw source text: for string literals this still
/// includes the surrounding quotes, stripped only when the literal is
/// consumed into VM output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            line,
        }
    }

    /// The literal value with its surrounding quotes removed. Only
    /// meaningful for `StringLiteral` tokens.
    pub fn string_value(&self) -> &str {
        self.lexeme
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(&self.lexeme)
    }

    /// The decimal value of an `IntegerLiteral` token.
    pub fn int_value(&self) -> u16 {
        self.lexeme.parse().unwrap_or(0)
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        self.lexeme == *other
    }
}
