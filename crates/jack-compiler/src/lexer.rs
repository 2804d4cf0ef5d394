//! Single forward-pass tokenizer over Jack source text.
//!
//! Recognizes comments, string literals, integer literals,
//! identifiers/keywords, single-character symbols, and whitespace, in that
//! priority order at each position. Anything else is a lexical error.

use jack_core::{JackError, KEYWORDS, SYMBOL_CHARS, Token, TokenKind};

fn tokenize(source: &str) -> Result<Vec<Token>, JackError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut line = 1usize;

    while i < chars.len() {
        let c = chars[i];

        if c == '/' && chars.get(i + 1) == Some(&'/') {
            i += 2;
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
        } else if c == '/' && chars.get(i + 1) == Some(&'*') {
            i += 2;
            while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                if chars[i] == '\n' {
                    line += 1;
                }
                i += 1;
            }
            i = (i + 2).min(chars.len());
        } else if c == '"' {
            let start = i;
            i += 1;
            while i < chars.len() && chars[i] != '"' && chars[i] != '\n' {
                i += 1;
            }
            if i >= chars.len() || chars[i] != '"' {
                return Err(JackError::Lexical { line, character: '"' });
            }
            i += 1;
            let lexeme: String = chars[start..i].iter().collect();
            tokens.push(Token::new(TokenKind::StringLiteral, lexeme, line));
        } else if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let lexeme: String = chars[start..i].iter().collect();
            tokens.push(Token::new(TokenKind::IntegerLiteral, lexeme, line));
        } else if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let lexeme: String = chars[start..i].iter().collect();
            let kind = if KEYWORDS.contains(&lexeme.as_str()) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            };
            tokens.push(Token::new(kind, lexeme, line));
        } else if SYMBOL_CHARS.contains(c) {
            tokens.push(Token::new(TokenKind::Symbol, c.to_string(), line));
            i += 1;
        } else if c.is_whitespace() {
            if c == '\n' {
                line += 1;
            }
            i += 1;
        } else {
            return Err(JackError::Lexical { line, character: c });
        }
    }

    Ok(tokens)
}

/// A cursor over a pre-scanned token sequence, exposing the three
/// operations the compilation engine needs: `peek`, `advance`, `expect`.
pub struct Tokenizer {
    tokens: Vec<Token>,
    pos: usize,
}

impl Tokenizer {
    pub fn new(source: &str) -> Result<Self, JackError> {
        Ok(Tokenizer {
            tokens: tokenize(source)?,
            pos: 0,
        })
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    pub fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Consumes the next token, failing if it doesn't match `value`
    /// (when given) or `kind` (when given).
    pub fn expect(&mut self, value: Option<&str>, kind: Option<TokenKind>) -> Result<Token, JackError> {
        let expected = value
            .map(|v| v.to_string())
            .or_else(|| kind.map(|k| format!("{k:?}")))
            .unwrap_or_else(|| "token".to_string());

        let Some(token) = self.advance() else {
            return Err(JackError::UnexpectedEof { expected });
        };

        if let Some(k) = kind
            && token.kind != k
        {
            return Err(JackError::UnexpectedToken {
                line: token.line,
                expected,
                found: token.lexeme,
            });
        }
        if let Some(v) = value
            && token.lexeme != v
        {
            return Err(JackError::UnexpectedToken {
                line: token.line,
                expected,
                found: token.lexeme,
            });
        }
        Ok(token)
    }

    /// Convenience for `expect(Some(value), None)`.
    pub fn expect_value(&mut self, value: &str) -> Result<Token, JackError> {
        self.expect(Some(value), None)
    }

    /// Convenience for `expect(None, Some(TokenKind::Identifier))`.
    pub fn expect_identifier(&mut self) -> Result<Token, JackError> {
        self.expect(None, Some(TokenKind::Identifier))
    }
}
