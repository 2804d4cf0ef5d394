use thiserror::Error;

/// The two error categories a compilation unit can fail with.
///
/// There is no semantic-error variant: undeclared identifiers are resolved
/// permissively (see the symbol table's lookup behavior) rather than
/// rejected, matching the source material this compiler is derived from.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JackError {
    #[error("Lexical error at line {line}: {character}")]
    Lexical { line: usize, character: char },

    #[error("Line {line}: Expected '{expected}', got '{found}'")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("Unexpected EOF, expected {expected}")]
    UnexpectedEof { expected: String },
}
