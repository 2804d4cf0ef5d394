//! Jack Core: the shared data model for the Jack compiler toolchain.
//!
//! This crate holds the vocabulary the tokenizer, compilation engine, and
//! driver all share, independent of how source text is parsed or VM text
//! is emitted.
//!
//! # Modules
//!
//! - `token`: classified lexemes (`Token`, `TokenKind`) and the keyword set
//! - `symbol`: the two-scope symbol table (`SymbolTable`, `Symbol`, `SymbolKind`)
//! - `error`: the two first-class error categories (`JackError`)

pub mod error;
pub mod symbol;
pub mod token;

pub use error::JackError;
pub use symbol::{Symbol, SymbolKind, SymbolTable};
pub use token::{KEYWORDS, SYMBOL_CHARS, Token, TokenKind};
