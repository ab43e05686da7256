//! Parsing logic for attributes including a scanner (tokenizer).

mod parser;
mod scanner;
mod token;

pub use parser::Parser;
pub use parser::MAX_NESTING_DEPTH;
pub use token::Token;
pub use token::TokenKind;
