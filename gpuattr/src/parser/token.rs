use crate::error::Span;
use std::fmt::Display;
use std::fmt::Formatter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    // Markers
    Eof,

    // Identifiers
    /// foo, gpu.object
    BareIdentifier,

    // Literals
    /// 42
    Integer,
    /// "foo"
    String,
    /// i4, si8, ui16
    IntType,

    // Punctuation
    /// :
    Colon,
    /// ,
    Comma,
    /// =
    Equal,
    /// {
    LBrace,
    /// }
    RBrace,
    /// -
    Minus,
    /// #
    Hash,
    /// >
    Greater,
    /// <
    Less,

    // Keywords
    KwTrue,
    KwFalse,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            TokenKind::Eof => "end of input",
            TokenKind::BareIdentifier => "identifier",
            TokenKind::Integer => "integer",
            TokenKind::String => "string literal",
            TokenKind::IntType => "integer type",
            TokenKind::Colon => "`:`",
            TokenKind::Comma => "`,`",
            TokenKind::Equal => "`=`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::Minus => "`-`",
            TokenKind::Hash => "`#`",
            TokenKind::Greater => "`>`",
            TokenKind::Less => "`<`",
            TokenKind::KwTrue => "`true`",
            TokenKind::KwFalse => "`false`",
        };
        write!(f, "{text}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// The kind of token, such as `gpu.object` (BareIdentifier) or `i32` (IntType).
    pub kind: TokenKind,
    /// The text of the token exactly as it appears in the source.
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: String, span: Span) -> Self {
        Self { kind, lexeme, span }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.kind == TokenKind::Eof {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "\"{}\"", self.lexeme)
        }
    }
}
