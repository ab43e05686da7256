use crate::error::AttrError;
use crate::error::Span;
use crate::ir::decode_byte_literal;
use crate::ir::Attr;
use crate::ir::AttributeRegistry;
use crate::parser::scanner::Scanner;
use crate::parser::token::Token;
use crate::parser::token::TokenKind;

/// Maximum number of attributes and property maps that may be open at once.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Recursive descent parser over the tokens of one attribute.
///
/// Attribute kinds are not known to the parser itself. When it meets
/// `#<name>`, it looks up `<name>` in the [AttributeRegistry] and hands
/// itself to the registered parse hook.
pub struct Parser<'r> {
    src: String,
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
    registry: &'r AttributeRegistry,
}

impl<'r> Parser<'r> {
    pub fn new(src: &str, registry: &'r AttributeRegistry) -> Result<Self, AttrError> {
        Ok(Parser {
            src: src.to_string(),
            tokens: Scanner::scan(src)?,
            current: 0,
            depth: 0,
            registry,
        })
    }
    pub fn src(&self) -> &str {
        &self.src
    }
    pub fn registry(&self) -> &'r AttributeRegistry {
        self.registry
    }
    /// Return the current token and move past it.
    ///
    /// At the end of the input this keeps returning [TokenKind::Eof].
    pub fn advance(&mut self) -> &Token {
        let index = self.current;
        if !self.is_at_end() {
            self.current += 1;
        }
        &self.tokens[index]
    }
    pub fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }
    pub fn peek_n(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.current + n).min(last)]
    }
    pub fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }
    pub fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }
    /// Whether the next token is the bare identifier `word`.
    pub fn check_keyword(&self, word: &str) -> bool {
        let token = self.peek();
        token.kind == TokenKind::BareIdentifier && token.lexeme == word
    }
    pub fn match_kinds(&mut self, kinds: &[TokenKind]) -> bool {
        for kind in kinds {
            if self.check(*kind) {
                self.advance();
                return true;
            }
        }
        false
    }
    pub fn syntax_error(&self, token: &Token, msg: &str) -> AttrError {
        AttrError::syntax(token.span, msg)
    }
    pub fn report_token_error(&self, token: &Token, expected: TokenKind) -> AttrError {
        let msg = format!("expected {expected}, but got {token}");
        self.syntax_error(token, &msg)
    }
    pub fn expect(&mut self, kind: TokenKind) -> Result<Token, AttrError> {
        if self.check(kind) {
            Ok(self.advance().clone())
        } else {
            Err(self.report_token_error(self.peek(), kind))
        }
    }
    pub fn expect_end(&mut self) -> Result<(), AttrError> {
        if self.is_at_end() {
            Ok(())
        } else {
            let token = self.peek();
            Err(self.syntax_error(token, &format!("unexpected trailing {token}")))
        }
    }
    /// Run `parse` one nesting level deeper.
    ///
    /// Once [MAX_NESTING_DEPTH] levels are open, this fails with the error
    /// from `too_deep` at the current token instead of recursing further.
    pub fn nested<T>(
        &mut self,
        too_deep: impl FnOnce(Span) -> AttrError,
        parse: impl FnOnce(&mut Self) -> Result<T, AttrError>,
    ) -> Result<T, AttrError> {
        if MAX_NESTING_DEPTH <= self.depth {
            return Err(too_deep(self.span()));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }
    /// Parse a registered attribute such as `#nvvm.target<O = 3>`.
    pub fn parse_attribute(&mut self) -> Result<Attr, AttrError> {
        self.nested(
            |span| AttrError::syntax(span, "attributes nested too deeply"),
            |parser| parser.parse_registered_attribute(),
        )
    }
    fn parse_registered_attribute(&mut self) -> Result<Attr, AttrError> {
        let hash = self.expect(TokenKind::Hash)?;
        let name = self.expect(TokenKind::BareIdentifier)?;
        let registry = self.registry;
        match registry.hooks(&name.lexeme) {
            Some(hooks) => (hooks.parse)(self),
            None => Err(AttrError::UnknownAttributeKind {
                name: name.lexeme.clone(),
                span: hash.span.to(name.span),
            }),
        }
    }
    /// Parse a byte literal such as `"BC\C0\DE"` into its raw bytes.
    pub fn parse_byte_literal(&mut self) -> Result<Vec<u8>, AttrError> {
        let literal = self.expect(TokenKind::String)?;
        decode_byte_literal(&literal.lexeme).map_err(|e| e.shifted(literal.span.start))
    }
    /// Parse a byte literal that has to hold valid UTF-8 text.
    pub fn parse_text_literal(&mut self) -> Result<String, AttrError> {
        let span = self.peek().span;
        let bytes = self.parse_byte_literal()?;
        String::from_utf8(bytes).map_err(|_| AttrError::syntax(span, "expected UTF-8 text"))
    }
    /// Span of the current token.
    pub fn span(&self) -> Span {
        self.peek().span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_stops_at_eof() {
        let registry = AttributeRegistry::empty();
        let mut parser = Parser::new("a", &registry).unwrap();
        assert_eq!(parser.advance().lexeme, "a");
        assert_eq!(parser.advance().kind, TokenKind::Eof);
        assert_eq!(parser.advance().kind, TokenKind::Eof);
        assert!(parser.is_at_end());
    }

    #[test]
    fn expect_reports_token() {
        let registry = AttributeRegistry::empty();
        let mut parser = Parser::new("#gpu.object,", &registry).unwrap();
        parser.expect(TokenKind::Hash).unwrap();
        assert_eq!(parser.peek_n(1).kind, TokenKind::Comma);
        assert_eq!(parser.peek_n(5).kind, TokenKind::Eof);
        parser.expect(TokenKind::BareIdentifier).unwrap();
        let err = parser.expect(TokenKind::Less).unwrap_err();
        assert_eq!(
            err,
            AttrError::syntax(Span::new(11, 12), "expected `<`, but got \",\"")
        );
        assert!(parser.match_kinds(&[TokenKind::Less, TokenKind::Comma]));
        parser.expect_end().unwrap();
    }

    #[test]
    fn unknown_attribute_kind() {
        let registry = AttributeRegistry::empty();
        let mut parser = Parser::new("#foo.bar<>", &registry).unwrap();
        let err = parser.parse_attribute().unwrap_err();
        assert_eq!(
            err,
            AttrError::UnknownAttributeKind {
                name: "foo.bar".to_string(),
                span: Span::new(0, 8),
            }
        );
    }

    #[test]
    fn byte_literal_errors_point_into_source() {
        let registry = AttributeRegistry::empty();
        let mut parser = Parser::new(r#"  "ab\4""#, &registry).unwrap();
        let err = parser.parse_byte_literal().unwrap_err();
        assert_eq!(err.span(), Some(Span::new(5, 8)));
    }

    #[test]
    fn nesting_is_limited() {
        fn descend(parser: &mut Parser<'_>, levels: usize) -> Result<usize, AttrError> {
            if levels == 0 {
                return Ok(0);
            }
            parser.nested(
                |span| AttrError::syntax(span, "too deep"),
                |parser| descend(parser, levels - 1).map(|n| n + 1),
            )
        }
        let registry = AttributeRegistry::empty();
        let mut parser = Parser::new("a", &registry).unwrap();
        assert_eq!(descend(&mut parser, MAX_NESTING_DEPTH).unwrap(), MAX_NESTING_DEPTH);
        let err = descend(&mut parser, MAX_NESTING_DEPTH + 1).unwrap_err();
        assert_eq!(err, AttrError::syntax(Span::new(0, 1), "too deep"));
        // The depth is back to zero after a failure.
        assert_eq!(descend(&mut parser, MAX_NESTING_DEPTH).unwrap(), MAX_NESTING_DEPTH);
    }
}
