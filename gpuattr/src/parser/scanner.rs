use crate::error::AttrError;
use crate::error::Span;
use crate::parser::token::Token;
use crate::parser::token::TokenKind;

pub struct Scanner<'a> {
    source: &'a str,
    /// Characters with their byte offset into `source`.
    chars: Vec<(usize, char)>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Scanner {
            source,
            chars: source.char_indices().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
        }
    }
    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }
    fn offset(&self, index: usize) -> usize {
        match self.chars.get(index) {
            Some((offset, _)) => *offset,
            None => self.source.len(),
        }
    }
    fn span(&self) -> Span {
        Span::new(self.offset(self.start), self.offset(self.current))
    }
    fn advance(&mut self) -> char {
        let c = self.peek();
        self.current += 1;
        c
    }
    fn peek(&self) -> char {
        match self.chars.get(self.current) {
            Some((_, c)) => *c,
            None => '\0',
        }
    }
    fn add_token(&mut self, kind: TokenKind) {
        let span = self.span();
        let lexeme = span.text(self.source).to_string();
        self.tokens.push(Token::new(kind, lexeme, span));
    }
    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        self.add_token(TokenKind::Integer);
    }
    // Whether the character is a valid identifier start character.
    fn is_identifier_start(c: char) -> bool {
        c.is_ascii_alphabetic() || c == '_'
    }
    // Whether the character is a valid identifier character.
    fn is_identifier(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '$'
    }
    /// Whether the word is an integer type such as `i32`, `si8`, or `ui64`.
    pub(crate) fn is_int_type(word: &str) -> bool {
        let digits = word
            .strip_prefix("si")
            .or_else(|| word.strip_prefix("ui"))
            .or_else(|| word.strip_prefix('i'));
        match digits {
            Some(digits) => !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()),
            None => false,
        }
    }
    // Scan identifiers, integer types, and keywords.
    fn identifier(&mut self) {
        while Scanner::is_identifier(self.peek()) {
            self.advance();
        }
        let lexeme = self.span().text(self.source);
        let kind = match lexeme {
            "true" => TokenKind::KwTrue,
            "false" => TokenKind::KwFalse,
            s if Scanner::is_int_type(s) => TokenKind::IntType,
            _ => TokenKind::BareIdentifier,
        };
        self.add_token(kind);
    }
    // The raw lexeme is kept; escapes are resolved by the byte literal decoder.
    fn string(&mut self) -> Result<(), AttrError> {
        while self.peek() != '"' && self.peek() != '\n' && !self.is_at_end() {
            self.advance();
        }
        if self.peek() != '"' {
            return Err(AttrError::literal(self.span(), "unterminated byte literal"));
        }
        self.advance();
        self.add_token(TokenKind::String);
        Ok(())
    }
    fn scan_token(&mut self) -> Result<(), AttrError> {
        let c = self.advance();
        match c {
            '{' => self.add_token(TokenKind::LBrace),
            '}' => self.add_token(TokenKind::RBrace),
            ':' => self.add_token(TokenKind::Colon),
            ',' => self.add_token(TokenKind::Comma),
            '=' => self.add_token(TokenKind::Equal),
            '-' => self.add_token(TokenKind::Minus),
            '#' => self.add_token(TokenKind::Hash),
            '>' => self.add_token(TokenKind::Greater),
            '<' => self.add_token(TokenKind::Less),
            ' ' | '\r' | '\t' | '\n' => (),
            '"' => self.string()?,
            s if s.is_ascii_digit() => self.number(),
            s if Scanner::is_identifier_start(s) => self.identifier(),
            _ => {
                let msg = format!("unexpected character `{c}`");
                return Err(AttrError::syntax(self.span(), msg));
            }
        }
        Ok(())
    }
    fn scan_tokens(&mut self) -> Result<(), AttrError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }
        self.start = self.current;
        self.add_token(TokenKind::Eof);
        Ok(())
    }
    pub fn scan(src: &str) -> Result<Vec<Token>, AttrError> {
        let mut scanner = Scanner::new(src);
        scanner.scan_tokens()?;
        Ok(scanner.tokens)
    }
}
