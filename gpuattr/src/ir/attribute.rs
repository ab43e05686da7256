use crate::error::AttrError;
use crate::error::Span;
use crate::ir::decode_byte_literal;
use crate::ir::encode_byte_literal;
use crate::ir::Attr;
use crate::ir::IntegerType;
use crate::parser::Parser;
use crate::parser::TokenKind;
use std::fmt::Display;
use std::fmt::Formatter;

/// An attribute containing an integer value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IntegerAttr {
    // The type of the integer: specifies the precision and signedness.
    typ: IntegerType,
    // Stored truncated to the width of `typ`.
    value: i128,
}

impl IntegerAttr {
    /// Create an integer attribute; `value` is truncated to the type's width.
    pub fn new(typ: IntegerType, value: i128) -> Self {
        Self {
            typ,
            value: typ.wrap(value),
        }
    }
    pub fn typ(&self) -> IntegerType {
        self.typ
    }
    pub fn value(&self) -> i128 {
        self.value
    }
    pub fn i64(&self) -> Option<i64> {
        i64::try_from(self.value).ok()
    }
    pub fn u64(&self) -> Option<u64> {
        u64::try_from(self.value).ok()
    }
}

impl Display for IntegerAttr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} : {}", self.value, self.typ)
    }
}

/// Byte string such as `"sm_90"`; not required to be UTF-8.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StringAttr {
    value: Vec<u8>,
}

impl StringAttr {
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self {
            value: value.into(),
        }
    }
    pub fn bytes(&self) -> &[u8] {
        &self.value
    }
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.value).ok()
    }
}

impl From<&str> for StringAttr {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl Display for StringAttr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", encode_byte_literal(&self.value))
    }
}

/// A value inside a [PropertyMap].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyValue {
    Integer(IntegerAttr),
    Bool(bool),
    String(StringAttr),
    Dictionary(PropertyMap),
    /// A registered attribute such as `#nvvm.target`.
    Attribute(Box<Attr>),
}

impl Display for PropertyValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Integer(integer) => write!(f, "{integer}"),
            PropertyValue::Bool(value) => write!(f, "{value}"),
            PropertyValue::String(string) => write!(f, "{string}"),
            PropertyValue::Dictionary(map) => write!(f, "{map}"),
            PropertyValue::Attribute(attr) => write!(f, "{attr}"),
        }
    }
}

impl From<IntegerAttr> for PropertyValue {
    fn from(value: IntegerAttr) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<StringAttr> for PropertyValue {
    fn from(value: StringAttr) -> Self {
        PropertyValue::String(value)
    }
}

impl From<PropertyMap> for PropertyValue {
    fn from(value: PropertyMap) -> Self {
        PropertyValue::Dictionary(value)
    }
}

impl From<Attr> for PropertyValue {
    fn from(value: Attr) -> Self {
        PropertyValue::Attribute(Box::new(value))
    }
}

/// Ordered map from names to values, printed as `{k1 = v1, k2 = v2}`.
///
/// Keys are unique and keep their insertion order. An empty map is a valid
/// value of its own and is not the same as having no map at all.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PropertyMap {
    entries: Vec<(String, PropertyValue)>,
}

impl PropertyMap {
    pub fn empty() -> Self {
        Self::default()
    }
    /// Build a map from `pairs`, failing on the first repeated key.
    pub fn get<K, I>(pairs: I) -> Result<Self, AttrError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, PropertyValue)>,
    {
        let mut map = Self::empty();
        for (key, value) in pairs {
            let key = key.into();
            if map.contains_key(&key) {
                return Err(AttrError::DuplicateKey { key, span: None });
            }
            map.entries.push((key, value));
        }
        Ok(map)
    }
    pub fn lookup(&self, key: &str) -> Option<&PropertyValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }
    pub fn contains_key(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }
}

fn is_bare_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '$')
        }
        _ => false,
    }
}

impl Display for PropertyMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if 0 < i {
                write!(f, ", ")?;
            }
            if is_bare_key(name) {
                write!(f, "{name} = {value}")?;
            } else {
                write!(f, "{} = {value}", encode_byte_literal(name.as_bytes()))?;
            }
        }
        write!(f, "}}")
    }
}

impl Parser<'_> {
    /// Parse a integer constant (e.g., `42 : i64` or `-1 : si8`).
    ///
    /// Without a type, the integer is an `i64`.
    pub fn parse_integer(&mut self) -> Result<IntegerAttr, AttrError> {
        let first = self.peek().clone();
        if first.kind == TokenKind::Minus {
            self.advance();
        }
        let digits = self.advance().clone();
        if digits.kind != TokenKind::Integer {
            return Err(AttrError::properties(digits.span, "expected integer literal"));
        }
        let literal = first.span.to(digits.span);
        let typ = if self.check(TokenKind::Colon) {
            self.advance();
            let tag = self.advance().clone();
            if tag.kind != TokenKind::IntType {
                let msg = format!("unknown value type `{}`", tag.lexeme);
                return Err(AttrError::properties(tag.span, msg));
            }
            match IntegerType::from_str(&tag.lexeme) {
                Some(typ) => typ,
                None => {
                    let msg = format!("unsupported integer type `{}`", tag.lexeme);
                    return Err(AttrError::properties(tag.span, msg));
                }
            }
        } else {
            IntegerType::I64
        };
        let magnitude = digits
            .lexeme
            .parse::<i128>()
            .map_err(|_| AttrError::properties(literal, "integer literal is too large"))?;
        let value = if first.kind == TokenKind::Minus {
            -magnitude
        } else {
            magnitude
        };
        if !typ.contains(value) {
            let msg = format!("integer {value} is out of range for {typ}");
            return Err(AttrError::properties(literal, msg));
        }
        Ok(IntegerAttr::new(typ, value))
    }
    /// Parse the value on the right-hand side of `key = value`.
    pub fn parse_property_value(&mut self) -> Result<PropertyValue, AttrError> {
        let token = self.peek().clone();
        let value = match token.kind {
            TokenKind::Integer | TokenKind::Minus => PropertyValue::Integer(self.parse_integer()?),
            TokenKind::KwTrue => {
                self.advance();
                PropertyValue::Bool(true)
            }
            TokenKind::KwFalse => {
                self.advance();
                PropertyValue::Bool(false)
            }
            TokenKind::String => PropertyValue::String(StringAttr::new(self.parse_byte_literal()?)),
            TokenKind::LBrace => PropertyValue::Dictionary(self.parse_property_map()?),
            TokenKind::Hash => PropertyValue::Attribute(Box::new(self.parse_attribute()?)),
            _ => {
                let msg = format!("unknown value type starting with {token}");
                return Err(AttrError::properties(token.span, msg));
            }
        };
        Ok(value)
    }
    fn parse_property_key(&mut self, open: Span, seen: usize) -> Result<(String, Span), AttrError> {
        let token = self.advance().clone();
        let key = match token.kind {
            TokenKind::BareIdentifier
            | TokenKind::IntType
            | TokenKind::KwTrue
            | TokenKind::KwFalse => token.lexeme.clone(),
            TokenKind::String => {
                let bytes = decode_byte_literal(&token.lexeme)
                    .map_err(|e| e.shifted(token.span.start))?;
                String::from_utf8(bytes).map_err(|_| {
                    AttrError::properties(token.span, "property name must be UTF-8 text")
                })?
            }
            TokenKind::RBrace if 0 < seen => {
                return Err(AttrError::properties(token.span, "trailing comma in properties"));
            }
            TokenKind::Eof => {
                return Err(AttrError::properties(open, "unmatched `{` in properties"));
            }
            _ => {
                let msg = format!("expected property name, but got {token}");
                return Err(AttrError::properties(token.span, msg));
            }
        };
        Ok((key, token.span))
    }
    /// Parse a property map such as `{O = 2 : i32, fast = true}`.
    pub fn parse_property_map(&mut self) -> Result<PropertyMap, AttrError> {
        self.nested(
            |span| AttrError::properties(span, "properties nested too deeply"),
            |parser| parser.parse_property_entries(),
        )
    }
    fn parse_property_entries(&mut self) -> Result<PropertyMap, AttrError> {
        let open = self.advance().clone();
        if open.kind != TokenKind::LBrace {
            let msg = format!("expected `{{` to open properties, but got {open}");
            return Err(AttrError::properties(open.span, msg));
        }
        let mut map = PropertyMap::empty();
        if self.check(TokenKind::RBrace) {
            self.advance();
            return Ok(map);
        }
        loop {
            let (key, key_span) = self.parse_property_key(open.span, map.len())?;
            if map.contains_key(&key) {
                return Err(AttrError::DuplicateKey {
                    key,
                    span: Some(key_span),
                });
            }
            let equal = self.advance().clone();
            if equal.kind != TokenKind::Equal {
                let msg = format!("expected `=` after `{key}`, but got {equal}");
                return Err(AttrError::properties(equal.span, msg));
            }
            let value = self.parse_property_value()?;
            map.entries.push((key, value));

            let next = self.advance().clone();
            match next.kind {
                TokenKind::Comma => continue,
                TokenKind::RBrace => break,
                TokenKind::Eof => {
                    return Err(AttrError::properties(open.span, "unmatched `{` in properties"));
                }
                _ => {
                    let msg = format!("expected `,` or `}}` in properties, but got {next}");
                    return Err(AttrError::properties(next.span, msg));
                }
            }
        }
        Ok(map)
    }
}
