use crate::dialect::TargetAttr;
use crate::error::AttrError;
use crate::ir::encode_byte_literal;
use crate::ir::Attr;
use crate::ir::PropertyMap;
use crate::parser::Parser;
use crate::parser::TokenKind;
use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::Arc;

/// Format of the binary blob inside a [ObjectAttr].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CompilationFormat {
    /// LLVM bitcode or another format meant for offloading/linking later.
    Offload,
    /// Target assembly, such as PTX.
    Assembly,
    /// Binary for a single chip, such as a cubin.
    Binary,
    /// Fat binary that may hold several binaries and assembly.
    #[default]
    Fatbin,
}

impl CompilationFormat {
    pub const ALL: [CompilationFormat; 4] = [
        CompilationFormat::Offload,
        CompilationFormat::Assembly,
        CompilationFormat::Binary,
        CompilationFormat::Fatbin,
    ];

    pub const fn keyword(&self) -> &'static str {
        match self {
            CompilationFormat::Offload => "offload",
            CompilationFormat::Assembly => "isa",
            CompilationFormat::Binary => "bin",
            CompilationFormat::Fatbin => "fatbin",
        }
    }
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.keyword() == keyword)
    }
}

impl Display for CompilationFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// A compiled GPU object: target, format, optional properties, and the
/// object bytes themselves.
///
/// ```text
/// #gpu.object<#nvvm.target, properties = {O = 2 : i32}, "BC\C0\DE...">
/// ```
///
/// The `properties = ` segment is printed if and only if a map was given,
/// also when that map is empty. The format is printed before the literal
/// unless it is the default ([CompilationFormat::Fatbin]).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectAttr {
    target: Arc<TargetAttr>,
    format: CompilationFormat,
    properties: Option<PropertyMap>,
    object: Vec<u8>,
}

impl ObjectAttr {
    pub const MNEMONIC: &'static str = "gpu.object";

    pub fn get(
        target: Arc<TargetAttr>,
        format: CompilationFormat,
        object: impl Into<Vec<u8>>,
        properties: Option<PropertyMap>,
    ) -> Self {
        Self {
            target,
            format,
            properties,
            object: object.into(),
        }
    }
    pub fn target(&self) -> &Arc<TargetAttr> {
        &self.target
    }
    pub fn format(&self) -> CompilationFormat {
        self.format
    }
    /// The object bytes exactly as they were given.
    pub fn object(&self) -> &[u8] {
        &self.object
    }
    pub fn properties(&self) -> Option<&PropertyMap> {
        self.properties.as_ref()
    }
    pub fn has_properties(&self) -> bool {
        self.properties.is_some()
    }
}

impl Display for ObjectAttr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}<{}, ", Self::MNEMONIC, self.target)?;
        if let Some(properties) = &self.properties {
            write!(f, "properties = {properties}, ")?;
        }
        if self.format != CompilationFormat::Fatbin {
            write!(f, "{} = ", self.format)?;
        }
        write!(f, "{}>", encode_byte_literal(&self.object))
    }
}

fn parse_target_spec(parser: &mut Parser<'_>) -> Result<Arc<TargetAttr>, AttrError> {
    let start = parser.span();
    match parser.parse_attribute() {
        Ok(Attr::Target(target)) => Ok(target),
        Ok(other) => {
            let msg = format!("expected a target, but got #{}", other.mnemonic());
            Err(AttrError::syntax(start, msg))
        }
        Err(AttrError::UnknownAttributeKind { name, span }) => {
            let msg = format!("unrecognized target spec #{name}");
            Err(AttrError::syntax(span, msg))
        }
        Err(e) => Err(e),
    }
}

pub(crate) fn parse_object(parser: &mut Parser<'_>) -> Result<Attr, AttrError> {
    parser.expect(TokenKind::Less)?;
    let target = parse_target_spec(parser)?;
    parser.expect(TokenKind::Comma)?;
    let properties = if parser.check_keyword("properties") {
        parser.advance();
        parser.expect(TokenKind::Equal)?;
        let properties = parser.parse_property_map()?;
        parser.expect(TokenKind::Comma)?;
        Some(properties)
    } else {
        None
    };
    let format = if parser.check(TokenKind::BareIdentifier) {
        let keyword = parser.advance().clone();
        let format = CompilationFormat::from_keyword(&keyword.lexeme).ok_or_else(|| {
            let msg = format!("unknown compilation format `{}`", keyword.lexeme);
            parser.syntax_error(&keyword, &msg)
        })?;
        parser.expect(TokenKind::Equal)?;
        format
    } else {
        CompilationFormat::Fatbin
    };
    let object = parser.parse_byte_literal()?;
    parser.expect(TokenKind::Greater)?;
    Ok(Attr::Object(ObjectAttr::get(target, format, object, properties)))
}

pub(crate) fn print_object(attr: &Attr, f: &mut Formatter<'_>) -> std::fmt::Result {
    match attr {
        Attr::Object(object) => write!(f, "{object}"),
        other => write!(f, "{other}"),
    }
}
