use crate::error::AttrError;
use crate::ir::encode_byte_literal;
use crate::ir::Attr;
use crate::ir::PropertyMap;
use crate::parser::Parser;
use crate::parser::TokenKind;
use std::fmt::Display;
use std::fmt::Formatter;

/// The backend a [TargetAttr] compiles for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// NVIDIA GPUs via NVPTX.
    Nvvm,
    /// AMD GPUs via AMDGPU.
    Rocdl,
}

impl TargetKind {
    pub const fn mnemonic(&self) -> &'static str {
        match self {
            TargetKind::Nvvm => "nvvm.target",
            TargetKind::Rocdl => "rocdl.target",
        }
    }
    pub const fn default_triple(&self) -> &'static str {
        match self {
            TargetKind::Nvvm => "nvptx64-nvidia-cuda",
            TargetKind::Rocdl => "amdgcn-amd-amdhsa",
        }
    }
    pub const fn default_chip(&self) -> &'static str {
        match self {
            TargetKind::Nvvm => "sm_50",
            TargetKind::Rocdl => "gfx900",
        }
    }
    pub const fn default_features(&self) -> &'static str {
        match self {
            TargetKind::Nvvm => "+ptx60",
            TargetKind::Rocdl => "",
        }
    }
}

/// Describes the target that a GPU object was compiled for.
///
/// Printed as `#nvvm.target` when every parameter has its default value,
/// otherwise only the parameters that differ are listed, e.g.
/// `#nvvm.target<O = 3, chip = "sm_90">`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TargetAttr {
    kind: TargetKind,
    opt_level: u8,
    triple: String,
    chip: String,
    features: String,
    flags: Option<PropertyMap>,
}

impl TargetAttr {
    pub const DEFAULT_OPT_LEVEL: u8 = 2;
    pub const MAX_OPT_LEVEL: u8 = 3;

    pub fn new(kind: TargetKind) -> Self {
        Self {
            kind,
            opt_level: Self::DEFAULT_OPT_LEVEL,
            triple: kind.default_triple().to_string(),
            chip: kind.default_chip().to_string(),
            features: kind.default_features().to_string(),
            flags: None,
        }
    }
    pub fn nvvm() -> Self {
        Self::new(TargetKind::Nvvm)
    }
    pub fn rocdl() -> Self {
        Self::new(TargetKind::Rocdl)
    }
    /// Returns `None` if `opt_level` is above [TargetAttr::MAX_OPT_LEVEL].
    pub fn with_opt_level(mut self, opt_level: u8) -> Option<Self> {
        if opt_level > Self::MAX_OPT_LEVEL {
            return None;
        }
        self.opt_level = opt_level;
        Some(self)
    }
    pub fn with_triple(mut self, triple: impl Into<String>) -> Self {
        self.triple = triple.into();
        self
    }
    pub fn with_chip(mut self, chip: impl Into<String>) -> Self {
        self.chip = chip.into();
        self
    }
    pub fn with_features(mut self, features: impl Into<String>) -> Self {
        self.features = features.into();
        self
    }
    pub fn with_flags(mut self, flags: PropertyMap) -> Self {
        self.flags = Some(flags);
        self
    }
    pub fn kind(&self) -> TargetKind {
        self.kind
    }
    pub fn opt_level(&self) -> u8 {
        self.opt_level
    }
    pub fn triple(&self) -> &str {
        &self.triple
    }
    pub fn chip(&self) -> &str {
        &self.chip
    }
    pub fn features(&self) -> &str {
        &self.features
    }
    pub fn flags(&self) -> Option<&PropertyMap> {
        self.flags.as_ref()
    }
    fn parameters(&self) -> Vec<String> {
        let kind = self.kind;
        let mut parameters = vec![];
        if self.opt_level != Self::DEFAULT_OPT_LEVEL {
            parameters.push(format!("O = {}", self.opt_level));
        }
        let strings = [
            ("triple", &self.triple, kind.default_triple()),
            ("chip", &self.chip, kind.default_chip()),
            ("features", &self.features, kind.default_features()),
        ];
        for (name, value, default) in strings {
            if value != default {
                let value = encode_byte_literal(value.as_bytes());
                parameters.push(format!("{name} = {value}"));
            }
        }
        if let Some(flags) = &self.flags {
            parameters.push(format!("flags = {flags}"));
        }
        parameters
    }
}

impl Display for TargetAttr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.kind.mnemonic())?;
        let parameters = self.parameters();
        if !parameters.is_empty() {
            write!(f, "<{}>", parameters.join(", "))?;
        }
        Ok(())
    }
}

fn parse_opt_level(parser: &mut Parser<'_>) -> Result<u8, AttrError> {
    let level = parser.expect(TokenKind::Integer)?;
    match level.lexeme.parse::<u8>() {
        Ok(level) if level <= TargetAttr::MAX_OPT_LEVEL => Ok(level),
        _ => {
            let msg = format!(
                "optimization level must be between 0 and {}, but got {}",
                TargetAttr::MAX_OPT_LEVEL,
                level.lexeme
            );
            Err(parser.syntax_error(&level, &msg))
        }
    }
}

/// Parse the optional `<key = value, ...>` part after `#nvvm.target`.
///
/// Parameters may come in any order, but each at most once.
pub(crate) fn parse_target(parser: &mut Parser<'_>, kind: TargetKind) -> Result<Attr, AttrError> {
    let mut target = TargetAttr::new(kind);
    if parser.check(TokenKind::Less) {
        parser.advance();
        if parser.check(TokenKind::Greater) {
            let token = parser.peek();
            return Err(parser.syntax_error(token, "expected at least one target parameter"));
        }
        let mut seen: Vec<String> = vec![];
        loop {
            let key = parser.expect(TokenKind::BareIdentifier)?;
            if seen.contains(&key.lexeme) {
                let msg = format!("target parameter `{}` is given twice", key.lexeme);
                return Err(parser.syntax_error(&key, &msg));
            }
            parser.expect(TokenKind::Equal)?;
            match key.lexeme.as_str() {
                "O" => target.opt_level = parse_opt_level(parser)?,
                "triple" => target.triple = parser.parse_text_literal()?,
                "chip" => target.chip = parser.parse_text_literal()?,
                "features" => target.features = parser.parse_text_literal()?,
                "flags" => target.flags = Some(parser.parse_property_map()?),
                other => {
                    let msg = format!("unrecognized parameter `{other}` for #{}", kind.mnemonic());
                    return Err(parser.syntax_error(&key, &msg));
                }
            }
            seen.push(key.lexeme);
            if parser.check(TokenKind::Comma) {
                parser.advance();
                continue;
            }
            parser.expect(TokenKind::Greater)?;
            break;
        }
    }
    Ok(Attr::Target(parser.registry().intern_target(target)))
}

pub(crate) fn print_target(attr: &Attr, f: &mut Formatter<'_>) -> std::fmt::Result {
    match attr {
        Attr::Target(target) => write!(f, "{target}"),
        other => write!(f, "{other}"),
    }
}
