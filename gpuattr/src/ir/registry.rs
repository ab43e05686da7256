use crate::dialect::gpu::GpuDialect;
use crate::dialect::gpu::ObjectAttr;
use crate::dialect::nvvm::NvvmDialect;
use crate::dialect::rocdl::RocdlDialect;
use crate::dialect::TargetAttr;
use crate::error::AttrError;
use crate::error::Span;
use crate::ir::PropertyMap;
use crate::ir::PropertyValue;
use crate::parser::Parser;
use crate::Dialect;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::Arc;
use tracing::debug;

/// Attributes are known-constant values of operations (a variable is not
/// allowed).
///
/// This is the closed set of composite attribute kinds that the registry
/// can parse and print. Values compare by their fields only.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Attr {
    /// `#gpu.object<...>`
    Object(ObjectAttr),
    /// `#nvvm.target<...>` or `#rocdl.target<...>`
    Target(Arc<TargetAttr>),
}

impl Attr {
    /// The dialect-qualified name after `#`, such as `gpu.object`.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Attr::Object(_) => ObjectAttr::MNEMONIC,
            Attr::Target(target) => target.kind().mnemonic(),
        }
    }
    pub fn as_object(&self) -> Option<&ObjectAttr> {
        match self {
            Attr::Object(object) => Some(object),
            _ => None,
        }
    }
    pub fn as_target(&self) -> Option<&Arc<TargetAttr>> {
        match self {
            Attr::Target(target) => Some(target),
            _ => None,
        }
    }
}

impl Display for Attr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Attr::Object(object) => write!(f, "{object}"),
            Attr::Target(target) => write!(f, "{target}"),
        }
    }
}

impl From<ObjectAttr> for Attr {
    fn from(object: ObjectAttr) -> Self {
        Attr::Object(object)
    }
}

impl From<Arc<TargetAttr>> for Attr {
    fn from(target: Arc<TargetAttr>) -> Self {
        Attr::Target(target)
    }
}

/// Parse hook; called with the parser positioned right after `#<name>`.
pub type ParseFn = fn(&mut Parser<'_>) -> Result<Attr, AttrError>;
pub type PrintFn = fn(&Attr, &mut Formatter<'_>) -> std::fmt::Result;

/// The parser and printer registered for one attribute kind.
#[derive(Clone, Copy)]
pub struct AttrHooks {
    pub parse: ParseFn,
    pub print: PrintFn,
}

struct Printed<'a> {
    print: PrintFn,
    attr: &'a Attr,
}

impl Display for Printed<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        (self.print)(self.attr, f)
    }
}

/// Table from attribute names (e.g., `gpu.object`) to their hooks.
///
/// Build it once at start-up, usually via [AttributeRegistry::default], and
/// pass it by reference to whoever parses or prints. The registry also owns
/// the interning table for targets, so that equal targets share one
/// allocation. Sharing a registry between threads is fine.
pub struct AttributeRegistry {
    hooks: HashMap<&'static str, AttrHooks>,
    dialects: Vec<&'static str>,
    targets: Mutex<HashSet<Arc<TargetAttr>>>,
}

impl AttributeRegistry {
    /// A registry that knows no attributes at all.
    pub fn empty() -> Self {
        Self {
            hooks: HashMap::new(),
            dialects: vec![],
            targets: Mutex::new(HashSet::new()),
        }
    }
    pub fn load(&mut self, dialect: &dyn Dialect) {
        debug!("Loading dialect {}: {}", dialect.name(), dialect.description());
        dialect.register(self);
        self.dialects.push(dialect.name());
    }
    pub fn register(&mut self, name: &'static str, hooks: AttrHooks) {
        self.hooks.insert(name, hooks);
    }
    pub fn hooks(&self, name: &str) -> Option<&AttrHooks> {
        self.hooks.get(name)
    }
    pub fn is_registered(&self, name: &str) -> bool {
        self.hooks.contains_key(name)
    }
    /// Names of the loaded dialects in load order.
    pub fn dialects(&self) -> &[&'static str] {
        &self.dialects
    }
    /// Parse exactly one attribute from `src`.
    pub fn parse(&self, src: &str) -> Result<Attr, AttrError> {
        let mut parser = Parser::new(src, self)?;
        let attr = parser.parse_attribute()?;
        parser.expect_end()?;
        debug!("Parsed {}", attr.mnemonic());
        Ok(attr)
    }
    /// First attribute kind in `attr` without hooks in this registry.
    ///
    /// Looks at `attr` itself, the target of an object, and every attribute
    /// inside its property maps.
    fn find_unregistered(&self, attr: &Attr) -> Option<&'static str> {
        let name = attr.mnemonic();
        if !self.is_registered(name) {
            return Some(name);
        }
        match attr {
            Attr::Object(object) => {
                let target = object.target();
                let name = target.kind().mnemonic();
                if !self.is_registered(name) {
                    return Some(name);
                }
                target
                    .flags()
                    .into_iter()
                    .chain(object.properties())
                    .find_map(|map| self.find_unregistered_in(map))
            }
            Attr::Target(target) => target.flags().and_then(|map| self.find_unregistered_in(map)),
        }
    }
    fn find_unregistered_in(&self, map: &PropertyMap) -> Option<&'static str> {
        map.iter().find_map(|(_, value)| match value {
            PropertyValue::Dictionary(map) => self.find_unregistered_in(map),
            PropertyValue::Attribute(attr) => self.find_unregistered(attr),
            _ => None,
        })
    }
    /// Print `attr` in canonical form via its registered printer.
    ///
    /// Every attribute kind that occurs in `attr`, nested ones included,
    /// has to be registered, so that the output parses with this registry.
    pub fn print(&self, attr: &Attr) -> Result<String, AttrError> {
        let unknown = |name: &str| AttrError::UnknownAttributeKind {
            name: name.to_string(),
            span: Span::default(),
        };
        if let Some(name) = self.find_unregistered(attr) {
            return Err(unknown(name));
        }
        let hooks = self
            .hooks(attr.mnemonic())
            .ok_or_else(|| unknown(attr.mnemonic()))?;
        let printed = Printed {
            print: hooks.print,
            attr,
        };
        Ok(printed.to_string())
    }
    /// Return the shared instance of `target`, adding it if it is new.
    ///
    /// Entries are never evicted: the table lives as long as the registry
    /// and keeps every distinct target it has seen.
    pub fn intern_target(&self, target: TargetAttr) -> Arc<TargetAttr> {
        let mut targets = self.targets.lock();
        if let Some(existing) = targets.get(&target) {
            return existing.clone();
        }
        let target = Arc::new(target);
        targets.insert(target.clone());
        target
    }
    pub fn interned_targets(&self) -> usize {
        self.targets.lock().len()
    }
}

impl Default for AttributeRegistry {
    /// Registry with the gpu, nvvm, and rocdl dialects loaded.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.load(&GpuDialect);
        registry.load(&NvvmDialect);
        registry.load(&RocdlDialect);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::gpu::CompilationFormat;
    use crate::dialect::TargetKind;

    #[test]
    fn default_dialects() {
        let registry = AttributeRegistry::default();
        assert_eq!(registry.dialects(), &["gpu", "nvvm", "rocdl"]);
        assert!(registry.is_registered("gpu.object"));
        assert!(registry.is_registered("nvvm.target"));
        assert!(registry.is_registered("rocdl.target"));
        assert!(!registry.is_registered("gpu.kernel_table"));
    }

    #[test]
    fn unknown_prefix() {
        let registry = AttributeRegistry::default();
        let err = registry.parse("#spirv.target_env<>").unwrap_err();
        assert_eq!(
            err,
            AttrError::UnknownAttributeKind {
                name: "spirv.target_env".to_string(),
                span: Span::new(0, 17),
            }
        );
    }

    #[test]
    fn print_needs_registered_kind() {
        let mut registry = AttributeRegistry::empty();
        registry.load(&NvvmDialect);
        let target = registry.intern_target(TargetAttr::nvvm());
        let object = ObjectAttr::get(target.clone(), CompilationFormat::Fatbin, b"x".to_vec(), None);
        let err = registry.print(&object.into()).unwrap_err();
        assert!(matches!(err, AttrError::UnknownAttributeKind { ref name, .. } if name == "gpu.object"));
        assert_eq!(registry.print(&target.into()).unwrap(), "#nvvm.target");
    }

    #[test]
    fn print_needs_registered_nested_kinds() {
        let mut registry = AttributeRegistry::empty();
        registry.load(&GpuDialect);
        let nvvm = registry.intern_target(TargetAttr::nvvm());
        let object = ObjectAttr::get(nvvm.clone(), CompilationFormat::Fatbin, b"x".to_vec(), None);
        let err = registry.print(&object.into()).unwrap_err();
        assert!(matches!(err, AttrError::UnknownAttributeKind { ref name, .. } if name == "nvvm.target"));

        registry.load(&NvvmDialect);
        let rocdl = registry.intern_target(TargetAttr::rocdl());
        let inner = PropertyMap::get([("t", Attr::from(rocdl).into())]).unwrap();
        let properties = PropertyMap::get([("inner", inner.into())]).unwrap();
        let object = ObjectAttr::get(nvvm, CompilationFormat::Fatbin, b"x".to_vec(), Some(properties));
        let attr = Attr::from(object);
        let err = registry.print(&attr).unwrap_err();
        assert!(matches!(err, AttrError::UnknownAttributeKind { ref name, .. } if name == "rocdl.target"));

        registry.load(&RocdlDialect);
        let printed = registry.print(&attr).unwrap();
        assert_eq!(
            printed,
            r#"#gpu.object<#nvvm.target, properties = {inner = {t = #rocdl.target}}, "x">"#
        );
        assert_eq!(registry.parse(&printed).unwrap(), attr);
    }

    #[test]
    fn trailing_input() {
        let registry = AttributeRegistry::default();
        let err = registry.parse("#nvvm.target #nvvm.target").unwrap_err();
        assert_eq!(
            err,
            AttrError::syntax(Span::new(13, 14), "unexpected trailing \"#\"")
        );
    }

    #[test]
    fn interning() {
        let registry = AttributeRegistry::default();
        let a = registry.intern_target(TargetAttr::nvvm());
        let b = registry.intern_target(TargetAttr::new(TargetKind::Nvvm));
        assert!(Arc::ptr_eq(&a, &b));
        let c = registry.intern_target(TargetAttr::rocdl());
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(registry.interned_targets(), 2);

        let parsed = registry.parse("#nvvm.target<O = 2>").unwrap();
        assert!(Arc::ptr_eq(parsed.as_target().unwrap(), &a));
        assert_eq!(registry.interned_targets(), 2);
    }

    #[test]
    fn parse_concurrently() {
        let registry = AttributeRegistry::default();
        let src = r#"#gpu.object<#rocdl.target<chip = "gfx90a">, bin = "\00\01">"#;
        let expected = registry.parse(src).unwrap();
        std::thread::scope(|s| {
            let handles = (0..4)
                .map(|_| s.spawn(|| registry.parse(src).unwrap()))
                .collect::<Vec<_>>();
            for handle in handles {
                let attr = handle.join().unwrap();
                assert_eq!(attr, expected);
                let target = attr.as_object().unwrap().target();
                let expected_target = expected.as_object().unwrap().target();
                assert!(Arc::ptr_eq(target, expected_target));
            }
        });
        assert_eq!(registry.interned_targets(), 1);
    }
}
