//! gpuattr parses and prints GPU object attributes as they appear in MLIR.
//!
//! A GPU object attribute bundles a compiled kernel binary with the target it
//! was compiled for:
//!
//! ```text
//! #gpu.object<#nvvm.target, properties = {O = 2 : i32}, "BC\C0\DE5\14\00...">
//! ```
//!
//! The object bytes are arbitrary binary data. They are written as a byte
//! literal in which every byte that is not printable ASCII is escaped as a
//! backslash followed by two hex digits. This makes the text form safe to put
//! in an IR file while the bytes survive a print and parse round-trip
//! unchanged.
//!
//! Everything goes through an [ir::AttributeRegistry]. The registry maps
//! attribute names (such as `gpu.object` or `nvvm.target`) to a parser and a
//! printer. It is built once, for example with
//! [ir::AttributeRegistry::default], and then passed by reference:
//!
//! ```
//! use gpuattr::ir::AttributeRegistry;
//!
//! let registry = AttributeRegistry::default();
//! let attr = registry.parse(r#"#gpu.object<#nvvm.target<O = 2>,   "\0a">"#).unwrap();
//! let object = attr.as_object().unwrap();
//! assert_eq!(object.object(), b"\n");
//! assert_eq!(
//!     registry.print(&attr).unwrap(),
//!     r#"#gpu.object<#nvvm.target, "\0A">"#
//! );
//! ```
//!
//! Printing only looks at the values inside an attribute. Whether it was
//! parsed from oddly formatted text or built in code makes no difference.

mod canonicalize;
pub mod dialect;
pub mod error;
pub mod ir;
pub mod parser;
#[cfg(feature = "test-utils")]
pub mod tester;

pub use canonicalize::canonicalize;
pub use canonicalize::default_arguments;
pub use canonicalize::init_subscriber;
pub use canonicalize::init_test_subscriber;
pub use canonicalize::Canonicalized;
pub use error::AttrError;
pub use error::Span;

use ir::AttributeRegistry;

/// Dialects can define new attributes.
/// Each dialect is given an unique namespace that is prefixed.
///
/// Loading a dialect into an [AttributeRegistry] makes its attributes
/// available to the parser and printer.
pub trait Dialect {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn register(&self, registry: &mut AttributeRegistry);
}
