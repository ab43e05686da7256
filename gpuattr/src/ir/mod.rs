//! Attribute values and the registry that parses and prints them.
//!
//! The building blocks are the byte literal codec ([encode_byte_literal] and
//! [decode_byte_literal]), integer types, scalar attributes, and the
//! [PropertyMap]. Composite attributes from the dialects are collected in
//! the closed [Attr] enum, which the [AttributeRegistry] dispatches on.

mod attribute;
mod bytes;
mod registry;
mod typ;

pub use attribute::IntegerAttr;
pub use attribute::PropertyMap;
pub use attribute::PropertyValue;
pub use attribute::StringAttr;
pub use bytes::decode_byte_literal;
pub use bytes::encode_byte_literal;
pub use registry::Attr;
pub use registry::AttrHooks;
pub use registry::AttributeRegistry;
pub use registry::ParseFn;
pub use registry::PrintFn;
pub use typ::IntegerType;
pub use typ::Signedness;
