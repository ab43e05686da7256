//! GPU dialect.
//!
//! Holds `#gpu.object`, the attribute that carries a compiled GPU binary.
mod attribute;

use crate::ir::AttrHooks;
use crate::ir::AttributeRegistry;
use crate::Dialect;

pub use attribute::CompilationFormat;
pub use attribute::ObjectAttr;

pub struct GpuDialect;

impl Dialect for GpuDialect {
    fn name(&self) -> &'static str {
        "gpu"
    }
    fn description(&self) -> &'static str {
        "GPU objects and their compilation formats"
    }
    fn register(&self, registry: &mut AttributeRegistry) {
        let hooks = AttrHooks {
            parse: attribute::parse_object,
            print: attribute::print_object,
        };
        registry.register(ObjectAttr::MNEMONIC, hooks);
    }
}
