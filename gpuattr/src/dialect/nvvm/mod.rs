//! NVVM dialect: targets for NVIDIA GPUs.
use crate::dialect::target::parse_target;
use crate::dialect::target::print_target;
use crate::dialect::TargetKind;
use crate::error::AttrError;
use crate::ir::Attr;
use crate::ir::AttrHooks;
use crate::ir::AttributeRegistry;
use crate::parser::Parser;
use crate::Dialect;

fn parse_nvvm_target(parser: &mut Parser<'_>) -> Result<Attr, AttrError> {
    parse_target(parser, TargetKind::Nvvm)
}

pub struct NvvmDialect;

impl Dialect for NvvmDialect {
    fn name(&self) -> &'static str {
        "nvvm"
    }
    fn description(&self) -> &'static str {
        "NVIDIA PTX targets"
    }
    fn register(&self, registry: &mut AttributeRegistry) {
        let hooks = AttrHooks {
            parse: parse_nvvm_target,
            print: print_target,
        };
        registry.register(TargetKind::Nvvm.mnemonic(), hooks);
    }
}
