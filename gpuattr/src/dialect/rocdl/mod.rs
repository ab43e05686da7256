//! ROCDL dialect: targets for AMD GPUs.
use crate::dialect::target::parse_target;
use crate::dialect::target::print_target;
use crate::dialect::TargetKind;
use crate::error::AttrError;
use crate::ir::Attr;
use crate::ir::AttrHooks;
use crate::ir::AttributeRegistry;
use crate::parser::Parser;
use crate::Dialect;

fn parse_rocdl_target(parser: &mut Parser<'_>) -> Result<Attr, AttrError> {
    parse_target(parser, TargetKind::Rocdl)
}

pub struct RocdlDialect;

impl Dialect for RocdlDialect {
    fn name(&self) -> &'static str {
        "rocdl"
    }
    fn description(&self) -> &'static str {
        "AMD GCN targets"
    }
    fn register(&self, registry: &mut AttributeRegistry) {
        let hooks = AttrHooks {
            parse: parse_rocdl_target,
            print: print_target,
        };
        registry.register(TargetKind::Rocdl.mnemonic(), hooks);
    }
}
