//! Dialect definitions.
//!
//! Dialects are collections of attributes. This module contains the GPU
//! object attribute and the targets it can refer to.

pub mod gpu;
pub mod nvvm;
pub mod rocdl;
mod target;

pub use target::TargetAttr;
pub use target::TargetKind;
