//! Treebank module - bracketed tree parsing and PCFG induction.

mod pcfg;
mod tree;

pub use pcfg::*;
pub use tree::*;
