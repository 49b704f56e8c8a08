//! Pipeline module - PCFG induction and JSGF grammar induction.

mod grammar;
mod pcfg;

pub use grammar::*;
pub use pcfg::*;
