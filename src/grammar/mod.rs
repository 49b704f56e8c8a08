//! Grammar module - rules, merging, factoring, and JSGF export.

mod distance;
mod factor;
mod jsgf;
mod merge;
mod rule;

pub use distance::*;
pub use factor::*;
pub use jsgf::*;
pub use merge::*;
pub use rule::*;
