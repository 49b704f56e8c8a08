//! Corpus module - reading, tokenizing, tagging, and chunking
//! natural language expressions.

mod tag;
mod text;
mod tokenize;
mod transitions;

pub use tag::*;
pub use text::*;
pub use tokenize::*;
pub use transitions::*;
