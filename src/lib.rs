//! syngram - Grammar induction from corpora and treebanks.
//!
//! ## Pipelines
//!
//! - **Grammar Pipeline**: Expressions → Chunking → Triplet rules →
//!   Merging → Factoring → JSGF
//! - **PCFG Pipeline**: Treebank → Trees → Productions → PCFG →
//!   Filtered phrase rules → JSONL
//!
//! ## Induction modes
//!
//! - **clone**: one rule per corpus expression
//! - **compress**: merge rules sharing two sections; same coverage,
//!   smaller grammar
//! - **interpolate**: also merge rules sharing one section; coverage
//!   extends beyond the corpus
//! - **custom**: interpolation plus every configured merge and factor
//!   knob

pub mod corpus;
pub mod grammar;
pub mod models;
pub mod pipeline;
pub mod treebank;

// Re-exports for convenience
pub use corpus::{PosTagger, SyntacticTagger, Text, Tokenizer, Transitions, WordTokenizer};
pub use grammar::{Grammar, Rule};
pub use models::{Config, Result, SyngramError};
pub use pipeline::{GrammarMode, GrammarPipeline, PcfgPipeline};
pub use treebank::{Pcfg, Production, Symbol, Tree};
