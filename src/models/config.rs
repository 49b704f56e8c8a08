//! Configuration models for syngram.
//!
//! Every tunable of the induction pipelines is parameterized here and
//! resolved from a TOML file, with CLI flags taking precedence.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration for syngram.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Transition-probability chunking settings
    pub chunking: ChunkingConfig,

    /// Rule merging settings
    pub merge: MergeConfig,

    /// Rule factoring settings
    pub factor: FactorConfig,

    /// Treebank PCFG settings
    pub pcfg: PcfgConfig,

    /// Output settings
    pub output: OutputConfig,
}

/// Chunking configuration.
///
/// Expressions are split into chunks wherever the transition
/// probability between adjacent units drops below `split_below`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Transition probability below which a token sequence is split.
    /// Higher values produce smaller chunks.
    pub split_below: f64,

    /// Unit over which transitions are counted
    pub signature: SignatureKind,

    /// Drop texts whose signature frequency falls below this empirical
    /// quantile of the corpus; disabled when absent
    pub filter_quantile: Option<f64>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            split_below: 0.1,
            signature: SignatureKind::Token,
            filter_quantile: None,
        }
    }
}

/// Unit used to compute transition signatures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureKind {
    /// Surface tokens
    #[default]
    Token,
    /// Part-of-speech tags
    Pos,
    /// Constituency tags
    Constituency,
}

/// Merge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// How rule sections are compared during merging
    pub equality: EqualityKind,

    /// Similarity threshold for the Levenshtein and cosine comparators
    pub threshold: f64,

    /// Collapse leftover single-alternative rules into one catch-all rule
    pub misc: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            equality: EqualityKind::Literal,
            threshold: 0.8,
            misc: false,
        }
    }
}

/// Comparator used when deciding whether two rule sections match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EqualityKind {
    /// Exact element-wise equality
    #[default]
    Literal,
    /// Equal part-of-speech signatures
    Pos,
    /// Equal constituency signatures
    Constituency,
    /// Character-level Levenshtein similarity above the threshold
    CharLevenshtein,
    /// Token-level Levenshtein similarity above the threshold
    TokenLevenshtein,
    /// TF-IDF cosine similarity above the threshold
    TfidfCosine,
}

/// Factoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorConfig {
    /// Number of occurrences above which an expression group is
    /// factored out to its own rule
    pub min_count: usize,

    /// Also factor groups sharing a constituency signature
    pub constituency: bool,

    /// Optional JSON file mapping terms to synonym lists; matches are
    /// factored regardless of frequency
    pub synonyms: Option<PathBuf>,
}

impl Default for FactorConfig {
    fn default() -> Self {
        Self {
            min_count: 1,
            constituency: false,
            synonyms: None,
        }
    }
}

/// Treebank PCFG configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PcfgConfig {
    /// Start symbol of the induced grammar
    pub start: String,

    /// Minimum production probability to keep
    pub min_prob: f64,

    /// Glob pattern for treebank files when the input is a directory
    pub pattern: String,
}

impl Default for PcfgConfig {
    fn default() -> Self {
        Self {
            start: "S".to_string(),
            min_prob: 0.01,
            pattern: "**/*.mrg".to_string(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output file path; stdout when absent
    pub path: Option<PathBuf>,

    /// Format JSGF output with a single public main rule
    pub main_rule: bool,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            source: Box::new(e),
        })
    }

    /// Render the effective configuration as a flat `key=value` list
    /// for the JSGF front matter.
    pub fn summary(&self) -> Vec<(String, String)> {
        vec![
            ("chunking.signature".into(), format!("{:?}", self.chunking.signature).to_lowercase()),
            ("chunking.split_below".into(), format!("{}", self.chunking.split_below)),
            ("factor.min_count".into(), format!("{}", self.factor.min_count)),
            ("merge.equality".into(), format!("{:?}", self.merge.equality).to_lowercase()),
            ("merge.threshold".into(), format!("{}", self.merge.threshold)),
            ("output.main_rule".into(), format!("{}", self.output.main_rule)),
        ]
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: Box<toml::de::Error>,
    },
}
