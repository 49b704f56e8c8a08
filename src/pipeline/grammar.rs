//! JSGF grammar induction pipeline.
//!
//! Pipeline flow:
//! Expressions → Chunking → Triplet rules → Merging → Factoring → JSGF

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::corpus::{
    collect_chunks, filter_texts, read_texts, to_triplet, transition_chunk, validate_input,
    PosTagger, SepTokenizer, SyntacticTagger, Text, Tokenizer, Transitions, WordTokenizer,
    SEP_MARKER,
};
use crate::grammar::{
    collect_idf, collect_vocab, constituency_factor, expression_factor, merge_misc, merge_p,
    merge_pr, merge_ps, merge_r, merge_rs, merge_s, read_synonyms, set_ids, synonym_factor,
    CharLevenshteinEqual, ConstituencyEqual, Equality, Grammar, LiteralEqual, PosEqual, Rule,
    TfidfCosineEqual, TokenLevenshteinEqual,
};
use crate::models::{Config, EqualityKind, Result, SignatureKind, SyngramError};

/// How aggressively the grammar generalizes beyond the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarMode {
    /// One rule per expression, no generalization.
    Clone,
    /// Merge rules sharing two sections; the grammar covers exactly the
    /// corpus, smaller.
    Compress,
    /// Also merge rules sharing one section; the grammar covers
    /// expressions beyond the corpus.
    Interpolate,
    /// Interpolation plus every configured merge and factor knob.
    Custom,
}

impl GrammarMode {
    pub fn command(&self) -> &'static str {
        match self {
            GrammarMode::Clone => "clone",
            GrammarMode::Compress => "compress",
            GrammarMode::Interpolate => "interpolate",
            GrammarMode::Custom => "custom",
        }
    }
}

/// Counters reported after a grammar run.
#[derive(Debug, Clone, Default)]
pub struct GrammarStats {
    pub texts: usize,
    pub chunks: usize,
    pub rules: usize,
    pub runtime_secs: f64,
}

/// Pipeline inducing a JSGF grammar from a corpus of expressions.
pub struct GrammarPipeline {
    config: Config,
    mode: GrammarMode,
}

impl GrammarPipeline {
    pub fn new(config: Config, mode: GrammarMode) -> Self {
        Self { config, mode }
    }

    /// Run the pipeline over the expression file at `input` and write
    /// the induced grammar.
    pub fn run(&self, input: &Path) -> Result<GrammarStats> {
        let start = Instant::now();
        let tokenizer = WordTokenizer::new();
        let tagger = SyntacticTagger::new(PosTagger::new(), WordTokenizer::new());

        let file = File::open(input)
            .map_err(|e| SyngramError::io(format!("opening corpus file {}", input.display()), e))?;
        let mut texts = read_texts(BufReader::new(file))
            .map_err(|e| SyngramError::io(format!("reading corpus file {}", input.display()), e))?;
        if texts.is_empty() {
            return Err(SyngramError::EmptyCorpus(format!(
                "no expressions in {}",
                input.display()
            )));
        }
        // Expressions may arrive pre-chunked with <SEP> markers; their
        // chunks are taken as given and transition chunking skips them.
        let sep = SepTokenizer::new();
        for text in &mut texts {
            validate_input(&text.text)?;
            if text.text.contains(SEP_MARKER) {
                text.chunks = sep
                    .tokenize(&text.text)
                    .iter()
                    .map(|c| tokenizer.normalize(c))
                    .collect();
                text.text = tokenizer.normalize(&text.text.replace(SEP_MARKER, " "));
            } else {
                text.text = tokenizer.normalize(&text.text);
            }
        }
        if let Some(q) = self.config.chunking.filter_quantile {
            let before = texts.len();
            texts = filter_texts(texts, &tagger, q);
            debug!(before, after = texts.len(), q, "Filtered corpus by signature quantile");
        }

        let mut stats = GrammarStats {
            texts: texts.len(),
            ..Default::default()
        };
        info!(
            texts = stats.texts,
            mode = self.mode.command(),
            "Starting grammar induction"
        );

        let rules = match self.mode {
            GrammarMode::Clone => texts
                .into_iter()
                .map(|t| Rule::from_text(&to_triplet(t, &[])))
                .collect(),
            _ => {
                let (mut rules, chunks) = self.chunk_to_rules(texts, &tagger, &tokenizer);
                stats.chunks = chunks;

                let vocab;
                let idf;
                let eq: Box<dyn Equality + '_> = match self.config.merge.equality {
                    EqualityKind::Literal => Box::new(LiteralEqual),
                    EqualityKind::Pos => Box::new(PosEqual::new(&tagger)),
                    EqualityKind::Constituency => Box::new(ConstituencyEqual::new(&tagger)),
                    EqualityKind::CharLevenshtein => Box::new(CharLevenshteinEqual {
                        threshold: self.config.merge.threshold,
                    }),
                    EqualityKind::TokenLevenshtein => Box::new(TokenLevenshteinEqual {
                        threshold: self.config.merge.threshold,
                    }),
                    EqualityKind::TfidfCosine => {
                        let corpus: Vec<Text> = rules
                            .iter()
                            .flat_map(|r| {
                                r.pre
                                    .iter()
                                    .chain(&r.root)
                                    .chain(&r.suf)
                                    .map(|s| Text::new(s.as_str()))
                            })
                            .collect();
                        vocab = collect_vocab(&corpus, &tokenizer);
                        idf = collect_idf(&corpus, &tokenizer);
                        Box::new(TfidfCosineEqual {
                            threshold: self.config.merge.threshold,
                            vocab: &vocab,
                            idf: &idf,
                            tokenizer: &tokenizer,
                        })
                    }
                };

                rules = merge_pr(rules, eq.as_ref());
                rules = merge_ps(rules, eq.as_ref());
                rules = merge_rs(rules, eq.as_ref());
                if matches!(self.mode, GrammarMode::Interpolate | GrammarMode::Custom) {
                    rules = merge_p(rules, eq.as_ref());
                    rules = merge_r(rules, eq.as_ref());
                    rules = merge_s(rules, eq.as_ref());
                }
                if self.mode == GrammarMode::Custom && self.config.merge.misc {
                    rules = merge_misc(rules);
                }

                rules = expression_factor(rules, self.config.factor.min_count);
                if self.mode == GrammarMode::Custom {
                    if self.config.factor.constituency {
                        rules = constituency_factor(rules, &tagger, self.config.factor.min_count);
                    }
                    if let Some(path) = &self.config.factor.synonyms {
                        let synonyms = read_synonyms(path)?;
                        rules = synonym_factor(rules, &synonyms, &tokenizer);
                    }
                }
                rules
            }
        };

        let rules = set_ids(rules);
        stats.rules = rules.len();

        let grammar = Grammar::new(rules);
        grammar.write(
            self.mode.command(),
            &input.display().to_string(),
            &self.config,
        )?;

        stats.runtime_secs = start.elapsed().as_secs_f64();
        info!(
            texts = stats.texts,
            rules = stats.rules,
            runtime = format!("{:.2}s", stats.runtime_secs),
            "Grammar induction complete"
        );
        Ok(stats)
    }

    /// Chunk every text by transition probability, pick priority chunks
    /// across the corpus, and split each text into a triplet rule.
    /// Returns the rules and the number of distinct priority chunks.
    fn chunk_to_rules(
        &self,
        mut texts: Vec<Text>,
        tagger: &SyntacticTagger<WordTokenizer>,
        tokenizer: &WordTokenizer,
    ) -> (Vec<Rule>, usize) {
        let signature = self.config.chunking.signature;
        let split = |s: &str| match signature {
            SignatureKind::Token => tokenizer.tokenize(s),
            SignatureKind::Pos => tagger.pos(s).0,
            SignatureKind::Constituency => tagger.constituency(s).0,
        };
        let transitions = Transitions::collect(&texts, split);

        let pb = ProgressBar::new(texts.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("##-"),
        );

        for text in &mut texts {
            if text.chunks.is_empty() {
                let (tags, units) = match signature {
                    SignatureKind::Token => {
                        let units = tokenizer.tokenize(&text.text);
                        (units.clone(), units)
                    }
                    SignatureKind::Pos => tagger.pos(&text.text),
                    SignatureKind::Constituency => tagger.constituency(&text.text),
                };
                text.chunks =
                    transition_chunk(&units, &tags, &transitions, self.config.chunking.split_below);
            }
            pb.inc(1);
        }

        let priority = collect_chunks(&texts);
        pb.finish_with_message(format!("{} chunks", priority.len()));

        let rules = texts
            .into_iter()
            .map(|t| Rule::from_text(&to_triplet(t, &priority)))
            .collect();
        (rules, priority.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn corpus_file(dir: &TempDir, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.path().join("corpus.txt");
        let mut file = File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        path
    }

    fn config_to(dir: &TempDir) -> (Config, std::path::PathBuf) {
        let out = dir.path().join("grammar.jsgf");
        let mut config = Config::default();
        config.output.path = Some(out.clone());
        (config, out)
    }

    #[test]
    fn test_clone_mode_one_rule_per_text() {
        let dir = TempDir::new().unwrap();
        let input = corpus_file(&dir, &["turn on the light", "turn off the light"]);
        let (config, out) = config_to(&dir);

        let stats = GrammarPipeline::new(config, GrammarMode::Clone)
            .run(&input)
            .unwrap();
        assert_eq!(stats.texts, 2);
        assert_eq!(stats.rules, 2);

        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.starts_with("#JSGF V1.0 ISO8859-1 en;"));
        assert!(written.contains("public <turn_off_the_light_1> = (turn off the light);"));
        assert!(written.contains("public <turn_on_the_light_2> = (turn on the light);"));
    }

    #[test]
    fn test_compress_merges_shared_sections() {
        let dir = TempDir::new().unwrap();
        // "the light" recurs, so it becomes the priority chunk and the
        // two expressions share pre and root after splitting.
        let input = corpus_file(
            &dir,
            &["turn on the light", "turn off the light", "dim the light"],
        );
        let (config, out) = config_to(&dir);

        let stats = GrammarPipeline::new(config, GrammarMode::Compress)
            .run(&input)
            .unwrap();
        assert!(stats.rules < stats.texts);

        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.contains("the light"));
    }

    #[test]
    fn test_pre_chunked_input_keeps_given_chunks() {
        let dir = TempDir::new().unwrap();
        let input = corpus_file(&dir, &["switch on<SEP>the heater"]);
        let (config, out) = config_to(&dir);

        GrammarPipeline::new(config, GrammarMode::Compress)
            .run(&input)
            .unwrap();
        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.contains("(switch on)"));
        assert!(written.contains("(the heater)"));
    }

    #[test]
    fn test_empty_corpus_is_an_error() {
        let dir = TempDir::new().unwrap();
        let input = corpus_file(&dir, &["", "   "]);
        let (config, _) = config_to(&dir);

        assert!(matches!(
            GrammarPipeline::new(config, GrammarMode::Clone)
                .run(&input)
                .unwrap_err(),
            SyngramError::EmptyCorpus(_)
        ));
    }

    #[test]
    fn test_custom_mode_synonym_factoring() {
        let dir = TempDir::new().unwrap();
        let input = corpus_file(&dir, &["turn on the light", "turn on the lamp"]);
        let synonyms_path = dir.path().join("synonyms.json");
        std::fs::write(&synonyms_path, r#"{"light": ["lamp"]}"#).unwrap();

        let (mut config, out) = config_to(&dir);
        config.factor.synonyms = Some(synonyms_path);

        GrammarPipeline::new(config, GrammarMode::Custom)
            .run(&input)
            .unwrap();
        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.contains("(lamp|light)"));
        assert!(written.contains("<lamp_light_2>"));
    }
}
