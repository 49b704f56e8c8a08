//! Treebank PCFG induction pipeline.
//!
//! Pipeline flow:
//! Treebank files → Trees → Pooled productions → PCFG → Phrase rules → JSONL

use std::path::{Path, PathBuf};
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::models::{Config, Result, SyngramError};
use crate::treebank::{induce_pcfg, parse_trees, to_json_line, Production};

/// Counters reported after a PCFG run.
#[derive(Debug, Clone, Default)]
pub struct PcfgStats {
    pub files: usize,
    pub trees: usize,
    pub productions: usize,
    pub kept: usize,
    pub runtime_secs: f64,
}

/// Pipeline inducing a PCFG from a treebank and emitting the filtered
/// phrase rules as JSON lines.
pub struct PcfgPipeline {
    config: Config,
}

impl PcfgPipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Resolve the treebank files under `input`: the file itself, or
    /// every match of the configured glob pattern when `input` is a
    /// directory. Files come out sorted.
    pub fn collect_files(&self, input: &Path) -> Result<Vec<PathBuf>> {
        if input.is_file() {
            return Ok(vec![input.to_owned()]);
        }

        let pattern = format!("{}/{}", input.display(), self.config.pcfg.pattern);
        let matches = glob::glob(&pattern)
            .map_err(|e| SyngramError::InvalidInput(format!("bad glob pattern {pattern:?}: {e}")))?;

        let mut files = Vec::new();
        for entry in matches {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Skipping unreadable treebank entry"),
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(SyngramError::EmptyCorpus(format!(
                "no treebank files match {pattern}"
            )));
        }
        Ok(files)
    }

    /// Run the pipeline over `input` and write one JSON object per
    /// surviving rule, mapping its left-hand nonterminal to the ordered
    /// right-hand symbols.
    pub fn run(&self, input: &Path) -> Result<PcfgStats> {
        let start = Instant::now();
        let files = self.collect_files(input)?;

        info!(
            files = files.len(),
            min_prob = self.config.pcfg.min_prob,
            "Starting PCFG induction"
        );

        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("##-"),
        );

        let mut stats = PcfgStats {
            files: files.len(),
            ..Default::default()
        };
        let mut productions: Vec<Production> = Vec::new();

        for file in &files {
            let source = std::fs::read_to_string(file)
                .map_err(|e| SyngramError::io(format!("reading treebank file {}", file.display()), e))?;
            let trees = parse_trees(&source, &file.display().to_string())?;

            stats.trees += trees.len();
            for tree in &trees {
                productions.extend(tree.productions());
            }
            pb.inc(1);
            pb.set_message(format!("trees: {}", stats.trees));
        }
        stats.productions = productions.len();

        if productions.is_empty() {
            pb.finish_and_clear();
            return Err(SyngramError::EmptyCorpus(format!(
                "treebank under {} contains no trees",
                input.display()
            )));
        }

        let pcfg = induce_pcfg(&self.config.pcfg.start, &productions);
        let rules = pcfg.phrase_rules(self.config.pcfg.min_prob);
        stats.kept = rules.len();

        let mut out = String::new();
        for sp in &rules {
            out.push_str(&to_json_line(&sp.production)?);
            out.push('\n');
        }

        match &self.config.output.path {
            Some(path) => {
                std::fs::write(path, &out)
                    .map_err(|e| SyngramError::io(format!("writing {}", path.display()), e))?;
                info!(path = %path.display(), rules = stats.kept, "Wrote phrase rules");
            }
            None => print!("{out}"),
        }

        pb.finish_with_message(format!("Done! {} rules kept", stats.kept));
        stats.runtime_secs = start.elapsed().as_secs_f64();

        info!(
            files = stats.files,
            trees = stats.trees,
            productions = stats.productions,
            kept = stats.kept,
            runtime = format!("{:.2}s", stats.runtime_secs),
            "PCFG induction complete"
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    const BANK_A: &str = "\
( (S (NP (DT the) (NN dog)) (VP (VBZ chases) (NP (DT a) (NN cat)))) )
( (S (NP (DT the) (NN cat)) (VP (VBZ sleeps))) )
";
    const BANK_B: &str = "\
( (S (NP (NNP Sam)) (VP (VBZ naps) (PP (IN on) (NP (DT the) (NN mat))))) )
";

    #[test]
    fn test_collect_files_from_dir() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "wsj/a.mrg", BANK_A);
        write_file(&dir, "wsj/b.mrg", BANK_B);
        write_file(&dir, "wsj/notes.txt", "ignore");

        let pipeline = PcfgPipeline::new(Config::default());
        let files = pipeline.collect_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("wsj/a.mrg"));
    }

    #[test]
    fn test_collect_files_single_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "one.mrg", BANK_A);

        let pipeline = PcfgPipeline::new(Config::default());
        assert_eq!(pipeline.collect_files(&path).unwrap(), vec![path]);
    }

    #[test]
    fn test_collect_files_empty_dir() {
        let dir = TempDir::new().unwrap();
        let pipeline = PcfgPipeline::new(Config::default());
        assert!(matches!(
            pipeline.collect_files(dir.path()).unwrap_err(),
            SyngramError::EmptyCorpus(_)
        ));
    }

    #[test]
    fn test_run_writes_jsonl() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "wsj/a.mrg", BANK_A);
        write_file(&dir, "wsj/b.mrg", BANK_B);
        let out = dir.path().join("rules.jsonl");

        let mut config = Config::default();
        config.output.path = Some(out.clone());
        let stats = PcfgPipeline::new(config).run(dir.path()).unwrap();

        assert_eq!(stats.files, 2);
        assert_eq!(stats.trees, 3);

        let written = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        // NP -> DT NN (4 of 5), NP -> NNP (unary, dropped), PP has a
        // phrase rhs, VP rhs mix phrase labels with tags.
        assert_eq!(lines, vec![r#"{"NP":["DT","NN"]}"#]);
        assert_eq!(stats.kept, 1);
    }

    #[test]
    fn test_run_parse_error_carries_path() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "bad.mrg", "( (S (NP");

        let err = PcfgPipeline::new(Config::default())
            .run(dir.path())
            .unwrap_err();
        match err {
            SyngramError::TreeParse { path, .. } => assert!(path.ends_with("bad.mrg")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
