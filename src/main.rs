//! syngram CLI - Grammar induction from corpora and treebanks.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use syngram::{Config, GrammarMode, GrammarPipeline, PcfgPipeline};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "syngram")]
#[command(version)]
#[command(about = "Grammar induction from corpora and treebanks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "syngram.toml")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Induce a PCFG from a treebank and emit filtered phrase rules as JSONL
    Pcfg {
        /// Treebank file or directory
        input: PathBuf,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Minimum production probability to keep
        #[arg(long)]
        min_prob: Option<f64>,
    },

    /// Emit a JSGF grammar with one rule per corpus expression
    Clone(GrammarArgs),

    /// Merge rules sharing two sections; same coverage, smaller grammar
    Compress(GrammarArgs),

    /// Also merge rules sharing one section; coverage extends beyond the corpus
    Interpolate(GrammarArgs),

    /// Interpolation plus every configured merge and factor knob
    Custom(GrammarArgs),

    /// Show example configuration
    Example,
}

#[derive(clap::Args)]
struct GrammarArgs {
    /// Corpus file, one expression per line
    input: PathBuf,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Transition probability below which expressions are chunked
    #[arg(long)]
    split_below: Option<f64>,

    /// Similarity threshold for the Levenshtein and cosine comparators
    #[arg(long)]
    threshold: Option<f64>,

    /// Occurrences above which an expression group gets its own rule
    #[arg(long)]
    min_count: Option<usize>,

    /// Format the grammar with a single public main rule
    #[arg(long)]
    main: bool,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
}

/// Load the configuration file, falling back to defaults when the
/// default path does not exist.
fn load_config(path: &PathBuf) -> Result<Config> {
    if path.exists() {
        Config::from_file(path).with_context(|| format!("Failed to load config from {path:?}"))
    } else {
        debug!(path = %path.display(), "Config file absent, using defaults");
        Ok(Config::default())
    }
}

fn print_example_config() {
    let example = r#"# syngram configuration file

[chunking]
# Transition probability below which expressions are split into chunks.
# Higher values produce smaller chunks.
split_below = 0.1
# Unit over which transitions are counted: token, pos, or constituency
signature = "token"
# Drop texts whose signature frequency falls below this empirical
# quantile of the corpus
# filter_quantile = 0.5

[merge]
# Comparator for rule sections: literal, pos, constituency,
# char_levenshtein, token_levenshtein, or tfidf_cosine
equality = "literal"
# Similarity threshold for the Levenshtein and cosine comparators
threshold = 0.8
# Collapse leftover single-alternative rules into one catch-all rule
misc = false

[factor]
# Occurrences above which an expression group gets its own rule
min_count = 1
# Also factor groups sharing a constituency signature
constituency = false
# JSON file mapping terms to synonym lists
# synonyms = "synonyms.json"

[pcfg]
# Start symbol of the induced grammar
start = "S"
# Minimum production probability to keep
min_prob = 0.01
# Glob pattern for treebank files when the input is a directory
pattern = "**/*.mrg"

[output]
# path = "grammar.jsgf"
# Format JSGF output with a single public main rule
main_rule = false
"#;
    println!("{example}");
}

fn grammar_config(cli_config: &PathBuf, args: &GrammarArgs) -> Result<Config> {
    let mut config = load_config(cli_config)?;
    if let Some(split_below) = args.split_below {
        config.chunking.split_below = split_below;
    }
    if let Some(threshold) = args.threshold {
        config.merge.threshold = threshold;
    }
    if let Some(min_count) = args.min_count {
        config.factor.min_count = min_count;
    }
    if args.output.is_some() {
        config.output.path = args.output.clone();
    }
    if args.main {
        config.output.main_rule = true;
    }
    Ok(config)
}

fn run_grammar(cli_config: &PathBuf, args: &GrammarArgs, mode: GrammarMode) -> Result<()> {
    let config = grammar_config(cli_config, args)?;
    let to_stdout = config.output.path.is_none();
    let stats = GrammarPipeline::new(config, mode).run(&args.input)?;

    if !to_stdout {
        println!("\n=== Grammar Induction Complete ===");
        println!("Mode:        {}", mode.command());
        println!("Expressions: {}", stats.texts);
        println!("Chunks:      {}", stats.chunks);
        println!("Rules:       {}", stats.rules);
        println!("Runtime:     {:.1}s", stats.runtime_secs);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Example => {
            print_example_config();
            Ok(())
        }

        Commands::Pcfg {
            input,
            output,
            min_prob,
        } => {
            let mut config = load_config(&cli.config)?;
            if let Some(min_prob) = min_prob {
                config.pcfg.min_prob = min_prob;
            }
            if output.is_some() {
                config.output.path = output;
            }
            let to_stdout = config.output.path.is_none();

            let stats = PcfgPipeline::new(config).run(&input)?;

            if !to_stdout {
                println!("\n=== PCFG Induction Complete ===");
                println!("Files:       {}", stats.files);
                println!("Trees:       {}", stats.trees);
                println!("Productions: {}", stats.productions);
                println!("Rules kept:  {}", stats.kept);
                println!("Runtime:     {:.1}s", stats.runtime_secs);
            }
            Ok(())
        }

        Commands::Clone(args) => run_grammar(&cli.config, &args, GrammarMode::Clone),
        Commands::Compress(args) => run_grammar(&cli.config, &args, GrammarMode::Compress),
        Commands::Interpolate(args) => run_grammar(&cli.config, &args, GrammarMode::Interpolate),
        Commands::Custom(args) => run_grammar(&cli.config, &args, GrammarMode::Custom),
    }
}
