use agora_chat::{answer, evaluate, load_eval_cases, run_repl};
use agora_core::semantic::build_embedder;
use agora_core::{dataset, IndexBundle, LexicalConfig, RankConfig};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "agora-chat")]
#[command(about = "Ask questions about participatory democracy cases, methods and organizations", long_about = None)]
struct Cli {
    /// Directory holding the cases, methods and organizations datasets
    #[arg(long, default_value = "./data", global = true)]
    data: PathBuf,
    /// Embedder: `minilm` (sentence encoder), or `hash` / `hash:<dim>` for offline runs
    #[arg(long, default_value = "minilm", global = true)]
    embedder: String,
    /// Disable stemming in the lexical index
    #[arg(long, default_value_t = false, global = true)]
    no_stem: bool,
    /// Tokenize like a plain TF-IDF vectorizer: keep stopwords, no stemming
    #[arg(long, default_value_t = false, global = true)]
    vectorizer: bool,
    #[command(flatten)]
    rank: RankArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RankArgs {
    #[arg(long, default_value_t = 0.7, global = true)]
    semantic_weight: f32,
    #[arg(long, default_value_t = 0.3, global = true)]
    lexical_weight: f32,
    /// Minimum combined score for an answer
    #[arg(long, default_value_t = 0.5, global = true)]
    primary_threshold: f32,
    /// Minimum combined score for a related suggestion
    #[arg(long, default_value_t = 0.5, global = true)]
    suggestion_threshold: f32,
    #[arg(long, default_value_t = 3, global = true)]
    suggestion_count: usize,
    /// Append combined scores to answers
    #[arg(long, default_value_t = false, global = true)]
    show_scores: bool,
}

impl From<&RankArgs> for RankConfig {
    fn from(a: &RankArgs) -> Self {
        RankConfig {
            semantic_weight: a.semantic_weight,
            lexical_weight: a.lexical_weight,
            primary_threshold: a.primary_threshold,
            suggestion_threshold: a.suggestion_threshold,
            suggestion_count: a.suggestion_count,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single question
    Ask {
        /// The question
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Interactive session reading questions from stdin
    Repl,
    /// Measure answer accuracy over a JSON file of {"query", "expected"} cases
    Eval {
        #[arg(long)]
        cases: PathBuf,
        /// Print each case outcome as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let config = RankConfig::from(&cli.rank);
    let bundle = load_bundle(&cli)?;

    match cli.command {
        Commands::Ask { query } => {
            println!("{}", answer(&bundle, &query.join(" "), &config, cli.rank.show_scores)?);
        }
        Commands::Repl => {
            println!("Ask me about participatory cases, methods, or organizations. Type `quit` to leave.");
            let stdin = io::stdin();
            run_repl(&bundle, &config, cli.rank.show_scores, stdin.lock(), io::stdout())?;
        }
        Commands::Eval { cases, json } => {
            let cases = load_eval_cases(&cases)?;
            let report = evaluate(&bundle, &cases, &config)?;
            for o in &report.outcomes {
                if json {
                    println!("{}", serde_json::to_string(o)?);
                } else {
                    let mark = if o.passed { "PASS" } else { "FAIL" };
                    println!("{mark} {:?} (expected {:?})", o.query, o.expected);
                }
            }
            println!("Accuracy: {:.2}%", report.accuracy());
        }
    }
    Ok(())
}

fn load_bundle(cli: &Cli) -> Result<IndexBundle> {
    let collections = dataset::load_dir(&cli.data)?;
    let embedder = build_embedder(&cli.embedder)?;
    let mut lexical = if cli.vectorizer { LexicalConfig::vectorizer() } else { LexicalConfig::default() };
    lexical.tokenizer.stem &= !cli.no_stem;
    let bundle = IndexBundle::build(collections, embedder, &lexical)?;
    tracing::info!(docs = bundle.store().len(), data = %cli.data.display(), "indices ready");
    Ok(bundle)
}
