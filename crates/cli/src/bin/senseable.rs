use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sense_profile::{FileStore, Outcome};
use sense_provider::HashingProvider;
use sense_retrieval::MetaphorCorpus;
use sense_rewrite::{PipelineConfig, RewriteOptions, RewritePipeline};
use sense_stg::{SensoryGraph, StgSeed};
use sense_taxonomy::Modality;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "senseable")]
#[command(about = "Sensory accessibility rewriting core", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Pipeline config file (TOML); built-in defaults if omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory for profiles and memory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Metaphor corpus file (JSON); built-in corpus if omitted
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    /// STG seed file (JSON); built-in seed if omitted
    #[arg(long, global = true)]
    graph: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite text for a user profile (reads stdin when no text is given)
    Rewrite {
        /// User id owning the accessibility fingerprint
        #[arg(long, default_value = "default")]
        user: String,

        /// Text to rewrite
        text: Option<String>,

        /// Difficulty threshold override
        #[arg(long)]
        threshold: Option<f32>,

        /// Traversal hop cap override
        #[arg(long)]
        max_hops: Option<usize>,

        /// Rewriter retry cap override
        #[arg(long)]
        max_attempts: Option<usize>,

        /// Cultural tag override, comma separated
        #[arg(long)]
        tags: Option<String>,
    },

    /// Show a user's stored and effective fingerprint
    Inspect {
        #[arg(long, default_value = "default")]
        user: String,
    },

    /// Record accept/reject feedback for a substitution
    Feedback {
        #[arg(long, default_value = "default")]
        user: String,

        /// Surface text the feedback refers to
        surface: String,

        /// Modality of the span
        #[arg(long)]
        modality: String,

        #[arg(long, value_enum)]
        outcome: FeedbackOutcome,
    },
}

#[derive(Copy, Clone, ValueEnum)]
enum FeedbackOutcome {
    Accept,
    Reject,
}

impl FeedbackOutcome {
    const fn as_domain(self) -> Outcome {
        match self {
            FeedbackOutcome::Accept => Outcome::Accepted,
            FeedbackOutcome::Reject => Outcome::Rejected,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .target(env_logger::Target::Stderr)
        .init();

    let config = load_config(cli.config.as_deref()).await?;
    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);
    log::debug!("Using data directory {}", data_dir.display());
    let store = Arc::new(FileStore::new(&data_dir));

    let seed = match cli.graph.as_deref() {
        Some(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("failed to read graph seed {}", path.display()))?;
            StgSeed::from_json(&bytes)?
        }
        None => StgSeed::builtin(),
    };
    let graph = Arc::new(SensoryGraph::from_seed(seed)?);

    let corpus = match cli.corpus.as_deref() {
        Some(path) => MetaphorCorpus::load(path)
            .await
            .with_context(|| format!("failed to load corpus {}", path.display()))?,
        None => MetaphorCorpus::builtin(),
    };

    let pipeline = RewritePipeline::new(
        Arc::new(HashingProvider::new()),
        graph,
        &corpus,
        store,
        config,
    )
    .await;

    match cli.command {
        Commands::Rewrite {
            user,
            text,
            threshold,
            max_hops,
            max_attempts,
            tags,
        } => {
            let text = match text {
                Some(text) => text,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buffer)
                        .context("failed to read stdin")?;
                    buffer
                }
            };
            let options = RewriteOptions {
                difficulty_threshold: threshold,
                max_hops,
                max_attempts,
                cultural_tags: tags
                    .map(|t| t.split(',').map(|s| s.trim().to_string()).collect()),
            };
            let outcome = pipeline.rewrite(&text, &user, &options).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }

        Commands::Inspect { user } => {
            let memory = pipeline.memory();
            let base = memory.base_fingerprint(&user).await?;
            let effective = memory.effective_fingerprint(&user).await?;
            let report = serde_json::json!({
                "user": user,
                "base": base,
                "effective": effective,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Feedback {
            user,
            surface,
            modality,
            outcome,
        } => {
            let modality: Modality = modality
                .parse()
                .map_err(|err: String| anyhow::anyhow!(err))?;
            let fingerprint = pipeline
                .memory()
                .record_feedback(&user, &surface, modality, outcome.as_domain())
                .await?;
            println!("{}", serde_json::to_string_pretty(&fingerprint)?);
        }
    }

    Ok(())
}

async fn load_config(path: Option<&std::path::Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("failed to read config {}", path.display()))?;
            PipelineConfig::from_toml_bytes(&bytes)
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("senseable")
}
