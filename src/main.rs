//! clausefp command line.
//!
//! Analysis commands (`extract`, `score`) are offline. `search`, `seed`,
//! `stats` and `evaluate` open the configured clause store.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clausefp::tools::{extract_clauses, score_risk};
use clausefp::{
    AppConfig, EvaluationReport, InstrumentedJudge, LegalTools, LogFormat, OverlapJudge,
    RetrievalAnswerer, SimilarityStore, StoreHandle, ToolsConfig, build_instrumented_provider,
    evaluate, load_golden_set, sample_golden_set, seed_sample_data, write_golden_set,
};
use telemetry::{SharedMetrics, TracingMetrics};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "clausefp",
    version,
    about = "Analyze legal clauses, search a clause store and gate answer quality"
)]
struct Cli {
    /// YAML configuration file. Defaults to ./clausefp.yaml when present.
    #[arg(long, global = true, env = "CLAUSEFP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Segment a document into classified clauses.
    Extract {
        /// Document to read; `-` reads stdin.
        file: PathBuf,
    },
    /// Score the contractual risk of one clause.
    Score { text: String },
    /// Find stored clauses similar to a query.
    Search {
        query: String,
        /// Results to return; overrides `tools.search_k`.
        #[arg(short, long)]
        k: Option<usize>,
    },
    /// Insert the bundled sample clauses.
    Seed,
    /// Print clause and document counts.
    Stats,
    /// Run the golden set and exit non-zero when faithfulness misses the threshold.
    Evaluate {
        /// Golden set JSON; overrides `eval.golden_path`.
        #[arg(long)]
        golden: Option<PathBuf>,
        /// Write the bundled sample golden set to the golden path first.
        #[arg(long)]
        write_sample: bool,
        /// Seed the sample clauses before evaluating.
        #[arg(long)]
        seed: bool,
    },
}

fn init_tracing(cfg: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match cfg.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

// Log events only; no `metrics` exporter is installed in the CLI.
fn metrics() -> SharedMetrics {
    Arc::new(TracingMetrics)
}

fn open_store(
    cfg: &AppConfig,
    handle: &StoreHandle,
    metrics: &SharedMetrics,
) -> Result<Arc<SimilarityStore>> {
    let provider = build_instrumented_provider(&cfg.semantic, Arc::clone(metrics))
        .context("failed to build embedding provider")?;
    let store = SimilarityStore::open(handle, cfg.index.clone(), provider, Arc::clone(metrics))
        .context("failed to open clause index")?;
    Ok(Arc::new(store))
}

fn read_document(file: &Path) -> Result<String> {
    if file.as_os_str() == "-" {
        return std::io::read_to_string(std::io::stdin()).context("failed to read stdin");
    }
    std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let cfg = AppConfig::load(cli.config.as_deref()).context("invalid configuration")?;
    init_tracing(&cfg);
    let metrics = metrics();

    match cli.command {
        Command::Extract { file } => {
            let document = read_document(&file)?;
            println!("{}", extract_clauses(&document, metrics.as_ref()).to_json()?);
        }
        Command::Score { text } => {
            println!("{}", score_risk(&text, metrics.as_ref()).to_json()?);
        }
        Command::Search { query, k } => {
            let handle = StoreHandle::open(&cfg.store)?;
            let store = open_store(&cfg, &handle, &metrics)?;
            let tools_cfg = ToolsConfig {
                search_k: k.unwrap_or(cfg.tools.search_k),
            };
            tools_cfg.validate().map_err(anyhow::Error::msg)?;
            let tools = LegalTools::new(store, metrics, tools_cfg);
            println!("{}", tools.search_legal_db(&query).await?.to_json()?);
            handle.close()?;
        }
        Command::Seed => {
            let handle = StoreHandle::open(&cfg.store)?;
            let store = open_store(&cfg, &handle, &metrics)?;
            let ids = seed_sample_data(&store).await?;
            println!("Seeded {} sample clauses", ids.len());
            handle.close()?;
        }
        Command::Stats => {
            let handle = StoreHandle::open(&cfg.store)?;
            let store = open_store(&cfg, &handle, &metrics)?;
            println!("{}", serde_json::to_string_pretty(&store.stats()?)?);
            handle.close()?;
        }
        Command::Evaluate {
            golden,
            write_sample,
            seed,
        } => {
            let path = golden.unwrap_or_else(|| PathBuf::from(&cfg.eval.golden_path));
            if write_sample {
                write_golden_set(&path, &sample_golden_set())?;
            }
            let items = load_golden_set(&path)?;

            let handle = StoreHandle::open(&cfg.store)?;
            let store = open_store(&cfg, &handle, &metrics)?;
            if seed {
                seed_sample_data(&store).await?;
            }
            let answerer = RetrievalAnswerer::new(store, cfg.eval.answer_k);
            let judge = InstrumentedJudge::new(Arc::new(OverlapJudge), Arc::clone(&metrics));

            let result = evaluate(&items, &answerer, &judge).await?;
            let report = EvaluationReport::new(result, cfg.eval.threshold);
            println!("{report}");
            tracing::info!(
                passed = report.passed,
                faithfulness = result.faithfulness,
                threshold = cfg.eval.threshold,
                "evaluation gate"
            );
            handle.close()?;
            if !report.passed {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
