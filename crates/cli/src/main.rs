//! editorscout
//!
//! Finds venue action editors whose papers sit near your bibliography in the
//! citation graph:
//! 1. Reads titles from a BibTeX file and resolves them to seed papers
//! 2. Scrapes the editorial board into an editor roster
//! 3. Runs a bounded breadth-first search from the seeds, reporting matches

use clap::Parser;
use editorscout_common::config::ObservabilityConfig;
use editorscout_common::errors::Result;
use editorscout_common::{metrics, GraphClient, ScoutConfig, VERSION};
use editorscout_ingestion::{load_titles, resolve_seeds, RosterBuilder};
use editorscout_search::{CancellationFlag, CitationTraversal, MatchReporter, StopReason};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Search the citation graph around a bibliography for action editors
#[derive(Parser, Debug)]
#[command(name = "editorscout")]
#[command(version)]
#[command(about = "Find action editors who authored papers near your bibliography")]
struct Cli {
    /// BibTeX file whose entries seed the search
    bibfile: PathBuf,

    /// Page listing the action editors
    /// [default: https://jmlr.org/tmlr/editorial-board.html]
    #[arg(long = "editors_url", value_name = "URL")]
    editors_url: Option<String>,

    /// Maximum citation distance from the seeds [default: 2]
    #[arg(long, value_name = "N")]
    depth: Option<usize>,

    /// Configuration file (defaults to config/default and config/local)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn load_config(&self) -> Result<ScoutConfig> {
        let mut config = match &self.config {
            Some(path) => ScoutConfig::from_file(path)?,
            None => ScoutConfig::load()?,
        };

        if let Some(url) = &self.editors_url {
            config.scrape.editors_url = url.clone();
        }
        if let Some(depth) = self.depth {
            config.traversal.max_depth = depth;
        }
        Ok(config)
    }
}

fn init_tracing(config: &ObservabilityConfig, verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    if config.json_logging {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

async fn run(cli: &Cli, config: &ScoutConfig) -> Result<()> {
    info!("Starting editorscout v{}", VERSION);
    metrics::register_metrics();

    let cancel = CancellationFlag::new();
    let listener = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Keyboard interrupt, stopping BFS");
            listener.cancel();
        }
    });

    run_with(cli, config, cancel, &mut MatchReporter::stdout()).await
}

/// Seeds, roster and search, with notices and the summary going to `reporter`
async fn run_with<W: Write>(
    cli: &Cli,
    config: &ScoutConfig,
    cancel: CancellationFlag,
    reporter: &mut MatchReporter<W>,
) -> Result<()> {
    let graph = GraphClient::new(&config.graph)?;

    info!(bibfile = %cli.bibfile.display(), "Parsing bibliography");
    let titles = load_titles(&cli.bibfile)?;
    let seeds = resolve_seeds(&graph, &titles).await?;

    let roster = RosterBuilder::new(&graph, &config.scrape)?
        .build(&config.scrape.editors_url)
        .await?;

    let outcome = CitationTraversal::new(&graph, &roster, config.traversal.max_depth, reporter)
        .with_cancellation(cancel)
        .run(seeds)
        .await?;

    if outcome.stop_reason == StopReason::Interrupted {
        info!(visited = outcome.visited, "Search interrupted, reporting partial results");
    }
    reporter.summary(outcome.visited, &outcome.findings)?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    // Checked before logging or any network activity
    if let Err(e) = config.require_api_key() {
        eprintln!("{}", e);
        return ExitCode::from(e.exit_code());
    }

    init_tracing(&config.observability, cli.verbose);

    match run(&cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, transient = e.is_transient(), "editorscout failed");
            ExitCode::from(e.exit_code())
        }
    }
}
