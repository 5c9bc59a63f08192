use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

mod config;
mod decode;
mod error;
mod gate;
mod models;
mod report;
mod routes;
mod scoring;
mod server;
mod sheets;
mod source;
mod state;

use config::Config;
use sheets::SheetsClient;
use source::{CsvRowSource, LEADERBOARD_RANGE, RowSource};

#[derive(Parser)]
#[command(name = "studyjam-leaderboard")]
#[command(about = "Leaderboard API and reports for a Cloud Study Jam sheet", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the leaderboard HTTP API
    Serve,
    /// Print the top participants by score
    Score {
        /// Read a local CSV export instead of the live sheet
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Print group standings
    Groups {
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn load_config() -> anyhow::Result<Config> {
    Config::from_env().context("environment is missing leaderboard configuration")
}

/// Opens the CSV export when given, the live sheet otherwise. Returns the
/// source with a label naming it.
fn open_source(csv: Option<&Path>) -> anyhow::Result<(Box<dyn RowSource>, String)> {
    if let Some(path) = csv {
        return Ok((
            Box::new(CsvRowSource::new(path)),
            path.display().to_string(),
        ));
    }

    let config = load_config()?;
    let client = SheetsClient::new(&config).context("failed to load service account key")?;
    Ok((
        Box::new(client),
        format!("sheet {}", config.spreadsheet_id),
    ))
}

async fn load_rows(csv: Option<&Path>) -> anyhow::Result<(scoring::DecodedRows, String)> {
    let (source, label) = open_source(csv)?;
    let rows = source
        .fetch_rows(LEADERBOARD_RANGE)
        .await
        .with_context(|| format!("failed to read rows from {label}"))?;

    Ok((scoring::decode_rows(&rows), label))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => {
            server::start_server(load_config()?).await?;
        }
        Commands::Score { csv, limit } => {
            let (decoded, label) = load_rows(csv.as_deref()).await?;
            print!("{}", report::score_listing(&label, limit, &decoded));
        }
        Commands::Groups { csv } => {
            let (decoded, label) = load_rows(csv.as_deref()).await?;
            print!("{}", report::group_listing(&label, &decoded));
        }
        Commands::Report { csv, limit, out } => {
            let (decoded, label) = load_rows(csv.as_deref()).await?;
            let generated_on = chrono::Local::now().date_naive();
            let report = report::build_report(&label, limit, generated_on, &decoded);

            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
