mod commands;
mod display;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ezid_store::JsonStore;

#[derive(Parser)]
#[command(name = "ezid", version, about = "Register and update DOIs with EZID")]
struct Cli {
    /// JSON data file holding journals, articles, repositories and preprints.
    #[arg(long, global = true, env = "EZID_DATA", default_value = "ezid.json")]
    data: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mint a DOI for a published preprint.
    RegisterEzidDoi {
        /// Repository short name.
        short_name: String,
        preprint_id: u64,
    },
    /// Update DOI metadata for a preprint.
    UpdateEzidDoi {
        /// Repository short name.
        short_name: String,
        /// Preprint id, or the preprint's DOI URL.
        preprint: String,
    },
    /// Register a DOI for a journal article.
    RegisterJournalEzidDoi { article_id: u64 },
    /// Update DOI metadata for a journal article.
    UpdateJournalEzidDoi { article_id: u64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!(data = %cli.data.display(), "ezid v{}", env!("CARGO_PKG_VERSION"));
    let mut store = JsonStore::open(&cli.data)?;

    match cli.command {
        Commands::RegisterEzidDoi {
            short_name,
            preprint_id,
        } => commands::register_preprint(&mut store, &short_name, preprint_id).await,
        Commands::UpdateEzidDoi {
            short_name,
            preprint,
        } => commands::update_preprint(&mut store, &short_name, &preprint).await,
        Commands::RegisterJournalEzidDoi { article_id } => {
            commands::register_article(&store, article_id).await
        }
        Commands::UpdateJournalEzidDoi { article_id } => {
            commands::update_article(&store, article_id).await
        }
    }
}
