//! drive_mirror CLI - Download a file or folder shared with a service account.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use drive_mirror::config::DESTINATION_ROOT;
use drive_mirror::{logging, Authenticator, DownloadOptions, DriveClient};

/// Download a Google Drive file or folder shared with a service account.
#[derive(Parser)]
#[command(name = "drive_mirror")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Google Drive URL (or ID) of the shared file or folder.
    url: String,

    /// Path to the service account JSON key. Overrides --credentials-dir.
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    credentials: Option<PathBuf>,

    /// Directory holding the service account JSON key.
    #[arg(long, default_value = "credential")]
    credentials_dir: PathBuf,

    /// Directory in which a fresh run directory is created.
    #[arg(long, short = 'd', default_value = DESTINATION_ROOT)]
    destination: PathBuf,

    /// Log chunk progress and other debug details.
    #[arg(long, short)]
    verbose: bool,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = logging::init(cli.verbose, cli.log_file.as_deref())
        .with_context(|| format!("Failed to open log file {:?}", cli.log_file))?;

    let options = DownloadOptions::default().with_destination_root(&cli.destination);

    tracing::info!("Authenticating GCP Service-Account...");
    let auth = match &cli.credentials {
        Some(path) => Authenticator::from_file(path),
        None => Authenticator::discover(&cli.credentials_dir),
    };
    let client = match auth {
        Ok(auth) => {
            tracing::info!("Authenticating GCP Service-Account...Done ({})", auth.client_email());
            Some(DriveClient::new(auth))
        }
        Err(e) => {
            tracing::error!("Missing or unreadable credentials: {}", e);
            None
        }
    };

    tokio::select! {
        result = drive_mirror::run(&cli.url, client.as_ref(), &options) => {
            let report = result.with_context(|| format!("Failed to download {}", cli.url))?;
            println!("Saved to: {:?}", report.run_dir);
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("User interrupted via keyboard.");
            std::process::exit(130);
        }
    }

    Ok(())
}
