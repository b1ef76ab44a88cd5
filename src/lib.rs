//! drive_mirror - Download files and folders shared with a Google service account.
//!
//! This library provides functionality to:
//! - Extract a Drive ID from any share URL
//! - Mirror a shared folder tree to the local filesystem
//! - Export Google Docs, Sheets, Slides and Drawings to PDF/PNG
//! - Record failed items in a per-folder error report and keep going
//!
//! # Example
//!
//! ```no_run
//! use drive_mirror::{Authenticator, DownloadOptions, DriveClient};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let auth = Authenticator::discover("credential")?;
//!     let client = DriveClient::new(auth);
//!     let options = DownloadOptions::default();
//!
//!     let report = drive_mirror::run(
//!         "https://drive.google.com/drive/folders/1AbCdEfGhIjKlMnOpQrStUvWxYz012345",
//!         Some(&client),
//!         &options,
//!     )
//!     .await?;
//!     println!("{} -> {:?}", report.summary, report.run_dir);
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod naming;
pub mod report;
pub mod transfer;
pub mod url_parser;
pub mod walker;

// Re-exports for convenience
pub use auth::Authenticator;
pub use client::DriveClient;
pub use config::DownloadOptions;
pub use error::{DriveError, Result};
pub use models::RemoteItem;
pub use transfer::{TransferEngine, TransferOutcome};
pub use url_parser::extract_id;
pub use walker::{run, RunReport, WalkSummary, Walker};
