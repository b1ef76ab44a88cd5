//! Recursive mirroring of a Drive item into a fresh local directory.

use std::fmt;
use std::path::{Path, PathBuf};

use futures::future::{FutureExt, LocalBoxFuture};
use uuid::Uuid;

use crate::client::DriveClient;
use crate::config::DownloadOptions;
use crate::error::{DriveError, Result};
use crate::models::RemoteItem;
use crate::report;
use crate::transfer::{TransferEngine, TransferOutcome};
use crate::url_parser::extract_id;

/// Counters for one walk.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WalkSummary {
    pub folders: usize,
    pub downloaded: usize,
    pub exported: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl fmt::Display for WalkSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} folder(s), {} downloaded, {} exported, {} skipped, {} failed",
            self.folders, self.downloaded, self.exported, self.skipped, self.failed
        )
    }
}

/// Where a finished run put its files.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_dir: PathBuf,
    pub summary: WalkSummary,
}

/// Depth-first walk over a remote tree.
///
/// Items are handled one at a time. A failed file is recorded in its
/// directory's error report and the walk moves on; a failed folder listing
/// aborts the walk.
pub struct Walker<'a> {
    client: &'a DriveClient,
    engine: TransferEngine<'a>,
    options: &'a DownloadOptions,
    summary: WalkSummary,
}

impl<'a> Walker<'a> {
    pub fn new(client: &'a DriveClient, options: &'a DownloadOptions) -> Self {
        Self {
            client,
            engine: TransferEngine::new(client, options),
            options,
            summary: WalkSummary::default(),
        }
    }

    pub fn into_summary(self) -> WalkSummary {
        self.summary
    }

    /// Mirror `item` (and, for a folder, everything below it) into `destination_dir`.
    pub fn walk_item<'b>(
        &'b mut self,
        item: &'b RemoteItem,
        destination_dir: &'b Path,
    ) -> LocalBoxFuture<'b, Result<()>> {
        async move {
            match self.engine.download_item(item, destination_dir).await {
                TransferOutcome::FolderEntered(path) => {
                    self.summary.folders += 1;
                    self.walk_folder(item, &path).await?;
                }
                TransferOutcome::Skipped => self.summary.skipped += 1,
                TransferOutcome::Downloaded(_) => self.summary.downloaded += 1,
                TransferOutcome::Exported(_) => self.summary.exported += 1,
                TransferOutcome::Failed { message, .. } => {
                    self.summary.failed += 1;
                    report::report(destination_dir, &item.id, &item.name, &message);
                }
            }
            Ok(())
        }
        .boxed_local()
    }

    async fn walk_folder(&mut self, folder: &RemoteItem, path: &Path) -> Result<()> {
        tracing::info!("Stepping into folder: {:?}", path);

        tracing::debug!("Retrieving folder content list ({})...", folder.id);
        let children = self
            .client
            .list_children(&folder.id, self.options.page_size)
            .await?;

        if children.is_empty() {
            tracing::info!("Retrieving folder content list ({})...Empty folder", folder.id);
            return Ok(());
        }

        tracing::debug!(
            "Retrieving folder content list ({})...Done! {} items",
            folder.id,
            children.len()
        );

        for child in &children {
            self.walk_item(child, path).await?;
        }

        Ok(())
    }
}

/// Download the file or folder behind a share URL.
///
/// Everything lands in `<destination_root>/<uuid>/`. Nothing is created on
/// disk unless the item could be resolved first.
pub async fn run(
    url: &str,
    client: Option<&DriveClient>,
    options: &DownloadOptions,
) -> Result<RunReport> {
    let item_id = extract_id(url)?;

    let Some(client) = client else {
        tracing::error!("Failed to authenticate!");
        return Err(DriveError::NotAuthenticated);
    };

    tracing::info!("Trying to access item ({})...", item_id);
    let root = match client.get_item(&item_id).await {
        Ok(item) => item,
        Err(e) if e.status() == Some(404) => {
            tracing::error!(
                "Trying to access item...Failed! ID=\"{}\" was not found. \
                 Make sure it has been shared with the service account.",
                item_id
            );
            return Err(DriveError::NotShared(item_id));
        }
        Err(e) => return Err(e),
    };
    tracing::info!(
        "Trying to access item ({})...Done! It is a {}",
        item_id,
        root.kind()
    );
    tracing::debug!("Trying to access item ({})...Done! {:?}", item_id, root);

    let run_dir = options.destination_root.join(Uuid::new_v4().to_string());
    tokio::fs::create_dir_all(&run_dir).await?;

    tracing::info!("Downloading Google Drive files into {:?}...", run_dir);
    let mut walker = Walker::new(client, options);
    if let Err(e) = walker.walk_item(&root, &run_dir).await {
        tracing::error!(
            "Downloading Google Drive files into {:?}...Failed! {}",
            run_dir,
            e
        );
        return Err(e);
    }

    let summary = walker.into_summary();
    tracing::info!(
        "Downloading Google Drive files into {:?}...Complete! {}",
        run_dir,
        summary
    );

    Ok(RunReport { run_dir, summary })
}
