//! Single-item transfers: folders, direct downloads and exports.

use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

use crate::client::{DriveClient, MediaSource};
use crate::config::DownloadOptions;
use crate::error::{DriveError, Result};
use crate::export::{export_rule, ExportFormat, ExportRule};
use crate::models::{format_size, RemoteItem};
use crate::naming::{resolve_collision, sanitize, staging_path};
use crate::report::remove_empty_artifact;

/// Appended to the message of a 403 so users check sharing settings first.
pub const ACCESS_DENIED_GUIDANCE: &str = " If you think this is a mistake, please check if the file is \
     configured to allow downloads from viewers before reporting.";

/// How an item's content is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPlan {
    Folder,
    Direct,
    Export(ExportFormat),
    Skip,
}

impl TransferPlan {
    pub fn for_item(item: &RemoteItem) -> Self {
        if item.is_folder() {
            return TransferPlan::Folder;
        }
        match item.mime_type.as_deref().and_then(export_rule) {
            None => TransferPlan::Direct,
            Some(ExportRule::Export(format)) => TransferPlan::Export(format),
            Some(ExportRule::Unsupported) => TransferPlan::Skip,
        }
    }
}

/// Result of handling one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The local directory exists; the caller should walk its children.
    FolderEntered(PathBuf),
    /// The item type cannot be downloaded. Not an error.
    Skipped,
    Downloaded(PathBuf),
    Exported(PathBuf),
    Failed { path: PathBuf, message: String },
}

/// Downloads items into local directories.
pub struct TransferEngine<'a> {
    client: &'a DriveClient,
    options: &'a DownloadOptions,
}

impl<'a> TransferEngine<'a> {
    pub fn new(client: &'a DriveClient, options: &'a DownloadOptions) -> Self {
        Self { client, options }
    }

    /// Materialize `item` inside `destination_dir`.
    ///
    /// Failures are returned as [`TransferOutcome::Failed`], never as errors,
    /// so one bad item cannot stop its siblings.
    pub async fn download_item(&self, item: &RemoteItem, destination_dir: &Path) -> TransferOutcome {
        let name = sanitize(&item.name);

        match TransferPlan::for_item(item) {
            TransferPlan::Skip => {
                tracing::debug!(
                    "Skipping ({}) \"{}\": type \"{}\" cannot be downloaded",
                    item.id,
                    item.name,
                    item.mime_type.as_deref().unwrap_or("-")
                );
                TransferOutcome::Skipped
            }
            TransferPlan::Folder => {
                let path = resolve_collision(destination_dir, &name, None);
                match fs::create_dir_all(&path).await {
                    Ok(()) => TransferOutcome::FolderEntered(path),
                    Err(e) => self.failed(item, path, DriveError::from(e)),
                }
            }
            TransferPlan::Direct => {
                let path = resolve_collision(destination_dir, &name, None);
                let source = MediaSource::Content { file_id: &item.id };
                match self.transfer(item, &source, &path).await {
                    Ok(()) => TransferOutcome::Downloaded(path),
                    Err(e) => self.failed(item, path, e),
                }
            }
            TransferPlan::Export(format) => {
                tracing::debug!(
                    "Downloading ({}) \"{}\"...Type=\"{}\" will be exported as \"{}\"",
                    item.id,
                    item.name,
                    item.mime_type.as_deref().unwrap_or("-"),
                    format.mime_type
                );
                let path = resolve_collision(destination_dir, &name, Some(format.extension));
                let source = MediaSource::Export {
                    file_id: &item.id,
                    mime_type: format.mime_type,
                };
                match self.transfer(item, &source, &path).await {
                    Ok(()) => TransferOutcome::Exported(path),
                    Err(e) => self.failed(item, path, e),
                }
            }
        }
    }

    fn failed(&self, item: &RemoteItem, path: PathBuf, err: DriveError) -> TransferOutcome {
        let message = failure_message(&err);
        tracing::error!(
            "Downloading ({}) \"{}\"...Failed. {}",
            item.id,
            item.name,
            message
        );
        TransferOutcome::Failed { path, message }
    }

    /// Download into a staging file next to `path`, then move it in place.
    async fn transfer(&self, item: &RemoteItem, source: &MediaSource<'_>, path: &Path) -> Result<()> {
        tracing::debug!("Downloading ({}) \"{}\"... Path={:?}", item.id, item.name, path);

        let staging = staging_path(path);
        match self.write_chunks(item, source, &staging).await {
            Ok(written) => {
                fs::rename(&staging, path).await?;
                tracing::info!(
                    "Downloading ({}) \"{}\"...Complete! ({})",
                    item.id,
                    item.name,
                    format_size(written)
                );
                Ok(())
            }
            Err(e) => {
                if remove_empty_artifact(&staging) {
                    tracing::debug!(
                        "Downloading ({}) \"{}\"...Failed. The empty file at {:?} was removed.",
                        item.id,
                        item.name,
                        staging
                    );
                } else if staging.exists() {
                    tracing::warn!(
                        "Downloading ({}) \"{}\"...Incomplete data left at {:?}",
                        item.id,
                        item.name,
                        staging
                    );
                }
                Err(e)
            }
        }
    }

    /// Fetch the item range by range into `staging`. Returns the bytes written.
    async fn write_chunks(&self, item: &RemoteItem, source: &MediaSource<'_>, staging: &Path) -> Result<u64> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(staging)
            .await?;
        let mut offset: u64 = 0;

        loop {
            let chunk = self
                .client
                .fetch_chunk_with_retries(
                    source,
                    offset,
                    self.options.chunk_size,
                    self.options.chunk_retries,
                    self.options.retry_delay,
                )
                .await?;

            // The server dropped the range mid-transfer and resent everything.
            if chunk.whole_body && offset > 0 {
                file.rewind().await?;
                file.set_len(0).await?;
                offset = 0;
            }

            file.write_all(&chunk.data).await?;
            offset += chunk.data.len() as u64;

            if let Some(total) = chunk.total_size.filter(|total| *total > 0) {
                tracing::debug!(
                    "Downloading ({}) \"{}\"...{}%.",
                    item.id,
                    item.name,
                    offset.min(total) * 100 / total
                );
            }

            if chunk.done || chunk.data.is_empty() {
                break;
            }
        }

        file.flush().await?;
        Ok(offset)
    }
}

/// Human-readable reason for a failed transfer.
///
/// Uses the API's own message when there is one; a 403 also gets a hint
/// about the file's download settings.
pub fn failure_message(err: &DriveError) -> String {
    let mut message = match err {
        DriveError::ApiError { message, .. } => message.clone(),
        other => other.to_string(),
    };
    if err.status() == Some(403) {
        message.push_str(ACCESS_DENIED_GUIDANCE);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(mime_type: &str) -> RemoteItem {
        RemoteItem {
            id: "id".to_string(),
            name: "name".to_string(),
            mime_type: Some(mime_type.to_string()),
            size: None,
        }
    }

    #[test]
    fn test_plan_for_items() {
        assert_eq!(
            TransferPlan::for_item(&item("application/vnd.google-apps.folder")),
            TransferPlan::Folder
        );
        assert_eq!(TransferPlan::for_item(&item("image/jpeg")), TransferPlan::Direct);
        assert_eq!(
            TransferPlan::for_item(&item("application/vnd.google-apps.form")),
            TransferPlan::Skip
        );
        match TransferPlan::for_item(&item("application/vnd.google-apps.document")) {
            TransferPlan::Export(format) => assert_eq!(format.extension, "pdf"),
            other => panic!("unexpected plan {:?}", other),
        }
    }

    #[test]
    fn test_plan_without_mime_type_is_direct() {
        let mut untyped = item("x");
        untyped.mime_type = None;
        assert_eq!(TransferPlan::for_item(&untyped), TransferPlan::Direct);
    }

    #[test]
    fn test_failure_message_forbidden_has_guidance() {
        let err = DriveError::ApiError {
            status: 403,
            message: "The download quota for this file has been exceeded.".to_string(),
            reason: Some("downloadQuotaExceeded".to_string()),
        };
        let message = failure_message(&err);
        assert!(message.starts_with("The download quota for this file has been exceeded."));
        assert!(message.ends_with(ACCESS_DENIED_GUIDANCE));
    }

    #[test]
    fn test_failure_message_other_errors() {
        let err = DriveError::ApiError {
            status: 500,
            message: "Backend Error".to_string(),
            reason: None,
        };
        assert_eq!(failure_message(&err), "Backend Error");

        let io = DriveError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        assert_eq!(failure_message(&io), "I/O error: disk full");
    }
}
