//! Per-directory failure reports.
//!
//! Each directory of the mirrored tree gets its own append-only log the first
//! time an item in it fails, so whoever picks up the download can see what is
//! missing without digging through the process logs.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Name of the failure log written inside a directory.
pub const ERROR_REPORT_FILENAME: &str = "google_drive_download_error_report.log";

/// Append a failure line for an item to `directory`'s report.
///
/// Never fails: if the report cannot be written, a warning is logged instead.
pub fn report(directory: &Path, item_id: &str, item_name: &str, message: &str) {
    let path = directory.join(ERROR_REPORT_FILENAME);
    let line = format!("Failed to download ({}) \"{}\": {}\n", item_id, item_name, message);

    let result = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .and_then(|mut file| file.write_all(line.as_bytes()));

    if let Err(e) = result {
        tracing::warn!("Could not write error report {:?}: {}", path, e);
    }
}

/// Delete `path` if it is an empty file. Returns whether it was removed.
pub fn remove_empty_artifact(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() == 0 => match fs::remove_file(path) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Could not remove empty file {:?}: {}", path, e);
                false
            }
        },
        _ => false,
    }
}
