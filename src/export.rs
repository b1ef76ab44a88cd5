//! Export formats for Google editor documents.
//!
//! Google-native files (Docs, Sheets, Slides, ...) have no bytes of their own
//! and must be converted server-side with `files.export`. Types that cannot
//! be exported are skipped without being treated as failures.
//!
//! See <https://developers.google.com/drive/api/v3/mime-types>.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::models::FOLDER_MIME_TYPE;

/// Target format of an export request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportFormat {
    pub mime_type: &'static str,
    pub extension: &'static str,
}

const PDF: ExportFormat = ExportFormat {
    mime_type: "application/pdf",
    extension: "pdf",
};

/// What to do with a Google-native mime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportRule {
    Export(ExportFormat),
    Unsupported,
}

static EXPORT_RULES: LazyLock<HashMap<&'static str, ExportRule>> = LazyLock::new(|| {
    use ExportRule::{Export, Unsupported};

    HashMap::from([
        ("application/vnd.google-apps.document", Export(PDF)),
        ("application/vnd.google-apps.spreadsheet", Export(PDF)),
        ("application/vnd.google-apps.presentation", Export(PDF)),
        (
            "application/vnd.google-apps.drawing",
            Export(ExportFormat {
                mime_type: "image/png",
                extension: "png",
            }),
        ),
        (
            "application/vnd.google-apps.audio",
            Export(ExportFormat {
                mime_type: "audio/webm",
                extension: "webm",
            }),
        ),
        (
            "application/vnd.google-apps.photo",
            Export(ExportFormat {
                mime_type: "image/webp",
                extension: "webp",
            }),
        ),
        (
            "application/vnd.google-apps.video",
            Export(ExportFormat {
                mime_type: "video/webm",
                extension: "webm",
            }),
        ),
        // Third-party shortcut
        ("application/vnd.google-apps.drive-sdk", Unsupported),
        ("application/vnd.google-apps.file", Unsupported),
        (FOLDER_MIME_TYPE, Unsupported),
        ("application/vnd.google-apps.form", Unsupported),
        ("application/vnd.google-apps.fusiontable", Unsupported),
        ("application/vnd.google-apps.map", Unsupported),
        ("application/vnd.google-apps.script", Unsupported),
        ("application/vnd.google-apps.shortcut", Unsupported),
        ("application/vnd.google-apps.site", Unsupported),
        ("application/vnd.google-apps.unknown", Unsupported),
    ])
});

/// Look up the export rule for a mime type.
///
/// `None` means the type is not Google-native and its bytes can be
/// downloaded as they are.
pub fn export_rule(mime_type: &str) -> Option<ExportRule> {
    EXPORT_RULES.get(mime_type).copied()
}
