//! URL parser for extracting Google Drive IDs from share URLs.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{DriveError, Result};

/// Drive IDs are long runs of word characters and hyphens. Anything shorter
/// than 25 characters is a path segment like `folders` or `view`, not an ID.
static ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\w]{25,}").expect("Invalid ID regex"));

/// Extract a Google Drive ID from a share URL or a raw ID.
///
/// The first run of 25 or more word/hyphen characters is returned, so every
/// URL shape Drive hands out works:
/// - `https://drive.google.com/drive/folders/<ID>?usp=sharing`
/// - `https://drive.google.com/file/d/<ID>/view`
/// - `https://drive.google.com/open?id=<ID>`
/// - `https://docs.google.com/document/d/<ID>/edit`
/// - Raw ID string
///
/// # Examples
///
/// ```
/// use drive_mirror::url_parser::extract_id;
///
/// let id = extract_id("https://drive.google.com/drive/folders/1AbCdEfGhIjKlMnOpQrStUvWxYz012345").unwrap();
/// assert_eq!(id, "1AbCdEfGhIjKlMnOpQrStUvWxYz012345");
///
/// assert!(extract_id("https://drive.google.com/drive/folders/short").is_err());
/// ```
pub fn extract_id(url: &str) -> Result<String> {
    ID_REGEX
        .find(url)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| DriveError::IdExtraction(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "1AbCdEfGhIjKlMnOpQrStUvWxYz012345";

    #[test]
    fn test_extract_folder_url() {
        let url = format!("https://drive.google.com/drive/folders/{}", ID);
        assert_eq!(extract_id(&url).unwrap(), ID);
    }

    #[test]
    fn test_extract_file_url() {
        let url = format!("https://drive.google.com/file/d/{}/view?usp=sharing", ID);
        assert_eq!(extract_id(&url).unwrap(), ID);
    }

    #[test]
    fn test_extract_raw_id() {
        assert_eq!(extract_id(ID).unwrap(), ID);
        assert_eq!(extract_id(&format!("  {}  ", ID)).unwrap(), ID);
    }

    #[test]
    fn test_exactly_25_characters() {
        let id = "a".repeat(25);
        assert_eq!(extract_id(&id).unwrap(), id);
        assert!(extract_id(&"a".repeat(24)).is_err());
    }

    #[test]
    fn test_invalid_url() {
        assert!(extract_id("https://example.com/folder/123").is_err());
        assert!(extract_id("").is_err());
        assert!(extract_id("   ").is_err());
    }
}
