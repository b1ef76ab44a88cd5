//! Shared helpers: a fake Drive API served by mockito.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use drive_mirror::models::ServiceAccountCredentials;
use drive_mirror::{Authenticator, DownloadOptions, DriveClient};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{json, Value};

/// Throwaway RSA key; only ever used to sign JWTs for the mock token endpoint.
const TEST_PRIVATE_KEY: &str = include_str!("../fixtures/test_service_account_key.pem");

pub const FOLDER: &str = "application/vnd.google-apps.folder";
pub const GOOGLE_DOC: &str = "application/vnd.google-apps.document";
pub const GOOGLE_FORM: &str = "application/vnd.google-apps.form";

pub async fn mock_token(server: &mut ServerGuard) -> Mock {
    server
        .mock("POST", "/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"test-token","token_type":"Bearer","expires_in":3600}"#)
        .create_async()
        .await
}

pub fn client_for(server: &ServerGuard) -> DriveClient {
    let credentials = ServiceAccountCredentials {
        client_email: "mirror@test-project.iam.gserviceaccount.com".to_string(),
        private_key: TEST_PRIVATE_KEY.to_string(),
        token_uri: Some(format!("{}/token", server.url())),
    };
    DriveClient::with_base_url(Authenticator::new(credentials), server.url())
}

pub fn options_for(destination_root: &Path) -> DownloadOptions {
    DownloadOptions::default()
        .with_destination_root(destination_root)
        .with_retry_delay(Duration::ZERO)
}

pub fn item(id: &str, name: &str, mime_type: &str) -> Value {
    json!({"id": id, "name": name, "mimeType": mime_type})
}

pub async fn mock_metadata(server: &mut ServerGuard, item: &Value) -> Mock {
    let id = item["id"].as_str().unwrap();
    server
        .mock("GET", format!("/files/{}", id).as_str())
        .match_query(Matcher::UrlEncoded(
            "fields".into(),
            "id, name, mimeType, size".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(item.to_string())
        .create_async()
        .await
}

pub async fn mock_children(server: &mut ServerGuard, parent_id: &str, children: &[Value]) -> Mock {
    server
        .mock("GET", "/files")
        .match_query(Matcher::UrlEncoded(
            "q".into(),
            format!("'{}' in parents and trashed = false", parent_id),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "files": children }).to_string())
        .create_async()
        .await
}

pub async fn mock_media(server: &mut ServerGuard, id: &str, body: &[u8]) -> Mock {
    server
        .mock("GET", format!("/files/{}", id).as_str())
        .match_query(Matcher::UrlEncoded("alt".into(), "media".into()))
        .with_status(200)
        .with_body(body)
        .create_async()
        .await
}

pub async fn mock_export(server: &mut ServerGuard, id: &str, mime_type: &str, body: &[u8]) -> Mock {
    server
        .mock("GET", format!("/files/{}/export", id).as_str())
        .match_query(Matcher::UrlEncoded("mimeType".into(), mime_type.into()))
        .with_status(200)
        .with_body(body)
        .create_async()
        .await
}

/// Google-style error payload with one detail entry.
pub fn api_error_body(code: u16, message: &str, reason: &str) -> String {
    json!({
        "error": {
            "code": code,
            "message": message,
            "errors": [{"message": message, "domain": "global", "reason": reason}]
        }
    })
    .to_string()
}

/// The single run directory created under `destination_root`.
pub fn only_run_dir(destination_root: &Path) -> PathBuf {
    let entries: Vec<PathBuf> = std::fs::read_dir(destination_root)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1, "expected one run directory, got {:?}", entries);
    entries.into_iter().next().unwrap()
}

/// File names directly inside `dir`, sorted.
pub fn names_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
