//! Google Drive API client for read-only traversal and download.

use std::time::Duration;

use reqwest::header::{CONTENT_RANGE, RANGE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use crate::auth::Authenticator;
use crate::error::{DriveError, Result};
use crate::models::{ApiErrorResponse, ItemListResponse, RemoteItem};

/// Base URL for Google Drive API v3.
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Fields requested for every item.
const ITEM_FIELDS: &str = "id, name, mimeType, size";

/// Fields requested for a files.list page.
const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType, size)";

/// Where the bytes of an item come from.
#[derive(Debug, Clone, Copy)]
pub enum MediaSource<'a> {
    /// The stored bytes of a regular file (`alt=media`).
    Content { file_id: &'a str },
    /// A Google-native document converted to `mime_type` (`files.export`).
    Export {
        file_id: &'a str,
        mime_type: &'a str,
    },
}

impl MediaSource<'_> {
    pub fn file_id(&self) -> &str {
        match self {
            MediaSource::Content { file_id } | MediaSource::Export { file_id, .. } => *file_id,
        }
    }
}

/// One ranged piece of an item's bytes.
#[derive(Debug)]
pub struct Chunk {
    pub data: Vec<u8>,
    /// Total size of the item, when the server reported it.
    pub total_size: Option<u64>,
    /// No more bytes follow this chunk.
    pub done: bool,
    /// The server ignored the range and sent the entire body.
    pub whole_body: bool,
}

/// Client for reading items shared with a service account.
pub struct DriveClient {
    auth: Authenticator,
    http: Client,
    base_url: String,
}

impl DriveClient {
    /// Create a client against the public Drive API.
    pub fn new(auth: Authenticator) -> Self {
        Self::with_base_url(auth, DRIVE_API_BASE)
    }

    /// Create a client against another API root (used by tests).
    pub fn with_base_url(auth: Authenticator, base_url: impl Into<String>) -> Self {
        Self {
            auth,
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Get item metadata by ID.
    pub async fn get_item(&self, item_id: &str) -> Result<RemoteItem> {
        let token = self.auth.get_access_token().await?;

        let response = self
            .http
            .get(format!("{}/files/{}", self.base_url, item_id))
            .bearer_auth(&token)
            .query(&[("supportsAllDrives", "true"), ("fields", ITEM_FIELDS)])
            .send()
            .await?;

        let item: RemoteItem = check_response(response).await?.json().await?;
        Ok(item)
    }

    /// List every direct child of a folder, across all drives.
    ///
    /// Pages are followed until the API stops returning a `nextPageToken`.
    pub async fn list_children(&self, parent_id: &str, page_size: u32) -> Result<Vec<RemoteItem>> {
        let query = format!("'{}' in parents and trashed = false", parent_id);
        let page_size = page_size.to_string();
        let mut all_items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let token = self.auth.get_access_token().await?;
            let mut request = self
                .http
                .get(format!("{}/files", self.base_url))
                .bearer_auth(&token)
                .query(&[
                    ("q", query.as_str()),
                    ("pageSize", page_size.as_str()),
                    ("corpora", "allDrives"),
                    ("includeItemsFromAllDrives", "true"),
                    ("supportsAllDrives", "true"),
                    ("fields", LIST_FIELDS),
                ]);

            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request.send().await?;
            let list_response: ItemListResponse = check_response(response).await?.json().await?;
            all_items.extend(list_response.files);

            match list_response.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(all_items)
    }

    fn media_request(&self, source: &MediaSource<'_>) -> RequestBuilder {
        match source {
            MediaSource::Content { file_id } => self
                .http
                .get(format!("{}/files/{}", self.base_url, file_id))
                .query(&[("alt", "media"), ("supportsAllDrives", "true")]),
            MediaSource::Export { file_id, mime_type } => self
                .http
                .get(format!("{}/files/{}/export", self.base_url, file_id))
                .query(&[("mimeType", *mime_type)]),
        }
    }

    /// Fetch bytes `offset..offset + len` of an item with a single request.
    pub async fn fetch_chunk(&self, source: &MediaSource<'_>, offset: u64, len: u64) -> Result<Chunk> {
        let token = self.auth.get_access_token().await?;
        let end = offset + len.max(1) - 1;

        let response = self
            .media_request(source)
            .bearer_auth(&token)
            .header(RANGE, format!("bytes={}-{}", offset, end))
            .send()
            .await?;

        let status = response.status();

        // An empty file has no satisfiable range at all.
        if status == StatusCode::RANGE_NOT_SATISFIABLE && offset == 0 {
            return Ok(Chunk {
                data: Vec::new(),
                total_size: Some(0),
                done: true,
                whole_body: false,
            });
        }

        let response = check_response(response).await?;

        if status == StatusCode::PARTIAL_CONTENT {
            let total_size = response
                .headers()
                .get(CONTENT_RANGE)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_content_range_total);
            let data = response.bytes().await?.to_vec();
            let received = data.len() as u64;
            let done = match total_size {
                Some(total) => offset + received >= total,
                None => received < len,
            };
            return Ok(Chunk {
                data,
                total_size,
                done,
                whole_body: false,
            });
        }

        let data = response.bytes().await?.to_vec();
        Ok(Chunk {
            total_size: Some(data.len() as u64),
            data,
            done: true,
            whole_body: true,
        })
    }

    /// [`fetch_chunk`](Self::fetch_chunk), attempted up to `1 + retries`
    /// times while the failure is retryable.
    pub async fn fetch_chunk_with_retries(
        &self,
        source: &MediaSource<'_>,
        offset: u64,
        len: u64,
        retries: u32,
        delay: Duration,
    ) -> Result<Chunk> {
        let mut attempt = 0;
        loop {
            match self.fetch_chunk(source, offset, len).await {
                Ok(chunk) => return Ok(chunk),
                Err(e) if attempt < retries && e.is_retryable() => {
                    attempt += 1;
                    tracing::warn!(
                        "Chunk at byte {} of ({}) failed: {}. Retry {}/{}",
                        offset,
                        source.file_id(),
                        e,
                        attempt,
                        retries
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Pass successful responses through, turn the rest into `DriveError::ApiError`.
async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    Err(api_error(status, &error_body))
}

fn api_error(status: StatusCode, body: &str) -> DriveError {
    if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(body) {
        return DriveError::ApiError {
            status: status.as_u16(),
            message: api_error.error.best_message(),
            reason: api_error.error.first_reason(),
        };
    }

    let message = if body.trim().is_empty() {
        status.to_string()
    } else {
        body.trim().to_string()
    };
    DriveError::ApiError {
        status: status.as_u16(),
        message,
        reason: None,
    }
}

/// Total length from a `Content-Range: bytes a-b/total` header.
fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit('/').next()?.trim().parse().ok()
}
