//! Google Photos album backend.
//!
//! The legacy destination: assets are added to a per-document album and
//! links rewritten to the media item's `baseUrl` with a sizing suffix.
//! Photos exposes no content checksum, so this backend has no dedupe and
//! keeps the trait's default `find_existing`.
//!
//! Upload is the three-call protocol the Photos Library API requires:
//! raw bytes to the uploads endpoint (yielding an upload token), then
//! `mediaItems:batchCreate` to attach the token to the album, then a
//! `mediaItems.get` to read the item's `baseUrl`.
//!
//! Caveat inherited from the API: `baseUrl` values expire after roughly 60
//! minutes for *private* items. The rewritten links stay valid only for
//! media in properly shared albums; prefer the Drive backend for durable
//! links.

use crate::backend::{UploadContext, Uploader};
use crate::error::DocError;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

const ALBUMS_ENDPOINT: &str = "https://photoslibrary.googleapis.com/v1/albums";
const UPLOADS_ENDPOINT: &str = "https://photoslibrary.googleapis.com/v1/uploads";
const BATCH_CREATE_ENDPOINT: &str = "https://photoslibrary.googleapis.com/v1/mediaItems:batchCreate";
const MEDIA_ITEMS_ENDPOINT: &str = "https://photoslibrary.googleapis.com/v1/mediaItems";

/// Rendering parameters appended to `baseUrl`; without them Photos serves
/// a tiny thumbnail.
const BASE_URL_SUFFIX: &str = "=w2048-h1024";

/// Uploads staged assets into a named Photos album.
pub struct PhotosAlbumUploader {
    client: reqwest::Client,
    token: String,
}

#[derive(Debug, Deserialize)]
struct AlbumList {
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
    #[serde(default)]
    albums: Vec<Album>,
}

#[derive(Debug, Deserialize)]
struct Album {
    id: String,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BatchCreateResponse {
    #[serde(rename = "newMediaItemResults", default)]
    results: Vec<NewMediaItemResult>,
}

#[derive(Debug, Deserialize)]
struct NewMediaItemResult {
    #[serde(rename = "mediaItem")]
    media_item: Option<MediaItem>,
}

#[derive(Debug, Deserialize)]
struct MediaItem {
    id: String,
    #[serde(rename = "baseUrl", default)]
    base_url: Option<String>,
}

impl PhotosAlbumUploader {
    pub fn new(client: reqwest::Client, token: String) -> Self {
        Self { client, token }
    }
}

#[async_trait]
impl Uploader for PhotosAlbumUploader {
    async fn resolve_container(&self, name: &str) -> Result<UploadContext, DocError> {
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self.client.get(ALBUMS_ENDPOINT).bearer_auth(&self.token);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }
            let response = request.send().await.map_err(|e| DocError::Backend {
                endpoint: "photos albums.list".into(),
                detail: e.to_string(),
            })?;
            if !response.status().is_success() {
                return Err(DocError::Backend {
                    endpoint: "photos albums.list".into(),
                    detail: format!("HTTP {}", response.status()),
                });
            }
            let page: AlbumList = response.json().await.map_err(|e| DocError::UnexpectedResponse {
                endpoint: "photos albums.list".into(),
                detail: e.to_string(),
            })?;

            if let Some(album) = page.albums.into_iter().find(|a| a.title.as_deref() == Some(name)) {
                info!("Album '{name}' already exists with ID {}", album.id);
                return Ok(UploadContext {
                    name: name.to_string(),
                    id: album.id,
                });
            }

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        let body = serde_json::json!({ "album": { "title": name } });
        let response = self
            .client
            .post(ALBUMS_ENDPOINT)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| DocError::Backend {
                endpoint: "photos albums.create".into(),
                detail: e.to_string(),
            })?;
        if !response.status().is_success() {
            return Err(DocError::Backend {
                endpoint: "photos albums.create".into(),
                detail: format!("HTTP {}", response.status()),
            });
        }
        let album: Album = response.json().await.map_err(|e| DocError::UnexpectedResponse {
            endpoint: "photos albums.create".into(),
            detail: e.to_string(),
        })?;

        info!("Album '{name}' created with ID {}", album.id);
        Ok(UploadContext {
            name: name.to_string(),
            id: album.id,
        })
    }

    async fn upload(&self, ctx: &UploadContext, local: &Path) -> Result<String, DocError> {
        let bytes = tokio::fs::read(local).await.map_err(|e| DocError::Upload {
            path: local.to_path_buf(),
            detail: format!("read failed: {e}"),
        })?;
        let file_name = local
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        // Call 1: raw bytes → upload token.
        let response = self
            .client
            .post(UPLOADS_ENDPOINT)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .header("X-Goog-Upload-File-Name", file_name.clone())
            .header("X-Goog-Upload-Protocol", "raw")
            .body(bytes)
            .send()
            .await
            .map_err(|e| DocError::Upload {
                path: local.to_path_buf(),
                detail: e.to_string(),
            })?;
        if !response.status().is_success() {
            return Err(DocError::Upload {
                path: local.to_path_buf(),
                detail: format!("uploads endpoint: HTTP {}", response.status()),
            });
        }
        let upload_token = response.text().await.map_err(|e| DocError::UnexpectedResponse {
            endpoint: "photos uploads".into(),
            detail: e.to_string(),
        })?;
        if upload_token.is_empty() {
            return Err(DocError::UnexpectedResponse {
                endpoint: "photos uploads".into(),
                detail: "empty upload token".into(),
            });
        }

        // Call 2: attach the token to the album.
        let body = serde_json::json!({
            "albumId": ctx.id,
            "newMediaItems": [{
                "simpleMediaItem": {
                    "fileName": file_name,
                    "uploadToken": upload_token,
                }
            }],
        });
        let response = self
            .client
            .post(BATCH_CREATE_ENDPOINT)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| DocError::Upload {
                path: local.to_path_buf(),
                detail: e.to_string(),
            })?;
        if !response.status().is_success() {
            return Err(DocError::Upload {
                path: local.to_path_buf(),
                detail: format!("batchCreate: HTTP {}", response.status()),
            });
        }
        let batch: BatchCreateResponse =
            response.json().await.map_err(|e| DocError::UnexpectedResponse {
                endpoint: "photos mediaItems:batchCreate".into(),
                detail: e.to_string(),
            })?;
        let item_id = batch
            .results
            .first()
            .and_then(|r| r.media_item.as_ref())
            .map(|m| m.id.clone())
            .ok_or_else(|| DocError::UnexpectedResponse {
                endpoint: "photos mediaItems:batchCreate".into(),
                detail: "response contains no mediaItem.id".into(),
            })?;

        // Call 3: read the item's baseUrl.
        let response = self
            .client
            .get(format!("{MEDIA_ITEMS_ENDPOINT}/{item_id}"))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| DocError::Upload {
                path: local.to_path_buf(),
                detail: e.to_string(),
            })?;
        if !response.status().is_success() {
            return Err(DocError::Upload {
                path: local.to_path_buf(),
                detail: format!("mediaItems.get: HTTP {}", response.status()),
            });
        }
        let item: MediaItem = response.json().await.map_err(|e| DocError::UnexpectedResponse {
            endpoint: "photos mediaItems.get".into(),
            detail: e.to_string(),
        })?;
        let base_url = item.base_url.ok_or_else(|| DocError::UnexpectedResponse {
            endpoint: "photos mediaItems.get".into(),
            detail: "response contains no baseUrl".into(),
        })?;

        info!("Image '{}' uploaded to album '{}'", local.display(), ctx.name);
        Ok(format!("{base_url}{BASE_URL_SUFFIX}"))
    }
}
