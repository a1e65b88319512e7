//! Google Drive folder backend.
//!
//! Assets land in a per-document folder under a fixed parent folder, and
//! the rewritten links use the `lh3.googleusercontent.com/d/<id>` direct
//! form, which serves file content without a Drive UI redirect.
//!
//! Drive reports a `sha256Checksum` for every stored file, so this backend
//! implements content-hash dedupe: before uploading, the staged file's
//! SHA-256 is compared against every file already in the folder, and a hit
//! reuses the existing file's URL.

use crate::backend::{UploadContext, Uploader};
use crate::error::DocError;
use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{debug, info};

const FILES_ENDPOINT: &str = "https://www.googleapis.com/drive/v3/files";
const UPLOAD_ENDPOINT: &str = "https://www.googleapis.com/upload/drive/v3/files";
const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
const DIRECT_URL_BASE: &str = "https://lh3.googleusercontent.com/d/";

/// Uploads staged assets into a named folder under `parent_id`.
pub struct DriveFolderUploader {
    client: reqwest::Client,
    token: String,
    /// Folder all per-document folders are created under.
    parent_id: String,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
    #[serde(default)]
    files: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "sha256Checksum", default)]
    sha256_checksum: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

impl DriveFolderUploader {
    pub fn new(client: reqwest::Client, token: String, parent_id: String) -> Self {
        Self {
            client,
            token,
            parent_id,
        }
    }

    /// Page through a files.list query, collecting every entry.
    async fn list_all(&self, query: &str, fields: &str) -> Result<Vec<FileEntry>, DocError> {
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(FILES_ENDPOINT)
                .bearer_auth(&self.token)
                .query(&[
                    ("q", query),
                    ("spaces", "drive"),
                    ("fields", fields),
                ]);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await.map_err(|e| DocError::Backend {
                endpoint: "drive files.list".into(),
                detail: e.to_string(),
            })?;
            if !response.status().is_success() {
                return Err(DocError::Backend {
                    endpoint: "drive files.list".into(),
                    detail: format!("HTTP {}", response.status()),
                });
            }

            let page: FileList = response.json().await.map_err(|e| DocError::UnexpectedResponse {
                endpoint: "drive files.list".into(),
                detail: e.to_string(),
            })?;

            entries.extend(page.files);
            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        Ok(entries)
    }
}

#[async_trait]
impl Uploader for DriveFolderUploader {
    async fn resolve_container(&self, name: &str) -> Result<UploadContext, DocError> {
        let query = format!(
            "mimeType = '{FOLDER_MIME}' and '{}' in parents and trashed = false",
            self.parent_id
        );
        let folders = self
            .list_all(&query, "nextPageToken, files(id, name)")
            .await?;

        if let Some(existing) = folders.into_iter().find(|f| f.name.as_deref() == Some(name)) {
            info!("Folder '{name}' already exists with ID {}", existing.id);
            return Ok(UploadContext {
                name: name.to_string(),
                id: existing.id,
            });
        }

        let body = serde_json::json!({
            "name": name,
            "mimeType": FOLDER_MIME,
            "parents": [self.parent_id],
        });
        let response = self
            .client
            .post(FILES_ENDPOINT)
            .bearer_auth(&self.token)
            .query(&[("fields", "id")])
            .json(&body)
            .send()
            .await
            .map_err(|e| DocError::Backend {
                endpoint: "drive files.create (folder)".into(),
                detail: e.to_string(),
            })?;
        if !response.status().is_success() {
            return Err(DocError::Backend {
                endpoint: "drive files.create (folder)".into(),
                detail: format!("HTTP {}", response.status()),
            });
        }
        let created: CreatedFile = response.json().await.map_err(|e| DocError::UnexpectedResponse {
            endpoint: "drive files.create (folder)".into(),
            detail: e.to_string(),
        })?;

        info!("Folder '{name}' created with ID {}", created.id);
        Ok(UploadContext {
            name: name.to_string(),
            id: created.id,
        })
    }

    async fn find_existing(
        &self,
        ctx: &UploadContext,
        local: &Path,
    ) -> Result<Option<String>, DocError> {
        let local_hash = hash_file(local).await?;
        let query = format!("'{}' in parents and trashed = false", ctx.id);
        let files = self
            .list_all(&query, "nextPageToken, files(id, sha256Checksum)")
            .await?;

        for file in files {
            if file.sha256_checksum.as_deref() == Some(local_hash.as_str()) {
                debug!(
                    "'{}' already present in folder '{}' as {}",
                    local.display(),
                    ctx.name,
                    file.id
                );
                return Ok(Some(format!("{DIRECT_URL_BASE}{}", file.id)));
            }
        }
        Ok(None)
    }

    async fn upload(&self, ctx: &UploadContext, local: &Path) -> Result<String, DocError> {
        let bytes = tokio::fs::read(local).await.map_err(|e| DocError::Upload {
            path: local.to_path_buf(),
            detail: format!("read failed: {e}"),
        })?;

        // One files.create carrying metadata and media together, so a
        // failed request leaves nothing behind in Drive. Name and parent
        // ride along in the metadata part.
        let file_name = local
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "asset".to_string());
        let metadata = serde_json::json!({
            "name": file_name,
            "parents": [ctx.id],
        });
        let response = self
            .client
            .post(UPLOAD_ENDPOINT)
            .bearer_auth(&self.token)
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={UPLOAD_BOUNDARY}"),
            )
            .body(multipart_related_body(&metadata, &bytes))
            .send()
            .await
            .map_err(|e| DocError::Upload {
                path: local.to_path_buf(),
                detail: e.to_string(),
            })?;
        if !response.status().is_success() {
            return Err(DocError::Upload {
                path: local.to_path_buf(),
                detail: format!("HTTP {}", response.status()),
            });
        }
        let created: CreatedFile = response.json().await.map_err(|e| DocError::UnexpectedResponse {
            endpoint: "drive files.create (multipart)".into(),
            detail: e.to_string(),
        })?;

        info!("File '{}' created with ID {}", local.display(), created.id);
        Ok(format!("{DIRECT_URL_BASE}{}", created.id))
    }
}

const UPLOAD_BOUNDARY: &str = "mdimg_multipart_boundary";

/// `multipart/related` body for a Drive multipart upload: a JSON metadata
/// part followed by the raw media bytes, framed by [`UPLOAD_BOUNDARY`].
fn multipart_related_body(metadata: &serde_json::Value, media: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(media.len() + 256);
    body.extend_from_slice(
        format!(
            "--{UPLOAD_BOUNDARY}\r\n\
             Content-Type: application/json; charset=UTF-8\r\n\r\n\
             {metadata}\r\n\
             --{UPLOAD_BOUNDARY}\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(media);
    body.extend_from_slice(format!("\r\n--{UPLOAD_BOUNDARY}--\r\n").as_bytes());
    body
}

/// SHA-256 of a staged file, lowercase hex — the form Drive reports in
/// `sha256Checksum`.
async fn hash_file(path: &Path) -> Result<String, DocError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| DocError::Upload {
        path: path.to_path_buf(),
        detail: format!("read failed: {e}"),
    })?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}
