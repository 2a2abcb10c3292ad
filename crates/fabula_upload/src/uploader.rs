//! Resumable uploads to YouTube.

use crate::UploadConfig;
use fabula_core::{Method, RemoteResponse, VideoMetadata};
use fabula_error::{FabulaResult, IoError, UploadError, UploadErrorKind};
use fabula_retry::{CallExecutor, ReqwestTransport, Transport};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncSeekExt, SeekFrom};
use tracing::{info, instrument};

/// Status the upload service answers while a session is incomplete.
const RESUME_INCOMPLETE: u16 = 308;

/// Where a published video can be found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    /// Platform video id
    pub video_id: String,
    /// Short watch link
    pub link: String,
}

impl UploadReceipt {
    /// Receipt for `video_id`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fabula_upload::UploadReceipt;
    ///
    /// assert_eq!(UploadReceipt::new("abc123").link, "https://youtu.be/abc123");
    /// ```
    pub fn new(video_id: impl Into<String>) -> Self {
        let video_id = video_id.into();
        Self {
            link: format!("https://youtu.be/{}", video_id),
            video_id,
        }
    }
}

#[derive(Deserialize)]
struct StoredToken {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
}

/// Read the access token from a stored credential file.
///
/// Accepts `{"token": ...}` as well as `{"access_token": ...}`.
///
/// # Errors
///
/// `MissingToken` when the file does not exist, `InvalidToken` when it holds
/// no non-empty token.
pub async fn read_token(path: &Path) -> FabulaResult<String> {
    let shown = path.display().to_string();
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(UploadError::new(UploadErrorKind::MissingToken(shown)).into());
        }
        Err(e) => return Err(IoError::new(path, e.to_string()).into()),
    };

    let stored: StoredToken = serde_json::from_str(&raw)
        .map_err(|_| UploadError::new(UploadErrorKind::InvalidToken(shown.clone())))?;
    stored
        .token
        .or(stored.access_token)
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| UploadError::new(UploadErrorKind::InvalidToken(shown)).into())
}

/// Parse the last byte the server holds from a `Range: bytes=0-N` header.
fn last_received(response: &RemoteResponse) -> Option<u64> {
    response
        .header("range")?
        .rsplit('-')
        .next()
        .and_then(|last| last.trim().parse().ok())
}

/// Uploads finished videos through a resumable session.
///
/// The executor's transport must not follow redirects: the service answers
/// `308` to every accepted intermediate chunk.
pub struct YouTubeUploader<T = ReqwestTransport> {
    executor: CallExecutor<T>,
    config: UploadConfig,
}

impl<T> std::fmt::Debug for YouTubeUploader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouTubeUploader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> YouTubeUploader<T> {
    /// Create an uploader.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for an invalid chunk size.
    pub fn new(executor: CallExecutor<T>, config: UploadConfig) -> FabulaResult<Self> {
        config.validate()?;
        Ok(Self { executor, config })
    }

    /// Upload settings.
    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Publish `video` with `metadata`.
    ///
    /// # Errors
    ///
    /// Fails before any network call when the token or the video is missing.
    /// Afterwards fails when the session cannot be opened, a chunk is
    /// rejected, or the final reply has no video id.
    #[instrument(skip(self, metadata), fields(video = %video.display(), title = %metadata.title))]
    pub async fn upload(&self, video: &Path, metadata: &VideoMetadata) -> FabulaResult<UploadReceipt> {
        let token = read_token(self.config.token_path()).await?;

        let total = match tokio::fs::metadata(video).await {
            Ok(meta) if meta.is_file() && meta.len() > 0 => meta.len(),
            _ => {
                return Err(UploadError::new(UploadErrorKind::MissingVideo(
                    video.display().to_string(),
                ))
                .into());
            }
        };

        let session = self.start_session(&token, metadata, total).await?;
        info!(bytes = total, "Upload session opened");

        let mut file = tokio::fs::File::open(video)
            .await
            .map_err(|e| IoError::new(video, e.to_string()))?;
        let mut offset = 0u64;

        loop {
            let remaining = total - offset;
            let len = remaining.min(*self.config.chunk_size() as u64);
            let mut chunk = vec![0u8; len as usize];
            file.seek(SeekFrom::Start(offset))
                .await
                .map_err(|e| IoError::new(video, e.to_string()))?;
            file.read_exact(&mut chunk)
                .await
                .map_err(|e| IoError::new(video, e.to_string()))?;

            let end = offset + len - 1;
            let descriptor = self
                .executor
                .descriptor(session.as_str())
                .method(Method::Put)
                .bearer(&token)
                .header("Content-Range", format!("bytes {}-{}/{}", offset, end, total))
                .binary(chunk, "video/mp4")
                .build()?;

            let response = self
                .executor
                .execute_ok(&descriptor)
                .await
                .map_err(|e| {
                    UploadError::new(UploadErrorKind::Chunk {
                        offset,
                        message: e.to_string(),
                    })
                })?;

            if response.status() == RESUME_INCOMPLETE {
                offset = last_received(&response).map_or(end + 1, |last| last + 1);
                let percent = offset * 100 / total;
                info!(percent, "Uploading... {}%", percent);
                if offset >= total {
                    return Err(UploadError::new(UploadErrorKind::Chunk {
                        offset,
                        message: "service holds every byte but never completed".to_string(),
                    })
                    .into());
                }
                continue;
            }

            let video_id = response
                .json::<serde_json::Value>()
                .ok()
                .and_then(|body| body.get("id").and_then(|id| id.as_str()).map(str::to_string))
                .filter(|id| !id.is_empty())
                .ok_or_else(|| UploadError::new(UploadErrorKind::MissingVideoId))?;

            let receipt = UploadReceipt::new(video_id);
            info!(video_id = %receipt.video_id, link = %receipt.link, "Upload complete");
            return Ok(receipt);
        }
    }

    async fn start_session(
        &self,
        token: &str,
        metadata: &VideoMetadata,
        total: u64,
    ) -> FabulaResult<String> {
        let url = format!(
            "{}?uploadType=resumable&part=snippet,status",
            self.config.endpoint()
        );
        let body = json!({
            "snippet": {
                "title": metadata.title,
                "description": metadata.description,
                "tags": metadata.tags,
                "categoryId": metadata.category_id,
            },
            "status": {
                "privacyStatus": self.config.privacy_status(),
                "selfDeclaredMadeForKids": self.config.made_for_kids(),
            }
        });

        let descriptor = self
            .executor
            .descriptor(url)
            .bearer(token)
            .header("X-Upload-Content-Type", "video/mp4")
            .header("X-Upload-Content-Length", total.to_string())
            .json(body)
            .build()?;

        let response = self
            .executor
            .execute_ok(&descriptor)
            .await
            .map_err(|e| UploadError::new(UploadErrorKind::SessionStart(e.to_string())))?;

        response
            .header("location")
            .map(str::to_string)
            .ok_or_else(|| {
                UploadError::new(UploadErrorKind::SessionStart(
                    "response has no Location header".to_string(),
                ))
                .into()
            })
    }
}
