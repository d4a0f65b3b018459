//! YouTube upload client.
//!
//! Token handling is refresh-then-reauthorize: a stored refresh token is
//! exchanged for an access token before each upload; if the exchange fails
//! the error asks for re-authorization, which happens outside this pipeline
//! (the interactive consent flow writes the credentials file).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use sclip_models::metadata::ShortMetadata;

use crate::error::{PublishError, PublishResult};
use crate::retry::{retry_async, RetryConfig};

const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const UPLOAD_ENDPOINT: &str =
    "https://www.googleapis.com/upload/youtube/v3/videos?uploadType=resumable&part=snippet,status";
const THUMBNAIL_ENDPOINT: &str = "https://www.googleapis.com/upload/youtube/v3/thumbnails/set";

/// Credentials persisted on disk after the interactive consent flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct UploadBody<'a> {
    snippet: Snippet<'a>,
    status: UploadStatus,
}

#[derive(Debug, Serialize)]
struct Snippet<'a> {
    title: &'a str,
    description: &'a str,
    tags: &'a [String],
    #[serde(rename = "categoryId")]
    category_id: String,
}

#[derive(Debug, Serialize)]
struct UploadStatus {
    #[serde(rename = "privacyStatus")]
    privacy_status: &'static str,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: String,
}

/// YouTube Data API client.
pub struct YouTubeClient {
    http: Client,
    token_path: PathBuf,
}

impl YouTubeClient {
    /// Create a client reading credentials from `token_path`.
    pub fn new(token_path: impl Into<PathBuf>) -> Self {
        Self {
            http: Client::new(),
            token_path: token_path.into(),
        }
    }

    /// Upload a finished clip and return the platform-assigned video id.
    ///
    /// The thumbnail is best-effort: a failure there is logged, not fatal.
    pub async fn upload_video(
        &self,
        video: &Path,
        metadata: &ShortMetadata,
        thumbnail: Option<&Path>,
    ) -> PublishResult<String> {
        let access_token = self.refresh_access_token().await?;

        let config = RetryConfig::new("youtube_upload").with_max_retries(2);
        let video_id = retry_async(&config, || {
            self.do_upload(video, metadata, &access_token)
        })
        .await
        .into_result()?;

        info!(video_id = %video_id, "Uploaded to YouTube");

        if let Some(thumb) = thumbnail {
            if let Err(e) = self.set_thumbnail(&video_id, thumb, &access_token).await {
                warn!(video_id = %video_id, error = %e, "Thumbnail upload failed");
            }
        }

        Ok(video_id)
    }

    /// Exchange the stored refresh token for a fresh access token.
    async fn refresh_access_token(&self) -> PublishResult<String> {
        let mut creds = self.load_credentials().await?;

        let params = [
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("refresh_token", creds.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self.http.post(TOKEN_ENDPOINT).form(&params).send().await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::TokenRefreshFailed(body));
        }

        let token: TokenResponse = response.json().await?;

        // Persist the fresh access token beside the refresh token
        creds.access_token = Some(token.access_token.clone());
        let json = serde_json::to_string_pretty(&creds)?;
        tokio::fs::write(&self.token_path, json).await?;

        Ok(token.access_token)
    }

    async fn load_credentials(&self) -> PublishResult<StoredCredentials> {
        if !self.token_path.exists() {
            return Err(PublishError::MissingCredentials(format!(
                "token file not found at {}; run the authorization flow first",
                self.token_path.display()
            )));
        }
        let content = tokio::fs::read_to_string(&self.token_path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Resumable upload: open a session, then send the file body.
    async fn do_upload(
        &self,
        video: &Path,
        metadata: &ShortMetadata,
        access_token: &str,
    ) -> PublishResult<String> {
        let body = UploadBody {
            snippet: Snippet {
                title: &metadata.title,
                description: &metadata.description,
                tags: &metadata.tags,
                category_id: metadata.category.to_string(),
            },
            status: UploadStatus {
                privacy_status: "public",
            },
        };

        let session = self
            .http
            .post(UPLOAD_ENDPOINT)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await?;

        if !session.status().is_success() {
            let status = session.status().as_u16();
            let body = session.text().await.unwrap_or_default();
            return Err(PublishError::ApiError { status, body });
        }

        let upload_url = session
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| PublishError::upload_failed("No resumable session URL returned"))?
            .to_string();

        let bytes = tokio::fs::read(video).await?;
        let response = self
            .http
            .put(&upload_url)
            .bearer_auth(access_token)
            .header("content-type", "video/mp4")
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::ApiError { status, body });
        }

        let uploaded: UploadResponse = response.json().await?;
        Ok(uploaded.id)
    }

    async fn set_thumbnail(
        &self,
        video_id: &str,
        thumbnail: &Path,
        access_token: &str,
    ) -> PublishResult<()> {
        let bytes = tokio::fs::read(thumbnail).await?;

        let response = self
            .http
            .post(format!("{THUMBNAIL_ENDPOINT}?videoId={video_id}"))
            .bearer_auth(access_token)
            .header("content-type", "image/jpeg")
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::ApiError { status, body });
        }

        Ok(())
    }
}

/// Load the set of already-uploaded clip keys from `uploaded.json`.
pub async fn load_upload_record(path: &Path) -> PublishResult<BTreeSet<String>> {
    if !path.exists() {
        return Ok(BTreeSet::new());
    }
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Persist the set of uploaded clip keys.
pub async fn save_upload_record(path: &Path, record: &BTreeSet<String>) -> PublishResult<()> {
    let json = serde_json::to_string_pretty(record)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}
