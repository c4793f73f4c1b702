//! ImageKit client: AI image generation fetch and media-library upload.
//!
//! Generation is a CDN transform — the prompt is percent-encoded into a
//! templated URL path and the rendered image fetched with a bounded
//! timeout. The fetched bytes are then re-uploaded as a base64 data URI
//! so the chat stores a stable hosted URL instead of the transform URL.

use crate::config::ImageKitConfig;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    /// Generation fetch failed or timed out; treated as a soft failure.
    #[error("Image generation service unavailable or timed out. Try again later.")]
    Unavailable(#[source] reqwest::Error),

    #[error("upload failed: {0}")]
    UploadFailed(String),
}

#[derive(Clone)]
pub struct ImageKitClient {
    client: Client,
    config: ImageKitConfig,
}

/// The subset of an upload response this service consumes.
#[derive(Debug, Deserialize)]
pub struct UploadedFile {
    pub url: String,
    #[serde(rename = "fileId")]
    pub file_id: Option<String>,
}

impl ImageKitClient {
    pub fn new(config: ImageKitConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.url_endpoint.is_empty()
            && !self.config.private_key.expose_secret().is_empty()
    }

    /// Build the templated generation URL for a prompt, requesting an
    /// 800x800 transform. `file_stem` keeps repeated prompts distinct.
    pub fn generation_url(&self, prompt: &str, file_stem: i64) -> String {
        format!(
            "{}/ik-genimg-prompt-{}/{}/{}.png?tr=w-800,h-800",
            self.config.url_endpoint,
            urlencoding::encode(prompt),
            self.config.folder,
            file_stem
        )
    }

    /// Fetch the generated image bytes. Errors and timeouts surface as
    /// `ImageError::Unavailable`; there is no retry.
    pub async fn fetch_generated_image(&self, url: &str) -> Result<Vec<u8>, ImageError> {
        let response = self
            .client
            .get(url)
            .timeout(Duration::from_secs(self.config.fetch_timeout_secs))
            .send()
            .await
            .map_err(ImageError::Unavailable)?;

        let response = response
            .error_for_status()
            .map_err(ImageError::Unavailable)?;

        let bytes = response.bytes().await.map_err(ImageError::Unavailable)?;
        Ok(bytes.to_vec())
    }

    /// Upload a data URI to the media library under the configured folder.
    pub async fn upload(&self, data_uri: &str, file_name: &str) -> Result<UploadedFile, ImageError> {
        let form = [
            ("file", data_uri),
            ("fileName", file_name),
            ("folder", self.config.folder.as_str()),
        ];

        let response = self
            .client
            .post(&self.config.upload_url)
            .basic_auth(self.config.private_key.expose_secret(), Some(""))
            .form(&form)
            .send()
            .await
            .map_err(|e| ImageError::UploadFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ImageError::UploadFailed(e.to_string()))?;

        if !status.is_success() {
            tracing::error!(status = %status, "ImageKit upload failed");
            return Err(ImageError::UploadFailed(format!(
                "upload returned {}: {}",
                status, body
            )));
        }

        let uploaded: UploadedFile = serde_json::from_str(&body)
            .map_err(|e| ImageError::UploadFailed(format!("invalid upload response: {}", e)))?;

        tracing::info!(
            url = %uploaded.url,
            file_id = ?uploaded.file_id,
            "Generated image uploaded"
        );
        Ok(uploaded)
    }
}

/// Re-encode raw PNG bytes as a base64 data URI.
pub fn to_data_uri(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", BASE64.encode(bytes))
}
