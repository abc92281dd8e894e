//! Pinata pinning API client.
//!
//! Uploads product images to the content-addressed storage network and
//! returns their content identifiers. Authentication uses the two static
//! API-key headers the pinning endpoint expects.

use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use crate::config::PinningConfig;

/// Pin endpoint for file uploads.
const PIN_ENDPOINT: &str = "https://api.pinata.cloud/pinning/pinFileToIPFS";

/// Errors that can occur when pinning files.
#[derive(Debug, Error)]
pub enum PinningError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The response carried no content identifier.
    #[error("no content identifier in pinning response")]
    MissingCid,

    /// The file was rejected before any network call.
    #[error("rejected file: {0}")]
    Rejected(String),
}

/// Client for the pinning HTTP API.
#[derive(Clone)]
pub struct PinningClient {
    client: reqwest::Client,
    api_key: String,
    secret_api_key: String,
    gateway_url: String,
}

impl PinningClient {
    /// Create a new pinning client.
    #[must_use]
    pub fn new(config: &PinningConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            secret_api_key: config.secret_api_key.expose_secret().to_string(),
            gateway_url: config.gateway_url.trim_end_matches('/').to_string(),
        }
    }

    /// Check that an upload is a non-empty image.
    ///
    /// This runs before any network call: a non-image file never reaches
    /// the pinning service.
    ///
    /// # Errors
    ///
    /// Returns [`PinningError::Rejected`] for empty files or non-image
    /// content types.
    pub fn validate_image(
        file_name: &str,
        content_type: Option<&str>,
        len: usize,
    ) -> Result<(), PinningError> {
        if len == 0 {
            return Err(PinningError::Rejected(format!("'{file_name}' is empty")));
        }
        match content_type {
            Some(content_type) if content_type.starts_with("image/") => Ok(()),
            _ => Err(PinningError::Rejected(format!(
                "'{file_name}' is not an image file"
            ))),
        }
    }

    /// Pin an image, returning its content identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the file fails validation, the upload fails, or
    /// the response carries no content identifier.
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub async fn pin_image(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, PinningError> {
        Self::validate_image(file_name, Some(content_type), bytes.len())?;

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(PIN_ENDPOINT)
            .header("pinata_api_key", &self.api_key)
            .header("pinata_secret_api_key", &self.secret_api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, "pinning upload failed");
            return Err(PinningError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: PinResponse = response.json().await?;
        if body.ipfs_hash.is_empty() {
            return Err(PinningError::MissingCid);
        }
        Ok(body.ipfs_hash)
    }

    /// Gateway URL for rendering a pinned file.
    #[must_use]
    pub fn gateway_url(&self, cid: &str) -> String {
        format!("{}/ipfs/{cid}", self.gateway_url)
    }
}

/// Success response of the pin endpoint.
#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash", default)]
    ipfs_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_image_accepts_images() {
        assert!(PinningClient::validate_image("photo.png", Some("image/png"), 10).is_ok());
        assert!(PinningClient::validate_image("photo.jpg", Some("image/jpeg"), 10).is_ok());
    }

    #[test]
    fn test_validate_image_rejects_non_images() {
        let result = PinningClient::validate_image("notes.pdf", Some("application/pdf"), 10);
        assert!(matches!(result, Err(PinningError::Rejected(_))));
    }

    #[test]
    fn test_validate_image_rejects_missing_content_type() {
        let result = PinningClient::validate_image("mystery", None, 10);
        assert!(matches!(result, Err(PinningError::Rejected(_))));
    }

    #[test]
    fn test_validate_image_rejects_empty_file() {
        let result = PinningClient::validate_image("photo.png", Some("image/png"), 0);
        assert!(matches!(result, Err(PinningError::Rejected(_))));
    }

    #[test]
    fn test_gateway_url_joins_cid() {
        let client = PinningClient {
            client: reqwest::Client::new(),
            api_key: String::new(),
            secret_api_key: String::new(),
            gateway_url: "https://gateway.pinata.cloud".to_string(),
        };
        assert_eq!(
            client.gateway_url("QmHash"),
            "https://gateway.pinata.cloud/ipfs/QmHash"
        );
    }
}
