use app_state::FaceSearchSettings;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference service returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("inference request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid inference service URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("selfie rejected: {code}")]
    SelfieRejected { code: String, message: String },
}

/// One media item in a gallery processing batch. The URL is a presigned R2
/// link the GPU service downloads directly.
#[derive(Debug, Serialize)]
pub struct MediaItemPayload {
    pub media_id: Uuid,
    pub r2_url: String,
}

#[derive(Serialize)]
struct ProcessGalleryRequest<'a> {
    event_id: Uuid,
    media_items: &'a [MediaItemPayload],
    secret: &'a str,
}

#[derive(Serialize)]
struct EmbedSelfieRequest<'a> {
    image_base64: &'a str,
    secret: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedSelfieResponse {
    embedding: Option<Vec<f32>>,
    confidence: Option<f32>,
    error: Option<String>,
    message: Option<String>,
}

#[derive(Debug)]
pub struct SelfieEmbedding {
    pub embedding: Vec<f32>,
    pub confidence: f32,
}

/// HTTP client for the external GPU face service.
#[derive(Clone)]
pub struct InferenceClient {
    http_client: Client,
    base_url: Url,
    secret: String,
    dispatch_timeout: Duration,
    embed_timeout: Duration,
}

impl InferenceClient {
    #[must_use]
    pub fn new(
        http_client: Client,
        base_url: Url,
        secret: String,
        face_search: &FaceSearchSettings,
    ) -> Self {
        Self {
            http_client,
            base_url,
            secret,
            dispatch_timeout: Duration::from_secs(face_search.dispatch_timeout_s),
            embed_timeout: Duration::from_secs(face_search.embed_timeout_s),
        }
    }

    /// Hands a batch of one event's media to the GPU service. The service
    /// answers as soon as the batch is accepted; embeddings and job status
    /// land in the database asynchronously under its own credentials.
    pub async fn process_gallery(
        &self,
        event_id: Uuid,
        media_items: &[MediaItemPayload],
    ) -> Result<(), InferenceError> {
        let url = self.base_url.join("process-gallery")?;
        let request = ProcessGalleryRequest {
            event_id,
            media_items,
            secret: &self.secret,
        };
        let response = self
            .http_client
            .post(url)
            .timeout(self.dispatch_timeout)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Status { status, body });
        }
        Ok(())
    }

    /// Embeds a selfie. Detection failures come back as structured error
    /// codes (`no_face_detected`, `invalid_image`, ...), which surface as
    /// `SelfieRejected`.
    pub async fn embed_selfie(&self, image_base64: &str) -> Result<SelfieEmbedding, InferenceError> {
        let url = self.base_url.join("embed-selfie")?;
        let request = EmbedSelfieRequest {
            image_base64,
            secret: &self.secret,
        };
        let response = self
            .http_client
            .post(url)
            .timeout(self.embed_timeout)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Status { status, body });
        }

        let parsed: EmbedSelfieResponse = response.json().await?;
        if let Some(code) = parsed.error {
            let message = parsed.message.unwrap_or_default();
            return Err(InferenceError::SelfieRejected { code, message });
        }
        match (parsed.embedding, parsed.confidence) {
            (Some(embedding), Some(confidence)) => Ok(SelfieEmbedding {
                embedding,
                confidence,
            }),
            _ => Err(InferenceError::SelfieRejected {
                code: "invalid_embedding".to_string(),
                message: "Embedding service returned an incomplete response.".to_string(),
            }),
        }
    }
}
