//! Speech synthesis providers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::{AppConfig, ClipFormat};
use crate::error::{ConversationError, Result};

/// Longest provider error body kept in messages.
const MAX_ERROR_BODY: usize = 512;

/// One synthesis request: a single dialogue line in one voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeechRequest {
    pub text: String,
    pub text_type: &'static str,
    pub voice_id: String,
    pub output_format: ClipFormat,
    pub sample_rate: u32,
}

impl SpeechRequest {
    /// SSML request for `ssml` spoken by `voice_id`.
    pub fn ssml(ssml: String, voice_id: &str, output_format: ClipFormat, sample_rate: u32) -> Self {
        Self { text: ssml, text_type: "ssml", voice_id: voice_id.to_string(), output_format, sample_rate }
    }
}

/// Failure reported by a provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Worth retrying: timeouts, connection failures, throttling, server errors.
    #[error("{0}")]
    Transient(String),

    #[error("{0}")]
    Permanent(String),
}

impl ProviderError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Transient(_))
    }
}

/// Turns text into encoded audio in a given voice.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Synthesize one request, returning the encoded audio bytes.
    ///
    /// An empty body is returned as-is; the caller treats it as a missing audio stream.
    async fn synthesize(&self, request: &SpeechRequest) -> std::result::Result<Vec<u8>, ProviderError>;
}

/// Provider speaking a small JSON-over-HTTP protocol.
///
/// `POST {url}` with a JSON [`SpeechRequest`] body; a 2xx response carries the audio bytes.
pub struct HttpSpeechProvider {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl HttpSpeechProvider {
    /// Create a provider from the application configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ConversationError::InvalidConfig { key: "tts-url", message: format!("failed to build HTTP client: {}", e) })?;

        Ok(Self { client, url: config.tts_url.clone(), api_key: config.tts_api_key.clone() })
    }
}

/// Classify an HTTP status that is not a success.
fn classify_status(status: StatusCode, body: &str) -> ProviderError {
    let body: String = body.chars().take(MAX_ERROR_BODY).collect();
    let message = format!("provider returned {}: {}", status, body.trim());
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        ProviderError::Transient(message)
    } else {
        ProviderError::Permanent(message)
    }
}

#[async_trait]
impl SpeechProvider for HttpSpeechProvider {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn synthesize(&self, request: &SpeechRequest) -> std::result::Result<Vec<u8>, ProviderError> {
        debug!("POST {} voice={} format={}", self.url, request.voice_id, request.output_format);

        let mut builder = self.client.post(&self.url).json(request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                ProviderError::Transient(format!("request failed: {}", e))
            } else {
                ProviderError::Permanent(format!("request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let audio = response.bytes().await.map_err(|e| ProviderError::Transient(format!("failed to read audio stream: {}", e)))?;
        Ok(audio.to_vec())
    }
}
