use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

const DEFAULT_MODEL: &str = "scribe_v1";
const DEFAULT_API_ENDPOINT: &str = "https://api.elevenlabs.io";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const MAX_RETRIES: usize = 2;
const BASE_BACKOFF_MS: u64 = 200;

/// Remote transcriber seam. The turn pipeline only needs text back; any
/// failure is recoverable by the user re-recording.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, SttError>;
}

#[derive(Debug, Error)]
pub enum SttError {
    #[error("speech-to-text not configured: {0}")]
    NotConfigured(&'static str),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Debug, Clone)]
pub struct SttConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_endpoint: String,
    pub timeout: Duration,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

/// ElevenLabs speech-to-text client: one multipart POST per clip, with
/// bounded backoff on transient failures.
#[derive(Clone)]
pub struct ElevenLabsStt {
    config: SttConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl ElevenLabsStt {
    pub fn new(config: SttConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { config, client }
    }

    pub fn from_env() -> Self {
        let api_key = env_string("ELEVENLABS_API_KEY");
        let model = env_string("STT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_endpoint =
            env_string("ELEVENLABS_API_ENDPOINT").unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string());
        let timeout = Duration::from_millis(env_u64("STT_TIMEOUT").unwrap_or(DEFAULT_TIMEOUT_MS));

        Self::new(SttConfig {
            api_key,
            model,
            api_endpoint,
            timeout,
        })
    }

    pub fn is_available(&self) -> bool {
        self.config
            .api_key
            .as_deref()
            .is_some_and(|v| !v.trim().is_empty())
    }

    fn form(&self, audio: &[u8]) -> Result<reqwest::multipart::Form, SttError> {
        let part = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name("clip.webm")
            .mime_str("audio/webm")?;
        Ok(reqwest::multipart::Form::new()
            .text("model_id", self.config.model.clone())
            .part("file", part))
    }

    async fn post_with_retry(
        &self,
        url: &str,
        api_key: &str,
        audio: &[u8],
    ) -> Result<TranscriptionResponse, SttError> {
        let mut last_error: Option<SttError> = None;

        for retry in 0..=MAX_RETRIES {
            let result = self
                .client
                .post(url)
                .header("xi-api-key", api_key)
                .multipart(self.form(audio)?)
                .send()
                .await;

            match result {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return Ok(resp.json::<TranscriptionResponse>().await?);
                    }
                    let body = resp.text().await.unwrap_or_default();
                    let err = SttError::HttpStatus { status, body };
                    if retry < MAX_RETRIES && is_retryable(status) {
                        let backoff = Duration::from_millis(BASE_BACKOFF_MS * (1 << retry));
                        warn!(retry, ?status, "transcription request failed, retrying");
                        sleep(backoff).await;
                        last_error = Some(err);
                        continue;
                    }
                    return Err(err);
                }
                Err(e) => {
                    let err = SttError::Request(e);
                    if retry < MAX_RETRIES {
                        let backoff = Duration::from_millis(BASE_BACKOFF_MS * (1 << retry));
                        warn!(retry, "transcription request error, retrying");
                        sleep(backoff).await;
                        last_error = Some(err);
                        continue;
                    }
                    return Err(err);
                }
            }
        }
        Err(last_error.unwrap_or(SttError::NotConfigured("unknown")))
    }
}

#[async_trait]
impl SpeechToText for ElevenLabsStt {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, SttError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or(SttError::NotConfigured("ELEVENLABS_API_KEY"))?;

        let url = format!(
            "{}/v1/speech-to-text",
            self.config.api_endpoint.trim_end_matches('/')
        );
        let resp = self.post_with_retry(&url, api_key, audio).await?;
        Ok(resp.text)
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_u64(key: &str) -> Option<u64> {
    env_string(key)?.parse().ok()
}

fn is_retryable(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || status == reqwest::StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}
