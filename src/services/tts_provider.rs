use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

const DEFAULT_MODEL: &str = "eleven_multilingual_v2";
const DEFAULT_API_ENDPOINT: &str = "https://api.elevenlabs.io";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const MAX_RETRIES: usize = 2;
const BASE_BACKOFF_MS: u64 = 200;

/// Default voice per instruction language, English as the fallback.
pub fn default_voice_for_language(language: &str) -> &'static str {
    match language {
        "hi" => "pNInz6obpgDQGcFmaJgB",
        "es" => "ThT5KcBeYPX3keUQqHPh",
        "fr" => "ErXwobaYiN019PkySvjV",
        _ => "21m00Tcm4TlvDq8ikWAM",
    }
}

/// Remote synthesizer seam. The full audio body is collected before
/// returning; the turn pipeline hands it to the caller as one payload.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        language: Option<&str>,
    ) -> Result<Bytes, TtsError>;
}

#[derive(Debug, Error)]
pub enum TtsError {
    #[error("text-to-speech not configured: {0}")]
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
pub struct TtsConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_endpoint: String,
    pub timeout: Duration,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

/// ElevenLabs text-to-speech client returning one mpeg payload per call.
#[derive(Clone)]
pub struct ElevenLabsTts {
    config: TtsConfig,
    client: reqwest::Client,
}

impl ElevenLabsTts {
    pub fn new(config: TtsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { config, client }
    }

    pub fn from_env() -> Self {
        let api_key = env_string("ELEVENLABS_API_KEY");
        let model = env_string("TTS_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_endpoint =
            env_string("ELEVENLABS_API_ENDPOINT").unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string());
        let timeout = Duration::from_millis(env_u64("TTS_TIMEOUT").unwrap_or(DEFAULT_TIMEOUT_MS));

        Self::new(TtsConfig {
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

    fn payload(&self, text: &str, language: Option<&str>) -> serde_json::Value {
        let mut body = serde_json::json!({
            "text": text,
            "model_id": self.config.model,
        });
        if let Some(code) = language {
            body["language_code"] = serde_json::json!(code);
        }
        body
    }

    async fn post_with_retry(
        &self,
        url: &str,
        api_key: &str,
        payload: &serde_json::Value,
    ) -> Result<Bytes, TtsError> {
        let mut last_error: Option<TtsError> = None;

        for retry in 0..=MAX_RETRIES {
            let result = self
                .client
                .post(url)
                .header("xi-api-key", api_key)
                .header("accept", "audio/mpeg")
                .json(payload)
                .send()
                .await;

            match result {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return Ok(resp.bytes().await?);
                    }
                    let body = resp.text().await.unwrap_or_default();
                    let err = TtsError::HttpStatus { status, body };
                    if retry < MAX_RETRIES && is_retryable(status) {
                        let backoff = Duration::from_millis(BASE_BACKOFF_MS * (1 << retry));
                        warn!(retry, ?status, "synthesis request failed, retrying");
                        sleep(backoff).await;
                        last_error = Some(err);
                        continue;
                    }
                    return Err(err);
                }
                Err(e) => {
                    let err = TtsError::Request(e);
                    if retry < MAX_RETRIES {
                        let backoff = Duration::from_millis(BASE_BACKOFF_MS * (1 << retry));
                        warn!(retry, "synthesis request error, retrying");
                        sleep(backoff).await;
                        last_error = Some(err);
                        continue;
                    }
                    return Err(err);
                }
            }
        }
        Err(last_error.unwrap_or(TtsError::NotConfigured("unknown")))
    }
}

#[async_trait]
impl TextToSpeech for ElevenLabsTts {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        language: Option<&str>,
    ) -> Result<Bytes, TtsError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or(TtsError::NotConfigured("ELEVENLABS_API_KEY"))?;

        let url = format!(
            "{}/v1/text-to-speech/{voice_id}",
            self.config.api_endpoint.trim_end_matches('/')
        );
        let payload = self.payload(text, language);
        self.post_with_retry(&url, api_key, &payload).await
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
