//! GeminiClient - handles communication with the Gemini API.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use super::provider::{JobError, JobHandle, VideoProvider};
use super::retry::{parse_retry_after, with_retry, CallKind, RetryConfig};
use crate::config::ProviderConfig;

/// The environment variable name for the Gemini API key.
pub const API_KEY_ENV: &str = "API_KEY";

/// Default base URL for the Gemini API.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model for prompt synthesis.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-pro";

/// Default model for video generation.
pub const DEFAULT_VIDEO_MODEL: &str = "veo-2.0-generate-001";

/// Header carrying the API key on every call.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Default timeout for HTTP requests (60 seconds). Text generation on the
/// larger models is slow.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP status code for rate limiting.
const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, `None` when empty.
    fn into_text(self) -> Option<String> {
        let candidate = self.candidates.into_iter().next()?;
        let text: String = candidate
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Request body for `models/{model}:predictLongRunning`.
#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    instances: Vec<Instance<'a>>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct Instance<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
struct PredictParameters {
    #[serde(rename = "sampleCount")]
    sample_count: u32,
}

/// Long-running operation as returned by submission and polling.
#[derive(Debug, Deserialize)]
struct Operation {
    name: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<OperationError>,
    #[serde(default)]
    response: Option<OperationResponse>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    #[serde(default)]
    code: Option<i32>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct OperationResponse {
    #[serde(rename = "generateVideoResponse", default)]
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
struct GenerateVideoResponse {
    #[serde(rename = "generatedSamples", default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    #[serde(default)]
    video: Option<Video>,
}

#[derive(Debug, Deserialize)]
struct Video {
    #[serde(default)]
    uri: Option<String>,
}

impl From<Operation> for JobHandle {
    fn from(op: Operation) -> Self {
        let videos = op
            .response
            .and_then(|r| r.generate_video_response)
            .map(|r| {
                r.generated_samples
                    .into_iter()
                    .filter_map(|s| s.video.and_then(|v| v.uri))
                    .collect()
            })
            .unwrap_or_default();

        JobHandle {
            name: op.name,
            done: op.done,
            error: op.error.map(|e| JobError {
                code: e.code,
                message: e.message,
            }),
            videos,
        }
    }
}

/// Standard Google API error envelope.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// Pull the human-readable message out of an error body, falling back to the raw text.
fn extract_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        _ if body.trim().is_empty() => "Unknown error".to_string(),
        _ => body.trim().to_string(),
    }
}

/// Client for communicating with the Gemini API.
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    text_model: String,
    video_model: String,
    retry: RetryConfig,
    request_timeout: Duration,
    http_client: reqwest::Client,
}

impl GeminiClient {
    /// Create a new GeminiClient by reading the API key from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::MissingApiKey` if `API_KEY` is not set.
    pub fn new() -> Result<Self, ProviderError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| ProviderError::MissingApiKey)?;
        Self::with_api_key(api_key)
    }

    /// Create a new GeminiClient with an explicit API key.
    pub fn with_api_key(api_key: String) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, GEMINI_API_BASE_URL.to_string())
    }

    /// Create a new GeminiClient with a custom base URL.
    ///
    /// Useful for testing against a mock server.
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey);
        }

        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
            retry: RetryConfig::default(),
            request_timeout: DEFAULT_TIMEOUT,
            http_client,
        })
    }

    /// Create a client from the `[provider]` config section and a resolved key.
    pub fn from_config(config: &ProviderConfig, api_key: String) -> Result<Self, ProviderError> {
        let client = Self::with_base_url(api_key, config.base_url.clone())?;
        Ok(client.with_models(config.text_model.clone(), config.video_model.clone()))
    }

    /// Replace the text and video model names.
    pub fn with_models(mut self, text_model: String, video_model: String) -> Self {
        self.text_model = text_model;
        self.video_model = video_model;
        self
    }

    /// Replace the per-call retry limits.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the timeout applied to each API call (not to downloads).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Get the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn text_model(&self) -> &str {
        &self.text_model
    }

    pub fn video_model(&self) -> &str {
        &self.video_model
    }

    /// Run one text-generation call with the configured text model.
    ///
    /// Returns the first candidate's text, or `None` if the model produced
    /// nothing.
    ///
    /// # Errors
    ///
    /// `ProviderError::RateLimit` on HTTP 429, `ProviderError::Api` on other
    /// error statuses, `ProviderError::Http` if the request fails.
    pub async fn generate_text(&self, instruction: &str) -> Result<Option<String>, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.text_model
        );

        let request_body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: instruction }],
            }],
        };

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(self.request_timeout)
            .json(&request_body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let body: GenerateContentResponse = response.json().await?;
        Ok(body.into_text())
    }

    /// Start a long-running video generation with the configured video model.
    pub async fn start_video_job(&self, prompt: &str, count: u32) -> Result<JobHandle, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{}:predictLongRunning",
            self.base_url, self.video_model
        );

        let request_body = PredictRequest {
            instances: vec![Instance { prompt }],
            parameters: PredictParameters {
                sample_count: count,
            },
        };

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(self.request_timeout)
            .json(&request_body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let operation: Operation = response.json().await?;
        Ok(operation.into())
    }

    /// Fetch a long-running operation by name.
    pub async fn get_operation(&self, name: &str) -> Result<JobHandle, ProviderError> {
        let url = format!("{}/v1beta/{}", self.base_url, name.trim_start_matches('/'));

        let response = self
            .http_client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(self.request_timeout)
            .send()
            .await?;
        let response = check_status(response).await?;

        let operation: Operation = response.json().await?;
        Ok(operation.into())
    }

    /// Download a video file from a URL to disk.
    ///
    /// Streams the body into `<dest>.part` and renames it to `dest` once the
    /// whole body arrived, so an interrupted download never leaves a file at
    /// `dest`. The URL must already carry the access key.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Http` if the download request fails,
    /// `ProviderError::Io` if writing to disk fails, or `ProviderError::Api`
    /// if the server returns an error response.
    pub async fn download_video(&self, url: &str, dest: &Path) -> Result<PathBuf, ProviderError> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let response = self.http_client.get(url).send().await?;
        let response = check_status(response).await?;

        let partial = partial_path(dest);
        if let Err(e) = stream_to_file(response, &partial).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
        tokio::fs::rename(&partial, dest).await?;

        Ok(dest.to_path_buf())
    }
}

/// Sibling path a download is written to before it is complete.
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

async fn stream_to_file(response: reqwest::Response, path: &Path) -> Result<(), ProviderError> {
    use futures_util::StreamExt;

    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result?;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    Ok(())
}

/// Map a non-success response onto a `ProviderError`, passing successes through.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status.as_u16() == HTTP_STATUS_TOO_MANY_REQUESTS {
        let retry_after_secs = parse_retry_after(&response);
        let body = response.text().await.unwrap_or_default();
        log::warn!(
            "Rate limited by Gemini API. Retry-After: {:?} seconds",
            retry_after_secs
        );
        return Err(ProviderError::RateLimit {
            message: extract_error_message(&body),
            retry_after_secs,
        });
    }

    let body = response.text().await.unwrap_or_default();
    if matches!(status.as_u16(), 502..=504) {
        return Err(ProviderError::Unavailable {
            status: status.as_u16(),
            message: extract_error_message(&body),
        });
    }
    Err(ProviderError::Api {
        status: status.as_u16(),
        message: extract_error_message(&body),
    })
}

impl VideoProvider for GeminiClient {
    async fn synthesize_prompt(&self, instruction: &str) -> Result<Option<String>, ProviderError> {
        with_retry("generateContent", self.retry, CallKind::Idempotent, || {
            self.generate_text(instruction)
        })
        .await
    }

    async fn submit_video_job(&self, prompt: &str, count: u32) -> Result<JobHandle, ProviderError> {
        with_retry("predictLongRunning", self.retry, CallKind::CreatesJob, || {
            self.start_video_job(prompt, count)
        })
        .await
    }

    async fn poll_job(&self, job: &JobHandle) -> Result<JobHandle, ProviderError> {
        with_retry("operations.get", self.retry, CallKind::Idempotent, || {
            self.get_operation(&job.name)
        })
        .await
    }

    fn access_key(&self) -> &str {
        &self.api_key
    }
}

/// Errors that can occur while talking to the Gemini API.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("API_KEY environment variable not set")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Service unavailable (status {status}): {message}")]
    Unavailable { status: u16, message: String },

    #[error("Rate limited: {message}")]
    RateLimit {
        /// Human-readable rate limit message
        message: String,
        /// Retry-After header value in seconds, if provided
        retry_after_secs: Option<u64>,
    },

    #[error("Network error: {message} (after {attempts} attempts)")]
    NetworkError {
        /// Human-readable network error message
        message: String,
        /// Number of attempts made before giving up
        attempts: u32,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
