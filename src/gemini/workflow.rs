//! The content-to-video workflow: prompt synthesis, job submission, polling
//! and result extraction.

use std::time::Duration;

use super::client::ProviderError;
use super::prompt::build_instruction;
use super::provider::{JobHandle, VideoProvider};
use super::retry::calculate_backoff;
use crate::types::{GenerationRequest, VideoLength};

/// Default delay between job status checks (10 seconds).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default cap on status checks: one hour at the default interval.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 360;

/// Default cap for the backoff delay when backoff is enabled.
pub const DEFAULT_POLL_BACKOFF_MAX: Duration = Duration::from_secs(60);

/// Number of videos requested per job.
const VIDEOS_PER_JOB: u32 = 1;

/// How the workflow waits for a submitted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay before each status check (the backoff base when `backoff` is set).
    pub interval: Duration,
    /// Give up after this many status checks; `None` polls until done.
    pub max_attempts: Option<u32>,
    /// Grow the delay exponentially instead of keeping it fixed.
    pub backoff: bool,
    pub backoff_max: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: Some(DEFAULT_MAX_POLL_ATTEMPTS),
            backoff: false,
            backoff_max: DEFAULT_POLL_BACKOFF_MAX,
        }
    }
}

impl PollPolicy {
    /// Fixed interval, no attempt limit.
    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
            backoff: false,
            backoff_max: DEFAULT_POLL_BACKOFF_MAX,
        }
    }

    /// Delay before the status check numbered `attempt` (zero-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        if self.backoff {
            calculate_backoff(attempt, self.interval, self.backoff_max.max(self.interval))
        } else {
            self.interval
        }
    }
}

/// Errors surfaced by the generation workflow.
///
/// Every variant renders as a complete, human-readable sentence.
/// [`GenerationError::user_message`] is what the state machine shows.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("There is no content to generate a video from.")]
    EmptyContent,

    #[error("Failed to generate a video prompt from the content.")]
    PromptGenerationFailed,

    #[error("Video generation operation failed: {0}")]
    GenerationJobFailed(String),

    #[error("Video generation completed, but no download link was found.")]
    NoVideoProduced,

    #[error("Video generation did not finish after {attempts} status checks.")]
    Timeout { attempts: u32 },

    #[error("{0}")]
    Transport(#[from] ProviderError),
}

impl GenerationError {
    /// The message shown for a failed attempt, service prefix included.
    pub fn user_message(&self) -> String {
        format!("Gemini API Error: {}", self)
    }
}

/// Append the access key the provider requires for direct downloads.
pub fn authorize_video_url(uri: &str, key: &str) -> String {
    format!("{}&key={}", uri, key)
}

/// Turns content into a playable video URL using a [`VideoProvider`].
pub struct VideoGenerator<P> {
    provider: P,
    policy: PollPolicy,
}

impl<P: VideoProvider> VideoGenerator<P> {
    pub fn new(provider: P) -> Self {
        Self::with_policy(provider, PollPolicy::default())
    }

    pub fn with_policy(provider: P, policy: PollPolicy) -> Self {
        Self { provider, policy }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Generate a video for `request` and return its authorized URL.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.generate_from_content(&request.content, request.length)
            .await
    }

    /// Run the whole workflow for raw content.
    ///
    /// # Errors
    ///
    /// - `EmptyContent` if `content` is blank
    /// - `PromptGenerationFailed` if the text model returns no prompt; the
    ///   video job is then never submitted
    /// - `GenerationJobFailed` if the finished job reports an error
    /// - `NoVideoProduced` if the finished job has no video
    /// - `Timeout` if the poll policy's attempt limit is reached
    /// - `Transport` for any API or network failure
    pub async fn generate_from_content(
        &self,
        content: &str,
        length: VideoLength,
    ) -> Result<String, GenerationError> {
        if content.trim().is_empty() {
            return Err(GenerationError::EmptyContent);
        }

        log::info!("Step 1: Generating video script and prompt...");
        let instruction = build_instruction(content, length);
        let prompt = self
            .provider
            .synthesize_prompt(&instruction)
            .await?
            .filter(|p| !p.trim().is_empty())
            .ok_or(GenerationError::PromptGenerationFailed)?;
        log::info!("Generated video prompt: {}", prompt);

        log::info!("Step 2: Starting video generation...");
        let job = self
            .provider
            .submit_video_job(&prompt, VIDEOS_PER_JOB)
            .await?;
        log::info!("Video job submitted: {}", job.name);

        log::info!("Step 3: Polling for video generation result...");
        let job = self.wait_for(job).await?;

        let uri = extract_video(&job)?;
        log::info!("Video generation successful. Download link: {}", uri);

        Ok(authorize_video_url(uri, self.provider.access_key()))
    }

    /// Poll `job` until it reports done, following the poll policy.
    async fn wait_for(&self, mut job: JobHandle) -> Result<JobHandle, GenerationError> {
        let mut attempts = 0u32;
        while !job.done {
            if let Some(max) = self.policy.max_attempts {
                if attempts >= max {
                    log::error!("Video job {} still running after {} checks", job.name, attempts);
                    return Err(GenerationError::Timeout { attempts });
                }
            }

            tokio::time::sleep(self.policy.delay(attempts)).await;
            attempts += 1;
            log::debug!("Checking operation status (check {})...", attempts);
            job = self.provider.poll_job(&job).await?;
        }
        Ok(job)
    }
}

/// Check a finished job for an error and return its first video URI.
fn extract_video(job: &JobHandle) -> Result<&str, GenerationError> {
    if let Some(error) = &job.error {
        log::error!("Video generation operation failed: {}", error.message);
        return Err(GenerationError::GenerationJobFailed(error.message.clone()));
    }
    job.first_video().ok_or(GenerationError::NoVideoProduced)
}
