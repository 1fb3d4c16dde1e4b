//! Gemini / Veo integration.
//!
//! A text model turns the user's content into a single video prompt, a video
//! model renders it as a long-running job, and the job is polled until it
//! yields a downloadable video.

mod client;
#[cfg(test)]
pub(crate) mod fake;
mod prompt;
mod provider;
mod retry;
mod workflow;

pub use client::{
    GeminiClient, ProviderError, API_KEY_ENV, DEFAULT_TEXT_MODEL, DEFAULT_VIDEO_MODEL,
    GEMINI_API_BASE_URL,
};
pub use prompt::build_instruction;
pub use provider::{JobError, JobHandle, VideoProvider};
pub use retry::{calculate_backoff, CallKind, RetryConfig};
pub use workflow::{
    authorize_video_url, GenerationError, PollPolicy, VideoGenerator, DEFAULT_MAX_POLL_ATTEMPTS,
    DEFAULT_POLL_INTERVAL,
};
