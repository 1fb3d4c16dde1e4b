//! The seam between the generation workflow and a concrete AI provider.

use std::future::Future;

use super::client::ProviderError;

/// Error reported by a finished video job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobError {
    pub code: Option<i32>,
    pub message: String,
}

/// Handle to a remote video-generation job.
///
/// `name` is opaque to the workflow; it is only handed back to
/// [`VideoProvider::poll_job`]. `error` and `videos` are meaningful once
/// `done` is true.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobHandle {
    pub name: String,
    pub done: bool,
    pub error: Option<JobError>,
    pub videos: Vec<String>,
}

impl JobHandle {
    /// A freshly submitted, unfinished job.
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// URI of the first generated video, if any.
    pub fn first_video(&self) -> Option<&str> {
        self.videos
            .iter()
            .map(String::as_str)
            .find(|uri| !uri.trim().is_empty())
    }
}

/// Remote operations needed to turn content into a video.
///
/// [`super::GeminiClient`] is the production implementation; tests supply
/// scripted fakes.
pub trait VideoProvider {
    /// Run a text-generation call; `None` when the model returned no text.
    fn synthesize_prompt(
        &self,
        instruction: &str,
    ) -> impl Future<Output = Result<Option<String>, ProviderError>> + Send;

    /// Start a video job for `prompt` producing `count` videos.
    fn submit_video_job(
        &self,
        prompt: &str,
        count: u32,
    ) -> impl Future<Output = Result<JobHandle, ProviderError>> + Send;

    /// Fetch the current status of a previously submitted job.
    fn poll_job(
        &self,
        job: &JobHandle,
    ) -> impl Future<Output = Result<JobHandle, ProviderError>> + Send;

    /// Access key appended to video URIs so they can be fetched directly.
    fn access_key(&self) -> &str;
}
