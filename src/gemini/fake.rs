//! Scripted in-memory provider for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use super::client::ProviderError;
use super::provider::{JobError, JobHandle, VideoProvider};

pub(crate) const FAKE_KEY: &str = "test-key";

/// Provider returning canned answers and counting calls.
pub(crate) struct ScriptedProvider {
    prompt: Option<String>,
    submitted: JobHandle,
    polls: Mutex<VecDeque<JobHandle>>,
    last: JobHandle,
    fail_submit_with: Mutex<Option<ProviderError>>,
    pub synthesize_calls: AtomicU32,
    pub submit_calls: AtomicU32,
    pub poll_calls: AtomicU32,
    pub last_instruction: Mutex<Option<String>>,
    pub last_prompt: Mutex<Option<(String, u32)>>,
}

impl ScriptedProvider {
    /// Job that is pending for `pending_polls` polls and then reports `last`
    /// on every poll after that.
    pub fn new(prompt: Option<&str>, pending_polls: usize, last: JobHandle) -> Self {
        let polls: VecDeque<JobHandle> = (0..pending_polls)
            .map(|_| JobHandle::pending("operations/fake"))
            .collect();
        Self {
            prompt: prompt.map(str::to_string),
            submitted: JobHandle::pending("operations/fake"),
            polls: Mutex::new(polls),
            last,
            fail_submit_with: Mutex::new(None),
            synthesize_calls: AtomicU32::new(0),
            submit_calls: AtomicU32::new(0),
            poll_calls: AtomicU32::new(0),
            last_instruction: Mutex::new(None),
            last_prompt: Mutex::new(None),
        }
    }

    /// A provider whose job finishes with one video after `pending_polls` polls.
    pub fn succeeding(pending_polls: usize, uri: &str) -> Self {
        Self::new(Some("A friendly explainer"), pending_polls, done_with_video(uri))
    }

    pub fn failing_submit(error: ProviderError) -> Self {
        let provider = Self::succeeding(0, "https://example.com/v.mp4");
        *provider.fail_submit_with.lock().unwrap() = Some(error);
        provider
    }

    /// A provider whose job never finishes.
    pub fn never_done() -> Self {
        Self::new(Some("prompt"), 0, JobHandle::pending("operations/fake"))
    }
}

pub(crate) fn done_with_video(uri: &str) -> JobHandle {
    JobHandle {
        name: "operations/fake".into(),
        done: true,
        error: None,
        videos: vec![uri.to_string()],
    }
}

pub(crate) fn done_with_error(message: &str) -> JobHandle {
    JobHandle {
        name: "operations/fake".into(),
        done: true,
        error: Some(JobError {
            code: Some(8),
            message: message.to_string(),
        }),
        videos: Vec::new(),
    }
}

impl VideoProvider for ScriptedProvider {
    async fn synthesize_prompt(&self, instruction: &str) -> Result<Option<String>, ProviderError> {
        self.synthesize_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_instruction.lock().unwrap() = Some(instruction.to_string());
        Ok(self.prompt.clone())
    }

    async fn submit_video_job(&self, prompt: &str, count: u32) -> Result<JobHandle, ProviderError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some((prompt.to_string(), count));
        if let Some(error) = self.fail_submit_with.lock().unwrap().take() {
            return Err(error);
        }
        Ok(self.submitted.clone())
    }

    async fn poll_job(&self, _job: &JobHandle) -> Result<JobHandle, ProviderError> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.polls.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| self.last.clone()))
    }

    fn access_key(&self) -> &str {
        FAKE_KEY
    }
}
