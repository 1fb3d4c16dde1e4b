//! Application state machine driving a generation attempt.
//!
//! `Idle -> Loading -> Success | Error`, and back to `Idle` on reset. While
//! loading, a [`ProgressTicker`] walks through the cosmetic [`LoadingStep`]s.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::gemini::{GenerationError, VideoGenerator, VideoProvider};
use crate::types::{AppState, GenerationRequest, LoadingStep};

/// Default period between progress steps (5 seconds).
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

/// Prefix of every error message shown after a failed attempt.
pub const ERROR_PREFIX: &str = "Failed to generate video. ";

/// Rejected state transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    #[error("A video is already being generated")]
    SubmitWhileLoading,

    #[error("Start over before generating another video")]
    ResetRequired,

    #[error("Cannot start over while a video is being generated")]
    ResetWhileLoading,
}

/// Background task advancing the progress step on a fixed period.
///
/// The step only moves forward and stops at [`LoadingStep::Done`]. The task
/// is aborted when the ticker is stopped or dropped.
pub struct ProgressTicker {
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    /// Spawn the ticker; the first advance happens one `period` from now.
    pub fn start(period: Duration, step: Arc<watch::Sender<LoadingStep>>) -> Self {
        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            loop {
                interval.tick().await;
                step.send_if_modified(|current| {
                    let next = current.next();
                    let changed = next != *current;
                    *current = next;
                    changed
                });
                if step.borrow().is_last() {
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn stop(self) {
        // Drop aborts the task.
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// The controller between the views and the generation workflow.
pub struct App<P> {
    generator: VideoGenerator<P>,
    progress_interval: Duration,
    state: watch::Sender<AppState>,
    step: Arc<watch::Sender<LoadingStep>>,
    video_url: Option<String>,
    error_message: Option<String>,
}

impl<P: VideoProvider> App<P> {
    pub fn new(generator: VideoGenerator<P>) -> Self {
        Self::with_progress_interval(generator, DEFAULT_PROGRESS_INTERVAL)
    }

    pub fn with_progress_interval(generator: VideoGenerator<P>, progress_interval: Duration) -> Self {
        let (state, _) = watch::channel(AppState::Idle);
        let (step, _) = watch::channel(LoadingStep::Analyzing);
        Self {
            generator,
            progress_interval,
            state,
            step: Arc::new(step),
            video_url: None,
            error_message: None,
        }
    }

    pub fn state(&self) -> AppState {
        *self.state.borrow()
    }

    pub fn loading_step(&self) -> LoadingStep {
        *self.step.borrow()
    }

    /// URL of the generated video; set only in `Success`.
    pub fn video_url(&self) -> Option<&str> {
        self.video_url.as_deref()
    }

    /// Formatted failure message; set only in `Error`.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Watch state changes, including those made during [`App::submit`].
    pub fn subscribe_state(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    /// Watch progress steps while loading.
    pub fn subscribe_steps(&self) -> watch::Receiver<LoadingStep> {
        self.step.subscribe()
    }

    pub fn generator(&self) -> &VideoGenerator<P> {
        &self.generator
    }

    /// Run one generation attempt to completion.
    ///
    /// Allowed from `Idle` and `Error`. Returns the state the attempt
    /// settled in, `Success` or `Error`; a failed generation is not an `Err`.
    pub async fn submit(&mut self, request: GenerationRequest) -> Result<AppState, AppError> {
        let ticker = self.begin()?;

        let outcome = self.generator.generate(&request).await;
        ticker.stop();

        match outcome {
            Ok(url) => self.resolve(url),
            Err(err) => self.reject(&err),
        }
        Ok(self.state())
    }

    /// Return to `Idle`, discarding the previous result.
    pub fn reset(&mut self) -> Result<(), AppError> {
        match self.state() {
            AppState::Loading => Err(AppError::ResetWhileLoading),
            AppState::Idle => Ok(()),
            AppState::Success | AppState::Error => {
                self.video_url = None;
                self.error_message = None;
                self.state.send_replace(AppState::Idle);
                Ok(())
            }
        }
    }

    fn begin(&mut self) -> Result<ProgressTicker, AppError> {
        match self.state() {
            AppState::Loading => return Err(AppError::SubmitWhileLoading),
            AppState::Success => return Err(AppError::ResetRequired),
            AppState::Idle | AppState::Error => {}
        }

        self.error_message = None;
        self.video_url = None;
        self.step.send_replace(LoadingStep::Analyzing);
        self.state.send_replace(AppState::Loading);
        Ok(ProgressTicker::start(self.progress_interval, self.step.clone()))
    }

    fn resolve(&mut self, url: String) {
        if url.trim().is_empty() {
            self.reject(&GenerationError::NoVideoProduced);
            return;
        }
        log::info!("Video ready: {}", url);
        self.step.send_replace(LoadingStep::Done);
        self.video_url = Some(url);
        self.state.send_replace(AppState::Success);
    }

    fn reject(&mut self, err: &GenerationError) {
        log::error!("Video generation failed: {}", err);
        self.error_message = Some(format!("{}{}", ERROR_PREFIX, err.user_message()));
        self.state.send_replace(AppState::Error);
    }
}
