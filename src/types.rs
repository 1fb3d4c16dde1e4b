//! Domain types shared by the generation workflow, the state machine and the views.

use std::fmt;

/// Phase of the application as seen by the views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppState::Idle => write!(f, "idle"),
            AppState::Loading => write!(f, "loading"),
            AppState::Success => write!(f, "success"),
            AppState::Error => write!(f, "error"),
        }
    }
}

/// Target duration bucket for the generated video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoLength {
    #[default]
    Medium,
    Long,
}

impl VideoLength {
    /// Human-readable duration phrase embedded in the prompt instruction.
    pub fn duration_phrase(self) -> &'static str {
        match self {
            VideoLength::Medium => "5 to 10 minutes",
            VideoLength::Long => "20 to 30 minutes",
        }
    }
}

impl fmt::Display for VideoLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoLength::Medium => write!(f, "medium"),
            VideoLength::Long => write!(f, "long"),
        }
    }
}

impl std::str::FromStr for VideoLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "medium" => Ok(VideoLength::Medium),
            "long" => Ok(VideoLength::Long),
            other => Err(format!(
                "Unknown video length '{}'. Use 'medium' or 'long'",
                other
            )),
        }
    }
}

/// Cosmetic progress phase shown while a generation attempt is outstanding.
///
/// Phases are ordered; [`LoadingStep::next`] only ever moves forward and
/// stays on [`LoadingStep::Done`] once reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LoadingStep {
    #[default]
    Analyzing,
    WritingScript,
    GeneratingVisuals,
    RenderingVideo,
    Done,
}

impl LoadingStep {
    /// All phases in display order.
    pub const ALL: [LoadingStep; 5] = [
        LoadingStep::Analyzing,
        LoadingStep::WritingScript,
        LoadingStep::GeneratingVisuals,
        LoadingStep::RenderingVideo,
        LoadingStep::Done,
    ];

    /// The following phase, or `self` when already at the last one.
    pub fn next(self) -> Self {
        match self {
            LoadingStep::Analyzing => LoadingStep::WritingScript,
            LoadingStep::WritingScript => LoadingStep::GeneratingVisuals,
            LoadingStep::GeneratingVisuals => LoadingStep::RenderingVideo,
            LoadingStep::RenderingVideo => LoadingStep::Done,
            LoadingStep::Done => LoadingStep::Done,
        }
    }

    pub fn is_last(self) -> bool {
        self == LoadingStep::Done
    }

    /// Zero-based position in [`LoadingStep::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            LoadingStep::Analyzing => "Analyzing Content...",
            LoadingStep::WritingScript => "Writing Script...",
            LoadingStep::GeneratingVisuals => "Generating Visuals...",
            LoadingStep::RenderingVideo => "Rendering Video...",
            LoadingStep::Done => "Finalizing...",
        }
    }
}

impl fmt::Display for LoadingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How the user supplied the content for a video.
///
/// File and URL inputs are not fetched; they are described to the
/// prompt-synthesis step by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    Text(String),
    File(String),
    Url(String),
}

impl InputKind {
    /// Content string submitted for this input.
    pub fn content(&self) -> String {
        match self {
            InputKind::Text(text) => text.clone(),
            InputKind::File(name) => format!("[Content from uploaded file: {}]", name),
            InputKind::Url(url) => format!("[Content from URL: {}]", url),
        }
    }

    /// Short name of the variant, used in status output.
    pub fn kind_name(&self) -> &'static str {
        match self {
            InputKind::Text(_) => "text",
            InputKind::File(_) => "file",
            InputKind::Url(_) => "url",
        }
    }

    /// True when the raw value the user typed is blank.
    pub fn is_blank(&self) -> bool {
        match self {
            InputKind::Text(value) | InputKind::File(value) | InputKind::Url(value) => {
                value.trim().is_empty()
            }
        }
    }
}

/// A single submission: the content plus the desired length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub content: String,
    pub length: VideoLength,
}

impl GenerationRequest {
    /// Build a request from user input.
    ///
    /// Returns `None` when there is nothing to submit, either because the
    /// raw input is blank or the resulting content is empty after trimming.
    pub fn from_input(input: &InputKind, length: VideoLength) -> Option<Self> {
        if input.is_blank() {
            return None;
        }
        let content = input.content();
        if content.trim().is_empty() {
            return None;
        }
        Some(Self { content, length })
    }
}
