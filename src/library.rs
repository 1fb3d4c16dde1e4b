//! Where downloaded videos are stored.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::types::GenerationRequest;

/// Directory holding downloaded videos, one file per request.
pub struct VideoLibrary {
    dir: PathBuf,
}

impl VideoLibrary {
    /// Create a library rooted at `dir`. The directory is created on first download.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Default location: `<cache dir>/video-forge/videos`.
    pub fn with_default_dir() -> Self {
        Self::new(default_dir())
    }

    /// Use `dir` when configured, the default location otherwise.
    pub fn from_config(dir: Option<&Path>) -> Self {
        match dir {
            Some(dir) => Self::new(dir.to_path_buf()),
            None => Self::with_default_dir(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for the video generated from `request`.
    pub fn path_for(&self, request: &GenerationRequest) -> PathBuf {
        self.dir.join(format!("{}.mp4", Self::hash_request(request)))
    }

    /// Deterministic 32-character hex name for a request.
    ///
    /// Uses the first 16 bytes of SHA-256 over `"{length}:{content}"`, so the
    /// same content asked for at a different length gets its own file.
    pub fn hash_request(request: &GenerationRequest) -> String {
        let mut hasher = Sha256::new();
        hasher.update(request.length.to_string().as_bytes());
        hasher.update(b":");
        hasher.update(request.content.as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..16])
    }
}

fn default_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("video-forge")
        .join("videos")
}
