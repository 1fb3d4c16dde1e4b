//! Terminal rendering for the form, loading screen, player and errors.

use std::io::{self, Write};
use std::path::Path;

use crate::types::{InputKind, LoadingStep, VideoLength};

pub fn render_header(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "AI Video Forge")?;
    writeln!(out, "Transform your ideas into videos with AI")?;
    writeln!(out)
}

pub fn render_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Type text to turn it into a video, or:")?;
    writeln!(out, "  /file <name>          use an uploaded file")?;
    writeln!(out, "  /url <address>        use a web page")?;
    writeln!(out, "  /length medium|long   5-10 or 20-30 minute video")?;
    writeln!(out, "  /reset                start over after a result")?;
    writeln!(out, "  /quit                 leave")
}

/// Prompt line shown while the form accepts input.
pub fn render_form_prompt(out: &mut impl Write, length: VideoLength) -> io::Result<()> {
    write!(out, "[{}] > ", length)?;
    out.flush()
}

pub fn render_submitted(out: &mut impl Write, input: &InputKind, length: VideoLength) -> io::Result<()> {
    writeln!(
        out,
        "Generating a {} video ({}) from {} input...",
        length,
        length.duration_phrase(),
        input.kind_name()
    )
}

/// One line of the loading screen, e.g. `[2/5] Writing Script...`.
pub fn render_step(out: &mut impl Write, step: LoadingStep) -> io::Result<()> {
    writeln!(
        out,
        "  [{}/{}] {}",
        step.index() + 1,
        LoadingStep::ALL.len(),
        step.label()
    )?;
    out.flush()
}

/// The "player": where to watch the finished video.
pub fn render_player(out: &mut impl Write, url: &str, saved_to: Option<&Path>) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Your video is ready!")?;
    writeln!(out, "  URL:  {}", url)?;
    if let Some(path) = saved_to {
        writeln!(out, "  File: {}", path.display())?;
    }
    writeln!(out)
}

pub fn render_error(out: &mut impl Write, message: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", message)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn rendered(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_render_step_numbers_steps() {
        let text = rendered(|out| render_step(out, LoadingStep::WritingScript));
        assert_eq!(text, "  [2/5] Writing Script...\n");

        let text = rendered(|out| render_step(out, LoadingStep::Done));
        assert_eq!(text, "  [5/5] Finalizing...\n");
    }

    #[test]
    fn test_render_player_with_file() {
        let path = PathBuf::from("/tmp/v.mp4");
        let text = rendered(|out| render_player(out, "https://x/v.mp4&key=k", Some(path.as_path())));
        assert!(text.contains("URL:  https://x/v.mp4&key=k"));
        assert!(text.contains("File: /tmp/v.mp4"));
    }

    #[test]
    fn test_render_player_without_file() {
        let text = rendered(|out| render_player(out, "https://x/v.mp4", None));
        assert!(!text.contains("File:"));
    }

    #[test]
    fn test_render_submitted_mentions_kind_and_duration() {
        let text = rendered(|out| {
            render_submitted(out, &InputKind::Url("https://a.b".into()), VideoLength::Long)
        });
        assert_eq!(text, "Generating a long video (20 to 30 minutes) from url input...\n");
    }

    #[test]
    fn test_render_form_prompt() {
        let text = rendered(|out| render_form_prompt(out, VideoLength::Medium));
        assert_eq!(text, "[medium] > ");
    }

    #[test]
    fn test_render_error_shows_message() {
        let text = rendered(|out| render_error(out, "Failed to generate video. boom"));
        assert!(text.contains("Failed to generate video. boom"));
    }
}
