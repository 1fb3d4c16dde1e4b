//! Input form - turns user input into intents for the state machine.
//!
//! Plain text is content to turn into a video. Slash commands pick another
//! input kind, change the target length, or control the session.

use crate::types::{GenerationRequest, InputKind, VideoLength};

/// What the user asked for with one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Generate a video from this input.
    Submit(InputKind),
    /// Change the target length for later submissions.
    SetLength(VideoLength),
    /// Discard the last result and go back to the form.
    StartOver,
    Help,
    Quit,
}

/// Parse a line of input.
///
/// # Returns
/// - `Ok(None)` for empty or whitespace-only input
/// - `Ok(Some(intent))` for text or a valid command
/// - `Err(message)` for an unknown or malformed command
///
/// # Input Format
/// - `/file <name>`: content from a file (described by name)
/// - `/url <url>`: content from a web page (described by URL)
/// - `/length medium|long`: target length
/// - `/reset`, `/help`, `/quit`
/// - Any other text: text content
pub fn parse_input(input: &str) -> Result<Option<Intent>, String> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.starts_with('/') {
        return parse_command(trimmed).map(Some);
    }

    Ok(Some(Intent::Submit(InputKind::Text(trimmed.to_string()))))
}

fn parse_command(input: &str) -> Result<Intent, String> {
    let (command, rest) = match input.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (input, ""),
    };

    match command.to_lowercase().as_str() {
        "/file" => {
            if rest.is_empty() {
                return Err("Usage: /file <name>".to_string());
            }
            Ok(Intent::Submit(InputKind::File(rest.to_string())))
        }
        "/url" => {
            if rest.is_empty() {
                return Err("Usage: /url <address>".to_string());
            }
            Ok(Intent::Submit(InputKind::Url(rest.to_string())))
        }
        "/length" => rest
            .parse::<VideoLength>()
            .map(Intent::SetLength)
            .map_err(|_| "Usage: /length medium|long".to_string()),
        "/reset" | "/start-over" => Ok(Intent::StartOver),
        "/help" | "/?" => Ok(Intent::Help),
        "/quit" | "/exit" => Ok(Intent::Quit),
        other => Err(format!("Unknown command: {}. Type /help for commands.", other)),
    }
}

/// Form state that outlives a single line: the selected length.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputForm {
    length: VideoLength,
}

impl InputForm {
    pub fn new(length: VideoLength) -> Self {
        Self { length }
    }

    pub fn length(&self) -> VideoLength {
        self.length
    }

    pub fn set_length(&mut self, length: VideoLength) {
        self.length = length;
    }

    /// Build a request for `input` at the selected length, `None` if blank.
    pub fn request(&self, input: &InputKind) -> Option<GenerationRequest> {
        GenerationRequest::from_input(input, self.length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_ignored() {
        assert_eq!(parse_input(""), Ok(None));
        assert_eq!(parse_input("   \t"), Ok(None));
    }

    #[test]
    fn test_plain_text_is_text_submission() {
        assert_eq!(
            parse_input("  Explain black holes  "),
            Ok(Some(Intent::Submit(InputKind::Text(
                "Explain black holes".to_string()
            ))))
        );
    }

    #[test]
    fn test_file_command() {
        assert_eq!(
            parse_input("/file lecture notes.pdf"),
            Ok(Some(Intent::Submit(InputKind::File(
                "lecture notes.pdf".to_string()
            ))))
        );
        assert!(parse_input("/file").is_err());
    }

    #[test]
    fn test_url_command() {
        assert_eq!(
            parse_input("/URL https://example.com/post"),
            Ok(Some(Intent::Submit(InputKind::Url(
                "https://example.com/post".to_string()
            ))))
        );
        assert!(parse_input("/url   ").is_err());
    }

    #[test]
    fn test_length_command() {
        assert_eq!(
            parse_input("/length long"),
            Ok(Some(Intent::SetLength(VideoLength::Long)))
        );
        assert_eq!(
            parse_input("/length Medium"),
            Ok(Some(Intent::SetLength(VideoLength::Medium)))
        );
        assert!(parse_input("/length short").is_err());
        assert!(parse_input("/length").is_err());
    }

    #[test]
    fn test_session_commands() {
        assert_eq!(parse_input("/reset"), Ok(Some(Intent::StartOver)));
        assert_eq!(parse_input("/start-over"), Ok(Some(Intent::StartOver)));
        assert_eq!(parse_input("/help"), Ok(Some(Intent::Help)));
        assert_eq!(parse_input("/quit"), Ok(Some(Intent::Quit)));
        assert_eq!(parse_input("/exit"), Ok(Some(Intent::Quit)));
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_input("/dance").unwrap_err();
        assert!(err.contains("/dance"));
    }

    #[test]
    fn test_form_uses_selected_length() {
        let mut form = InputForm::default();
        assert_eq!(form.length(), VideoLength::Medium);
        form.set_length(VideoLength::Long);

        let request = form
            .request(&InputKind::File("slides.pptx".to_string()))
            .unwrap();
        assert_eq!(request.length, VideoLength::Long);
        assert_eq!(request.content, "[Content from uploaded file: slides.pptx]");
    }

    #[test]
    fn test_form_rejects_blank_text() {
        let form = InputForm::new(VideoLength::Medium);
        assert!(form.request(&InputKind::Text("  ".to_string())).is_none());
    }
}
