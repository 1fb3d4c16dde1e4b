//! CLI enum types.

use clap::ValueEnum;

use crate::types::VideoLength;

/// Target video length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Length {
    /// 5 to 10 minutes
    #[default]
    Medium,
    /// 20 to 30 minutes
    Long,
}

impl From<Length> for VideoLength {
    fn from(l: Length) -> Self {
        match l {
            Length::Medium => VideoLength::Medium,
            Length::Long => VideoLength::Long,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_to_video_length() {
        assert_eq!(VideoLength::from(Length::Medium), VideoLength::Medium);
        assert_eq!(VideoLength::from(Length::Long), VideoLength::Long);
    }

    #[test]
    fn test_default_length_is_medium() {
        assert_eq!(VideoLength::from(Length::default()), VideoLength::Medium);
    }
}
