//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::Length;
use crate::types::InputKind;

/// Turn text, files or links into AI-generated explainer videos
#[derive(Parser, Debug)]
#[command(name = "video-forge")]
#[command(version, about = "Turn text, files or links into AI-generated videos", long_about = None)]
#[command(after_help = "EXAMPLES:
    # Interactive session
    video-forge

    # One video from text
    video-forge generate \"How vaccines train the immune system\"

    # A long video about a web page, saved to a chosen file
    video-forge generate --url https://example.com/article --length long -o article.mp4

The API key is read from the API_KEY environment variable or a .env file.")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate one video and exit
    Generate(GenerateArgs),
    /// Start an interactive session (the default)
    Interactive {
        /// Initial target length
        #[arg(long, short, default_value = "medium")]
        length: Length,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Text to turn into a video
    #[arg(required_unless_present_any = ["file", "url"], conflicts_with_all = ["file", "url"])]
    pub text: Option<String>,

    /// Use an uploaded file, described to the model by name
    #[arg(long, conflicts_with = "url")]
    pub file: Option<String>,

    /// Use a web page, described to the model by URL
    #[arg(long)]
    pub url: Option<String>,

    /// Target video length
    #[arg(long, short, default_value = "medium")]
    pub length: Length,

    /// Where to save the video (default: the video library)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Only print the video URL
    #[arg(long, conflicts_with = "output")]
    pub no_download: bool,
}

impl GenerateArgs {
    /// The input kind selected by the flags.
    pub fn input(&self) -> InputKind {
        match (&self.file, &self.url) {
            (Some(file), _) => InputKind::File(file.clone()),
            (None, Some(url)) => InputKind::Url(url.clone()),
            (None, None) => InputKind::Text(self.text.clone().unwrap_or_default()),
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["video-forge"]);
        assert!(args.command.is_none());
        assert!(args.config.is_none());
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_generate_text() {
        let args = Args::parse_from(["video-forge", "generate", "Explain rainbows"]);
        match args.command {
            Some(Command::Generate(generate)) => {
                assert_eq!(generate.input(), InputKind::Text("Explain rainbows".to_string()));
                assert_eq!(generate.length, Length::Medium);
                assert!(generate.output.is_none());
                assert!(!generate.no_download);
            }
            _ => panic!("Expected Generate subcommand"),
        }
    }

    #[test]
    fn test_generate_file_and_length() {
        let args = Args::parse_from([
            "video-forge",
            "generate",
            "--file",
            "notes.md",
            "--length",
            "long",
        ]);
        match args.command {
            Some(Command::Generate(generate)) => {
                assert_eq!(generate.input(), InputKind::File("notes.md".to_string()));
                assert_eq!(generate.length, Length::Long);
            }
            _ => panic!("Expected Generate subcommand"),
        }
    }

    #[test]
    fn test_generate_url_with_output() {
        let args = Args::parse_from([
            "video-forge",
            "generate",
            "--url",
            "https://example.com",
            "-o",
            "/tmp/out.mp4",
        ]);
        match args.command {
            Some(Command::Generate(generate)) => {
                assert_eq!(generate.input(), InputKind::Url("https://example.com".to_string()));
                assert_eq!(generate.output, Some(PathBuf::from("/tmp/out.mp4")));
            }
            _ => panic!("Expected Generate subcommand"),
        }
    }

    #[test]
    fn test_generate_requires_some_input() {
        assert!(Args::try_parse_from(["video-forge", "generate"]).is_err());
    }

    #[test]
    fn test_generate_rejects_two_inputs() {
        assert!(Args::try_parse_from([
            "video-forge",
            "generate",
            "text",
            "--url",
            "https://example.com"
        ])
        .is_err());
        assert!(Args::try_parse_from([
            "video-forge",
            "generate",
            "--file",
            "a.txt",
            "--url",
            "https://example.com"
        ])
        .is_err());
    }

    #[test]
    fn test_generate_rejects_bad_length() {
        assert!(Args::try_parse_from(["video-forge", "generate", "x", "--length", "short"]).is_err());
    }

    #[test]
    fn test_no_download_conflicts_with_output() {
        assert!(Args::try_parse_from([
            "video-forge",
            "generate",
            "x",
            "--no-download",
            "-o",
            "a.mp4"
        ])
        .is_err());
    }

    #[test]
    fn test_interactive_length() {
        let args = Args::parse_from(["video-forge", "interactive", "-l", "long"]);
        assert!(matches!(
            args.command,
            Some(Command::Interactive {
                length: Length::Long
            })
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::parse_from(["video-forge", "generate", "x", "-vv", "--config", "/tmp/c.toml"]);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn test_args_config_show_subcommand() {
        let args = Args::parse_from(["video-forge", "config", "show"]);
        match args.command {
            Some(Command::Config {
                action: ConfigAction::Show,
            }) => (),
            _ => panic!("Expected Config Show subcommand"),
        }
    }

    #[test]
    fn test_args_config_init_subcommand() {
        let args = Args::parse_from(["video-forge", "config", "init"]);
        match args.command {
            Some(Command::Config {
                action: ConfigAction::Init,
            }) => (),
            _ => panic!("Expected Config Init subcommand"),
        }
    }
}
