//! Subcommand handlers for generate, interactive and config actions.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use super::args::{ConfigAction, GenerateArgs};
use crate::app::App;
use crate::config::{default_path as get_config_path, Config, ConfigError, DEFAULT_CONFIG_TOML};
use crate::gemini::{GeminiClient, VideoGenerator};
use crate::library::VideoLibrary;
use crate::types::{AppState, GenerationRequest, InputKind, VideoLength};
use crate::view::{
    parse_input, render_error, render_form_prompt, render_header, render_help, render_player,
    render_submitted, submit_with_progress, InputForm, Intent,
};

/// Exit code used when the user interrupts with Ctrl+C.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

const MISSING_KEY_HELP: &str = "API_KEY environment variable is not set.\n\n\
    Add your Gemini API key to a .env file:\n    \
    echo 'API_KEY=your-api-key-here' >> .env\n\n\
    Or set it as an environment variable:\n    \
    export API_KEY=\"your-api-key-here\"";

/// Install a Ctrl+C handler that explains what happens to a job in flight.
///
/// Jobs cannot be cancelled remotely, so the process exits right away.
pub fn setup_ctrlc_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted. A video job that was already submitted keeps running on the server.");
        std::process::exit(INTERRUPTED_EXIT_CODE);
    })
}

/// Load the config file. An explicit `--config` path must exist.
pub fn load_config(path: Option<&Path>) -> Result<Config, String> {
    match path {
        Some(path) => Config::load_explicit(path).map_err(|e| e.to_string()),
        None => match Config::load(None) {
            Ok(c) => Ok(c),
            Err(e) => {
                eprintln!("Warning: Failed to load config file: {}", e);
                eprintln!("Using default settings.\n");
                Ok(Config::default())
            }
        },
    }
}

/// Build the application around a real Gemini client.
pub fn build_app(config: &Config) -> Result<App<GeminiClient>, String> {
    let api_key = config.resolve_api_key().map_err(|e| match e {
        ConfigError::MissingApiKey => MISSING_KEY_HELP.to_string(),
        other => other.to_string(),
    })?;
    let client = GeminiClient::from_config(&config.provider, api_key)
        .map_err(|e| format!("Failed to create Gemini client: {}", e))?;
    let generator = VideoGenerator::with_policy(client, config.poll_policy());
    Ok(App::with_progress_interval(generator, config.progress_interval()))
}

/// Run `generate`: one attempt, then print or save the result.
pub fn run_generate(args: GenerateArgs, config: &Config) -> Result<(), String> {
    let input = args.input();
    let length = VideoLength::from(args.length);
    let request = GenerationRequest::from_input(&input, length)
        .ok_or_else(|| "Nothing to generate: the input is empty".to_string())?;

    let mut app = build_app(config)?;
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to create async runtime: {}", e))?;

    let mut stdout = io::stdout();
    render_submitted(&mut stdout, &input, length).ok();

    let state = rt
        .block_on(submit_with_progress(&mut app, request.clone(), &mut stdout))
        .map_err(|e| e.to_string())?;

    if state != AppState::Success {
        return Err(app
            .error_message()
            .unwrap_or("Failed to generate video.")
            .to_string());
    }

    let url = app.video_url().unwrap_or_default().to_string();
    let saved = if args.no_download || !config.output.download {
        None
    } else {
        let dest = match args.output {
            Some(path) => path,
            None => VideoLibrary::from_config(config.output.download_dir.as_deref()).path_for(&request),
        };
        Some(download(&rt, &app, &url, &dest)?)
    };

    render_player(&mut stdout, &url, saved.as_deref()).ok();
    Ok(())
}

/// Run the interactive session until `/quit` or end of input.
pub fn run_interactive(length: VideoLength, config: &Config) -> Result<(), String> {
    let mut app = build_app(config)?;
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to create async runtime: {}", e))?;
    let library = VideoLibrary::from_config(config.output.download_dir.as_deref());
    let mut form = InputForm::new(length);

    let mut stdout = io::stdout();
    render_header(&mut stdout).ok();
    render_help(&mut stdout).ok();
    writeln!(stdout).ok();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        render_form_prompt(&mut stdout, form.length()).ok();
        let line = match lines.next() {
            Some(line) => line.map_err(|e| format!("Failed to read input: {}", e))?,
            None => break,
        };

        let intent = match parse_input(&line) {
            Ok(Some(intent)) => intent,
            Ok(None) => continue,
            Err(msg) => {
                eprintln!("{}", msg);
                continue;
            }
        };

        match intent {
            Intent::Quit => break,
            Intent::Help => {
                render_help(&mut stdout).ok();
            }
            Intent::SetLength(length) => {
                form.set_length(length);
                println!("Length set to {} ({}).", length, length.duration_phrase());
            }
            Intent::StartOver => match app.reset() {
                Ok(()) => println!("Ready for a new video."),
                Err(e) => eprintln!("{}", e),
            },
            Intent::Submit(input) => {
                submit_interactive(&rt, &mut app, &form, &library, config, input, &mut stdout)?;
            }
        }
    }

    Ok(())
}

fn submit_interactive(
    rt: &tokio::runtime::Runtime,
    app: &mut App<GeminiClient>,
    form: &InputForm,
    library: &VideoLibrary,
    config: &Config,
    input: InputKind,
    out: &mut impl Write,
) -> Result<(), String> {
    let Some(request) = form.request(&input) else {
        println!("Nothing to generate: the input is empty.");
        return Ok(());
    };

    render_submitted(out, &input, form.length()).ok();
    let state = match rt.block_on(submit_with_progress(app, request.clone(), &mut *out)) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(());
        }
    };

    match state {
        AppState::Success => {
            let url = app.video_url().unwrap_or_default().to_string();
            let saved = if config.output.download {
                match download(rt, app, &url, &library.path_for(&request)) {
                    Ok(path) => Some(path),
                    Err(e) => {
                        // The video stays reachable through its URL.
                        log::warn!("{}", e);
                        None
                    }
                }
            } else {
                None
            };
            render_player(out, &url, saved.as_deref()).ok();
            println!("Type /reset to make another video.");
        }
        _ => {
            render_error(out, app.error_message().unwrap_or("Failed to generate video.")).ok();
        }
    }
    Ok(())
}

fn download(
    rt: &tokio::runtime::Runtime,
    app: &App<GeminiClient>,
    url: &str,
    dest: &Path,
) -> Result<PathBuf, String> {
    print!("Downloading video... ");
    io::stdout().flush().ok();
    let path = rt
        .block_on(app.generator().provider().download_video(url, dest))
        .map_err(|e| format!("Failed to download video: {}", e))?;
    println!("done");
    Ok(path)
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, config_path: Option<&Path>) -> Result<(), String> {
    let path = config_path.map(PathBuf::from).unwrap_or_else(get_config_path);

    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            let key_status = match config.resolve_api_key() {
                Ok(_) => "set",
                Err(_) => "not set",
            };

            println!("Current configuration:");
            println!("  API key: {}", key_status);
            println!("  Base URL: {}", config.provider.base_url);
            println!("  Text model: {}", config.provider.text_model);
            println!("  Video model: {}", config.provider.video_model);
            println!("  Poll interval: {}s", config.polling.interval_secs);
            match config.poll_policy().max_attempts {
                Some(n) => println!("  Max polls: {}", n),
                None => println!("  Max polls: unlimited"),
            }
            println!("  Poll backoff: {}", if config.polling.backoff { "yes" } else { "no" });
            println!("  Progress step: {}s", config.progress_interval().as_secs());
            println!("  Download: {}", if config.output.download { "yes" } else { "no" });
            let library = VideoLibrary::from_config(config.output.download_dir.as_deref());
            println!("  Video library: {}", library.dir().display());
            println!();

            if path.exists() {
                println!("Config file: {} (exists)", path.display());
            } else {
                println!("Config file: {} (not found)", path.display());
            }
            Ok(())
        }
        ConfigAction::Init => init_config_file(&path).map(|()| {
            println!("Created config file: {}", path.display());
        }),
    }
}

fn init_config_file(path: &Path) -> Result<(), String> {
    if path.exists() {
        return Err(format!(
            "Config file already exists: {}\nUse 'video-forge config show' to view current settings.",
            path.display()
        ));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Error creating config directory: {}", e))?;
    }

    std::fs::write(path, DEFAULT_CONFIG_TOML).map_err(|e| format!("Error writing config file: {}", e))
}
