use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use video_forge::cli::{self, Args, Command};
use video_forge::types::VideoLength;

/// Map `-v` occurrences to a log level. `RUST_LOG` still overrides it.
fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

fn init_logging(verbose: u8) {
    let result = SimpleLogger::new()
        .with_level(log_level(verbose))
        .with_module_level("hyper", LevelFilter::Warn)
        .with_module_level("hyper_util", LevelFilter::Warn)
        .with_module_level("reqwest", LevelFilter::Warn)
        .env()
        .init();
    if let Err(e) = result {
        eprintln!("Warning: Could not initialize logging: {}", e);
    }
}

fn main() {
    // dotenv::dotenv() returns Err if .env doesn't exist, which is fine
    let _ = dotenv::dotenv();

    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = cli::setup_ctrlc_handler() {
        log::warn!("Could not set up Ctrl+C handler: {}", e);
    }

    let config_path = args.config.as_deref();
    let result = match args.command {
        Some(Command::Config { action }) => cli::handle_config_action(action, config_path),
        Some(Command::Generate(generate)) => {
            cli::load_config(config_path).and_then(|config| cli::run_generate(generate, &config))
        }
        Some(Command::Interactive { length }) => cli::load_config(config_path)
            .and_then(|config| cli::run_interactive(VideoLength::from(length), &config)),
        None => cli::load_config(config_path)
            .and_then(|config| cli::run_interactive(VideoLength::default(), &config)),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
