//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{Args, Command, ConfigAction, GenerateArgs};
pub use commands::{
    build_app, handle_config_action, load_config, run_generate, run_interactive,
    setup_ctrlc_handler, INTERRUPTED_EXIT_CODE,
};
pub use enums::Length;
