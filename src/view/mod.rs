//! Terminal views: the input form, the loading screen and the result output.
//!
//! Views only read [`crate::app::App`] state and produce intents; they never
//! call the provider directly.

mod input;
mod loading;
mod render;

pub use input::{parse_input, InputForm, Intent};
pub use loading::submit_with_progress;
pub use render::{
    render_error, render_form_prompt, render_header, render_help, render_player, render_step,
    render_submitted,
};
