//! Loading screen shown while a generation attempt runs.

use std::io::Write;

use crate::app::{App, AppError};
use crate::gemini::VideoProvider;
use crate::types::{AppState, GenerationRequest};

use super::render::render_step;

/// Submit `request` and print each progress step until the attempt settles.
///
/// Write failures on `out` are ignored; the loading screen is decorative.
pub async fn submit_with_progress<P: VideoProvider>(
    app: &mut App<P>,
    request: GenerationRequest,
    out: &mut impl Write,
) -> Result<AppState, AppError> {
    let mut steps = app.subscribe_steps();
    let submit = app.submit(request);
    tokio::pin!(submit);

    let mut shown = None;
    loop {
        tokio::select! {
            biased;
            result = &mut submit => break result,
            Ok(()) = steps.changed() => {
                let step = *steps.borrow_and_update();
                if shown != Some(step) {
                    shown = Some(step);
                    let _ = render_step(out, step);
                }
            }
        }
    }
}
