//! Instruction text for the prompt-synthesis step.

use crate::types::VideoLength;

/// Build the instruction asking the text model for a single video prompt.
///
/// The raw content is fenced between `---` lines so the model can tell it
/// apart from the instruction itself.
pub fn build_instruction(content: &str, length: VideoLength) -> String {
    let duration = length.duration_phrase();
    format!(
        "Based on the following content, create a single, concise, and highly descriptive \
prompt for an AI video generation model (like Google Veo).
The prompt should encapsulate the entire narrative and visual style for a {duration} \
explanatory video.
The video needs to be engaging, clear, visually rich, and friendly in tone.
Focus on a single, powerful prompt that can guide the video generation process.

Here is the content to base the prompt on:
---
{content}
---

Example of a good output format:
\"A dynamic and engaging explainer video, about {duration} long. It starts with an animated \
title sequence... [describe key scenes, visual style, transitions, and narration tone]... \
ending with a clear call to action.\""
    )
}
