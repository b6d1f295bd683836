// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System prompt assembly.
//!
//! Prompts are parameterized by model id and by ambient locale/geo hints.
//! Hints are best-effort: absent fields simply leave the location block out.

use parley_core::types::RequestHints;

use crate::registry::REASONING_MODEL_ID;

const BASE_PROMPT: &str = "You are a friendly assistant. Keep your responses \
concise and helpful.";

const TOOL_GUIDANCE: &str = "Use the available tools when they can answer the \
question better than you can from memory.";

/// Prompt for the internal title model: a short label, no quotes, no prose.
pub const TITLE_PROMPT: &str = "Generate a short title (at most 80 characters) \
summarizing the user's message. Respond with the title only, no quotes and no \
colons.";

/// Prompt for the suggestions tool.
pub const SUGGESTIONS_PROMPT: &str = "Suggest up to four short follow-up \
questions the user might ask next. Respond with one suggestion per line, no \
numbering.";

/// Builds the system prompt for a generation run.
///
/// The reasoning model gets the bare prompt; tool guidance would only distract
/// a model that receives no tools.
pub fn system_prompt(model_id: &str, hints: &RequestHints) -> String {
    let mut prompt = String::from(BASE_PROMPT);
    if model_id != REASONING_MODEL_ID {
        prompt.push_str("\n\n");
        prompt.push_str(TOOL_GUIDANCE);
    }
    if let Some(location) = location_block(hints) {
        prompt.push_str("\n\n");
        prompt.push_str(&location);
    }
    prompt
}

fn location_block(hints: &RequestHints) -> Option<String> {
    let mut lines = Vec::new();
    match (&hints.city, &hints.country) {
        (Some(city), Some(country)) => {
            lines.push(format!("The user is located in {city}, {country}."))
        }
        (Some(city), None) => lines.push(format!("The user is located in {city}.")),
        (None, Some(country)) => lines.push(format!("The user is located in {country}.")),
        (None, None) => {}
    }
    if let (Some(lat), Some(lon)) = (hints.latitude, hints.longitude) {
        lines.push(format!("Approximate coordinates: {lat}, {lon}."));
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines.join(" "))
    }
}
