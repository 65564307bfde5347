// ABOUTME: Turns free-form model output into validated plans and display-safe chat text
// ABOUTME: JSON block extraction, weekly plan validation, and markdown-to-HTML cleanup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

use std::sync::OnceLock;

use kinetic_core::errors::{AppError, AppResult};
use kinetic_core::models::WeeklyPlan;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

static JSON_BLOCK: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
static BOLD: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
static STARS: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

fn json_block_re() -> Option<&'static Regex> {
    // Greedy and dot-matches-newline: first '{' through the last '}'
    JSON_BLOCK
        .get_or_init(|| Regex::new(r"(?s)\{.*\}"))
        .as_ref()
        .ok()
}

fn bold_re() -> Option<&'static Regex> {
    BOLD.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*"))
        .as_ref()
        .ok()
}

fn stars_re() -> Option<&'static Regex> {
    STARS.get_or_init(|| Regex::new(r"[★☆*]+")).as_ref().ok()
}

/// Pull the first `{ ... }` block out of model output and parse it.
///
/// Returns `None` for empty input, when there is no brace block, or when the
/// block is not valid JSON. Code fences around the block are ignored.
#[must_use]
pub fn extract_json_strict(text: &str) -> Option<Value> {
    let cleaned = text.trim();
    if cleaned.is_empty() {
        return None;
    }
    let cleaned = cleaned
        .replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "");

    let block = json_block_re()?.find(&cleaned)?;
    serde_json::from_str(block.as_str()).ok()
}

/// Extract and validate a weekly plan from model output
///
/// # Errors
///
/// Returns `InvalidModelOutput` when no JSON object can be extracted or the
/// object has no top-level `"week"` key
pub fn parse_weekly_plan(text: &str) -> AppResult<WeeklyPlan> {
    let Some(value) = extract_json_strict(text) else {
        warn!(
            chars = text.len(),
            "Model output contained no parseable JSON object"
        );
        return Err(AppError::invalid_model_output(
            "AI returned invalid JSON plan",
        ));
    };
    WeeklyPlan::try_from(value)
}

/// Render model chat output for display.
///
/// `**bold**` becomes `<strong>bold</strong>`, remaining star characters are
/// dropped, `"\n- "` list items become `"<br>• "`, and other newlines become
/// `<br>`.
#[must_use]
pub fn clean_ai_response(text: &str) -> String {
    let mut out = bold_re().map_or_else(
        || text.to_owned(),
        |re| re.replace_all(text, "<strong>$1</strong>").into_owned(),
    );
    if let Some(re) = stars_re() {
        out = re.replace_all(&out, "").into_owned();
    }
    out.replace("\n- ", "<br>• ").replace('\n', "<br>")
}
