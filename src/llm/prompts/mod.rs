// ABOUTME: System prompts for the diet coach, workout coach, and chat persona
// ABOUTME: Built-in prompts are compiled in; configured files override them at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

//! # System Prompts
//!
//! The plan coaches ship with built-in prompts loaded at compile time from
//! markdown files. Deployments can replace either one with a file configured
//! through [`crate::config::PromptPaths`].

use std::path::Path;

use kinetic_core::constants::service_names::COACH_PERSONA;
use kinetic_core::errors::{AppError, AppResult};
use kinetic_core::models::PlanKind;
use tracing::info;

use crate::config::PromptPaths;

/// Built-in diet coach prompt
pub const DIET_COACH_PROMPT: &str = include_str!("diet_coach.md");

/// Built-in workout coach prompt
pub const WORKOUT_COACH_PROMPT: &str = include_str!("workout_coach.md");

/// System prompts used by plan generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoachPrompts {
    /// Diet coach system prompt
    pub diet: String,
    /// Workout coach system prompt
    pub workout: String,
}

impl Default for CoachPrompts {
    fn default() -> Self {
        Self {
            diet: DIET_COACH_PROMPT.to_owned(),
            workout: WORKOUT_COACH_PROMPT.to_owned(),
        }
    }
}

impl CoachPrompts {
    /// Load prompts, preferring configured files over the built-ins
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a configured file cannot be read or is empty
    pub async fn load(paths: &PromptPaths) -> AppResult<Self> {
        let diet = match &paths.diet {
            Some(path) => read_prompt(path).await?,
            None => DIET_COACH_PROMPT.to_owned(),
        };
        let workout = match &paths.workout {
            Some(path) => read_prompt(path).await?,
            None => WORKOUT_COACH_PROMPT.to_owned(),
        };
        Ok(Self { diet, workout })
    }

    /// Prompt for a plan kind
    #[must_use]
    pub fn for_kind(&self, kind: PlanKind) -> &str {
        match kind {
            PlanKind::Diet => &self.diet,
            PlanKind::Workout => &self.workout,
        }
    }
}

async fn read_prompt(path: &Path) -> AppResult<String> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::config(format!("Failed to read prompt file {}: {e}", path.display()))
    })?;
    if text.trim().is_empty() {
        return Err(AppError::config(format!(
            "Prompt file {} is empty",
            path.display()
        )));
    }
    info!(path = %path.display(), "Loaded coach prompt override");
    Ok(text)
}

/// System prompt for the coach chat.
///
/// `bmi` is the latest reading and its category, when the user has one.
#[must_use]
pub fn chat_system_prompt(nickname: &str, bmi: Option<(f64, &str)>) -> String {
    let bmi_context = bmi.map_or_else(String::new, |(value, category)| {
        format!(
            "The user's BMI history is {value} ({}).",
            category.to_lowercase()
        )
    });

    format!(
        "You are {COACH_PERSONA}, an AI health assistant specializing in nutrition, fitness, and weight management. \
         The user prefers to be called {nickname}, unless stated otherwise in the chat. Treat it as a nickname and don't repeat it often. \
         {bmi_context}Provide science-based, practical advice. Be encouraging and empathetic, but reason logically like an actual health coach. \
         Keep responses concise, 2-3 sentences or 25-50 words, unless a longer answer is truly necessary. \
         Keep your tone professional, like a true coach."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_prompts_demand_week_key() {
        assert!(DIET_COACH_PROMPT.contains("\"week\""));
        assert!(WORKOUT_COACH_PROMPT.contains("\"week\""));
    }

    #[test]
    fn test_chat_prompt_bmi_context() {
        let prompt = chat_system_prompt("sam", Some((22.9, "Normal")));
        assert!(prompt.contains("The user's BMI history is 22.9 (normal)."));
        assert!(prompt.contains("called sam"));
        assert!(prompt.starts_with("You are Kinetic Edge"));

        let prompt = chat_system_prompt("sam", None);
        assert!(!prompt.contains("BMI history"));
    }

    #[tokio::test]
    async fn test_load_prefers_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diet.txt");
        tokio::fs::write(&path, "custom diet prompt").await.unwrap();

        let prompts = CoachPrompts::load(&PromptPaths {
            diet: Some(path),
            workout: None,
        })
        .await
        .unwrap();
        assert_eq!(prompts.for_kind(PlanKind::Diet), "custom diet prompt");
        assert_eq!(prompts.for_kind(PlanKind::Workout), WORKOUT_COACH_PROMPT);
    }

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let err = CoachPrompts::load(&PromptPaths {
            diet: Some("/nonexistent/prompt.md".into()),
            workout: None,
        })
        .await
        .unwrap_err();
        assert_eq!(err.code, kinetic_core::errors::ErrorCode::ConfigError);
    }
}
