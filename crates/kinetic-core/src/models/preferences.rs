// ABOUTME: User profile preferences used to personalise generated plans
// ABOUTME: Goal parsing, profile validation, and calorie range hints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::preferences::{MAX_AGE_YEARS, MAX_TARGET_WEIGHT_KG};
use crate::errors::{AppError, AppResult};

// ============================================================================
// Goals
// ============================================================================

/// Fitness goal selected by the user
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    /// Keep the current weight
    #[default]
    Maintenance,
    /// Lose weight
    WeightLoss,
    /// Gain weight
    WeightGain,
    /// Build muscle
    MuscleGain,
}

impl Goal {
    /// Parse a goal, coercing anything unrecognised to [`Goal::Maintenance`]
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim() {
            "weight_loss" => Self::WeightLoss,
            "weight_gain" => Self::WeightGain,
            "muscle_gain" => Self::MuscleGain,
            _ => Self::Maintenance,
        }
    }

    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Maintenance => "maintenance",
            Self::WeightLoss => "weight_loss",
            Self::WeightGain => "weight_gain",
            Self::MuscleGain => "muscle_gain",
        }
    }
}

impl Display for Goal {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Suggested daily calorie range for a BMI category and goal.
///
/// The category comparison is case-insensitive so both stored display names
/// and machine keys work.
#[must_use]
pub fn calorie_hint(bmi_category: &str, goal: Goal) -> &'static str {
    let category = bmi_category.trim().to_lowercase();
    let in_bands = |bands: &[&str]| bands.contains(&category.as_str());

    match goal {
        Goal::WeightGain => {
            if in_bands(&["underweight", "normal"]) {
                "2400-3000 kcal/day"
            } else {
                "2200-2600 kcal/day"
            }
        }
        Goal::MuscleGain => {
            if in_bands(&["normal", "overweight"]) {
                "2200-2800 kcal/day"
            } else {
                "2000-2400 kcal/day"
            }
        }
        Goal::WeightLoss => {
            if in_bands(&["overweight", "obese"]) {
                "1200-1800 kcal/day"
            } else {
                "1500-1900 kcal/day"
            }
        }
        Goal::Maintenance => {
            if in_bands(&["normal", "overweight"]) {
                "1800-2300 kcal/day"
            } else {
                "2000-2400 kcal/day"
            }
        }
    }
}

// ============================================================================
// Stored preferences
// ============================================================================

/// A user's saved profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserPreferences {
    /// Owner
    pub user_id: Uuid,
    /// Free-text dietary preferences (e.g. "vegetarian")
    pub dietary_preferences: String,
    /// Free-text allergies
    pub allergies: String,
    /// Selected goal
    pub goals: Goal,
    /// Target weight in kilograms
    pub target_weight: Option<f64>,
    /// Gender as entered
    pub gender: String,
    /// Age in years
    pub age: Option<i64>,
    /// Activity level as entered
    pub activity_level: String,
    /// Injuries, conditions, or past training history
    pub previous_history: String,
    /// Preferred cuisine
    pub preferred_cuisine: String,
    /// Preferred number of meals per day
    pub meal_frequency: String,
    /// Last update
    pub updated_at: DateTime<Utc>,
}

impl UserPreferences {
    /// Empty profile for a user who never saved one
    #[must_use]
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            dietary_preferences: String::new(),
            allergies: String::new(),
            goals: Goal::default(),
            target_weight: None,
            gender: String::new(),
            age: None,
            activity_level: String::new(),
            previous_history: String::new(),
            preferred_cuisine: String::new(),
            meal_frequency: String::new(),
            updated_at: Utc::now(),
        }
    }
}

// ============================================================================
// Update payload
// ============================================================================

/// Numeric field that clients may send either as a JSON number or as text
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum NumericInput {
    /// Sent as a JSON number
    Number(f64),
    /// Sent as a string, possibly with thousands separators
    Text(String),
}

/// Incoming profile update before validation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PreferencesUpdate {
    /// Dietary preferences
    pub dietary_preferences: String,
    /// Allergies
    pub allergies: String,
    /// Goal; unknown values become maintenance
    pub goals: String,
    /// Target weight in kilograms
    pub target_weight: Option<NumericInput>,
    /// Gender
    pub gender: String,
    /// Age in years
    pub age: Option<NumericInput>,
    /// Activity level
    pub activity_level: String,
    /// Previous history
    pub previous_history: String,
    /// Meal frequency
    pub meal_frequency: String,
    /// Preferred cuisine
    pub preferred_cuisine: String,
}

impl PreferencesUpdate {
    /// Validate the update and turn it into a storable profile
    ///
    /// # Errors
    ///
    /// Returns an error if the target weight or age is malformed or out of range
    pub fn validate(self, user_id: Uuid) -> AppResult<UserPreferences> {
        let target_weight = self
            .target_weight
            .as_ref()
            .map(parse_target_weight)
            .transpose()?
            .flatten();
        let age = self.age.as_ref().map(parse_age).transpose()?.flatten();

        Ok(UserPreferences {
            user_id,
            dietary_preferences: self.dietary_preferences.trim().to_owned(),
            allergies: self.allergies.trim().to_owned(),
            goals: Goal::parse_lenient(&self.goals),
            target_weight,
            gender: self.gender.trim().to_owned(),
            age,
            activity_level: self.activity_level.trim().to_owned(),
            previous_history: self.previous_history.trim().to_owned(),
            preferred_cuisine: self.preferred_cuisine.trim().to_owned(),
            meal_frequency: self.meal_frequency.trim().to_owned(),
            updated_at: Utc::now(),
        })
    }
}

/// Parse a target weight; blank text means "not set"
///
/// # Errors
///
/// Returns an error when the value is not numeric or not in `(0, 500]`
pub fn parse_target_weight(input: &NumericInput) -> AppResult<Option<f64>> {
    let value = match input {
        NumericInput::Number(n) => *n,
        NumericInput::Text(text) => {
            let cleaned = text.replace(',', "");
            let cleaned = cleaned.trim();
            if cleaned.is_empty() {
                return Ok(None);
            }
            cleaned.parse::<f64>().map_err(|_| {
                AppError::invalid_input("Please enter a valid target weight (numbers only)")
            })?
        }
    };

    if !value.is_finite() || value <= 0.0 || value > MAX_TARGET_WEIGHT_KG {
        return Err(AppError::out_of_range(
            "Target weight must be a positive number less than 500kg",
        ));
    }
    Ok(Some(value))
}

/// Parse an age; blank text means "not set"
///
/// # Errors
///
/// Returns an error when the value is not an integer or not in `0..=120`
pub fn parse_age(input: &NumericInput) -> AppResult<Option<i64>> {
    let age = match input {
        NumericInput::Number(n) => {
            if n.fract() != 0.0 || !n.is_finite() {
                return Err(AppError::invalid_input(
                    "Please enter a valid age (numbers only)",
                ));
            }
            *n as i64
        }
        NumericInput::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed.parse::<i64>().map_err(|_| {
                AppError::invalid_input("Please enter a valid age (numbers only)")
            })?
        }
    };

    if !(0..=MAX_AGE_YEARS).contains(&age) {
        return Err(AppError::out_of_range("Please enter a valid age (0-120)"));
    }
    Ok(Some(age))
}
