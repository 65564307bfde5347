// ABOUTME: Body-mass-index arithmetic, category classification, and progress chart shaping
// ABOUTME: Pure functions shared by the calculator, dashboard, and plan generation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Compute BMI from weight in kilograms and height in centimetres.
///
/// The result is rounded to one decimal place, so `calculate_bmi(70.0, 175.0)`
/// is `22.9`.
#[must_use]
pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    round_one_decimal(weight_kg / (height_m * height_m))
}

// Rounds from the decimal rendering so exact ties go to even (22.25 -> 22.2)
fn round_one_decimal(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

/// Validate a calculator submission
///
/// # Errors
///
/// Returns an error if either value is not a finite positive number
pub fn validate_measurement(weight_kg: f64, height_cm: f64) -> AppResult<()> {
    let positive = |v: f64| v.is_finite() && v > 0.0;
    if positive(weight_kg) && positive(height_cm) {
        Ok(())
    } else {
        Err(AppError::out_of_range(
            "Weight and height must be positive values",
        ))
    }
}

/// BMI classification bands
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    /// BMI below 18.5
    Underweight,
    /// BMI from 18.5 up to (not including) 24.9
    Normal,
    /// BMI from 24.9 up to (not including) 29.9
    Overweight,
    /// BMI of 29.9 or more
    Obese,
}

impl BmiCategory {
    /// Classify a BMI value. Every boundary is a strict `<` comparison.
    #[must_use]
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 24.9 {
            Self::Normal
        } else if bmi < 29.9 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }

    /// Machine key, as used in prompts and calorie lookup
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Underweight => "underweight",
            Self::Normal => "normal",
            Self::Overweight => "overweight",
            Self::Obese => "obese",
        }
    }

    /// Display name, as stored on BMI records
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Underweight => "Underweight",
            Self::Normal => "Normal",
            Self::Overweight => "Overweight",
            Self::Obese => "Obese",
        }
    }

    /// Chart colour
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Underweight => "#3a86ff",
            Self::Normal => "#06d6a0",
            Self::Overweight => "#ffd166",
            Self::Obese => "#ef476f",
        }
    }

    /// Short advice shown next to a reading
    #[must_use]
    pub const fn tip(self) -> BmiTip {
        match self {
            Self::Underweight => BmiTip {
                title: "Underweight Advice",
                points: &[
                    "Increase calorie intake with nutrient-dense foods",
                    "Include protein-rich foods like eggs, chicken, beans",
                    "Consider strength training 3x/week",
                ],
            },
            Self::Normal => BmiTip {
                title: "Healthy Weight Tips",
                points: &[
                    "Maintain balanced diet (fruits, veggies, whole grains)",
                    "150+ mins exercise weekly",
                    "Stay hydrated (8 glasses/day)",
                ],
            },
            Self::Overweight => BmiTip {
                title: "Overweight Advice",
                points: &[
                    "Aim for 1-2 lbs weight loss/week",
                    "Increase physical activity (walking, cycling)",
                    "Reduce sugary drinks and snacks",
                ],
            },
            Self::Obese => BmiTip {
                title: "Obesity Advice",
                points: &[
                    "Consult healthcare professional",
                    "Focus on sustainable lifestyle changes",
                    "Join support groups for motivation",
                ],
            },
        }
    }

    /// Resolve a stored category label (display name or key, any case)
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "underweight" => Some(Self::Underweight),
            "normal" => Some(Self::Normal),
            "overweight" => Some(Self::Overweight),
            "obese" => Some(Self::Obese),
            _ => None,
        }
    }
}

impl Display for BmiCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.display_name())
    }
}

/// Advice attached to a BMI category
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BmiTip {
    /// Heading
    pub title: &'static str,
    /// Bullet points
    pub points: &'static [&'static str],
}

/// Full category description returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct BmiCategoryInfo {
    /// Machine key
    pub category: &'static str,
    /// Display name
    pub name: &'static str,
    /// Chart colour
    pub color: &'static str,
    /// Advice
    pub tip: BmiTip,
}

impl From<BmiCategory> for BmiCategoryInfo {
    fn from(category: BmiCategory) -> Self {
        Self {
            category: category.key(),
            name: category.display_name(),
            color: category.color(),
            tip: category.tip(),
        }
    }
}

/// A stored BMI measurement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BmiRecord {
    /// Record ID
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Weight in kilograms
    pub weight: f64,
    /// Height in centimetres
    pub height: f64,
    /// Computed BMI
    pub bmi: f64,
    /// Category display name at the time of measurement
    pub category: String,
    /// When the measurement was taken
    pub created_at: DateTime<Utc>,
}

impl BmiRecord {
    /// Build a new record from a measurement, computing BMI and category
    #[must_use]
    pub fn measure(user_id: Uuid, weight: f64, height: f64) -> Self {
        let bmi = calculate_bmi(weight, height);
        Self {
            id: Uuid::new_v4(),
            user_id,
            weight,
            height,
            bmi,
            category: BmiCategory::from_bmi(bmi).display_name().to_owned(),
            created_at: Utc::now(),
        }
    }
}

/// Progress chart series, oldest reading first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    /// `MM/DD` labels
    pub dates: Vec<String>,
    /// BMI values
    pub bmi_values: Vec<f64>,
    /// Weights
    pub weights: Vec<f64>,
    /// Heights
    pub heights: Vec<f64>,
}

impl ChartData {
    /// Shape records (already sorted oldest first) into chart series
    #[must_use]
    pub fn from_records(records: &[BmiRecord]) -> Self {
        let mut chart = Self::default();
        for record in records {
            chart
                .dates
                .push(record.created_at.format("%m/%d").to_string());
            chart.bmi_values.push(record.bmi);
            chart.weights.push(record.weight);
            chart.heights.push(record.height);
        }
        chart
    }
}
