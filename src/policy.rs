//! Risk scoring policies.
//!
//! A policy bundles the band tables for each sub-score and the cutoffs that
//! turn a composite score into a [`RiskCategory`]. Two presets ship with the
//! crate; neither is treated as the default truth by the scorer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RiskError;
use crate::models::RiskCategory;

/// Values at or above `min` score `score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band<T> {
    pub min: T,
    pub score: u8,
}

/// Bands evaluated highest minimum first; values below every band score `floor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandTable<T> {
    pub bands: Vec<Band<T>>,
    pub floor: u8,
}

impl<T: PartialOrd + Copy> BandTable<T> {
    pub fn score(&self, value: T) -> u8 {
        self.bands
            .iter()
            .find(|band| value >= band.min)
            .map(|band| band.score)
            .unwrap_or(self.floor)
    }

    pub fn max_score(&self) -> u8 {
        self.bands
            .iter()
            .map(|band| band.score)
            .fold(self.floor, u8::max)
    }

    fn validate(&self, name: &str) -> Result<(), RiskError> {
        for pair in self.bands.windows(2) {
            if pair[0].min.partial_cmp(&pair[1].min) != Some(std::cmp::Ordering::Greater) {
                return Err(RiskError::InvalidPolicy(format!(
                    "{name} band minimums must be strictly descending"
                )));
            }
            if pair[0].score >= pair[1].score {
                return Err(RiskError::InvalidPolicy(format!(
                    "{name} band scores must increase as minimums decrease"
                )));
            }
        }
        if let Some(last) = self.bands.last() {
            if last.score >= self.floor {
                return Err(RiskError::InvalidPolicy(format!(
                    "{name} floor must exceed every band score"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryCutoff {
    pub max_score: u8,
    pub category: RiskCategory,
}

/// Composite scores up to each `max_score` map to its category, checked in
/// ascending order; anything above the last cutoff is `fallback`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScale {
    pub cutoffs: Vec<CategoryCutoff>,
    pub fallback: RiskCategory,
}

impl CategoryScale {
    pub fn categorize(&self, composite: u8) -> RiskCategory {
        self.cutoffs
            .iter()
            .find(|cutoff| composite <= cutoff.max_score)
            .map(|cutoff| cutoff.category)
            .unwrap_or(self.fallback)
    }

    fn validate(&self) -> Result<(), RiskError> {
        for pair in self.cutoffs.windows(2) {
            if pair[0].max_score >= pair[1].max_score {
                return Err(RiskError::InvalidPolicy(
                    "category cutoffs must be strictly ascending".to_string(),
                ));
            }
            if pair[0].category >= pair[1].category {
                return Err(RiskError::InvalidPolicy(
                    "category cutoffs must increase in severity".to_string(),
                ));
            }
        }
        if self.cutoffs.iter().any(|cutoff| cutoff.category >= self.fallback) {
            return Err(RiskError::InvalidPolicy(
                "fallback category must be more severe than every cutoff".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPolicy {
    pub name: String,
    pub version: u32,
    pub gpa: BandTable<f64>,
    pub attendance: BandTable<f64>,
    pub activity: BandTable<u32>,
    pub categories: CategoryScale,
}

fn band<T>(min: T, score: u8) -> Band<T> {
    Band { min, score }
}

fn cutoff(max_score: u8, category: RiskCategory) -> CategoryCutoff {
    CategoryCutoff { max_score, category }
}

fn standard_gpa_bands() -> BandTable<f64> {
    BandTable {
        bands: vec![band(3.5, 0), band(3.0, 1), band(2.5, 2), band(2.0, 3)],
        floor: 4,
    }
}

fn standard_attendance_bands() -> BandTable<f64> {
    BandTable {
        bands: vec![band(95.0, 0), band(90.0, 1), band(80.0, 2), band(70.0, 3)],
        floor: 4,
    }
}

impl RiskPolicy {
    /// Three activity bands and three categories (Low/Medium/High).
    pub fn policy_a() -> Self {
        Self {
            name: "policy-a".to_string(),
            version: 1,
            gpa: standard_gpa_bands(),
            attendance: standard_attendance_bands(),
            activity: BandTable {
                bands: vec![band(2, 0), band(1, 1)],
                floor: 2,
            },
            categories: CategoryScale {
                cutoffs: vec![cutoff(2, RiskCategory::Low), cutoff(5, RiskCategory::Medium)],
                fallback: RiskCategory::High,
            },
        }
    }

    /// Four activity bands and four categories (Low/Medium/High/Critical).
    pub fn policy_b() -> Self {
        Self {
            name: "policy-b".to_string(),
            version: 1,
            gpa: standard_gpa_bands(),
            attendance: standard_attendance_bands(),
            activity: BandTable {
                bands: vec![band(3, 0), band(2, 1), band(1, 2)],
                floor: 3,
            },
            categories: CategoryScale {
                cutoffs: vec![
                    cutoff(2, RiskCategory::Low),
                    cutoff(5, RiskCategory::Medium),
                    cutoff(8, RiskCategory::High),
                ],
                fallback: RiskCategory::Critical,
            },
        }
    }

    pub fn preset(preset: PolicyPreset) -> Self {
        match preset {
            PolicyPreset::A => Self::policy_a(),
            PolicyPreset::B => Self::policy_b(),
        }
    }

    pub fn presets() -> Vec<Self> {
        vec![Self::policy_a(), Self::policy_b()]
    }

    /// Parse and validate a policy from JSON.
    pub fn from_json(json: &str) -> Result<Self, RiskError> {
        let policy: RiskPolicy = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), RiskError> {
        if self.name.trim().is_empty() {
            return Err(RiskError::InvalidPolicy("policy name must not be empty".to_string()));
        }
        if self
            .gpa
            .bands
            .iter()
            .chain(self.attendance.bands.iter())
            .any(|band| !band.min.is_finite())
        {
            return Err(RiskError::InvalidPolicy("band minimums must be finite".to_string()));
        }
        self.gpa.validate("gpa")?;
        self.attendance.validate("attendance")?;
        self.activity.validate("activity")?;
        let widest = u16::from(self.gpa.max_score())
            + u16::from(self.attendance.max_score())
            + u16::from(self.activity.max_score());
        if widest > u16::from(u8::MAX) {
            return Err(RiskError::InvalidPolicy(
                "composite score range exceeds 255".to_string(),
            ));
        }
        self.categories.validate()
    }

    pub fn id(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }

    pub fn max_composite(&self) -> u8 {
        self.gpa
            .max_score()
            .saturating_add(self.attendance.max_score())
            .saturating_add(self.activity.max_score())
    }
}

/// Built-in policy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyPreset {
    A,
    B,
}

impl FromStr for PolicyPreset {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "policy-a" => Ok(PolicyPreset::A),
            "b" | "policy-b" => Ok(PolicyPreset::B),
            _ => Err(RiskError::InvalidPolicy(format!("unknown preset '{s}', expected a or b"))),
        }
    }
}

impl fmt::Display for PolicyPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyPreset::A => f.write_str("policy-a"),
            PolicyPreset::B => f.write_str("policy-b"),
        }
    }
}
