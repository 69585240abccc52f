//! Core domain types for the risk overlay engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Log entries as they arrive from the activity log
//! - Substance categories and risk levels
//! - Derived stack entries and rebound windows
//! - The composed overlay result

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Input Types
// ============================================================================

/// A single substance-use record from the user's activity log.
///
/// The timestamp is kept as the raw string the log carried; it is parsed
/// on demand so that one malformed record cannot poison a whole batch.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    pub substance: String,
    #[serde(default, deserialize_with = "lenient_dose")]
    pub dose_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub dose_unit: Option<String>,
    #[serde(default)]
    pub route: Option<String>,
    pub taken_at: String,
}

impl LogEntry {
    /// Build an entry with no dose information.
    pub fn new(substance: impl Into<String>, taken_at: impl Into<String>) -> Self {
        Self {
            substance: substance.into(),
            dose_value: None,
            dose_unit: None,
            route: None,
            taken_at: taken_at.into(),
        }
    }

    /// Build an entry stamped with an already-known instant.
    pub fn at(substance: impl Into<String>, taken_at: DateTime<Utc>) -> Self {
        Self::new(substance, taken_at.to_rfc3339())
    }

    /// Attach an administration route.
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    /// Parse `taken_at`, returning `None` when it is not a usable instant.
    pub fn taken_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.taken_at)
    }

    /// Whether this entry was smoked, vaporized or inhaled.
    pub fn is_vaporized(&self) -> bool {
        self.route.as_deref().is_some_and(Route::is_vaporized)
    }
}

/// Parse a log timestamp.
///
/// Accepts RFC 3339 with any offset, or a naive date-time which is read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Parse a dose written as text. Anything that is not a finite number is `None`.
pub fn parse_dose(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Dose fields as they show up in hand-edited logs.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDose {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

/// Dose is informational only, so a malformed value drops to `None`
/// instead of rejecting the whole record.
fn lenient_dose<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match RawDose::deserialize(deserializer)? {
        RawDose::Number(value) => Some(value).filter(|v| v.is_finite()),
        RawDose::Text(raw) => parse_dose(&raw),
        RawDose::Other(_) => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match RawDose::deserialize(deserializer)? {
        RawDose::Text(raw) => Some(raw),
        RawDose::Number(_) | RawDose::Other(_) => None,
    })
}

/// Administration route helpers.
pub struct Route;

impl Route {
    const VAPORIZED_FRAGMENTS: [&'static str; 3] = ["smok", "vap", "inhal"];

    /// Smoked, vaporized and inhaled routes share a faster onset profile.
    pub fn is_vaporized(route: &str) -> bool {
        let route = route.trim().to_lowercase();
        Self::VAPORIZED_FRAGMENTS
            .iter()
            .any(|fragment| route.contains(fragment))
    }
}

// ============================================================================
// Category and Level Types
// ============================================================================

/// Pharmacological category a substance resolves to
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SubstanceCategory {
    Stimulant,
    Opioid,
    Gabaergic,
    Psychedelic,
    Dissociative,
    Cannabis,
    Nicotine,
    Unknown,
}

impl SubstanceCategory {
    /// Categories that carry a stacking model, in report order.
    pub const STACKED: [SubstanceCategory; 5] = [
        SubstanceCategory::Stimulant,
        SubstanceCategory::Opioid,
        SubstanceCategory::Gabaergic,
        SubstanceCategory::Cannabis,
        SubstanceCategory::Nicotine,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubstanceCategory::Stimulant => "stimulant",
            SubstanceCategory::Opioid => "opioid",
            SubstanceCategory::Gabaergic => "gabaergic",
            SubstanceCategory::Psychedelic => "psychedelic",
            SubstanceCategory::Dissociative => "dissociative",
            SubstanceCategory::Cannabis => "cannabis",
            SubstanceCategory::Nicotine => "nicotine",
            SubstanceCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SubstanceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity level, ordered `Low < Moderate < High < Critical`
#[derive(
    Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Derived Types
// ============================================================================

/// Same-category accumulation within that category's window
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StackEntry {
    pub category: SubstanceCategory,
    pub level: RiskLevel,
    pub count: usize,
    /// Weighted score the level was derived from.
    pub score: f64,
    pub rationale: String,
}

/// Time span after the last dose in which rebound effects are plausible
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReboundWindow {
    pub category: SubstanceCategory,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub risks: Vec<String>,
    pub rationale: String,
}

/// The composed assessment returned for one evaluation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RiskOverlayResult {
    pub overall_level: RiskLevel,
    pub warnings: Vec<String>,
    pub stacks: Vec<StackEntry>,
    pub rebound: Vec<ReboundWindow>,
    pub notes: Vec<String>,
}
