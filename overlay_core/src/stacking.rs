//! Stack-level evaluation.
//!
//! Score is the qualifying count. Stimulants add 0.5 per smoked, vaporized
//! or inhaled entry. The score maps through a per-category step function.

use crate::config::{EngineConfig, StackThresholds};
use crate::rationale;
use crate::window::ClassifiedEntry;
use crate::{RiskLevel, StackEntry, SubstanceCategory};

/// Extra weight per vaporized stimulant entry.
pub const VAPORIZED_BONUS: f64 = 0.5;

/// Weighted score and the number of vaporized entries that contributed.
pub fn score(entries: &[ClassifiedEntry<'_>], category: SubstanceCategory) -> (f64, usize) {
    let count = entries.len() as f64;
    if category != SubstanceCategory::Stimulant {
        return (count, 0);
    }

    let vaporized = entries.iter().filter(|c| c.is_vaporized()).count();
    (count + VAPORIZED_BONUS * vaporized as f64, vaporized)
}

/// Monotonic step function from score to level.
pub fn level_for(score: f64, thresholds: &StackThresholds) -> RiskLevel {
    if score >= thresholds.critical_at {
        RiskLevel::Critical
    } else if score >= thresholds.high_at {
        RiskLevel::High
    } else if score >= thresholds.moderate_at {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

/// Build the stack entry for one category's qualifying entries.
///
/// Categories without thresholds always report `Low`.
pub fn evaluate(
    entries: &[ClassifiedEntry<'_>],
    category: SubstanceCategory,
    config: &EngineConfig,
) -> StackEntry {
    let (score, vaporized) = score(entries, category);
    let level = config
        .thresholds
        .for_category(category)
        .map(|t| level_for(score, t))
        .unwrap_or(RiskLevel::Low);
    let window_hours = config.windows.hours_for(category).unwrap_or(0);

    tracing::debug!(
        "Stack {}: count={} vaporized={} score={:.1} level={}",
        category,
        entries.len(),
        vaporized,
        score,
        level
    );

    StackEntry {
        category,
        level,
        count: entries.len(),
        score,
        rationale: rationale::stack(category, level, entries.len(), vaporized, score, window_hours),
    }
}
