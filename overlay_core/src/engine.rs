//! Risk overlay engine.
//!
//! A pure transform `(entries, now) -> RiskOverlayResult`:
//! 1. Parse and classify each entry (unparsable timestamps drop out)
//! 2. Bucket entries into their category windows
//! 3. Score one stack per active category
//! 4. Run the cross-category rules
//! 5. Predict rebound windows from the latest entry per category
//! 6. Aggregate the overall level and attach notes
//!
//! `now` is always supplied by the caller; the engine never reads a clock.

use crate::aggregate::{aggregate, safety_notes};
use crate::config::EngineConfig;
use crate::rules::evaluate_rules;
use crate::window::{active_categories, classify_entries, within, ActiveSet, ClassifiedEntry};
use crate::{rationale, rebound, stacking};
use crate::{LogEntry, RiskOverlayResult, SubstanceCategory};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;

/// Assess entries with the default configuration.
pub fn assess(entries: &[LogEntry], now: DateTime<Utc>) -> RiskOverlayResult {
    assess_with(entries, now, EngineConfig::shared_default())
}

/// Assess entries with an injected configuration.
pub fn assess_with(
    entries: &[LogEntry],
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> RiskOverlayResult {
    let classified = classify_entries(entries);
    let active = ActiveSet::build(&classified, now, &config.windows);

    let stacks: Vec<_> = SubstanceCategory::STACKED
        .iter()
        .filter(|c| active.is_active(**c))
        .map(|c| stacking::evaluate(active.entries(*c), *c, config))
        .collect();

    let rules = evaluate_rules(&active, &config.notes.hydration);

    let rebound: Vec<_> = SubstanceCategory::STACKED
        .iter()
        .filter_map(|c| active.most_recent(*c).and_then(|last| rebound::predict(*c, last)))
        .collect();

    let broadest = config.windows.broadest();
    let shared = active_categories(&classified, now, broadest).len();
    let overall_level = aggregate(&stacks, &rules, shared);

    let mut notes = rules.notes.clone();
    let unrecognized = unrecognized_names(&classified, now, broadest);
    if !unrecognized.is_empty() {
        notes.push(rationale::unrecognized(&unrecognized));
    }
    notes.extend(safety_notes(overall_level, &config.notes));

    tracing::info!(
        "Assessed {} entries ({} usable): overall={} stacks={} warnings={} rebound={}",
        entries.len(),
        classified.len(),
        overall_level,
        stacks.len(),
        rules.warnings.len(),
        rebound.len()
    );

    RiskOverlayResult {
        overall_level,
        warnings: rules.warnings,
        stacks,
        rebound,
        notes,
    }
}

/// Sorted, deduplicated names that resolved to `Unknown` within `window`.
fn unrecognized_names(
    classified: &[ClassifiedEntry<'_>],
    now: DateTime<Utc>,
    window: Duration,
) -> Vec<String> {
    classified
        .iter()
        .filter(|c| c.category == SubstanceCategory::Unknown && !c.canonical.is_empty())
        .filter(|c| within(c.taken_at, now, window))
        .map(|c| c.canonical.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RiskLevel;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_input_baseline() {
        crate::logging::init_test();
        let result = assess(&[], now());

        assert_eq!(result.overall_level, RiskLevel::Low);
        assert!(result.warnings.is_empty());
        assert!(result.stacks.is_empty());
        assert!(result.rebound.is_empty());
        assert!(!result.notes.is_empty());
    }

    #[test]
    fn test_stacks_follow_category_order() {
        let entries = vec![
            LogEntry::at("nicotine", now() - Duration::hours(1)),
            LogEntry::at("weed", now() - Duration::hours(1)),
            LogEntry::at("cocaine", now() - Duration::hours(1)),
        ];
        let result = assess(&entries, now());
        let categories: Vec<_> = result.stacks.iter().map(|s| s.category).collect();
        assert_eq!(
            categories,
            vec![
                SubstanceCategory::Stimulant,
                SubstanceCategory::Cannabis,
                SubstanceCategory::Nicotine
            ]
        );
    }

    #[test]
    fn test_unrecognized_note() {
        let entries = vec![
            LogEntry::at("Unobtainium", now() - Duration::hours(1)),
            LogEntry::at("unobtainium ", now() - Duration::hours(2)),
            LogEntry::at("Mystery Pill", now() - Duration::hours(3)),
        ];
        let result = assess(&entries, now());
        assert!(result
            .notes
            .contains(&"Not assessed (unrecognized substances): mystery pill, unobtainium.".to_string()));
    }

    #[test]
    fn test_stale_unknown_is_not_listed() {
        let entries = vec![
            LogEntry::at("Mystery Pill", now() - Duration::hours(30)),
            LogEntry::at("cocaine", now() - Duration::hours(1)),
        ];
        let result = assess(&entries, now());
        assert!(!result.notes.iter().any(|n| n.starts_with("Not assessed")));
    }

    #[test]
    fn test_high_level_adds_safety_notes() {
        let entries = vec![
            LogEntry::at("cocaine", now() - Duration::hours(1)),
            LogEntry::at("heroin", now() - Duration::hours(1)),
        ];
        let config = EngineConfig::default();
        let result = assess_with(&entries, now(), &config);

        assert_eq!(result.overall_level, RiskLevel::High);
        assert_eq!(result.notes[0], config.notes.hydration);
        assert!(result.notes.contains(&config.notes.do_not_redose));
        assert!(result.notes.contains(&config.notes.emergency));
        assert!(result.notes.ends_with(&config.notes.disclaimers));
    }

    #[test]
    fn test_injected_window_changes_selection() {
        let entries = vec![LogEntry::at("cocaine", now() - Duration::hours(10))];
        let mut config = EngineConfig::default();
        config.windows.stimulant = 6;

        let result = assess_with(&entries, now(), &config);
        assert!(result.stacks.is_empty());
        assert_eq!(result.overall_level, RiskLevel::Low);
    }

    #[test]
    fn test_two_categories_in_shared_window_are_moderate() {
        let entries = vec![
            LogEntry::at("lsd", now() - Duration::hours(20)),
            LogEntry::at("nicotine", now() - Duration::hours(1)),
        ];
        let result = assess(&entries, now());
        assert_eq!(result.stacks.len(), 1);
        assert_eq!(result.stacks[0].level, RiskLevel::Low);
        assert_eq!(result.overall_level, RiskLevel::Moderate);
    }
}
