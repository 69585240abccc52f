//! Temporal selection of log entries.
//!
//! Each stacked category looks back over its own window. An entry qualifies
//! when `0 <= now - taken_at <= window`; future-dated entries never qualify.

use crate::classifier;
use crate::config::WindowConfig;
use crate::{LogEntry, SubstanceCategory};
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// A log entry with its timestamp parsed and its substance resolved
#[derive(Clone, Debug)]
pub struct ClassifiedEntry<'a> {
    pub entry: &'a LogEntry,
    pub canonical: String,
    pub category: SubstanceCategory,
    pub taken_at: DateTime<Utc>,
}

impl ClassifiedEntry<'_> {
    pub fn is_vaporized(&self) -> bool {
        self.entry.is_vaporized()
    }
}

/// Whether an instant falls inside `[now - window, now]`.
pub fn within(taken_at: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
    let age = now - taken_at;
    age >= Duration::zero() && age <= window
}

/// Parse and classify every entry, dropping those with unusable timestamps.
pub fn classify_entries(entries: &[LogEntry]) -> Vec<ClassifiedEntry<'_>> {
    entries
        .iter()
        .filter_map(|entry| {
            let Some(taken_at) = entry.taken_at_utc() else {
                tracing::debug!(
                    "Excluding entry for {:?}: unparsable timestamp {:?}",
                    entry.substance,
                    entry.taken_at
                );
                return None;
            };
            let classification = classifier::resolve(&entry.substance);
            Some(ClassifiedEntry {
                entry,
                canonical: classification.canonical,
                category: classification.category,
                taken_at,
            })
        })
        .collect()
}

/// Classified entries of `category` that fall inside its window at `now`.
///
/// Categories without a stacking window never select anything.
pub fn select_classified<'a>(
    classified: &[ClassifiedEntry<'a>],
    category: SubstanceCategory,
    now: DateTime<Utc>,
    windows: &WindowConfig,
) -> Vec<ClassifiedEntry<'a>> {
    let Some(window) = windows.window_for(category) else {
        return Vec::new();
    };

    classified
        .iter()
        .filter(|c| c.category == category && within(c.taken_at, now, window))
        .cloned()
        .collect()
}

/// Entries of `category` that fall inside its window at `now`.
pub fn select<'a>(
    entries: &'a [LogEntry],
    category: SubstanceCategory,
    now: DateTime<Utc>,
    windows: &WindowConfig,
) -> Vec<&'a LogEntry> {
    select_classified(&classify_entries(entries), category, now, windows)
        .into_iter()
        .map(|c| c.entry)
        .collect()
}

/// Qualifying entries bucketed by stacked category
#[derive(Clone, Debug, Default)]
pub struct ActiveSet<'a> {
    buckets: BTreeMap<SubstanceCategory, Vec<ClassifiedEntry<'a>>>,
}

impl<'a> ActiveSet<'a> {
    /// Bucket already-classified entries into their category windows.
    ///
    /// Empty categories get no bucket.
    pub fn build(
        classified: &[ClassifiedEntry<'a>],
        now: DateTime<Utc>,
        windows: &WindowConfig,
    ) -> Self {
        let buckets = SubstanceCategory::STACKED
            .iter()
            .map(|category| (*category, select_classified(classified, *category, now, windows)))
            .filter(|(_, selected)| !selected.is_empty())
            .collect();

        Self { buckets }
    }

    pub fn entries(&self, category: SubstanceCategory) -> &[ClassifiedEntry<'a>] {
        self.buckets
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_active(&self, category: SubstanceCategory) -> bool {
        !self.entries(category).is_empty()
    }

    /// Number of distinct canonical substances qualifying in `category`.
    pub fn distinct_substances(&self, category: SubstanceCategory) -> usize {
        self.entries(category)
            .iter()
            .map(|c| c.canonical.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Latest qualifying entry in `category`.
    pub fn most_recent(&self, category: SubstanceCategory) -> Option<&ClassifiedEntry<'a>> {
        self.entries(category).iter().max_by_key(|c| c.taken_at)
    }
}

/// Distinct known categories with any entry inside `window`.
pub fn active_categories(
    classified: &[ClassifiedEntry<'_>],
    now: DateTime<Utc>,
    window: Duration,
) -> BTreeSet<SubstanceCategory> {
    classified
        .iter()
        .filter(|c| c.category != SubstanceCategory::Unknown)
        .filter(|c| within(c.taken_at, now, window))
        .map(|c| c.category)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let window = Duration::hours(12);
        assert!(within(now(), now(), window));
        assert!(within(now() - Duration::hours(12), now(), window));
        assert!(!within(now() - Duration::hours(12) - Duration::seconds(1), now(), window));
        assert!(!within(now() + Duration::minutes(1), now(), window));
    }

    #[test]
    fn test_select_filters_by_category_and_window() {
        let entries = vec![
            LogEntry::at("cocaine", now() - Duration::hours(1)),
            LogEntry::at("cocaine", now() - Duration::hours(13)),
            LogEntry::at("heroin", now() - Duration::hours(1)),
            LogEntry::at("cocaine", now() + Duration::hours(1)),
        ];

        let selected = select(&entries, SubstanceCategory::Stimulant, now(), &WindowConfig::default());
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].substance, "cocaine");
    }

    #[test]
    fn test_gabaergic_uses_wider_window() {
        let entries = vec![LogEntry::at("diazepam", now() - Duration::hours(20))];
        let selected = select(&entries, SubstanceCategory::Gabaergic, now(), &WindowConfig::default());
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn test_unstacked_category_selects_nothing() {
        let entries = vec![LogEntry::at("lsd", now() - Duration::hours(1))];
        let selected = select(&entries, SubstanceCategory::Psychedelic, now(), &WindowConfig::default());
        assert!(selected.is_empty());
    }

    #[test]
    fn test_unparsable_timestamps_are_dropped() {
        let entries = vec![
            LogEntry::new("cocaine", "not a time"),
            LogEntry::at("cocaine", now()),
        ];
        assert_eq!(classify_entries(&entries).len(), 1);
    }

    #[test]
    fn test_distinct_substances_use_canonical_keys() {
        let entries = vec![
            LogEntry::at("Xanax", now() - Duration::hours(1)),
            LogEntry::at("alprazolam", now() - Duration::hours(2)),
            LogEntry::at("diazepam", now() - Duration::hours(3)),
        ];
        let classified = classify_entries(&entries);
        let active = ActiveSet::build(&classified, now(), &WindowConfig::default());

        assert_eq!(active.entries(SubstanceCategory::Gabaergic).len(), 3);
        assert_eq!(active.distinct_substances(SubstanceCategory::Gabaergic), 2);
        assert_eq!(
            active.most_recent(SubstanceCategory::Gabaergic).unwrap().canonical,
            "alprazolam"
        );
        assert!(!active.is_active(SubstanceCategory::Opioid));
    }

    #[test]
    fn test_active_set_matches_select() {
        let entries = vec![
            LogEntry::at("cocaine", now() - Duration::hours(1)),
            LogEntry::at("cocaine", now() - Duration::hours(13)),
            LogEntry::at("heroin", now() - Duration::hours(11)),
            LogEntry::at("diazepam", now() - Duration::hours(20)),
            LogEntry::at("weed", now() + Duration::hours(1)),
            LogEntry::at("nicotine", now() - Duration::hours(5)),
            LogEntry::at("lsd", now() - Duration::hours(1)),
            LogEntry::new("heroin", "garbage"),
        ];
        let mut windows = WindowConfig::default();
        windows.opioid = 10;

        let classified = classify_entries(&entries);
        let active = ActiveSet::build(&classified, now(), &windows);

        for category in SubstanceCategory::STACKED.iter() {
            let from_set: Vec<&LogEntry> = active.entries(*category).iter().map(|c| c.entry).collect();
            let selected = select(&entries, *category, now(), &windows);
            assert_eq!(from_set, selected, "mismatch for {}", category);
            assert_eq!(active.is_active(*category), !selected.is_empty());
        }
        assert!(!active.is_active(SubstanceCategory::Opioid));
        assert!(active.is_active(SubstanceCategory::Gabaergic));
    }

    #[test]
    fn test_active_categories_skip_unknown() {
        let entries = vec![
            LogEntry::at("lsd", now() - Duration::hours(2)),
            LogEntry::at("weed", now() - Duration::hours(3)),
            LogEntry::at("unobtainium", now() - Duration::hours(1)),
        ];
        let classified = classify_entries(&entries);
        let active = active_categories(&classified, now(), Duration::hours(24));
        assert_eq!(active.len(), 2);
        assert!(active.contains(&SubstanceCategory::Psychedelic));
        assert!(active.contains(&SubstanceCategory::Cannabis));
    }
}
