//! Cross-category interaction rules.
//!
//! Every rule is evaluated on each call. Table order fixes message order,
//! and each rule fires at most once per evaluation.

use crate::window::ActiveSet;
use crate::{RiskLevel, SubstanceCategory};

/// When a rule fires
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleCondition {
    /// Both categories have qualifying entries.
    BothActive(SubstanceCategory, SubstanceCategory),
    /// At least `at_least` distinct substances qualify in one category.
    DistinctSubstances {
        category: SubstanceCategory,
        at_least: usize,
    },
    /// The category has any qualifying entry.
    Active(SubstanceCategory),
}

impl RuleCondition {
    fn holds(&self, active: &ActiveSet<'_>) -> bool {
        match *self {
            RuleCondition::BothActive(a, b) => active.is_active(a) && active.is_active(b),
            RuleCondition::DistinctSubstances { category, at_least } => {
                active.distinct_substances(category) >= at_least
            }
            RuleCondition::Active(category) => active.is_active(category),
        }
    }
}

/// What a fired rule contributes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleEffect {
    /// Emit a warning and raise the overall level to at least `floor`.
    Warning {
        floor: RiskLevel,
        message: &'static str,
    },
    /// Emit the configured hydration reminder as a note. Not a risk signal.
    HydrationNote,
}

/// A fixed interaction rule
#[derive(Clone, Copy, Debug)]
pub struct InteractionRule {
    pub id: &'static str,
    pub condition: RuleCondition,
    pub effect: RuleEffect,
}

pub static RULES: &[InteractionRule] = &[
    InteractionRule {
        id: "opioid_gabaergic",
        condition: RuleCondition::BothActive(SubstanceCategory::Opioid, SubstanceCategory::Gabaergic),
        effect: RuleEffect::Warning {
            floor: RiskLevel::Critical,
            message: "CRITICAL: opioids combined with GABAergic depressants (benzodiazepines, alcohol, GHB, gabapentinoids) sharply raise the risk of fatal respiratory depression.",
        },
    },
    InteractionRule {
        id: "stimulant_opioid",
        condition: RuleCondition::BothActive(SubstanceCategory::Stimulant, SubstanceCategory::Opioid),
        effect: RuleEffect::Warning {
            floor: RiskLevel::High,
            message: "Stimulants can mask opioid sedation; overdose risk may appear later, once the stimulant wears off.",
        },
    },
    InteractionRule {
        id: "stimulant_cannabis",
        condition: RuleCondition::BothActive(SubstanceCategory::Stimulant, SubstanceCategory::Cannabis),
        effect: RuleEffect::Warning {
            floor: RiskLevel::Moderate,
            message: "Stimulants with cannabis can increase anxiety, paranoia and a racing heart (tachycardia).",
        },
    },
    InteractionRule {
        id: "multiple_opioids",
        condition: RuleCondition::DistinctSubstances {
            category: SubstanceCategory::Opioid,
            at_least: 2,
        },
        effect: RuleEffect::Warning {
            floor: RiskLevel::Critical,
            message: "CRITICAL: more than one opioid in the same window potentiates effects and raises overdose risk.",
        },
    },
    InteractionRule {
        id: "multiple_gabaergics",
        condition: RuleCondition::DistinctSubstances {
            category: SubstanceCategory::Gabaergic,
            at_least: 2,
        },
        effect: RuleEffect::Warning {
            floor: RiskLevel::Critical,
            message: "CRITICAL: combining different GABAergic depressants compounds sedation and breathing suppression.",
        },
    },
    InteractionRule {
        id: "stimulant_hydration",
        condition: RuleCondition::Active(SubstanceCategory::Stimulant),
        effect: RuleEffect::HydrationNote,
    },
];

/// Combined output of the rule set
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleOutcome {
    pub fired: Vec<&'static str>,
    pub warnings: Vec<String>,
    pub notes: Vec<String>,
    /// Highest level any fired rule forces; `Low` when none does.
    pub floor: RiskLevel,
}

impl RuleOutcome {
    pub fn forces(&self, level: RiskLevel) -> bool {
        self.floor >= level
    }
}

/// Evaluate every rule against the active set.
pub fn evaluate_rules(active: &ActiveSet<'_>, hydration_note: &str) -> RuleOutcome {
    let mut outcome = RuleOutcome::default();

    for rule in RULES {
        if !rule.condition.holds(active) || outcome.fired.contains(&rule.id) {
            continue;
        }

        tracing::debug!("Interaction rule fired: {}", rule.id);
        outcome.fired.push(rule.id);

        match rule.effect {
            RuleEffect::Warning { floor, message } => {
                if !outcome.warnings.iter().any(|w| w == message) {
                    outcome.warnings.push(message.to_string());
                }
                outcome.floor = outcome.floor.max(floor);
            }
            RuleEffect::HydrationNote => {
                if !outcome.notes.iter().any(|n| n == hydration_note) {
                    outcome.notes.push(hydration_note.to_string());
                }
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WindowConfig;
    use crate::window::classify_entries;
    use crate::LogEntry;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn run(names: &[&str]) -> RuleOutcome {
        let entries: Vec<LogEntry> = names
            .iter()
            .map(|n| LogEntry::at(*n, now() - Duration::hours(1)))
            .collect();
        let classified = classify_entries(&entries);
        let active = ActiveSet::build(&classified, now(), &WindowConfig::default());
        evaluate_rules(&active, "hydrate")
    }

    #[test]
    fn test_no_entries_no_rules() {
        let outcome = run(&[]);
        assert!(outcome.fired.is_empty());
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.floor, RiskLevel::Low);
    }

    #[test]
    fn test_opioid_gabaergic_is_critical() {
        let outcome = run(&["heroin", "diazepam"]);
        assert_eq!(outcome.fired, vec!["opioid_gabaergic"]);
        assert!(outcome.warnings[0].contains("respiratory depression"));
        assert!(outcome.forces(RiskLevel::Critical));
    }

    #[test]
    fn test_stimulant_opioid_is_high() {
        let outcome = run(&["cocaine", "oxycodone"]);
        assert_eq!(outcome.floor, RiskLevel::High);
        assert!(outcome.fired.contains(&"stimulant_opioid"));
        assert_eq!(outcome.notes, vec!["hydrate".to_string()]);
    }

    #[test]
    fn test_stimulant_cannabis_is_moderate() {
        let outcome = run(&["mdma", "weed"]);
        assert_eq!(outcome.floor, RiskLevel::Moderate);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("tachycardia"));
    }

    #[test]
    fn test_distinct_opioids_are_critical() {
        let outcome = run(&["heroin", "fentanyl"]);
        assert_eq!(outcome.fired, vec!["multiple_opioids"]);
        assert_eq!(outcome.floor, RiskLevel::Critical);
    }

    #[test]
    fn test_alias_does_not_count_as_second_substance() {
        let outcome = run(&["xanax", "alprazolam"]);
        assert!(outcome.fired.is_empty());

        let outcome = run(&["xanax", "booze"]);
        assert_eq!(outcome.fired, vec!["multiple_gabaergics"]);
    }

    #[test]
    fn test_hydration_note_once() {
        let outcome = run(&["cocaine", "cocaine", "speed"]);
        assert_eq!(outcome.notes.len(), 1);
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.floor, RiskLevel::Low);
    }

    #[test]
    fn test_message_order_is_table_order() {
        let outcome = run(&["heroin", "fentanyl", "diazepam", "cocaine", "weed"]);
        assert_eq!(
            outcome.fired,
            vec![
                "opioid_gabaergic",
                "stimulant_opioid",
                "stimulant_cannabis",
                "multiple_opioids",
                "stimulant_hydration"
            ]
        );
        assert_eq!(outcome.warnings.len(), 4);
    }
}
