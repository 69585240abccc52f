//! Overall level aggregation.
//!
//! Priority, highest first: a rule forcing critical, a critical stack, a rule
//! forcing high, a high stack, a moderate stack or two-plus active categories,
//! then low.

use crate::config::NotesConfig;
use crate::rules::RuleOutcome;
use crate::{RiskLevel, StackEntry};

/// Derive the overall level from stacks, rule signals and shared activity.
pub fn aggregate(stacks: &[StackEntry], rules: &RuleOutcome, active_categories: usize) -> RiskLevel {
    let stack_at = |level: RiskLevel| stacks.iter().any(|s| s.level == level);

    if rules.forces(RiskLevel::Critical) || stack_at(RiskLevel::Critical) {
        RiskLevel::Critical
    } else if rules.forces(RiskLevel::High) || stack_at(RiskLevel::High) {
        RiskLevel::High
    } else if rules.forces(RiskLevel::Moderate)
        || stack_at(RiskLevel::Moderate)
        || active_categories >= 2
    {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

/// Static safety notes for the given overall level.
pub fn safety_notes(level: RiskLevel, notes: &NotesConfig) -> Vec<String> {
    let mut out = Vec::new();
    if level >= RiskLevel::High {
        out.push(notes.do_not_redose.clone());
        out.push(notes.emergency.clone());
    }
    out.extend(notes.disclaimers.iter().cloned());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SubstanceCategory;

    fn stack(level: RiskLevel) -> StackEntry {
        StackEntry {
            category: SubstanceCategory::Stimulant,
            level,
            count: 1,
            score: 1.0,
            rationale: String::new(),
        }
    }

    fn rules(floor: RiskLevel) -> RuleOutcome {
        RuleOutcome {
            floor,
            ..RuleOutcome::default()
        }
    }

    #[test]
    fn test_empty_is_low() {
        assert_eq!(aggregate(&[], &rules(RiskLevel::Low), 0), RiskLevel::Low);
    }

    #[test]
    fn test_rule_critical_wins() {
        let stacks = vec![stack(RiskLevel::Moderate)];
        assert_eq!(
            aggregate(&stacks, &rules(RiskLevel::Critical), 2),
            RiskLevel::Critical
        );
    }

    #[test]
    fn test_overall_never_below_stack() {
        for level in [
            RiskLevel::Low,
            RiskLevel::Moderate,
            RiskLevel::High,
            RiskLevel::Critical,
        ] {
            let overall = aggregate(&[stack(level)], &rules(RiskLevel::Low), 1);
            assert!(overall >= level);
        }
    }

    #[test]
    fn test_rule_high_over_moderate_stack() {
        let stacks = vec![stack(RiskLevel::Moderate)];
        assert_eq!(aggregate(&stacks, &rules(RiskLevel::High), 2), RiskLevel::High);
    }

    #[test]
    fn test_two_active_categories_are_moderate() {
        assert_eq!(aggregate(&[], &rules(RiskLevel::Low), 2), RiskLevel::Moderate);
        assert_eq!(aggregate(&[], &rules(RiskLevel::Low), 1), RiskLevel::Low);
    }

    #[test]
    fn test_safety_notes_by_level() {
        let notes = NotesConfig::default();
        assert_eq!(safety_notes(RiskLevel::Moderate, &notes), notes.disclaimers);

        let high = safety_notes(RiskLevel::High, &notes);
        assert_eq!(high.len(), notes.disclaimers.len() + 2);
        assert_eq!(high[0], notes.do_not_redose);
        assert!(high[1].contains("cyanosis"));
    }
}
