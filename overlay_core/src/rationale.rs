//! Human-readable text for derived results.
//!
//! Pure formatting only; scoring lives in `stacking` and `rebound`.

use crate::{RiskLevel, SubstanceCategory};

fn entries_phrase(count: usize) -> &'static str {
    if count == 1 {
        "entry"
    } else {
        "entries"
    }
}

/// Sentence describing one category's stack.
pub fn stack(
    category: SubstanceCategory,
    level: RiskLevel,
    count: usize,
    vaporized: usize,
    score: f64,
    window_hours: i64,
) -> String {
    let mut text = format!(
        "{} {} {} within the last {}h; stacking level {}.",
        count,
        category,
        entries_phrase(count),
        window_hours,
        level
    );

    if vaporized > 0 {
        let verb = if vaporized == 1 { "was" } else { "were" };
        text.push_str(&format!(
            " {} {} smoked, vaporized or inhaled, adding 0.5 each for a faster, sharper spike (score {:.1}).",
            vaporized, verb, score
        ));
    }

    text
}

/// Sentence describing a rebound window.
pub fn rebound(
    category: SubstanceCategory,
    start_hours: i64,
    end_hours: i64,
    route_note: &str,
) -> String {
    format!(
        "Based on the most recent {} entry{}: plausible rebound between {}h and {}h after that dose.",
        category, route_note, start_hours, end_hours
    )
}

/// Note listing names the classifier could not place.
pub fn unrecognized(names: &[String]) -> String {
    format!(
        "Not assessed (unrecognized substance{}): {}.",
        if names.len() == 1 { "" } else { "s" },
        names.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_rationale_plain() {
        let text = stack(SubstanceCategory::Opioid, RiskLevel::Moderate, 1, 0, 1.0, 12);
        assert_eq!(text, "1 opioid entry within the last 12h; stacking level moderate.");
    }

    #[test]
    fn test_stack_rationale_mentions_route_adjustment() {
        let text = stack(SubstanceCategory::Stimulant, RiskLevel::High, 2, 2, 3.0, 12);
        assert!(text.starts_with("2 stimulant entries within the last 12h"));
        assert!(text.contains("2 were smoked"));
        assert!(text.contains("score 3.0"));

        let single = stack(SubstanceCategory::Stimulant, RiskLevel::Moderate, 1, 1, 1.5, 12);
        assert!(single.contains("1 was smoked"));
    }

    #[test]
    fn test_unrecognized_note() {
        assert_eq!(
            unrecognized(&["unobtainium".to_string()]),
            "Not assessed (unrecognized substance): unobtainium."
        );
        assert!(unrecognized(&["a".into(), "b".into()]).contains("substances): a, b."));
    }
}
