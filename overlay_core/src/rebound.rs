//! Rebound window prediction.
//!
//! Only the most recent qualifying entry per category is used. Windows are
//! absolute UTC instants offset from that dose.

use crate::rationale;
use crate::window::ClassifiedEntry;
use crate::{ReboundWindow, SubstanceCategory};
use chrono::Duration;

/// Offsets in hours after the last dose, plus the risks to name
struct ReboundModel {
    start_hours: i64,
    end_hours: i64,
    risks: &'static [&'static str],
    route_note: &'static str,
}

const STIMULANT_RISKS: &[&str] = &["rebound anxiety", "insomnia", "mood crash", "craving"];

// Withdrawal onset depends heavily on the substance and use history, so the
// range is wide and the descriptors generic.
const OPIOID_RISKS: &[&str] = &[
    "possible withdrawal symptoms (restlessness, aches, sweating, nausea)",
    "craving",
    "timing is highly uncertain and varies by substance and history",
];

const GABAERGIC_RISKS: &[&str] = &[
    "rebound anxiety",
    "insomnia",
    "MEDICAL EMERGENCY, not a prediction: seizures are possible on abrupt cessation after regular use",
];

fn model_for(category: SubstanceCategory, vaporized: bool) -> Option<ReboundModel> {
    match category {
        SubstanceCategory::Stimulant if vaporized => Some(ReboundModel {
            start_hours: 1,
            end_hours: 4,
            risks: STIMULANT_RISKS,
            route_note: " (smoked, vaporized or inhaled: faster onset and offset)",
        }),
        SubstanceCategory::Stimulant => Some(ReboundModel {
            start_hours: 2,
            end_hours: 10,
            risks: STIMULANT_RISKS,
            route_note: "",
        }),
        SubstanceCategory::Opioid => Some(ReboundModel {
            start_hours: 4,
            end_hours: 48,
            risks: OPIOID_RISKS,
            route_note: "",
        }),
        SubstanceCategory::Gabaergic => Some(ReboundModel {
            start_hours: 6,
            end_hours: 72,
            risks: GABAERGIC_RISKS,
            route_note: "",
        }),
        SubstanceCategory::Cannabis
        | SubstanceCategory::Nicotine
        | SubstanceCategory::Psychedelic
        | SubstanceCategory::Dissociative
        | SubstanceCategory::Unknown => None,
    }
}

/// Predict the rebound window following `last`, if the category has a model.
pub fn predict(category: SubstanceCategory, last: &ClassifiedEntry<'_>) -> Option<ReboundWindow> {
    let model = model_for(category, last.is_vaporized())?;

    let window_start = last
        .taken_at
        .checked_add_signed(Duration::hours(model.start_hours))?;
    let window_end = last
        .taken_at
        .checked_add_signed(Duration::hours(model.end_hours))?;

    Some(ReboundWindow {
        category,
        window_start,
        window_end,
        risks: model.risks.iter().map(|r| r.to_string()).collect(),
        rationale: rationale::rebound(
            category,
            model.start_hours,
            model.end_hours,
            model.route_note,
        ),
    })
}
