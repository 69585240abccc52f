//! Substance classification.
//!
//! Free-text names go through three static lookups: alias → canonical key,
//! canonical key → category, and finally a fragment heuristic on the key.
//! Anything left over is `Unknown`. The tables are built once per process.

use crate::SubstanceCategory;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Result of resolving a raw substance name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    /// Normalized canonical key (alias-resolved when an alias matched).
    pub canonical: String,
    pub category: SubstanceCategory,
}

static ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        // Stimulants
        ("molly", "mdma"),
        ("ecstasy", "mdma"),
        ("xtc", "mdma"),
        ("e", "mdma"),
        ("coke", "cocaine"),
        ("blow", "cocaine"),
        ("crack", "cocaine"),
        ("speed", "amphetamine"),
        ("adderall", "amphetamine"),
        ("vyvanse", "lisdexamfetamine"),
        ("meth", "methamphetamine"),
        ("crystal", "methamphetamine"),
        ("ice", "methamphetamine"),
        ("tina", "methamphetamine"),
        ("ritalin", "methylphenidate"),
        ("concerta", "methylphenidate"),
        ("provigil", "modafinil"),
        ("meow meow", "mephedrone"),
        ("4-mmc", "mephedrone"),
        // Opioids
        ("smack", "heroin"),
        ("h", "heroin"),
        ("dope", "heroin"),
        ("diamorphine", "heroin"),
        ("oxy", "oxycodone"),
        ("oxycontin", "oxycodone"),
        ("percocet", "oxycodone"),
        ("vicodin", "hydrocodone"),
        ("norco", "hydrocodone"),
        ("dilaudid", "hydromorphone"),
        ("subutex", "buprenorphine"),
        ("suboxone", "buprenorphine"),
        ("lean", "codeine"),
        ("purple drank", "codeine"),
        ("ultram", "tramadol"),
        ("fent", "fentanyl"),
        ("kratom", "mitragynine"),
        // GABAergics
        ("xanax", "alprazolam"),
        ("xannies", "alprazolam"),
        ("bars", "alprazolam"),
        ("valium", "diazepam"),
        ("klonopin", "clonazepam"),
        ("rivotril", "clonazepam"),
        ("ativan", "lorazepam"),
        ("ambien", "zolpidem"),
        ("g", "ghb"),
        ("gina", "ghb"),
        ("booze", "alcohol"),
        ("ethanol", "alcohol"),
        ("beer", "alcohol"),
        ("wine", "alcohol"),
        ("liquor", "alcohol"),
        ("lyrica", "pregabalin"),
        ("neurontin", "gabapentin"),
        // Psychedelics
        ("acid", "lsd"),
        ("lucy", "lsd"),
        ("shrooms", "psilocybin"),
        ("mushrooms", "psilocybin"),
        ("magic mushrooms", "psilocybin"),
        ("ayahuasca", "dmt"),
        ("2c-b", "2cb"),
        // Dissociatives
        ("k", "ketamine"),
        ("ket", "ketamine"),
        ("special k", "ketamine"),
        ("pcp", "phencyclidine"),
        ("angel dust", "phencyclidine"),
        ("dxm", "dextromethorphan"),
        ("robitussin", "dextromethorphan"),
        ("laughing gas", "nitrous oxide"),
        ("nos", "nitrous oxide"),
        ("n2o", "nitrous oxide"),
        // Cannabis
        ("weed", "cannabis"),
        ("marijuana", "cannabis"),
        ("pot", "cannabis"),
        ("ganja", "cannabis"),
        ("hash", "cannabis"),
        ("thc", "cannabis"),
        ("edible", "cannabis"),
        ("edibles", "cannabis"),
        // Nicotine
        ("cigarette", "nicotine"),
        ("cigarettes", "nicotine"),
        ("cig", "nicotine"),
        ("tobacco", "nicotine"),
        ("vape", "nicotine"),
        ("snus", "nicotine"),
        ("juul", "nicotine"),
    ]
    .into_iter()
    .collect()
});

static CATEGORIES: Lazy<HashMap<&'static str, SubstanceCategory>> = Lazy::new(|| {
    use SubstanceCategory::*;
    [
        ("mdma", Stimulant),
        ("mda", Stimulant),
        ("cocaine", Stimulant),
        ("amphetamine", Stimulant),
        ("lisdexamfetamine", Stimulant),
        ("methamphetamine", Stimulant),
        ("methylphenidate", Stimulant),
        ("modafinil", Stimulant),
        ("mephedrone", Stimulant),
        ("heroin", Opioid),
        ("morphine", Opioid),
        ("oxycodone", Opioid),
        ("hydrocodone", Opioid),
        ("hydromorphone", Opioid),
        ("buprenorphine", Opioid),
        ("codeine", Opioid),
        ("tramadol", Opioid),
        ("fentanyl", Opioid),
        ("methadone", Opioid),
        ("mitragynine", Opioid),
        ("alprazolam", Gabaergic),
        ("diazepam", Gabaergic),
        ("clonazepam", Gabaergic),
        ("lorazepam", Gabaergic),
        ("zolpidem", Gabaergic),
        ("ghb", Gabaergic),
        ("gbl", Gabaergic),
        ("alcohol", Gabaergic),
        ("phenibut", Gabaergic),
        ("pregabalin", Gabaergic),
        ("gabapentin", Gabaergic),
        ("lsd", Psychedelic),
        ("psilocybin", Psychedelic),
        ("dmt", Psychedelic),
        ("mescaline", Psychedelic),
        ("2cb", Psychedelic),
        ("ketamine", Dissociative),
        ("phencyclidine", Dissociative),
        ("dextromethorphan", Dissociative),
        ("nitrous oxide", Dissociative),
        ("cannabis", Cannabis),
        ("nicotine", Nicotine),
    ]
    .into_iter()
    .collect()
});

/// Substring fallbacks for names missing from the tables. First match wins.
const FRAGMENTS: &[(&str, SubstanceCategory)] = &[
    ("amphetamine", SubstanceCategory::Stimulant),
    ("amfetamine", SubstanceCategory::Stimulant),
    ("cathinone", SubstanceCategory::Stimulant),
    ("phenidate", SubstanceCategory::Stimulant),
    ("fentanil", SubstanceCategory::Opioid),
    ("fentanyl", SubstanceCategory::Opioid),
    ("morphine", SubstanceCategory::Opioid),
    ("morphone", SubstanceCategory::Opioid),
    ("codone", SubstanceCategory::Opioid),
    ("nitazene", SubstanceCategory::Opioid),
    ("zolam", SubstanceCategory::Gabaergic),
    ("zepam", SubstanceCategory::Gabaergic),
    ("barbital", SubstanceCategory::Gabaergic),
    ("lysergic", SubstanceCategory::Psychedelic),
    ("tryptamine", SubstanceCategory::Psychedelic),
    ("cybin", SubstanceCategory::Psychedelic),
    ("ketamine", SubstanceCategory::Dissociative),
    ("cannab", SubstanceCategory::Cannabis),
    ("thc", SubstanceCategory::Cannabis),
    ("nicotin", SubstanceCategory::Nicotine),
];

/// Trim, lowercase and collapse internal whitespace.
pub fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve a raw name to its canonical key and category.
pub fn resolve(raw: &str) -> Classification {
    let normalized = normalize(raw);
    let canonical = ALIASES
        .get(normalized.as_str())
        .map(|key| (*key).to_string())
        .unwrap_or(normalized);

    let category = lookup_category(&canonical);
    Classification {
        canonical,
        category,
    }
}

/// Map a raw name to its category. Total: unrecognized input is `Unknown`.
pub fn classify(raw: &str) -> SubstanceCategory {
    resolve(raw).category
}

fn lookup_category(canonical: &str) -> SubstanceCategory {
    if canonical.is_empty() {
        return SubstanceCategory::Unknown;
    }

    if let Some(category) = CATEGORIES.get(canonical) {
        return *category;
    }

    FRAGMENTS
        .iter()
        .find(|(fragment, _)| canonical.contains(fragment))
        .map(|(_, category)| *category)
        .unwrap_or(SubstanceCategory::Unknown)
}
