//! Keyword tables driving segmentation, classification and risk scoring.
//!
//! The tables are plain ordered data. Order matters in two places: category
//! groups are tested first to last, and the first group with a hit wins.
//! Everything else is a presence test, so the order of phrases inside a list
//! only affects the order in which matched indicators are reported.

use crate::types::ClauseType;

/// Words whose presence on a line marks the start of a new clause.
pub const CLAUSE_INDICATORS: &[&str] = &[
    "clause",
    "section",
    "article",
    "term",
    "condition",
    "liability",
    "payment",
    "termination",
    "confidentiality",
    "indemnification",
    "warranty",
    "limitation",
];

/// Category keyword groups in priority order.
pub const CATEGORY_KEYWORDS: &[(ClauseType, &[&str])] = &[
    (
        ClauseType::Liability,
        &["liability", "indemnif", "warrant", "damage"],
    ),
    (
        ClauseType::Financial,
        &["payment", "fee", "price", "cost", "charge"],
    ),
    (
        ClauseType::Termination,
        &["terminate", "cancel", "expir", "end"],
    ),
    (
        ClauseType::Confidentiality,
        &["confidential", "proprietary", "secret", "private"],
    ),
    (
        ClauseType::IntellectualProperty,
        &["intellectual", "copyright", "patent", "trademark"],
    ),
    (
        ClauseType::ForceMajeure,
        &["force majeure", "act of god", "unforeseen"],
    ),
];

pub const HIGH_RISK_TERMS: &[&str] = &[
    "unlimited liability",
    "no warranty",
    "perpetual",
    "irrevocable",
    "indemnify",
    "waive all rights",
    "penalty",
    "liquidated damages",
    "exclusive",
    "non-compete",
];

pub const MEDIUM_RISK_TERMS: &[&str] = &[
    "may terminate",
    "at our discretion",
    "subject to change",
    "without notice",
    "as-is",
    "reasonable efforts",
];

pub const LOW_RISK_TERMS: &[&str] = &[
    "mutual agreement",
    "good faith",
    "standard terms",
    "best efforts",
    "cooperate",
];

/// Weighted factors summed into the additional risk score.
pub const RISK_WEIGHTS: &[(&str, f64)] = &[
    ("unlimited", 2.0),
    ("perpetual", 1.5),
    ("irrevocable", 1.5),
    ("penalty", 2.0),
    ("liquidated damages", 2.5),
    ("exclusive", 1.5),
    ("non-compete", 1.5),
    ("indemnify", 1.5),
    ("waive", 1.0),
    ("no warranty", 1.0),
];

/// A complete set of keyword tables.
///
/// [`Lexicon::STANDARD`] holds the built-in legal vocabulary. Callers with a
/// different vocabulary can build their own value from static slices; tables
/// are never mutated after construction.
#[derive(Debug, Clone, Copy)]
pub struct Lexicon {
    pub clause_indicators: &'static [&'static str],
    pub categories: &'static [(ClauseType, &'static [&'static str])],
    pub high_risk: &'static [&'static str],
    pub medium_risk: &'static [&'static str],
    pub low_risk: &'static [&'static str],
    pub risk_weights: &'static [(&'static str, f64)],
}

impl Lexicon {
    pub const STANDARD: Lexicon = Lexicon {
        clause_indicators: CLAUSE_INDICATORS,
        categories: CATEGORY_KEYWORDS,
        high_risk: HIGH_RISK_TERMS,
        medium_risk: MEDIUM_RISK_TERMS,
        low_risk: LOW_RISK_TERMS,
        risk_weights: RISK_WEIGHTS,
    };

    /// True when the lower-cased `line` contains any clause indicator.
    pub fn starts_clause(&self, lowered_line: &str) -> bool {
        self.clause_indicators
            .iter()
            .any(|word| lowered_line.contains(word))
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Lexicon::STANDARD
    }
}

/// Phrases from `terms` that occur in `lowered`, in table order.
pub(crate) fn matching_terms(terms: &[&'static str], lowered: &str) -> Vec<&'static str> {
    terms
        .iter()
        .copied()
        .filter(|term| lowered.contains(term))
        .collect()
}
