use serde::{Deserialize, Serialize};

use crate::lexicon::{matching_terms, Lexicon};
use crate::types::RiskLevel;

pub const RECOMMEND_HIGH: &str = "Immediate legal review required - high risk terms identified";
pub const RECOMMEND_MEDIUM: &str = "Legal review recommended - moderate risk terms present";
pub const RECOMMEND_LOW: &str = "Standard review - low risk terms";

/// Risk tier, score and supporting evidence for one clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    /// Always within `[0, 10]`.
    pub risk_score: f64,
    pub high_count: usize,
    pub medium_count: usize,
    pub low_count: usize,
    /// Sum of the weights of every weighted factor present in the clause.
    pub additional_score: f64,
    pub recommendation: String,
    /// Lexicon phrases that matched, per tier.
    pub matched: MatchedTerms,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchedTerms {
    pub high: Vec<String>,
    pub medium: Vec<String>,
    pub low: Vec<String>,
    pub weighted: Vec<String>,
}

/// Score a clause with the built-in lexicon.
pub fn score_risk(text: &str) -> RiskAssessment {
    score_risk_with_lexicon(&Lexicon::STANDARD, text)
}

pub fn score_risk_with_lexicon(lexicon: &Lexicon, text: &str) -> RiskAssessment {
    let lowered = text.to_lowercase();

    let high = matching_terms(lexicon.high_risk, &lowered);
    let medium = matching_terms(lexicon.medium_risk, &lowered);
    let low = matching_terms(lexicon.low_risk, &lowered);

    let mut weighted = Vec::new();
    let mut additional_score = 0.0_f64;
    for (term, weight) in lexicon.risk_weights {
        if lowered.contains(term) {
            additional_score += weight;
            weighted.push(term.to_string());
        }
    }

    let (risk_level, raw_score) =
        tier_and_score(high.len(), medium.len(), low.len(), additional_score);
    let risk_score = raw_score.clamp(0.0, 10.0);

    RiskAssessment {
        risk_level,
        risk_score,
        high_count: high.len(),
        medium_count: medium.len(),
        low_count: low.len(),
        additional_score,
        recommendation: recommendation(risk_level, risk_score).to_string(),
        matched: MatchedTerms {
            high: high.into_iter().map(str::to_string).collect(),
            medium: medium.into_iter().map(str::to_string).collect(),
            low: low.into_iter().map(str::to_string).collect(),
            weighted,
        },
    }
}

/// Tier decision and unclamped score, evaluated top to bottom.
pub fn tier_and_score(
    high: usize,
    medium: usize,
    low: usize,
    additional: f64,
) -> (RiskLevel, f64) {
    let (high_f, medium_f, low_f) = (high as f64, medium as f64, low as f64);

    if high >= 2 || additional >= 3.0 {
        let score = 8.0 + high.min(2) as f64 + additional * 0.5;
        (RiskLevel::High, score)
    } else if high >= 1 || medium >= 2 || additional >= 1.5 {
        let score = 5.0 + high_f + medium_f * 0.5 + additional * 0.3;
        (RiskLevel::Medium, score)
    } else {
        let score = 2.0 + medium_f * 0.5 - low_f * 0.3 + additional * 0.1;
        (RiskLevel::Low, score)
    }
}

/// Fixed advice string for a tier; the score can escalate it.
pub fn recommendation(level: RiskLevel, score: f64) -> &'static str {
    if level == RiskLevel::High || score >= 8.0 {
        RECOMMEND_HIGH
    } else if level == RiskLevel::Medium || score >= 5.0 {
        RECOMMEND_MEDIUM
    } else {
        RECOMMEND_LOW
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stacked_high_terms_are_high_and_clamped() {
        let a = score_risk("unlimited liability, no warranty, perpetual, waive all rights");
        assert_eq!(a.risk_level, RiskLevel::High);
        assert_eq!(a.high_count, 4);
        assert!((a.additional_score - 5.5).abs() < 1e-9);
        assert_eq!(a.risk_score, 10.0);
        assert_eq!(a.recommendation, RECOMMEND_HIGH);
    }

    #[test]
    fn weighted_factors_alone_reach_high() {
        let a = score_risk(
            "The Company accepts unlimited liability and waives all rights to indemnification.",
        );
        assert_eq!(a.risk_level, RiskLevel::High);
        assert_eq!(a.high_count, 1);
        assert_eq!(a.matched.weighted, vec!["unlimited", "waive"]);
        assert!(a.risk_score > 7.0);
    }

    #[test]
    fn two_medium_terms_are_medium() {
        let a = score_risk("The service may be terminated at our discretion without notice.");
        assert_eq!(a.risk_level, RiskLevel::Medium);
        assert_eq!(a.medium_count, 2);
        assert!((a.risk_score - 6.0).abs() < 1e-9);
        assert_eq!(a.recommendation, RECOMMEND_MEDIUM);
    }

    #[test]
    fn cooperative_language_is_low() {
        let a = score_risk("mutual agreement in good faith, best efforts");
        assert_eq!(a.risk_level, RiskLevel::Low);
        assert_eq!(a.low_count, 3);
        assert!((a.risk_score - 1.1).abs() < 1e-9);
        assert_eq!(a.recommendation, RECOMMEND_LOW);

        let a = score_risk("Both parties agree to work in good faith with reasonable efforts.");
        assert_eq!(a.risk_level, RiskLevel::Low);
        assert!((a.risk_score - 2.2).abs() < 1e-9);
    }

    #[test]
    fn single_high_term_is_medium() {
        let a = score_risk("Licensee receives an exclusive license.");
        assert_eq!(a.risk_level, RiskLevel::Medium);
        // 5 + 1 high + 1.5 weight * 0.3
        assert!((a.risk_score - 6.45).abs() < 1e-9);
    }

    #[test]
    fn low_tier_can_drop_below_two() {
        let a = score_risk("standard terms, mutual agreement, good faith, best efforts, cooperate");
        assert_eq!(a.low_count, 5);
        assert!((a.risk_score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn score_stays_in_range_for_dense_input() {
        let dense = crate::lexicon::HIGH_RISK_TERMS.join(" ").repeat(50);
        let a = score_risk(&dense);
        assert!((0.0..=10.0).contains(&a.risk_score));
        let a = score_risk("");
        assert_eq!(a.risk_level, RiskLevel::Low);
        assert_eq!(a.risk_score, 2.0);
    }

    #[test]
    fn recommendation_score_override() {
        assert_eq!(recommendation(RiskLevel::Low, 8.0), RECOMMEND_HIGH);
        assert_eq!(recommendation(RiskLevel::Low, 5.0), RECOMMEND_MEDIUM);
        assert_eq!(recommendation(RiskLevel::Medium, 9.0), RECOMMEND_HIGH);
        assert_eq!(recommendation(RiskLevel::Low, 4.9), RECOMMEND_LOW);
    }

    #[test]
    fn counts_are_presence_not_frequency() {
        let a = score_risk("penalty penalty penalty");
        assert_eq!(a.high_count, 1);
        assert!((a.additional_score - 2.0).abs() < 1e-9);
    }
}
