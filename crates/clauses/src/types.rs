use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Domain category assigned to a clause.
///
/// Serialized with the lower snake-case names used in tool output
/// (`"liability"`, `"intellectual_property"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClauseType {
    Liability,
    Financial,
    Termination,
    Confidentiality,
    IntellectualProperty,
    ForceMajeure,
    #[default]
    General,
}

impl ClauseType {
    pub const ALL: [ClauseType; 7] = [
        ClauseType::Liability,
        ClauseType::Financial,
        ClauseType::Termination,
        ClauseType::Confidentiality,
        ClauseType::IntellectualProperty,
        ClauseType::ForceMajeure,
        ClauseType::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClauseType::Liability => "liability",
            ClauseType::Financial => "financial",
            ClauseType::Termination => "termination",
            ClauseType::Confidentiality => "confidentiality",
            ClauseType::IntellectualProperty => "intellectual_property",
            ClauseType::ForceMajeure => "force_majeure",
            ClauseType::General => "general",
        }
    }
}

impl fmt::Display for ClauseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name one of the seven clause categories.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown clause type: {0}")]
pub struct ParseClauseTypeError(pub String);

impl FromStr for ClauseType {
    type Err = ParseClauseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ClauseType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == normalized)
            .ok_or_else(|| ParseClauseTypeError(s.to_string()))
    }
}

/// Risk tier produced by the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clause_type_parses_its_own_names() {
        for ty in ClauseType::ALL {
            assert_eq!(ty.as_str().parse::<ClauseType>().unwrap(), ty);
        }
        assert_eq!(
            " Force_Majeure ".parse::<ClauseType>().unwrap(),
            ClauseType::ForceMajeure
        );
    }

    #[test]
    fn clause_type_rejects_unknown_names() {
        let err = "warranty".parse::<ClauseType>().unwrap_err();
        assert!(err.to_string().contains("warranty"));
    }

    #[test]
    fn serde_names_match_display() {
        let json = serde_json::to_string(&ClauseType::IntellectualProperty).unwrap();
        assert_eq!(json, "\"intellectual_property\"");
        let level = serde_json::to_string(&RiskLevel::Medium).unwrap();
        assert_eq!(level, "\"MEDIUM\"");
        assert_eq!(RiskLevel::High.to_string(), "HIGH");
    }
}
