use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::EvalError;

/// One curated question with the context that supports its reference answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldenSetItem {
    pub question: String,
    #[serde(default)]
    pub context: Vec<String>,
    pub ground_truth: String,
}

impl GoldenSetItem {
    pub fn new(
        question: impl Into<String>,
        context: impl IntoIterator<Item = impl Into<String>>,
        ground_truth: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            context: context.into_iter().map(Into::into).collect(),
            ground_truth: ground_truth.into(),
        }
    }
}

/// Read a JSON array of golden-set items.
pub fn load_golden_set(path: impl AsRef<Path>) -> Result<Vec<GoldenSetItem>, EvalError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
    let items = parse_golden_set(&raw)?;
    info!(path = %path.display(), items = items.len(), "loaded golden set");
    Ok(items)
}

pub fn parse_golden_set(raw: &str) -> Result<Vec<GoldenSetItem>, EvalError> {
    let items: Vec<GoldenSetItem> = serde_json::from_str(raw)?;
    if let Some(idx) = items.iter().position(|item| item.question.trim().is_empty()) {
        return Err(EvalError::InvalidGoldenSet(format!(
            "item {idx} has an empty question"
        )));
    }
    Ok(items)
}

pub fn write_golden_set(path: impl AsRef<Path>, items: &[GoldenSetItem]) -> Result<(), EvalError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(items)?;
    fs::write(path, json).map_err(|e| EvalError::io(path, e))?;
    info!(path = %path.display(), items = items.len(), "wrote golden set");
    Ok(())
}

/// Five questions over the bundled sample clauses.
pub fn sample_golden_set() -> Vec<GoldenSetItem> {
    vec![
        GoldenSetItem::new(
            "What are the liability terms in the contract?",
            [
                "The Company shall have unlimited liability for any damages arising from gross negligence or willful misconduct.",
                "The service is provided as-is without any warranty, express or implied.",
            ],
            "The company has unlimited liability for damages from gross negligence or willful misconduct, and the service is provided without warranty.",
        ),
        GoldenSetItem::new(
            "How can I terminate the agreement?",
            ["Either party may terminate this agreement with 30 days written notice."],
            "Either party can terminate with 30 days written notice.",
        ),
        GoldenSetItem::new(
            "What are the payment terms?",
            ["Payment terms are Net 30 days from invoice date."],
            "Payment is due within 30 days of invoice.",
        ),
        GoldenSetItem::new(
            "What is the confidentiality requirement?",
            ["All confidential information shall be kept secret for a period of 5 years."],
            "Confidential information must be kept secret for 5 years.",
        ),
        GoldenSetItem::new(
            "What happens in case of force majeure?",
            ["In the event of force majeure, neither party shall be liable for delays or failures."],
            "Neither party is liable for delays or failures due to force majeure events.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_set_survives_a_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("golden_set.json");
        write_golden_set(&path, &sample_golden_set()).unwrap();

        let loaded = load_golden_set(&path).unwrap();
        assert_eq!(loaded.len(), 5);
        assert_eq!(loaded, sample_golden_set());
        assert_eq!(loaded[0].context.len(), 2);
    }

    #[test]
    fn missing_context_defaults_to_empty() {
        let items =
            parse_golden_set(r#"[{"question": "Q?", "ground_truth": "A."}]"#).unwrap();
        assert!(items[0].context.is_empty());
    }

    #[test]
    fn rejects_blank_questions_and_bad_json() {
        let err = parse_golden_set(r#"[{"question": " ", "context": [], "ground_truth": "x"}]"#)
            .unwrap_err();
        assert!(matches!(err, EvalError::InvalidGoldenSet(_)));

        let err = parse_golden_set(r#"{"question": "not an array"}"#).unwrap_err();
        assert!(matches!(err, EvalError::Format(_)));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = load_golden_set("/nonexistent/golden_set.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/golden_set.json"));
    }
}
