use crate::lexicon::Lexicon;
use crate::types::ClauseType;

/// Classify `text` with the built-in lexicon.
///
/// Keyword groups are tested in priority order and the first group with a
/// substring hit wins, so a clause mentioning both "payment" and "liability"
/// is [`ClauseType::Liability`]. Text matching no group is
/// [`ClauseType::General`].
pub fn classify(text: &str) -> ClauseType {
    classify_with_lexicon(&Lexicon::STANDARD, text)
}

pub fn classify_with_lexicon(lexicon: &Lexicon, text: &str) -> ClauseType {
    let lowered = text.to_lowercase();
    classify_lowered(lexicon, &lowered)
}

pub(crate) fn classify_lowered(lexicon: &Lexicon, lowered: &str) -> ClauseType {
    lexicon
        .categories
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|(ty, _)| *ty)
        .unwrap_or(ClauseType::General)
}
