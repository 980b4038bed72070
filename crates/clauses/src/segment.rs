use serde::{Deserialize, Serialize};

use crate::classify::classify_with_lexicon;
use crate::lexicon::Lexicon;
use crate::types::ClauseType;

/// Fragments at or below this many characters are discarded.
pub const MIN_CLAUSE_CHARS: usize = 20;
/// Maximum number of candidates returned to callers.
pub const MAX_CLAUSES: usize = 15;

/// A span of document text that looks like a clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClauseCandidate {
    pub text: String,
    #[serde(rename = "type")]
    pub clause_type: ClauseType,
    /// Length of `text` in characters.
    pub length: usize,
}

/// Output of one segmentation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Segmentation {
    /// The first [`SegmentConfig::max_clauses`] candidates, in document order.
    pub clauses: Vec<ClauseCandidate>,
    /// Number of candidates discovered before capping.
    pub num_clauses: usize,
    /// Summed length of every discovered candidate, including capped ones.
    pub total_length: usize,
}

impl Segmentation {
    pub fn is_empty(&self) -> bool {
        self.num_clauses == 0
    }
}

/// Tuning knobs for [`segment_with_config`].
#[derive(Debug, Clone, Copy)]
pub struct SegmentConfig {
    pub min_chars: usize,
    pub max_clauses: usize,
    pub lexicon: Lexicon,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            min_chars: MIN_CLAUSE_CHARS,
            max_clauses: MAX_CLAUSES,
            lexicon: Lexicon::STANDARD,
        }
    }
}

impl SegmentConfig {
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    pub fn with_max_clauses(mut self, max_clauses: usize) -> Self {
        self.max_clauses = max_clauses;
        self
    }

    pub fn with_lexicon(mut self, lexicon: Lexicon) -> Self {
        self.lexicon = lexicon;
        self
    }
}

/// Split a document into clause candidates using the default configuration.
pub fn segment(document: &str) -> Segmentation {
    segment_with_config(document, &SegmentConfig::default())
}

/// Single forward pass over the lines of `document`.
///
/// A blank line closes the current buffer. A line containing a clause
/// indicator closes the current buffer and opens a new one starting with that
/// line. Any other line extends the buffer. Closed buffers shorter than
/// `min_chars + 1` characters are dropped.
pub fn segment_with_config(document: &str, cfg: &SegmentConfig) -> Segmentation {
    let mut out = Segmentation::default();
    let mut buffer: Vec<&str> = Vec::new();

    for raw_line in document.split('\n') {
        let line = raw_line.trim();
        if line.is_empty() {
            flush(&mut buffer, cfg, &mut out);
            continue;
        }
        if cfg.lexicon.starts_clause(&line.to_lowercase()) {
            flush(&mut buffer, cfg, &mut out);
        }
        buffer.push(line);
    }
    flush(&mut buffer, cfg, &mut out);

    out
}

fn flush(buffer: &mut Vec<&str>, cfg: &SegmentConfig, out: &mut Segmentation) {
    if buffer.is_empty() {
        return;
    }
    let text = buffer.join(" ");
    buffer.clear();

    let length = text.chars().count();
    if length <= cfg.min_chars {
        return;
    }

    out.num_clauses += 1;
    out.total_length += length;
    if out.clauses.len() < cfg.max_clauses {
        let clause_type = classify_with_lexicon(&cfg.lexicon, &text);
        out.clauses.push(ClauseCandidate {
            text,
            clause_type,
            length,
        });
    }
}
