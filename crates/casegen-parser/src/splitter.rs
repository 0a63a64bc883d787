//! Sentence splitting

/// Full-width and ASCII sentence terminators
pub const SENTENCE_TERMINATORS: [char; 6] = ['。', '！', '？', '.', '!', '?'];

/// Breaks raw requirement text into trimmed sentences
///
/// Splitting is total: it never fails, and whitespace-only input yields no
/// sentences. An ASCII `.` is a terminator, so a decimal such as `2.5`
/// is cut in two.
#[derive(Debug, Clone)]
pub struct SentenceSplitter {
    terminators: Vec<char>,
}

impl Default for SentenceSplitter {
    fn default() -> Self {
        Self {
            terminators: SENTENCE_TERMINATORS.to_vec(),
        }
    }
}

impl SentenceSplitter {
    /// Create a splitter with the standard terminators
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a splitter with custom terminators
    pub fn with_terminators(terminators: impl IntoIterator<Item = char>) -> Self {
        Self {
            terminators: terminators.into_iter().collect(),
        }
    }

    /// Split `text` into non-empty trimmed sentences, in order
    pub fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.split(|c: char| self.terminators.contains(&c))
            .map(str::trim)
            .filter(|sentence| !sentence.is_empty())
            .collect()
    }
}
