/// Reserved words of the scripting language and the text each completes with
const STANDARD_KEYWORDS: &[(&str, &str)] = &[
    ("False", ""),
    ("None", ""),
    ("True", ""),
    ("and", " "),
    ("as", " "),
    ("assert", " "),
    ("async", " "),
    ("await", " "),
    ("break", ""),
    ("class", " "),
    ("continue", ""),
    ("def", " "),
    ("del", " "),
    ("elif", " "),
    ("else", ""),
    ("except", " "),
    ("finally", ":"),
    ("for", " "),
    ("from", " "),
    ("global", " "),
    ("if", " "),
    ("import", " "),
    ("in", " "),
    ("is", " "),
    ("lambda", " "),
    ("nonlocal", " "),
    ("not", " "),
    ("or", " "),
    ("pass", ""),
    ("raise", " "),
    ("return", " "),
    ("try", ":"),
    ("while", " "),
    ("with", " "),
    ("yield", " "),
];

/// The keyword table consulted for bare names
///
/// Each keyword carries the text appended when it is completed: a space
/// before an operand, a colon where a block opens at once, or nothing for
/// words that stand alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keywords {
    entries: Vec<(String, String)>,
}

impl Default for Keywords {
    fn default() -> Self {
        Self::from_pairs(STANDARD_KEYWORDS.iter().copied())
    }
}

impl Keywords {
    /// Build a table from `(keyword, suffix)` pairs, keeping their order
    pub fn from_pairs<K, S>(pairs: impl IntoIterator<Item = (K, S)>) -> Self
    where
        K: Into<String>,
        S: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(word, suffix)| (word.into(), suffix.into()))
                .collect(),
        }
    }

    /// A table with no keywords at all
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Whether `word` is a keyword
    pub fn contains(&self, word: &str) -> bool {
        self.entries.iter().any(|(w, _)| w == word)
    }

    /// Keywords starting with `prefix`, with their suffixes
    pub fn matching<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.entries
            .iter()
            .filter(move |(word, _)| word.starts_with(prefix))
            .map(|(word, suffix)| (word.as_str(), suffix.as_str()))
    }
}
