use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// A complete single or double quoted literal on one line
static STRING_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'"#)
        .expect("string literal pattern is valid")
});

/// Placeholder text for the literal at `index`.
///
/// Made of private-use code points, so it never contains a quote, a
/// delimiter or a digit-only run the scanner could mistake for code.
fn placeholder(index: usize) -> String {
    format!("\u{e000}{index}\u{e001}")
}

/// Literals removed from a line by [`mask`], in order of removal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskedLiterals {
    entries: Vec<(String, String)>,
}

impl MaskedLiterals {
    /// Number of literals that were masked
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was masked
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Put every masked literal back in `text`
    pub fn restore(&self, text: &str) -> String {
        self.entries
            .iter()
            .fold(text.to_string(), |acc, (token, literal)| {
                if acc.contains(token.as_str()) {
                    acc.replace(token.as_str(), literal)
                } else {
                    acc
                }
            })
    }
}

/// Next complete literal at or after `from` whose opening quote is not
/// escaped.
fn find_literal(text: &str, mut from: usize) -> Option<Range<usize>> {
    while let Some(found) = STRING_LITERAL.find_at(text, from) {
        if text[..found.start()].ends_with('\\') {
            from = found.start() + 1;
            continue;
        }
        return Some(found.range());
    }
    None
}

/// Replace each complete string literal in `line` with a placeholder.
///
/// Quote characters left in the result belong to an unterminated literal
/// (or an escaped quote outside any literal).
pub fn mask(line: &str) -> (String, MaskedLiterals) {
    let mut masked = line.to_string();
    let mut literals = MaskedLiterals::default();
    let mut from = 0;

    while let Some(range) = find_literal(&masked, from) {
        let token = placeholder(literals.len());
        let literal = masked[range.clone()].to_string();
        masked.replace_range(range.clone(), &token);
        from = range.start + token.len();
        literals.entries.push((token, literal));
    }

    (masked, literals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("a['pe", 0)]
    #[case("a['x'].ke", 1)]
    #[case("f('a', \"b\")", 2)]
    #[case("'it\\'s'", 1)]
    #[case("x = \\'a'", 0)]
    #[case("print(\"", 0)]
    fn counts_complete_literals(#[case] line: &str, #[case] expected: usize) {
        assert_eq!(mask(line).1.len(), expected);
    }

    #[test]
    fn masked_text_keeps_unterminated_quote() {
        let (masked, literals) = mask("d['k'].get('pa");
        assert!(!masked.contains("'k'"));
        assert!(masked.ends_with(".get('pa"));
        assert_eq!(literals.restore(&masked), "d['k'].get('pa");
    }

    #[test]
    fn placeholders_do_not_collide() {
        let line = (0..12).map(|i| format!("'{i}'")).collect::<Vec<_>>().join("+");
        let (masked, literals) = mask(&line);
        assert_eq!(literals.len(), 12);
        assert!(!masked.contains('\''));
        assert_eq!(literals.restore(&masked), line);
    }

    proptest! {
        #[test]
        fn restore_inverts_mask(line in "[a-z0-9 '\"\\\\()\\[\\].=,]{0,40}") {
            let (masked, literals) = mask(&line);
            prop_assert_eq!(literals.restore(&masked), line);
        }

        #[test]
        fn no_complete_literal_survives(line in "[a-z '\"]{0,30}") {
            let (masked, _) = mask(&line);
            prop_assert!(find_literal(&masked, 0).is_none());
        }
    }
}
