//! Collection of common functions used when presenting matches
use crate::Suggestion;

/// Longest prefix shared by the values of all suggestions, compared
/// character by character and case-sensitively
///
/// ## Example usage
/// ```
/// use probeline::{menu_functions::common_prefix, Suggestion};
///
/// let values = [
///     Suggestion::replacing("a['pe", "a['pears']", "pears"),
///     Suggestion::replacing("a['pe", "a['pecans']", "pecans"),
/// ];
/// assert_eq!(common_prefix(&values), "a['pe");
/// ```
pub fn common_prefix(values: &[Suggestion]) -> &str {
    let Some(first) = values.first() else {
        return "";
    };

    let end = values.iter().skip(1).fold(first.value.len(), |end, suggestion| {
        first.value[..end]
            .char_indices()
            .zip(suggestion.value.chars())
            .find(|((_, lhs), rhs)| lhs != rhs)
            .map_or_else(
                || end.min(suggestion.value.len()),
                |((index, _), _)| index,
            )
    });

    &first.value[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn suggestions(values: &[&str]) -> Vec<Suggestion> {
        values
            .iter()
            .map(|v| Suggestion::replacing("", *v, *v))
            .collect()
    }

    #[rstest]
    #[case(&[], "")]
    #[case(&["sys.version"], "sys.version")]
    #[case(&["sys.version(", "sys.version_info("], "sys.version")]
    #[case(&["a[0]", "a[1]", "a[10]"], "a[")]
    #[case(&["Null", "null"], "")]
    #[case(&["abc", "ab"], "ab")]
    fn finds_common_prefix(#[case] values: &[&str], #[case] expected: &str) {
        assert_eq!(common_prefix(&suggestions(values)), expected);
    }

    #[test]
    fn prefix_respects_char_boundaries() {
        let values = suggestions(&["ｎｕｓｈｅｌｌ", "ｎｕｌｌ"]);
        assert_eq!(common_prefix(&values), "ｎｕ");
    }
}
