use super::{masker::mask, scanner::last_expr};
use tracing::trace;

/// A line taken apart around the thing being completed
///
/// For `x = a['pe` the parts are `x = `, `a`, `['`, nothing and `pe`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decomposition {
    /// Everything before the expression, kept verbatim in every result
    pub pretext: String,
    /// The expression whose value decides what to offer
    pub expr: String,
    /// `[`, optionally followed by the quote that opened a key
    pub lookup_token: String,
    /// Whitespace the user typed between the expression and the fragment
    pub padding: String,
    /// What has been typed of the completion so far
    pub fragment: String,
}

impl Decomposition {
    /// Whether the line ends inside a `[...]` lookup
    pub fn is_lookup(&self) -> bool {
        self.lookup_token.starts_with('[')
    }

    /// Quote that opened the key being typed, if any
    pub fn key_quote(&self) -> Option<char> {
        self.lookup_token.chars().nth(1)
    }
}

fn split_trailing_whitespace(text: &mut String) -> String {
    let kept = text.trim_end().len();
    text.split_off(kept)
}

fn is_numeric(text: &str) -> bool {
    !text.is_empty() && text.chars().all(char::is_numeric)
}

fn rescan(text: &str) -> (String, String) {
    let (pretext, expr) = last_expr(text);
    (pretext.to_string(), expr.to_string())
}

/// Split a line into a [`Decomposition`].
///
/// String literals are masked first so their contents never look like code;
/// the first quote left over starts an unterminated key or string that
/// becomes the fragment. A bare number at the end is a partial index. A
/// trailing `[` becomes the lookup token and pulls the quote that opened the
/// fragment into it.
pub fn extract(line: &str) -> Decomposition {
    let (masked, literals) = mask(line);
    trace!(line, masked = masked.as_str(), "masked string literals");

    let mut text = masked;
    let mut fragment = text
        .find('\'')
        .or_else(|| text.find('"'))
        .map(|start| text.split_off(start));

    let mut padding = split_trailing_whitespace(&mut text);
    let (mut pretext, mut expr) = rescan(&text);
    if padding.is_empty() {
        padding = split_trailing_whitespace(&mut pretext);
    }

    if fragment.is_none() && is_numeric(&expr) {
        fragment = Some(std::mem::take(&mut expr));
        (pretext, expr) = rescan(&pretext);
    }

    let mut lookup_token = String::new();
    if expr.ends_with('[') {
        lookup_token.push('[');
        if pretext.is_empty() {
            expr.pop();
            (pretext, expr) = rescan(&expr);
        }
        if let Some(partial) = fragment.as_mut() {
            if partial.starts_with(['\'', '"']) {
                lookup_token.push(partial.remove(0));
            }
        }
    }

    if pretext.is_empty() && expr.ends_with('(') {
        pretext = std::mem::take(&mut expr);
    }

    let parts = Decomposition {
        pretext: literals.restore(&pretext),
        expr: literals.restore(&expr),
        lookup_token,
        padding,
        fragment: fragment
            .map(|partial| literals.restore(&partial))
            .unwrap_or_default(),
    };
    trace!(?parts, "decomposed line");
    parts
}
