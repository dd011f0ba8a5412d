use crate::core_editor::LineEditor;

/// A span of source code, with positions in bytes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct Span {
    /// The starting position of the span, in bytes
    pub start: usize,

    /// The ending position of the span, in bytes
    pub end: usize,
}

impl Span {
    /// Creates a new `Span` from start and end inputs.
    /// The end parameter must be greater than or equal to the start parameter.
    ///
    /// # Panics
    /// If `end < start`
    pub fn new(start: usize, end: usize) -> Span {
        assert!(
            end >= start,
            "Can't create a Span whose end < start, start={start}, end={end}"
        );

        Span { start, end }
    }
}

/// A trait that turns the text typed so far into candidate lines.
///
/// Completers may also edit the buffer directly through `editor`, e.g. to
/// fix up syntax that cannot be completed at all.
pub trait Completer: Send {
    /// Complete `line`, the buffer content up to the cursor
    fn complete(&mut self, line: &str, editor: &mut dyn LineEditor) -> Vec<Suggestion>;
}

/// Suggestion returned by the Completer
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// The whole line as it reads once this suggestion is accepted
    pub value: String,
    /// The bare match, as shown in a listing
    pub display: String,
    /// Part of the typed text that `value` replaces; it runs up to the cursor
    pub span: Span,
}

impl Suggestion {
    /// A suggestion replacing all of `line` with `value`
    pub fn replacing(line: &str, value: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            display: display.into(),
            span: Span::new(0, line.len()),
        }
    }

    /// The slice of `typed` covered by [`Suggestion::span`], cut at the cursor
    pub fn replaced<'t>(&self, typed: &'t str) -> &'t str {
        typed.get(self.span.start..).unwrap_or(typed)
    }

    /// Text to insert after `typed` to accept this suggestion, when the
    /// suggestion simply extends the replaced text
    pub fn extension_of<'a>(&'a self, typed: &str) -> Option<&'a str> {
        self.value.strip_prefix(self.replaced(typed))
    }
}
