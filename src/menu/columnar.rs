use itertools::Itertools;
use nu_ansi_term::Style;
use unicode_width::UnicodeWidthStr;

/// Lays matches out in columns that fit the terminal width
///
/// Matches are sorted, every column is as wide as the widest match, and
/// columns are separated by `col_padding` spaces. At least one column is
/// always used, however narrow the terminal.
///
/// # Example
///
/// ```rust
/// use probeline::ColumnarLayout;
///
/// let listing = ColumnarLayout::default().layout(&["ccc", "a", "bb"], 12);
/// assert_eq!(listing, "a    bb \nccc\n");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnarLayout {
    col_padding: usize,
    text_style: Style,
}

impl Default for ColumnarLayout {
    fn default() -> Self {
        Self {
            col_padding: 2,
            text_style: Style::new(),
        }
    }
}

impl ColumnarLayout {
    /// Builder setting the spaces between columns
    #[must_use]
    pub fn with_column_padding(mut self, col_padding: usize) -> Self {
        self.col_padding = col_padding;
        self
    }

    /// Builder setting the style matches are painted with
    #[must_use]
    pub fn with_text_style(mut self, text_style: Style) -> Self {
        self.text_style = text_style;
        self
    }

    /// Number of columns that fit `terminal_width` for matches `col_width` wide
    pub fn columns(&self, col_width: usize, terminal_width: usize) -> usize {
        (terminal_width / (col_width + self.col_padding).max(1)).max(1)
    }

    /// Render `matches` as rows, each ending in a newline
    pub fn layout<S: AsRef<str>>(&self, matches: &[S], terminal_width: usize) -> String {
        let sorted: Vec<&str> = matches.iter().map(AsRef::as_ref).sorted().collect();
        let col_width = sorted.iter().map(|m| m.width()).max().unwrap_or(0);
        let columns = self.columns(col_width, terminal_width);

        let mut listing = String::new();
        for row in &sorted.iter().chunks(columns) {
            let cells: Vec<String> = row
                .map(|m| {
                    let fill = col_width.saturating_sub(m.width());
                    format!("{}{}", self.text_style.paint(*m), " ".repeat(fill))
                })
                .collect();
            listing.push_str(&cells.join(&" ".repeat(self.col_padding)));
            listing.push('\n');
        }
        listing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nu_ansi_term::Color;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(80, 80 / 8)]
    #[case(16, 2)]
    #[case(3, 1)]
    #[case(0, 1)]
    fn column_count_is_at_least_one(#[case] width: usize, #[case] expected: usize) {
        assert_eq!(ColumnarLayout::default().columns(6, width), expected);
    }

    #[test]
    fn rows_are_padded_to_widest_match() {
        let matches = ["pecans", "pears", "plums", "fig"];
        let listing = ColumnarLayout::default().layout(&matches, 20);
        assert_eq!(listing, "fig     pears \npecans  plums \n");
    }

    #[test]
    fn narrow_terminal_lists_one_per_row() {
        let listing = ColumnarLayout::default().layout(&["version_info", "version"], 4);
        assert_eq!(listing, "version     \nversion_info\n");
    }

    #[test]
    fn empty_matches_render_nothing() {
        assert_eq!(ColumnarLayout::default().layout::<&str>(&[], 80), "");
    }

    #[test]
    fn wide_characters_count_by_display_width() {
        let listing = ColumnarLayout::default().layout(&["ｎｕ", "ab"], 80);
        assert_eq!(listing, "ab    ｎｕ\n");
    }

    #[test]
    fn styled_matches_keep_alignment() {
        let style = Color::Green.normal();
        let listing = ColumnarLayout::default()
            .with_text_style(style)
            .with_column_padding(1)
            .layout(&["a", "bb"], 80);
        assert_eq!(
            listing,
            format!("{} {}\n", style.paint("a").to_string() + " ", style.paint("bb"))
        );
    }
}
