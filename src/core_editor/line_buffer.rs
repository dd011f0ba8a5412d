use {
    super::LineEditor,
    crossterm::terminal,
    std::ops::Range,
    tracing::trace,
    unicode_segmentation::UnicodeSegmentation,
};

/// Columns assumed when the terminal size cannot be queried
pub const FALLBACK_WIDTH: usize = 80;

/// In memory representation of the entered line including a cursor position.
///
/// Also records what a completion handler asked of the terminal (listings
/// written and redisplays requested), so the whole edit can be inspected
/// afterwards.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct LineBuffer {
    lines: String,
    insertion_point: usize,
    width: usize,
    listings: Vec<String>,
    redisplays: usize,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self {
            lines: String::new(),
            insertion_point: 0,
            width: terminal_width(),
            listings: Vec::new(),
            redisplays: 0,
        }
    }
}

impl From<&str> for LineBuffer {
    fn from(input: &str) -> Self {
        let mut line_buffer = LineBuffer::new();
        line_buffer.insert_str(input);
        line_buffer
    }
}

/// Current terminal width, or [`FALLBACK_WIDTH`] when there is no terminal
pub fn terminal_width() -> usize {
    match terminal::size() {
        Ok((columns, _)) if columns > 0 => columns as usize,
        _ => FALLBACK_WIDTH,
    }
}

impl LineBuffer {
    /// Create a line buffer instance
    pub fn new() -> LineBuffer {
        Self::default()
    }

    /// Builder fixing the width reported to completion handlers
    #[must_use]
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Check to see if the line buffer is empty
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Gets the current edit position
    pub fn insertion_point(&self) -> usize {
        self.insertion_point
    }

    /// Sets the current edit position, snapped back to a grapheme boundary
    pub fn set_insertion_point(&mut self, offset: usize) {
        let offset = offset.min(self.lines.len());
        self.insertion_point = if offset == self.lines.len() {
            offset
        } else {
            self.lines
                .grapheme_indices(true)
                .map(|(i, _)| i)
                .take_while(|i| *i <= offset)
                .last()
                .unwrap_or(0)
        };
    }

    /// Output the current buffer
    pub fn get_buffer(&self) -> &str {
        &self.lines
    }

    /// Set the buffer content and move the cursor to the end
    pub fn set_buffer(&mut self, buffer: String) {
        self.lines = buffer;
        self.insertion_point = self.lines.len();
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.lines.clear();
        self.insertion_point = 0;
    }

    /// Insert `string` at the cursor and move the cursor behind it
    pub fn insert_str(&mut self, string: &str) {
        self.lines.insert_str(self.insertion_point, string);
        self.insertion_point += string.len();
    }

    /// Byte range covering up to `count` graphemes left of the cursor
    fn graphemes_left(&self, count: usize) -> Range<usize> {
        let start = self.lines[..self.insertion_point]
            .grapheme_indices(true)
            .rev()
            .take(count)
            .last()
            .map_or(self.insertion_point, |(i, _)| i);
        start..self.insertion_point
    }

    /// Delete up to `count` graphemes to the left of the cursor
    pub fn delete_left_graphemes(&mut self, count: usize) {
        let range = self.graphemes_left(count);
        self.insertion_point = range.start;
        self.lines.replace_range(range, "");
    }

    /// Listings written so far, oldest first
    pub fn listings(&self) -> &[String] {
        &self.listings
    }

    /// How many redisplays have been requested
    pub fn redisplay_count(&self) -> usize {
        self.redisplays
    }
}

impl LineEditor for LineBuffer {
    fn line_before_cursor(&self) -> String {
        self.lines[..self.insertion_point].to_string()
    }

    fn insert_text(&mut self, text: &str) {
        trace!(text, "insert");
        self.insert_str(text);
    }

    fn delete_before(&mut self, count: usize) {
        trace!(count, "delete before cursor");
        self.delete_left_graphemes(count);
    }

    fn request_redisplay(&mut self) {
        self.redisplays += 1;
    }

    fn terminal_width(&self) -> usize {
        self.width
    }

    fn write_listing(&mut self, listing: &str) {
        self.listings.push(listing.to_string());
    }
}
