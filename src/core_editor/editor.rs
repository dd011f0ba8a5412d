/// The operations a completion handler needs from the line editor it is
/// bound to.
///
/// Implemented by [`LineBuffer`](super::LineBuffer) for in-memory editing
/// and tests; bindings to a real line editing library implement it over
/// that library's buffer and terminal.
pub trait LineEditor {
    /// Buffer content from the start of the line up to the cursor
    fn line_before_cursor(&self) -> String;

    /// Insert `text` at the cursor, leaving the cursor after it
    fn insert_text(&mut self, text: &str);

    /// Delete `count` graphemes to the left of the cursor
    fn delete_before(&mut self, count: usize);

    /// Ask for the edited line to be redrawn
    fn request_redisplay(&mut self);

    /// Width of the output in columns
    fn terminal_width(&self) -> usize;

    /// Print a block of text (a listing of matches) above the edited line
    fn write_listing(&mut self, listing: &str);
}
