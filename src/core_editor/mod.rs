mod editor;
mod line_buffer;

pub use editor::LineEditor;
pub use line_buffer::{terminal_width, LineBuffer, FALLBACK_WIDTH};
