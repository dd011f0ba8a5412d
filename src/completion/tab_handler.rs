use crate::{
    core_editor::LineEditor, menu::ColumnarLayout, menu_functions::common_prefix, Completer,
};
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

/// What the line editor should do once a completion request is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    /// Nothing was changed; just refresh the prompt
    Refresh,
    /// The line or the screen changed; redraw the edited line
    Redisplay,
}

/// Glue between a line editor's completion key and a [`Completer`]
///
/// A single match is inserted. With several matches they are listed in
/// columns and whatever prefix they all share is inserted. A blank line
/// gets an indent instead, so the key still works for indenting code.
///
/// # Example
/// ```
/// use probeline::{CompletionStatus, LineBuffer, Namespace, ScriptCompleter, TabHandler, Value};
///
/// let namespace = Namespace::new()
///     .with_global("nums", Value::list([1, 2]))
///     .into_shared();
/// let mut handler = TabHandler::new(Box::new(ScriptCompleter::new(namespace)));
/// let mut buffer = LineBuffer::from("nums[1").with_width(80);
///
/// assert_eq!(handler.handle(&mut buffer), CompletionStatus::Redisplay);
/// assert_eq!(buffer.get_buffer(), "nums[1]");
/// ```
pub struct TabHandler {
    completer: Box<dyn Completer>,
    layout: ColumnarLayout,
    blank_line_indent: String,
}

impl TabHandler {
    /// Handle completion requests with `completer`
    pub fn new(completer: Box<dyn Completer>) -> Self {
        Self {
            completer,
            layout: ColumnarLayout::default(),
            blank_line_indent: "\t".into(),
        }
    }

    /// Builder replacing how listings are laid out
    #[must_use]
    pub fn with_layout(mut self, layout: ColumnarLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Builder setting what is inserted on a blank line; empty disables it
    #[must_use]
    pub fn with_blank_line_indent(mut self, indent: impl Into<String>) -> Self {
        self.blank_line_indent = indent.into();
        self
    }

    /// The completer requests are forwarded to
    pub fn completer_mut(&mut self) -> &mut dyn Completer {
        self.completer.as_mut()
    }

    /// Handle one press of the completion key
    pub fn handle(&mut self, editor: &mut dyn LineEditor) -> CompletionStatus {
        let typed = editor.line_before_cursor();

        if typed.trim().is_empty() {
            if self.blank_line_indent.is_empty() {
                return CompletionStatus::Refresh;
            }
            editor.insert_text(&self.blank_line_indent);
            editor.request_redisplay();
            return CompletionStatus::Redisplay;
        }

        let suggestions = self.completer.complete(&typed, editor);
        debug!(typed = typed.as_str(), count = suggestions.len(), "completion requested");

        match suggestions.as_slice() {
            [] => return CompletionStatus::Refresh,
            [only] => match only.extension_of(&typed) {
                Some(rest) => editor.insert_text(rest),
                None => {
                    editor.delete_before(only.replaced(&typed).graphemes(true).count());
                    editor.insert_text(&only.value);
                }
            },
            many => {
                let displayed: Vec<&str> = many.iter().map(|s| s.display.as_str()).collect();
                let listing = self.layout.layout(&displayed, editor.terminal_width());
                editor.write_listing(&listing);

                let replaced = many[0].replaced(&typed);
                if let Some(rest) = common_prefix(many).strip_prefix(replaced) {
                    if !rest.is_empty() {
                        editor.insert_text(rest);
                    }
                }
            }
        }

        editor.request_redisplay();
        CompletionStatus::Redisplay
    }
}
