use serde::{Deserialize, Serialize};

/// Settings read by the completer on every request
///
/// Missing fields take their default when deserialized, so a partial
/// settings file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompleterConfig {
    /// Evaluate expressions that contain a call, running host code
    pub allow_eval_of_calls: bool,
    /// Complete module names in `import` and `from` statements
    pub complete_imports: bool,
    /// Quote used when a key lookup is opened on the user's behalf
    pub key_quote: char,
}

impl Default for CompleterConfig {
    fn default() -> Self {
        Self {
            allow_eval_of_calls: false,
            complete_imports: true,
            key_quote: '\'',
        }
    }
}

impl CompleterConfig {
    /// Builder toggling evaluation of expressions containing calls
    #[must_use]
    pub fn with_allow_eval_of_calls(mut self, allow: bool) -> Self {
        self.allow_eval_of_calls = allow;
        self
    }

    /// Builder toggling module name completion
    #[must_use]
    pub fn with_complete_imports(mut self, complete_imports: bool) -> Self {
        self.complete_imports = complete_imports;
        self
    }

    /// Builder setting the quote for key lookups; only `'` and `"` are kept
    #[must_use]
    pub fn with_key_quote(mut self, quote: char) -> Self {
        if matches!(quote, '\'' | '"') {
            self.key_quote = quote;
        }
        self
    }

    /// The configured key quote, falling back to `'` when it is not a quote
    pub fn key_quote(&self) -> char {
        match self.key_quote {
            quote @ ('\'' | '"') => quote,
            _ => '\'',
        }
    }
}
