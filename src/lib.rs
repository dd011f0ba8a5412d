//! # probeline
//! Context-sensitive tab completion for interactive scripting consoles
//!
//! Given the line typed so far and the live namespace of a running
//! interpreter, probeline works out what kind of thing is being typed (a
//! bare name, a member access, a mapping key, a sequence index or a module
//! path in an import) and offers the completions that fit, without parsing
//! the language. Values are probed for how they behave under `[]` rather
//! than judged by their type name, so user-defined containers complete like
//! built-in ones.
//!
//! ## Example
//!
//! ```rust
//! use probeline::{LineBuffer, Namespace, ScriptCompleter, TabHandler, Value};
//!
//! let namespace = Namespace::with_standard_builtins()
//!     .with_global("fruit", Value::dict([("pears", 8), ("pecans", 100)]))
//!     .into_shared();
//! let mut handler = TabHandler::new(Box::new(ScriptCompleter::new(namespace.clone())));
//!
//! let mut buffer = LineBuffer::from("fruit['pe").with_width(80);
//! handler.handle(&mut buffer);
//! // both keys share `pe`; they are listed and nothing more is inserted
//! assert_eq!(buffer.listings(), ["pears   pecans\n".to_string()]);
//!
//! // the host keeps editing the namespace between requests
//! namespace.write().unwrap().set_global("fruit", Value::dict([("pears", 8)]));
//! handler.handle(&mut buffer);
//! assert_eq!(buffer.get_buffer(), "fruit['pears']");
//! ```
//!
//! ## Pieces
//!
//! * [`ScriptCompleter`] decomposes a line and picks the completion strategy.
//! * [`TabHandler`] binds a [`Completer`] to anything implementing
//!   [`LineEditor`]: inserting, listing and indenting.
//! * [`Evaluator`] and [`Introspector`] are how values are reached; the
//!   default [`NamespaceEvaluator`] understands names, literals, member
//!   access, subscripts and calls over the [`Value`] model.
//! * [`ModuleDiscovery`] supplies module names for `import` lines.
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(missing_docs)]

mod result;
pub use result::{EvalError, EvalResult, LookupError};

mod config;
pub use config::CompleterConfig;

mod value;
pub use value::{
    builtin_type, Callable, Flavour, LookupFn, NativeFn, Object, SyntaxHint, TypeDescriptor, Value,
};

mod namespace;
pub use namespace::{Namespace, SharedNamespace};

mod eval;
pub use eval::{Evaluator, Introspector, NamespaceEvaluator};

mod core_editor;
pub use core_editor::{terminal_width, LineBuffer, LineEditor, FALLBACK_WIDTH};

pub mod completion;
pub use completion::{
    Completer, CompletionStatus, Keywords, ModuleDiscovery, ModuleInfo, PathModuleDiscovery,
    ScriptCompleter, Span, Suggestion, TabHandler,
};

mod menu;
pub use menu::{menu_functions, ColumnarLayout};
