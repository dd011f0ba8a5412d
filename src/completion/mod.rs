//! Line decomposition and the completion strategies built on it

mod base;
mod extract;
mod imports;
mod keywords;
mod masker;
mod resolver;
mod scanner;
mod tab_handler;

pub use base::{Completer, Span, Suggestion};
pub use extract::{extract, Decomposition};
pub use imports::{
    import_matches, is_import_statement, ModuleDiscovery, ModuleInfo, PathModuleDiscovery,
};
pub use keywords::Keywords;
pub use masker::{mask, MaskedLiterals};
pub use resolver::{has_call, ScriptCompleter};
pub use scanner::last_expr;
pub use tab_handler::{CompletionStatus, TabHandler};
