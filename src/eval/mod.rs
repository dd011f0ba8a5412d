mod base;
mod default;

pub use base::{Evaluator, Introspector};
pub use default::NamespaceEvaluator;
