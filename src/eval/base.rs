use crate::{
    namespace::Namespace,
    result::EvalResult,
    value::{TypeDescriptor, Value},
};
use std::{collections::BTreeSet, sync::Arc};

/// Resolves expression text to a live value.
///
/// Implementations may run arbitrary host code (attribute hooks, calls).
/// The completer only hands over text that passed its call policy, but it
/// cannot sandbox what the evaluator does with it.
pub trait Evaluator: Send {
    /// Evaluate `expr` against `namespace`.
    ///
    /// Every failure, whatever its cause, is reported as an `Err`; nothing
    /// may panic across this boundary.
    fn evaluate(&self, expr: &str, namespace: &Namespace) -> EvalResult<Value>;
}

/// Structural reflection over live values
pub trait Introspector: Send {
    /// Names directly available on `value`: its own attributes plus those
    /// its type declares itself
    fn members_of(&self, value: &Value) -> BTreeSet<String>;

    /// Type descriptors whose members are inherited by `value`, nearest first
    fn ancestors_of(&self, value: &Value) -> Vec<Arc<TypeDescriptor>>;

    /// Fetch a member by name, walking inherited members
    fn member(&self, value: &Value, name: &str) -> Option<Value>;
}
