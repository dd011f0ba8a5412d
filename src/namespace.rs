use crate::{
    result::EvalError,
    value::{builtin_type, Value},
};
use std::{
    collections::{BTreeMap, HashSet},
    sync::{Arc, RwLock},
};

/// Name that is bound in the interpreter but never offered as a completion
pub(crate) const HIDDEN_NAME: &str = "__builtins__";

/// The scopes visible to the line being edited
///
/// Names are resolved through `locals`, then `globals`, then `builtins`;
/// a binding in an earlier scope hides the same name in the later ones.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    locals: BTreeMap<String, Value>,
    globals: BTreeMap<String, Value>,
    builtins: BTreeMap<String, Value>,
}

/// A namespace the host keeps mutating or replacing between requests
pub type SharedNamespace = Arc<RwLock<Namespace>>;

impl Namespace {
    /// An empty namespace with no builtins
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty global scope on top of the standard builtins
    pub fn with_standard_builtins() -> Self {
        Self {
            builtins: standard_builtins(),
            ..Self::default()
        }
    }

    /// Builder binding a global name
    #[must_use]
    pub fn with_global(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_global(name, value);
        self
    }

    /// Builder binding a local name
    #[must_use]
    pub fn with_local(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_local(name, value);
        self
    }

    /// Builder binding a builtin name
    #[must_use]
    pub fn with_builtin(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.builtins.insert(name.into(), value.into());
        self
    }

    /// Bind (or rebind) a global name
    pub fn set_global(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.globals.insert(name.into(), value.into());
    }

    /// Bind (or rebind) a local name
    pub fn set_local(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.locals.insert(name.into(), value.into());
    }

    /// Drop every local binding, e.g. when leaving a function frame
    pub fn clear_locals(&mut self) {
        self.locals.clear();
    }

    /// Remove a global binding
    pub fn remove_global(&mut self, name: &str) -> Option<Value> {
        self.globals.remove(name)
    }

    /// Resolve a bare name through all scopes
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.locals
            .get(name)
            .or_else(|| self.globals.get(name))
            .or_else(|| self.builtins.get(name))
    }

    /// Every visible binding, each name once, in scope priority order
    pub fn visible(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        let mut seen = HashSet::new();
        seen.insert(HIDDEN_NAME);
        [&self.locals, &self.globals, &self.builtins]
            .into_iter()
            .flat_map(|scope| scope.iter())
            .filter_map(move |(name, value)| {
                seen.insert(name.as_str()).then_some((name.as_str(), value))
            })
    }

    /// Wrap for sharing with a completer
    pub fn into_shared(self) -> SharedNamespace {
        Arc::new(RwLock::new(self))
    }
}

/// Builtin functions and types of the scripting language
fn standard_builtins() -> BTreeMap<String, Value> {
    let functions = [
        "abs", "all", "any", "ascii", "bin", "callable", "chr", "compile", "delattr", "dir",
        "divmod", "enumerate", "eval", "exec", "filter", "format", "getattr", "globals",
        "hasattr", "hash", "help", "hex", "id", "input", "isinstance", "issubclass", "iter",
        "len", "locals", "map", "max", "min", "next", "oct", "open", "ord", "pow", "print",
        "repr", "reversed", "round", "setattr", "sorted", "sum", "vars", "zip",
    ];
    let types = [
        "bool", "bytes", "dict", "float", "int", "list", "object", "set", "str", "tuple", "type",
    ];

    functions
        .iter()
        .map(|name| {
            let owned = name.to_string();
            (
                name.to_string(),
                Value::function(*name, move |_| {
                    Err(EvalError::CallFailed {
                        name: owned.clone(),
                        reason: "built-in functions are not executed by the completer".into(),
                    })
                }),
            )
        })
        .chain(
            types
                .iter()
                .map(|name| (name.to_string(), Value::Type(builtin_type(name)))),
        )
        .chain([
            (HIDDEN_NAME.to_string(), Value::None),
            ("__name__".to_string(), Value::from("__main__")),
        ])
        .collect()
}
