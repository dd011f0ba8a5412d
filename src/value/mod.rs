//! Dynamic values the completer introspects
//!
//! A small object model standing in for the live interpreter state of the
//! scripting language being edited. Hosts build their namespace out of these.
mod flavour;
mod types;

pub use flavour::{Flavour, SyntaxHint};
pub use types::{builtin_type, LookupFn, TypeDescriptor};

use crate::result::{EvalError, EvalResult, LookupError};
use std::{collections::BTreeMap, fmt, sync::Arc};

/// Signature of a host function reachable from the namespace
pub type NativeFn = dyn Fn(&[Value]) -> EvalResult<Value> + Send + Sync;

/// An invocable host function
#[derive(Clone)]
pub struct Callable {
    name: String,
    func: Arc<NativeFn>,
}

impl Callable {
    /// Wrap a closure as a named function value
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> EvalResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// A method that is visible to introspection but refuses to run
    pub(crate) fn opaque(name: &str) -> Self {
        let owned = name.to_string();
        Self::new(name, move |_| {
            Err(EvalError::CallFailed {
                name: owned.clone(),
                reason: "built-in methods are not executed by the completer".into(),
            })
        })
    }

    /// Name the function was registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the function
    pub fn call(&self, args: &[Value]) -> EvalResult<Value> {
        (self.func)(args)
    }

    fn same_as(&self, other: &Callable) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function {}>", self.name)
    }
}

/// An instance of a [`TypeDescriptor`] carrying its own attributes
#[derive(Debug, Clone)]
pub struct Object {
    class: Arc<TypeDescriptor>,
    attrs: BTreeMap<String, Value>,
}

impl Object {
    /// Create an instance with no attributes of its own
    pub fn new(class: Arc<TypeDescriptor>) -> Self {
        Self {
            class,
            attrs: BTreeMap::new(),
        }
    }

    /// Builder with an additional instance attribute
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// The type of this instance
    pub fn class(&self) -> &Arc<TypeDescriptor> {
        &self.class
    }

    /// Attributes set directly on the instance
    pub fn attrs(&self) -> &BTreeMap<String, Value> {
        &self.attrs
    }
}

/// A live value of the scripting language
#[derive(Debug, Clone)]
pub enum Value {
    /// The null value
    None,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Text string
    Str(String),
    /// Byte string
    Bytes(Vec<u8>),
    /// Mutable ordered sequence
    List(Vec<Value>),
    /// Immutable ordered sequence
    Tuple(Vec<Value>),
    /// Mapping, kept in insertion order
    Dict(Vec<(Value, Value)>),
    /// Unordered collection without positional access
    Set(Vec<Value>),
    /// Host function
    Function(Callable),
    /// A type, usable as a value
    Type(Arc<TypeDescriptor>),
    /// Instance of a type (modules are instances of the `module` type)
    Object(Arc<Object>),
}

impl Value {
    /// Build a mapping from key/value pairs, preserving their order
    pub fn dict<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Value
    where
        K: Into<Value>,
        V: Into<Value>,
    {
        Value::Dict(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a list
    pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Value {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a set, dropping duplicate members
    pub fn set<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Value {
        let mut members: Vec<Value> = Vec::new();
        for item in items {
            let item = item.into();
            if !members.iter().any(|m| m.key_eq(&item)) {
                members.push(item);
            }
        }
        Value::Set(members)
    }

    /// Wrap an instance
    pub fn object(object: Object) -> Value {
        Value::Object(Arc::new(object))
    }

    /// Build a module object with the given attributes
    pub fn module<S, V>(name: &str, attrs: impl IntoIterator<Item = (S, V)>) -> Value
    where
        S: Into<String>,
        V: Into<Value>,
    {
        let module = attrs.into_iter().fold(
            Object::new(builtin_type("module"))
                .with_attr("__name__", name)
                .with_attr("__doc__", Value::None),
            |module, (k, v)| module.with_attr(k, v),
        );
        Value::object(module)
    }

    /// Wrap a closure as a function value
    pub fn function<F>(name: impl Into<String>, func: F) -> Value
    where
        F: Fn(&[Value]) -> EvalResult<Value> + Send + Sync + 'static,
    {
        Value::Function(Callable::new(name, func))
    }

    /// The descriptor of this value's type
    pub fn class(&self) -> Arc<TypeDescriptor> {
        match self {
            Value::None => builtin_type("NoneType"),
            Value::Bool(_) => builtin_type("bool"),
            Value::Int(_) => builtin_type("int"),
            Value::Float(_) => builtin_type("float"),
            Value::Str(_) => builtin_type("str"),
            Value::Bytes(_) => builtin_type("bytes"),
            Value::List(_) => builtin_type("list"),
            Value::Tuple(_) => builtin_type("tuple"),
            Value::Dict(_) => builtin_type("dict"),
            Value::Set(_) => builtin_type("set"),
            Value::Function(_) => builtin_type("function"),
            Value::Type(_) => builtin_type("type"),
            Value::Object(object) => object.class().clone(),
        }
    }

    /// Name of this value's type, as used in error messages
    pub fn type_name(&self) -> String {
        self.class().name().to_string()
    }

    /// Plain data with no further structure worth completing into
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::None
                | Value::Bool(_)
                | Value::Int(_)
                | Value::Float(_)
                | Value::Str(_)
                | Value::Bytes(_)
        )
    }

    /// Equality as used for mapping keys and set membership
    pub fn key_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::Bool(a), Value::Int(b)) | (Value::Int(b), Value::Bool(a)) => {
                i64::from(*a) == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.key_eq(y))
            }
            (Value::Function(a), Value::Function(b)) => a.same_as(b),
            (Value::Type(a), Value::Type(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    fn is_hashable(&self) -> bool {
        match self {
            Value::List(_) | Value::Dict(_) | Value::Set(_) => false,
            Value::Tuple(items) => items.iter().all(Value::is_hashable),
            _ => true,
        }
    }

    /// Whether `value[key]` is defined for this value at all
    pub fn supports_lookup(&self) -> bool {
        match self {
            Value::Dict(_) | Value::List(_) | Value::Tuple(_) | Value::Str(_) | Value::Bytes(_) => {
                true
            }
            Value::Object(object) => object.class().find_lookup().is_some(),
            _ => false,
        }
    }

    /// Evaluate `self[key]`
    pub fn lookup(&self, key: &Value) -> Result<Value, LookupError> {
        match self {
            Value::Dict(pairs) => {
                if !key.is_hashable() {
                    return Err(LookupError::TypeMismatch {
                        container: "dict".into(),
                        key: key.type_name(),
                    });
                }
                pairs
                    .iter()
                    .find(|(k, _)| k.key_eq(key))
                    .map(|(_, v)| v.clone())
                    .ok_or_else(|| LookupError::KeyNotFound(key.repr()))
            }
            Value::List(items) | Value::Tuple(items) => {
                let idx = self.position(items.len(), key)?;
                Ok(items[idx].clone())
            }
            Value::Str(text) => {
                let idx = self.position(text.chars().count(), key)?;
                Ok(text
                    .chars()
                    .nth(idx)
                    .map_or(Value::None, |c| Value::Str(c.to_string())))
            }
            Value::Bytes(bytes) => {
                let idx = self.position(bytes.len(), key)?;
                Ok(Value::Int(i64::from(bytes[idx])))
            }
            Value::Object(object) => match object.class().find_lookup() {
                Some(hook) => hook(self, key),
                None => Err(LookupError::NotSubscriptable(self.type_name())),
            },
            _ => Err(LookupError::NotSubscriptable(self.type_name())),
        }
    }

    /// Resolve a (possibly negative) integer subscript against `len`
    fn position(&self, len: usize, key: &Value) -> Result<usize, LookupError> {
        let index = match key {
            Value::Int(i) => *i,
            Value::Bool(b) => i64::from(*b),
            _ => {
                return Err(LookupError::TypeMismatch {
                    container: self.type_name(),
                    key: key.type_name(),
                })
            }
        };
        let len = i64::try_from(len).unwrap_or(i64::MAX);
        let resolved = if index < 0 { len + index } else { index };
        if (0..len).contains(&resolved) {
            Ok(resolved as usize)
        } else {
            Err(LookupError::IndexOutOfRange(index))
        }
    }

    /// Number of items, asking `__len__` for instances
    pub fn length(&self) -> Option<usize> {
        match self {
            Value::Str(text) => Some(text.chars().count()),
            Value::Bytes(bytes) => Some(bytes.len()),
            Value::List(items) | Value::Tuple(items) | Value::Set(items) => Some(items.len()),
            Value::Dict(pairs) => Some(pairs.len()),
            Value::Object(_) => match self.call_method("__len__")? {
                Value::Int(n) => usize::try_from(n).ok(),
                _ => None,
            },
            _ => None,
        }
    }

    /// Keys of a mapping, asking `keys()` for instances
    pub fn mapping_keys(&self) -> Option<Vec<Value>> {
        match self {
            Value::Dict(pairs) => Some(pairs.iter().map(|(k, _)| k.clone()).collect()),
            Value::Object(_) => match self.call_method("keys")? {
                Value::List(keys) | Value::Tuple(keys) | Value::Set(keys) => Some(keys),
                _ => None,
            },
            _ => None,
        }
    }

    /// Call a method found on this value's class with no arguments
    fn call_method(&self, name: &str) -> Option<Value> {
        match self.class().find_member(name)? {
            Value::Function(func) => func.call(&[self.clone()]).ok(),
            _ => None,
        }
    }

    /// Whether calling this value could succeed
    pub fn is_callable(&self) -> bool {
        match self {
            Value::Function(_) | Value::Type(_) => true,
            Value::Object(object) => object
                .class()
                .find_member("__call__")
                .is_some_and(|m| m.is_callable()),
            _ => false,
        }
    }

    /// Evaluate `self(args...)`
    pub fn call(&self, args: &[Value]) -> EvalResult<Value> {
        match self {
            Value::Function(func) => func.call(args),
            Value::Type(ty) if ty.is_builtin() => Err(EvalError::CallFailed {
                name: ty.name().to_string(),
                reason: "built-in types are not instantiated by the completer".into(),
            }),
            Value::Type(ty) => Ok(Value::object(Object::new(ty.clone()))),
            Value::Object(object) => match object.class().find_member("__call__") {
                Some(Value::Function(func)) => {
                    let mut bound = Vec::with_capacity(args.len() + 1);
                    bound.push(self.clone());
                    bound.extend_from_slice(args);
                    func.call(&bound)
                }
                _ => Err(EvalError::NotCallable(self.type_name())),
            },
            _ => Err(EvalError::NotCallable(self.type_name())),
        }
    }

    /// Source-like rendering, used for diagnostics and non-text keys
    pub fn repr(&self) -> String {
        fn join(items: &[Value]) -> String {
            items.iter().map(Value::repr).collect::<Vec<_>>().join(", ")
        }
        match self {
            Value::None => "None".into(),
            Value::Bool(true) => "True".into(),
            Value::Bool(false) => "False".into(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format!("{f:?}"),
            Value::Str(s) => format!("{s:?}"),
            Value::Bytes(b) => format!("b{:?}", String::from_utf8_lossy(b)),
            Value::List(items) => format!("[{}]", join(items)),
            Value::Tuple(items) if items.len() == 1 => format!("({},)", items[0].repr()),
            Value::Tuple(items) => format!("({})", join(items)),
            Value::Dict(pairs) => format!(
                "{{{}}}",
                pairs
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.repr(), v.repr()))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Value::Set(items) => format!("{{{}}}", join(items)),
            Value::Function(func) => format!("<function {}>", func.name()),
            Value::Type(ty) => format!("<class '{}'>", ty.name()),
            Value::Object(object) => format!("<{} object>", object.class().name()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Arc<TypeDescriptor>> for Value {
    fn from(value: Arc<TypeDescriptor>) -> Self {
        Value::Type(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::object(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn dict_lookup_reports_missing_keys() {
        let fruit = Value::dict([("pears", 8), ("pecans", 100)]);
        assert!(matches!(fruit.lookup(&"pears".into()), Ok(Value::Int(8))));
        assert_eq!(
            fruit.lookup(&"plums".into()).unwrap_err(),
            LookupError::KeyNotFound("\"plums\"".into())
        );
    }

    #[test]
    fn length_and_keys_ask_instances() {
        let table = Arc::new(
            TypeDescriptor::new("Table")
                .with_method("__len__", |_| Ok(Value::Int(2)))
                .with_method("keys", |_| Ok(Value::list(["a", "b"]))),
        );
        let instance = Value::object(Object::new(table));
        assert_eq!(instance.length(), Some(2));
        assert_eq!(instance.mapping_keys().map(|k| k.len()), Some(2));

        assert_eq!(Value::Str("h\u{e9}llo".into()).length(), Some(5));
        assert_eq!(Value::Int(1).length(), None);
        assert!(Value::list([1]).mapping_keys().is_none());
    }

    #[test]
    fn dict_rejects_unhashable_keys() {
        let fruit = Value::dict([("pears", 8)]);
        assert!(matches!(
            fruit.lookup(&Value::list([1])),
            Err(LookupError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn sequence_lookup_supports_negative_indices() {
        let items = Value::list([1, 2, 3]);
        assert!(matches!(items.lookup(&Value::Int(-1)), Ok(Value::Int(3))));
        assert_eq!(
            items.lookup(&Value::Int(3)).unwrap_err(),
            LookupError::IndexOutOfRange(3)
        );
        assert!(matches!(
            items.lookup(&"x".into()),
            Err(LookupError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn string_indexing_is_by_character() {
        let word = Value::from("héllo");
        assert!(matches!(word.lookup(&Value::Int(1)), Ok(Value::Str(s)) if s == "é"));
    }

    #[test]
    fn sets_are_not_subscriptable() {
        let colours = Value::set(["red", "green", "red"]);
        assert!(matches!(&colours, Value::Set(members) if members.len() == 2));
        assert_eq!(
            colours.lookup(&Value::Int(0)).unwrap_err(),
            LookupError::NotSubscriptable("set".into())
        );
    }

    #[test]
    fn user_types_construct_instances_when_called() {
        let point = Arc::new(TypeDescriptor::new("Point"));
        let instance = Value::Type(point.clone()).call(&[]).unwrap();
        assert_eq!(instance.type_name(), "Point");
        assert!(matches!(
            Value::Type(builtin_type("str")).call(&[]),
            Err(EvalError::CallFailed { .. })
        ));
    }

    #[test]
    fn instances_with_call_member_are_callable() {
        let counter = Arc::new(
            TypeDescriptor::new("Counter")
                .with_method("__call__", |args: &[Value]| Ok(Value::Int(args.len() as i64))),
        );
        let instance = Value::object(Object::new(counter));
        assert!(instance.is_callable());
        assert!(matches!(instance.call(&[Value::None]), Ok(Value::Int(2))));
    }

    #[test]
    fn repr_matches_source_syntax() {
        assert_eq!(Value::dict([("a", Value::None)]).repr(), "{\"a\": None}");
        assert_eq!(Value::Tuple(vec![Value::Int(1)]).repr(), "(1,)");
        assert_eq!(Value::Bool(true).repr(), "True");
    }
}
