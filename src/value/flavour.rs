use super::Value;
use crate::result::LookupError;
use strum::{Display, EnumIter};

/// Key no real mapping is expected to contain
const PROBE_KEY: &str = "__Zz_Really-Unlykely-KeY_3.14159";

/// Integer index far past the end of any real sequence (2^61 - 1)
const PROBE_INDEX: i64 = 2_305_843_009_213_693_951;

/// How a value behaves under `[]`, judged by structure rather than type name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Flavour {
    /// Keyed lookup
    Mapping,
    /// Integer positional lookup
    Sequence,
    /// Membership only, no lookup
    Set,
    /// None of the above, or could not tell
    Unknown,
}

impl Flavour {
    /// Classify a value.
    ///
    /// Well-known containers are recognised directly. Anything else that
    /// accepts `[]` is probed, first with a key that cannot collide with real
    /// data and then with an absurdly large index; the kind of failure each
    /// probe produces decides the flavour. Probing runs custom lookup hooks,
    /// so it only happens once the direct checks have failed.
    pub fn of(value: &Value) -> Flavour {
        match value {
            Value::Dict(_) => return Flavour::Mapping,
            Value::List(_) | Value::Tuple(_) => return Flavour::Sequence,
            Value::Set(_) => return Flavour::Set,
            _ => {}
        }

        if !value.supports_lookup() {
            return Flavour::Unknown;
        }

        if let Err(LookupError::KeyNotFound(_)) = value.lookup(&Value::from(PROBE_KEY)) {
            return Flavour::Mapping;
        }

        match value.lookup(&Value::Int(PROBE_INDEX)) {
            Err(LookupError::IndexOutOfRange(_)) => Flavour::Sequence,
            _ => Flavour::Unknown,
        }
    }
}

/// Text appended to a completed name to hint at how its value continues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxHint {
    /// Plain data or sets: nothing to add
    Nothing,
    /// Mapping: open a quoted key lookup
    KeyLookup,
    /// Sequence: open an index lookup
    IndexLookup,
    /// Invocable: open an argument list
    Call,
    /// Anything else with members: member access
    Member,
}

impl SyntaxHint {
    /// Pick the hint for a resolved value
    pub fn of(value: &Value) -> SyntaxHint {
        if value.is_scalar() {
            return SyntaxHint::Nothing;
        }
        match Flavour::of(value) {
            Flavour::Mapping => SyntaxHint::KeyLookup,
            Flavour::Sequence => SyntaxHint::IndexLookup,
            Flavour::Set => SyntaxHint::Nothing,
            Flavour::Unknown if value.is_callable() => SyntaxHint::Call,
            Flavour::Unknown => SyntaxHint::Member,
        }
    }

    /// Append the hint to `word`, quoting key lookups with `key_quote`
    pub fn decorate(self, mut word: String, key_quote: char) -> String {
        match self {
            SyntaxHint::Nothing => {}
            SyntaxHint::KeyLookup => {
                word.push('[');
                word.push(key_quote);
            }
            SyntaxHint::IndexLookup => word.push('['),
            SyntaxHint::Call => word.push('('),
            SyntaxHint::Member => word.push('.'),
        }
        word
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Object, TypeDescriptor};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use strum::IntoEnumIterator;

    fn instance_of(ty: TypeDescriptor) -> Value {
        Value::object(Object::new(Arc::new(ty)))
    }

    #[rstest]
    #[case(Value::dict([("a", 1)]), Flavour::Mapping)]
    #[case(Value::list([1, 2]), Flavour::Sequence)]
    #[case(Value::Tuple(vec![]), Flavour::Sequence)]
    #[case(Value::set([1]), Flavour::Set)]
    #[case(Value::Str("abc".into()), Flavour::Sequence)]
    #[case(Value::Bytes(b"abc".to_vec()), Flavour::Sequence)]
    #[case(Value::Int(3), Flavour::Unknown)]
    #[case(Value::None, Flavour::Unknown)]
    fn classifies_builtin_values(#[case] value: Value, #[case] expected: Flavour) {
        assert_eq!(Flavour::of(&value), expected);
    }

    #[test]
    fn probes_custom_mapping() {
        let table = instance_of(
            TypeDescriptor::new("Table")
                .with_lookup(|_, key| Err(LookupError::KeyNotFound(key.repr()))),
        );
        assert_eq!(Flavour::of(&table), Flavour::Mapping);
    }

    #[test]
    fn probes_custom_sequence() {
        let rows = instance_of(TypeDescriptor::new("Rows").with_lookup(|_, key| match key {
            Value::Int(i) => Err(LookupError::IndexOutOfRange(*i)),
            other => Err(LookupError::TypeMismatch {
                container: "Rows".into(),
                key: other.type_name(),
            }),
        }));
        assert_eq!(Flavour::of(&rows), Flavour::Sequence);
    }

    #[test]
    fn probe_that_succeeds_is_unknown() {
        let anything =
            instance_of(TypeDescriptor::new("Anything").with_lookup(|_, _| Ok(Value::None)));
        assert_eq!(Flavour::of(&anything), Flavour::Unknown);
    }

    #[test]
    fn values_without_lookup_are_never_probed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let func = Value::function("f", move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(Value::None)
        });
        assert_eq!(Flavour::of(&func), Flavour::Unknown);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn flavour_names_are_kebab_case() {
        let names: Vec<String> = Flavour::iter().map(|f| f.to_string()).collect();
        assert_eq!(names, vec!["mapping", "sequence", "set", "unknown"]);
    }

    #[rstest]
    #[case(Value::Int(1), "x")]
    #[case(Value::Str("s".into()), "x")]
    #[case(Value::dict([("k", 1)]), "x['")]
    #[case(Value::list([1]), "x[")]
    #[case(Value::set([1]), "x")]
    #[case(Value::function("f", |_| Ok(Value::None)), "x(")]
    #[case(Value::Type(Arc::new(TypeDescriptor::new("T"))), "x(")]
    #[case(Value::module("os", Vec::<(String, Value)>::new()), "x.")]
    fn hints_follow_value_kind(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(SyntaxHint::of(&value).decorate("x".into(), '\''), expected);
    }

    #[test]
    fn key_lookup_uses_configured_quote() {
        assert_eq!(SyntaxHint::KeyLookup.decorate("d".into(), '"'), "d[\"");
    }
}
