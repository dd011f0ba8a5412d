use super::{Evaluator, Introspector};
use crate::{
    namespace::Namespace,
    result::{EvalError, EvalResult},
    value::{builtin_type, TypeDescriptor, Value},
};
use std::{
    collections::{BTreeSet, HashSet},
    sync::Arc,
};

/// Evaluator and introspector over [`Value`]s bound in a [`Namespace`]
///
/// Understands postfix chains: a name or literal followed by any number of
/// `.member`, `[key]` and `(args)` steps. Keys and arguments are themselves
/// such chains. Anything else is reported as a syntax error.
///
/// # Example
///
/// ```rust
/// use probeline::{Evaluator, Namespace, NamespaceEvaluator, Value};
///
/// let ns = Namespace::new().with_global("a", Value::dict([("pears", 8)]));
/// let value = NamespaceEvaluator.evaluate("a['pears']", &ns).unwrap();
/// assert!(matches!(value, Value::Int(8)));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct NamespaceEvaluator;

/// Deepest bracket nesting accepted before giving up with a syntax error
const MAX_NESTING: usize = 100;

impl Evaluator for NamespaceEvaluator {
    fn evaluate(&self, expr: &str, namespace: &Namespace) -> EvalResult<Value> {
        let mut parser = Parser {
            text: expr,
            pos: 0,
            depth: 0,
            namespace,
            introspector: self,
        };
        let value = parser.chain()?;
        parser.skip_whitespace();
        if parser.pos < expr.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(value)
    }
}

impl Introspector for NamespaceEvaluator {
    fn members_of(&self, value: &Value) -> BTreeSet<String> {
        match value {
            Value::Object(object) => object
                .attrs()
                .keys()
                .chain(object.class().members().keys())
                .cloned()
                .collect(),
            Value::Type(ty) => ty.members().keys().cloned().collect(),
            other => other.class().members().keys().cloned().collect(),
        }
    }

    fn ancestors_of(&self, value: &Value) -> Vec<Arc<TypeDescriptor>> {
        match value {
            // a type also exposes what its own type (`type`) declares
            Value::Type(ty) => {
                let mut seen = HashSet::new();
                ty.ancestors()
                    .into_iter()
                    .chain(builtin_type("type").ancestors())
                    .filter(|t| seen.insert(Arc::as_ptr(t) as usize))
                    .collect()
            }
            other => other.class().ancestors(),
        }
    }

    fn member(&self, value: &Value, name: &str) -> Option<Value> {
        if name == "__class__" {
            return Some(Value::Type(value.class()));
        }
        match value {
            Value::Object(object) => object
                .attrs()
                .get(name)
                .cloned()
                .or_else(|| object.class().find_member(name)),
            Value::Type(ty) => ty
                .find_member(name)
                .or_else(|| builtin_type("type").find_member(name)),
            other => other.class().find_member(name),
        }
    }
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
    depth: usize,
    namespace: &'a Namespace,
    introspector: &'a NamespaceEvaluator,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> EvalResult<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{expected}'")))
        }
    }

    fn error(&self, message: &str) -> EvalError {
        EvalError::Syntax {
            position: self.pos,
            message: message.to_string(),
        }
    }

    /// Keys, arguments and bracketed items all recurse through here, so this
    /// is where nesting is bounded.
    fn chain(&mut self) -> EvalResult<Value> {
        if self.depth >= MAX_NESTING {
            return Err(self.error("too deeply nested"));
        }
        self.depth += 1;
        let value = self.postfix();
        self.depth -= 1;
        value
    }

    fn postfix(&mut self) -> EvalResult<Value> {
        let mut value = self.primary()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('.') => {
                    self.bump();
                    self.skip_whitespace();
                    let name = self.identifier()?;
                    value = self.introspector.member(&value, &name).ok_or_else(|| {
                        EvalError::MissingAttribute {
                            owner: value.type_name(),
                            name,
                        }
                    })?;
                }
                Some('[') => {
                    self.bump();
                    let key = self.chain()?;
                    self.expect(']')?;
                    value = value.lookup(&key)?;
                }
                Some('(') => {
                    self.bump();
                    let args = self.items(')')?;
                    value = value.call(&args)?;
                }
                _ => return Ok(value),
            }
        }
    }

    /// Comma separated chains up to `close`, trailing comma allowed
    fn items(&mut self, close: char) -> EvalResult<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            if self.eat(close) {
                return Ok(items);
            }
            items.push(self.chain()?);
            if !self.eat(',') {
                self.expect(close)?;
                return Ok(items);
            }
        }
    }

    fn primary(&mut self) -> EvalResult<Value> {
        self.skip_whitespace();
        match self.peek() {
            Some(c) if c == '_' || c.is_alphabetic() => {
                let name = self.identifier()?;
                match name.as_str() {
                    "None" => Ok(Value::None),
                    "True" => Ok(Value::Bool(true)),
                    "False" => Ok(Value::Bool(false)),
                    _ => self
                        .namespace
                        .get(&name)
                        .cloned()
                        .ok_or(EvalError::UnknownName(name)),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '-' => self.number(),
            Some(quote @ ('\'' | '"')) => self.string(quote),
            Some('(') => {
                self.bump();
                let mut items = Vec::new();
                loop {
                    // `()` and `(x,)` are tuples, `(x)` only groups
                    if self.eat(')') {
                        return Ok(Value::Tuple(items));
                    }
                    items.push(self.chain()?);
                    if !self.eat(',') {
                        self.expect(')')?;
                        return Ok(match items.len() {
                            1 => items.remove(0),
                            _ => Value::Tuple(items),
                        });
                    }
                }
            }
            Some('[') => {
                self.bump();
                Ok(Value::List(self.items(']')?))
            }
            Some(_) => Err(self.error("expected a name or literal")),
            None => Err(self.error("unexpected end of expression")),
        }
    }

    fn identifier(&mut self) -> EvalResult<String> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c == '_' || c.is_alphanumeric()) {
            self.bump();
        }
        let name = &self.text[start..self.pos];
        if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(self.error("expected an identifier"));
        }
        Ok(name.to_string())
    }

    fn number(&mut self) -> EvalResult<Value> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        let mut is_float = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '_' {
                self.bump();
            } else if c == '.'
                && !is_float
                && self.text[self.pos + 1..].starts_with(|d: char| d.is_ascii_digit())
            {
                is_float = true;
                self.bump();
            } else {
                break;
            }
        }
        let literal = self.text[start..self.pos].replace('_', "");
        if is_float {
            literal
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| self.error(&e.to_string()))
        } else {
            literal
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| self.error(&e.to_string()))
        }
    }

    fn string(&mut self, quote: char) -> EvalResult<Value> {
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(Value::Str(text)),
                Some('\\') => match self.bump() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some('r') => text.push('\r'),
                    Some('0') => text.push('\0'),
                    Some(c @ ('\\' | '\'' | '"')) => text.push(c),
                    Some(c) => {
                        text.push('\\');
                        text.push(c);
                    }
                    None => break,
                },
                Some(c) => text.push(c),
                None => break,
            }
        }
        Err(self.error("unterminated string literal"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        result::LookupError,
        value::{Object, TypeDescriptor},
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn namespace() -> Namespace {
        let point = Arc::new(TypeDescriptor::new("Point").with_member("dims", 2));
        Namespace::with_standard_builtins()
            .with_global("a", Value::dict([("pears", 8), ("pecans", 100)]))
            .with_global("nums", Value::list([1, 2, 3]))
            .with_global(
                "p",
                Object::new(point.clone())
                    .with_attr("x", 1)
                    .with_attr("tags", Value::list(["a"])),
            )
            .with_global("Point", point)
            .with_global(
                "add",
                Value::function("add", |args: &[Value]| match args {
                    [Value::Int(a), Value::Int(b)] => Ok(Value::Int(a + b)),
                    _ => Err(EvalError::CallFailed {
                        name: "add".into(),
                        reason: "expected two ints".into(),
                    }),
                }),
            )
    }

    fn eval(expr: &str) -> EvalResult<Value> {
        NamespaceEvaluator.evaluate(expr, &namespace())
    }

    #[rstest]
    #[case("a['pears']", "8")]
    #[case("a[\"pecans\"]", "100")]
    #[case("nums[-1]", "3")]
    #[case("p.x", "1")]
    #[case("p.dims", "2")]
    #[case("p.tags[0]", "\"a\"")]
    #[case("add(1, 2)", "3")]
    #[case("( nums ) [ 0 ]", "1")]
    #[case("[1, 2][1]", "2")]
    #[case("(1,)", "(1,)")]
    #[case("'it\\'s'", "\"it's\"")]
    #[case("1.5", "1.5")]
    #[case("None", "None")]
    fn evaluates_postfix_chains(#[case] expr: &str, #[case] expected: &str) {
        assert_eq!(eval(expr).map(|v| v.repr()), Ok(expected.to_string()));
    }

    #[test]
    fn reports_unknown_names() {
        assert!(matches!(eval("nope.x"), Err(EvalError::UnknownName(name)) if name == "nope"));
    }

    #[test]
    fn reports_missing_attributes() {
        assert!(matches!(
            eval("p.y"),
            Err(EvalError::MissingAttribute { owner, name }) if owner == "Point" && name == "y"
        ));
    }

    #[test]
    fn reports_failed_lookups() {
        assert!(matches!(
            eval("a['plums']"),
            Err(EvalError::Lookup(LookupError::KeyNotFound(_)))
        ));
    }

    #[rstest]
    #[case("a[")]
    #[case("a b")]
    #[case("'open")]
    #[case("")]
    #[case("p.")]
    fn rejects_malformed_expressions(#[case] expr: &str) {
        assert!(matches!(eval(expr), Err(EvalError::Syntax { .. })));
    }

    #[rstest]
    #[case(format!("{}1{}", "[".repeat(5000), "]".repeat(5000)))]
    #[case(format!("nums{}0{}", "[".repeat(5000), "]".repeat(5000)))]
    #[case(format!("add{}", "(".repeat(5000)))]
    fn deep_nesting_is_a_syntax_error(#[case] expr: String) {
        assert!(matches!(
            eval(&expr),
            Err(EvalError::Syntax { message, .. }) if message == "too deeply nested"
        ));
    }

    #[test]
    fn moderate_nesting_still_evaluates() {
        let expr = format!("{}1{}", "[".repeat(50), "]".repeat(50));
        assert!(eval(&expr).is_ok());
    }

    #[test]
    fn class_is_always_available() {
        let class = eval("p.__class__").unwrap();
        assert!(matches!(class, Value::Type(t) if t.name() == "Point"));
    }

    #[test]
    fn members_of_instance_include_attributes_and_class_members() {
        let p = eval("p").unwrap();
        let members = NamespaceEvaluator.members_of(&p);
        assert!(members.contains("x"));
        assert!(members.contains("dims"));
        assert!(!members.contains("__repr__"));
    }

    #[test]
    fn ancestors_of_type_include_metatype() {
        let point = eval("Point").unwrap();
        let names: Vec<String> = NamespaceEvaluator
            .ancestors_of(&point)
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["Point", "object", "type"]);
    }
}
