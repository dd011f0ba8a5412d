use super::{
    extract::{extract, Decomposition},
    imports::{import_matches, is_import_statement, ModuleDiscovery, PathModuleDiscovery},
    keywords::Keywords,
    Completer, Suggestion,
};
use crate::{
    config::CompleterConfig,
    core_editor::LineEditor,
    eval::{Evaluator, Introspector, NamespaceEvaluator},
    namespace::{Namespace, SharedNamespace, HIDDEN_NAME},
    result::EvalError,
    value::{Flavour, SyntaxHint, Value},
};
use itertools::Itertools;
use std::{collections::BTreeSet, sync::PoisonError};
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

/// Whether `expr` contains a call that evaluating it would perform
///
/// ```rust
/// use probeline::completion::has_call;
///
/// assert!(has_call("os.getcwd().sp"));
/// assert!(!has_call("print(a"));
/// assert!(!has_call("a.b"));
/// ```
pub fn has_call(expr: &str) -> bool {
    let opens = expr.matches('(').count();
    let closes = expr.matches(')').count();
    closes > 0 && opens >= closes
}

/// Which leading-underscore names an attribute listing leaves out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shading {
    /// Hide names starting with `_`
    Private,
    /// Hide names starting with `__`
    Dunder,
    /// Show everything
    Off,
}

impl Shading {
    fn for_partial(partial: &str) -> Shading {
        match partial {
            "" => Shading::Private,
            "_" => Shading::Dunder,
            _ => Shading::Off,
        }
    }

    fn hides(self, name: &str) -> bool {
        match self {
            Shading::Private => name.starts_with('_'),
            Shading::Dunder => name.starts_with("__"),
            Shading::Off => false,
        }
    }

    fn widen(self) -> Option<Shading> {
        match self {
            Shading::Private => Some(Shading::Dunder),
            Shading::Dunder => Some(Shading::Off),
            Shading::Off => None,
        }
    }
}

/// Context-sensitive completion of source lines against a live namespace
///
/// The line is decomposed into the expression being completed and the
/// fragment typed so far, then one of five strategies produces matches:
/// module names in import statements, keys of a mapping, indices of a
/// sequence, members of an object, or bare names (keywords and everything
/// bound in the namespace). Each match is returned as the whole line it
/// would produce.
///
/// Expressions are only evaluated when they contain no call, unless
/// [`CompleterConfig::allow_eval_of_calls`] is set.
///
/// # Example
///
/// ```rust
/// use probeline::{Completer, LineBuffer, Namespace, ScriptCompleter, Value};
///
/// let namespace = Namespace::with_standard_builtins()
///     .with_global("a", Value::dict([("pears", 8), ("pecans", 100)]))
///     .into_shared();
/// let mut completer = ScriptCompleter::new(namespace);
/// let mut buffer = LineBuffer::from("a['pe");
///
/// let values: Vec<String> = completer
///     .complete("a['pe", &mut buffer)
///     .into_iter()
///     .map(|s| s.value)
///     .collect();
/// assert_eq!(values, vec!["a['pears']", "a['pecans']"]);
/// ```
pub struct ScriptCompleter {
    namespace: SharedNamespace,
    evaluator: Box<dyn Evaluator>,
    introspector: Box<dyn Introspector>,
    modules: Box<dyn ModuleDiscovery>,
    keywords: Keywords,
    config: CompleterConfig,
}

impl ScriptCompleter {
    /// Complete against `namespace` with the default evaluator, the standard
    /// keywords and no module search path
    pub fn new(namespace: SharedNamespace) -> Self {
        Self {
            namespace,
            evaluator: Box::new(NamespaceEvaluator),
            introspector: Box::new(NamespaceEvaluator),
            modules: Box::new(PathModuleDiscovery::default()),
            keywords: Keywords::default(),
            config: CompleterConfig::default(),
        }
    }

    /// Builder replacing the expression evaluator
    #[must_use]
    pub fn with_evaluator(mut self, evaluator: Box<dyn Evaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Builder replacing the member introspector
    #[must_use]
    pub fn with_introspector(mut self, introspector: Box<dyn Introspector>) -> Self {
        self.introspector = introspector;
        self
    }

    /// Builder replacing where module names come from
    #[must_use]
    pub fn with_module_discovery(mut self, modules: Box<dyn ModuleDiscovery>) -> Self {
        self.modules = modules;
        self
    }

    /// Builder replacing the keyword table
    #[must_use]
    pub fn with_keywords(mut self, keywords: Keywords) -> Self {
        self.keywords = keywords;
        self
    }

    /// Builder replacing the settings
    #[must_use]
    pub fn with_config(mut self, config: CompleterConfig) -> Self {
        self.config = config;
        self
    }

    /// Current settings
    pub fn config(&self) -> &CompleterConfig {
        &self.config
    }

    /// Settings, for changing between requests
    pub fn config_mut(&mut self) -> &mut CompleterConfig {
        &mut self.config
    }

    /// The namespace completions are drawn from
    pub fn namespace(&self) -> &SharedNamespace {
        &self.namespace
    }

    /// Complete against a different namespace from now on
    pub fn set_namespace(&mut self, namespace: SharedNamespace) {
        self.namespace = namespace;
    }

    /// Evaluate `expr`, unless it contains a call and calls are not allowed.
    /// Failures are logged and yield `None`.
    fn resolve(&self, expr: &str, namespace: &Namespace) -> Option<Value> {
        let resolved = if has_call(expr) && !self.config.allow_eval_of_calls {
            Err(EvalError::CallBlocked(expr.to_string()))
        } else {
            self.evaluator.evaluate(expr, namespace)
        };
        match resolved {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(expr, %err, "could not resolve expression");
                None
            }
        }
    }

    fn decorate(&self, word: String, value: Option<&Value>) -> String {
        match value {
            Some(value) => SyntaxHint::of(value).decorate(word, self.config.key_quote()),
            None => word,
        }
    }

    /// Keywords, then visible names, starting with `prefix`
    fn global_matches(&self, prefix: &str, namespace: &Namespace) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut matches = Vec::new();
        for (word, suffix) in self.keywords.matching(prefix) {
            seen.insert(word.to_string());
            matches.push(format!("{word}{suffix}"));
        }
        for (name, value) in namespace.visible() {
            if name.starts_with(prefix) && seen.insert(name.to_string()) {
                matches.push(self.decorate(name.to_string(), Some(value)));
            }
        }
        matches
    }

    /// Members of the value of everything before the last `.` in `expr`
    fn attribute_matches(&self, expr: &str, namespace: &Namespace) -> Vec<String> {
        let Some((base, partial)) = expr.rsplit_once('.') else {
            return Vec::new();
        };
        let Some(value) = self.resolve(base, namespace) else {
            return Vec::new();
        };

        let mut names = self.introspector.members_of(&value);
        names.insert("__class__".to_string());
        for ancestor in self.introspector.ancestors_of(&value) {
            names.extend(ancestor.members().keys().cloned());
        }
        names.remove(HIDDEN_NAME);

        let mut shading = Shading::for_partial(partial);
        loop {
            let matches: Vec<String> = names
                .iter()
                .filter(|name| name.starts_with(partial) && !shading.hides(name))
                .map(|name| {
                    let member = self.introspector.member(&value, name);
                    self.decorate(format!("{base}.{name}"), member.as_ref())
                })
                .sorted()
                .collect();
            match shading.widen() {
                Some(wider) if matches.is_empty() => shading = wider,
                _ => return matches,
            }
        }
    }
}

/// Keys of a mapping that are text and start with `prefix`
fn mapping_matches(value: &Value, prefix: &str) -> Vec<String> {
    value
        .mapping_keys()
        .unwrap_or_default()
        .into_iter()
        .filter_map(|key| match key {
            Value::Str(key) if key.starts_with(prefix) => Some(key),
            _ => None,
        })
        .collect()
}

/// Valid indices of a sequence whose decimal form starts with `prefix`
fn sequence_matches(value: &Value, prefix: &str) -> Vec<String> {
    (0..value.length().unwrap_or(0))
        .map(|index| index.to_string())
        .filter(|index| index.starts_with(prefix))
        .collect()
}

impl Completer for ScriptCompleter {
    fn complete(&mut self, line: &str, editor: &mut dyn LineEditor) -> Vec<Suggestion> {
        if self.config.complete_imports && is_import_statement(line.trim()) {
            return import_matches(line, self.modules.as_ref());
        }

        let namespace = self
            .namespace
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let parts = extract(line);
        let typed_quote = parts.key_quote();
        let Decomposition {
            pretext,
            mut expr,
            mut lookup_token,
            mut padding,
            fragment,
        } = parts;
        let mut closing = String::new();

        let matches = if lookup_token.starts_with('[') {
            let Some(value) = self.resolve(&expr, &namespace) else {
                return Vec::new();
            };
            let flavour = Flavour::of(&value);
            debug!(expr = expr.as_str(), %flavour, "completing a lookup");
            match flavour {
                Flavour::Mapping => {
                    let quote = match typed_quote {
                        Some(quote) => quote,
                        None => {
                            let quote = self.config.key_quote();
                            lookup_token.push(quote);
                            quote
                        }
                    };
                    closing = format!("{quote}]");
                    if !padding.is_empty() {
                        lookup_token = format!("[{padding}{quote}");
                        padding.clear();
                    }
                    mapping_matches(&value, &fragment)
                }
                Flavour::Sequence => {
                    closing.push(']');
                    sequence_matches(&value, &fragment)
                }
                Flavour::Set => {
                    // sets have no lookup: turn `s[` into `s.`
                    let typed = format!("{lookup_token}{padding}{fragment}");
                    editor.delete_before(typed.graphemes(true).count());
                    editor.insert_text(".");
                    return Vec::new();
                }
                Flavour::Unknown => return Vec::new(),
            }
        } else if expr.contains('.') {
            let matches = self.attribute_matches(&expr, &namespace);
            expr.clear();
            matches
        } else if expr.is_empty() {
            self.global_matches(&fragment, &namespace)
        } else {
            let matches = self.global_matches(&expr, &namespace);
            expr.clear();
            matches
        };

        debug!(line, count = matches.len(), "completion matches");
        matches
            .into_iter()
            .map(|found| {
                let value = format!("{pretext}{expr}{lookup_token}{padding}{found}{closing}");
                Suggestion::replacing(line, value, found)
            })
            .collect()
    }
}
