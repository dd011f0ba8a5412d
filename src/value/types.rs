use super::{Callable, Value};
use crate::result::{EvalResult, LookupError};
use once_cell::sync::Lazy;
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
    sync::Arc,
};

/// Custom `value[key]` hook; receives the subscripted value and the key
pub type LookupFn = dyn Fn(&Value, &Value) -> Result<Value, LookupError> + Send + Sync;

/// Description of a type: its name, bases and class-level members
///
/// Descriptors are immutable once shared, so the base graph cannot contain
/// cycles; the ancestor walk still tracks what it visited to collapse
/// diamonds.
pub struct TypeDescriptor {
    name: String,
    bases: Vec<Arc<TypeDescriptor>>,
    members: BTreeMap<String, Value>,
    lookup: Option<Arc<LookupFn>>,
    builtin: bool,
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field(
                "bases",
                &self.bases.iter().map(|b| b.name()).collect::<Vec<_>>(),
            )
            .field("members", &self.members.keys().collect::<Vec<_>>())
            .field("lookup", &self.lookup.is_some())
            .finish()
    }
}

impl TypeDescriptor {
    /// A user type deriving directly from `object`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            members: BTreeMap::new(),
            lookup: None,
            builtin: false,
        }
    }

    /// Builder adding a base type; bases are searched in the order added
    #[must_use]
    pub fn with_base(mut self, base: Arc<TypeDescriptor>) -> Self {
        self.bases.push(base);
        self
    }

    /// Builder adding a class-level member
    #[must_use]
    pub fn with_member(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.insert(name.into(), value.into());
        self
    }

    /// Builder adding a method backed by a host closure
    #[must_use]
    pub fn with_method<F>(self, name: &str, func: F) -> Self
    where
        F: Fn(&[Value]) -> EvalResult<Value> + Send + Sync + 'static,
    {
        self.with_member(name, Value::Function(Callable::new(name, func)))
    }

    /// Builder installing a custom subscript hook
    #[must_use]
    pub fn with_lookup<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value, &Value) -> Result<Value, LookupError> + Send + Sync + 'static,
    {
        self.lookup = Some(Arc::new(hook));
        self
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct bases, in declaration order
    pub fn bases(&self) -> &[Arc<TypeDescriptor>] {
        &self.bases
    }

    /// Members declared on this type itself
    pub fn members(&self) -> &BTreeMap<String, Value> {
        &self.members
    }

    /// Built-in types cannot be instantiated from the completer
    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    /// This type followed by every ancestor, depth first, left to right,
    /// each visited once and `object` always last.
    pub fn ancestors(self: &Arc<Self>) -> Vec<Arc<TypeDescriptor>> {
        let root = builtin_type("object");
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut pending = vec![self.clone()];

        while let Some(ty) = pending.pop() {
            if !seen.insert(Arc::as_ptr(&ty) as usize) || Arc::ptr_eq(&ty, &root) {
                continue;
            }
            pending.extend(ty.bases.iter().rev().cloned());
            order.push(ty);
        }
        order.push(root);
        order
    }

    /// Find a class-level member anywhere along the ancestor chain
    pub fn find_member(self: &Arc<Self>, name: &str) -> Option<Value> {
        self.ancestors()
            .iter()
            .find_map(|ty| ty.members.get(name).cloned())
    }

    /// First subscript hook along the ancestor chain
    pub fn find_lookup(self: &Arc<Self>) -> Option<Arc<LookupFn>> {
        self.ancestors().iter().find_map(|ty| ty.lookup.clone())
    }
}

fn builtin(name: &str, methods: &[&str]) -> TypeDescriptor {
    TypeDescriptor {
        name: name.to_string(),
        bases: Vec::new(),
        members: methods
            .iter()
            .map(|m| (m.to_string(), Value::Function(Callable::opaque(m))))
            .collect(),
        lookup: None,
        builtin: true,
    }
}

const OBJECT_METHODS: &[&str] = &[
    "__delattr__",
    "__dir__",
    "__eq__",
    "__format__",
    "__ge__",
    "__getattribute__",
    "__gt__",
    "__hash__",
    "__init__",
    "__init_subclass__",
    "__le__",
    "__lt__",
    "__ne__",
    "__new__",
    "__reduce__",
    "__reduce_ex__",
    "__repr__",
    "__setattr__",
    "__sizeof__",
    "__str__",
    "__subclasshook__",
];

const SEQUENCE_METHODS: &[&str] = &["__contains__", "__getitem__", "__iter__", "__len__"];

static BUILTINS: Lazy<HashMap<&'static str, Arc<TypeDescriptor>>> = Lazy::new(|| {
    let object = Arc::new(
        builtin("object", OBJECT_METHODS)
            .with_member("__doc__", "The base class of the class hierarchy."),
    );

    let mut types: HashMap<&'static str, Arc<TypeDescriptor>> = HashMap::new();
    let mut define = |name: &'static str, bases: &[&str], methods: &[&str], extra: &[&str]| {
        let resolved = bases
            .iter()
            .filter_map(|b| match *b {
                "object" => Some(object.clone()),
                other => types.get(other).cloned(),
            })
            .collect();
        let mut ty = TypeDescriptor {
            bases: resolved,
            ..builtin(name, methods)
        };
        for method in extra {
            ty.members.insert(
                method.to_string(),
                Value::Function(Callable::opaque(method)),
            );
        }
        types.insert(name, Arc::new(ty));
    };

    define("NoneType", &[], &["__bool__"], &[]);
    define(
        "int",
        &[],
        &[
            "as_integer_ratio",
            "bit_count",
            "bit_length",
            "conjugate",
            "from_bytes",
            "to_bytes",
        ],
        &["__abs__", "__add__", "__index__", "__int__"],
    );
    define("bool", &["int"], &[], &["__and__", "__or__", "__xor__"]);
    define(
        "float",
        &[],
        &["as_integer_ratio", "conjugate", "fromhex", "hex", "is_integer"],
        &["__abs__", "__add__", "__float__"],
    );
    define(
        "str",
        &[],
        &[
            "capitalize",
            "casefold",
            "center",
            "count",
            "encode",
            "endswith",
            "expandtabs",
            "find",
            "format",
            "index",
            "isalnum",
            "isalpha",
            "isdigit",
            "islower",
            "isnumeric",
            "isspace",
            "isupper",
            "join",
            "ljust",
            "lower",
            "lstrip",
            "partition",
            "replace",
            "rfind",
            "rindex",
            "rjust",
            "rsplit",
            "rstrip",
            "split",
            "splitlines",
            "startswith",
            "strip",
            "swapcase",
            "title",
            "upper",
            "zfill",
        ],
        SEQUENCE_METHODS,
    );
    define(
        "bytes",
        &[],
        &[
            "count",
            "decode",
            "endswith",
            "find",
            "hex",
            "join",
            "replace",
            "split",
            "startswith",
            "strip",
        ],
        SEQUENCE_METHODS,
    );
    define(
        "list",
        &[],
        &[
            "append", "clear", "copy", "count", "extend", "index", "insert", "pop", "remove",
            "reverse", "sort",
        ],
        SEQUENCE_METHODS,
    );
    define("tuple", &[], &["count", "index"], SEQUENCE_METHODS);
    define(
        "dict",
        &[],
        &[
            "clear",
            "copy",
            "fromkeys",
            "get",
            "items",
            "keys",
            "pop",
            "popitem",
            "setdefault",
            "update",
            "values",
        ],
        &["__contains__", "__getitem__", "__iter__", "__len__"],
    );
    define(
        "set",
        &[],
        &[
            "add",
            "clear",
            "copy",
            "difference",
            "discard",
            "intersection",
            "isdisjoint",
            "issubset",
            "issuperset",
            "pop",
            "remove",
            "symmetric_difference",
            "union",
            "update",
        ],
        &["__contains__", "__iter__", "__len__"],
    );
    define("function", &[], &["__call__", "__get__"], &[]);
    define(
        "type",
        &[],
        &["mro", "__subclasses__", "__instancecheck__", "__subclasscheck__"],
        &["__call__", "__prepare__"],
    );
    define("module", &[], &[], &[]);

    types.insert("object", object);
    types
});

/// Descriptor of a built-in type by name
///
/// Unknown names resolve to `object`.
pub fn builtin_type(name: &str) -> Arc<TypeDescriptor> {
    BUILTINS
        .get(name)
        .or_else(|| BUILTINS.get("object"))
        .cloned()
        .unwrap_or_else(|| Arc::new(builtin("object", OBJECT_METHODS)))
}
