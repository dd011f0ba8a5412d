use super::Suggestion;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

static IMPORT_STATEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(import|from)\b").expect("import pattern is valid"));

/// Modules compiled into the interpreter rather than found on disk
const STANDARD_BUILTIN_MODULES: &[&str] = &[
    "_abc", "_ast", "_codecs", "_collections", "_functools", "_imp", "_io", "_locale",
    "_operator", "_signal", "_sre", "_stat", "_string", "_thread", "_tracemalloc",
    "_warnings", "_weakref", "atexit", "builtins", "errno", "faulthandler", "gc",
    "itertools", "marshal", "posix", "pwd", "sys", "time",
];

/// A module or package found by a [`ModuleDiscovery`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleInfo {
    /// Fully dotted module name
    pub name: String,
    /// Whether the module is a package that may hold submodules
    pub is_package: bool,
}

/// Source of module names for `import` and `from` completion
pub trait ModuleDiscovery: Send {
    /// Names of modules built into the interpreter
    fn builtin_module_names(&self) -> Vec<String>;

    /// Every importable module and package, submodules included
    fn discoverable_modules(&self) -> Vec<ModuleInfo>;
}

/// Finds modules by walking search path directories
///
/// A file with the source extension is a module; a directory holding the
/// package marker file is a package whose contents are walked with the
/// package name as prefix. Directories that cannot be read are skipped.
#[derive(Debug, Clone)]
pub struct PathModuleDiscovery {
    search_paths: Vec<PathBuf>,
    builtin_modules: Vec<String>,
    extension: String,
    package_marker: String,
}

impl Default for PathModuleDiscovery {
    fn default() -> Self {
        Self::new(Vec::<PathBuf>::new())
    }
}

impl PathModuleDiscovery {
    /// Discover modules under `search_paths`, searched in order
    pub fn new<P: Into<PathBuf>>(search_paths: impl IntoIterator<Item = P>) -> Self {
        Self {
            search_paths: search_paths.into_iter().map(Into::into).collect(),
            builtin_modules: STANDARD_BUILTIN_MODULES
                .iter()
                .map(|m| m.to_string())
                .collect(),
            extension: "py".into(),
            package_marker: "__init__.py".into(),
        }
    }

    /// Builder replacing the built-in module names
    #[must_use]
    pub fn with_builtin_modules<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.builtin_modules = names.into_iter().map(Into::into).collect();
        self
    }

    /// Builder setting the extension of module source files, without the dot
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Builder setting the file that marks a directory as a package
    #[must_use]
    pub fn with_package_marker(mut self, marker: impl Into<String>) -> Self {
        self.package_marker = marker.into();
        self
    }

    fn is_module_name(name: &str) -> bool {
        name.chars().next().is_some_and(|c| c == '_' || c.is_alphabetic())
            && name.chars().all(|c| c == '_' || c.is_alphanumeric())
    }

    fn walk(
        &self,
        dir: &Path,
        prefix: &str,
        found: &mut Vec<ModuleInfo>,
        seen: &mut BTreeSet<String>,
    ) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(dir = %dir.display(), %err, "skipping unreadable module directory");
                return;
            }
        };

        let marker_stem = Path::new(&self.package_marker)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        let mut modules = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                if path.join(&self.package_marker).is_file() {
                    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                        modules.push((name.to_string(), Some(path.clone())));
                    }
                }
            } else if path.extension().and_then(|e| e.to_str()) == Some(self.extension.as_str()) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if stem != marker_stem {
                        modules.push((stem.to_string(), None));
                    }
                }
            }
        }

        for (name, package_dir) in modules.into_iter().sorted() {
            if !Self::is_module_name(&name) {
                continue;
            }
            let dotted = format!("{prefix}{name}");
            if !seen.insert(dotted.clone()) {
                continue;
            }
            found.push(ModuleInfo {
                name: dotted.clone(),
                is_package: package_dir.is_some(),
            });
            if let Some(package_dir) = package_dir {
                self.walk(&package_dir, &format!("{dotted}."), found, seen);
            }
        }
    }
}

impl ModuleDiscovery for PathModuleDiscovery {
    fn builtin_module_names(&self) -> Vec<String> {
        self.builtin_modules.clone()
    }

    fn discoverable_modules(&self) -> Vec<ModuleInfo> {
        let mut found = Vec::new();
        let mut seen = BTreeSet::new();
        for dir in &self.search_paths {
            self.walk(dir, "", &mut found, &mut seen);
        }
        found
    }
}

/// Whether `text` (already trimmed) is an import statement
pub fn is_import_statement(text: &str) -> bool {
    IMPORT_STATEMENT.is_match(text)
}

/// Complete the module path at the end of an import statement.
///
/// Offers built-in module names (only while no `.` has been typed) and then
/// every discoverable module starting with the partial path. In a
/// `from pkg import x` clause the partial is looked up under `pkg` and the
/// prefix is stripped from what is offered. Nothing is offered once an `as`
/// clause has been typed.
pub fn import_matches(line: &str, modules: &dyn ModuleDiscovery) -> Vec<Suggestion> {
    let text = line.trim();
    let indent = &line[..line.len() - line.trim_start().len()];
    let words: Vec<&str> = text.split_whitespace().collect();

    if words.contains(&"as") {
        debug!(text, "no module completion after an as clause");
        return Vec::new();
    }

    let last_space = text
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(idx, c)| idx + c.len_utf8());
    let (pretext, last) = match last_space {
        Some(end) => (format!("{indent}{}", &text[..end]), words[words.len() - 1]),
        // a lone keyword completes the first module name
        None => (format!("{indent}{text} "), ""),
    };

    let module_path = match words.as_slice() {
        ["from", path, _, ..] => *path,
        _ => "",
    };
    let partial = if module_path.is_empty() {
        last.to_string()
    } else {
        format!("{module_path}.{last}")
    };

    let mut matches = Vec::new();
    if !partial.contains('.') {
        matches.extend(
            modules
                .builtin_module_names()
                .into_iter()
                .filter(|name| name.starts_with(&partial)),
        );
    }
    matches.extend(
        modules
            .discoverable_modules()
            .into_iter()
            .filter(|module| module.name.starts_with(&partial))
            .map(|module| match module_path {
                "" => module.name,
                path => module.name[path.len() + 1..].to_string(),
            }),
    );
    debug!(partial = partial.as_str(), count = matches.len(), "import matches");

    matches
        .into_iter()
        .map(|name| Suggestion::replacing(line, format!("{pretext}{name}"), name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("shutil.py"), "").unwrap();
        fs::write(root.join("socket.py"), "").unwrap();
        fs::write(root.join("not-a-module.py"), "").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();
        fs::create_dir_all(root.join("sqlite3")).unwrap();
        fs::write(root.join("sqlite3/__init__.py"), "").unwrap();
        fs::write(root.join("sqlite3/dbapi2.py"), "").unwrap();
        fs::create_dir_all(root.join("scratch")).unwrap();
        fs::write(root.join("scratch/data.py"), "").unwrap();
        dir
    }

    fn discovery(dir: &TempDir) -> PathModuleDiscovery {
        PathModuleDiscovery::new([dir.path()]).with_builtin_modules(["sys", "select", "time"])
    }

    fn values(suggestions: Vec<Suggestion>) -> Vec<String> {
        suggestions.into_iter().map(|s| s.value).collect()
    }

    #[test]
    fn walks_packages_recursively() {
        let dir = site();
        let names: Vec<(String, bool)> = discovery(&dir)
            .discoverable_modules()
            .into_iter()
            .map(|m| (m.name, m.is_package))
            .collect();
        assert_eq!(
            names,
            vec![
                ("shutil".to_string(), false),
                ("socket".to_string(), false),
                ("sqlite3".to_string(), true),
                ("sqlite3.dbapi2".to_string(), false),
            ]
        );
    }

    #[test]
    fn missing_search_path_is_skipped() {
        let modules = PathModuleDiscovery::new(["/definitely/not/here"]).discoverable_modules();
        assert!(modules.is_empty());
    }

    #[rstest]
    #[case(
        "import s",
        vec![
            "import sys",
            "import select",
            "import shutil",
            "import socket",
            "import sqlite3",
            "import sqlite3.dbapi2",
        ]
    )]
    #[case("import sq", vec!["import sqlite3", "import sqlite3.dbapi2"])]
    #[case("import sqlite3.", vec!["import sqlite3.dbapi2"])]
    #[case("from sqlite3 import d", vec!["from sqlite3 import dbapi2"])]
    #[case("import socket as s", vec![])]
    #[case("  import ti", vec!["  import time"])]
    fn completes_module_paths(#[case] line: &str, #[case] expected: Vec<&str>) {
        let dir = site();
        assert_eq!(values(import_matches(line, &discovery(&dir))), expected);
    }

    #[test]
    fn lone_keyword_offers_every_module() {
        let dir = site();
        let found = import_matches("import", &discovery(&dir));
        assert_eq!(found.len(), 7);
        assert!(found.iter().all(|s| s.value.starts_with("import ")));
        assert_eq!(found[0].display, "sys");
    }

    #[rstest]
    #[case("import os", true)]
    #[case("from os import path", true)]
    #[case("imported = 1", false)]
    #[case("fromage", false)]
    fn recognises_import_statements(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(is_import_statement(text), expected);
    }
}
