//! Cross-package lookup table for one run.

use std::collections::HashMap;
use std::sync::Arc;

use tree_sitter::Node;

use crate::file::{FileKey, GoFile};
use crate::package::GoPackage;

/// Every package loaded for the run, keyed by import path.
///
/// Populated by the loader before any analyzer runs and read-only after.
#[derive(Debug, Default, Clone)]
pub struct PackageRegistry {
    packages: HashMap<String, Arc<GoPackage>>,
    files: HashMap<FileKey, String>,
}

impl PackageRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a package, replacing any earlier package with the same path.
    pub fn insert(&mut self, package: GoPackage) -> Arc<GoPackage> {
        let package = Arc::new(package);
        for file in package.files() {
            self.files
                .insert(file.key(), package.import_path().to_owned());
        }
        self.packages
            .insert(package.import_path().to_owned(), Arc::clone(&package));
        package
    }

    /// Package with the given import path.
    #[must_use]
    pub fn get(&self, import_path: &str) -> Option<&Arc<GoPackage>> {
        self.packages.get(import_path)
    }

    /// Whether the import path is loaded.
    #[must_use]
    pub fn contains(&self, import_path: &str) -> bool {
        self.packages.contains_key(import_path)
    }

    /// Number of loaded packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether nothing is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// All loaded packages in no particular order.
    pub fn packages(&self) -> impl Iterator<Item = &Arc<GoPackage>> {
        self.packages.values()
    }

    /// Package owning the file `key`.
    #[must_use]
    pub fn package_of(&self, key: FileKey) -> Option<&Arc<GoPackage>> {
        self.files.get(&key).and_then(|p| self.packages.get(p))
    }

    /// File with the given key, in any loaded package.
    #[must_use]
    pub fn file(&self, key: FileKey) -> Option<&GoFile> {
        self.package_of(key).and_then(|p| p.file(key))
    }

    /// Top-level function `name` declared in package `import_path`.
    #[must_use]
    pub fn find_function(&self, import_path: &str, name: &str) -> Option<(&GoFile, Node<'_>)> {
        self.get(import_path)?.find_function(name)
    }

    /// Resolves a package identifier used in `file` to an import path,
    /// preferring loaded packages whose declared name matches.
    #[must_use]
    pub fn resolve_import<'a>(&'a self, file: &'a GoFile, alias: &str) -> Option<&'a str> {
        if let Some(spec) = file
            .imports()
            .iter()
            .find(|i| i.name.as_deref() == Some(alias))
        {
            return Some(&spec.path);
        }
        file.imports()
            .iter()
            .filter(|i| i.name.is_none())
            .find(|i| {
                self.get(&i.path)
                    .is_some_and(|p| p.name() == alias)
            })
            .map(|i| i.path.as_str())
            .or_else(|| file.import_path_for(alias))
    }
}
