//! A Go package: the parsed files of one directory.

use std::path::{Path, PathBuf};

use tree_sitter::Node;

use crate::ast;
use crate::error::LoadError;
use crate::file::{FileKey, GoFile};

/// Parsed files sharing one package clause.
#[derive(Debug)]
pub struct GoPackage {
    import_path: String,
    name: String,
    dir: PathBuf,
    files: Vec<GoFile>,
}

impl GoPackage {
    /// Assembles a package from already parsed files.
    ///
    /// Files of an external test package (`package foo_test`) are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::MixedPackages`] when the remaining files
    /// declare different package names.
    pub fn new(
        import_path: impl Into<String>,
        dir: impl Into<PathBuf>,
        files: Vec<GoFile>,
    ) -> Result<Self, LoadError> {
        let dir = dir.into();
        let mut name: Option<String> = None;
        let mut kept = Vec::with_capacity(files.len());

        for file in files {
            let declared = file.package_name();
            if file.is_test() && declared.ends_with("_test") {
                continue;
            }
            match &name {
                None => name = Some(declared.to_owned()),
                Some(existing) if existing != declared => {
                    return Err(LoadError::MixedPackages {
                        dir,
                        first: existing.clone(),
                        second: declared.to_owned(),
                    });
                }
                Some(_) => {}
            }
            kept.push(file);
        }

        Ok(Self {
            import_path: import_path.into(),
            name: name.unwrap_or_default(),
            dir,
            files: kept,
        })
    }

    /// Builds a package from in-memory sources, mainly for tests and tools.
    ///
    /// # Errors
    ///
    /// Returns the first parse error, or a package mismatch error.
    pub fn from_sources(import_path: &str, sources: &[(&str, &str)]) -> Result<Self, LoadError> {
        let dir = PathBuf::from("/virtual").join(import_path);
        let files = sources
            .iter()
            .map(|(name, src)| GoFile::parse(dir.join(name), *name, (*src).to_owned()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(import_path, dir, files)
    }

    /// Full import path.
    #[must_use]
    pub fn import_path(&self) -> &str {
        &self.import_path
    }

    /// Declared package name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory holding the sources.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// All files, test files included.
    #[must_use]
    pub fn files(&self) -> &[GoFile] {
        &self.files
    }

    /// File with the given key.
    #[must_use]
    pub fn file(&self, key: FileKey) -> Option<&GoFile> {
        self.files.iter().find(|f| f.key() == key)
    }

    /// Top-level function `name` (not a method).
    #[must_use]
    pub fn find_function(&self, name: &str) -> Option<(&GoFile, Node<'_>)> {
        self.top_level("function_declaration")
            .find(|(file, node)| decl_name(file, *node) == Some(name))
    }

    /// Method `name` declared on receiver type `receiver` (pointer or value).
    #[must_use]
    pub fn find_method(&self, receiver: &str, name: &str) -> Option<(&GoFile, Node<'_>)> {
        self.top_level("method_declaration").find(|(file, node)| {
            decl_name(file, *node) == Some(name)
                && receiver_type_name(file, *node) == Some(receiver)
        })
    }

    /// `type_spec` declaring `name`.
    #[must_use]
    pub fn find_type(&self, name: &str) -> Option<(&GoFile, Node<'_>)> {
        self.top_level("type_declaration").find_map(|(file, decl)| {
            ast::named_children(decl)
                .into_iter()
                .filter(|n| matches!(n.kind(), "type_spec" | "type_alias"))
                .find(|spec| {
                    spec.child_by_field_name("name")
                        .is_some_and(|n| file.text(n) == name)
                })
                .map(|spec| (file, spec))
        })
    }

    /// Whether a top-level function `name` exists.
    #[must_use]
    pub fn has_function(&self, name: &str) -> bool {
        self.find_function(name).is_some()
    }

    fn top_level<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = (&'a GoFile, Node<'a>)> {
        self.files.iter().flat_map(move |file| {
            ast::named_children(file.root())
                .into_iter()
                .filter(move |n| n.kind() == kind)
                .map(move |n| (file, n))
        })
    }
}

/// Declared name of a function, method or type spec.
#[must_use]
pub fn decl_name<'a>(file: &'a GoFile, node: Node<'_>) -> Option<&'a str> {
    node.child_by_field_name("name").map(|n| file.text(n))
}

/// Receiver type of a method, with pointer and type arguments stripped.
#[must_use]
pub fn receiver_type_name<'a>(file: &'a GoFile, method: Node<'_>) -> Option<&'a str> {
    let receiver = method.child_by_field_name("receiver")?;
    let param = ast::named_children(receiver)
        .into_iter()
        .find(|n| n.kind() == "parameter_declaration")?;
    let mut ty = param.child_by_field_name("type")?;
    loop {
        match ty.kind() {
            "pointer_type" | "generic_type" => ty = ast::first_named(ty)?,
            "type_identifier" => return Some(file.text(ty)),
            _ => return None,
        }
    }
}

/// Name of the receiver variable of a method (`r` in `func (r T) ...`).
#[must_use]
pub fn receiver_var_name<'a>(file: &'a GoFile, method: Node<'_>) -> Option<&'a str> {
    let receiver = method.child_by_field_name("receiver")?;
    let param = ast::named_children(receiver)
        .into_iter()
        .find(|n| n.kind() == "parameter_declaration")?;
    param.child_by_field_name("name").map(|n| file.text(n))
}
