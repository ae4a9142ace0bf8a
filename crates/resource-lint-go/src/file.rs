//! A single parsed Go source file.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use tree_sitter::{Language, Node, Parser, Tree};

use crate::ast::{self, Walk};
use crate::error::LoadError;

static NEXT_FILE_KEY: AtomicU32 = AtomicU32::new(1);

/// Run-unique identity of a parsed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileKey(u32);

impl FileKey {
    fn mint() -> Self {
        Self(NEXT_FILE_KEY.fetch_add(1, Ordering::Relaxed))
    }
}

/// Opaque handle to a syntax node, valid for the lifetime of the run.
///
/// Analyzers exchange `NodeRef`s instead of borrowed tree-sitter nodes so
/// that facts can outlive the pass that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    /// File owning the node.
    pub file: FileKey,
    /// Start byte offset.
    pub start: usize,
    /// End byte offset.
    pub end: usize,
    /// Grammar kind of the node.
    pub kind: &'static str,
}

/// 1-indexed source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed, in bytes).
    pub column: usize,
}

/// An import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Explicit local name (`foo "example.com/bar"`), if any.
    pub name: Option<String>,
    /// Imported path without quotes.
    pub path: String,
}

/// A `//` or `/* */` comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Start line (1-indexed).
    pub line: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// Start byte offset.
    pub start: usize,
    /// End byte offset.
    pub end: usize,
    /// Raw comment text including the comment markers.
    pub text: String,
}

/// A parsed Go source file.
pub struct GoFile {
    key: FileKey,
    path: PathBuf,
    display_path: PathBuf,
    source: String,
    tree: Tree,
    package_name: String,
    imports: Vec<ImportSpec>,
    comments: Vec<Comment>,
}

impl std::fmt::Debug for GoFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoFile")
            .field("key", &self.key)
            .field("path", &self.path)
            .field("package_name", &self.package_name)
            .finish_non_exhaustive()
    }
}

impl GoFile {
    /// Parses `source` as the Go file at `path`.
    ///
    /// `display_path` is what diagnostics print; it is usually the path
    /// relative to the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Syntax`] if the tree contains error nodes and
    /// [`LoadError::MissingPackageClause`] if there is no package clause.
    pub fn parse(
        path: impl Into<PathBuf>,
        display_path: impl Into<PathBuf>,
        source: String,
    ) -> Result<Self, LoadError> {
        let path = path.into();
        let language: Language = tree_sitter_go::LANGUAGE.into();
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| LoadError::Language(e.to_string()))?;

        let tree = parser
            .parse(source.as_bytes(), None)
            .ok_or_else(|| LoadError::Syntax {
                path: path.clone(),
                line: 1,
                column: 1,
            })?;

        let root = tree.root_node();
        if root.has_error() {
            let (line, column) = first_error(root).map_or((1, 1), |n| {
                let p = n.start_position();
                (p.row + 1, p.column + 1)
            });
            return Err(LoadError::Syntax { path, line, column });
        }

        let src = source.as_bytes();
        let mut package_name = None;
        let mut imports = Vec::new();
        for node in ast::named_children(root) {
            match node.kind() {
                "package_clause" => {
                    package_name = ast::first_named(node).map(|n| text_of(n, src).to_owned());
                }
                "import_declaration" => collect_imports(node, src, &mut imports),
                _ => {}
            }
        }

        let package_name = package_name.ok_or_else(|| LoadError::MissingPackageClause {
            path: path.clone(),
        })?;

        let mut comments = Vec::new();
        ast::walk(root, |node| {
            if node.kind() == "comment" {
                comments.push(Comment {
                    line: node.start_position().row + 1,
                    end_line: node.end_position().row + 1,
                    start: node.start_byte(),
                    end: node.end_byte(),
                    text: text_of(node, src).to_owned(),
                });
            }
            Walk::Continue
        });

        Ok(Self {
            key: FileKey::mint(),
            path,
            display_path: display_path.into(),
            source,
            tree,
            package_name,
            imports,
            comments,
        })
    }

    /// Run-unique key of this file.
    #[must_use]
    pub fn key(&self) -> FileKey {
        self.key
    }

    /// Absolute path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path used when printing diagnostics.
    #[must_use]
    pub fn display_path(&self) -> &Path {
        &self.display_path
    }

    /// Base name of the file (e.g. `lb_resource.go`).
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Whether this is a `_test.go` file.
    #[must_use]
    pub fn is_test(&self) -> bool {
        self.file_name().ends_with("_test.go")
    }

    /// Full source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Declared package name.
    #[must_use]
    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Import table in declaration order.
    #[must_use]
    pub fn imports(&self) -> &[ImportSpec] {
        &self.imports
    }

    /// All comments in source order.
    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Root `source_file` node.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text covered by `node`.
    #[must_use]
    pub fn text(&self, node: Node<'_>) -> &str {
        text_of(node, self.source.as_bytes())
    }

    /// Start position of `node`.
    #[must_use]
    pub fn position(&self, node: Node<'_>) -> Position {
        let p = node.start_position();
        Position {
            line: p.row + 1,
            column: p.column + 1,
        }
    }

    /// Mints a handle for `node`.
    #[must_use]
    pub fn node_ref(&self, node: Node<'_>) -> NodeRef {
        NodeRef {
            file: self.key,
            start: node.start_byte(),
            end: node.end_byte(),
            kind: node.kind(),
        }
    }

    /// Resolves a handle minted by [`GoFile::node_ref`] back to its node.
    #[must_use]
    pub fn resolve(&self, node_ref: &NodeRef) -> Option<Node<'_>> {
        if node_ref.file != self.key {
            return None;
        }
        let mut node = self
            .root()
            .descendant_for_byte_range(node_ref.start, node_ref.end)?;
        loop {
            if node.kind() == node_ref.kind
                && node.start_byte() == node_ref.start
                && node.end_byte() == node_ref.end
            {
                return Some(node);
            }
            let parent = node.parent()?;
            if parent.start_byte() < node_ref.start || parent.end_byte() > node_ref.end {
                return None;
            }
            node = parent;
        }
    }

    /// Resolves a package identifier used in this file to its import path.
    ///
    /// Explicit import names win; otherwise the last path element is
    /// compared, ignoring a trailing `/vN` major version suffix.
    #[must_use]
    pub fn import_path_for(&self, alias: &str) -> Option<&str> {
        if let Some(spec) = self
            .imports
            .iter()
            .find(|i| i.name.as_deref() == Some(alias))
        {
            return Some(&spec.path);
        }
        self.imports
            .iter()
            .filter(|i| i.name.is_none())
            .find(|i| default_package_name(&i.path) == alias)
            .map(|i| i.path.as_str())
    }

    /// Comments starting on `line`.
    pub fn comments_on_line(&self, line: usize) -> impl Iterator<Item = &Comment> {
        self.comments.iter().filter(move |c| c.line == line)
    }

    /// Comments lying entirely within the byte range `start..end`.
    pub fn comments_between(&self, start: usize, end: usize) -> impl Iterator<Item = &Comment> {
        self.comments
            .iter()
            .filter(move |c| c.start >= start && c.end <= end)
    }
}

/// Package name Go assumes for an unaliased import of `path`.
#[must_use]
pub fn default_package_name(path: &str) -> &str {
    let mut segments = path.rsplit('/');
    let last = segments.next().unwrap_or(path);
    let is_major_version = last.len() > 1
        && last.starts_with('v')
        && last[1..].chars().all(|c| c.is_ascii_digit());
    if is_major_version {
        segments.next().unwrap_or(last)
    } else {
        last
    }
}

fn text_of<'a>(node: Node<'_>, src: &'a [u8]) -> &'a str {
    std::str::from_utf8(&src[node.start_byte()..node.end_byte()]).unwrap_or("")
}

fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut found = None;
    ast::walk(root, |node| {
        if found.is_some() {
            return Walk::Skip;
        }
        if node.is_error() || node.is_missing() {
            found = Some(node);
            return Walk::Skip;
        }
        if node.has_error() {
            Walk::Continue
        } else {
            Walk::Skip
        }
    });
    found
}

fn collect_imports(node: Node<'_>, src: &[u8], out: &mut Vec<ImportSpec>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "import_spec" => {
                let Some(path) = child.child_by_field_name("path") else {
                    continue;
                };
                let name = child
                    .child_by_field_name("name")
                    .map(|n| text_of(n, src).to_owned());
                out.push(ImportSpec {
                    name,
                    path: ast::unquote(text_of(path, src)).to_owned(),
                });
            }
            "import_spec_list" => collect_imports(child, src, out),
            _ => {}
        }
    }
}
