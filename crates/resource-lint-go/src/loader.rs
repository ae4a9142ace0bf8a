//! Package pattern expansion and loading.
//!
//! Patterns follow the Go tool: `./...`, `./internal/services/network/...`,
//! `./internal/services/network`, or full import paths below the main
//! module. Root packages are loaded with their test files; their imports
//! are then followed transitively through the module and `vendor/` so that
//! cross-package lookups can see dependency sources.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::LoadError;
use crate::file::GoFile;
use crate::module::GoModule;
use crate::package::GoPackage;
use crate::registry::PackageRegistry;

/// Result of a load: the root packages, everything reachable, and the
/// errors found in root packages.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Import paths of the packages matched by the patterns.
    pub roots: Vec<String>,
    /// Roots plus their transitively loaded dependencies.
    pub registry: PackageRegistry,
    /// Errors in root packages. Any entry here makes the load unusable.
    pub errors: Vec<LoadError>,
}

impl LoadOutcome {
    /// Whether any root package failed to load.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Loads Go packages from disk.
#[derive(Debug)]
pub struct PackageLoader {
    module: GoModule,
    cwd: PathBuf,
    include_tests: bool,
    follow_imports: bool,
    exclude: Vec<glob::Pattern>,
}

impl PackageLoader {
    /// Creates a loader for `module`, resolving relative patterns against `cwd`.
    #[must_use]
    pub fn new(module: GoModule, cwd: impl Into<PathBuf>) -> Self {
        Self {
            module,
            cwd: cwd.into(),
            include_tests: true,
            follow_imports: true,
            exclude: Vec::new(),
        }
    }

    /// Whether `_test.go` files of root packages are loaded (default: true).
    #[must_use]
    pub fn include_tests(mut self, include: bool) -> Self {
        self.include_tests = include;
        self
    }

    /// Whether imports are followed into the module and `vendor/` (default: true).
    #[must_use]
    pub fn follow_imports(mut self, follow: bool) -> Self {
        self.follow_imports = follow;
        self
    }

    /// Adds glob patterns for files that should never be loaded.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Glob`] for an invalid pattern.
    pub fn exclude<I, S>(mut self, patterns: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            self.exclude.push(glob::Pattern::new(pattern.as_ref())?);
        }
        Ok(self)
    }

    /// Loads every package matched by `patterns`.
    ///
    /// # Errors
    ///
    /// Returns an error when a pattern is outside the module or matches
    /// nothing. Parse errors are reported through [`LoadOutcome::errors`].
    pub fn load(&self, patterns: &[String]) -> Result<LoadOutcome, LoadError> {
        let mut dirs = BTreeSet::new();
        for pattern in patterns {
            let matched = self.expand(pattern)?;
            if matched.is_empty() {
                return Err(LoadError::NoPackages(pattern.clone()));
            }
            dirs.extend(matched);
        }

        let mut outcome = LoadOutcome::default();
        let mut queue = VecDeque::new();

        for dir in dirs {
            let import_path = self
                .module
                .import_path_for_dir(&dir)
                .ok_or_else(|| LoadError::OutsideModule(dir.display().to_string()))?;
            match self.load_dir(&dir, &import_path, self.include_tests) {
                Ok(Some(package)) => {
                    queue.extend(imports_of(&package));
                    outcome.roots.push(import_path);
                    outcome.registry.insert(package);
                }
                Ok(None) => debug!("No Go files in {}", dir.display()),
                Err(errors) => outcome.errors.extend(errors),
            }
        }

        if self.follow_imports {
            self.load_dependencies(&mut outcome.registry, queue);
        }

        info!(
            "Loaded {} root package(s), {} package(s) in total",
            outcome.roots.len(),
            outcome.registry.len()
        );
        Ok(outcome)
    }

    /// Loads the single package in `dir` without following imports.
    ///
    /// # Errors
    ///
    /// Returns the parse errors of the package files.
    pub fn load_package_dir(
        &self,
        dir: &Path,
        import_path: &str,
    ) -> Result<Option<GoPackage>, Vec<LoadError>> {
        self.load_dir(dir, import_path, false)
    }

    fn load_dependencies(&self, registry: &mut PackageRegistry, mut queue: VecDeque<String>) {
        let mut seen: HashSet<String> = HashSet::new();
        while let Some(import_path) = queue.pop_front() {
            if registry.contains(&import_path) || !seen.insert(import_path.clone()) {
                continue;
            }
            let Some(dir) = self.module.dir_for_import(&import_path) else {
                continue;
            };
            match self.load_dir(&dir, &import_path, false) {
                Ok(Some(package)) => {
                    queue.extend(imports_of(&package));
                    registry.insert(package);
                }
                Ok(None) => {}
                Err(errors) => {
                    for error in errors {
                        debug!("Skipping dependency {}: {}", import_path, error);
                    }
                }
            }
        }
    }

    fn load_dir(
        &self,
        dir: &Path,
        import_path: &str,
        include_tests: bool,
    ) -> Result<Option<GoPackage>, Vec<LoadError>> {
        let entries = std::fs::read_dir(dir).map_err(|e| vec![LoadError::io(dir, e)])?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "go"))
            .filter(|p| {
                include_tests
                    || !p
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.ends_with("_test.go"))
            })
            .filter(|p| !self.is_excluded(p))
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Ok(None);
        }

        let mut files = Vec::with_capacity(paths.len());
        let mut errors = Vec::new();
        for path in paths {
            debug!("Parsing {}", path.display());
            let source = match std::fs::read_to_string(&path) {
                Ok(s) => s,
                Err(e) => {
                    errors.push(LoadError::io(&path, e));
                    continue;
                }
            };
            let display = path
                .strip_prefix(&self.cwd)
                .map_or_else(|_| path.clone(), Path::to_path_buf);
            match GoFile::parse(&path, display, source) {
                Ok(file) => files.push(file),
                Err(e) => errors.push(e),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        GoPackage::new(import_path, dir, files)
            .map(Some)
            .map_err(|e| vec![e])
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        self.exclude.iter().any(|p| p.matches(&text))
    }

    /// Expands one pattern into package directories.
    fn expand(&self, pattern: &str) -> Result<Vec<PathBuf>, LoadError> {
        let (base, recursive) = match pattern.strip_suffix("...") {
            Some(rest) => (rest.trim_end_matches('/'), true),
            None => (pattern, false),
        };

        let base_dir = self.base_dir(base, pattern)?;
        let Ok(base_dir) = dunce::canonicalize(&base_dir) else {
            return Ok(Vec::new());
        };
        if !base_dir.starts_with(self.module.root()) {
            return Err(LoadError::OutsideModule(pattern.to_owned()));
        }

        if !recursive {
            return Ok(if base_dir.is_dir() {
                vec![base_dir]
            } else {
                Vec::new()
            });
        }

        let mut dirs = BTreeSet::new();
        let walker = ignore::WalkBuilder::new(&base_dir)
            .standard_filters(false)
            .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry))
            .build();
        for entry in walker {
            let entry = entry.map_err(|e| LoadError::Walk {
                path: base_dir.clone(),
                message: e.to_string(),
            })?;
            let path = entry.path();
            if entry.file_type().is_some_and(|t| t.is_file())
                && path.extension().is_some_and(|e| e == "go")
            {
                if let Some(parent) = path.parent() {
                    dirs.insert(parent.to_path_buf());
                }
            }
        }
        Ok(dirs.into_iter().collect())
    }

    fn base_dir(&self, base: &str, pattern: &str) -> Result<PathBuf, LoadError> {
        if base.is_empty() || base == "." {
            return Ok(self.cwd.clone());
        }
        let as_path = Path::new(base);
        if base.starts_with('.') || as_path.is_absolute() {
            return Ok(self.cwd.join(as_path));
        }
        let module_path = self.module.path();
        if base == module_path {
            return Ok(self.module.root().to_path_buf());
        }
        match base
            .strip_prefix(module_path)
            .and_then(|r| r.strip_prefix('/'))
        {
            Some(rel) => Ok(self.module.root().join(rel)),
            None => Err(LoadError::OutsideModule(pattern.to_owned())),
        }
    }
}

fn is_skipped_dir(entry: &ignore::DirEntry) -> bool {
    if !entry.file_type().is_some_and(|t| t.is_dir()) {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name == "vendor" || name == "testdata" || name.starts_with('.') || name.starts_with('_')
}

fn imports_of(package: &GoPackage) -> Vec<String> {
    let mut out: Vec<String> = package
        .files()
        .iter()
        .flat_map(|f| f.imports().iter().map(|i| i.path.clone()))
        .collect();
    out.sort();
    out.dedup();
    out
}
