//! `go.mod` discovery and import path mapping.

use std::path::{Path, PathBuf};

use crate::error::LoadError;

/// The main Go module of the analyzed tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoModule {
    root: PathBuf,
    path: String,
}

impl GoModule {
    /// Creates a module description from its root directory and module path.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, path: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            path: path.into(),
        }
    }

    /// Finds the closest `go.mod` at or above `start`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::NoModule`] when no `go.mod` exists and
    /// [`LoadError::MissingModuleDirective`] when it lacks a `module` line.
    pub fn discover(start: &Path) -> Result<Self, LoadError> {
        let start = dunce::canonicalize(start).map_err(|e| LoadError::io(start, e))?;
        let mut dir = Some(start.as_path());
        while let Some(current) = dir {
            let candidate = current.join("go.mod");
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .map_err(|e| LoadError::io(&candidate, e))?;
                let path = parse_module_path(&content)
                    .ok_or(LoadError::MissingModuleDirective(candidate))?;
                tracing::debug!("Found module {} at {}", path, current.display());
                return Ok(Self::new(current, path));
            }
            dir = current.parent();
        }
        Err(LoadError::NoModule(start))
    }

    /// Module root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Module path from the `module` directive.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// `vendor/` directory of the module.
    #[must_use]
    pub fn vendor_dir(&self) -> PathBuf {
        self.root.join("vendor")
    }

    /// Import path of a directory inside the module.
    #[must_use]
    pub fn import_path_for_dir(&self, dir: &Path) -> Option<String> {
        let rel = dir.strip_prefix(&self.root).ok()?;
        let vendor = Path::new("vendor");
        if let Ok(vendored) = rel.strip_prefix(vendor) {
            return Some(slash_path(vendored));
        }
        let rel = slash_path(rel);
        if rel.is_empty() {
            Some(self.path.clone())
        } else {
            Some(format!("{}/{}", self.path, rel))
        }
    }

    /// Directory holding the package `import_path`, if it is in this module
    /// or vendored.
    #[must_use]
    pub fn dir_for_import(&self, import_path: &str) -> Option<PathBuf> {
        if import_path == self.path {
            return Some(self.root.clone());
        }
        if let Some(rel) = import_path
            .strip_prefix(&self.path)
            .and_then(|r| r.strip_prefix('/'))
        {
            let dir = self.root.join(rel);
            return dir.is_dir().then_some(dir);
        }
        let vendored = self.vendor_dir().join(import_path);
        vendored.is_dir().then_some(vendored)
    }
}

/// Extracts the module path from `go.mod` content.
#[must_use]
pub fn parse_module_path(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let path = rest.split("//").next()?.trim().trim_matches('"');
        (!path.is_empty()).then(|| path.to_owned())
    })
}

fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            std::path::Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_module_directive() {
        let content = "// comment\nmodule github.com/hashicorp/terraform-provider-azurerm\n\ngo 1.22\n";
        assert_eq!(
            parse_module_path(content).as_deref(),
            Some("github.com/hashicorp/terraform-provider-azurerm")
        );
        assert_eq!(parse_module_path("go 1.22\n"), None);
        assert_eq!(parse_module_path("modulex foo\n"), None);
    }

    #[test]
    fn maps_directories_to_import_paths() {
        let module = GoModule::new("/src/provider", "example.com/provider");
        assert_eq!(
            module
                .import_path_for_dir(Path::new("/src/provider/internal/services/network"))
                .as_deref(),
            Some("example.com/provider/internal/services/network")
        );
        assert_eq!(
            module
                .import_path_for_dir(Path::new("/src/provider/vendor/github.com/x/y"))
                .as_deref(),
            Some("github.com/x/y")
        );
        assert_eq!(module.import_path_for_dir(Path::new("/elsewhere")), None);
    }

    #[test]
    fn discovers_go_mod_upwards() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("go.mod"), "module example.com/p\n")?;
        let nested = dir.path().join("internal/services/network");
        std::fs::create_dir_all(&nested)?;

        let module = GoModule::discover(&nested)?;
        assert_eq!(module.path(), "example.com/p");
        assert_eq!(
            module.dir_for_import("example.com/p/internal/services/network"),
            Some(dunce::canonicalize(&nested)?)
        );
        assert_eq!(module.dir_for_import("fmt"), None);
        Ok(())
    }
}
