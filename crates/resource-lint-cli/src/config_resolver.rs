//! Configuration file resolution with global fallback.
//!
//! The first match wins:
//!
//! 1. `--config` flag (explicit path, not checked for existence)
//! 2. `resource-lint.toml` or `.resource-lint.toml` in the current
//!    directory, then in the Go module root
//! 3. `~/.resource-lint/config.toml`, or `$RESOURCE_LINT_CONFIG_DIR/config.toml`
//! 4. built-in defaults

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use resource_lint_core::Config;

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found next to the sources.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// The config file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Reads the configuration, or the defaults for [`ConfigSource::Default`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            return Ok(Config::default());
        };
        Config::from_file(path).with_context(|| format!("failed to load config {}", path.display()))
    }
}

const PROJECT_CONFIG_NAMES: &[&str] = &["resource-lint.toml", ".resource-lint.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Environment variable overriding the global config directory.
const CONFIG_DIR_ENV: &str = "RESOURCE_LINT_CONFIG_DIR";

/// Resolves the configuration for a run in `work_dir` inside the module
/// rooted at `module_root`.
#[must_use]
pub fn resolve(work_dir: &Path, module_root: &Path, explicit: Option<&Path>) -> ConfigSource {
    let mut project_dirs = vec![work_dir];
    if module_root != work_dir {
        project_dirs.push(module_root);
    }
    resolve_in(&project_dirs, explicit, global_config_dir().as_deref())
}

fn resolve_in(project_dirs: &[&Path], explicit: Option<&Path>, global_dir: Option<&Path>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    let project = project_dirs
        .iter()
        .flat_map(|dir| PROJECT_CONFIG_NAMES.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file());
    if let Some(path) = project {
        tracing::debug!("Found project config: {}", path.display());
        return ConfigSource::Project(path);
    }

    match global_dir.map(|dir| dir.join(GLOBAL_CONFIG_NAME)) {
        Some(path) if path.is_file() => {
            tracing::debug!("Found global config: {}", path.display());
            ConfigSource::Global(path)
        }
        _ => ConfigSource::Default,
    }
}

/// The global config directory: `$RESOURCE_LINT_CONFIG_DIR`, else
/// `~/.resource-lint/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) => Some(PathBuf::from(dir)),
        None => home::home_dir().map(|home| home.join(".resource-lint")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "").unwrap();
        path
    }

    #[test]
    fn explicit_path_is_trusted_as_given() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "resource-lint.toml");
        let explicit = Path::new("/nonexistent/custom.toml");

        let source = resolve_in(&[tmp.path()], Some(explicit), None);
        assert_eq!(source, ConfigSource::Explicit(explicit.to_path_buf()));
        assert!(source.load().is_err());
    }

    #[test]
    fn work_dir_wins_over_module_root() {
        let root = TempDir::new().unwrap();
        let service = root.path().join("internal/services/web");
        fs::create_dir_all(&service).unwrap();
        touch(root.path(), "resource-lint.toml");

        let source = resolve_in(&[service.as_path(), root.path()], None, None);
        assert_eq!(source, ConfigSource::Project(root.path().join("resource-lint.toml")));

        let local = touch(&service, ".resource-lint.toml");
        let source = resolve_in(&[service.as_path(), root.path()], None, None);
        assert_eq!(source, ConfigSource::Project(local));
    }

    #[test]
    fn dashed_name_preferred_over_dot_prefix() {
        let tmp = TempDir::new().unwrap();
        let dashed = touch(tmp.path(), "resource-lint.toml");
        touch(tmp.path(), ".resource-lint.toml");

        assert_eq!(resolve_in(&[tmp.path()], None, None), ConfigSource::Project(dashed));
    }

    #[test]
    fn global_is_the_last_resort() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        assert_eq!(
            resolve_in(&[project.path()], None, Some(global.path())),
            ConfigSource::Default
        );

        let global_file = touch(global.path(), "config.toml");
        assert_eq!(
            resolve_in(&[project.path()], None, Some(global.path())),
            ConfigSource::Global(global_file)
        );

        touch(project.path(), "resource-lint.toml");
        assert!(matches!(
            resolve_in(&[project.path()], None, Some(global.path())),
            ConfigSource::Project(_)
        ));
    }

    #[test]
    fn load_reads_rules_and_reports_bad_files() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("resource-lint.toml");
        fs::write(&path, "[rules.AZBP005]\nenabled = false\n").unwrap();

        let config = ConfigSource::Project(path.clone()).load().unwrap();
        assert!(!config.is_rule_enabled("AZBP005"));
        assert!(config.is_rule_enabled("AZBP001"));

        fs::write(&path, "[rules\n").unwrap();
        let err = ConfigSource::Project(path).load().unwrap_err();
        assert!(err.to_string().starts_with("failed to load config"));
    }

    #[test]
    fn default_source_loads_defaults() {
        let config = ConfigSource::Default.load().unwrap();
        assert!(config.analyzer.include_tests);
        assert_eq!(config.changes.default_base, "main");
    }
}
