//! The normalized record of which files and lines a diff touched.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Directory under which provider services live. Paths are stored relative
/// to it so diffs taken from different working directories compare equal.
pub const SERVICE_PATH_PREFIX: &str = "internal/services/";

/// Files and lines touched by one diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    prefix: String,
    changed_lines: BTreeMap<String, BTreeSet<usize>>,
    changed_files: BTreeSet<String>,
    new_files: BTreeSet<String>,
    deleted_files: BTreeSet<String>,
}

impl Default for ChangeSet {
    fn default() -> Self {
        Self::with_prefix(SERVICE_PATH_PREFIX)
    }
}

impl ChangeSet {
    /// Creates an empty change set using [`SERVICE_PATH_PREFIX`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty change set normalizing paths against `prefix`.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into().replace('\\', "/");
        if !prefix.is_empty() && !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self {
            prefix,
            changed_lines: BTreeMap::new(),
            changed_files: BTreeSet::new(),
            new_files: BTreeSet::new(),
            deleted_files: BTreeSet::new(),
        }
    }

    /// The service path prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Normalized key of `path` and whether it lies under the prefix.
    ///
    /// The key is the part of the path after the first occurrence of the
    /// prefix; paths outside the prefix keep their slash-separated form.
    #[must_use]
    pub fn normalize(&self, path: &str) -> (String, bool) {
        let slashed = path.replace('\\', "/");
        let anchored = if slashed.starts_with(&self.prefix) {
            Some(0)
        } else {
            slashed.find(&format!("/{}", self.prefix)).map(|i| i + 1)
        };
        match anchored {
            Some(start) if !self.prefix.is_empty() => {
                (slashed[start + self.prefix.len()..].to_owned(), true)
            }
            _ => (slashed.trim_start_matches("./").to_owned(), false),
        }
    }

    fn key(&self, path: &Path) -> (String, bool) {
        self.normalize(&path.to_string_lossy())
    }

    pub(crate) fn record_file(&mut self, path: &str, is_new: bool, is_deleted: bool) {
        let (key, _) = self.normalize(path);
        if is_new {
            self.new_files.insert(key.clone());
        }
        if is_deleted {
            self.deleted_files.insert(key.clone());
        }
        self.changed_files.insert(key);
    }

    pub(crate) fn record_line(&mut self, path: &str, line: usize) {
        let (key, _) = self.normalize(path);
        self.changed_lines.entry(key).or_default().insert(line);
    }

    /// Whether a finding at `file:line` should be reported.
    ///
    /// Files outside the service prefix are always reportable; files
    /// inside it only on lines the diff added.
    #[must_use]
    pub fn should_report(&self, file: &Path, line: usize) -> bool {
        let (key, under_prefix) = self.key(file);
        if !under_prefix {
            return true;
        }
        self.changed_lines
            .get(&key)
            .is_some_and(|lines| lines.contains(&line))
    }

    /// Whether the diff touched `file` at all.
    #[must_use]
    pub fn is_file_changed(&self, file: &Path) -> bool {
        self.changed_files.contains(&self.key(file).0)
    }

    /// Whether the diff created `file`.
    #[must_use]
    pub fn is_new_file(&self, file: &Path) -> bool {
        self.new_files.contains(&self.key(file).0)
    }

    /// Whether `line` of `file` was added by the diff.
    #[must_use]
    pub fn is_line_changed(&self, file: &Path, line: usize) -> bool {
        self.changed_lines
            .get(&self.key(file).0)
            .is_some_and(|lines| lines.contains(&line))
    }

    /// Whether `line` of `file` is part of a newly created file.
    #[must_use]
    pub fn is_new_line(&self, file: &Path, line: usize) -> bool {
        self.is_new_file(file) && self.is_line_changed(file, line)
    }

    /// Added lines of `file`, if any.
    #[must_use]
    pub fn changed_lines(&self, file: &Path) -> Option<&BTreeSet<usize>> {
        self.changed_lines.get(&self.key(file).0)
    }

    /// Normalized keys of all touched files.
    pub fn changed_files(&self) -> impl Iterator<Item = &str> {
        self.changed_files.iter().map(String::as_str)
    }

    /// Package directories (`internal/services/<svc>/...`) holding changed,
    /// non-deleted Go files.
    #[must_use]
    pub fn changed_packages(&self) -> Vec<String> {
        let mut packages = BTreeSet::new();
        for file in &self.changed_files {
            if self.deleted_files.contains(file) || !file.ends_with(".go") {
                continue;
            }
            if self.normalize(&format!("{}{file}", self.prefix)).0 != *file {
                continue;
            }
            if let Some((dir, _)) = file.rsplit_once('/') {
                packages.insert(format!("{}{dir}", self.prefix));
            }
        }
        packages.into_iter().collect()
    }

    /// Number of touched files.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.changed_files.len()
    }

    /// Whether the diff touched nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed_files.is_empty()
    }
}

/// `ShouldReport` for an optional change set: without one, everything is
/// reportable.
#[must_use]
pub fn should_report(changes: Option<&ChangeSet>, file: &Path, line: usize) -> bool {
    changes.map_or(true, |c| c.should_report(file, line))
}

/// New-file query for an optional change set: without one, every file
/// counts as new.
#[must_use]
pub fn is_new_file(changes: Option<&ChangeSet>, file: &Path) -> bool {
    changes.map_or(true, |c| c.is_new_file(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ChangeSet {
        let mut cs = ChangeSet::new();
        cs.record_file("internal/services/network/lb_resource.go", false, false);
        cs.record_line("internal/services/network/lb_resource.go", 10);
        cs.record_line("internal/services/network/lb_resource.go", 11);
        cs.record_file("internal/services/network/probe_resource.go", true, false);
        cs.record_line("internal/services/network/probe_resource.go", 1);
        cs.record_file("internal/services/compute/old.go", false, true);
        cs.record_file("website/docs/r/lb.html.markdown", false, false);
        cs
    }

    #[test]
    fn normalizes_relative_and_absolute_paths_alike() {
        let cs = ChangeSet::new();
        assert_eq!(
            cs.normalize("/home/dev/provider/internal/services/network/a.go"),
            ("network/a.go".to_owned(), true)
        );
        assert_eq!(
            cs.normalize("internal/services/network/a.go"),
            ("network/a.go".to_owned(), true)
        );
        assert_eq!(cs.normalize("./utils/x.go"), ("utils/x.go".to_owned(), false));
    }

    #[test]
    fn should_report_only_changed_lines_under_prefix() {
        let cs = sample();
        let file = Path::new("/src/internal/services/network/lb_resource.go");
        assert!(cs.should_report(file, 10));
        assert!(!cs.should_report(file, 12));
        assert!(!cs.should_report(
            Path::new("internal/services/network/untouched.go"),
            1
        ));
        assert!(cs.should_report(Path::new("/src/utils/pointer.go"), 99));
    }

    #[test]
    fn missing_change_set_reports_everything() {
        assert!(should_report(None, Path::new("internal/services/x/a.go"), 5));
        assert!(is_new_file(None, Path::new("internal/services/x/a.go")));
    }

    #[test]
    fn new_files_are_tracked() {
        let cs = sample();
        let probe = Path::new("internal/services/network/probe_resource.go");
        assert!(cs.is_new_file(probe));
        assert!(cs.is_new_line(probe, 1));
        assert!(!cs.is_new_line(probe, 2));
        assert!(!cs.is_new_file(Path::new("internal/services/network/lb_resource.go")));
    }

    #[test]
    fn changed_packages_skip_deleted_and_non_go_files() {
        let cs = sample();
        assert_eq!(
            cs.changed_packages(),
            vec!["internal/services/network".to_owned()]
        );
    }
}
