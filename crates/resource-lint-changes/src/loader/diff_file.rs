use std::path::{Path, PathBuf};

use tracing::info;

use crate::changeset::ChangeSet;
use crate::diff::parse_unified_diff;
use crate::error::{ChangeError, DiffError};

use super::ChangeLoader;

/// Reads a unified diff from a file.
#[derive(Debug, Clone)]
pub struct DiffFileLoader {
    path: PathBuf,
    prefix: String,
}

impl DiffFileLoader {
    /// Creates a loader for the diff at `path`.
    #[must_use]
    pub fn new(path: impl AsRef<Path>, prefix: &str) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            prefix: prefix.to_owned(),
        }
    }
}

impl ChangeLoader for DiffFileLoader {
    fn describe(&self) -> String {
        format!("diff file {}", self.path.display())
    }

    fn is_explicit(&self) -> bool {
        true
    }

    fn load(&self) -> Result<ChangeSet, ChangeError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| ChangeError::DiffFile {
            path: self.path.clone(),
            source,
        })?;
        let parsed = parse_unified_diff(&text, &self.prefix)?;
        if parsed.blocks == 0 {
            return Err(DiffError::NoFileBlocks.into());
        }
        info!(
            "Loaded {} changed file(s) from {}",
            parsed.changes.file_count(),
            self.path.display()
        );
        Ok(parsed.changes)
    }
}
