//! Unified diff parsing.
//!
//! Only the target side matters: for every file block the parser records
//! the post-image line numbers of `+` lines and whether the block creates
//! or deletes the file.

use tracing::warn;

use crate::changeset::ChangeSet;
use crate::error::DiffError;

/// A parsed diff together with the number of file blocks it contained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDiff {
    /// The resulting change set.
    pub changes: ChangeSet,
    /// Count of `diff --git` blocks seen.
    pub blocks: usize,
}

#[derive(Debug, Default)]
struct FileBlock {
    path: String,
    is_new: bool,
    is_deleted: bool,
    added: Vec<usize>,
}

impl FileBlock {
    fn commit(self, changes: &mut ChangeSet) {
        if self.path.is_empty() {
            return;
        }
        changes.record_file(&self.path, self.is_new, self.is_deleted);
        for line in self.added {
            changes.record_line(&self.path, line);
        }
    }
}

/// Parses unified diff text into a change set normalized against `prefix`.
///
/// Empty input yields an empty change set.
///
/// # Errors
///
/// Returns [`DiffError::NoFileBlocks`] when the input is non-empty but
/// holds no `diff --git` block.
pub fn parse_unified_diff(text: &str, prefix: &str) -> Result<ParsedDiff, DiffError> {
    let mut changes = ChangeSet::with_prefix(prefix);
    let mut blocks = 0;
    let mut current: Option<FileBlock> = None;
    let mut in_hunk = false;
    let mut target_line = 0usize;

    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            if let Some(done) = current.take() {
                done.commit(&mut changes);
            }
            current = Some(FileBlock {
                path: target_path_from_header(rest).unwrap_or_default(),
                ..FileBlock::default()
            });
            blocks += 1;
            in_hunk = false;
            continue;
        }

        let Some(block) = current.as_mut() else {
            continue;
        };

        if line.starts_with("@@") {
            match parse_hunk_start(line) {
                Some(start) => {
                    target_line = start;
                    in_hunk = true;
                }
                None => {
                    warn!("Ignoring malformed hunk header in {}: {}", block.path, line);
                    in_hunk = false;
                }
            }
            continue;
        }

        if in_hunk {
            match line.as_bytes().first() {
                Some(b'+') => {
                    block.added.push(target_line);
                    target_line += 1;
                    continue;
                }
                // git strips the trailing space of empty context lines in some setups
                Some(b' ') | None => {
                    target_line += 1;
                    continue;
                }
                Some(b'-' | b'\\') => continue,
                Some(_) => in_hunk = false,
            }
        }

        if line.starts_with("new file mode") {
            block.is_new = true;
        } else if line.starts_with("deleted file mode") {
            block.is_deleted = true;
        } else if let Some(path) = line.strip_prefix("+++ ") {
            if let Some(path) = path.trim_end().strip_prefix("b/") {
                block.path = path.to_owned();
            }
        } else if let Some(path) = line.strip_prefix("rename to ") {
            block.path = path.trim_end().to_owned();
        }
    }

    if let Some(done) = current.take() {
        done.commit(&mut changes);
    }

    if blocks == 0 && !text.trim().is_empty() {
        return Err(DiffError::NoFileBlocks);
    }

    Ok(ParsedDiff { changes, blocks })
}

/// Extracts `Y` from `a/X b/Y`.
fn target_path_from_header(rest: &str) -> Option<String> {
    rest.rfind(" b/")
        .map(|i| rest[i + 3..].trim_end().to_owned())
}

/// Extracts `c` from `@@ -a,b +c,d @@`.
fn parse_hunk_start(line: &str) -> Option<usize> {
    let after = line.strip_prefix("@@")?.trim_start();
    let target = after.split_whitespace().find(|part| part.starts_with('+'))?;
    let start = target[1..].split(',').next()?;
    start.parse().ok()
}
