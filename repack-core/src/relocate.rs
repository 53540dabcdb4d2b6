//! Two-phase collision-free batch file relocation.
//!
//! Moving a batch of files into a directory that may already contain files
//! at the destination paths is unsafe to do one move at a time: a move
//! processed later can have its source sitting at a path an earlier move
//! already claimed as its destination, and a direct rename would destroy a
//! file that has not yet been read. [`Relocation`] sidesteps the ordering
//! problem entirely with an intermediate disjoint namespace:
//!
//! 1. pick a token no filename in the pre-relocation snapshot starts with;
//! 2. *stage*: move every file to its destination directory under the
//!    token-prefixed name; staged names cannot collide with unmoved sources
//!    or with each other;
//! 3. *commit*: re-snapshot the destination root and strip the token prefix
//!    from every staged file, yielding the final names.
//!
//! The result is correct for any processing order and any collision cycle
//! between sources and destinations.

use std::fs;
use std::hash::{BuildHasher, RandomState};
use std::path::PathBuf;

use eyre::{Result, WrapErr, bail, eyre};

use crate::fsops::ensure_dir;
use crate::walk::{SnapshotEntry, snapshot};

/// One pending move from a source file to its final destination path.
#[derive(Debug, Clone)]
pub struct Move {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// A file parked in its destination directory under a token-prefixed name.
#[derive(Debug, Clone)]
pub struct StagedFile {
    /// Where the file currently sits.
    pub staged: PathBuf,
    /// Where [`Relocation::commit`] will leave it.
    pub destination: PathBuf,
}

/// A prepared batch relocation into `root`.
pub struct Relocation {
    root: PathBuf,
    token: String,
}

impl Relocation {
    /// Prepare a relocation into `root`, picking a token that is not a
    /// prefix of any filename in the pre-relocation snapshot.
    pub fn prepare(root: impl Into<PathBuf>, entries: &[SnapshotEntry]) -> Self {
        Self {
            root: root.into(),
            token: generate_token(entries),
        }
    }

    /// The staging token chosen for this relocation.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Phase 1: move every file to its destination directory under the
    /// token-prefixed name, creating destination directories as needed.
    pub fn stage(&self, moves: &[Move]) -> Result<Vec<StagedFile>> {
        let mut staged = Vec::with_capacity(moves.len());
        for mv in moves {
            let dir = mv
                .destination
                .parent()
                .ok_or_else(|| eyre!("destination {} has no parent", mv.destination.display()))?;
            let name = mv
                .destination
                .file_name()
                .ok_or_else(|| eyre!("destination {} has no file name", mv.destination.display()))?;
            ensure_dir(dir)?;
            let parked = dir.join(format!("{}{}", self.token, name.to_string_lossy()));
            fs::rename(&mv.source, &parked).wrap_err_with(|| {
                format!(
                    "failed to stage {} at {}",
                    mv.source.display(),
                    parked.display()
                )
            })?;
            staged.push(StagedFile {
                staged: parked,
                destination: mv.destination.clone(),
            });
        }
        Ok(staged)
    }

    /// Phase 2: re-snapshot the root and strip the token prefix from every
    /// staged file. Returns the number of files renamed.
    pub fn commit(&self) -> Result<usize> {
        let mut renamed = 0;
        for entry in snapshot(&self.root, true)? {
            if !(entry.is_file && entry.name.starts_with(&self.token)) {
                continue;
            }
            let stripped = &entry.name[self.token.len()..];
            if stripped.is_empty() {
                bail!(
                    "staged file {} has nothing left after the token",
                    entry.path_absolute.display()
                );
            }
            let target = entry.path_absolute.with_file_name(stripped);
            fs::rename(&entry.path_absolute, &target).wrap_err_with(|| {
                format!(
                    "failed to commit {} to {}",
                    entry.path_absolute.display(),
                    target.display()
                )
            })?;
            renamed += 1;
        }
        Ok(renamed)
    }
}

/// Pick a short random token that no snapshot filename starts with.
///
/// Entropy quality is irrelevant here; the regeneration loop is what
/// guarantees disjointness from the snapshot.
fn generate_token(entries: &[SnapshotEntry]) -> String {
    let state = RandomState::new();
    let mut attempt = 0u64;
    loop {
        let token = format!("{:012x}_", state.hash_one(attempt) & 0xffff_ffff_ffff);
        if !entries.iter().any(|entry| entry.name.starts_with(&token)) {
            return token;
        }
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn relocate_subtree(root: &Path, subtree: &Path) -> (usize, usize) {
        let entries = snapshot(subtree, true).unwrap();
        let relocation = Relocation::prepare(root, &entries);
        let moves: Vec<Move> = entries
            .iter()
            .filter(|e| e.is_file)
            .map(|e| Move {
                source: e.path_absolute.clone(),
                destination: root.join(&e.path_relative),
            })
            .collect();
        let staged = relocation.stage(&moves).unwrap();
        let committed = relocation.commit().unwrap();
        (staged.len(), committed)
    }

    #[test]
    fn test_token_is_absent_from_snapshot_names() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join("mod.js"), "x");
        write(&temp.path().join("deep").join("util.js"), "x");

        let entries = snapshot(temp.path(), true).unwrap();
        let relocation = Relocation::prepare(temp.path(), &entries);

        assert!(relocation.token().ends_with('_'));
        for entry in &entries {
            assert!(!entry.name.starts_with(relocation.token()));
        }
    }

    #[test]
    fn test_flatten_simple_subtree() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(&root.join("esm").join("mod.js"), "mod");
        write(&root.join("esm").join("lib").join("util.js"), "util");

        let (staged, committed) = relocate_subtree(root, &root.join("esm"));

        assert_eq!(staged, 2);
        assert_eq!(committed, 2);
        assert_eq!(fs::read_to_string(root.join("mod.js")).unwrap(), "mod");
        assert_eq!(
            fs::read_to_string(root.join("lib").join("util.js")).unwrap(),
            "util"
        );
    }

    #[test]
    fn test_source_path_equal_to_another_destination() {
        // esm/esm/mod.js must land at <root>/esm/mod.js, the very path where
        // the not-yet-moved source esm/mod.js sits. A naive ordered move
        // would overwrite it; the staged namespace must not.
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(&root.join("esm").join("mod.js"), "outer");
        write(&root.join("esm").join("esm").join("mod.js"), "inner");

        let (staged, committed) = relocate_subtree(root, &root.join("esm"));

        assert_eq!(staged, 2);
        assert_eq!(committed, 2);
        assert_eq!(fs::read_to_string(root.join("mod.js")).unwrap(), "outer");
        assert_eq!(
            fs::read_to_string(root.join("esm").join("mod.js")).unwrap(),
            "inner"
        );
    }

    #[test]
    fn test_no_token_prefixed_files_remain() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(&root.join("esm").join("a.js"), "a");
        write(&root.join("esm").join("b").join("c.js"), "c");

        let entries = snapshot(&root.join("esm"), true).unwrap();
        let relocation = Relocation::prepare(root, &entries);
        let moves: Vec<Move> = entries
            .iter()
            .filter(|e| e.is_file)
            .map(|e| Move {
                source: e.path_absolute.clone(),
                destination: root.join(&e.path_relative),
            })
            .collect();
        relocation.stage(&moves).unwrap();
        relocation.commit().unwrap();

        for entry in snapshot(root, false).unwrap() {
            assert!(
                !entry.name.starts_with(relocation.token()),
                "leftover staged file {}",
                entry.path_absolute.display()
            );
        }
    }

    #[test]
    fn test_commit_overwrites_stale_destination() {
        // Pre-existing root-level files at a destination path belong to a
        // previous build; commit replaces them with the staged content.
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(&root.join("mod.js"), "stale");
        write(&root.join("esm").join("mod.js"), "fresh");

        relocate_subtree(root, &root.join("esm"));

        assert_eq!(fs::read_to_string(root.join("mod.js")).unwrap(), "fresh");
    }

    #[test]
    fn test_stage_creates_destination_directories() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(&root.join("esm").join("a").join("b").join("deep.js"), "deep");

        relocate_subtree(root, &root.join("esm"));

        assert_eq!(
            fs::read_to_string(root.join("a").join("b").join("deep.js")).unwrap(),
            "deep"
        );
    }

    #[test]
    fn test_stage_fails_on_missing_source() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let relocation = Relocation::prepare(root, &[]);

        let result = relocation.stage(&[Move {
            source: root.join("missing.js"),
            destination: root.join("out.js"),
        }]);

        assert!(result.is_err());
    }
}
