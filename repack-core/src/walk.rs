//! One-shot recursive directory snapshots.

use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use walkdir::WalkDir;

/// A single entry captured by [`snapshot`].
///
/// The three kind flags are mutually exclusive: a symlink is reported as a
/// symlink, never as the file or directory it points at.
#[derive(Debug, Clone)]
pub struct SnapshotEntry {
    /// Entry is a regular directory.
    pub is_directory: bool,
    /// Entry is a regular file.
    pub is_file: bool,
    /// Entry is a symlink.
    pub is_symlink: bool,
    /// Final path component.
    pub name: String,
    /// Absolute path of the entry.
    pub path_absolute: PathBuf,
    /// Path of the entry relative to the walk root. Empty for the root itself.
    pub path_relative: PathBuf,
}

/// Capture a point-in-time snapshot of everything under `root`.
///
/// The walk happens once; callers iterate the returned entries without ever
/// re-querying live directory state. `include_root` controls whether the walk
/// root itself appears as the first entry.
pub fn snapshot(root: impl AsRef<Path>, include_root: bool) -> Result<Vec<SnapshotEntry>> {
    let root = root.as_ref();
    let root_absolute = if root.is_absolute() {
        root.to_path_buf()
    } else {
        std::env::current_dir()
            .wrap_err("failed to resolve the current working directory")?
            .join(root)
    };

    let mut entries = Vec::new();
    for entry in WalkDir::new(&root_absolute).follow_links(false) {
        let entry = entry.wrap_err_with(|| format!("failed to walk {}", root_absolute.display()))?;
        if entry.depth() == 0 && !include_root {
            continue;
        }
        let file_type = entry.file_type();
        let path_relative = entry
            .path()
            .strip_prefix(&root_absolute)
            .expect("walkdir yields paths under its root")
            .to_path_buf();
        entries.push(SnapshotEntry {
            is_directory: file_type.is_dir(),
            is_file: file_type.is_file(),
            is_symlink: file_type.is_symlink(),
            name: entry.file_name().to_string_lossy().into_owned(),
            path_absolute: entry.path().to_path_buf(),
            path_relative,
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_snapshot_lists_nested_files() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("a.txt"));
        touch(&temp.path().join("sub").join("b.txt"));

        let entries = snapshot(temp.path(), false).unwrap();

        let mut relative: Vec<String> = entries
            .iter()
            .map(|e| e.path_relative.to_string_lossy().into_owned())
            .collect();
        relative.sort();
        assert_eq!(relative, ["a.txt", "sub", "sub/b.txt"]);
    }

    #[test]
    fn test_snapshot_include_root() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("a.txt"));

        let with_root = snapshot(temp.path(), true).unwrap();
        let without_root = snapshot(temp.path(), false).unwrap();

        assert_eq!(with_root.len(), without_root.len() + 1);
        let root = &with_root[0];
        assert!(root.is_directory);
        assert_eq!(root.path_relative, PathBuf::new());
    }

    #[test]
    fn test_snapshot_kind_flags() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("file.txt"));
        fs::create_dir(temp.path().join("dir")).unwrap();

        let entries = snapshot(temp.path(), false).unwrap();

        let file = entries.iter().find(|e| e.name == "file.txt").unwrap();
        assert!(file.is_file && !file.is_directory && !file.is_symlink);

        let dir = entries.iter().find(|e| e.name == "dir").unwrap();
        assert!(dir.is_directory && !dir.is_file && !dir.is_symlink);
    }

    #[cfg(unix)]
    #[test]
    fn test_snapshot_reports_symlinks() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("target.txt"));
        std::os::unix::fs::symlink(temp.path().join("target.txt"), temp.path().join("link.txt"))
            .unwrap();

        let entries = snapshot(temp.path(), false).unwrap();

        let link = entries.iter().find(|e| e.name == "link.txt").unwrap();
        assert!(link.is_symlink && !link.is_file && !link.is_directory);
    }

    #[test]
    fn test_snapshot_relative_paths_unique() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("a").join("x.txt"));
        touch(&temp.path().join("b").join("x.txt"));

        let entries = snapshot(temp.path(), false).unwrap();

        let mut seen = std::collections::HashSet::new();
        for entry in &entries {
            assert!(seen.insert(entry.path_relative.clone()));
        }
    }
}
