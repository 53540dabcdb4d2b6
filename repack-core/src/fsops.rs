//! Small directory helpers shared across the workspace.

use std::fs;
use std::path::Path;

use eyre::{Result, WrapErr};

/// Create a directory and all missing parents.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .wrap_err_with(|| format!("failed to create directory {}", path.display()))
}

/// Remove the contents of a directory without removing the directory itself.
pub fn empty_dir(path: &Path) -> Result<()> {
    let entries =
        fs::read_dir(path).wrap_err_with(|| format!("failed to read {}", path.display()))?;
    for entry in entries {
        let entry = entry.wrap_err_with(|| format!("failed to read {}", path.display()))?;
        let file_type = entry
            .file_type()
            .wrap_err_with(|| format!("failed to stat {}", entry.path().display()))?;
        if file_type.is_dir() {
            fs::remove_dir_all(entry.path())
        } else {
            fs::remove_file(entry.path())
        }
        .wrap_err_with(|| format!("failed to remove {}", entry.path().display()))?;
    }
    Ok(())
}

/// Remove a file or directory tree. Returns whether the path existed; a
/// missing path is not an error.
pub fn remove_path(path: &Path) -> Result<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(err) => {
            return Err(err).wrap_err_with(|| format!("failed to stat {}", path.display()));
        }
    };
    if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
    .wrap_err_with(|| format!("failed to remove {}", path.display()))?;
    Ok(true)
}

/// Remove empty directories under `path` bottom-up, including `path` itself
/// when nothing non-empty remains. Returns whether `path` was removed.
pub fn prune_empty_dirs(path: &Path) -> Result<bool> {
    if !path.is_dir() {
        return Ok(false);
    }
    let mut removable = true;
    let entries =
        fs::read_dir(path).wrap_err_with(|| format!("failed to read {}", path.display()))?;
    for entry in entries {
        let entry = entry.wrap_err_with(|| format!("failed to read {}", path.display()))?;
        let file_type = entry
            .file_type()
            .wrap_err_with(|| format!("failed to stat {}", entry.path().display()))?;
        if file_type.is_dir() {
            if !prune_empty_dirs(&entry.path())? {
                removable = false;
            }
        } else {
            removable = false;
        }
    }
    if removable {
        fs::remove_dir(path)
            .wrap_err_with(|| format!("failed to remove directory {}", path.display()))?;
    }
    Ok(removable)
}

/// Copy a file or a whole directory tree, overwriting existing destinations.
pub fn copy_path(from: &Path, to: &Path) -> Result<()> {
    if from.is_dir() {
        ensure_dir(to)?;
        let entries =
            fs::read_dir(from).wrap_err_with(|| format!("failed to read {}", from.display()))?;
        for entry in entries {
            let entry = entry.wrap_err_with(|| format!("failed to read {}", from.display()))?;
            copy_path(&entry.path(), &to.join(entry.file_name()))?;
        }
    } else {
        if let Some(parent) = to.parent() {
            ensure_dir(parent)?;
        }
        fs::copy(from, to).wrap_err_with(|| {
            format!("failed to copy {} to {}", from.display(), to.display())
        })?;
    }
    Ok(())
}
