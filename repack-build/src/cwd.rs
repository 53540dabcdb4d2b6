//! Scoped working-directory changes.

use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};

/// Changes the process working directory and restores the previous one on
/// drop, on every exit path.
///
/// The working directory is process-global state; the pipeline holds exactly
/// one of these for its whole run and nothing else touches it.
#[must_use]
pub struct ScopedCwd {
    previous: PathBuf,
}

impl ScopedCwd {
    /// Enter `root`, remembering the current working directory.
    pub fn enter(root: &Path) -> Result<Self> {
        let previous = std::env::current_dir()
            .wrap_err("failed to capture the current working directory")?;
        std::env::set_current_dir(root)
            .wrap_err_with(|| format!("failed to enter workspace root {}", root.display()))?;
        Ok(Self { previous })
    }

    /// The directory that will be restored on drop.
    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for ScopedCwd {
    fn drop(&mut self) {
        // There is nothing to report a failure to from a drop.
        let _ = std::env::set_current_dir(&self.previous);
    }
}
