//! Per-session Chrome profile directories.
//!
//! Each acquired session gets a UUID-named user-data directory so concurrent
//! workers never share a Chrome `SingletonLock`, and the directory is
//! removed on drop so orphaned profiles don't accumulate under the system
//! temp directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};
use uuid::Uuid;

/// RAII wrapper around a Chrome user-data directory.
#[derive(Debug)]
pub struct Profile {
    path: PathBuf,
    cleanup_on_drop: bool,
}

impl Profile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            cleanup_on_drop: true,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Profile {
    fn drop(&mut self) {
        if self.cleanup_on_drop && self.path.exists() {
            if let Err(err) = std::fs::remove_dir_all(&self.path) {
                warn!(path = %self.path.display(), %err, "failed to remove session profile directory");
            }
        }
    }
}

/// Create a unique profile directory under the system temp directory.
pub fn create_unique_profile() -> Result<Profile> {
    let path = std::env::temp_dir().join(format!("national_treasure_chrome_{}", Uuid::new_v4()));
    std::fs::create_dir(&path)
        .with_context(|| format!("failed to create profile directory: {}", path.display()))?;
    info!(path = %path.display(), "created session profile directory");
    Ok(Profile::new(path))
}
