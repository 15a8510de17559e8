use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::config::ScratchConfig;
use crate::error::{KeyframeError, Result};

/// Run-scoped directory holding extracted frames
///
/// The directory is removed when the guard is dropped, so every exit path
/// (success, error, or a cancelled future) releases it. Use [`ScratchDir::close`]
/// to remove it eagerly and observe removal errors.
#[derive(Debug)]
pub struct ScratchDir {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl ScratchDir {
    /// Create a fresh directory under the configured root
    pub fn acquire(config: &ScratchConfig) -> Result<Self> {
        let root = config.root.clone().unwrap_or_else(std::env::temp_dir);

        let dir = tempfile::Builder::new()
            .prefix(&config.prefix)
            .tempdir_in(&root)
            .map_err(|e| KeyframeError::filesystem(&root, e))?;

        let path = dir.path().to_path_buf();
        debug!("Created scratch directory: {:?}", path);

        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the directory now, reporting failures
    pub fn close(mut self) -> Result<()> {
        match self.dir.take() {
            Some(dir) => {
                dir.close()
                    .map_err(|e| KeyframeError::filesystem(&self.path, e))?;
                debug!("Removed scratch directory: {:?}", self.path);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(e) = dir.close() {
                warn!("Failed to remove scratch directory {:?}: {}", self.path, e);
            } else {
                debug!("Removed scratch directory: {:?}", self.path);
            }
        }
    }
}
