// Single-instance guard

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("another instance is already running (lock file `{}` exists)", .0.display())]
    AlreadyRunning(PathBuf),
    #[error("could not create lock file `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Holds the lock file for the lifetime of the process; removed on drop
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
}

impl InstanceLock {
    /// Create `path` exclusively and record our pid in it
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self, LockError> {
        let path = path.into();
        let io_err = |source| LockError::Io {
            path: path.clone(),
            source,
        };

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(LockError::AlreadyRunning(path.clone()));
            }
            Err(e) => return Err(io_err(e)),
        };

        if let Err(e) = writeln!(file, "{}", std::process::id()) {
            let _ = std::fs::remove_file(&path);
            return Err(io_err(e));
        }

        info!("Acquired instance lock at {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => info!("Released instance lock at {}", self.path.display()),
            Err(e) => warn!("Could not remove lock file {}: {}", self.path.display(), e),
        }
    }
}
