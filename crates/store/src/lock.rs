//! Advisory lock on a sidecar file next to the document.
//!
//! The CLI and the scheduled check binary run as separate processes against
//! the same document, so the in-process mutex alone cannot serialize them.
//! On unix the lock is an exclusive `flock`; elsewhere only the in-process
//! mutex applies.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use tracing::debug;

/// Held for one load, mutate and save sequence. Released on drop.
#[derive(Debug)]
pub struct DocumentLock {
    #[cfg_attr(not(unix), allow(dead_code))]
    file: File,
}

impl DocumentLock {
    /// Blocks (off the async runtime) until the lock at `path` is free.
    pub async fn acquire(path: PathBuf) -> Result<Self> {
        tokio::task::spawn_blocking(move || Self::acquire_blocking(&path))
            .await
            .wrap_err("Store lock task failed")?
    }

    fn acquire_blocking(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .wrap_err_with(|| format!("Failed to open lock file {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::io;
            use std::os::unix::io::AsRawFd;

            loop {
                let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX) };
                if result == 0 {
                    break;
                }
                let err = io::Error::last_os_error();
                if err.kind() != io::ErrorKind::Interrupted {
                    return Err(err)
                        .wrap_err_with(|| format!("Failed to lock {}", path.display()));
                }
            }
        }

        debug!("Acquired store lock at {}", path.display());
        Ok(Self { file })
    }
}

impl Drop for DocumentLock {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;
            unsafe {
                libc::flock(self.file.as_raw_fd(), libc::LOCK_UN);
            }
        }
    }
}
