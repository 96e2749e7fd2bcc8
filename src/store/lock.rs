use std::{
    fs::{File, OpenOptions},
    path::Path,
    time::Instant,
};

use fs2::FileExt;

use crate::error::{ContextError, Result};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error};

const LOCK_FILE: &str = ".write.lock";

/// Exclusive advisory lock held for the read-modify-write of a day file.
/// Only serializes writers that take it; released on drop.
pub(crate) struct WriteLock {
    file: File,
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            log_error!("failed to release write lock: {err}");
        }
    }
}

pub(crate) fn acquire(dir: &Path) -> Result<WriteLock> {
    let path = dir.join(LOCK_FILE);
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(&path)
        .map_err(|err| ContextError::io(format!("open write lock {}", path.display()), err))?;

    let start = Instant::now();
    FileExt::lock_exclusive(&file)
        .map_err(|err| ContextError::io(format!("acquire write lock {}", path.display()), err))?;
    log_debug!(
        "acquired write lock {} after {}ms",
        path.display(),
        start.elapsed().as_millis()
    );

    Ok(WriteLock { file })
}
