//! One JSON file per local calendar day.

use std::{
    fs::{self, File},
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
};

use chrono::NaiveDate;

use crate::error::{ContextError, Result};
use crate::models::ContextEntry;

const FILE_PREFIX: &str = "context-";
const FILE_EXTENSION: &str = ".json";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn file_name(date: NaiveDate) -> String {
    format!("{FILE_PREFIX}{}{FILE_EXTENSION}", date.format(DATE_FORMAT))
}

pub fn path_for(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(file_name(date))
}

/// Recovers the date from a day file name, `None` for anything else in the directory.
pub fn date_from_file_name(name: &str) -> Option<NaiveDate> {
    let stem = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_EXTENSION)?;
    NaiveDate::parse_from_str(stem, DATE_FORMAT).ok()
}

/// Loads a day file. A missing file is an empty day; anything else that goes
/// wrong is an error.
pub fn load(path: &Path) -> Result<Vec<ContextEntry>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(ContextError::io(
                format!("failed to read day file {}", path.display()),
                err,
            ))
        }
    };

    serde_json::from_slice(&bytes).map_err(|source| ContextError::CorruptDayFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Replaces the day file in one step: the entries are written to a hidden
/// sibling, synced, then renamed over the target.
pub fn write_atomic(path: &Path, entries: &[ContextEntry]) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(entries).map_err(|err| {
        ContextError::io(
            format!("failed to encode day file {}", path.display()),
            err.into(),
        )
    })?;

    let parent = path.parent().ok_or_else(|| {
        ContextError::io(
            format!("day file {} has no parent directory", path.display()),
            ErrorKind::InvalidInput.into(),
        )
    })?;
    let tmp = parent.join(format!(
        ".{}.tmp-{}",
        path.file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("context"),
        std::process::id()
    ));

    replace_via(&tmp, path, |file| {
        file.write_all(&bytes)?;
        file.sync_all()
    })
}

/// Creates `tmp`, lets `fill` write it, then renames it over `path`. Any
/// failure after the create removes `tmp` again.
fn replace_via(
    tmp: &Path,
    path: &Path,
    fill: impl FnOnce(&mut File) -> io::Result<()>,
) -> Result<()> {
    let mut file = File::create(tmp)
        .map_err(|err| ContextError::io(format!("create tmp {}", tmp.display()), err))?;

    let result = fill(&mut file)
        .map_err(|err| ContextError::io(format!("write tmp {}", tmp.display()), err))
        .and_then(|()| {
            drop(file);
            fs::rename(tmp, path).map_err(|err| {
                ContextError::io(
                    format!("rename tmp {} -> {}", tmp.display(), path.display()),
                    err,
                )
            })
        });

    if result.is_err() {
        let _ = fs::remove_file(tmp);
    }
    result
}
