//! Flat-file persistence for context annotations.
//!
//! The store owns a directory holding one `context-YYYY-MM-DD.json` file per
//! local calendar day. Writes go to exactly one day file; queries may span
//! several and degrade by omission when one of them is unreadable.

pub mod day_file;
mod lock;

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};

use crate::error::{ContextError, Result};
use crate::models::ContextEntry;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Window used by [`ContextStore::find_nearest`] when callers have no preference.
pub const DEFAULT_WINDOW_MINUTES: u32 = 30;

#[derive(Debug, Clone)]
pub struct ContextStore {
    dir: PathBuf,
}

impl ContextStore {
    /// Opens the store rooted at `dir`, creating it (with parents) if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|err| {
            ContextError::io(
                format!("failed to create context directory {}", dir.display()),
                err,
            )
        })?;
        log_debug!("context store opened at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Records a new annotation stamped with the current time.
    pub fn add(&self, context: impl Into<String>, tags: Vec<String>) -> Result<ContextEntry> {
        self.append(ContextEntry::new(context, tags))
    }

    /// Persists a pre-built entry into the day file of its own local date.
    ///
    /// The existing day file is read strictly: a file that exists but cannot be
    /// decoded fails the call instead of being overwritten.
    pub fn append(&self, entry: ContextEntry) -> Result<ContextEntry> {
        let path = day_file::path_for(&self.dir, entry.local_date());
        let _guard = lock::acquire(&self.dir)?;

        let mut entries = day_file::load(&path)?;
        entries.push(entry.clone());
        day_file::write_atomic(&path, &entries)?;

        log_info!(
            "appended context {} to {} ({} entries)",
            entry.id,
            path.display(),
            entries.len()
        );
        Ok(entry)
    }

    /// Entries with `start <= timestamp <= end`, ascending by timestamp.
    ///
    /// Every local day from `start`'s through `end`'s is visited. Missing day
    /// files are empty days; unreadable ones are skipped with a warning.
    pub fn query_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<ContextEntry> {
        if start > end {
            return Vec::new();
        }

        let first_day = start.with_timezone(&Local).date_naive();
        let last_day = end.with_timezone(&Local).date_naive();

        let mut matches: Vec<ContextEntry> = first_day
            .iter_days()
            .take_while(|day| *day <= last_day)
            .flat_map(|day| self.load_day_lenient(day))
            .filter(|entry| entry.timestamp >= start && entry.timestamp <= end)
            .collect();

        matches.sort_by_key(|entry| entry.timestamp);
        matches
    }

    /// Every entry carrying exactly `tag` (case-sensitive), ascending by timestamp.
    ///
    /// Scans all day files regardless of date. Files that fail to decode are
    /// skipped.
    pub fn search_by_tag(&self, tag: &str) -> Result<Vec<ContextEntry>> {
        let mut matches = Vec::new();
        for date in self.day_files()? {
            let path = day_file::path_for(&self.dir, date);
            match day_file::load(&path) {
                Ok(entries) => matches.extend(entries.into_iter().filter(|e| e.has_tag(tag))),
                Err(err) => log_warn!("skipping {} during tag search: {err}", path.display()),
            }
        }

        matches.sort_by_key(|entry| entry.timestamp);
        Ok(matches)
    }

    /// The entry closest in time to `to` within `±window_minutes` (inclusive).
    /// On a tie the earlier entry wins.
    pub fn find_nearest(&self, to: DateTime<Utc>, window_minutes: u32) -> Option<ContextEntry> {
        let window = Duration::minutes(i64::from(window_minutes));
        nearest(&self.query_range(to - window, to + window), to, window_minutes).cloned()
    }

    /// Every entry that [`find_nearest`](Self::find_nearest) could return for
    /// any of `instants`, read with a single range query. Empty for no instants.
    pub fn entries_around(
        &self,
        instants: impl IntoIterator<Item = DateTime<Utc>>,
        window_minutes: u32,
    ) -> Vec<ContextEntry> {
        let mut bounds: Option<(DateTime<Utc>, DateTime<Utc>)> = None;
        for at in instants {
            bounds = Some(match bounds {
                Some((first, last)) => (first.min(at), last.max(at)),
                None => (at, at),
            });
        }
        let Some((first, last)) = bounds else {
            return Vec::new();
        };

        let window = Duration::minutes(i64::from(window_minutes));
        self.query_range(first - window, last + window)
    }

    /// Dates that currently have a day file, ascending.
    pub fn day_files(&self) -> Result<Vec<NaiveDate>> {
        let read_dir = fs::read_dir(&self.dir).map_err(|err| {
            ContextError::io(
                format!("failed to list context directory {}", self.dir.display()),
                err,
            )
        })?;

        let mut dates: Vec<NaiveDate> = read_dir
            .filter_map(|item| item.ok())
            .filter(|item| item.path().is_file())
            .filter_map(|item| day_file::date_from_file_name(&item.file_name().to_string_lossy()))
            .collect();
        dates.sort();
        Ok(dates)
    }

    fn load_day_lenient(&self, day: NaiveDate) -> Vec<ContextEntry> {
        let path = day_file::path_for(&self.dir, day);
        match day_file::load(&path) {
            Ok(entries) => entries,
            Err(err) => {
                log_warn!("excluding {} from range query: {err}", path.display());
                Vec::new()
            }
        }
    }
}

/// The entry of `candidates` closest to `to` within `±window_minutes`
/// (inclusive). Ties go to the first candidate, which is the earlier one when
/// `candidates` are ascending by timestamp as every store query returns them.
pub fn nearest(
    candidates: &[ContextEntry],
    to: DateTime<Utc>,
    window_minutes: u32,
) -> Option<&ContextEntry> {
    let window = u64::from(window_minutes) * 60_000_000;
    candidates
        .iter()
        .map(|entry| (distance_micros(entry.timestamp, to), entry))
        .filter(|(distance, _)| *distance <= window)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, entry)| entry)
}

fn distance_micros(a: DateTime<Utc>, b: DateTime<Utc>) -> u64 {
    (a - b)
        .num_microseconds()
        .map_or(u64::MAX, i64::unsigned_abs)
}
