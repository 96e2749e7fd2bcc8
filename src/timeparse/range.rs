use chrono::{DateTime, Duration, Local, Utc};

use super::{local_midnight, natural, TimeParser};
use crate::error::{ContextError, Result};

/// A closed interval of local instants resolved from command arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

impl TimeRange {
    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.with_timezone(&Utc)
    }

    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end.with_timezone(&Utc)
    }
}

impl TimeParser {
    /// Last second of the local day containing `instant`
    /// (start of the next day minus one second).
    pub fn end_of_day(&self, instant: DateTime<Local>) -> Result<DateTime<Local>> {
        let next_day = instant
            .date_naive()
            .succ_opt()
            .ok_or_else(|| ContextError::validation(format!("no day follows {instant}")))?;
        Ok(local_midnight(next_day)? - Duration::seconds(1))
    }

    /// Whole days for listing annotations: `[midnight(start), end_of_day(end)]`.
    ///
    /// `start` falls back to `date`, then to today; `end` falls back to the
    /// start day. All inputs use the date-only grammar.
    pub fn query_range(
        &self,
        date: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<TimeRange> {
        let start = self.parse_date_only(start.or(date).unwrap_or("today"))?;
        let end_day = match end {
            Some(raw) => self.parse_date_only(raw)?,
            None => start,
        };
        Ok(TimeRange {
            start,
            end: self.end_of_day(end_day)?,
        })
    }

    /// Instants for correlating tracker events.
    ///
    /// `start` falls back to midnight of `date`, then to midnight today. When
    /// `end` is missing it becomes `now` if the start input was clock-granular
    /// (it contains `:`, is `now`, or is a minute or hour offset), the end of
    /// the start's day if it was a date, and `now` when neither a start nor a
    /// date was given.
    pub fn event_range(
        &self,
        date: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<TimeRange> {
        let start_instant = match (start, date) {
            (Some(raw), _) => self.parse_datetime_or_natural(raw)?,
            (None, Some(raw)) => {
                let day = self.parse_datetime_or_natural(raw)?.date_naive();
                local_midnight(day)?
            }
            (None, None) => self.days_from_today(0)?,
        };

        let end_instant = match (end, start, date) {
            (Some(raw), _, _) => self.parse_datetime_or_natural(raw)?,
            (None, Some(raw), _) if is_clock_granular(raw) => self.now(),
            (None, Some(_), _) | (None, None, Some(_)) => self.end_of_day(start_instant)?,
            (None, None, None) => self.now(),
        };

        Ok(TimeRange {
            start: start_instant,
            end: end_instant,
        })
    }
}

fn is_clock_granular(raw: &str) -> bool {
    let raw = raw.trim();
    raw.contains(':') || raw.eq_ignore_ascii_case("now") || natural::is_clock_offset(raw)
}
