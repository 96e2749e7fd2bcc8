//! Resolution of user-entered date and time expressions.
//!
//! Two grammars share one mechanism: an ordered table of `(Rule, resolver)`
//! pairs tried top to bottom, the first resolver that recognizes the input
//! wins, and an input nobody recognizes is a validation error. The table order
//! is the precedence of the grammar:
//!
//! | grammar                | order                                                  |
//! |------------------------|--------------------------------------------------------|
//! | date only              | day keyword > strict date                               |
//! | date-time or natural   | keyword > strict date > date-time > time-of-day > natural |
//!
//! Every instant is produced in the local timezone. Day-granular inputs
//! (`today`, `2024-12-06`, `3 days ago`) resolve to local midnight.

mod natural;
mod range;

pub use range::TimeRange;

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ContextError, Result};

static STRICT_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("strict date pattern"));
static DATE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2}) (\d{2}):(\d{2})$").expect("date-time pattern")
});
static TIME_OF_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("time-of-day pattern"));

const DATE_ONLY_HELP: &str = "Invalid date format. Use YYYY-MM-DD, 'today', or 'yesterday'";
const DATE_TIME_HELP: &str =
    "Invalid date/time format. Use 'today', 'yesterday', 'now', 'YYYY-MM-DD', 'HH:MM', 'YYYY-MM-DD HH:MM', or a phrase like '2 hours ago'";

/// The grammar rule a resolver implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// `today`, `yesterday`
    DayKeyword,
    /// `today`, `yesterday`, `now`
    Keyword,
    /// `YYYY-MM-DD`
    StrictDate,
    /// `YYYY-MM-DD HH:MM`
    DateTime,
    /// `HH:MM` on today's date
    TimeOfDay,
    /// relative phrases such as `3 days ago` or `last monday`
    Natural,
}

/// `Ok(None)` means the rule does not apply and the next one should be tried.
type Resolver = fn(&TimeParser, &str) -> Result<Option<DateTime<Local>>>;

const DATE_ONLY_GRAMMAR: &[(Rule, Resolver)] = &[
    (Rule::DayKeyword, TimeParser::resolve_day_keyword),
    (Rule::StrictDate, TimeParser::resolve_strict_date),
];

const DATE_TIME_GRAMMAR: &[(Rule, Resolver)] = &[
    (Rule::Keyword, TimeParser::resolve_keyword),
    (Rule::StrictDate, TimeParser::resolve_strict_date),
    (Rule::DateTime, TimeParser::resolve_date_time),
    (Rule::TimeOfDay, TimeParser::resolve_time_of_day),
    (Rule::Natural, TimeParser::resolve_natural),
];

/// Parser pinned to a reference instant so that "today" and friends are
/// stable for the lifetime of one command.
#[derive(Debug, Clone, Copy)]
pub struct TimeParser {
    now: DateTime<Local>,
    natural: bool,
}

impl Default for TimeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeParser {
    pub fn new() -> Self {
        Self::at(Local::now())
    }

    pub fn at(now: DateTime<Local>) -> Self {
        Self { now, natural: true }
    }

    /// Drops the natural-language tier from the date-time grammar.
    pub fn without_natural(mut self) -> Self {
        self.natural = false;
        self
    }

    pub fn now(&self) -> DateTime<Local> {
        self.now
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    /// Date-only grammar; always local midnight of the resolved date.
    pub fn parse_date_only(&self, input: &str) -> Result<DateTime<Local>> {
        self.run(DATE_ONLY_GRAMMAR, input, DATE_ONLY_HELP)
    }

    /// Date-time grammar with the natural-language fallback.
    pub fn parse_datetime_or_natural(&self, input: &str) -> Result<DateTime<Local>> {
        self.run(DATE_TIME_GRAMMAR, input, DATE_TIME_HELP)
    }

    /// The rule that would resolve `input` under the date-time grammar.
    pub fn matching_rule(&self, input: &str) -> Option<Rule> {
        let input = input.trim();
        DATE_TIME_GRAMMAR
            .iter()
            .find(|(_, resolve)| matches!(resolve(self, input), Ok(Some(_))))
            .map(|(rule, _)| *rule)
    }

    fn run(
        &self,
        grammar: &[(Rule, Resolver)],
        input: &str,
        help: &str,
    ) -> Result<DateTime<Local>> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ContextError::validation(help));
        }
        for (_, resolve) in grammar {
            if let Some(instant) = resolve(self, input)? {
                return Ok(instant);
            }
        }
        Err(ContextError::validation(format!("{help} (got '{input}')")))
    }

    fn resolve_day_keyword(&self, input: &str) -> Result<Option<DateTime<Local>>> {
        let offset = match input.to_lowercase().as_str() {
            "today" => 0,
            "yesterday" => -1,
            _ => return Ok(None),
        };
        self.days_from_today(offset).map(Some)
    }

    fn resolve_keyword(&self, input: &str) -> Result<Option<DateTime<Local>>> {
        if input.eq_ignore_ascii_case("now") {
            return Ok(Some(self.now));
        }
        self.resolve_day_keyword(input)
    }

    fn resolve_strict_date(&self, input: &str) -> Result<Option<DateTime<Local>>> {
        if !STRICT_DATE.is_match(input) {
            return Ok(None);
        }
        match NaiveDate::parse_from_str(input, "%Y-%m-%d") {
            Ok(date) => local_midnight(date).map(Some),
            Err(_) => Ok(None),
        }
    }

    fn resolve_date_time(&self, input: &str) -> Result<Option<DateTime<Local>>> {
        let Some(caps) = DATE_TIME.captures(input) else {
            return Ok(None);
        };
        let Ok(date) = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d") else {
            return Ok(None);
        };
        let Some(time) = hour_minute(&caps[2], &caps[3]) else {
            return Ok(None);
        };
        local_instant(date.and_time(time)).map(Some)
    }

    fn resolve_time_of_day(&self, input: &str) -> Result<Option<DateTime<Local>>> {
        let Some(caps) = TIME_OF_DAY.captures(input) else {
            return Ok(None);
        };
        let Some(time) = hour_minute(&caps[1], &caps[2]) else {
            return Ok(None);
        };
        local_instant(self.today().and_time(time)).map(Some)
    }

    fn resolve_natural(&self, input: &str) -> Result<Option<DateTime<Local>>> {
        if !self.natural {
            return Ok(None);
        }
        natural::resolve(self, input)
    }

    pub(crate) fn days_from_today(&self, days: i64) -> Result<DateTime<Local>> {
        let date = Duration::try_days(days)
            .and_then(|delta| self.today().checked_add_signed(delta))
            .ok_or_else(|| ContextError::validation(format!("{days} days from today is out of range")))?;
        local_midnight(date)
    }
}

/// Date-only grammar against the current time.
pub fn parse_date_only(input: &str) -> Result<DateTime<Local>> {
    TimeParser::new().parse_date_only(input)
}

/// Date-time grammar (with natural-language fallback) against the current time.
pub fn parse_datetime_or_natural(input: &str) -> Result<DateTime<Local>> {
    TimeParser::new().parse_datetime_or_natural(input)
}

fn hour_minute(hour: &str, minute: &str) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(hour.parse().ok()?, minute.parse().ok()?, 0)
}

/// Start of `date` in the local timezone. Where midnight falls in a DST gap
/// the day starts at the first valid instant after it.
pub fn local_midnight(date: NaiveDate) -> Result<DateTime<Local>> {
    midnight_in(&Local, date)
}

fn local_instant(naive: NaiveDateTime) -> Result<DateTime<Local>> {
    instant_in(&Local, naive)
}

fn midnight_in<Tz: TimeZone>(zone: &Tz, date: NaiveDate) -> Result<DateTime<Tz>> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=2)
        .find_map(|hours| {
            zone.from_local_datetime(&(midnight + Duration::hours(hours)))
                .earliest()
        })
        .ok_or_else(|| ContextError::validation(format!("{date} has no start in the local timezone")))
}

/// Ambiguous wall-clock times take the earlier instant; times inside a gap
/// are rejected.
fn instant_in<Tz: TimeZone>(zone: &Tz, naive: NaiveDateTime) -> Result<DateTime<Tz>> {
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(instant) => Ok(instant),
        LocalResult::Ambiguous(earlier, _) => Ok(earlier),
        LocalResult::None => Err(ContextError::validation(format!(
            "{naive} does not exist in the local timezone"
        ))),
    }
}
