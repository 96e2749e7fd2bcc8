//! Relative phrases: the last tier of the date-time grammar.
//!
//! Clock-granular phrases (`90 minutes ago`, `in 2 hours`) move the reference
//! instant. Day-granular phrases (`3 days ago`, `last week`, `next friday`)
//! land on local midnight, matching the keyword rule.

use chrono::{DateTime, Datelike, Duration, Local, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

use super::TimeParser;
use crate::error::{ContextError, Result};

static AGO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+|an?)\s+(minute|min|hour|day|week)s?\s+ago$").expect("ago pattern")
});
static IN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^in\s+(\d+|an?)\s+(minute|min|hour|day|week)s?$").expect("in pattern")
});
static WEEK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(last|next)\s+week$").expect("week pattern"));
static WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(last|next)\s+)?(monday|tuesday|wednesday|thursday|friday|saturday|sunday)$")
        .expect("weekday pattern")
});

#[derive(Debug, Clone, Copy)]
enum Unit {
    Minute,
    Hour,
    Day,
    Week,
}

impl Unit {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "minute" | "min" => Some(Unit::Minute),
            "hour" => Some(Unit::Hour),
            "day" => Some(Unit::Day),
            "week" => Some(Unit::Week),
            _ => None,
        }
    }
}

fn normalize(input: &str) -> String {
    input
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether `input` is a minute or hour offset, i.e. a phrase that moves the
/// reference instant instead of landing on midnight.
pub(super) fn is_clock_offset(input: &str) -> bool {
    let phrase = normalize(input);
    AGO.captures(&phrase)
        .or_else(|| IN.captures(&phrase))
        .and_then(|caps| Unit::parse(&caps[2]))
        .is_some_and(|unit| matches!(unit, Unit::Minute | Unit::Hour))
}

pub(super) fn resolve(parser: &TimeParser, input: &str) -> Result<Option<DateTime<Local>>> {
    let phrase = normalize(input);

    if phrase == "tomorrow" {
        return parser.days_from_today(1).map(Some);
    }

    if let Some(caps) = AGO.captures(&phrase) {
        return shift(parser, &caps[1], &caps[2], -1);
    }
    if let Some(caps) = IN.captures(&phrase) {
        return shift(parser, &caps[1], &caps[2], 1);
    }

    if let Some(caps) = WEEK.captures(&phrase) {
        let days = if &caps[1] == "last" { -7 } else { 7 };
        return parser.days_from_today(days).map(Some);
    }

    if let Some(caps) = WEEKDAY.captures(&phrase) {
        let Some(target) = weekday(&caps[2]) else {
            return Ok(None);
        };
        let offset = weekday_offset(parser.today().weekday(), target, caps.get(1).map(|m| m.as_str()));
        return parser.days_from_today(offset).map(Some);
    }

    Ok(None)
}

fn shift(
    parser: &TimeParser,
    amount: &str,
    unit: &str,
    sign: i64,
) -> Result<Option<DateTime<Local>>> {
    let amount = match amount {
        "a" | "an" => 1,
        digits => match digits.parse::<i64>() {
            Ok(n) => n,
            Err(_) => return Ok(None),
        },
    };
    let Some(unit) = Unit::parse(unit) else {
        return Ok(None);
    };

    let signed = sign * amount;
    let moved = match unit {
        Unit::Minute => Duration::try_minutes(signed),
        Unit::Hour => Duration::try_hours(signed),
        Unit::Day => return parser.days_from_today(signed).map(Some),
        Unit::Week => {
            let days = signed
                .checked_mul(7)
                .ok_or_else(|| ContextError::validation(format!("{amount} weeks is out of range")))?;
            return parser.days_from_today(days).map(Some);
        }
    };
    moved
        .and_then(|delta| parser.now().checked_add_signed(delta))
        .map(Some)
        .ok_or_else(|| ContextError::validation(format!("{amount} {unit:?} offset is out of range")))
}

fn weekday(name: &str) -> Option<Weekday> {
    name.parse().ok()
}

/// Days to add to today to reach `target`.
///
/// A bare weekday is its most recent occurrence (today included), `last` is
/// strictly before today and `next` strictly after.
fn weekday_offset(today: Weekday, target: Weekday, qualifier: Option<&str>) -> i64 {
    let back = (i64::from(today.num_days_from_monday()) - i64::from(target.num_days_from_monday()))
        .rem_euclid(7);
    match qualifier {
        Some("next") => {
            let forward = (7 - back) % 7;
            if forward == 0 {
                7
            } else {
                forward
            }
        }
        Some("last") if back == 0 => -7,
        _ => -back,
    }
}
