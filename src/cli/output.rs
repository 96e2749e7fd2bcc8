//! Human-readable line formats consumed by the protocol bridge, plus JSON.
//!
//! The bridge parses `ID: .. | Time: .. | Context: .. | Tags: ..` and
//! `HH:MM:SS | App - Title | Context: ..` line by line. Changing either shape
//! breaks it.

use std::io::{self, Write};

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::correlate::{AppSummary, EnrichedEvent};
use crate::models::{timestamp, ContextEntry};

const LISTING_TIME: &str = "%Y-%m-%d %H:%M:%S";
const CLOCK_TIME: &str = "%H:%M:%S";

fn local(instant: DateTime<Utc>) -> DateTime<Local> {
    instant.with_timezone(&Local)
}

pub fn context_line(entry: &ContextEntry) -> String {
    format!(
        "ID: {} | Time: {} | Context: {} | Tags: {}",
        entry.id,
        local(entry.timestamp).format(LISTING_TIME),
        entry.context,
        entry.tags.join(", ")
    )
}

pub fn enriched_line(item: &EnrichedEvent) -> String {
    let mut line = format!(
        "{} | {} - {}",
        local(item.event.timestamp).format(CLOCK_TIME),
        item.event.data.app,
        item.event.data.title
    );
    if let Some(text) = item.context_text() {
        line.push_str(" | Context: ");
        line.push_str(text);
    }
    line
}

pub fn json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

pub fn added(out: &mut dyn Write, entry: &ContextEntry) -> io::Result<()> {
    writeln!(out, "✓ Context added at {}", timestamp::format(&entry.timestamp))?;
    writeln!(out, "  ID: {}", entry.id)?;
    if !entry.tags.is_empty() {
        writeln!(out, "  Tags: {}", entry.tags.join(", "))?;
    }
    Ok(())
}

/// `empty_message` is printed instead of the listing when there is nothing to show.
pub fn context_listing(
    out: &mut dyn Write,
    entries: &[ContextEntry],
    empty_message: &str,
) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(out, "{empty_message}");
    }
    writeln!(out, "Found {} context(s):", entries.len())?;
    for entry in entries {
        writeln!(out, "{}", context_line(entry))?;
    }
    Ok(())
}

pub fn enriched_listing(out: &mut dyn Write, items: &[EnrichedEvent]) -> io::Result<()> {
    if items.is_empty() {
        return writeln!(out, "No events found in the specified time range.");
    }
    for item in items {
        writeln!(out, "{}", enriched_line(item))?;
    }
    Ok(())
}

pub fn summary_header(out: &mut dyn Write, day: &str, contexts: &[ContextEntry]) -> io::Result<()> {
    writeln!(out, "=== Summary for {day} ===")?;
    writeln!(out)?;
    if contexts.is_empty() {
        return writeln!(out, "No contexts recorded for this day.");
    }
    writeln!(out, "Contexts ({}):", contexts.len())?;
    for entry in contexts {
        writeln!(
            out,
            "  {} - {}",
            local(entry.timestamp).format(CLOCK_TIME),
            entry.context
        )?;
        if !entry.tags.is_empty() {
            writeln!(out, "         Tags: {}", entry.tags.join(", "))?;
        }
    }
    Ok(())
}

pub fn top_apps(out: &mut dyn Write, apps: &[AppSummary]) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Top Applications:")?;
    for app in apps {
        writeln!(out)?;
        writeln!(out, "{}: {} minutes", app.app, app.minutes())?;
        if !app.contexts.is_empty() {
            writeln!(out, "  Contexts: {}", app.contexts.join(", "))?;
        }
    }
    Ok(())
}

pub fn activity_error(out: &mut dyn Write, err: &dyn std::fmt::Display) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Error fetching activity data: {err}")
}
