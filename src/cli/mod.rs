//! Command surface of the `aw-context` binary.
//!
//! Every subcommand is a [`Command`] variant handled by [`run`]; the library
//! modules underneath know nothing about argument parsing or output.

pub mod output;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::correlate::{enrich_events, summarize_by_app, AppSummary};
use crate::models::ContextEntry;
use crate::settings::{Overrides, Settings};
use crate::store::ContextStore;
use crate::timeparse::TimeParser;
use crate::tracker::TrackerClient;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

#[derive(Parser, Debug)]
#[command(name = "aw-context")]
#[command(about = "Annotate your ActivityWatch timeline with context notes", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding the day files (overrides AW_CONTEXT_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// ActivityWatch server URL (overrides AW_CONTEXT_TRACKER_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub tracker_url: Option<String>,

    /// Print results as JSON instead of text lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new context annotation
    Add {
        /// The context description
        context: String,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },

    /// List contexts of a day or a range of days
    Query {
        /// Day to list (YYYY-MM-DD, 'today', 'yesterday')
        date: Option<String>,

        /// First day of the range
        #[arg(long)]
        start: Option<String>,

        /// Last day of the range (inclusive)
        #[arg(long)]
        end: Option<String>,
    },

    /// List contexts carrying a tag
    Search {
        /// Exact, case-sensitive tag
        tag: String,
    },

    /// Contexts of a day next to the applications used that day
    Summary {
        /// Day to summarize (YYYY-MM-DD, 'today', 'yesterday')
        #[arg(long, default_value = "today")]
        date: String,
    },

    /// Show ActivityWatch events with their nearest context
    Enrich {
        /// Day to show (defaults to today)
        date: Option<String>,

        /// Start (YYYY-MM-DD, HH:MM, 'YYYY-MM-DD HH:MM', 'today', 'now', '2 hours ago', ...)
        #[arg(long)]
        start: Option<String>,

        /// End, same formats as --start
        #[arg(long)]
        end: Option<String>,

        /// Context window in minutes
        #[arg(long)]
        window: Option<u32>,
    },
}

/// Everything a command needs besides its own arguments.
pub struct Invocation {
    pub settings: Settings,
    pub parser: TimeParser,
    pub json: bool,
}

impl Invocation {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let settings = Settings::load(Overrides {
            data_dir: cli.data_dir.clone(),
            tracker_url: cli.tracker_url.clone(),
        })?;
        Ok(Self {
            settings,
            parser: TimeParser::new(),
            json: cli.json,
        })
    }

    fn store(&self) -> Result<ContextStore> {
        Ok(ContextStore::open(&self.settings.data_dir)?)
    }

    fn tracker(&self) -> Result<TrackerClient> {
        let tracker = &self.settings.tracker;
        Ok(TrackerClient::new(
            &tracker.url,
            tracker.request_timeout(),
            tracker.query_timeout(),
        )?)
    }
}

pub async fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let invocation = Invocation::from_cli(&cli)?;
    dispatch(cli.command, &invocation, out).await
}

pub async fn dispatch(command: Command, inv: &Invocation, out: &mut dyn Write) -> Result<()> {
    log_debug!("dispatching {command:?}");
    match command {
        Command::Add { context, tags } => add(inv, context, tags.as_deref(), out),
        Command::Query { date, start, end } => {
            query(inv, date.as_deref(), start.as_deref(), end.as_deref(), out)
        }
        Command::Search { tag } => search(inv, &tag, out),
        Command::Summary { date } => summary(inv, &date, out).await,
        Command::Enrich {
            date,
            start,
            end,
            window,
        } => enrich(inv, date.as_deref(), start.as_deref(), end.as_deref(), window, out).await,
    }
}

/// Splits `a, b,,c` into `["a", "b", "c"]`.
pub fn parse_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

fn add(inv: &Invocation, context: String, tags: Option<&str>, out: &mut dyn Write) -> Result<()> {
    let entry = inv
        .store()?
        .add(context, parse_tags(tags))
        .context("failed to save context")?;

    if inv.json {
        output::json(out, &entry)?;
    } else {
        output::added(out, &entry)?;
    }
    Ok(())
}

fn query(
    inv: &Invocation,
    date: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
    out: &mut dyn Write,
) -> Result<()> {
    let range = inv.parser.query_range(date, start, end)?;
    let entries = inv.store()?.query_range(range.start_utc(), range.end_utc());

    if inv.json {
        output::json(out, &entries)?;
    } else {
        output::context_listing(out, &entries, "No contexts found in the specified date range.")?;
    }
    Ok(())
}

fn search(inv: &Invocation, tag: &str, out: &mut dyn Write) -> Result<()> {
    let entries = inv
        .store()?
        .search_by_tag(tag)
        .with_context(|| format!("failed to search for tag '{tag}'"))?;

    if inv.json {
        output::json(out, &entries)?;
    } else {
        output::context_listing(out, &entries, &format!("No contexts found with tag '{tag}'."))?;
    }
    Ok(())
}

#[derive(Serialize)]
struct SummaryReport {
    date: String,
    contexts: Vec<ContextEntry>,
    apps: Vec<AppSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    activity_error: Option<String>,
}

async fn summary(inv: &Invocation, date: &str, out: &mut dyn Write) -> Result<()> {
    let range = inv.parser.query_range(Some(date), None, None)?;
    let store = inv.store()?;
    let contexts = store.query_range(range.start_utc(), range.end_utc());
    let day = range.start.format("%Y-%m-%d").to_string();

    let config = inv.settings.correlation_config();
    let activity = async {
        let tracker = inv.tracker()?;
        let bucket = tracker.require_window_watcher_bucket().await?;
        let events = tracker
            .day_events(&bucket.id, range.start_utc(), range.end_utc())
            .await?;
        anyhow::Ok(summarize_by_app(&store, &events, config.window_minutes))
    }
    .await;

    let (mut apps, activity_error) = match activity {
        Ok(apps) => (apps, None),
        Err(err) => {
            log_warn!("activity data unavailable: {err:#}");
            (Vec::new(), Some(err))
        }
    };
    apps.truncate(config.top_apps);

    if inv.json {
        let report = SummaryReport {
            date: day,
            contexts,
            apps,
            activity_error: activity_error.map(|err| format!("{err:#}")),
        };
        output::json(out, &report)?;
        return Ok(());
    }

    output::summary_header(out, &day, &contexts)?;
    match activity_error {
        None => output::top_apps(out, &apps)?,
        Some(err) => output::activity_error(out, &format!("{err:#}"))?,
    }
    Ok(())
}

async fn enrich(
    inv: &Invocation,
    date: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
    window: Option<u32>,
    out: &mut dyn Write,
) -> Result<()> {
    let range = inv.parser.event_range(date, start, end)?;
    let window = window.unwrap_or(inv.settings.correlation.window_minutes);
    let store = inv.store()?;

    let tracker = inv.tracker()?;
    let bucket = tracker.require_window_watcher_bucket().await?;
    let events = tracker
        .events(
            &bucket.id,
            range.start_utc(),
            range.end_utc(),
            inv.settings.tracker.event_limit,
        )
        .await
        .with_context(|| format!("failed to fetch events from {}", bucket.id))?;

    let enriched = enrich_events(&store, &events, window);
    if inv.json {
        output::json(out, &enriched)?;
    } else {
        output::enriched_listing(out, &enriched)?;
    }
    Ok(())
}
