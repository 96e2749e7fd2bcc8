use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client as HttpClient, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ContextError, Result};
use crate::models::{timestamp, Bucket, ExternalEvent};

const ENABLE_LOGS: bool = true;

use crate::log_debug;

pub const DEFAULT_EVENT_LIMIT: usize = 1000;

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    timeperiods: &'a [String],
    query: &'a [String],
}

/// Thin async wrapper over the tracker endpoints this tool reads.
#[derive(Debug, Clone)]
pub struct TrackerClient {
    base: Url,
    http: HttpClient,
    query_timeout: Duration,
}

impl TrackerClient {
    /// `request_timeout` applies to bucket and event reads, `query_timeout`
    /// to `POST /query`, which the tracker may take longer to answer.
    pub fn new(base_url: &str, request_timeout: Duration, query_timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|err| {
            ContextError::validation(format!("invalid tracker URL '{base_url}': {err}"))
        })?;
        if base.cannot_be_a_base() {
            return Err(ContextError::validation(format!(
                "invalid tracker URL '{base_url}'"
            )));
        }

        let http = HttpClient::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|err| ContextError::validation(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            base,
            http,
            query_timeout,
        })
    }

    /// All buckets, ordered by id.
    pub async fn buckets(&self) -> Result<Vec<Bucket>> {
        let url = self.endpoint(&["buckets", ""]);
        let by_id: HashMap<String, Bucket> = self
            .fetch(self.http.get(url.clone()), &url, "bucket list")
            .await?;

        let mut buckets: Vec<Bucket> = by_id.into_values().collect();
        buckets.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(buckets)
    }

    /// The foreground-window watcher bucket, if the tracker has one.
    pub async fn window_watcher_bucket(&self) -> Result<Option<Bucket>> {
        Ok(self
            .buckets()
            .await?
            .into_iter()
            .find(Bucket::is_window_watcher))
    }

    pub async fn require_window_watcher_bucket(&self) -> Result<Bucket> {
        self.window_watcher_bucket()
            .await?
            .ok_or_else(|| ContextError::NotFound("No window watcher bucket found".into()))
    }

    /// Events of `bucket_id` overlapping `[start, end]`, as the tracker orders them.
    pub async fn events(
        &self,
        bucket_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ExternalEvent>> {
        let url = self.endpoint(&["buckets", bucket_id, "events"]);
        let request = self.http.get(url.clone()).query(&[
            ("start", timestamp::format(&start)),
            ("end", timestamp::format(&end)),
            ("limit", limit.to_string()),
        ]);
        self.fetch(request, &url, "event list").await
    }

    /// Runs a tracker query program once per timeperiod (`start/end`).
    pub async fn query(
        &self,
        timeperiods: &[String],
        query: &[String],
    ) -> Result<Vec<Vec<ExternalEvent>>> {
        let url = self.endpoint(&["query", ""]);
        let request = self
            .http
            .post(url.clone())
            .timeout(self.query_timeout)
            .json(&QueryRequest { timeperiods, query });
        self.fetch(request, &url, "query result").await
    }

    /// Window events of one period with AFK gaps flooded, via `POST /query`.
    pub async fn day_events(
        &self,
        bucket_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ExternalEvent>> {
        let period = format!("{}/{}", timestamp::format(&start), timestamp::format(&end));
        let program = vec![
            format!("events = flood(query_bucket({}));", quote(bucket_id)),
            "RETURN = events;".to_string(),
        ];
        let mut results = self.query(&[period], &program).await?;
        Ok(if results.is_empty() {
            Vec::new()
        } else {
            results.swap_remove(0)
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "0"]).extend(segments);
        }
        url
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
        what: &str,
    ) -> Result<T> {
        log_debug!("tracker request {url}");
        let response = request
            .send()
            .await
            .map_err(|err| transport_error(url, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContextError::Remote {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.json::<T>().await.map_err(|err| {
            if err.is_timeout() {
                ContextError::Timeout {
                    url: url.to_string(),
                }
            } else {
                ContextError::Decode {
                    what: what.to_string(),
                    source: err,
                }
            }
        })
    }
}

fn transport_error(url: &Url, err: reqwest::Error) -> ContextError {
    if err.is_timeout() {
        ContextError::Timeout {
            url: url.to_string(),
        }
    } else {
        ContextError::Unreachable {
            url: url.to_string(),
            source: err,
        }
    }
}

/// Query-language string literal.
fn quote(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}
