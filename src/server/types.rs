//! Type definitions for the HTTP server.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::domain::User;
use crate::error::{ApiError, ApiResult};
use crate::report::ExportedFile;
use crate::stats::{local_day_end, local_day_start, parse_day_bucket, StatsRecorder};
use crate::store::Store;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub recorder: StatsRecorder,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Store, config: Config) -> Self {
        Self {
            recorder: StatsRecorder::new(store.clone()),
            store,
            config: Arc::new(config),
        }
    }
}

/// What a handler sends back
#[derive(Debug)]
pub enum Reply {
    Json(u16, serde_json::Value),
    /// Streamed as an attachment and deleted afterwards
    File(ExportedFile),
}

impl Reply {
    pub fn ok(value: serde_json::Value) -> Self {
        Self::Json(200, value)
    }

    pub fn created(value: serde_json::Value) -> Self {
        Self::Json(201, value)
    }
}

/// Authenticated request data
pub struct RequestContext {
    pub user: User,
    pub query: QueryParams,
    pub body: String,
}

impl RequestContext {
    /// Parse the JSON body; an empty body reads as `{}`
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        let body = if self.body.trim().is_empty() {
            "{}"
        } else {
            self.body.as_str()
        };
        serde_json::from_str(body)
            .map_err(|e| ApiError::validation(format!("Invalid JSON body: {}", e)))
    }
}

/// Decoded query string
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    values: HashMap<String, String>,
}

impl QueryParams {
    pub fn parse(query: &str) -> Self {
        let values = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode(key), decode(value))
            })
            .collect();
        Self { values }
    }

    /// Non-empty value of a parameter
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Comma-separated list; missing means empty
    pub fn list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some("true") | Some("1") | Some("yes"))
    }

    /// Positive integer parameter with a default
    pub fn positive(&self, key: &str, default: usize) -> ApiResult<usize> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ApiError::validation(format!("{} must be a positive integer", key))),
        }
    }

    /// Required `startDate` / `endDate` pair
    pub fn date_range(&self) -> ApiResult<(DateTime<Utc>, DateTime<Utc>)> {
        match self.optional_date_range()? {
            Some(range) => Ok(range),
            None => Err(ApiError::validation("startDate and endDate are required")),
        }
    }

    /// `startDate` / `endDate` when both are present
    pub fn optional_date_range(&self) -> ApiResult<Option<(DateTime<Utc>, DateTime<Utc>)>> {
        let (Some(start), Some(end)) = (self.get("startDate"), self.get("endDate")) else {
            return Ok(None);
        };
        let start = parse_date_param(start, false)?;
        let end = parse_date_param(end, true)?;
        Ok(Some((start, end)))
    }
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

/// RFC 3339 instant, local `YYYY-MM-DDTHH:MM:SS`, or a bare local date.
///
/// A bare date means the start of that day, or its last millisecond
/// when `end_of_day` is set.
pub fn parse_date_param(raw: &str, end_of_day: bool) -> ApiResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive
            .and_local_timezone(chrono::Local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| naive.and_utc()));
    }
    if let Some(date) = parse_day_bucket(raw) {
        return Ok(if end_of_day {
            local_day_end(date)
        } else {
            local_day_start(date)
        });
    }
    Err(ApiError::validation(format!("Invalid date: {}", raw)))
}

/// Body of `POST /api/timer/start`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTimerRequest {
    pub task_id: Option<String>,
    pub note: Option<String>,
}

/// Body of `POST /api/timer/habit`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitRequest {
    pub task_id: Option<String>,
    pub note: Option<String>,
}

/// Body of `PUT /api/timer/note/:id`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteRequest {
    pub note: Option<String>,
}

/// Body of `PUT /api/timer/actions/:id/task`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveActionRequest {
    pub task_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_decoding() {
        let q = QueryParams::parse("projectIds=a%2Cb,c&note=hello+world&empty=&flag=true");
        assert_eq!(q.list("projectIds"), vec!["a", "b", "c"]);
        assert_eq!(q.get("note"), Some("hello world"));
        assert_eq!(q.get("empty"), None);
        assert!(q.flag("flag"));
        assert!(!q.flag("missing"));
    }

    #[test]
    fn test_positive_param() {
        let q = QueryParams::parse("page=3&limit=0");
        assert_eq!(q.positive("page", 1).unwrap(), 3);
        assert!(q.positive("limit", 20).is_err());
        assert_eq!(q.positive("other", 20).unwrap(), 20);
    }

    #[test]
    fn test_date_params() {
        let start = parse_date_param("2024-05-01", false).unwrap();
        let end = parse_date_param("2024-05-01", true).unwrap();
        assert!(end > start);
        assert_eq!((end - start).num_milliseconds(), 24 * 3_600_000 - 1);

        let exact = parse_date_param("2024-05-01T10:00:00Z", false).unwrap();
        assert_eq!(exact.to_rfc3339(), "2024-05-01T10:00:00+00:00");

        assert!(parse_date_param("soon", false).is_err());
    }

    #[test]
    fn test_date_range_requires_both() {
        let q = QueryParams::parse("startDate=2024-05-01");
        assert!(q.date_range().is_err());
        assert!(q.optional_date_range().unwrap().is_none());
    }

    #[test]
    fn test_empty_body_reads_as_object() {
        let ctx = RequestContext {
            user: User::new("a@example.com", None, Utc::now()),
            query: QueryParams::default(),
            body: String::new(),
        };
        let req: StartTimerRequest = ctx.json().unwrap();
        assert!(req.task_id.is_none());
    }
}
