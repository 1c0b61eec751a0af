//! Lviv regional power company (LOE) outage feed.
//!
//! The feed is a Hydra collection whose rows are loosely typed: ids arrive as
//! numbers or numeric strings, `buildingNames` as a comma separated string or
//! an array, and `city`/`street` may be missing. Rows are normalized into
//! [`OutageRecord`]s here; validation and deduplication happen in ingestion.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{Clock, OutageProvider, SystemClock};
use crate::error::{FetchError, FetchResult};
use crate::ingestion::OutageRecord;

static LINE_BREAKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\r\n]+").expect("line break pattern is a valid regex"));

/// LOE outage provider
pub struct LoeOutageProvider {
    url: String,
    client: Client,
    clock: Arc<dyn Clock>,
}

impl LoeOutageProvider {
    pub fn new(url: impl Into<String>, timeout: Duration) -> FetchResult<Self> {
        Self::with_clock(url, timeout, Arc::new(SystemClock))
    }

    pub fn with_clock(
        url: impl Into<String>,
        timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> FetchResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
            clock,
        })
    }
}

#[async_trait]
impl OutageProvider for LoeOutageProvider {
    /// GET the feed and normalize its rows.
    ///
    /// A non-2xx status is a [`FetchError::Status`], not an empty feed: the
    /// cycle is aborted and reported as failed, so a one-shot `notify` exits
    /// non-zero and loop/cron modes log the failure and try again next tick.
    async fn fetch_outages(&self) -> FetchResult<Vec<OutageRecord>> {
        debug!(url = %self.url, "Fetching outages");

        let response = self.client.get(&self.url).send().await?;
        ensure_success(response.status())?;

        let body = response.text().await?;
        let records = decode_feed(&body, self.clock.as_ref())?;

        info!(count = records.len(), "Fetched outage records");
        Ok(records)
    }

    fn name(&self) -> &'static str {
        "LOE"
    }
}

fn ensure_success(status: StatusCode) -> FetchResult<()> {
    if status.is_success() {
        return Ok(());
    }
    warn!(status = %status, "Outage feed returned non-success status");
    Err(FetchError::Status(status.as_u16()))
}

// LOE API response structures

#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(rename = "hydra:member", default)]
    members: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedRow {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    date_event: Option<String>,
    #[serde(default)]
    date_plan_in: Option<String>,
    #[serde(default)]
    koment: Option<String>,
    #[serde(default)]
    building_names: Option<BuildingNames>,
    #[serde(default)]
    city: Option<Value>,
    #[serde(default)]
    street: Option<Value>,
}

/// Numeric id sent either as a JSON number or as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LooseId {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LooseId {
    /// Integer value; fractional parts are truncated, anything unparsable is 0.
    fn to_i64(&self) -> i64 {
        match self {
            LooseId::Int(n) => *n,
            LooseId::Float(f) => truncate(*f),
            LooseId::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .unwrap_or_else(|_| s.parse::<f64>().map(truncate).unwrap_or(0))
            }
        }
    }
}

/// Integer form of a loosely typed id; booleans, objects, arrays and null are 0.
fn loose_int(value: Option<&Value>) -> i64 {
    value
        .cloned()
        .and_then(|v| serde_json::from_value::<LooseId>(v).ok())
        .map(|id| id.to_i64())
        .unwrap_or(0)
}

fn truncate(f: f64) -> i64 {
    if f.is_finite() { f.trunc() as i64 } else { 0 }
}

/// `buildingNames` as `"10, 12"` or `["10", 12]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum BuildingNames {
    Joined(String),
    List(Vec<Value>),
}

impl BuildingNames {
    fn into_vec(self) -> Vec<String> {
        let parts: Vec<String> = match self {
            BuildingNames::Joined(s) => s.split(',').map(str::to_string).collect(),
            BuildingNames::List(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Null => None,
                    Value::String(s) => Some(s),
                    other => Some(other.to_string()),
                })
                .collect(),
        };

        parts
            .into_iter()
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect()
    }
}

/// Decode a feed body into normalized records.
///
/// A body that is not a JSON object is an error; individual rows that fail to
/// decode are skipped.
pub fn decode_feed(body: &str, clock: &dyn Clock) -> FetchResult<Vec<OutageRecord>> {
    let response: FeedResponse = serde_json::from_str(body)?;

    let mut records = Vec::with_capacity(response.members.len());
    for (index, raw) in response.members.into_iter().enumerate() {
        match serde_json::from_value::<FeedRow>(raw) {
            Ok(row) => records.push(normalize_row(row, clock)),
            Err(e) => {
                debug!(index, error = %e, "Skipping undecodable outage row");
            }
        }
    }

    Ok(records)
}

fn normalize_row(row: FeedRow, clock: &dyn Clock) -> OutageRecord {
    let (street_id, street_name) = row
        .street
        .as_ref()
        .map(|street| {
            let id = loose_int(street.get("id"));
            let name = street
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            (id, name)
        })
        .unwrap_or_default();

    let city = row
        .city
        .as_ref()
        .and_then(|city| city.get("name"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    OutageRecord {
        id: loose_int(row.id.as_ref()),
        start: parse_date(row.date_event.as_deref(), clock),
        end: parse_date(row.date_plan_in.as_deref(), clock),
        city,
        street_id,
        street_name,
        buildings: row.building_names.map(BuildingNames::into_vec).unwrap_or_default(),
        comment: normalize_comment(row.koment.as_deref().unwrap_or_default()),
    }
}

/// RFC 3339, or a bare `YYYY-MM-DDTHH:MM:SS` read as UTC; anything else is "now".
fn parse_date(raw: Option<&str>, clock: &dyn Clock) -> DateTime<FixedOffset> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return clock.now();
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed;
    }

    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        Ok(naive) => naive.and_utc().fixed_offset(),
        Err(_) => {
            debug!(value = raw, "Unparsable outage date, using current time");
            clock.now()
        }
    }
}

fn normalize_comment(raw: &str) -> String {
    LINE_BREAKS.replace_all(raw, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::FixedClock;
    use chrono::{TimeZone, Utc};

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap().fixed_offset())
    }

    fn decode(body: &str) -> Vec<OutageRecord> {
        decode_feed(body, &clock()).unwrap()
    }

    fn row(extra: &str) -> String {
        format!(
            r#"{{"hydra:member":[{{"dateEvent":"2024-01-01T08:00:00+00:00","datePlanIn":"2024-01-01T16:00:00+00:00",{extra}}}]}}"#
        )
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let result = decode_feed("not json", &clock());
        assert!(matches!(result, Err(FetchError::Parse(_))));
    }

    #[test]
    fn test_missing_members_is_empty() {
        assert!(decode("{}").is_empty());
    }

    #[test]
    fn test_full_row() {
        let records = decode(&row(
            r#""id":1,"koment":"test","buildingNames":"10, 12, 14","city":{"name":"Львів"},"street":{"id":1,"name":"Стрийська"}"#,
        ));

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id, 1);
        assert_eq!(record.city, "Львів");
        assert_eq!(record.street_id, 1);
        assert_eq!(record.street_name, "Стрийська");
        assert_eq!(record.buildings, vec!["10", "12", "14"]);
        assert_eq!(record.comment, "test");
        assert_eq!(record.start.timestamp(), 1_704_096_000);
        assert_eq!(record.end.timestamp(), 1_704_124_800);
    }

    #[test]
    fn test_building_names_as_array() {
        let records = decode(&row(r#""buildingNames":["10", 12, " ", null],"street":{"id":1,"name":"S"}"#));
        assert_eq!(records[0].buildings, vec!["10", "12"]);
    }

    #[test]
    fn test_string_and_decimal_ids() {
        let records = decode(&row(r#""id":"123","street":{"id":"456.0","name":"S"}"#));
        assert_eq!(records[0].id, 123);
        assert_eq!(records[0].street_id, 456);

        let records = decode(&row(r#""id":42.9,"street":{"id":"abc","name":"S"}"#));
        assert_eq!(records[0].id, 42);
        assert_eq!(records[0].street_id, 0);
    }

    #[test]
    fn test_non_numeric_id_keeps_the_row() {
        for id in ["true", r#"{"value":7}"#, "[1,2]", "null"] {
            let records = decode(&row(&format!(
                r#""id":{id},"buildingNames":"10","street":{{"id":1,"name":"S"}}"#
            )));
            assert_eq!(records.len(), 1, "id {id}");
            assert_eq!(records[0].id, 0, "id {id}");
            assert_eq!(records[0].buildings, vec!["10"]);
        }
    }

    #[test]
    fn test_non_success_status_is_an_error() {
        assert!(ensure_success(StatusCode::OK).is_ok());
        assert!(matches!(
            ensure_success(StatusCode::SERVICE_UNAVAILABLE),
            Err(FetchError::Status(503))
        ));
        assert!(matches!(
            ensure_success(StatusCode::NOT_FOUND),
            Err(FetchError::Status(404))
        ));
    }

    #[test]
    fn test_missing_city_and_street() {
        let records = decode(&row(r#""id":1,"buildingNames":"10""#));
        assert_eq!(records[0].city, "");
        assert_eq!(records[0].street_name, "");
        assert_eq!(records[0].street_id, 0);
    }

    #[test]
    fn test_missing_dates_use_clock() {
        let records = decode(
            r#"{"hydra:member":[{"id":1,"dateEvent":"","koment":"x","buildingNames":"10"}]}"#,
        );
        assert_eq!(records[0].start, clock().now());
        assert_eq!(records[0].end, clock().now());
    }

    #[test]
    fn test_naive_date_is_utc() {
        let records = decode(
            r#"{"hydra:member":[{"dateEvent":"2024-01-01T08:00:00","datePlanIn":"garbage"}]}"#,
        );
        assert_eq!(records[0].start.timestamp(), 1_704_096_000);
        assert_eq!(records[0].end, clock().now());
    }

    #[test]
    fn test_comment_normalization() {
        let records = decode(&row(r#""koment":"line1\r\nline2\n\n\nline3""#));
        assert_eq!(records[0].comment, "line1 line2 line3");

        let records = decode(&row(r#""koment":"  hello  ""#));
        assert_eq!(records[0].comment, "hello");
    }

    #[test]
    fn test_undecodable_row_is_skipped() {
        let records = decode(
            r#"{"hydra:member":[{"koment":42},{"id":2,"buildingNames":"10"}, "oops"]}"#,
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 2);
    }

    #[test]
    fn test_duplicates_are_not_collapsed_here() {
        let body = r#"{"hydra:member":[
            {"id":1,"dateEvent":"2024-01-01T08:00:00+00:00","datePlanIn":"2024-01-01T16:00:00+00:00","koment":"a","buildingNames":"10","street":{"id":1,"name":"S"}},
            {"id":2,"dateEvent":"2024-01-01T08:00:00+00:00","datePlanIn":"2024-01-01T16:00:00+00:00","koment":"b","buildingNames":"10","street":{"id":1,"name":"S"}}
        ]}"#;
        assert_eq!(decode(body).len(), 2);
    }
}
