//! Result types for the pre-aggregated dashboard/reporting queries.
//!
//! Grounded on `PeeweeStorage._get_most_used_apps` and
//! `PeeweeStorage._get_dashboard_events`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of the "most used apps" report: total time spent in an
/// application over a time range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppUsage {
    pub app: String,
    pub url: Option<String>,
    pub total_duration_secs: f64,
}

/// A flattened, dashboard-friendly view of an event: ISO-formatted
/// start/end timestamps alongside the raw fields, matching the
/// `{start, end, event_id, duration, timestamp, data, id, bucket_id,
/// application_name, app, title, url}` projection from spec.md §4.5,
/// produced by the original's `JSON_OBJECT(...)` raw query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardEvent {
    pub id: i64,
    pub event_id: i64,
    pub bucket_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub timestamp: DateTime<Utc>,
    pub application_name: String,
    pub app: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub duration: f64,
    pub data: Value,
}

/// Applications excluded from usage reporting and the dashboard feed:
/// AFK signals, lock screens and login windows are not meaningful
/// "apps" a user spent time in. Matched case-insensitively, mirroring
/// the SQL backend's `LIKE '%...%'` clauses.
pub const EXCLUDED_APPS: [&str; 3] = ["afk", "lockapp", "loginwindow"];

/// True if `app` names one of [`EXCLUDED_APPS`], case-insensitively.
pub fn is_excluded_app(app: &str) -> bool {
    let app = app.to_ascii_lowercase();
    EXCLUDED_APPS.iter().any(|x| app.contains(x))
}

/// Events shorter than this are noise and dropped from both reports.
pub const MIN_REPORTABLE_DURATION_SECS: f64 = 30.0;

/// Lower-cased host of a url, with a leading `www.` stripped, for
/// case-insensitive comparison in the blocking predicate (§4.5).
pub fn normalised_host(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .map(|h| h.trim_start_matches("www.").to_ascii_lowercase())
}
