use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A news article as returned by a source, before any scoring.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,

    /// Outlet name ("Reuters", "Bloomberg", ...). "Unknown" when absent.
    pub publisher: String,

    pub link: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,

    #[serde(default)]
    pub summary: String,
}
