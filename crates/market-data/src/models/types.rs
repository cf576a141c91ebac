use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Data source identifier - mostly static constants
pub type SourceId = Cow<'static, str>;

/// The three kinds of data a source can serve.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Daily OHLCV history.
    HistoricalSeries,
    /// Latest traded price.
    Quote,
    /// Recent news articles.
    News,
}

impl Capability {
    pub const ALL: [Capability; 3] = [Self::HistoricalSeries, Self::Quote, Self::News];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HistoricalSeries => write!(f, "historical series"),
            Self::Quote => write!(f, "quote"),
            Self::News => write!(f, "news"),
        }
    }
}
