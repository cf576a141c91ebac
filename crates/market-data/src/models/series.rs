use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One daily OHLCV bar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bar {
    /// Session date (midnight UTC)
    pub timestamp: DateTime<Utc>,

    pub open: Decimal,

    pub high: Decimal,

    pub low: Decimal,

    /// Closing price (required)
    pub close: Decimal,

    /// Trading volume (indices may not report one)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,
}

impl Bar {
    /// Create a full OHLCV bar
    pub fn ohlcv(
        timestamp: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Option<Decimal>,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Historical daily series for one ticker, ordered by timestamp ascending.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub ticker: String,

    /// Source that produced the series (YAHOO, ALPHA_VANTAGE, ...)
    pub source: String,

    pub bars: Vec<Bar>,
}

impl Series {
    /// Build a series, sorting bars ascending.
    pub fn new(ticker: impl Into<String>, source: impl Into<String>, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        Self {
            ticker: ticker.into(),
            source: source.into(),
            bars,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Most recent bar, if any.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Keep only bars within `days` of `now`.
    pub fn trim_to_days(mut self, now: DateTime<Utc>, days: i64) -> Self {
        let cutoff = now - Duration::days(days);
        self.bars.retain(|b| b.timestamp >= cutoff);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn bar(day: u32, close: Decimal) -> Bar {
        let ts = Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap();
        Bar::ohlcv(ts, close, close, close, close, Some(dec!(1000)))
    }

    #[test]
    fn test_series_sorts_bars() {
        let series = Series::new("AAPL", "YAHOO", vec![bar(5, dec!(3)), bar(1, dec!(1))]);
        assert_eq!(series.bars[0].close, dec!(1));
        assert_eq!(series.last().map(|b| b.close), Some(dec!(3)));
    }

    #[test]
    fn test_trim_to_days() {
        let series = Series::new("AAPL", "YAHOO", vec![bar(1, dec!(1)), bar(20, dec!(2))]);
        let now = Utc.with_ymd_and_hms(2024, 3, 25, 0, 0, 0).unwrap();
        let trimmed = series.trim_to_days(now, 10);
        assert_eq!(trimmed.len(), 1);
        assert_eq!(trimmed.bars[0].close, dec!(2));
    }
}
