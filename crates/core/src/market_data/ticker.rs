use crate::errors::{Error, Result};

use super::market_data_constants::MAX_TICKER_LEN;

/// Validate a ticker symbol and return its canonical (trimmed, uppercase)
/// form.
///
/// Accepts up to six characters, alphanumeric apart from `-` and `.`.
/// Index aliases such as `SPX` are plain tickers here; providers map them
/// to their own notation.
pub fn validate_ticker(ticker: &str) -> Result<String> {
    let ticker = ticker.trim();
    if ticker.is_empty() || ticker.chars().count() > MAX_TICKER_LEN {
        return Err(Error::InvalidTicker(ticker.to_string()));
    }
    if ticker.contains(['^', '=', '/', ' ']) {
        return Err(Error::InvalidTicker(ticker.to_string()));
    }
    let cleaned: String = ticker.chars().filter(|c| *c != '-' && *c != '.').collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::InvalidTicker(ticker.to_string()));
    }
    Ok(ticker.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_tickers() {
        assert_eq!(validate_ticker("aapl").unwrap(), "AAPL");
        assert_eq!(validate_ticker(" SPX ").unwrap(), "SPX");
        assert_eq!(validate_ticker("BRK.B").unwrap(), "BRK.B");
        assert_eq!(validate_ticker("BF-B").unwrap(), "BF-B");
    }

    #[test]
    fn test_invalid_tickers() {
        for ticker in ["", "^SPX", "EURUSD=X", "BTC/USD", "TOOLONG", "A$", "--", "A B"] {
            assert!(
                matches!(validate_ticker(ticker), Err(Error::InvalidTicker(_))),
                "{ticker:?} should be rejected"
            );
        }
    }
}
