//! Skip reason tracking for source selection diagnostics.

use crate::models::SourceId;

/// Why a source was skipped during a fetch.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SkipReason {
    /// The priority list names a source that was never registered
    /// (fallback sources without an API key).
    NotRegistered,

    /// The source does not implement the requested capability.
    CapabilityNotSupported,

    /// Circuit breaker is open for this source.
    CircuitBreakerOpen,
}

/// Record of a single source attempt during a fetch.
#[derive(Clone, Debug)]
pub struct SourceAttempt {
    pub source_id: SourceId,
    pub skipped: Option<SkipReason>,
    pub error: Option<String>,
    pub success: bool,
}

/// Detailed result of a fetch operation with skip diagnostics.
#[derive(Clone, Debug, Default)]
pub struct FetchDiagnostics {
    pub attempts: Vec<SourceAttempt>,
}

impl FetchDiagnostics {
    pub fn new() -> Self {
        Self {
            attempts: Vec::new(),
        }
    }

    pub fn record_skip(&mut self, source_id: SourceId, reason: SkipReason) {
        self.attempts.push(SourceAttempt {
            source_id,
            skipped: Some(reason),
            error: None,
            success: false,
        });
    }

    pub fn record_error(&mut self, source_id: SourceId, error: String) {
        self.attempts.push(SourceAttempt {
            source_id,
            skipped: None,
            error: Some(error),
            success: false,
        });
    }

    pub fn record_success(&mut self, source_id: SourceId) {
        self.attempts.push(SourceAttempt {
            source_id,
            skipped: None,
            error: None,
            success: true,
        });
    }

    /// Summary for logging/debugging.
    pub fn summary(&self) -> String {
        if self.attempts.is_empty() {
            return "no sources configured".to_string();
        }

        self.attempts
            .iter()
            .map(|a| {
                if a.success {
                    format!("{}: SUCCESS", a.source_id)
                } else if let Some(skip) = &a.skipped {
                    format!("{}: SKIPPED ({:?})", a.source_id, skip)
                } else if let Some(err) = &a.error {
                    format!("{}: ERROR ({})", a.source_id, err)
                } else {
                    format!("{}: UNKNOWN", a.source_id)
                }
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Check if any source succeeded.
    pub fn has_success(&self) -> bool {
        self.attempts.iter().any(|a| a.success)
    }

    /// Number of sources that were actually called.
    pub fn calls_made(&self) -> usize {
        self.attempts.iter().filter(|a| a.skipped.is_none()).count()
    }

    /// Get all skip reasons.
    pub fn skip_reasons(&self) -> Vec<(&SourceId, &SkipReason)> {
        self.attempts
            .iter()
            .filter_map(|a| a.skipped.as_ref().map(|s| (&a.source_id, s)))
            .collect()
    }

    /// Get all errors.
    pub fn errors(&self) -> Vec<(&SourceId, &str)> {
        self.attempts
            .iter()
            .filter_map(|a| a.error.as_ref().map(|e| (&a.source_id, e.as_str())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;

    #[test]
    fn test_diagnostics_summary() {
        let mut diag = FetchDiagnostics::new();
        diag.record_skip(Cow::Borrowed("YAHOO"), SkipReason::CircuitBreakerOpen);
        diag.record_error(Cow::Borrowed("ALPHA_VANTAGE"), "Timeout".to_string());
        diag.record_success(Cow::Borrowed("FINNHUB"));

        let summary = diag.summary();
        assert!(summary.contains("YAHOO: SKIPPED"));
        assert!(summary.contains("ALPHA_VANTAGE: ERROR"));
        assert!(summary.contains("FINNHUB: SUCCESS"));
        assert_eq!(diag.calls_made(), 2);
    }

    #[test]
    fn test_has_success() {
        let mut diag = FetchDiagnostics::new();
        diag.record_skip(Cow::Borrowed("YAHOO"), SkipReason::CircuitBreakerOpen);
        assert!(!diag.has_success());

        diag.record_success(Cow::Borrowed("ALPHA_VANTAGE"));
        assert!(diag.has_success());
    }

    #[test]
    fn test_skip_reasons_and_errors() {
        let mut diag = FetchDiagnostics::new();
        diag.record_skip(Cow::Borrowed("A"), SkipReason::CircuitBreakerOpen);
        diag.record_skip(Cow::Borrowed("B"), SkipReason::NotRegistered);
        diag.record_error(Cow::Borrowed("C"), "HTTP 500".to_string());

        assert_eq!(diag.skip_reasons().len(), 2);
        assert_eq!(diag.errors(), vec![(&Cow::Borrowed("C"), "HTTP 500")]);
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(FetchDiagnostics::new().summary(), "no sources configured");
    }
}
