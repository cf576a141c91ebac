//! Per-source circuit breaker for fault tolerance.
//!
//! Each data source owns exactly one breaker. The breaker counts terminal
//! failures (a call that exhausted its HTTP retries counts once) and has
//! three observable states:
//!
//! - **Closed**: Normal operation, requests are allowed through.
//! - **Open**: The source is failing, requests are blocked.
//! - **HalfOpen**: Open, but the recovery timeout has elapsed; the next
//!   `can_attempt` call lets a probe through.
//!
//! Half-open is optimistic: the first `can_attempt` after the timeout closes
//! the circuit and zeroes the failure count, so concurrent callers arriving
//! before the probe completes are let through as well.
//!
//! The circuit breaker is in-memory and resets on application restart.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;

/// Default number of failures before opening the circuit.
const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Default number of successes that close an open circuit.
const DEFAULT_SUCCESS_THRESHOLD: u32 = 2;

/// Default time to wait before letting a probe through an open circuit.
const DEFAULT_RECOVERY_TIMEOUT: Duration = Duration::from_secs(300);

/// Circuit breaker state.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Normal operation - requests are allowed.
    Closed,
    /// Source is failing - requests are blocked.
    Open,
    /// Recovery timeout elapsed - the next request probes the source.
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "Closed"),
            Self::Open => write!(f, "Open"),
            Self::HalfOpen => write!(f, "HalfOpen"),
        }
    }
}

/// Circuit breaker configuration.
#[derive(Clone, Debug)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening the circuit.
    pub failure_threshold: u32,
    /// Number of consecutive successes that close an open circuit.
    pub success_threshold: u32,
    /// Time since the last failure before a probe is allowed.
    pub recovery_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            success_threshold: DEFAULT_SUCCESS_THRESHOLD,
            recovery_timeout: DEFAULT_RECOVERY_TIMEOUT,
        }
    }
}

/// Internal circuit state.
#[derive(Debug, Default)]
struct Circuit {
    is_open: bool,
    failure_count: u32,
    success_count: u32,
    /// Monotonic time of the last failure (drives the recovery timeout).
    last_failure: Option<Instant>,
    /// Wall-clock time of the last failure (reported in snapshots).
    last_failure_at: Option<DateTime<Utc>>,
}

/// Read-only view of a breaker, as reported by the orchestrator status.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakerSnapshot {
    pub state: CircuitState,
    /// Whether a call made now would be let through.
    pub available: bool,
    pub is_open: bool,
    pub failure_count: u32,
    pub success_count: u32,
    pub last_failure: Option<DateTime<Utc>>,
}

/// Circuit breaker for a single data source.
///
/// Thread-safe: the request path and the position monitor call through the
/// same source concurrently. No lock is held across an await point.
pub struct CircuitBreaker {
    name: String,
    circuit: Mutex<Circuit>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, CircuitBreakerConfig::default())
    }

    /// Create a circuit breaker with custom configuration.
    pub fn with_config(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            circuit: Mutex::new(Circuit::default()),
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Lock the circuit mutex, recovering from poison if necessary.
    ///
    /// For circuit breakers, it's safe to recover from a poisoned mutex since
    /// the worst case is slightly incorrect circuit state, which is better
    /// than panicking.
    fn lock_circuit(&self) -> MutexGuard<'_, Circuit> {
        self.circuit.lock().unwrap_or_else(|poisoned| {
            warn!("Circuit breaker mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn timeout_elapsed(&self, circuit: &Circuit, now: Instant) -> bool {
        circuit
            .last_failure
            .map(|at| now.saturating_duration_since(at) >= self.config.recovery_timeout)
            .unwrap_or(true)
    }

    /// Check if a request may be attempted.
    ///
    /// Returns true if the circuit is closed. If it is open and the recovery
    /// timeout has elapsed since the last failure, the circuit is flipped
    /// closed with a zero failure count and true is returned.
    pub fn can_attempt(&self) -> bool {
        self.can_attempt_at(Instant::now())
    }

    fn can_attempt_at(&self, now: Instant) -> bool {
        let mut circuit = self.lock_circuit();

        if !circuit.is_open {
            return true;
        }

        if self.timeout_elapsed(&circuit, now) {
            info!(
                "Circuit breaker: recovery timeout elapsed for '{}', probing",
                self.name
            );
            circuit.is_open = false;
            circuit.failure_count = 0;
            return true;
        }

        false
    }

    /// Record a successful call.
    ///
    /// Resets the failure count. An open circuit closes once the success
    /// threshold is reached.
    pub fn record_success(&self) {
        let mut circuit = self.lock_circuit();

        circuit.success_count = circuit.success_count.saturating_add(1);
        circuit.failure_count = 0;

        if circuit.is_open && circuit.success_count >= self.config.success_threshold {
            info!(
                "Circuit breaker: closing circuit for '{}' after {} successes",
                self.name, circuit.success_count
            );
            circuit.is_open = false;
        } else {
            debug!("Circuit breaker: success for '{}'", self.name);
        }
    }

    /// Record a failed call.
    ///
    /// Resets the success count and opens the circuit once the failure
    /// threshold is reached.
    pub fn record_failure(&self) {
        self.record_failure_at(Instant::now(), Utc::now());
    }

    fn record_failure_at(&self, now: Instant, wall: DateTime<Utc>) {
        let mut circuit = self.lock_circuit();

        circuit.failure_count = circuit.failure_count.saturating_add(1);
        circuit.success_count = 0;
        circuit.last_failure = Some(now);
        circuit.last_failure_at = Some(wall);

        if circuit.failure_count >= self.config.failure_threshold {
            if !circuit.is_open {
                warn!(
                    "Circuit breaker: opening circuit for '{}' after {} failures",
                    self.name, circuit.failure_count
                );
            }
            circuit.is_open = true;
        } else {
            debug!(
                "Circuit breaker: failure for '{}' ({}/{})",
                self.name, circuit.failure_count, self.config.failure_threshold
            );
        }
    }

    /// Current state without side effects.
    pub fn state(&self) -> CircuitState {
        self.snapshot().state
    }

    /// Read-only view of the breaker. Never flips the circuit.
    pub fn snapshot(&self) -> BreakerSnapshot {
        let circuit = self.lock_circuit();
        let state = if !circuit.is_open {
            CircuitState::Closed
        } else if self.timeout_elapsed(&circuit, Instant::now()) {
            CircuitState::HalfOpen
        } else {
            CircuitState::Open
        };

        BreakerSnapshot {
            state,
            available: state != CircuitState::Open,
            is_open: circuit.is_open,
            failure_count: circuit.failure_count,
            success_count: circuit.success_count,
            last_failure: circuit.last_failure_at,
        }
    }

    /// Reset the circuit to its initial closed state.
    pub fn reset(&self) {
        let mut circuit = self.lock_circuit();
        info!("Circuit breaker: manually resetting circuit for '{}'", self.name);
        *circuit = Circuit::default();
    }
}
