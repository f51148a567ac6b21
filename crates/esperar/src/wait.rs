//! Condition-polling waits.
//!
//! [`Wait::until`] blocks the calling thread, re-evaluating a
//! [`Condition`] against the live page until it produces a value or a
//! wall-clock deadline elapses. The condition is evaluated immediately on
//! entry, then once per poll interval. Transient not-ready signals
//! (element missing, stale reference) are swallowed and retried; any
//! other driver failure aborts the wait at once.
//!
//! The wait never mutates page state. Clicks and typing are explicit
//! steps the test performs itself; a condition only reads.

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::result::{EsperarError, EsperarResult};
use crate::session::Session;

/// Default wait deadline in milliseconds.
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default delay between successive condition evaluations, in
/// milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// The outcome of evaluating a condition once.
#[derive(Debug)]
pub enum ConditionOutcome<T> {
    /// Satisfied; the wait returns this value.
    Ready(T),
    /// Not satisfied yet. Carries a short description of what was
    /// observed, surfaced in the timeout error if the deadline passes.
    NotReady(String),
    /// Unrecoverable failure; the wait stops polling and propagates it.
    Failed(EsperarError),
}

impl<T> ConditionOutcome<T> {
    /// Classify a driver probe: success is ready, transient errors become
    /// not-ready observations, anything else fails the wait.
    pub fn from_probe(result: EsperarResult<T>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(error) if error.is_transient() => Self::NotReady(error.to_string()),
            Err(error) => Self::Failed(error),
        }
    }
}

/// A predicate over the live page, re-evaluated on every poll.
///
/// Implementations read through the session each time they are checked;
/// caching handles across polls defeats the point (see the text-present
/// condition, which must observe DOM changes).
pub trait Condition {
    /// The value produced when the condition is satisfied.
    type Output;

    /// Evaluate against the current page state.
    fn check(&self, session: &Session) -> ConditionOutcome<Self::Output>;

    /// Human-readable description, used in logs and timeout errors.
    fn description(&self) -> String;
}

/// Adapter turning a closure into a [`Condition`], for one-off checks.
pub struct FnCondition<F> {
    check: F,
    description: String,
}

impl<F> FnCondition<F> {
    /// Wrap `check` with a description for diagnostics.
    pub fn new(description: impl Into<String>, check: F) -> Self {
        Self {
            check,
            description: description.into(),
        }
    }
}

impl<F> fmt::Debug for FnCondition<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCondition")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<T, F> Condition for FnCondition<F>
where
    F: Fn(&Session) -> ConditionOutcome<T>,
{
    type Output = T;

    fn check(&self, session: &Session) -> ConditionOutcome<T> {
        (self.check)(session)
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

/// A bounded retry policy: deadline plus poll interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wait {
    timeout: Duration,
    poll_interval: Duration,
}

impl Default for Wait {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl Wait {
    /// A wait with the given deadline and the default poll interval.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// A wait with a deadline of `secs` seconds.
    #[must_use]
    pub const fn seconds(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// Override the poll interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// The configured deadline.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The configured poll interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Block until `condition` is satisfied or the deadline elapses.
    ///
    /// Evaluates immediately, then sleeps one poll interval between
    /// retries. On success returns the condition's value no later than
    /// one poll interval after it first became satisfiable. On deadline
    /// returns [`EsperarError::Timeout`] carrying the condition
    /// description, the last observation, and elapsed time; that error is
    /// recoverable and callers may branch on it (see [`fixed_delay`] for
    /// the sanctioned fallback).
    pub fn until<C: Condition>(&self, session: &Session, condition: C) -> EsperarResult<C::Output> {
        let description = condition.description();
        let start = Instant::now();
        debug!(
            condition = %description,
            timeout_ms = millis(self.timeout),
            poll_ms = millis(self.poll_interval),
            "waiting"
        );
        let mut last_observed = String::from("condition not yet evaluated");
        loop {
            match condition.check(session) {
                ConditionOutcome::Ready(value) => {
                    debug!(
                        condition = %description,
                        elapsed_ms = elapsed_millis(start),
                        "condition met"
                    );
                    return Ok(value);
                }
                ConditionOutcome::NotReady(observed) => {
                    trace!(condition = %description, observed = %observed, "not ready");
                    last_observed = observed;
                }
                ConditionOutcome::Failed(error) => {
                    debug!(condition = %description, %error, "wait aborted");
                    return Err(error);
                }
            }
            if start.elapsed() >= self.timeout {
                return Err(EsperarError::Timeout {
                    condition: description,
                    last_observed,
                    elapsed_ms: elapsed_millis(start),
                });
            }
            thread::sleep(self.poll_interval);
        }
    }
}

/// Block the calling thread for a fixed duration.
///
/// This is the single sanctioned fixed sleep in the crate: the recovery
/// branch after a caught [`EsperarError::Timeout`], paired with a direct
/// non-waiting re-check. Synchronization anywhere else belongs in
/// [`Wait::until`].
pub fn fixed_delay(duration: Duration) {
    trace!(delay_ms = millis(duration), "fixed delay");
    thread::sleep(duration);
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn elapsed_millis(start: Instant) -> u64 {
    millis(start.elapsed())
}
