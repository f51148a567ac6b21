//! Result and error types for esperar operations.
//!
//! One enum covers the whole taxonomy the wait machinery cares about:
//! transient not-ready signals (swallowed and retried inside a wait),
//! timeouts (recoverable, the caller may branch on them), assertion
//! failures (terminal for the current test), and setup failures (terminal
//! before any condition logic runs).

use std::fmt;

use thiserror::Error;

/// Result type for esperar operations.
pub type EsperarResult<T> = Result<T, EsperarError>;

/// Errors that can occur while driving a browser session.
#[derive(Debug, Error)]
pub enum EsperarError {
    /// The driver/session could not be created.
    #[error("failed to start session: {message}")]
    SessionSetup {
        /// What went wrong during session startup.
        message: String,
    },

    /// The session was already quit; no further queries are allowed.
    #[error("session is closed")]
    SessionClosed,

    /// A browser name outside the supported set was requested.
    #[error("unsupported browser {name:?} (supported: chrome, firefox)")]
    UnsupportedBrowser {
        /// The offending browser name as given.
        name: String,
    },

    /// No element matched the locator. Transient: polling may retry.
    #[error("no element matching {locator}")]
    NoSuchElement {
        /// Human-readable locator description.
        locator: String,
    },

    /// The element reference no longer points at a live DOM node.
    /// Transient: polling may retry (or a staleness wait may succeed).
    #[error("stale element reference: {message}")]
    StaleElement {
        /// Driver-provided detail.
        message: String,
    },

    /// The element exists but cannot currently be interacted with.
    /// Transient: polling may retry.
    #[error("element not interactable: {message}")]
    NotInteractable {
        /// Driver-provided detail.
        message: String,
    },

    /// A wait's deadline elapsed before its condition was satisfied.
    ///
    /// Recoverable: callers may match on this variant and take a fallback
    /// path instead of failing the test.
    #[error("timed out after {elapsed_ms}ms waiting for {condition} (last observed: {last_observed})")]
    Timeout {
        /// Description of the condition that was being waited for.
        condition: String,
        /// What the final evaluation observed instead of success.
        last_observed: String,
        /// Wall-clock time spent polling, in milliseconds.
        elapsed_ms: u64,
    },

    /// Observed state did not match the expectation. Terminal for the test.
    #[error("assertion failed: {message}")]
    Assertion {
        /// What was expected versus what was seen.
        message: String,
    },

    /// The remote end answered with an error this crate has no mapping for.
    #[error("webdriver protocol error: {message}")]
    Protocol {
        /// The remote error string and message.
        message: String,
    },

    /// Transport-level failure talking to the WebDriver server.
    #[cfg(feature = "remote")]
    #[error("webdriver transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A wire payload could not be encoded or decoded.
    #[error("invalid webdriver payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl EsperarError {
    /// Create a session setup error.
    pub fn setup(message: impl Into<String>) -> Self {
        Self::SessionSetup {
            message: message.into(),
        }
    }

    /// Create an assertion failure.
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion {
            message: message.into(),
        }
    }

    /// Create a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Whether this error is an expected "not yet ready" signal during
    /// polling. Transient errors never escape a wait; anything else aborts
    /// it immediately.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NoSuchElement { .. } | Self::StaleElement { .. } | Self::NotInteractable { .. }
        )
    }

    /// Whether this error is a wait timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

// ============================================================================
// Non-panicking checks
// ============================================================================

/// Fail with [`EsperarError::Assertion`] unless `condition` holds.
///
/// Suites use these helpers instead of panicking asserts so that failures
/// flow through the same error channel as timeouts and setup problems, and
/// session teardown still runs.
pub fn ensure(condition: bool, message: impl Into<String>) -> EsperarResult<()> {
    if condition {
        Ok(())
    } else {
        Err(EsperarError::assertion(message))
    }
}

/// Fail unless `haystack` contains `needle`.
pub fn ensure_contains(haystack: &str, needle: &str) -> EsperarResult<()> {
    ensure(
        haystack.contains(needle),
        format!("expected {haystack:?} to contain {needle:?}"),
    )
}

/// Fail unless `left == right`.
pub fn ensure_eq<T>(left: &T, right: &T, context: &str) -> EsperarResult<()>
where
    T: PartialEq + fmt::Debug,
{
    ensure(
        left == right,
        format!("{context}: expected {right:?}, got {left:?}"),
    )
}
