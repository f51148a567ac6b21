//! Esperar: synchronous condition-polling waits for browser e2e tests.
//!
//! The centerpiece is [`Wait::until`]: evaluate a [`Condition`] against a
//! live [`Session`] immediately, then keep re-evaluating on a poll
//! interval until it produces a value or a wall-clock deadline elapses.
//! Transient not-ready signals (element missing, stale handle) are
//! swallowed and retried; deadline failures surface as a catchable
//! [`EsperarError::Timeout`] carrying the last observation.
//!
//! Around the wait sits the minimum session plumbing it needs: an
//! explicit [`SessionConfig`] with a closed [`Browser`] enum, the
//! [`PageDriver`] trait as the browser seam, a W3C WebDriver client
//! behind the `remote` feature, and an in-memory [`mock::MockDriver`]
//! whose scheduled effects make time-dependent page behavior testable
//! without a browser.
//!
//! # Quick start
//!
//! ```
//! use std::time::Duration;
//! use esperar::mock::{Effect, ElementSpec, MockDriver};
//! use esperar::{conditions, By, Session, Wait};
//!
//! // A page whose #finish text arrives 30ms from now.
//! let mock = MockDriver::single_page(vec![ElementSpec::new("div").with_id("finish")]);
//! mock.schedule(
//!     Duration::from_millis(30),
//!     Effect::SetText { id: "finish".into(), text: "Hello World!".into() },
//! );
//!
//! let session = Session::from_driver(mock);
//! let wait = Wait::new(Duration::from_millis(500))
//!     .with_poll_interval(Duration::from_millis(10));
//! let text = wait.until(&session, conditions::text_present(By::id("finish"), "Hello World!"))?;
//! assert_eq!(text, "Hello World!");
//! session.quit()?;
//! # Ok::<(), esperar::EsperarError>(())
//! ```

#![warn(missing_docs)]

pub mod conditions;
pub mod config;
pub mod driver;
pub mod locator;
pub mod mock;
#[cfg(feature = "remote")]
pub mod remote;
pub mod result;
pub mod session;
pub mod wait;

// ============================================================================
// Re-exports
// ============================================================================

pub use conditions::{
    clickable, present, stale, text_present, visible, ElementClickable, ElementPresent,
    ElementVisible, Staleness, TextPresent,
};
pub use config::{
    Browser, SessionConfig, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_WEBDRIVER_URL,
};
pub use driver::{ElementId, PageDriver};
pub use locator::By;
#[cfg(feature = "remote")]
pub use remote::RemoteDriver;
pub use result::{ensure, ensure_contains, ensure_eq, EsperarError, EsperarResult};
pub use session::{Element, Session};
pub use wait::{
    fixed_delay, Condition, ConditionOutcome, FnCondition, Wait, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_WAIT_TIMEOUT_MS,
};

/// Commonly used types, importable as a block.
pub mod prelude {
    pub use crate::conditions::{clickable, present, stale, text_present, visible};
    pub use crate::config::{Browser, SessionConfig};
    pub use crate::locator::By;
    pub use crate::result::{ensure, ensure_contains, ensure_eq, EsperarError, EsperarResult};
    pub use crate::session::{Element, Session};
    pub use crate::wait::{fixed_delay, Condition, ConditionOutcome, FnCondition, Wait};
}
