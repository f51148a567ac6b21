//! The driver seam.
//!
//! Everything above this trait (sessions, elements, waits, conditions)
//! consumes the browser as a black box. Implementations in this crate:
//! [`crate::remote::RemoteDriver`] speaking W3C WebDriver over HTTP
//! (feature `remote`) and [`crate::mock::MockDriver`] for hermetic tests.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::locator::By;
use crate::result::EsperarResult;

/// Opaque driver-assigned reference to a located DOM node.
///
/// A handle identifies the node as it existed at lookup time. When the
/// node is removed or replaced, operations on the handle fail with
/// [`crate::EsperarError::StaleElement`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(String);

impl ElementId {
    /// Wrap a driver-assigned reference string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw reference string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Synchronous browser-automation operations.
///
/// Error contract: `find` fails with `NoSuchElement` when nothing matches
/// (while `find_all` returns an empty vector); element operations on a
/// removed node fail with `StaleElement`; all operations fail once the
/// driver has been quit.
pub trait PageDriver: Send + Sync {
    /// Load `url` in the browser, blocking until the navigation settles.
    fn navigate(&self, url: &str) -> EsperarResult<()>;

    /// The URL currently loaded.
    fn current_url(&self) -> EsperarResult<String>;

    /// Locate the first element matching `locator`.
    fn find(&self, locator: &By) -> EsperarResult<ElementId>;

    /// Locate every element matching `locator`; empty when none match.
    fn find_all(&self, locator: &By) -> EsperarResult<Vec<ElementId>>;

    /// Click the element.
    fn click(&self, element: &ElementId) -> EsperarResult<()>;

    /// Type `text` into the element.
    fn send_keys(&self, element: &ElementId, text: &str) -> EsperarResult<()>;

    /// Clear the element's value.
    fn clear(&self, element: &ElementId) -> EsperarResult<()>;

    /// The element's visible text content.
    fn text(&self, element: &ElementId) -> EsperarResult<String>;

    /// The value of an attribute, or `None` when it is absent.
    fn attribute(&self, element: &ElementId, name: &str) -> EsperarResult<Option<String>>;

    /// Whether the element accepts interaction (not disabled).
    fn is_enabled(&self, element: &ElementId) -> EsperarResult<bool>;

    /// Whether the element is rendered visibly.
    fn is_displayed(&self, element: &ElementId) -> EsperarResult<bool>;

    /// Maximize the browser window.
    fn maximize_window(&self) -> EsperarResult<()>;

    /// End the browser session. Further calls fail with `SessionClosed`.
    fn quit(&self) -> EsperarResult<()>;
}
