//! Browser sessions and element handles.
//!
//! A [`Session`] is an opaque handle to one running browser instance,
//! owned by the test case that opened it. Release is scoped: dropping the
//! last handle quits the driver even when the test body bailed out early,
//! and an explicit [`Session::quit`] does the same eagerly. After quit,
//! every query fails with [`EsperarError::SessionClosed`] so nothing can
//! silently talk to a torn-down browser.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::driver::{ElementId, PageDriver};
use crate::locator::By;
use crate::result::{EsperarError, EsperarResult};

#[cfg(feature = "remote")]
use crate::config::SessionConfig;
#[cfg(feature = "remote")]
use crate::remote::RemoteDriver;

struct SessionInner {
    driver: Box<dyn PageDriver>,
    closed: AtomicBool,
}

impl SessionInner {
    fn ensure_open(&self) -> EsperarResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(EsperarError::SessionClosed)
        } else {
            Ok(())
        }
    }

    fn close(&self) -> EsperarResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            // Already closed; quitting twice is a no-op.
            Ok(())
        } else {
            self.driver.quit()
        }
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            if let Err(error) = self.driver.quit() {
                warn!(%error, "best-effort session quit during drop failed");
            }
        }
    }
}

/// Handle to one running browser instance under automation control.
///
/// Cloning is cheap and shares the underlying driver; the browser is quit
/// when the last clone is dropped or when [`Session::quit`] is called,
/// whichever comes first.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Open a session against a WebDriver server described by `config`.
    ///
    /// Failures here are setup failures: they happen before any condition
    /// logic runs and are terminal for the test.
    #[cfg(feature = "remote")]
    pub fn open(config: &SessionConfig) -> EsperarResult<Self> {
        info!(
            browser = %config.browser,
            url = %config.webdriver_url,
            headless = config.headless,
            "opening session"
        );
        let driver = RemoteDriver::new(config)?;
        Ok(Self::from_driver(driver))
    }

    /// Wrap an already-constructed driver.
    pub fn from_driver(driver: impl PageDriver + 'static) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                driver: Box::new(driver),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Whether this session has been quit.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Load `url`, blocking until the navigation settles.
    pub fn goto(&self, url: &str) -> EsperarResult<()> {
        self.inner.ensure_open()?;
        debug!(url, "navigating");
        self.inner.driver.navigate(url)
    }

    /// The URL currently loaded.
    pub fn current_url(&self) -> EsperarResult<String> {
        self.inner.ensure_open()?;
        self.inner.driver.current_url()
    }

    /// Locate the first element matching `locator`, without waiting.
    ///
    /// Fails with `NoSuchElement` when nothing matches right now; use a
    /// wait with a presence condition to tolerate late-arriving content.
    pub fn find(&self, locator: &By) -> EsperarResult<Element> {
        self.inner.ensure_open()?;
        let id = self.inner.driver.find(locator)?;
        Ok(Element {
            session: self.clone(),
            id,
            locator: locator.clone(),
        })
    }

    /// Locate every element matching `locator`; empty when none match.
    pub fn find_all(&self, locator: &By) -> EsperarResult<Vec<Element>> {
        self.inner.ensure_open()?;
        let ids = self.inner.driver.find_all(locator)?;
        Ok(ids
            .into_iter()
            .map(|id| Element {
                session: self.clone(),
                id,
                locator: locator.clone(),
            })
            .collect())
    }

    /// Maximize the browser window.
    pub fn maximize_window(&self) -> EsperarResult<()> {
        self.inner.ensure_open()?;
        self.inner.driver.maximize_window()
    }

    /// End the session explicitly.
    ///
    /// Idempotent across clones: the driver is quit at most once, and
    /// remaining clones observe `SessionClosed` on every further query.
    pub fn quit(self) -> EsperarResult<()> {
        info!("quitting session");
        self.inner.close()
    }
}

/// A reference to a located DOM node at a point in time.
///
/// Holds a clone of its [`Session`], so handles stay cheap to pass around.
/// When the underlying node is removed or replaced the handle goes stale;
/// [`Element::is_attached`] detects that instead of letting operations hit
/// a dead reference unnoticed.
#[derive(Debug, Clone)]
pub struct Element {
    session: Session,
    id: ElementId,
    locator: By,
}

impl Element {
    /// The driver-assigned reference.
    #[must_use]
    pub fn id(&self) -> &ElementId {
        &self.id
    }

    /// The locator this element was found with.
    #[must_use]
    pub fn locator(&self) -> &By {
        &self.locator
    }

    /// Click the element.
    pub fn click(&self) -> EsperarResult<()> {
        self.session.inner.ensure_open()?;
        debug!(locator = %self.locator, "click");
        self.session.inner.driver.click(&self.id)
    }

    /// Type `text` into the element.
    pub fn send_keys(&self, text: &str) -> EsperarResult<()> {
        self.session.inner.ensure_open()?;
        self.session.inner.driver.send_keys(&self.id, text)
    }

    /// Clear the element's value.
    pub fn clear(&self) -> EsperarResult<()> {
        self.session.inner.ensure_open()?;
        self.session.inner.driver.clear(&self.id)
    }

    /// The element's visible text content.
    pub fn text(&self) -> EsperarResult<String> {
        self.session.inner.ensure_open()?;
        self.session.inner.driver.text(&self.id)
    }

    /// The value of an attribute, or `None` when absent.
    pub fn attribute(&self, name: &str) -> EsperarResult<Option<String>> {
        self.session.inner.ensure_open()?;
        self.session.inner.driver.attribute(&self.id, name)
    }

    /// Whether the element accepts interaction.
    pub fn is_enabled(&self) -> EsperarResult<bool> {
        self.session.inner.ensure_open()?;
        self.session.inner.driver.is_enabled(&self.id)
    }

    /// Whether the element is rendered visibly.
    pub fn is_displayed(&self) -> EsperarResult<bool> {
        self.session.inner.ensure_open()?;
        self.session.inner.driver.is_displayed(&self.id)
    }

    /// Whether this handle still refers to a live DOM node.
    ///
    /// Probes the driver with a read-only query and converts the stale
    /// signal into `false` instead of an error; any non-transient failure
    /// still propagates.
    pub fn is_attached(&self) -> EsperarResult<bool> {
        self.session.inner.ensure_open()?;
        match self.session.inner.driver.is_enabled(&self.id) {
            Ok(_) => Ok(true),
            Err(error) if error.is_transient() => Ok(false),
            Err(error) => Err(error),
        }
    }
}
