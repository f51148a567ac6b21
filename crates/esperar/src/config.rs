//! Session configuration.
//!
//! Configuration is an explicit value passed to the session provider at
//! construction time. There is no process-global state (no system
//! properties, no ambient driver paths), so building sessions from
//! several threads at once is safe.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::result::{EsperarError, EsperarResult};

/// Default WebDriver server address (chromedriver/geckodriver/Selenium
/// standalone all listen here out of the box).
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";

/// Default wire request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// The closed set of supported browsers.
///
/// Parsing an unknown name is an [`EsperarError::UnsupportedBrowser`]
/// error, never a silent substitution of a default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    /// Google Chrome / Chromium, driven through chromedriver.
    #[default]
    Chrome,
    /// Mozilla Firefox, driven through geckodriver.
    Firefox,
}

impl Browser {
    /// Canonical lowercase name, also the W3C `browserName` capability.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Browser {
    type Err = EsperarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chrome" | "chromium" => Ok(Self::Chrome),
            "firefox" => Ok(Self::Firefox),
            _ => Err(EsperarError::UnsupportedBrowser {
                name: s.to_string(),
            }),
        }
    }
}

/// Everything needed to open one browser session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Base URL of the WebDriver server.
    pub webdriver_url: String,
    /// Which browser to request.
    pub browser: Browser,
    /// Run the browser without a visible window.
    pub headless: bool,
    /// Timeout for individual wire requests, in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            browser: Browser::default(),
            headless: true,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl SessionConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target browser.
    #[must_use]
    pub fn with_browser(mut self, browser: Browser) -> Self {
        self.browser = browser;
        self
    }

    /// Set the WebDriver server URL.
    #[must_use]
    pub fn with_webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.webdriver_url = url.into();
        self
    }

    /// Toggle headless mode.
    #[must_use]
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set the wire request timeout.
    #[must_use]
    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    /// Build a configuration from the process environment.
    ///
    /// Recognized variables: `ESPERAR_WEBDRIVER_URL`, `ESPERAR_BROWSER`,
    /// `ESPERAR_HEADLESS` (`1`/`true`/`yes` or `0`/`false`/`no`). Unset
    /// variables keep their defaults; an unrecognized browser name or
    /// headless flag is an error.
    pub fn from_env() -> EsperarResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> EsperarResult<Self> {
        let mut config = Self::default();
        if let Some(url) = lookup("ESPERAR_WEBDRIVER_URL") {
            config.webdriver_url = url;
        }
        if let Some(name) = lookup("ESPERAR_BROWSER") {
            config.browser = name.parse()?;
        }
        if let Some(flag) = lookup("ESPERAR_HEADLESS") {
            config.headless = parse_flag("ESPERAR_HEADLESS", &flag)?;
        }
        Ok(config)
    }
}

fn parse_flag(key: &str, value: &str) -> EsperarResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(EsperarError::setup(format!(
            "invalid {key} value {value:?} (expected true/false)"
        ))),
    }
}
