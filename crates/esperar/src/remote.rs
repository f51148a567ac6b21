//! W3C WebDriver client (feature `remote`).
//!
//! Blocking HTTP against a WebDriver server (chromedriver, geckodriver,
//! or a Selenium standalone). Commands travel as JSON, responses come
//! wrapped in a `value` envelope, and remote failures are mapped from the
//! server's `error` string onto [`EsperarError`] so the wait machinery
//! can tell transient signals from real failures.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, trace};

use crate::config::{Browser, SessionConfig};
use crate::driver::{ElementId, PageDriver};
use crate::locator::By;
use crate::result::{EsperarError, EsperarResult};

/// W3C web element identifier key.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// A driver speaking the W3C WebDriver protocol over HTTP.
#[derive(Debug)]
pub struct RemoteDriver {
    http: Client,
    base: String,
    session_id: String,
}

impl RemoteDriver {
    /// Create a new session on the server named by `config`.
    ///
    /// Every failure here (unreachable server, rejected capabilities,
    /// malformed response) is a setup failure.
    pub fn new(config: &SessionConfig) -> EsperarResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|error| EsperarError::setup(format!("building http client: {error}")))?;
        let base = config.webdriver_url.trim_end_matches('/').to_string();
        let payload = new_session_payload(config);
        let response = dispatch(&http, Method::POST, &format!("{base}/session"), Some(&payload))
            .map_err(|error| {
                EsperarError::setup(format!("creating webdriver session at {base}: {error}"))
            })?;
        let session_id = response
            .get("sessionId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                EsperarError::setup(format!("server did not return a session id: {response}"))
            })?;
        debug!(session_id = %session_id, base = %base, "webdriver session created");
        Ok(Self {
            http,
            base,
            session_id,
        })
    }

    /// The server-assigned session id.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn cmd(&self, method: Method, suffix: &str, body: Option<Value>) -> EsperarResult<Value> {
        let url = format!("{}/session/{}{suffix}", self.base, self.session_id);
        trace!(method = %method, %url, "webdriver command");
        dispatch(&self.http, method, &url, body.as_ref())
    }

    fn element_cmd(
        &self,
        method: Method,
        element: &ElementId,
        action: &str,
        body: Option<Value>,
    ) -> EsperarResult<Value> {
        self.cmd(method, &format!("/element/{}{action}", element.as_str()), body)
    }
}

impl PageDriver for RemoteDriver {
    fn navigate(&self, url: &str) -> EsperarResult<()> {
        self.cmd(Method::POST, "/url", Some(json!({ "url": url })))?;
        Ok(())
    }

    fn current_url(&self) -> EsperarResult<String> {
        let value = self.cmd(Method::GET, "/url", None)?;
        expect_string(&value, "current url")
    }

    fn find(&self, locator: &By) -> EsperarResult<ElementId> {
        let value = self
            .cmd(Method::POST, "/element", Some(locator_payload(locator)))
            .map_err(|error| match error {
                // The server's message is a raw selector dump; report the
                // locator the caller actually used.
                EsperarError::NoSuchElement { .. } => EsperarError::NoSuchElement {
                    locator: locator.to_string(),
                },
                other => other,
            })?;
        decode_element(&value)
    }

    fn find_all(&self, locator: &By) -> EsperarResult<Vec<ElementId>> {
        let value = self.cmd(Method::POST, "/elements", Some(locator_payload(locator)))?;
        let entries = value.as_array().ok_or_else(|| {
            EsperarError::protocol(format!("expected element array, got {value}"))
        })?;
        entries.iter().map(decode_element).collect()
    }

    fn click(&self, element: &ElementId) -> EsperarResult<()> {
        self.element_cmd(Method::POST, element, "/click", Some(json!({})))?;
        Ok(())
    }

    fn send_keys(&self, element: &ElementId, text: &str) -> EsperarResult<()> {
        self.element_cmd(Method::POST, element, "/value", Some(json!({ "text": text })))?;
        Ok(())
    }

    fn clear(&self, element: &ElementId) -> EsperarResult<()> {
        self.element_cmd(Method::POST, element, "/clear", Some(json!({})))?;
        Ok(())
    }

    fn text(&self, element: &ElementId) -> EsperarResult<String> {
        let value = self.element_cmd(Method::GET, element, "/text", None)?;
        expect_string(&value, "element text")
    }

    fn attribute(&self, element: &ElementId, name: &str) -> EsperarResult<Option<String>> {
        let value = self.element_cmd(Method::GET, element, &format!("/attribute/{name}"), None)?;
        if value.is_null() {
            Ok(None)
        } else {
            expect_string(&value, "attribute value").map(Some)
        }
    }

    fn is_enabled(&self, element: &ElementId) -> EsperarResult<bool> {
        let value = self.element_cmd(Method::GET, element, "/enabled", None)?;
        expect_bool(&value, "enabled flag")
    }

    fn is_displayed(&self, element: &ElementId) -> EsperarResult<bool> {
        let value = self.element_cmd(Method::GET, element, "/displayed", None)?;
        expect_bool(&value, "displayed flag")
    }

    fn maximize_window(&self) -> EsperarResult<()> {
        self.cmd(Method::POST, "/window/maximize", Some(json!({})))?;
        Ok(())
    }

    fn quit(&self) -> EsperarResult<()> {
        self.cmd(Method::DELETE, "", None)?;
        debug!(session_id = %self.session_id, "webdriver session deleted");
        Ok(())
    }
}

fn dispatch(
    http: &Client,
    method: Method,
    url: &str,
    body: Option<&Value>,
) -> EsperarResult<Value> {
    let mut request = http.request(method, url);
    if let Some(body) = body {
        request = request.json(body);
    }
    let response = request.send()?;
    let status = response.status();
    let payload: Value = response.json()?;
    let value = payload.get("value").cloned().unwrap_or(Value::Null);
    if status.is_success() {
        Ok(value)
    } else {
        Err(wire_error(&value))
    }
}

fn wire_error(value: &Value) -> EsperarError {
    let error = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    match error {
        "no such element" => EsperarError::NoSuchElement { locator: message },
        "stale element reference" => EsperarError::StaleElement { message },
        "element not interactable" => EsperarError::NotInteractable { message },
        "invalid session id" => EsperarError::SessionClosed,
        _ => EsperarError::Protocol {
            message: format!("{error}: {message}"),
        },
    }
}

fn locator_payload(locator: &By) -> Value {
    json!({
        "using": locator.strategy(),
        "value": locator.expression(),
    })
}

fn new_session_payload(config: &SessionConfig) -> Value {
    let mut capabilities = json!({ "browserName": config.browser.as_str() });
    if config.headless {
        match config.browser {
            Browser::Chrome => {
                capabilities["goog:chromeOptions"] = json!({
                    "args": ["--headless=new", "--disable-gpu", "--window-size=1920,1080"],
                });
            }
            Browser::Firefox => {
                capabilities["moz:firefoxOptions"] = json!({ "args": ["-headless"] });
            }
        }
    }
    json!({ "capabilities": { "alwaysMatch": capabilities } })
}

fn decode_element(value: &Value) -> EsperarResult<ElementId> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(ElementId::new)
        .ok_or_else(|| EsperarError::protocol(format!("response is not a web element: {value}")))
}

fn expect_string(value: &Value, what: &str) -> EsperarResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| EsperarError::protocol(format!("expected {what}, got {value}")))
}

fn expect_bool(value: &Value, what: &str) -> EsperarResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| EsperarError::protocol(format!("expected {what}, got {value}")))
}
