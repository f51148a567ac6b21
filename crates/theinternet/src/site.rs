//! In-memory model of the site pages, for hermetic runs.
//!
//! Each page is a [`PageSpec`] mirroring the DOM the suites touch, with
//! click rules reproducing the site's behavior: the login form branches
//! on the typed credentials, the loading pages deliver their content
//! after a delay, and the dynamic-controls toggles detach, re-attach,
//! enable, and disable their targets. Delays are scaled to milliseconds
//! by default so hermetic runs stay fast; the live site takes seconds
//! for the same transitions.

use std::time::Duration;

use esperar::mock::{Effect, ElementSpec, MockDriver, PageSpec, TimedEffect};
use esperar::Session;

use crate::pages::{dynamic_controls, dynamic_loading, login, secure};
use crate::{LOGIN_SUCCESS_MESSAGE, VALID_PASSWORD, VALID_USERNAME};

/// Base URL the mock pages are registered under.
pub const MOCK_BASE_URL: &str = "mock://the-internet";

/// Absolute mock URL for a site path.
pub fn url(path: &str) -> String {
    format!("{MOCK_BASE_URL}{path}")
}

/// How long the mock site takes for its time-dependent transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteDelays {
    /// Dynamic-loading delay between Start and the finish content.
    pub loading: Duration,
    /// Dynamic-controls delay between a toggle click and its outcome.
    pub toggle: Duration,
}

impl Default for SiteDelays {
    fn default() -> Self {
        Self {
            loading: Duration::from_millis(200),
            toggle: Duration::from_millis(80),
        }
    }
}

impl SiteDelays {
    /// Override the dynamic-loading delay.
    #[must_use]
    pub const fn with_loading(mut self, loading: Duration) -> Self {
        self.loading = loading;
        self
    }

    /// Override the dynamic-controls delay.
    #[must_use]
    pub const fn with_toggle(mut self, toggle: Duration) -> Self {
        self.toggle = toggle;
        self
    }
}

/// Build a driver serving every page the suites visit.
pub fn build_driver(delays: SiteDelays) -> MockDriver {
    MockDriver::builder()
        .page(url(login::PATH), login_page())
        .page(url(secure::PATH), secure_page())
        .page(
            url(dynamic_loading::HIDDEN_PATH),
            loading_hidden_page(delays.loading),
        )
        .page(
            url(dynamic_loading::RENDERED_PATH),
            loading_rendered_page(delays.loading),
        )
        .page(url(dynamic_controls::PATH), controls_page(delays.toggle))
        .build()
}

/// Build the mock site and a session over it. The driver handle stays
/// available for scheduling and teardown inspection.
pub fn open(delays: SiteDelays) -> (MockDriver, Session) {
    let driver = build_driver(delays);
    let session = Session::from_driver(driver.clone());
    (driver, session)
}

fn login_page() -> PageSpec {
    PageSpec::new()
        .element(
            ElementSpec::new("input")
                .with_id("username")
                .with_attribute("name", "username"),
        )
        .element(
            ElementSpec::new("input")
                .with_id("password")
                .with_attribute("name", "password")
                .with_attribute("type", "password"),
        )
        .element(
            ElementSpec::new("button")
                .with_id("login-button")
                .with_text("Login"),
        )
        .element(ElementSpec::new("div").with_id("flash").hidden())
        .on_click("login-button", |view| {
            let username = view.value_of("username").unwrap_or("");
            let password = view.value_of("password").unwrap_or("");
            if username == VALID_USERNAME && password == VALID_PASSWORD {
                return vec![TimedEffect::immediate(Effect::Navigate {
                    url: url(secure::PATH),
                })];
            }
            let message = if username == VALID_USERNAME {
                "Your password is invalid!"
            } else {
                "Your username is invalid!"
            };
            vec![
                TimedEffect::immediate(Effect::SetText {
                    id: "flash".to_string(),
                    text: message.to_string(),
                }),
                TimedEffect::immediate(Effect::SetDisplayed {
                    id: "flash".to_string(),
                    displayed: true,
                }),
            ]
        })
}

fn secure_page() -> PageSpec {
    PageSpec::new()
        .element(
            ElementSpec::new("div")
                .with_id("flash")
                .with_text(format!("{LOGIN_SUCCESS_MESSAGE}\n×")),
        )
        .element(
            ElementSpec::new("a")
                .with_id("logout")
                .with_text("Logout")
                .matched_by("a.button.secondary.radius"),
        )
        .on_click("logout", |_| {
            vec![TimedEffect::immediate(Effect::Navigate {
                url: url(login::PATH),
            })]
        })
}

fn start_button() -> ElementSpec {
    ElementSpec::new("button")
        .with_id("start")
        .with_text("Start")
        .matched_by("//div[@id='start']/button")
}

/// `/dynamic_loading/1`: the finish element exists, hidden and empty,
/// until the loading delay passes.
fn loading_hidden_page(loading: Duration) -> PageSpec {
    PageSpec::new()
        .element(start_button())
        .element(ElementSpec::new("div").with_id("loading").hidden())
        .element(ElementSpec::new("div").with_id("finish").hidden())
        .on_click("start", move |_| {
            vec![
                TimedEffect::immediate(Effect::SetDisplayed {
                    id: "start".to_string(),
                    displayed: false,
                }),
                TimedEffect::immediate(Effect::SetDisplayed {
                    id: "loading".to_string(),
                    displayed: true,
                }),
                TimedEffect::after(
                    loading,
                    Effect::SetDisplayed {
                        id: "loading".to_string(),
                        displayed: false,
                    },
                ),
                TimedEffect::after(
                    loading,
                    Effect::SetText {
                        id: "finish".to_string(),
                        text: dynamic_loading::FINISH_TEXT.to_string(),
                    },
                ),
                TimedEffect::after(
                    loading,
                    Effect::SetDisplayed {
                        id: "finish".to_string(),
                        displayed: true,
                    },
                ),
            ]
        })
}

/// `/dynamic_loading/2`: the finish element is attached only after the
/// loading delay.
fn loading_rendered_page(loading: Duration) -> PageSpec {
    PageSpec::new()
        .element(start_button())
        .element(ElementSpec::new("div").with_id("loading").hidden())
        .on_click("start", move |_| {
            vec![
                TimedEffect::immediate(Effect::SetDisplayed {
                    id: "start".to_string(),
                    displayed: false,
                }),
                TimedEffect::immediate(Effect::SetDisplayed {
                    id: "loading".to_string(),
                    displayed: true,
                }),
                TimedEffect::after(
                    loading,
                    Effect::SetDisplayed {
                        id: "loading".to_string(),
                        displayed: false,
                    },
                ),
                TimedEffect::after(
                    loading,
                    Effect::Attach(
                        ElementSpec::new("div")
                            .with_id("finish")
                            .with_text(dynamic_loading::FINISH_TEXT),
                    ),
                ),
            ]
        })
}

fn checkbox_spec() -> ElementSpec {
    ElementSpec::new("input")
        .with_id("checkbox")
        .with_attribute("type", "checkbox")
}

fn controls_page(toggle: Duration) -> PageSpec {
    PageSpec::new()
        .element(checkbox_spec())
        .element(
            ElementSpec::new("button")
                .with_id("checkbox-toggle")
                .with_text("Remove")
                .matched_by("#checkbox-example button"),
        )
        .element(
            ElementSpec::new("input")
                .with_id("text-input")
                .with_attribute("type", "text")
                .disabled()
                .matched_by("#input-example input"),
        )
        .element(
            ElementSpec::new("button")
                .with_id("input-toggle")
                .with_text("Enable")
                .matched_by("#input-example button"),
        )
        .element(ElementSpec::new("p").with_id("message").hidden())
        .on_click("checkbox-toggle", move |view| {
            let show_message = |text: &str| {
                vec![
                    TimedEffect::after(
                        toggle,
                        Effect::SetText {
                            id: "message".to_string(),
                            text: text.to_string(),
                        },
                    ),
                    TimedEffect::after(
                        toggle,
                        Effect::SetDisplayed {
                            id: "message".to_string(),
                            displayed: true,
                        },
                    ),
                ]
            };
            if view.text_of("checkbox").is_some() {
                let mut effects = vec![
                    TimedEffect::after(
                        toggle,
                        Effect::Detach {
                            id: "checkbox".to_string(),
                        },
                    ),
                    TimedEffect::after(
                        toggle,
                        Effect::SetText {
                            id: "checkbox-toggle".to_string(),
                            text: "Add".to_string(),
                        },
                    ),
                ];
                effects.extend(show_message(dynamic_controls::GONE_MESSAGE));
                effects
            } else {
                let mut effects = vec![
                    TimedEffect::after(toggle, Effect::Attach(checkbox_spec())),
                    TimedEffect::after(
                        toggle,
                        Effect::SetText {
                            id: "checkbox-toggle".to_string(),
                            text: "Remove".to_string(),
                        },
                    ),
                ];
                effects.extend(show_message(dynamic_controls::BACK_MESSAGE));
                effects
            }
        })
        .on_click("input-toggle", move |view| {
            let show_message = |text: &str| {
                vec![
                    TimedEffect::after(
                        toggle,
                        Effect::SetText {
                            id: "message".to_string(),
                            text: text.to_string(),
                        },
                    ),
                    TimedEffect::after(
                        toggle,
                        Effect::SetDisplayed {
                            id: "message".to_string(),
                            displayed: true,
                        },
                    ),
                ]
            };
            if view.is_enabled("text-input") == Some(false) {
                let mut effects = vec![
                    TimedEffect::after(
                        toggle,
                        Effect::SetEnabled {
                            id: "text-input".to_string(),
                            enabled: true,
                        },
                    ),
                    TimedEffect::after(
                        toggle,
                        Effect::SetText {
                            id: "input-toggle".to_string(),
                            text: "Disable".to_string(),
                        },
                    ),
                ];
                effects.extend(show_message(dynamic_controls::ENABLED_MESSAGE));
                effects
            } else {
                let mut effects = vec![
                    TimedEffect::after(
                        toggle,
                        Effect::SetEnabled {
                            id: "text-input".to_string(),
                            enabled: false,
                        },
                    ),
                    TimedEffect::after(
                        toggle,
                        Effect::SetText {
                            id: "input-toggle".to_string(),
                            text: "Enable".to_string(),
                        },
                    ),
                ];
                effects.extend(show_message(dynamic_controls::DISABLED_MESSAGE));
                effects
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use esperar::{By, PageDriver};

    #[test]
    fn every_suite_page_is_registered() {
        let driver = build_driver(SiteDelays::default());
        for path in [
            login::PATH,
            secure::PATH,
            dynamic_loading::HIDDEN_PATH,
            dynamic_loading::RENDERED_PATH,
            dynamic_controls::PATH,
        ] {
            assert!(driver.navigate(&url(path)).is_ok(), "missing page {path}");
        }
    }

    #[test]
    fn login_page_exposes_the_suite_locators() {
        let driver = build_driver(SiteDelays::default());
        driver.navigate(&url(login::PATH)).unwrap();
        assert!(driver.find(&login::username()).is_ok());
        assert!(driver.find(&login::password()).is_ok());
        assert!(driver.find(&login::submit()).is_ok());
        assert!(driver.find(&By::css("#flash")).is_ok());
    }

    #[test]
    fn delay_overrides_compose() {
        let delays = SiteDelays::default()
            .with_loading(Duration::from_millis(400))
            .with_toggle(Duration::from_millis(50));
        assert_eq!(delays.loading, Duration::from_millis(400));
        assert_eq!(delays.toggle, Duration::from_millis(50));
    }
}
