//! The condition vocabulary.
//!
//! Ready-made [`Condition`] implementations for the states e2e tests wait
//! on: presence, visibility, clickability, text content, and staleness.
//! Each one re-runs its locator query on every poll; none of them cache
//! element handles between evaluations (staleness is the deliberate
//! exception: it watches one captured handle die).

use crate::locator::By;
use crate::session::{Element, Session};
use crate::wait::{Condition, ConditionOutcome};

/// Condition: an element matching the locator exists.
#[derive(Debug, Clone)]
pub struct ElementPresent {
    locator: By,
}

/// Wait for the first element matching `locator` to exist.
pub fn present(locator: By) -> ElementPresent {
    ElementPresent { locator }
}

impl Condition for ElementPresent {
    type Output = Element;

    fn check(&self, session: &Session) -> ConditionOutcome<Element> {
        ConditionOutcome::from_probe(session.find(&self.locator))
    }

    fn description(&self) -> String {
        format!("presence of {}", self.locator)
    }
}

/// Condition: an element matching the locator exists and is displayed.
#[derive(Debug, Clone)]
pub struct ElementVisible {
    locator: By,
}

/// Wait for the first element matching `locator` to be displayed.
pub fn visible(locator: By) -> ElementVisible {
    ElementVisible { locator }
}

impl Condition for ElementVisible {
    type Output = Element;

    fn check(&self, session: &Session) -> ConditionOutcome<Element> {
        match session.find(&self.locator) {
            Ok(element) => match element.is_displayed() {
                Ok(true) => ConditionOutcome::Ready(element),
                Ok(false) => ConditionOutcome::NotReady(format!(
                    "{} present but not displayed",
                    self.locator
                )),
                Err(error) if error.is_transient() => {
                    ConditionOutcome::NotReady(error.to_string())
                }
                Err(error) => ConditionOutcome::Failed(error),
            },
            Err(error) if error.is_transient() => ConditionOutcome::NotReady(error.to_string()),
            Err(error) => ConditionOutcome::Failed(error),
        }
    }

    fn description(&self) -> String {
        format!("visibility of {}", self.locator)
    }
}

/// Condition: an element is displayed and enabled at the same time.
#[derive(Debug, Clone)]
pub struct ElementClickable {
    locator: By,
}

/// Wait for the first element matching `locator` to accept a click:
/// displayed and enabled, observed in the same poll.
pub fn clickable(locator: By) -> ElementClickable {
    ElementClickable { locator }
}

impl Condition for ElementClickable {
    type Output = Element;

    fn check(&self, session: &Session) -> ConditionOutcome<Element> {
        match session.find(&self.locator) {
            Ok(element) => {
                let flags = element
                    .is_displayed()
                    .and_then(|displayed| element.is_enabled().map(|enabled| (displayed, enabled)));
                match flags {
                    Ok((true, true)) => ConditionOutcome::Ready(element),
                    Ok((displayed, enabled)) => ConditionOutcome::NotReady(format!(
                        "{} displayed={displayed} enabled={enabled}",
                        self.locator
                    )),
                    Err(error) if error.is_transient() => {
                        ConditionOutcome::NotReady(error.to_string())
                    }
                    Err(error) => ConditionOutcome::Failed(error),
                }
            }
            Err(error) if error.is_transient() => ConditionOutcome::NotReady(error.to_string()),
            Err(error) => ConditionOutcome::Failed(error),
        }
    }

    fn description(&self) -> String {
        format!("clickability of {}", self.locator)
    }
}

/// Condition: a located element's text contains a substring.
#[derive(Debug, Clone)]
pub struct TextPresent {
    locator: By,
    needle: String,
}

/// Wait until the element matching `locator` has text containing
/// `needle`. The element is re-located on every poll, so text swapped in
/// by the page (or a replaced node) is observed rather than a cached
/// handle's first reading. On success returns the full observed text.
pub fn text_present(locator: By, needle: impl Into<String>) -> TextPresent {
    TextPresent {
        locator,
        needle: needle.into(),
    }
}

impl Condition for TextPresent {
    type Output = String;

    fn check(&self, session: &Session) -> ConditionOutcome<String> {
        match session.find(&self.locator).and_then(|element| element.text()) {
            Ok(text) if text.contains(&self.needle) => ConditionOutcome::Ready(text),
            Ok(text) => ConditionOutcome::NotReady(format!("text was {text:?}")),
            Err(error) if error.is_transient() => ConditionOutcome::NotReady(error.to_string()),
            Err(error) => ConditionOutcome::Failed(error),
        }
    }

    fn description(&self) -> String {
        format!("text {:?} in {}", self.needle, self.locator)
    }
}

/// Condition: a previously-located element has gone stale.
#[derive(Debug, Clone)]
pub struct Staleness {
    element: Element,
}

/// Wait until `element` no longer refers to a live DOM node: the inverse
/// of an existence check, used to confirm removal after a delete-style
/// action. A node that stays attached never satisfies this condition.
pub fn stale(element: &Element) -> Staleness {
    Staleness {
        element: element.clone(),
    }
}

impl Condition for Staleness {
    type Output = ();

    fn check(&self, _session: &Session) -> ConditionOutcome<()> {
        match self.element.is_attached() {
            Ok(false) => ConditionOutcome::Ready(()),
            Ok(true) => {
                ConditionOutcome::NotReady(format!("{} still attached", self.element.locator()))
            }
            Err(error) => ConditionOutcome::Failed(error),
        }
    }

    fn description(&self) -> String {
        format!("staleness of {}", self.element.locator())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Effect, ElementSpec, MockDriver};
    use crate::result::EsperarError;
    use crate::wait::Wait;
    use std::time::Duration;

    fn quick_wait() -> Wait {
        Wait::new(Duration::from_millis(500)).with_poll_interval(Duration::from_millis(10))
    }

    mod presence_tests {
        use super::*;

        #[test]
        fn succeeds_immediately_for_an_existing_element() {
            let mock = MockDriver::single_page(vec![ElementSpec::new("div").with_id("banner")]);
            let session = Session::from_driver(mock);
            let element = quick_wait()
                .until(&session, present(By::id("banner")))
                .unwrap();
            assert_eq!(element.locator(), &By::id("banner"));
        }

        #[test]
        fn succeeds_once_the_element_is_attached() {
            let mock = MockDriver::single_page(vec![ElementSpec::new("div").with_id("root")]);
            let session = Session::from_driver(mock.clone());
            mock.schedule(
                Duration::from_millis(60),
                Effect::Attach(ElementSpec::new("p").with_id("late")),
            );
            assert!(quick_wait()
                .until(&session, present(By::id("late")))
                .is_ok());
        }

        #[test]
        fn times_out_when_nothing_matches() {
            let mock = MockDriver::single_page(vec![ElementSpec::new("div").with_id("root")]);
            let session = Session::from_driver(mock);
            let err = quick_wait()
                .until(&session, present(By::id("ghost")))
                .unwrap_err();
            assert!(err.is_timeout());
        }
    }

    mod visibility_tests {
        use super::*;

        #[test]
        fn hidden_element_is_not_ready_until_displayed() {
            let mock = MockDriver::single_page(vec![ElementSpec::new("input")
                .with_id("checkbox")
                .hidden()]);
            let session = Session::from_driver(mock.clone());
            mock.schedule(
                Duration::from_millis(50),
                Effect::SetDisplayed {
                    id: "checkbox".to_string(),
                    displayed: true,
                },
            );
            let element = quick_wait()
                .until(&session, visible(By::id("checkbox")))
                .unwrap();
            assert!(element.is_displayed().unwrap());
        }

        #[test]
        fn timeout_reports_present_but_not_displayed() {
            let mock =
                MockDriver::single_page(vec![ElementSpec::new("div").with_id("hint").hidden()]);
            let session = Session::from_driver(mock);
            let wait =
                Wait::new(Duration::from_millis(60)).with_poll_interval(Duration::from_millis(10));
            let err = wait.until(&session, visible(By::id("hint"))).unwrap_err();
            match err {
                EsperarError::Timeout { last_observed, .. } => {
                    assert!(last_observed.contains("not displayed"));
                }
                other => panic!("expected timeout, got {other:?}"),
            }
        }
    }

    mod clickability_tests {
        use super::*;

        #[test]
        fn requires_displayed_and_enabled_in_the_same_poll() {
            let mock = MockDriver::single_page(vec![ElementSpec::new("input")
                .with_id("field")
                .disabled()
                .hidden()]);
            let session = Session::from_driver(mock.clone());
            mock.schedule(
                Duration::from_millis(30),
                Effect::SetDisplayed {
                    id: "field".to_string(),
                    displayed: true,
                },
            );
            mock.schedule(
                Duration::from_millis(70),
                Effect::SetEnabled {
                    id: "field".to_string(),
                    enabled: true,
                },
            );

            let start = std::time::Instant::now();
            let element = quick_wait()
                .until(&session, clickable(By::id("field")))
                .unwrap();
            // Displayed alone (at 30ms) must not satisfy the condition.
            assert!(start.elapsed() >= Duration::from_millis(65));
            assert!(element.is_enabled().unwrap());
        }

        #[test]
        fn disabled_element_observation_names_both_flags() {
            let mock =
                MockDriver::single_page(vec![ElementSpec::new("input").with_id("field").disabled()]);
            let session = Session::from_driver(mock);
            let wait =
                Wait::new(Duration::from_millis(50)).with_poll_interval(Duration::from_millis(10));
            let err = wait
                .until(&session, clickable(By::id("field")))
                .unwrap_err();
            match err {
                EsperarError::Timeout { last_observed, .. } => {
                    assert!(last_observed.contains("displayed=true"));
                    assert!(last_observed.contains("enabled=false"));
                }
                other => panic!("expected timeout, got {other:?}"),
            }
        }
    }

    mod text_tests {
        use super::*;

        #[test]
        fn observes_text_swapped_in_after_the_wait_started() {
            let mock = MockDriver::single_page(vec![ElementSpec::new("div").with_id("finish")]);
            let session = Session::from_driver(mock.clone());
            mock.schedule(
                Duration::from_millis(70),
                Effect::SetText {
                    id: "finish".to_string(),
                    text: "Hello World!".to_string(),
                },
            );
            let text = quick_wait()
                .until(&session, text_present(By::id("finish"), "Hello World!"))
                .unwrap();
            assert_eq!(text, "Hello World!");
        }

        #[test]
        fn substring_match_returns_the_full_text() {
            let mock = MockDriver::single_page(vec![ElementSpec::new("div")
                .with_id("flash")
                .with_text("You logged into a secure area!\n(close)")]);
            let session = Session::from_driver(mock);
            let text = quick_wait()
                .until(
                    &session,
                    text_present(By::id("flash"), "You logged into a secure area!"),
                )
                .unwrap();
            assert!(text.contains("(close)"));
        }

        #[test]
        fn survives_the_element_being_replaced_mid_wait() {
            // The node is detached and a replacement attached with the
            // expected text; re-locating each poll must pick up the new
            // node instead of failing on the dead handle.
            let mock = MockDriver::single_page(vec![ElementSpec::new("div")
                .with_id("finish")
                .with_text("loading")]);
            let session = Session::from_driver(mock.clone());
            mock.schedule(
                Duration::from_millis(40),
                Effect::Detach {
                    id: "finish".to_string(),
                },
            );
            mock.schedule(
                Duration::from_millis(60),
                Effect::Attach(
                    ElementSpec::new("div")
                        .with_id("finish")
                        .with_text("Hello World!"),
                ),
            );
            let text = quick_wait()
                .until(&session, text_present(By::id("finish"), "Hello World!"))
                .unwrap();
            assert_eq!(text, "Hello World!");
        }
    }

    mod staleness_tests {
        use super::*;

        #[test]
        fn succeeds_once_the_watched_node_is_removed() {
            let mock = MockDriver::single_page(vec![ElementSpec::new("input")
                .with_id("checkbox")
                .with_attribute("type", "checkbox")]);
            let session = Session::from_driver(mock.clone());
            let checkbox = session.find(&By::id("checkbox")).unwrap();
            mock.schedule(
                Duration::from_millis(60),
                Effect::Detach {
                    id: "checkbox".to_string(),
                },
            );
            assert!(quick_wait().until(&session, stale(&checkbox)).is_ok());
        }

        #[test]
        fn never_succeeds_while_the_node_remains() {
            let mock = MockDriver::single_page(vec![ElementSpec::new("div").with_id("fixture")]);
            let session = Session::from_driver(mock);
            let fixture = session.find(&By::id("fixture")).unwrap();
            let wait =
                Wait::new(Duration::from_millis(80)).with_poll_interval(Duration::from_millis(10));
            let err = wait.until(&session, stale(&fixture)).unwrap_err();
            match err {
                EsperarError::Timeout { last_observed, .. } => {
                    assert!(last_observed.contains("still attached"));
                }
                other => panic!("expected timeout, got {other:?}"),
            }
        }
    }
}
