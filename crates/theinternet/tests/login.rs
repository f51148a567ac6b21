//! Login and logout flows over the `/login` form.
//!
//! Hermetic tests run against the in-memory site; the `live_` tests
//! drive a real browser and are ignored unless a WebDriver server is
//! reachable.

mod common;

use std::time::Duration;

use esperar::prelude::*;
use theinternet::pages::{login, secure};
use theinternet::site::{self, SiteDelays};
use theinternet::{live_base_url, LOGIN_SUCCESS_MESSAGE, NEGATIVE_LOGINS, VALID_PASSWORD, VALID_USERNAME};

fn submit_credentials(session: &Session, username: &str, password: &str) -> EsperarResult<()> {
    session.find(&login::username())?.send_keys(username)?;
    session.find(&login::password())?.send_keys(password)?;
    session.find(&login::submit())?.click()
}

fn quick_wait() -> Wait {
    Wait::new(Duration::from_millis(500)).with_poll_interval(Duration::from_millis(20))
}

#[test]
fn valid_credentials_reach_the_secure_area() -> EsperarResult<()> {
    common::init_logging();
    let (_driver, session) = site::open(SiteDelays::default());
    session.goto(&site::url(login::PATH))?;
    session.maximize_window()?;

    submit_credentials(&session, VALID_USERNAME, VALID_PASSWORD)?;

    let flash = quick_wait().until(&session, text_present(secure::flash(), LOGIN_SUCCESS_MESSAGE))?;
    ensure_contains(&flash, LOGIN_SUCCESS_MESSAGE)?;

    let logout = session.find(&secure::logout())?;
    ensure(logout.is_displayed()?, "logout link should be visible")?;
    ensure(logout.is_enabled()?, "logout link should be enabled")?;
    Ok(())
}

#[test]
fn logout_returns_to_the_login_form() -> EsperarResult<()> {
    common::init_logging();
    let (_driver, session) = site::open(SiteDelays::default());
    session.goto(&site::url(login::PATH))?;

    submit_credentials(&session, VALID_USERNAME, VALID_PASSWORD)?;
    let logout = quick_wait().until(&session, clickable(secure::logout()))?;
    logout.click()?;

    quick_wait().until(&session, visible(login::username()))?;
    ensure_contains(&session.current_url()?, login::PATH)?;
    Ok(())
}

#[test]
fn rejected_credentials_surface_the_flash_message() -> EsperarResult<()> {
    common::init_logging();
    let (_driver, session) = site::open(SiteDelays::default());

    for case in NEGATIVE_LOGINS {
        session.goto(&site::url(login::PATH))?;
        submit_credentials(&session, case.username, case.password)?;

        let flash = quick_wait().until(&session, text_present(login::flash(), case.expected_message))?;
        ensure_contains(&flash, case.expected_message)?;
    }
    Ok(())
}

/// The driver is released even when a scenario fails mid-flow, so a
/// red test never leaks its browser.
#[test]
fn session_is_released_after_a_failed_scenario() {
    common::init_logging();
    let (driver, session) = site::open(SiteDelays::default());

    let outcome = failing_flow(&session);
    assert!(outcome.unwrap_err().is_timeout());

    drop(session);
    assert!(driver.was_quit());
    assert_eq!(driver.quit_count(), 1);
}

fn failing_flow(session: &Session) -> EsperarResult<()> {
    session.goto(&site::url(login::PATH))?;
    submit_credentials(session, VALID_USERNAME, "wrong-password")?;
    let wait = Wait::new(Duration::from_millis(80)).with_poll_interval(Duration::from_millis(20));
    wait.until(session, text_present(secure::flash(), LOGIN_SUCCESS_MESSAGE))?;
    Ok(())
}

#[test]
#[ignore = "requires a WebDriver server and network access"]
fn live_valid_credentials_reach_the_secure_area() -> EsperarResult<()> {
    common::init_logging();
    let session = common::live_session()?;
    let wait = Wait::seconds(10);

    session.goto(&format!("{}{}", live_base_url(), login::PATH))?;
    submit_credentials(&session, VALID_USERNAME, VALID_PASSWORD)?;

    let flash = wait.until(&session, text_present(secure::flash(), LOGIN_SUCCESS_MESSAGE))?;
    ensure_contains(&flash, LOGIN_SUCCESS_MESSAGE)?;

    let logout = wait.until(&session, clickable(secure::logout()))?;
    ensure(logout.is_enabled()?, "logout link should be enabled")?;
    logout.click()?;

    wait.until(&session, visible(login::username()))?;
    session.quit()
}

#[test]
#[ignore = "requires a WebDriver server and network access"]
fn live_rejected_credentials_surface_the_flash_message() -> EsperarResult<()> {
    common::init_logging();
    let session = common::live_session()?;
    let wait = Wait::seconds(10);

    for case in NEGATIVE_LOGINS {
        tracing::info!(username = case.username, "submitting rejected credentials");
        session.goto(&format!("{}{}", live_base_url(), login::PATH))?;
        submit_credentials(&session, case.username, case.password)?;

        let flash = wait.until(&session, text_present(login::flash(), case.expected_message))?;
        ensure_contains(&flash, case.expected_message)?;
    }
    session.quit()
}
