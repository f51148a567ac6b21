//! End-to-end UI suites for `the-internet.herokuapp.com`.
//!
//! The scenarios drive a browser session against the demo site's login,
//! dynamic-loading, and dynamic-controls pages, synchronizing on
//! [`esperar`] condition waits instead of fixed sleeps. They run two
//! ways:
//!
//! - hermetically, against the in-memory model in [`site`] (the default;
//!   this is what `cargo test` exercises), and
//! - against the live site, via the `#[ignore]`d `live_*` tests, which
//!   need a WebDriver server (`ESPERAR_WEBDRIVER_URL`, `ESPERAR_BROWSER`)
//!   and network access.
//!
//! This crate's library half holds what both halves share: page locators
//! ([`pages`]), the mock site build ([`site`]), credentials, and the
//! negative-login parameter table.

pub mod pages;
pub mod site;

/// Username accepted by the login form.
pub const VALID_USERNAME: &str = "tomsmith";

/// Password accepted by the login form.
pub const VALID_PASSWORD: &str = "SuperSecretPassword!";

/// Flash message shown after a successful login.
pub const LOGIN_SUCCESS_MESSAGE: &str = "You logged into a secure area!";

/// One negative-login case: credentials plus the flash message they
/// must produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegativeLogin {
    /// Username to type.
    pub username: &'static str,
    /// Password to type.
    pub password: &'static str,
    /// Substring the flash message must contain.
    pub expected_message: &'static str,
}

/// The negative-login parameter table. The site reports a bad username
/// before it looks at the password.
pub const NEGATIVE_LOGINS: &[NegativeLogin] = &[
    NegativeLogin {
        username: "incorrectUser",
        password: VALID_PASSWORD,
        expected_message: "Your username is invalid!",
    },
    NegativeLogin {
        username: VALID_USERNAME,
        password: "incorrectPassword",
        expected_message: "Your password is invalid!",
    },
    NegativeLogin {
        username: "",
        password: "",
        expected_message: "Your username is invalid!",
    },
];

/// Base URL for live runs; `THEINTERNET_BASE_URL` overrides the public
/// site (e.g. to point at a local deployment).
pub fn live_base_url() -> String {
    std::env::var("THEINTERNET_BASE_URL")
        .unwrap_or_else(|_| "https://the-internet.herokuapp.com".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_table_covers_both_rejection_messages() {
        assert!(NEGATIVE_LOGINS
            .iter()
            .any(|case| case.expected_message.contains("username is invalid")));
        assert!(NEGATIVE_LOGINS
            .iter()
            .any(|case| case.expected_message.contains("password is invalid")));
    }

    #[test]
    fn no_negative_case_uses_the_valid_pair() {
        for case in NEGATIVE_LOGINS {
            assert!(
                case.username != VALID_USERNAME || case.password != VALID_PASSWORD,
                "case {case:?} would log in successfully"
            );
        }
    }

    #[test]
    fn live_base_url_defaults_to_the_public_site() {
        // Only meaningful when the override is unset, which is the
        // normal test environment.
        if std::env::var("THEINTERNET_BASE_URL").is_err() {
            assert_eq!(live_base_url(), "https://the-internet.herokuapp.com");
        }
    }
}
