//! Locators and paths for the pages the suites touch.
//!
//! Locators are recomputed fresh from these functions on every query.
//! Where the site offers several ways to reach an element, these pick
//! selectors that are stable across the element's state changes (the
//! dynamic-controls toggle buttons change label between Remove/Add and
//! Enable/Disable, so they are located by their form, not their text).

use esperar::By;

/// `/login`: the form guarding the secure area.
pub mod login {
    use super::By;

    /// Path under the site base URL.
    pub const PATH: &str = "/login";

    /// Username field.
    pub fn username() -> By {
        By::id("username")
    }

    /// Password field.
    pub fn password() -> By {
        By::id("password")
    }

    /// Submit button (the only button on the page).
    pub fn submit() -> By {
        By::tag("button")
    }

    /// Flash message strip shown after a rejected login.
    pub fn flash() -> By {
        By::css("#flash")
    }
}

/// `/secure`: the page behind a successful login.
pub mod secure {
    use super::By;

    /// Path under the site base URL.
    pub const PATH: &str = "/secure";

    /// Flash message strip carrying the success text.
    pub fn flash() -> By {
        By::css("#flash")
    }

    /// Logout button.
    pub fn logout() -> By {
        By::css("a.button.secondary.radius")
    }
}

/// `/dynamic_loading/*`: content that arrives after a delay.
pub mod dynamic_loading {
    use super::By;

    /// Variant 1: the finish element exists from the start, hidden.
    pub const HIDDEN_PATH: &str = "/dynamic_loading/1";

    /// Variant 2: the finish element is rendered only after loading.
    pub const RENDERED_PATH: &str = "/dynamic_loading/2";

    /// Text the finish element ends up with.
    pub const FINISH_TEXT: &str = "Hello World!";

    /// The Start button kicking off the loading delay.
    pub fn start() -> By {
        By::xpath("//div[@id='start']/button")
    }

    /// The element the loaded content lands in.
    pub fn finish() -> By {
        By::id("finish")
    }
}

/// `/dynamic_controls`: elements that get removed, re-added, enabled,
/// and disabled.
pub mod dynamic_controls {
    use super::By;

    /// Path under the site base URL.
    pub const PATH: &str = "/dynamic_controls";

    /// Message shown once the checkbox has been removed.
    pub const GONE_MESSAGE: &str = "It's gone!";

    /// Message shown once the checkbox has been re-added.
    pub const BACK_MESSAGE: &str = "It's back!";

    /// Message shown once the text field has been enabled.
    pub const ENABLED_MESSAGE: &str = "It's enabled!";

    /// Message shown once the text field has been disabled.
    pub const DISABLED_MESSAGE: &str = "It's disabled!";

    /// The checkbox that Remove detaches from the DOM.
    pub fn checkbox() -> By {
        By::id("checkbox")
    }

    /// The Remove/Add toggle button, located by its form (its label
    /// changes with every click).
    pub fn checkbox_toggle() -> By {
        By::css("#checkbox-example button")
    }

    /// The text field that Enable/Disable toggles.
    pub fn input_field() -> By {
        By::css("#input-example input")
    }

    /// The Enable/Disable toggle button.
    pub fn input_toggle() -> By {
        By::css("#input-example button")
    }

    /// Status message paragraph updated by every toggle.
    pub fn message() -> By {
        By::id("message")
    }
}
