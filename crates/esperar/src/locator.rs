//! Element locators.
//!
//! A [`By`] is an immutable strategy + selector pair. It has no lifecycle of
//! its own: sessions and conditions re-run the query against the live page
//! every time they need elements, which is what lets text waits observe DOM
//! changes instead of caching a handle.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A strategy + selector pair identifying zero-or-more page elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum By {
    /// Match by the `id` attribute.
    Id(String),
    /// Match by CSS selector.
    Css(String),
    /// Match by XPath expression.
    XPath(String),
    /// Match by tag name.
    Tag(String),
    /// Match by the `name` attribute.
    Name(String),
    /// Match anchors by their exact link text.
    LinkText(String),
}

impl By {
    /// Locate by the `id` attribute.
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Locate by CSS selector.
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Locate by XPath expression.
    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::XPath(expression.into())
    }

    /// Locate by tag name.
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::Tag(tag.into())
    }

    /// Locate by the `name` attribute.
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Locate anchors by exact link text.
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::LinkText(text.into())
    }

    /// The W3C WebDriver location strategy for this locator.
    ///
    /// `Id` and `Name` have no dedicated strategy on the wire; they travel
    /// as CSS attribute selectors (see [`By::expression`]).
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::Id(_) | Self::Css(_) | Self::Name(_) => "css selector",
            Self::XPath(_) => "xpath",
            Self::Tag(_) => "tag name",
            Self::LinkText(_) => "link text",
        }
    }

    /// The selector value sent on the wire for this locator.
    #[must_use]
    pub fn expression(&self) -> String {
        match self {
            Self::Id(id) => format!("[id=\"{id}\"]"),
            Self::Name(name) => format!("[name=\"{name}\"]"),
            Self::Css(css) => css.clone(),
            Self::XPath(xpath) => xpath.clone(),
            Self::Tag(tag) => tag.clone(),
            Self::LinkText(text) => text.clone(),
        }
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {id:?}"),
            Self::Css(css) => write!(f, "css {css:?}"),
            Self::XPath(xpath) => write!(f, "xpath {xpath:?}"),
            Self::Tag(tag) => write!(f, "tag {tag:?}"),
            Self::Name(name) => write!(f, "name {name:?}"),
            Self::LinkText(text) => write!(f, "link text {text:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod wire_mapping_tests {
        use super::*;

        #[test]
        fn id_travels_as_css_attribute_selector() {
            let by = By::id("username");
            assert_eq!(by.strategy(), "css selector");
            assert_eq!(by.expression(), "[id=\"username\"]");
        }

        #[test]
        fn name_travels_as_css_attribute_selector() {
            let by = By::name("password");
            assert_eq!(by.strategy(), "css selector");
            assert_eq!(by.expression(), "[name=\"password\"]");
        }

        #[test]
        fn dedicated_strategies_pass_selectors_through() {
            assert_eq!(By::css("#flash").strategy(), "css selector");
            assert_eq!(By::css("#flash").expression(), "#flash");
            assert_eq!(By::xpath("//div[@id='start']/button").strategy(), "xpath");
            assert_eq!(
                By::xpath("//div[@id='start']/button").expression(),
                "//div[@id='start']/button"
            );
            assert_eq!(By::tag("button").strategy(), "tag name");
            assert_eq!(By::tag("button").expression(), "button");
            assert_eq!(By::link_text("Logout").strategy(), "link text");
            assert_eq!(By::link_text("Logout").expression(), "Logout");
        }
    }

    mod display_tests {
        use super::*;

        #[test]
        fn display_names_strategy_and_selector() {
            assert_eq!(By::id("finish").to_string(), "id \"finish\"");
            assert_eq!(By::css("#flash").to_string(), "css \"#flash\"");
            assert_eq!(By::tag("button").to_string(), "tag \"button\"");
        }
    }

    proptest! {
        #[test]
        fn every_locator_maps_to_a_wire_pair(selector in "[a-zA-Z][a-zA-Z0-9_-]{0,20}") {
            let all = [
                By::id(selector.clone()),
                By::css(selector.clone()),
                By::xpath(selector.clone()),
                By::tag(selector.clone()),
                By::name(selector.clone()),
                By::link_text(selector.clone()),
            ];
            for by in all {
                prop_assert!(!by.strategy().is_empty());
                prop_assert!(by.expression().contains(&selector));
            }
        }

        #[test]
        fn locators_survive_serde_round_trips(selector in "[a-zA-Z][a-zA-Z0-9_-]{0,20}") {
            let by = By::css(selector);
            let encoded = serde_json::to_string(&by).unwrap();
            let decoded: By = serde_json::from_str(&encoded).unwrap();
            prop_assert_eq!(by, decoded);
        }
    }
}
