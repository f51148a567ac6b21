//! In-memory driver for hermetic tests.
//!
//! [`MockDriver`] implements [`PageDriver`] over a model of one or more
//! pages. Pages are registered as element templates and instantiated on
//! navigation; DOM mutations are expressed as [`Effect`]s, either
//! scheduled at a duration from now ([`MockDriver::schedule`]) or
//! attached to click rules. Effects are applied lazily before every
//! driver query, so time-dependent page behavior (late-arriving text,
//! elements being enabled or removed) is reproduced without background
//! threads.
//!
//! The driver is cheaply cloneable; clones share state, which lets a test
//! keep a handle for scheduling and inspection while a
//! [`crate::Session`] owns another.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::driver::{ElementId, PageDriver};
use crate::locator::By;
use crate::result::{EsperarError, EsperarResult};

// ============================================================================
// Page templates
// ============================================================================

/// Template for one element of a mock page.
#[derive(Debug, Clone)]
pub struct ElementSpec {
    tag: String,
    dom_id: Option<String>,
    text: String,
    value: String,
    attributes: Vec<(String, String)>,
    enabled: bool,
    displayed: bool,
    selectors: Vec<String>,
}

impl ElementSpec {
    /// A visible, enabled element with the given tag name.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            dom_id: None,
            text: String::new(),
            value: String::new(),
            attributes: Vec::new(),
            enabled: true,
            displayed: true,
            selectors: Vec::new(),
        }
    }

    /// Set the DOM id (matched by `By::id` and `#id` CSS selectors).
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.dom_id = Some(id.into());
        self
    }

    /// Set the visible text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the initial input value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Add an attribute (matched by `By::name` for `name`).
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Start hidden.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Start disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Register a literal selector this element answers to. Mock matching
    /// is exact-string, so the selector here must be the same string the
    /// test's locator carries (CSS, XPath, or link text).
    #[must_use]
    pub fn matched_by(mut self, selector: impl Into<String>) -> Self {
        self.selectors.push(selector.into());
        self
    }
}

/// Read-only snapshot of the current page, handed to click rules.
///
/// Lookups return `None` for DOM ids that are absent or detached, which
/// is how rules distinguish "element gone" from any particular state.
#[derive(Debug, Clone, Default)]
pub struct PageView {
    values: HashMap<String, String>,
    texts: HashMap<String, String>,
    enabled: HashMap<String, bool>,
    displayed: HashMap<String, bool>,
}

impl PageView {
    fn capture(dom: &[LiveElement]) -> Self {
        let mut view = Self::default();
        for element in dom.iter().filter(|el| el.attached) {
            if let Some(id) = &element.dom_id {
                view.values.insert(id.clone(), element.value.clone());
                view.texts.insert(id.clone(), element.text.clone());
                view.enabled.insert(id.clone(), element.enabled);
                view.displayed.insert(id.clone(), element.displayed);
            }
        }
        view
    }

    /// Current input value of the element with this DOM id.
    #[must_use]
    pub fn value_of(&self, dom_id: &str) -> Option<&str> {
        self.values.get(dom_id).map(String::as_str)
    }

    /// Current text of the element with this DOM id.
    #[must_use]
    pub fn text_of(&self, dom_id: &str) -> Option<&str> {
        self.texts.get(dom_id).map(String::as_str)
    }

    /// Whether the element with this DOM id is enabled.
    #[must_use]
    pub fn is_enabled(&self, dom_id: &str) -> Option<bool> {
        self.enabled.get(dom_id).copied()
    }

    /// Whether the element with this DOM id is displayed.
    #[must_use]
    pub fn is_displayed(&self, dom_id: &str) -> Option<bool> {
        self.displayed.get(dom_id).copied()
    }
}

type ClickHandler = dyn Fn(&PageView) -> Vec<TimedEffect> + Send + Sync;

#[derive(Clone)]
struct ClickRule {
    target: String,
    handler: Arc<ClickHandler>,
}

impl fmt::Debug for ClickRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClickRule")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// Template for one mock page: its elements plus click behavior.
#[derive(Debug, Clone, Default)]
pub struct PageSpec {
    elements: Vec<ElementSpec>,
    click_rules: Vec<ClickRule>,
}

impl PageSpec {
    /// An empty page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A page with the given elements and no click behavior.
    #[must_use]
    pub fn with_elements(elements: Vec<ElementSpec>) -> Self {
        Self {
            elements,
            click_rules: Vec::new(),
        }
    }

    /// Add an element.
    #[must_use]
    pub fn element(mut self, spec: ElementSpec) -> Self {
        self.elements.push(spec);
        self
    }

    /// Attach click behavior to the element with `dom_id`: on click, the
    /// handler inspects the page and returns effects to schedule.
    #[must_use]
    pub fn on_click<F>(mut self, dom_id: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&PageView) -> Vec<TimedEffect> + Send + Sync + 'static,
    {
        self.click_rules.push(ClickRule {
            target: dom_id.into(),
            handler: Arc::new(handler),
        });
        self
    }
}

// ============================================================================
// Effects
// ============================================================================

/// A DOM mutation the mock page performs.
///
/// Mutations targeting a DOM id that is no longer attached are dropped
/// silently, mirroring a page whose script outlived the node.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Replace the text content of the element with this DOM id.
    SetText {
        /// Target DOM id.
        id: String,
        /// New text content.
        text: String,
    },
    /// Show or hide the element with this DOM id.
    SetDisplayed {
        /// Target DOM id.
        id: String,
        /// New visibility.
        displayed: bool,
    },
    /// Enable or disable the element with this DOM id.
    SetEnabled {
        /// Target DOM id.
        id: String,
        /// New enabled state.
        enabled: bool,
    },
    /// Remove the element with this DOM id; existing handles go stale.
    Detach {
        /// Target DOM id.
        id: String,
    },
    /// Add a new element to the current page.
    Attach(ElementSpec),
    /// Load another registered page, cancelling queued effects.
    Navigate {
        /// Destination URL.
        url: String,
    },
}

/// An [`Effect`] scheduled at a delay from its trigger.
#[derive(Debug, Clone)]
pub struct TimedEffect {
    /// Delay from the trigger (click or `schedule` call).
    pub after: Duration,
    /// The mutation to apply.
    pub effect: Effect,
}

impl TimedEffect {
    /// Apply as soon as the triggering call completes.
    #[must_use]
    pub const fn immediate(effect: Effect) -> Self {
        Self {
            after: Duration::ZERO,
            effect,
        }
    }

    /// Apply once `after` has elapsed.
    #[must_use]
    pub const fn after(after: Duration, effect: Effect) -> Self {
        Self { after, effect }
    }
}

// ============================================================================
// Live state
// ============================================================================

#[derive(Debug, Clone)]
struct LiveElement {
    handle: String,
    dom_id: Option<String>,
    tag: String,
    text: String,
    value: String,
    attributes: Vec<(String, String)>,
    enabled: bool,
    displayed: bool,
    selectors: Vec<String>,
    attached: bool,
}

#[derive(Debug)]
struct PendingEffect {
    due: Instant,
    effect: Effect,
}

#[derive(Debug, Default)]
struct MockState {
    pages: HashMap<String, PageSpec>,
    url: String,
    dom: Vec<LiveElement>,
    rules: Vec<ClickRule>,
    pending: Vec<PendingEffect>,
    history: Vec<String>,
    quit_count: usize,
    closed: bool,
    next_handle: u64,
}

fn instantiate(next_handle: &mut u64, spec: ElementSpec) -> LiveElement {
    *next_handle += 1;
    LiveElement {
        handle: format!("mock-element-{}", *next_handle),
        dom_id: spec.dom_id,
        tag: spec.tag,
        text: spec.text,
        value: spec.value,
        attributes: spec.attributes,
        enabled: spec.enabled,
        displayed: spec.displayed,
        selectors: spec.selectors,
        attached: true,
    }
}

fn load_spec(state: &mut MockState, url: &str, page: PageSpec) {
    let PageSpec {
        elements,
        click_rules,
    } = page;
    state.pending.clear();
    state.dom.clear();
    state.url = url.to_string();
    state.rules = click_rules;
    for spec in elements {
        let element = instantiate(&mut state.next_handle, spec);
        state.dom.push(element);
    }
}

fn load_page(state: &mut MockState, url: &str) -> EsperarResult<()> {
    let page = state
        .pages
        .get(url)
        .cloned()
        .ok_or_else(|| EsperarError::protocol(format!("no mock page registered for {url}")))?;
    load_spec(state, url, page);
    Ok(())
}

fn apply_effect(state: &mut MockState, effect: Effect) {
    match effect {
        Effect::SetText { id, text } => {
            if let Some(element) = attached_by_dom_id(state, &id) {
                element.text = text;
            }
        }
        Effect::SetDisplayed { id, displayed } => {
            if let Some(element) = attached_by_dom_id(state, &id) {
                element.displayed = displayed;
            }
        }
        Effect::SetEnabled { id, enabled } => {
            if let Some(element) = attached_by_dom_id(state, &id) {
                element.enabled = enabled;
            }
        }
        Effect::Detach { id } => {
            if let Some(element) = attached_by_dom_id(state, &id) {
                element.attached = false;
            }
        }
        Effect::Attach(spec) => {
            let element = instantiate(&mut state.next_handle, spec);
            state.dom.push(element);
        }
        // Handled by the caller: navigation cancels queued effects.
        Effect::Navigate { .. } => {}
    }
}

fn attached_by_dom_id<'a>(state: &'a mut MockState, id: &str) -> Option<&'a mut LiveElement> {
    state
        .dom
        .iter_mut()
        .find(|el| el.attached && el.dom_id.as_deref() == Some(id))
}

fn apply_due_effects(state: &mut MockState) -> EsperarResult<()> {
    if state.pending.is_empty() {
        return Ok(());
    }
    let now = Instant::now();
    let mut due = Vec::new();
    let mut later = Vec::new();
    for pending in state.pending.drain(..) {
        if pending.due <= now {
            due.push(pending);
        } else {
            later.push(pending);
        }
    }
    state.pending = later;
    due.sort_by_key(|pending| pending.due);
    for pending in due {
        match pending.effect {
            Effect::Navigate { url } => {
                // Navigation cancels everything still queued behind it.
                load_page(state, &url)?;
                return Ok(());
            }
            effect => apply_effect(state, effect),
        }
    }
    Ok(())
}

fn live_element<'a>(
    dom: &'a mut [LiveElement],
    id: &ElementId,
) -> EsperarResult<&'a mut LiveElement> {
    dom.iter_mut()
        .find(|el| el.handle == id.as_str())
        .filter(|el| el.attached)
        .ok_or_else(|| EsperarError::StaleElement {
            message: format!("element {id} is not attached to the page"),
        })
}

fn matches(element: &LiveElement, locator: &By) -> bool {
    match locator {
        By::Id(id) => element.dom_id.as_deref() == Some(id.as_str()),
        By::Tag(tag) => element.tag == *tag,
        By::Name(name) => element
            .attributes
            .iter()
            .any(|(key, value)| key == "name" && value == name),
        By::Css(css) => {
            element.selectors.iter().any(|s| s == css)
                || css
                    .strip_prefix('#')
                    .is_some_and(|id| element.dom_id.as_deref() == Some(id))
        }
        By::XPath(xpath) => element.selectors.iter().any(|s| s == xpath),
        By::LinkText(text) => {
            element.selectors.iter().any(|s| s == text)
                || (element.tag == "a" && element.text == *text)
        }
    }
}

fn ensure_running(state: &MockState) -> EsperarResult<()> {
    if state.closed {
        Err(EsperarError::SessionClosed)
    } else {
        Ok(())
    }
}

// ============================================================================
// Driver
// ============================================================================

/// In-memory [`PageDriver`] implementation.
#[derive(Clone, Default)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

impl fmt::Debug for MockDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("MockDriver")
            .field("url", &state.url)
            .field("closed", &state.closed)
            .finish_non_exhaustive()
    }
}

/// Builder registering pages before the driver starts serving queries.
#[derive(Debug, Default)]
pub struct MockDriverBuilder {
    pages: HashMap<String, PageSpec>,
}

impl MockDriverBuilder {
    /// Register a page template under a URL.
    #[must_use]
    pub fn page(mut self, url: impl Into<String>, spec: PageSpec) -> Self {
        self.pages.insert(url.into(), spec);
        self
    }

    /// Finish the driver. No page is loaded until the first navigation.
    #[must_use]
    pub fn build(self) -> MockDriver {
        MockDriver {
            state: Arc::new(Mutex::new(MockState {
                pages: self.pages,
                ..MockState::default()
            })),
        }
    }
}

impl MockDriver {
    /// URL used by [`MockDriver::single_page`].
    pub const SINGLE_PAGE_URL: &'static str = "mock://page";

    /// Start building a multi-page driver.
    #[must_use]
    pub fn builder() -> MockDriverBuilder {
        MockDriverBuilder::default()
    }

    /// A driver serving one pre-loaded page, for condition and session
    /// tests that do not care about navigation.
    #[must_use]
    pub fn single_page(elements: Vec<ElementSpec>) -> Self {
        let driver = Self::builder()
            .page(Self::SINGLE_PAGE_URL, PageSpec::with_elements(elements))
            .build();
        {
            let mut state = driver.state();
            if let Some(page) = state.pages.get(Self::SINGLE_PAGE_URL).cloned() {
                load_spec(&mut state, Self::SINGLE_PAGE_URL, page);
            }
        }
        driver
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Schedule an effect `after` a delay from now, independent of any
    /// click. This is how tests stage time-dependent page behavior.
    pub fn schedule(&self, after: Duration, effect: Effect) {
        let mut state = self.state();
        state.pending.push(PendingEffect {
            due: Instant::now() + after,
            effect,
        });
    }

    /// The calls recorded so far (navigations, clicks, maximize, quit).
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().history.clone()
    }

    /// Whether `quit` was ever called.
    #[must_use]
    pub fn was_quit(&self) -> bool {
        self.state().quit_count > 0
    }

    /// How many times `quit` was called.
    #[must_use]
    pub fn quit_count(&self) -> usize {
        self.state().quit_count
    }
}

impl PageDriver for MockDriver {
    fn navigate(&self, url: &str) -> EsperarResult<()> {
        let mut state = self.state();
        ensure_running(&state)?;
        state.history.push(format!("navigate {url}"));
        load_page(&mut state, url)
    }

    fn current_url(&self) -> EsperarResult<String> {
        let mut state = self.state();
        ensure_running(&state)?;
        apply_due_effects(&mut state)?;
        Ok(state.url.clone())
    }

    fn find(&self, locator: &By) -> EsperarResult<ElementId> {
        let mut state = self.state();
        ensure_running(&state)?;
        apply_due_effects(&mut state)?;
        state
            .dom
            .iter()
            .find(|el| el.attached && matches(el, locator))
            .map(|el| ElementId::new(el.handle.clone()))
            .ok_or_else(|| EsperarError::NoSuchElement {
                locator: locator.to_string(),
            })
    }

    fn find_all(&self, locator: &By) -> EsperarResult<Vec<ElementId>> {
        let mut state = self.state();
        ensure_running(&state)?;
        apply_due_effects(&mut state)?;
        Ok(state
            .dom
            .iter()
            .filter(|el| el.attached && matches(el, locator))
            .map(|el| ElementId::new(el.handle.clone()))
            .collect())
    }

    fn click(&self, element: &ElementId) -> EsperarResult<()> {
        let mut state = self.state();
        ensure_running(&state)?;
        apply_due_effects(&mut state)?;
        let el = live_element(&mut state.dom, element)?;
        if !el.displayed || !el.enabled {
            return Err(EsperarError::NotInteractable {
                message: format!("element {element} is not clickable"),
            });
        }
        let target = el.dom_id.clone();
        state
            .history
            .push(format!("click {}", target.as_deref().unwrap_or("<anonymous>")));
        let rule = target
            .as_ref()
            .and_then(|id| state.rules.iter().find(|rule| rule.target == *id).cloned());
        if let Some(rule) = rule {
            let view = PageView::capture(&state.dom);
            let now = Instant::now();
            for timed in (rule.handler)(&view) {
                state.pending.push(PendingEffect {
                    due: now + timed.after,
                    effect: timed.effect,
                });
            }
            // Immediate effects (form submits, navigations) land before
            // the click returns.
            apply_due_effects(&mut state)?;
        }
        Ok(())
    }

    fn send_keys(&self, element: &ElementId, text: &str) -> EsperarResult<()> {
        let mut state = self.state();
        ensure_running(&state)?;
        apply_due_effects(&mut state)?;
        let el = live_element(&mut state.dom, element)?;
        if !el.displayed || !el.enabled {
            return Err(EsperarError::NotInteractable {
                message: format!("element {element} does not accept keys"),
            });
        }
        el.value.push_str(text);
        Ok(())
    }

    fn clear(&self, element: &ElementId) -> EsperarResult<()> {
        let mut state = self.state();
        ensure_running(&state)?;
        apply_due_effects(&mut state)?;
        let el = live_element(&mut state.dom, element)?;
        el.value.clear();
        Ok(())
    }

    fn text(&self, element: &ElementId) -> EsperarResult<String> {
        let mut state = self.state();
        ensure_running(&state)?;
        apply_due_effects(&mut state)?;
        let el = live_element(&mut state.dom, element)?;
        Ok(el.text.clone())
    }

    fn attribute(&self, element: &ElementId, name: &str) -> EsperarResult<Option<String>> {
        let mut state = self.state();
        ensure_running(&state)?;
        apply_due_effects(&mut state)?;
        let el = live_element(&mut state.dom, element)?;
        if name == "value" {
            return Ok(Some(el.value.clone()));
        }
        if name == "id" {
            return Ok(el.dom_id.clone());
        }
        Ok(el
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone()))
    }

    fn is_enabled(&self, element: &ElementId) -> EsperarResult<bool> {
        let mut state = self.state();
        ensure_running(&state)?;
        apply_due_effects(&mut state)?;
        let el = live_element(&mut state.dom, element)?;
        Ok(el.enabled)
    }

    fn is_displayed(&self, element: &ElementId) -> EsperarResult<bool> {
        let mut state = self.state();
        ensure_running(&state)?;
        apply_due_effects(&mut state)?;
        let el = live_element(&mut state.dom, element)?;
        Ok(el.displayed)
    }

    fn maximize_window(&self) -> EsperarResult<()> {
        let mut state = self.state();
        ensure_running(&state)?;
        state.history.push("maximize_window".to_string());
        Ok(())
    }

    fn quit(&self) -> EsperarResult<()> {
        let mut state = self.state();
        if state.closed {
            return Err(EsperarError::SessionClosed);
        }
        state.closed = true;
        state.quit_count += 1;
        state.history.push("quit".to_string());
        Ok(())
    }
}
