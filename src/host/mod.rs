//! Host capabilities the enhancement layer runs against.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components never touch `web_sys` directly. They receive a [`Host`] bundle of
//! small capability traits so the page logic can run against the live browser
//! ([`web`], hydrate only) or against synthetic fixtures ([`memory`]).
//!
//! All capabilities take `&self`: the browser DOM is a shared reference type
//! and everything runs on the single UI thread.

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;

pub mod memory;
#[cfg(feature = "hydrate")]
pub mod web;

use std::rc::Rc;

use crate::error::HostError;

/// Deferred work handed to the scheduler or the ready signal.
pub type Task = Box<dyn FnOnce()>;

/// Click interceptor installed on card links.
pub type ClickHandler = Rc<dyn Fn(&ClickInfo, &dyn LinkElement) -> ClickVerdict>;

/// Activation handler for an interactive control. Returns `true` when the
/// event was consumed and its default action must be suppressed.
pub type ActivationHandler = Rc<dyn Fn(&Activation) -> bool>;

/// Callback run each time the page is shown again from the back-forward cache.
pub type RestoreHandler = Rc<dyn Fn()>;

/// `true` for the `document.readyState` value reported while parsing.
#[must_use]
pub fn is_loading_state(ready_state: &str) -> bool {
    ready_state == "loading"
}

/// Modifier keys held during a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub meta: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    #[must_use]
    pub fn any(self) -> bool {
        self.meta || self.ctrl || self.shift || self.alt
    }
}

/// The parts of a click event the interceptor inspects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickInfo {
    pub modifiers: Modifiers,
    /// Another listener already called `preventDefault`.
    pub default_prevented: bool,
}

/// Why a click was left to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassReason {
    Modifier,
    AlreadyHandled,
    EmptyHref,
    InPageAnchor,
}

/// Outcome of a click on a wired link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickVerdict {
    /// Browser default behavior is left untouched.
    PassThrough(PassReason),
    /// Default prevented; navigation to `href` is scheduled.
    Intercepted { href: String },
    /// A navigation is already pending; swallow the click.
    AlreadyNavigating,
}

impl ClickVerdict {
    #[must_use]
    pub fn prevents_default(&self) -> bool {
        !matches!(self, Self::PassThrough(_))
    }
}

/// User activation of a control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    Click,
    /// Key name as reported by `KeyboardEvent.key`.
    Key(String),
}

/// A link element the click interceptor was attached to.
pub trait LinkElement {
    /// Raw `href` attribute, read at click time.
    fn href(&self) -> Option<String>;
    /// Add `class` to the closest ancestor matching `selector`.
    /// Returns `false` when there is no such ancestor.
    fn mark_ancestor(&self, selector: &str, class: &str) -> bool;
}

/// Opaque markup appended by the injector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub inner_html: String,
}

impl Fragment {
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self { tag: tag.to_owned(), ..Self::default() }
    }

    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_owned(), value.to_owned()));
        self
    }

    #[must_use]
    pub fn html(mut self, inner_html: &str) -> Self {
        self.inner_html = inner_html.to_owned();
        self
    }

    #[must_use]
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Structural queries and mutations against the live document.
pub trait Document {
    /// `true` while the document is still parsing.
    fn is_loading(&self) -> bool;
    /// Run `task` once when the document becomes interactive.
    fn on_ready(&self, task: Task);
    /// Run `handler` every time the page is restored from the back-forward
    /// cache. Script state survives such a restore; nothing re-runs.
    fn on_page_restore(&self, handler: RestoreHandler);

    fn body_has_class(&self, class: &str) -> bool;
    /// `true` if any element matches any of `selectors`.
    fn any_matches(&self, selectors: &[String]) -> bool;
    fn has_element(&self, selector: &str) -> bool;
    /// `true` if `container` holds a descendant with `marker_attr="1"`.
    fn has_marked(&self, container: &str, marker_attr: &str) -> bool;
    fn text_content(&self, selector: &str) -> Option<String>;

    fn root_add_class(&self, class: &str);
    fn root_remove_class(&self, class: &str);
    fn root_has_class(&self, class: &str) -> bool;
    fn root_attr(&self, name: &str) -> Option<String>;
    fn root_set_attr(&self, name: &str, value: &str);
    fn root_remove_attr(&self, name: &str);
    /// Remove `class` from every element carrying it, the root included.
    fn clear_class(&self, class: &str);

    /// Append `fragment` as the last child of `container`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Dom`] when the container is missing or the
    /// element cannot be built.
    fn append(&self, container: &str, fragment: &Fragment) -> Result<(), HostError>;

    /// Attach `handler` to every element matching any of `selectors`.
    /// Returns how many elements were wired.
    fn on_link_click(&self, selectors: &[String], handler: ClickHandler) -> usize;

    /// Replace the contents of `mount` with `markup`, then bind click and
    /// keydown on the `control` element inside it. Returns `false` when
    /// either element is missing.
    fn install_control(
        &self,
        mount: &str,
        markup: &str,
        control: &str,
        handler: ActivationHandler,
    ) -> bool;
}

/// Durable origin-scoped key/value storage.
pub trait Storage {
    /// # Errors
    ///
    /// Returns [`HostError::StorageUnavailable`] when storage cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, HostError>;
    /// # Errors
    ///
    /// Returns a [`HostError`] when storage is missing or refuses the write.
    fn set_item(&self, key: &str, value: &str) -> Result<(), HostError>;
}

/// Fire-and-forget deferral. Scheduled tasks are never cancelled.
pub trait Scheduler {
    fn set_timeout(&self, delay_ms: u32, task: Task);
    fn request_animation_frame(&self, task: Task);
}

/// Full-document navigation.
pub trait Location {
    fn assign(&self, href: &str);
    fn reload(&self);
}

/// Ambient light/dark preference of the operating environment.
pub trait ColorPreference {
    /// `None` when the signal is unavailable.
    fn prefers_dark(&self) -> Option<bool>;
}

/// Capability bundle passed to every component. Cloning is cheap.
#[derive(Clone)]
pub struct Host {
    pub document: Rc<dyn Document>,
    pub storage: Rc<dyn Storage>,
    pub scheduler: Rc<dyn Scheduler>,
    pub location: Rc<dyn Location>,
    pub preference: Rc<dyn ColorPreference>,
}
