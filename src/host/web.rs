//! Browser host backed by `web_sys`.
//!
//! Thin adaptors only: every decision lives in the components. Listener
//! closures are leaked with `forget` because they live as long as the page.

use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    AddEventListenerOptions, Element, KeyboardEvent, MouseEvent, PageTransitionEvent, Window,
};

use super::{
    Activation, ActivationHandler, ClickHandler, ClickInfo, ColorPreference, Document, Fragment,
    Host, LinkElement, Location, Modifiers, RestoreHandler, Scheduler, Storage, Task,
    is_loading_state,
};
use crate::error::HostError;

const DARK_QUERY: &str = "(prefers-color-scheme: dark)";

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

fn dom_error(err: JsValue) -> HostError {
    HostError::Dom(describe(&err))
}

/// Build a host for the current window. `None` outside a browser document.
pub fn browser_host() -> Option<Host> {
    let window = web_sys::window()?;
    let document = window.document()?;
    Some(Host {
        document: Rc::new(WebDocument { document }),
        storage: Rc::new(WebStorage { window: window.clone() }),
        scheduler: Rc::new(WebScheduler { window: window.clone() }),
        location: Rc::new(WebLocation { window: window.clone() }),
        preference: Rc::new(WebPreference { window }),
    })
}

// =============================================================
// Document
// =============================================================

pub struct WebDocument {
    document: web_sys::Document,
}

impl WebDocument {
    fn query(&self, selector: &str) -> Option<Element> {
        match self.document.query_selector(selector) {
            Ok(found) => found,
            Err(err) => {
                log::debug!("newsprint: bad selector {selector}: {}", describe(&err));
                None
            }
        }
    }

    fn with_root(&self, op: &str, f: impl FnOnce(&Element) -> Result<(), JsValue>) {
        let Some(root) = self.document.document_element() else {
            return;
        };
        if let Err(err) = f(&root) {
            log::debug!("newsprint: root {op} failed: {}", describe(&err));
        }
    }
}

impl Document for WebDocument {
    fn is_loading(&self) -> bool {
        is_loading_state(&self.document.ready_state())
    }

    fn on_ready(&self, task: Task) {
        let options = AddEventListenerOptions::new();
        options.set_once(true);
        let callback = Closure::once_into_js(task);
        if let Err(err) = self
            .document
            .add_event_listener_with_callback_and_add_event_listener_options(
                "DOMContentLoaded",
                callback.unchecked_ref(),
                &options,
            )
        {
            log::warn!("newsprint: cannot wait for ready: {}", describe(&err));
        }
    }

    fn on_page_restore(&self, handler: RestoreHandler) {
        let Some(window) = self.document.default_view() else {
            return;
        };
        let callback = Closure::wrap(Box::new(move |event: PageTransitionEvent| {
            if event.persisted() {
                handler();
            }
        }) as Box<dyn FnMut(PageTransitionEvent)>);
        match window.add_event_listener_with_callback("pageshow", callback.as_ref().unchecked_ref()) {
            Ok(()) => callback.forget(),
            Err(err) => log::warn!("newsprint: cannot watch page restore: {}", describe(&err)),
        }
    }

    fn body_has_class(&self, class: &str) -> bool {
        self.document
            .body()
            .is_some_and(|body| body.class_list().contains(class))
    }

    fn any_matches(&self, selectors: &[String]) -> bool {
        !selectors.is_empty() && self.query(&selectors.join(", ")).is_some()
    }

    fn has_element(&self, selector: &str) -> bool {
        self.query(selector).is_some()
    }

    fn has_marked(&self, container: &str, marker_attr: &str) -> bool {
        self.query(container).is_some_and(|el| {
            matches!(el.query_selector(&format!("[{marker_attr}=\"1\"]")), Ok(Some(_)))
        })
    }

    fn text_content(&self, selector: &str) -> Option<String> {
        self.query(selector).and_then(|el| el.text_content())
    }

    fn root_add_class(&self, class: &str) {
        self.with_root("add class", |root| root.class_list().add_1(class));
    }

    fn root_remove_class(&self, class: &str) {
        self.with_root("remove class", |root| root.class_list().remove_1(class));
    }

    fn root_has_class(&self, class: &str) -> bool {
        self.document
            .document_element()
            .is_some_and(|root| root.class_list().contains(class))
    }

    fn root_attr(&self, name: &str) -> Option<String> {
        self.document.document_element()?.get_attribute(name)
    }

    fn root_set_attr(&self, name: &str, value: &str) {
        self.with_root("set attribute", |root| root.set_attribute(name, value));
    }

    fn root_remove_attr(&self, name: &str) {
        self.with_root("remove attribute", |root| root.remove_attribute(name));
    }

    fn clear_class(&self, class: &str) {
        let list = match self.document.query_selector_all(&format!(".{class}")) {
            Ok(list) => list,
            Err(err) => {
                log::debug!("newsprint: bad class {class}: {}", describe(&err));
                return;
            }
        };
        for index in 0..list.length() {
            let Some(Ok(element)) = list.item(index).map(|node| node.dyn_into::<Element>()) else {
                continue;
            };
            if let Err(err) = element.class_list().remove_1(class) {
                log::debug!("newsprint: cannot clear {class}: {}", describe(&err));
            }
        }
    }

    fn append(&self, container: &str, fragment: &Fragment) -> Result<(), HostError> {
        let parent = self
            .query(container)
            .ok_or_else(|| HostError::Dom(format!("no element matches {container}")))?;
        let element = self.document.create_element(&fragment.tag).map_err(dom_error)?;
        for (name, value) in &fragment.attributes {
            element.set_attribute(name, value).map_err(dom_error)?;
        }
        element.set_inner_html(&fragment.inner_html);
        parent.append_child(&element).map_err(dom_error)?;
        Ok(())
    }

    fn on_link_click(&self, selectors: &[String], handler: ClickHandler) -> usize {
        if selectors.is_empty() {
            return 0;
        }
        let list = match self.document.query_selector_all(&selectors.join(", ")) {
            Ok(list) => list,
            Err(err) => {
                log::debug!("newsprint: card query failed: {}", describe(&err));
                return 0;
            }
        };

        let mut wired = 0;
        for index in 0..list.length() {
            let Some(Ok(element)) = list.item(index).map(|node| node.dyn_into::<Element>()) else {
                continue;
            };
            let handler = Rc::clone(&handler);
            let link = WebLink { element: element.clone() };
            let callback = Closure::wrap(Box::new(move |event: MouseEvent| {
                let info = ClickInfo {
                    modifiers: Modifiers {
                        meta: event.meta_key(),
                        ctrl: event.ctrl_key(),
                        shift: event.shift_key(),
                        alt: event.alt_key(),
                    },
                    default_prevented: event.default_prevented(),
                };
                if handler(&info, &link as &dyn LinkElement).prevents_default() {
                    event.prevent_default();
                }
            }) as Box<dyn FnMut(MouseEvent)>);
            match element.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref()) {
                Ok(()) => {
                    callback.forget();
                    wired += 1;
                }
                Err(err) => log::debug!("newsprint: cannot wire card: {}", describe(&err)),
            }
        }
        wired
    }

    fn install_control(
        &self,
        mount: &str,
        markup: &str,
        control: &str,
        handler: ActivationHandler,
    ) -> bool {
        let Some(holder) = self.query(mount) else {
            return false;
        };
        holder.set_inner_html(markup);
        let Ok(Some(target)) = holder.query_selector(control) else {
            return false;
        };

        let click_handler = Rc::clone(&handler);
        let on_click = Closure::wrap(Box::new(move |event: MouseEvent| {
            if click_handler(&Activation::Click) {
                event.prevent_default();
            }
        }) as Box<dyn FnMut(MouseEvent)>);
        let on_key = Closure::wrap(Box::new(move |event: KeyboardEvent| {
            if handler(&Activation::Key(event.key())) {
                event.prevent_default();
            }
        }) as Box<dyn FnMut(KeyboardEvent)>);

        let bound = target
            .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
            .and_then(|()| {
                target.add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref())
            });
        on_click.forget();
        on_key.forget();
        match bound {
            Ok(()) => true,
            Err(err) => {
                log::debug!("newsprint: cannot bind lamp: {}", describe(&err));
                false
            }
        }
    }
}

struct WebLink {
    element: Element,
}

impl LinkElement for WebLink {
    fn href(&self) -> Option<String> {
        self.element.get_attribute("href")
    }

    fn mark_ancestor(&self, selector: &str, class: &str) -> bool {
        match self.element.closest(selector) {
            Ok(Some(ancestor)) => ancestor.class_list().add_1(class).is_ok(),
            _ => false,
        }
    }
}

// =============================================================
// Storage / scheduling / location / preference
// =============================================================

pub struct WebStorage {
    window: Window,
}

impl WebStorage {
    fn storage(&self) -> Result<web_sys::Storage, HostError> {
        match self.window.local_storage() {
            Ok(Some(storage)) => Ok(storage),
            _ => Err(HostError::StorageUnavailable),
        }
    }
}

impl Storage for WebStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, HostError> {
        self.storage()?
            .get_item(key)
            .map_err(|_| HostError::StorageUnavailable)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), HostError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|err| HostError::StorageWrite(describe(&err)))
    }
}

pub struct WebScheduler {
    window: Window,
}

impl Scheduler for WebScheduler {
    fn set_timeout(&self, delay_ms: u32, task: Task) {
        Timeout::new(delay_ms, task).forget();
    }

    fn request_animation_frame(&self, task: Task) {
        let callback = Closure::once_into_js(task);
        if let Err(err) = self.window.request_animation_frame(callback.unchecked_ref()) {
            log::debug!("newsprint: animation frame refused: {}", describe(&err));
        }
    }
}

pub struct WebLocation {
    window: Window,
}

impl Location for WebLocation {
    fn assign(&self, href: &str) {
        if let Err(err) = self.window.location().set_href(href) {
            log::warn!("newsprint: navigation to {href} failed: {}", describe(&err));
        }
    }

    fn reload(&self) {
        if let Err(err) = self.window.location().reload() {
            log::warn!("newsprint: reload failed: {}", describe(&err));
        }
    }
}

pub struct WebPreference {
    window: Window,
}

impl ColorPreference for WebPreference {
    fn prefers_dark(&self) -> Option<bool> {
        match self.window.match_media(DARK_QUERY) {
            Ok(Some(query)) => Some(query.matches()),
            _ => None,
        }
    }
}
