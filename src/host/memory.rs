//! In-memory host: synthetic documents, storage and a virtual clock.
//!
//! Used by the test suite and by any headless caller that wants to drive the
//! page logic without a rendering engine. Selectors are matched literally;
//! there is no CSS engine here, a fixture simply declares which selectors
//! currently resolve to an element.

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use super::{
    Activation, ActivationHandler, ClickHandler, ClickInfo, ClickVerdict, ColorPreference,
    Document, Fragment, Host, LinkElement, Location, RestoreHandler, Scheduler, Storage, Task,
};
use crate::error::HostError;

// =============================================================
// Document
// =============================================================

/// Synthetic document fixture.
pub struct MemoryDocument {
    loading: Cell<bool>,
    ready: RefCell<Vec<Task>>,
    restore: RefCell<Vec<RestoreHandler>>,
    body_classes: RefCell<BTreeSet<String>>,
    elements: RefCell<BTreeSet<String>>,
    texts: RefCell<BTreeMap<String, String>>,
    root_classes: RefCell<BTreeSet<String>>,
    root_attrs: RefCell<BTreeMap<String, String>>,
    appended: RefCell<Vec<(String, Fragment)>>,
    links: RefCell<Vec<LinkSlot>>,
    controls: RefCell<Vec<ControlSlot>>,
}

struct LinkSlot {
    selector: String,
    link: Rc<MemoryLink>,
    handlers: Vec<ClickHandler>,
}

struct ControlSlot {
    mount: String,
    markup: String,
    handlers: Vec<ActivationHandler>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// An interactive document with only a `body` element.
    #[must_use]
    pub fn new() -> Self {
        Self {
            loading: Cell::new(false),
            ready: RefCell::new(Vec::new()),
            restore: RefCell::new(Vec::new()),
            body_classes: RefCell::new(BTreeSet::new()),
            elements: RefCell::new(BTreeSet::from(["body".to_owned()])),
            texts: RefCell::new(BTreeMap::new()),
            root_classes: RefCell::new(BTreeSet::new()),
            root_attrs: RefCell::new(BTreeMap::new()),
            appended: RefCell::new(Vec::new()),
            links: RefCell::new(Vec::new()),
            controls: RefCell::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_body_class(self, class: &str) -> Self {
        self.body_classes.borrow_mut().insert(class.to_owned());
        self
    }

    #[must_use]
    pub fn with_element(self, selector: &str) -> Self {
        self.add_element(selector);
        self
    }

    #[must_use]
    pub fn with_text(self, selector: &str, text: &str) -> Self {
        self.add_element(selector);
        self.texts.borrow_mut().insert(selector.to_owned(), text.to_owned());
        self
    }

    #[must_use]
    pub fn loading(self) -> Self {
        self.loading.set(true);
        self
    }

    pub fn add_element(&self, selector: &str) {
        self.elements.borrow_mut().insert(selector.to_owned());
    }

    pub fn remove_element(&self, selector: &str) {
        self.elements.borrow_mut().remove(selector);
        self.appended.borrow_mut().retain(|(container, _)| container != selector);
    }

    pub fn set_body_class(&self, class: &str, present: bool) {
        let mut classes = self.body_classes.borrow_mut();
        if present {
            classes.insert(class.to_owned());
        } else {
            classes.remove(class);
        }
    }

    /// Finish parsing: flip to interactive and run queued ready tasks once.
    pub fn fire_ready(&self) {
        self.loading.set(false);
        let tasks = std::mem::take(&mut *self.ready.borrow_mut());
        for task in tasks {
            task();
        }
    }

    #[must_use]
    pub fn pending_ready(&self) -> usize {
        self.ready.borrow().len()
    }

    /// Show the page again from the back-forward cache. Registered handlers
    /// run on every restore.
    pub fn fire_page_restore(&self) {
        let handlers: Vec<RestoreHandler> = self.restore.borrow().clone();
        for handler in handlers {
            handler();
        }
    }

    #[must_use]
    pub fn restore_handler_count(&self) -> usize {
        self.restore.borrow().len()
    }

    /// Register a link under `selector` and return a handle to click it.
    pub fn add_link(&self, selector: &str, link: MemoryLink) -> Rc<MemoryLink> {
        let link = Rc::new(link);
        self.add_element(selector);
        self.links.borrow_mut().push(LinkSlot {
            selector: selector.to_owned(),
            link: Rc::clone(&link),
            handlers: Vec::new(),
        });
        link
    }

    /// Dispatch a click to every handler wired on `link`.
    pub fn click(&self, link: &Rc<MemoryLink>, info: ClickInfo) -> Vec<ClickVerdict> {
        let handlers: Vec<ClickHandler> = self
            .links
            .borrow()
            .iter()
            .filter(|slot| Rc::ptr_eq(&slot.link, link))
            .flat_map(|slot| slot.handlers.iter().cloned())
            .collect();
        handlers
            .iter()
            .map(|handler| handler(&info, &**link as &dyn LinkElement))
            .collect()
    }

    /// Remove `link` from the document. Handles stay valid.
    pub fn detach(&self, link: &Rc<MemoryLink>) {
        link.attached.set(false);
    }

    #[must_use]
    pub fn handler_count(&self, link: &Rc<MemoryLink>) -> usize {
        self.links
            .borrow()
            .iter()
            .filter(|slot| Rc::ptr_eq(&slot.link, link))
            .map(|slot| slot.handlers.len())
            .sum()
    }

    /// Dispatch an activation to the control installed in `mount`.
    pub fn activate(&self, mount: &str, activation: &Activation) -> Vec<bool> {
        let handlers: Vec<ActivationHandler> = self
            .controls
            .borrow()
            .iter()
            .filter(|slot| slot.mount == mount)
            .flat_map(|slot| slot.handlers.iter().cloned())
            .collect();
        handlers.iter().map(|handler| handler(activation)).collect()
    }

    #[must_use]
    pub fn control_markup(&self, mount: &str) -> Option<String> {
        self.controls
            .borrow()
            .iter()
            .rev()
            .find(|slot| slot.mount == mount)
            .map(|slot| slot.markup.clone())
    }

    /// Fragments appended to `container`, in insertion order.
    #[must_use]
    pub fn fragments_in(&self, container: &str) -> Vec<Fragment> {
        self.appended
            .borrow()
            .iter()
            .filter(|(c, _)| c == container)
            .map(|(_, f)| f.clone())
            .collect()
    }

    #[must_use]
    pub fn root_classes(&self) -> Vec<String> {
        self.root_classes.borrow().iter().cloned().collect()
    }
}

impl Document for MemoryDocument {
    fn is_loading(&self) -> bool {
        self.loading.get()
    }

    fn on_ready(&self, task: Task) {
        self.ready.borrow_mut().push(task);
    }

    fn on_page_restore(&self, handler: RestoreHandler) {
        self.restore.borrow_mut().push(handler);
    }

    fn body_has_class(&self, class: &str) -> bool {
        self.body_classes.borrow().contains(class)
    }

    fn any_matches(&self, selectors: &[String]) -> bool {
        let elements = self.elements.borrow();
        selectors.iter().any(|s| elements.contains(s))
    }

    fn has_element(&self, selector: &str) -> bool {
        self.elements.borrow().contains(selector)
    }

    fn has_marked(&self, container: &str, marker_attr: &str) -> bool {
        self.appended
            .borrow()
            .iter()
            .any(|(c, f)| c == container && f.get_attr(marker_attr) == Some("1"))
    }

    fn text_content(&self, selector: &str) -> Option<String> {
        self.texts.borrow().get(selector).cloned()
    }

    fn root_add_class(&self, class: &str) {
        self.root_classes.borrow_mut().insert(class.to_owned());
    }

    fn root_remove_class(&self, class: &str) {
        self.root_classes.borrow_mut().remove(class);
    }

    fn root_has_class(&self, class: &str) -> bool {
        self.root_classes.borrow().contains(class)
    }

    fn root_attr(&self, name: &str) -> Option<String> {
        self.root_attrs.borrow().get(name).cloned()
    }

    fn root_set_attr(&self, name: &str, value: &str) {
        self.root_attrs.borrow_mut().insert(name.to_owned(), value.to_owned());
    }

    fn root_remove_attr(&self, name: &str) {
        self.root_attrs.borrow_mut().remove(name);
    }

    fn clear_class(&self, class: &str) {
        self.root_classes.borrow_mut().remove(class);
        for slot in self.links.borrow().iter() {
            slot.link.clear_ancestor_class(class);
        }
    }

    fn append(&self, container: &str, fragment: &Fragment) -> Result<(), HostError> {
        if !self.has_element(container) {
            return Err(HostError::Dom(format!("no element matches {container}")));
        }
        self.appended
            .borrow_mut()
            .push((container.to_owned(), fragment.clone()));
        Ok(())
    }

    fn on_link_click(&self, selectors: &[String], handler: ClickHandler) -> usize {
        let mut wired = 0;
        for slot in self.links.borrow_mut().iter_mut() {
            if slot.link.attached.get() && selectors.contains(&slot.selector) {
                slot.handlers.push(Rc::clone(&handler));
                wired += 1;
            }
        }
        wired
    }

    fn install_control(
        &self,
        mount: &str,
        markup: &str,
        _control: &str,
        handler: ActivationHandler,
    ) -> bool {
        if !self.has_element(mount) {
            return false;
        }
        let mut controls = self.controls.borrow_mut();
        // Replacing the mount contents drops listeners bound to the old control.
        controls.retain(|slot| slot.mount != mount);
        controls.push(ControlSlot {
            mount: mount.to_owned(),
            markup: markup.to_owned(),
            handlers: vec![handler],
        });
        true
    }
}

/// A link fixture with a literal set of ancestor selectors.
pub struct MemoryLink {
    href: Option<String>,
    ancestors: RefCell<BTreeMap<String, BTreeSet<String>>>,
    attached: Cell<bool>,
}

impl MemoryLink {
    #[must_use]
    pub fn new(href: Option<&str>) -> Self {
        Self {
            href: href.map(str::to_owned),
            ancestors: RefCell::new(BTreeMap::new()),
            attached: Cell::new(true),
        }
    }

    /// Declare an enclosing element matching `selector`.
    #[must_use]
    pub fn inside(self, selector: &str) -> Self {
        self.ancestors
            .borrow_mut()
            .insert(selector.to_owned(), BTreeSet::new());
        self
    }

    #[must_use]
    pub fn ancestor_has_class(&self, selector: &str, class: &str) -> bool {
        self.ancestors
            .borrow()
            .get(selector)
            .is_some_and(|classes| classes.contains(class))
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }

    fn clear_ancestor_class(&self, class: &str) {
        for classes in self.ancestors.borrow_mut().values_mut() {
            classes.remove(class);
        }
    }
}

impl LinkElement for MemoryLink {
    fn href(&self) -> Option<String> {
        self.href.clone()
    }

    fn mark_ancestor(&self, selector: &str, class: &str) -> bool {
        match self.ancestors.borrow_mut().get_mut(selector) {
            Some(classes) => {
                classes.insert(class.to_owned());
                true
            }
            None => false,
        }
    }
}

// =============================================================
// Storage
// =============================================================

/// Map-backed storage that can simulate being blocked.
#[derive(Default)]
pub struct MemoryStorage {
    items: RefCell<BTreeMap<String, String>>,
    unavailable: Cell<bool>,
    read_only: Cell<bool>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_item(self, key: &str, value: &str) -> Self {
        self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
        self
    }

    /// Every call fails as if storage were disabled.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }

    /// Reads succeed, writes are rejected (quota exceeded).
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    /// Inspect a stored value regardless of simulated availability.
    #[must_use]
    pub fn item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, HostError> {
        if self.unavailable.get() {
            return Err(HostError::StorageUnavailable);
        }
        Ok(self.item(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), HostError> {
        if self.unavailable.get() {
            return Err(HostError::StorageUnavailable);
        }
        if self.read_only.get() {
            return Err(HostError::StorageWrite("quota exceeded".to_owned()));
        }
        self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

// =============================================================
// Scheduler
// =============================================================

struct PendingTimer {
    due_ms: u64,
    seq: u64,
    delay_ms: u32,
    task: Task,
}

/// Virtual clock. Timers fire only when [`ManualScheduler::advance`] moves
/// time past their due point; frames run only on [`ManualScheduler::run_frame`].
#[derive(Default)]
pub struct ManualScheduler {
    now_ms: Cell<u64>,
    seq: Cell<u64>,
    timers: RefCell<Vec<PendingTimer>>,
    frames: RefCell<Vec<Task>>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    /// Delays of timers that have not fired yet, in scheduling order.
    #[must_use]
    pub fn pending_delays(&self) -> Vec<u32> {
        self.timers.borrow().iter().map(|t| t.delay_ms).collect()
    }

    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Move the clock forward by `ms`, firing due timers in due order.
    /// Timers scheduled by a firing task run in the same call if they fall due.
    pub fn advance(&self, ms: u64) {
        let target = self.now_ms.get() + ms;
        while let Some(timer) = self.take_next_due(target) {
            self.now_ms.set(timer.due_ms);
            (timer.task)();
        }
        self.now_ms.set(target);
    }

    /// Run one animation frame: every callback queued before this call.
    /// Callbacks queued while running land in the next frame.
    pub fn run_frame(&self) -> usize {
        let tasks = std::mem::take(&mut *self.frames.borrow_mut());
        let count = tasks.len();
        for task in tasks {
            task();
        }
        count
    }

    fn take_next_due(&self, target: u64) -> Option<PendingTimer> {
        let mut timers = self.timers.borrow_mut();
        let index = timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= target)
            .min_by_key(|(_, t)| (t.due_ms, t.seq))
            .map(|(i, _)| i)?;
        Some(timers.remove(index))
    }
}

impl Scheduler for ManualScheduler {
    fn set_timeout(&self, delay_ms: u32, task: Task) {
        let seq = self.seq.get();
        self.seq.set(seq + 1);
        self.timers.borrow_mut().push(PendingTimer {
            due_ms: self.now_ms.get() + u64::from(delay_ms),
            seq,
            delay_ms,
            task,
        });
    }

    fn request_animation_frame(&self, task: Task) {
        self.frames.borrow_mut().push(task);
    }
}

// =============================================================
// Location / preference
// =============================================================

/// Records navigations instead of performing them.
#[derive(Default)]
pub struct RecordingLocation {
    assigned: RefCell<Vec<String>>,
    reloads: Cell<u32>,
}

impl RecordingLocation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn assigned(&self) -> Vec<String> {
        self.assigned.borrow().clone()
    }

    #[must_use]
    pub fn reloads(&self) -> u32 {
        self.reloads.get()
    }
}

impl Location for RecordingLocation {
    fn assign(&self, href: &str) {
        self.assigned.borrow_mut().push(href.to_owned());
    }

    fn reload(&self) {
        self.reloads.set(self.reloads.get() + 1);
    }
}

/// Ambient preference fixed by the test.
#[derive(Default)]
pub struct FixedPreference {
    dark: Cell<Option<bool>>,
}

impl FixedPreference {
    #[must_use]
    pub fn new(dark: Option<bool>) -> Self {
        Self { dark: Cell::new(dark) }
    }

    pub fn set(&self, dark: Option<bool>) {
        self.dark.set(dark);
    }
}

impl ColorPreference for FixedPreference {
    fn prefers_dark(&self) -> Option<bool> {
        self.dark.get()
    }
}

// =============================================================
// Bundle
// =============================================================

/// Concrete handles to every in-memory capability, plus the [`Host`] view.
#[derive(Default)]
pub struct MemoryHost {
    pub document: Rc<MemoryDocument>,
    pub storage: Rc<MemoryStorage>,
    pub scheduler: Rc<ManualScheduler>,
    pub location: Rc<RecordingLocation>,
    pub preference: Rc<FixedPreference>,
}

impl MemoryHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_document(mut self, document: MemoryDocument) -> Self {
        self.document = Rc::new(document);
        self
    }

    #[must_use]
    pub fn with_storage(mut self, storage: MemoryStorage) -> Self {
        self.storage = Rc::new(storage);
        self
    }

    #[must_use]
    pub fn with_preference(self, dark: Option<bool>) -> Self {
        self.preference.set(dark);
        self
    }

    #[must_use]
    pub fn host(&self) -> Host {
        Host {
            document: Rc::clone(&self.document) as Rc<dyn Document>,
            storage: Rc::clone(&self.storage) as Rc<dyn Storage>,
            scheduler: Rc::clone(&self.scheduler) as Rc<dyn Scheduler>,
            location: Rc::clone(&self.location) as Rc<dyn Location>,
            preference: Rc::clone(&self.preference) as Rc<dyn ColorPreference>,
        }
    }
}
