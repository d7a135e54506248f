//! Enter and exit page transitions.
//!
//! DESIGN
//! ======
//! Transitions are plain root-class mutations driven by fixed timers; CSS owns
//! the visuals. Timers are never tied to `transitionend`, so navigation still
//! happens in environments where transition events never fire.
//!
//! The enter sequence needs two nested animation frames before the active
//! class goes on: adding it in the same frame as the start class would
//! collapse both states into one paint.
//!
//! A page left through a card click can come back from the back-forward cache
//! with its script state intact. Wiring navigation also hooks that restore so
//! the page drops its exit markers and accepts clicks again.

#[cfg(test)]
#[path = "transition_test.rs"]
mod transition_test;

use std::cell::Cell;
use std::rc::Rc;

use crate::config::ThemeConfig;
use crate::host::{ClickHandler, ClickInfo, ClickVerdict, Host, LinkElement, PassReason};

/// Per-page navigation intent. Returns to `Idle` only when the page is
/// restored from the back-forward cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransitionState {
    #[default]
    Idle,
    Navigating,
}

/// Phase of the enter animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnterPhase {
    #[default]
    Idle,
    Entering,
    Active,
    Done,
}

/// Drives the enter animation and the delayed card navigation.
#[derive(Clone)]
pub struct TransitionController {
    host: Host,
    config: Rc<ThemeConfig>,
    state: Rc<Cell<TransitionState>>,
    enter: Rc<Cell<EnterPhase>>,
    restore_hooked: Rc<Cell<bool>>,
}

impl TransitionController {
    #[must_use]
    pub fn new(host: Host, config: Rc<ThemeConfig>) -> Self {
        Self {
            host,
            config,
            state: Rc::new(Cell::new(TransitionState::Idle)),
            enter: Rc::new(Cell::new(EnterPhase::Idle)),
            restore_hooked: Rc::new(Cell::new(false)),
        }
    }

    pub fn state(&self) -> TransitionState {
        self.state.get()
    }

    pub fn enter_phase(&self) -> EnterPhase {
        self.enter.get()
    }

    /// Run the enter animation. A call while one is in flight is ignored.
    pub fn enter_animation(&self) {
        if matches!(self.enter.get(), EnterPhase::Entering | EnterPhase::Active) {
            return;
        }
        let doc = &self.host.document;
        doc.root_add_class(&self.config.enter_class);
        self.enter.set(EnterPhase::Entering);

        let scheduler = Rc::clone(&self.host.scheduler);
        let document = Rc::clone(&self.host.document);
        let phase = Rc::clone(&self.enter);
        let active_class = self.config.enter_active_class.clone();
        self.host.scheduler.request_animation_frame(Box::new(move || {
            scheduler.request_animation_frame(Box::new(move || {
                // Frames can be throttled past the cleanup timer; never
                // re-add a marker after cleanup ran.
                if phase.get() == EnterPhase::Entering {
                    document.root_add_class(&active_class);
                    phase.set(EnterPhase::Active);
                }
            }));
        }));

        let document = Rc::clone(&self.host.document);
        let phase = Rc::clone(&self.enter);
        let enter_class = self.config.enter_class.clone();
        let active_class = self.config.enter_active_class.clone();
        self.host.scheduler.set_timeout(
            self.config.enter_duration_ms,
            Box::new(move || {
                document.root_remove_class(&enter_class);
                document.root_remove_class(&active_class);
                phase.set(EnterPhase::Done);
            }),
        );
    }

    /// Intercept clicks on every link matching `selectors`.
    /// Returns how many links were wired.
    pub fn wire_navigation(&self, selectors: &[String]) -> usize {
        let controller = self.clone();
        let handler: ClickHandler = Rc::new(move |info: &ClickInfo, link: &dyn LinkElement| {
            controller.handle_click(info, link)
        });
        let wired = self.host.document.on_link_click(selectors, handler);
        log::debug!("newsprint: wired {wired} card links");
        if !self.restore_hooked.replace(true) {
            let controller = self.clone();
            self.host
                .document
                .on_page_restore(Rc::new(move || controller.reset_after_restore()));
        }
        wired
    }

    /// Undo the exit markers and accept clicks again. A navigation timer that
    /// already fired is not replayed.
    pub fn reset_after_restore(&self) {
        if self.state.replace(TransitionState::Idle) == TransitionState::Navigating {
            log::debug!("newsprint: page restored, navigation reset");
        }
        let doc = &self.host.document;
        doc.root_remove_class(&self.config.navigate_class);
        doc.clear_class(&self.config.opening_class);
    }

    /// Decide what to do with a click on a wired link and, when intercepting,
    /// mark the page and schedule the navigation.
    pub fn handle_click(&self, info: &ClickInfo, link: &dyn LinkElement) -> ClickVerdict {
        let verdict = self.classify_click(info, link);
        if let ClickVerdict::Intercepted { href } = &verdict {
            link.mark_ancestor(&self.config.card_ancestor, &self.config.opening_class);
            self.host.document.root_add_class(&self.config.navigate_class);
            self.state.set(TransitionState::Navigating);

            let location = Rc::clone(&self.host.location);
            let href = href.clone();
            self.host.scheduler.set_timeout(
                self.config.navigate_delay_ms,
                Box::new(move || location.assign(&href)),
            );
        } else {
            log::debug!("newsprint: click not intercepted: {verdict:?}");
        }
        verdict
    }

    fn classify_click(&self, info: &ClickInfo, link: &dyn LinkElement) -> ClickVerdict {
        if info.modifiers.any() {
            return ClickVerdict::PassThrough(PassReason::Modifier);
        }
        if info.default_prevented {
            return ClickVerdict::PassThrough(PassReason::AlreadyHandled);
        }
        // Captured by value: the element may be gone when the timer fires.
        let Some(href) = link.href().filter(|h| !h.is_empty()) else {
            return ClickVerdict::PassThrough(PassReason::EmptyHref);
        };
        if href.starts_with('#') {
            return ClickVerdict::PassThrough(PassReason::InPageAnchor);
        }
        if self.state.get() == TransitionState::Navigating {
            return ClickVerdict::AlreadyNavigating;
        }
        ClickVerdict::Intercepted { href }
    }
}
