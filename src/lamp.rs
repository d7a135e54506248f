//! Desk-lamp scheme toggle.
//!
//! Replaces the theme's toggle mount with a decorative lamp control. Each
//! activation flips the effective scheme, persists and applies it, then
//! reloads the page so every other theme script starts from the new value.

#[cfg(test)]
#[path = "lamp_test.rs"]
mod lamp_test;

use std::rc::Rc;

use crate::config::ThemeConfig;
use crate::host::{Activation, ActivationHandler, Host};
use crate::inject::escape_text;
use crate::scheme::{EffectiveScheme, Scheme, SchemeStore};

#[derive(Clone)]
pub struct LampToggle {
    host: Host,
    config: Rc<ThemeConfig>,
    store: SchemeStore,
}

impl LampToggle {
    #[must_use]
    pub fn new(host: Host, config: Rc<ThemeConfig>) -> Self {
        let store = SchemeStore::new(host.clone(), Rc::clone(&config));
        Self { host, config, store }
    }

    /// Mount the control and bind activation. Returns `false` when the page
    /// has no lamp mount point.
    pub fn install(&self) -> bool {
        let lamp = self.clone();
        let handler: ActivationHandler = Rc::new(move |activation: &Activation| lamp.on_activate(activation));
        let installed = self.host.document.install_control(
            &self.config.lamp_mount,
            &self.markup(),
            &self.config.lamp_control,
            handler,
        );
        if !installed {
            log::debug!("newsprint: no lamp mount {}", self.config.lamp_mount);
            return false;
        }
        if self.store.effective() == EffectiveScheme::Dark {
            self.host.document.root_add_class(&self.config.lamp_on_class);
        }
        true
    }

    /// Flip the scheme and schedule the reload. Returns the persisted value.
    pub fn toggle(&self) -> Scheme {
        let next = self.store.effective().toggled();
        self.store.set(next);
        self.store.apply(next);
        let location = Rc::clone(&self.host.location);
        self.host
            .scheduler
            .set_timeout(self.config.reload_delay_ms, Box::new(move || location.reload()));
        next
    }

    /// Returns `true` when the event's default action must be suppressed.
    fn on_activate(&self, activation: &Activation) -> bool {
        match activation {
            Activation::Click => {
                self.toggle();
                false
            }
            Activation::Key(key) if key == "Enter" || key == " " => {
                self.toggle();
                true
            }
            Activation::Key(_) => false,
        }
    }

    fn markup(&self) -> String {
        let class = self.config.lamp_control.trim_start_matches('.');
        format!(
            "<div class=\"{class}\" role=\"button\" tabindex=\"0\" aria-label=\"{label}\">\
             <div class=\"{class}__img\" aria-hidden=\"true\"></div>\
             <div class=\"{class}__glow\" aria-hidden=\"true\"></div></div>",
            class = escape_text(class),
            label = escape_text(&self.config.lamp_label),
        )
    }
}
