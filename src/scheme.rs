//! Persisted color-scheme preference and its resolved value.
//!
//! Reads the user's preference from storage and resolves the effective
//! light/dark state through a fallback chain: root marker, then stored
//! preference, then the environment's ambient signal, then `light`.
//!
//! TRADE-OFFS
//! ==========
//! Persistence is best-effort. Storage failures are logged and treated as "no
//! preference"; the live document still updates.

#[cfg(test)]
#[path = "scheme_test.rs"]
mod scheme_test;

use std::fmt;
use std::rc::Rc;

use crate::config::ThemeConfig;
use crate::host::Host;

/// User-selected preference. Only this value is ever persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scheme {
    #[default]
    Auto,
    Dark,
    Light,
}

impl Scheme {
    /// Parse a stored value. Anything outside the three names is `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "auto" => Some(Self::Auto),
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved appearance. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectiveScheme {
    Dark,
    Light,
}

impl EffectiveScheme {
    fn from_marker(raw: &str) -> Option<Self> {
        match Scheme::parse(raw)? {
            Scheme::Dark => Some(Self::Dark),
            Scheme::Light => Some(Self::Light),
            Scheme::Auto => None,
        }
    }

    /// The opposite appearance, as the preference to persist.
    #[must_use]
    pub fn toggled(self) -> Scheme {
        match self {
            Self::Dark => Scheme::Light,
            Self::Light => Scheme::Dark,
        }
    }
}

/// Reads and writes the persisted preference and the root scheme marker.
#[derive(Clone)]
pub struct SchemeStore {
    host: Host,
    config: Rc<ThemeConfig>,
}

impl SchemeStore {
    #[must_use]
    pub fn new(host: Host, config: Rc<ThemeConfig>) -> Self {
        Self { host, config }
    }

    /// Stored preference; `Auto` when absent, malformed, or unreadable.
    pub fn get(&self) -> Scheme {
        match self.host.storage.get_item(&self.config.storage_key) {
            Ok(Some(raw)) => Scheme::parse(&raw).unwrap_or_else(|| {
                log::debug!("newsprint: ignoring stored scheme {raw:?}");
                Scheme::Auto
            }),
            Ok(None) => Scheme::Auto,
            Err(err) => {
                log::debug!("newsprint: {err}; scheme treated as auto");
                Scheme::Auto
            }
        }
    }

    /// Persist `scheme`. Failures are dropped.
    pub fn set(&self, scheme: Scheme) {
        if let Err(err) = self
            .host
            .storage
            .set_item(&self.config.storage_key, scheme.as_str())
        {
            log::warn!("newsprint: could not persist scheme {scheme}: {err}");
        }
    }

    /// Resolve the current appearance without side effects.
    pub fn effective(&self) -> EffectiveScheme {
        if let Some(marked) = self
            .host
            .document
            .root_attr(&self.config.scheme_attr)
            .as_deref()
            .and_then(EffectiveScheme::from_marker)
        {
            return marked;
        }
        match self.get() {
            Scheme::Dark => return EffectiveScheme::Dark,
            Scheme::Light => return EffectiveScheme::Light,
            Scheme::Auto => {}
        }
        if self.host.preference.prefers_dark() == Some(true) {
            EffectiveScheme::Dark
        } else {
            EffectiveScheme::Light
        }
    }

    /// Reflect `scheme` on the document root. `Auto` clears the marker.
    pub fn apply(&self, scheme: Scheme) {
        let doc = &self.host.document;
        let attr = &self.config.scheme_attr;
        match scheme {
            Scheme::Dark => {
                doc.root_set_attr(attr, Scheme::Dark.as_str());
                doc.root_add_class(&self.config.lamp_on_class);
            }
            Scheme::Light => {
                doc.root_set_attr(attr, Scheme::Light.as_str());
                doc.root_remove_class(&self.config.lamp_on_class);
            }
            Scheme::Auto => {
                doc.root_remove_attr(attr);
                doc.root_remove_class(&self.config.lamp_on_class);
            }
        }
    }
}
