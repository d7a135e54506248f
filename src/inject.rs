//! Idempotent insertion of fixed page fragments.
//!
//! Each fragment carries a marker attribute (`data-np-*="1"`). The injector
//! checks the container for that marker before appending, so repeated
//! initialization against the same live document inserts exactly once.

#[cfg(test)]
#[path = "inject_test.rs"]
mod inject_test;

use crate::config::ThemeConfig;
use crate::host::{Document, Fragment};

/// Result of an [`Injector::inject_once`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InjectOutcome {
    Inserted,
    AlreadyPresent,
    /// The container is absent on this page template.
    NoContainer,
    /// The container exists but the host refused the append.
    Failed,
}

pub struct Injector<'a> {
    document: &'a dyn Document,
}

impl<'a> Injector<'a> {
    #[must_use]
    pub fn new(document: &'a dyn Document) -> Self {
        Self { document }
    }

    /// Append the fragment built by `factory` to `container` unless one
    /// bearing `marker_attr` is already there. `factory` runs only when an
    /// insertion actually happens.
    pub fn inject_once(
        &self,
        container: &str,
        marker_attr: &str,
        factory: impl FnOnce() -> Fragment,
    ) -> InjectOutcome {
        if !self.document.has_element(container) {
            log::debug!("newsprint: {container} absent, skipping {marker_attr}");
            return InjectOutcome::NoContainer;
        }
        if self.document.has_marked(container, marker_attr) {
            return InjectOutcome::AlreadyPresent;
        }
        let mut fragment = factory();
        fragment.attributes.retain(|(name, _)| name != marker_attr);
        fragment.attributes.push((marker_attr.to_owned(), "1".to_owned()));
        match self.document.append(container, &fragment) {
            Ok(()) => InjectOutcome::Inserted,
            Err(err) => {
                log::debug!("newsprint: inject {marker_attr} failed: {err}");
                InjectOutcome::Failed
            }
        }
    }

    /// Promotional slogan at the end of the article body.
    pub fn inject_promo(&self, config: &ThemeConfig) -> InjectOutcome {
        self.inject_once(&config.promo_container, &config.promo_marker, || {
            promo_fragment(config)
        })
    }

    /// Floating "back" pin linking to the post index.
    pub fn inject_back(&self, config: &ThemeConfig) -> InjectOutcome {
        self.inject_once(&config.back_container, &config.back_marker, || {
            back_fragment(config)
        })
    }
}

#[must_use]
pub fn promo_fragment(config: &ThemeConfig) -> Fragment {
    Fragment::new("div").attr("class", "np-promo").html(&format!(
        "<div class=\"np-promo__rule\"></div><p class=\"np-promo__text\">{}</p>",
        escape_text(&config.promo_text)
    ))
}

#[must_use]
pub fn back_fragment(config: &ThemeConfig) -> Fragment {
    Fragment::new("a")
        .attr("href", &config.back_href)
        .attr("class", "np-back-pin")
        .attr("aria-label", &config.back_title)
        .attr("title", &config.back_title)
        .html(&format!(
            "<span class=\"np-back-pin__head\"></span><span class=\"np-back-pin__label\">{}</span>",
            escape_text(&config.back_label)
        ))
}

/// Escape text for use inside element content or a quoted attribute.
pub(crate) fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
