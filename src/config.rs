//! Theme configuration: selectors, marker names, texts and delays.
//!
//! DESIGN
//! ======
//! Defaults reproduce the stock theme contract. A page may override any field
//! with a JSON blob in `<script type="application/json" id="np-config">`;
//! missing fields keep their defaults and a malformed blob is ignored.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use crate::error::ConfigError;

/// Selector of the optional JSON override element.
pub const CONFIG_SELECTOR: &str = "script#np-config";

/// Every name and timing the enhancement layer depends on.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Storage key shared with the surrounding theme.
    pub storage_key: String,
    /// Root attribute carrying the resolved scheme.
    pub scheme_attr: String,
    /// Root class present while the lamp is lit (dark scheme).
    pub lamp_on_class: String,

    pub article_body_class: String,
    pub list_selectors: Vec<String>,
    pub card_selectors: Vec<String>,
    /// Ancestor of a card link that receives the opening marker.
    pub card_ancestor: String,

    pub enter_class: String,
    pub enter_active_class: String,
    pub navigate_class: String,
    pub opening_class: String,

    pub lamp_mount: String,
    pub lamp_control: String,
    pub lamp_label: String,

    pub promo_container: String,
    pub promo_marker: String,
    pub promo_text: String,

    pub back_container: String,
    pub back_marker: String,
    pub back_href: String,
    pub back_label: String,
    pub back_title: String,

    pub enter_duration_ms: u32,
    pub navigate_delay_ms: u32,
    pub reload_delay_ms: u32,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: "StackColorScheme".to_owned(),
            scheme_attr: "data-scheme".to_owned(),
            lamp_on_class: "np-lamp-on".to_owned(),
            article_body_class: "article-page".to_owned(),
            list_selectors: vec![
                ".article-list--compact".to_owned(),
                ".article-list--tile".to_owned(),
                ".article-list".to_owned(),
            ],
            card_selectors: vec![
                "section.article-list--compact article > a".to_owned(),
                "section.article-list--tile article > a".to_owned(),
                "section.article-list article .article-title a".to_owned(),
            ],
            card_ancestor: "article".to_owned(),
            enter_class: "np-enter".to_owned(),
            enter_active_class: "np-enter-active".to_owned(),
            navigate_class: "np-navigate".to_owned(),
            opening_class: "np-opening".to_owned(),
            lamp_mount: "#dark-mode-toggle".to_owned(),
            lamp_control: ".np-lamp".to_owned(),
            lamp_label: "切换明暗模式".to_owned(),
            promo_container: ".article-content".to_owned(),
            promo_marker: "data-np-promo".to_owned(),
            promo_text: "关注「AI智汇观察」，了解更多行业最新资讯".to_owned(),
            back_container: "body".to_owned(),
            back_marker: "data-np-back".to_owned(),
            back_href: "/posts/".to_owned(),
            back_label: "返回".to_owned(),
            back_title: "返回桌面".to_owned(),
            enter_duration_ms: 700,
            navigate_delay_ms: 220,
            reload_delay_ms: 120,
        }
    }
}

impl ThemeConfig {
    /// Parse a JSON override. Absent fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when `raw` is not a JSON object of the
    /// expected shape.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Resolve the effective config from an optional override blob.
    pub fn resolve(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::default();
        };
        match Self::from_json(raw) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("newsprint: {err}; using defaults");
                Self::default()
            }
        }
    }
}
