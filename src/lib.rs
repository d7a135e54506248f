//! # newsprint
//!
//! Client-side enhancement layer for a newspaper-styled blog theme, compiled
//! to WebAssembly. It classifies the current page, plays short enter/exit
//! transitions, injects a promo block and a "back" pin exactly once, and
//! persists a three-state color scheme toggled through a desk-lamp control.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`host`] | Capability traits, in-memory fixtures, browser adaptors |
//! | [`scheme`] | Persisted preference and effective light/dark resolution |
//! | [`classify`] | Structural list/article page predicates |
//! | [`inject`] | Marker-guarded fragment insertion |
//! | [`transition`] | Enter animation and delayed card navigation |
//! | [`lamp`] | Scheme toggle control |
//! | [`boot`] | One-shot initialization after ready |
//! | [`config`] | Selectors, names and delays, with page override |
//! | [`error`] | Host and config error types |

pub mod boot;
pub mod classify;
pub mod config;
pub mod error;
pub mod host;
pub mod inject;
pub mod lamp;
pub mod scheme;
pub mod transition;

/// WASM entry point: install logging, then boot against the live page.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // Fails only when the host page installed a logger first; report through it.
    if let Err(err) = console_log::init_with_level(log::Level::Info) {
        log::warn!("newsprint: console logger not installed: {err}");
    }

    match host::web::browser_host() {
        Some(host) => {
            boot::Bootstrapper::new(host).start();
        }
        None => log::warn!("newsprint: no browser document, nothing to enhance"),
    }
}
