//! One-shot page initialization.
//!
//! SYSTEM CONTEXT
//! ==============
//! Runs once the document is interactive. The lamp is installed on every page;
//! list and article enhancements follow the classifier. The two page tests are
//! independent, so a page matching both gets both sets of enhancements.

#[cfg(test)]
#[path = "boot_test.rs"]
mod boot_test;

use std::rc::Rc;

use crate::classify::{PageClassifier, PageKind};
use crate::config::{CONFIG_SELECTOR, ThemeConfig};
use crate::host::Host;
use crate::inject::{InjectOutcome, Injector};
use crate::lamp::LampToggle;
use crate::transition::TransitionController;

/// Whether [`Bootstrapper::start`] ran immediately or waited for ready.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartMode {
    Immediate,
    Deferred,
}

/// What one initialization pass did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BootReport {
    /// What the classifier saw when the pass ran.
    pub kinds: Vec<PageKind>,
    pub lamp_installed: bool,
    pub wired_links: usize,
    pub entered: bool,
    pub promo: Option<InjectOutcome>,
    pub back: Option<InjectOutcome>,
}

pub struct Bootstrapper {
    host: Host,
    config: Option<Rc<ThemeConfig>>,
}

impl Bootstrapper {
    /// Config is read from the page's override element at run time.
    #[must_use]
    pub fn new(host: Host) -> Self {
        Self { host, config: None }
    }

    /// Pin the config instead of reading it from the page.
    #[must_use]
    pub fn with_config(mut self, config: ThemeConfig) -> Self {
        self.config = Some(Rc::new(config));
        self
    }

    /// Run now if the document is past loading, otherwise once on ready.
    pub fn start(self) -> StartMode {
        if self.host.document.is_loading() {
            let document = Rc::clone(&self.host.document);
            document.on_ready(Box::new(move || {
                self.run();
            }));
            StartMode::Deferred
        } else {
            self.run();
            StartMode::Immediate
        }
    }

    /// A single initialization pass.
    pub fn run(&self) -> BootReport {
        let config = self.config.clone().unwrap_or_else(|| {
            let raw = self.host.document.text_content(CONFIG_SELECTOR);
            Rc::new(ThemeConfig::resolve(raw.as_deref()))
        });
        let mut report = BootReport {
            lamp_installed: LampToggle::new(self.host.clone(), Rc::clone(&config)).install(),
            ..BootReport::default()
        };

        report.kinds = PageClassifier::new(&*self.host.document, &config).kinds();
        let transitions = TransitionController::new(self.host.clone(), Rc::clone(&config));
        if report.kinds.contains(&PageKind::List) {
            report.wired_links = transitions.wire_navigation(&config.card_selectors);
        }
        if report.kinds.contains(&PageKind::Article) {
            transitions.enter_animation();
            report.entered = true;
            let injector = Injector::new(&*self.host.document);
            report.promo = Some(injector.inject_promo(&config));
            report.back = Some(injector.inject_back(&config));
        }
        log::debug!("newsprint: boot {report:?}");
        report
    }
}
