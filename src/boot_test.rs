use super::*;
use crate::host::memory::{MemoryDocument, MemoryHost, MemoryLink};
use crate::host::{ClickInfo, ClickVerdict, Document};

const CARD: &str = "section.article-list article > a";

fn article_page() -> MemoryDocument {
    MemoryDocument::new()
        .with_body_class("article-page")
        .with_element(".article-content")
        .with_element("#dark-mode-toggle")
}

// =============================================================
// Readiness
// =============================================================

#[test]
fn interactive_document_runs_synchronously() {
    let mem = MemoryHost::new().with_document(article_page());
    assert_eq!(Bootstrapper::new(mem.host()).start(), StartMode::Immediate);
    assert!(mem.document.root_has_class("np-enter"));
    assert_eq!(mem.document.pending_ready(), 0);
}

#[test]
fn loading_document_waits_for_ready_once() {
    let mem = MemoryHost::new().with_document(article_page().loading());
    assert_eq!(Bootstrapper::new(mem.host()).start(), StartMode::Deferred);
    assert!(!mem.document.root_has_class("np-enter"));
    assert_eq!(mem.document.pending_ready(), 1);

    mem.document.fire_ready();
    assert!(mem.document.root_has_class("np-enter"));
    assert_eq!(mem.document.fragments_in(".article-content").len(), 1);

    mem.document.fire_ready();
    assert_eq!(mem.document.pending_ready(), 0);
    assert_eq!(mem.scheduler.pending_delays(), vec![700]);
}

// =============================================================
// Page kinds
// =============================================================

#[test]
fn article_page_gets_animation_and_fragments() {
    let mem = MemoryHost::new().with_document(article_page());
    let report = Bootstrapper::new(mem.host()).run();
    assert_eq!(report.kinds, vec![PageKind::Article]);
    assert!(report.lamp_installed);
    assert!(report.entered);
    assert_eq!(report.promo, Some(InjectOutcome::Inserted));
    assert_eq!(report.back, Some(InjectOutcome::Inserted));
    assert_eq!(report.wired_links, 0);
    assert_eq!(mem.document.fragments_in("body").len(), 1);
}

#[test]
fn rerun_on_same_document_does_not_duplicate_fragments() {
    let mem = MemoryHost::new().with_document(article_page());
    let boot = Bootstrapper::new(mem.host());
    boot.run();
    let report = boot.run();
    assert_eq!(report.promo, Some(InjectOutcome::AlreadyPresent));
    assert_eq!(report.back, Some(InjectOutcome::AlreadyPresent));
    assert_eq!(mem.document.fragments_in(".article-content").len(), 1);
    assert_eq!(mem.document.fragments_in("body").len(), 1);
}

#[test]
fn list_page_wires_cards_only() {
    let doc = MemoryDocument::new().with_element(".article-list");
    let link = doc.add_link(CARD, MemoryLink::new(Some("/p/1/")).inside("article"));
    let mem = MemoryHost::new().with_document(doc);
    let config = ThemeConfig {
        card_selectors: vec![CARD.to_owned()],
        ..ThemeConfig::default()
    };

    let report = Bootstrapper::new(mem.host()).with_config(config).run();
    assert_eq!(report.kinds, vec![PageKind::List]);
    assert_eq!(report.wired_links, 1);
    assert!(!report.entered);
    assert_eq!(report.promo, None);
    assert!(!report.lamp_installed);

    let verdicts = mem.document.click(&link, ClickInfo::default());
    assert_eq!(verdicts, vec![ClickVerdict::Intercepted { href: "/p/1/".to_owned() }]);
    mem.scheduler.advance(220);
    assert_eq!(mem.location.assigned(), vec!["/p/1/".to_owned()]);
}

#[test]
fn page_matching_both_gets_both() {
    let doc = article_page().with_element(".article-list");
    doc.add_link(".article-list article .article-title a", MemoryLink::new(Some("/p/2/")));
    let mem = MemoryHost::new().with_document(doc);
    let config = ThemeConfig {
        card_selectors: vec![".article-list article .article-title a".to_owned()],
        ..ThemeConfig::default()
    };
    let report = Bootstrapper::new(mem.host()).with_config(config).run();
    assert_eq!(report.kinds, vec![PageKind::List, PageKind::Article]);
    assert_eq!(report.wired_links, 1);
    assert!(report.entered);
}

#[test]
fn other_page_only_gets_lamp() {
    let mem = MemoryHost::new()
        .with_document(MemoryDocument::new().with_element("#dark-mode-toggle"))
        .with_preference(Some(true));
    let report = Bootstrapper::new(mem.host()).run();
    assert_eq!(report.kinds, vec![PageKind::Other]);
    assert!(report.lamp_installed);
    assert_eq!(report.wired_links, 0);
    assert!(!report.entered);
    assert_eq!(mem.document.root_classes(), vec!["np-lamp-on".to_owned()]);
}

#[test]
fn bare_page_boots_without_failing() {
    let mem = MemoryHost::new();
    mem.storage.set_unavailable(true);
    let expected = BootReport {
        kinds: vec![PageKind::Other],
        ..BootReport::default()
    };
    assert_eq!(Bootstrapper::new(mem.host()).run(), expected);
}

// =============================================================
// Config override
// =============================================================

#[test]
fn page_config_override_is_honored() {
    let doc = article_page().with_text(
        CONFIG_SELECTOR,
        r#"{"promo_container": ".post-body", "enter_duration_ms": 400}"#,
    );
    doc.add_element(".post-body");
    let mem = MemoryHost::new().with_document(doc);
    Bootstrapper::new(mem.host()).run();
    assert_eq!(mem.document.fragments_in(".post-body").len(), 1);
    assert!(mem.document.fragments_in(".article-content").is_empty());
    assert_eq!(mem.scheduler.pending_delays(), vec![400]);
}

#[test]
fn broken_config_override_falls_back_to_defaults() {
    let doc = article_page().with_text(CONFIG_SELECTOR, "{oops");
    let mem = MemoryHost::new().with_document(doc);
    let report = Bootstrapper::new(mem.host()).run();
    assert_eq!(report.promo, Some(InjectOutcome::Inserted));
    assert_eq!(mem.scheduler.pending_delays(), vec![700]);
}
