use std::cell::Cell;

use super::*;
use crate::host::memory::MemoryDocument;

fn article_doc() -> MemoryDocument {
    MemoryDocument::new()
        .with_body_class("article-page")
        .with_element(".article-content")
}

#[test]
fn repeated_injection_inserts_once() {
    let doc = article_doc();
    let injector = Injector::new(&doc);
    let built = Cell::new(0);

    let outcomes: Vec<_> = (0..5)
        .map(|_| {
            injector.inject_once(".article-content", "data-np-promo", || {
                built.set(built.get() + 1);
                Fragment::new("div")
            })
        })
        .collect();

    assert_eq!(outcomes[0], InjectOutcome::Inserted);
    assert!(outcomes[1..].iter().all(|o| *o == InjectOutcome::AlreadyPresent));
    assert_eq!(built.get(), 1);
    assert_eq!(doc.fragments_in(".article-content").len(), 1);
}

#[test]
fn each_document_gets_its_own_fragment() {
    let config = ThemeConfig::default();
    for _ in 0..2 {
        let doc = article_doc();
        let injector = Injector::new(&doc);
        assert_eq!(injector.inject_promo(&config), InjectOutcome::Inserted);
        assert_eq!(injector.inject_promo(&config), InjectOutcome::AlreadyPresent);
        assert_eq!(doc.fragments_in(".article-content").len(), 1);
    }
}

#[test]
fn missing_container_is_a_noop() {
    let doc = MemoryDocument::new();
    let injector = Injector::new(&doc);
    let outcome = injector.inject_promo(&ThemeConfig::default());
    assert_eq!(outcome, InjectOutcome::NoContainer);
    assert!(doc.fragments_in(".article-content").is_empty());
}

#[test]
fn markers_are_tracked_per_key() {
    let doc = article_doc();
    let injector = Injector::new(&doc);
    assert_eq!(
        injector.inject_once("body", "data-a", || Fragment::new("i")),
        InjectOutcome::Inserted
    );
    assert_eq!(
        injector.inject_once("body", "data-b", || Fragment::new("i")),
        InjectOutcome::Inserted
    );
    assert_eq!(doc.fragments_in("body").len(), 2);
}

#[test]
fn marker_is_set_by_injector() {
    let doc = article_doc();
    let injector = Injector::new(&doc);
    injector.inject_once("body", "data-m", || Fragment::new("i").attr("data-m", "0"));
    let fragments = doc.fragments_in("body");
    assert_eq!(fragments[0].get_attr("data-m"), Some("1"));
    assert_eq!(
        fragments[0].attributes.iter().filter(|(n, _)| n == "data-m").count(),
        1
    );
}

#[test]
fn replaced_container_accepts_a_new_fragment() {
    let doc = article_doc();
    let injector = Injector::new(&doc);
    let config = ThemeConfig::default();
    assert_eq!(injector.inject_promo(&config), InjectOutcome::Inserted);

    doc.remove_element(".article-content");
    doc.add_element(".article-content");
    assert_eq!(injector.inject_promo(&config), InjectOutcome::Inserted);
    assert_eq!(doc.fragments_in(".article-content").len(), 1);
}

#[test]
fn back_pin_goes_to_body_with_index_link() {
    let doc = article_doc();
    let config = ThemeConfig::default();
    assert_eq!(Injector::new(&doc).inject_back(&config), InjectOutcome::Inserted);
    let pin = &doc.fragments_in("body")[0];
    assert_eq!(pin.tag, "a");
    assert_eq!(pin.get_attr("href"), Some("/posts/"));
    assert_eq!(pin.get_attr("data-np-back"), Some("1"));
    assert!(pin.inner_html.contains("返回"));
}

#[test]
fn promo_text_is_escaped() {
    let config = ThemeConfig {
        promo_text: "<b>Tom & Jerry</b>".to_owned(),
        ..ThemeConfig::default()
    };
    let fragment = promo_fragment(&config);
    assert!(fragment.inner_html.contains("&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;"));
}
