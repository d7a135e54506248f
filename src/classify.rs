//! Structural page classification.
//!
//! Both predicates query the live document on every call. A soft navigation
//! that swaps page content can change the answer, so nothing is cached.
//! The two tests are independent; a page may satisfy both.

#[cfg(test)]
#[path = "classify_test.rs"]
mod classify_test;

use crate::config::ThemeConfig;
use crate::host::Document;

/// Kind of page the document currently looks like.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageKind {
    List,
    Article,
    Other,
}

/// Stateless predicates over a [`Document`].
#[derive(Clone, Copy)]
pub struct PageClassifier<'a> {
    document: &'a dyn Document,
    config: &'a ThemeConfig,
}

impl<'a> PageClassifier<'a> {
    #[must_use]
    pub fn new(document: &'a dyn Document, config: &'a ThemeConfig) -> Self {
        Self { document, config }
    }

    /// `true` when the body carries the article marker class.
    pub fn is_article_page(&self) -> bool {
        self.document.body_has_class(&self.config.article_body_class)
    }

    /// `true` when any list container is present.
    pub fn is_list_page(&self) -> bool {
        self.document.any_matches(&self.config.list_selectors)
    }

    /// Every kind the page matches, or just `Other`.
    pub fn kinds(&self) -> Vec<PageKind> {
        let mut kinds = Vec::with_capacity(2);
        if self.is_list_page() {
            kinds.push(PageKind::List);
        }
        if self.is_article_page() {
            kinds.push(PageKind::Article);
        }
        if kinds.is_empty() {
            kinds.push(PageKind::Other);
        }
        kinds
    }
}
