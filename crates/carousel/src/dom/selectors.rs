// ABOUTME: Pre-compiled CSS selector cache for the converter configuration surface.
// ABOUTME: Compiles container, item and control selectors once and scopes queries to a node.

//! Selector caching for repeated scans.
//!
//! Converters re-scan the page on every `rescan` and re-query controls on
//! every transform, always with the same handful of selector strings. This
//! module compiles each string once and reuses the matcher.

use std::collections::HashMap;
use std::sync::RwLock;

use dom_query::{Matcher, NodeRef, Selection};
use once_cell::sync::Lazy;

use crate::error::{CarouselError, Result};

/// Thread-safe cache of compiled CSS selectors. Invalid selectors are cached as `None`.
static SELECTOR_CACHE: Lazy<RwLock<HashMap<String, Option<Matcher>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Gets or compiles a CSS selector, caching the result.
///
/// Returns `None` if the selector is invalid.
pub fn get_or_compile(css: &str) -> Option<Matcher> {
    if let Ok(cache) = SELECTOR_CACHE.read() {
        if let Some(cached) = cache.get(css) {
            return cached.clone();
        }
    }

    let compiled = Matcher::new(css).ok();
    if let Ok(mut cache) = SELECTOR_CACHE.write() {
        cache
            .entry(css.to_string())
            .or_insert_with(|| compiled.clone());
    }
    compiled
}

/// Compiles `css`, reporting an invalid selector as a `ConfigError` naming `op`.
pub fn compile(css: &str, op: &str) -> Result<Matcher> {
    get_or_compile(css).ok_or_else(|| {
        CarouselError::config(css, op, Some(anyhow::anyhow!("invalid CSS selector")))
    })
}

/// Descendants of `node` (not `node` itself) matching `matcher`, in document order.
pub fn select_within<'a>(node: &NodeRef<'a>, matcher: &Matcher) -> Vec<NodeRef<'a>> {
    Selection::from(node.clone())
        .select_matcher(matcher)
        .nodes()
        .to_vec()
}
