//! Ordered extraction strategies: try each in priority order, first hit wins.
//!
//! Both adapters describe "where might this value live" as a chain of named
//! strategies. The JSON side walks envelope slots, the HTML side walks
//! selectors and attribute patterns. A strategy answers `Some` (found) or
//! `None` (try the next one); an exhausted chain is not an error.

use tracing::trace;

/// One named way of pulling a `T` out of an `I`.
pub struct Strategy<'c, I, T> {
    pub name: &'static str,
    extract: Box<dyn Fn(I) -> Option<T> + 'c>,
}

impl<'c, I, T> Strategy<'c, I, T> {
    pub fn new(name: &'static str, extract: impl Fn(I) -> Option<T> + 'c) -> Self {
        Self {
            name,
            extract: Box::new(extract),
        }
    }
}

/// Value produced by a chain, tagged with the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found<T> {
    pub strategy: &'static str,
    pub value: T,
}

/// Run `chain` against `input` in order and return the first hit.
pub fn first_found<I: Copy, T>(input: I, chain: &[Strategy<'_, I, T>]) -> Option<Found<T>> {
    for strategy in chain {
        if let Some(value) = (strategy.extract)(input) {
            trace!(strategy = strategy.name, "strategy matched");
            return Some(Found {
                strategy: strategy.name,
                value,
            });
        }
        trace!(strategy = strategy.name, "strategy missed");
    }
    None
}

/// Like [`first_found`] but yields `default` when every strategy misses.
pub fn resolve_or<I: Copy, T>(input: I, chain: &[Strategy<'_, I, T>], default: T) -> T {
    first_found(input, chain)
        .map(|found| found.value)
        .unwrap_or(default)
}

/// Text helper shared by strategies: trimmed, `None` if empty.
pub fn non_empty(s: impl AsRef<str>) -> Option<String> {
    let t = s.as_ref().trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}
