//! Full and filtered host lists

use protocol::HostEntry;

/// The unfiltered list and the currently active view of it
///
/// `active` is always `original` or an order-preserving subset of it.
#[derive(Debug, Clone, Default)]
pub struct HostCollection {
    original: Vec<HostEntry>,
    active: Vec<HostEntry>,
}

impl HostCollection {
    pub fn new(entries: Vec<HostEntry>) -> Self {
        Self {
            active: entries.clone(),
            original: entries,
        }
    }

    pub fn original(&self) -> &[HostEntry] {
        &self.original
    }

    pub fn active(&self) -> &[HostEntry] {
        &self.active
    }

    /// Replace `active` with the entries of `original` matching `query`
    ///
    /// The query is trimmed and compared case-insensitively against the
    /// address and every domain. An empty query restores the full list.
    /// Returns whether a filter is in effect.
    pub fn filter(&mut self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            self.reset();
            return false;
        }
        self.active = self
            .original
            .iter()
            .filter(|entry| entry.matches(&needle))
            .cloned()
            .collect();
        true
    }

    /// Make `active` identical to `original` again
    pub fn reset(&mut self) {
        self.active = self.original.clone();
    }

    /// Drop every entry whose domain list equals `domains`
    ///
    /// Returns the positions the dropped entries held in `active`.
    pub fn remove_domains(&mut self, domains: &[String]) -> Vec<usize> {
        self.original.retain(|entry| entry.domains() != domains);

        let removed: Vec<usize> = self
            .active
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.domains() == domains)
            .map(|(i, _)| i)
            .collect();
        self.active.retain(|entry| entry.domains() != domains);
        removed
    }
}
