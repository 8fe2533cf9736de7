//! Paginated host list state
//!
//! Rows are materialized a page at a time from the active list. The cursor
//! marks the first entry not yet rendered, so rendered rows always mirror
//! `active[..cursor]` in order.

use std::collections::HashSet;

use protocol::{HostEntry, HostTag};

use super::collection::HostCollection;

/// Generation number of a load, reload, search or clear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

/// Lifecycle of the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    /// Nothing requested yet
    Unloaded,
    /// A load is in flight
    Loading,
    /// Showing the full list
    Loaded,
    /// Showing a search result
    Filtered,
    /// Loading failed twice; only a reload recovers
    Empty,
}

/// A rendered row of the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRow {
    pub address: String,
    pub domains_text: String,
    pub tag: HostTag,
    pub domains: Vec<String>,
    pub removable: bool,
}

impl From<&HostEntry> for HostRow {
    fn from(entry: &HostEntry) -> Self {
        Self {
            address: entry.address().to_string(),
            domains_text: entry.domains_text(),
            tag: entry.tag(),
            domains: entry.domains().to_vec(),
            removable: entry.is_removable(),
        }
    }
}

/// Host list with incremental rendering, search and pending removals
#[derive(Debug)]
pub struct HostListView {
    hosts: HostCollection,
    rows: Vec<HostRow>,
    cursor: usize,
    page_size: usize,
    /// Rows produced by the first page after the last reset
    first_page_rows: usize,
    phase: ListPhase,
    generation: u64,
    pending: HashSet<Vec<String>>,
    selected: usize,
    offset: usize,
    viewport: usize,
    query: String,
    error: Option<String>,
}

impl HostListView {
    pub fn new(page_size: usize) -> Self {
        Self {
            hosts: HostCollection::default(),
            rows: Vec::new(),
            cursor: 0,
            page_size: page_size.max(1),
            first_page_rows: 0,
            phase: ListPhase::Unloaded,
            generation: 0,
            pending: HashSet::new(),
            selected: 0,
            offset: 0,
            viewport: 0,
            query: String::new(),
            error: None,
        }
    }

    fn next_ticket(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    /// Start a load or reload, returning the ticket its result must carry
    pub fn begin_load(&mut self) -> LoadTicket {
        self.phase = ListPhase::Loading;
        self.error = None;
        self.query.clear();
        self.next_ticket()
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Apply a finished load
    ///
    /// Results carrying a stale ticket are dropped and `false` is returned.
    pub fn apply_load(&mut self, ticket: LoadTicket, result: Result<Vec<HostEntry>, String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        match result {
            Ok(entries) => {
                self.hosts = HostCollection::new(entries);
                // A search typed while loading applies to the fetched list
                self.phase = if self.hosts.filter(&self.query) {
                    ListPhase::Filtered
                } else {
                    ListPhase::Loaded
                };
                self.error = None;
            }
            Err(error) => {
                self.hosts = HostCollection::default();
                self.query.clear();
                self.phase = ListPhase::Empty;
                self.error = Some(error);
            }
        }
        self.restart();
        true
    }

    /// Filter the full list by `query`
    ///
    /// An empty query is a local reset to the full list. While a load is in
    /// flight the query is only recorded and its ticket stays current.
    pub fn search(&mut self, query: &str) -> LoadTicket {
        if self.phase == ListPhase::Loading {
            self.query = query.trim().to_string();
            return LoadTicket(self.generation);
        }
        let ticket = self.next_ticket();
        self.query = query.trim().to_string();
        self.phase = if self.hosts.filter(&self.query) {
            ListPhase::Filtered
        } else {
            ListPhase::Loaded
        };
        self.restart();
        ticket
    }

    /// Drop the search and show the full list again
    pub fn clear(&mut self) -> LoadTicket {
        if self.phase == ListPhase::Loading {
            self.query.clear();
            return LoadTicket(self.generation);
        }
        let ticket = self.next_ticket();
        self.query.clear();
        self.hosts.reset();
        self.phase = ListPhase::Loaded;
        self.restart();
        ticket
    }

    fn restart(&mut self) {
        self.rows.clear();
        self.cursor = 0;
        self.selected = 0;
        self.offset = 0;
        self.first_page_rows = self.render_page();
    }

    /// Render up to one page of not yet rendered entries
    ///
    /// Returns the number of rows added.
    pub fn render_page(&mut self) -> usize {
        let active = self.hosts.active();
        let end = (self.cursor + self.page_size).min(active.len());
        let added = end - self.cursor;
        self.rows
            .extend(active[self.cursor..end].iter().map(HostRow::from));
        self.cursor = end;
        added
    }

    /// Height of the first page as displayed
    fn page_height(&self) -> usize {
        self.first_page_rows.min(self.viewport)
    }

    /// Whether the visible window is within one page of the rendered end
    pub fn should_load_more(&self) -> bool {
        self.cursor < self.hosts.active().len()
            && self.offset + self.viewport >= self.rows.len().saturating_sub(self.page_height())
    }

    /// Render another page when the scroll position asks for it
    pub fn load_more_if_needed(&mut self) -> usize {
        if self.should_load_more() {
            self.render_page()
        } else {
            0
        }
    }

    /// Record the number of visible rows
    pub fn set_viewport(&mut self, rows: usize) {
        self.viewport = rows;
        self.ensure_visible();
        self.load_more_if_needed();
    }

    fn ensure_visible(&mut self) {
        if self.viewport == 0 {
            self.offset = self.selected;
            return;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + self.viewport {
            self.offset = self.selected + 1 - self.viewport;
        }
        let max_offset = self.rows.len().saturating_sub(self.viewport);
        self.offset = self.offset.min(max_offset);
    }

    fn select(&mut self, index: usize) {
        self.selected = index.min(self.rows.len().saturating_sub(1));
        self.ensure_visible();
        self.load_more_if_needed();
    }

    pub fn select_next(&mut self) {
        self.select(self.selected + 1);
    }

    pub fn select_previous(&mut self) {
        self.select(self.selected.saturating_sub(1));
    }

    pub fn page_down(&mut self) {
        self.select(self.selected + self.viewport.max(1));
    }

    pub fn page_up(&mut self) {
        self.select(self.selected.saturating_sub(self.viewport.max(1)));
    }

    pub fn select_first(&mut self) {
        self.select(0);
    }

    /// Jump to the last rendered row, which also pulls in the next page
    pub fn select_last(&mut self) {
        self.select(self.rows.len().saturating_sub(1));
    }

    /// Start removing the selected row
    ///
    /// Returns its domains when the row is removable and no removal for the
    /// same domain list is already in flight.
    pub fn request_removal(&mut self) -> Option<Vec<String>> {
        let row = self.rows.get(self.selected)?;
        if !row.removable || self.pending.contains(&row.domains) {
            return None;
        }
        let domains = row.domains.clone();
        self.pending.insert(domains.clone());
        Some(domains)
    }

    pub fn is_pending(&self, domains: &[String]) -> bool {
        self.pending.contains(domains)
    }

    /// Settle a removal
    ///
    /// On success every entry with the same domain list leaves the full list,
    /// the active list and the rendered rows. Returns the number of rendered
    /// rows dropped.
    pub fn finish_removal(&mut self, domains: &[String], success: bool) -> usize {
        self.pending.remove(domains);
        if !success {
            return 0;
        }

        let positions = self.hosts.remove_domains(domains);
        let rendered = positions.iter().filter(|&&i| i < self.cursor).count();
        self.cursor -= rendered;
        self.rows.retain(|row| row.domains != domains);

        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
        self.ensure_visible();
        self.load_more_if_needed();
        rendered
    }

    pub fn rows(&self) -> &[HostRow] {
        &self.rows
    }

    pub fn hosts(&self) -> &HostCollection {
        &self.hosts
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn phase(&self) -> ListPhase {
        self.phase
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_row(&self) -> Option<&HostRow> {
        self.rows.get(self.selected)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Entries in the active list
    pub fn total(&self) -> usize {
        self.hosts.active().len()
    }
}


/// Property-based tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn entries(n: usize) -> Vec<HostEntry> {
        (0..n)
            .map(|i| {
                let address = if i % 7 == 0 { "127.0.0.1" } else { "0.0.0.0" };
                HostEntry::new(address, vec![format!("h{}.example.com", i)]).unwrap()
            })
            .collect()
    }

    /// Rendered rows are always exactly the active list up to the cursor
    fn assert_rows_are_prefix(view: &HostListView) -> Result<(), TestCaseError> {
        prop_assert_eq!(view.rows().len(), view.cursor());
        for (row, entry) in view.rows().iter().zip(view.hosts().active()) {
            prop_assert_eq!(&row.domains, &entry.domains().to_vec());
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_scrolling_renders_everything_in_order(
            n in 0usize..400,
            page in 1usize..80,
            viewport in 1usize..60,
        ) {
            let mut view = HostListView::new(page);
            let ticket = view.begin_load();
            view.apply_load(ticket, Ok(entries(n)));
            view.set_viewport(viewport);
            prop_assert!(view.rows().len() <= n);

            for _ in 0..=(n / page + 1) {
                view.select_last();
                assert_rows_are_prefix(&view)?;
            }
            prop_assert_eq!(view.rows().len(), n);
            prop_assert!(!view.should_load_more());
        }

        #[test]
        fn prop_removals_keep_rows_consistent(
            n in 1usize..200,
            page in 1usize..60,
            picks in prop::collection::vec(any::<prop::sample::Index>(), 1..30),
        ) {
            let mut view = HostListView::new(page);
            let ticket = view.begin_load();
            view.apply_load(ticket, Ok(entries(n)));
            view.set_viewport(10);

            for pick in picks {
                if view.rows().is_empty() {
                    break;
                }
                let index = pick.index(view.rows().len());
                let domains = view.rows()[index].domains.clone();
                let before = view.total();
                view.finish_removal(&domains, true);

                prop_assert_eq!(view.total(), before - 1);
                prop_assert!(view.rows().iter().all(|row| row.domains != domains));
                assert_rows_are_prefix(&view)?;
                prop_assert!(view.selected() < view.rows().len().max(1));
            }
        }
    }
}
