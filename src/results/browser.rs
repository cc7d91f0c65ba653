//! Stateful results browsing: predicate + page + debounced search.
//!
//! Owns the row store for one loaded result set and enforces the invariant
//! that any predicate change resets the view to page 1. Search input goes
//! through a debouncer so each keystroke does not trigger a full query.

use std::time::{Duration, Instant};

use super::export;
use super::label::Label;
use super::query::{self, PageDescriptor, QueryPredicate, QueryResult, RESULT_PAGE_SIZE};
use super::store::{CorrectionError, RowStore};
use crate::results::decode::PredictionRow;
use crate::util::debounce::Debouncer;

/// Quiet period between keystrokes before the search predicate updates.
const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// View state over one loaded prediction result set.
#[derive(Debug)]
pub struct ResultsBrowser {
    store: RowStore,
    predicate: QueryPredicate,
    page: PageDescriptor,
    search_input: Debouncer<String>,
}

impl ResultsBrowser {
    pub fn new(rows: Vec<PredictionRow>) -> Self {
        Self {
            store: RowStore::new(rows),
            predicate: QueryPredicate::default(),
            page: PageDescriptor::first(RESULT_PAGE_SIZE),
            search_input: Debouncer::new(SEARCH_DEBOUNCE),
        }
    }

    pub fn store(&self) -> &RowStore {
        &self.store
    }

    pub fn predicate(&self) -> &QueryPredicate {
        &self.predicate
    }

    pub fn page(&self) -> PageDescriptor {
        self.page
    }

    /// Evaluate the current predicate and page.
    pub fn current(&self) -> QueryResult<'_> {
        query::query(&self.store, &self.predicate, &self.page)
    }

    pub fn set_class_filter(&mut self, class: Option<Label>) {
        if self.predicate.class_filter != class {
            self.predicate.class_filter = class;
            self.page.page_number = 1;
        }
    }

    pub fn set_source_filter(&mut self, source: Option<String>) {
        if self.predicate.source_filter != source {
            self.predicate.source_filter = source;
            self.page.page_number = 1;
        }
    }

    /// Record a keystroke in the search box; the predicate changes only
    /// after the debounce window, via [`Self::tick`].
    pub fn type_search(&mut self, input: impl Into<String>, now: Instant) {
        self.search_input.schedule(input.into(), now);
    }

    /// Advance timers. Returns true when the predicate changed and the view
    /// should re-query.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(term) = self.search_input.poll(now) else {
            return false;
        };
        let term = if term.is_empty() { None } else { Some(term) };
        if self.predicate.search_term == term {
            return false;
        }
        self.predicate.search_term = term;
        self.page.page_number = 1;
        true
    }

    /// Jump to a page, clamped to the range the current match count allows.
    pub fn set_page(&mut self, page_number: usize) {
        let total = self.current().total_matched;
        let last = self.page.page_count(total);
        self.page.page_number = page_number.clamp(1, last);
    }

    /// Apply a manual label correction by decode position.
    pub fn correct(&mut self, position: usize, label: i64) -> Result<(), CorrectionError> {
        self.store.set_correction(position, label)
    }

    pub fn correction_count(&self) -> usize {
        self.store.correction_count()
    }

    /// Serialize the current (corrected) row set for download.
    pub fn export_csv(&self) -> String {
        export::to_csv(&self.store)
    }

    /// Serialize the fixed 3-column clipboard form.
    pub fn export_clipboard_csv(&self) -> String {
        export::to_clipboard_csv(&self.store)
    }
}
