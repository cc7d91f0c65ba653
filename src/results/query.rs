//! Filtered, paginated views over a row store.
//!
//! Filters combine with AND and are evaluated in decode order; the result
//! never renumbers rows, so correction positions stay valid across any
//! predicate.

use super::decode::PredictionRow;
use super::label::Label;
use super::store::RowStore;

/// Page size used by the results table.
pub const RESULT_PAGE_SIZE: usize = 100;

/// Filter set applied to the row store. An absent filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPredicate {
    /// Keep rows whose *effective* label equals this class.
    pub class_filter: Option<Label>,
    /// Keep rows whose source equals this exactly; no partial match.
    pub source_filter: Option<String>,
    /// Whitespace-tokenized, case-insensitive, OR-of-words text search.
    pub search_term: Option<String>,
}

impl QueryPredicate {
    pub fn is_empty(&self) -> bool {
        self.class_filter.is_none() && self.source_filter.is_none() && self.search_term.is_none()
    }

    fn matches(&self, row: &PredictionRow, effective: Label, search: &[String]) -> bool {
        if let Some(class) = self.class_filter
            && effective != class
        {
            return false;
        }
        if let Some(source) = &self.source_filter
            && row.source.as_deref() != Some(source.as_str())
        {
            return false;
        }
        if !search.is_empty() {
            let haystack = row.text.to_lowercase();
            if !search.iter().any(|token| haystack.contains(token.as_str())) {
                return false;
            }
        }
        true
    }

    /// Lowercased search tokens; a whitespace-only term yields none and
    /// therefore matches everything.
    fn search_tokens(&self) -> Vec<String> {
        self.search_term
            .as_deref()
            .map(|term| {
                term.split_whitespace()
                    .map(str::to_lowercase)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
    }
}

/// 1-based page selector. Callers supply a fresh page 1 whenever the
/// predicate changes; [`super::browser::ResultsBrowser`] enforces that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDescriptor {
    pub page_size: usize,
    pub page_number: usize,
}

impl Default for PageDescriptor {
    fn default() -> Self {
        Self {
            page_size: RESULT_PAGE_SIZE,
            page_number: 1,
        }
    }
}

impl PageDescriptor {
    pub fn first(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            page_number: 1,
        }
    }

    /// Number of pages needed for `total` matches; at least 1.
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }
}

/// A matched row with its resolved label and stable decode position.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRow<'a> {
    /// Zero-based position in decode order, stable across filtering.
    pub position: usize,
    pub row: &'a PredictionRow,
    /// Overlay-resolved label.
    pub effective: Label,
    /// True when the label comes from a manual correction.
    pub corrected: bool,
}

/// One page of matches plus the total match count for the predicate.
#[derive(Debug, Clone, Default)]
pub struct QueryResult<'a> {
    pub items: Vec<ResolvedRow<'a>>,
    pub total_matched: usize,
}

/// Evaluate the predicate over the store and slice out the requested page.
///
/// Matches keep decode order with no secondary sort. A page past the end
/// yields empty `items` with the correct `total_matched`.
pub fn query<'a>(
    store: &'a RowStore,
    predicate: &QueryPredicate,
    page: &PageDescriptor,
) -> QueryResult<'a> {
    let search = predicate.search_tokens();
    let mut items = Vec::new();
    let mut total_matched = 0usize;

    let page_size = page.page_size.max(1);
    let start = page.page_number.saturating_sub(1).saturating_mul(page_size);
    let end = start.saturating_add(page_size);

    for (position, row, effective) in store.iter_effective() {
        if !predicate.matches(row, effective, &search) {
            continue;
        }
        if total_matched >= start && total_matched < end {
            items.push(ResolvedRow {
                position,
                row,
                effective,
                corrected: store.correction(position).is_some(),
            });
        }
        total_matched += 1;
    }

    QueryResult {
        items,
        total_matched,
    }
}
