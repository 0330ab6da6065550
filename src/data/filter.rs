use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{OrderRecord, SalesDataset};

// ---------------------------------------------------------------------------
// Filter criteria: the user's current selection
// ---------------------------------------------------------------------------

/// The current selection state. Constructed fresh per interaction; carries no
/// persisted identity.
///
/// An empty category or region set means "no constraint" (show all).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub categories: BTreeSet<String>,
    pub regions: BTreeSet<String>,
    /// Inclusive start of the order-date range.
    pub start_date: NaiveDate,
    /// Inclusive end of the order-date range.
    pub end_date: NaiveDate,
}

impl FilterCriteria {
    /// Criteria that match the whole dataset: no category/region constraint,
    /// date range spanning the dataset (or a degenerate range when empty).
    pub fn match_all(dataset: &SalesDataset) -> Self {
        let (start_date, end_date) = dataset
            .date_span
            .unwrap_or_else(|| (NaiveDate::MIN, NaiveDate::MAX));
        FilterCriteria {
            categories: BTreeSet::new(),
            regions: BTreeSet::new(),
            start_date,
            end_date,
        }
    }

    /// Whether a single order satisfies every predicate.
    /// An inverted date range (start > end) matches nothing.
    pub fn matches(&self, order: &OrderRecord) -> bool {
        if self.start_date > self.end_date {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.contains(&order.category) {
            return false;
        }
        if !self.regions.is_empty() && !self.regions.contains(&order.region) {
            return false;
        }
        order.order_date >= self.start_date && order.order_date <= self.end_date
    }
}

/// Return indices of orders that pass all active filters, in dataset order.
///
/// Deterministic and side-effect free; safe to call repeatedly with differing
/// criteria. The result is always a subset of `0..dataset.len()`.
pub fn filtered_indices(dataset: &SalesDataset, criteria: &FilterCriteria) -> Vec<usize> {
    dataset
        .orders
        .iter()
        .enumerate()
        .filter(|(_, order)| criteria.matches(order))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// FilteredView – a read-only subsequence of the dataset
// ---------------------------------------------------------------------------

/// A derived, read-only view over the dataset rows satisfying some criteria.
/// Recomputed whenever the criteria change; never mutated in place.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a SalesDataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Apply `criteria` to `dataset`, producing a fresh view.
    pub fn new(dataset: &'a SalesDataset, criteria: &FilterCriteria) -> Self {
        FilteredView {
            dataset,
            indices: filtered_indices(dataset, criteria),
        }
    }

    /// Wrap pre-computed indices (e.g. cached in the UI state).
    /// Indices must have been produced by [`filtered_indices`] on `dataset`.
    pub fn from_indices(dataset: &'a SalesDataset, indices: Vec<usize>) -> Self {
        FilteredView { dataset, indices }
    }

    /// Iterate the matching rows in dataset order.
    pub fn rows(&self) -> impl Iterator<Item = &'a OrderRecord> + '_ {
        self.indices.iter().map(|&i| &self.dataset.orders[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
