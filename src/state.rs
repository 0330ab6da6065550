use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;

use crate::color::CategoryColors;
use crate::data::aggregate::{self, GroupedAggregates, Granularity, KpiSummary, TrendPoint};
use crate::data::export;
use crate::data::filter::{FilterCriteria, FilteredView};
use crate::data::model::SalesDataset;
use crate::feedback::FeedbackLog;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// The dataset is loaded once and held read-only; every interaction rebuilds
/// the filtered view and its aggregates from scratch, superseding whatever
/// was displayed before.
pub struct AppState {
    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<SalesDataset>,

    /// Currently selected categories / regions (checkbox state).
    pub selected_categories: BTreeSet<String>,
    pub selected_regions: BTreeSet<String>,

    /// Inclusive order-date range.
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    /// Indices of orders passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// KPIs over the filtered view, recomputed by [`AppState::refilter`].
    pub kpis: KpiSummary,
    /// KPIs over the whole dataset, baseline for the delta badges.
    pub overall_kpis: KpiSummary,
    /// Grouped aggregates feeding the bar charts.
    pub groups: GroupedAggregates,
    /// Sales/profit trend series at the selected granularity.
    pub trend: Vec<TrendPoint>,

    /// Time bucket size for the trend chart.
    pub granularity: Granularity,

    /// Chart visibility toggles.
    pub show_region_chart: bool,
    pub show_category_chart: bool,
    pub show_discount_chart: bool,

    /// Per-category colours shared by all charts.
    pub colors: CategoryColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Feedback form: draft text and the append-only log it lands in.
    pub feedback_draft: String,
    pub feedback: FeedbackLog,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            selected_categories: BTreeSet::new(),
            selected_regions: BTreeSet::new(),
            start_date: NaiveDate::MIN,
            end_date: NaiveDate::MAX,
            visible_indices: Vec::new(),
            kpis: KpiSummary::default(),
            overall_kpis: KpiSummary::default(),
            groups: GroupedAggregates::default(),
            trend: Vec::new(),
            granularity: Granularity::Monthly,
            show_region_chart: false,
            show_category_chart: true,
            show_discount_chart: false,
            colors: CategoryColors::default(),
            status_message: None,
            feedback_draft: String::new(),
            feedback: FeedbackLog::new("feedback.csv"),
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset: select everything, span the full date
    /// range, rebuild colours and aggregates.
    pub fn set_dataset(&mut self, dataset: SalesDataset) {
        self.selected_categories = dataset.categories.clone();
        self.selected_regions = dataset.regions.clone();
        if let Some((lo, hi)) = dataset.date_span {
            self.start_date = lo;
            self.end_date = hi;
        }
        self.colors = CategoryColors::new(&dataset.categories);

        let all = FilteredView::new(&dataset, &FilterCriteria::match_all(&dataset));
        self.overall_kpis = aggregate::summarize(&all);

        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Build criteria from the current checkbox and date-picker state.
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            categories: self.selected_categories.clone(),
            regions: self.selected_regions.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    /// Nothing selected in a checkbox group: the original dashboard asks the
    /// user to pick at least one value instead of showing anything.
    pub fn selection_incomplete(&self) -> bool {
        self.dataset.is_some()
            && (self.selected_categories.is_empty() || self.selected_regions.is_empty())
    }

    /// Recompute the filtered view and every aggregate derived from it.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };

        if self.selection_incomplete() {
            self.visible_indices.clear();
        } else {
            self.visible_indices = crate::data::filter::filtered_indices(ds, &self.criteria());
        }

        let view = FilteredView::from_indices(ds, self.visible_indices.clone());
        self.kpis = aggregate::summarize(&view);
        self.groups = aggregate::grouped(&view);
        self.trend = aggregate::trend(&view, self.granularity);
    }

    /// Switch the trend bucket size and rebuild the series.
    pub fn set_granularity(&mut self, granularity: Granularity) {
        if self.granularity != granularity {
            self.granularity = granularity;
            self.refilter();
        }
    }

    /// Toggle a single category checkbox.
    pub fn toggle_category(&mut self, category: &str) {
        if !self.selected_categories.remove(category) {
            self.selected_categories.insert(category.to_string());
        }
        self.refilter();
    }

    /// Toggle a single region checkbox.
    pub fn toggle_region(&mut self, region: &str) {
        if !self.selected_regions.remove(region) {
            self.selected_regions.insert(region.to_string());
        }
        self.refilter();
    }

    /// Select all / none in the category group.
    pub fn select_all_categories(&mut self) {
        if let Some(ds) = &self.dataset {
            self.selected_categories = ds.categories.clone();
            self.refilter();
        }
    }

    pub fn select_no_categories(&mut self) {
        self.selected_categories.clear();
        self.refilter();
    }

    /// Select all / none in the region group.
    pub fn select_all_regions(&mut self) {
        if let Some(ds) = &self.dataset {
            self.selected_regions = ds.regions.clone();
            self.refilter();
        }
    }

    pub fn select_no_regions(&mut self) {
        self.selected_regions.clear();
        self.refilter();
    }

    /// Export the current filtered view to a CSV file.
    pub fn export_csv(&self, path: &Path) -> anyhow::Result<()> {
        let ds = self
            .dataset
            .as_ref()
            .context("no dataset loaded, nothing to export")?;
        let view = FilteredView::from_indices(ds, self.visible_indices.clone());
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating export file '{}'", path.display()))?;
        export::write_csv(&view, file)
            .with_context(|| format!("exporting filtered data to '{}'", path.display()))?;
        Ok(())
    }

    /// Submit the feedback draft; blank drafts are rejected with a hint.
    pub fn submit_feedback(&mut self) {
        if self.feedback_draft.trim().is_empty() {
            self.status_message = Some("Please enter some feedback before submitting.".to_string());
            return;
        }
        match self.feedback.append(&self.feedback_draft) {
            Ok(()) => {
                self.feedback_draft.clear();
                self.status_message = Some("Thank you! Your feedback has been received.".to_string());
            }
            Err(e) => {
                log::error!("Failed to record feedback: {e:#}");
                self.status_message = Some(format!("Feedback error: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::OrderRecord;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_dataset() -> SalesDataset {
        SalesDataset::from_orders(vec![
            OrderRecord {
                category: "Furniture".into(),
                region: "East".into(),
                order_date: day(2023, 1, 5),
                sales: 100.0,
                profit: 10.0,
                discount: 0.1,
            },
            OrderRecord {
                category: "Office".into(),
                region: "West".into(),
                order_date: day(2023, 2, 10),
                sales: 200.0,
                profit: -5.0,
                discount: 0.2,
            },
        ])
    }

    #[test]
    fn set_dataset_selects_everything() {
        let mut state = AppState::default();
        state.set_dataset(sample_dataset());

        assert_eq!(state.visible_indices, vec![0, 1]);
        assert_eq!(state.selected_categories.len(), 2);
        assert_eq!(state.start_date, day(2023, 1, 5));
        assert_eq!(state.end_date, day(2023, 2, 10));
        assert_eq!(state.kpis.total_sales, 300.0);
        assert_eq!(state.kpis, state.overall_kpis);
    }

    #[test]
    fn toggling_a_category_refilters() {
        let mut state = AppState::default();
        state.set_dataset(sample_dataset());

        state.toggle_category("Office");
        assert_eq!(state.visible_indices, vec![0]);
        assert_eq!(state.kpis.total_sales, 100.0);
        assert_eq!(state.groups.sales_by_category.len(), 1);

        state.toggle_category("Office");
        assert_eq!(state.visible_indices, vec![0, 1]);
    }

    #[test]
    fn empty_selection_shows_nothing_and_flags_it() {
        let mut state = AppState::default();
        state.set_dataset(sample_dataset());

        state.select_no_regions();
        assert!(state.selection_incomplete());
        assert!(state.visible_indices.is_empty());
        assert_eq!(state.kpis.total_sales, 0.0);

        state.select_all_regions();
        assert!(!state.selection_incomplete());
        assert_eq!(state.visible_indices.len(), 2);
    }

    #[test]
    fn granularity_switch_rebuilds_trend() {
        let mut state = AppState::default();
        state.set_dataset(sample_dataset());

        assert_eq!(state.trend.len(), 2);
        assert_eq!(state.trend[0].date, day(2023, 1, 1));

        state.set_granularity(Granularity::Daily);
        assert_eq!(state.trend[0].date, day(2023, 1, 5));
    }

    #[test]
    fn submitted_feedback_reads_back_for_display() {
        let path = std::env::temp_dir().join("sales_scope_state_feedback.csv");
        std::fs::remove_file(&path).ok();

        let mut state = AppState::default();
        state.feedback = FeedbackLog::new(&path);
        state.feedback_draft = "Needs a dark theme".to_string();
        state.submit_feedback();

        // The side panel lists exactly what entries() returns.
        let entries = state.feedback.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1, "Needs a dark theme");
        assert!(state.feedback_draft.is_empty());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn export_writes_current_view() {
        let mut state = AppState::default();
        state.set_dataset(sample_dataset());
        state.toggle_category("Furniture"); // leaves only Office selected

        let path = std::env::temp_dir().join("sales_scope_state_export.csv");
        state.export_csv(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Office"));
        assert!(!text.contains("Furniture"));
        std::fs::remove_file(&path).ok();
    }
}
