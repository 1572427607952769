//! Application state and navigation logic.

use std::path::PathBuf;

use anyhow::Result;
use tracing::{info, warn};

use crate::data::{DashboardData, DashboardQuery, Dataset, DateRange, OwnerSummary};
use crate::export;
use crate::source::DataProvider;
use crate::ui::owners::{sort_owners_by, OwnerSortColumn};
use crate::ui::Theme;

/// Period presets, in months, cycled with `p`.
pub const PERIOD_PRESETS: [u32; 4] = [1, 3, 6, 12];

/// The current view/tab in the TUI.
///
/// Owner detail is shown as an overlay (controlled by `App::show_detail_overlay`)
/// rather than as a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// KPI tiles and alerts.
    Overview,
    /// Daily trend charts.
    Trend,
    /// Per-owner KPI table.
    Owners,
    /// Most delayed and lowest pass-rate records.
    Risks,
}

impl View {
    pub const ALL: [View; 4] = [View::Overview, View::Trend, View::Owners, View::Risks];

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Overview => View::Trend,
            View::Trend => View::Owners,
            View::Owners => View::Risks,
            View::Risks => View::Overview,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Overview => View::Risks,
            View::Trend => View::Overview,
            View::Owners => View::Trend,
            View::Risks => View::Owners,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Overview => "概览",
            View::Trend => "趋势",
            View::Owners => "负责人",
            View::Risks => "高风险",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Data
    provider: Box<dyn DataProvider>,
    dataset: Dataset,
    pub query: DashboardQuery,
    pub data: Option<DashboardData>,
    pub load_error: Option<String>,

    // Owners view
    pub selected_owner_index: usize,
    pub sort_column: OwnerSortColumn,
    pub sort_ascending: bool,
    pub filter_text: String,
    pub filter_active: bool,

    /// Directory exports are written to.
    pub export_dir: PathBuf,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, std::time::Instant)>,
}

impl App {
    /// Create a new App with the given provider and initial query.
    pub fn new(provider: Box<dyn DataProvider>, query: DashboardQuery) -> Self {
        Self::with_theme(provider, query, Theme::auto_detect())
    }

    /// Create a new App with an explicit theme.
    pub fn with_theme(provider: Box<dyn DataProvider>, query: DashboardQuery, theme: Theme) -> Self {
        Self {
            running: true,
            current_view: View::Overview,
            show_help: false,
            show_detail_overlay: false,
            provider,
            dataset: Dataset::default(),
            query,
            data: None,
            load_error: None,
            selected_owner_index: 0,
            sort_column: OwnerSortColumn::default(),
            sort_ascending: true,
            filter_text: String::new(),
            filter_active: false,
            export_dir: PathBuf::from("."),
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the current data provider.
    pub fn source_description(&self) -> &str {
        self.provider.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, std::time::Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < std::time::Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Fetch records for the current range from the provider and recompute.
    ///
    /// On failure the previously fetched records are kept and the error is
    /// stored in `load_error`.
    pub fn reload_data(&mut self) -> Result<()> {
        let range = self.query.range;
        self.dataset = self.fetch(&range)?;
        self.recompute();
        Ok(())
    }

    fn fetch(&mut self, range: &DateRange) -> Result<Dataset> {
        match self.provider.fetch(range) {
            Ok(records) => {
                info!(
                    source = self.provider.description(),
                    range = %range,
                    records = records.len(),
                    "fetched records"
                );
                self.load_error = None;
                Ok(Dataset::new(records))
            }
            Err(e) => {
                warn!(error = %format!("{:#}", e), "fetch failed, keeping previous records");
                self.load_error = Some(format!("{:#}", e));
                Err(e)
            }
        }
    }

    /// Recompute the dashboard from the cached records.
    pub fn recompute(&mut self) {
        let data = DashboardData::compute(&self.dataset, &self.query);
        let owners = self.owner_count(&data);
        if self.selected_owner_index >= owners {
            self.selected_owner_index = owners.saturating_sub(1);
        }
        if owners == 0 {
            self.show_detail_overlay = false;
        }
        self.data = Some(data);
    }

    /// Replace the query. A new date range triggers a re-fetch; any other
    /// change recomputes from the cached records.
    ///
    /// If the re-fetch fails, the current query and records stay in place.
    pub fn set_query(&mut self, query: DashboardQuery) -> Result<()> {
        if query.range != self.query.range {
            self.dataset = self.fetch(&query.range)?;
        }
        self.query = query;
        self.recompute();
        Ok(())
    }

    /// Apply `query`, reporting either `message` or the fetch error.
    fn apply_query(&mut self, query: DashboardQuery, message: String) {
        match self.set_query(query) {
            Ok(()) => self.set_status_message(message),
            Err(e) => self.set_status_message(format!("加载失败: {:#}", e)),
        }
    }

    /// Select the next (or previous) department filter.
    pub fn cycle_department(&mut self, forward: bool) {
        let department = if forward {
            self.query.department.next()
        } else {
            self.query.department.prev()
        };
        self.apply_query(
            self.query.with_department(department),
            format!("部门: {}", department),
        );
    }

    /// Months covered by the current range, if it matches a preset.
    pub fn current_period(&self) -> Option<u32> {
        let end = self.query.range.end();
        PERIOD_PRESETS
            .into_iter()
            .find(|&m| DateRange::months_ending(end, m) == self.query.range)
    }

    /// Switch to the next (or previous) period preset, keeping the end date.
    pub fn cycle_period(&mut self, forward: bool) {
        let position = self
            .current_period()
            .and_then(|m| PERIOD_PRESETS.iter().position(|&p| p == m));
        let len = PERIOD_PRESETS.len();
        let next = match (position, forward) {
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
            (None, _) => 0,
        };
        let months = PERIOD_PRESETS[next];
        let range = DateRange::months_ending(self.query.range.end(), months);
        self.apply_query(
            self.query.with_range(range),
            format!("周期: 近{}个月 ({})", months, range),
        );
    }

    /// Move the delay threshold by `delta` days.
    pub fn adjust_delay_threshold(&mut self, delta: i32) {
        let thresholds = self.query.thresholds.adjust_delay(delta);
        self.apply_query(
            self.query.with_thresholds(thresholds),
            format!("延迟阈值: {}天", thresholds.delay_days),
        );
    }

    /// Move the quality threshold by `delta` percentage points.
    pub fn adjust_quality_threshold(&mut self, delta: i32) {
        let thresholds = self.query.thresholds.adjust_quality(delta);
        self.apply_query(
            self.query.with_thresholds(thresholds),
            format!("质量阈值: {}%", thresholds.quality_pct),
        );
    }

    /// Move the inventory threshold by `delta` percentage points.
    pub fn adjust_inventory_threshold(&mut self, delta: i32) {
        let thresholds = self.query.thresholds.adjust_inventory(delta);
        self.apply_query(
            self.query.with_thresholds(thresholds),
            format!("库存阈值: {}%", thresholds.inventory_pct),
        );
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Owners after applying the search filter and sort order.
    pub fn visible_owners(&self) -> Vec<&OwnerSummary> {
        let Some(ref data) = self.data else {
            return Vec::new();
        };
        let mut owners: Vec<&OwnerSummary> =
            data.owners.iter().filter(|o| self.matches_filter(&o.name)).collect();
        sort_owners_by(&mut owners, self.sort_column, self.sort_ascending);
        owners
    }

    fn owner_count(&self, data: &DashboardData) -> usize {
        data.owners.iter().filter(|o| self.matches_filter(&o.name)).count()
    }

    /// The owner under the cursor in the Owners view.
    pub fn selected_owner(&self) -> Option<&OwnerSummary> {
        self.visible_owners().get(self.selected_owner_index).copied()
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        if self.current_view != View::Owners {
            return;
        }
        let max = self.visible_owners().len().saturating_sub(1);
        self.selected_owner_index = (self.selected_owner_index + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        if self.current_view == View::Owners {
            self.selected_owner_index = self.selected_owner_index.saturating_sub(n);
        }
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        if self.current_view == View::Owners {
            self.selected_owner_index = 0;
        }
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        if self.current_view == View::Owners {
            self.selected_owner_index = self.visible_owners().len().saturating_sub(1);
        }
    }

    /// Open the detail overlay for the selected owner.
    pub fn enter_detail(&mut self) {
        if self.current_view == View::Owners && self.selected_owner().is_some() {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close the overlay first, then return to the overview.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
            return;
        }
        self.current_view = View::Overview;
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle to the next sort column of the owner table.
    pub fn cycle_sort(&mut self) {
        self.sort_column = self.sort_column.next();
    }

    /// Toggle sort direction between ascending and descending.
    pub fn toggle_sort_direction(&mut self) {
        self.sort_ascending = !self.sort_ascending;
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.selected_owner_index = 0;
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
        self.selected_owner_index = 0;
    }

    /// Check if an owner name matches the current filter.
    pub fn matches_filter(&self, name: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        name.to_lowercase().contains(&self.filter_text.to_lowercase())
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the filtered records to a CSV file in `export_dir`.
    pub fn export_csv(&self) -> Result<PathBuf> {
        let Some(ref data) = self.data else {
            anyhow::bail!("No data to export");
        };
        let path = export::resolve_csv_path(&self.export_dir, &self.query);
        export::export_csv(data, &path)?;
        Ok(path)
    }

    /// Export the KPI/alert report to a JSON file in `export_dir`.
    pub fn export_report(&self) -> Result<PathBuf> {
        let Some(ref data) = self.data else {
            anyhow::bail!("No data to export");
        };
        let path = self.export_dir.join(export::report_filename(&self.query));
        export::export_report(data, &self.query, &path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::data::fixtures::{date, record};
    use crate::data::{AlertKind, Department, DepartmentFilter, Record, Thresholds};
    use crate::source::StaticProvider;

    /// Counts fetches and can be switched to fail.
    #[derive(Debug)]
    struct CountingProvider {
        inner: StaticProvider,
        fetches: Rc<Cell<usize>>,
        fail: Rc<Cell<bool>>,
    }

    impl DataProvider for CountingProvider {
        fn fetch(&mut self, range: &DateRange) -> Result<Vec<Record>> {
            self.fetches.set(self.fetches.get() + 1);
            if self.fail.get() {
                anyhow::bail!("provider offline");
            }
            self.inner.fetch(range)
        }

        fn description(&self) -> &str {
            self.inner.description()
        }
    }

    fn records() -> Vec<Record> {
        vec![
            record(date(2025, 1, 15), Department::Project, "赵华").delay(59),
            record(date(2025, 5, 20), Department::Project, "张明").delay(30).first_pass(0.72),
            record(date(2025, 6, 1), Department::Quality, "李燕燕").delay(5),
            record(date(2025, 6, 5), Department::Project, "张明").delay(20),
            record(date(2025, 6, 10), Department::Logistics, "刘伟").delay(2),
        ]
    }

    fn query() -> DashboardQuery {
        DashboardQuery::new(
            DepartmentFilter::All,
            DateRange::months_ending(date(2025, 6, 11), 3),
            Thresholds::default(),
        )
    }

    struct Harness {
        app: App,
        fetches: Rc<Cell<usize>>,
        fail: Rc<Cell<bool>>,
    }

    fn harness() -> Harness {
        let fetches = Rc::new(Cell::new(0));
        let fail = Rc::new(Cell::new(false));
        let provider = CountingProvider {
            inner: StaticProvider::new(records(), "test"),
            fetches: fetches.clone(),
            fail: fail.clone(),
        };
        let mut app = App::with_theme(Box::new(provider), query(), Theme::dark());
        app.reload_data().unwrap();
        Harness { app, fetches, fail }
    }

    #[test]
    fn test_view_cycle() {
        let mut view = View::Overview;
        for _ in 0..View::ALL.len() {
            view = view.next();
        }
        assert_eq!(view, View::Overview);
        assert_eq!(View::Overview.prev(), View::Risks);
    }

    #[test]
    fn test_reload_computes_dashboard() {
        let h = harness();
        let data = h.app.data.as_ref().unwrap();
        // 2025-01-15 is outside the three-month range
        assert_eq!(data.dataset.len(), 4);
        assert_eq!(h.app.source_description(), "memory: test");
        assert_eq!(h.fetches.get(), 1);
    }

    #[test]
    fn test_department_change_does_not_refetch() {
        let mut h = harness();
        h.app.cycle_department(true);

        assert_eq!(h.app.query.department, DepartmentFilter::Only(Department::Project));
        assert_eq!(h.app.data.as_ref().unwrap().dataset.len(), 2);
        assert_eq!(h.fetches.get(), 1);
    }

    #[test]
    fn test_period_change_refetches() {
        let mut h = harness();
        assert_eq!(h.app.current_period(), Some(3));

        h.app.cycle_period(true);
        assert_eq!(h.app.current_period(), Some(6));
        assert_eq!(h.fetches.get(), 2);
        assert_eq!(h.app.data.as_ref().unwrap().dataset.len(), 5);

        h.app.cycle_period(false);
        h.app.cycle_period(false);
        assert_eq!(h.app.current_period(), Some(1));
        assert_eq!(h.app.query.range.end(), date(2025, 6, 11));
    }

    #[test]
    fn test_threshold_adjustment_updates_alerts() {
        let mut h = harness();
        // Mean delay over the range is 57 / 4 = 14.25
        let fired = |app: &App| {
            app.data
                .as_ref()
                .unwrap()
                .alerts
                .iter()
                .any(|a| a.kind == AlertKind::DelayOverThreshold)
        };
        assert!(!fired(&h.app));

        h.app.adjust_delay_threshold(-2);
        assert_eq!(h.app.query.thresholds.delay_days, 13);
        assert!(fired(&h.app));

        h.app.adjust_delay_threshold(-100);
        assert_eq!(h.app.query.thresholds.delay_days, 7);
        assert_eq!(h.fetches.get(), 1);
    }

    #[test]
    fn test_failed_fetch_keeps_previous_records() {
        let mut h = harness();
        h.fail.set(true);

        assert!(h.app.reload_data().is_err());
        assert!(h.app.load_error.as_deref().unwrap().contains("provider offline"));
        assert_eq!(h.app.data.as_ref().unwrap().dataset.len(), 4);

        h.fail.set(false);
        h.app.reload_data().unwrap();
        assert!(h.app.load_error.is_none());
    }

    #[test]
    fn test_failed_period_change_keeps_query() {
        let mut h = harness();
        let before = h.app.query.range;
        h.fail.set(true);

        h.app.cycle_period(true);
        assert_eq!(h.app.query.range, before);
        assert_eq!(h.app.current_period(), Some(3));
        assert!(h.app.get_status_message().unwrap().contains("provider offline"));
        assert!(h.app.load_error.is_some());

        // Later recomputes still label the cached records with their own range
        h.app.cycle_department(true);
        h.app.cycle_department(false);
        assert_eq!(h.app.query.range, before);
        assert_eq!(h.app.data.as_ref().unwrap().dataset.len(), 4);

        let dir = tempfile::tempdir().unwrap();
        h.app.export_dir = dir.path().to_path_buf();
        let csv = h.app.export_csv().unwrap();
        assert_eq!(
            csv.file_name().unwrap().to_str().unwrap(),
            "风控数据_全部_2025-03-11_2025-06-11.csv"
        );

        h.fail.set(false);
        h.app.cycle_period(true);
        assert_eq!(h.app.current_period(), Some(6));
        assert_eq!(h.app.data.as_ref().unwrap().dataset.len(), 5);
        assert!(h.app.load_error.is_none());
    }

    #[test]
    fn test_owner_filter_and_detail() {
        let mut h = harness();
        h.app.enter_detail();
        assert!(!h.app.show_detail_overlay);

        h.app.set_view(View::Owners);
        assert_eq!(h.app.visible_owners().len(), 3);

        h.app.start_filter();
        h.app.filter_push('张');
        assert_eq!(h.app.selected_owner().unwrap().name, "张明");

        h.app.filter_pop();
        assert_eq!(h.app.selected_owner_index, 0);
        h.app.select_last();
        h.app.filter_push('张');
        assert_eq!(h.app.selected_owner_index, 0);
        assert_eq!(h.app.selected_owner().unwrap().name, "张明");

        h.app.enter_detail();
        assert!(h.app.show_detail_overlay);

        h.app.go_back();
        assert!(!h.app.show_detail_overlay);
        assert_eq!(h.app.current_view, View::Owners);
        h.app.go_back();
        assert_eq!(h.app.current_view, View::Overview);
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut h = harness();
        h.app.set_view(View::Owners);
        h.app.select_next_n(10);
        assert_eq!(h.app.selected_owner_index, 2);

        h.app.cycle_department(true);
        assert_eq!(h.app.selected_owner_index, 0);
        h.app.select_last();
        assert_eq!(h.app.selected_owner_index, 0);
    }

    #[test]
    fn test_exports_write_to_export_dir() {
        let mut h = harness();
        let dir = tempfile::tempdir().unwrap();
        h.app.export_dir = dir.path().to_path_buf();

        let csv = h.app.export_csv().unwrap();
        assert_eq!(csv, dir.path().join(export::csv_filename(&h.app.query)));
        assert!(csv.exists());

        let report = h.app.export_report().unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(report).unwrap()).unwrap();
        assert_eq!(json["records"], 4);
    }

    #[test]
    fn test_status_message() {
        let mut h = harness();
        h.app.set_status_message("hello".to_string());
        assert_eq!(h.app.get_status_message(), Some("hello"));
    }
}
