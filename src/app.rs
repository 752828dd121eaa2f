//! Application state and navigation logic.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use crate::data::{FleetSummary, History, SensorRecord, Snapshot};
use crate::export::{self, ExportFormat};
use crate::source::DataSource;
use crate::ui::sensors::{sort_sensors_by, SortColumn};
use crate::ui::Theme;

/// How long the loading indicator stays up after a manual refresh.
pub const REFRESH_DELAY: Duration = Duration::from_secs(1);

/// How long a status message stays visible.
pub const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
///
/// Sensor detail is shown as an overlay (controlled by
/// `App::show_detail_overlay`) rather than as a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Fleet overview cards and level distribution.
    Dashboard,
    /// Sensor positions on a map canvas with a turbidity legend.
    Map,
    /// Sortable, filterable sensor table.
    Sensors,
    /// CSV/JSON export panel.
    Export,
    /// Reference page for turbidity and temperature bands.
    Info,
}

impl View {
    pub const ALL: [View; 5] = [View::Dashboard, View::Map, View::Sensors, View::Export, View::Info];

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Dashboard => View::Map,
            View::Map => View::Sensors,
            View::Sensors => View::Export,
            View::Export => View::Info,
            View::Info => View::Dashboard,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Dashboard => View::Info,
            View::Map => View::Dashboard,
            View::Sensors => View::Map,
            View::Export => View::Sensors,
            View::Info => View::Export,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Map => "Map",
            View::Sensors => "Sensors",
            View::Export => "Export",
            View::Info => "Info",
        }
    }

    /// Position of this view in the tab bar.
    pub fn index(&self) -> usize {
        View::ALL.iter().position(|v| v == self).unwrap_or(0)
    }

    /// Whether this view has a selectable sensor list.
    pub fn has_selection(&self) -> bool {
        matches!(self, View::Map | View::Sensors)
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub sensors: Option<Snapshot>,
    pub last_updated: Option<Instant>,
    pub history: History,
    pub load_error: Option<String>,

    // Navigation state (visual index into the filtered, sorted list)
    pub selected_index: usize,

    // Sorting (Sensors view)
    pub sort_column: SortColumn,
    pub sort_ascending: bool,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // Manual refresh
    refresh_started: Option<Instant>,

    // Export
    pub export_dir: PathBuf,
    pub last_export: Option<PathBuf>,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App reading from `source` and exporting into `export_dir`.
    pub fn new(source: Box<dyn DataSource>, export_dir: impl Into<PathBuf>) -> Self {
        Self::with_theme(source, export_dir, Theme::auto_detect())
    }

    /// Create a new App with an explicit theme.
    pub fn with_theme(
        source: Box<dyn DataSource>,
        export_dir: impl Into<PathBuf>,
        theme: Theme,
    ) -> Self {
        Self {
            running: true,
            current_view: View::Dashboard,
            show_help: false,
            show_detail_overlay: false,
            source,
            sensors: None,
            last_updated: None,
            history: History::new(),
            load_error: None,
            selected_index: 0,
            sort_column: SortColumn::default(),
            sort_ascending: true,
            filter_text: String::new(),
            filter_active: false,
            refresh_started: None,
            export_dir: export_dir.into(),
            last_export: None,
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Poll the data source for new data.
    ///
    /// Returns Ok(true) if new data was received, Ok(false) if no new data.
    /// Source errors are kept in `load_error` for the status bar.
    pub fn reload_data(&mut self) -> Result<bool> {
        if let Some(snapshot) = self.source.poll() {
            self.history.record(&snapshot);
            self.sensors = Some(snapshot);
            self.last_updated = Some(Instant::now());
            self.load_error = None;

            let count = self.visible_count();
            if self.selected_index >= count {
                self.selected_index = count.saturating_sub(1);
            }
            return Ok(true);
        }

        if let Some(err) = self.source.error() {
            self.load_error = Some(err.to_string());
        }
        Ok(false)
    }

    /// Start a manual refresh. Ignored while one is already in progress.
    pub fn request_refresh(&mut self) {
        if self.refresh_started.is_none() {
            self.refresh_started = Some(Instant::now());
        }
    }

    /// True while a manual refresh is showing its loading indicator.
    pub fn is_loading(&self) -> bool {
        self.refresh_started.is_some()
    }

    /// Time since the current manual refresh started.
    pub fn refresh_elapsed(&self) -> Option<Duration> {
        self.refresh_started.map(|started| started.elapsed())
    }

    /// Finish a manual refresh whose delay has elapsed by `now`, re-polling
    /// the source. Returns true if a refresh completed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(started) = self.refresh_started else {
            return false;
        };
        if now.saturating_duration_since(started) < REFRESH_DELAY {
            return false;
        }

        self.refresh_started = None;
        let _ = self.reload_data();
        true
    }

    /// Fleet aggregates over the current snapshot.
    pub fn summary(&self) -> Option<FleetSummary> {
        self.sensors.as_deref().map(FleetSummary::from_records)
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
        let max = self.visible_count().saturating_sub(1);
        self.selected_index = (self.selected_index + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_index = self.selected_index.saturating_sub(n);
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        self.selected_index = self.visible_count().saturating_sub(1);
    }

    /// Sensors after filtering and sorting, paired with their snapshot index.
    pub fn visible_sensors(&self) -> Vec<(usize, &SensorRecord)> {
        let Some(ref sensors) = self.sensors else {
            return Vec::new();
        };

        let mut visible: Vec<(usize, &SensorRecord)> = sensors
            .iter()
            .enumerate()
            .filter(|(_, s)| self.matches_filter(s))
            .collect();
        sort_sensors_by(&mut visible, self.sort_column, self.sort_ascending);
        visible
    }

    fn visible_count(&self) -> usize {
        match self.sensors {
            Some(ref sensors) => sensors.iter().filter(|s| self.matches_filter(s)).count(),
            None => 0,
        }
    }

    /// The sensor under the cursor.
    pub fn selected_sensor(&self) -> Option<&SensorRecord> {
        self.visible_sensors()
            .get(self.selected_index)
            .map(|(_, sensor)| *sensor)
    }

    /// Open the detail overlay for the selected sensor.
    pub fn enter_detail(&mut self) {
        if self.current_view.has_selection() && self.selected_sensor().is_some() {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close overlay first, then return to the dashboard.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
            return;
        }
        self.current_view = View::Dashboard;
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle to the next sort column.
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
        self.selected_index = 0;
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
    }

    /// Check if a sensor's id, name or status matches the current filter.
    pub fn matches_filter(&self, sensor: &SensorRecord) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        let search = self.filter_text.to_lowercase();
        sensor.id.to_lowercase().contains(&search)
            || sensor.name.to_lowercase().contains(&search)
            || sensor.status.as_str().contains(&search)
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Write a dated export of the current snapshot into the export directory.
    pub fn export_state(&self, format: ExportFormat) -> Result<PathBuf> {
        let sensors = self.sensors.as_deref().unwrap_or_default();
        Ok(export::write_dated(&self.export_dir, format, sensors, Utc::now())?)
    }

    /// Export and report the outcome as a status message.
    ///
    /// Failures never propagate out of the TUI.
    pub fn export_and_report(&mut self, format: ExportFormat) {
        match self.export_state(format) {
            Ok(path) => {
                info!(path = %path.display(), "Exported sensor data");
                self.set_status_message(format!("Exported to {}", path.display()));
                self.last_export = Some(path);
            }
            Err(e) => {
                warn!(error = %e, "Export failed");
                self.set_status_message(format!("Export failed: {}", e));
            }
        }
    }

    /// Directory exports are written to.
    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::seed::default_fleet;
    use crate::data::SensorStatus;
    use crate::source::ChannelSource;
    use tempfile::tempdir;
    use tokio::sync::watch;

    fn app_with_fleet(dir: &Path) -> (watch::Sender<Snapshot>, App) {
        let (tx, source) = ChannelSource::create("test");
        tx.send_replace(default_fleet(Utc::now()));
        let mut app = App::with_theme(Box::new(source), dir, Theme::dark());
        app.reload_data().unwrap();
        (tx, app)
    }

    #[test]
    fn test_view_cycle() {
        let mut view = View::Dashboard;
        for _ in 0..View::ALL.len() {
            view = view.next();
        }
        assert_eq!(view, View::Dashboard);
        assert_eq!(View::Dashboard.prev(), View::Info);
        assert_eq!(View::Export.index(), 3);
    }

    #[test]
    fn test_reload_loads_snapshot() {
        let dir = tempdir().unwrap();
        let (_tx, app) = app_with_fleet(dir.path());

        assert_eq!(app.sensors.as_ref().unwrap().len(), 10);
        assert!(app.last_updated.is_some());
        assert_eq!(app.history.len("sensor-001"), 1);
        assert_eq!(app.source_description(), "live: test");
    }

    #[test]
    fn test_reload_reports_stopped_feed() {
        let dir = tempdir().unwrap();
        let (tx, mut app) = app_with_fleet(dir.path());
        drop(tx);

        assert!(!app.reload_data().unwrap());
        assert_eq!(app.load_error.as_deref(), Some("Feed stopped"));
        // Last snapshot stays on screen
        assert!(app.sensors.is_some());
    }

    #[test]
    fn test_refresh_sets_loading_until_delay() {
        let dir = tempdir().unwrap();
        let (_tx, mut app) = app_with_fleet(dir.path());

        assert!(!app.is_loading());
        app.request_refresh();
        assert!(app.is_loading());
        let started = app.refresh_started.unwrap();

        assert!(!app.tick(Instant::now()));
        assert!(app.is_loading());

        // A second request during the delay keeps the original start
        std::thread::sleep(Duration::from_millis(5));
        app.request_refresh();
        assert_eq!(app.refresh_started, Some(started));

        assert!(app.tick(started + REFRESH_DELAY));
        assert!(!app.is_loading());
        assert_eq!(app.sensors.as_ref().unwrap().len(), 10);
    }

    #[test]
    fn test_selection_clamps_to_visible() {
        let dir = tempdir().unwrap();
        let (_tx, mut app) = app_with_fleet(dir.path());

        app.select_next_n(100);
        assert_eq!(app.selected_index, 9);
        app.select_prev_n(100);
        assert_eq!(app.selected_index, 0);
        app.select_last();
        assert_eq!(app.selected_index, 9);
    }

    #[test]
    fn test_default_sort_is_by_id() {
        let dir = tempdir().unwrap();
        let (_tx, app) = app_with_fleet(dir.path());

        assert_eq!(app.sort_column, SortColumn::Id);
        let ids: Vec<&str> = app.visible_sensors().iter().map(|(_, s)| s.id.as_str()).collect();
        assert_eq!(ids[0], "sensor-001");
        assert_eq!(ids[1], "sensor-002");
        assert_eq!(ids[9], "sensor-010");
    }

    #[test]
    fn test_filter_matches_status_and_name() {
        let dir = tempdir().unwrap();
        let (_tx, mut app) = app_with_fleet(dir.path());

        for c in "maintenance".chars() {
            app.filter_push(c);
        }
        let visible = app.visible_sensors();
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|(_, s)| s.status == SensorStatus::Maintenance));

        app.clear_filter();
        for c in "sensor 10".chars() {
            app.filter_push(c);
        }
        assert_eq!(app.selected_sensor().unwrap().id, "sensor-010");
    }

    #[test]
    fn test_detail_only_with_selection() {
        let dir = tempdir().unwrap();
        let (_tx, mut app) = app_with_fleet(dir.path());

        app.enter_detail();
        assert!(!app.show_detail_overlay);

        app.set_view(View::Sensors);
        app.enter_detail();
        assert!(app.show_detail_overlay);

        app.go_back();
        assert!(!app.show_detail_overlay);
        assert_eq!(app.current_view, View::Sensors);
        app.go_back();
        assert_eq!(app.current_view, View::Dashboard);
    }

    #[test]
    fn test_export_writes_dated_file() {
        let dir = tempdir().unwrap();
        let (_tx, mut app) = app_with_fleet(dir.path());

        app.export_and_report(ExportFormat::Csv);

        let path = app.last_export.clone().unwrap();
        assert!(path.exists());
        assert!(app.get_status_message().unwrap().starts_with("Exported to"));
    }

    #[test]
    fn test_export_without_data_reports_failure() {
        let dir = tempdir().unwrap();
        let (_tx, source) = ChannelSource::create("empty");
        let mut app = App::with_theme(Box::new(source), dir.path(), Theme::dark());
        app.sensors = None;

        app.export_and_report(ExportFormat::Json);

        assert!(app.last_export.is_none());
        assert!(app.get_status_message().unwrap().starts_with("Export failed"));
    }
}
