//! Terminal UI rendering using ratatui.
//!
//! This module contains all the view-specific rendering logic for the TUI.
//! Each view is implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`dashboard`]: Stat cards, level distribution and quality score
//! - [`map`]: Sensor positions on a canvas with a turbidity legend
//! - [`sensors`]: Sortable, filterable table of every sensor
//! - [`export`]: CSV/JSON export panel
//! - [`info`]: Reference page for levels, temperature bands and statuses
//! - [`detail`]: Modal overlay showing one sensor in depth
//! - [`common`]: Shared components (header, tabs, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! The main loop in `main.rs` calls into these modules based on the current view:
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ View Content                         │
//! │ (dashboard/map/sensors/...::render)  │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlays rendered on top:
//!    - detail::render_overlay
//!    - common::render_help
//! ```

pub mod common;
pub mod dashboard;
pub mod detail;
pub mod export;
pub mod info;
pub mod map;
pub mod sensors;
pub mod theme;

use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, View};

pub use sensors::SortColumn;
pub use theme::Theme;

/// Minimum terminal width for usable display.
pub const MIN_WIDTH: u16 = 60;
/// Minimum terminal height for usable display.
pub const MIN_HEIGHT: u16 = 12;

/// Rows above the first table row: header bar, tabs, table border and header.
pub const CONTENT_START_ROW: u16 = 3;

/// Draw one frame of the whole UI.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        let centered = Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5.min(area.height));
        frame.render_widget(paragraph, centered);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(1), // Tabs
        Constraint::Min(8),    // Content
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    common::render_tabs(frame, app, chunks[1]);

    match app.current_view {
        View::Dashboard => dashboard::render(frame, app, chunks[2]),
        View::Map => map::render(frame, app, chunks[2]),
        View::Sensors => sensors::render(frame, app, chunks[2]),
        View::Export => export::render(frame, app, chunks[2]),
        View::Info => info::render(frame, app, chunks[2]),
    }

    common::render_status_bar(frame, app, chunks[3]);

    if app.show_detail_overlay {
        detail::render_overlay(frame, app, area);
    }

    if app.show_help {
        common::render_help(frame, app, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::seed::default_fleet;
    use crate::source::ChannelSource;
    use chrono::Utc;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn app() -> (tokio::sync::watch::Sender<crate::data::Snapshot>, App) {
        let (tx, source) = ChannelSource::create("test");
        tx.send_replace(default_fleet(Utc::now()));
        let mut app = App::with_theme(Box::new(source), std::env::temp_dir(), Theme::dark());
        app.reload_data().unwrap();
        (tx, app)
    }

    fn render_to_text(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_every_view_renders() {
        let (_tx, mut app) = app();
        for view in View::ALL {
            app.set_view(view);
            let text = render_to_text(&app, 120, 40);
            assert!(text.contains("TURBIDITY WATCH"), "header missing in {:?}", view);
        }
    }

    #[test]
    fn test_sensors_view_lists_sensors() {
        let (_tx, mut app) = app();
        app.set_view(View::Sensors);
        let text = render_to_text(&app, 140, 40);
        assert!(text.contains("sensor-001"));
        assert!(text.contains("sensor-010"));
    }

    #[test]
    fn test_overlays_render() {
        let (_tx, mut app) = app();
        app.set_view(View::Sensors);
        app.enter_detail();
        let text = render_to_text(&app, 120, 40);
        assert!(text.contains("Sensor Detail"));

        app.close_overlay();
        app.toggle_help();
        let text = render_to_text(&app, 120, 40);
        assert!(text.contains("Keyboard Shortcuts"));
    }

    #[test]
    fn test_small_terminal_shows_notice() {
        let (_tx, app) = app();
        let text = render_to_text(&app, 40, 10);
        assert!(text.contains("Terminal too small"));
    }
}
