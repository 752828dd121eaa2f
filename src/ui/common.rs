//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::{classify, SensorStatus};

use super::theme::rgb;

/// Spinner frames for the refresh indicator.
const SPINNER: [char; 4] = ['◐', '◓', '◑', '◒'];

/// Render the header bar with the fleet overview.
///
/// Displays: overall water quality, sensor counts by status, average turbidity.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(summary) = app.summary() else {
        let line = Line::from(vec![
            Span::styled(" TURBIDITY WATCH ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("| Loading..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let level = classify(summary.avg_turbidity);
    let level_style = app.theme.level_style(level);

    let count_span = |count: usize, status: SensorStatus| {
        if count > 0 {
            Span::styled(format!("{}", count), app.theme.status_style(status))
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        }
    };

    let line = Line::from(vec![
        Span::styled(" ● ", level_style),
        Span::styled("TURBIDITY WATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        count_span(summary.online, SensorStatus::Online),
        Span::raw(" online "),
        count_span(summary.offline, SensorStatus::Offline),
        Span::raw(" offline "),
        count_span(summary.maintenance, SensorStatus::Maintenance),
        Span::raw(" maint │ "),
        Span::styled(
            format!("{}", summary.total),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" sensors │ avg "),
        Span::styled(format!("{:.1} NTU", summary.avg_turbidity), level_style),
        Span::raw(format!(" ({})", level.label())),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!("{}:{}", i + 1, view.label())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.current_view.index())
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Column ranges of each tab as drawn by [`render_tabs`], for mouse hits.
pub fn tab_at_column(column: u16) -> Option<View> {
    let mut start = 0u16;
    for view in View::ALL {
        // "N:Label", one cell of padding each side, then the divider
        let width = view.label().len() as u16 + 5;
        if column < start + width {
            return Some(view);
        }
        start += width;
    }
    None
}

/// Render the status bar at the bottom.
///
/// Shows: data source, time since last update, available controls.
/// Also displays the refresh indicator, temporary status messages and errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(elapsed) = app.refresh_elapsed() {
        let frame_idx = (elapsed.as_millis() / 150) as usize % SPINNER.len();
        let paragraph = Paragraph::new(format!(" {} Refreshing sensor data...", SPINNER[frame_idx]))
            .style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(ref err) = app.load_error {
        format!(" Error: {} | q:quit r:retry", err)
    } else if let Some(updated) = app.last_updated {
        let controls = match app.current_view {
            View::Sensors if app.filter_active => "Type to search | Enter:apply Esc:cancel",
            View::Sensors => "/:search s:sort S:reverse Enter:detail r:refresh ?:help q:quit",
            View::Map => "↑↓:select Enter:detail r:refresh ?:help q:quit",
            View::Export => "e:CSV E:JSON r:refresh ?:help q:quit",
            View::Dashboard | View::Info => "Tab:switch r:refresh ?:help q:quit",
        };

        format!(
            " {} | Updated {:.1}s ago | {}",
            app.source_description(),
            updated.elapsed().as_secs_f64(),
            controls,
        )
    } else {
        " Loading... | q:quit".to_string()
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// A horizontal bar of `width` cells filled to `ratio`.
pub fn gauge_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Center a `width` x `height` rectangle inside `area`.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(title, Style::default().add_modifier(Modifier::BOLD))])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  1-5         Jump to view"),
        Line::from("  Tab ←/→     Switch views"),
        Line::from("  ↑/↓ j/k     Select sensor"),
        Line::from("  PgUp/PgDn   Jump 10 sensors"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Sensor detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        section(" Sensors"),
        Line::from("  /         Start filter/search"),
        Line::from("  c         Clear filter"),
        Line::from("  s         Cycle sort column"),
        Line::from("  S         Toggle sort direction"),
        Line::from(""),
        section(" General"),
        Line::from("  r         Refresh data"),
        Line::from("  e         Export to CSV"),
        Line::from("  E         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_area = centered(
        area,
        42u16.min(area.width.saturating_sub(4)),
        27u16.min(area.height.saturating_sub(2)),
    );

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

/// Colored swatch for a level, used by legends.
pub fn swatch(color: crate::data::Rgb) -> Span<'static> {
    Span::styled("■ ", Style::default().fg(rgb(color)))
}
