//! Export view rendering.
//!
//! Summarizes what an export will contain and where it will be written.

use chrono::Utc;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::export::{file_name, ExportFormat, CSV_HEADERS};

/// Render the Export view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).split(area);

    let now = Utc::now();
    let summary = app.summary();
    let total = summary.as_ref().map_or(0, |s| s.total);

    let mut lines = vec![
        Line::from(Span::styled("Export Sensor Data", app.theme.header)),
        Line::from(""),
        Line::from(format!(" Sensors       {}", total)),
    ];
    if let Some(ref summary) = summary {
        lines.push(Line::from(format!(
            " Online        {} of {}",
            summary.online, summary.total
        )));
        lines.push(Line::from(format!(
            " Avg turbidity {:.1} NTU",
            summary.avg_turbidity
        )));
    }
    lines.push(Line::from(format!(" Directory     {}", app.export_dir().display())));
    lines.push(Line::from(""));

    for (key, format) in [("e", ExportFormat::Csv), ("E", ExportFormat::Json)] {
        lines.push(Line::from(vec![
            Span::styled(format!(" [{}] ", key), Style::default().fg(app.theme.highlight)),
            Span::styled(
                format!("{:<5}", format.extension().to_uppercase()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(file_name(format, now)),
        ]));
    }

    if let Some(ref path) = app.last_export {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::raw(" Last export   "),
            Span::styled(path.display().to_string(), Style::default().fg(app.theme.online)),
        ]));
    }

    if total == 0 {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " No sensor data to export yet",
            Style::default().fg(app.theme.maintenance),
        )));
    }

    let panel = Paragraph::new(lines).block(
        Block::default()
            .title(" Export ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );
    frame.render_widget(panel, chunks[0]);

    let mut format_lines = vec![
        Line::from(Span::styled("CSV columns", app.theme.header)),
    ];
    format_lines.extend(CSV_HEADERS.iter().map(|h| Line::from(format!("  {}", h))));
    format_lines.push(Line::from(""));
    format_lines.push(Line::from(Span::styled("JSON document", app.theme.header)));
    format_lines.push(Line::from("  exportDate, totalSensors, sensors[]"));
    format_lines.push(Line::from(Span::styled(
        "  Replay with --replay <file>",
        Style::default().add_modifier(Modifier::DIM),
    )));

    let formats = Paragraph::new(format_lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(" Formats ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );
    frame.render_widget(formats, chunks[1]);
}
