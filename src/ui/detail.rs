//! Detail overlay rendering.
//!
//! Displays a modal overlay with the readings, classification and recent
//! turbidity history of the selected sensor.

use chrono::{SecondsFormat, Utc};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Sparkline},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_time_ago;
use crate::data::{classify, TemperatureBand};

use super::common::{centered, gauge_bar};
use super::sensors::format_battery;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 18;

/// Render the sensor detail as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(sensor) = app.selected_sensor() else {
        return;
    };

    let overlay_width = (area.width * 80 / 100).clamp(MIN_OVERLAY_WIDTH, 90);
    let overlay_height = (area.height * 80 / 100).clamp(MIN_OVERLAY_HEIGHT, 26);
    let overlay_area = centered(area, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(4), // Identity
        Constraint::Length(8), // Readings
        Constraint::Min(4),    // History
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    // ===== HEADER =====
    let header_lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", sensor.name), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!("({})", sensor.id), Style::default().add_modifier(Modifier::DIM)),
        ]),
        Line::from(vec![
            Span::raw(" Status: "),
            Span::styled(sensor.status.label(), app.theme.status_style(sensor.status)),
            Span::styled(
                format!("  {}", sensor.status.description()),
                Style::default().add_modifier(Modifier::DIM),
            ),
        ]),
    ];

    let header = Paragraph::new(header_lines).block(
        Block::default()
            .title(" Sensor Detail ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.highlight)),
    );
    frame.render_widget(header, chunks[0]);

    // ===== READINGS =====
    let level = classify(sensor.turbidity);
    let band = TemperatureBand::classify(sensor.water_temperature);
    let battery_ratio = sensor.battery_level.map(|b| b as f64 / 100.0).unwrap_or(0.0);
    let trend = app.history.trend(&sensor.id).map(|t| t.symbol()).unwrap_or("");

    let readings = vec![
        Line::from(vec![
            Span::raw(" Turbidity    "),
            Span::styled(
                format!("{:.1} NTU {}", sensor.turbidity, trend),
                app.theme.level_style(level).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(level.label(), app.theme.level_style(level)),
        ]),
        Line::from(Span::styled(
            format!("              {}", level.description()),
            Style::default().add_modifier(Modifier::DIM),
        )),
        Line::from(vec![
            Span::raw(" Temperature  "),
            Span::styled(
                format!("{:.1}°C", sensor.water_temperature),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  {} ({})", band.label(), band.range())),
        ]),
        Line::from(vec![
            Span::raw(" Battery      "),
            Span::raw(format!("{} {}", gauge_bar(battery_ratio, 10), format_battery(sensor.battery_level))),
        ]),
        Line::from(format!(
            " Location     {:.6}, {:.6}",
            sensor.location.lat, sensor.location.lng
        )),
        Line::from(format!(
            " Updated      {} ({})",
            sensor.last_updated.to_rfc3339_opts(SecondsFormat::Secs, true),
            format_time_ago(sensor.last_updated, Utc::now())
        )),
    ];

    let readings_block = Block::default()
        .title(" Readings ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    frame.render_widget(Paragraph::new(readings).block(readings_block), chunks[1]);

    // ===== HISTORY =====
    let values: Vec<u64> = app
        .history
        .turbidity
        .get(&sensor.id)
        .map(|readings| readings.iter().map(|t| (t * 10.0).round() as u64).collect())
        .unwrap_or_default();

    let history_block = Block::default()
        .title(format!(" Turbidity History ({} readings) ", values.len()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if values.len() < 2 {
        let empty = Paragraph::new(Line::from(Span::styled(
            "  Waiting for more readings",
            Style::default().add_modifier(Modifier::DIM),
        )))
        .block(history_block);
        frame.render_widget(empty, chunks[2]);
    } else {
        let sparkline = Sparkline::default()
            .block(history_block)
            .data(&values)
            .style(app.theme.level_style(level));
        frame.render_widget(sparkline, chunks[2]);
    }

    // ===== FOOTER =====
    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " ↑↓ next sensor | Press Esc to close ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, chunks[3]);
}
