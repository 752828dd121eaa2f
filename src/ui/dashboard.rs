//! Dashboard view rendering.
//!
//! Stat cards across the top, then the level distribution and the
//! water-quality score.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{classify, FleetSummary, SensorRecord, TemperatureBand, TurbidityLevel};

use super::common::gauge_bar;

/// Render the Dashboard view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let (Some(sensors), Some(summary)) = (app.sensors.as_deref(), app.summary()) else {
        return;
    };

    let chunks = Layout::vertical([Constraint::Length(5), Constraint::Min(8)]).split(area);
    let cards = Layout::horizontal([Constraint::Fill(1); 4]).split(chunks[0]);

    render_card(
        frame,
        app,
        cards[0],
        "Sensors",
        format!("{}", summary.total),
        format!("{} online", summary.online),
        Style::default().add_modifier(Modifier::BOLD),
    );

    let level = classify(summary.avg_turbidity);
    render_card(
        frame,
        app,
        cards[1],
        "Avg Turbidity",
        format!("{:.1} NTU", summary.avg_turbidity),
        level.label().to_string(),
        app.theme.level_style(level),
    );

    let band = TemperatureBand::classify(summary.avg_temperature);
    render_card(
        frame,
        app,
        cards[2],
        "Avg Temperature",
        format!("{:.1}°C", summary.avg_temperature),
        band.label().to_string(),
        Style::default().fg(app.theme.highlight),
    );

    render_card(
        frame,
        app,
        cards[3],
        "Avg Battery",
        format!("{:.0}%", summary.avg_battery),
        format!("{} offline, {} maint", summary.offline, summary.maintenance),
        Style::default().fg(app.theme.highlight),
    );

    let bottom = Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).split(chunks[1]);
    render_distribution(frame, app, bottom[0], &summary);
    render_quality(frame, app, bottom[1], sensors, &summary);
}

fn render_card(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    title: &str,
    value: String,
    caption: String,
    value_style: Style,
) {
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let lines = vec![
        Line::from(Span::styled(value, value_style.add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(caption, Style::default().add_modifier(Modifier::DIM))),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_distribution(frame: &mut Frame, app: &App, area: Rect, summary: &FleetSummary) {
    let bar_width = area.width.saturating_sub(28).max(4) as usize;
    let total = summary.total.max(1) as f64;

    let lines: Vec<Line> = TurbidityLevel::ALL
        .iter()
        .map(|level| {
            let count = summary.count_at(*level);
            Line::from(vec![
                Span::styled(format!(" {:<10}", level.label()), app.theme.level_style(*level)),
                Span::raw(format!("{:>8} ", level.range())),
                Span::styled(
                    gauge_bar(count as f64 / total, bar_width),
                    app.theme.level_style(*level),
                ),
                Span::raw(format!(" {}", count)),
            ])
        })
        .collect();

    let block = Block::default()
        .title(" Turbidity Levels ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_quality(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    sensors: &[SensorRecord],
    summary: &FleetSummary,
) {
    let score = summary.quality_score();
    let level = classify(summary.avg_turbidity);
    let bar_width = area.width.saturating_sub(16).max(4) as usize;

    let mut lines = vec![
        Line::from(vec![
            Span::raw(" Quality score "),
            Span::styled(format!("{:.0}/100", score), app.theme.level_style(level)),
        ]),
        Line::from(Span::styled(
            format!(" {}", gauge_bar(score / 100.0, bar_width)),
            app.theme.level_style(level),
        )),
        Line::from(""),
    ];

    if let Some(record) = summary.most_turbid.and_then(|i| sensors.get(i)) {
        let level = classify(record.turbidity);
        lines.push(Line::from(vec![
            Span::raw(" Most turbid  "),
            Span::styled(record.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {:.1} NTU", record.turbidity), app.theme.level_style(level)),
        ]));
    }
    if let Some(record) = summary.warmest.and_then(|i| sensors.get(i)) {
        lines.push(Line::from(vec![
            Span::raw(" Warmest      "),
            Span::styled(record.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("  {:.1}°C", record.water_temperature)),
        ]));
    }

    let block = Block::default()
        .title(" Water Quality ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
