//! Info view rendering: what turbidity is and how readings are graded.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::metrics::turbidity_score;
use crate::data::{color_for, SensorStatus, TemperatureBand, TurbidityLevel};

use super::common::swatch;

const ABOUT: &str = "Turbidity is the cloudiness of water caused by suspended particles. \
It is measured in Nephelometric Turbidity Units (NTU) by shining light through a sample \
and measuring how much is scattered. High turbidity reduces light for aquatic plants, \
carries pollutants and signals runoff or erosion upstream.";

/// Render the Info view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).split(area);
    let left = Layout::vertical([Constraint::Length(8), Constraint::Min(8)]).split(chunks[0]);

    let block = |title: &'static str| {
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border))
    };

    let about = Paragraph::new(ABOUT)
        .wrap(Wrap { trim: true })
        .block(block(" About Turbidity "));
    frame.render_widget(about, left[0]);

    let mut levels = Vec::new();
    for level in TurbidityLevel::ALL {
        levels.push(Line::from(vec![
            swatch(color_for(level)),
            Span::styled(format!("{:<10}", level.label()), app.theme.level_style(level)),
            Span::raw(format!(" {}", level.range())),
        ]));
        levels.push(Line::from(Span::styled(
            format!("   {}", level.description()),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }
    let levels = Paragraph::new(levels)
        .wrap(Wrap { trim: false })
        .block(block(" Turbidity Levels "));
    frame.render_widget(levels, left[1]);

    let right = Layout::vertical([Constraint::Min(8), Constraint::Length(7)]).split(chunks[1]);

    let mut bands = Vec::new();
    for band in TemperatureBand::ALL {
        bands.push(Line::from(vec![
            Span::styled(format!(" {:<10}", band.label()), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(" {}", band.range())),
        ]));
        bands.push(Line::from(Span::styled(
            format!("   {}", band.description()),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }
    let bands = Paragraph::new(bands)
        .wrap(Wrap { trim: false })
        .block(block(" Water Temperature "));
    frame.render_widget(bands, right[0]);

    let mut status_lines = Vec::new();
    for status in SensorStatus::ALL {
        status_lines.push(Line::from(vec![
            Span::styled(format!(" {:<12}", status.label()), app.theme.status_style(status)),
            Span::styled(status.description(), Style::default().add_modifier(Modifier::DIM)),
        ]));
    }
    if let Some(summary) = app.summary() {
        status_lines.push(Line::from(""));
        status_lines.push(Line::from(format!(
            " Fleet turbidity score {:.0}/100",
            turbidity_score(summary.avg_turbidity)
        )));
    }
    let statuses = Paragraph::new(status_lines).block(block(" Sensor Status "));
    frame.render_widget(statuses, right[1]);
}
