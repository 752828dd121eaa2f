//! Map view rendering.
//!
//! Plots each sensor at its coordinates on a canvas, colored on a
//! green-yellow-red scale spanning the turbidity values present, with a
//! legend alongside.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Block, Borders, Paragraph,
    },
    Frame,
};

use crate::app::App;
use crate::data::{color_for, LegendScale, SensorRecord, TurbidityLevel};

use super::common::swatch;
use super::theme::rgb;

/// Padding around the plotted sensors, in degrees.
const MARGIN_DEG: f64 = 0.01;

/// Area shown when there is nothing to plot (central Cambridge).
const DEFAULT_BOUNDS: ([f64; 2], [f64; 2]) = ([0.08, 0.17], [52.17, 52.23]);

/// Number of cells in the legend gradient.
const GRADIENT_STEPS: usize = 20;

/// Render the Map view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref sensors) = app.sensors else {
        return;
    };

    let chunks = Layout::horizontal([Constraint::Min(30), Constraint::Length(30)]).split(area);

    let scale = LegendScale::from_records(sensors);
    let (x_bounds, y_bounds) = map_bounds(sensors);
    let selected_id = app.selected_sensor().map(|s| s.id.clone());

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(" River Cam Sensors ")
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            for sensor in sensors.iter() {
                let color = rgb(scale.color_at(sensor.turbidity));
                let (x, y) = (sensor.location.lng, sensor.location.lat);

                ctx.draw(&Points {
                    coords: &[(x, y)],
                    color,
                });

                let selected = selected_id.as_deref() == Some(sensor.id.as_str());
                let marker = if selected { "◉" } else { "●" };
                ctx.print(x, y, Span::styled(marker, Style::default().fg(color)));

                if selected {
                    ctx.print(
                        x,
                        y,
                        Span::styled(
                            format!("  {} {:.1} NTU", sensor.name, sensor.turbidity),
                            Style::default().fg(color).add_modifier(Modifier::BOLD),
                        ),
                    );
                }
            }
        });

    frame.render_widget(canvas, chunks[0]);
    render_legend(frame, app, chunks[1], &scale);
}

/// Longitude and latitude bounds enclosing every sensor.
pub fn map_bounds(sensors: &[SensorRecord]) -> ([f64; 2], [f64; 2]) {
    if sensors.is_empty() {
        return DEFAULT_BOUNDS;
    }

    let (mut min_lng, mut max_lng) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
    for sensor in sensors {
        min_lng = min_lng.min(sensor.location.lng);
        max_lng = max_lng.max(sensor.location.lng);
        min_lat = min_lat.min(sensor.location.lat);
        max_lat = max_lat.max(sensor.location.lat);
    }

    (
        [min_lng - MARGIN_DEG, max_lng + MARGIN_DEG],
        [min_lat - MARGIN_DEG, max_lat + MARGIN_DEG],
    )
}

/// Colors of the legend gradient, low to high.
pub fn gradient(scale: &LegendScale, steps: usize) -> Vec<crate::data::Rgb> {
    if steps < 2 {
        return vec![scale.color_at(scale.min)];
    }
    (0..steps)
        .map(|i| {
            let t = i as f64 / (steps - 1) as f64;
            scale.color_at(scale.min + (scale.max - scale.min) * t)
        })
        .collect()
}

fn render_legend(frame: &mut Frame, app: &App, area: Rect, scale: &LegendScale) {
    let gradient_line = Line::from(
        gradient(scale, GRADIENT_STEPS)
            .into_iter()
            .map(|color| Span::styled("█", Style::default().fg(rgb(color))))
            .collect::<Vec<_>>(),
    );

    let range_line = Line::from(vec![
        Span::raw(format!("{:<10.1}", scale.min)),
        Span::raw(format!("{:>10.1}", scale.max)),
    ]);

    let mut lines = vec![
        Line::from(Span::styled("Turbidity (NTU)", app.theme.header)),
        gradient_line,
        range_line,
        Line::from(""),
        Line::from(Span::styled("Levels", app.theme.header)),
    ];

    for level in TurbidityLevel::ALL {
        lines.push(Line::from(vec![
            swatch(color_for(level)),
            Span::raw(format!("{:<10} {}", level.label(), level.range())),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "↑↓ select  Enter detail",
        Style::default().add_modifier(Modifier::DIM),
    )));

    let block = Block::default()
        .title(" Legend ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::metrics::{LEGEND_HIGH, LEGEND_LOW};
    use crate::data::seed::default_fleet;
    use chrono::Utc;

    #[test]
    fn test_bounds_enclose_fleet() {
        let fleet = default_fleet(Utc::now());
        let ([min_lng, max_lng], [min_lat, max_lat]) = map_bounds(&fleet);

        for sensor in &fleet {
            assert!(sensor.location.lng > min_lng && sensor.location.lng < max_lng);
            assert!(sensor.location.lat > min_lat && sensor.location.lat < max_lat);
        }
    }

    #[test]
    fn test_bounds_default_when_empty() {
        assert_eq!(map_bounds(&[]), DEFAULT_BOUNDS);
    }

    #[test]
    fn test_gradient_endpoints() {
        let scale = LegendScale::new(10.0, 50.0);
        let colors = gradient(&scale, 5);
        assert_eq!(colors.len(), 5);
        assert_eq!(colors[0], LEGEND_LOW);
        assert_eq!(colors[4], LEGEND_HIGH);
    }

    #[test]
    fn test_gradient_degenerate_is_constant() {
        let scale = LegendScale::new(20.0, 20.0);
        assert!(gradient(&scale, 4).iter().all(|c| *c == LEGEND_LOW));
    }
}
