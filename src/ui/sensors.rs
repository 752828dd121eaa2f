//! Sensors view rendering.
//!
//! Displays a table of all sensors with status, readings, battery,
//! sparkline trends and time since the last update.

use std::cmp::Ordering;

use chrono::Utc;
use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_time_ago;
use crate::data::{classify, SensorRecord};

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Column to sort by in the Sensors view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    /// Sort by sensor id.
    #[default]
    Id,
    /// Sort by display name alphabetically.
    Name,
    /// Sort by turbidity reading.
    Turbidity,
    /// Sort by water temperature.
    Temperature,
    /// Sort by battery level (missing readings first).
    Battery,
    /// Sort by status.
    Status,
}

impl SortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            SortColumn::Id => SortColumn::Name,
            SortColumn::Name => SortColumn::Turbidity,
            SortColumn::Turbidity => SortColumn::Temperature,
            SortColumn::Temperature => SortColumn::Battery,
            SortColumn::Battery => SortColumn::Status,
            SortColumn::Status => SortColumn::Id,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::Name => "name",
            SortColumn::Turbidity => "turbidity",
            SortColumn::Temperature => "temp",
            SortColumn::Battery => "battery",
            SortColumn::Status => "status",
        }
    }
}

/// Render the Sensors view showing all sensors in a sortable table.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref sensors) = app.sensors else {
        return;
    };

    let visible = app.visible_sensors();
    let now = Utc::now();

    let header = Row::new(vec![
        Cell::from(format_header("ID", SortColumn::Id, app)),
        Cell::from(format_header("Name", SortColumn::Name, app)),
        Cell::from(format_header("NTU", SortColumn::Turbidity, app)),
        Cell::from("Level"),
        Cell::from(format_header("Temp", SortColumn::Temperature, app)),
        Cell::from(format_header("Battery", SortColumn::Battery, app)),
        Cell::from("Trend"),
        Cell::from(format_header("Status", SortColumn::Status, app)),
        Cell::from("Updated"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = visible
        .iter()
        .map(|(_, s)| {
            let level = classify(s.turbidity);
            let sparkline = render_sparkline(&app.history.sparkline(&s.id));
            let trend = app.history.trend(&s.id).map(|t| t.symbol()).unwrap_or(" ");

            Row::new(vec![
                Cell::from(s.id.clone()),
                Cell::from(s.name.clone()),
                Cell::from(format!("{:.1}", s.turbidity)).style(app.theme.level_style(level)),
                Cell::from(level.label()).style(app.theme.level_style(level)),
                Cell::from(format!("{:.1}°C", s.water_temperature)),
                Cell::from(format_battery(s.battery_level)),
                Cell::from(format!("{}{}", sparkline, trend)),
                Cell::from(s.status.label()).style(app.theme.status_style(s.status)),
                Cell::from(format_time_ago(s.last_updated, now)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(10),  // ID
        Constraint::Fill(2),  // Name
        Constraint::Min(6),   // NTU
        Constraint::Min(9),   // Level
        Constraint::Min(7),   // Temp
        Constraint::Min(7),   // Battery
        Constraint::Min(9),   // Sparkline + arrow
        Constraint::Min(11),  // Status
        Constraint::Fill(1),  // Updated
    ];

    let selected_visual_index = app.selected_index.min(visible.len().saturating_sub(1));
    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let position_info = if !visible.is_empty() {
        format!(" [{}/{}]", selected_visual_index + 1, visible.len())
    } else {
        String::new()
    };

    let title = format!(
        " Sensors ({}/{}) [s:sort {}{}]{}{} ",
        visible.len(),
        sensors.len(),
        app.sort_column.label(),
        sort_dir,
        filter_info,
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected_visual_index));

    frame.render_stateful_widget(table, area, &mut state);
}

fn format_header(name: &str, col: SortColumn, app: &App) -> Span<'static> {
    if app.sort_column == col {
        let arrow = if app.sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

/// Sort sensors by the given column and direction.
pub fn sort_sensors_by(
    sensors: &mut [(usize, &SensorRecord)],
    column: SortColumn,
    ascending: bool,
) {
    sensors.sort_by(|a, b| {
        let primary = match column {
            SortColumn::Id => a.1.id.cmp(&b.1.id),
            SortColumn::Name => a.1.name.cmp(&b.1.name),
            SortColumn::Turbidity => a.1.turbidity.total_cmp(&b.1.turbidity),
            SortColumn::Temperature => a.1.water_temperature.total_cmp(&b.1.water_temperature),
            SortColumn::Battery => a.1.battery_level.cmp(&b.1.battery_level),
            SortColumn::Status => a.1.status.cmp(&b.1.status),
        };

        let primary = if ascending {
            primary
        } else {
            primary.reverse()
        };

        // Secondary sort by id for stability when primary values are equal
        if primary == Ordering::Equal {
            a.1.id.cmp(&b.1.id)
        } else {
            primary
        }
    });
}

/// Render sparkline levels as block characters, last 8 values.
pub fn render_sparkline(data: &[u8]) -> String {
    if data.is_empty() {
        return "        ".to_string();
    }

    let values: Vec<u8> = data.iter().rev().take(8).rev().copied().collect();
    values.iter().map(|&v| SPARKLINE_CHARS[v.min(7) as usize]).collect()
}

pub fn format_battery(level: Option<u8>) -> String {
    level.map(|b| format!("{}%", b)).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::seed::default_fleet;

    #[test]
    fn test_sort_by_turbidity_descending() {
        let fleet = default_fleet(Utc::now());
        let mut rows: Vec<(usize, &SensorRecord)> = fleet.iter().enumerate().collect();

        sort_sensors_by(&mut rows, SortColumn::Turbidity, false);

        assert_eq!(rows[0].1.id, "sensor-003");
        assert!(rows
            .windows(2)
            .all(|w| w[0].1.turbidity >= w[1].1.turbidity));
    }

    #[test]
    fn test_sort_ties_break_on_id() {
        let fleet = default_fleet(Utc::now());
        let mut rows: Vec<(usize, &SensorRecord)> = fleet.iter().enumerate().collect();

        sort_sensors_by(&mut rows, SortColumn::Status, true);

        let online: Vec<&str> = rows
            .iter()
            .take_while(|(_, s)| s.is_online())
            .map(|(_, s)| s.id.as_str())
            .collect();
        assert_eq!(online, vec!["sensor-001", "sensor-004", "sensor-005", "sensor-009", "sensor-010"]);
    }

    #[test]
    fn test_sort_column_cycles() {
        let mut col = SortColumn::default();
        for _ in 0..6 {
            col = col.next();
        }
        assert_eq!(col, SortColumn::Id);
    }

    #[test]
    fn test_render_sparkline_keeps_last_eight() {
        let levels: Vec<u8> = (0..10).map(|i| (i % 8) as u8).collect();
        assert_eq!(render_sparkline(&levels), "▃▄▅▆▇█▁▂");
        assert_eq!(render_sparkline(&[]).chars().count(), 8);
    }

    #[test]
    fn test_format_battery() {
        assert_eq!(format_battery(Some(87)), "87%");
        assert_eq!(format_battery(None), "-");
    }
}
