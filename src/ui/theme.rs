//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.
//! Turbidity levels always use their fixed badge colors, whatever the theme.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::{color_for, Rgb, SensorStatus, TurbidityLevel};

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for online sensors.
    pub online: Color,
    /// Color for offline sensors.
    pub offline: Color,
    /// Color for sensors under maintenance.
    pub maintenance: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Color of the river and grid on the map.
    pub water: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            online: Color::Green,
            offline: Color::Red,
            maintenance: Color::Yellow,
            border: Color::Gray,
            water: Color::Blue,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            online: Color::Green,
            offline: Color::Red,
            maintenance: Color::Yellow,
            border: Color::DarkGray,
            water: Color::LightBlue,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Get style for a sensor status
    pub fn status_style(&self, status: SensorStatus) -> Style {
        match status {
            SensorStatus::Online => Style::default().fg(self.online),
            SensorStatus::Offline => Style::default().fg(self.offline).add_modifier(Modifier::BOLD),
            SensorStatus::Maintenance => Style::default().fg(self.maintenance),
        }
    }

    /// Badge style for a turbidity level.
    pub fn level_style(&self, level: TurbidityLevel) -> Style {
        Style::default().fg(rgb(color_for(level)))
    }
}

/// Terminal color for an sRGB value.
pub fn rgb(color: Rgb) -> Color {
    Color::Rgb(color.0, color.1, color.2)
}
