//! Light and dark colour themes, picked from the terminal background.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::Severity;

/// Colours and styles shared by every view.
///
/// Severity colours are the same in both variants so red keeps meaning
/// "over threshold"; the accent, muted and selection colours follow the
/// terminal background.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent for titles, the active tab and status messages.
    pub highlight: Color,
    pub warning: Color,
    pub critical: Color,
    /// KPIs within their thresholds.
    pub ok: Color,
    pub border: Color,
    /// Trend chart line colours, cycled per series.
    pub series: [Color; 5],
    pub header: Style,
    pub selected: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
    pub border_type: BorderType,
}

impl Theme {
    fn with_accent(accent: Color, muted: Color, selection: Color, series: [Color; 5]) -> Self {
        let accent_bold = Style::default().fg(accent).add_modifier(Modifier::BOLD);
        Self {
            highlight: accent,
            warning: Color::Yellow,
            critical: Color::Red,
            ok: Color::Green,
            border: muted,
            series,
            header: accent_bold,
            selected: Style::default().bg(selection).add_modifier(Modifier::BOLD),
            tab_active: accent_bold.add_modifier(Modifier::UNDERLINED),
            tab_inactive: Style::default().fg(muted),
            border_type: BorderType::Rounded,
        }
    }

    /// For dark terminal backgrounds.
    pub fn dark() -> Self {
        Self::with_accent(
            Color::LightCyan,
            Color::Gray,
            Color::DarkGray,
            [
                Color::LightCyan,
                Color::LightMagenta,
                Color::LightGreen,
                Color::LightYellow,
                Color::LightBlue,
            ],
        )
    }

    /// For light terminal backgrounds.
    pub fn light() -> Self {
        Self::with_accent(
            Color::Blue,
            Color::DarkGray,
            Color::LightBlue,
            [
                Color::Blue,
                Color::Magenta,
                Color::Green,
                Color::Red,
                Color::Black,
            ],
        )
    }

    /// Pick a variant from the terminal's background luminance, falling
    /// back to dark when it cannot be queried.
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn status_style(&self, severity: Severity) -> Style {
        match severity {
            Severity::Ok => Style::default().fg(self.ok),
            Severity::Warning => Style::default().fg(self.warning),
            Severity::Critical => Style::default().fg(self.critical).add_modifier(Modifier::BOLD),
        }
    }

    /// Colour for the `index`th chart series.
    pub fn series_color(&self, index: usize) -> Color {
        self.series[index % self.series.len()]
    }
}
