//! Terminal UI rendering using ratatui.
//!
//! Each view is implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`overview`]: KPI tiles and the alert list
//! - [`trend`]: daily trend line charts
//! - [`owners`]: sortable, searchable per-owner KPI table
//! - [`risks`]: most delayed and lowest first-pass-rate records
//! - [`detail`]: modal overlay with one owner's KPIs and recent records
//! - [`common`]: shared components (header, tabs, status bar, help overlay)
//! - [`theme`]: light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ View Content                         │
//! │ (overview/trend/owners/risks)        │
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
pub mod detail;
pub mod overview;
pub mod owners;
pub mod risks;
pub mod theme;
pub mod trend;

pub use owners::OwnerSortColumn;
pub use theme::Theme;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    Frame,
};

use crate::app::{App, View};

/// Height of the header and tab bars above the content area.
pub const CONTENT_TOP: u16 = 2;

/// Render the whole screen for the current state.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
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
        View::Overview => overview::render(frame, app, chunks[2]),
        View::Trend => trend::render(frame, app, chunks[2]),
        View::Owners => owners::render(frame, app, chunks[2]),
        View::Risks => risks::render(frame, app, chunks[2]),
    }

    common::render_status_bar(frame, app, chunks[3]);

    if app.show_detail_overlay {
        detail::render_overlay(frame, app, area);
    }
    if app.show_help {
        common::render_help(frame, app, area);
    }
}

/// A `width` x `height` rectangle centred in `area`, shrunk to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

/// Placeholder for a missing value.
pub const NO_VALUE: &str = "-";
