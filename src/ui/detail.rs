//! Owner detail overlay.
//!
//! Shows the selected owner's KPIs and their most recent records.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::{Metric, OWNER_DETAIL_ROWS};
use crate::ui::owners::OWNER_KPIS;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 16;

/// Metrics listed per record in the overlay table.
const DETAIL_METRICS: [Metric; 5] = [
    Metric::DevDelayDays,
    Metric::DevSuccessRate,
    Metric::FirstInspectionPassRate,
    Metric::DeadStockRate,
    Metric::LogisticsDelayDays,
];

/// Render the selected owner's detail as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(ref data) = app.data else {
        return;
    };
    let Some(owner) = app.selected_owner() else {
        return;
    };

    let overlay_width = percent_of(area.width, 95).clamp(MIN_OVERLAY_WIDTH, 120);
    let overlay_height = percent_of(area.height, 90).clamp(MIN_OVERLAY_HEIGHT, 24);
    let overlay_area = super::centered(area, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(4), // Owner KPIs
        Constraint::Min(6),    // Recent records
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    // Header
    let kpi_spans: Vec<Span> = OWNER_KPIS
        .iter()
        .flat_map(|kpi| {
            let value = owner
                .kpis
                .as_ref()
                .map(|k| kpi.format(k.get(*kpi)))
                .unwrap_or_else(|| super::NO_VALUE.to_string());
            [
                Span::raw(format!(" {}: ", kpi.label())),
                Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
                Span::raw("  "),
            ]
        })
        .collect();

    let header_lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {} ", owner.name),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("({} 条记录)", owner.records),
                Style::default().add_modifier(Modifier::DIM),
            ),
        ]),
        Line::from(kpi_spans),
    ];

    let header_block = Block::default()
        .title(" 负责人详情 ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));
    frame.render_widget(Paragraph::new(header_lines).block(header_block), chunks[0]);

    // Recent records
    let recent = data.owner_detail(&owner.name);
    let records_block = Block::default()
        .title(format!(" 最近{}条记录 ", OWNER_DETAIL_ROWS))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if recent.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  该负责人没有记录",
                Style::default().add_modifier(Modifier::DIM),
            )),
        ])
        .block(records_block);
        frame.render_widget(empty, chunks[1]);
    } else {
        let mut header_cells = vec![Cell::from("日期"), Cell::from("部门")];
        header_cells.extend(DETAIL_METRICS.iter().map(|m| Cell::from(m.label())));
        let header = Row::new(header_cells).height(1).style(app.theme.header);

        let rows: Vec<Row> = recent
            .iter()
            .map(|r| {
                let mut cells = vec![
                    Cell::from(r.date.to_string()),
                    Cell::from(r.department.name()),
                ];
                cells.extend(DETAIL_METRICS.iter().map(|m| Cell::from(m.format(m.value(r)))));
                Row::new(cells)
            })
            .collect();

        let mut widths = vec![Constraint::Length(12), Constraint::Length(8)];
        widths.extend(DETAIL_METRICS.iter().map(|_| Constraint::Fill(1)));

        let table = Table::new(rows, widths).header(header).block(records_block);
        frame.render_widget(table, chunks[1]);
    }

    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " ↑/↓:切换负责人  Esc:关闭 ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, chunks[2]);
}

/// `percent` of `len`, computed without overflowing `u16`.
fn percent_of(len: u16, percent: u16) -> u16 {
    (u32::from(len) * u32::from(percent) / 100) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_of_wide_terminal() {
        assert_eq!(percent_of(100, 95), 95);
        assert_eq!(percent_of(1000, 95), 950);
        assert_eq!(percent_of(u16::MAX, 95), 62258);
    }
}
