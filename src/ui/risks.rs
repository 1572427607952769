//! High-risk records: the most delayed projects and the lowest first
//! inspection pass rates.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::{Dataset, Metric, Severity, OFFENDER_ROWS};

/// Render both offender tables, stacked.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let chunks = Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);

    let delay_title = format!(
        " 开发延迟最严重 (> {}天, 前{}) ",
        app.query.thresholds.delay_days, OFFENDER_ROWS
    );
    render_table(
        frame,
        app,
        &data.delayed,
        Metric::DevDelayDays,
        Severity::Critical,
        &delay_title,
        chunks[0],
    );

    let quality_title = format!(
        " 一验合格率最低 (< {}%, 前{}) ",
        app.query.thresholds.quality_pct, OFFENDER_ROWS
    );
    render_table(
        frame,
        app,
        &data.low_quality,
        Metric::FirstInspectionPassRate,
        Severity::Warning,
        &quality_title,
        chunks[1],
    );
}

fn render_table(
    frame: &mut Frame,
    app: &App,
    records: &Dataset,
    metric: Metric,
    severity: Severity,
    title: &str,
    area: Rect,
) {
    if records.is_empty() {
        render_clear_message(frame, app, title, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("日期"),
        Cell::from("部门"),
        Cell::from("负责人"),
        Cell::from(metric.label()),
        Cell::from("新品开发成功率"),
        Cell::from("滞销库存率"),
    ])
    .height(1)
    .style(app.theme.header);

    let status_style = app.theme.status_style(severity);
    let rows: Vec<Row> = records
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(r.date.to_string()),
                Cell::from(r.department.name()),
                Cell::from(r.owner.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
                Cell::from(metric.format(metric.value(r))).style(status_style),
                Cell::from(Metric::DevSuccessRate.format(r.dev_success_rate)),
                Cell::from(Metric::DeadStockRate.format(r.dead_stock_rate)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(app.theme.status_style(severity)),
    );

    frame.render_widget(table, area);
}

fn render_clear_message(frame: &mut Frame, app: &App, title: &str, area: Rect) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.ok));

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("    ✓ ", Style::default().fg(app.theme.ok)),
            Span::styled(
                "没有超出阈值的记录",
                Style::default().fg(app.theme.ok).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
