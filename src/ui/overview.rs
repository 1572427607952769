//! Overview: headline KPI tiles and the alert list.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{DashboardData, Kpi, Severity, Thresholds};

/// KPIs shown as large tiles, with their alert thresholds.
pub const HEADLINE_KPIS: [Kpi; 4] = [
    Kpi::AvgDevDelayDays,
    Kpi::DevSuccessRate,
    Kpi::FirstInspectionPassRate,
    Kpi::DeadStockRate,
];

/// KPIs shown in the secondary row, without thresholds.
pub const SECONDARY_KPIS: [Kpi; 3] = [
    Kpi::SourcingComplianceRate,
    Kpi::InventoryTurnoverDays,
    Kpi::LogisticsDelayDays,
];

/// Threshold text for a headline KPI tile.
pub fn threshold_label(kpi: Kpi, thresholds: &Thresholds) -> Option<String> {
    match kpi {
        Kpi::AvgDevDelayDays => Some(format!("阈值 > {}天", thresholds.delay_days)),
        Kpi::DevSuccessRate | Kpi::FirstInspectionPassRate => {
            Some(format!("阈值 < {}%", thresholds.quality_pct))
        }
        Kpi::DeadStockRate => Some(format!("阈值 > {}%", thresholds.inventory_pct)),
        _ => None,
    }
}

/// Render the overview.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(5), // Headline tiles
        Constraint::Length(4), // Secondary tiles
        Constraint::Min(3),    // Alerts
    ])
    .split(area);

    let headline = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(chunks[0]);
    for (kpi, tile) in HEADLINE_KPIS.iter().zip(headline.iter()) {
        render_tile(frame, app, data, *kpi, *tile);
    }

    let secondary = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(chunks[1]);
    for (kpi, tile) in SECONDARY_KPIS.iter().zip(secondary.iter()) {
        render_tile(frame, app, data, *kpi, *tile);
    }

    render_alerts(frame, app, data, chunks[2]);
}

fn render_tile(frame: &mut Frame, app: &App, data: &DashboardData, kpi: Kpi, area: Rect) {
    let severity = data.kpi_severity(kpi);
    let value = data
        .kpis
        .as_ref()
        .map(|k| kpi.format(k.get(kpi)))
        .unwrap_or_else(|| super::NO_VALUE.to_string());

    let value_style = if data.kpis.is_some() {
        app.theme.status_style(severity).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    let mut lines = vec![Line::from(Span::styled(value, value_style))];
    if let Some(threshold) = threshold_label(kpi, &app.query.thresholds) {
        lines.push(Line::from(Span::styled(
            threshold,
            Style::default().add_modifier(Modifier::DIM),
        )));
    }

    let border_style = if severity == Severity::Ok {
        Style::default().fg(app.theme.border)
    } else {
        app.theme.status_style(severity)
    };

    let block = Block::default()
        .title(format!(" {} ", kpi.label()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(border_style);

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_alerts(frame: &mut Frame, app: &App, data: &DashboardData, area: Rect) {
    let block = Block::default()
        .title(format!(" 预警 ({}) ", data.alerts.len()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if data.kpis.is_none() {
        let paragraph = Paragraph::new(" 当前筛选条件下没有记录")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    if data.alerts.is_empty() {
        let paragraph = Paragraph::new(format!(" {} 所有指标均在阈值范围内", Severity::Ok.marker()))
            .style(app.theme.status_style(Severity::Ok))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = data
        .alerts
        .iter()
        .map(|alert| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" {:<4} ", alert.severity.symbol()),
                    app.theme.status_style(alert.severity),
                ),
                Span::raw(alert.to_string()),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
