//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::Severity;

/// Render the header bar: overall status, selection, record and alert counts.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        let line = Line::from(vec![
            Span::styled(" 风控看板 ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("│ 加载中..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let critical = data.alert_count(Severity::Critical);
    let warning = data.alert_count(Severity::Warning);
    let status_style = app.theme.status_style(data.overall_severity());

    let count_span = |count: usize, severity: Severity| {
        if count > 0 {
            Span::styled(count.to_string(), app.theme.status_style(severity))
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        }
    };

    let line = Line::from(vec![
        Span::styled(" ● ", status_style),
        Span::styled("风控看板 ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(
            app.query.department.label(),
            Style::default().fg(app.theme.highlight),
        ),
        Span::raw(format!(" │ {} │ ", app.query.range)),
        Span::styled(
            data.dataset.len().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" 条记录 │ "),
        count_span(critical, Severity::Critical),
        Span::raw(" 严重 "),
        count_span(warning, Severity::Warning),
        Span::raw(" 警告"),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, v)| Line::from(format!(" {}:{} ", i + 1, v.label())))
        .collect();

    let selected = View::ALL.iter().position(|v| *v == app.current_view).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .padding("", "")
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the provider, time since the last recompute, thresholds and
/// context-sensitive controls. Temporary messages and load errors take
/// precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(ref err) = app.load_error {
        let paragraph = Paragraph::new(format!(" 加载失败: {} | r:重试 q:退出", err))
            .style(app.theme.status_style(Severity::Critical));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(ref data) = app.data {
        let thresholds = &app.query.thresholds;
        let controls = match app.current_view {
            View::Owners if app.filter_active => "输入以搜索 | Enter:确定 Esc:取消",
            View::Owners => "/:搜索 s:排序 S:反向 Enter:详情 ?:帮助 q:退出",
            _ => "d:部门 p:周期 r:刷新 e:导出 ?:帮助 q:退出",
        };
        format!(
            " {} | {:.1}s前更新 | 阈值 {}天/{}%/{}% | {}",
            app.source_description(),
            data.last_updated.elapsed().as_secs_f64(),
            thresholds.delay_days,
            thresholds.quality_pct,
            thresholds.inventory_pct,
            controls,
        )
    } else {
        " 加载中... | q:退出".to_string()
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

fn section(title: &str) -> Line<'static> {
    Line::from(vec![Span::styled(
        format!(" {}", title),
        Style::default().add_modifier(Modifier::BOLD),
    )])
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("快捷键", app.theme.header)]),
        Line::from(""),
        section("导航"),
        Line::from("  1-4 Tab     切换视图"),
        Line::from("  ←/→ h/l     上/下一个视图"),
        Line::from("  ↑/↓ j/k     移动选择"),
        Line::from("  Enter       负责人详情"),
        Line::from("  Esc         返回"),
        Line::from(""),
        section("筛选"),
        Line::from("  d/D         切换部门"),
        Line::from("  p/P         切换周期 (1/3/6/12月)"),
        Line::from("  [ ]         延迟阈值 -/+"),
        Line::from("  , .         质量阈值 -/+"),
        Line::from("  ; '         库存阈值 -/+"),
        Line::from(""),
        section("负责人"),
        Line::from("  /           搜索"),
        Line::from("  c           清除搜索"),
        Line::from("  s/S         排序列/方向"),
        Line::from(""),
        section("通用"),
        Line::from("  r           重新加载数据"),
        Line::from("  e           导出CSV"),
        Line::from("  x           导出JSON报告"),
        Line::from("  q           退出"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "按任意键关闭",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" 帮助 ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let height = help_text.len() as u16 + 2;
    let help_area = super::centered(area, 42, height.min(area.height.saturating_sub(2)));

    frame.render_widget(Clear, help_area);
    frame.render_widget(Paragraph::new(help_text).block(block), help_area);
}
