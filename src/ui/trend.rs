//! Trend view: daily means as line charts.
//!
//! Day-valued metrics and rate metrics have different scales, so they are
//! drawn on two stacked charts sharing the date axis. Rates are plotted as
//! percentages.

use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset as ChartSeries, GraphType, LegendPosition, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{DateRange, Metric, Trend};

/// Trend metrics measured in days.
pub fn day_metrics() -> Vec<Metric> {
    Metric::TREND.into_iter().filter(|m| !m.is_rate()).collect()
}

/// Trend metrics measured as rates.
pub fn rate_metrics() -> Vec<Metric> {
    Metric::TREND.into_iter().filter(|m| m.is_rate()).collect()
}

/// Chart points for one metric: x is days since the range start, y is the
/// daily mean (scaled to percent for rates).
pub fn chart_points(trend: &Trend, metric: Metric, range: &DateRange) -> Vec<(f64, f64)> {
    let scale = if metric.is_rate() { 100.0 } else { 1.0 };
    trend
        .series(metric)
        .into_iter()
        .map(|(date, v)| (days_since(range.start(), date), v * scale))
        .collect()
}

fn days_since(start: NaiveDate, date: NaiveDate) -> f64 {
    (date - start).num_days() as f64
}

/// Render the trend view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    if data.trend.is_empty() {
        let block = Block::default()
            .title(" 趋势 ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border));
        let paragraph = Paragraph::new(" 当前筛选条件下没有记录")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let chunks = Layout::vertical([Constraint::Percentage(40), Constraint::Percentage(60)]).split(area);
    render_chart(frame, app, &data.trend, &day_metrics(), " 天数指标 (天) ", chunks[0]);
    render_chart(frame, app, &data.trend, &rate_metrics(), " 比率指标 (%) ", chunks[1]);
}

fn render_chart(frame: &mut Frame, app: &App, trend: &Trend, metrics: &[Metric], title: &str, area: Rect) {
    let range = app.query.range;
    let points: Vec<Vec<(f64, f64)>> =
        metrics.iter().map(|m| chart_points(trend, *m, &range)).collect();

    let series: Vec<ChartSeries> = metrics
        .iter()
        .zip(points.iter())
        .enumerate()
        .map(|(i, (metric, data))| {
            ChartSeries::default()
                .name(metric.label())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(app.theme.series_color(i)))
                .data(data)
        })
        .collect();

    let (lo, hi) = y_bounds(trend, metrics);
    let x_max = (range.days().saturating_sub(1)).max(1) as f64;
    let mid = range.start() + chrono::Duration::days(range.days() as i64 / 2);

    let x_axis = Axis::default()
        .style(Style::default().fg(app.theme.border))
        .bounds([0.0, x_max])
        .labels(vec![
            Span::raw(range.start().to_string()),
            Span::raw(mid.to_string()),
            Span::raw(range.end().to_string()),
        ]);

    let y_axis = Axis::default()
        .style(Style::default().fg(app.theme.border))
        .bounds([lo, hi])
        .labels(vec![
            Span::raw(format!("{:.0}", lo)),
            Span::raw(format!("{:.0}", (lo + hi) / 2.0)),
            Span::raw(format!("{:.0}", hi)),
        ]);

    let chart = Chart::new(series)
        .block(
            Block::default()
                .title(title.to_string())
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .x_axis(x_axis)
        .y_axis(y_axis)
        .legend_position(Some(LegendPosition::TopRight))
        .hidden_legend_constraints((Constraint::Ratio(1, 1), Constraint::Ratio(1, 1)));

    frame.render_widget(chart, area);
}

/// Y-axis bounds with a little headroom, in plotted units.
fn y_bounds(trend: &Trend, metrics: &[Metric]) -> (f64, f64) {
    let scale = if metrics.iter().all(|m| m.is_rate()) { 100.0 } else { 1.0 };
    match trend.bounds(metrics) {
        Some((lo, hi)) => {
            let (lo, hi) = (lo * scale, hi * scale);
            let pad = ((hi - lo) * 0.1).max(1.0);
            ((lo - pad).max(0.0).floor(), (hi + pad).ceil())
        }
        None => (0.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{date, record};
    use crate::data::{Dataset, Department};

    #[test]
    fn test_metric_split() {
        assert_eq!(
            day_metrics(),
            vec![Metric::DevDelayDays, Metric::InventoryTurnoverDays, Metric::LogisticsDelayDays]
        );
        assert_eq!(rate_metrics().len(), 5);
        assert!(!rate_metrics().contains(&Metric::DeliveryComplianceRate));
    }

    #[test]
    fn test_chart_points_are_offset_and_scaled() {
        let range = DateRange::new(date(2025, 6, 1), date(2025, 6, 30)).unwrap();
        let trend = Trend::daily(&Dataset::new(vec![
            record(date(2025, 6, 1), Department::Data, "刘伟").first_pass(0.8),
            record(date(2025, 6, 11), Department::Data, "刘伟").first_pass(0.9).delay(12),
        ]));

        let pass = chart_points(&trend, Metric::FirstInspectionPassRate, &range);
        assert_eq!(pass.len(), 2);
        assert_eq!(pass[0].0, 0.0);
        assert!((pass[0].1 - 80.0).abs() < 1e-9);
        assert_eq!(pass[1].0, 10.0);

        let delay = chart_points(&trend, Metric::DevDelayDays, &range);
        assert_eq!(delay[1], (10.0, 12.0));
    }

    #[test]
    fn test_y_bounds_pad_the_data() {
        let trend = Trend::daily(&Dataset::new(vec![
            record(date(2025, 6, 1), Department::Data, "刘伟").delay(10),
            record(date(2025, 6, 2), Department::Data, "刘伟").delay(30),
        ]));
        let (lo, hi) = y_bounds(&trend, &[Metric::DevDelayDays]);
        assert!(lo <= 10.0 && hi >= 30.0);
        assert!(lo >= 0.0);
    }
}
