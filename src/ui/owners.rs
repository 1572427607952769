//! Owners view rendering.
//!
//! Displays one row per owner with their record count and KPIs, sortable
//! by any column and filterable by name.

use std::cmp::Ordering;

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::{Kpi, OwnerSummary, Severity};

/// KPIs shown as owner table columns, in column order.
pub const OWNER_KPIS: [Kpi; 4] = [
    Kpi::AvgDevDelayDays,
    Kpi::DevSuccessRate,
    Kpi::FirstInspectionPassRate,
    Kpi::LogisticsDelayDays,
];

/// Column to sort by in the Owners view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnerSortColumn {
    #[default]
    Name,
    Records,
    Kpi(Kpi),
}

impl OwnerSortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            OwnerSortColumn::Name => OwnerSortColumn::Records,
            OwnerSortColumn::Records => OwnerSortColumn::Kpi(OWNER_KPIS[0]),
            OwnerSortColumn::Kpi(kpi) => {
                match OWNER_KPIS.iter().position(|k| *k == kpi) {
                    Some(i) if i + 1 < OWNER_KPIS.len() => OwnerSortColumn::Kpi(OWNER_KPIS[i + 1]),
                    _ => OwnerSortColumn::Name,
                }
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OwnerSortColumn::Name => "负责人",
            OwnerSortColumn::Records => "记录数",
            OwnerSortColumn::Kpi(kpi) => kpi.label(),
        }
    }
}

fn kpi_value(owner: &OwnerSummary, kpi: Kpi) -> Option<f64> {
    owner.kpis.as_ref().map(|k| k.get(kpi))
}

/// Sort owners by the given column and direction.
///
/// Ties are broken by name so the order is stable across redraws.
pub fn sort_owners_by(owners: &mut [&OwnerSummary], column: OwnerSortColumn, ascending: bool) {
    owners.sort_by(|a, b| {
        let primary = match column {
            OwnerSortColumn::Name => a.name.cmp(&b.name),
            OwnerSortColumn::Records => a.records.cmp(&b.records),
            OwnerSortColumn::Kpi(kpi) => kpi_value(a, kpi)
                .partial_cmp(&kpi_value(b, kpi))
                .unwrap_or(Ordering::Equal),
        };

        let primary = if ascending {
            primary
        } else {
            primary.reverse()
        };

        if primary == Ordering::Equal {
            a.name.cmp(&b.name)
        } else {
            primary
        }
    });
}

/// Render the Owners view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let owners = app.visible_owners();

    let mut header_cells = vec![
        Cell::from(format_header(OwnerSortColumn::Name, app)),
        Cell::from(format_header(OwnerSortColumn::Records, app)),
    ];
    header_cells.extend(
        OWNER_KPIS
            .iter()
            .map(|kpi| Cell::from(format_header(OwnerSortColumn::Kpi(*kpi), app))),
    );
    let header = Row::new(header_cells).height(1).style(app.theme.header);

    let rows: Vec<Row> = owners
        .iter()
        .map(|owner| {
            let mut cells = vec![Cell::from(owner.name.clone()), Cell::from(owner.records.to_string())];
            cells.extend(OWNER_KPIS.iter().map(|kpi| {
                let text = kpi_value(owner, *kpi)
                    .map(|v| kpi.format(v))
                    .unwrap_or_else(|| super::NO_VALUE.to_string());
                Cell::from(text).style(kpi_style(app, *kpi, kpi_value(owner, *kpi)))
            }));
            Row::new(cells)
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Fill(1),
        Constraint::Fill(2),
        Constraint::Fill(2),
        Constraint::Fill(2),
        Constraint::Fill(2),
    ];

    let selected = app.selected_owner_index.min(owners.len().saturating_sub(1));
    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:清除]", app.filter_text)
    } else {
        String::new()
    };

    let position_info = if !owners.is_empty() {
        format!(" [{}/{}]", selected + 1, owners.len())
    } else {
        String::new()
    };

    let title = format!(
        " 负责人 ({}/{}) [s:排序 {}{}]{}{} ",
        owners.len(),
        data.owners.len(),
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
    if !owners.is_empty() {
        state.select(Some(selected));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

/// Colour an owner's KPI cell when it would breach the dashboard threshold.
fn kpi_style(app: &App, kpi: Kpi, value: Option<f64>) -> Style {
    let Some(value) = value else {
        return Style::default();
    };
    let t = &app.query.thresholds;
    match kpi {
        Kpi::AvgDevDelayDays if value > f64::from(t.delay_days) => {
            app.theme.status_style(Severity::Critical)
        }
        Kpi::DevSuccessRate | Kpi::FirstInspectionPassRate
            if value * 100.0 < f64::from(t.quality_pct) =>
        {
            app.theme.status_style(Severity::Warning)
        }
        _ => Style::default(),
    }
}

fn format_header(col: OwnerSortColumn, app: &App) -> Span<'static> {
    if app.sort_column == col {
        let arrow = if app.sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", col.label(), arrow))
    } else {
        Span::raw(col.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{date, record};
    use crate::data::{compute_kpis, Dataset, Department};

    fn owner(name: &str, delays: &[u32]) -> OwnerSummary {
        let dataset: Dataset = delays
            .iter()
            .map(|d| record(date(2025, 6, 1), Department::Project, name).delay(*d))
            .collect();
        OwnerSummary {
            name: name.to_string(),
            records: dataset.len(),
            kpis: compute_kpis(&dataset).ok(),
        }
    }

    #[test]
    fn test_sort_column_cycle() {
        let mut column = OwnerSortColumn::Name;
        let mut seen = vec![column];
        loop {
            column = column.next();
            if column == OwnerSortColumn::Name {
                break;
            }
            seen.push(column);
        }
        assert_eq!(seen.len(), 2 + OWNER_KPIS.len());
    }

    #[test]
    fn test_sort_by_kpi_with_name_tiebreak() {
        let a = owner("赵华", &[10]);
        let b = owner("张明", &[30, 10]);
        let c = owner("刘伟", &[10]);
        let mut owners = vec![&a, &b, &c];

        sort_owners_by(&mut owners, OwnerSortColumn::Kpi(Kpi::AvgDevDelayDays), false);
        let names: Vec<_> = owners.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["张明", "刘伟", "赵华"]);

        sort_owners_by(&mut owners, OwnerSortColumn::Records, true);
        assert_eq!(owners[2].name, "张明");
    }
}
