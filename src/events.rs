use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.show_detail_overlay {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
                app.close_overlay();
            }
            // Step through owners while the overlay is open
            KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::Home => app.select_first(),
            KeyCode::End => app.select_last(),
            _ => {}
        }
        return;
    }

    if app.filter_active {
        handle_filter_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Char('1') => app.set_view(View::Overview),
        KeyCode::Char('2') => app.set_view(View::Trend),
        KeyCode::Char('3') => app.set_view(View::Owners),
        KeyCode::Char('4') => app.set_view(View::Risks),

        // Navigation
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),
        KeyCode::Enter => app.enter_detail(),
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        // Query
        KeyCode::Char('d') => app.cycle_department(true),
        KeyCode::Char('D') => app.cycle_department(false),
        KeyCode::Char('p') => app.cycle_period(true),
        KeyCode::Char('P') => app.cycle_period(false),
        KeyCode::Char('[') => app.adjust_delay_threshold(-1),
        KeyCode::Char(']') => app.adjust_delay_threshold(1),
        KeyCode::Char(',') => app.adjust_quality_threshold(-1),
        KeyCode::Char('.') => app.adjust_quality_threshold(1),
        KeyCode::Char(';') => app.adjust_inventory_threshold(-1),
        KeyCode::Char('\'') => app.adjust_inventory_threshold(1),

        KeyCode::Char('r') => match app.reload_data() {
            Ok(()) => app.set_status_message("已重新加载".to_string()),
            Err(e) => app.set_status_message(format!("加载失败: {:#}", e)),
        },

        KeyCode::Char('?') => app.toggle_help(),

        // Owners table
        KeyCode::Char('s') if app.current_view == View::Owners => app.cycle_sort(),
        KeyCode::Char('S') if app.current_view == View::Owners => app.toggle_sort_direction(),
        KeyCode::Char('/') => {
            app.set_view(View::Owners);
            app.start_filter();
        }
        KeyCode::Char('c') => {
            if !app.filter_text.is_empty() {
                app.clear_filter();
            }
        }

        // Export
        KeyCode::Char('e') => match app.export_csv() {
            Ok(path) => app.set_status_message(format!("已导出 {}", path.display())),
            Err(e) => app.set_status_message(format!("导出失败: {:#}", e)),
        },
        KeyCode::Char('x') => match app.export_report() {
            Ok(path) => app.set_status_message(format!("已导出报告 {}", path.display())),
            Err(e) => app.set_status_message(format!("导出失败: {:#}", e)),
        },

        _ => {}
    }
}

/// Handle key input while filter is active
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.filter_active = false;
        }

        // Keep text but exit input mode
        KeyCode::Esc => {
            app.cancel_filter();
        }

        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_filter();
        }

        KeyCode::Backspace => {
            app.filter_pop();
            if app.filter_text.is_empty() {
                app.filter_active = false;
            }
        }

        KeyCode::Char(c) => {
            app.filter_push(c);
        }

        _ => {}
    }
}

/// Handle mouse events
///
/// `content_start_row` is the first row of the content area; for tables the
/// row after it holds the column headers.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Down(MouseButton::Left) => {
            let clicked_row = mouse.row;

            // Border + table header come before the first owner row
            if app.current_view == View::Owners && clicked_row > content_start_row + 1 {
                let item_row = (clicked_row - content_start_row - 2) as usize;
                if item_row < app.visible_owners().len() {
                    app.selected_owner_index = item_row;
                }
            }

            // Tab bar sits on row 1
            if clicked_row == 1 {
                if let Some(view) = tab_at(mouse.column) {
                    app.set_view(view);
                }
            }
        }

        // Right-click goes back
        MouseEventKind::Down(MouseButton::Right) => app.go_back(),

        _ => {}
    }
}

/// Which tab a click on the tab bar hits. Each tab is ` N:XX ` followed by
/// a one-cell divider; CJK labels are two cells per character.
fn tab_at(column: u16) -> Option<View> {
    let mut start = 0u16;
    for (i, view) in View::ALL.iter().enumerate() {
        let label_width = format!(" {}: ", i + 1).len() as u16 + view.label().chars().count() as u16 * 2;
        let end = start + label_width;
        if column < end {
            return Some(*view);
        }
        start = end + 1;
    }
    None
}
