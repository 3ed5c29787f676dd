//! Shared event reducer: maps key and mouse events onto state handlers.

use crate::app_core::input::{AppKeyCode, AppKeyEvent, AppMouseEvent, AppMouseKind};
use crate::app_core::state::{AppState, FocusPane};
use crate::catalog::Application;
use crate::ui;

pub const SCROLL_LINES: u16 = 1;

fn contains(area: Option<ratatui::layout::Rect>, column: u16, row: u16) -> bool {
    area.is_some_and(|area| area.contains((column, row).into()))
}

/// Returns the pane under the given cell, if any.
///
/// The open suggestion list floats above the other panes and is checked first.
pub fn pane_at(app: &AppState, column: u16, row: u16) -> Option<FocusPane> {
    if app.suggestions_open() && contains(app.suggestions_area, column, row) {
        return Some(FocusPane::AppPicker);
    }
    if contains(app.dropdown_area, column, row) {
        return Some(FocusPane::AppPicker);
    }
    if contains(app.question_area, column, row) {
        return Some(FocusPane::Question);
    }
    if contains(app.submit_area, column, row) {
        return Some(FocusPane::Submit);
    }
    if contains(app.answers_area, column, row) {
        return Some(FocusPane::Answers);
    }
    None
}

fn jump_to_suggestion_starting_with(app: &mut AppState, c: char) {
    let c = c.to_ascii_lowercase();
    let start = app.suggestion_state.selected().map(|idx| idx + 1).unwrap_or(0);
    let len = app.suggestions.len();
    let found = (0..len)
        .map(|step| (start + step) % len)
        .find(|&idx| {
            app.suggestions[idx]
                .name
                .chars()
                .next()
                .is_some_and(|first| first.to_ascii_lowercase() == c)
        });
    if let Some(idx) = found {
        app.suggestion_state.select(Some(idx));
    }
}

/// Handle a runtime-agnostic key event, mutating `app` in place.
///
/// May set `app.pending_action`; the runtime acts on it after this returns.
pub fn handle_key_event(app: &mut AppState, event: AppKeyEvent) {
    if event.is_release {
        return;
    }

    let code = event.code;
    let ctrl = event.ctrl;
    let alt = event.alt;

    if ctrl && code == AppKeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.show_help {
        if matches!(
            code,
            AppKeyCode::Char('?') | AppKeyCode::Esc | AppKeyCode::F1
        ) {
            app.show_help = false;
        }
        return;
    }

    if code == AppKeyCode::Tab || code == AppKeyCode::BackTab {
        if code == AppKeyCode::BackTab || event.shift {
            app.focus_prev_pane();
        } else {
            app.focus_next_pane();
        }
        return;
    }

    if code == AppKeyCode::F1 {
        app.show_help = true;
        return;
    }

    if ctrl && code == AppKeyCode::Char('s') {
        app.request_submit();
        return;
    }

    match app.focused_pane {
        FocusPane::Question => match code {
            AppKeyCode::Enter => app.request_submit(),
            AppKeyCode::Esc => app.focus_pane(FocusPane::AppPicker),
            AppKeyCode::Char('u') if ctrl => app.question_clear(),
            AppKeyCode::Char('w') if ctrl => app.question_delete_word(),
            AppKeyCode::Char('a') if ctrl => app.question_move_to_start(),
            AppKeyCode::Char('e') if ctrl => app.question_move_to_end(),
            AppKeyCode::Char(c) if !ctrl && !alt => app.question_add_char(c),
            AppKeyCode::Backspace => app.question_backspace(),
            AppKeyCode::Delete => app.question_delete(),
            AppKeyCode::Left => app.question_move_cursor_left(),
            AppKeyCode::Right => app.question_move_cursor_right(),
            AppKeyCode::Home => app.question_move_to_start(),
            AppKeyCode::End => app.question_move_to_end(),
            AppKeyCode::Down => app.focus_pane(FocusPane::Submit),
            AppKeyCode::Up => app.focus_pane(FocusPane::AppPicker),
            _ => {}
        },
        FocusPane::AppPicker if app.suggestions_open() => match code {
            AppKeyCode::Up => app.move_suggestion(-1),
            AppKeyCode::Down => app.move_suggestion(1),
            AppKeyCode::Home => app.suggestion_state.select(Some(0)),
            AppKeyCode::End => {
                let last = app.suggestions.len().saturating_sub(1);
                app.suggestion_state.select(Some(last));
            }
            AppKeyCode::Enter => {
                app.select_highlighted_suggestion();
                app.focus_pane(FocusPane::Question);
            }
            AppKeyCode::Esc | AppKeyCode::Char(' ') => app.toggle_dropdown(),
            AppKeyCode::Char(c) if c.is_alphanumeric() && !ctrl && !alt => {
                jump_to_suggestion_starting_with(app, c)
            }
            _ => {}
        },
        pane => match code {
            AppKeyCode::Char('q') if !ctrl => app.should_quit = true,
            AppKeyCode::Char('?') => app.show_help = true,
            AppKeyCode::Enter | AppKeyCode::Char(' ') => match pane {
                FocusPane::AppPicker => app.toggle_dropdown(),
                FocusPane::Submit => app.request_submit(),
                _ => app.toggle_highlighted_answer(),
            },
            AppKeyCode::Down if pane == FocusPane::AppPicker => app.toggle_dropdown(),
            AppKeyCode::Down if pane == FocusPane::Submit => app.focus_pane(FocusPane::Answers),
            AppKeyCode::Up if pane == FocusPane::Submit => app.focus_pane(FocusPane::Question),
            AppKeyCode::Up if pane == FocusPane::Answers => app.move_answer_cursor(-1),
            AppKeyCode::Down if pane == FocusPane::Answers => app.move_answer_cursor(1),
            AppKeyCode::Right if pane == FocusPane::Answers => {
                if let Some(idx) = app.answer_cursor
                    && !app.is_expanded(idx)
                {
                    app.toggle_answer(idx);
                }
            }
            AppKeyCode::Left if pane == FocusPane::Answers => {
                if let Some(idx) = app.answer_cursor
                    && app.is_expanded(idx)
                {
                    app.toggle_answer(idx);
                }
            }
            AppKeyCode::Home if pane == FocusPane::Answers => app.set_answer_cursor(0),
            AppKeyCode::End if pane == FocusPane::Answers => {
                let len = app.result.answers().len();
                app.set_answer_cursor(len.saturating_sub(1));
            }
            AppKeyCode::PageUp if pane == FocusPane::Answers => {
                app.answers_scroll_state.scroll_page_up();
            }
            AppKeyCode::PageDown if pane == FocusPane::Answers => {
                app.answers_scroll_state.scroll_page_down();
            }
            AppKeyCode::Char('e') if pane == FocusPane::Answers && !ctrl => {
                app.expand_all_answers();
            }
            AppKeyCode::Char('c') if pane == FocusPane::Answers && !ctrl => {
                app.collapse_all_answers();
            }
            AppKeyCode::Char(c) if c.is_alphanumeric() && !ctrl && !alt => {
                app.focus_pane(FocusPane::Question);
                app.question_move_to_end();
                app.question_add_char(c);
            }
            _ => {}
        },
    }
}

fn suggestion_at_row(app: &AppState, row: u16) -> Option<Application> {
    let area = app.suggestions_area?;
    let list_row = row.checked_sub(area.y)? as usize;
    if list_row >= area.height as usize {
        return None;
    }
    app.suggestions
        .get(app.suggestion_state.offset() + list_row)
        .copied()
}

fn answer_at_row(app: &AppState, row: u16) -> Option<usize> {
    let area = app.answers_content_area?;
    let visible_row = row.checked_sub(area.y)?;
    if visible_row >= area.height {
        return None;
    }
    let content_row = (app.answers_scroll_state.offset().y + visible_row) as usize;
    app.answer_header_rows.get(content_row).copied().flatten()
}

/// Handle a runtime-agnostic mouse event.
///
/// Returns `true` if the UI needs to be redrawn.
pub fn handle_mouse_event(app: &mut AppState, event: AppMouseEvent) -> bool {
    if app.show_help {
        if event.kind == AppMouseKind::LeftDown {
            app.show_help = false;
            return true;
        }
        return false;
    }

    let column = event.column;
    let row = event.row;
    let hovered_pane = pane_at(app, column, row);

    match event.kind {
        AppMouseKind::ScrollUp | AppMouseKind::ScrollDown => {
            let down = event.kind == AppMouseKind::ScrollDown;
            match hovered_pane {
                Some(FocusPane::AppPicker) if app.suggestions_open() => {
                    app.move_suggestion(if down { 1 } else { -1 });
                    true
                }
                Some(FocusPane::Answers) => {
                    app.scroll_answers_by_lines(SCROLL_LINES, down);
                    true
                }
                _ => false,
            }
        }
        AppMouseKind::LeftDown => {
            let Some(pane) = hovered_pane else {
                if app.suggestions_open() {
                    app.toggle_dropdown();
                    return true;
                }
                return false;
            };

            match pane {
                FocusPane::AppPicker => {
                    if app.suggestions_open()
                        && contains(app.suggestions_area, column, row)
                    {
                        if let Some(selected) = suggestion_at_row(app, row) {
                            app.select_app(selected);
                        }
                    } else {
                        app.focus_pane(FocusPane::AppPicker);
                        app.toggle_dropdown();
                    }
                }
                FocusPane::Question => {
                    app.focus_pane(FocusPane::Question);
                    if let Some(input_area) = app.question_input_area
                        && input_area.contains((column, row).into())
                    {
                        let horizontal_scroll = ui::input_horizontal_scroll(
                            &app.question,
                            app.question_cursor,
                            input_area.width,
                        );
                        let local_x = column.saturating_sub(input_area.x);
                        app.question_cursor = ui::input_cursor_for_column(
                            &app.question,
                            horizontal_scroll + local_x,
                        );
                    }
                }
                FocusPane::Submit => {
                    app.focus_pane(FocusPane::Submit);
                    app.request_submit();
                }
                FocusPane::Answers => {
                    app.focus_pane(FocusPane::Answers);
                    if let Some(idx) = answer_at_row(app, row) {
                        app.toggle_answer(idx);
                    }
                }
            }
            true
        }
    }
}
