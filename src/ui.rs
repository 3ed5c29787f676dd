use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect, Size},
    style::{Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph},
};
use tui_scrollview::{ScrollView, ScrollbarVisibility};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app_core::state::{AppState, FocusPane};
use crate::model::ResultState;

pub const TITLE: &str = "FAQ ASSISTANT";
pub const SUBTITLE: &str = "Get answers to your questions instantly!!";
pub const APP_PLACEHOLDER: &str = "Select an App";
pub const QUESTION_PLACEHOLDER: &str = "Write your Query";
pub const SUBMIT_LABEL: &str = "Get Answer";
pub const PENDING_LABEL: &str = "Searching…";
pub const EMPTY_ANSWERS_NOTE: &str = "No answers above the similarity threshold.";

/// Tallest the suggestion popup may grow, borders included.
const SUGGESTIONS_MAX_HEIGHT: u16 = 13;

/// Main UI entry point that renders the entire application layout.
pub fn ui(f: &mut Frame, app: &mut AppState) {
    f.render_widget(
        Block::default().style(Style::default().bg(app.theme.background)),
        f.area(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // App dropdown
            Constraint::Length(3), // Question input
            Constraint::Length(3), // Submit row
            Constraint::Min(0),    // Answers
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    app.dropdown_area = Some(chunks[1]);
    app.question_area = Some(chunks[2]);
    app.answers_area = Some(chunks[4]);

    render_header(f, app, chunks[0]);
    render_dropdown(f, app, chunks[1]);
    render_question(f, app, chunks[2]);
    render_submit_row(f, app, chunks[3]);
    render_answers(f, app, chunks[4]);
    render_status_bar(f, app, chunks[5]);

    if app.suggestions_open() {
        render_suggestions(f, app, chunks[1]);
    } else {
        app.suggestions_area = None;
    }

    if app.show_help {
        render_help_overlay(f, app);
    }
}

fn focus_border(app: &AppState, pane: FocusPane) -> Style {
    if app.focused_pane == pane {
        app.theme.border_selected
    } else {
        app.theme.border
    }
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(TITLE, app.theme.title)),
        Line::from(Span::styled(
            SUBTITLE,
            app.theme.text.add_modifier(Modifier::DIM),
        )),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .style(app.theme.text)
            .alignment(Alignment::Center),
        area,
    );
}

/// Renders the dropdown button with the current selection or the placeholder.
fn render_dropdown(f: &mut Frame, app: &mut AppState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_border(app, FocusPane::AppPicker))
        .title(" Search for an App: ")
        .title_style(app.theme.title)
        .style(app.theme.text);
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let label = match app.selected_app {
        Some(selected) => Line::from(vec![
            Span::styled(
                format!("{:<3}", selected.icon.badge),
                Style::default()
                    .fg(selected.icon.color)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(selected.name, app.theme.text),
        ]),
        None => Line::from(Span::styled(
            APP_PLACEHOLDER,
            app.theme.text.add_modifier(Modifier::DIM).italic(),
        )),
    };

    let arrow = if app.suggestions_open() { "▲" } else { "▼" };
    let row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(inner);
    f.render_widget(Paragraph::new(label), row[0]);
    f.render_widget(
        Paragraph::new(arrow)
            .style(app.theme.title)
            .alignment(Alignment::Right),
        row[1],
    );
}

/// Renders the floating suggestion list under the dropdown button.
fn render_suggestions(f: &mut Frame, app: &mut AppState, anchor: Rect) {
    let screen = f.area();
    let top = anchor.y + anchor.height;
    let available = screen.height.saturating_sub(top + 1);
    let wanted = (app.suggestions.len() as u16 + 2).min(SUGGESTIONS_MAX_HEIGHT);
    let height = wanted.min(available);
    if height < 3 || anchor.width < 4 {
        app.suggestions_area = None;
        return;
    }
    let popup = Rect::new(anchor.x, top, anchor.width, height);

    f.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_selected)
        .style(app.theme.list_normal)
        .title_bottom(Line::from(" ↑/↓ move • Enter select • Esc close ").right_aligned());
    app.suggestions_area = Some(block.inner(popup));

    let items: Vec<ListItem> = app
        .suggestions
        .iter()
        .map(|entry| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<3}", entry.icon.badge),
                    Style::default()
                        .fg(entry.icon.color)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(entry.name),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .style(app.theme.list_normal)
        .highlight_style(app.theme.list_selected)
        .highlight_symbol("› ");
    f.render_stateful_widget(list, popup, &mut app.suggestion_state);
}

/// Renders the question input with a visible cursor while focused.
fn render_question(f: &mut Frame, app: &mut AppState, area: Rect) {
    let is_focused = app.focused_pane == FocusPane::Question;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_border(app, FocusPane::Question))
        .title(" Ask a question: ")
        .title_style(app.theme.title)
        .title_bottom(if is_focused {
            Line::from(" Enter submit • Ctrl+U clear • Tab next ").right_aligned()
        } else {
            Line::from("")
        });

    let inner = block.inner(area);
    app.question_input_area = Some(inner);
    let horizontal_scroll = input_horizontal_scroll(&app.question, app.question_cursor, inner.width);

    let content = if app.question.is_empty() && !is_focused {
        Text::from(Line::from(Span::styled(
            QUESTION_PLACEHOLDER,
            app.theme.text.add_modifier(Modifier::DIM).italic(),
        )))
    } else {
        Text::from(app.question.as_str())
    };

    f.render_widget(
        Paragraph::new(content)
            .block(block)
            .style(app.theme.text)
            .scroll((0, horizontal_scroll)),
        area,
    );

    if is_focused && inner.width > 0 && inner.height > 0 {
        let cursor_offset = input_cursor_offset(&app.question, app.question_cursor);
        let visible = cursor_offset.saturating_sub(horizontal_scroll);
        let cursor_x = inner.x + visible.min(inner.width.saturating_sub(1));
        f.set_cursor_position((cursor_x, inner.y));
    }
}

/// Renders the submit button plus the pending indicator or validation message.
fn render_submit_row(f: &mut Frame, app: &mut AppState, area: Rect) {
    let button_width = (SUBMIT_LABEL.width() as u16 + 6).min(area.width);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(button_width), Constraint::Min(0)])
        .split(area);
    app.submit_area = Some(chunks[0]);

    let is_focused = app.focused_pane == FocusPane::Submit;
    let button_style = if is_focused {
        app.theme.list_selected
    } else {
        app.theme.text.add_modifier(Modifier::BOLD)
    };
    let button = Paragraph::new(SUBMIT_LABEL)
        .alignment(Alignment::Center)
        .style(button_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(focus_border(app, FocusPane::Submit)),
        );
    f.render_widget(button, chunks[0]);

    let status = if let Some(message) = &app.validation_error {
        Some(Span::styled(
            message.as_str(),
            Style::default()
                .fg(app.theme.accents.error)
                .add_modifier(Modifier::BOLD),
        ))
    } else if app.is_pending() {
        Some(Span::styled(
            PENDING_LABEL,
            Style::default().fg(app.theme.accents.pending),
        ))
    } else {
        None
    };

    if let Some(status) = status
        && chunks[1].height >= 2
    {
        let line_area = Rect::new(
            chunks[1].x + 2,
            chunks[1].y + 1,
            chunks[1].width.saturating_sub(2),
            1,
        );
        f.render_widget(Paragraph::new(Line::from(status)), line_area);
    }
}

/// One rendered accordion line and the entry whose header it belongs to.
struct AccordionLine {
    line: Line<'static>,
    header_of: Option<usize>,
}

fn build_accordion(app: &AppState, width: u16) -> Vec<AccordionLine> {
    let items = app.result.answers();
    let width = width as usize;
    let focused = app.focused_pane == FocusPane::Answers;
    let question_style = Style::default()
        .fg(app.theme.accents.question)
        .add_modifier(Modifier::BOLD);
    let answer_style = Style::default().fg(app.theme.accents.answer);

    let mut lines = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        let expanded = app.is_expanded(idx);
        let marker = if expanded { "▾ " } else { "▸ " };
        let style = if focused && app.answer_cursor == Some(idx) {
            app.theme.list_selected
        } else {
            question_style
        };

        for (row, text) in wrap_text(&item.question, width.saturating_sub(2))
            .into_iter()
            .enumerate()
        {
            let prefix = if row == 0 { marker } else { "  " };
            lines.push(AccordionLine {
                line: Line::from(vec![
                    Span::styled(prefix, app.theme.title),
                    Span::styled(text, style),
                ]),
                header_of: Some(idx),
            });
        }

        if expanded {
            for text in wrap_text(&item.answer, width.saturating_sub(4)) {
                lines.push(AccordionLine {
                    line: Line::from(vec![Span::raw("    "), Span::styled(text, answer_style)]),
                    header_of: None,
                });
            }
        }

        if idx + 1 < items.len() {
            lines.push(AccordionLine {
                line: Line::from(""),
                header_of: None,
            });
        }
    }
    lines
}

/// Renders the answers pane: hint, pending state, error, or the accordion.
fn render_answers(f: &mut Frame, app: &mut AppState, area: Rect) {
    let is_focused = app.focused_pane == FocusPane::Answers;
    let count = app.result.answers().len();
    let title = match &app.result {
        ResultState::Answers(_) => format!(" Answer: ({}) ", count),
        _ => " Answer: ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_border(app, FocusPane::Answers))
        .style(app.theme.text)
        .title(title)
        .title_style(app.theme.title)
        .title_bottom(if is_focused {
            Line::from(" ↑/↓ move • Enter toggle • e/c expand/collapse all ").right_aligned()
        } else {
            Line::from("")
        });

    let inner = block.inner(area);
    f.render_widget(block, area);
    app.answer_header_rows.clear();
    app.answers_content_area = None;

    let horizontal_padding = 1;
    let content_area = Rect::new(
        inner.x + horizontal_padding,
        inner.y,
        inner.width.saturating_sub(horizontal_padding * 2),
        inner.height,
    );
    if content_area.width == 0 || content_area.height == 0 {
        return;
    }

    let message = match &app.result {
        ResultState::Error(message) => Some(Span::styled(
            message.clone(),
            Style::default()
                .fg(app.theme.accents.error)
                .add_modifier(Modifier::BOLD),
        )),
        ResultState::Answers(items) if items.is_empty() => Some(Span::styled(
            EMPTY_ANSWERS_NOTE,
            app.theme.text.add_modifier(Modifier::DIM),
        )),
        ResultState::NoResult if app.is_pending() => Some(Span::styled(
            PENDING_LABEL,
            Style::default().fg(app.theme.accents.pending),
        )),
        ResultState::NoResult => Some(Span::styled(
            "Pick an app, ask a question, then press Enter.",
            app.theme.text.add_modifier(Modifier::DIM),
        )),
        ResultState::Answers(_) => None,
    };

    if let Some(message) = message {
        f.render_widget(
            Paragraph::new(Line::from(message)).wrap(ratatui::widgets::Wrap { trim: true }),
            content_area,
        );
        return;
    }

    // Leave a column for the scrollbar.
    let content_width = content_area.width.saturating_sub(1).max(1);
    let accordion = build_accordion(app, content_width);
    let content_height = accordion.len() as u16;
    app.answer_header_rows = accordion.iter().map(|line| line.header_of).collect();
    app.answers_content_area = Some(content_area);

    if app.reveal_answer_cursor {
        app.reveal_answer_cursor = false;
        if let Some(cursor) = app.answer_cursor
            && let Some(first_row) = app
                .answer_header_rows
                .iter()
                .position(|row| *row == Some(cursor))
        {
            let first_row = first_row as u16;
            let offset = app.answers_scroll_state.offset();
            if first_row < offset.y {
                app.answers_scroll_state
                    .set_offset(Position::new(offset.x, first_row));
            } else if first_row >= offset.y + content_area.height {
                app.answers_scroll_state.set_offset(Position::new(
                    offset.x,
                    first_row + 1 - content_area.height,
                ));
            }
        }
    }

    let mut scroll_view = ScrollView::new(Size::new(content_width, content_height))
        .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
        .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);
    let scroll_area = scroll_view.area();
    scroll_view.buf_mut().set_style(scroll_area, app.theme.text);

    let text = Text::from(
        accordion
            .into_iter()
            .map(|entry| entry.line)
            .collect::<Vec<_>>(),
    );
    scroll_view.render_widget(
        Paragraph::new(text).style(app.theme.text),
        Rect::new(0, 0, content_width, content_height),
    );
    f.render_stateful_widget(scroll_view, content_area, &mut app.answers_scroll_state);
}

/// Renders the multisection status bar at the bottom.
fn render_status_bar(f: &mut Frame, app: &AppState, area: Rect) {
    let area = Rect::new(
        area.x + 1,
        area.y,
        area.width.saturating_sub(2),
        area.height,
    );
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(45),
            Constraint::Percentage(20),
        ])
        .split(area);

    let key_style = app.theme.title;
    let bar_style = app.theme.text.add_modifier(Modifier::DIM);

    let shortcuts = Line::from(vec![
        Span::styled("Tab ", key_style),
        Span::raw("focus  "),
        Span::styled("? ", key_style),
        Span::raw("help  "),
        Span::styled("Ctrl+C ", key_style),
        Span::raw("quit"),
    ]);
    f.render_widget(Paragraph::new(shortcuts).style(bar_style), chunks[0]);

    let mut backend = vec![Span::raw(format!("Backend: {}", app.base_url))];
    if app.is_pending() {
        backend.push(Span::styled(
            " ●",
            Style::default().fg(app.theme.accents.pending),
        ));
    }
    f.render_widget(
        Paragraph::new(Line::from(backend))
            .style(bar_style)
            .alignment(Alignment::Center),
        chunks[1],
    );

    f.render_widget(
        Paragraph::new(app.app_version.as_str())
            .style(bar_style)
            .alignment(Alignment::Right),
        chunks[2],
    );
}

fn render_help_overlay(f: &mut Frame, app: &AppState) {
    let area = f.area();
    let popup_width = area.width.min(64).saturating_sub(4);
    let popup_height = 22.min(area.height.saturating_sub(2));
    if popup_width == 0 || popup_height == 0 {
        return;
    }
    let popup_rect = Rect::new(
        area.x + (area.width.saturating_sub(popup_width)) / 2,
        area.y + (area.height.saturating_sub(popup_height)) / 2,
        popup_width,
        popup_height,
    );

    f.render_widget(Clear, popup_rect);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_selected)
        .style(app.theme.text)
        .title(" Help ")
        .border_type(BorderType::Double)
        .title_style(app.theme.title);
    let inner_area = block.inner(popup_rect);
    f.render_widget(block, popup_rect);

    let key_style = app.theme.title;
    let desc_style = app.theme.text;
    let header_style = key_style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);

    let format_section = |title: &str, items: Vec<(&str, &str)>| -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(Span::styled(title.to_string(), header_style))];
        for (key, desc) in items {
            lines.push(Line::from(vec![
                Span::styled(format!("{: <16}", key), key_style),
                Span::styled(desc.to_string(), desc_style),
            ]));
        }
        lines
    };

    let mut lines = format_section(
        "General",
        vec![
            ("Tab | Shift+Tab", "next | previous control"),
            ("Ctrl+S", "submit from anywhere"),
            ("? | F1", "toggle help"),
            ("q | Ctrl+C", "quit"),
        ],
    );
    lines.push(Line::from(""));
    lines.extend(format_section(
        "App picker",
        vec![
            ("Enter | Space", "open | close the list"),
            ("↑/↓ | letter", "move | jump by initial"),
            ("Enter", "select highlighted app"),
        ],
    ));
    lines.push(Line::from(""));
    lines.extend(format_section(
        "Question",
        vec![
            ("Enter", "get answer"),
            ("Ctrl+U | Ctrl+W", "clear | delete word"),
            ("Ctrl+A | E", "start | end of line"),
        ],
    ));
    lines.push(Line::from(""));
    lines.extend(format_section(
        "Answers",
        vec![
            ("Enter | Click", "expand or collapse"),
            ("e | c", "expand | collapse all"),
        ],
    ));

    let content = Rect::new(
        inner_area.x + 1,
        inner_area.y + 1,
        inner_area.width.saturating_sub(2),
        inner_area.height.saturating_sub(2),
    );
    f.render_widget(Paragraph::new(lines), content);
}

/// Greedy word wrap by display width. Words wider than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0;

        for word in paragraph.split_whitespace() {
            let word_width = word.width();
            let needed = if current.is_empty() {
                word_width
            } else {
                current_width + 1 + word_width
            };
            if needed <= width {
                if !current.is_empty() {
                    current.push(' ');
                    current_width += 1;
                }
                current.push_str(word);
                current_width += word_width;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            for c in word.chars() {
                let char_width = c.width().unwrap_or(0);
                if current_width + char_width > width && !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                current.push(c);
                current_width += char_width;
            }
        }
        lines.push(current);
    }
    lines
}

/// Display width of the first `cursor` chars of `text`.
pub fn input_cursor_offset(text: &str, cursor: usize) -> u16 {
    let width: usize = text.chars().take(cursor).filter_map(|c| c.width()).sum();
    u16::try_from(width).unwrap_or(u16::MAX)
}

/// Horizontal scroll that keeps the cursor inside a field of `visible_width`.
pub fn input_horizontal_scroll(text: &str, cursor: usize, visible_width: u16) -> u16 {
    if visible_width == 0 {
        return 0;
    }
    input_cursor_offset(text, cursor).saturating_sub(visible_width.saturating_sub(1))
}

pub fn input_cursor_for_column(text: &str, target_column: u16) -> usize {
    let target_column = usize::from(target_column);
    let mut width = 0usize;
    for (idx, ch) in text.chars().enumerate() {
        let char_width = ch.width().unwrap_or(0);
        if width + char_width > target_column {
            return idx;
        }
        width += char_width;
    }
    text.chars().count()
}
