//! Application state for the FAQ view and the handlers that mutate it.
//!
//! Everything here is runtime-agnostic: network work is requested through
//! `pending_action` and results come back through [`AppState::apply_completion`].

use foldhash::HashSet;
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tracing::{debug, info};
use tui_scrollview::ScrollViewState;

use crate::app_core::dispatch::{Completion, RequestTicket};
use crate::catalog::{APPLICATIONS, Application};
use crate::model::{self, Query, ResultState, SubmitError};
use crate::theme::ThemeConfig;

/// Which control currently has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    AppPicker,
    Question,
    Submit,
    Answers,
}

/// A validated submission waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub ticket: RequestTicket,
    pub query: Query,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Submit(QueryRequest),
}

pub struct AppState {
    /// Chosen application, if any
    pub selected_app: Option<Application>,
    /// Either empty or the full catalog
    pub suggestions: Vec<Application>,
    /// Highlight inside the open suggestion list
    pub suggestion_state: ListState,
    /// Question text bound to the input field
    pub question: String,
    /// Cursor position in `question`, in chars
    pub question_cursor: usize,
    /// Outcome of the last applied submission
    pub result: ResultState,
    /// Inline validation message from the last rejected submit
    pub validation_error: Option<String>,
    pub focused_pane: FocusPane,
    /// Highlighted accordion entry
    pub answer_cursor: Option<usize>,
    /// Indices of expanded accordion entries
    pub expanded: HashSet<usize>,
    pub answers_scroll_state: ScrollViewState,
    /// Scroll the highlighted entry into view on the next render
    pub reveal_answer_cursor: bool,
    /// Ticket of the submission whose result we are waiting for
    pub pending: Option<RequestTicket>,
    next_ticket: u64,
    pub theme: ThemeConfig,
    /// Backend base URL, shown in the status bar
    pub base_url: String,
    pub app_version: String,
    pub should_quit: bool,
    pub show_help: bool,
    /// Pending action to execute after input handling
    pub pending_action: Option<AppAction>,
    /// Screen region of the dropdown button (set during render)
    pub dropdown_area: Option<Rect>,
    /// Screen region of the suggestion rows, inside borders
    pub suggestions_area: Option<Rect>,
    /// Screen region of the question box (including borders)
    pub question_area: Option<Rect>,
    /// Screen region of the question text (inside borders)
    pub question_input_area: Option<Rect>,
    pub submit_area: Option<Rect>,
    /// Screen region of the answers pane (including borders)
    pub answers_area: Option<Rect>,
    /// Viewport of the scrollable accordion content
    pub answers_content_area: Option<Rect>,
    /// For each rendered accordion row, the entry whose header sits on it
    pub answer_header_rows: Vec<Option<usize>>,
}

impl AppState {
    pub fn new(theme: ThemeConfig, base_url: String, app_version: String) -> Self {
        Self {
            selected_app: None,
            suggestions: Vec::new(),
            suggestion_state: ListState::default(),
            question: String::new(),
            question_cursor: 0,
            result: ResultState::NoResult,
            validation_error: None,
            focused_pane: FocusPane::AppPicker,
            answer_cursor: None,
            expanded: HashSet::default(),
            answers_scroll_state: ScrollViewState::default(),
            reveal_answer_cursor: false,
            pending: None,
            next_ticket: 0,
            theme,
            base_url,
            app_version,
            should_quit: false,
            show_help: false,
            pending_action: None,
            dropdown_area: None,
            suggestions_area: None,
            question_area: None,
            question_input_area: None,
            submit_area: None,
            answers_area: None,
            answers_content_area: None,
            answer_header_rows: Vec::new(),
        }
    }

    pub fn suggestions_open(&self) -> bool {
        !self.suggestions.is_empty()
    }

    /// Opens the suggestion list with the full catalog, or closes it if open.
    pub fn toggle_dropdown(&mut self) {
        if self.suggestions_open() {
            self.suggestions.clear();
            self.suggestion_state.select(None);
            return;
        }

        self.suggestions = APPLICATIONS.to_vec();
        let highlight = self
            .selected_app
            .and_then(|selected| self.suggestions.iter().position(|app| *app == selected))
            .unwrap_or(0);
        self.suggestion_state = ListState::default();
        self.suggestion_state.select(Some(highlight));
    }

    /// Makes `app` the selection and closes the suggestion list.
    pub fn select_app(&mut self, app: Application) {
        debug!(app = app.name, "application selected");
        self.selected_app = Some(app);
        self.suggestions.clear();
        self.suggestion_state.select(None);
    }

    pub fn select_highlighted_suggestion(&mut self) {
        if let Some(app) = self
            .suggestion_state
            .selected()
            .and_then(|idx| self.suggestions.get(idx))
            .copied()
        {
            self.select_app(app);
        }
    }

    pub fn move_suggestion(&mut self, direction: i32) {
        let len = self.suggestions.len();
        if len == 0 {
            return;
        }
        let current = self.suggestion_state.selected().unwrap_or(0);
        let next = if direction < 0 {
            current.saturating_sub(1)
        } else {
            (current + 1).min(len - 1)
        };
        self.suggestion_state.select(Some(next));
    }

    /// Validates the current input and, if it passes, starts a new request.
    ///
    /// A valid submission clears the previous result, supersedes any pending
    /// request, and returns the request to dispatch. An invalid one only sets
    /// the inline validation message.
    pub fn submit(&mut self) -> Result<QueryRequest, SubmitError> {
        let query = match model::prepare_query(self.selected_app.as_ref(), &self.question) {
            Ok(query) => query,
            Err(err) => {
                debug!("submission rejected: {}", err);
                self.validation_error = Some(err.to_string());
                return Err(err);
            }
        };

        self.validation_error = None;
        self.set_result(ResultState::NoResult);
        self.next_ticket += 1;
        let ticket = RequestTicket(self.next_ticket);
        if let Some(previous) = self.pending.replace(ticket) {
            info!(superseded = previous.0, ticket = ticket.0, "request superseded");
        }

        Ok(QueryRequest { ticket, query })
    }

    /// Runs [`AppState::submit`] and queues the request for the runtime.
    pub fn request_submit(&mut self) {
        if let Ok(request) = self.submit() {
            self.pending_action = Some(AppAction::Submit(request));
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Applies a finished lookup. Returns `false` when the completion belongs to
    /// a superseded submission and was ignored.
    pub fn apply_completion(&mut self, completion: Completion) -> bool {
        if self.pending != Some(completion.ticket) {
            debug!(ticket = completion.ticket.0, "ignoring stale completion");
            return false;
        }
        self.pending = None;

        let result = match completion.outcome {
            Ok(items) => {
                let received = items.len();
                let kept = model::filter_answers(items);
                info!(
                    ticket = completion.ticket.0,
                    received,
                    kept = kept.len(),
                    "answers received"
                );
                ResultState::Answers(kept)
            }
            Err(err) => {
                info!(ticket = completion.ticket.0, error = ?err, "lookup failed");
                ResultState::Error(err.to_string())
            }
        };
        self.set_result(result);
        true
    }

    fn set_result(&mut self, result: ResultState) {
        self.answer_cursor = if result.answers().is_empty() {
            None
        } else {
            Some(0)
        };
        self.result = result;
        self.expanded.clear();
        self.answers_scroll_state = ScrollViewState::default();
        self.reveal_answer_cursor = false;
    }

    pub fn is_expanded(&self, idx: usize) -> bool {
        self.expanded.contains(&idx)
    }

    /// Opens or closes one accordion entry. Other entries keep their state.
    pub fn toggle_answer(&mut self, idx: usize) {
        if idx >= self.result.answers().len() {
            return;
        }
        if !self.expanded.remove(&idx) {
            self.expanded.insert(idx);
        }
        self.set_answer_cursor(idx);
    }

    /// Highlights entry `idx` and scrolls it into view on the next render.
    pub fn set_answer_cursor(&mut self, idx: usize) {
        if idx < self.result.answers().len() {
            self.answer_cursor = Some(idx);
            self.reveal_answer_cursor = true;
        }
    }

    pub fn toggle_highlighted_answer(&mut self) {
        if let Some(idx) = self.answer_cursor {
            self.toggle_answer(idx);
        }
    }

    pub fn move_answer_cursor(&mut self, direction: i32) {
        let len = self.result.answers().len();
        if len == 0 {
            self.answer_cursor = None;
            return;
        }
        let current = self.answer_cursor.unwrap_or(0);
        let next = if direction < 0 {
            current.saturating_sub(1)
        } else {
            (current + 1).min(len - 1)
        };
        self.set_answer_cursor(next);
    }

    pub fn expand_all_answers(&mut self) {
        self.expanded = (0..self.result.answers().len()).collect();
    }

    pub fn collapse_all_answers(&mut self) {
        self.expanded.clear();
    }

    pub fn scroll_answers_by_lines(&mut self, lines: u16, down: bool) {
        for _ in 0..lines {
            if down {
                self.answers_scroll_state.scroll_down();
            } else {
                self.answers_scroll_state.scroll_up();
            }
        }
    }

    pub fn question_add_char(&mut self, c: char) {
        let byte_idx = self
            .question
            .char_indices()
            .nth(self.question_cursor)
            .map(|(idx, _)| idx)
            .unwrap_or(self.question.len());
        self.question.insert(byte_idx, c);
        self.question_cursor += 1;
    }

    pub fn question_backspace(&mut self) {
        if self.question_cursor > 0 {
            self.question_cursor -= 1;
            if let Some((byte_idx, _)) = self.question.char_indices().nth(self.question_cursor) {
                self.question.remove(byte_idx);
            }
        }
    }

    pub fn question_delete(&mut self) {
        let char_count = self.question.chars().count();
        if self.question_cursor < char_count
            && let Some((byte_idx, _)) = self.question.char_indices().nth(self.question_cursor)
        {
            self.question.remove(byte_idx);
        }
    }

    pub fn question_move_cursor_left(&mut self) {
        if self.question_cursor > 0 {
            self.question_cursor -= 1;
        }
    }

    pub fn question_move_cursor_right(&mut self) {
        if self.question_cursor < self.question.chars().count() {
            self.question_cursor += 1;
        }
    }

    pub fn question_move_to_start(&mut self) {
        self.question_cursor = 0;
    }

    pub fn question_move_to_end(&mut self) {
        self.question_cursor = self.question.chars().count();
    }

    pub fn question_clear(&mut self) {
        self.question.clear();
        self.question_cursor = 0;
    }

    /// Deletes the word left of the cursor, along with trailing whitespace.
    pub fn question_delete_word(&mut self) {
        if self.question_cursor == 0 {
            return;
        }

        let chars: Vec<char> = self.question.chars().collect();
        let mut i = self.question_cursor;
        while i > 0 && chars[i - 1].is_whitespace() {
            i -= 1;
        }
        while i > 0 && !chars[i - 1].is_whitespace() {
            i -= 1;
        }

        let byte_start = self
            .question
            .char_indices()
            .nth(i)
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        let byte_end = self
            .question
            .char_indices()
            .nth(self.question_cursor)
            .map(|(idx, _)| idx)
            .unwrap_or(self.question.len());

        self.question.replace_range(byte_start..byte_end, "");
        self.question_cursor = i;
    }

    pub fn focus_pane(&mut self, pane: FocusPane) {
        if pane != FocusPane::AppPicker && self.suggestions_open() {
            self.toggle_dropdown();
        }
        self.focused_pane = pane;
    }

    pub fn focus_next_pane(&mut self) {
        let next = match self.focused_pane {
            FocusPane::AppPicker => FocusPane::Question,
            FocusPane::Question => FocusPane::Submit,
            FocusPane::Submit => FocusPane::Answers,
            FocusPane::Answers => FocusPane::AppPicker,
        };
        self.focus_pane(next);
    }

    pub fn focus_prev_pane(&mut self) {
        let prev = match self.focused_pane {
            FocusPane::AppPicker => FocusPane::Answers,
            FocusPane::Question => FocusPane::AppPicker,
            FocusPane::Submit => FocusPane::Question,
            FocusPane::Answers => FocusPane::Submit,
        };
        self.focus_pane(prev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FetchError;
    use crate::model::AnswerItem;
    use crate::theme::Theme;

    fn make_app() -> AppState {
        AppState::new(
            Theme::Dracula.config(),
            "http://127.0.0.1:5000".to_string(),
            "v0".to_string(),
        )
    }

    fn answer(question: &str, similarity: f64) -> AnswerItem {
        AnswerItem {
            question: question.to_string(),
            answer: format!("{} answer", question),
            similarity,
        }
    }

    fn ready_app() -> AppState {
        let mut app = make_app();
        app.select_app(APPLICATIONS[0]);
        app.question = "How do I share a folder?".to_string();
        app.question_move_to_end();
        app
    }

    #[test]
    fn test_toggle_twice_returns_to_empty() {
        let mut app = make_app();
        app.toggle_dropdown();
        assert_eq!(app.suggestions, APPLICATIONS.to_vec());
        app.toggle_dropdown();
        assert!(app.suggestions.is_empty());

        for selected in APPLICATIONS {
            app.select_app(selected);
            app.toggle_dropdown();
            assert_eq!(app.suggestions.len(), APPLICATIONS.len());
            app.toggle_dropdown();
            assert!(app.suggestions.is_empty());
        }
    }

    #[test]
    fn test_select_closes_list_and_sets_exact_entry() {
        for (idx, expected) in APPLICATIONS.iter().enumerate() {
            let mut app = make_app();
            app.toggle_dropdown();
            app.suggestion_state.select(Some(idx));
            app.select_highlighted_suggestion();
            assert_eq!(app.selected_app, Some(*expected));
            assert!(!app.suggestions_open());
        }
    }

    #[test]
    fn test_toggle_highlights_current_selection() {
        let mut app = make_app();
        app.select_app(APPLICATIONS[3]);
        app.toggle_dropdown();
        assert_eq!(app.suggestion_state.selected(), Some(3));
    }

    #[test]
    fn test_move_suggestion_clamps() {
        let mut app = make_app();
        app.toggle_dropdown();
        app.move_suggestion(-1);
        assert_eq!(app.suggestion_state.selected(), Some(0));
        for _ in 0..20 {
            app.move_suggestion(1);
        }
        assert_eq!(app.suggestion_state.selected(), Some(APPLICATIONS.len() - 1));
    }

    #[test]
    fn test_submit_without_selection_is_rejected() {
        let mut app = make_app();
        app.question = "anything".to_string();
        assert_eq!(app.submit(), Err(SubmitError::MissingInput));
        assert_eq!(
            app.validation_error.as_deref(),
            Some("Please select an app and enter a question.")
        );
        assert!(app.pending.is_none());
    }

    #[test]
    fn test_submit_with_empty_question_is_rejected() {
        let mut app = make_app();
        app.select_app(APPLICATIONS[1]);
        app.request_submit();
        assert!(app.pending_action.is_none());
        assert!(app.validation_error.is_some());
    }

    #[test]
    fn test_submit_clears_previous_state() {
        let mut app = ready_app();
        app.result = ResultState::Error("old".to_string());
        app.validation_error = Some("old".to_string());

        let request = app.submit().unwrap();
        assert_eq!(request.query.app_slug, "dropbox");
        assert_eq!(request.query.question, "How do I share a folder?");
        assert_eq!(app.result, ResultState::NoResult);
        assert!(app.validation_error.is_none());
        assert_eq!(app.pending, Some(request.ticket));
    }

    #[test]
    fn test_completion_filters_answers() {
        let mut app = ready_app();
        let request = app.submit().unwrap();
        let applied = app.apply_completion(Completion {
            ticket: request.ticket,
            outcome: Ok(vec![answer("Q1", 0.95), answer("Q2", 0.5)]),
        });
        assert!(applied);
        assert!(!app.is_pending());
        assert_eq!(app.result.answers(), &[answer("Q1", 0.95)]);
        assert_eq!(app.answer_cursor, Some(0));
    }

    #[test]
    fn test_completion_with_nothing_above_threshold_is_empty_answers() {
        let mut app = ready_app();
        let request = app.submit().unwrap();
        app.apply_completion(Completion {
            ticket: request.ticket,
            outcome: Ok(vec![answer("Q", 0.1)]),
        });
        assert_eq!(app.result, ResultState::Answers(Vec::new()));
        assert_eq!(app.answer_cursor, None);
    }

    #[test]
    fn test_completion_error_sets_message() {
        let mut app = ready_app();
        let request = app.submit().unwrap();
        app.apply_completion(Completion {
            ticket: request.ticket,
            outcome: Err(FetchError::Server {
                status: 404,
                message: None,
            }),
        });
        assert_eq!(app.result, ResultState::Error("No results found.".to_string()));
    }

    #[test]
    fn test_latest_submission_wins() {
        let mut app = ready_app();
        let first = app.submit().unwrap();
        let second = app.submit().unwrap();
        assert!(second.ticket > first.ticket);

        let stale = app.apply_completion(Completion {
            ticket: first.ticket,
            outcome: Ok(vec![answer("old", 1.0)]),
        });
        assert!(!stale);
        assert_eq!(app.result, ResultState::NoResult);
        assert!(app.is_pending());

        assert!(app.apply_completion(Completion {
            ticket: second.ticket,
            outcome: Ok(vec![answer("new", 1.0)]),
        }));
        assert_eq!(app.result.answers()[0].question, "new");

        // A late first completion after the second applied is still stale.
        assert!(!app.apply_completion(Completion {
            ticket: first.ticket,
            outcome: Ok(vec![answer("old", 1.0)]),
        }));
        assert_eq!(app.result.answers()[0].question, "new");
    }

    #[test]
    fn test_accordion_entries_toggle_independently() {
        let mut app = ready_app();
        let request = app.submit().unwrap();
        app.apply_completion(Completion {
            ticket: request.ticket,
            outcome: Ok(vec![answer("A", 0.9), answer("B", 0.95), answer("C", 1.0)]),
        });

        app.toggle_answer(0);
        app.toggle_answer(2);
        assert!(app.is_expanded(0));
        assert!(!app.is_expanded(1));
        assert!(app.is_expanded(2));

        app.toggle_answer(0);
        assert!(!app.is_expanded(0));
        assert!(app.is_expanded(2));

        app.toggle_answer(7);
        assert_eq!(app.expanded.len(), 1);

        app.expand_all_answers();
        assert_eq!(app.expanded.len(), 3);
        app.collapse_all_answers();
        assert!(app.expanded.is_empty());
    }

    #[test]
    fn test_new_submission_resets_accordion() {
        let mut app = ready_app();
        let request = app.submit().unwrap();
        app.apply_completion(Completion {
            ticket: request.ticket,
            outcome: Ok(vec![answer("A", 0.9)]),
        });
        app.toggle_answer(0);
        app.submit().unwrap();
        assert!(app.expanded.is_empty());
        assert_eq!(app.answer_cursor, None);
    }

    #[test]
    fn test_question_editing() {
        let mut app = make_app();
        for c in "hello world".chars() {
            app.question_add_char(c);
        }
        assert_eq!(app.question_cursor, 11);

        app.question_delete_word();
        assert_eq!(app.question, "hello ");
        app.question_move_to_start();
        app.question_delete();
        assert_eq!(app.question, "ello ");
        app.question_move_cursor_right();
        app.question_backspace();
        assert_eq!(app.question, "llo ");
        app.question_clear();
        assert!(app.question.is_empty());
        assert_eq!(app.question_cursor, 0);
    }

    #[test]
    fn test_leaving_picker_closes_suggestions() {
        let mut app = make_app();
        app.toggle_dropdown();
        app.focus_next_pane();
        assert_eq!(app.focused_pane, FocusPane::Question);
        assert!(!app.suggestions_open());
    }
}
