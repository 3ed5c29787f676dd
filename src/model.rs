//! Domain types shared by the backend client, the state, and the renderer.

use serde::Deserialize;

use crate::catalog::Application;

/// Answers scoring below this are dropped before they reach the view.
pub const SIMILARITY_THRESHOLD: f64 = 0.9;

/// One candidate question/answer pair returned by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnswerItem {
    pub question: String,
    pub answer: String,
    /// Backend relevance score in `[0, 1]`.
    pub similarity: f64,
}

/// Outcome of the last submission as shown in the answers pane.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResultState {
    #[default]
    NoResult,
    Error(String),
    /// Only ever holds items at or above [`SIMILARITY_THRESHOLD`].
    Answers(Vec<AnswerItem>),
}

impl ResultState {
    pub fn answers(&self) -> &[AnswerItem] {
        match self {
            ResultState::Answers(items) => items,
            _ => &[],
        }
    }
}

/// Keeps the items at or above the similarity threshold, preserving order.
pub fn filter_answers(items: Vec<AnswerItem>) -> Vec<AnswerItem> {
    items
        .into_iter()
        .filter(|item| item.similarity >= SIMILARITY_THRESHOLD)
        .collect()
}

/// Rejected submission. Raised before any network activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("Please select an app and enter a question.")]
    MissingInput,
}

/// Validated input for one backend lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Lower-cased application name used as the route.
    pub app_slug: String,
    pub question: String,
}

/// Checks that an application is selected and the question is non-empty.
pub fn prepare_query(
    selection: Option<&Application>,
    question: &str,
) -> Result<Query, SubmitError> {
    match selection {
        Some(app) if !question.is_empty() => Ok(Query {
            app_slug: app.slug(),
            question: question.to_string(),
        }),
        _ => Err(SubmitError::MissingInput),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::APPLICATIONS;

    fn item(question: &str, similarity: f64) -> AnswerItem {
        AnswerItem {
            question: question.to_string(),
            answer: format!("answer to {}", question),
            similarity,
        }
    }

    #[test]
    fn test_filter_answers_threshold_boundaries() {
        let items = vec![
            item("below", 0.899999),
            item("exact", 0.9),
            item("above", 0.900001),
            item("perfect", 1.0),
            item("zero", 0.0),
        ];
        let kept: Vec<_> = filter_answers(items)
            .into_iter()
            .map(|item| item.question)
            .collect();
        assert_eq!(kept, vec!["exact", "above", "perfect"]);
    }

    #[test]
    fn test_filter_answers_preserves_order() {
        let items = vec![item("c", 0.95), item("a", 0.5), item("b", 0.91)];
        let kept: Vec<_> = filter_answers(items)
            .into_iter()
            .map(|item| item.question)
            .collect();
        assert_eq!(kept, vec!["c", "b"]);
    }

    #[test]
    fn test_filter_answers_can_be_empty() {
        assert!(filter_answers(vec![item("a", 0.2)]).is_empty());
    }

    #[test]
    fn test_prepare_query_requires_selection_and_text() {
        assert_eq!(
            prepare_query(None, "anything"),
            Err(SubmitError::MissingInput)
        );
        assert_eq!(
            prepare_query(Some(&APPLICATIONS[0]), ""),
            Err(SubmitError::MissingInput)
        );
    }

    #[test]
    fn test_prepare_query_uses_slug() {
        let query = prepare_query(Some(&APPLICATIONS[4]), "How do I share a doc?").unwrap();
        assert_eq!(query.app_slug, "google workspace");
        assert_eq!(query.question, "How do I share a doc?");
    }

    #[test]
    fn test_answer_item_accepts_integer_similarity() {
        let item: AnswerItem =
            serde_json::from_str(r#"{"question":"q","answer":"","similarity":0}"#).unwrap();
        assert_eq!(item.similarity, 0.0);
    }
}
