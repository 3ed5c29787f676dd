//! HTTP access to the FAQ backend and classification of its responses.
//!
//! The backend answers `GET <base>/<app>?question=<text>` with either a JSON
//! array of scored answers or, on failure, an object carrying an optional
//! `error` message.

use anyhow::{Result, bail};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::model::{AnswerItem, Query};

/// Shown when a failed response carries no usable `error` field.
pub const DEFAULT_SERVER_MESSAGE: &str = "No results found.";

/// Why a lookup produced no answers. `Display` is the message shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request could not be completed (DNS, refused, reset, transport timeout).
    #[error("Unable to fetch data.")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The body was not the JSON we expect.
    #[error("Unable to fetch data.")]
    Decode(#[source] serde_json::Error),
    /// The backend answered with a non-success status.
    #[error("{}", .message.as_deref().unwrap_or(DEFAULT_SERVER_MESSAGE))]
    Server { status: u16, message: Option<String> },
}

/// Source of answers for a validated query.
#[cfg_attr(test, mockall::automock)]
pub trait FaqBackend: Send + Sync {
    fn fetch_answers(&self, query: &Query) -> Result<Vec<AnswerItem>, FetchError>;
}

/// The success body is normally an array. The Flask service answers with its
/// single best match as a bare `{question, answer, similarity}` object, which
/// counts as one answer.
#[derive(Deserialize)]
#[serde(untagged)]
enum AnswerPayload {
    Many(Vec<AnswerItem>),
    One(AnswerItem),
}

impl AnswerPayload {
    fn into_items(self) -> Vec<AnswerItem> {
        match self {
            AnswerPayload::Many(items) => items,
            AnswerPayload::One(item) => vec![item],
        }
    }
}

/// Builds `<base>/<app_slug>?question=<question>`, encoding both parts.
pub fn build_query_url(base_url: &Url, query: &Query) -> Url {
    let mut url = base_url.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(&query.app_slug);
    }
    url.query_pairs_mut()
        .clear()
        .append_pair("question", &query.question);
    url
}

/// Maps a status and raw body to answers or a [`FetchError`].
///
/// Answers are returned unfiltered; the similarity threshold is applied by the caller.
pub fn classify_response(status: StatusCode, body: &str) -> Result<Vec<AnswerItem>, FetchError> {
    if status.is_success() {
        let payload: AnswerPayload = serde_json::from_str(body).map_err(FetchError::Decode)?;
        return Ok(payload.into_items());
    }

    let value: Value = serde_json::from_str(body).map_err(FetchError::Decode)?;
    let message = value.get("error").and_then(error_message);
    Err(FetchError::Server {
        status: status.as_u16(),
        message,
    })
}

/// Text of a failure body's `error` field. Empty, zero, false and null values
/// count as absent; other scalars are shown as written.
fn error_message(value: &Value) -> Option<String> {
    match value {
        Value::String(message) if !message.is_empty() => Some(message.clone()),
        Value::Number(number) if number.as_f64() != Some(0.0) => Some(number.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Checks that `raw` parses, can carry path segments, and has no query or fragment.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        bail!("Base URL cannot carry a path: {}", raw);
    }
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Unsupported base URL scheme '{}': {}", url.scheme(), raw);
    }
    if url.query().is_some() || url.fragment().is_some() {
        bail!("Base URL must not carry a query or fragment: {}", raw);
    }
    Ok(url)
}

/// [`FaqBackend`] over a blocking reqwest client.
pub struct HttpBackend {
    client: reqwest::blocking::Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: Url) -> Result<Self> {
        Ok(Self::with_client(
            reqwest::blocking::Client::builder().build()?,
            base_url,
        ))
    }

    pub fn with_client(client: reqwest::blocking::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }
}

impl FaqBackend for HttpBackend {
    fn fetch_answers(&self, query: &Query) -> Result<Vec<AnswerItem>, FetchError> {
        let url = build_query_url(&self.base_url, query);
        debug!(%url, "requesting answers");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| FetchError::Network(Box::new(err)))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|err| FetchError::Network(Box::new(err)))?;
        debug!(status = status.as_u16(), bytes = body.len(), "backend responded");

        classify_response(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    fn query(app_slug: &str, question: &str) -> Query {
        Query {
            app_slug: app_slug.to_string(),
            question: question.to_string(),
        }
    }

    fn test_backend(base_url: Url) -> HttpBackend {
        let client = reqwest::blocking::Client::builder()
            .no_proxy()
            .build()
            .unwrap();
        HttpBackend::with_client(client, base_url)
    }

    /// Serves one canned response and hands back the request line it received.
    fn serve_once(status_line: &'static str, body: &'static str) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 8192];
            let read = stream.read(&mut buf).unwrap();
            let request = String::from_utf8_lossy(&buf[..read]).to_string();
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            request.lines().next().unwrap_or_default().to_string()
        });
        (Url::parse(&format!("http://{}", addr)).unwrap(), handle)
    }

    #[test]
    fn test_build_query_url_encodes_segment_and_question() {
        let base = Url::parse("http://127.0.0.1:5000").unwrap();
        let url = build_query_url(&base, &query("google workspace", "how & why?"));
        assert_eq!(url.path(), "/google%20workspace");
        let pairs: Vec<_> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![("question".to_string(), "how & why?".to_string())]
        );
    }

    #[test]
    fn test_build_query_url_respects_base_path() {
        let with_slash = Url::parse("http://faq.local/api/").unwrap();
        let without_slash = Url::parse("http://faq.local/api").unwrap();
        let q = query("dropbox", "sync");
        assert_eq!(
            build_query_url(&with_slash, &q).as_str(),
            "http://faq.local/api/dropbox?question=sync"
        );
        assert_eq!(
            build_query_url(&without_slash, &q).as_str(),
            "http://faq.local/api/dropbox?question=sync"
        );
    }

    #[test]
    fn test_parse_base_url_rejects_unusable_urls() {
        assert!(parse_base_url("http://127.0.0.1:5000").is_ok());
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("mailto:someone@example.com").is_err());
        assert!(parse_base_url("ftp://example.com").is_err());
        assert!(parse_base_url("http://faq.local/api?key=secret").is_err());
        assert!(parse_base_url("http://faq.local/api#top").is_err());
    }

    #[test]
    fn test_classify_success_array() {
        let body = r#"[{"question":"Q1","answer":"A1","similarity":0.95},{"question":"Q2","answer":"A2","similarity":0.5}]"#;
        let items = classify_response(StatusCode::OK, body).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].question, "Q1");
        assert_eq!(items[1].similarity, 0.5);
    }

    #[test]
    fn test_classify_success_single_object() {
        let body = r#"{"question":"Q1","answer":"A1","similarity":0.93}"#;
        let items = classify_response(StatusCode::OK, body).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].answer, "A1");
    }

    #[test]
    fn test_classify_success_empty_array() {
        assert!(classify_response(StatusCode::OK, "[]").unwrap().is_empty());
    }

    #[test]
    fn test_classify_not_found_without_message() {
        let err = classify_response(StatusCode::NOT_FOUND, "{}").unwrap_err();
        assert!(matches!(err, FetchError::Server { status: 404, .. }));
        assert_eq!(err.to_string(), "No results found.");
    }

    #[test]
    fn test_classify_server_error_with_message() {
        let err = classify_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":"server exploded"}"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "server exploded");
    }

    #[test]
    fn test_classify_scalar_error_values() {
        let err = classify_response(StatusCode::BAD_REQUEST, r#"{"error":5}"#).unwrap_err();
        assert_eq!(err.to_string(), "5");

        let err = classify_response(StatusCode::BAD_REQUEST, r#"{"error":true}"#).unwrap_err();
        assert_eq!(err.to_string(), "true");

        for falsy in [r#"{"error":0}"#, r#"{"error":false}"#, r#"{"error":null}"#] {
            let err = classify_response(StatusCode::BAD_REQUEST, falsy).unwrap_err();
            assert_eq!(err.to_string(), DEFAULT_SERVER_MESSAGE, "body {falsy}");
        }
    }

    #[test]
    fn test_classify_empty_error_message_falls_back() {
        let err = classify_response(StatusCode::BAD_REQUEST, r#"{"error":""}"#).unwrap_err();
        assert_eq!(err.to_string(), DEFAULT_SERVER_MESSAGE);
    }

    #[test]
    fn test_classify_undecodable_body() {
        let err = classify_response(StatusCode::OK, "<html>oops</html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
        assert_eq!(err.to_string(), "Unable to fetch data.");

        let err = classify_response(StatusCode::BAD_GATEWAY, "Bad Gateway").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn test_http_backend_success_round_trip() {
        let (base, server) = serve_once(
            "200 OK",
            r#"[{"question":"Q1","answer":"A1","similarity":0.95},{"question":"Q2","answer":"A2","similarity":0.5}]"#,
        );
        let backend = test_backend(base);
        let items = backend
            .fetch_answers(&query("dropbox", "how do I sync"))
            .unwrap();
        assert_eq!(items.len(), 2);

        let request_line = server.join().unwrap();
        assert!(request_line.starts_with("GET /dropbox?question=how+do+I+sync "));
    }

    #[test]
    fn test_http_backend_not_found() {
        let (base, server) = serve_once("404 NOT FOUND", "{}");
        let err = test_backend(base)
            .fetch_answers(&query("dropbox", "q"))
            .unwrap_err();
        assert_eq!(err.to_string(), "No results found.");
        server.join().unwrap();
    }

    #[test]
    fn test_http_backend_server_error_message() {
        let (base, server) = serve_once(
            "500 INTERNAL SERVER ERROR",
            r#"{"error":"server exploded"}"#,
        );
        let err = test_backend(base)
            .fetch_answers(&query("zoom", "q"))
            .unwrap_err();
        assert_eq!(err.to_string(), "server exploded");
        server.join().unwrap();
    }

    #[test]
    fn test_http_backend_connection_reset() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            drop(stream);
        });

        let base = Url::parse(&format!("http://{}", addr)).unwrap();
        let err = test_backend(base)
            .fetch_answers(&query("slack", "q"))
            .unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
        assert_eq!(err.to_string(), "Unable to fetch data.");
        server.join().unwrap();
    }

    #[test]
    fn test_http_backend_connection_refused() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let base = Url::parse(&format!("http://{}", addr)).unwrap();
        let err = test_backend(base)
            .fetch_answers(&query("asana", "q"))
            .unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }
}
