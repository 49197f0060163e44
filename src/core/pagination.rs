//! Draining paginated result sets.
//!
//! Two pagination conventions are supported behind [`PageCursor`]:
//!
//! - [`BodyCursor`]: the decoded body is an object carrying `values`, an
//!   optional `next` URL and an optional declared `size`.
//! - [`LinkHeaderCursor`]: the body is a JSON array and the next URL lives in
//!   the `Link` response header.
//!
//! [`PageStream`] is the single fetch loop driving either of them.

use crate::domain::ports::{HttpHeaders, HttpResponse, Transport};
use crate::utils::error::{ProfileError, Result};
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::LazyLock;

pub const DEFAULT_MAX_PAGES: usize = 1000;

static NEXT_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:<[^>]*>; rel="prev", )?<([^>]*)>; rel="next","#).unwrap()
});

/// One fetched page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub values: Vec<Value>,
    pub next: Option<String>,
    /// Total size of the whole result set, when the remote declares it.
    pub declared_size: Option<u64>,
}

/// Splits a response into its records and the locator of the following page.
pub trait PageCursor: Send + Sync {
    fn read_page(&self, response: &HttpResponse) -> Result<Page>;
}

/// Cursor embedded in the response body (`values` / `next` / `size`).
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyCursor;

impl PageCursor for BodyCursor {
    fn read_page(&self, response: &HttpResponse) -> Result<Page> {
        let body = response.json()?;

        let values = match body.get("values") {
            Some(Value::Array(values)) => values.clone(),
            _ => {
                return Err(ProfileError::UnexpectedResponse {
                    url: response.url.clone(),
                    message: "expected an object with a 'values' array".to_string(),
                })
            }
        };

        let next = body
            .get("next")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        // Negative or non-numeric sizes are treated as undeclared.
        let declared_size = body.get("size").and_then(Value::as_u64);

        Ok(Page {
            values,
            next,
            declared_size,
        })
    }
}

/// Cursor carried in the `Link` response header.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkHeaderCursor;

impl PageCursor for LinkHeaderCursor {
    fn read_page(&self, response: &HttpResponse) -> Result<Page> {
        let values = match response.json()? {
            Value::Array(values) => values,
            _ => {
                return Err(ProfileError::UnexpectedResponse {
                    url: response.url.clone(),
                    message: "expected a JSON array".to_string(),
                })
            }
        };

        Ok(Page {
            values,
            next: parse_next_link(response.header("link")),
            declared_size: None,
        })
    }
}

/// Extract the `rel="next"` URL from a link header.
///
/// Only the `[<prev>; rel="prev", ]<next>; rel="next", ...` layout is
/// recognised. Anything else, including a missing header, means there is no
/// next page.
pub fn parse_next_link(link_header: Option<&str>) -> Option<String> {
    let header = link_header?;
    tracing::debug!("Parsing link header: {}", header);

    NEXT_LINK
        .captures(header)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

/// Lazy sequence of pages starting at a seed URL.
///
/// Each call to [`PageStream::advance`] performs exactly one request. A stream
/// is not resumable: start a new one from the seed to re-read the result set.
pub struct PageStream<'a, C: PageCursor> {
    transport: &'a dyn Transport,
    headers: HttpHeaders,
    cursor: C,
    next: Option<String>,
    visited: HashSet<String>,
    max_pages: usize,
}

impl<'a, C: PageCursor> PageStream<'a, C> {
    pub fn new(
        transport: &'a dyn Transport,
        headers: HttpHeaders,
        cursor: C,
        seed: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            headers,
            cursor,
            next: Some(seed.into()),
            visited: HashSet::new(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }

    pub fn pages_fetched(&self) -> usize {
        self.visited.len()
    }

    /// Fetch the next page, or `None` once the result set is exhausted.
    pub async fn advance(&mut self) -> Result<Option<Page>> {
        let Some(url) = self.next.take() else {
            return Ok(None);
        };

        if self.visited.len() >= self.max_pages {
            tracing::warn!(
                "⚠️ Stopping pagination after {} pages, not fetching {}",
                self.max_pages,
                url
            );
            return Ok(None);
        }

        tracing::info!("Calling {}", url);
        let response = self.transport.get(&url, &self.headers).await?;
        self.visited.insert(url);

        let page = self.cursor.read_page(&response)?;
        tracing::debug!(
            "Got {} values ({} bytes), next: {:?}",
            page.values.len(),
            response.body.len(),
            page.next
        );

        self.next = match &page.next {
            Some(next) if self.visited.contains(next) => {
                tracing::warn!("⚠️ Remote repeated page locator {}, stopping pagination", next);
                None
            }
            other => other.clone(),
        };

        Ok(Some(page))
    }

    /// Drain every remaining page, concatenating their values in order.
    pub async fn collect_values(mut self) -> Result<Vec<Value>> {
        let mut values = Vec::new();
        while let Some(page) = self.advance().await? {
            values.extend(page.values);
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::MockTransport;
    use serde_json::json;

    fn json_response(url: &str, body: Value) -> HttpResponse {
        HttpResponse {
            url: url.to_string(),
            status: 200,
            headers: vec![],
            body: serde_json::to_vec(&body).unwrap(),
        }
    }

    fn linked_response(url: &str, body: Value, link: &str) -> HttpResponse {
        let mut response = json_response(url, body);
        response.headers.push(("Link".to_string(), link.to_string()));
        response
    }

    #[test]
    fn test_parse_next_link_with_prev_next_last() {
        let first = "https://api.github.com/organizations/4314092/repos?per_page=20&page=1";
        let next = "https://api.github.com/organizations/4314092/repos?per_page=20&page=2";
        let last = "https://api.github.com/organizations/4314092/repos?per_page=20&page=3";
        let header =
            format!(r#"<{first}>; rel="prev", <{next}>; rel="next", <{last}>; rel="last""#);

        assert_eq!(parse_next_link(Some(&header)), Some(next.to_string()));
    }

    #[test]
    fn test_parse_next_link_without_prev() {
        let header = r#"<https://h/p?page=2>; rel="next", <https://h/p?page=5>; rel="last""#;
        assert_eq!(parse_next_link(Some(header)), Some("https://h/p?page=2".to_string()));
    }

    #[test]
    fn test_parse_next_link_missing_or_malformed() {
        assert_eq!(parse_next_link(None), None);
        assert_eq!(parse_next_link(Some("")), None);
        assert_eq!(
            parse_next_link(Some("malformed header value that cannot be parsed")),
            None
        );
        // Last page: only prev/first relations.
        assert_eq!(
            parse_next_link(Some(r#"<https://h/p?page=2>; rel="prev", <https://h/p?page=1>; rel="first""#)),
            None
        );
        // `next` not in the second position is not recognised.
        assert_eq!(
            parse_next_link(Some(r#"<https://h/p?page=1>; rel="first", <https://h/p?page=3>; rel="next", <https://h/p?page=4>; rel="last""#)),
            None
        );
    }

    #[test]
    fn test_body_cursor_reads_values_next_and_size() {
        let response = json_response(
            "http://a",
            json!({"size": 3, "values": ["w1", "w2"], "next": "http://b"}),
        );
        let page = BodyCursor.read_page(&response).unwrap();

        assert_eq!(page.values, vec![json!("w1"), json!("w2")]);
        assert_eq!(page.next.as_deref(), Some("http://b"));
        assert_eq!(page.declared_size, Some(3));
    }

    #[test]
    fn test_body_cursor_ignores_negative_size_and_bad_next() {
        let response = json_response("http://a", json!({"size": -1, "values": [], "next": 7}));
        let page = BodyCursor.read_page(&response).unwrap();

        assert_eq!(page.declared_size, None);
        assert_eq!(page.next, None);
    }

    #[test]
    fn test_body_cursor_rejects_missing_values() {
        let response = json_response("http://a", json!({"error": "barf"}));
        let err = BodyCursor.read_page(&response).unwrap_err();
        assert!(matches!(err, ProfileError::UnexpectedResponse { .. }));
    }

    #[test]
    fn test_link_cursor_rejects_non_array_body() {
        let response = json_response("http://a", json!({"message": "nope"}));
        assert!(LinkHeaderCursor.read_page(&response).is_err());
    }

    #[tokio::test]
    async fn test_body_stream_drains_chain_in_order() {
        let transport = MockTransport::new();
        transport.push_response(json_response("http://p1", json!({"values": [1, 2], "next": "http://p2"})));
        transport.push_response(json_response("http://p2", json!({"values": [3], "next": "http://p3"})));
        transport.push_response(json_response("http://p3", json!({"values": [4, 5]})));

        let values = PageStream::new(&transport, vec![], BodyCursor, "http://p1")
            .collect_values()
            .await
            .unwrap();

        assert_eq!(values, vec![json!(1), json!(2), json!(3), json!(4), json!(5)]);
        assert_eq!(transport.requested_urls(), vec!["http://p1", "http://p2", "http://p3"]);
    }

    #[tokio::test]
    async fn test_link_stream_follows_header_until_absent() {
        let transport = MockTransport::new();
        transport.push_response(linked_response(
            "http://p1",
            json!([{"id": 1}]),
            r#"<http://p2>; rel="next", <http://p2>; rel="last""#,
        ));
        transport.push_response(linked_response(
            "http://p2",
            json!([{"id": 2}]),
            r#"<http://p1>; rel="prev", <http://p1>; rel="first""#,
        ));

        let mut stream = PageStream::new(&transport, vec![], LinkHeaderCursor, "http://p1");
        assert!(stream.has_more());
        let first = stream.advance().await.unwrap().unwrap();
        assert_eq!(first.values, vec![json!({"id": 1})]);
        assert!(stream.has_more());
        let second = stream.advance().await.unwrap().unwrap();
        assert_eq!(second.values, vec![json!({"id": 2})]);
        assert!(!stream.has_more());
        assert!(stream.advance().await.unwrap().is_none());
        assert_eq!(stream.pages_fetched(), 2);
        assert_eq!(transport.requested_urls().len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_link_header_ends_pagination() {
        let transport = MockTransport::new();
        transport.push_response(linked_response("http://p1", json!([1, 2]), "garbage"));

        let values = PageStream::new(&transport, vec![], LinkHeaderCursor, "http://p1")
            .collect_values()
            .await
            .unwrap();

        assert_eq!(values, vec![json!(1), json!(2)]);
        assert_eq!(transport.requested_urls().len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_locator_stops_pagination() {
        let transport = MockTransport::new();
        transport.push_response(json_response("http://p1", json!({"values": [1], "next": "http://p2"})));
        transport.push_response(json_response("http://p2", json!({"values": [2], "next": "http://p1"})));

        let values = PageStream::new(&transport, vec![], BodyCursor, "http://p1")
            .collect_values()
            .await
            .unwrap();

        assert_eq!(values, vec![json!(1), json!(2)]);
        assert_eq!(transport.requested_urls().len(), 2);
    }

    #[tokio::test]
    async fn test_max_pages_caps_the_drain() {
        let transport = MockTransport::new();
        transport.push_response(json_response("http://p1", json!({"values": [1], "next": "http://p2"})));
        transport.push_response(json_response("http://p2", json!({"values": [2], "next": "http://p3"})));

        let values = PageStream::new(&transport, vec![], BodyCursor, "http://p1")
            .with_max_pages(2)
            .collect_values()
            .await
            .unwrap();

        assert_eq!(values, vec![json!(1), json!(2)]);
        assert_eq!(transport.requested_urls().len(), 2);
    }

    #[tokio::test]
    async fn test_transport_error_aborts_stream() {
        let transport = MockTransport::new();
        transport.push_response(json_response("http://p1", json!({"values": [1], "next": "http://p2"})));
        transport.push_error("http://p2", 404);

        let result = PageStream::new(&transport, vec![], BodyCursor, "http://p1")
            .collect_values()
            .await;

        assert!(matches!(result, Err(ProfileError::Transport { status: 404, .. })));
    }
}
