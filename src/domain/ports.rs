use crate::domain::model::{OrgSummary, Source};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// HTTP headers as name/value pairs. Lookups are case-insensitive.
pub type HttpHeaders = Vec<(String, String)>;

/// Get the first header value matching `name` (case-insensitive).
pub fn header_get<'a>(headers: &'a HttpHeaders, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// A successful response from a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub url: String,
    pub status: u16,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        header_get(&self.headers, name)
    }

    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Single HTTP GET with timeout and retry policy baked in.
///
/// Implementations return `ProfileError::Transport` for any non-2xx status
/// left after retries.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, headers: &HttpHeaders) -> Result<HttpResponse>;
}

pub trait AuthHeaderProvider: Send + Sync {
    fn headers_for(&self, source: Source) -> HttpHeaders;
}

/// One repository hosting provider, fetched and folded into a summary.
#[async_trait]
pub trait RepoSource: Send + Sync {
    fn source(&self) -> Source;

    /// Raw repository records, in page order, without normalization.
    async fn list_raw_repos(&self, organization: &str) -> Result<Vec<Value>>;

    async fn summarize(&self, organization: &str) -> Result<OrgSummary>;
}
