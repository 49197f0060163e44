use crate::config::ProfileConfig;
use crate::core::endpoint;
use crate::core::pagination::{LinkHeaderCursor, PageStream};
use crate::domain::model::{OrgSummary, RepositoryFact, Source};
use crate::domain::ports::{AuthHeaderProvider, RepoSource, Transport};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// GitHub organization repositories, paginated through the `Link` header.
pub struct GithubSource {
    transport: Arc<dyn Transport>,
    auth: Arc<dyn AuthHeaderProvider>,
    base_url: String,
    per_page: usize,
    max_pages: usize,
}

impl GithubSource {
    pub fn new(
        transport: Arc<dyn Transport>,
        auth: Arc<dyn AuthHeaderProvider>,
        config: &ProfileConfig,
    ) -> Self {
        Self {
            transport,
            auth,
            base_url: config.base_url(Source::Github).to_string(),
            per_page: config.pagination.per_page,
            max_pages: config.pagination.max_pages,
        }
    }

    pub fn repos_url(&self, organization: &str) -> Result<String> {
        let mut url = endpoint(&self.base_url, &["orgs", organization, "repos"])?;
        url.query_pairs_mut()
            .append_pair("per_page", &self.per_page.to_string());
        Ok(url.into())
    }

    fn pages(&self, organization: &str) -> Result<PageStream<'_, LinkHeaderCursor>> {
        let stream = PageStream::new(
            self.transport.as_ref(),
            self.auth.headers_for(Source::Github),
            LinkHeaderCursor,
            self.repos_url(organization)?,
        );
        Ok(stream.with_max_pages(self.max_pages))
    }
}

/// Map a GitHub repository payload onto a [`RepositoryFact`].
pub fn normalize_github_repo(raw: &Value) -> RepositoryFact {
    RepositoryFact {
        is_private: raw.get("private").and_then(Value::as_bool).unwrap_or(false),
        language: raw
            .get("language")
            .and_then(Value::as_str)
            .filter(|l| !l.is_empty())
            .map(str::to_string),
        is_fork: raw.get("fork").and_then(Value::as_bool).unwrap_or(false),
        watcher_count: raw
            .get("watchers_count")
            .and_then(Value::as_u64)
            .unwrap_or(0),
        topics: raw
            .get("topics")
            .and_then(Value::as_array)
            .map(|topics| {
                topics
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
    }
}

#[async_trait]
impl RepoSource for GithubSource {
    fn source(&self) -> Source {
        Source::Github
    }

    async fn list_raw_repos(&self, organization: &str) -> Result<Vec<Value>> {
        self.pages(organization)?.collect_values().await
    }

    async fn summarize(&self, organization: &str) -> Result<OrgSummary> {
        let mut summary = OrgSummary::new();
        let mut pages = self.pages(organization)?;

        while let Some(page) = pages.advance().await? {
            for raw in &page.values {
                summary.accumulate(&normalize_github_repo(raw));
            }
        }

        tracing::info!(
            "✅ github/{}: {} public repositories over {} pages",
            organization,
            summary.repository_count(),
            pages.pages_fetched()
        );
        Ok(summary)
    }
}
