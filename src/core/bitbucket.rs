use crate::config::ProfileConfig;
use crate::core::endpoint;
use crate::core::pagination::{BodyCursor, PageStream};
use crate::domain::model::{OrgSummary, RepositoryFact, Source};
use crate::domain::ports::{AuthHeaderProvider, RepoSource, Transport};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// A Bitbucket repository before its watcher count has been resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitbucketRepo {
    pub is_private: bool,
    pub language: Option<String>,
    pub is_fork: bool,
    /// Locator of the paginated watcher list; empty when the record has none.
    pub watchers_ref: String,
}

impl BitbucketRepo {
    /// Bitbucket exposes no topics, so the resulting fact never has any.
    pub fn into_fact(self, watcher_count: u64) -> RepositoryFact {
        RepositoryFact {
            is_private: self.is_private,
            language: self.language,
            is_fork: self.is_fork,
            watcher_count,
            topics: Vec::new(),
        }
    }
}

pub fn normalize_bitbucket_repo(raw: &Value) -> BitbucketRepo {
    BitbucketRepo {
        is_private: raw
            .get("is_private")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        language: raw
            .get("language")
            .and_then(Value::as_str)
            .filter(|l| !l.is_empty())
            .map(str::to_string),
        is_fork: raw.get("parent").is_some(),
        watchers_ref: raw
            .pointer("/links/watchers/href")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    }
}

/// Bitbucket team repositories, paginated through `next` in the body.
pub struct BitbucketSource {
    transport: Arc<dyn Transport>,
    auth: Arc<dyn AuthHeaderProvider>,
    base_url: String,
    max_pages: usize,
}

impl BitbucketSource {
    pub fn new(
        transport: Arc<dyn Transport>,
        auth: Arc<dyn AuthHeaderProvider>,
        config: &ProfileConfig,
    ) -> Self {
        Self {
            transport,
            auth,
            base_url: config.base_url(Source::Bitbucket).to_string(),
            max_pages: config.pagination.max_pages,
        }
    }

    pub fn repos_url(&self, organization: &str) -> Result<String> {
        Ok(endpoint(&self.base_url, &["repositories", organization])?.into())
    }

    fn pages(&self, seed: String) -> PageStream<'_, BodyCursor> {
        PageStream::new(
            self.transport.as_ref(),
            self.auth.headers_for(Source::Bitbucket),
            BodyCursor,
            seed,
        )
        .with_max_pages(self.max_pages)
    }

    /// Size of the paginated result set behind `locator`.
    ///
    /// A size declared by the first page is returned as is, without reading
    /// further. Otherwise every page is drained and its values counted.
    pub async fn resolve_count(&self, locator: &str) -> Result<u64> {
        if locator.is_empty() {
            return Ok(0);
        }

        let mut pages = self.pages(locator.to_string());
        let mut total = 0u64;

        while let Some(page) = pages.advance().await? {
            if pages.pages_fetched() == 1 {
                if let Some(size) = page.declared_size {
                    tracing::debug!("Using declared size {} for {}", size, locator);
                    return Ok(size);
                }
            }
            total += page.values.len() as u64;
        }

        Ok(total)
    }
}

#[async_trait]
impl RepoSource for BitbucketSource {
    fn source(&self) -> Source {
        Source::Bitbucket
    }

    async fn list_raw_repos(&self, organization: &str) -> Result<Vec<Value>> {
        self.pages(self.repos_url(organization)?)
            .collect_values()
            .await
    }

    async fn summarize(&self, organization: &str) -> Result<OrgSummary> {
        let mut summary = OrgSummary::new();
        let mut pages = self.pages(self.repos_url(organization)?);

        while let Some(page) = pages.advance().await? {
            for raw in &page.values {
                let repo = normalize_bitbucket_repo(raw);
                // Private repositories are excluded from the summary anyway.
                let watchers = if repo.is_private {
                    0
                } else {
                    self.resolve_count(&repo.watchers_ref).await?
                };
                summary.accumulate(&repo.into_fact(watchers));
            }
        }

        tracing::info!(
            "✅ bitbucket/{}: {} public repositories over {} pages",
            organization,
            summary.repository_count(),
            pages.pages_fetched()
        );
        Ok(summary)
    }
}
