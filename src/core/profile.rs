use crate::adapters::{ReqwestTransport, TokenAuth};
use crate::config::ProfileConfig;
use crate::core::bitbucket::BitbucketSource;
use crate::core::github::GithubSource;
use crate::domain::model::{combine, OrgSummary, Source};
use crate::domain::ports::{AuthHeaderProvider, RepoSource, Transport};
use crate::utils::error::Result;
use crate::utils::validation::validate_non_empty_string;
use serde_json::Value;
use std::sync::Arc;

/// Entry point used by the binary: one summary per source, or both combined.
pub struct ProfileService {
    github: Box<dyn RepoSource>,
    bitbucket: Box<dyn RepoSource>,
}

impl ProfileService {
    pub fn new(github: Box<dyn RepoSource>, bitbucket: Box<dyn RepoSource>) -> Self {
        Self { github, bitbucket }
    }

    pub fn with_transport(
        transport: Arc<dyn Transport>,
        auth: Arc<dyn AuthHeaderProvider>,
        config: &ProfileConfig,
    ) -> Self {
        Self::new(
            Box::new(GithubSource::new(transport.clone(), auth.clone(), config)),
            Box::new(BitbucketSource::new(transport, auth, config)),
        )
    }

    pub fn from_config(config: &ProfileConfig) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config.http)?);
        let auth = Arc::new(TokenAuth::from_config(config));
        Ok(Self::with_transport(transport, auth, config))
    }

    fn source(&self, source: Source) -> &dyn RepoSource {
        match source {
            Source::Github => self.github.as_ref(),
            Source::Bitbucket => self.bitbucket.as_ref(),
        }
    }

    pub async fn get_org_summary(&self, source: Source, organization: &str) -> Result<OrgSummary> {
        validate_non_empty_string("name", organization)?;
        let repo_source = self.source(source);
        tracing::info!("📊 Summarizing {} on {}", organization, repo_source.source());
        repo_source.summarize(organization).await
    }

    pub async fn list_raw_repos(&self, source: Source, organization: &str) -> Result<Vec<Value>> {
        validate_non_empty_string("name", organization)?;
        self.source(source).list_raw_repos(organization).await
    }

    /// Summaries from both sources, fetched concurrently and combined.
    pub async fn get_profile(&self, organization: &str) -> Result<OrgSummary> {
        let (github, bitbucket) = tokio::try_join!(
            self.get_org_summary(Source::Github, organization),
            self.get_org_summary(Source::Bitbucket, organization),
        )?;
        Ok(combine(&github, &bitbucket))
    }
}
