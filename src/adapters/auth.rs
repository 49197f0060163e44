use crate::config::ProfileConfig;
use crate::domain::model::Source;
use crate::domain::ports::{AuthHeaderProvider, HttpHeaders};

const GITHUB_ACCEPT: &str = "application/vnd.github.mercy-preview+json";

/// Builds request headers from the configured per-source tokens.
#[derive(Debug, Clone, Default)]
pub struct TokenAuth {
    github_token: Option<String>,
    bitbucket_token: Option<String>,
}

impl TokenAuth {
    pub fn new(github_token: Option<String>, bitbucket_token: Option<String>) -> Self {
        let non_blank = |t: Option<String>| t.filter(|t| !t.trim().is_empty());
        Self {
            github_token: non_blank(github_token),
            bitbucket_token: non_blank(bitbucket_token),
        }
    }

    pub fn from_config(config: &ProfileConfig) -> Self {
        Self::new(config.github.token.clone(), config.bitbucket.token.clone())
    }
}

impl AuthHeaderProvider for TokenAuth {
    fn headers_for(&self, source: Source) -> HttpHeaders {
        match source {
            Source::Github => {
                let mut headers = vec![("Accept".to_string(), GITHUB_ACCEPT.to_string())];
                if let Some(token) = &self.github_token {
                    headers.push(("Authorization".to_string(), format!("token {}", token)));
                }
                headers
            }
            Source::Bitbucket => match &self.bitbucket_token {
                Some(token) => vec![("Authorization".to_string(), format!("Bearer {}", token))],
                None => vec![],
            },
        }
    }
}
