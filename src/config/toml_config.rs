use crate::domain::model::Source;
use crate::utils::error::{ProfileError, Result};
use crate::utils::validation::{
    validate_one_of, validate_positive_number, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_GITHUB_URL: &str = "https://api.github.com";
pub const DEFAULT_BITBUCKET_URL: &str = "https://api.bitbucket.org/2.0";
pub const LOG_LEVELS: [&str; 4] = ["DEBUG", "INFO", "WARN", "ERROR"];

/// Process configuration handed explicitly to the transport, auth and sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub log_level: String,
    pub github: SourceConfig,
    pub bitbucket: SourceConfig,
    pub http: HttpConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
    pub retry_statuses: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub per_page: usize,
    pub max_pages: usize,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            log_level: "INFO".to_string(),
            github: SourceConfig::default(),
            bitbucket: SourceConfig::default(),
            http: HttpConfig::default(),
            pagination: PaginationConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 5,
            retry_attempts: 3,
            retry_backoff_ms: 200,
            retry_statuses: vec![500, 502, 504],
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            per_page: 100,
            max_pages: crate::core::pagination::DEFAULT_MAX_PAGES,
        }
    }
}

impl ProfileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ProfileError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` with the value of the environment variable, or with
    /// nothing when it is unset.
    fn substitute_env_vars(content: &str) -> String {
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
    }

    pub fn source(&self, source: Source) -> &SourceConfig {
        match source {
            Source::Github => &self.github,
            Source::Bitbucket => &self.bitbucket,
        }
    }

    pub fn base_url(&self, source: Source) -> &str {
        let default = match source {
            Source::Github => DEFAULT_GITHUB_URL,
            Source::Bitbucket => DEFAULT_BITBUCKET_URL,
        };
        self.source(source)
            .base_url
            .as_deref()
            .unwrap_or(default)
            .trim_end_matches('/')
    }
}

impl Validate for ProfileConfig {
    fn validate(&self) -> Result<()> {
        validate_one_of("log_level", &self.log_level, &LOG_LEVELS)?;

        for source in Source::ALL {
            validate_url(&format!("{}.base_url", source), self.base_url(source))?;
        }

        validate_positive_number("http.timeout_seconds", self.http.timeout_seconds as usize, 1)?;
        validate_range("pagination.per_page", self.pagination.per_page, 1, 100)?;
        validate_positive_number("pagination.max_pages", self.pagination.max_pages, 1)?;

        Ok(())
    }
}
