use super::toml_config::{ProfileConfig, LOG_LEVELS};
use crate::domain::model::Source;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "org-profile")]
#[command(about = "Summarize an organization's repositories across GitHub and Bitbucket")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// A GitHub authorization token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub github_token: Option<String>,

    /// A Bitbucket authorization token
    #[arg(long, env = "BITBUCKET_TOKEN", hide_env_values = true, global = true)]
    pub bitbucket_token: Option<String>,

    /// The logging level, defaults to INFO
    #[arg(long, global = true, ignore_case = true, value_parser = LOG_LEVELS)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[arg(long, global = true)]
    pub github_url: Option<String>,

    #[arg(long, global = true)]
    pub bitbucket_url: Option<String>,

    #[arg(long, global = true)]
    pub timeout_seconds: Option<u64>,

    /// Upper bound on pages fetched per listing
    #[arg(long, global = true)]
    pub max_pages: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Combined GitHub and Bitbucket summary for an organization
    Profile {
        #[arg(long)]
        name: String,
    },
    /// Summary from a single source
    Summary {
        #[arg(long)]
        source: Source,
        #[arg(long)]
        name: String,
    },
    /// Raw repository records from a single source
    Repos {
        #[arg(long)]
        source: Source,
        #[arg(long)]
        name: String,
    },
    /// Check the tool is alive
    Health,
}

impl CliConfig {
    /// Load the configuration file (if any) and apply command line overrides.
    pub fn resolve(&self) -> Result<ProfileConfig> {
        let mut config = match &self.config {
            Some(path) => ProfileConfig::from_file(path)?,
            None => ProfileConfig::default(),
        };

        if let Some(level) = &self.log_level {
            config.log_level = level.to_ascii_uppercase();
        }
        if let Some(token) = &self.github_token {
            config.github.token = Some(token.clone());
        }
        if let Some(token) = &self.bitbucket_token {
            config.bitbucket.token = Some(token.clone());
        }
        if let Some(url) = &self.github_url {
            config.github.base_url = Some(url.clone());
        }
        if let Some(url) = &self.bitbucket_url {
            config.bitbucket.base_url = Some(url.clone());
        }
        if let Some(timeout) = self.timeout_seconds {
            config.http.timeout_seconds = timeout;
        }
        if let Some(max_pages) = self.max_pages {
            config.pagination.max_pages = max_pages;
        }

        Ok(config)
    }
}
