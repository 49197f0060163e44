use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Request to {url} failed with status {status}")]
    Transport { url: String, status: u16 },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unexpected response from {url}: {message}")]
    UnexpectedResponse { url: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },
}

impl ProfileError {
    /// Errors raised while talking to a remote source.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ProfileError::Transport { .. }
                | ProfileError::Http(_)
                | ProfileError::Serialization(_)
                | ProfileError::UnexpectedResponse { .. }
        )
    }

    pub fn is_config(&self) -> bool {
        matches!(
            self,
            ProfileError::ConfigError { .. }
                | ProfileError::InvalidConfigValue { .. }
                | ProfileError::MissingConfig { .. }
        )
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_config() {
            1
        } else if self.is_transport() {
            2
        } else {
            3
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ProfileError::Transport { status: 401 | 403, .. } => {
                format!("{} (check the configured access token)", self)
            }
            ProfileError::Transport { status: 404, .. } => {
                format!("{} (no such organization or team?)", self)
            }
            ProfileError::Http(e) if e.is_timeout() => {
                "The remote API did not answer in time, try again later".to_string()
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProfileError>;
