pub mod bitbucket;
pub mod github;
pub mod pagination;
pub mod profile;

pub use crate::domain::model::{combine, OrgSummary, RepositoryFact, Source};
pub use crate::domain::ports::{AuthHeaderProvider, RepoSource, Transport};
pub use crate::utils::error::Result;

use crate::utils::error::ProfileError;
use url::Url;

/// Append path segments to a base API URL, escaping each one.
pub(crate) fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url> {
    let invalid = |reason: String| ProfileError::InvalidConfigValue {
        field: "base_url".to_string(),
        value: base_url.to_string(),
        reason,
    };

    let mut url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| invalid("URL cannot be a base".to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
