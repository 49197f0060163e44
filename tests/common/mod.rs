#![allow(dead_code)]

use httpmock::MockServer;
use org_profile::config::{HttpConfig, ProfileConfig};
use org_profile::ProfileService;

/// Configuration pointing both sources at the mock server, with fast retries.
pub fn config_for(server: &MockServer) -> ProfileConfig {
    let mut config = ProfileConfig::default();
    config.github.base_url = Some(server.base_url());
    config.bitbucket.base_url = Some(format!("{}/2.0", server.base_url()));
    config.http = HttpConfig {
        timeout_seconds: 5,
        retry_attempts: 2,
        retry_backoff_ms: 1,
        retry_statuses: vec![500, 502, 504],
    };
    config
}

pub fn service_for(server: &MockServer) -> ProfileService {
    ProfileService::from_config(&config_for(server)).unwrap()
}
