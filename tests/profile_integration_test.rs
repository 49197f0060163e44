mod common;

use httpmock::prelude::*;
use org_profile::{combine, ProfileError};
use serde_json::json;

fn mock_github(server: &MockServer, status: u16) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/orgs/acme/repos");
        then.status(status).json_body(json!([
            {"private": false, "language": "Rust", "fork": false, "watchers_count": 4, "topics": ["cli"]},
            {"private": false, "language": null, "fork": true, "watchers_count": 1, "topics": []}
        ]));
    })
}

fn mock_bitbucket(server: &MockServer, status: u16) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/2.0/repositories/acme");
        then.status(status).json_body(json!({"values": [
            {"is_private": false, "language": "rust"},
            {"is_private": false, "language": "Rust", "parent": {}}
        ]}));
    })
}

#[tokio::test]
async fn test_profile_combines_github_and_bitbucket() {
    let server = MockServer::start();
    let github = mock_github(&server, 200);
    let bitbucket = mock_bitbucket(&server, 200);

    let profile = common::service_for(&server).get_profile("acme").await.unwrap();

    assert_eq!(
        serde_json::to_value(profile.snapshot()).unwrap(),
        json!({
            "original_repositories": 2,
            "forked_repositories": 2,
            "watchers_count": 5,
            "languages": {"Rust": 2, "rust": 1, "No Language Specified": 1},
            "topics": {"cli": 1}
        })
    );
    github.assert_hits(1);
    bitbucket.assert_hits(1);
}

#[tokio::test]
async fn test_profile_matches_combined_single_source_summaries() {
    let server = MockServer::start();
    let _github = mock_github(&server, 200);
    let _bitbucket = mock_bitbucket(&server, 200);
    let service = common::service_for(&server);

    let github = service
        .get_org_summary(org_profile::Source::Github, "acme")
        .await
        .unwrap();
    let bitbucket = service
        .get_org_summary(org_profile::Source::Bitbucket, "acme")
        .await
        .unwrap();
    let profile = service.get_profile("acme").await.unwrap();

    assert_eq!(profile, combine(&github, &bitbucket));
    assert_eq!(profile, combine(&bitbucket, &github));
}

#[tokio::test]
async fn test_profile_fails_when_a_source_fails() {
    let server = MockServer::start();
    let _github = mock_github(&server, 200);
    let bitbucket = mock_bitbucket(&server, 403);

    let err = common::service_for(&server)
        .get_profile("acme")
        .await
        .unwrap_err();

    assert!(matches!(err, ProfileError::Transport { status: 403, .. }));
    assert_eq!(err.exit_code(), 2);
    bitbucket.assert_hits(1);
}

#[tokio::test]
async fn test_server_errors_are_retried_before_failing() {
    let server = MockServer::start();
    let github = mock_github(&server, 500);

    let err = common::service_for(&server)
        .get_org_summary(org_profile::Source::Github, "acme")
        .await
        .unwrap_err();

    assert!(err.is_transport());
    // One initial attempt plus two retries.
    github.assert_hits(3);
}
