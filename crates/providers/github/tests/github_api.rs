//! End-to-end resolution against a mocked GitHub API.

use std::sync::Arc;

use binfetch_assets::PlatformAssets;
use binfetch_core::{
    Arch, CancellationToken, Error, Os, Platform, ProviderConfig, ProviderRegistry,
};
use binfetch_github::GitHubProviderFactory;
use serde_json::json;
use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BINARY: &[u8] = b"\x7fELF-tool-binary";

fn registry(server: &MockServer, token: Option<&str>) -> ProviderRegistry {
    let mut config =
        ProviderConfig::new().with_api_base_url(Url::parse(&server.uri()).unwrap());
    if let Some(token) = token {
        config = config.with_token(token);
    }
    let assets = PlatformAssets::new(Platform::new(Os::Linux, Arch::X86_64)).unwrap();

    let mut registry = ProviderRegistry::new();
    registry.register(GitHubProviderFactory::new(config, Arc::new(assets)));
    registry
}

fn release_json(server: &MockServer, tag: &str) -> serde_json::Value {
    json!({
        "tag_name": tag,
        "html_url": format!("https://github.com/acme/tool/releases/tag/{tag}"),
        "prerelease": tag.contains("rc"),
        "assets": [
            {
                "name": "tool-darwin-arm64",
                "browser_download_url": format!("{}/dl/tool-darwin-arm64", server.uri()),
            },
            {
                "name": "tool-linux-amd64",
                "browser_download_url": format!("{}/dl/tool-linux-amd64", server.uri()),
            },
            {
                "name": "checksums.txt",
                "browser_download_url": format!("{}/dl/checksums.txt", server.uri()),
            }
        ]
    })
}

async fn mount_binary(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/dl/tool-linux-amd64"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(BINARY.to_vec()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_latest_release_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/tool/releases/latest"))
        .and(header("accept", "application/vnd.github+json"))
        .and(header("x-github-api-version", "2022-11-28"))
        .respond_with(ResponseTemplate::new(200).set_body_json(release_json(&server, "v1.4.0")))
        .mount(&server)
        .await;
    mount_binary(&server).await;

    let provider = registry(&server, None)
        .provider_for("https://github.com/acme/tool")
        .unwrap();
    let mut artifact = provider.fetch(&CancellationToken::new()).await.unwrap();

    assert_eq!(artifact.name, "tool");
    assert_eq!(artifact.version, "v1.4.0");

    let mut body = Vec::new();
    artifact.data.read_to_end(&mut body).await.unwrap();
    assert_eq!(body, BINARY);

    artifact.hash.update(&body);
    assert_eq!(
        hex::encode(artifact.hash.finalize()),
        hex::encode(Sha256::digest(BINARY))
    );
}

#[tokio::test]
async fn test_prerelease_only_repository_falls_back_to_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/tool/releases/latest"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/tool/releases"))
        .and(query_param("per_page", "1"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([release_json(&server, "v2.0.0-rc1")])),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_binary(&server).await;

    let provider = registry(&server, None)
        .provider_for("github.com/acme/tool")
        .unwrap();
    let artifact = provider.fetch(&CancellationToken::new()).await.unwrap();
    assert_eq!(artifact.version, "v2.0.0-rc1");
}

#[tokio::test]
async fn test_no_releases_at_all_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/tool/releases/latest"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/tool/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let provider = registry(&server, None)
        .provider_for("https://github.com/acme/tool")
        .unwrap();
    let err = provider
        .latest_version(&CancellationToken::new())
        .await
        .unwrap_err();
    match err {
        Error::ReleaseNotFound { resource, tag, .. } => {
            assert!(resource.ends_with("/repos/acme/tool/releases/latest"), "{resource}");
            assert_eq!(tag, None);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_pinned_tag_is_fetched_directly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/tool/releases/tags/v1.2.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(release_json(&server, "v1.2.0")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/tool/releases/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(release_json(&server, "v9.9.9")))
        .expect(0)
        .mount(&server)
        .await;
    mount_binary(&server).await;

    let provider = registry(&server, None)
        .provider_for("https://github.com/acme/tool/releases/download/v1.2.0/tool-linux-amd64")
        .unwrap();
    let artifact = provider.fetch(&CancellationToken::new()).await.unwrap();
    assert_eq!(artifact.version, "v1.2.0");
}

#[tokio::test]
async fn test_missing_pinned_tag_does_not_fall_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/tool/releases/tags/v0.0.1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/tool/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let provider = registry(&server, None)
        .provider_for("https://github.com/acme/tool/releases/tag/v0.0.1")
        .unwrap();
    let err = provider.fetch(&CancellationToken::new()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_rate_limit_is_a_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/tool/releases/latest"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"message": "API rate limit exceeded for 127.0.0.1."})),
        )
        .mount(&server)
        .await;

    let provider = registry(&server, None)
        .provider_for("https://github.com/acme/tool")
        .unwrap();
    let err = provider.fetch(&CancellationToken::new()).await.unwrap_err();
    match err {
        Error::ProviderTransport {
            provider, message, ..
        } => {
            assert_eq!(provider, "github");
            assert!(message.contains("403"), "{message}");
            assert!(message.contains("rate limit"), "{message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_token_is_sent_as_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/tool/releases/latest"))
        .and(header("authorization", "Bearer ghp_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(release_json(&server, "v3.1.0")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = registry(&server, Some("ghp_test"))
        .provider_for("https://github.com/acme/tool")
        .unwrap();
    let latest = provider
        .latest_version(&CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(latest.tag, "v3.1.0");
    assert_eq!(latest.url, "https://github.com/acme/tool/releases/tag/v3.1.0");
}

#[tokio::test]
async fn test_cancelled_before_request() {
    let server = MockServer::start().await;
    let provider = registry(&server, None)
        .provider_for("https://github.com/acme/tool")
        .unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = provider.fetch(&cancel).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled { .. }));
}

#[tokio::test]
async fn test_encoded_tag_is_requested_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/tool/releases/tags/v1.0.0+build.1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(release_json(&server, "v1.0.0+build.1")),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_binary(&server).await;

    let provider = registry(&server, None)
        .provider_for("https://github.com/acme/tool/releases/tag/v1.0.0%2Bbuild.1")
        .unwrap();
    let artifact = provider.fetch(&CancellationToken::new()).await.unwrap();
    assert_eq!(artifact.version, "v1.0.0+build.1");
}
