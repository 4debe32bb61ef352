#![allow(clippy::unwrap_used)]
// Integration tests for `BlobClient` using wiremock.

use bytes::Bytes;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use birdwatch_api::{BlobClient, Error};

async fn setup() -> (MockServer, BlobClient) {
    let server = MockServer::start().await;
    let base = format!("{}/media", server.uri());
    let client = BlobClient::from_reqwest(&base, reqwest::Client::new()).unwrap();
    (server, client)
}

#[tokio::test]
async fn test_upload_returns_hash_and_content_type() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/media/birds/hoopoe.jpg"))
        .and(header("content-type", "image/jpeg"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let payload = Bytes::from_static(b"jpeg-bytes");
    let receipt = client
        .upload("birds/hoopoe.jpg", payload.clone())
        .await
        .unwrap();

    assert_eq!(receipt.path, "birds/hoopoe.jpg");
    assert_eq!(receipt.content_type, "image/jpeg");
    assert_eq!(receipt.hash, blake3::hash(&payload).to_hex().to_string());
}

#[tokio::test]
async fn test_upload_failure_is_storage_error() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/media/calls/falcon.mp3"))
        .respond_with(ResponseTemplate::new(507).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let result = client
        .upload("calls/falcon.mp3", Bytes::from_static(b"mp3"))
        .await;

    match result {
        Err(Error::Storage { status, message }) => {
            assert_eq!(status, 507);
            assert_eq!(message, "quota exceeded");
        }
        other => panic!("expected Storage error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_resolve_url_present() {
    let (server, client) = setup().await;

    Mock::given(method("HEAD"))
        .and(path("/media/birds/hoopoe.jpg"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let url = client.resolve_url("birds/hoopoe.jpg").await.unwrap();
    assert!(url.as_str().ends_with("/media/birds/hoopoe.jpg"));
}

#[tokio::test]
async fn test_resolve_url_missing_is_none() {
    let (server, client) = setup().await;

    Mock::given(method("HEAD"))
        .and(path("/media/birds/gone.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(client.resolve_url("birds/gone.jpg").await.is_none());
}

#[tokio::test]
async fn test_resolve_url_unreachable_is_none() {
    let client = BlobClient::from_reqwest("http://127.0.0.1:9/media", reqwest::Client::new())
        .unwrap();
    assert!(client.resolve_url("birds/any.jpg").await.is_none());
}
