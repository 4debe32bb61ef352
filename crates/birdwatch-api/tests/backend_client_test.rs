#![allow(clippy::unwrap_used)]
// Integration tests for `BackendClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use birdwatch_api::types::{BirdBody, FileReferenceBody, LocationBody, ProfileBody};
use birdwatch_api::{BackendClient, Credentials, Error, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, BackendClient) {
    let server = MockServer::start().await;
    let client = BackendClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

// ── Birds ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_all_bird_data() {
    let (server, client) = setup().await;

    let body = json!([
        {
            "id": 1,
            "localName": "Hudhud",
            "englishName": "Eurasian Hoopoe",
            "scientificName": "Upupa epops",
            "images": ["birds/hoopoe.jpg"],
            "locations": [
                { "latitude": 23.6, "longitude": 58.5, "placeName": "Muscat", "region": "Capital" }
            ]
        },
        { "id": "b-2", "localName": "Sooty Falcon" }
    ]);

    Mock::given(method("GET"))
        .and(path("/api/v1/birds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let birds = client.get_all_bird_data().await.unwrap();

    assert_eq!(birds.len(), 2);
    assert_eq!(birds[0].id, Some(json!(1)));
    assert_eq!(birds[0].english_name.as_deref(), Some("Eurasian Hoopoe"));
    assert_eq!(birds[0].images.as_ref().unwrap().len(), 1);
    let loc = &birds[0].locations.as_ref().unwrap()[0];
    assert_eq!(loc.place_name.as_deref(), Some("Muscat"));
    assert_eq!(loc.latitude, Some(json!(23.6)));
    assert_eq!(birds[1].id, Some(json!("b-2")));
    assert!(birds[1].locations.is_none());
}

#[tokio::test]
async fn test_get_bird_details_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/birds/by-name/Sooty%20Falcon"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": 9, "localName": "Sooty Falcon" })),
        )
        .mount(&server)
        .await;

    let bird = client.get_bird_details("Sooty Falcon").await.unwrap();
    assert_eq!(bird.unwrap().local_name.as_deref(), Some("Sooty Falcon"));
}

#[tokio::test]
async fn test_get_bird_details_missing_is_none() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/birds/by-name/Dodo"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "no such bird" })),
        )
        .mount(&server)
        .await;

    assert!(client.get_bird_details("Dodo").await.unwrap().is_none());
}

#[tokio::test]
async fn test_add_bird_sends_body() {
    let (server, client) = setup().await;

    let request = BirdBody {
        local_name: "Hudhud".into(),
        scientific_name: "Upupa epops".into(),
        locations: vec![LocationBody {
            latitude: 23.6,
            longitude: 58.5,
            place_name: "Muscat".into(),
            ..LocationBody::default()
        }],
        ..BirdBody::default()
    };

    Mock::given(method("POST"))
        .and(path("/api/v1/birds"))
        .and(body_json(serde_json::to_value(&request).unwrap()))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "id": 42, "localName": "Hudhud" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let created = client.add_bird(&request).await.unwrap();
    assert_eq!(created.id, Some(json!(42)));
}

#[tokio::test]
async fn test_update_and_delete_bird() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/birds/42"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": 42, "localName": "Hoopoe" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/birds/42"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let updated = client
        .update_bird(
            "42",
            &BirdBody {
                local_name: "Hoopoe".into(),
                ..BirdBody::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.local_name.as_deref(), Some("Hoopoe"));

    client.delete_bird("42").await.unwrap();
}

// ── Locations & files ───────────────────────────────────────────────

#[tokio::test]
async fn test_location_endpoints() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/birds/7/locations"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/birds/7/locations/0"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/locations"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([
                { "latitude": "17.02", "longitude": 54.09, "region": "Dhofar" }
            ])),
        )
        .mount(&server)
        .await;

    client
        .add_location("7", &LocationBody::default())
        .await
        .unwrap();
    client.delete_location("7", 0).await.unwrap();

    let locations = client.get_all_locations().await.unwrap();
    assert_eq!(locations[0].latitude, Some(json!("17.02")));
    assert_eq!(locations[0].region.as_deref(), Some("Dhofar"));
}

#[tokio::test]
async fn test_file_reference_endpoints() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/files"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "path": "birds/a.jpg", "hash": "abc" })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/files"))
        .and(query_param("path", "birds/missing.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/files"))
        .and(query_param("path", "birds/a.jpg"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let registered = client
        .register_file_reference(&FileReferenceBody {
            path: "birds/a.jpg".into(),
            hash: "abc".into(),
        })
        .await
        .unwrap();
    assert_eq!(registered.hash.as_deref(), Some("abc"));

    assert!(
        client
            .get_file_reference("birds/missing.jpg")
            .await
            .unwrap()
            .is_none()
    );

    client.drop_file_reference("birds/a.jpg").await.unwrap();
}

// ── Caller identity ─────────────────────────────────────────────────

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let server = MockServer::start().await;
    let client = BackendClient::new(
        &server.uri(),
        &Credentials::bearer("field-token"),
        &TransportConfig::default(),
    )
    .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/me/is-admin"))
        .and(header("authorization", "Bearer field-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "isAdmin": true })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.is_caller_admin().await.unwrap());
}

#[tokio::test]
async fn test_profile_and_role() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/me/profile"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/me/profile"))
        .and(body_json(json!({ "name": "Aisha" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/me/role"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "role": "user" })))
        .mount(&server)
        .await;

    assert!(client.get_caller_user_profile().await.unwrap().is_none());
    client
        .save_caller_user_profile(&ProfileBody {
            name: "Aisha".into(),
        })
        .await
        .unwrap();
    let role = client.get_caller_user_role().await.unwrap();
    assert_eq!(role.role.as_deref(), Some("user"));
}

// ── Error handling ──────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/me/role"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "token expired" })),
        )
        .mount(&server)
        .await;

    let result = client.get_caller_user_role().await;
    match result {
        Err(Error::Authentication { message }) => assert_eq!(message, "token expired"),
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_keeps_code_and_message() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/birds/3"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "bird has registered media",
            "code": "bird.in-use"
        })))
        .mount(&server)
        .await;

    let err = client.delete_bird("3").await.unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.api_error_code(), Some("bird.in-use"));
    assert!(err.to_string().contains("bird has registered media"));
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/birds"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = client.get_all_bird_data().await;
    assert!(
        matches!(result, Err(Error::Deserialization { ref body, .. }) if body == "not json"),
        "expected Deserialization error, got: {result:?}"
    );
}
