//! Wire-level tests for the client against a mock backend.

use civica_client::{Credentials, PortalClient, RegisterUserRequest};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

async fn client_for(server: &MockServer) -> PortalClient {
    PortalClient::builder()
        .base_url(server.uri())
        .build()
        .unwrap()
}

/// Matches only requests without an Authorization header.
struct NoAuthHeader;

impl Match for NoAuthHeader {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

#[tokio::test]
async fn login_returns_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/users/login"))
        .and(body_json(json!({"username": "ana", "password": "s3cret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "a.b.c"})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let response = client
        .users()
        .login(&Credentials {
            username: "ana".to_string(),
            password: "s3cret".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.token, "a.b.c");
}

#[tokio::test]
async fn armed_token_is_attached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/page/0"))
        .and(header("Authorization", "Bearer tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [],
            "number": 0,
            "totalPages": 1,
            "totalElements": 0,
            "first": true,
            "last": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client.token().set("Bearer tok123").unwrap();

    let page = client.users().list_page(0).await.unwrap();
    assert!(page.content.is_empty());
    assert!(page.first && page.last);
}

#[tokio::test]
async fn unarmed_requests_go_out_unauthenticated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/credit-titles/page/0"))
        .and(NoAuthHeader)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [],
            "number": 0,
            "totalPages": 0,
            "totalElements": 0,
            "first": true,
            "last": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client.credit_titles().page(0).await.unwrap();
}

#[tokio::test]
async fn cleared_token_stops_being_attached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/terms"))
        .and(NoAuthHeader)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client.token().set("Bearer tok").unwrap();
    client.token().clear();

    let terms = client.terms().list().await.unwrap();
    assert!(terms.is_empty());
}

#[tokio::test]
async fn unauthorized_is_distinguished() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/terms"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "token expired"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.terms().list().await.unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn forbidden_carries_constraint_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/users/registration"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "could not execute statement; constraint [users_email_key]"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .users()
        .register(&RegisterUserRequest {
            username: "ana".to_string(),
            email: "ana@mail.com".to_string(),
            password: "pw".to_string(),
            admin: false,
            accepted_terms: true,
        })
        .await
        .unwrap_err();

    assert!(err.is_forbidden());
    let fields = err.constraint_violations();
    assert!(fields.contains_key("email"));
    assert!(!fields.contains_key("username"));
}

#[tokio::test]
async fn validation_body_becomes_field_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/users"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "username": "must not be blank",
            "email": "must be a valid address"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .users()
        .create(&Default::default())
        .await
        .unwrap_err();

    match err {
        civica_client::Error::Validation { fields } => {
            assert_eq!(fields.len(), 2);
            assert_eq!(fields["username"], "must not be blank");
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_keeps_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/terms/latest"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "database unavailable"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.terms().latest().await.unwrap_err();
    assert!(err.is_server_error());
    match err {
        civica_client::Error::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database unavailable");
        }
        other => panic!("expected Api, got {other:?}"),
    }
}

#[tokio::test]
async fn taxpayer_update_strips_document_from_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/taxpayers/1712345678"))
        .and(|request: &Request| {
            let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
            body.get("ci").is_none()
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ci": "1712345678",
            "fullName": "Ana Moreno",
            "address": "Av. Central 12",
            "phone": "0991234567",
            "taxpayerCity": "Cuenca",
            "houseNumber": "12-34"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let taxpayer = civica_client::Taxpayer {
        ci: Some("1712345678".to_string()),
        full_name: "Ana Moreno".to_string(),
        address: "Av. Central 12".to_string(),
        phone: "0991234567".to_string(),
        taxpayer_city: "Cuenca".to_string(),
        house_number: "12-34".to_string(),
        ..Default::default()
    };

    let updated = client.taxpayers().update(&taxpayer).await.unwrap();
    assert_eq!(updated.ci.as_deref(), Some("1712345678"));
}
