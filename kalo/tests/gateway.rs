mod helpers;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use helpers::{dead_address, live_router, spawn_backend, TestClient};
use kalo_client::api_client::{ApiClient, Navigate};
use kalo_client::availability::{self, RequestFailure};
use kalo_client::error::ApiError;
use kalo_client::session::{Session, SessionStore};
use kalo_client::token;
use kalo_common::api::{ApiRequest, LoginRequest};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn seed_login() -> LoginRequest {
    LoginRequest {
        email: "test@example.com".into(),
        password: "password123".into(),
    }
}

#[tokio::test]
async fn a_healthy_backend_serves_requests() {
    let address = spawn_backend(live_router()).await.unwrap();
    let tc = TestClient::build(&address).unwrap();

    let session = tc
        .client
        .login(&LoginRequest {
            email: "live@example.com".into(),
            password: "anything".into(),
        })
        .await
        .unwrap();
    assert_eq!(session.user_id, 7);
    assert!(tc.client.is_backend_available());

    // Dragonfruit only exists on the live backend, not in the catalog
    let hits = tc.client.search_products("dragon").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title.primary(), "Dragonfruit");
}

#[tokio::test]
async fn an_outage_reroutes_to_the_offline_backend() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let tc = TestClient::build(&server.uri()).unwrap();
    let hits = tc.client.search_products("apple").await.unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title.primary(), "Яблуко");
    assert!(!tc.client.is_backend_available());
}

#[tokio::test]
async fn recovery_marks_the_backend_available_again() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let tc = TestClient::build(&server.uri()).unwrap();
    tc.client.search_products("apple").await.unwrap();
    assert!(!tc.client.is_backend_available());

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/products/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let hits = tc.client.search_products("apple").await.unwrap();
    assert!(hits.is_empty());
    assert!(tc.client.is_backend_available());
}

#[tokio::test]
async fn bad_credentials_on_a_dead_deployment_fall_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    // a 401 from an auth route routes the login to the offline backend
    // instead of terminating anything
    let tc = TestClient::build(&server.uri()).unwrap();
    let session = tc.client.login(&seed_login()).await.unwrap();

    assert_eq!(session.user_id, 1);
    assert!(!tc.client.is_backend_available());
}

struct RememberLogin(Arc<AtomicBool>);

impl Navigate for RememberLogin {
    fn to_login(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn a_rejected_session_forces_logout() {
    let r = Router::new().route(
        "/api/profile",
        get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "message": "jwt expired" }))) }),
    );
    let address = spawn_backend(r).await.unwrap();

    let tc = TestClient::build(&address).unwrap();
    let sent_to_login = Arc::new(AtomicBool::new(false));
    let client = ApiClient::with_navigator(
        &tc.settings,
        Some(Arc::new(RememberLogin(sent_to_login.clone()))),
    )
    .unwrap();

    let access = token::mint_access(1, token::unix_now());
    let session = Session {
        user_id: 1,
        access_token: access.clone(),
        refresh_token: token::mint_refresh(&access),
        expires_at: token::unix_now() + 3600,
    };
    SessionStore::new(&tc.settings.session_path)
        .save(&session)
        .unwrap();

    let err = client.profile().await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::Auth {
            status: 401,
            auth_endpoint: false,
            ..
        }
    ));
    assert!(sent_to_login.load(Ordering::SeqCst));
    assert!(client.session().is_none());
}

#[tokio::test]
async fn the_wake_sequence_runs_once() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let tc = TestClient::build(&server.uri()).unwrap();

    assert!(!tc.client.ensure_awake().await);
    let probes = server.received_requests().await.unwrap().len();
    assert_eq!(probes, 2);

    // the second call reports the flag without probing again
    assert!(!tc.client.ensure_awake().await);
    assert_eq!(server.received_requests().await.unwrap().len(), probes);
}

#[tokio::test]
async fn waking_a_live_backend_succeeds() {
    let address = spawn_backend(live_router()).await.unwrap();
    let tc = TestClient::build(&address).unwrap();

    assert!(tc.client.ensure_awake().await);
    assert!(tc.client.is_backend_available());
}

#[tokio::test]
async fn without_the_fallback_outages_surface() {
    let address = dead_address().await.unwrap();
    let tc = TestClient::build_without_fallback(&address).unwrap();

    let err = tc.client.search_products("apple").await.unwrap_err();
    assert!(matches!(err, ApiError::Connectivity { .. }));
    assert!(!tc.client.is_backend_available());
}

#[tokio::test]
async fn unknown_routes_fall_through_to_the_transport_error() {
    let address = dead_address().await.unwrap();
    let tc = TestClient::build(&address).unwrap();

    let err = tc
        .client
        .send(ApiRequest::get("/api/unknown"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Connectivity { .. }));
}

#[tokio::test]
async fn a_missing_offline_profile_is_not_found() {
    let address = dead_address().await.unwrap();
    let tc = TestClient::build(&address).unwrap();

    let access = token::mint_access(999, token::unix_now());
    let session = Session {
        user_id: 999,
        access_token: access.clone(),
        refresh_token: token::mint_refresh(&access),
        expires_at: token::unix_now() + 3600,
    };
    SessionStore::new(&tc.settings.session_path)
        .save(&session)
        .unwrap();

    let err = tc.client.profile().await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
    assert_eq!(err.message(), "Profile not found");
}

#[test]
fn outage_classification() {
    let dropped = RequestFailure {
        status: None,
        message: "fetch failed".into(),
        connect: false,
        timeout: false,
    };
    assert!(availability::is_unavailable(&dropped));

    assert!(availability::is_unavailable(&RequestFailure::from_status(
        503,
        "Service Unavailable"
    )));
    assert!(availability::is_unavailable(&RequestFailure::from_status(
        404, "Not Found"
    )));
    assert!(availability::is_unavailable(&RequestFailure::from_status(
        500,
        "Internal Server Error"
    )));

    assert!(!availability::is_unavailable(&RequestFailure::from_status(
        403, "Forbidden"
    )));
    assert!(!availability::is_unavailable(&RequestFailure::from_status(
        401,
        "Unauthorized"
    )));

    assert!(availability::is_unavailable(&RequestFailure::from_status(
        400,
        "CORS request did not succeed"
    )));

    let refused = RequestFailure {
        status: Some(418),
        message: "teapot".into(),
        connect: true,
        timeout: false,
    };
    assert!(availability::is_unavailable(&refused));
}
