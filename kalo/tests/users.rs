mod helpers;

use fake::faker::internet::en::{FreeEmail, Password, Username};
use fake::Fake;
use helpers::{dead_address, TestClient};
use kalo_client::error::ApiError;
use kalo_client::session::{Session, SessionStore};
use kalo_client::token;
use kalo_common::api::{LoginRequest, RegisterRequest};

fn seed_login() -> LoginRequest {
    LoginRequest {
        email: "test@example.com".into(),
        password: "password123".into(),
    }
}

#[tokio::test]
async fn offline_registration_creates_an_account() {
    let address = dead_address().await.unwrap();
    let tc = TestClient::build(&address).unwrap();

    let name: String = Username().fake();
    let email: String = FreeEmail().fake();
    let password: String = Password(8..24).fake();

    let session = tc
        .client
        .register(&RegisterRequest {
            name: name.clone(),
            email: email.clone(),
            password,
        })
        .await
        .unwrap();

    // the seeded store holds user 1, so the first registration is user 2
    assert_eq!(session.user_id, 2);
    assert_eq!(tc.client.session().unwrap().user_id, 2);
    assert!(!tc.client.is_backend_available());

    let profile = tc.client.profile().await.unwrap();
    assert_eq!(profile.email, email);
    assert_eq!(profile.name, name);
}

#[tokio::test]
async fn offline_login_with_the_seeded_account() {
    let address = dead_address().await.unwrap();
    let tc = TestClient::build(&address).unwrap();

    let session = tc.client.login(&seed_login()).await.unwrap();
    assert_eq!(session.user_id, 1);

    let profile = tc.client.profile().await.unwrap();
    assert_eq!(profile.name, "Test User");
    assert_eq!(profile.height, Some(170.0));
    assert_eq!(profile.age, Some(25));
    assert_eq!(profile.blood_type.map(|b| b.group()), Some(2));
}

#[tokio::test]
async fn offline_login_with_wrong_credentials_keeps_the_transport_error() {
    let address = dead_address().await.unwrap();
    let tc = TestClient::build(&address).unwrap();

    let err = tc
        .client
        .login(&LoginRequest {
            email: "test@example.com".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();

    // auth routes surface the transport failure, not the offline rejection
    assert!(matches!(err, ApiError::Connectivity { .. }));
    assert!(tc.client.session().is_none());
}

#[tokio::test]
async fn duplicate_registration_keeps_the_transport_error() {
    let address = dead_address().await.unwrap();
    let tc = TestClient::build(&address).unwrap();

    let err = tc
        .client
        .register(&RegisterRequest {
            name: "Someone Else".into(),
            email: "test@example.com".into(),
            password: "password123".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Connectivity { .. }));
    assert!(tc.client.session().is_none());
}

#[tokio::test]
async fn logout_clears_the_session() {
    let address = dead_address().await.unwrap();
    let tc = TestClient::build(&address).unwrap();

    tc.client.login(&seed_login()).await.unwrap();
    assert!(tc.client.session().is_some());

    tc.client.logout().await.unwrap();
    assert!(tc.client.session().is_none());
}

#[tokio::test]
async fn refresh_rotates_the_session() {
    let address = dead_address().await.unwrap();
    let tc = TestClient::build(&address).unwrap();

    let first = tc.client.login(&seed_login()).await.unwrap();
    let second = tc.client.refresh_session().await.unwrap();

    assert_eq!(second.user_id, first.user_id);
    assert_eq!(tc.client.session().unwrap().user_id, first.user_id);
}

#[tokio::test]
async fn refresh_with_a_foreign_token_terminates_the_session() {
    let address = dead_address().await.unwrap();
    let tc = TestClient::build(&address).unwrap();

    let access = token::mint_access(1, token::unix_now());
    let session = Session {
        user_id: 1,
        access_token: access,
        refresh_token: "refresh_garbage".into(),
        expires_at: token::unix_now() + 3600,
    };
    SessionStore::new(&tc.settings.session_path)
        .save(&session)
        .unwrap();

    let err = tc.client.refresh_session().await.unwrap_err();
    assert!(matches!(err, ApiError::Connectivity { .. }));
    assert!(tc.client.session().is_none());
}
