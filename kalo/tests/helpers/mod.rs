use axum::routing::{get, post};
use axum::serve;
use axum::{Json, Router};
use eyre::{eyre, Result};
use kalo_client::api_client::ApiClient;
use kalo_client::settings::Settings;
use kalo_client::token;
use serde_json::json;
use tokio::net::TcpListener;

pub struct TestClient {
    pub settings: Settings,
    pub client: ApiClient,
    _dir: tempfile::TempDir,
}

impl TestClient {
    pub fn build(server_address: &str) -> Result<Self> {
        Self::build_inner(server_address, true)
    }

    pub fn build_without_fallback(server_address: &str) -> Result<Self> {
        Self::build_inner(server_address, false)
    }

    fn build_inner(server_address: &str, mock_fallback: bool) -> Result<Self> {
        let temp_dir = tempfile::TempDir::new()?;
        let dir_path = temp_dir.path();
        let session_path = dir_path.join("session.json");
        let store_path = dir_path.join("mock_state.json");

        let settings: Settings = Settings::builder()?
            .set_default("server_address", server_address)?
            .set_default("session_path", session_path.to_str())?
            .set_default("store_path", store_path.to_str())?
            .set_default("mock_fallback", mock_fallback)?
            .set_default("mock_latency_ms", 0)?
            .set_default("request_timeout_ms", 2_000)?
            .set_default("probe_timeout_ms", 500)?
            .set_default("wake_attempts", 1)?
            .set_default("wake_delay_ms", 10)?
            .build()?
            .try_deserialize()
            .map_err(|e| eyre!("Failed to deserialize {e}"))?;

        let client = ApiClient::new(&settings)?;

        Ok(Self {
            settings,
            client,
            _dir: temp_dir,
        })
    }
}

pub async fn spawn_backend(r: Router) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    let _ = tokio::spawn(async move { serve(listener, r.into_make_service()).await.unwrap() });
    Ok(format!("http://{address}"))
}

/// An address that refuses connections, for simulating a dead backend.
pub async fn dead_address() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{address}"))
}

/// A minimal stand-in for the real backend: healthy, logs anyone in as
/// user 7 and answers searches with a product the offline catalog does
/// not carry.
pub fn live_router() -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route(
            "/api/auth/login",
            post(|| async {
                let access = token::mint_access(7, token::unix_now());
                let refresh = token::mint_refresh(&access);
                Json(json!({
                    "user": {
                        "id": 7,
                        "name": "Live User",
                        "email": "live@example.com",
                        "createdAt": "2024-05-01T00:00:00Z",
                        "isVerified": true
                    },
                    "accessToken": access,
                    "refreshToken": refresh,
                }))
            }),
        )
        .route(
            "/api/products/search",
            get(|| async {
                Json(json!([{
                    "_id": "backend-1",
                    "categories": "fruits",
                    "weight": 100,
                    "title": { "en": "Dragonfruit" },
                    "calories": 60,
                    "groupBloodNotAllowed": [null, false, false, false, false]
                }]))
            }),
        )
}
