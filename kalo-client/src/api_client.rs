use crate::availability::{self, Availability, RequestFailure};
use crate::error::ApiError;
use crate::mock::store::FileStore;
use crate::mock::MockBackend;
use crate::refresh::RefreshScheduler;
use crate::session::{Session, SessionStore};
use crate::settings::Settings;
use crate::token;
use eyre::{Context, Result};
use kalo_common::api::{
    AddDiaryRequest, ApiRequest, ApiResponse, DiaryEntryPayload, LoginRequest, Method,
    RefreshRequest, RegisterRequest, SessionResponse, UpdateProfileRequest, UserPayload,
};
use kalo_common::domain::{BloodType, Product};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Paths under this prefix are authentication flows. A 401 from them means
/// bad credentials, not a dead session.
const AUTH_PREFIX: &str = "/api/auth/";

pub fn is_auth_path(path: &str) -> bool {
    path.starts_with(AUTH_PREFIX)
}

/// Where to send the user when their session gets terminated.
pub trait Navigate: Send + Sync {
    fn to_login(&self);
}

/// The one client the rest of the program talks to the backend through.
/// Attaches the bearer token, keeps the reachability flag current, falls
/// back to [`MockBackend`] during outages and enforces the 401 logout
/// policy. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    sessions: SessionStore,
    availability: Availability,
    refresh: RefreshScheduler,
    mock: Option<MockBackend>,
    navigator: Option<Arc<dyn Navigate>>,
    probe_timeout: Duration,
    wake_attempts: u32,
    wake_delay: Duration,
}

impl ApiClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::with_navigator(settings, None)
    }

    pub fn with_navigator(
        settings: &Settings,
        navigator: Option<Arc<dyn Navigate>>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()
            .wrap_err("Failed to build http client")?;

        let mock = settings.mock_fallback.then(|| {
            MockBackend::new(
                Box::new(FileStore::new(&settings.store_path)),
                Duration::from_millis(settings.mock_latency_ms),
            )
        });

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: settings.server_address.trim_end_matches('/').to_string(),
                sessions: SessionStore::new(&settings.session_path),
                availability: Availability::new(),
                refresh: RefreshScheduler::new(),
                mock,
                navigator,
                probe_timeout: Duration::from_millis(settings.probe_timeout_ms),
                wake_attempts: settings.wake_attempts,
                wake_delay: Duration::from_millis(settings.wake_delay_ms),
            }),
        })
    }

    /// Best-effort liveness hint for status displays.
    pub fn is_backend_available(&self) -> bool {
        self.inner.availability.is_available()
    }

    pub fn session(&self) -> Option<Session> {
        self.inner.sessions.current()
    }

    /// Runs the startup wake sequence unless an earlier call already did.
    /// Subsequent calls report the current reachability flag.
    pub async fn ensure_awake(&self) -> bool {
        if !self.inner.availability.begin_wake() {
            return self.inner.availability.is_available();
        }

        let awake = availability::wake_up(
            &self.inner.http,
            &self.inner.base_url,
            self.inner.wake_attempts,
            self.inner.wake_delay,
            self.inner.probe_timeout,
        )
        .await;

        if awake {
            self.inner.availability.mark_available();
        } else {
            self.inner.availability.mark_unavailable();
            if self.inner.mock.is_some() {
                info!("requests will be served by the offline backend");
            }
        }

        awake
    }

    /// Sends one request through the fallback machinery: try the real
    /// backend, reroute outage-shaped failures to the offline backend,
    /// terminate the session on a 401 from a non-auth path.
    pub async fn send(&self, req: ApiRequest) -> Result<ApiResponse, ApiError> {
        let bearer = self.inner.sessions.current().map(|s| s.access_token);

        match self.transport(&req, bearer.as_deref()).await {
            Ok(res) => {
                self.inner.availability.mark_available();
                Ok(res)
            }
            Err(failure) => self.recover(req, bearer.as_deref(), failure).await,
        }
    }

    async fn transport(
        &self,
        req: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, RequestFailure> {
        let url = format!("{}{}", self.inner.base_url, req.path);
        let mut builder = self.inner.http.request(to_reqwest_method(req.method), &url);

        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }

        let res = builder
            .send()
            .await
            .map_err(|err| RequestFailure::from_transport(&err))?;

        let status = res.status().as_u16();
        let data = res.json::<Value>().await.unwrap_or(Value::Null);

        if (200..300).contains(&status) {
            Ok(ApiResponse { status, data })
        } else {
            let message = data
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("request failed with status {status}"));
            Err(RequestFailure::from_status(status, message))
        }
    }

    async fn recover(
        &self,
        req: ApiRequest,
        bearer: Option<&str>,
        failure: RequestFailure,
    ) -> Result<ApiResponse, ApiError> {
        let auth_path = is_auth_path(req.route());
        let unavailable = availability::is_unavailable(&failure);
        // A 401 from an auth flow is not a dead session; give the offline
        // backend a chance to serve the login instead.
        let auth_exception = failure.status == Some(401) && auth_path;

        if unavailable || auth_exception {
            self.inner.availability.mark_unavailable();

            if let Some(mock) = &self.inner.mock {
                warn!(
                    "backend unreachable ({}), rerouting {} {} to the offline backend",
                    failure.message,
                    req.method,
                    req.route()
                );

                let identity = bearer.and_then(|t| token::decode_user_id(t).ok());
                match mock.handle(&req, identity).await {
                    Ok(Some(res)) => return Ok(res),
                    Ok(None) => {
                        debug!("no offline route for {} {}", req.method, req.route());
                    }
                    Err(err) if auth_path => {
                        // The offline backend could not answer the auth
                        // call either; the original failure is the more
                        // truthful one to surface.
                        debug!("offline backend rejected auth call: {err}");
                        return Err(to_api_error(failure, auth_path));
                    }
                    Err(err) => {
                        return Err(to_api_error(
                            RequestFailure::from_status(err.status_code(), err.message()),
                            auth_path,
                        ));
                    }
                }
            }
        }

        if failure.status == Some(401) && !auth_path {
            info!("session rejected by the backend, logging out");
            self.force_logout();
        }

        Err(to_api_error(failure, auth_path))
    }

    fn force_logout(&self) {
        self.inner.refresh.cancel();
        if let Err(err) = self.inner.sessions.clear() {
            warn!("failed to clear session: {err}");
        }
        if let Some(navigator) = &self.inner.navigator {
            navigator.to_login();
        }
    }

    /// Stores the session carried by an auth response and plans its
    /// refresh.
    fn adopt_session(&self, res: &ApiResponse) -> Result<Session, ApiError> {
        let payload: SessionResponse = parse(res)?;
        let access = payload.bearer().ok_or_else(|| ApiError::Validation {
            status: res.status,
            message: "session response carries no access token".into(),
        })?;

        let session = Session::from_tokens(access, &payload.refresh_token)?;
        self.inner
            .sessions
            .save(&session)
            .map_err(|err| ApiError::Storage {
                message: err.to_string(),
            })?;
        self.schedule_refresh(&session);
        Ok(session)
    }

    /// At most one refresh timer is pending at a time; scheduling replaces
    /// the previous one. An already-expired token cannot be refreshed, it
    /// terminates the session instead.
    fn schedule_refresh(&self, session: &Session) {
        match token::refresh_delay(session.expires_at, token::unix_now()) {
            Some(delay) => {
                let client = self.clone();
                self.inner.refresh.schedule(delay, async move {
                    if let Err(err) = client.refresh_session().await {
                        warn!("scheduled token refresh failed: {}", err.message());
                    }
                });
            }
            None => {
                info!("access token already expired, terminating session");
                self.force_logout();
            }
        }
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<Session, ApiError> {
        let res = self
            .send(ApiRequest::post("/api/auth/register", to_body(req)))
            .await?;
        self.adopt_session(&res)
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<Session, ApiError> {
        let res = self
            .send(ApiRequest::post("/api/auth/login", to_body(req)))
            .await?;
        self.adopt_session(&res)
    }

    /// The backend call is best-effort; the local session is cleared no
    /// matter what the network does.
    pub async fn logout(&self) -> Result<(), ApiError> {
        if let Err(err) = self.send(ApiRequest::post_empty("/api/auth/logout")).await {
            debug!("ignoring logout request failure: {}", err.message());
        }

        self.inner.refresh.cancel();
        self.inner
            .sessions
            .clear()
            .map_err(|err| ApiError::Storage {
                message: err.to_string(),
            })?;
        Ok(())
    }

    /// Trades the stored refresh token for a fresh session. Failure of any
    /// kind terminates the session.
    pub async fn refresh_session(&self) -> Result<Session, ApiError> {
        let Some(session) = self.inner.sessions.current() else {
            return Err(ApiError::Auth {
                status: 401,
                message: "no refresh token available".into(),
                auth_endpoint: true,
            });
        };

        let req = RefreshRequest {
            refresh_token: session.refresh_token,
        };
        let outcome = self
            .send(ApiRequest::post("/api/auth/refresh", to_body(&req)))
            .await
            .and_then(|res| self.adopt_session(&res));

        match outcome {
            Ok(session) => Ok(session),
            Err(err) => {
                warn!("token refresh failed: {}", err.message());
                self.force_logout();
                Err(err)
            }
        }
    }

    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        let encoded = urlencoding::encode(query);
        let res = self
            .send(ApiRequest::get(format!(
                "/api/products/search?query={encoded}"
            )))
            .await?;
        parse(&res)
    }

    pub async fn products_by_blood_type(
        &self,
        blood_type: BloodType,
    ) -> Result<Vec<Product>, ApiError> {
        let res = self
            .send(ApiRequest::get(format!(
                "/api/products/blood-type/{blood_type}"
            )))
            .await?;
        parse(&res)
    }

    pub async fn add_diary_entry(
        &self,
        req: &AddDiaryRequest,
    ) -> Result<DiaryEntryPayload, ApiError> {
        let res = self.send(ApiRequest::post("/api/diary", to_body(req))).await?;
        parse(&res)
    }

    pub async fn diary_entries(&self, date: &str) -> Result<Vec<DiaryEntryPayload>, ApiError> {
        let res = self.send(ApiRequest::get(format!("/api/diary/{date}"))).await?;
        parse(&res)
    }

    pub async fn delete_diary_entry(&self, entry_id: u64) -> Result<(), ApiError> {
        self.send(ApiRequest::delete(format!("/api/diary/{entry_id}")))
            .await?;
        Ok(())
    }

    pub async fn profile(&self) -> Result<UserPayload, ApiError> {
        let res = self.send(ApiRequest::get("/api/profile")).await?;
        parse(&res)
    }

    pub async fn update_profile(
        &self,
        req: &UpdateProfileRequest,
    ) -> Result<UserPayload, ApiError> {
        let res = self.send(ApiRequest::put("/api/profile", to_body(req))).await?;
        parse(&res)
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn to_api_error(failure: RequestFailure, auth_endpoint: bool) -> ApiError {
    match failure.status {
        None => ApiError::Connectivity {
            message: failure.message,
            connect: failure.connect,
            timeout: failure.timeout,
        },
        Some(status @ 401) | Some(status @ 403) => ApiError::Auth {
            status,
            message: failure.message,
            auth_endpoint,
        },
        Some(404) => ApiError::NotFound {
            message: failure.message,
        },
        Some(status) if status >= 500 => ApiError::Server {
            status,
            message: failure.message,
        },
        Some(status) => ApiError::Validation {
            status,
            message: failure.message,
        },
    }
}

fn parse<T: DeserializeOwned>(res: &ApiResponse) -> Result<T, ApiError> {
    serde_json::from_value(res.data.clone()).map_err(|err| ApiError::Validation {
        status: res.status,
        message: format!("unexpected response shape: {err}"),
    })
}

fn to_body<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).expect("request body serializes")
}
