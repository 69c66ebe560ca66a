use crate::mock::catalog::Catalog;
use crate::mock::store::{MockStore, MockUser, StatePersistence};
use crate::token;
use kalo_common::api::{
    AddDiaryRequest, ApiRequest, ApiResponse, DiaryEntryPayload, LoginRequest, MessageResponse,
    Method, RefreshRequest, RegisterRequest, SessionResponse, UpdateProfileRequest,
};
use kalo_common::domain::BloodType;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::debug;

pub mod catalog;
pub mod store;

/// Errors the offline backend can answer with. They surface to callers in
/// the same `{message}` body shape the real backend uses.
#[derive(thiserror::Error, Debug)]
pub enum MockError {
    #[error("User already exists")]
    UserExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid refresh token")]
    InvalidToken,

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("User not found")]
    UserNotFound,

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("Bad request: {0}")]
    BadRequest(&'static str),
}

impl MockError {
    pub fn status_code(&self) -> u16 {
        match self {
            MockError::UserNotFound => 404,
            MockError::ProfileNotFound => 404,
            MockError::UserExists => 400,
            MockError::InvalidCredentials => 400,
            MockError::InvalidToken => 400,
            MockError::AuthenticationRequired => 400,
            MockError::BadRequest(_) => 400,
        }
    }

    pub fn message(&self) -> String {
        match self {
            MockError::BadRequest(v) => v.to_string(),
            other => other.to_string(),
        }
    }
}

/// Deterministic, stateful emulation of every backend endpoint the client
/// calls. Answers are shaped exactly like the real server's so callers
/// cannot tell which one served them.
pub struct MockBackend {
    store: MockStore,
    catalog: Catalog,
    latency: Duration,
}

impl MockBackend {
    pub fn new(persistence: Box<dyn StatePersistence>, latency: Duration) -> Self {
        Self {
            store: MockStore::open(persistence),
            catalog: Catalog::embedded(),
            latency,
        }
    }

    /// Routes one request to the matching operation. `Ok(None)` means the
    /// path has no offline counterpart.
    pub async fn handle(
        &self,
        req: &ApiRequest,
        user_id: Option<u64>,
    ) -> Result<Option<ApiResponse>, MockError> {
        let route = req.route().trim_matches('/').to_string();
        let segments: Vec<&str> = route.split('/').collect();

        let res = match (req.method, segments.as_slice()) {
            (Method::Post, ["api", "auth", "register"]) => self.register(body(req)?).await?,
            (Method::Post, ["api", "auth", "login"]) => self.login(body(req)?).await?,
            (Method::Post, ["api", "auth", "refresh"]) => self.refresh(body(req)?).await?,
            (Method::Post, ["api", "auth", "logout"]) => self.logout().await?,
            (Method::Get, ["api", "products", "search"]) => {
                let query = req
                    .query_param("query")
                    .map(|q| urlencoding::decode(q).map(|v| v.into_owned()).unwrap_or_default())
                    .unwrap_or_default();
                self.search_products(&query).await?
            }
            (Method::Get, ["api", "products", "blood-type", raw]) => {
                self.products_by_blood_type(raw).await?
            }
            (Method::Post, ["api", "diary"]) => {
                let user = user_id.ok_or(MockError::AuthenticationRequired)?;
                self.add_diary_entry(user, body(req)?).await?
            }
            (Method::Get, ["api", "diary", date]) => {
                let user = user_id.ok_or(MockError::AuthenticationRequired)?;
                self.diary_entries(user, date).await?
            }
            (Method::Delete, ["api", "diary", raw]) => {
                let user = user_id.ok_or(MockError::AuthenticationRequired)?;
                let entry_id = raw
                    .parse::<u64>()
                    .map_err(|_| MockError::BadRequest("invalid diary entry id"))?;
                self.delete_diary_entry(user, entry_id).await?
            }
            (Method::Get, ["api", "profile"]) => {
                let user = user_id.ok_or(MockError::AuthenticationRequired)?;
                self.profile(user).await?
            }
            (Method::Put, ["api", "profile"]) => {
                let user = user_id.ok_or(MockError::AuthenticationRequired)?;
                self.update_profile(user, body(req)?).await?
            }
            _ => return Ok(None),
        };

        Ok(Some(res))
    }

    /// Keeps offline responses from being suspiciously instant.
    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<ApiResponse, MockError> {
        self.delay().await;

        self.store
            .mutate(|state| {
                if state.user_by_email(&req.email).is_some() {
                    return Err(MockError::UserExists);
                }

                let user = MockUser {
                    id: state.take_user_id(),
                    name: req.name.clone(),
                    email: req.email.clone(),
                    password: req.password.clone(),
                    height: None,
                    age: None,
                    current_weight: None,
                    desired_weight: None,
                    blood_type: None,
                    daily_calories: None,
                    created_at: now_rfc3339(),
                    is_verified: true,
                };
                let response = session_response(&user);
                debug!("registered offline user {}", user.id);
                state.users.push(user);
                Ok(response)
            })
            .await
    }

    pub async fn login(&self, req: LoginRequest) -> Result<ApiResponse, MockError> {
        self.delay().await;

        self.store
            .read(|state| {
                let user = state
                    .users
                    .iter()
                    .find(|u| u.email == req.email && u.password == req.password)
                    .ok_or(MockError::InvalidCredentials)?;
                Ok(session_response(user))
            })
            .await
    }

    /// Issues a fresh token pair. The owner comes out of the refresh
    /// token's embedded identity, never from guessing among stored users.
    pub async fn refresh(&self, req: RefreshRequest) -> Result<ApiResponse, MockError> {
        self.delay().await;

        let owner =
            token::refresh_owner(&req.refresh_token).map_err(|_| MockError::InvalidToken)?;

        self.store
            .read(|state| {
                let user = state.user_by_id(owner).ok_or(MockError::InvalidToken)?;
                Ok(session_response(user))
            })
            .await
    }

    pub async fn logout(&self) -> Result<ApiResponse, MockError> {
        self.delay().await;

        Ok(ApiResponse::ok(to_json(&MessageResponse {
            message: "Logged out successfully".into(),
        })))
    }

    pub async fn search_products(&self, query: &str) -> Result<ApiResponse, MockError> {
        self.delay().await;

        let hits = self.catalog.search(query);
        Ok(ApiResponse::ok(to_json(&hits)))
    }

    pub async fn products_by_blood_type(&self, raw: &str) -> Result<ApiResponse, MockError> {
        self.delay().await;

        let blood_type = raw
            .parse::<u8>()
            .ok()
            .and_then(BloodType::new)
            .ok_or(MockError::BadRequest("invalid blood type"))?;

        let hits = self.catalog.not_allowed_for(blood_type);
        Ok(ApiResponse::ok(to_json(&hits)))
    }

    pub async fn add_diary_entry(
        &self,
        user_id: u64,
        req: AddDiaryRequest,
    ) -> Result<ApiResponse, MockError> {
        self.delay().await;

        // Price the portion from the catalog when the caller did not.
        let calories = match req.calories {
            Some(value) => value,
            None => self
                .catalog
                .by_title(&req.title)
                .map(|p| p.intake(req.grams))
                .unwrap_or(0.0),
        };

        let category = req.category.clone().or_else(|| {
            self.catalog
                .by_title(&req.title)
                .map(|p| p.categories.clone())
        });

        self.store
            .mutate(|state| {
                let entry = DiaryEntryPayload {
                    id: state.take_entry_id(),
                    user_id,
                    date: req.date.clone(),
                    title: req.title.clone(),
                    grams: req.grams,
                    calories,
                    category,
                    created_at: now_rfc3339(),
                };
                state.diary.push(entry.clone());
                Ok(ApiResponse::ok(to_json(&entry)))
            })
            .await
    }

    /// Entries of one user for one calendar day. Stored dates may carry a
    /// time-of-day part, so the match is on the leading date portion.
    pub async fn diary_entries(&self, user_id: u64, date: &str) -> Result<ApiResponse, MockError> {
        self.delay().await;

        let day = crate::utils::date_prefix(date).to_string();

        self.store
            .read(|state| {
                let entries: Vec<&DiaryEntryPayload> = state
                    .diary
                    .iter()
                    .filter(|e| e.user_id == user_id && e.date.starts_with(&day))
                    .collect();
                Ok(ApiResponse::ok(to_json(&entries)))
            })
            .await
    }

    /// Removing an entry that does not exist (or is not yours) is a no-op,
    /// not an error.
    pub async fn delete_diary_entry(
        &self,
        user_id: u64,
        entry_id: u64,
    ) -> Result<ApiResponse, MockError> {
        self.delay().await;

        self.store
            .mutate(|state| {
                state
                    .diary
                    .retain(|e| !(e.id == entry_id && e.user_id == user_id));
                Ok(ApiResponse::ok(to_json(&MessageResponse {
                    message: "Entry deleted".into(),
                })))
            })
            .await
    }

    pub async fn profile(&self, user_id: u64) -> Result<ApiResponse, MockError> {
        self.delay().await;

        self.store
            .read(|state| {
                let user = state
                    .user_by_id(user_id)
                    .ok_or(MockError::ProfileNotFound)?;
                Ok(ApiResponse::ok(to_json(&user.payload())))
            })
            .await
    }

    pub async fn update_profile(
        &self,
        user_id: u64,
        req: UpdateProfileRequest,
    ) -> Result<ApiResponse, MockError> {
        self.delay().await;

        self.store
            .mutate(|state| {
                let user = state.user_by_id_mut(user_id).ok_or(MockError::UserNotFound)?;

                if let Some(height) = req.height {
                    user.height = Some(height);
                }
                if let Some(age) = req.age {
                    user.age = Some(age);
                }
                if let Some(blood_type) = req.blood_type {
                    user.blood_type = Some(blood_type);
                }
                if let Some(current_weight) = req.current_weight {
                    user.current_weight = Some(current_weight);
                }
                if let Some(desired_weight) = req.desired_weight {
                    user.desired_weight = Some(desired_weight);
                }
                if let Some(daily_calories) = req.daily_calories {
                    user.daily_calories = Some(daily_calories);
                }

                Ok(ApiResponse::ok(to_json(&user.payload())))
            })
            .await
    }
}

fn body<T: DeserializeOwned>(req: &ApiRequest) -> Result<T, MockError> {
    let value = req.body.clone().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|_| MockError::BadRequest("invalid request body"))
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).expect("response payload serializes")
}

/// Register, login and refresh all answer with the same session shape.
fn session_response(user: &MockUser) -> ApiResponse {
    let access = token::mint_access(user.id, token::unix_now());
    let refresh = token::mint_refresh(&access);

    ApiResponse::ok(to_json(&SessionResponse {
        user: user.payload(),
        token: Some(access),
        access_token: None,
        refresh_token: refresh,
    }))
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .expect("rfc3339 timestamp formats")
}
