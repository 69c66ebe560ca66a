use base64::prelude::{Engine, BASE64_STANDARD, BASE64_URL_SAFE_NO_PAD};
use std::time::Duration;
use time::OffsetDateTime;

/// Lifetime of an access token minted by the offline backend.
pub const ACCESS_TTL_SECS: i64 = 3600;

/// Offline refresh tokens wrap the access token they were issued with.
pub const REFRESH_PREFIX: &str = "refresh_";

/// Refresh this much before the expiry at the latest.
const REFRESH_MARGIN_SECS: f64 = 30.0;

/// Refresh after this share of the token lifetime has passed.
const REFRESH_FRACTION: f64 = 0.8;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("token has no expiry claim")]
    MissingExpiry,

    #[error("token has no identity claim")]
    MissingIdentity,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    #[serde(default, rename = "userId", skip_serializing_if = "Option::is_none")]
    user_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

fn decode_claims(token: &str) -> Result<Claims, TokenError> {
    let payload = token.split('.').nth(1).ok_or(TokenError::Malformed)?;

    // JWTs use url-safe base64 without padding, but some issuers pad.
    let bytes = BASE64_URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| BASE64_STANDARD.decode(payload))
        .map_err(|_| TokenError::Malformed)?;

    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}

/// Expiry claim of a bearer token, as seconds since the unix epoch.
pub fn decode_expiry(token: &str) -> Result<i64, TokenError> {
    decode_claims(token)?.exp.ok_or(TokenError::MissingExpiry)
}

/// User identity of a bearer token. Accepts both the `userId` and the `id`
/// claim, preferring `userId` when both are present.
pub fn decode_user_id(token: &str) -> Result<u64, TokenError> {
    let claims = decode_claims(token)?;
    claims
        .user_id
        .or(claims.id)
        .ok_or(TokenError::MissingIdentity)
}

/// How long to wait before refreshing a token that expires at `expires_at`.
///
/// The delay is 80% of the remaining lifetime, but never closer than 30
/// seconds to the expiry and never negative. Returns `None` when the token
/// is already expired, in which case the session must be treated as dead
/// instead of scheduling anything.
pub fn refresh_delay(expires_at: i64, now: i64) -> Option<Duration> {
    let ttl = expires_at.checked_sub(now)?;
    if ttl <= 0 {
        return None;
    }

    let ttl = ttl as f64;
    let delay = (ttl * REFRESH_FRACTION).min(ttl - REFRESH_MARGIN_SECS).max(0.0);
    Some(Duration::from_millis((delay * 1000.0) as u64))
}

/// Mint an access token for the offline backend. The shape matches a real
/// JWT closely enough for [`decode_expiry`] and [`decode_user_id`], but it
/// is not signed.
pub fn mint_access(user_id: u64, now: i64) -> String {
    let header = BASE64_URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = Claims {
        id: Some(user_id),
        user_id: None,
        iat: Some(now),
        exp: Some(now + ACCESS_TTL_SECS),
    };
    let payload = serde_json::to_string(&claims).expect("token claims serialize");
    let payload = BASE64_URL_SAFE_NO_PAD.encode(payload);

    format!("{header}.{payload}.mock-signature")
}

pub fn mint_refresh(access: &str) -> String {
    format!("{REFRESH_PREFIX}{access}")
}

/// Identity embedded in an offline refresh token.
pub fn refresh_owner(refresh_token: &str) -> Result<u64, TokenError> {
    let access = refresh_token
        .strip_prefix(REFRESH_PREFIX)
        .ok_or(TokenError::Malformed)?;
    decode_user_id(access)
}

/// Seconds since the unix epoch, the clock all token math runs on.
pub fn unix_now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}
