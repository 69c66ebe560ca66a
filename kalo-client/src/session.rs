use crate::token::{self, TokenError};
use eyre::{Context, Result};
use std::path::PathBuf;
use tracing::debug;

/// The signed-in state of this client. At most one session exists at a
/// time; it is created on login or registration, replaced on refresh and
/// destroyed on logout or refresh failure.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Session {
    pub user_id: u64,
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry of the access token, seconds since the unix epoch.
    pub expires_at: i64,
}

impl Session {
    /// Builds a session from a token pair by decoding identity and expiry
    /// out of the access token.
    pub fn from_tokens(access_token: &str, refresh_token: &str) -> Result<Self, TokenError> {
        Ok(Self {
            user_id: token::decode_user_id(access_token)?,
            expires_at: token::decode_expiry(access_token)?,
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        })
    }
}

/// File-backed storage for the current session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn current(&self) -> Option<Session> {
        if !self.path.exists() {
            return None;
        }

        let value = fs_err::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&value) {
            Ok(session) => Some(session),
            Err(err) => {
                debug!("ignoring unreadable session file: {err}");
                None
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs_err::create_dir_all(parent)?;
        }
        let value = serde_json::to_string_pretty(session)?;
        fs_err::write(&self.path, value).wrap_err("Failed to write session file")?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs_err::remove_file(&self.path).wrap_err("Failed to remove session file")?;
        }
        Ok(())
    }
}
