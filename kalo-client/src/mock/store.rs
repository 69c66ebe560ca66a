use eyre::{Context, Result};
use kalo_common::api::{DiaryEntryPayload, UserPayload};
use kalo_common::domain::BloodType;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// A user known to the offline backend. The password is kept as plain text,
/// this is a development fallback and not a security boundary.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MockUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub current_weight: Option<f64>,
    #[serde(default)]
    pub desired_weight: Option<f64>,
    #[serde(default)]
    pub blood_type: Option<BloodType>,
    #[serde(default)]
    pub daily_calories: Option<u32>,
    pub created_at: String,
    pub is_verified: bool,
}

impl MockUser {
    /// The wire shape of this user, without the password.
    pub fn payload(&self) -> UserPayload {
        UserPayload {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            height: self.height,
            age: self.age,
            current_weight: self.current_weight,
            desired_weight: self.desired_weight,
            blood_type: self.blood_type,
            daily_calories: self.daily_calories,
            created_at: self.created_at.clone(),
            is_verified: self.is_verified,
        }
    }
}

/// Everything the offline backend remembers. The id counters only ever go
/// up, even across deletions and restarts, so held references stay stable.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MockState {
    pub users: Vec<MockUser>,
    pub diary: Vec<DiaryEntryPayload>,
    pub next_user_id: u64,
    pub next_entry_id: u64,
}

impl MockState {
    /// First-run state with one known user, so the fallback is usable
    /// without registering first.
    pub fn seeded() -> Self {
        let seed = MockUser {
            id: 1,
            name: "Test User".into(),
            email: "test@example.com".into(),
            password: "password123".into(),
            height: Some(170.0),
            age: Some(25),
            current_weight: Some(70.0),
            desired_weight: Some(65.0),
            blood_type: BloodType::new(2),
            daily_calories: None,
            created_at: "2024-01-01T00:00:00Z".into(),
            is_verified: true,
        };

        Self {
            users: vec![seed],
            diary: Vec::new(),
            next_user_id: 2,
            next_entry_id: 1,
        }
    }

    pub fn user_by_email(&self, email: &str) -> Option<&MockUser> {
        self.users.iter().find(|u| u.email == email)
    }

    pub fn user_by_id(&self, id: u64) -> Option<&MockUser> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_by_id_mut(&mut self, id: u64) -> Option<&mut MockUser> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    pub fn take_user_id(&mut self) -> u64 {
        let id = self.next_user_id;
        self.next_user_id += 1;
        id
    }

    pub fn take_entry_id(&mut self) -> u64 {
        let id = self.next_entry_id;
        self.next_entry_id += 1;
        id
    }
}

/// Where the offline backend keeps its state between runs.
pub trait StatePersistence: Send + Sync {
    fn load(&self) -> Result<Option<MockState>>;
    fn save(&self, state: &MockState) -> Result<()>;
}

/// Full-state JSON file persistence.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StatePersistence for FileStore {
    fn load(&self) -> Result<Option<MockState>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let value = fs_err::read_to_string(&self.path)?;
        let state = serde_json::from_str(&value).wrap_err("Failed to parse mock store file")?;
        Ok(Some(state))
    }

    fn save(&self, state: &MockState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs_err::create_dir_all(parent)?;
        }
        let value = serde_json::to_string_pretty(state)?;
        fs_err::write(&self.path, value).wrap_err("Failed to write mock store file")?;
        Ok(())
    }
}

/// In-memory state plus its persistence. Every mutation writes the whole
/// state back so durable storage never lags behind memory; write failures
/// are logged and swallowed so they cannot break the operation itself.
pub struct MockStore {
    state: Mutex<MockState>,
    persistence: Box<dyn StatePersistence>,
}

impl MockStore {
    pub fn open(persistence: Box<dyn StatePersistence>) -> Self {
        let state = match persistence.load() {
            Ok(Some(state)) => state,
            Ok(None) => {
                debug!("no mock store yet, seeding the default user");
                MockState::seeded()
            }
            Err(err) => {
                warn!("could not load mock store, starting fresh: {err}");
                MockState::seeded()
            }
        };

        Self {
            state: Mutex::new(state),
            persistence,
        }
    }

    pub async fn read<T>(&self, f: impl FnOnce(&MockState) -> T) -> T {
        let state = self.state.lock().await;
        f(&state)
    }

    pub async fn mutate<T>(&self, f: impl FnOnce(&mut MockState) -> T) -> T {
        let mut state = self.state.lock().await;
        let value = f(&mut state);

        if let Err(err) = self.persistence.save(&state) {
            warn!("failed to persist mock store: {err}");
        }

        value
    }
}
