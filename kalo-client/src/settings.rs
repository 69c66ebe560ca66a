use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File as ConfigFile, FileFormat};
use eyre::{eyre, Context, Result};
use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::PathBuf;

const EXAMPLE_CONFIG: &str = include_str!("../config.toml");

const DEFAULT_SERVER: &str = "https://kalo-backend.onrender.com";

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Settings {
    pub server_address: String,
    pub session_path: String,
    pub store_path: String,
    /// Serve from the built-in offline backend when the real one is down.
    pub mock_fallback: bool,
    /// Simulated latency of offline responses, in milliseconds.
    pub mock_latency_ms: u64,
    pub request_timeout_ms: u64,
    pub probe_timeout_ms: u64,
    pub wake_attempts: u32,
    pub wake_delay_ms: u64,
}

impl Settings {
    pub fn builder() -> Result<ConfigBuilder<DefaultState>> {
        let data_dir = kalo_common::utils::data_dir();
        let session_path = data_dir.join("session.json");
        let store_path = data_dir.join("mock_state.json");

        Ok(Config::builder()
            .set_default("server_address", DEFAULT_SERVER)?
            .set_default("session_path", session_path.to_str())?
            .set_default("store_path", store_path.to_str())?
            .set_default("mock_fallback", true)?
            .set_default("mock_latency_ms", 300)?
            .set_default("request_timeout_ms", 15_000)?
            .set_default("probe_timeout_ms", 10_000)?
            .set_default("wake_attempts", 3)?
            .set_default("wake_delay_ms", 10_000)?
            .add_source(
                Environment::with_prefix("kalo")
                    .prefix_separator("_")
                    .separator("__"),
            ))
    }

    pub fn new() -> Result<Self> {
        let config_dir = kalo_common::utils::config_dir();
        let data_dir = kalo_common::utils::data_dir();

        create_dir_all(&config_dir)
            .wrap_err_with(|| format!("Failed to create dir {config_dir:?}"))?;
        create_dir_all(&data_dir).wrap_err_with(|| format!("Failed to create dir {data_dir:?}"))?;

        let mut config_file = if let Ok(p) = std::env::var("KALO_CONFIG_DIR") {
            PathBuf::from(p)
        } else {
            let mut config_file = PathBuf::new();
            config_file.push(config_dir);
            config_file
        };

        config_file.push("config.toml");

        let mut config_builder = Self::builder()?;
        config_builder = if config_file.exists() {
            config_builder.add_source(ConfigFile::new(
                config_file.to_str().unwrap(),
                FileFormat::Toml,
            ))
        } else {
            let mut file = File::create(config_file).wrap_err("Failed to create config file")?;
            file.write_all(EXAMPLE_CONFIG.as_bytes())
                .wrap_err("Failed to write default config file")?;
            config_builder
        };

        let mut settings: Settings = config_builder
            .build()?
            .try_deserialize()
            .map_err(|e| eyre!("Failed to deserialize {}", e))?;

        settings.session_path = expand_shell(&settings.session_path)?;
        settings.store_path = expand_shell(&settings.store_path)?;
        settings.server_address = settings.server_address.trim_end_matches('/').to_string();

        Ok(settings)
    }
}

fn expand_shell(value: &str) -> Result<String> {
    Ok(shellexpand::full(value)?.to_string())
}
