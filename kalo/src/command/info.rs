use crate::VERSION;
use kalo_client::session::SessionStore;
use kalo_client::settings::Settings;
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub fn run(settings: &Settings) {
    let env_config_dir = std::env::var("KALO_CONFIG_DIR");

    let config_dir = if let Ok(config_dir) = &env_config_dir {
        PathBuf::from(config_dir)
    } else {
        kalo_common::utils::config_dir()
    };

    let mut config_file = config_dir.clone();
    config_file.push("config.toml");

    let vars = format!(
        "VARS:\nKALO_CONFIG_DIR = {:?}",
        env_config_dir.unwrap_or("None".into())
    );
    println!("{vars}\n");

    let mut paths = String::from("PATHS:\n");
    paths.push_str(&format!("config_path: {config_file:?}\n"));
    paths.push_str(&format!("session_path: {:?}\n", settings.session_path));
    paths.push_str(&format!("store_path: {:?}\n", settings.store_path));
    paths.push_str(&format!("server_address: {}", settings.server_address));
    println!("{paths}\n");

    println!("ACCOUNT: ");
    match SessionStore::new(&settings.session_path).current() {
        Some(session) => {
            println!("User: {}", session.user_id);
            let expiry = OffsetDateTime::from_unix_timestamp(session.expires_at)
                .ok()
                .and_then(|t| t.format(&Rfc3339).ok())
                .unwrap_or("Unknown".to_string());
            println!("Token expires: {expiry}");
        }
        None => println!("Auth: Unauthenticated"),
    }

    println!();
    println!("Version: {VERSION}");
}
