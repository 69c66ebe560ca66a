use clap::Subcommand;
use eyre::Result;
use kalo_client::api_client::{ApiClient, Navigate};
use kalo_client::settings::Settings;
use std::sync::Arc;
use tracing_subscriber::{self, fmt, prelude::*, EnvFilter};

mod account;
mod calc;
mod diary;
mod forbidden;
mod info;
mod profile;
mod search;
mod status;

/// Tells the user where to go when their session dies mid-command.
struct LoginHint;

impl Navigate for LoginHint {
    fn to_login(&self) {
        println!("Your session has expired. Run `kalo account login` to sign in again.");
    }
}

pub(crate) fn build_client(settings: &Settings) -> Result<ApiClient> {
    ApiClient::with_navigator(settings, Some(Arc::new(LoginHint)))
}

#[derive(Subcommand, Debug)]
#[clap(infer_subcommands = true)]
pub enum KaloCmd {
    /// Show configuration paths and session state
    Info,
    /// Check whether the backend is awake
    Status,
    /// Search the product catalog by title
    Search(search::Cmd),
    /// List products not recommended for a blood type
    Forbidden(forbidden::Cmd),
    #[command(subcommand)]
    Account(account::Cmd),
    #[command(subcommand)]
    Diary(diary::Cmd),
    #[command(subcommand)]
    Profile(profile::Cmd),
    /// Calculate the recommended daily calorie intake
    Calc(calc::Cmd),
}

impl KaloCmd {
    #[tokio::main]
    pub async fn run(self) -> Result<()> {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(EnvFilter::from_default_env())
            .init();

        tracing::trace!(command = ?self, "client command");

        let settings = Settings::new()?;

        match self {
            Self::Info => {
                info::run(&settings);
                Ok(())
            }
            Self::Status => status::run(&settings).await,
            Self::Search(cmd) => cmd.run(&settings).await,
            Self::Forbidden(cmd) => cmd.run(&settings).await,
            Self::Account(cmd) => cmd.run(&settings).await,
            Self::Diary(cmd) => cmd.run(&settings).await,
            Self::Profile(cmd) => cmd.run(&settings).await,
            Self::Calc(cmd) => cmd.run(&settings).await,
        }
    }
}
