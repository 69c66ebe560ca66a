use clap::Parser;
use eyre::Result;
use kalo_client::settings::Settings;

mod login;
mod logout;
mod register;

#[derive(Parser, Debug)]
#[clap(infer_subcommands = true)]
pub enum Cmd {
    /// Sign in with an existing account
    Login(login::Cmd),
    /// Create a new account
    Register(register::Cmd),
    /// Sign out and drop the local session
    Logout,
}

impl Cmd {
    pub async fn run(self, settings: &Settings) -> Result<()> {
        match self {
            Self::Login(cmd) => cmd.run(settings).await,
            Self::Register(cmd) => cmd.run(settings).await,
            Self::Logout => logout::run(settings).await,
        }
    }
}
