use crate::command::build_client;
use clap::Parser;
use eyre::{Context, Result};
use kalo_client::settings::Settings;
use kalo_client::utils::{read_input, read_input_hidden};
use kalo_common::api::LoginRequest;

#[derive(Parser, Debug)]
#[clap(infer_subcommands = true)]
pub struct Cmd {
    #[arg(long, short)]
    pub email: Option<String>,
    #[arg(long, short)]
    pub password: Option<String>,
}

impl Cmd {
    pub async fn run(self, settings: &Settings) -> Result<()> {
        let client = build_client(settings)?;

        if client.session().is_some() {
            println!("You are already logged in.");
            return Ok(());
        }

        let email = self.email.unwrap_or_else(|| read_input("email"));
        let password = self
            .password
            .unwrap_or_else(|| read_input_hidden("password"));

        let session = client
            .login(&LoginRequest { email, password })
            .await
            .wrap_err("Failed to log in")?;

        if !client.is_backend_available() {
            println!("The backend is unreachable, you are signed in to the offline fallback.");
        }
        println!("Logged in as user {}.", session.user_id);

        Ok(())
    }
}
