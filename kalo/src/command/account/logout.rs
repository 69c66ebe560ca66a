use crate::command::build_client;
use eyre::Result;
use kalo_client::settings::Settings;

pub async fn run(settings: &Settings) -> Result<()> {
    let client = build_client(settings)?;

    if client.session().is_none() {
        println!("You are not logged in.");
        return Ok(());
    }

    client.logout().await?;
    println!("You are logged out!");

    Ok(())
}
