use crate::command::build_client;
use eyre::Result;
use kalo_client::settings::Settings;

pub async fn run(settings: &Settings) -> Result<()> {
    let client = build_client(settings)?;

    println!("Checking {} ...", settings.server_address);
    let awake = client.ensure_awake().await;

    if awake {
        println!("Backend is up.");
    } else if settings.mock_fallback {
        println!("Backend is unreachable. Requests will be served by the offline backend.");
    } else {
        println!("Backend is unreachable and the offline fallback is disabled.");
    }

    match client.session() {
        Some(session) => println!("Signed in as user {}.", session.user_id),
        None => println!("Not signed in."),
    }

    Ok(())
}
