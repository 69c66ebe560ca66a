use crate::command::build_client;
use clap::Parser;
use eyre::{eyre, Result};
use kalo_client::settings::Settings;
use kalo_common::domain::BloodType;

#[derive(Parser, Debug)]
#[clap(infer_subcommands = true)]
pub struct Cmd {
    /// Blood group 1-4. Defaults to the one stored in your profile.
    #[arg(long, short)]
    pub blood_type: Option<u8>,
}

impl Cmd {
    pub async fn run(self, settings: &Settings) -> Result<()> {
        let client = build_client(settings)?;

        let blood_type = match self.blood_type {
            Some(group) => BloodType::new(group)
                .ok_or_else(|| eyre!("blood type must be between 1 and 4"))?,
            None => {
                let user = client.profile().await?;
                user.blood_type.ok_or_else(|| {
                    eyre!("your profile has no blood type yet, pass --blood-type")
                })?
            }
        };

        let products = client.products_by_blood_type(blood_type).await?;

        if products.is_empty() {
            println!("No products are excluded for blood type {blood_type}.");
            return Ok(());
        }

        println!("Not recommended for blood type {blood_type}:");
        for product in products {
            println!(
                "{:<28} {:>6} kcal / {}g  [{}]",
                product.title.primary(),
                product.calories,
                product.weight,
                product.categories
            );
        }

        Ok(())
    }
}
