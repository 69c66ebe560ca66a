use crate::command::build_client;
use clap::Parser;
use eyre::{Context, Result};
use kalo_client::calorie;
use kalo_client::settings::Settings;
use kalo_client::utils::read_input;
use kalo_common::api::UpdateProfileRequest;
use kalo_common::domain::BloodType;

#[derive(Parser, Debug)]
pub struct Cmd {
    /// Height in centimeters
    #[arg(long)]
    pub height: Option<f64>,
    /// Age in years
    #[arg(long, short)]
    pub age: Option<u32>,
    /// Current weight in kilograms
    #[arg(long, short)]
    pub current_weight: Option<f64>,
    /// Desired weight in kilograms
    #[arg(long, short)]
    pub desired_weight: Option<f64>,
    /// Blood type group, 1 to 4
    #[arg(long, short)]
    pub blood_type: Option<u8>,
    /// Store the result in the signed-in profile
    #[arg(long, short)]
    pub save: bool,
}

impl Cmd {
    pub async fn run(self, settings: &Settings) -> Result<()> {
        // get the inputs or ask the user to type them in
        let height = match self.height {
            Some(value) => value,
            None => read_input("Height (cm)")
                .parse()
                .wrap_err("height must be a number")?,
        };
        let age = match self.age {
            Some(value) => value,
            None => read_input("Age")
                .parse()
                .wrap_err("age must be a whole number")?,
        };
        let current_weight = match self.current_weight {
            Some(value) => value,
            None => read_input("Current weight (kg)")
                .parse()
                .wrap_err("weight must be a number")?,
        };
        let desired_weight = match self.desired_weight {
            Some(value) => value,
            None => read_input("Desired weight (kg)")
                .parse()
                .wrap_err("weight must be a number")?,
        };
        let group: u8 = match self.blood_type {
            Some(value) => value,
            None => read_input("Blood type (1-4)")
                .parse()
                .wrap_err("blood type must be a number")?,
        };
        let blood_type = BloodType::new(group)
            .ok_or_else(|| eyre::eyre!("blood type must be between 1 and 4"))?;

        let intake = calorie::daily_intake(height, current_weight, f64::from(age));
        println!("Recommended daily intake: {intake} kcal");

        let client = build_client(settings)?;
        let forbidden = client.products_by_blood_type(blood_type).await?;
        if !forbidden.is_empty() {
            println!("\nFoods not recommended for blood type {blood_type}:");
            for product in &forbidden {
                println!("  {}", product.title.primary());
            }
        }

        if self.save {
            client
                .update_profile(&UpdateProfileRequest {
                    height: Some(height),
                    age: Some(age),
                    blood_type: Some(blood_type),
                    current_weight: Some(current_weight),
                    desired_weight: Some(desired_weight),
                    daily_calories: Some(intake),
                })
                .await
                .wrap_err("Failed to save the result to your profile")?;
            println!("\nSaved to your profile.");
        }

        Ok(())
    }
}
