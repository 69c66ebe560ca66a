use crate::command::build_client;
use clap::Parser;
use eyre::{bail, Result};
use kalo_client::settings::Settings;
use kalo_common::api::UpdateProfileRequest;
use kalo_common::domain::BloodType;

#[derive(Parser, Debug)]
#[clap(infer_subcommands = true)]
pub enum Cmd {
    /// Show the signed-in profile
    Show,
    /// Update profile fields
    Update(UpdateCmd),
}

impl Cmd {
    pub async fn run(self, settings: &Settings) -> Result<()> {
        match self {
            Self::Show => run_show(settings).await,
            Self::Update(cmd) => cmd.run(settings).await,
        }
    }
}

async fn run_show(settings: &Settings) -> Result<()> {
    let client = build_client(settings)?;
    let user = match client.profile().await {
        Ok(user) => user,
        Err(kalo_client::error::ApiError::NotFound { .. }) => {
            println!("No profile yet. Run `kalo calc --save` to create one.");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    println!("{} <{}>", user.name, user.email);
    if let Some(height) = user.height {
        println!("{:<18} {height} cm", "Height:");
    }
    if let Some(age) = user.age {
        println!("{:<18} {age}", "Age:");
    }
    if let Some(weight) = user.current_weight {
        println!("{:<18} {weight} kg", "Current weight:");
    }
    if let Some(weight) = user.desired_weight {
        println!("{:<18} {weight} kg", "Desired weight:");
    }
    if let Some(blood_type) = user.blood_type {
        println!("{:<18} {blood_type}", "Blood type:");
    }
    if let Some(calories) = user.daily_calories {
        println!("{:<18} {calories} kcal", "Daily budget:");
    }

    Ok(())
}

#[derive(Parser, Debug)]
pub struct UpdateCmd {
    /// Height in centimeters
    #[arg(long)]
    pub height: Option<f64>,
    /// Age in years
    #[arg(long)]
    pub age: Option<u32>,
    /// Blood type group, 1 to 4
    #[arg(long, short)]
    pub blood_type: Option<u8>,
    /// Current weight in kilograms
    #[arg(long, short)]
    pub current_weight: Option<f64>,
    /// Desired weight in kilograms
    #[arg(long, short)]
    pub desired_weight: Option<f64>,
}

impl UpdateCmd {
    pub async fn run(self, settings: &Settings) -> Result<()> {
        if self.height.is_none()
            && self.age.is_none()
            && self.blood_type.is_none()
            && self.current_weight.is_none()
            && self.desired_weight.is_none()
        {
            bail!("Nothing to update. Pass at least one field flag.");
        }

        let blood_type = match self.blood_type {
            Some(raw) => Some(
                BloodType::new(raw).ok_or_else(|| eyre::eyre!("blood type must be between 1 and 4"))?,
            ),
            None => None,
        };

        let client = build_client(settings)?;
        let user = client
            .update_profile(&UpdateProfileRequest {
                height: self.height,
                age: self.age,
                blood_type,
                current_weight: self.current_weight,
                desired_weight: self.desired_weight,
                daily_calories: None,
            })
            .await?;

        println!("Profile updated for {}.", user.email);
        Ok(())
    }
}
