use crate::command::build_client;
use clap::Parser;
use eyre::Result;
use kalo_client::settings::Settings;
use kalo_client::utils::{parse_day, today};
use kalo_common::api::AddDiaryRequest;

#[derive(Parser, Debug)]
#[clap(infer_subcommands = true)]
pub enum Cmd {
    /// Add a meal to the diary
    Add(AddCmd),
    /// Show one day of the diary
    List(ListCmd),
    /// Remove an entry by its id
    Remove(RemoveCmd),
}

impl Cmd {
    pub async fn run(self, settings: &Settings) -> Result<()> {
        match self {
            Self::Add(cmd) => cmd.run(settings).await,
            Self::List(cmd) => cmd.run(settings).await,
            Self::Remove(cmd) => cmd.run(settings).await,
        }
    }
}

/// Resolves an optional user-supplied day to the wire format.
fn resolve_day(date: Option<String>) -> Result<String> {
    match date {
        Some(value) => {
            parse_day(&value)?;
            Ok(value)
        }
        None => Ok(today()),
    }
}

#[derive(Parser, Debug)]
pub struct AddCmd {
    /// Product title as eaten
    pub title: String,
    /// Portion size in grams
    pub grams: f64,
    /// Day of the meal, defaults to today
    #[arg(long, short)]
    pub date: Option<String>,
}

impl AddCmd {
    pub async fn run(self, settings: &Settings) -> Result<()> {
        let client = build_client(settings)?;
        let date = resolve_day(self.date)?;

        // Price the portion from the catalog when we can find the product;
        // the backend computes it otherwise.
        let needle = self.title.to_lowercase();
        let product = client
            .search_products(&self.title)
            .await
            .unwrap_or_default()
            .into_iter()
            .find(|p| p.title.matches(&needle));

        let (calories, category, product_id) = match product {
            Some(p) => (
                Some(p.intake(self.grams).round()),
                Some(p.categories.clone()),
                p.id.clone(),
            ),
            None => (None, None, None),
        };

        let entry = client
            .add_diary_entry(&AddDiaryRequest {
                date,
                title: self.title,
                grams: self.grams,
                calories,
                category,
                product_id,
            })
            .await?;

        println!(
            "Added entry {}: {} ({}g, {} kcal) on {}",
            entry.id, entry.title, entry.grams, entry.calories, entry.date
        );

        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct ListCmd {
    /// Day to show, defaults to today
    #[arg(long, short)]
    pub date: Option<String>,
}

impl ListCmd {
    pub async fn run(self, settings: &Settings) -> Result<()> {
        let client = build_client(settings)?;
        let date = resolve_day(self.date)?;
        let entries = client.diary_entries(&date).await?;

        if entries.is_empty() {
            println!("No diary entries on {date}.");
            return Ok(());
        }

        let mut total = 0.0;
        for entry in &entries {
            println!(
                "{:>4}  {:<26} {:>6}g {:>8} kcal",
                entry.id, entry.title, entry.grams, entry.calories
            );
            total += entry.calories;
        }
        println!("{:>38} {total} kcal in total", "");

        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct RemoveCmd {
    /// Entry id as shown by `kalo diary list`
    pub id: u64,
}

impl RemoveCmd {
    pub async fn run(self, settings: &Settings) -> Result<()> {
        let client = build_client(settings)?;
        client.delete_diary_entry(self.id).await?;
        println!("Entry {} removed.", self.id);
        Ok(())
    }
}
