use crate::command::build_client;
use clap::Parser;
use eyre::Result;
use kalo_client::settings::Settings;

#[derive(Parser, Debug)]
#[clap(infer_subcommands = true)]
pub struct Cmd {
    /// Title or part of a title to look for
    pub query: String,
}

impl Cmd {
    pub async fn run(self, settings: &Settings) -> Result<()> {
        let client = build_client(settings)?;
        let products = client.search_products(&self.query).await?;

        if products.is_empty() {
            println!("No products found for \"{}\".", self.query);
            return Ok(());
        }

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
