use clap::Parser;
use eyre::Result;
use kalo::command::KaloCmd;
use kalo::VERSION;

#[derive(Parser)]
#[command(version = VERSION)]
struct Kalo {
    #[command(subcommand)]
    kalo: KaloCmd,
}

impl Kalo {
    fn run(self) -> Result<()> {
        self.kalo.run()
    }
}

fn main() -> Result<()> {
    Kalo::parse().run()
}
