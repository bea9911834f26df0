use clap::Parser;
use helioclim_converter::cli::{run, Cli};
use helioclim_converter::error::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}
