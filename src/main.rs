use anyhow::Result;
use clap::Parser;
use parmap::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
