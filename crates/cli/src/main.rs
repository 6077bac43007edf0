use anyhow::Result;
use clap::Parser;
use env_logger::init;
use galfont_cli::cli::Cli;

fn main() -> Result<()> {
    init();
    Cli::parse().run()
}
