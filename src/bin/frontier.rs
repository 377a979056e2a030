use anyhow::Result;
use clap::Parser;
use log::info;

use frontier::allocation::{allocate, Allocation};
use frontier::config::Config;
use frontier::source::{LocalSource, SignedClient};

fn run(config: &Config) -> Result<Allocation> {
    if config.offline {
        let markets: Vec<&str> = config.markets()?.iter().map(|m| m.as_str()).collect();
        let seed = config.seed.unwrap_or_default();
        info!("Running offline with generated candles, seed {seed}");
        let source = LocalSource::random(&markets, config.resolution()?, config.window()?, seed)?;
        allocate(config, &source)
    } else {
        let client = SignedClient::new(config.client_config()?)?;
        allocate(config, &client)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let config = Config::parse();

    let allocation = run(&config)?;
    if config.json {
        println!("{}", allocation.to_json()?);
    } else {
        println!("{allocation}");
    }
    Ok(())
}
