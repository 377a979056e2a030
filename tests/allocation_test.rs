mod common;

use clap::Parser;

use frontier::allocation::allocate;
use frontier::clock::{Resolution, TimeWindow};
use frontier::config::Config;
use frontier::input::InputError;
use frontier::source::{SignedClient, SourceError};

use common::{flat_candles, generated_candles, spawn_exchange, MockExchange, API_KEY, API_SECRET};

const START: &str = "1633046400";
const END: &str = "1633651200";

fn config(base_url: &str, markets: &str, plot: &str) -> Config {
    Config::parse_from([
        "frontier",
        "--market",
        markets,
        "--start",
        START,
        "--end",
        END,
        "--samples",
        "2000",
        "--seed",
        "17",
        "--plot",
        plot,
        "--base-url",
        base_url,
        "--api-key",
        API_KEY,
        "--api-secret",
        API_SECRET,
    ])
}

#[test]
fn test_that_allocation_runs_against_exchange() {
    let window = TimeWindow::new(1633046400, 1633651200).unwrap();
    let markets = ["BTC-PERP", "ETH-PERP", "ADA-PERP"];
    let mut mock = MockExchange::new();
    for (market, candles) in generated_candles(&markets, Resolution::hourly(), window, 3) {
        mock = mock.with_candles(&market, candles);
    }
    let (base_url, exchange) = spawn_exchange(mock);

    let plot = std::env::temp_dir().join(format!("frontier-e2e-{}.png", std::process::id()));
    let config = config(&base_url, "BTC-PERP,ETH-PERP,ADA-PERP", plot.to_str().unwrap());
    let client = SignedClient::new(config.client_config().unwrap()).unwrap();

    let allocation = allocate(&config, &client).unwrap();
    assert_eq!(
        allocation.iter().map(|(m, _)| m).collect::<Vec<_>>(),
        markets.to_vec()
    );
    assert!((allocation.total() - 1.0).abs() < 1e-9);
    assert!(allocation.iter().all(|(_, w)| w >= 0.0));
    assert_eq!(exchange.hits(), 3);
    assert_eq!(exchange.rejected(), 0);

    let bytes = std::fs::read(&plot).unwrap();
    assert_eq!(&bytes[..4], b"\x89PNG");
    std::fs::remove_file(&plot).unwrap();

    // Same seed, same candles: same answer.
    let again = allocate(&config, &client).unwrap();
    assert_eq!(allocation, again);
}

#[test]
fn test_that_markets_of_different_length_fail_validation() {
    let mock = MockExchange::new()
        .with_candles("BTC-PERP", flat_candles(10))
        .with_candles("ETH-PERP", flat_candles(12));
    let (base_url, _exchange) = spawn_exchange(mock);

    let config = config(&base_url, "BTC-PERP,ETH-PERP", "");
    let client = SignedClient::new(config.client_config().unwrap()).unwrap();

    let err = allocate(&config, &client).unwrap_err();
    assert_eq!(
        err.downcast_ref::<InputError>(),
        Some(&InputError::Misaligned {
            market: "ETH-PERP".to_string(),
            expected: 10,
            found: 12
        })
    );
}

#[test]
fn test_that_failed_fetch_stops_the_run() {
    let (base_url, exchange) = spawn_exchange(MockExchange::new().with_status(429));

    let config = config(&base_url, "BTC-PERP,ETH-PERP", "");
    let client = SignedClient::new(config.client_config().unwrap()).unwrap();

    let err = allocate(&config, &client).unwrap_err();
    assert_eq!(
        err.downcast_ref::<SourceError>(),
        Some(&SourceError::Status { status: 429 })
    );
    assert_eq!(exchange.hits(), 1);
}

#[test]
fn test_that_skipped_plot_writes_no_image() {
    let window = TimeWindow::new(1633046400, 1633651200).unwrap();
    let markets = ["BTC-PERP", "ETH-PERP"];
    let mut mock = MockExchange::new();
    for (market, candles) in generated_candles(&markets, Resolution::hourly(), window, 5) {
        mock = mock.with_candles(&market, candles);
    }
    let (base_url, exchange) = spawn_exchange(mock);

    let plot = std::env::temp_dir().join(format!("frontier-skipped-{}.png", std::process::id()));
    let _ = std::fs::remove_file(&plot);
    let mut config = config(&base_url, "BTC-PERP,ETH-PERP", plot.to_str().unwrap());
    config.no_plot = true;
    assert!(config.plot_target().is_none());
    let client = SignedClient::new(config.client_config().unwrap()).unwrap();

    let allocation = allocate(&config, &client).unwrap();
    assert_eq!(allocation.len(), 2);
    assert_eq!(exchange.hits(), 2);
    assert!(!plot.exists());

    let config = self::config(&base_url, "BTC-PERP,ETH-PERP", "");
    assert!(config.plot_target().is_none());
    let again = allocate(&config, &client).unwrap();
    assert_eq!(allocation, again);
    assert!(!plot.exists());
}
