//! # What is Frontier?
//!
//! Frontier estimates an allocation across a small set of perpetual futures markets. It pulls
//! historical candles from the exchange, turns them into per-period returns, and searches random
//! portfolio weights for the one with the highest Sharpe ratio. The search is Monte Carlo: weights
//! are drawn, scored and the best kept. There is no iterative refinement.
//!
//! # Implementation
//!
//! A run is a straight line through these components:
//! - A source, [SignedClient](crate::source::SignedClient) is the exchange implementation. Each
//! request is signed with HMAC-SHA256 over the timestamp, method and path. The
//! [LocalSource](crate::source::LocalSource) generates candles without a network and is what tests
//! and `--offline` runs use. Both implement [CandleSource](crate::source::CandleSource).
//! - An input, [Universe](crate::input::Universe), which turns candles into aligned return series.
//! Series of different lengths are rejected here rather than truncated.
//! - [stats](crate::stats) for expected returns, the covariance matrix and the conversion of an
//! annual risk-free rate to a per-candle rate.
//! - The sampler, [PortfolioSampler](crate::portfolio::PortfolioSampler), which returns the
//! [Frontier](crate::portfolio::Frontier) of every sample drawn.
//! - [plot](crate::plot) which renders the frontier to a PNG.
//! - [allocate](crate::allocation::allocate) which ties all of the above together and returns the
//! weight for each market.
//!
//! ``
//! cargo run --bin frontier -- --market BTC-PERP,ETH-PERP --samples 5000 --plot frontier.png
//! ``
//!
//! Credentials are read from `FRONTIER_API_KEY` and `FRONTIER_API_SECRET` when not passed as
//! flags. Logging goes through `log` and is switched on with `RUST_LOG`.
pub mod allocation;
pub mod clock;
pub mod config;
pub mod input;
pub mod plot;
pub mod portfolio;
pub mod source;
pub mod stats;
