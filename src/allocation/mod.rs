//! Runs the whole pipeline: fetch candles for each market in turn, build the return series,
//! estimate expected returns and covariance, sample portfolios and map the best weights back onto
//! the markets.

use std::fmt;

use anyhow::Result;
use derive_more::{Display, Error};
use log::info;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::clock::{Resolution, TimeWindow};
use crate::config::Config;
use crate::input::Universe;
use crate::portfolio::PortfolioSampler;
use crate::source::CandleSource;

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum AllocationError {
    #[display("{markets} markets but {weights} weights")]
    LengthMismatch { markets: usize, weights: usize },
}

/// Weight per market, in the order the markets were configured.
#[derive(Clone, Debug, PartialEq)]
pub struct Allocation {
    inner: Vec<(String, f64)>,
}

impl Allocation {
    pub fn new(markets: Vec<String>, weights: Vec<f64>) -> Result<Self> {
        if markets.len() != weights.len() {
            return Err(AllocationError::LengthMismatch {
                markets: markets.len(),
                weights: weights.len(),
            }
            .into());
        }
        Ok(Self {
            inner: markets.into_iter().zip(weights).collect(),
        })
    }

    pub fn get_weight(&self, market: &str) -> Option<f64> {
        self.inner
            .iter()
            .find(|(m, _)| m == market)
            .map(|(_, w)| *w)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.inner.iter().map(|(m, w)| (m.as_str(), *w))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.inner.iter().map(|(_, w)| w).sum()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Serialize for Allocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.inner.len()))?;
        for (market, weight) in &self.inner {
            map.serialize_entry(market, weight)?;
        }
        map.end()
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (market, weight)) in self.inner.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{market:?}: {weight}")?;
        }
        write!(f, "}}")
    }
}

/// Fetches each market one after another. Any failed fetch ends the run.
pub fn fetch_universe(
    markets: &[String],
    resolution: Resolution,
    window: TimeWindow,
    source: &impl CandleSource,
) -> Result<Universe> {
    let mut candles = Vec::with_capacity(markets.len());
    for market in markets {
        let market_candles = source.get_candles(market, resolution, window)?;
        candles.push((market.clone(), market_candles));
    }
    Universe::from_candles(candles)
}

pub fn allocate(config: &Config, source: &impl CandleSource) -> Result<Allocation> {
    let markets = config.markets()?;
    let resolution = config.resolution()?;
    let window = config.window()?;

    let universe = fetch_universe(markets, resolution, window, source)?;
    info!(
        "Built {} return series of {} periods",
        universe.len(),
        universe.periods()
    );

    let expected_returns = universe.expected_returns();
    let cov_matrix = universe.covariance()?;
    let risk_free_rate = config.risk_free_rate()?;

    let mut sampler = match config.seed {
        Some(seed) => PortfolioSampler::from_seed(seed),
        None => PortfolioSampler::new(),
    };
    let weights = sampler.optimal_portfolio(
        &expected_returns,
        &cov_matrix,
        risk_free_rate,
        config.samples,
        config.plot_target(),
    )?;
    Allocation::new(universe.markets(), weights)
}
