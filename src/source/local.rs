use std::collections::HashMap;

use anyhow::Result;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Normal;

use super::{sort_by_time, Candle, CandleSource, SourceError};
use crate::clock::{Resolution, TimeWindow};

const START_PRICE: f64 = 100.0;

/// In-memory candles keyed by market. Serves the same requests as the exchange client without
/// touching the network.
#[derive(Clone, Debug, Default)]
pub struct LocalSource {
    inner: HashMap<String, Vec<Candle>>,
}

impl LocalSource {
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    pub fn add_candles(&mut self, market: impl Into<String>, mut candles: Vec<Candle>) {
        sort_by_time(&mut candles);
        self.inner.insert(market.into(), candles);
    }

    /// Random walk per market with its own drift and volatility. Same seed gives the same candles.
    pub fn random(
        markets: &[&str],
        resolution: Resolution,
        window: TimeWindow,
        seed: u64,
    ) -> Result<Self> {
        let drift_dist = Uniform::new(-0.0005, 0.001);
        let vol_dist = Uniform::new(0.002, 0.02);
        let mut rng = StdRng::seed_from_u64(seed);

        let mut source = Self::new();
        for market in markets {
            let returns = Normal::new(drift_dist.sample(&mut rng), vol_dist.sample(&mut rng))?;

            let mut candles = Vec::new();
            let mut price = START_PRICE;
            let mut date = window.start();
            while date <= window.end() {
                let close = (price * (1.0 + returns.sample(&mut rng))).max(f64::EPSILON);
                candles.push(Candle::new(price, close, Some((date * 1000) as f64)));
                price = close;
                date += resolution.seconds() as i64;
            }
            source.add_candles(*market, candles);
        }
        Ok(source)
    }
}

impl CandleSource for LocalSource {
    fn get_candles(
        &self,
        market: &str,
        _resolution: Resolution,
        window: TimeWindow,
    ) -> Result<Vec<Candle>> {
        let candles = self
            .inner
            .get(market)
            .ok_or_else(|| SourceError::UnknownMarket {
                market: market.to_string(),
            })?;

        let start = (window.start() * 1000) as f64;
        let end = (window.end() * 1000) as f64;
        Ok(candles
            .iter()
            .filter(|c| c.time.map_or(true, |t| t >= start && t <= end))
            .cloned()
            .collect())
    }
}
