//! Inputs turn the candles each source returns into the per-period return series that the
//! sampler works on.
//!
//! Every market in a [Universe] has one return per candle and all series are the same length.
//! Where candles carry a timestamp the timestamps must also line up across markets.

use anyhow::Result;
use derive_more::{Display, Error};

use crate::source::Candle;
use crate::stats::{mean, CovarianceMatrix};

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum InputError {
    #[display("no markets")]
    Empty,
    #[display("{market} returned no candles")]
    NoCandles { market: String },
    #[display("{market} candle {index} has an open of zero")]
    ZeroOpen { market: String, index: usize },
    #[display("{market} has {found} returns, expected {expected}")]
    Misaligned {
        market: String,
        expected: usize,
        found: usize,
    },
    #[display("{market} candle {index} is not aligned in time with the first market")]
    TimestampMismatch { market: String, index: usize },
}

#[derive(Clone, Debug)]
pub struct ReturnSeries {
    pub market: String,
    pub returns: Vec<f64>,
    times: Vec<Option<f64>>,
}

impl ReturnSeries {
    pub fn from_candles(market: &str, candles: &[Candle]) -> Result<Self> {
        if candles.is_empty() {
            return Err(InputError::NoCandles {
                market: market.to_string(),
            }
            .into());
        }

        let mut returns = Vec::with_capacity(candles.len());
        for (index, candle) in candles.iter().enumerate() {
            if candle.open == 0.0 {
                return Err(InputError::ZeroOpen {
                    market: market.to_string(),
                    index,
                }
                .into());
            }
            returns.push(candle.get_return());
        }

        Ok(Self {
            market: market.to_string(),
            returns,
            times: candles.iter().map(|c| c.time).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    pub fn expected_return(&self) -> f64 {
        mean(&self.returns)
    }
}

/// Aligned return series for an ordered set of markets. Order is the order markets were given in
/// and carries through to expected returns, the covariance matrix and the final weights.
#[derive(Clone, Debug)]
pub struct Universe {
    series: Vec<ReturnSeries>,
}

impl Universe {
    pub fn new(series: Vec<ReturnSeries>) -> Result<Self> {
        let first = series.first().ok_or(InputError::Empty)?;
        let expected = first.len();

        for other in series.iter().skip(1) {
            if other.len() != expected {
                return Err(InputError::Misaligned {
                    market: other.market.clone(),
                    expected,
                    found: other.len(),
                }
                .into());
            }

            for (index, (a, b)) in first.times.iter().zip(other.times.iter()).enumerate() {
                if let (Some(a), Some(b)) = (a, b) {
                    if a != b {
                        return Err(InputError::TimestampMismatch {
                            market: other.market.clone(),
                            index,
                        }
                        .into());
                    }
                }
            }
        }
        Ok(Self { series })
    }

    pub fn from_candles(candles: Vec<(String, Vec<Candle>)>) -> Result<Self> {
        let series = candles
            .iter()
            .map(|(market, candles)| ReturnSeries::from_candles(market, candles))
            .collect::<Result<Vec<_>>>()?;
        Self::new(series)
    }

    pub fn markets(&self) -> Vec<String> {
        self.series.iter().map(|s| s.market.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn periods(&self) -> usize {
        self.series.first().map_or(0, |s| s.len())
    }

    pub fn expected_returns(&self) -> Vec<f64> {
        self.series.iter().map(|s| s.expected_return()).collect()
    }

    pub fn covariance(&self) -> Result<CovarianceMatrix> {
        let returns: Vec<Vec<f64>> = self.series.iter().map(|s| s.returns.clone()).collect();
        CovarianceMatrix::from_series(&returns)
    }
}
