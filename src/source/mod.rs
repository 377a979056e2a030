//! Sources are where candles come from. The exchange source signs every request with the account
//! credentials; the local source generates candles in-process and is used for offline runs and
//! tests.
//!
//! Every source returns candles in the exchange's own shape, [Candle], and the rest of the crate
//! only ever sees them through [CandleSource].
pub mod local;
pub mod signed;

use anyhow::Result;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

use crate::clock::{Resolution, TimeWindow};

pub use local::LocalSource;
pub use signed::{Credentials, SignedClient, SignedClientConfig};

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum SourceError {
    #[display("Status code: {status}")]
    Status { status: u16 },
    #[display("response has no result field: {message}")]
    MissingResult { message: String },
    #[display("unknown market: {market}")]
    UnknownMarket { market: String },
}

/// A single price bucket. Only `open` and `close` are required from the exchange.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    pub open: f64,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    /// Bucket start in milliseconds since epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
}

impl Candle {
    pub fn new(open: f64, close: f64, time: Option<f64>) -> Self {
        Self {
            open,
            close,
            high: None,
            low: None,
            volume: None,
            time,
            start_time: None,
        }
    }

    pub fn get_return(&self) -> f64 {
        (self.close - self.open) / self.open
    }
}

/// JSON wrapper the exchange puts around every response body.
#[derive(Debug, Deserialize, Serialize)]
pub struct Envelope<T> {
    pub success: Option<bool>,
    pub result: Option<T>,
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn into_result(self) -> Result<T> {
        match self.result {
            Some(result) => Ok(result),
            None => Err(anyhow::Error::new(SourceError::MissingResult {
                message: self.error.unwrap_or_default(),
            })),
        }
    }
}

pub trait CandleSource {
    fn get_candles(
        &self,
        market: &str,
        resolution: Resolution,
        window: TimeWindow,
    ) -> Result<Vec<Candle>>;
}

/// Candles without a timestamp keep the order they were returned in.
pub(crate) fn sort_by_time(candles: &mut [Candle]) {
    if candles.iter().all(|c| c.time.is_some()) {
        candles.sort_by(|a, b| a.time.unwrap_or_default().total_cmp(&b.time.unwrap_or_default()));
    }
}
