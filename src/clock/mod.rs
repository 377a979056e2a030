//! Candle resolutions and the time window a run covers.

use anyhow::Result;
use derive_more::{Display, Error};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

const SECONDS_IN_DAY: u64 = 86_400;
const SECONDS_IN_YEAR: u64 = 365 * SECONDS_IN_DAY;
const MAX_DAYS: u64 = 30;
const INTRADAY_RESOLUTIONS: [u64; 6] = [15, 60, 300, 900, 3600, 14400];

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum ClockError {
    #[display("unsupported candle resolution: {seconds}s")]
    UnsupportedResolution { seconds: u64 },
    #[display("start_time {start} must be before end_time {end}")]
    InvalidWindow { start: i64, end: i64 },
    #[display("cannot parse timestamp: {value}")]
    InvalidTimestamp { value: String },
}

/// Width of a candle bucket in whole seconds.
///
/// Intraday widths are limited to the standard exchange intervals. Daily candles can be any whole
/// number of days up to thirty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution(u64);

impl Resolution {
    pub fn seconds(&self) -> u64 {
        self.0
    }

    pub fn periods_per_year(&self) -> f64 {
        SECONDS_IN_YEAR as f64 / self.0 as f64
    }

    pub fn hourly() -> Self {
        Self(3600)
    }
}

impl TryFrom<u64> for Resolution {
    type Error = anyhow::Error;

    fn try_from(seconds: u64) -> Result<Self> {
        let is_daily =
            seconds % SECONDS_IN_DAY == 0 && seconds > 0 && seconds / SECONDS_IN_DAY <= MAX_DAYS;
        if INTRADAY_RESOLUTIONS.contains(&seconds) || is_daily {
            Ok(Self(seconds))
        } else {
            Err(ClockError::UnsupportedResolution { seconds }.into())
        }
    }
}

/// Range of Unix seconds with both ends included, the way the exchange treats them. Start is
/// always strictly before end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    start: i64,
    end: i64,
}

impl TimeWindow {
    pub fn new(start: i64, end: i64) -> Result<Self> {
        if start >= end {
            return Err(ClockError::InvalidWindow { start, end }.into());
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    /// Number of whole candles of the given width that fit in the window.
    pub fn periods(&self, resolution: Resolution) -> u64 {
        (self.end - self.start) as u64 / resolution.seconds()
    }
}

/// Accepts either a Unix timestamp in seconds or an RFC 3339 date-time.
pub fn parse_timestamp(value: &str) -> Result<i64> {
    let trimmed = value.trim();
    if let Ok(seconds) = trimmed.parse::<i64>() {
        return Ok(seconds);
    }
    if let Ok(date) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(date.unix_timestamp());
    }
    Err(ClockError::InvalidTimestamp {
        value: value.to_string(),
    }
    .into())
}

pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
