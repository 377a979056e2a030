use std::time::Duration;

use anyhow::{anyhow, Error, Result};
use hmac::{Hmac, Mac};
use log::{debug, info};
use reqwest::blocking::{Client, Response};
use reqwest::Url;
use sha2::Sha256;

use super::{sort_by_time, Candle, CandleSource, Envelope, SourceError};
use crate::clock::{now_millis, Resolution, TimeWindow};

pub const DEFAULT_BASE_URL: &str = "https://ftx.com/api";
pub const DEFAULT_HEADER_PREFIX: &str = "FTX";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Hex-encoded HMAC-SHA256 of the payload keyed with the API secret.
    pub fn sign(&self, payload: &str) -> Result<String> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.api_secret.as_bytes())
            .map_err(|e| anyhow!("invalid api secret: {e}"))?;
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// The string the exchange expects to be signed: `{ts}{METHOD}{path}[?query][body]`. The path is
/// taken from the full request url so any prefix on the base url is included.
pub fn signing_payload(timestamp_ms: i64, method: &str, url: &Url, body: Option<&str>) -> String {
    let mut payload = format!("{timestamp_ms}{method}{}", url.path());
    if let Some(query) = url.query() {
        payload.push('?');
        payload.push_str(query);
    }
    if let Some(body) = body {
        payload.push_str(body);
    }
    payload
}

#[derive(Clone, Debug)]
pub struct SignedClientConfig {
    pub base_url: String,
    pub credentials: Credentials,
    pub header_prefix: String,
    pub timeout: Duration,
}

impl SignedClientConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials,
            header_prefix: DEFAULT_HEADER_PREFIX.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_header_prefix(mut self, header_prefix: impl Into<String>) -> Self {
        self.header_prefix = header_prefix.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Exchange REST client. Every request carries the api key, the signature and the timestamp used
/// in the signature. One request per call, non-success statuses are returned as
/// [SourceError::Status] and never retried.
#[derive(Debug)]
pub struct SignedClient {
    config: SignedClientConfig,
    client: Client,
}

impl SignedClient {
    pub fn new(config: SignedClientConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    pub fn url(&self, endpoint: &str) -> Result<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{endpoint}"))?)
    }

    pub fn get_request(&self, endpoint: &str) -> Result<Response> {
        let url = self.url(endpoint)?;
        let ts = now_millis();
        let payload = signing_payload(ts, "GET", &url, None);
        debug!("Signing payload {payload}");
        let signature = self.config.credentials.sign(&payload)?;

        let prefix = &self.config.header_prefix;
        let resp = self
            .client
            .get(url)
            .header(format!("{prefix}-KEY"), self.config.credentials.api_key.as_str())
            .header(format!("{prefix}-SIGN"), signature)
            .header(format!("{prefix}-TS"), ts.to_string())
            .send()?;

        if !resp.status().is_success() {
            return Err(Error::new(SourceError::Status {
                status: resp.status().as_u16(),
            }));
        }
        Ok(resp)
    }
}

pub fn candles_endpoint(market: &str, resolution: Resolution, window: TimeWindow) -> String {
    format!(
        "/markets/{}/candles?resolution={}&start_time={}&end_time={}",
        market,
        resolution.seconds(),
        window.start(),
        window.end()
    )
}

impl CandleSource for SignedClient {
    fn get_candles(
        &self,
        market: &str,
        resolution: Resolution,
        window: TimeWindow,
    ) -> Result<Vec<Candle>> {
        info!(
            "Fetching {market} candles at {}s from {} to {}",
            resolution.seconds(),
            window.start(),
            window.end()
        );
        let resp = self.get_request(&candles_endpoint(market, resolution, window))?;
        let mut candles = resp.json::<Envelope<Vec<Candle>>>()?.into_result()?;
        sort_by_time(&mut candles);
        info!("Received {} candles for {market}", candles.len());
        Ok(candles)
    }
}
