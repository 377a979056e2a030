//! Random-sampling search for the weights with the highest Sharpe ratio.
//!
//! Each draw takes one independent uniform value per asset and divides by their sum. This keeps
//! every weight non-negative and the total at one but does not sample the simplex uniformly:
//! draws are biased towards the centre. Samples are kept so that the frontier can be plotted.
//!
//! Variance that comes out fractionally negative from rounding is clamped to zero. A sample with
//! zero volatility has no defined Sharpe ratio and cannot be selected; if no sample can be
//! selected the search fails.

use std::path::Path;

use anyhow::Result;
use derive_more::{Display, Error};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::plot::{self, PlotConfig};
use crate::stats::CovarianceMatrix;

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum SamplerError {
    #[display("no assets to allocate across")]
    NoAssets,
    #[display("number of samples must be positive")]
    NoSamples,
    #[display("{assets} expected returns but covariance matrix has dimension {dim}")]
    DimensionMismatch { assets: usize, dim: usize },
    #[display("every sampled portfolio had zero volatility")]
    NoValidSample,
}

/// One sampled portfolio.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub weights: Vec<f64>,
    pub ret: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
}

impl Sample {
    pub fn is_degenerate(&self) -> bool {
        self.volatility <= 0.0 || !self.sharpe_ratio.is_finite()
    }
}

/// Every sample drawn in a search and the position of the best one.
#[derive(Clone, Debug)]
pub struct Frontier {
    samples: Vec<Sample>,
    best: usize,
}

impl Frontier {
    pub fn best(&self) -> &Sample {
        &self.samples[self.best]
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn into_best_weights(mut self) -> Vec<f64> {
        self.samples.swap_remove(self.best).weights
    }
}

pub struct PortfolioSampler {
    rng: StdRng,
}

impl Default for PortfolioSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl PortfolioSampler {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Independent uniforms normalized by their sum. A draw summing to zero is taken again.
    pub fn random_weights(&mut self, assets: usize) -> Vec<f64> {
        loop {
            let weights: Vec<f64> = (0..assets).map(|_| self.rng.gen::<f64>()).collect();
            let total: f64 = weights.iter().sum();
            if total > 0.0 {
                return weights.into_iter().map(|w| w / total).collect();
            }
        }
    }

    /// Draws `num_samples` portfolios and scores each one. The number of assets is the length of
    /// `expected_returns` and must match the covariance matrix.
    pub fn sample(
        &mut self,
        expected_returns: &[f64],
        cov_matrix: &CovarianceMatrix,
        risk_free_rate: f64,
        num_samples: usize,
    ) -> Result<Frontier> {
        let assets = expected_returns.len();
        if assets == 0 {
            return Err(SamplerError::NoAssets.into());
        }
        if num_samples == 0 {
            return Err(SamplerError::NoSamples.into());
        }
        if cov_matrix.dim() != assets {
            return Err(SamplerError::DimensionMismatch {
                assets,
                dim: cov_matrix.dim(),
            }
            .into());
        }

        let mut samples: Vec<Sample> = Vec::with_capacity(num_samples);
        let mut best: Option<usize> = None;
        let mut degenerate = 0;

        for i in 0..num_samples {
            let weights = self.random_weights(assets);
            let ret = weights
                .iter()
                .zip(expected_returns.iter())
                .map(|(w, r)| w * r)
                .sum::<f64>();

            let mut variance = cov_matrix.quadratic_form(&weights)?;
            if variance < 0.0 {
                debug!("Clamping variance {variance} to zero");
                variance = 0.0;
            }
            let volatility = variance.sqrt();
            let sharpe_ratio = (ret - risk_free_rate) / volatility;

            let sample = Sample {
                weights,
                ret,
                volatility,
                sharpe_ratio,
            };

            if sample.is_degenerate() {
                degenerate += 1;
            } else if best.map_or(true, |b: usize| {
                sample.sharpe_ratio > samples[b].sharpe_ratio
            }) {
                best = Some(i);
            }
            samples.push(sample);
        }

        if degenerate > 0 {
            warn!("{degenerate} of {num_samples} samples had zero volatility and were skipped");
        }

        let best = best.ok_or(SamplerError::NoValidSample)?;
        let frontier = Frontier { samples, best };
        info!(
            "Best of {num_samples} samples: return {:.6}, volatility {:.6}, sharpe {:.4}",
            frontier.best().ret,
            frontier.best().volatility,
            frontier.best().sharpe_ratio
        );
        Ok(frontier)
    }

    /// Samples, renders the frontier if `plot_target` is a non-empty path, and returns the weights
    /// of the best sample.
    pub fn optimal_portfolio(
        &mut self,
        expected_returns: &[f64],
        cov_matrix: &CovarianceMatrix,
        risk_free_rate: f64,
        num_samples: usize,
        plot_target: Option<&Path>,
    ) -> Result<Vec<f64>> {
        let frontier = self.sample(expected_returns, cov_matrix, risk_free_rate, num_samples)?;

        if let Some(path) = plot_target.filter(|p| !p.as_os_str().is_empty()) {
            plot::save(&frontier, path, &PlotConfig::default())?;
            info!("Wrote frontier plot to {}", path.display());
        }
        Ok(frontier.into_best_weights())
    }
}
