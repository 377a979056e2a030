//! Summary statistics over per-period return series.
//!
//! Variances and covariances use the sample (n - 1) denominator. Series shorter than two
//! observations have no spread and produce zero.

use anyhow::Result;
use derive_more::{Display, Error};

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum StatsError {
    #[display("series {index} has length {found}, expected {expected}")]
    Ragged {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[display("weights have length {found}, matrix has dimension {expected}")]
    WrongDimension { expected: usize, found: usize },
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn covariance(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }
    let mean_a = mean(&a[..n]);
    let mean_b = mean(&b[..n]);
    let sum_of_products = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum::<f64>();
    sum_of_products / (n - 1) as f64
}

pub fn variance(values: &[f64]) -> f64 {
    covariance(values, values)
}

pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Converts an annual rate into the equivalent compounded rate for one period.
pub fn per_period_rate(annual_rate: f64, periods_per_year: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / periods_per_year) - 1.0
}

/// Square covariance matrix, stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct CovarianceMatrix {
    dim: usize,
    inner: Vec<f64>,
}

impl CovarianceMatrix {
    /// Every series must have the same length.
    pub fn from_series(series: &[Vec<f64>]) -> Result<Self> {
        let dim = series.len();
        if let Some(first) = series.first() {
            for (index, s) in series.iter().enumerate() {
                if s.len() != first.len() {
                    return Err(StatsError::Ragged {
                        index,
                        expected: first.len(),
                        found: s.len(),
                    }
                    .into());
                }
            }
        }

        let mut inner = vec![0.0; dim * dim];
        for i in 0..dim {
            for j in i..dim {
                let cov = covariance(&series[i], &series[j]);
                inner[i * dim + j] = cov;
                inner[j * dim + i] = cov;
            }
        }
        Ok(Self { dim, inner })
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let dim = rows.len();
        let mut inner = Vec::with_capacity(dim * dim);
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != dim {
                return Err(StatsError::Ragged {
                    index,
                    expected: dim,
                    found: row.len(),
                }
                .into());
            }
            inner.extend(row);
        }
        Ok(Self { dim, inner })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.inner[row * self.dim + col]
    }

    /// `wᵀ · Σ · w`
    pub fn quadratic_form(&self, weights: &[f64]) -> Result<f64> {
        if weights.len() != self.dim {
            return Err(StatsError::WrongDimension {
                expected: self.dim,
                found: weights.len(),
            }
            .into());
        }
        let mut total = 0.0;
        for (i, wi) in weights.iter().enumerate() {
            for (j, wj) in weights.iter().enumerate() {
                total += wi * self.get(i, j) * wj;
            }
        }
        Ok(total)
    }

    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        (0..self.dim).all(|i| (0..i).all(|j| (self.get(i, j) - self.get(j, i)).abs() <= tolerance))
    }
}
