//! loss — MSE and full Poisson NLL of a predictor on each partition.
//!
//! Purpose
//! -------
//! Score any [`Predictor`] on the count scale so candidates with different
//! output conventions are comparable.
//!
//! Key behaviors
//! -------------
//! - Raw outputs are exponentiated first when the predictor is
//!   log-scaled (`is_yhat_logged`).
//! - `MSE = mean((ŷ - y)²)`.
//! - Full Poisson NLL:
//!   ```text
//!   NLL = mean(ŷ - y·ln ŷ + ln Γ(y + 1))
//!   ```
//!   with `0·ln 0 = 0`.
//! - An empty partition yields `None` for both metrics.
//!
//! Invariants & assumptions
//! ------------------------
//! - Metrics are never clamped: `ŷ ≤ 0` with a positive label gives a
//!   non-finite NLL that is reported as is.
use crate::data::dataset::{DataSet, DataSets};
use crate::models::{errors::ModelResult, model::Predictor};
use ndarray::Array1;
use statrs::function::gamma::ln_gamma;
use std::fmt;

/// Loss metrics on one partition; `None` when it has no rows.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Loss {
    pub mse: Option<f64>,
    pub poisson_nll: Option<f64>,
}

impl Loss {
    /// Score `predictor` on `data`.
    ///
    /// # Errors
    /// - [`ModelError::FeatureWidth`](crate::models::ModelError::FeatureWidth)
    ///   if the predictor and data disagree on `n_days`.
    pub fn calculate(
        data: &DataSet, predictor: &Predictor, is_yhat_logged: bool,
    ) -> ModelResult<Self> {
        let raw = predictor.predict(data.x.view())?;
        let output = if is_yhat_logged { raw.mapv(f64::exp) } else { raw };
        Ok(Self::from_outputs(&data.y, &output))
    }

    /// Score count-scale `output` against `labels`.
    pub fn from_outputs(labels: &Array1<f64>, output: &Array1<f64>) -> Self {
        Self { mse: mse(labels, output), poisson_nll: poisson_nll_full(labels, output) }
    }

    pub fn is_empty(&self) -> bool {
        self.mse.is_none() && self.poisson_nll.is_none()
    }
}

impl fmt::Display for Loss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(mse) = self.mse {
            write!(f, "MSE: {mse:.2}; ")?;
        }
        if let Some(nll) = self.poisson_nll {
            write!(f, "PoissonNLL: {nll:.2}; ")?;
        }
        Ok(())
    }
}

/// Training and validation losses of one predictor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Losses {
    pub training: Loss,
    pub validation: Loss,
}

impl Losses {
    pub fn calculate(
        data_sets: &DataSets, predictor: &Predictor, is_yhat_logged: bool,
    ) -> ModelResult<Self> {
        Ok(Self {
            training: Loss::calculate(&data_sets.training, predictor, is_yhat_logged)?,
            validation: Loss::calculate(&data_sets.validation, predictor, is_yhat_logged)?,
        })
    }

    /// Validation MSE with a missing or NaN value read as `+∞`.
    pub fn validation_mse_or_inf(&self) -> f64 {
        match self.validation.mse {
            Some(mse) if !mse.is_nan() => mse,
            _ => f64::INFINITY,
        }
    }
}

impl fmt::Display for Losses {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Training: {} Validation: {}", self.training, self.validation)
    }
}

/// Mean squared error; `None` for no rows.
pub fn mse(labels: &Array1<f64>, output: &Array1<f64>) -> Option<f64> {
    if labels.is_empty() {
        return None;
    }
    let residual = output - labels;
    Some(residual.dot(&residual) / labels.len() as f64)
}

/// Mean Poisson NLL including `ln y!`; `None` for no rows.
pub fn poisson_nll_full(labels: &Array1<f64>, output: &Array1<f64>) -> Option<f64> {
    if labels.is_empty() {
        return None;
    }
    let total: f64 = labels
        .iter()
        .zip(output.iter())
        .map(|(&y, &rate)| {
            let y_log_rate = if y == 0.0 { 0.0 } else { y * rate.ln() };
            rate - y_log_rate + ln_gamma(y + 1.0)
        })
        .sum();
    Some(total / labels.len() as f64)
}
