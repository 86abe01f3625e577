//! models::model — the predictor/optimiser/metadata bundle and its training.
//!
//! Purpose
//! -------
//! Give every candidate a uniform shape: a [`Predictor`] (the fitted
//! function), an optional [`Optimiser`] (how to fit it) and the
//! [`ModelMetadata`] written next to it on promotion.
//!
//! Key behaviors
//! -------------
//! - [`Model::train`] dispatches on the `(predictor, optimiser)` pair:
//!   Poisson regression is fitted with Adam, discounted averaging with
//!   L-BFGS, and the averaging baseline is never trained.
//! - The epoch budget passed to [`Model::train`] replaces the iteration cap
//!   of the attached optimiser options.
//! - Training on an empty dataset is skipped with a warning and leaves the
//!   parameters at their initial values.
//!
//! Invariants & assumptions
//! ------------------------
//! - A predictor's feature width never changes after construction.
//! - [`Predictor`] is the persisted form of a model; it serializes as an
//!   externally tagged enum so the variant survives a round trip.
use crate::data::dataset::DataSet;
use crate::models::{
    averaging::{self, Averaging},
    discounted::{self, DiscountedAveraging},
    errors::{ModelError, ModelResult},
    metadata::ModelMetadata,
    poisson::{self, PoissonRegression},
};
use crate::optimization::{
    errors::{OptError, OptResult},
    minimizer::{
        AdamOptions, MLEOptions, OptimOutcome, Theta, minimize, minimize_adam,
        validation::validate_theta,
    },
};
use ndarray::{Array1, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A fitted (or fittable) function from a feature window to a raw output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predictor {
    Averaging(Averaging),
    PoissonRegression(PoissonRegression),
    DiscountedAveraging(DiscountedAveraging),
}

impl Predictor {
    /// Raw outputs for each row of `x` (log-rates for Poisson regression).
    ///
    /// # Errors
    /// - [`ModelError::FeatureWidth`] if `x` has the wrong number of columns.
    pub fn predict(&self, x: ArrayView2<'_, f64>) -> ModelResult<Array1<f64>> {
        match self {
            Predictor::Averaging(model) => model.predict(x),
            Predictor::PoissonRegression(model) => model.predict(x),
            Predictor::DiscountedAveraging(model) => model.predict(x),
        }
    }

    pub fn n_days(&self) -> usize {
        match self {
            Predictor::Averaging(model) => model.n_days(),
            Predictor::PoissonRegression(model) => model.n_days(),
            Predictor::DiscountedAveraging(model) => model.n_days(),
        }
    }

    /// Model name this predictor is registered under.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Predictor::Averaging(_) => averaging::MODEL_NAME,
            Predictor::PoissonRegression(_) => poisson::MODEL_NAME,
            Predictor::DiscountedAveraging(_) => discounted::MODEL_NAME,
        }
    }
}

/// Solver attached to a trainable model.
#[derive(Debug, Clone, PartialEq)]
pub enum Optimiser {
    Adam(AdamOptions),
    Lbfgs(MLEOptions),
}

impl Optimiser {
    pub fn name(&self) -> &'static str {
        match self {
            Optimiser::Adam(_) => "adam",
            Optimiser::Lbfgs(_) => "lbfgs",
        }
    }
}

/// Summary of one training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    pub epochs: usize,
    pub final_loss: f64,
    pub converged: bool,
    pub status: String,
}

impl From<&OptimOutcome> for TrainReport {
    fn from(outcome: &OptimOutcome) -> Self {
        Self {
            epochs: outcome.iterations,
            final_loss: outcome.value,
            converged: outcome.converged,
            status: outcome.status.clone(),
        }
    }
}

/// A candidate: predictor, optional optimiser and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub predictor: Predictor,
    pub optimiser: Option<Optimiser>,
    pub metadata: ModelMetadata,
}

impl Model {
    pub fn new(
        predictor: Predictor, optimiser: Option<Optimiser>, metadata: ModelMetadata,
    ) -> Self {
        Self { predictor, optimiser, metadata }
    }

    pub fn name(&self) -> &str {
        &self.metadata.model_name
    }

    pub fn predict(&self, x: ArrayView2<'_, f64>) -> ModelResult<Array1<f64>> {
        self.predictor.predict(x)
    }

    /// Fit the predictor on `data` for at most `n_epochs` solver iterations.
    ///
    /// Returns `Ok(None)` when nothing was trained (no optimiser, or no
    /// rows).
    ///
    /// # Errors
    /// - [`ModelError::IncompatibleOptimiser`] for an unsupported pairing.
    /// - [`ModelError::FeatureWidth`] if `data` has the wrong width.
    /// - [`ModelError::Training`] for any solver failure, including
    ///   `n_epochs == 0`. The predictor is left untouched in that case.
    pub fn train(&mut self, data: &DataSet, n_epochs: usize) -> ModelResult<Option<TrainReport>> {
        let Some(optimiser) = &self.optimiser else {
            return Ok(None);
        };
        if data.is_empty() {
            warn!(
                model = %self.metadata.model_name,
                "no training rows, keeping initial parameters"
            );
            return Ok(None);
        }
        if data.n_days() != self.predictor.n_days() {
            return Err(ModelError::FeatureWidth {
                expected: self.predictor.n_days(),
                found: data.n_days(),
            });
        }

        let outcome = match (&mut self.predictor, optimiser) {
            (Predictor::PoissonRegression(model), Optimiser::Adam(opts)) => {
                let opts = opts.with_max_iter(n_epochs)?;
                let outcome = minimize_adam(&*model, model.theta(), data, &opts)?;
                model.set_theta(&outcome.theta_hat)?;
                outcome
            }
            (Predictor::DiscountedAveraging(model), Optimiser::Lbfgs(opts)) => {
                let opts = opts.with_max_iter(n_epochs)?;
                let outcome = minimize(&*model, model.theta(), data, &opts)?;
                model.set_theta(&outcome.theta_hat)?;
                outcome
            }
            (predictor, optimiser) => {
                return Err(ModelError::IncompatibleOptimiser {
                    model_name: predictor.kind_name(),
                    optimiser: optimiser.name(),
                });
            }
        };

        let report = TrainReport::from(&outcome);
        info!(
            model = %self.metadata.model_name,
            optimiser = optimiser.name(),
            epochs = report.epochs,
            final_loss = report.final_loss,
            converged = report.converged,
            "trained model"
        );
        Ok(Some(report))
    }
}

// ---- Shared checks ----

pub(crate) fn check_n_days(n_days: usize) -> ModelResult<()> {
    if n_days == 0 {
        return Err(ModelError::InvalidHyperParameter {
            name: "n_days",
            value: 0.0,
            reason: "The feature window must cover at least one day.",
        });
    }
    Ok(())
}

pub(crate) fn check_width(x: &ArrayView2<'_, f64>, n_days: usize) -> ModelResult<()> {
    if x.ncols() != n_days {
        return Err(ModelError::FeatureWidth { expected: n_days, found: x.ncols() });
    }
    Ok(())
}

/// Objective-side guard: parameter length, data width, and at least one row.
pub(crate) fn check_objective_data(
    theta: &Theta, data: &DataSet, n_params: usize, n_days: usize,
) -> OptResult<()> {
    validate_theta(theta, n_params)?;
    if data.n_days() != n_days {
        return Err(OptError::DataShapeMismatch { expected: n_days, actual: data.n_days() });
    }
    if data.is_empty() {
        return Err(OptError::EmptyData);
    }
    Ok(())
}
