//! models::discounted — exponentially discounted average of the window.
//!
//! Purpose
//! -------
//! Weight recent days more heavily than older ones with a single learned
//! discount rate `θ ∈ (0, 1)`, parameterised without constraints as
//! `θ = σ(β)`.
//!
//! Key behaviors
//! -------------
//! - Weights for columns `t = 1..=n` (most recent first):
//!   ```text
//!   w_t = θ^t / Σ_j θ^j
//!   ```
//!   computed in log space as `t · log σ(β)`, shifted by the maximum before
//!   exponentiation, so extreme `β` never overflows.
//! - The objective is the mean squared error of `x·w(β)` against the labels.
//!   Its derivative uses `d log θ / dβ = 1 - θ = σ(-β)`:
//!   ```text
//!   dw_t/dβ = w_t (1 - θ) (t - Σ_j j·w_j)
//!   ```
//! - Fitted with L-BFGS (More–Thuente line search) from `β = 0`, i.e.
//!   `θ = 0.5`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Weights are positive, strictly decreasing in `t` and sum to one for
//!   every finite `β` and moderate `n_days`.
//! - Output is on the count scale (`is_yhat_logged = false`).
use crate::data::dataset::DataSet;
use crate::models::{
    errors::ModelResult,
    metadata::{HyperParameters, ModelMetadata},
    model::{Model, Optimiser, Predictor, check_n_days, check_objective_data, check_width},
};
use crate::optimization::{
    errors::{OptError, OptResult},
    minimizer::{Cost, Grad, MLEOptions, Objective, Theta, Tolerances},
    numerical_stability::{safe_log_logistic, safe_logistic},
};
use ndarray::{Array1, ArrayView2, array};
use serde::{Deserialize, Serialize};

pub const MODEL_NAME: &str = "temporally_discounted_averaging";

/// Gradient tolerance for the discount-rate fit.
const TOL_GRAD: f64 = 1e-8;

/// Cost-change tolerance for the discount-rate fit.
const TOL_COST: f64 = 1e-14;

/// Default iteration cap; overridden by the epoch budget at train time.
const MAX_ITER: usize = 1000;

/// Discounted average with logit discount `beta`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountedAveraging {
    beta: f64,
    n_days: usize,
}

impl DiscountedAveraging {
    /// Start at `β = 0` (equal odds of keeping each older day).
    pub fn new(n_days: usize) -> ModelResult<Self> {
        check_n_days(n_days)?;
        Ok(Self { beta: 0.0, n_days })
    }

    pub fn n_days(&self) -> usize {
        self.n_days
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Discount rate `θ = σ(β)`.
    pub fn discount_rate(&self) -> f64 {
        safe_logistic(self.beta)
    }

    pub fn weights(&self) -> Array1<f64> {
        discount_weights(self.beta, self.n_days)
    }

    pub fn theta(&self) -> Theta {
        array![self.beta]
    }

    pub fn set_theta(&mut self, theta: &Theta) -> ModelResult<()> {
        crate::optimization::minimizer::validation::validate_theta(theta, 1)?;
        self.beta = theta[0];
        Ok(())
    }

    pub fn predict(&self, x: ArrayView2<'_, f64>) -> ModelResult<Array1<f64>> {
        check_width(&x, self.n_days)?;
        Ok(x.dot(&self.weights()))
    }
}

/// Normalised discount weights for `t = 1..=n_days`.
pub fn discount_weights(beta: f64, n_days: usize) -> Array1<f64> {
    let log_theta = safe_log_logistic(beta);
    // t = 1 carries the largest log-weight since log θ < 0.
    let unnormalised = Array1::from_shape_fn(n_days, |i| (i as f64 * log_theta).exp());
    let total = unnormalised.sum();
    unnormalised / total
}

impl Objective for DiscountedAveraging {
    type Data = DataSet;

    fn value(&self, theta: &Theta, data: &DataSet) -> OptResult<Cost> {
        self.check(theta, data)?;
        let weights = discount_weights(theta[0], self.n_days);
        let residual = data.x.dot(&weights) - &data.y;
        Ok(residual.dot(&residual) / data.n_rows() as f64)
    }

    fn check(&self, theta: &Theta, data: &DataSet) -> OptResult<()> {
        check_objective_data(theta, data, 1, self.n_days)
    }

    fn grad(&self, theta: &Theta, data: &DataSet) -> OptResult<Grad> {
        self.check(theta, data)?;
        let beta = theta[0];
        let weights = discount_weights(beta, self.n_days);
        let positions = Array1::from_shape_fn(self.n_days, |i| (i + 1) as f64);
        let mean_position = positions.dot(&weights);
        let d_weights = &weights * &(positions - mean_position) * safe_logistic(-beta);

        let residual = data.x.dot(&weights) - &data.y;
        let d_prediction = data.x.dot(&d_weights);
        let d_beta = 2.0 * residual.dot(&d_prediction) / data.n_rows() as f64;
        if !d_beta.is_finite() {
            return Err(OptError::InvalidGradient {
                index: 0,
                value: d_beta,
                reason: "Discount gradient must be finite.",
            });
        }
        Ok(array![d_beta])
    }
}

/// Default solver settings for the discount-rate fit.
pub fn default_options() -> OptResult<MLEOptions> {
    let tols = Tolerances::new(Some(TOL_GRAD), Some(TOL_COST), Some(MAX_ITER))?;
    MLEOptions::new(tols, false, None)
}

/// Build a discounted-averaging model starting at `θ = 0.5`.
pub fn define_model(hyper_parameters: HyperParameters) -> ModelResult<Model> {
    hyper_parameters.validate()?;
    let predictor = Predictor::DiscountedAveraging(DiscountedAveraging::new(
        hyper_parameters.n_days,
    )?);
    let metadata = ModelMetadata::new(MODEL_NAME, hyper_parameters, false);
    Ok(Model::new(predictor, Some(Optimiser::Lbfgs(default_options()?)), metadata))
}
