//! models::poisson — linear Poisson regression on the visit window.
//!
//! Purpose
//! -------
//! Model tomorrow's visit count as Poisson with log-rate
//! `η = x·w + b`. The raw prediction is `η` itself, so the metadata marks
//! it `is_yhat_logged = true`.
//!
//! Key behaviors
//! -------------
//! - Objective (mean over `m` rows, log-input Poisson NLL without the
//!   constant `ln y!` term, plus a ridge penalty on every parameter):
//!   ```text
//!   c(w, b) = (1/m) Σ_i [exp(η_i) - y_i η_i] + (λ/2)(‖w‖² + b²)
//!   ```
//!   This is the objective whose gradient Adam with weight decay `λ`
//!   follows.
//! - Analytic gradient with residual `r_i = exp(η_i) - y_i`:
//!   `∇_w = Xᵀr / m + λw`, `∂_b = mean(r) + λb`.
//! - Fitted with full-batch Adam from all-zero parameters, so repeated fits
//!   on the same data are bitwise identical.
//!
//! Conventions
//! -----------
//! - Parameter vector layout: `θ = [w_1, …, w_n, b]`, `n = n_days`.
use crate::data::dataset::DataSet;
use crate::models::{
    errors::{ModelError, ModelResult},
    metadata::{HyperParameters, ModelMetadata},
    model::{Model, Optimiser, Predictor, check_n_days, check_objective_data, check_width},
};
use crate::optimization::{
    errors::OptResult,
    minimizer::{AdamOptions, Cost, Grad, Objective, Theta},
};
use ndarray::{Array1, ArrayView2, s};
use serde::{Deserialize, Serialize};

pub const MODEL_NAME: &str = "poisson_regression";

/// Affine log-rate model `η = x·w + b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoissonRegression {
    weights: Array1<f64>,
    bias: f64,
    l2_coef: f64,
}

impl PoissonRegression {
    /// All-zero parameters for an `n_days` window.
    ///
    /// # Errors
    /// - [`ModelError::InvalidHyperParameter`] if `n_days == 0` or `l2_coef`
    ///   is negative or non-finite.
    pub fn zeros(n_days: usize, l2_coef: f64) -> ModelResult<Self> {
        check_n_days(n_days)?;
        if !l2_coef.is_finite() || l2_coef < 0.0 {
            return Err(ModelError::InvalidHyperParameter {
                name: "l2_coef",
                value: l2_coef,
                reason: "The L2 coefficient must be finite and non-negative.",
            });
        }
        Ok(Self { weights: Array1::zeros(n_days), bias: 0.0, l2_coef })
    }

    pub fn n_days(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn l2_coef(&self) -> f64 {
        self.l2_coef
    }

    /// Current parameters packed as `[w, b]`.
    pub fn theta(&self) -> Theta {
        let mut theta = Array1::zeros(self.n_days() + 1);
        theta.slice_mut(s![..self.n_days()]).assign(&self.weights);
        theta[self.n_days()] = self.bias;
        theta
    }

    /// Unpack `[w, b]` into the model.
    ///
    /// # Errors
    /// - `ModelError::Training(ThetaLengthMismatch)` for a wrong-length vector.
    pub fn set_theta(&mut self, theta: &Theta) -> ModelResult<()> {
        crate::optimization::minimizer::validation::validate_theta(theta, self.n_days() + 1)?;
        let n = self.n_days();
        self.weights.assign(&theta.slice(s![..n]));
        self.bias = theta[n];
        Ok(())
    }

    /// Raw output `η = x·w + b` (a log-rate).
    pub fn predict(&self, x: ArrayView2<'_, f64>) -> ModelResult<Array1<f64>> {
        check_width(&x, self.n_days())?;
        Ok(x.dot(&self.weights) + self.bias)
    }

    // Log-rates for a packed θ; shapes are checked by the caller.
    fn linear_predictor(theta: &Theta, data: &DataSet) -> Array1<f64> {
        let n = theta.len() - 1;
        data.x.dot(&theta.slice(s![..n])) + theta[n]
    }
}

impl Objective for PoissonRegression {
    type Data = DataSet;

    fn value(&self, theta: &Theta, data: &DataSet) -> OptResult<Cost> {
        check_objective_data(theta, data, self.n_days() + 1, self.n_days())?;
        let eta = Self::linear_predictor(theta, data);
        let m = data.n_rows() as f64;
        let nll = eta.iter().zip(data.y.iter()).map(|(&e, &y)| e.exp() - y * e).sum::<f64>() / m;
        Ok(nll + 0.5 * self.l2_coef * theta.dot(theta))
    }

    fn check(&self, theta: &Theta, data: &DataSet) -> OptResult<()> {
        check_objective_data(theta, data, self.n_days() + 1, self.n_days())
    }

    fn grad(&self, theta: &Theta, data: &DataSet) -> OptResult<Grad> {
        check_objective_data(theta, data, self.n_days() + 1, self.n_days())?;
        let n = self.n_days();
        let m = data.n_rows() as f64;
        let eta = Self::linear_predictor(theta, data);
        let residual = eta.mapv(f64::exp) - &data.y;

        let mut grad = self.l2_coef * theta;
        let data_w = data.x.t().dot(&residual) / m;
        grad.slice_mut(s![..n]).scaled_add(1.0, &data_w);
        grad[n] += residual.sum() / m;
        Ok(grad)
    }
}

/// Build a zero-initialised Poisson regression trained with Adam.
///
/// A missing `l2_coef` means no penalty.
pub fn define_model(hyper_parameters: HyperParameters) -> ModelResult<Model> {
    hyper_parameters.validate()?;
    let predictor = Predictor::PoissonRegression(PoissonRegression::zeros(
        hyper_parameters.n_days,
        hyper_parameters.l2_or_zero(),
    )?);
    let metadata = ModelMetadata::new(MODEL_NAME, hyper_parameters, true);
    Ok(Model::new(predictor, Some(Optimiser::Adam(AdamOptions::default())), metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loss::Loss;
    use crate::optimization::errors::OptError;
    use approx::assert_relative_eq;
    use finitediff::FiniteDiff;
    use ndarray::array;

    // Every row has identical features, so the model can match the labels
    // exactly through the weights.
    fn overfit_data() -> DataSet {
        DataSet::new(array![[1.0, 1.0, 1.0, 1.0], [2.0, 2.0, 2.0, 2.0]], array![1.0, 2.0])
            .expect("consistent shapes")
    }

    fn trained(l2_coef: f64, n_epochs: usize) -> Model {
        let hp = HyperParameters::new(4, Some(l2_coef)).expect("valid");
        let mut model = define_model(hp).expect("valid model");
        model.train(&overfit_data(), n_epochs).expect("training succeeds");
        model
    }

    #[test]
    // Purpose
    // -------
    // The analytic gradient matches central finite differences of `value`.
    fn analytic_gradient_matches_finite_differences() {
        let model = PoissonRegression::zeros(3, 0.7).expect("valid");
        let data = DataSet::new(
            array![[0.0, 1.0, 3.0], [2.0, 0.0, 1.0], [1.0, 1.0, 0.0]],
            array![2.0, 0.0, 1.0],
        )
        .expect("consistent shapes");
        let theta = array![0.1, -0.2, 0.05, 0.3];

        let analytic = model.grad(&theta, &data).expect("finite gradient");
        let numeric = theta.central_diff(&|t: &Theta| model.value(t, &data).expect("finite"));

        for (a, n) in analytic.iter().zip(numeric.iter()) {
            assert_relative_eq!(a, n, epsilon = 1e-6);
        }
    }

    #[test]
    fn value_at_zero_is_mean_rate_one() {
        let model = PoissonRegression::zeros(4, 0.0).expect("valid");

        // η = 0 ⇒ exp(η) - yη = 1 for every row.
        let value = model.value(&model.theta(), &overfit_data()).expect("finite");

        assert_relative_eq!(value, 1.0);
    }

    #[test]
    // Purpose
    // -------
    // Without regularisation the fit reaches the labels on an overfittable
    // dataset.
    //
    // Given
    // -----
    // - x = [[1,1,1,1],[2,2,2,2]], y = [1, 2], l2 = 0, 10 000 Adam epochs.
    //
    // Expect
    // ------
    // - exp(η) ≈ y and the full Poisson NLL ≈ NLL(y, y).
    fn overfits_to_labels_without_penalty() {
        let model = trained(0.0, 10_000);
        let data = overfit_data();

        let loss = Loss::calculate(&data, &model.predictor, true).expect("matching width");
        let floor = Loss::from_outputs(&data.y, &data.y);

        let rates = model.predict(data.x.view()).expect("matching width").mapv(f64::exp);
        assert_relative_eq!(rates[0], 1.0, epsilon = 1e-3);
        assert_relative_eq!(rates[1], 2.0, epsilon = 1e-3);
        assert_relative_eq!(
            loss.poisson_nll.expect("non-empty"),
            floor.poisson_nll.expect("non-empty"),
            epsilon = 1e-3
        );
        assert!(loss.mse.expect("non-empty") < 1e-4);
    }

    #[test]
    fn repeated_fits_are_identical() {
        let data = overfit_data();

        let first = trained(0.0, 2_000);
        let second = trained(0.0, 2_000);

        let mse_first = Loss::calculate(&data, &first.predictor, true).expect("scored").mse;
        let mse_second = Loss::calculate(&data, &second.predictor, true).expect("scored").mse;
        assert_eq!(mse_first, mse_second);
        assert_eq!(first.predictor, second.predictor);
    }

    #[test]
    // Purpose
    // -------
    // A very large ridge coefficient pins the weights at zero.
    fn large_penalty_shrinks_weights() {
        let model = trained(1e5, 10_000);

        let Predictor::PoissonRegression(fitted) = &model.predictor else {
            panic!("define_model must build a Poisson regression");
        };
        let norm = fitted.weights().dot(fitted.weights()).sqrt();

        assert!(norm < 1e-4, "weight norm {norm} should be below 1e-4");
    }

    #[test]
    // Purpose
    // -------
    // The ridge term covers the bias as well as the weights.
    //
    // Given
    // -----
    // - θ = [w = 0, b = 2] on x = [[1], [2]], y = [1, 2], with l2 = 0 and
    //   l2 = 1.
    //
    // Expect
    // ------
    // - value grows by b²/2 = 2 and ∂_b grows by λb = 2.
    fn penalty_includes_the_bias() {
        let data = DataSet::new(array![[1.0], [2.0]], array![1.0, 2.0]).expect("consistent");
        let theta = array![0.0, 2.0];
        let free = PoissonRegression::zeros(1, 0.0).expect("valid");
        let ridge = PoissonRegression::zeros(1, 1.0).expect("valid");

        let value_free = free.value(&theta, &data).expect("finite");
        let value_ridge = ridge.value(&theta, &data).expect("finite");
        let grad_free = free.grad(&theta, &data).expect("finite");
        let grad_ridge = ridge.grad(&theta, &data).expect("finite");

        assert_relative_eq!(value_ridge - value_free, 2.0, epsilon = 1e-12);
        assert_relative_eq!(grad_ridge[1] - grad_free[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(grad_ridge[0], grad_free[0], epsilon = 1e-12);
    }

    #[test]
    fn objective_rejects_mismatched_theta_and_empty_data() {
        let model = PoissonRegression::zeros(4, 0.0).expect("valid");

        assert_eq!(
            model.check(&array![0.0, 0.0], &overfit_data()),
            Err(OptError::ThetaLengthMismatch { expected: 5, actual: 2 })
        );
        assert_eq!(model.check(&model.theta(), &DataSet::empty(4)), Err(OptError::EmptyData));
    }

    #[test]
    fn set_theta_round_trips_layout() {
        let mut model = PoissonRegression::zeros(2, 0.0).expect("valid");

        model.set_theta(&array![0.5, -0.25, 1.5]).expect("matching length");

        assert_eq!(model.weights(), &array![0.5, -0.25]);
        assert_eq!(model.bias(), 1.5);
        assert_eq!(model.theta(), array![0.5, -0.25, 1.5]);
    }
}
