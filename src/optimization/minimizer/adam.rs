//! minimizer::adam — full-batch Adam for small smooth objectives.
//!
//! Purpose
//! -------
//! Provide a first-order alternative to L-BFGS for objectives whose fixed
//! training budget is expressed in epochs rather than convergence
//! tolerances. Each epoch evaluates the full-batch gradient through the same
//! [`ArgMinAdapter`] the L-BFGS path uses, then applies one Adam update.
//!
//! Key behaviors
//! -------------
//! - Update rule (Kingma & Ba, 2015), with bias correction:
//!   ```text
//!   m_t = β₁ m_{t-1} + (1 - β₁) g
//!   v_t = β₂ v_{t-1} + (1 - β₂) g²
//!   θ_t = θ_{t-1} - lr · m̂_t / (√v̂_t + ε)
//!   ```
//! - Runs exactly `max_iter` epochs unless the optional `tol_grad`
//!   criterion fires first.
//! - Returns an [`OptimOutcome`] whose `value` is the objective at the final
//!   iterate, so callers can treat Adam and L-BFGS results uniformly.
//!
//! Invariants & assumptions
//! ------------------------
//! - The objective is deterministic: identical inputs give identical
//!   trajectories.
//! - Any non-finite gradient aborts the run with the validation error from
//!   the adapter; no partial parameters are returned.
use crate::optimization::{
    errors::{OptError, OptResult},
    minimizer::{
        adapter::ArgMinAdapter,
        traits::{Objective, OptimOutcome},
        types::{FnEvalMap, Theta},
        validation::{verify_epsilon, verify_learning_rate, verify_moment_decay, verify_tol_grad},
    },
};
use argmin::core::{CostFunction, Gradient, TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;
use ndarray::Array1;
use tracing::debug;

/// Epochs between progress lines at `debug` level.
const PROGRESS_EVERY: usize = 1000;

/// Adam hyper-parameters.
///
/// Default: `lr = 1e-3`, `β₁ = 0.9`, `β₂ = 0.999`, `ε = 1e-8`,
/// `max_iter = 10_000`, no gradient tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdamOptions {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    pub max_iter: usize,
    pub tol_grad: Option<f64>,
}

impl AdamOptions {
    /// Construct validated Adam options.
    ///
    /// # Errors
    /// - `OptError::InvalidLearningRate` for a non-finite or non-positive step.
    /// - `OptError::InvalidMomentDecay` for `β` outside `[0, 1)`.
    /// - `OptError::InvalidEpsilon` for a non-finite or non-positive guard.
    /// - `OptError::InvalidMaxIter` if `max_iter == 0`.
    /// - `OptError::InvalidTolGrad` for an invalid gradient tolerance.
    pub fn new(
        learning_rate: f64, beta1: f64, beta2: f64, epsilon: f64, max_iter: usize,
        tol_grad: Option<f64>,
    ) -> OptResult<Self> {
        verify_learning_rate(learning_rate)?;
        verify_moment_decay("beta1", beta1)?;
        verify_moment_decay("beta2", beta2)?;
        verify_epsilon(epsilon)?;
        verify_tol_grad(tol_grad)?;
        if max_iter == 0 {
            return Err(OptError::InvalidMaxIter {
                max_iter,
                reason: "Adam needs at least one epoch.",
            });
        }
        Ok(Self { learning_rate, beta1, beta2, epsilon, max_iter, tol_grad })
    }

    /// Copy of these options with the epoch budget replaced.
    pub fn with_max_iter(&self, max_iter: usize) -> OptResult<Self> {
        Self::new(
            self.learning_rate,
            self.beta1,
            self.beta2,
            self.epsilon,
            max_iter,
            self.tol_grad,
        )
    }
}

impl Default for AdamOptions {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            max_iter: 10_000,
            tol_grad: None,
        }
    }
}

/// Minimize `c(θ)` with full-batch Adam.
///
/// Parameters
/// ----------
/// - `f`: objective implementing [`Objective`].
/// - `theta0`: starting point, consumed and updated in place.
/// - `data`: payload forwarded to `value`/`grad`.
/// - `opts`: validated [`AdamOptions`].
///
/// Returns
/// -------
/// An [`OptimOutcome`] with the final iterate, its objective value,
/// `MaxItersReached` (or `SolverConverged` when `tol_grad` fired), the
/// epoch count, and the last gradient norm.
///
/// Errors
/// ------
/// - Propagates `f.check` failures.
/// - Propagates objective/gradient errors raised during any epoch.
/// - `OptError::NonFiniteCost` if the final objective value is not finite.
pub fn minimize_adam<F: Objective>(
    f: &F, theta0: Theta, data: &F::Data, opts: &AdamOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    let dim = theta0.len();
    let mut theta = theta0;
    let mut m = Array1::<f64>::zeros(dim);
    let mut v = Array1::<f64>::zeros(dim);
    let mut grad_norm = None;
    let mut iterations = 0_u64;
    let mut reason = TerminationReason::MaxItersReached;

    for epoch in 1..=opts.max_iter {
        let grad = problem.gradient(&theta)?;
        let norm = grad.l2_norm();
        grad_norm = Some(norm);
        if let Some(tol) = opts.tol_grad {
            if norm < tol {
                reason = TerminationReason::SolverConverged;
                break;
            }
        }

        m = opts.beta1 * &m + (1.0 - opts.beta1) * &grad;
        v = opts.beta2 * &v + (1.0 - opts.beta2) * &grad.mapv(|g| g * g);
        let bias1 = 1.0 - opts.beta1.powi(epoch as i32);
        let bias2 = 1.0 - opts.beta2.powi(epoch as i32);
        let step = m.mapv(|mi| mi / bias1);
        let denom = v.mapv(|vi| (vi / bias2).sqrt() + opts.epsilon);
        theta = theta - opts.learning_rate * (step / denom);
        iterations = epoch as u64;

        if epoch % PROGRESS_EVERY == 0 {
            debug!(epoch, grad_norm = norm, "adam progress");
        }
    }

    let value = problem.cost(&theta)?;
    let mut fn_evals = FnEvalMap::new();
    fn_evals.insert("cost_count".to_string(), 1);
    fn_evals.insert("gradient_count".to_string(), iterations);
    debug!(iterations, value, "adam finished");
    OptimOutcome::new(
        Some(theta),
        value,
        TerminationStatus::Terminated(reason),
        iterations,
        fn_evals,
        None,
    )
    .map(|outcome| OptimOutcome { grad_norm, ..outcome })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::minimizer::types::{Cost, Grad};
    use approx::assert_relative_eq;
    use ndarray::array;

    // c(θ) = Σ (θ_i - target_i)².
    struct Shifted;

    impl Objective for Shifted {
        type Data = Theta;

        fn value(&self, theta: &Theta, target: &Theta) -> OptResult<Cost> {
            Ok((theta - target).mapv(|d| d * d).sum())
        }

        fn check(&self, _theta: &Theta, _target: &Theta) -> OptResult<()> {
            Ok(())
        }

        fn grad(&self, theta: &Theta, target: &Theta) -> OptResult<Grad> {
            Ok(2.0 * (theta - target))
        }
    }

    #[test]
    // Purpose
    // -------
    // The first Adam step moves every coordinate by exactly `lr` against the
    // gradient sign (bias correction makes m̂/√v̂ = ±1 on step one).
    fn first_step_has_magnitude_learning_rate() {
        let opts = AdamOptions::new(0.1, 0.9, 0.999, 1e-12, 1, None).expect("valid options");
        let target = array![1.0, -1.0];

        let outcome = minimize_adam(&Shifted, array![0.0, 0.0], &target, &opts)
            .expect("single step succeeds");

        assert_relative_eq!(outcome.theta_hat[0], 0.1, epsilon = 1e-9);
        assert_relative_eq!(outcome.theta_hat[1], -0.1, epsilon = 1e-9);
        assert_eq!(outcome.iterations, 1);
    }

    #[test]
    // Purpose
    // -------
    // Adam converges on a convex quadratic given enough epochs.
    fn converges_on_quadratic() {
        let opts = AdamOptions::new(0.05, 0.9, 0.999, 1e-8, 2000, None).expect("valid options");
        let target = array![0.5, -1.5, 2.0];

        let outcome =
            minimize_adam(&Shifted, array![0.0, 0.0, 0.0], &target, &opts).expect("converges");

        for (t, e) in outcome.theta_hat.iter().zip(target.iter()) {
            assert_relative_eq!(t, e, epsilon = 1e-3);
        }
        assert!(outcome.converged);
        assert_eq!(outcome.fn_evals.get("gradient_count"), Some(&2000));
    }

    #[test]
    fn gradient_tolerance_stops_early_at_optimum() {
        let opts =
            AdamOptions::new(1e-3, 0.9, 0.999, 1e-8, 500, Some(1e-9)).expect("valid options");
        let target = array![2.0];

        let outcome = minimize_adam(&Shifted, array![2.0], &target, &opts).expect("at optimum");

        assert_eq!(outcome.iterations, 0);
        assert!(outcome.status.contains("SolverConverged"));
    }

    #[test]
    fn options_validate_every_field() {
        assert!(matches!(
            AdamOptions::new(0.0, 0.9, 0.999, 1e-8, 10, None),
            Err(OptError::InvalidLearningRate { .. })
        ));
        assert!(matches!(
            AdamOptions::new(1e-3, 1.0, 0.999, 1e-8, 10, None),
            Err(OptError::InvalidMomentDecay { name: "beta1", .. })
        ));
        assert!(matches!(
            AdamOptions::new(1e-3, 0.9, 0.999, -1.0, 10, None),
            Err(OptError::InvalidEpsilon { .. })
        ));
        assert!(matches!(
            AdamOptions::default().with_max_iter(0),
            Err(OptError::InvalidMaxIter { .. })
        ));
    }
}
