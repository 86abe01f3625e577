//! High-level entry point for minimizing a user-provided `Objective` with
//! L-BFGS.
//!
//! This builds an L-BFGS solver with More–Thuente line search, wraps the
//! objective in an `ArgMinAdapter`, and delegates the run to `run_lbfgs`.
use crate::optimization::{
    errors::OptResult,
    minimizer::{
        adapter::ArgMinAdapter,
        builders::build_optimizer_more_thuente,
        run::run_lbfgs,
        traits::{MLEOptions, Objective, OptimOutcome},
        types::Theta,
    },
};

/// Minimize an objective `c(θ)` using L-BFGS.
///
/// # Behavior
/// - Validates the initial guess via `f.check(theta0, data)`.
/// - Builds an L-BFGS solver with More–Thuente line search.
/// - Calls `run_lbfgs`, which configures the executor (initial params,
///   max iters, optional observers) and returns an `OptimOutcome`.
///
/// # Errors
/// - Propagates any error from `f.check`.
/// - Propagates builder errors from `build_optimizer_more_thuente`.
/// - Propagates runtime errors from `run_lbfgs` (e.g., line search failures).
///
/// # Example
/// ```no_run
/// use ndarray::array;
/// use visit_forecast::optimization::errors::OptResult;
/// use visit_forecast::optimization::minimizer::{minimize, Grad, MLEOptions, Objective, Theta};
///
/// struct Bowl;
/// impl Objective for Bowl {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
///         Ok(theta.dot(theta))
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
///     fn grad(&self, theta: &Theta, _: &()) -> OptResult<Grad> {
///         Ok(2.0 * theta)
///     }
/// }
///
/// let out = minimize(&Bowl, array![0.1, -0.2, 0.3], &(), &MLEOptions::default())?;
/// println!("θ̂ = {:?}", out.theta_hat);
/// # Ok::<(), visit_forecast::optimization::errors::OptError>(())
/// ```
pub fn minimize<F: Objective>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    let solver = build_optimizer_more_thuente(opts)?;
    run_lbfgs(theta0, opts, problem, solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{
        errors::{OptError, OptResult},
        minimizer::{
            traits::Tolerances,
            types::{Cost, Grad},
        },
    };
    use approx::assert_relative_eq;
    use ndarray::array;

    // Shifted bowl c(θ) = Σ (θ_i - target_i)² with an analytic gradient.
    struct Shifted;

    impl Objective for Shifted {
        type Data = Theta;

        fn value(&self, theta: &Theta, target: &Theta) -> OptResult<Cost> {
            Ok((theta - target).mapv(|d| d * d).sum())
        }

        fn check(&self, theta: &Theta, target: &Theta) -> OptResult<()> {
            if theta.len() != target.len() {
                return Err(OptError::ThetaLengthMismatch {
                    expected: target.len(),
                    actual: theta.len(),
                });
            }
            Ok(())
        }

        fn grad(&self, theta: &Theta, target: &Theta) -> OptResult<Grad> {
            Ok(2.0 * (theta - target))
        }
    }

    #[test]
    // Purpose
    // -------
    // L-BFGS locates the minimum of a convex quadratic.
    //
    // Given
    // -----
    // - A bowl centred at (1, -2).
    //
    // Expect
    // ------
    // - θ̂ within 1e-5 of the centre and a near-zero objective value.
    fn minimize_finds_quadratic_minimum() {
        let target = array![1.0, -2.0];
        let tols = Tolerances::new(Some(1e-10), None, Some(100)).expect("valid tolerances");
        let opts = MLEOptions::new(tols, false, None).expect("valid options");

        let outcome =
            minimize(&Shifted, array![0.0, 0.0], &target, &opts).expect("convex problem");

        assert_relative_eq!(outcome.theta_hat[0], 1.0, epsilon = 1e-5);
        assert_relative_eq!(outcome.theta_hat[1], -2.0, epsilon = 1e-5);
        assert!(outcome.value < 1e-8);
    }

    #[test]
    fn minimize_runs_check_before_solving() {
        let target = array![1.0, -2.0];

        let result = minimize(&Shifted, array![0.0], &target, &MLEOptions::default());

        assert_eq!(result, Err(OptError::ThetaLengthMismatch { expected: 2, actual: 1 }));
    }
}
