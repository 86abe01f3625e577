//! minimizer::builders — L-BFGS solver construction helpers.
//!
//! Purpose
//! -------
//! Provide a small, focused builder for the L-BFGS solver used by
//! [`minimize`](super::minimize). They hide Argmin’s generic wiring and
//! apply crate-level options (tolerances, memory size) so higher-level code
//! can request a configured solver without touching Argmin types.
//!
//! Conventions
//! -----------
//! - The builders do **not** set an initial parameter vector or
//!   `max_iters`; those are runtime concerns applied by
//!   [`run_lbfgs`](super::run::run_lbfgs).
//! - Any tolerance Argmin rejects is surfaced as an [`OptError`] through
//!   the crate’s `From<argmin::core::Error>` conversion.
//!
//! [`OptError`]: crate::optimization::errors::OptError
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    minimizer::{
        traits::MLEOptions,
        types::{Cost, DEFAULT_LBFGS_MEM, Grad, LbfgsMoreThuente, MoreThuenteLS, Theta},
    },
};

/// Construct L-BFGS with More–Thuente line search.
///
/// Consults `opts.lbfgs_mem` (falling back to [`DEFAULT_LBFGS_MEM`]) and
/// the optional gradient/cost tolerances.
///
/// # Errors
/// - `OptError` when Argmin rejects a tolerance setting.
pub fn build_optimizer_more_thuente(opts: &MLEOptions) -> OptResult<LbfgsMoreThuente> {
    let more_thuente = MoreThuenteLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsMoreThuente::new(more_thuente, mem);
    configure_lbfgs(lbfgs, opts)
}

/// Apply the optional tolerances in `opts` to an L-BFGS solver.
///
/// When a tolerance is `None` the corresponding `with_tolerance_*` call is
/// skipped and Argmin’s default stays in effect.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}
