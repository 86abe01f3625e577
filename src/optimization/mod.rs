//! optimization — fitting engine, numerical helpers, and unified error surface.
//!
//! Purpose
//! -------
//! Provide a cohesive optimization layer for fitting the parametric visit
//! predictors: an Argmin-backed L-BFGS minimizer, a full-batch Adam loop,
//! numerically stable parameter transforms, and a single error/result
//! surface. Callers implement an objective, choose options, and obtain fitted
//! parameters and diagnostics without touching backend solver details.
//!
//! Key behaviors
//! -------------
//! - Expose **minimization** of user objectives `c(θ)` (`minimizer`), with
//!   either L-BFGS ([`minimizer::minimize`]) or Adam
//!   ([`minimizer::minimize_adam`]).
//! - Supply guarded transforms (`numerical_stability`) for mapping
//!   unconstrained parameters into bounded model spaces.
//! - Normalize configuration issues, numerical failures, and backend solver
//!   errors into a single enum (`errors::OptError`) with a common result
//!   alias (`OptResult<T>`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Solvers operate in an unconstrained parameter space `θ` and assume
//!   inputs are finite once validation has passed; invalid states are
//!   reported as `OptError`, not panics.
//! - Objectives treat domain violations (wrong parameter length, ragged
//!   data) as recoverable errors surfaced through this layer.
//!
//! Conventions
//! -----------
//! - Parameters and gradients are `ndarray` vectors (`Theta`, `Grad`).
//! - Public entrypoints that can fail return `OptResult<T>`; callers never
//!   see raw Argmin errors.
//! - Progress is reported through `tracing` at `debug` level only; the
//!   optional `obs_slog` feature adds Argmin's own terminal observer.
//!
//! Downstream usage
//! ----------------
//! - The Poisson regression and discounted-average models implement
//!   `Objective` for themselves with `Data = DataSet`, then call the solver
//!   their `Optimiser` names.
//! - Front-ends typically import the curated surface via
//!   `optimization::prelude::*`.

pub mod errors;
pub mod minimizer;
pub mod numerical_stability;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use visit_forecast::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::minimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
