//! minimizer — argmin-powered objective minimization plus a full-batch Adam.
//!
//! Purpose
//! -------
//! Provide a single fitting layer for the parametric predictors. Callers
//! implement one trait, [`Objective`], and choose either [`minimize`]
//! (L-BFGS with More–Thuente line search) or [`minimize_adam`]
//! (fixed-epoch Adam). Both return the same [`OptimOutcome`].
//!
//! Key behaviors
//! -------------
//! - Hand objectives and their analytic gradients to Argmin unchanged via
//!   [`adapter::ArgMinAdapter`], which rejects non-finite values.
//! - [`minimize`] validates the initial guess with [`Objective::check`],
//!   selects an L-BFGS solver via [`builders`], runs it via
//!   [`run::run_lbfgs`], and normalizes the result.
//! - [`minimize_adam`] drives the same adapter through bias-corrected Adam
//!   updates for a fixed epoch budget.
//! - Centralize solver configuration ([`Tolerances`], [`MLEOptions`],
//!   [`AdamOptions`]) and validation ([`validation`]) so downstream code
//!   can assume sane, finite inputs.
//!
//! Invariants & assumptions
//! ------------------------
//! - Objectives return the quantity to be minimized; gradients are of that
//!   same quantity.
//! - [`Objective::value`] and [`Objective::grad`] treat invalid inputs as
//!   recoverable [`OptError`](crate::optimization::errors::OptError) values,
//!   not panics.
//! - Configuration types are validated on construction and treated as
//!   internally consistent by the solver layer.
//!
//! Conventions
//! -----------
//! - Parameters live in an unconstrained space as [`Theta`]
//!   (`Array1<f64>`). Any mapping into a constrained space (e.g. a decay
//!   rate in `(0, 1)`) happens in the model layer.
//! - Errors bubble up as `OptResult<T>`; this module never intentionally
//!   panics or uses `unsafe`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover gradient validation in [`adapter`], solver wiring in
//!   [`builders`], option/outcome invariants in [`traits`], and convergence
//!   of both solvers on quadratic bowls in [`api`] and [`adam`].

pub mod adam;
pub mod adapter;
pub mod api;
pub mod builders;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::adam::{AdamOptions, minimize_adam};
pub use self::api::minimize;
pub use self::traits::{MLEOptions, Objective, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Theta};

pub mod prelude {
    pub use super::adam::{AdamOptions, minimize_adam};
    pub use super::api::minimize;
    pub use super::traits::{MLEOptions, Objective, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
