//! numerical_stability — guarded sigmoid-family transforms.
//!
//! Model code maps unconstrained optimizer parameters into bounded spaces
//! (e.g. a discount rate in `(0, 1)`) through these helpers so that extreme
//! iterates never produce `inf`/`NaN` intermediates.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{safe_log_logistic, safe_logistic, safe_softplus};

pub mod prelude {
    pub use super::transformations::{safe_log_logistic, safe_logistic, safe_softplus};
}
