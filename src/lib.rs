//! visit_forecast — offline model selection for next-day bookmark visits.
//!
//! Purpose
//! -------
//! Predict how often each bookmark will be visited tomorrow from its recent
//! daily visit counts. A batch run loads the visit history, fits a small
//! family of candidate models, scores them on a held-out partition and
//! promotes the best one to a fixed on-disk location when it beats the
//! current production model.
//!
//! Key behaviors
//! -------------
//! - [`data`]: read-only SQLite loader, per-day aggregation, feature/label
//!   wrangling and the seeded 75/25 split.
//! - [`models`]: averaging, Poisson regression and temporally discounted
//!   averaging behind one [`Model`](models::Model) type.
//! - [`loss`]: MSE and full Poisson NLL per partition.
//! - [`optimization`]: the [`Objective`](optimization::minimizer::Objective)
//!   seam with L-BFGS (argmin) and full-batch Adam solvers.
//! - [`selection`]: the end-to-end run, the promotion rule and the
//!   production store.
//!
//! Invariants & assumptions
//! ------------------------
//! - Everything is deterministic for a fixed visit history, run date and
//!   seed: the same inputs always select and score the same model.
//! - Errors are layered (`DataError`, `OptError`, `ModelError`,
//!   `PersistError`, `PipelineError`) and propagate with `?`; library code
//!   does not panic on bad input.
//!
//! Conventions
//! -----------
//! - Feature column 0 is the most recent day (two days before the run
//!   date); the label is the day before the run date.
//! - Logging goes through `tracing`; the library never installs a
//!   subscriber or prints.
//!
//! Downstream usage
//! ----------------
//! - The `visit_forecast` binary builds [`PipelineOptions`](selection::PipelineOptions)
//!   from the environment and calls [`run_pipeline`](selection::run_pipeline).
//! - Library users can drive the same run with any
//!   [`VisitSource`](data::VisitSource), e.g. in-memory counts.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; `tests/` holds an end-to-end run
//!   over a temporary SQLite database and resources directory.

pub mod data;
pub mod loss;
pub mod models;
pub mod optimization;
pub mod selection;

// ---- Optional convenience prelude -----------------------------------------
//
//     use visit_forecast::prelude::*;

pub mod prelude {
    pub use crate::data::{DailyCounts, DataSet, DataSets, SqliteVisitStore, VisitSource};
    pub use crate::loss::{Loss, Losses};
    pub use crate::models::prelude::*;
    pub use crate::selection::prelude::*;
}
