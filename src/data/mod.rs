//! data — visit history loading, row wrangling, and partitioning.
//!
//! Purpose
//! -------
//! Produce the training/validation [`DataSets`] every model is fitted and
//! scored on, starting from the bookmark manager's visit log.
//!
//! Key behaviors
//! -------------
//! - [`history`]: the [`VisitSource`] seam, the read-only
//!   [`SqliteVisitStore`], and the aggregated [`DailyCounts`] table.
//! - [`dataset`]: fixed-width feature rows (`n_days` columns starting two
//!   days back) with yesterday's count as the label.
//! - [`partition`]: seeded shuffle of sorted bookmark ids and the
//!   `⌊¾·total⌋` training cut.
//! - [`errors`]: [`DataError`] / [`DataResult`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Loads are all-or-nothing: any store or parse failure aborts with a
//!   [`DataError`] and no partial dataset.
//! - Given the same counts, `today`, `n_days` and seed, the resulting
//!   partitions are identical.

pub mod dataset;
pub mod errors;
pub mod history;
pub mod partition;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::dataset::{DataSet, DataSets};
pub use self::errors::{DataError, DataResult};
pub use self::history::{DailyCounts, SqliteVisitStore, VisitSource};
pub use self::partition::DEFAULT_SEED;
