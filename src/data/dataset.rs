//! data::dataset — fixed-width feature/label rows and their partitions.
//!
//! Purpose
//! -------
//! Turn per-day visit counts into the design matrix used by every model:
//! one row per bookmark, `n_days` feature columns, one label.
//!
//! Key behaviors
//! -------------
//! - Column `j` (0-based) of a row holds the visits from `j + 2` days before
//!   `today`; the label holds the visits from exactly one day before.
//! - Bookmarks whose feature window sums to zero are dropped.
//! - Row order follows the order of the supplied ids, so the shuffle done
//!   by [`partition`](crate::data::partition) fixes the partition.
//!
//! Invariants & assumptions
//! ------------------------
//! - `x.nrows() == y.len()` for every [`DataSet`] (checked by
//!   [`DataSet::new`]).
//! - All entries are finite and non-negative (they are visit counts).
//! - `today` is injected; nothing in this module reads the wall clock.
use crate::data::{
    errors::{DataError, DataResult},
    history::{DailyCounts, VisitSource},
    partition::{shuffle_bookmark_ids, split_rows},
};
use chrono::{Days, NaiveDate};
use ndarray::{Array1, Array2, s};
use tracing::info;

/// One partition of feature rows and their labels.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
}

impl DataSet {
    /// Pair a feature matrix with its labels.
    ///
    /// # Errors
    /// - [`DataError::RaggedRows`] if the row counts differ.
    pub fn new(x: Array2<f64>, y: Array1<f64>) -> DataResult<Self> {
        if x.nrows() != y.len() {
            return Err(DataError::RaggedRows { x_rows: x.nrows(), y_rows: y.len() });
        }
        Ok(Self { x, y })
    }

    /// A zero-row dataset that still carries its feature width.
    pub fn empty(n_days: usize) -> Self {
        Self { x: Array2::zeros((0, n_days)), y: Array1::zeros(0) }
    }

    /// Build rows for `bookmark_ids` (in the given order) relative to `today`.
    ///
    /// Parameters
    /// ----------
    /// - `bookmark_ids`: row order; ids without any visit in the feature
    ///   window are skipped.
    /// - `counts`: aggregated visits.
    /// - `today`: the run date; the label is `today - 1` and features span
    ///   `today - 2 ..= today - (n_days + 1)`.
    /// - `n_days`: feature width.
    ///
    /// Errors
    /// ------
    /// - [`DataError::InvalidNDays`] if `n_days == 0`.
    pub fn from_counts(
        bookmark_ids: &[String], counts: &DailyCounts, today: NaiveDate, n_days: usize,
    ) -> DataResult<Self> {
        if n_days == 0 {
            return Err(DataError::InvalidNDays { n_days });
        }
        let visits_on = |bookmark_id: &str, days_ago: u64| -> f64 {
            today
                .checked_sub_days(Days::new(days_ago))
                .map(|date| counts.get(bookmark_id, date))
                .unwrap_or(0) as f64
        };

        let mut features = Vec::with_capacity(bookmark_ids.len() * n_days);
        let mut labels = Vec::with_capacity(bookmark_ids.len());
        for bookmark_id in bookmark_ids {
            let row: Vec<f64> =
                (2..n_days as u64 + 2).map(|days_ago| visits_on(bookmark_id, days_ago)).collect();
            if row.iter().sum::<f64>() > 0.0 {
                features.extend(row);
                labels.push(visits_on(bookmark_id, 1));
            }
        }

        let n_rows = labels.len();
        let x = Array2::from_shape_vec((n_rows, n_days), features)
            .map_err(|_| DataError::RaggedRows { x_rows: n_rows, y_rows: labels.len() })?;
        Self::new(x, Array1::from_vec(labels))
    }

    pub fn n_rows(&self) -> usize {
        self.y.len()
    }

    pub fn n_days(&self) -> usize {
        self.x.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Copy rows `..mid` and `mid..` into two new datasets.
    ///
    /// Panics
    /// ------
    /// - If `mid > self.n_rows()`.
    pub fn split_at(&self, mid: usize) -> (DataSet, DataSet) {
        let head = DataSet {
            x: self.x.slice(s![..mid, ..]).to_owned(),
            y: self.y.slice(s![..mid]).to_owned(),
        };
        let tail = DataSet {
            x: self.x.slice(s![mid.., ..]).to_owned(),
            y: self.y.slice(s![mid..]).to_owned(),
        };
        (head, tail)
    }
}

/// Training and validation partitions of one load.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSets {
    pub training: DataSet,
    pub validation: DataSet,
}

impl DataSets {
    /// Load, wrangle, shuffle and split in one go.
    ///
    /// Errors
    /// ------
    /// - Any [`DataError`] from the source.
    /// - [`DataError::InvalidNDays`] if `n_days == 0`.
    /// - [`DataError::InsufficientData`] if no bookmark has a visit inside the
    ///   feature window.
    pub fn load<S: VisitSource + ?Sized>(
        source: &S, n_days: usize, today: NaiveDate, seed: u64,
    ) -> DataResult<Self> {
        let counts = source.daily_counts()?;
        Self::from_counts(&counts, n_days, today, seed)
    }

    /// Wrangle already-aggregated counts (see [`DataSets::load`]).
    pub fn from_counts(
        counts: &DailyCounts, n_days: usize, today: NaiveDate, seed: u64,
    ) -> DataResult<Self> {
        let mut bookmark_ids = counts.sorted_bookmark_ids();
        shuffle_bookmark_ids(&mut bookmark_ids, seed);
        let rows = DataSet::from_counts(&bookmark_ids, counts, today, n_days)?;
        if rows.is_empty() {
            return Err(DataError::InsufficientData { n_bookmarks: bookmark_ids.len(), n_days });
        }
        let sets = split_rows(&rows);
        info!(
            %today,
            n_days,
            training = sets.training.n_rows(),
            validation = sets.validation.n_rows(),
            "built datasets"
        );
        Ok(sets)
    }

    pub fn n_rows(&self) -> usize {
        self.training.n_rows() + self.validation.n_rows()
    }
}
