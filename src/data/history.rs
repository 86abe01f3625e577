//! data::history — per-bookmark, per-day visit counts from the visit store.
//!
//! Purpose
//! -------
//! Read raw visit events for one user and aggregate them into a
//! `(bookmark_id, calendar date) → count` table ([`DailyCounts`]). The
//! store is reached through the [`VisitSource`] seam so the pipeline can be
//! driven from SQLite in production and from in-memory tables in tests.
//!
//! Key behaviors
//! -------------
//! - [`SqliteVisitStore`] opens the database **read-only**, runs a single
//!   aggregate query scoped to the configured username, and closes the
//!   connection before returning.
//! - Visit timestamps are truncated to their first ten characters and
//!   parsed as `%Y-%m-%d`; anything else aborts the load with
//!   [`DataError::MalformedDate`].
//! - Combinations that never appear in the store read back as zero.
//!
//! Invariants & assumptions
//! ------------------------
//! - Table `bookmarkVisitLog(bookmarkId TEXT, visitedAt TEXT, username TEXT)`
//!   with ISO-8601 `visitedAt` values.
//! - Bookmark ids iterate in ascending order, so callers get a
//!   deterministic starting order before any shuffle.
use crate::data::errors::{DataError, DataResult};
use chrono::NaiveDate;
use rusqlite::{Connection, OpenFlags, params};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Aggregate query: visits per bookmark per calendar day for one user.
const DAILY_COUNTS_SQL: &str = "\
    WITH date_log AS ( \
        SELECT bookmarkId, SUBSTR(visitedAt, 1, 10) AS date \
        FROM bookmarkVisitLog WHERE username = ?1 \
    ) \
    SELECT bookmarkId, date, COUNT(*) AS n \
    FROM date_log GROUP BY bookmarkId, date";

/// Date layout of the `visitedAt` prefix.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Anything that can produce per-day visit counts for the current user.
pub trait VisitSource {
    fn daily_counts(&self) -> DataResult<DailyCounts>;
}

/// Visit counts keyed by bookmark id, then calendar date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyCounts {
    counts: BTreeMap<String, BTreeMap<NaiveDate, u64>>,
}

impl DailyCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build counts from individual visit events, one visit per item.
    pub fn from_events<I, S>(events: I) -> Self
    where
        I: IntoIterator<Item = (S, NaiveDate)>,
        S: Into<String>,
    {
        let mut counts = Self::new();
        for (bookmark_id, date) in events {
            counts.add(bookmark_id, date, 1);
        }
        counts
    }

    /// Add `n` visits for `bookmark_id` on `date`.
    pub fn add(&mut self, bookmark_id: impl Into<String>, date: NaiveDate, n: u64) {
        *self.counts.entry(bookmark_id.into()).or_default().entry(date).or_insert(0) += n;
    }

    /// Visits for `bookmark_id` on `date`; zero when never recorded.
    pub fn get(&self, bookmark_id: &str, date: NaiveDate) -> u64 {
        self.counts.get(bookmark_id).and_then(|days| days.get(&date)).copied().unwrap_or(0)
    }

    /// Distinct bookmark ids in ascending order.
    pub fn sorted_bookmark_ids(&self) -> Vec<String> {
        self.counts.keys().cloned().collect()
    }

    pub fn n_bookmarks(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total_visits(&self) -> u64 {
        self.counts.values().flat_map(|days| days.values()).sum()
    }
}

impl VisitSource for DailyCounts {
    fn daily_counts(&self) -> DataResult<DailyCounts> {
        Ok(self.clone())
    }
}

/// Read-only view of the bookmark manager's SQLite database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteVisitStore {
    path: PathBuf,
    username: String,
}

impl SqliteVisitStore {
    pub fn new(path: impl Into<PathBuf>, username: impl Into<String>) -> Self {
        Self { path: path.into(), username: username.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl VisitSource for SqliteVisitStore {
    /// Run the aggregate query against a fresh read-only connection.
    ///
    /// # Errors
    /// - [`DataError::Database`] if the file is missing/unreadable or the
    ///   query fails.
    /// - [`DataError::MalformedDate`] for a `visitedAt` prefix that is not a
    ///   calendar date.
    /// - [`DataError::NegativeCount`] if the store reports a negative count.
    fn daily_counts(&self) -> DataResult<DailyCounts> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let counts = query_daily_counts(&conn, &self.username)?;
        conn.close().map_err(|(_, err)| DataError::from(err))?;
        info!(
            path = %self.path.display(),
            bookmarks = counts.n_bookmarks(),
            visits = counts.total_visits(),
            "loaded visit history"
        );
        Ok(counts)
    }
}

// ---- Helper Methods ----

fn query_daily_counts(conn: &Connection, username: &str) -> DataResult<DailyCounts> {
    let mut stmt = conn.prepare(DAILY_COUNTS_SQL)?;
    let rows = stmt.query_map(params![username], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, i64>(2)?))
    })?;

    let mut counts = DailyCounts::new();
    for row in rows {
        let (bookmark_id, date, n) = row?;
        let date = parse_visit_date(&date)?;
        let n = u64::try_from(n)
            .map_err(|_| DataError::NegativeCount { bookmark_id: bookmark_id.clone(), value: n })?;
        counts.add(bookmark_id, date, n);
    }
    debug!(username, bookmarks = counts.n_bookmarks(), "aggregated daily counts");
    Ok(counts)
}

/// Parse the `YYYY-MM-DD` prefix produced by the aggregate query.
pub fn parse_visit_date(value: &str) -> DataResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| DataError::MalformedDate { value: value.to_string() })
}
