//! Errors raised while loading and wrangling the visit history.
//!
//! Store failures keep only the rendered `rusqlite` message so the enum
//! stays `Clone` and `PartialEq` for tests.
pub type DataResult<T> = Result<T, DataError>;

#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    // ---- Store ----
    /// The visit store could not be opened or queried.
    Database { text: String },

    /// A stored visit date did not start with `YYYY-MM-DD`.
    MalformedDate { value: String },

    /// A per-day count came back negative.
    NegativeCount { bookmark_id: String, value: i64 },

    // ---- Wrangling ----
    /// The feature window must cover at least one day.
    InvalidNDays { n_days: usize },

    /// No bookmark had a visit inside the feature window.
    InsufficientData { n_bookmarks: usize, n_days: usize },

    /// Features and labels disagree on the number of rows.
    RaggedRows { x_rows: usize, y_rows: usize },
}

impl std::error::Error for DataError {}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::Database { text } => {
                write!(f, "Visit store error: {text}")
            }
            DataError::MalformedDate { value } => {
                write!(f, "Malformed visit date '{value}', expected YYYY-MM-DD")
            }
            DataError::NegativeCount { bookmark_id, value } => {
                write!(f, "Negative visit count {value} for bookmark '{bookmark_id}'")
            }
            DataError::InvalidNDays { n_days } => {
                write!(f, "Invalid feature window of {n_days} days, must be at least 1")
            }
            DataError::InsufficientData { n_bookmarks, n_days } => {
                write!(
                    f,
                    "No usable rows: none of {n_bookmarks} bookmarks was visited in the \
                     {n_days} days before yesterday"
                )
            }
            DataError::RaggedRows { x_rows, y_rows } => {
                write!(f, "Feature rows ({x_rows}) and label rows ({y_rows}) differ")
            }
        }
    }
}

impl From<rusqlite::Error> for DataError {
    fn from(err: rusqlite::Error) -> Self {
        DataError::Database { text: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_errors_keep_their_message() {
        let err = DataError::from(rusqlite::Error::QueryReturnedNoRows);

        let DataError::Database { text } = &err else {
            panic!("expected a database error, got {err:?}");
        };
        assert_eq!(text, &rusqlite::Error::QueryReturnedNoRows.to_string());
        assert!(err.to_string().starts_with("Visit store error: "));
    }
}
