//! Run configuration for the selection pipeline.
//!
//! Defaults reproduce the production job: a 10-day window, `l2_coef = 1.0`,
//! 10 000 Adam epochs for the Poisson regression, 1 000 L-BFGS iterations
//! for the discounted average and shuffle seed 1234. Paths and the user can
//! be overridden from the environment:
//!
//! | variable                   | field           |
//! |----------------------------|-----------------|
//! | `VISIT_FORECAST_DB`        | `db_path`       |
//! | `VISIT_FORECAST_RESOURCES` | `resources_dir` |
//! | `VISIT_FORECAST_USER`      | `username`      |
//! | `VISIT_FORECAST_N_DAYS`    | `n_days`        |
//! | `VISIT_FORECAST_SEED`      | `seed`          |
use crate::data::DEFAULT_SEED;
use crate::selection::errors::{PipelineError, PipelineResult};
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use std::str::FromStr;

/// Database location relative to the home directory.
const DB_RELATIVE_PATH: &str = ".local/share/bookmark-manager/data.sqlite3";

/// Directory holding `model.bin` and `model_metadata.json`.
const DEFAULT_RESOURCES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/resources");

pub const ENV_DB: &str = "VISIT_FORECAST_DB";
pub const ENV_RESOURCES: &str = "VISIT_FORECAST_RESOURCES";
pub const ENV_USER: &str = "VISIT_FORECAST_USER";
pub const ENV_N_DAYS: &str = "VISIT_FORECAST_N_DAYS";
pub const ENV_SEED: &str = "VISIT_FORECAST_SEED";

/// Everything one selection run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub n_days: usize,
    pub l2_coef: f64,
    pub poisson_epochs: usize,
    pub discounted_epochs: usize,
    pub seed: u64,
    pub db_path: PathBuf,
    pub username: String,
    pub resources_dir: PathBuf,
    /// Run date; `None` means the local calendar date.
    pub today: Option<NaiveDate>,
}

impl PipelineOptions {
    /// Defaults with explicit store location, user and resources directory.
    ///
    /// # Errors
    /// - [`PipelineError::InvalidOption`] if `username` is empty.
    pub fn new(
        db_path: impl Into<PathBuf>, username: impl Into<String>, resources_dir: impl Into<PathBuf>,
    ) -> PipelineResult<Self> {
        let options = Self {
            db_path: db_path.into(),
            username: username.into(),
            resources_dir: resources_dir.into(),
            ..Self::default()
        };
        options.validate()?;
        Ok(options)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> PipelineResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `lookup`, which maps a variable name to its
    /// value.
    ///
    /// The user falls back to `USER`, then `USERNAME`. The database falls
    /// back to `~/.local/share/bookmark-manager/data.sqlite3`.
    ///
    /// # Errors
    /// - [`PipelineError::MissingHomeDir`] if no database path is given and
    ///   the home directory is unknown.
    /// - [`PipelineError::InvalidOption`] for unparsable numbers, an empty
    ///   user or out-of-range values.
    pub fn from_lookup<L>(lookup: L) -> PipelineResult<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();

        options.db_path = match lookup(ENV_DB) {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };
        if let Some(dir) = lookup(ENV_RESOURCES) {
            options.resources_dir = PathBuf::from(dir);
        }
        options.username = lookup(ENV_USER)
            .or_else(|| lookup("USER"))
            .or_else(|| lookup("USERNAME"))
            .unwrap_or_default();
        if let Some(raw) = lookup(ENV_N_DAYS) {
            options.n_days = parse_option("n_days", &raw)?;
        }
        if let Some(raw) = lookup(ENV_SEED) {
            options.seed = parse_option("seed", &raw)?;
        }

        options.validate()?;
        Ok(options)
    }

    /// Check every field.
    ///
    /// # Errors
    /// - [`PipelineError::InvalidOption`] naming the first offending field.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.n_days == 0 {
            return Err(invalid("n_days", self.n_days, "The window must cover at least one day."));
        }
        if !self.l2_coef.is_finite() || self.l2_coef < 0.0 {
            return Err(invalid("l2_coef", self.l2_coef, "Must be finite and non-negative."));
        }
        if self.poisson_epochs == 0 {
            return Err(invalid("poisson_epochs", self.poisson_epochs, "Must be positive."));
        }
        if self.discounted_epochs == 0 {
            return Err(invalid("discounted_epochs", self.discounted_epochs, "Must be positive."));
        }
        if self.username.trim().is_empty() {
            return Err(invalid("username", &self.username, "A user name is required."));
        }
        Ok(())
    }

    /// The injected run date, or today's local date.
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

impl Default for PipelineOptions {
    /// Production constants; `db_path` is relative and `username` empty
    /// until filled in by [`PipelineOptions::new`] or
    /// [`PipelineOptions::from_env`].
    fn default() -> Self {
        Self {
            n_days: 10,
            l2_coef: 1.0,
            poisson_epochs: 10_000,
            discounted_epochs: 1_000,
            seed: DEFAULT_SEED,
            db_path: PathBuf::from(DB_RELATIVE_PATH),
            username: String::new(),
            resources_dir: PathBuf::from(DEFAULT_RESOURCES_DIR),
            today: None,
        }
    }
}

/// `~/.local/share/bookmark-manager/data.sqlite3`.
pub fn default_db_path() -> PipelineResult<PathBuf> {
    dirs::home_dir().map(|home| home.join(DB_RELATIVE_PATH)).ok_or(PipelineError::MissingHomeDir)
}

// ---- Helper Methods ----

fn parse_option<T: FromStr>(name: &'static str, raw: &str) -> PipelineResult<T> {
    raw.trim().parse().map_err(|_| PipelineError::InvalidOption {
        name,
        value: raw.to_string(),
        reason: "Expected a non-negative integer.",
    })
}

fn invalid(name: &'static str, value: impl ToString, reason: &'static str) -> PipelineError {
    PipelineError::InvalidOption { name, value: value.to_string(), reason }
}
