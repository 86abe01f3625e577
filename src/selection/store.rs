//! selection::store — the on-disk production model pair.
//!
//! Purpose
//! -------
//! Own the two files that make up the production model: the MessagePack
//! encoded [`Predictor`] and its JSON [`ModelMetadata`].
//!
//! Key behaviors
//! -------------
//! - [`ProductionStore::load`] returns `None` unless **both** files exist.
//! - [`ProductionStore::save`] encodes both payloads and writes each to a
//!   temp file in the target directory before renaming either, so a failed
//!   encode or write leaves the previous pair untouched. If the metadata
//!   rename fails after the model rename, the previous `model.bin` is put
//!   back (or the new one removed when there was none).
//!
//! Invariants & assumptions
//! ------------------------
//! - The loaded predictor's variant matches `metadata.model_name` and its
//!   width matches `metadata.hyper_parameters.n_days`; anything else is a
//!   decode error.
//! - The pair is owned by a single job; no locking is attempted.
use crate::models::{metadata::ModelMetadata, model::Predictor};
use crate::selection::errors::{PersistError, PersistResult};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

pub const MODEL_FILE: &str = "model.bin";
pub const METADATA_FILE: &str = "model_metadata.json";

/// A persisted predictor together with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionModel {
    pub predictor: Predictor,
    pub metadata: ModelMetadata,
}

/// Paths of the production model pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionStore {
    model_path: PathBuf,
    metadata_path: PathBuf,
}

impl ProductionStore {
    pub fn new(model_path: impl Into<PathBuf>, metadata_path: impl Into<PathBuf>) -> Self {
        Self { model_path: model_path.into(), metadata_path: metadata_path.into() }
    }

    /// `<dir>/model.bin` and `<dir>/model_metadata.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(MODEL_FILE), dir.join(METADATA_FILE))
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    /// True when both files are present.
    pub fn exists(&self) -> bool {
        self.model_path.is_file() && self.metadata_path.is_file()
    }

    /// Read the production pair, or `None` when it is incomplete.
    ///
    /// # Errors
    /// - [`PersistError::Io`] if a present file cannot be read.
    /// - [`PersistError::Decode`] for unparsable or inconsistent contents.
    pub fn load(&self) -> PersistResult<Option<ProductionModel>> {
        if !self.exists() {
            debug!(path = %self.model_path.display(), "no production model");
            return Ok(None);
        }

        let metadata_bytes = read(&self.metadata_path)?;
        let metadata: ModelMetadata = serde_json::from_slice(&metadata_bytes)
            .map_err(|err| decode_error(&self.metadata_path, err))?;
        metadata
            .hyper_parameters
            .validate()
            .map_err(|err| decode_error(&self.metadata_path, err))?;

        let model_bytes = read(&self.model_path)?;
        let predictor: Predictor = rmp_serde::from_slice(&model_bytes)
            .map_err(|err| decode_error(&self.model_path, err))?;

        if predictor.kind_name() != metadata.model_name {
            return Err(PersistError::Decode {
                path: self.model_path.clone(),
                text: format!(
                    "stored predictor is {} but metadata names {}",
                    predictor.kind_name(),
                    metadata.model_name
                ),
            });
        }
        if predictor.n_days() != metadata.hyper_parameters.n_days {
            return Err(PersistError::Decode {
                path: self.model_path.clone(),
                text: format!(
                    "stored predictor uses {} days but metadata says {}",
                    predictor.n_days(),
                    metadata.hyper_parameters.n_days
                ),
            });
        }

        info!(model = %metadata.model_name, "loaded production model");
        Ok(Some(ProductionModel { predictor, metadata }))
    }

    /// Replace the production pair.
    ///
    /// # Errors
    /// - [`PersistError::Encode`] if either payload cannot be serialized.
    /// - [`PersistError::MissingParent`] if a path has no parent directory.
    /// - [`PersistError::Io`] for directory creation, write or rename
    ///   failures.
    pub fn save(&self, predictor: &Predictor, metadata: &ModelMetadata) -> PersistResult<()> {
        let model_bytes = rmp_serde::to_vec_named(predictor).map_err(|err| PersistError::Encode {
            path: self.model_path.clone(),
            text: err.to_string(),
        })?;
        let metadata_bytes =
            serde_json::to_vec_pretty(metadata).map_err(|err| PersistError::Encode {
                path: self.metadata_path.clone(),
                text: err.to_string(),
            })?;

        let staged_model = stage(&self.model_path, &model_bytes)?;
        let staged_metadata = stage(&self.metadata_path, &metadata_bytes)?;
        let previous_model = read_if_exists(&self.model_path)?;
        commit(staged_model, &self.model_path)?;
        if let Err(err) = commit(staged_metadata, &self.metadata_path) {
            self.restore_model(previous_model.as_deref());
            return Err(err);
        }

        info!(
            model = %metadata.model_name,
            path = %self.model_path.display(),
            "stored production model"
        );
        Ok(())
    }
}

impl ProductionStore {
    // Undo a committed model rename; failures are logged, the original
    // error is what the caller sees.
    fn restore_model(&self, previous: Option<&[u8]>) {
        let restored = match previous {
            Some(bytes) => stage(&self.model_path, bytes)
                .and_then(|staged| commit(staged, &self.model_path)),
            None => fs::remove_file(&self.model_path)
                .map_err(|source| PersistError::Io { path: self.model_path.clone(), source }),
        };
        if let Err(err) = restored {
            warn!(path = %self.model_path.display(), error = %err, "could not restore model file");
        }
    }
}

// ---- Helper Methods ----

fn read_if_exists(path: &Path) -> PersistResult<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(PersistError::Io { path: path.to_path_buf(), source }),
    }
}

fn read(path: &Path) -> PersistResult<Vec<u8>> {
    fs::read(path).map_err(|source| PersistError::Io { path: path.to_path_buf(), source })
}

fn decode_error(path: &Path, err: impl std::fmt::Display) -> PersistError {
    PersistError::Decode { path: path.to_path_buf(), text: err.to_string() }
}

// Fully write `bytes` to a temp file next to `target`.
fn stage(target: &Path, bytes: &[u8]) -> PersistResult<NamedTempFile> {
    let parent = target
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .ok_or_else(|| PersistError::MissingParent { path: target.to_path_buf() })?;
    let io_error = |source| PersistError::Io { path: target.to_path_buf(), source };

    fs::create_dir_all(parent).map_err(io_error)?;
    let mut file = NamedTempFile::new_in(parent).map_err(io_error)?;
    file.write_all(bytes).map_err(io_error)?;
    file.as_file().sync_all().map_err(io_error)?;
    Ok(file)
}

fn commit(staged: NamedTempFile, target: &Path) -> PersistResult<()> {
    staged
        .persist(target)
        .map(|_| ())
        .map_err(|err| PersistError::Io { path: target.to_path_buf(), source: err.error })
}
