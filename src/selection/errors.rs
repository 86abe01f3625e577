use crate::data::errors::DataError;
use crate::models::errors::ModelError;
use crate::optimization::errors::OptError;
use std::path::PathBuf;

pub type PersistResult<T> = Result<T, PersistError>;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Failures reading or writing the production model pair.
#[derive(Debug)]
pub enum PersistError {
    /// Filesystem failure on `path`.
    Io { path: PathBuf, source: std::io::Error },

    /// Predictor or metadata could not be serialized.
    Encode { path: PathBuf, text: String },

    /// Predictor or metadata on disk could not be parsed.
    Decode { path: PathBuf, text: String },

    /// Target path has no parent directory to stage a temp file in.
    MissingParent { path: PathBuf },
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl std::fmt::Display for PersistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistError::Io { path, source } => {
                write!(f, "I/O error on {}: {source}", path.display())
            }
            PersistError::Encode { path, text } => {
                write!(f, "Failed to encode {}: {text}", path.display())
            }
            PersistError::Decode { path, text } => {
                write!(f, "Failed to decode {}: {text}", path.display())
            }
            PersistError::MissingParent { path } => {
                write!(f, "Path {} has no parent directory", path.display())
            }
        }
    }
}

/// Anything that aborts a selection run.
#[derive(Debug)]
pub enum PipelineError {
    Data(DataError),
    Optimization(OptError),
    Model(ModelError),
    Persist(PersistError),

    /// A configuration value is out of range or unparsable.
    InvalidOption { name: &'static str, value: String, reason: &'static str },

    /// The home directory needed for the default database path is unknown.
    MissingHomeDir,

    /// No candidate model was built.
    NoCandidates,
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Data(err) => Some(err),
            PipelineError::Optimization(err) => Some(err),
            PipelineError::Model(err) => Some(err),
            PipelineError::Persist(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Data(err) => write!(f, "Data error: {err}"),
            PipelineError::Optimization(err) => write!(f, "Optimization error: {err}"),
            PipelineError::Model(err) => write!(f, "Model error: {err}"),
            PipelineError::Persist(err) => write!(f, "Persistence error: {err}"),
            PipelineError::InvalidOption { name, value, reason } => {
                write!(f, "Invalid option {name} = '{value}': {reason}")
            }
            PipelineError::MissingHomeDir => {
                write!(f, "Could not determine the home directory")
            }
            PipelineError::NoCandidates => {
                write!(f, "No candidate model to select from")
            }
        }
    }
}

impl From<DataError> for PipelineError {
    fn from(err: DataError) -> Self {
        PipelineError::Data(err)
    }
}

impl From<OptError> for PipelineError {
    fn from(err: OptError) -> Self {
        PipelineError::Optimization(err)
    }
}

impl From<ModelError> for PipelineError {
    fn from(err: ModelError) -> Self {
        PipelineError::Model(err)
    }
}

impl From<PersistError> for PipelineError {
    fn from(err: PersistError) -> Self {
        PipelineError::Persist(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn pipeline_error_exposes_wrapped_source() {
        let err = PipelineError::from(DataError::InvalidNDays { n_days: 0 });

        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Data error:"));
    }

    #[test]
    fn persist_error_names_the_path() {
        let err = PersistError::MissingParent { path: PathBuf::from("model.bin") };

        assert!(err.to_string().contains("model.bin"));
    }
}
