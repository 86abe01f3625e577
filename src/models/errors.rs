use crate::optimization::errors::OptError;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Feature matrix width differs from the model's `n_days`.
    FeatureWidth { expected: usize, found: usize },

    /// A hyper-parameter is out of range.
    InvalidHyperParameter { name: &'static str, value: f64, reason: &'static str },

    /// The attached optimiser cannot fit this predictor.
    IncompatibleOptimiser { model_name: &'static str, optimiser: &'static str },

    /// Metadata names a model this crate does not provide.
    UnknownModel { name: String },

    /// Fitting failed inside the optimisation layer.
    Training(OptError),
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Training(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::FeatureWidth { expected, found } => {
                write!(f, "Feature width mismatch: model expects {expected} days, data has {found}")
            }
            ModelError::InvalidHyperParameter { name, value, reason } => {
                write!(f, "Invalid hyper-parameter {name} = {value}: {reason}")
            }
            ModelError::IncompatibleOptimiser { model_name, optimiser } => {
                write!(f, "Optimiser {optimiser} cannot train model {model_name}")
            }
            ModelError::UnknownModel { name } => {
                write!(f, "Unknown model name '{name}'")
            }
            ModelError::Training(err) => {
                write!(f, "Training failed: {err}")
            }
        }
    }
}

impl From<OptError> for ModelError {
    fn from(err: OptError) -> Self {
        ModelError::Training(err)
    }
}
