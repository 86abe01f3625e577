//! Hyper-parameters and the metadata persisted next to a trained predictor.
//!
//! The JSON layout is fixed:
//!
//! ```json
//! {"model_name": "poisson_regression",
//!  "hyper_parameters": {"n_days": 10, "l2_coef": 1.0},
//!  "is_yhat_logged": true}
//! ```
use crate::models::errors::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// Shared model hyper-parameters.
///
/// - `n_days`: feature window width, at least 1.
/// - `l2_coef`: ridge strength on the regression weights; ignored by the
///   averaging models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HyperParameters {
    pub n_days: usize,
    pub l2_coef: Option<f64>,
}

impl HyperParameters {
    /// Validated constructor.
    ///
    /// # Errors
    /// - [`ModelError::InvalidHyperParameter`] if `n_days == 0` or `l2_coef`
    ///   is negative or non-finite.
    pub fn new(n_days: usize, l2_coef: Option<f64>) -> ModelResult<Self> {
        let hp = Self { n_days, l2_coef };
        hp.validate()?;
        Ok(hp)
    }

    /// Copy with a different `l2_coef`.
    pub fn with_l2_coef(self, l2_coef: f64) -> ModelResult<Self> {
        Self::new(self.n_days, Some(l2_coef))
    }

    /// Re-check the invariants, e.g. after deserializing.
    pub fn validate(&self) -> ModelResult<()> {
        if self.n_days == 0 {
            return Err(ModelError::InvalidHyperParameter {
                name: "n_days",
                value: 0.0,
                reason: "The feature window must cover at least one day.",
            });
        }
        if let Some(l2) = self.l2_coef {
            if !l2.is_finite() || l2 < 0.0 {
                return Err(ModelError::InvalidHyperParameter {
                    name: "l2_coef",
                    value: l2,
                    reason: "The L2 coefficient must be finite and non-negative.",
                });
            }
        }
        Ok(())
    }

    /// `l2_coef` with `None` read as no penalty.
    pub fn l2_or_zero(&self) -> f64 {
        self.l2_coef.unwrap_or(0.0)
    }
}

/// Identity and output convention of a predictor.
///
/// `is_yhat_logged` marks predictors whose raw output is a log-rate and
/// must be exponentiated before it is compared with visit counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_name: String,
    pub hyper_parameters: HyperParameters,
    pub is_yhat_logged: bool,
}

impl ModelMetadata {
    pub fn new(
        model_name: impl Into<String>, hyper_parameters: HyperParameters, is_yhat_logged: bool,
    ) -> Self {
        Self { model_name: model_name.into(), hyper_parameters, is_yhat_logged }
    }
}
