//! models — the candidate family for next-day visit prediction.
//!
//! Purpose
//! -------
//! Define the three predictors the selector compares, each built by a
//! `define_model` factory that returns a ready-to-train [`Model`]:
//!
//! - [`averaging`]: uniform mean of the feature window, never trained.
//! - [`poisson`]: log-linear Poisson regression fitted with Adam.
//! - [`discounted`]: exponentially discounted mean fitted with L-BFGS.
//!
//! Key behaviors
//! -------------
//! - [`Model::train`] fits in place and reports a [`TrainReport`]; the
//!   objective each predictor minimises is fixed by its variant.
//! - [`define_model`] resolves a registered model name to its factory;
//!   the candidate family is built through it.
//!
//! Conventions
//! -----------
//! - Feature matrices are `n_rows × n_days` with the most recent day in
//!   column 0.
//! - Raw outputs are log-rates when `metadata.is_yhat_logged` is set and
//!   visit counts otherwise.
pub mod averaging;
pub mod discounted;
pub mod errors;
pub mod metadata;
pub mod model;
pub mod poisson;

pub use self::errors::{ModelError, ModelResult};
pub use self::metadata::{HyperParameters, ModelMetadata};
pub use self::model::{Model, Optimiser, Predictor, TrainReport};

/// Build a fresh model by its registered name.
///
/// # Errors
/// - [`ModelError::UnknownModel`] for a name no factory is registered under.
/// - Any validation error from the factory.
pub fn define_model(model_name: &str, hyper_parameters: HyperParameters) -> ModelResult<Model> {
    match model_name {
        averaging::MODEL_NAME => averaging::define_model(hyper_parameters),
        poisson::MODEL_NAME => poisson::define_model(hyper_parameters),
        discounted::MODEL_NAME => discounted::define_model(hyper_parameters),
        other => Err(ModelError::UnknownModel { name: other.to_string() }),
    }
}

pub mod prelude {
    pub use super::errors::{ModelError, ModelResult};
    pub use super::metadata::{HyperParameters, ModelMetadata};
    pub use super::model::{Model, Optimiser, Predictor, TrainReport};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_model_resolves_every_registered_name() {
        let hp = HyperParameters::new(5, Some(1.0)).expect("valid");

        for name in [averaging::MODEL_NAME, poisson::MODEL_NAME, discounted::MODEL_NAME] {
            let model = define_model(name, hp).expect("registered name");

            assert_eq!(model.name(), name);
            assert_eq!(model.predictor.kind_name(), name);
            assert_eq!(model.predictor.n_days(), 5);
        }
    }

    #[test]
    fn define_model_rejects_unknown_names() {
        let hp = HyperParameters::new(5, None).expect("valid");

        let err = define_model("gradient_boosting", hp).unwrap_err();

        assert_eq!(err, ModelError::UnknownModel { name: "gradient_boosting".to_string() });
    }
}
