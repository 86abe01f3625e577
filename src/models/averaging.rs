//! Parameter-free baseline: the plain mean of the feature window.
use crate::models::{
    errors::ModelResult,
    metadata::{HyperParameters, ModelMetadata},
    model::{Model, Predictor, check_n_days, check_width},
};
use ndarray::{Array1, ArrayView2};
use serde::{Deserialize, Serialize};

pub const MODEL_NAME: &str = "averaging";

/// Predicts the mean visit count over the last `n_days` feature columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Averaging {
    n_days: usize,
}

impl Averaging {
    pub fn new(n_days: usize) -> ModelResult<Self> {
        check_n_days(n_days)?;
        Ok(Self { n_days })
    }

    pub fn n_days(&self) -> usize {
        self.n_days
    }

    /// Uniform weights `1 / n_days`.
    pub fn weights(&self) -> Array1<f64> {
        Array1::from_elem(self.n_days, 1.0 / self.n_days as f64)
    }

    pub fn predict(&self, x: ArrayView2<'_, f64>) -> ModelResult<Array1<f64>> {
        check_width(&x, self.n_days)?;
        Ok(x.dot(&self.weights()))
    }
}

/// Build the untrainable averaging model.
pub fn define_model(hyper_parameters: HyperParameters) -> ModelResult<Model> {
    hyper_parameters.validate()?;
    let predictor = Predictor::Averaging(Averaging::new(hyper_parameters.n_days)?);
    let metadata = ModelMetadata::new(MODEL_NAME, hyper_parameters, false);
    Ok(Model::new(predictor, None, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ModelError;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn predict_is_row_mean() {
        let model = Averaging::new(4).expect("valid width");
        let x = array![[1.0, 2.0, 3.0, 6.0], [0.0, 0.0, 0.0, 4.0]];

        let yhat = model.predict(x.view()).expect("matching width");

        assert_relative_eq!(yhat[0], 3.0);
        assert_relative_eq!(yhat[1], 1.0);
    }

    #[test]
    fn predict_rejects_wrong_width() {
        let model = Averaging::new(3).expect("valid width");

        let err = model.predict(array![[1.0, 2.0]].view()).unwrap_err();

        assert_eq!(err, ModelError::FeatureWidth { expected: 3, found: 2 });
    }

    #[test]
    // Purpose
    // -------
    // The baseline has no optimiser, so training is a no-op.
    fn define_model_is_untrainable_and_unlogged() {
        let hp = HyperParameters::new(10, None).expect("valid");

        let model = define_model(hp).expect("valid model");

        assert!(model.optimiser.is_none());
        assert!(!model.metadata.is_yhat_logged);
        assert_eq!(model.metadata.model_name, MODEL_NAME);
    }
}
