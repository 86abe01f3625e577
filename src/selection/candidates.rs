//! selection::candidates — build, train, score and rank the model family.
//!
//! Purpose
//! -------
//! Turn the shared hyper-parameters into one fitted and scored
//! [`Candidate`] per registered model, then pick the one with the lowest
//! validation MSE.
//!
//! Key behaviors
//! -------------
//! - Candidates are built in a fixed order: averaging, Poisson regression
//!   (with the run's `l2_coef`), discounted averaging. Only the Poisson
//!   regression carries an `l2_coef` in its metadata.
//! - A solver failure during training is logged as a numeric-instability
//!   warning; the candidate keeps its initial parameters, is still scored
//!   and reported, but is marked [`Training::Failed`]. Structural errors
//!   (wrong width, mismatched optimiser) abort.
//! - [`select_best`] skips failed candidates and is a stable ascending sort
//!   on validation MSE over the rest, with a missing or NaN value ranked as
//!   `+∞`, so ties keep build order and a finite score always beats a
//!   missing one.
use crate::data::dataset::{DataSet, DataSets};
use crate::loss::Losses;
use crate::models::{
    self, averaging, discounted,
    errors::{ModelError, ModelResult},
    metadata::HyperParameters,
    model::{Model, Predictor, TrainReport},
    poisson,
};
use crate::selection::options::PipelineOptions;
use tracing::{info, warn};

/// Registered models in build order.
pub const CANDIDATE_NAMES: [&str; 3] =
    [averaging::MODEL_NAME, poisson::MODEL_NAME, discounted::MODEL_NAME];

/// How training one candidate ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Training {
    /// Trained, or nothing to train (`None`).
    Finished(Option<TrainReport>),
    /// The solver failed; the model still holds its initial parameters.
    Failed,
}

/// A trained model with its losses.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub model: Model,
    pub losses: Losses,
    pub training: Training,
}

impl Candidate {
    pub fn name(&self) -> &str {
        self.model.name()
    }

    pub fn train_report(&self) -> Option<&TrainReport> {
        match &self.training {
            Training::Finished(report) => report.as_ref(),
            Training::Failed => None,
        }
    }

    /// Whether the candidate may be selected.
    pub fn is_eligible(&self) -> bool {
        self.training != Training::Failed
    }
}

/// Fresh, untrained candidates sharing `n_days`.
///
/// # Errors
/// - [`ModelError::InvalidHyperParameter`] for `n_days == 0` or a bad
///   `l2_coef`.
pub fn build_candidates(n_days: usize, l2_coef: f64) -> ModelResult<Vec<Model>> {
    let shared = HyperParameters::new(n_days, None)?;
    CANDIDATE_NAMES
        .iter()
        .map(|&name| {
            let hyper_parameters =
                if name == poisson::MODEL_NAME { shared.with_l2_coef(l2_coef)? } else { shared };
            models::define_model(name, hyper_parameters)
        })
        .collect()
}

/// Epoch budget for `model` under `options`; zero for untrainable models.
pub fn epochs_for(model: &Model, options: &PipelineOptions) -> usize {
    match model.predictor {
        Predictor::Averaging(_) => 0,
        Predictor::PoissonRegression(_) => options.poisson_epochs,
        Predictor::DiscountedAveraging(_) => options.discounted_epochs,
    }
}

/// Train every model in place on `training`.
///
/// Returns one [`Training`] per model, in order.
///
/// # Errors
/// - Any [`ModelError`] other than [`ModelError::Training`].
pub fn train_candidates(
    models: &mut [Model], training: &DataSet, options: &PipelineOptions,
) -> ModelResult<Vec<Training>> {
    let mut outcomes = Vec::with_capacity(models.len());
    for model in models.iter_mut() {
        let n_epochs = epochs_for(model, options);
        match model.train(training, n_epochs) {
            Ok(report) => outcomes.push(Training::Finished(report)),
            Err(ModelError::Training(err)) => {
                warn!(
                    model = %model.name(),
                    error = %err,
                    "numeric instability during training; candidate excluded from selection"
                );
                outcomes.push(Training::Failed);
            }
            Err(err) => return Err(err),
        }
    }
    Ok(outcomes)
}

/// Attach losses on both partitions to each trained model.
pub fn score_candidates(
    models: Vec<Model>, outcomes: Vec<Training>, data_sets: &DataSets,
) -> ModelResult<Vec<Candidate>> {
    models
        .into_iter()
        .zip(outcomes)
        .map(|(model, training)| {
            let losses =
                Losses::calculate(data_sets, &model.predictor, model.metadata.is_yhat_logged)?;
            info!(model = %model.name(), %losses, "scored candidate");
            Ok(Candidate { model, losses, training })
        })
        .collect()
}

/// Index of the eligible candidate with the lowest validation MSE.
///
/// Returns `None` when no candidate is eligible.
pub fn select_best(candidates: &[Candidate]) -> Option<usize> {
    let mut order: Vec<usize> =
        (0..candidates.len()).filter(|&i| candidates[i].is_eligible()).collect();
    order.sort_by(|&a, &b| {
        let mse_a = candidates[a].losses.validation_mse_or_inf();
        let mse_b = candidates[b].losses.validation_mse_or_inf();
        mse_a.total_cmp(&mse_b)
    });
    order.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loss::Loss;
    use ndarray::array;

    fn scored(name: &str, validation_mse: Option<f64>) -> Candidate {
        let hp = HyperParameters::new(2, None).expect("valid");
        let mut model = averaging::define_model(hp).expect("valid model");
        model.metadata.model_name = name.to_string();
        let losses = Losses {
            training: Loss::default(),
            validation: Loss { mse: validation_mse, poisson_nll: None },
        };
        Candidate { model, losses, training: Training::Finished(None) }
    }

    #[test]
    fn build_candidates_follow_registered_order() {
        let models = build_candidates(10, 1.0).expect("valid hyper-parameters");

        let names: Vec<&str> = models.iter().map(Model::name).collect();
        assert_eq!(names, CANDIDATE_NAMES.to_vec());
        assert_eq!(models[0].metadata.hyper_parameters.l2_coef, None);
        assert_eq!(models[1].metadata.hyper_parameters.l2_coef, Some(1.0));
        assert_eq!(models[2].metadata.hyper_parameters.l2_coef, None);
        assert!(models.iter().all(|m| m.metadata.hyper_parameters.n_days == 10));
    }

    #[test]
    fn build_candidates_rejects_bad_hyper_parameters() {
        assert!(build_candidates(0, 1.0).is_err());
        assert!(build_candidates(10, -1.0).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Training then scoring yields one candidate per model and only the
    // trainable ones carry a report.
    fn train_and_score_cover_every_candidate() {
        let training = DataSet::new(
            array![[1.0, 2.0], [2.0, 1.0], [0.0, 3.0], [4.0, 0.0]],
            array![2.0, 1.0, 2.0, 3.0],
        )
        .expect("consistent");
        let validation = DataSet::new(array![[1.0, 1.0]], array![1.0]).expect("consistent");
        let data_sets = DataSets { training: training.clone(), validation };
        let options = PipelineOptions {
            poisson_epochs: 200,
            discounted_epochs: 50,
            ..PipelineOptions::default()
        };
        let mut models = build_candidates(2, 1.0).expect("valid");

        let reports = train_candidates(&mut models, &training, &options).expect("trainable");
        let candidates = score_candidates(models, reports, &data_sets).expect("scorable");

        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].training, Training::Finished(None));
        assert_eq!(candidates[1].train_report().map(|r| r.epochs), Some(200));
        assert!(candidates.iter().all(|c| c.losses.validation.mse.is_some()));
    }

    #[test]
    fn select_best_prefers_lowest_validation_mse() {
        let candidates =
            vec![scored("a", Some(0.9)), scored("b", Some(0.3)), scored("c", Some(0.5))];

        assert_eq!(select_best(&candidates), Some(1));
    }

    #[test]
    fn select_best_keeps_build_order_on_ties() {
        let candidates =
            vec![scored("a", Some(0.4)), scored("b", Some(0.4)), scored("c", Some(0.4))];

        assert_eq!(select_best(&candidates), Some(0));
    }

    #[test]
    // Purpose
    // -------
    // Missing and NaN scores never beat a finite one.
    fn select_best_ranks_missing_and_nan_last() {
        let candidates =
            vec![scored("a", None), scored("b", Some(f64::NAN)), scored("c", Some(12.0))];

        assert_eq!(select_best(&candidates), Some(2));
        assert_eq!(select_best(&[]), None);
    }

    #[test]
    // Purpose
    // -------
    // A candidate whose solver failed is never selected, however low its
    // score.
    fn select_best_skips_failed_training() {
        let mut diverged = scored("b", Some(0.1));
        diverged.training = Training::Failed;
        let candidates = vec![scored("a", Some(9.0)), diverged, scored("c", Some(4.0))];

        assert_eq!(select_best(&candidates), Some(2));
        assert_eq!(select_best(&candidates[1..2]), None);
    }
}
