//! Production comparison and the promotion rule.
use crate::data::{dataset::DataSets, history::VisitSource};
use crate::loss::Losses;
use crate::selection::{
    errors::PipelineResult,
    options::PipelineOptions,
    store::{ProductionModel, ProductionStore},
};
use std::fmt;
use tracing::info;

/// Outcome of comparing the best candidate with production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Promoted,
    Retained,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Promoted => write!(f, "promoted"),
            Decision::Retained => write!(f, "retained"),
        }
    }
}

/// The production model rescored on freshly loaded data.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionEvaluation {
    pub model: ProductionModel,
    pub losses: Losses,
}

/// Promote iff the candidate's validation MSE is strictly lower.
///
/// Missing or NaN scores count as `+∞` on either side, so a broken
/// candidate never replaces production and two broken scores retain.
/// Without a production model the candidate is always promoted.
pub fn should_promote(candidate: &Losses, production: Option<&Losses>) -> bool {
    match production {
        None => true,
        Some(production) => {
            candidate.validation_mse_or_inf() < production.validation_mse_or_inf()
        }
    }
}

/// Load and rescore the production model, if one is stored.
///
/// The dataset is reloaded with the production model's own `n_days`, using
/// the same run date and seed as the candidates.
///
/// # Errors
/// - Persistence errors from [`ProductionStore::load`].
/// - Data errors from reloading the visit history.
/// - Model errors if the stored predictor cannot score the data.
pub fn evaluate_production<S: VisitSource + ?Sized>(
    store: &ProductionStore, source: &S, options: &PipelineOptions,
) -> PipelineResult<Option<ProductionEvaluation>> {
    let Some(model) = store.load()? else {
        return Ok(None);
    };
    let n_days = model.metadata.hyper_parameters.n_days;
    let data_sets = DataSets::load(source, n_days, options.today(), options.seed)?;
    let losses = Losses::calculate(&data_sets, &model.predictor, model.metadata.is_yhat_logged)?;
    info!(model = %model.metadata.model_name, %losses, "scored production model");
    Ok(Some(ProductionEvaluation { model, losses }))
}
