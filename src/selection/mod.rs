//! selection — choose, compare and promote the production model.
//!
//! Purpose
//! -------
//! Orchestrate one model-selection run: build the candidate family, train
//! it on the training partition, score every candidate on both partitions,
//! pick the lowest validation MSE and replace the stored production model
//! only when the winner is strictly better.
//!
//! Key behaviors
//! -------------
//! - [`candidates`]: build/train/score and the stable best-of selection.
//! - [`promote`]: the promotion rule and production rescoring.
//! - [`store`]: the `model.bin` / `model_metadata.json` pair, written
//!   through temp files and renames.
//! - [`pipeline`]: [`run_pipeline`] ties the steps together and returns a
//!   printable [`PipelineOutcome`].
//! - [`options`]: validated [`PipelineOptions`] with environment overrides.
//!
//! Invariants & assumptions
//! ------------------------
//! - Runs are single-threaded and synchronous; candidates train one after
//!   another.
//! - The production pair is owned by this job alone.
//! - Nothing is written unless the decision is [`Decision::Promoted`].

pub mod candidates;
pub mod errors;
pub mod options;
pub mod pipeline;
pub mod promote;
pub mod store;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::candidates::{
    Candidate, build_candidates, score_candidates, select_best, train_candidates,
};
pub use self::errors::{PersistError, PersistResult, PipelineError, PipelineResult};
pub use self::options::PipelineOptions;
pub use self::pipeline::{PipelineOutcome, run_pipeline, run_pipeline_with_store};
pub use self::promote::{Decision, ProductionEvaluation, evaluate_production, should_promote};
pub use self::store::{ProductionModel, ProductionStore};

pub mod prelude {
    pub use super::errors::{PipelineError, PipelineResult};
    pub use super::options::PipelineOptions;
    pub use super::pipeline::{PipelineOutcome, run_pipeline};
    pub use super::promote::Decision;
}
