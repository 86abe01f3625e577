//! selection::pipeline — one end-to-end selection run.
//!
//! Purpose
//! -------
//! Drive the whole job: load and split the visit history, build, train and
//! score the candidates, compare the best one with the stored production
//! model and persist it when it wins.
//!
//! Key behaviors
//! -------------
//! - Every fatal failure (history load, persistence, structural model
//!   errors) returns a [`PipelineError`](crate::selection::errors::PipelineError)
//!   before anything is written, so the previous production pair survives.
//! - The returned [`PipelineOutcome`] renders the comparison table with
//!   `Display`; the library itself never prints.
//!
//! Downstream usage
//! ----------------
//! - The `visit_forecast` binary calls [`run_pipeline`] with a
//!   [`SqliteVisitStore`](crate::data::SqliteVisitStore) and prints the
//!   outcome. Tests inject in-memory [`DailyCounts`](crate::data::DailyCounts).
use crate::data::{dataset::DataSets, history::VisitSource};
use crate::models::{averaging, discounted, poisson};
use crate::selection::{
    candidates::{
        Candidate, Training, build_candidates, score_candidates, select_best, train_candidates,
    },
    errors::{PipelineError, PipelineResult},
    options::PipelineOptions,
    promote::{Decision, ProductionEvaluation, evaluate_production, should_promote},
    store::ProductionStore,
};
use std::fmt;
use tracing::info;

/// Width the model name is padded or truncated to in the report.
const NAME_WIDTH: usize = 20;

/// Row order of the comparison table; unlisted names go last.
const REPORT_ORDER: [&str; 3] =
    [averaging::MODEL_NAME, discounted::MODEL_NAME, poisson::MODEL_NAME];

fn report_rank(name: &str) -> usize {
    REPORT_ORDER.iter().position(|&listed| listed == name).unwrap_or(REPORT_ORDER.len())
}

/// Everything a run decided, in report order.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub candidates: Vec<Candidate>,
    pub best: usize,
    pub production: Option<ProductionEvaluation>,
    pub decision: Decision,
}

impl PipelineOutcome {
    pub fn best_candidate(&self) -> &Candidate {
        &self.candidates[self.best]
    }

    /// Name of the model serving after this run: the retained production
    /// model, otherwise the best candidate.
    pub fn serving_model_name(&self) -> &str {
        match (self.decision, &self.production) {
            (Decision::Retained, Some(production)) => &production.model.metadata.model_name,
            _ => self.best_candidate().name(),
        }
    }
}

impl fmt::Display for PipelineOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        let mut rows: Vec<&Candidate> = self.candidates.iter().collect();
        rows.sort_by_key(|candidate| report_rank(candidate.name()));
        for candidate in rows {
            let name = candidate.name();
            write!(f, "{name:<width$.width$}\t{}", candidate.losses, width = NAME_WIDTH)?;
            if candidate.training == Training::Failed {
                write!(f, "\t(training failed)")?;
            }
            writeln!(f)?;
        }
        writeln!(f)?;
        writeln!(f, "{} performs the best.", self.best_candidate().name())?;
        writeln!(f)?;
        if let Some(production) = &self.production {
            writeln!(
                f,
                "Production {}\t{}",
                production.model.metadata.model_name, production.losses
            )?;
        }
        let verb = match self.decision {
            Decision::Promoted => "Storing",
            Decision::Retained => "Keeping",
        };
        writeln!(f, "{verb} {} as the production model.", self.serving_model_name())
    }
}

/// Run the selection job against `source`, persisting into
/// `options.resources_dir`.
///
/// # Errors
/// - [`PipelineError::InvalidOption`] for invalid options.
/// - Data, model and persistence failures as described in the module docs.
pub fn run_pipeline<S: VisitSource + ?Sized>(
    options: &PipelineOptions, source: &S,
) -> PipelineResult<PipelineOutcome> {
    options.validate()?;
    let store = ProductionStore::in_dir(&options.resources_dir);
    run_pipeline_with_store(options, source, &store)
}

/// [`run_pipeline`] with an explicit production store.
pub fn run_pipeline_with_store<S: VisitSource + ?Sized>(
    options: &PipelineOptions, source: &S, store: &ProductionStore,
) -> PipelineResult<PipelineOutcome> {
    let today = options.today();
    info!(%today, n_days = options.n_days, seed = options.seed, "starting model selection");

    let data_sets = DataSets::load(source, options.n_days, today, options.seed)?;
    let mut models = build_candidates(options.n_days, options.l2_coef)?;
    let reports = train_candidates(&mut models, &data_sets.training, options)?;
    let candidates = score_candidates(models, reports, &data_sets)?;
    let best = select_best(&candidates).ok_or(PipelineError::NoCandidates)?;
    info!(model = %candidates[best].name(), "selected best candidate");

    let production = evaluate_production(store, source, options)?;
    let promote =
        should_promote(&candidates[best].losses, production.as_ref().map(|prod| &prod.losses));

    let decision = if promote {
        let winner = &candidates[best].model;
        store.save(&winner.predictor, &winner.metadata)?;
        Decision::Promoted
    } else {
        Decision::Retained
    };
    info!(model = %candidates[best].name(), %decision, "selection finished");

    Ok(PipelineOutcome { candidates, best, production, decision })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::history::DailyCounts;
    use crate::loss::{Loss, Losses};
    use crate::models::metadata::HyperParameters;
    use chrono::{Days, NaiveDate};
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")
    }

    // Twelve bookmarks whose next-day count tracks recent activity.
    fn counts() -> DailyCounts {
        let mut counts = DailyCounts::new();
        for b in 0..12_u64 {
            for days_ago in 1..=12_u64 {
                let n = (b + days_ago) % 4;
                if n > 0 {
                    counts.add(format!("bm{b:02}"), today() - Days::new(days_ago), n);
                }
            }
        }
        counts
    }

    fn options(dir: &TempDir) -> PipelineOptions {
        PipelineOptions {
            n_days: 5,
            poisson_epochs: 300,
            discounted_epochs: 50,
            username: "tester".to_string(),
            resources_dir: dir.path().to_path_buf(),
            today: Some(today()),
            ..PipelineOptions::default()
        }
    }

    #[test]
    // Purpose
    // -------
    // With no stored model the best candidate is promoted and written; a
    // rerun on the same data scores production identically and retains.
    fn first_run_promotes_and_rerun_retains() {
        let dir = TempDir::new().expect("temp dir");
        let options = options(&dir);

        let first = run_pipeline(&options, &counts()).expect("first run");
        assert_eq!(first.decision, Decision::Promoted);
        assert!(first.production.is_none());
        assert!(ProductionStore::in_dir(dir.path()).exists());

        let second = run_pipeline(&options, &counts()).expect("second run");
        assert_eq!(second.decision, Decision::Retained);
        let production = second.production.as_ref().expect("stored model");
        assert_eq!(production.model.metadata.model_name, first.best_candidate().name());
    }

    #[test]
    // Purpose
    // -------
    // A production model scoring exactly as well as the best candidate is
    // kept and its files are left byte-for-byte unchanged.
    fn tied_production_is_retained_untouched() {
        let dir = TempDir::new().expect("temp dir");
        let options = options(&dir);
        let first = run_pipeline(&options, &counts()).expect("first run");
        let store = ProductionStore::in_dir(dir.path());
        let before = std::fs::read(store.model_path()).expect("stored");

        let second = run_pipeline(&options, &counts()).expect("second run");

        assert_eq!(second.decision, Decision::Retained);
        assert_eq!(std::fs::read(store.model_path()).expect("stored"), before);
        assert_eq!(first.best_candidate().losses, second.best_candidate().losses);
    }

    #[test]
    // Purpose
    // -------
    // A candidate whose solver blows up is reported but never promoted, even
    // though its untouched initial parameters score best.
    //
    // Given
    // -----
    // - 8 bookmarks, each visited 10^6 times two days ago and 5 times
    //   yesterday, with a one-day window.
    // - The first Adam step pushes exp(η) past f64 range.
    //
    // Expect
    // ------
    // - The Poisson regression is marked failed and averaging is stored.
    fn diverged_candidate_is_never_promoted() {
        let dir = TempDir::new().expect("temp dir");
        let mut counts = DailyCounts::new();
        for b in 0..8_u64 {
            counts.add(format!("bm{b:02}"), today() - Days::new(2), 1_000_000);
            counts.add(format!("bm{b:02}"), today() - Days::new(1), 5);
        }
        let options = PipelineOptions { n_days: 1, ..options(&dir) };

        let outcome = run_pipeline(&options, &counts).expect("run succeeds");

        let poisson = outcome
            .candidates
            .iter()
            .find(|c| c.name() == poisson::MODEL_NAME)
            .expect("poisson candidate");
        assert_eq!(poisson.training, Training::Failed);
        let best_mse = outcome.best_candidate().losses.validation_mse_or_inf();
        assert!(poisson.losses.validation_mse_or_inf() < best_mse);
        assert_eq!(outcome.best_candidate().name(), averaging::MODEL_NAME);
        assert_eq!(outcome.decision, Decision::Promoted);
        let store = ProductionStore::in_dir(dir.path());
        let stored = store.load().expect("readable").expect("stored");
        assert_eq!(stored.metadata.model_name, averaging::MODEL_NAME);
        assert!(outcome.to_string().contains("(training failed)"));
    }

    #[test]
    fn invalid_options_fail_before_loading() {
        let dir = TempDir::new().expect("temp dir");
        let options = PipelineOptions { n_days: 0, ..options(&dir) };

        let err = run_pipeline(&options, &counts()).unwrap_err();

        assert!(matches!(err, PipelineError::InvalidOption { name: "n_days", .. }));
        assert!(!ProductionStore::in_dir(dir.path()).exists());
    }

    #[test]
    fn empty_history_is_fatal_and_writes_nothing() {
        let dir = TempDir::new().expect("temp dir");

        let err = run_pipeline(&options(&dir), &DailyCounts::new()).unwrap_err();

        assert!(matches!(err, PipelineError::Data(_)));
        assert!(!ProductionStore::in_dir(dir.path()).exists());
    }

    #[test]
    // Purpose
    // -------
    // The report pads names to 20 characters and ends with the decision.
    fn report_lists_candidates_and_decision() {
        let hp = HyperParameters::new(2, None).expect("valid");
        let model = averaging::define_model(hp).expect("valid model");
        let losses = Losses {
            training: Loss { mse: Some(1.0), poisson_nll: Some(2.0) },
            validation: Loss { mse: Some(0.5), poisson_nll: Some(1.25) },
        };
        let outcome = PipelineOutcome {
            candidates: vec![Candidate { model, losses, training: Training::Finished(None) }],
            best: 0,
            production: None,
            decision: Decision::Promoted,
        };

        let report = outcome.to_string();

        let expected_row = "averaging           \tTraining: MSE: 1.00; PoissonNLL: 2.00;  \
                            Validation: MSE: 0.50; PoissonNLL: 1.25; ";
        assert!(report.contains(expected_row), "{report}");
        assert!(report.contains("averaging performs the best."));
        assert!(report.ends_with("Storing averaging as the production model.\n"));
    }

    #[test]
    // Purpose
    // -------
    // Table rows follow the fixed report order, which differs from the
    // build order used for tie-breaking.
    fn report_rows_follow_report_order() {
        let dir = TempDir::new().expect("temp dir");

        let report = run_pipeline(&options(&dir), &counts()).expect("run succeeds").to_string();

        let row = |name: &str| report.find(&format!("\n{name}")).expect("row present");
        assert!(row("averaging") < row("temporally_discounte"), "{report}");
        assert!(row("temporally_discounte") < row("poisson_regression"), "{report}");
    }

    #[test]
    fn report_truncates_long_names() {
        let hp = HyperParameters::new(2, None).expect("valid");
        let mut model = averaging::define_model(hp).expect("valid model");
        model.metadata.model_name = "temporally_discounted_averaging".to_string();
        let outcome = PipelineOutcome {
            candidates: vec![Candidate {
                model,
                losses: Losses::default(),
                training: Training::Failed,
            }],
            best: 0,
            production: None,
            decision: Decision::Promoted,
        };

        let report = outcome.to_string();

        assert!(report.contains("\ntemporally_discounte\t"), "{report}");
        assert!(report.contains("\t(training failed)\n"), "{report}");
    }
}
