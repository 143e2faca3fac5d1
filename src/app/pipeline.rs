//! Shared pipeline logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV load -> cleaning -> trend fit -> projections
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).
//! A `Session` is built once per dataset load and never mutated; the
//! front-ends call `Session::evaluate` again whenever an input changes.

use std::path::{Path, PathBuf};

use crate::domain::{DatasetStats, FittedModel, FittedPoint, Projections, ProjectionInputs, RowDrop, RunConfig, Series};
use crate::error::{AppError, DataError};
use crate::forecast::{fit, fitted_curve, project};
use crate::io::ingest::{IngestedData, load_dataset};

/// The prepared dataset plus the trend fitted on it.
#[derive(Debug, Clone)]
pub struct Session {
    source: PathBuf,
    ingest: IngestedData,
    model: Result<FittedModel, DataError>,
    fitted: Vec<FittedPoint>,
}

impl Session {
    /// Load, clean, and fit a dataset.
    ///
    /// Load failures and empty datasets are fatal. A dataset too small to fit
    /// still produces a session; `model()` then reports why.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let ingest = load_dataset(path)?;
        Ok(Self::from_ingest(path.to_path_buf(), ingest))
    }

    pub fn from_ingest(source: PathBuf, ingest: IngestedData) -> Self {
        let model = fit(&ingest.series);
        let fitted = match &model {
            Ok(m) => fitted_curve(&ingest.series, m),
            Err(_) => Vec::new(),
        };
        Self {
            source,
            ingest,
            model,
            fitted,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn series(&self) -> &Series {
        &self.ingest.series
    }

    pub fn stats(&self) -> &DatasetStats {
        &self.ingest.stats
    }

    pub fn dropped(&self) -> &[RowDrop] {
        &self.ingest.dropped
    }

    /// The cached trend, or the reason it could not be fit.
    pub fn model(&self) -> Result<&FittedModel, &DataError> {
        self.model.as_ref()
    }

    /// Actual vs. fitted difficulty; empty when no model is available.
    pub fn fitted(&self) -> &[FittedPoint] {
        &self.fitted
    }

    pub fn default_inputs(&self) -> ProjectionInputs {
        ProjectionInputs::defaults_for(self.series())
    }

    /// Recompute both projections for the given inputs.
    pub fn evaluate(&self, inputs: ProjectionInputs) -> Projections {
        project(self.series(), inputs)
    }
}

/// All computed outputs of a single batch run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub session: Session,
    pub projections: Projections,
}

/// Execute the full pipeline for a batch command.
pub fn run(config: &RunConfig) -> Result<RunOutput, AppError> {
    let session = Session::load(&config.data_path)?;
    let inputs = ProjectionInputs::resolve(session.series(), config.factor_percent, config.manual_hash_rate);
    let projections = session.evaluate(inputs);
    Ok(RunOutput {
        session,
        projections,
    })
}
