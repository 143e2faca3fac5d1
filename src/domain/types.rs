//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during cleaning and fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Lower bound of the what-if hash-rate increase, in percent.
pub const FACTOR_PERCENT_MIN: u16 = 0;
/// Upper bound of the what-if hash-rate increase, in percent.
pub const FACTOR_PERCENT_MAX: u16 = 200;
/// Starting value of the what-if hash-rate increase.
pub const FACTOR_PERCENT_DEFAULT: u16 = 20;

/// One source row before cleaning.
///
/// Cells are kept as raw text (`None` when the cell is absent or blank) so that
/// every parse decision happens in one place, `io::ingest::prepare`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line number in the source file (header is line 1).
    pub line: usize,
    pub date: Option<String>,
    pub difficulty: Option<String>,
    pub hash_rate: Option<String>,
    pub block_count: Option<String>,
}

impl RawRow {
    /// Build a row from cell text; blank cells become `None`.
    pub fn from_cells(line: usize, date: &str, difficulty: &str, hash_rate: &str, block_count: &str) -> Self {
        fn cell(s: &str) -> Option<String> {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Self {
            line,
            date: cell(date),
            difficulty: cell(difficulty),
            hash_rate: cell(hash_rate),
            block_count: cell(block_count),
        }
    }
}

/// A retained observation: every field present and in domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    /// Network difficulty (> 0).
    pub difficulty: f64,
    /// Network hash rate (> 0), in whatever unit the dataset uses.
    pub hash_rate: f64,
    /// Blocks produced in the period.
    pub block_count: u64,
}

/// Chronologically ordered, non-empty, immutable set of observations.
///
/// `elapsed_days[i]` is the whole number of days between `observations[i]`
/// and the first observation, so `elapsed_days[0] == 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    observations: Vec<Observation>,
    elapsed_days: Vec<i64>,
}

impl Series {
    /// Build a series from observations already sorted by date.
    ///
    /// Elapsed days are derived here and nowhere else, so a rebuilt series
    /// always gets a fresh time axis.
    pub(crate) fn from_sorted(observations: Vec<Observation>) -> Result<Self, DataError> {
        let Some(first) = observations.first() else {
            return Err(DataError::EmptyAfterCleaning { rows_read: 0 });
        };
        let origin = first.date;
        let elapsed_days = observations
            .iter()
            .map(|o| (o.date - origin).num_days())
            .collect();
        Ok(Self {
            observations,
            elapsed_days,
        })
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn elapsed_days(&self) -> &[i64] {
        &self.elapsed_days
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first(&self) -> &Observation {
        &self.observations[0]
    }

    /// The chronologically latest observation (last after the stable sort).
    pub fn last(&self) -> &Observation {
        &self.observations[self.observations.len() - 1]
    }

    /// `(elapsed_days, observation)` pairs in series order.
    pub fn points(&self) -> impl Iterator<Item = (i64, &Observation)> + '_ {
        self.elapsed_days.iter().copied().zip(self.observations.iter())
    }

    /// The last `n` observations (fewer if the series is shorter).
    pub fn tail(&self, n: usize) -> &[Observation] {
        let start = self.observations.len().saturating_sub(n);
        &self.observations[start..]
    }
}

/// A row dropped during cleaning, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDrop {
    pub line: usize,
    pub reason: String,
}

/// Summary stats about the rows actually retained.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub rows_read: usize,
    pub rows_used: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub difficulty_min: f64,
    pub difficulty_max: f64,
    pub hash_rate_min: f64,
    pub hash_rate_max: f64,
}

impl DatasetStats {
    pub fn rows_dropped(&self) -> usize {
        self.rows_read.saturating_sub(self.rows_used)
    }
}

/// Linear trend `difficulty ≈ slope · elapsed_days + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub slope: f64,
    pub intercept: f64,
    /// Number of observations the model was fit on.
    pub n_obs: usize,
}

impl FittedModel {
    pub fn predict(&self, elapsed_days: i64) -> f64 {
        self.slope * elapsed_days as f64 + self.intercept
    }
}

/// Actual vs. fitted difficulty at one observed date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedPoint {
    pub date: NaiveDate,
    pub elapsed_days: i64,
    pub actual: f64,
    pub fitted: f64,
}

/// Outcome of a projection that may decline to compute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "difficulty", rename_all = "lowercase")]
pub enum Projection {
    Value(f64),
    /// The input was outside the domain where the formula applies; nothing
    /// was computed.
    Skipped,
}

impl Projection {
    pub fn value(self) -> Option<f64> {
        match self {
            Projection::Value(v) => Some(v),
            Projection::Skipped => None,
        }
    }
}

/// User-supplied what-if inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionInputs {
    /// Hash-rate increase in percent, within
    /// `[FACTOR_PERCENT_MIN, FACTOR_PERCENT_MAX]`.
    pub factor_percent: u16,
    /// Manual hash-rate override (same units as the dataset).
    pub manual_hash_rate: f64,
}

impl ProjectionInputs {
    /// Defaults derived from the series: the standard factor and the last
    /// observed hash rate.
    pub fn defaults_for(series: &Series) -> Self {
        Self {
            factor_percent: FACTOR_PERCENT_DEFAULT,
            manual_hash_rate: series.last().hash_rate,
        }
    }

    /// Apply optional overrides on top of the series defaults.
    pub fn resolve(series: &Series, factor_percent: Option<i64>, manual_hash_rate: Option<f64>) -> Self {
        let defaults = Self::defaults_for(series);
        Self {
            factor_percent: factor_percent
                .map(clamp_factor_percent)
                .unwrap_or(defaults.factor_percent),
            manual_hash_rate: manual_hash_rate.unwrap_or(defaults.manual_hash_rate),
        }
    }
}

/// Clamp an arbitrary percent into the accepted slider range.
pub fn clamp_factor_percent(percent: i64) -> u16 {
    percent.clamp(i64::from(FACTOR_PERCENT_MIN), i64::from(FACTOR_PERCENT_MAX)) as u16
}

/// Both projections together with the inputs that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projections {
    pub inputs: ProjectionInputs,
    /// `last_difficulty × (1 + factor_percent / 100)`; always computed.
    pub by_factor: f64,
    /// `last_difficulty × manual_hash_rate / last_hash_rate`, or skipped.
    pub by_hash_rate: Projection,
}

/// A run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus env/defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_path: PathBuf,
    /// `None` means: use `FACTOR_PERCENT_DEFAULT`.
    pub factor_percent: Option<i64>,
    /// `None` means: use the last observed hash rate.
    pub manual_hash_rate: Option<f64>,
    pub preview_rows: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_series: Option<PathBuf>,
    pub export_forecast: Option<PathBuf>,
}

/// A saved forecast file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastFile {
    pub tool: String,
    pub source: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub model: FittedModel,
    pub projections: Projections,
    pub fitted: Vec<FittedPoint>,
}
