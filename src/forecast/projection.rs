//! What-if projections from the latest observation.
//!
//! Neither projection uses the fitted trend. Both are ratio heuristics
//! anchored on the last observed difficulty:
//!
//! - by factor: difficulty scales with a percentage increase in hash rate
//! - by hash rate: difficulty scales with `manual / last` hash rate

use tracing::debug;

use crate::domain::{Projection, ProjectionInputs, Projections, Series};

/// `last_difficulty × (1 + percent / 100)`.
///
/// `percent` is expected within `[0, 200]`; callers clamp before calling.
pub fn project_by_factor(series: &Series, percent: u16) -> f64 {
    let last = series.last();
    let projected = last.difficulty * (1.0 + f64::from(percent) / 100.0);
    debug!(percent, last_difficulty = last.difficulty, projected, "factor projection");
    projected
}

/// `last_difficulty × (manual_hash_rate / last_hash_rate)`.
///
/// Returns `Projection::Skipped` without dividing when `manual_hash_rate` is
/// not a positive number. The last hash rate is always positive (cleaning
/// drops non-positive hash rates).
pub fn project_by_hash_rate(series: &Series, manual_hash_rate: f64) -> Projection {
    if !(manual_hash_rate.is_finite() && manual_hash_rate > 0.0) {
        debug!(manual_hash_rate, "hash-rate projection skipped");
        return Projection::Skipped;
    }

    let last = series.last();
    let projected = last.difficulty * (manual_hash_rate / last.hash_rate);
    debug!(
        manual_hash_rate,
        last_hash_rate = last.hash_rate,
        last_difficulty = last.difficulty,
        projected,
        "hash-rate projection"
    );
    Projection::Value(projected)
}

/// Evaluate both projections for one set of inputs.
pub fn project(series: &Series, inputs: ProjectionInputs) -> Projections {
    Projections {
        inputs,
        by_factor: project_by_factor(series, inputs.factor_percent),
        by_hash_rate: project_by_hash_rate(series, inputs.manual_hash_rate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawRow;
    use crate::io::ingest::prepare;

    fn series_ending_with(difficulty: &str, hash_rate: &str) -> Series {
        prepare(&[
            RawRow::from_cells(2, "2024-01-01", "1", "1", "144"),
            RawRow::from_cells(3, "2024-01-15", difficulty, hash_rate, "144"),
        ])
        .unwrap()
    }

    #[test]
    fn factor_projection_scales_last_difficulty() {
        let s = series_ending_with("50000", "1000");
        assert_eq!(project_by_factor(&s, 0), 50_000.0);
        assert_eq!(project_by_factor(&s, 100), 100_000.0);
        assert!((project_by_factor(&s, 20) - 60_000.0).abs() < 1e-9);
        assert_eq!(project_by_factor(&s, 200), 150_000.0);
    }

    #[test]
    fn hash_rate_projection_is_ratio_of_hash_rates() {
        let s = series_ending_with("50000", "1000");
        assert_eq!(project_by_hash_rate(&s, 2000.0), Projection::Value(100_000.0));
        assert_eq!(project_by_hash_rate(&s, 1000.0), Projection::Value(50_000.0));
        assert_eq!(project_by_hash_rate(&s, 500.0), Projection::Value(25_000.0));
    }

    #[test]
    fn hash_rate_projection_skips_non_positive_input() {
        let s = series_ending_with("50000", "1000");
        assert_eq!(project_by_hash_rate(&s, 0.0), Projection::Skipped);
        assert_eq!(project_by_hash_rate(&s, -10.0), Projection::Skipped);
        assert_eq!(project_by_hash_rate(&s, f64::NAN), Projection::Skipped);
    }

    #[test]
    fn projections_work_on_single_row_series() {
        let s = prepare(&[RawRow::from_cells(2, "2024-01-01", "800", "40", "144")]).unwrap();
        let out = project(
            &s,
            ProjectionInputs {
                factor_percent: 50,
                manual_hash_rate: 80.0,
            },
        );
        assert_eq!(out.by_factor, 1_200.0);
        assert_eq!(out.by_hash_rate, Projection::Value(1_600.0));
    }

    #[test]
    fn projections_use_chronologically_latest_row() {
        let s = prepare(&[
            RawRow::from_cells(2, "2024-03-01", "300", "30", "144"),
            RawRow::from_cells(3, "2024-01-01", "100", "10", "144"),
        ])
        .unwrap();
        assert_eq!(project_by_factor(&s, 0), 300.0);
        assert_eq!(project_by_hash_rate(&s, 60.0), Projection::Value(600.0));
    }
}
