//! Linear trend of difficulty over elapsed days.

use tracing::{info, warn};

use crate::domain::{FittedModel, FittedPoint, Series};
use crate::error::DataError;
use crate::math::fit_line;

/// Minimum observations for a determined fit (slope + intercept).
pub const MIN_FIT_OBSERVATIONS: usize = 2;

/// Fit `difficulty ≈ slope · elapsed_days + intercept` by ordinary least squares.
pub fn fit(series: &Series) -> Result<FittedModel, DataError> {
    let n = series.len();
    if n < MIN_FIT_OBSERVATIONS {
        warn!(observations = n, "not enough observations for a trend fit");
        return Err(DataError::InsufficientObservations {
            found: n,
            required: MIN_FIT_OBSERVATIONS,
        });
    }

    let xs: Vec<f64> = series.elapsed_days().iter().map(|&d| d as f64).collect();
    let ys: Vec<f64> = series.observations().iter().map(|o| o.difficulty).collect();

    let (slope, intercept) = fit_line(&xs, &ys)
        .ok_or_else(|| DataError::degenerate_fit(format!("least squares failed on {n} observations")))?;

    info!(slope, intercept, observations = n, "fitted difficulty trend");
    Ok(FittedModel {
        slope,
        intercept,
        n_obs: n,
    })
}

/// Evaluate the model at every observed date.
///
/// The curve covers the observed range only; nothing is extrapolated past the
/// last observation.
pub fn fitted_curve(series: &Series, model: &FittedModel) -> Vec<FittedPoint> {
    series
        .points()
        .map(|(elapsed_days, o)| FittedPoint {
            date: o.date,
            elapsed_days,
            actual: o.difficulty,
            fitted: model.predict(elapsed_days),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawRow;
    use crate::io::ingest::prepare;

    fn series(rows: &[(&str, &str)]) -> Series {
        let raw: Vec<RawRow> = rows
            .iter()
            .enumerate()
            .map(|(i, (date, diff))| RawRow::from_cells(i + 2, date, diff, "1000", "144"))
            .collect();
        prepare(&raw).unwrap()
    }

    #[test]
    fn fit_recovers_known_line() {
        let s = series(&[("2024-01-01", "100"), ("2024-01-02", "200"), ("2024-01-03", "300")]);
        let model = fit(&s).unwrap();
        assert!((model.slope - 100.0).abs() < 1e-9);
        assert!((model.intercept - 100.0).abs() < 1e-9);
        assert_eq!(model.n_obs, 3);
    }

    #[test]
    fn fit_is_deterministic() {
        let s = series(&[("2024-01-01", "5"), ("2024-01-09", "17"), ("2024-02-01", "11")]);
        assert_eq!(fit(&s).unwrap(), fit(&s).unwrap());
    }

    #[test]
    fn fit_requires_two_observations() {
        let s = series(&[("2024-01-01", "100")]);
        assert_eq!(
            fit(&s).unwrap_err(),
            DataError::InsufficientObservations { found: 1, required: 2 }
        );
    }

    #[test]
    fn fit_with_single_date_is_flat_at_mean() {
        let s = series(&[("2024-01-01", "10"), ("2024-01-01", "30")]);
        let model = fit(&s).unwrap();
        assert_eq!(model.slope, 0.0);
        assert!((model.intercept - 20.0).abs() < 1e-12);
    }

    #[test]
    fn fitted_curve_covers_observed_dates_only() {
        let s = series(&[("2024-01-01", "100"), ("2024-01-11", "200"), ("2024-01-21", "300")]);
        let model = fit(&s).unwrap();
        let curve = fitted_curve(&s, &model);

        assert_eq!(curve.len(), s.len());
        assert_eq!(curve[0].elapsed_days, 0);
        assert_eq!(curve[2].elapsed_days, 20);
        assert_eq!(curve[2].date, s.last().date);
        for p in &curve {
            assert!((p.fitted - p.actual).abs() < 1e-9);
        }
    }
}
