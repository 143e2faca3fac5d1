//! Read/write forecast JSON files.
//!
//! A forecast file is the portable representation of one run:
//! - the fitted trend (slope, intercept, observation count)
//! - the what-if projections and the inputs that produced them
//! - actual vs. fitted difficulty over the observed dates, for later plotting
//!
//! The schema is defined by `domain::ForecastFile`.

use std::fs::File;
use std::path::Path;

use tracing::info;

use crate::app::pipeline::Session;
use crate::domain::{ForecastFile, Projections};
use crate::error::AppError;

/// Build the forecast file for a session.
///
/// Fails when the session has no fitted trend (too few observations), or when
/// the inputs hold a non-finite number (JSON has no encoding for it).
pub fn forecast_file(session: &Session, projections: &Projections) -> Result<ForecastFile, AppError> {
    let model = session
        .model()
        .map_err(|e| AppError::new(4, format!("Cannot export forecast: {e}")))?;
    if !projections.inputs.manual_hash_rate.is_finite() {
        return Err(AppError::new(
            4,
            format!(
                "Cannot export forecast: manual hash rate {} is not a finite number",
                projections.inputs.manual_hash_rate
            ),
        ));
    }

    Ok(ForecastFile {
        tool: "diffcast".to_string(),
        source: session.source().display().to_string(),
        first_date: session.stats().first_date,
        last_date: session.stats().last_date,
        model: *model,
        projections: *projections,
        fitted: session.fitted().to_vec(),
    })
}

/// Write a forecast JSON file.
pub fn write_forecast_json(path: &Path, session: &Session, projections: &Projections) -> Result<(), AppError> {
    let forecast = forecast_file(session, projections)?;
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create forecast JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &forecast)
        .map_err(|e| AppError::new(4, format!("Failed to write forecast JSON: {e}")))?;

    info!(path = %path.display(), "wrote forecast export");
    Ok(())
}

/// Read a forecast JSON file.
pub fn read_forecast_json(path: &Path) -> Result<ForecastFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open forecast JSON '{}': {e}", path.display())))?;
    let forecast: ForecastFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid forecast JSON: {e}")))?;
    Ok(forecast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::domain::{Projection, RawRow};
    use crate::io::ingest::prepare_with_report;

    fn session(rows: &[RawRow]) -> Session {
        Session::from_ingest(PathBuf::from("btc.csv"), prepare_with_report(rows).unwrap())
    }

    #[test]
    fn forecast_json_can_be_read_back() {
        let s = session(&[
            RawRow::from_cells(2, "2024-01-01", "100", "10", "144"),
            RawRow::from_cells(3, "2024-01-03", "300", "30", "144"),
        ]);
        let mut inputs = s.default_inputs();
        inputs.manual_hash_rate = 0.0;
        let projections = s.evaluate(inputs);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forecast.json");
        write_forecast_json(&path, &s, &projections).unwrap();

        let back = read_forecast_json(&path).unwrap();
        assert_eq!(back.tool, "diffcast");
        assert_eq!(back.source, "btc.csv");
        assert_eq!(back.fitted.len(), 2);
        assert_eq!(back.projections.by_hash_rate, Projection::Skipped);
        assert!((back.model.slope - 100.0).abs() < 1e-9);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"status\": \"skipped\""));
    }

    #[test]
    fn forecast_file_requires_a_model() {
        let s = session(&[RawRow::from_cells(2, "2024-01-01", "100", "10", "144")]);
        let projections = s.evaluate(s.default_inputs());
        let err = forecast_file(&s, &projections).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("Insufficient observations"));
    }

    #[test]
    fn forecast_file_rejects_non_finite_inputs() {
        let s = session(&[
            RawRow::from_cells(2, "2024-01-01", "100", "10", "144"),
            RawRow::from_cells(3, "2024-01-03", "300", "30", "144"),
        ]);
        let mut inputs = s.default_inputs();
        inputs.manual_hash_rate = f64::NAN;
        let projections = s.evaluate(inputs);
        assert_eq!(projections.by_hash_rate, Projection::Skipped);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forecast.json");
        let err = write_forecast_json(&path, &s, &projections).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(!path.exists());
    }

    #[test]
    fn read_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(read_forecast_json(&path).unwrap_err().exit_code(), 2);
    }
}
