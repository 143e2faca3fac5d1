//! Export the cleaned series with fitted values to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts: one row per retained observation, in series order.

use std::fs::File;
use std::path::Path;

use tracing::info;

use crate::app::pipeline::Session;
use crate::error::AppError;

/// Write the cleaned series (plus elapsed days and fitted difficulty) to CSV.
///
/// `fitted` is left blank when no trend is available.
pub fn write_series_csv(path: &Path, session: &Session) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(["date", "elapsed_days", "DiffLast", "HashRate", "BlkCnt", "fitted"])
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV header: {e}")))?;

    let model = session.model().ok();
    for (elapsed_days, o) in session.series().points() {
        let fitted = model
            .map(|m| format!("{:.4}", m.predict(elapsed_days)))
            .unwrap_or_default();
        writer
            .write_record([
                o.date.to_string(),
                elapsed_days.to_string(),
                format!("{:.4}", o.difficulty),
                format!("{:.4}", o.hash_rate),
                o.block_count.to_string(),
                fitted,
            ])
            .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV: {e}")))?;

    info!(path = %path.display(), rows = session.series().len(), "wrote series export");
    Ok(())
}
