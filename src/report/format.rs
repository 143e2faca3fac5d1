//! Formatted terminal output: load banner, dataset preview, trend, what-ifs.
//!
//! We keep formatting code in one place so:
//! - the cleaning/forecast code stays free of presentation
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::Session;
use crate::domain::{DatasetStats, Observation, Projection, Projections, RowDrop};
use crate::error::DataError;

/// One-line success banner naming the loaded file.
pub fn format_load_banner(session: &Session) -> String {
    format!("Loaded {}", session.source().display())
}

/// Dataset stats: rows read/used/dropped, date range, value ranges.
pub fn format_dataset_summary(stats: &DatasetStats) -> String {
    let mut out = String::new();
    out.push_str("=== diffcast - Bitcoin difficulty forecast ===\n");
    out.push_str(&format!(
        "Rows: read={} | used={} | dropped={}\n",
        stats.rows_read,
        stats.rows_used,
        stats.rows_dropped()
    ));
    out.push_str(&format!("Dates: {} .. {}\n", stats.first_date, stats.last_date));
    out.push_str(&format!(
        "Difficulty: [{}, {}]\n",
        fmt_grouped(stats.difficulty_min, 2),
        fmt_grouped(stats.difficulty_max, 2)
    ));
    out.push_str(&format!(
        "HashRate: [{}, {}]\n",
        fmt_grouped(stats.hash_rate_min, 2),
        fmt_grouped(stats.hash_rate_max, 2)
    ));
    out
}

/// Dropped rows with their reasons, capped at `limit` lines.
///
/// Empty when nothing was dropped.
pub fn format_dropped_rows(dropped: &[RowDrop], limit: usize) -> String {
    if dropped.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    out.push_str("Dropped rows:\n");
    for d in dropped.iter().take(limit) {
        out.push_str(&format!("- line {}: {}\n", d.line, d.reason));
    }
    if dropped.len() > limit {
        out.push_str(&format!("- ... and {} more\n", dropped.len() - limit));
    }
    out
}

/// Table of the most recent observations.
pub fn format_preview(rows: &[Observation]) -> String {
    let mut out = String::new();
    out.push_str("Dataset preview:\n");
    out.push_str(&format!("{:<10} {:>24} {:>20} {:>8}\n", "date", "DiffLast", "HashRate", "BlkCnt"));
    out.push_str(&format!("{:-<10} {:-<24} {:-<20} {:-<8}\n", "", "", "", ""));
    for o in rows {
        out.push_str(&format!(
            "{:<10} {:>24} {:>20} {:>8}\n",
            o.date.format("%Y-%m-%d"),
            fmt_grouped(o.difficulty, 2),
            fmt_grouped(o.hash_rate, 2),
            o.block_count
        ));
    }
    out
}

/// The fitted trend, or why there is none.
pub fn format_trend(session: &Session) -> String {
    let mut out = String::new();
    out.push_str("Linear trend (difficulty vs. days since first observation):\n");
    match session.model() {
        Ok(model) => {
            out.push_str(&format!("- slope    : {} per day\n", fmt_grouped(model.slope, 4)));
            out.push_str(&format!("- intercept: {}\n", fmt_grouped(model.intercept, 4)));
            if let (Some(first), Some(last)) = (session.fitted().first(), session.fitted().last()) {
                out.push_str(&format!(
                    "- fitted   : {} on {} -> {} on {}\n",
                    fmt_grouped(first.fitted, 2),
                    first.date,
                    fmt_grouped(last.fitted, 2),
                    last.date
                ));
            }
        }
        Err(err) if matches!(err, DataError::InsufficientObservations { .. }) => {
            out.push_str(&format!("- unavailable: {err}\n"));
        }
        Err(err) => {
            out.push_str(&format!("- failed: {err}\n"));
        }
    }
    out
}

/// Both what-if projections with the inputs that produced them.
///
/// The hash-rate block is omitted entirely when that projection was skipped.
pub fn format_projections(projections: &Projections) -> String {
    let mut out = String::new();

    out.push_str("What-if: increase hash rate\n");
    out.push_str(&format!(
        "If the hashrate increases by {}%, the predicted difficulty would be: {}\n",
        projections.inputs.factor_percent,
        fmt_grouped(projections.by_factor, 2)
    ));

    if let Projection::Value(v) = projections.by_hash_rate {
        out.push('\n');
        out.push_str("Manual hash-rate override\n");
        out.push_str(&format!(
            "Based on custom HashRate = {}, projected difficulty is: {}\n",
            fmt_grouped(projections.inputs.manual_hash_rate, 2),
            fmt_grouped(v, 2)
        ));
    }

    out
}

/// Format with a fixed number of decimals and `,` thousands separators.
pub fn fmt_grouped(v: f64, decimals: usize) -> String {
    if !v.is_finite() {
        return format!("{v}");
    }

    let raw = format!("{:.*}", decimals, v.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // Avoid "-0.00" for values that round to zero.
    let is_zero = raw.chars().all(|c| c == '0' || c == '.');
    let mut out = String::new();
    if v < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::domain::{ProjectionInputs, RawRow};
    use crate::io::ingest::prepare_with_report;

    fn session(rows: &[RawRow]) -> Session {
        Session::from_ingest(PathBuf::from("btc.csv"), prepare_with_report(rows).unwrap())
    }

    #[test]
    fn fmt_grouped_inserts_separators() {
        assert_eq!(fmt_grouped(60_000.0, 2), "60,000.00");
        assert_eq!(fmt_grouped(1_234_567.891, 2), "1,234,567.89");
        assert_eq!(fmt_grouped(999.999, 2), "1,000.00");
        assert_eq!(fmt_grouped(12.0, 0), "12");
        assert_eq!(fmt_grouped(-4_500.5, 1), "-4,500.5");
        assert_eq!(fmt_grouped(-0.001, 2), "0.00");
    }

    #[test]
    fn projections_text_matches_inputs() {
        let projections = Projections {
            inputs: ProjectionInputs {
                factor_percent: 20,
                manual_hash_rate: 2000.0,
            },
            by_factor: 60_000.0,
            by_hash_rate: Projection::Value(100_000.0),
        };
        let txt = format_projections(&projections);
        assert!(txt.contains("increases by 20%, the predicted difficulty would be: 60,000.00"));
        assert!(txt.contains("custom HashRate = 2,000.00, projected difficulty is: 100,000.00"));
    }

    #[test]
    fn skipped_projection_is_not_rendered() {
        let projections = Projections {
            inputs: ProjectionInputs {
                factor_percent: 0,
                manual_hash_rate: 0.0,
            },
            by_factor: 10.0,
            by_hash_rate: Projection::Skipped,
        };
        let txt = format_projections(&projections);
        assert!(!txt.contains("custom HashRate"));
    }

    #[test]
    fn preview_lists_rows_in_order() {
        let s = session(&[
            RawRow::from_cells(2, "2024-01-02", "2000", "20", "150"),
            RawRow::from_cells(3, "2024-01-01", "1000", "10", "140"),
        ]);
        let txt = format_preview(s.series().tail(5));
        let first = txt.find("2024-01-01").unwrap();
        let second = txt.find("2024-01-02").unwrap();
        assert!(first < second);
        assert!(txt.contains("2,000.00"));
    }

    #[test]
    fn trend_reports_insufficient_observations() {
        let s = session(&[RawRow::from_cells(2, "2024-01-01", "1000", "10", "140")]);
        let txt = format_trend(&s);
        assert!(txt.contains("unavailable"));
        assert!(txt.contains("found 1"));
    }

    #[test]
    fn dropped_rows_list_line_and_reason() {
        let s = session(&[
            RawRow::from_cells(2, "2024-01-01", "1000", "10", "140"),
            RawRow::from_cells(3, "bad", "1000", "10", "140"),
            RawRow::from_cells(4, "2024-01-02", "", "10", "140"),
            RawRow::from_cells(5, "2024-01-03", "1000", "0", "140"),
        ]);
        let txt = format_dropped_rows(s.dropped(), 2);
        assert!(txt.contains("- line 3: missing or unparseable `date`"));
        assert!(txt.contains("- line 4: missing or invalid `DiffLast`"));
        assert!(!txt.contains("line 5"));
        assert!(txt.contains("and 1 more"));

        assert_eq!(format_dropped_rows(&[], 5), "");
    }

    #[test]
    fn summary_includes_drop_count() {
        let s = session(&[
            RawRow::from_cells(2, "2024-01-01", "1000", "10", "140"),
            RawRow::from_cells(3, "bad", "1000", "10", "140"),
        ]);
        let txt = format_dataset_summary(s.stats());
        assert!(txt.contains("read=2 | used=1 | dropped=1"));
        assert!(txt.contains("Dates: 2024-01-01 .. 2024-01-01"));
    }
}
