//! CSV ingest and cleaning.
//!
//! This module turns a network-metrics CSV into a clean, chronologically
//! ordered `Series` that is safe to fit.
//!
//! Design goals:
//! - **Strict schema** for the four required columns (missing column = load failure)
//! - **Row-level filtering** (drop bad rows silently, but count them)
//! - **Deterministic behavior** (fixed header aliases, fixed date formats, stable sort)
//! - **Separation of concerns**: no fitting or formatting here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::{DatasetStats, Observation, RawRow, RowDrop, Series};
use crate::error::DataError;

/// Canonical date column, followed by accepted aliases (first match wins).
const DATE_COLUMNS: [&str; 2] = ["date", "time"];
const DIFFICULTY_COLUMN: &str = "difflast";
const HASH_RATE_COLUMN: &str = "hashrate";
const BLOCK_COUNT_COLUMN: &str = "blkcnt";

/// Ingest output: the cleaned series plus what happened to the other rows.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub series: Series,
    pub stats: DatasetStats,
    pub dropped: Vec<RowDrop>,
}

/// Column positions of the required fields in the source header.
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    date: usize,
    difficulty: usize,
    hash_rate: usize,
    block_count: usize,
}

/// Load a CSV and clean it into a `Series`.
pub fn load_dataset(path: &Path) -> Result<IngestedData, DataError> {
    let rows = load_raw_rows(path)?;
    let ingest = prepare_with_report(&rows)?;
    info!(
        path = %path.display(),
        rows_read = ingest.stats.rows_read,
        rows_used = ingest.stats.rows_used,
        rows_dropped = ingest.stats.rows_dropped(),
        first_date = %ingest.stats.first_date,
        last_date = %ingest.stats.last_date,
        "loaded dataset"
    );
    Ok(ingest)
}

/// Read the raw rows of a CSV file.
///
/// Only the four required columns are extracted; any other column is ignored.
/// Unreadable files, unreadable records, and a missing required column are
/// load failures.
pub fn load_raw_rows(path: &Path) -> Result<Vec<RawRow>, DataError> {
    let file = File::open(path)
        .map_err(|e| DataError::load_failure(format!("failed to open '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| DataError::load_failure(format!("failed to read CSV headers: {e}")))?
        .clone();

    let columns = resolve_columns(&build_header_map(&headers))?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| DataError::load_failure(format!("malformed CSV record: {e}")))?;
        // Quoted fields may span lines, so take the line the record starts on.
        // The fallback counts records after the 1-based header line.
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);
        rows.push(raw_row(&record, columns, line));
    }

    Ok(rows)
}

/// Clean raw rows into a `Series`.
pub fn prepare(rows: &[RawRow]) -> Result<Series, DataError> {
    prepare_with_report(rows).map(|ingest| ingest.series)
}

/// Clean raw rows into a `Series`, keeping stats and the list of dropped rows.
///
/// Steps: parse each row (a row with any missing or invalid field is dropped),
/// stable-sort by date, then derive elapsed days from the earliest date.
pub fn prepare_with_report(rows: &[RawRow]) -> Result<IngestedData, DataError> {
    let mut observations = Vec::with_capacity(rows.len());
    let mut dropped = Vec::new();

    for row in rows {
        match parse_observation(row) {
            Ok(obs) => observations.push(obs),
            Err(reason) => {
                debug!(line = row.line, %reason, "dropping row");
                dropped.push(RowDrop {
                    line: row.line,
                    reason,
                });
            }
        }
    }

    if observations.is_empty() {
        return Err(DataError::EmptyAfterCleaning {
            rows_read: rows.len(),
        });
    }

    // `sort_by_key` is stable: same-date rows keep their input order.
    observations.sort_by_key(|o| o.date);

    let series = Series::from_sorted(observations)?;
    let stats = compute_stats(&series, rows.len());

    Ok(IngestedData {
        series,
        stats,
        dropped,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // Keep the first occurrence if a header is duplicated.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim_start_matches('\u{feff}').trim();
    name.to_ascii_lowercase()
}

fn resolve_columns(header_map: &HashMap<String, usize>) -> Result<ColumnMap, DataError> {
    let date = DATE_COLUMNS
        .iter()
        .find_map(|name| header_map.get(*name).copied())
        .ok_or_else(|| DataError::load_failure("missing required column: `Date`"))?;

    let required = |name: &str, label: &str| {
        header_map
            .get(name)
            .copied()
            .ok_or_else(|| DataError::load_failure(format!("missing required column: `{label}`")))
    };

    Ok(ColumnMap {
        date,
        difficulty: required(DIFFICULTY_COLUMN, "DiffLast")?,
        hash_rate: required(HASH_RATE_COLUMN, "HashRate")?,
        block_count: required(BLOCK_COUNT_COLUMN, "BlkCnt")?,
    })
}

fn raw_row(record: &StringRecord, columns: ColumnMap, line: usize) -> RawRow {
    let cell = |idx: usize| {
        record
            .get(idx)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    RawRow {
        line,
        date: cell(columns.date),
        difficulty: cell(columns.difficulty),
        hash_rate: cell(columns.hash_rate),
        block_count: cell(columns.block_count),
    }
}

fn parse_observation(row: &RawRow) -> Result<Observation, String> {
    let date = row
        .date
        .as_deref()
        .and_then(parse_date)
        .ok_or_else(|| "missing or unparseable `date`".to_string())?;
    let difficulty = row
        .difficulty
        .as_deref()
        .and_then(parse_positive_f64)
        .ok_or_else(|| "missing or invalid `DiffLast`".to_string())?;
    let hash_rate = row
        .hash_rate
        .as_deref()
        .and_then(parse_positive_f64)
        .ok_or_else(|| "missing or invalid `HashRate`".to_string())?;
    let block_count = row
        .block_count
        .as_deref()
        .and_then(parse_block_count)
        .ok_or_else(|| "missing or invalid `BlkCnt`".to_string())?;

    Ok(Observation {
        date,
        difficulty,
        hash_rate,
        block_count,
    })
}

/// Parse a calendar date; `None` means "missing" for that row.
///
/// A small fixed set of formats keeps parsing deterministic. Slash and dash
/// dates without a leading year are month-first. Four-digit-year formats must
/// yield a year >= 1000, because chrono's `%Y` also accepts one or two digits
/// (`12/01/21` would otherwise become year 12); two-digit years go through
/// `%y` instead. Date-times are accepted and truncated to their date.
fn parse_date(s: &str) -> Option<NaiveDate> {
    const DATE_FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y"];
    const SHORT_YEAR_FMTS: [&str; 2] = ["%m/%d/%y", "%m-%d-%y"];
    const DATETIME_FMTS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];
    const MIN_FULL_YEAR: i32 = 1000;

    let s = s.trim();
    let full_year = |d: &NaiveDate| d.year() >= MIN_FULL_YEAR;

    for fmt in DATE_FMTS {
        if let Some(d) = NaiveDate::parse_from_str(s, fmt).ok().filter(full_year) {
            return Some(d);
        }
    }
    for fmt in SHORT_YEAR_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FMTS {
        if let Some(d) = NaiveDateTime::parse_from_str(s, fmt).ok().map(|dt| dt.date()).filter(full_year) {
            return Some(d);
        }
    }
    None
}

fn parse_positive_f64(s: &str) -> Option<f64> {
    let v = s.trim().parse::<f64>().ok()?;
    (v.is_finite() && v > 0.0).then_some(v)
}

fn parse_block_count(s: &str) -> Option<u64> {
    let s = s.trim();
    if let Ok(v) = s.parse::<u64>() {
        return Some(v);
    }
    // Spreadsheet exports frequently write integer columns as `144.0`.
    let v = s.parse::<f64>().ok()?;
    (v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64).then_some(v as u64)
}

fn compute_stats(series: &Series, rows_read: usize) -> DatasetStats {
    let mut difficulty_min = f64::INFINITY;
    let mut difficulty_max = f64::NEG_INFINITY;
    let mut hash_rate_min = f64::INFINITY;
    let mut hash_rate_max = f64::NEG_INFINITY;

    for o in series.observations() {
        difficulty_min = difficulty_min.min(o.difficulty);
        difficulty_max = difficulty_max.max(o.difficulty);
        hash_rate_min = hash_rate_min.min(o.hash_rate);
        hash_rate_max = hash_rate_max.max(o.hash_rate);
    }

    DatasetStats {
        rows_read,
        rows_used: series.len(),
        first_date: series.first().date,
        last_date: series.last().date,
        difficulty_min,
        difficulty_max,
        hash_rate_min,
        hash_rate_max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn row(line: usize, date: &str, diff: &str, hr: &str, blk: &str) -> RawRow {
        RawRow::from_cells(line, date, diff, hr, blk)
    }

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn prepare_keeps_only_complete_rows() {
        let rows = vec![
            row(2, "2024-01-01", "100", "10", "144"),
            row(3, "not a date", "100", "10", "144"),
            row(4, "2024-01-02", "", "10", "144"),
            row(5, "2024-01-03", "100", "", "144"),
            row(6, "2024-01-04", "100", "10", ""),
            row(7, "2024-01-05", "nan", "10", "144"),
            row(8, "2024-01-06", "110", "11", "143"),
        ];

        let ingest = prepare_with_report(&rows).unwrap();
        assert_eq!(ingest.series.len(), 2);
        assert_eq!(ingest.stats.rows_read, 7);
        assert_eq!(ingest.stats.rows_dropped(), 5);
        let lines: Vec<usize> = ingest.dropped.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn prepare_rejects_out_of_domain_values() {
        let rows = vec![
            row(2, "2024-01-01", "0", "10", "144"),
            row(3, "2024-01-02", "100", "-1", "144"),
            row(4, "2024-01-03", "100", "10", "-3"),
            row(5, "2024-01-04", "100", "10", "1.5"),
            row(6, "2024-01-05", "100", "10", "144.0"),
        ];

        let series = prepare(&rows).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.first().block_count, 144);
    }

    #[test]
    fn prepare_sorts_by_date_and_keeps_tie_order() {
        let rows = vec![
            row(2, "2024-01-10", "3", "1", "1"),
            row(3, "2024-01-01", "1", "1", "1"),
            row(4, "2024-01-10", "4", "1", "1"),
            row(5, "2024-01-05", "2", "1", "1"),
        ];

        let series = prepare(&rows).unwrap();
        let diffs: Vec<f64> = series.observations().iter().map(|o| o.difficulty).collect();
        assert_eq!(diffs, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(series.elapsed_days(), &[0, 4, 9, 9]);
        assert!(series.elapsed_days().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn prepare_is_idempotent() {
        let rows = vec![
            row(2, "2024-02-01", "200", "20", "144"),
            row(3, "2024-01-01", "100", "10", "144"),
        ];
        assert_eq!(prepare(&rows).unwrap(), prepare(&rows).unwrap());
    }

    #[test]
    fn prepare_reports_empty_after_cleaning() {
        let rows = vec![row(2, "garbage", "1", "1", "1"), row(3, "", "", "", "")];
        assert_eq!(
            prepare(&rows).unwrap_err(),
            DataError::EmptyAfterCleaning { rows_read: 2 }
        );
        assert_eq!(
            prepare(&[]).unwrap_err(),
            DataError::EmptyAfterCleaning { rows_read: 0 }
        );
    }

    #[test]
    fn parse_date_accepts_known_formats() {
        assert_eq!(parse_date("2021-03-04"), Some(ymd(2021, 3, 4)));
        assert_eq!(parse_date("2021/03/04"), Some(ymd(2021, 3, 4)));
        assert_eq!(parse_date("03/04/2021"), Some(ymd(2021, 3, 4)));
        assert_eq!(parse_date("03-04-2021"), Some(ymd(2021, 3, 4)));
        assert_eq!(parse_date("2021-03-04T00:00:00Z"), Some(ymd(2021, 3, 4)));
        assert_eq!(parse_date("2021-03-04 12:30:00"), Some(ymd(2021, 3, 4)));
        assert_eq!(parse_date("2021-02-30"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn parse_date_reads_slash_dates_month_first() {
        assert_eq!(parse_date("04/03/2021"), Some(ymd(2021, 4, 3)));
        assert_eq!(parse_date("03/25/2021"), Some(ymd(2021, 3, 25)));
        assert_eq!(parse_date("25/03/2021"), None);
    }

    #[test]
    fn parse_date_never_yields_short_years() {
        assert_eq!(parse_date("12/01/21"), Some(ymd(2021, 12, 1)));
        assert_eq!(parse_date("01-02-21"), Some(ymd(2021, 1, 2)));
        assert_eq!(parse_date("21/1/1"), None);
        assert_eq!(parse_date("0021-01-01"), None);
    }

    #[test]
    fn short_year_rows_do_not_shift_the_time_axis() {
        let series = prepare(&[
            row(2, "2021-01-01", "100", "10", "144"),
            row(3, "12/01/21", "200", "20", "144"),
        ])
        .unwrap();
        assert_eq!(series.first().date, ymd(2021, 1, 1));
        assert_eq!(series.last().date, ymd(2021, 12, 1));
        assert_eq!(series.elapsed_days(), &[0, 334]);
    }

    #[test]
    fn row_lines_follow_multiline_quoted_fields() {
        let file = write_csv(
            "Date,DiffLast,HashRate,BlkCnt,Note\n\
             2024-01-01,1,1,1,\"first\nsecond\"\n\
             2024-01-02,bad,1,1,ok\n",
        );
        let rows = load_raw_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[1].line, 4);

        let ingest = prepare_with_report(&rows).unwrap();
        assert_eq!(ingest.dropped[0].line, 4);
    }

    #[test]
    fn load_dataset_normalizes_headers_and_ignores_extra_columns() {
        let file = write_csv(
            "\u{feff} Date ,PriceUSD,DiffLast,HashRate,BlkCnt\n\
             2024-01-03,42000,300,30,144\n\
             2024-01-01,41000,100,10,140\n\
             2024-01-02,,200,20,150\n",
        );

        let ingest = load_dataset(file.path()).unwrap();
        assert_eq!(ingest.series.len(), 3);
        assert_eq!(ingest.stats.first_date, ymd(2024, 1, 1));
        assert_eq!(ingest.stats.last_date, ymd(2024, 1, 3));
        assert_eq!(ingest.series.last().difficulty, 300.0);
        assert_eq!(ingest.stats.difficulty_min, 100.0);
        assert_eq!(ingest.stats.hash_rate_max, 30.0);
    }

    #[test]
    fn load_dataset_accepts_time_alias() {
        let file = write_csv("time,DiffLast,HashRate,BlkCnt\n2024-01-01T00:00:00Z,1,1,1\n");
        let ingest = load_dataset(file.path()).unwrap();
        assert_eq!(ingest.series.first().date, ymd(2024, 1, 1));
    }

    #[test]
    fn load_fails_on_missing_column_or_file() {
        let file = write_csv("Date,DiffLast,HashRate\n2024-01-01,1,1\n");
        let err = load_raw_rows(file.path()).unwrap_err();
        assert!(matches!(&err, DataError::LoadFailure { reason } if reason.contains("BlkCnt")));

        let err = load_raw_rows(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DataError::LoadFailure { .. }));
    }

    #[test]
    fn load_dataset_distinguishes_empty_content_from_bad_file() {
        let file = write_csv("Date,DiffLast,HashRate,BlkCnt\nbad,1,1,1\n2024-01-01,,1,1\n");
        assert_eq!(
            load_dataset(file.path()).unwrap_err(),
            DataError::EmptyAfterCleaning { rows_read: 2 }
        );
    }

    #[test]
    fn short_records_yield_missing_cells() {
        let file = write_csv("Date,DiffLast,HashRate,BlkCnt\n2024-01-01,5\n2024-01-02,6,7,8\n");
        let rows = load_raw_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].hash_rate, None);
        assert_eq!(rows[0].line, 2);
        assert_eq!(prepare(&rows).unwrap().len(), 1);
    }
}
