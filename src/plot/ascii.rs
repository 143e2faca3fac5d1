//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed points: `o`
//! - fitted trend: `-` line

use crate::domain::{FittedPoint, ForecastFile, Series};

/// Difficulty over time (x = days since first observation), with the fitted
/// trend overlaid when one is available.
pub fn render_difficulty_plot(series: &Series, fitted: &[FittedPoint], width: usize, height: usize) -> String {
    let points: Vec<(f64, f64)> = series
        .points()
        .map(|(d, o)| (d as f64, o.difficulty))
        .collect();
    let curve: Vec<(f64, f64)> = fitted
        .iter()
        .map(|p| (p.elapsed_days as f64, p.fitted))
        .collect();
    let curve = (!curve.is_empty()).then_some(curve.as_slice());

    render_plot(&points, curve, "days", "difficulty", width, height)
}

/// Hash rate (x) vs. difficulty (y) scatter.
pub fn render_scatter_plot(series: &Series, width: usize, height: usize) -> String {
    let points: Vec<(f64, f64)> = series
        .observations()
        .iter()
        .map(|o| (o.hash_rate, o.difficulty))
        .collect();

    render_plot(&points, None, "hashrate", "difficulty", width, height)
}

/// Actual vs. fitted difficulty from a saved forecast file.
pub fn render_forecast_file_plot(file: &ForecastFile, width: usize, height: usize) -> String {
    let points: Vec<(f64, f64)> = file
        .fitted
        .iter()
        .map(|p| (p.elapsed_days as f64, p.actual))
        .collect();
    let curve: Vec<(f64, f64)> = file
        .fitted
        .iter()
        .map(|p| (p.elapsed_days as f64, p.fitted))
        .collect();

    render_plot(&points, Some(&curve), "days", "difficulty", width, height)
}

fn render_plot(
    points: &[(f64, f64)],
    curve: Option<&[(f64, f64)]>,
    x_label: &str,
    y_label: &str,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = x_range(points, curve).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = y_range(points, curve).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw curve first (so points can overlay).
    if let Some(curve) = curve {
        draw_curve(&mut grid, curve, x_min, x_max, y_min, y_max);
    }

    for &(x, y) in points {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: x=[{x_min:.2}, {x_max:.2}] {x_label} | y=[{y_min:.2}, {y_max:.2}] {y_label}\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn x_range(points: &[(f64, f64)], curve: Option<&[(f64, f64)]>) -> Option<(f64, f64)> {
    let xs = points
        .iter()
        .chain(curve.unwrap_or(&[]).iter())
        .map(|&(x, _)| x);
    let (min_x, max_x) = min_max(xs)?;
    if max_x > min_x {
        Some((min_x, max_x))
    } else {
        // A single date (or a single hash-rate value) still gets a usable axis.
        Some((min_x - 1.0, max_x + 1.0))
    }
}

fn y_range(points: &[(f64, f64)], curve: Option<&[(f64, f64)]>) -> Option<(f64, f64)> {
    let ys = points
        .iter()
        .chain(curve.unwrap_or(&[]).iter())
        .map(|&(_, y)| y);
    let (min_y, max_y) = min_max(ys)?;
    if max_y > min_y {
        Some((min_y, max_y))
    } else {
        let half = (min_y.abs() * 0.5).max(1.0);
        Some((min_y - half, max_y + half))
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    (min.is_finite() && max.is_finite()).then_some((min, max))
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawRow;
    use crate::forecast::{fit, fitted_curve};
    use crate::io::ingest::prepare;

    #[test]
    fn plot_golden_snapshot_small() {
        let series = prepare(&[
            RawRow::from_cells(2, "2024-01-01", "100", "5", "144"),
            RawRow::from_cells(3, "2024-01-11", "110", "6", "144"),
        ])
        .unwrap();
        let model = fit(&series).unwrap();
        let fitted = fitted_curve(&series, &model);

        let txt = render_difficulty_plot(&series, &fitted, 10, 5);
        let expected = concat!(
            "Plot: x=[0.00, 10.00] days | y=[99.50, 110.50] difficulty\n",
            "        -o\n",
            "      --  \n",
            "    --    \n",
            "  --      \n",
            "o-        \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn scatter_plot_marks_every_distinct_point() {
        let series = prepare(&[
            RawRow::from_cells(2, "2024-01-01", "100", "1", "144"),
            RawRow::from_cells(3, "2024-01-02", "200", "2", "144"),
            RawRow::from_cells(4, "2024-01-03", "300", "3", "144"),
        ])
        .unwrap();
        let txt = render_scatter_plot(&series, 20, 8);
        assert!(txt.starts_with("Plot: x=[1.00, 3.00] hashrate"));
        assert_eq!(txt.lines().count(), 9);
        let marks: usize = txt.lines().skip(1).map(|l| l.matches('o').count()).sum();
        assert_eq!(marks, 3);
    }

    #[test]
    fn single_observation_plot_does_not_panic() {
        let series = prepare(&[RawRow::from_cells(2, "2024-01-01", "100", "1", "144")]).unwrap();
        let txt = render_difficulty_plot(&series, &[], 10, 5);
        let marks: usize = txt.lines().skip(1).map(|l| l.matches('o').count()).sum();
        assert_eq!(marks, 1);
    }
}
