//! Plotters-powered difficulty chart widget for Ratatui.
//!
//! Plotters gives us axis + mesh rendering and tick labels for free; the
//! output is drawn into the Ratatui buffer by `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A render-only chart description.
///
/// All series and bounds are computed outside the render call (see
/// `chart_series` in the parent module) so the data prep can be tested
/// without a terminal.
pub struct DifficultyChart<'a> {
    /// Fitted trend as a line over elapsed days.
    pub trend: &'a [(f64, f64)],
    /// Observed difficulty per elapsed day.
    pub actual: &'a [(f64, f64)],
    /// What-if projections, drawn at the last observed day.
    pub projected: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for DifficultyChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters cannot lay out a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Mesh lines are noise at terminal resolution.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("days since first observation")
                .y_desc("difficulty")
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let trend_color = RGBColor(0, 255, 255); // cyan
            let actual_color = WHITE;
            let projected_color = RGBColor(0, 255, 0); // green

            chart.draw_series(LineSeries::new(self.trend.iter().copied(), &trend_color))?;

            chart.draw_series(
                self.actual
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), actual_color)),
            )?;

            // `Circle` radii are mis-scaled by the ratatui backend; pixels render cleanly.
            chart.draw_series(
                self.projected
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), projected_color)),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
