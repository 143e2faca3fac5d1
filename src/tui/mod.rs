//! Ratatui-based terminal UI.
//!
//! The dataset is loaded and fitted once; the TUI then lets the user move the
//! hash-rate factor slider and the manual hash-rate field, re-evaluating both
//! projections on every change.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph},
};
use tracing::{debug, info};

use crate::app::pipeline::Session;
use crate::domain::{
    FACTOR_PERCENT_MAX, Projection, ProjectionInputs, Projections, RunConfig, clamp_factor_percent,
};
use crate::error::AppError;
use crate::report::fmt_grouped;

mod plotters_chart;

use plotters_chart::DifficultyChart;

/// Slider step for Left/Right.
const FACTOR_STEP: i64 = 1;
/// Slider step for PageUp/PageDown.
const FACTOR_PAGE_STEP: i64 = 10;
/// Manual hash-rate step for Left/Right on that field.
const HASH_RATE_STEP: f64 = 100.0;

const FIELD_FACTOR: usize = 0;
const FIELD_HASH_RATE: usize = 1;

/// Start the TUI.
pub fn run(config: RunConfig) -> Result<(), AppError> {
    // Load before touching the terminal so load errors print normally.
    let session = Session::load(&config.data_path)?;
    let inputs = ProjectionInputs::resolve(session.series(), config.factor_percent, config.manual_hash_rate);
    info!(path = %config.data_path.display(), "starting tui");

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(1, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(session, inputs);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(1, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(1, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    session: Session,
    inputs: ProjectionInputs,
    projections: Projections,
    selected_field: usize,
    editing_hash_rate: bool,
    hash_rate_input: String,
    status: String,
}

impl App {
    fn new(session: Session, inputs: ProjectionInputs) -> Self {
        let projections = session.evaluate(inputs);
        let status = format!("Loaded {}", session.source().display());
        Self {
            session,
            inputs,
            projections,
            selected_field: FIELD_FACTOR,
            editing_hash_rate: false,
            hash_rate_input: String::new(),
            status,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(1, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(1, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(1, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_hash_rate {
            self.handle_hash_rate_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.selected_field = FIELD_FACTOR,
            KeyCode::Down => self.selected_field = FIELD_HASH_RATE,
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::PageDown => self.set_inputs(ProjectionInputs {
                factor_percent: step_factor(self.inputs.factor_percent, -FACTOR_PAGE_STEP),
                ..self.inputs
            }),
            KeyCode::PageUp => self.set_inputs(ProjectionInputs {
                factor_percent: step_factor(self.inputs.factor_percent, FACTOR_PAGE_STEP),
                ..self.inputs
            }),
            KeyCode::Enter => {
                if self.selected_field == FIELD_HASH_RATE {
                    self.editing_hash_rate = true;
                    self.hash_rate_input = format!("{}", self.inputs.manual_hash_rate);
                    self.status = "Editing hash rate. Enter to apply, Esc to cancel.".to_string();
                }
            }
            KeyCode::Char('r') => {
                self.set_inputs(self.session.default_inputs());
                self.status = "Inputs reset.".to_string();
            }
            _ => {}
        }

        false
    }

    fn handle_hash_rate_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_hash_rate = false;
                self.status = "Hash-rate edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_hash_rate = false;
                match parse_hash_rate_input(&self.hash_rate_input) {
                    Some(v) => {
                        self.set_inputs(ProjectionInputs {
                            manual_hash_rate: v,
                            ..self.inputs
                        });
                        self.status = format!("hash rate: {}", fmt_grouped(v, 2));
                    }
                    None => {
                        self.status = format!("Invalid hash rate '{}'", self.hash_rate_input.trim());
                    }
                }
            }
            KeyCode::Backspace => {
                self.hash_rate_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '.' || c == '-' {
                    self.hash_rate_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn adjust_field(&mut self, direction: i64) {
        let next = match self.selected_field {
            FIELD_FACTOR => ProjectionInputs {
                factor_percent: step_factor(self.inputs.factor_percent, direction * FACTOR_STEP),
                ..self.inputs
            },
            FIELD_HASH_RATE => ProjectionInputs {
                manual_hash_rate: step_hash_rate(self.inputs.manual_hash_rate, direction as f64 * HASH_RATE_STEP),
                ..self.inputs
            },
            _ => return,
        };
        self.set_inputs(next);
    }

    fn set_inputs(&mut self, inputs: ProjectionInputs) {
        if inputs == self.inputs {
            return;
        }
        self.inputs = inputs;
        self.projections = self.session.evaluate(inputs);
        debug!(
            factor_percent = inputs.factor_percent,
            manual_hash_rate = inputs.manual_hash_rate,
            "re-evaluated projections"
        );
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let stats = self.session.stats();
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("diffcast", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" | {}", self.session.source().display())),
        ]));
        lines.push(Line::from(Span::styled(
            format!(
                "rows: {} used / {} read | {} .. {}",
                stats.rows_used, stats.rows_read, stats.first_date, stats.last_date
            ),
            Style::default().fg(Color::Gray),
        )));

        let trend = match self.session.model() {
            Ok(model) => format!(
                "trend: slope={} per day | intercept={}",
                fmt_grouped(model.slope, 4),
                fmt_grouped(model.intercept, 2)
            ),
            Err(err) => format!("trend unavailable: {err}"),
        };
        lines.push(Line::from(Span::styled(trend, Style::default().fg(Color::Gray))));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(6), Constraint::Length(5)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_inputs(frame, chunks[1]);
        self.draw_projections(frame, chunks[2]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Difficulty (actual vs. trend)").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let data = chart_series(&self.session, &self.projections);
        let widget = DifficultyChart {
            trend: &data.trend,
            actual: &data.actual,
            projected: &data.projected,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            fmt_x: fmt_axis_days,
            fmt_y: fmt_axis_difficulty,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_inputs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Inputs").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        let highlight = Style::default().fg(Color::Black).bg(Color::White);
        let normal = Style::default();

        let factor_label = format!("» Hash-rate increase: {}%", self.inputs.factor_percent);
        let factor_style = if self.selected_field == FIELD_FACTOR { highlight } else { normal };
        frame.render_widget(Paragraph::new(factor_label).style(factor_style), rows[0]);

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio(slider_ratio(self.inputs.factor_percent))
            .label(format!("{}% of {}%", self.inputs.factor_percent, FACTOR_PERCENT_MAX));
        frame.render_widget(gauge, rows[1]);

        let hash_rate_label = if self.editing_hash_rate {
            format!("» Manual hash rate: {}_", self.hash_rate_input)
        } else {
            format!("» Manual hash rate: {}", fmt_grouped(self.inputs.manual_hash_rate, 2))
        };
        let hash_rate_style = if self.editing_hash_rate {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else if self.selected_field == FIELD_HASH_RATE {
            highlight
        } else {
            normal
        };
        frame.render_widget(Paragraph::new(hash_rate_label).style(hash_rate_style), rows[2]);
    }

    fn draw_projections(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut items = Vec::new();
        items.push(ListItem::new(format!(
            "If the hashrate increases by {}%, the predicted difficulty would be: {}",
            self.projections.inputs.factor_percent,
            fmt_grouped(self.projections.by_factor, 2)
        )));
        match self.projections.by_hash_rate {
            Projection::Value(v) => items.push(ListItem::new(format!(
                "Based on custom HashRate = {}, projected difficulty is: {}",
                fmt_grouped(self.projections.inputs.manual_hash_rate, 2),
                fmt_grouped(v, 2)
            ))),
            Projection::Skipped => items.push(
                ListItem::new("Manual hash rate must be positive; projection skipped.")
                    .style(Style::default().fg(Color::DarkGray)),
            ),
        }

        let list = List::new(items).block(Block::default().title("What-if").borders(Borders::ALL));
        frame.render_widget(list, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  PgUp/PgDn ±10%  Enter edit hash rate  r reset  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Move the factor slider, staying inside its range.
fn step_factor(percent: u16, delta: i64) -> u16 {
    clamp_factor_percent(i64::from(percent) + delta)
}

/// Step the manual hash rate; arrow keys never take it below zero.
fn step_hash_rate(value: f64, delta: f64) -> f64 {
    (value + delta).max(0.0)
}

/// Parse the edited hash-rate text. Zero and negatives are accepted; the
/// engine skips that projection.
fn parse_hash_rate_input(input: &str) -> Option<f64> {
    input.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn slider_ratio(percent: u16) -> f64 {
    (f64::from(percent) / f64::from(FACTOR_PERCENT_MAX)).clamp(0.0, 1.0)
}

struct ChartData {
    trend: Vec<(f64, f64)>,
    actual: Vec<(f64, f64)>,
    projected: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

/// Build chart series for Plotters.
fn chart_series(session: &Session, projections: &Projections) -> ChartData {
    let actual: Vec<(f64, f64)> = session
        .series()
        .points()
        .map(|(x, obs)| (x as f64, obs.difficulty))
        .collect();
    let trend: Vec<(f64, f64)> = session
        .fitted()
        .iter()
        .map(|p| (p.elapsed_days as f64, p.fitted))
        .collect();

    let last_x = actual.last().map(|&(x, _)| x).unwrap_or(0.0);
    let mut projected = vec![(last_x, projections.by_factor)];
    if let Some(v) = projections.by_hash_rate.value() {
        projected.push((last_x, v));
    }

    let mut x_bounds = [0.0, last_x];
    if x_bounds[1] <= x_bounds[0] {
        x_bounds = [x_bounds[0] - 0.5, x_bounds[0] + 0.5];
    }

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in actual.iter().chain(&trend).chain(&projected) {
        if y.is_finite() {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(y_max.abs() * 0.01).max(1e-12);
    let y_bounds = [y_min - pad, y_max + pad];

    ChartData {
        trend,
        actual,
        projected,
        x_bounds,
        y_bounds,
    }
}

fn fmt_axis_days(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_difficulty(v: f64) -> String {
    let abs = v.abs();
    if abs >= 1e12 {
        format!("{:.1}T", v / 1e12)
    } else if abs >= 1e9 {
        format!("{:.1}G", v / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}k", v / 1e3)
    } else {
        format!("{v:.1}")
    }
}
