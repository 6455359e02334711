//! ASCII plotting for terminal output.
//!
//! Fixed-size log-log grid, optimized for:
//! - quick visual sanity checks of a fit in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed points: `o`
//! - fitted curve: `-` line
//!
//! Points with non-positive `x` or `y` cannot be placed on log axes and are
//! left out.

use crate::domain::FitResult;
use crate::math::log_space;
use crate::models::predict;

/// Render observed points and the fitted curve on log-log axes.
pub fn render_ascii_plot(result: &FitResult, width: usize, height: usize) -> String {
    let data = result.original_data();
    let points: Vec<(f64, f64)> = data
        .x
        .iter()
        .zip(&data.y)
        .filter(|(x, y)| x.is_finite() && y.is_finite() && **x > 0.0 && **y > 0.0)
        .map(|(&x, &y)| (x.log10(), y.log10()))
        .collect();

    let mut canvas = Canvas::new(width.max(10), height.max(5));
    let x_axis = Axis::spanning(points.iter().map(|p| p.0), 0.0);
    let curve = sample_curve(result, x_axis, canvas.width);
    let y_axis = Axis::spanning(points.iter().chain(&curve).map(|p| p.1), 0.05);

    let mut prev: Option<(usize, usize)> = None;
    for &(lx, ly) in &curve {
        let cell = (x_axis.column(lx, canvas.width), y_axis.row(ly, canvas.height));
        canvas.line(prev.unwrap_or(cell), cell, '-');
        prev = Some(cell);
    }
    for &(lx, ly) in &points {
        canvas.put(x_axis.column(lx, canvas.width), y_axis.row(ly, canvas.height), 'o');
    }

    let mut out = format!(
        "Plot (log-log): {} | x=[{:.3e}, {:.3e}] | y=[{:.3e}, {:.3e}]\n",
        result.model().display_name(),
        10f64.powf(x_axis.lo),
        10f64.powf(x_axis.hi),
        10f64.powf(y_axis.lo),
        10f64.powf(y_axis.hi),
    );
    canvas.render_into(&mut out);
    out
}

/// Fitted curve in log10 coordinates, `n` samples evenly spaced in `log10 x`.
fn sample_curve(result: &FitResult, axis: Axis, n: usize) -> Vec<(f64, f64)> {
    let xs = log_space(10f64.powf(axis.lo), 10f64.powf(axis.hi), n.max(2)).unwrap_or_default();
    xs.into_iter()
        .filter_map(|x| {
            let y = predict(result.model(), x, result.optimized_parameters()).ok()?;
            (y > 0.0 && y.is_finite()).then(|| (x.log10(), y.log10()))
        })
        .collect()
}

/// A log10 axis range.
#[derive(Debug, Clone, Copy)]
struct Axis {
    lo: f64,
    hi: f64,
}

impl Axis {
    /// Range of `values` widened by `pad` of its span; `[-1, 1]` when degenerate.
    fn spanning(values: impl Iterator<Item = f64>, pad: f64) -> Self {
        let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if !(lo.is_finite() && hi.is_finite() && hi > lo) {
            return Axis { lo: -1.0, hi: 1.0 };
        }
        let margin = (hi - lo) * pad;
        Axis {
            lo: lo - margin,
            hi: hi + margin,
        }
    }

    fn fraction(self, v: f64) -> f64 {
        ((v - self.lo) / (self.hi - self.lo)).clamp(0.0, 1.0)
    }

    fn column(self, v: f64, width: usize) -> usize {
        (self.fraction(v) * (width - 1) as f64).round() as usize
    }

    /// Row 0 is the top of the plot.
    fn row(self, v: f64, height: usize) -> usize {
        ((1.0 - self.fraction(v)) * (height - 1) as f64).round() as usize
    }
}

struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<char>,
}

impl Canvas {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![' '; width * height],
        }
    }

    fn put(&mut self, col: usize, row: usize, ch: char) {
        if col < self.width && row < self.height {
            self.cells[row * self.width + col] = ch;
        }
    }

    /// Straight segment between two cells; never overwrites a non-blank cell.
    fn line(&mut self, from: (usize, usize), to: (usize, usize), ch: char) {
        let (c0, r0) = (from.0 as f64, from.1 as f64);
        let (dc, dr) = (to.0 as f64 - c0, to.1 as f64 - r0);
        let steps = dc.abs().max(dr.abs()).max(1.0) as usize;
        for k in 0..=steps {
            let t = k as f64 / steps as f64;
            let col = (c0 + t * dc).round() as usize;
            let row = (r0 + t * dr).round() as usize;
            if col < self.width && row < self.height && self.cells[row * self.width + col] == ' ' {
                self.cells[row * self.width + col] = ch;
            }
        }
    }

    fn render_into(&self, out: &mut String) {
        for row in self.cells.chunks(self.width) {
            out.extend(row.iter());
            out.push('\n');
        }
    }
}
