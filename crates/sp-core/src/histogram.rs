//! Owned histogram value type with binned arithmetic.

use crate::error::{Error, Result};

/// Relative tolerance used when comparing bin edges of two histograms.
const EDGE_TOLERANCE: f64 = 1e-9;

/// A 1D binned distribution with per-bin statistical errors.
///
/// Edges are strictly increasing; `bin_content` and `bin_error` have one
/// entry per bin. Derived operations (`add`, `scale`) mutate in place and
/// never alias storage: cloning always yields an independent histogram.
#[derive(Debug, Clone)]
pub struct Histogram {
    /// Histogram name (the identifier it was fetched under).
    pub name: String,
    /// Bin edges (length = number of bins + 1), strictly increasing.
    pub bin_edges: Vec<f64>,
    /// Bin contents (length = number of bins).
    pub bin_content: Vec<f64>,
    /// Per-bin errors, elementwise >= 0 (length = number of bins).
    pub bin_error: Vec<f64>,
    /// X-axis title.
    pub x_title: String,
    /// Y-axis title.
    pub y_title: String,
    /// Visible x-range window, if restricted.
    pub x_window: Option<(f64, f64)>,
    /// Visible y-range window, if restricted.
    pub y_window: Option<(f64, f64)>,
}

impl Histogram {
    /// Build a histogram from explicit edges, contents, and errors.
    ///
    /// Validates edge monotonicity, array lengths, and non-negative finite
    /// errors.
    pub fn new(
        name: impl Into<String>,
        bin_edges: Vec<f64>,
        bin_content: Vec<f64>,
        bin_error: Vec<f64>,
    ) -> Result<Self> {
        let name = name.into();
        if bin_edges.len() < 2 {
            return Err(Error::Validation(format!(
                "histogram '{name}': need at least 2 bin edges, got {}",
                bin_edges.len()
            )));
        }
        for w in bin_edges.windows(2) {
            if !(w[1] > w[0]) || !w[0].is_finite() || !w[1].is_finite() {
                return Err(Error::Validation(format!(
                    "histogram '{name}': bin edges must be finite and strictly increasing"
                )));
            }
        }
        let n = bin_edges.len() - 1;
        if bin_content.len() != n {
            return Err(Error::Validation(format!(
                "histogram '{name}': expected {n} bin contents, got {}",
                bin_content.len()
            )));
        }
        if bin_error.len() != n {
            return Err(Error::Validation(format!(
                "histogram '{name}': expected {n} bin errors, got {}",
                bin_error.len()
            )));
        }
        if bin_content.iter().any(|c| !c.is_finite()) {
            return Err(Error::Validation(format!(
                "histogram '{name}': bin contents must be finite"
            )));
        }
        if bin_error.iter().any(|e| !e.is_finite() || *e < 0.0) {
            return Err(Error::Validation(format!(
                "histogram '{name}': bin errors must be finite and >= 0"
            )));
        }
        Ok(Self {
            name,
            bin_edges,
            bin_content,
            bin_error,
            x_title: String::new(),
            y_title: String::new(),
            x_window: None,
            y_window: None,
        })
    }

    /// Build a histogram with `n_bins` equal-width bins over `[x_min, x_max)`.
    pub fn uniform(
        name: impl Into<String>,
        n_bins: usize,
        x_min: f64,
        x_max: f64,
        bin_content: Vec<f64>,
        bin_error: Vec<f64>,
    ) -> Result<Self> {
        let name = name.into();
        if n_bins == 0 {
            return Err(Error::Validation(format!(
                "histogram '{name}': need at least 1 bin"
            )));
        }
        if !(x_max > x_min) {
            return Err(Error::Validation(format!(
                "histogram '{name}': x_max must be greater than x_min"
            )));
        }
        let width = (x_max - x_min) / n_bins as f64;
        let bin_edges: Vec<f64> = (0..=n_bins).map(|i| x_min + i as f64 * width).collect();
        Self::new(name, bin_edges, bin_content, bin_error)
    }

    /// Number of bins.
    pub fn n_bins(&self) -> usize {
        self.bin_edges.len() - 1
    }

    /// Lower edge of the first bin.
    pub fn x_min(&self) -> f64 {
        self.bin_edges[0]
    }

    /// Upper edge of the last bin.
    pub fn x_max(&self) -> f64 {
        self.bin_edges[self.bin_edges.len() - 1]
    }

    /// Width of bin `i`.
    pub fn bin_width(&self, i: usize) -> f64 {
        self.bin_edges[i + 1] - self.bin_edges[i]
    }

    /// Center of bin `i`.
    pub fn bin_center(&self, i: usize) -> f64 {
        0.5 * (self.bin_edges[i] + self.bin_edges[i + 1])
    }

    /// Narrowest bin width.
    pub fn min_bin_width(&self) -> f64 {
        (0..self.n_bins())
            .map(|i| self.bin_width(i))
            .fold(f64::INFINITY, f64::min)
    }

    /// True when all bins share one width (within edge tolerance).
    pub fn is_uniform_binning(&self) -> bool {
        let w0 = self.bin_width(0);
        (1..self.n_bins()).all(|i| (self.bin_width(i) - w0).abs() <= EDGE_TOLERANCE * w0.abs().max(1.0))
    }

    /// Binary-search the bin containing `x` (bins are `[lo, hi)`).
    pub fn find_bin(&self, x: f64) -> Option<usize> {
        if !x.is_finite() || x < self.x_min() || x >= self.x_max() {
            return None;
        }
        // partition_point returns the first edge > x; the bin is one left.
        let idx = self.bin_edges.partition_point(|e| *e <= x);
        Some(idx - 1)
    }

    /// True when `other` has the same binning within tolerance.
    pub fn same_binning(&self, other: &Histogram) -> bool {
        self.bin_edges.len() == other.bin_edges.len()
            && self
                .bin_edges
                .iter()
                .zip(&other.bin_edges)
                .all(|(a, b)| (a - b).abs() <= EDGE_TOLERANCE * a.abs().max(b.abs()).max(1.0))
    }

    /// Add `other` bin-wise: contents sum, errors combine in quadrature.
    pub fn add(&mut self, other: &Histogram) -> Result<()> {
        if !self.same_binning(other) {
            return Err(Error::Validation(format!(
                "mismatched binning: '{}' ({} bins) vs '{}' ({} bins)",
                self.name,
                self.n_bins(),
                other.name,
                other.n_bins()
            )));
        }
        for i in 0..self.n_bins() {
            self.bin_content[i] += other.bin_content[i];
            self.bin_error[i] = self.bin_error[i].hypot(other.bin_error[i]);
        }
        Ok(())
    }

    /// Scale every bin content and error by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for c in &mut self.bin_content {
            *c *= factor;
        }
        for e in &mut self.bin_error {
            *e *= factor.abs();
        }
    }

    /// Indices of the bins inside the visible x-window (all bins when no
    /// window is set). A bin is visible when its center lies in the window.
    pub fn visible_bins(&self) -> std::ops::Range<usize> {
        match self.x_window {
            None => 0..self.n_bins(),
            Some((lo, hi)) => {
                let first = (0..self.n_bins())
                    .find(|&i| self.bin_center(i) >= lo)
                    .unwrap_or(self.n_bins());
                let last = (first..self.n_bins())
                    .take_while(|&i| self.bin_center(i) <= hi)
                    .last()
                    .map(|i| i + 1)
                    .unwrap_or(first);
                first..last
            }
        }
    }

    /// Sum of bin contents over the visible range.
    pub fn integral(&self) -> f64 {
        self.visible_bins().map(|i| self.bin_content[i]).sum()
    }

    /// Largest bin content over the visible range.
    pub fn max_content(&self) -> f64 {
        self.visible_bins()
            .map(|i| self.bin_content[i])
            .fold(f64::NEG_INFINITY, f64::max)
    }
}
