//! In-place histogram transforms: cumulative tails, rebinning, bin-width
//! normalization.

use sp_core::{Error, Histogram, Result};

/// Replace each bin except the last with the integral from that bin through
/// the end of the histogram, errors propagated in quadrature over the summed
/// bins.
///
/// The final bin keeps its original content and error. Applying the
/// transform twice does not reproduce a single application.
pub fn cumulative(hist: &mut Histogram) {
    let n = hist.n_bins();
    if n < 2 {
        return;
    }
    let mut content = hist.bin_content.clone();
    let mut error = hist.bin_error.clone();
    for i in 0..n - 1 {
        content[i] = hist.bin_content[i..n].iter().sum();
        error[i] = hist.bin_error[i..n].iter().map(|e| e * e).sum::<f64>().sqrt();
    }
    hist.bin_content = content;
    hist.bin_error = error;
}

/// Merge `factor` adjacent bins into one: contents sum, errors combine in
/// quadrature.
///
/// When the bin count is not evenly divisible, the trailing partial group
/// becomes one final, narrower bin, so the total yield is conserved.
pub fn rebin_factor(hist: &mut Histogram, factor: usize) -> Result<()> {
    if factor == 0 {
        return Err(Error::Validation("rebin factor must be >= 1".into()));
    }
    if factor == 1 {
        return Ok(());
    }
    let n = hist.n_bins();
    let mut edges = Vec::with_capacity(n / factor + 2);
    let mut content = Vec::with_capacity(n / factor + 1);
    let mut error = Vec::with_capacity(n / factor + 1);
    edges.push(hist.bin_edges[0]);
    let mut i = 0;
    while i < n {
        let group = (i + factor).min(n);
        content.push(hist.bin_content[i..group].iter().sum());
        error.push(hist.bin_error[i..group].iter().map(|e| e * e).sum::<f64>().sqrt());
        edges.push(hist.bin_edges[group]);
        i = group;
    }
    hist.bin_edges = edges;
    hist.bin_content = content;
    hist.bin_error = error;
    Ok(())
}

/// Re-bucket bin contents onto an arbitrary strictly increasing edge
/// sequence.
///
/// Each old bin is assigned whole to the new bin containing its center; old
/// bins whose center falls outside the new range are dropped.
pub fn rebin_edges(hist: &mut Histogram, new_edges: &[f64]) -> Result<()> {
    if new_edges.len() < 2 {
        return Err(Error::Validation("need at least 2 rebin edges".into()));
    }
    for w in new_edges.windows(2) {
        if !(w[1] > w[0]) || !w[0].is_finite() || !w[1].is_finite() {
            return Err(Error::Validation(
                "rebin edges must be finite and strictly increasing".into(),
            ));
        }
    }
    let m = new_edges.len() - 1;
    let mut content = vec![0.0; m];
    let mut error: Vec<f64> = vec![0.0; m];
    for i in 0..hist.n_bins() {
        let center = hist.bin_center(i);
        if center < new_edges[0] || center >= new_edges[m] {
            continue;
        }
        let idx = new_edges.partition_point(|e| *e <= center) - 1;
        content[idx] += hist.bin_content[i];
        error[idx] = error[idx].hypot(hist.bin_error[i]);
    }
    hist.bin_edges = new_edges.to_vec();
    hist.bin_content = content;
    hist.bin_error = error;
    Ok(())
}

/// Scale each bin's content and error by `base_width / bin_width` so yields
/// read as densities per `base_width`.
pub fn normalize_bin_widths(hist: &mut Histogram, base_width: f64) -> Result<()> {
    if !(base_width > 0.0) || !base_width.is_finite() {
        return Err(Error::Validation(format!(
            "bin normalization width must be positive, got {base_width}"
        )));
    }
    for i in 0..hist.n_bins() {
        let f = base_width / hist.bin_width(i);
        hist.bin_content[i] *= f;
        hist.bin_error[i] *= f;
    }
    Ok(())
}

/// Resolve the normalization width: the configured default when positive,
/// otherwise the narrowest bin of the reference histogram.
pub fn resolve_base_width(configured: f64, reference: &Histogram) -> f64 {
    if configured > 0.0 {
        configured
    } else {
        reference.min_bin_width()
    }
}
