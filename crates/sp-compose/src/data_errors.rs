//! Data-point error models for rendering.

use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Accept `x` as a Poisson count when it is a non-negative near-integer.
fn is_near_integer_nonneg(x: f64) -> Option<u64> {
    if !(x.is_finite() && x >= 0.0) {
        return None;
    }
    let r = x.round();
    if (x - r).abs() <= 1e-9 { Some(r as u64) } else { None }
}

/// Central 68.2689% Poisson interval for an observed count `n`.
///
/// Chi-square quantiles:
/// lo = n - 0.5 * chi2_{alpha/2, 2n}
/// hi = 0.5 * chi2_{1-alpha/2, 2(n+1)} - n
pub fn garwood_68_interval(n: u64) -> (f64, f64) {
    let alpha = 0.31731_f64;
    let lo = if n == 0 {
        0.0
    } else {
        let dist = ChiSquared::new(2.0 * (n as f64)).unwrap();
        let q = dist.inverse_cdf(alpha / 2.0);
        (n as f64) - 0.5 * q
    };
    let dist_hi = ChiSquared::new(2.0 * ((n + 1) as f64)).unwrap();
    let q_hi = dist_hi.inverse_cdf(1.0 - alpha / 2.0);
    let hi = 0.5 * q_hi - (n as f64);
    (lo, hi)
}

/// Asymmetric data errors per bin.
///
/// In Poisson mode, near-integer contents get central Garwood intervals;
/// anything else (weighted or already-scaled data) keeps the stored error
/// symmetrically. Outside Poisson mode the stored errors are used as-is.
pub fn data_errors(content: &[f64], stored: &[f64], poisson: bool) -> (Vec<f64>, Vec<f64>) {
    let mut lo = Vec::with_capacity(content.len());
    let mut hi = Vec::with_capacity(content.len());
    for (i, &v) in content.iter().enumerate() {
        match is_near_integer_nonneg(v).filter(|_| poisson) {
            Some(n) => {
                let (dl, dh) = garwood_68_interval(n);
                lo.push(dl);
                hi.push(dh);
            }
            None => {
                lo.push(stored[i]);
                hi.push(stored[i]);
            }
        }
    }
    (lo, hi)
}
