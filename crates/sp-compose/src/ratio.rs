//! Data over summed-background ratio synthesis.

use sp_core::{Error, Histogram, Process, Result};

/// Ratio of data to the summed background prediction.
///
/// Undefined bins (zero denominator) carry NaN content with the matching
/// `defined` flag false; they serialize as null and are skipped by adapters.
#[derive(Debug, Clone)]
pub struct Ratio {
    /// Per-bin data/prediction, NaN where undefined.
    pub histogram: Histogram,
    /// False where the denominator was zero.
    pub defined: Vec<bool>,
    /// Horizontal guide line drawn across the ratio panel.
    pub reference_line: f64,
}

/// Divide the merged data histogram by the bin-wise sum of the composed
/// backgrounds.
///
/// Error propagation is relative-error quadrature,
/// `sqrt(ea^2 b^2 + eb^2 a^2) / b^2`, which also covers `a == 0`.
pub fn ratio(data: &Histogram, backgrounds: &[Process]) -> Result<Ratio> {
    let mut denom = match backgrounds.first() {
        None => {
            return Err(Error::Precondition(
                "ratio requires composed backgrounds".into(),
            ))
        }
        Some(first) => first.histogram.clone(),
    };
    for p in &backgrounds[1..] {
        denom.add(&p.histogram)?;
    }
    if !data.same_binning(&denom) {
        return Err(Error::Validation(format!(
            "mismatched binning: data '{}' vs background sum",
            data.name
        )));
    }

    let n = data.n_bins();
    let mut hist = data.clone();
    hist.name = format!("{}_ratio", data.name);
    hist.y_title = "Data / Bkg".to_string();
    let mut defined = vec![true; n];
    for i in 0..n {
        let (a, b) = (data.bin_content[i], denom.bin_content[i]);
        let (ea, eb) = (data.bin_error[i], denom.bin_error[i]);
        if b == 0.0 {
            hist.bin_content[i] = f64::NAN;
            hist.bin_error[i] = 0.0;
            defined[i] = false;
        } else {
            hist.bin_content[i] = a / b;
            hist.bin_error[i] = (ea * ea * b * b + eb * eb * a * a).sqrt() / (b * b);
        }
    }
    Ok(Ratio { histogram: hist, defined, reference_line: 1.0 })
}
