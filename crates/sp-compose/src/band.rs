//! Systematic uncertainty band synthesis.

use sp_core::{Error, Process, Result, StyleTag};

use crate::stack::Stack;

/// Build the uncertainty band from the merged relative systematic and the
/// background stack.
///
/// The band's content mirrors the stack top bin-for-bin; its error is the
/// relative systematic times the stacked content, for every bin. Calling
/// this before the background stack exists is a programming error in the
/// composition flow and is rejected without mutating anything.
pub fn band(systematic: &Process, stack: &Stack) -> Result<Process> {
    let top = stack.top().ok_or_else(|| {
        Error::Precondition("uncertainty band requires the background stack".into())
    })?;
    if !systematic.histogram.same_binning(top) {
        return Err(Error::Validation(format!(
            "mismatched binning: systematic '{}' vs stack top '{}'",
            systematic.histogram.name, top.name
        )));
    }
    let mut band = systematic.clone();
    band.style_tag = StyleTag::UncertaintyBand;
    for i in 0..top.n_bins() {
        let rel = systematic.histogram.bin_content[i];
        band.histogram.bin_content[i] = top.bin_content[i];
        band.histogram.bin_error[i] = (rel * top.bin_content[i]).abs();
    }
    Ok(band)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::stack;
    use sp_core::{Histogram, ProcessKind, StyleAttrs};

    fn proc(label: &str, kind: ProcessKind, tag: StyleTag, content: Vec<f64>) -> Process {
        let n = content.len();
        Process {
            histogram: Histogram::uniform(label, n, 0.0, n as f64, content, vec![0.0; n]).unwrap(),
            label: label.to_string(),
            style_tag: tag,
            style: StyleAttrs::default(),
            source_id: label.to_string(),
            kind,
        }
    }

    #[test]
    fn band_scales_relative_systematic_by_stack_content() {
        let s = stack(&[proc(
            "bkg",
            ProcessKind::Systematic,
            StyleTag::Filled,
            vec![100.0, 200.0],
        )])
        .unwrap();
        let sys = proc("sys", ProcessKind::Systematic, StyleTag::UncertaintyBand, vec![0.1, 0.25]);
        let b = band(&sys, &s).unwrap();
        assert_eq!(b.histogram.bin_content, vec![100.0, 200.0]);
        assert!((b.histogram.bin_error[0] - 10.0).abs() < 1e-12);
        assert!((b.histogram.bin_error[1] - 50.0).abs() < 1e-12, "every bin, last included");
        assert_eq!(b.style_tag, StyleTag::UncertaintyBand);
    }

    #[test]
    fn band_without_stack_is_a_precondition_error() {
        let sys =
            proc("sys", ProcessKind::Systematic, StyleTag::UncertaintyBand, vec![0.1]);
        let err = band(&sys, &Stack::default()).unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
    }
}
