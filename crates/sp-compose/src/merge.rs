//! Label-grouped merging of processes.

use sp_core::{Error, Process, Result};

/// How bins of same-labeled processes are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Contents add, errors combine in quadrature (yield counting).
    Linear,
    /// Contents combine as sqrt(a^2 + b^2) (systematic envelopes, which
    /// combine magnitudes rather than counts).
    Quadratic,
}

/// Merge same-labeled processes into one process per distinct label.
///
/// Groups by exact label equality regardless of category; the result keeps
/// the first-occurrence order of labels. A group of size 1 still yields a
/// fresh clone, never an alias of the input histogram (merging mutates bins
/// in place).
pub fn merge(processes: &[Process], mode: MergeMode) -> Result<Vec<Process>> {
    let mut merged: Vec<Process> = Vec::new();
    for p in processes {
        match merged.iter_mut().find(|m| m.label == p.label) {
            None => merged.push(p.clone()),
            Some(m) => match mode {
                MergeMode::Linear => m.histogram.add(&p.histogram)?,
                MergeMode::Quadratic => quadratic_add(m, p)?,
            },
        }
    }
    Ok(merged)
}

/// Replace the accumulator's contents with sqrt(a^2 + b^2) per bin.
/// Errors are left as seeded; systematic histograms carry their payload in
/// the contents (relative uncertainty per bin).
fn quadratic_add(acc: &mut Process, next: &Process) -> Result<()> {
    if !acc.histogram.same_binning(&next.histogram) {
        return Err(Error::Validation(format!(
            "mismatched binning: '{}' vs '{}'",
            acc.histogram.name, next.histogram.name
        )));
    }
    for i in 0..acc.histogram.n_bins() {
        let a = acc.histogram.bin_content[i];
        let b = next.histogram.bin_content[i];
        acc.histogram.bin_content[i] = a.hypot(b);
    }
    Ok(())
}
