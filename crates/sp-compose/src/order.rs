//! Deterministic ordering of processes for stacking.

use sp_core::Process;

/// Stable ascending sort by visible-range integral.
///
/// The smallest yield ends up first (bottom of the stack); equal integrals
/// keep their relative input order. Legends iterate the reverse of this
/// order so the largest contribution is listed first.
pub fn order(mut processes: Vec<Process>) -> Vec<Process> {
    processes.sort_by(|a, b| a.integral().total_cmp(&b.integral()));
    processes
}
