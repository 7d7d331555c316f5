//! Cumulative stacking of ordered processes.

use sp_core::{Histogram, Process, Result};

/// Cumulative rendering structure: layer `k` holds the running bin-wise sum
/// of the ordered inputs `0..=k`, so the last layer is the full prediction.
#[derive(Debug, Clone, Default)]
pub struct Stack {
    /// Cumulative layers, bottom of the stack first.
    pub layers: Vec<Process>,
}

impl Stack {
    /// True when there is nothing to stack.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// The final cumulative histogram (top of the stack).
    pub fn top(&self) -> Option<&Histogram> {
        self.layers.last().map(|p| &p.histogram)
    }
}

/// Build the cumulative stack of an ordered process list.
///
/// An empty input yields an empty stack, not a failure; rendering then
/// simply draws nothing for the category.
pub fn stack(ordered: &[Process]) -> Result<Stack> {
    let mut layers: Vec<Process> = Vec::with_capacity(ordered.len());
    for p in ordered {
        let mut layer = p.clone();
        if let Some(prev) = layers.last() {
            layer.histogram.add(&prev.histogram)?;
        }
        layers.push(layer);
    }
    Ok(Stack { layers })
}
