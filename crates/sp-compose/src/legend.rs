//! Legend assembly in drawing-convention order.

use serde::{Deserialize, Serialize};
use sp_core::{Process, StyleAttrs, StyleTag};

/// Entries with a histogram maximum below this are dropped by default.
pub const DEFAULT_MIN_BIN_HEIGHT: f64 = 1e-3;

/// User-adjustable legend knobs, persisted per panel across recomposes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegendSettings {
    /// Minimum histogram maximum for backgrounds/signals to be listed.
    pub min_bin_height: f64,
    /// Number of legend columns.
    pub columns: u32,
}

impl Default for LegendSettings {
    fn default() -> Self {
        Self { min_bin_height: DEFAULT_MIN_BIN_HEIGHT, columns: 1 }
    }
}

/// One legend line.
#[derive(Debug, Clone, Serialize)]
pub struct LegendEntry {
    /// Display label.
    pub label: String,
    /// Render style class of the entry's swatch.
    pub style_tag: StyleTag,
    /// Pass-through display attributes.
    pub style: StyleAttrs,
}

/// Composed legend: entries in display order plus geometry hints. The box
/// height hint is a panel fraction proportional to the row count; placement
/// beyond that belongs to the render adapter.
#[derive(Debug, Clone, Serialize)]
pub struct Legend {
    /// Entries in display order: backgrounds largest-first, band, data,
    /// signals largest-first.
    pub entries: Vec<LegendEntry>,
    /// Number of columns.
    pub columns: u32,
    /// Suggested box height as a fraction of the panel height.
    pub box_height_hint: f64,
}

/// Assemble the legend from the composed categories.
///
/// Backgrounds appear in reverse stack order so the largest contribution is
/// listed first; backgrounds and signals below `min_bin_height` are skipped.
pub fn build_legend(
    backgrounds_ordered: &[Process],
    band: Option<&Process>,
    data: Option<&Process>,
    signals: &[Process],
    settings: &LegendSettings,
) -> Legend {
    let mut entries = Vec::new();
    for p in backgrounds_ordered.iter().rev() {
        if p.histogram.max_content() >= settings.min_bin_height {
            entries.push(entry(p));
        }
    }
    if let Some(b) = band {
        entries.push(entry(b));
    }
    if let Some(d) = data {
        entries.push(entry(d));
    }
    for p in signals.iter().rev() {
        if p.histogram.max_content() >= settings.min_bin_height {
            entries.push(entry(p));
        }
    }
    let columns = settings.columns.max(1);
    let rows = (entries.len() as u32).div_ceil(columns);
    Legend { entries, columns, box_height_hint: 0.05 * rows as f64 }
}

fn entry(p: &Process) -> LegendEntry {
    LegendEntry { label: p.label.clone(), style_tag: p.style_tag, style: p.style }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_core::{Histogram, ProcessKind};

    fn proc(label: &str, tag: StyleTag, content: Vec<f64>) -> Process {
        let n = content.len();
        Process {
            histogram: Histogram::uniform(label, n, 0.0, n as f64, content, vec![0.0; n]).unwrap(),
            label: label.to_string(),
            style_tag: tag,
            style: StyleAttrs::default(),
            source_id: label.to_string(),
            kind: ProcessKind::Data,
        }
    }

    #[test]
    fn backgrounds_listed_in_reverse_stack_order() {
        let bgs = vec![
            proc("small", StyleTag::Filled, vec![1.0]),
            proc("large", StyleTag::Filled, vec![100.0]),
        ];
        let data = proc("Data", StyleTag::Point, vec![100.0]);
        let l = build_legend(&bgs, None, Some(&data), &[], &LegendSettings::default());
        let labels: Vec<&str> = l.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["large", "small", "Data"]);
    }

    #[test]
    fn tiny_contributions_are_filtered() {
        let bgs = vec![
            proc("visible", StyleTag::Filled, vec![5.0]),
            proc("empty", StyleTag::Filled, vec![1e-6]),
        ];
        let l = build_legend(&bgs, None, None, &[], &LegendSettings::default());
        assert_eq!(l.entries.len(), 1);
        assert_eq!(l.entries[0].label, "visible");
    }

    #[test]
    fn box_hint_grows_with_rows_and_respects_columns() {
        let bgs: Vec<Process> =
            (0..4).map(|i| proc(&format!("b{i}"), StyleTag::Filled, vec![1.0])).collect();
        let one_col = build_legend(&bgs, None, None, &[], &LegendSettings::default());
        let two_col = build_legend(
            &bgs,
            None,
            None,
            &[],
            &LegendSettings { min_bin_height: DEFAULT_MIN_BIN_HEIGHT, columns: 2 },
        );
        assert!((one_col.box_height_hint - 0.20).abs() < 1e-12);
        assert!((two_col.box_height_hint - 0.10).abs() < 1e-12);
        assert_eq!(two_col.columns, 2);
    }
}
