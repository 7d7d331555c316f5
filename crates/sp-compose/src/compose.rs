//! Whole-panel composition: merge, order, stack, band, draw-list assembly.

use sp_core::{Histogram, Process, Result, Switches};
use tracing::warn;

use crate::band::band as uncertainty_band;
use crate::legend::{build_legend, Legend, LegendSettings};
use crate::merge::{merge, MergeMode};
use crate::order::order;
use crate::stack::{stack, Stack};
use crate::transform::{normalize_bin_widths, resolve_base_width};

/// Borrowed view of a panel's raw per-category lists.
#[derive(Debug, Clone, Copy)]
pub struct RawView<'a> {
    /// Observed data, one process per loaded source.
    pub data: &'a [Process],
    /// Background components.
    pub backgrounds: &'a [Process],
    /// Signal hypotheses.
    pub signals: &'a [Process],
    /// Relative systematic uncertainties.
    pub systematics: &'a [Process],
}

/// One slot of the assembled draw list, referencing [`ComposedPanel`]
/// members. The adapter draws slots in list order, first at the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawEntry {
    /// The background stack, all layers bottom-up.
    Stack,
    /// The systematic uncertainty band.
    Band,
    /// The merged data points.
    Data,
    /// The composed signal at this index.
    Signal(usize),
}

/// Composed, ordered, render-ready state of one panel. Always a pure
/// function of the raw lists plus the current session switches.
#[derive(Debug, Clone)]
pub struct ComposedPanel {
    /// Merged and ordered background components (not yet cumulative).
    pub backgrounds: Vec<Process>,
    /// Cumulative background stack.
    pub stack: Stack,
    /// Uncertainty band, when systematics are loaded and shown.
    pub band: Option<Process>,
    /// Merged data.
    pub data: Option<Process>,
    /// Ordered signal clones; carry the summed background when signals are
    /// stacked.
    pub signals: Vec<Process>,
    /// Merged relative systematic, kept for ratio-panel bands.
    pub systematic: Option<Process>,
    /// Assembled draw list.
    pub draw_order: Vec<DrawEntry>,
    /// Assembled legend.
    pub legend: Legend,
}

impl ComposedPanel {
    /// Reference histogram for axis derivations and frame binning: merged
    /// data first, else the bottom background, else the first signal.
    pub fn reference(&self) -> Option<&Histogram> {
        self.data
            .as_ref()
            .map(|p| &p.histogram)
            .or_else(|| self.backgrounds.first().map(|p| &p.histogram))
            .or_else(|| self.signals.first().map(|p| &p.histogram))
    }

    /// Mutable iteration over every composed histogram, for display-window
    /// updates that must reach all of them.
    pub fn histograms_mut(&mut self) -> impl Iterator<Item = &mut Histogram> {
        self.backgrounds
            .iter_mut()
            .chain(self.stack.layers.iter_mut())
            .chain(self.band.iter_mut())
            .chain(self.data.iter_mut())
            .chain(self.signals.iter_mut())
            .chain(self.systematic.iter_mut())
            .map(|p| &mut p.histogram)
    }
}

/// Run the full composition pipeline for one panel.
///
/// Merges and orders each category, applies bin-width normalization when
/// the binning is non-uniform, stacks the backgrounds, synthesizes the
/// uncertainty band, and assembles the draw list and legend according to
/// the switches.
pub fn compose(
    raw: RawView<'_>,
    switches: &Switches,
    legend_settings: &LegendSettings,
) -> Result<ComposedPanel> {
    let mut backgrounds = order(merge(raw.backgrounds, MergeMode::Linear)?);
    let mut data = merge(raw.data, MergeMode::Linear)?.into_iter().next();
    let mut signals = order(raw.signals.to_vec());
    let systematic = merge(raw.systematics, MergeMode::Quadratic)?.into_iter().next();

    // Non-uniform binning reads as densities per base width. Relative
    // systematics are dimensionless and stay untouched.
    let base_width = {
        let reference = data
            .as_ref()
            .map(|p| &p.histogram)
            .or_else(|| backgrounds.first().map(|p| &p.histogram))
            .or_else(|| signals.first().map(|p| &p.histogram));
        match reference {
            Some(r) if !r.is_uniform_binning() => {
                Some(resolve_base_width(switches.bin_normalization_width, r))
            }
            _ => None,
        }
    };
    if let Some(w) = base_width {
        for p in &mut backgrounds {
            normalize_bin_widths(&mut p.histogram, w)?;
        }
        if let Some(d) = &mut data {
            normalize_bin_widths(&mut d.histogram, w)?;
        }
        for s in &mut signals {
            normalize_bin_widths(&mut s.histogram, w)?;
        }
    }

    let stack = stack(&backgrounds)?;
    if stack.is_empty() && switches.draw_background {
        warn!("no background processes to stack");
    }

    let band = match (&systematic, switches.draw_systematics) {
        (Some(sys), true) => {
            if stack.is_empty() {
                warn!("systematics shown but there is no background stack; band skipped");
                None
            } else {
                Some(uncertainty_band(sys, &stack)?)
            }
        }
        _ => None,
    };

    if switches.stack_signal {
        if let Some(top) = stack.top() {
            for s in &mut signals {
                s.histogram.add(top)?;
            }
        }
    }

    let mut draw_order = Vec::new();
    if switches.stack_signal && switches.draw_signal {
        draw_order.extend((0..signals.len()).map(DrawEntry::Signal));
    }
    if switches.draw_background && !stack.is_empty() {
        draw_order.push(DrawEntry::Stack);
    }
    if band.is_some() {
        draw_order.push(DrawEntry::Band);
    }
    if switches.draw_data && data.is_some() {
        draw_order.push(DrawEntry::Data);
    }
    if !switches.stack_signal && switches.draw_signal {
        draw_order.extend((0..signals.len()).map(DrawEntry::Signal));
    }

    let legend = build_legend(
        if switches.draw_background { backgrounds.as_slice() } else { &[] },
        band.as_ref(),
        if switches.draw_data { data.as_ref() } else { None },
        if switches.draw_signal { signals.as_slice() } else { &[] },
        legend_settings,
    );

    Ok(ComposedPanel {
        backgrounds,
        stack,
        band,
        data,
        signals,
        systematic,
        draw_order,
        legend,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_core::{ProcessKind, StyleAttrs, StyleTag, Weighting};

    fn weighting() -> Weighting {
        Weighting { cross_section: 1.0, weight: 1.0, event_count: 1 }
    }

    fn proc(label: &str, kind: ProcessKind, content: Vec<f64>) -> Process {
        let n = content.len();
        let tag = match kind {
            ProcessKind::Data => StyleTag::Point,
            _ => StyleTag::Filled,
        };
        Process {
            histogram: Histogram::uniform(label, n, 0.0, n as f64, content, vec![0.0; n]).unwrap(),
            label: label.to_string(),
            style_tag: tag,
            style: StyleAttrs::default(),
            source_id: label.to_string(),
            kind,
        }
    }

    fn qcd_scenario() -> (Vec<Process>, Vec<Process>, Vec<Process>) {
        let backgrounds = vec![
            proc("QCD", ProcessKind::Background(weighting()), vec![60.0, 40.0]),
            proc("QCD", ProcessKind::Background(weighting()), vec![30.0, 20.0]),
        ];
        let signals = vec![proc("SUSY", ProcessKind::Signal(weighting()), vec![6.0, 4.0])];
        let data = vec![proc("Data", ProcessKind::Data, vec![100.0, 70.0])];
        (data, backgrounds, signals)
    }

    #[test]
    fn same_label_backgrounds_merge_into_one_stack_entry() {
        let (data, backgrounds, signals) = qcd_scenario();
        let raw = RawView {
            data: &data,
            backgrounds: &backgrounds,
            signals: &signals,
            systematics: &[],
        };
        let c = compose(raw, &Switches::default(), &LegendSettings::default()).unwrap();
        assert_eq!(c.backgrounds.len(), 1);
        assert_eq!(c.backgrounds[0].label, "QCD");
        assert!((c.backgrounds[0].integral() - 150.0).abs() < 1e-9);
        assert!((c.stack.top().unwrap().integral() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn unstacked_signal_draws_above_the_stack() {
        let (data, backgrounds, signals) = qcd_scenario();
        let raw = RawView {
            data: &data,
            backgrounds: &backgrounds,
            signals: &signals,
            systematics: &[],
        };
        let c = compose(raw, &Switches::default(), &LegendSettings::default()).unwrap();
        assert_eq!(
            c.draw_order,
            vec![DrawEntry::Stack, DrawEntry::Data, DrawEntry::Signal(0)]
        );
        assert!((c.signals[0].integral() - 10.0).abs() < 1e-9, "signal stays unstacked");
    }

    #[test]
    fn stacked_signal_precedes_the_stack_and_rides_on_it() {
        let (data, backgrounds, signals) = qcd_scenario();
        let raw = RawView {
            data: &data,
            backgrounds: &backgrounds,
            signals: &signals,
            systematics: &[],
        };
        let switches = Switches { stack_signal: true, ..Switches::default() };
        let c = compose(raw, &switches, &LegendSettings::default()).unwrap();
        assert_eq!(
            c.draw_order,
            vec![DrawEntry::Signal(0), DrawEntry::Stack, DrawEntry::Data]
        );
        assert!((c.signals[0].integral() - 160.0).abs() < 1e-9, "signal carries the stack");
    }

    #[test]
    fn band_requires_systematics_shown_and_a_stack() {
        let (data, backgrounds, signals) = qcd_scenario();
        let systematics =
            vec![proc("syst", ProcessKind::Systematic, vec![0.1, 0.2])];
        let raw = RawView {
            data: &data,
            backgrounds: &backgrounds,
            signals: &signals,
            systematics: &systematics,
        };
        let hidden = compose(raw, &Switches::default(), &LegendSettings::default()).unwrap();
        assert!(hidden.band.is_none(), "band only when systematics are shown");

        let switches = Switches { draw_systematics: true, ..Switches::default() };
        let shown = compose(raw, &switches, &LegendSettings::default()).unwrap();
        let band = shown.band.as_ref().unwrap();
        assert_eq!(band.histogram.bin_content, vec![90.0, 60.0]);
        assert!((band.histogram.bin_error[0] - 9.0).abs() < 1e-9);
        assert!((band.histogram.bin_error[1] - 12.0).abs() < 1e-9);
        assert_eq!(
            shown.draw_order,
            vec![DrawEntry::Stack, DrawEntry::Band, DrawEntry::Data, DrawEntry::Signal(0)]
        );
    }

    #[test]
    fn switches_hide_categories_from_draw_list_and_legend() {
        let (data, backgrounds, signals) = qcd_scenario();
        let raw = RawView {
            data: &data,
            backgrounds: &backgrounds,
            signals: &signals,
            systematics: &[],
        };
        let switches = Switches {
            draw_data: false,
            draw_signal: false,
            ..Switches::default()
        };
        let c = compose(raw, &switches, &LegendSettings::default()).unwrap();
        assert_eq!(c.draw_order, vec![DrawEntry::Stack]);
        let labels: Vec<&str> = c.legend.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["QCD"]);
    }

    #[test]
    fn empty_panel_composes_to_nothing() {
        let raw = RawView { data: &[], backgrounds: &[], signals: &[], systematics: &[] };
        let c = compose(raw, &Switches::default(), &LegendSettings::default()).unwrap();
        assert!(c.draw_order.is_empty());
        assert!(c.reference().is_none());
        assert!(c.stack.is_empty());
    }

    #[test]
    fn non_uniform_binning_is_normalized_during_compose() {
        let hist =
            Histogram::new("var", vec![0.0, 2.0, 6.0], vec![20.0, 80.0], vec![0.0, 0.0]).unwrap();
        let data = vec![Process {
            histogram: hist,
            label: "Data".to_string(),
            style_tag: StyleTag::Point,
            style: StyleAttrs::default(),
            source_id: "data".to_string(),
            kind: ProcessKind::Data,
        }];
        let raw = RawView { data: &data, backgrounds: &[], signals: &[], systematics: &[] };
        let c = compose(raw, &Switches::default(), &LegendSettings::default()).unwrap();
        // narrowest width 2.0: first bin unchanged, 4-wide bin halves
        let d = c.data.as_ref().unwrap();
        assert_eq!(d.histogram.bin_content, vec![20.0, 40.0]);
    }

    #[test]
    fn legend_lists_largest_background_first() {
        let backgrounds = vec![
            proc("small", ProcessKind::Background(weighting()), vec![1.0, 1.0]),
            proc("large", ProcessKind::Background(weighting()), vec![50.0, 50.0]),
        ];
        let raw = RawView { data: &[], backgrounds: &backgrounds, signals: &[], systematics: &[] };
        let c = compose(raw, &Switches::default(), &LegendSettings::default()).unwrap();
        let labels: Vec<&str> = c.legend.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["large", "small"]);
        assert_eq!(c.stack.layers[0].label, "small", "stack keeps ascending order");
    }
}
