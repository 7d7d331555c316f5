//! Per-panel state: raw lists, composed lists, annotation extras.

use sp_compose::{Annotation, ComposedPanel, LegendSettings, Ratio, RawView, SurfaceHandle};
use sp_core::Process;

/// Lifecycle of a panel's content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum PanelState {
    /// Nothing loaded.
    #[default]
    Empty,
    /// Raw lists populated; composed state stale or absent.
    Loaded,
    /// Composed lists current for the raw state and switches.
    Composed,
    /// Composed state handed to the render adapter.
    Rendered,
}

/// One subdivision of the plot grid.
///
/// Raw lists hold processes as loaded, one per source; composed state is
/// recomputed from them and the session switches, never carrying anything
/// the raw state does not.
#[derive(Debug, Default)]
pub struct Panel {
    /// Observed data, as loaded.
    pub raw_data: Vec<Process>,
    /// Backgrounds, as loaded and scaled.
    pub raw_backgrounds: Vec<Process>,
    /// Signals, as loaded and scaled.
    pub raw_signals: Vec<Process>,
    /// Relative systematics, as loaded.
    pub raw_systematics: Vec<Process>,
    /// Composed render-ready state, when current.
    pub composed: Option<ComposedPanel>,
    /// Ratio sub-panel data, when requested.
    pub ratio: Option<Ratio>,
    /// Once a ratio was requested, recomposes keep refreshing it.
    pub ratio_requested: bool,
    /// Ratio sub-surface handle; allocated once, survives recomposes.
    pub ratio_surface: Option<SurfaceHandle>,
    /// Histogram identifier of the most recent load.
    pub histogram_name: Option<String>,
    /// Panel-level x-axis title override.
    pub x_title: Option<String>,
    /// Panel-level y-axis title override.
    pub y_title: Option<String>,
    /// Legend knobs, kept across recomposes.
    pub legend_settings: LegendSettings,
    /// Annotation blocks to render with the frame.
    pub annotations: Vec<Annotation>,
    /// Content lifecycle state.
    pub state: PanelState,
}

impl Panel {
    /// Fresh empty panel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrowed view of the raw category lists for composition.
    pub fn raw_view(&self) -> RawView<'_> {
        RawView {
            data: &self.raw_data,
            backgrounds: &self.raw_backgrounds,
            signals: &self.raw_signals,
            systematics: &self.raw_systematics,
        }
    }

    /// True when any raw category has content.
    pub fn has_raw(&self) -> bool {
        !self.raw_data.is_empty()
            || !self.raw_backgrounds.is_empty()
            || !self.raw_signals.is_empty()
            || !self.raw_systematics.is_empty()
    }

    /// Drop composed and ratio data, keeping raw lists and the ratio
    /// surface handle. No-op for empty panels.
    pub fn demote_to_loaded(&mut self) {
        if self.state >= PanelState::Composed {
            self.composed = None;
            self.ratio = None;
            self.state = PanelState::Loaded;
        }
    }

    /// Clear everything back to a fresh panel. The ratio surface handle is
    /// dropped too; the adapter may reuse or free the surface.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Iterate all raw data, background, and signal histograms, the set
    /// rebinning and cumulative transforms apply to.
    pub fn raw_shape_histograms_mut(&mut self) -> impl Iterator<Item = &mut sp_core::Histogram> {
        self.raw_data
            .iter_mut()
            .chain(self.raw_backgrounds.iter_mut())
            .chain(self.raw_signals.iter_mut())
            .map(|p| &mut p.histogram)
    }

    /// Iterate every raw histogram of every category.
    pub fn all_raw_histograms_mut(&mut self) -> impl Iterator<Item = &mut sp_core::Histogram> {
        self.raw_data
            .iter_mut()
            .chain(self.raw_backgrounds.iter_mut())
            .chain(self.raw_signals.iter_mut())
            .chain(self.raw_systematics.iter_mut())
            .map(|p| &mut p.histogram)
    }
}
