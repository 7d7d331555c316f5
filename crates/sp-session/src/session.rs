//! Session lifecycle: the grid of panels, loading, switches, and the
//! command-level operations.

use std::path::{Path, PathBuf};

use sp_compose::{
    build_frame, compose, cumulative as cumulative_transform, ratio as compute_ratio, rebin_edges,
    rebin_factor, Annotation, AnnotationPosition, FrameContext, RenderAdapter, RenderFrame,
};
use sp_core::{Error, Process, ProcessKind, Result, StyleTag, Switches};
use tracing::{info, warn};

use crate::adapter::JsonFrameAdapter;
use crate::config::{resolve_path, NamedSource, PlotConfig};
use crate::panel::{Panel, PanelState};
use crate::source::{HistogramSource, JsonDirectorySource};
use crate::xsec::XsecTable;

/// Largest allowed grid width.
pub const MAX_GRID_COLS: usize = 3;
/// Largest allowed grid height.
pub const MAX_GRID_ROWS: usize = 2;

/// One successfully loaded source.
#[derive(Debug, Clone)]
pub struct LoadRecord {
    /// Source identifier.
    pub source_id: String,
    /// Category it loaded into.
    pub category: &'static str,
}

/// One skipped source with the reason.
#[derive(Debug, Clone)]
pub struct SkipRecord {
    /// Source identifier.
    pub source_id: String,
    /// Category it would have loaded into.
    pub category: &'static str,
    /// Why it was skipped.
    pub reason: String,
}

/// Outcome of one load across the configured sources. Skips are non-fatal;
/// the luminosity is summed over the data sources that actually loaded.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Sources that loaded.
    pub loaded: Vec<LoadRecord>,
    /// Sources that were skipped.
    pub skipped: Vec<SkipRecord>,
    /// Summed data luminosity in inverse picobarns.
    pub luminosity: f64,
}

/// Argument to the rebin operation.
#[derive(Debug, Clone, PartialEq)]
pub enum RebinSpec {
    /// Merge this many adjacent bins into one.
    Factor(usize),
    /// Re-bucket onto these explicit edges.
    Edges(Vec<f64>),
}

/// Default artifact path for a saved panel: `plots/<histogram>.json`.
pub fn default_save_path(histogram_name: &str) -> PathBuf {
    PathBuf::from("plots").join(format!("{histogram_name}.json"))
}

fn histogram_key(selection: &str, prefix: &str, name: &str) -> String {
    if selection.is_empty() {
        format!("{prefix}{name}")
    } else {
        format!("{selection}/{prefix}{name}")
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value {
        "true" | "on" | "1" => Ok(true),
        "false" | "off" | "0" => Ok(false),
        other => Err(Error::Validation(format!("expected a boolean, got '{other}'"))),
    }
}

/// Interactive session state: configuration, the panel grid, the active
/// panel index, and the global display switches.
///
/// Exactly one thread of control owns a session; every operation completes
/// fully before the next begins. Collaborators are injected: a
/// [`HistogramSource`] for raw distributions and a [`RenderAdapter`] for
/// drawing.
pub struct Session<S, A> {
    config: Option<PlotConfig>,
    xsec: XsecTable,
    selection: String,
    panels: Vec<Panel>,
    grid: (usize, usize),
    active: usize,
    switches: Switches,
    luminosity: f64,
    source: S,
    adapter: A,
}

impl Session<JsonDirectorySource, JsonFrameAdapter> {
    /// Session with the default collaborators: a JSON directory source
    /// (re-rooted by [`Session::setup`]) and the JSON frame adapter.
    pub fn new() -> Self {
        Self::with_collaborators(JsonDirectorySource::new("."), JsonFrameAdapter::new())
    }
}

impl Default for Session<JsonDirectorySource, JsonFrameAdapter> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: RenderAdapter> Session<JsonDirectorySource, A> {
    /// Read the configuration (and its cross-section table), validate
    /// both, and root the histogram source at the configured directory.
    /// Discards any existing grid.
    pub fn setup(&mut self, path: &Path) -> Result<()> {
        let config = PlotConfig::from_path(path)?;
        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let xsec = match &config.general.cross_sections {
            Some(rel) => XsecTable::from_path(&resolve_path(base, rel))?,
            None => XsecTable::default(),
        };
        self.source = JsonDirectorySource::new(resolve_path(base, &config.general.source_dir));
        self.setup_with(config, xsec)
    }
}

impl<S: HistogramSource, A: RenderAdapter> Session<S, A> {
    /// Session with explicit collaborators.
    pub fn with_collaborators(source: S, adapter: A) -> Self {
        Self {
            config: None,
            xsec: XsecTable::default(),
            selection: String::new(),
            panels: Vec::new(),
            grid: (0, 0),
            active: 0,
            switches: Switches::default(),
            luminosity: 0.0,
            source,
            adapter,
        }
    }

    /// Install an already-loaded configuration and cross-section table.
    /// Cross-validates eagerly: every simulated source must have a table
    /// entry before any panel operation runs.
    pub fn setup_with(&mut self, config: PlotConfig, xsec: XsecTable) -> Result<()> {
        config.validate()?;
        xsec.require(config.simulated_sources().map(|s| s.name.as_str()))?;
        info!(
            data = config.data.len(),
            backgrounds = config.backgrounds.len(),
            signals = config.signals.len(),
            systematics = config.systematics.len(),
            "session configured"
        );
        self.switches = config.general.switches;
        self.config = Some(config);
        self.xsec = xsec;
        self.panels.clear();
        self.grid = (0, 0);
        self.active = 0;
        self.luminosity = 0.0;
        Ok(())
    }

    /// Set the selection name qualifying histogram keys on future loads.
    pub fn selection(&mut self, name: &str) {
        info!(selection = name, "selection set");
        self.selection = name.to_string();
    }

    /// (Re)build the panel grid, discarding all existing panels.
    pub fn create_grid(&mut self, cols: usize, rows: usize) -> Result<()> {
        if cols == 0 || rows == 0 || cols > MAX_GRID_COLS || rows > MAX_GRID_ROWS {
            return Err(Error::Precondition(format!(
                "grid must be between 1x1 and {MAX_GRID_COLS}x{MAX_GRID_ROWS}, got {cols}x{rows}"
            )));
        }
        self.panels = (0..cols * rows).map(|_| Panel::new()).collect();
        self.grid = (cols, rows);
        self.active = 0;
        info!(cols, rows, "grid created");
        Ok(())
    }

    /// Make panel `index` the target of subsequent operations (0-based).
    pub fn activate_panel(&mut self, index: usize) -> Result<()> {
        if self.panels.is_empty() {
            return Err(Error::Precondition("no grid; run create_grid first".into()));
        }
        if index >= self.panels.len() {
            return Err(Error::Precondition(format!(
                "panel index {index} outside grid of {} panels",
                self.panels.len()
            )));
        }
        self.active = index;
        Ok(())
    }

    /// Load the named histogram from every configured source into the
    /// active panel, replacing its raw lists, then compose and render.
    ///
    /// Missing sources are skipped and reported; simulated yields are
    /// scaled by `weight * cross_section * luminosity / event_count` with
    /// the luminosity summed over the data sources that loaded.
    pub fn load(&mut self, histogram: &str) -> Result<LoadReport> {
        if self.panels.is_empty() {
            return Err(Error::Precondition("no grid; run create_grid first".into()));
        }
        let config = match &self.config {
            Some(c) => c,
            None => return Err(Error::Precondition("no configuration; run setup first".into())),
        };
        let key = histogram_key(&self.selection, &config.general.hist_prefix, histogram);

        let mut report = LoadReport::default();
        let mut raw_data = Vec::new();
        for d in &config.data {
            match self.source.fetch(&d.name, &key) {
                Ok(hist) => {
                    report.luminosity += d.luminosity;
                    report.loaded.push(LoadRecord { source_id: d.name.clone(), category: "data" });
                    raw_data.push(Process {
                        histogram: hist,
                        label: config.general.data_label.clone(),
                        style_tag: StyleTag::Point,
                        style: d.style,
                        source_id: d.name.clone(),
                        kind: ProcessKind::Data,
                    });
                }
                Err(Error::DataNotFound(reason)) => {
                    warn!(source = %d.name, reason = %reason, "data source skipped");
                    report.skipped.push(SkipRecord {
                        source_id: d.name.clone(),
                        category: "data",
                        reason,
                    });
                }
                Err(e) => return Err(e),
            }
        }
        let luminosity = report.luminosity;
        if luminosity == 0.0 && config.simulated_sources().next().is_some() {
            warn!("no data sources loaded; simulated yields scale to zero");
        }

        let mut raw_backgrounds = Vec::new();
        for s in &config.backgrounds {
            self.load_simulated(s, &key, luminosity, true, &mut raw_backgrounds, &mut report)?;
        }
        let mut raw_signals = Vec::new();
        for s in &config.signals {
            self.load_simulated(s, &key, luminosity, false, &mut raw_signals, &mut report)?;
        }
        let mut raw_systematics = Vec::new();
        for s in &config.systematics {
            match self.source.fetch(&s.name, &key) {
                Ok(hist) => {
                    report.loaded.push(LoadRecord {
                        source_id: s.name.clone(),
                        category: "systematic",
                    });
                    raw_systematics.push(Process {
                        histogram: hist,
                        label: s.label.clone(),
                        style_tag: StyleTag::UncertaintyBand,
                        style: s.style,
                        source_id: s.name.clone(),
                        kind: ProcessKind::Systematic,
                    });
                }
                Err(Error::DataNotFound(reason)) => {
                    warn!(source = %s.name, reason = %reason, "systematic source skipped");
                    report.skipped.push(SkipRecord {
                        source_id: s.name.clone(),
                        category: "systematic",
                        reason,
                    });
                }
                Err(e) => return Err(e),
            }
        }

        self.luminosity = luminosity;
        let panel = &mut self.panels[self.active];
        panel.raw_data = raw_data;
        panel.raw_backgrounds = raw_backgrounds;
        panel.raw_signals = raw_signals;
        panel.raw_systematics = raw_systematics;
        panel.histogram_name = Some(histogram.to_string());
        panel.composed = None;
        panel.ratio = None;
        panel.state = if panel.has_raw() { PanelState::Loaded } else { PanelState::Empty };
        let loaded = panel.state == PanelState::Loaded;
        info!(
            histogram,
            loaded = report.loaded.len(),
            skipped = report.skipped.len(),
            luminosity,
            "load complete"
        );
        if loaded {
            self.compose_active()?;
            self.render_active()?;
        }
        Ok(report)
    }

    fn load_simulated(
        &self,
        spec: &NamedSource,
        key: &str,
        luminosity: f64,
        background: bool,
        out: &mut Vec<Process>,
        report: &mut LoadReport,
    ) -> Result<()> {
        let category = if background { "background" } else { "signal" };
        let weighting = *self.xsec.get(&spec.name).ok_or_else(|| {
            Error::Config(format!(
                "no cross-section entry for simulated source '{}'",
                spec.name
            ))
        })?;
        match self.source.fetch(&spec.name, key) {
            Ok(mut hist) => {
                hist.scale(weighting.scale_factor(luminosity));
                report.loaded.push(LoadRecord { source_id: spec.name.clone(), category });
                out.push(Process {
                    histogram: hist,
                    label: spec.label.clone(),
                    style_tag: StyleTag::Filled,
                    style: spec.style,
                    source_id: spec.name.clone(),
                    kind: if background {
                        ProcessKind::Background(weighting)
                    } else {
                        ProcessKind::Signal(weighting)
                    },
                });
            }
            Err(Error::DataNotFound(reason)) => {
                warn!(source = %spec.name, reason = %reason, "simulated source skipped");
                report.skipped.push(SkipRecord {
                    source_id: spec.name.clone(),
                    category,
                    reason,
                });
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    fn active_panel_mut(&mut self) -> Result<&mut Panel> {
        let index = self.active;
        self.panels
            .get_mut(index)
            .ok_or_else(|| Error::Precondition("no grid; run create_grid first".into()))
    }

    fn compose_active(&mut self) -> Result<()> {
        let switches = self.switches;
        let panel = self.active_panel_mut()?;
        if panel.state == PanelState::Empty {
            return Err(Error::Precondition("nothing loaded on this panel".into()));
        }
        let composed = compose(panel.raw_view(), &switches, &panel.legend_settings)?;
        panel.ratio = if panel.ratio_requested {
            match composed.data.as_ref() {
                Some(d) if !composed.backgrounds.is_empty() => {
                    match compute_ratio(&d.histogram, &composed.backgrounds) {
                        Ok(r) => Some(r),
                        Err(e) => {
                            warn!(error = %e, "ratio dropped on recompose");
                            None
                        }
                    }
                }
                _ => {
                    warn!("ratio dropped on recompose: needs data and backgrounds");
                    None
                }
            }
        } else {
            None
        };
        panel.composed = Some(composed);
        panel.state = PanelState::Composed;
        Ok(())
    }

    fn frame_for_active(&self) -> Result<RenderFrame> {
        let panel = self
            .panels
            .get(self.active)
            .ok_or_else(|| Error::Precondition("no grid; run create_grid first".into()))?;
        let composed = panel
            .composed
            .as_ref()
            .ok_or_else(|| Error::Precondition("panel not composed".into()))?;
        Ok(build_frame(
            composed,
            &self.switches,
            FrameContext {
                panel_index: self.active,
                x_title: panel.x_title.as_deref(),
                y_title: panel.y_title.as_deref(),
                luminosity: self.luminosity,
                annotations: &panel.annotations,
                ratio: panel.ratio.as_ref(),
            },
        ))
    }

    fn render_active(&mut self) -> Result<()> {
        let frame = self.frame_for_active()?;
        self.adapter.render(&frame)?;
        self.panels[self.active].state = PanelState::Rendered;
        Ok(())
    }

    /// Recompose and re-render the active panel when it has content.
    fn refresh_active(&mut self) -> Result<()> {
        let loaded = self
            .panels
            .get(self.active)
            .map(|p| p.state >= PanelState::Loaded)
            .unwrap_or(false);
        if loaded {
            self.compose_active()?;
            self.render_active()?;
        }
        Ok(())
    }

    /// Re-render without recomposing, for display-only edits.
    fn rerender_if_composed(&mut self) -> Result<()> {
        let composed = self
            .panels
            .get(self.active)
            .map(|p| p.state >= PanelState::Composed)
            .unwrap_or(false);
        if composed {
            self.render_active()
        } else {
            Ok(())
        }
    }

    /// Compose the active panel if needed; error when nothing is loaded.
    fn ensure_composed(&mut self) -> Result<()> {
        match self.active_panel_mut()?.state {
            PanelState::Empty => Err(Error::Precondition("nothing loaded on this panel".into())),
            PanelState::Loaded => self.compose_active(),
            PanelState::Composed | PanelState::Rendered => Ok(()),
        }
    }

    /// Set one named switch from its textual value, then recompose and
    /// re-render the active panel. Every switch change invalidates all
    /// composed panel state.
    pub fn set_switch(&mut self, name: &str, value: &str) -> Result<()> {
        let mut switches = self.switches;
        match name {
            "draw_data" => switches.draw_data = parse_bool(value)?,
            "draw_background" => switches.draw_background = parse_bool(value)?,
            "draw_signal" => switches.draw_signal = parse_bool(value)?,
            "draw_systematics" => switches.draw_systematics = parse_bool(value)?,
            "stack_signal" => switches.stack_signal = parse_bool(value)?,
            "log_y" => switches.log_y = parse_bool(value)?,
            "bin_normalization_width" => {
                let v: f64 = value
                    .parse()
                    .map_err(|_| Error::Validation(format!("expected a number, got '{value}'")))?;
                if v < 0.0 || !v.is_finite() {
                    return Err(Error::Validation(format!(
                        "bin_normalization_width must be >= 0, got {v}"
                    )));
                }
                switches.bin_normalization_width = v;
            }
            "chi2_quantile" => {
                let v: f64 = value
                    .parse()
                    .map_err(|_| Error::Validation(format!("expected a number, got '{value}'")))?;
                if !v.is_finite() {
                    return Err(Error::Validation("chi2_quantile must be finite".into()));
                }
                switches.chi2_quantile = v;
            }
            other => return Err(Error::Validation(format!("unknown switch '{other}'"))),
        }
        info!(switch = name, value, "switch set");
        self.switches = switches;
        for p in &mut self.panels {
            p.demote_to_loaded();
        }
        self.refresh_active()
    }

    /// Toggle the logarithmic y axis.
    pub fn set_log_y(&mut self, on: bool) -> Result<()> {
        self.set_switch("log_y", if on { "true" } else { "false" })
    }

    /// Restrict the visible x range on the active panel and re-render.
    pub fn set_x_range(&mut self, lo: f64, hi: f64) -> Result<()> {
        self.set_range(lo, hi, true)
    }

    /// Restrict the visible y range on the active panel and re-render.
    pub fn set_y_range(&mut self, lo: f64, hi: f64) -> Result<()> {
        self.set_range(lo, hi, false)
    }

    fn set_range(&mut self, lo: f64, hi: f64, x_axis: bool) -> Result<()> {
        if !lo.is_finite() || !hi.is_finite() || !(hi > lo) {
            return Err(Error::Validation(format!(
                "range must satisfy min < max, got {lo} .. {hi}"
            )));
        }
        let panel = self.active_panel_mut()?;
        if !panel.has_raw() {
            return Err(Error::Precondition("nothing loaded on this panel".into()));
        }
        let window = Some((lo, hi));
        for h in panel.all_raw_histograms_mut() {
            if x_axis {
                h.x_window = window;
            } else {
                h.y_window = window;
            }
        }
        if let Some(c) = &mut panel.composed {
            for h in c.histograms_mut() {
                if x_axis {
                    h.x_window = window;
                } else {
                    h.y_window = window;
                }
            }
        }
        if let Some(r) = &mut panel.ratio {
            if x_axis {
                r.histogram.x_window = window;
            }
        }
        self.rerender_if_composed()
    }

    /// Rebin every raw data, background, and signal histogram of the
    /// active panel.
    ///
    /// Forbidden while loaded systematics are shown (the band is not
    /// re-derivable); only allowed from a composed panel. Rebinning by
    /// factor recomposes and re-renders immediately; rebinning by edges
    /// leaves the panel loaded, forcing a recompose on the next operation.
    pub fn rebin(&mut self, spec: RebinSpec) -> Result<()> {
        let switches = self.switches;
        let panel = self.active_panel_mut()?;
        if !panel.raw_systematics.is_empty() && switches.draw_systematics {
            return Err(Error::Precondition(
                "rebin is not allowed while systematics are shown".into(),
            ));
        }
        if panel.state < PanelState::Composed {
            return Err(Error::Precondition("rebin requires a composed panel".into()));
        }
        match &spec {
            RebinSpec::Factor(f) => {
                for h in panel.raw_shape_histograms_mut() {
                    rebin_factor(h, *f)?;
                }
            }
            RebinSpec::Edges(edges) => {
                for h in panel.raw_shape_histograms_mut() {
                    rebin_edges(h, edges)?;
                }
            }
        }
        panel.demote_to_loaded();
        if matches!(spec, RebinSpec::Factor(_)) {
            self.compose_active()?;
            self.render_active()?;
        }
        Ok(())
    }

    /// Replace every raw data, background, and signal histogram of the
    /// active panel with its cumulative tail-integral transform. Same
    /// preconditions as rebinning; leaves the panel loaded.
    pub fn cumulative(&mut self) -> Result<()> {
        let switches = self.switches;
        let panel = self.active_panel_mut()?;
        if !panel.raw_systematics.is_empty() && switches.draw_systematics {
            return Err(Error::Precondition(
                "cumulative transform is not allowed while systematics are shown".into(),
            ));
        }
        if panel.state < PanelState::Composed {
            return Err(Error::Precondition(
                "cumulative transform requires a composed panel".into(),
            ));
        }
        for h in panel.raw_shape_histograms_mut() {
            cumulative_transform(h);
        }
        panel.demote_to_loaded();
        Ok(())
    }

    /// Build (or refresh) the data over summed-background ratio for the
    /// active panel and re-render. The ratio sub-surface is created on the
    /// first request and reused afterwards.
    pub fn ratio(&mut self) -> Result<()> {
        self.ensure_composed()?;
        let active = self.active;
        let ratio = {
            let panel = &self.panels[active];
            let composed = panel
                .composed
                .as_ref()
                .ok_or_else(|| Error::Precondition("panel not composed".into()))?;
            let data = composed
                .data
                .as_ref()
                .ok_or_else(|| Error::Precondition("ratio requires loaded data".into()))?;
            compute_ratio(&data.histogram, &composed.backgrounds)?
        };
        if self.panels[active].ratio_surface.is_none() {
            let handle = self.adapter.ratio_surface(active)?;
            self.panels[active].ratio_surface = Some(handle);
        }
        let panel = &mut self.panels[active];
        panel.ratio = Some(ratio);
        panel.ratio_requested = true;
        self.render_active()
    }

    /// Set the x-axis title of the active panel.
    pub fn x_title(&mut self, text: &str) -> Result<()> {
        let panel = self.active_panel_mut()?;
        panel.x_title = Some(text.to_string());
        self.rerender_if_composed()
    }

    /// Set the y-axis title of the active panel. An empty text restores
    /// the derived `Events / <width> <unit>` default.
    pub fn y_title(&mut self, text: &str) -> Result<()> {
        let panel = self.active_panel_mut()?;
        panel.y_title = if text.is_empty() { None } else { Some(text.to_string()) };
        self.rerender_if_composed()
    }

    /// Attach the annotation block: the luminosity line on top plus the
    /// experiment label and optional extra text at `position`.
    pub fn annotation(&mut self, position: AnnotationPosition, extra: &str) -> Result<()> {
        let config = match &self.config {
            Some(c) => c,
            None => return Err(Error::Precondition("no configuration; run setup first".into())),
        };
        let energy = config.general.energy.clone();
        let experiment = config.general.experiment.clone();
        let fb = self.luminosity / 1000.0;
        let lumi_line = if energy.is_empty() {
            format!("{fb:.1} fb^-1")
        } else {
            format!("{fb:.1} fb^-1 ({energy})")
        };
        let mut blocks =
            vec![Annotation { position: AnnotationPosition::Top, lines: vec![lumi_line] }];
        let mut lines = Vec::new();
        if !experiment.is_empty() {
            lines.push(experiment);
        }
        if !extra.is_empty() {
            lines.push(extra.to_string());
        }
        if !lines.is_empty() {
            blocks.push(Annotation { position, lines });
        }
        let panel = self.active_panel_mut()?;
        panel.annotations = blocks;
        self.rerender_if_composed()
    }

    /// Adjust the legend knobs of the active panel and rebuild it.
    pub fn legend(&mut self, min_bin_height: Option<f64>, columns: Option<u32>) -> Result<()> {
        if let Some(m) = min_bin_height {
            if !(m >= 0.0) || !m.is_finite() {
                return Err(Error::Validation(format!(
                    "legend minimum bin height must be >= 0, got {m}"
                )));
            }
        }
        if columns == Some(0) {
            return Err(Error::Validation("legend needs at least one column".into()));
        }
        let panel = self.active_panel_mut()?;
        if let Some(m) = min_bin_height {
            panel.legend_settings.min_bin_height = m;
        }
        if let Some(c) = columns {
            panel.legend_settings.columns = c;
        }
        panel.demote_to_loaded();
        self.refresh_active()
    }

    /// Clear the active panel back to empty.
    pub fn reset(&mut self) -> Result<()> {
        let active = self.active;
        self.active_panel_mut()?.clear();
        info!(panel = active, "panel reset");
        Ok(())
    }

    /// Persist the active panel's frame. With no path, the default is
    /// `plots/<histogram>.json`. Composes first when needed.
    pub fn save(&mut self, path: Option<&Path>) -> Result<PathBuf> {
        self.ensure_composed()?;
        let frame = self.frame_for_active()?;
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let name = self.panels[self.active]
                    .histogram_name
                    .clone()
                    .unwrap_or_else(|| format!("panel{}", self.active));
                default_save_path(&name)
            }
        };
        self.adapter.save(&frame, &path)?;
        self.panels[self.active].state = PanelState::Rendered;
        Ok(path)
    }

    /// Human-readable session summary.
    pub fn status(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let _ = writeln!(out, "grid: {}x{}, active panel: {}", self.grid.0, self.grid.1, self.active);
        let _ = writeln!(
            out,
            "selection: {}",
            if self.selection.is_empty() { "(none)" } else { &self.selection }
        );
        let _ = writeln!(out, "luminosity: {} pb^-1", self.luminosity);
        let s = &self.switches;
        let _ = writeln!(
            out,
            "switches: draw_data={} draw_background={} draw_signal={} draw_systematics={} \
             stack_signal={} log_y={} bin_normalization_width={} chi2_quantile={}",
            s.draw_data,
            s.draw_background,
            s.draw_signal,
            s.draw_systematics,
            s.stack_signal,
            s.log_y,
            s.bin_normalization_width,
            s.chi2_quantile
        );
        for (i, p) in self.panels.iter().enumerate() {
            let state = match p.state {
                PanelState::Empty => "empty",
                PanelState::Loaded => "loaded",
                PanelState::Composed => "composed",
                PanelState::Rendered => "rendered",
            };
            match &p.histogram_name {
                Some(name) => {
                    let _ = writeln!(
                        out,
                        "panel {i}: {state} ('{name}', {} data, {} backgrounds, {} signals, {} systematics{})",
                        p.raw_data.len(),
                        p.raw_backgrounds.len(),
                        p.raw_signals.len(),
                        p.raw_systematics.len(),
                        if p.ratio.is_some() { ", ratio" } else { "" }
                    );
                }
                None => {
                    let _ = writeln!(out, "panel {i}: {state}");
                }
            }
        }
        out
    }

    /// Current display switches.
    pub fn switches(&self) -> &Switches {
        &self.switches
    }

    /// Summed data luminosity of the most recent load.
    pub fn luminosity(&self) -> f64 {
        self.luminosity
    }

    /// The panel grid.
    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Active panel index.
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Grid dimensions (cols, rows); (0, 0) before `create_grid`.
    pub fn grid(&self) -> (usize, usize) {
        self.grid
    }

    /// The render adapter, for inspection.
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// True once a configuration is installed.
    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }
}
