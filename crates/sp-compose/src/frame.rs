//! Render-frame artifact (numbers-first) and the adapter boundary.

use std::path::Path;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use sp_core::{Error, Process, Result, StyleAttrs, StyleTag, Switches};

use crate::compose::{ComposedPanel, DrawEntry};
use crate::data_errors::data_errors;
use crate::legend::Legend;
use crate::ratio::Ratio;

/// Schema version of saved frame artifacts.
pub const FRAME_SCHEMA_VERSION: &str = "1";

/// Units recognized at the end of an x-axis title when deriving the y title.
const AXIS_UNITS: [&str; 4] = ["GeV", "TeV", "cm", "rad"];

/// Provenance block carried by every frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameMeta {
    /// Producing tool.
    pub tool: String,
    /// Tool version.
    pub tool_version: String,
    /// Creation timestamp, milliseconds since the Unix epoch.
    pub created_unix_ms: u128,
}

impl FrameMeta {
    fn now() -> Self {
        let created_unix_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        Self {
            tool: "stackplot".to_string(),
            tool_version: sp_core::VERSION.to_string(),
            created_unix_ms,
        }
    }
}

/// Where an annotation block is anchored on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationPosition {
    /// Outside the frame, above the plot.
    Top,
    /// Inside, upper left.
    Left,
    /// Inside, upper center.
    Center,
    /// Inside, upper right.
    Right,
}

impl FromStr for AnnotationPosition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "top" => Ok(Self::Top),
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            other => Err(Error::Validation(format!(
                "unknown annotation position '{other}' (expected top|left|center|right)"
            ))),
        }
    }
}

/// A block of text lines anchored at a position; placement is the
/// adapter's concern.
#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    /// Anchor position.
    pub position: AnnotationPosition,
    /// Text lines, top to bottom.
    pub lines: Vec<String>,
}

/// One drawable series of the frame, in draw order.
#[derive(Debug, Clone, Serialize)]
pub struct FrameSeries {
    /// Display label.
    pub name: String,
    /// Role in the plot: stack_layer, band, data, or signal.
    pub role: String,
    /// Render style class.
    pub style_tag: StyleTag,
    /// Pass-through display attributes.
    pub style: StyleAttrs,
    /// Bin values (cumulative for stack layers).
    pub y: Vec<f64>,
    /// Downward error per bin.
    pub err_lo: Vec<f64>,
    /// Upward error per bin.
    pub err_hi: Vec<f64>,
}

/// Ratio sub-panel payload. Undefined bins serialize as null.
#[derive(Debug, Clone, Serialize)]
pub struct RatioFrame {
    /// Per-bin data/prediction, NaN (null in JSON) where undefined.
    pub y: Vec<f64>,
    /// Per-bin ratio error.
    pub err: Vec<f64>,
    /// False where the denominator was zero.
    pub defined: Vec<bool>,
    /// Horizontal guide line value.
    pub reference_line: f64,
    /// Y-axis title of the sub-panel.
    pub y_title: String,
}

impl RatioFrame {
    fn from_ratio(r: &Ratio) -> Self {
        Self {
            y: r.histogram.bin_content.clone(),
            err: r.histogram.bin_error.clone(),
            defined: r.defined.clone(),
            reference_line: r.reference_line,
            y_title: r.histogram.y_title.clone(),
        }
    }
}

/// The composed, ordered, styled description of one panel handed to the
/// render adapter and saved as a JSON artifact.
#[derive(Debug, Clone, Serialize)]
pub struct RenderFrame {
    /// Artifact schema version.
    pub schema_version: String,
    /// Provenance.
    pub meta: FrameMeta,
    /// Panel index within the grid.
    pub panel_index: usize,
    /// Bin edges shared by every series.
    pub bin_edges: Vec<f64>,
    /// X-axis title.
    pub x_title: String,
    /// Y-axis title.
    pub y_title: String,
    /// Visible x-range, if restricted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_window: Option<(f64, f64)>,
    /// Visible y-range, if restricted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_window: Option<(f64, f64)>,
    /// Logarithmic y axis.
    pub log_y: bool,
    /// Summed data luminosity of the most recent load.
    pub luminosity: f64,
    /// Drawable series, first at the bottom.
    pub series: Vec<FrameSeries>,
    /// Legend in display order.
    pub legend: Legend,
    /// Annotation blocks.
    pub annotations: Vec<Annotation>,
    /// Ratio sub-panel, when one was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<RatioFrame>,
}

/// Panel-side inputs to frame assembly beyond the composed lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameContext<'a> {
    /// Panel index within the grid.
    pub panel_index: usize,
    /// Panel-level x-title override.
    pub x_title: Option<&'a str>,
    /// Panel-level y-title override.
    pub y_title: Option<&'a str>,
    /// Summed data luminosity.
    pub luminosity: f64,
    /// Annotation blocks to carry.
    pub annotations: &'a [Annotation],
    /// Ratio sub-panel, when present.
    pub ratio: Option<&'a Ratio>,
}

/// Assemble the render frame for one composed panel.
pub fn build_frame(
    composed: &ComposedPanel,
    switches: &Switches,
    ctx: FrameContext<'_>,
) -> RenderFrame {
    let reference = composed.reference();
    let bin_edges = reference.map(|r| r.bin_edges.clone()).unwrap_or_default();
    let x_title = ctx
        .x_title
        .map(str::to_string)
        .or_else(|| reference.map(|r| r.x_title.clone()))
        .unwrap_or_default();
    let y_title = ctx
        .y_title
        .map(str::to_string)
        .or_else(|| reference.map(|r| r.y_title.clone()).filter(|t| !t.is_empty()))
        .unwrap_or_else(|| {
            let width = reference.and_then(|r| r.visible_bins().next().map(|i| r.bin_width(i)));
            derive_y_title(&x_title, width)
        });

    let mut series = Vec::new();
    for entry in &composed.draw_order {
        match entry {
            DrawEntry::Stack => {
                for layer in &composed.stack.layers {
                    series.push(symmetric_series(layer, "stack_layer"));
                }
            }
            DrawEntry::Band => {
                if let Some(b) = &composed.band {
                    series.push(symmetric_series(b, "band"));
                }
            }
            DrawEntry::Data => {
                if let Some(d) = &composed.data {
                    let (err_lo, err_hi) = data_errors(
                        &d.histogram.bin_content,
                        &d.histogram.bin_error,
                        switches.poisson_errors(),
                    );
                    series.push(FrameSeries {
                        name: d.label.clone(),
                        role: "data".to_string(),
                        style_tag: d.style_tag,
                        style: d.style,
                        y: d.histogram.bin_content.clone(),
                        err_lo,
                        err_hi,
                    });
                }
            }
            DrawEntry::Signal(i) => {
                if let Some(s) = composed.signals.get(*i) {
                    series.push(symmetric_series(s, "signal"));
                }
            }
        }
    }

    RenderFrame {
        schema_version: FRAME_SCHEMA_VERSION.to_string(),
        meta: FrameMeta::now(),
        panel_index: ctx.panel_index,
        bin_edges,
        x_title,
        y_title,
        x_window: reference.and_then(|r| r.x_window),
        y_window: reference.and_then(|r| r.y_window),
        log_y: switches.log_y,
        luminosity: ctx.luminosity,
        series,
        legend: composed.legend.clone(),
        annotations: ctx.annotations.to_vec(),
        ratio: ctx.ratio.map(RatioFrame::from_ratio),
    }
}

fn symmetric_series(p: &Process, role: &str) -> FrameSeries {
    FrameSeries {
        name: p.label.clone(),
        role: role.to_string(),
        style_tag: p.style_tag,
        style: p.style,
        y: p.histogram.bin_content.clone(),
        err_lo: p.histogram.bin_error.clone(),
        err_hi: p.histogram.bin_error.clone(),
    }
}

/// Derive a y-axis title from the x title and the first visible bin width:
/// `Events / <width> <unit>` when the x title ends in a known unit, plain
/// `Events` otherwise.
pub fn derive_y_title(x_title: &str, bin_width: Option<f64>) -> String {
    let unit = x_title
        .split_whitespace()
        .last()
        .map(|t| t.trim_matches(|c| matches!(c, '[' | ']' | '(' | ')')))
        .filter(|t| AXIS_UNITS.contains(t));
    match (unit, bin_width) {
        (Some(u), Some(w)) => format!("Events / {} {}", format_width(w), u),
        _ => "Events".to_string(),
    }
}

fn format_width(w: f64) -> String {
    if (w - w.round()).abs() < 1e-9 {
        format!("{}", w.round() as i64)
    } else {
        let s = format!("{w:.2}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Opaque handle to a ratio sub-surface; allocated once per panel, reused
/// afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SurfaceHandle(pub u64);

/// Drawing boundary. The engine decides what to draw and in what order;
/// implementations decide how pixels (or artifacts) are produced.
pub trait RenderAdapter {
    /// Present one composed frame.
    fn render(&mut self, frame: &RenderFrame) -> Result<()>;

    /// Persist one composed frame to `path`.
    fn save(&mut self, frame: &RenderFrame, path: &Path) -> Result<()>;

    /// Create the ratio sub-surface for `panel_index`, or return the one
    /// created earlier.
    fn ratio_surface(&mut self, panel_index: usize) -> Result<SurfaceHandle>;
}
