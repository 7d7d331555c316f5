//! Weighted, styled processes grouped into plot categories.

use serde::{Deserialize, Serialize};

use crate::histogram::Histogram;

/// How the render adapter should draw a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleTag {
    /// Markers with error bars (data).
    Point,
    /// Filled area (stacked backgrounds, stacked signals).
    Filled,
    /// Hatched band spanning content +/- error (systematics).
    UncertaintyBand,
}

/// Opaque display attributes passed through to the render adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleAttrs {
    /// Fill pattern code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_style: Option<i32>,
    /// Fill color code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<i32>,
    /// Line pattern code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_style: Option<i32>,
    /// Line color code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_color: Option<i32>,
    /// Marker shape code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker_style: Option<i32>,
    /// Marker color code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker_color: Option<i32>,
    /// Marker size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker_size: Option<f64>,
}

/// Cross-section weighting for a simulated source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weighting {
    /// Production cross-section, >= 0.
    pub cross_section: f64,
    /// Extra multiplicative weight.
    pub weight: f64,
    /// Generated event count, > 0.
    pub event_count: u64,
}

impl Weighting {
    /// Scale factor applied to raw yields: weight * xs * lumi / events.
    pub fn scale_factor(&self, luminosity: f64) -> f64 {
        self.weight * self.cross_section * luminosity / self.event_count as f64
    }
}

/// Plot category of a process. Only the simulated kinds carry weighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum ProcessKind {
    /// Observed data; never cross-section-scaled.
    Data,
    /// Simulated background component.
    Background(Weighting),
    /// Simulated signal hypothesis.
    Signal(Weighting),
    /// Relative systematic uncertainty per bin.
    Systematic,
}

impl ProcessKind {
    /// True for the cross-section-scaled kinds.
    pub fn is_simulated(&self) -> bool {
        matches!(self, ProcessKind::Background(_) | ProcessKind::Signal(_))
    }

    /// Category name for diagnostics and artifacts.
    pub fn category(&self) -> &'static str {
        match self {
            ProcessKind::Data => "data",
            ProcessKind::Background(_) => "background",
            ProcessKind::Signal(_) => "signal",
            ProcessKind::Systematic => "systematic",
        }
    }
}

/// A named, styled histogram with provenance.
#[derive(Debug, Clone)]
pub struct Process {
    /// The distribution itself.
    pub histogram: Histogram,
    /// Display label; merging groups by exact label equality.
    pub label: String,
    /// Render style class.
    pub style_tag: StyleTag,
    /// Pass-through display attributes.
    pub style: StyleAttrs,
    /// Identifier of the source this process was loaded from.
    pub source_id: String,
    /// Category plus weighting where applicable.
    pub kind: ProcessKind,
}

impl Process {
    /// Integral of the underlying histogram over its visible range.
    pub fn integral(&self) -> f64 {
        self.histogram.integral()
    }
}
