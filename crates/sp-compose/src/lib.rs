//! # sp-compose
//!
//! Stateless composition engine for StackPlot: merging, ordering, stacking,
//! uncertainty bands, cumulative and rebinning transforms, ratio synthesis,
//! legend assembly, and the render-frame artifact handed to adapters.
//!
//! Everything here operates on plain [`sp_core::Process`] lists and returns
//! owned results; session state lives elsewhere.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod band;
pub mod compose;
pub mod data_errors;
pub mod frame;
pub mod legend;
pub mod merge;
pub mod order;
pub mod ratio;
pub mod stack;
pub mod transform;

pub use band::band;
pub use compose::{compose, ComposedPanel, DrawEntry, RawView};
pub use data_errors::{data_errors, garwood_68_interval};
pub use frame::{
    build_frame, derive_y_title, Annotation, AnnotationPosition, FrameContext, FrameMeta,
    FrameSeries, RatioFrame, RenderAdapter, RenderFrame, SurfaceHandle, FRAME_SCHEMA_VERSION,
};
pub use legend::{build_legend, Legend, LegendEntry, LegendSettings, DEFAULT_MIN_BIN_HEIGHT};
pub use merge::{merge, MergeMode};
pub use order::order;
pub use ratio::{ratio, Ratio};
pub use stack::{stack, Stack};
pub use transform::{
    cumulative, normalize_bin_widths, rebin_edges, rebin_factor, resolve_base_width,
};
