//! Session layer: configuration, histogram sources, the panel grid, and
//! the interactive operations that drive composition and rendering.
//!
//! A [`Session`] owns the panel grid and the global display switches. It
//! pulls raw distributions from a [`HistogramSource`], scales simulated
//! yields by the configured cross-sections, composes panels through
//! `sp-compose`, and hands frames to a [`RenderAdapter`]
//! (`sp_compose::RenderAdapter`); the default adapter persists them as
//! JSON artifacts.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod config;
pub mod panel;
pub mod session;
pub mod source;
pub mod xsec;

pub use adapter::JsonFrameAdapter;
pub use config::{DataSource, GeneralSection, NamedSource, PlotConfig};
pub use panel::{Panel, PanelState};
pub use session::{
    default_save_path, LoadRecord, LoadReport, RebinSpec, Session, SkipRecord, MAX_GRID_COLS,
    MAX_GRID_ROWS,
};
pub use source::{HistogramSource, JsonDirectorySource, MemorySource};
pub use xsec::XsecTable;
