//! # sp-core
//!
//! Core data model for StackPlot: the owned [`Histogram`] value type with
//! binned arithmetic, weighted styled [`Process`] wrappers, the global
//! display [`Switches`], and the shared error taxonomy.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod histogram;
pub mod process;
pub mod switches;

pub use error::{Error, Result};
pub use histogram::Histogram;
pub use process::{Process, ProcessKind, StyleAttrs, StyleTag, Weighting};
pub use switches::Switches;

/// Workspace version, recorded in saved frame artifacts.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
