//! Global display switches shared by composition and the session.

use serde::{Deserialize, Serialize};

/// Session-wide display switches. Any change invalidates composed panel
/// state, which must be recomposed before the next render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Switches {
    /// Draw the observed data points.
    pub draw_data: bool,
    /// Draw the stacked background components.
    pub draw_background: bool,
    /// Draw the signal hypotheses.
    pub draw_signal: bool,
    /// Draw the systematic uncertainty band.
    pub draw_systematics: bool,
    /// Stack signals on top of the summed background instead of overlaying.
    pub stack_signal: bool,
    /// Logarithmic y axis.
    pub log_y: bool,
    /// Default width for bin-width normalization; <= 0 means unset.
    pub bin_normalization_width: f64,
    /// Exactly 1.0 switches data errors to central Poisson intervals.
    pub chi2_quantile: f64,
}

impl Default for Switches {
    fn default() -> Self {
        Self {
            draw_data: true,
            draw_background: true,
            draw_signal: true,
            draw_systematics: false,
            stack_signal: false,
            log_y: false,
            bin_normalization_width: 0.0,
            chi2_quantile: 0.0,
        }
    }
}

impl Switches {
    /// True when data errors come from central Poisson intervals.
    pub fn poisson_errors(&self) -> bool {
        self.chi2_quantile == 1.0
    }
}
