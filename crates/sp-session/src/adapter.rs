//! JSON frame adapter: persists composed frames as artifacts.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use sp_compose::{RenderAdapter, RenderFrame, SurfaceHandle};
use sp_core::Result;
use tracing::info;

/// Render adapter that serializes frames to numbers-first JSON artifacts.
/// `render` keeps the latest frame per panel in memory (the readiness
/// contract); `save` writes it out.
#[derive(Debug, Default)]
pub struct JsonFrameAdapter {
    frames: HashMap<usize, RenderFrame>,
    surfaces: HashMap<usize, SurfaceHandle>,
    next_surface: u64,
}

impl JsonFrameAdapter {
    /// Fresh adapter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest frame rendered for a panel, if any.
    pub fn frame(&self, panel_index: usize) -> Option<&RenderFrame> {
        self.frames.get(&panel_index)
    }

    /// Number of ratio surfaces allocated so far.
    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }
}

impl RenderAdapter for JsonFrameAdapter {
    fn render(&mut self, frame: &RenderFrame) -> Result<()> {
        self.frames.insert(frame.panel_index, frame.clone());
        Ok(())
    }

    fn save(&mut self, frame: &RenderFrame, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = fs::File::create(path)?;
        serde_json::to_writer_pretty(file, frame)?;
        info!(path = %path.display(), panel = frame.panel_index, "frame saved");
        Ok(())
    }

    fn ratio_surface(&mut self, panel_index: usize) -> Result<SurfaceHandle> {
        if let Some(handle) = self.surfaces.get(&panel_index) {
            return Ok(*handle);
        }
        let handle = SurfaceHandle(self.next_surface);
        self.next_surface += 1;
        self.surfaces.insert(panel_index, handle);
        Ok(handle)
    }
}
