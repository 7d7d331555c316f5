//! Cross-section table: per-source weighting for simulated yields.

use std::collections::BTreeMap;
use std::path::Path;

use sp_core::{Error, Result, Weighting};

/// Mapping from source identifier to its cross-section weighting.
/// Consulted only for background and signal sources; validated eagerly at
/// setup so a missing entry never surfaces mid-load.
#[derive(Debug, Clone, Default)]
pub struct XsecTable {
    entries: BTreeMap<String, Weighting>,
}

impl XsecTable {
    /// Read and validate a YAML table (`name -> {cross_section, weight,
    /// event_count}`).
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let entries: BTreeMap<String, Weighting> = serde_yaml_ng::from_str(&text)
            .map_err(|e| Error::Config(format!("cannot parse {}: {e}", path.display())))?;
        let table = Self { entries };
        table.validate()?;
        Ok(table)
    }

    /// Table from explicit entries (fixtures and embedding).
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Weighting)>) -> Result<Self> {
        let table = Self { entries: entries.into_iter().collect() };
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<()> {
        for (name, w) in &self.entries {
            if !(w.cross_section >= 0.0) || !w.cross_section.is_finite() {
                return Err(Error::Config(format!(
                    "cross-section for '{name}' must be >= 0, got {}",
                    w.cross_section
                )));
            }
            if !w.weight.is_finite() {
                return Err(Error::Config(format!("weight for '{name}' must be finite")));
            }
            if w.event_count == 0 {
                return Err(Error::Config(format!(
                    "event count for '{name}' must be > 0"
                )));
            }
        }
        Ok(())
    }

    /// Weighting for one source.
    pub fn get(&self, source: &str) -> Option<&Weighting> {
        self.entries.get(source)
    }

    /// Require an entry for every named source; reports the first missing
    /// one (names iterate in configuration order).
    pub fn require<'a>(&self, sources: impl Iterator<Item = &'a str>) -> Result<()> {
        for name in sources {
            if !self.entries.contains_key(name) {
                return Err(Error::Config(format!(
                    "no cross-section entry for simulated source '{name}'"
                )));
            }
        }
        Ok(())
    }
}
