//! Plot configuration (YAML) parsing + semantic validation.
//!
//! One file drives a session: the data/background/signal/systematic source
//! lists with their display styles, the global switches, and pointers to
//! the cross-section table and the histogram source directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use sp_core::{Error, Result, StyleAttrs, Switches};

/// Whole configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct PlotConfig {
    /// Global settings and switches.
    pub general: GeneralSection,
    /// Observed data sources.
    #[serde(default)]
    pub data: Vec<DataSource>,
    /// Simulated background sources.
    #[serde(default)]
    pub backgrounds: Vec<NamedSource>,
    /// Simulated signal sources.
    #[serde(default)]
    pub signals: Vec<NamedSource>,
    /// Relative systematic sources.
    #[serde(default)]
    pub systematics: Vec<NamedSource>,
}

/// The `general` section.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralSection {
    /// Shared label for all data sources (they merge into one entry).
    #[serde(default = "default_data_label")]
    pub data_label: String,
    /// Prefix prepended to histogram names when querying sources.
    #[serde(default)]
    pub hist_prefix: String,
    /// Path to the cross-section table, relative to the config file.
    /// Required whenever simulated sources are configured.
    #[serde(default)]
    pub cross_sections: Option<PathBuf>,
    /// Directory holding per-source histogram files, relative to the
    /// config file.
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    /// Experiment label for annotations.
    #[serde(default)]
    pub experiment: String,
    /// Collision energy text for the luminosity annotation, e.g. "8 TeV".
    #[serde(default)]
    pub energy: String,
    /// Initial display switches.
    #[serde(flatten)]
    pub switches: Switches,
}

/// One observed-data source.
#[derive(Debug, Clone, Deserialize)]
pub struct DataSource {
    /// Source identifier (also the histogram file stem).
    pub name: String,
    /// Integrated luminosity this source contributes, in inverse picobarns.
    pub luminosity: f64,
    /// Display attributes.
    #[serde(default)]
    pub style: StyleAttrs,
}

/// One simulated or systematic source.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedSource {
    /// Source identifier (also the histogram file stem).
    pub name: String,
    /// Display label; sources sharing a label merge into one entry.
    pub label: String,
    /// Display attributes.
    #[serde(default)]
    pub style: StyleAttrs,
}

fn default_data_label() -> String {
    "Data".to_string()
}

fn default_source_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Join `p` onto `base_dir` unless it is already absolute.
pub fn resolve_path(base_dir: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() { p.to_path_buf() } else { base_dir.join(p) }
}

fn contains_duplicates(values: &[String]) -> Option<String> {
    let mut xs: Vec<&str> = values.iter().map(|s| s.as_str()).collect();
    xs.sort();
    for w in xs.windows(2) {
        if w[0] == w[1] {
            return Some(w[0].to_string());
        }
    }
    None
}

impl PlotConfig {
    /// Read and validate a configuration file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: PlotConfig = serde_yaml_ng::from_str(&text)
            .map_err(|e| Error::Config(format!("cannot parse {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Semantic validation beyond what serde enforces. Fails before any
    /// panel operation can run against a broken configuration.
    pub fn validate(&self) -> Result<()> {
        if self.general.data_label.trim().is_empty() {
            return Err(Error::Config("general.data_label must be non-empty".into()));
        }
        let mut names: Vec<String> = self.data.iter().map(|d| d.name.clone()).collect();
        names.extend(self.simulated_sources().map(|s| s.name.clone()));
        names.extend(self.systematics.iter().map(|s| s.name.clone()));
        if let Some(dup) = contains_duplicates(&names) {
            return Err(Error::Config(format!("duplicate source name: {dup}")));
        }
        for d in &self.data {
            if !(d.luminosity > 0.0) || !d.luminosity.is_finite() {
                return Err(Error::Config(format!(
                    "data source '{}' luminosity must be positive, got {}",
                    d.name, d.luminosity
                )));
            }
        }
        for s in self.named_sources() {
            if s.label.trim().is_empty() {
                return Err(Error::Config(format!(
                    "source '{}' label must be non-empty",
                    s.name
                )));
            }
        }
        if self.simulated_sources().next().is_some() && self.general.cross_sections.is_none() {
            return Err(Error::Config(
                "general.cross_sections is required when simulated sources are configured".into(),
            ));
        }
        let sw = &self.general.switches;
        if sw.bin_normalization_width < 0.0 || !sw.bin_normalization_width.is_finite() {
            return Err(Error::Config(format!(
                "bin_normalization_width must be >= 0, got {}",
                sw.bin_normalization_width
            )));
        }
        if !sw.chi2_quantile.is_finite() {
            return Err(Error::Config("chi2_quantile must be finite".into()));
        }
        Ok(())
    }

    /// Background and signal sources, the ones that need cross-sections.
    pub fn simulated_sources(&self) -> impl Iterator<Item = &NamedSource> {
        self.backgrounds.iter().chain(self.signals.iter())
    }

    /// Every labeled source section (backgrounds, signals, systematics).
    pub fn named_sources(&self) -> impl Iterator<Item = &NamedSource> {
        self.backgrounds.iter().chain(self.signals.iter()).chain(self.systematics.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<PlotConfig> {
        let config: PlotConfig = serde_yaml_ng::from_str(text)
            .map_err(|e| Error::Config(format!("parse: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    const MINIMAL: &str = r#"
general:
  hist_prefix: "h1_"
  cross_sections: "xsec.yaml"
data:
  - name: data_2012
    luminosity: 19700.0
backgrounds:
  - name: qcd_ht500
    label: QCD
    style: { fill_color: 401, fill_style: 1001 }
  - name: qcd_ht1000
    label: QCD
signals:
  - name: susy_m500
    label: "SUSY (500)"
    style: { line_color: 2 }
"#;

    #[test]
    fn minimal_config_parses_with_defaults() {
        let c = parse(MINIMAL).unwrap();
        assert_eq!(c.general.data_label, "Data");
        assert_eq!(c.general.hist_prefix, "h1_");
        assert!(c.general.switches.draw_data);
        assert!(!c.general.switches.stack_signal);
        assert_eq!(c.backgrounds.len(), 2);
        assert_eq!(c.backgrounds[1].label, "QCD");
        assert_eq!(c.signals[0].style.line_color, Some(2));
    }

    #[test]
    fn switches_can_be_overridden_in_general() {
        let text = r#"
general:
  cross_sections: "xsec.yaml"
  stack_signal: true
  chi2_quantile: 1.0
  draw_systematics: true
backgrounds:
  - name: bkg
    label: Bkg
"#;
        let c = parse(text).unwrap();
        assert!(c.general.switches.stack_signal);
        assert!(c.general.switches.draw_systematics);
        assert_eq!(c.general.switches.chi2_quantile, 1.0);
    }

    #[test]
    fn duplicate_source_names_are_rejected() {
        let text = r#"
general: {}
data:
  - name: same
    luminosity: 1000.0
systematics:
  - name: same
    label: Syst
"#;
        let err = parse(text).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("duplicate source name: same"));
    }

    #[test]
    fn nonpositive_luminosity_is_rejected() {
        let text = r#"
general: {}
data:
  - name: d
    luminosity: 0.0
"#;
        assert!(parse(text).is_err());
    }

    #[test]
    fn simulated_sources_require_a_cross_section_table() {
        let text = r#"
general: {}
backgrounds:
  - name: bkg
    label: Bkg
"#;
        let err = parse(text).unwrap_err();
        assert!(err.to_string().contains("cross_sections"));
    }

    #[test]
    fn empty_label_is_rejected() {
        let text = r#"
general:
  cross_sections: x.yaml
signals:
  - name: sig
    label: "  "
"#;
        assert!(parse(text).is_err());
    }

    #[test]
    fn resolve_path_keeps_absolute_paths() {
        let base = Path::new("/work/cfg");
        assert_eq!(resolve_path(base, Path::new("xsec.yaml")), PathBuf::from("/work/cfg/xsec.yaml"));
        assert_eq!(resolve_path(base, Path::new("/etc/xsec.yaml")), PathBuf::from("/etc/xsec.yaml"));
    }
}
