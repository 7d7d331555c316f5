//! Histogram source boundary: where raw distributions come from.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use serde::Deserialize;
use sp_core::{Error, Histogram, Result};

/// Supplier of named histograms, one file or store per source.
///
/// A missing source or missing histogram is the non-fatal
/// [`Error::DataNotFound`] condition; loads skip the source and report it.
pub trait HistogramSource {
    /// Fetch `histogram_key` from the store of `source_id`.
    fn fetch(&self, source_id: &str, histogram_key: &str) -> Result<Histogram>;
}

/// JSON file layout for one source: a map of histogram payloads by key.
#[derive(Debug, Deserialize)]
struct SourceFile {
    histograms: BTreeMap<String, RawHistogram>,
}

#[derive(Debug, Deserialize)]
struct RawHistogram {
    bin_edges: Vec<f64>,
    bin_content: Vec<f64>,
    /// Sum of weights squared per bin; errors fall back to sqrt(content).
    #[serde(default)]
    sumw2: Option<Vec<f64>>,
    #[serde(default)]
    x_title: Option<String>,
    #[serde(default)]
    y_title: Option<String>,
}

/// Directory of `<source_id>.json` files.
#[derive(Debug, Clone)]
pub struct JsonDirectorySource {
    root: PathBuf,
}

impl JsonDirectorySource {
    /// Source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl HistogramSource for JsonDirectorySource {
    fn fetch(&self, source_id: &str, histogram_key: &str) -> Result<Histogram> {
        let path = self.root.join(format!("{source_id}.json"));
        if !path.is_file() {
            return Err(Error::DataNotFound(format!(
                "source file '{}' not found",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(&path)?;
        let file: SourceFile = serde_json::from_str(&text).map_err(|e| {
            Error::Validation(format!("cannot parse source file {}: {e}", path.display()))
        })?;
        let raw = file.histograms.get(histogram_key).ok_or_else(|| {
            Error::DataNotFound(format!(
                "histogram '{histogram_key}' not in source '{source_id}'"
            ))
        })?;
        raw.to_histogram(histogram_key, source_id)
    }
}

impl RawHistogram {
    fn to_histogram(&self, key: &str, source_id: &str) -> Result<Histogram> {
        let error: Vec<f64> = match &self.sumw2 {
            Some(sumw2) => {
                if sumw2.len() != self.bin_content.len() {
                    return Err(Error::Validation(format!(
                        "histogram '{key}' in '{source_id}': sumw2 length {} != {} bins",
                        sumw2.len(),
                        self.bin_content.len()
                    )));
                }
                sumw2.iter().map(|s| s.max(0.0).sqrt()).collect()
            }
            None => self.bin_content.iter().map(|c| c.max(0.0).sqrt()).collect(),
        };
        let mut hist = Histogram::new(key, self.bin_edges.clone(), self.bin_content.clone(), error)?;
        if let Some(t) = &self.x_title {
            hist.x_title = t.clone();
        }
        if let Some(t) = &self.y_title {
            hist.y_title = t.clone();
        }
        Ok(hist)
    }
}

/// In-memory source for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    histograms: HashMap<(String, String), Histogram>,
}

impl MemorySource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a histogram under `(source_id, histogram_key)`.
    pub fn insert(
        &mut self,
        source_id: impl Into<String>,
        histogram_key: impl Into<String>,
        histogram: Histogram,
    ) {
        self.histograms.insert((source_id.into(), histogram_key.into()), histogram);
    }
}

impl HistogramSource for MemorySource {
    fn fetch(&self, source_id: &str, histogram_key: &str) -> Result<Histogram> {
        self.histograms
            .get(&(source_id.to_string(), histogram_key.to_string()))
            .cloned()
            .ok_or_else(|| {
                Error::DataNotFound(format!(
                    "histogram '{histogram_key}' not in source '{source_id}'"
                ))
            })
    }
}
