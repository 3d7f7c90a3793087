//! Benchmark comparison between a candidate and a reference implementation.
//!
//! Results for each platform live in two JSON documents named
//! `benchmarks.<platform>.<implementation>.json`. [`BenchmarkSet`] locates
//! and parses them; [`compare()`] joins them into rows of throughput ratios;
//! [`ChartSpec`] turns the rows into something a browser can draw.

mod error;
mod document;
mod comparison;
mod platform;
mod chart;

pub use error::*;
pub use document::*;
pub use comparison::*;
pub use platform::*;
pub use chart::*;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// An implementation whose results are being compared: `key` names its
/// results files, `label` is how it's shown to readers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Implementation {
    pub key: String,
    pub label: String,
}

impl Implementation {
    pub fn new<K: Into<String>, L: Into<String>>(key: K, label: L) -> Self {
        Implementation { key: key.into(), label: label.into() }
    }

    pub fn default_candidate() -> Self {
        Implementation::new("luaradio", "LuaRadio")
    }

    pub fn default_reference() -> Self {
        Implementation::new("gnuradio", "GNU Radio")
    }
}

/// A directory of benchmark results for a candidate and a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkSet {
    pub dir: PathBuf,
    pub candidate: Implementation,
    pub reference: Implementation,
}

impl BenchmarkSet {
    pub fn new<P: AsRef<Path>>(dir: P, candidate: Implementation, reference: Implementation) -> Self {
        BenchmarkSet { dir: dir.as_ref().to_path_buf(), candidate, reference }
    }

    /// A set in `dir` using the default implementations.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        BenchmarkSet::new(dir, Implementation::default_candidate(), Implementation::default_reference())
    }

    /// Path of `implementation`'s results on `platform`.
    pub fn path(&self, platform: &str, implementation: &Implementation) -> Result<PathBuf, BenchmarkError> {
        let valid = !platform.is_empty()
            && platform != "."
            && platform != ".."
            && !platform.contains(|c: char| c == '/' || c == '\\' || c.is_control());

        if !valid {
            return Err(BenchmarkError::InvalidPlatform(platform.to_string()));
        }

        Ok(self.dir.join(format!("benchmarks.{platform}.{}.json", implementation.key)))
    }

    /// Loads the `(candidate, reference)` documents for `platform`. Fails if
    /// either is missing or invalid; nothing is returned for the other.
    pub fn load(&self, platform: &str) -> Result<(BenchmarkDocument, BenchmarkDocument), BenchmarkError> {
        let candidate = BenchmarkDocument::load(self.path(platform, &self.candidate)?)?;
        let reference = BenchmarkDocument::load(self.path(platform, &self.reference)?)?;
        Ok((candidate, reference))
    }

    pub fn load_platform_summary(&self, platform: &str) -> Result<PlatformSummary, BenchmarkError> {
        let (candidate, reference) = self.load(platform)?;
        Ok(summarize(&candidate, &reference, &self.candidate, &self.reference))
    }

    pub fn compute_comparison(&self, platform: &str) -> Result<Comparison, BenchmarkError> {
        let (candidate, reference) = self.load(platform)?;
        Ok(compare(&candidate, &reference))
    }

    /// Compares `platform`'s results and builds their chart.
    pub fn chart(&self, platform: &str, theme: &Theme) -> Result<(ChartSpec, Comparison), BenchmarkError> {
        let comparison = self.compute_comparison(platform)?;
        let chart = ChartSpec::build(&comparison.rows, theme, &self.candidate, &self.reference);
        Ok((chart, comparison))
    }
}
