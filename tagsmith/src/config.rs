use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use sitetags::err;
use sitetags::benchmarks::{BenchmarkSet, Implementation, Theme};
use sitetags::context::{self, SiteContext};
use sitetags::error::Result;
use sitetags::format::{Format, Json, Toml};

#[derive(Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub includes: PathBuf,
    pub benchmarks: PathBuf,
    pub thumbnails: PathBuf,
    pub repository: String,
    pub theme: Option<Theme>,
    pub candidate: Implementation,
    pub reference: Implementation,
    pub globals: FxHashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            includes: context::DEFAULT_INCLUDES.into(),
            benchmarks: context::DEFAULT_BENCHMARKS.into(),
            thumbnails: context::DEFAULT_THUMBNAILS.into(),
            repository: context::DEFAULT_REPOSITORY.into(),
            theme: None,
            candidate: Implementation::default_candidate(),
            reference: Implementation::default_reference(),
            globals: FxHashMap::default(),
        }
    }
}

impl Settings {
    /// Reads `config.toml` or, failing that, `config.json` from `root`. With
    /// neither present, every setting takes its default.
    pub fn discover(root: &Path) -> Result<Self> {
        let toml = root.join(crate::TOML_CONFIG);
        if toml.is_file() {
            return Toml::read(&toml);
        }

        let json = root.join(crate::JSON_CONFIG);
        if json.is_file() {
            return Json::read(&json);
        }

        Ok(Settings::default())
    }

    pub fn benchmark_set(&self, root: &Path) -> BenchmarkSet {
        BenchmarkSet::new(root.join(&self.benchmarks), self.candidate.clone(), self.reference.clone())
    }

    pub fn site_context(&self, root: &Path) -> Result<SiteContext> {
        let Some(theme) = self.theme else {
            return err! {
                "site configuration must set a [theme]",
                "root" => root.display(),
                "expected keys" => "highlight_color, contrast_color",
            };
        };

        Ok(SiteContext {
            root: root.to_path_buf(),
            includes: root.join(&self.includes),
            thumbnails: root.join(&self.thumbnails),
            benchmarks: self.benchmark_set(root),
            repository: self.repository.clone(),
            theme,
        })
    }
}
