use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::{de, ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer};

use crate::benchmarks::BenchmarkError;

/// One implementation's benchmark results on one platform. Every field is
/// required; a document missing one fails to parse with a schema error.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BenchmarkDocument {
    #[serde(skip)]
    path: PathBuf,
    pub version: String,
    pub platform: Platform,
    pub benchmarks: Vec<Benchmark>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Platform {
    pub cpu_count: u64,
    pub cpu_model: String,
    pub arch: String,
    pub os: String,
    pub features: Features,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Benchmark {
    pub name: String,
    pub results: Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Results {
    pub samples_per_second: f64,
    pub samples_per_second_stdev: f64,
}

/// Feature flags in the order they appear in the source document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Features(Vec<(String, bool)>);

impl BenchmarkDocument {
    /// Reads and parses the document at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, BenchmarkError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| BenchmarkError::read(path, e))?;
        Self::parse(path, &json)
    }

    /// Parses `json`, attributing errors to `path`.
    pub fn parse<P: AsRef<Path>>(path: P, json: &str) -> Result<Self, BenchmarkError> {
        let path = path.as_ref();
        let mut document: Self = serde_json::from_str(json)
            .map_err(|e| BenchmarkError::decode(path, e))?;

        document.path = path.to_path_buf();
        Ok(document)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Results keyed by test name, in order of each name's first appearance.
    /// When a name appears more than once, the last entry's results win.
    pub fn results(&self) -> Vec<(&str, &Results)> {
        let mut index: FxHashMap<&str, usize> = FxHashMap::default();
        let mut results: Vec<(&str, &Results)> = Vec::with_capacity(self.benchmarks.len());
        for benchmark in &self.benchmarks {
            let entry = (benchmark.name.as_str(), &benchmark.results);
            match index.get(benchmark.name.as_str()) {
                Some(&i) => results[i] = entry,
                None => {
                    index.insert(&benchmark.name, results.len());
                    results.push(entry);
                }
            }
        }

        results
    }
}

impl Features {
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(name, enabled)| (name.as_str(), *enabled))
    }

    /// Names of the enabled features, in source order.
    pub fn enabled(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|(_, enabled)| *enabled).map(|(name, _)| name)
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for Features {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        let mut features = Features::default();
        for (name, enabled) in iter {
            features.set(name.into(), enabled);
        }

        features
    }
}

impl Features {
    fn set(&mut self, name: String, enabled: bool) {
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = enabled,
            None => self.0.push((name, enabled)),
        }
    }
}

impl<'de> Deserialize<'de> for Features {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = Features;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of feature names to booleans")
            }

            fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Features, A::Error> {
                let mut features = Features::default();
                while let Some((name, enabled)) = map.next_entry::<String, bool>()? {
                    features.set(name, enabled);
                }

                Ok(features)
            }
        }

        deserializer.deserialize_map(Visitor)
    }
}

impl Serialize for Features {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, enabled) in self.iter() {
            map.serialize_entry(name, &enabled)?;
        }

        map.end()
    }
}
