//! Region tables and color scale settings.
//!
//! The alias table, aggregate membership lists and per-metric scale domains
//! are read once at startup from a JSON document. A default document ships
//! inside the binary (`config/regions.json`); `--regions` points at another.

use crate::color::{Rgb, Scheme, SequentialScale};
use crate::error::{LoadError, Result};
use crate::metric::Metric;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{error, info};

const EMBEDDED_REGIONS: &str = include_str!("../config/regions.json");

/// A multi-country grouping whose record stands in for members without one
#[derive(Debug, Clone, Deserialize)]
pub struct AggregateRegion {
    /// Dataset label of the aggregate record (after aliasing)
    pub label: String,
    /// Geographic feature names covered by the aggregate
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScaleSpec {
    pub domain: [f64; 2],
    pub scheme: Scheme,
}

impl ScaleSpec {
    pub fn scale(&self) -> SequentialScale {
        SequentialScale::new(self.domain[0], self.domain[1], self.scheme)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScaleConfig {
    pub energy: ScaleSpec,
    pub impact: ScaleSpec,
}

impl ScaleConfig {
    pub fn for_metric(&self, metric: Metric) -> SequentialScale {
        match metric {
            Metric::Energy => self.energy.scale(),
            Metric::Impact => self.impact.scale(),
        }
    }
}

fn default_no_data() -> Rgb {
    Rgb::from_hex(0xcccccc)
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegionConfig {
    /// Dataset label -> geographic feature name
    #[serde(default)]
    pub aliases: HashMap<String, String>,
    #[serde(default)]
    pub aggregates: Vec<AggregateRegion>,
    pub scales: ScaleConfig,
    /// Fill for features that resolve to nothing
    #[serde(default = "default_no_data")]
    pub no_data: Rgb,
}

impl RegionConfig {
    pub fn embedded() -> Result<Self> {
        let mut bytes = EMBEDDED_REGIONS.as_bytes().to_vec();
        Self::parse(&mut bytes, "embedded regions.json")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let mut bytes = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&mut bytes, &path.display().to_string())
    }

    /// Load `path` if given, else the embedded default
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let loaded = match path {
            Some(p) => Self::from_path(p),
            None => Self::embedded(),
        };
        let config = loaded.inspect_err(|e| error!("{e}"))?;
        info!(
            source = %path.map_or("embedded".into(), |p| p.display().to_string()),
            aliases = config.aliases.len(),
            aggregates = config.aggregates.len(),
            "loaded region configuration"
        );
        Ok(config)
    }

    fn parse(bytes: &mut [u8], origin: &str) -> Result<Self> {
        simd_json::serde::from_slice(bytes).map_err(|source| LoadError::Config {
            origin: origin.to_string(),
            source,
        })
    }

    /// Name a dataset label refers to on the map
    pub fn canonical_name<'a>(&'a self, label: &'a str) -> &'a str {
        self.aliases.get(label).map(String::as_str).unwrap_or(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_parses() {
        let config = RegionConfig::embedded().unwrap();
        assert_eq!(config.canonical_name("USA"), "United States of America");
        assert_eq!(config.canonical_name("China"), "China");
        assert_eq!(config.no_data, Rgb::from_hex(0xcccccc));

        let europe = config
            .aggregates
            .iter()
            .find(|a| a.label == "Europe")
            .unwrap();
        assert!(europe.members.iter().any(|m| m == "Germany"));

        let energy = config.scales.for_metric(Metric::Energy);
        assert_eq!((energy.min, energy.max), (9.0, 15.0));
        assert_eq!(energy.scheme, Scheme::Oranges);
        let impact = config.scales.for_metric(Metric::Impact);
        assert_eq!((impact.min, impact.max), (4e-8, 1e-7));
        assert_eq!(impact.scheme, Scheme::Reds);
    }

    #[test]
    fn test_minimal_config_defaults() {
        let mut doc = br#"{
            "scales": {
                "energy": { "domain": [0.0, 1.0], "scheme": "greens" },
                "impact": { "domain": [0.0, 2.0], "scheme": "purples" }
            }
        }"#
        .to_vec();
        let config = RegionConfig::parse(&mut doc, "test").unwrap();
        assert!(config.aliases.is_empty());
        assert!(config.aggregates.is_empty());
        assert_eq!(config.no_data, Rgb::from_hex(0xcccccc));
    }

    #[test]
    fn test_bad_config_is_an_error() {
        let mut doc = br#"{
            "scales": { "energy": { "domain": [0.0, 1.0], "scheme": "rainbow" } }
        }"#
        .to_vec();
        let err = RegionConfig::parse(&mut doc, "bad.json").unwrap_err();
        assert!(matches!(err, LoadError::Config { .. }));
        assert!(err.to_string().contains("bad.json"));
    }

    const BENELUX: &str = r##"{
        "aliases": { "Holland": "Netherlands" },
        "aggregates": [{ "label": "Benelux", "members": ["Belgium", "Netherlands"] }],
        "scales": {
            "energy": { "domain": [1.0, 2.0], "scheme": "blues" },
            "impact": { "domain": [3.0, 4.0], "scheme": "greys" }
        },
        "no_data": "#101010"
    }"##;

    #[test]
    fn test_override_file() {
        let name = format!("ai-energy-map-{}-regions.json", std::process::id());
        let path = std::env::temp_dir().join(name);
        fs::write(&path, BENELUX).unwrap();

        let config = RegionConfig::load(Some(&path)).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.canonical_name("Holland"), "Netherlands");
        assert_eq!(config.canonical_name("USA"), "USA");
        assert_eq!(config.aggregates[0].label, "Benelux");
        assert_eq!(config.aggregates[0].members, ["Belgium", "Netherlands"]);
        let energy = config.scales.for_metric(Metric::Energy);
        assert_eq!(energy.scheme, Scheme::Blues);
        assert_eq!(config.scales.for_metric(Metric::Impact).max, 4.0);
        assert_eq!(config.no_data, Rgb::from_hex(0x101010));
    }

    #[test]
    fn test_load_without_override_is_embedded() {
        let config = RegionConfig::load(None).unwrap();
        assert_eq!(config.canonical_name("USA"), "United States of America");
        assert!(matches!(
            RegionConfig::load(Some(Path::new("/nonexistent/regions.json"))),
            Err(LoadError::Io { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let path = Path::new("/nonexistent/regions.json");
        let err = RegionConfig::from_path(path).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
