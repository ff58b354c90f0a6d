use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading map, metric or configuration inputs.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid GeoJSON in {path}: {source}")]
    GeoJson {
        path: PathBuf,
        #[source]
        source: simd_json::Error,
    },

    #[error("expected a FeatureCollection in {path}")]
    NotFeatureCollection { path: PathBuf },

    #[error("invalid CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid region configuration in {origin}: {source}")]
    Config {
        origin: String,
        #[source]
        source: simd_json::Error,
    },

    #[error("no usable {what} found in {path}")]
    Empty { what: &'static str, path: PathBuf },
}

pub type Result<T> = std::result::Result<T, LoadError>;
