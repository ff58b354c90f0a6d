//! Input loading: country boundaries (GeoJSON) and the two metric tables (CSV).

mod boundaries;
mod tables;

pub use boundaries::{countries_from_geojson, load_countries, Country, Polygon, Ring};
pub use tables::{
    load_region_records, load_task_energy, read_region_records, read_task_energy, RegionRecord,
    TaskEnergy,
};

use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::error;

pub const BOUNDARIES_FILE: &str = "world_countries.json";
pub const REGIONS_FILE: &str = "environmental_impacts_with_both_metrics.csv";
pub const TASKS_FILE: &str = "energy_consumption_per_task.csv";

/// Everything read from the data directory at startup
pub struct Dataset {
    pub countries: Vec<Country>,
    pub regions: Vec<RegionRecord>,
    pub tasks: Vec<TaskEnergy>,
}

/// File locations inside a data directory
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub boundaries: PathBuf,
    pub regions: PathBuf,
    pub tasks: PathBuf,
}

impl DataPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            boundaries: dir.join(BOUNDARIES_FILE),
            regions: dir.join(REGIONS_FILE),
            tasks: dir.join(TASKS_FILE),
        }
    }
}

/// Load all three inputs. The first failure is logged and returned; nothing
/// is rendered from a partial load.
pub fn load_dataset(paths: &DataPaths) -> Result<Dataset> {
    let countries = load_countries(&paths.boundaries)
        .inspect_err(|e| error!("{e}"))?;
    let regions = load_region_records(&paths.regions)
        .inspect_err(|e| error!("{e}"))?;
    let tasks = load_task_energy(&paths.tasks)
        .inspect_err(|e| error!("{e}"))?;
    Ok(Dataset {
        countries,
        regions,
        tasks,
    })
}
