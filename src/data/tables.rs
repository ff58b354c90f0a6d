use crate::error::{LoadError, Result};
use csv::{ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Per-country (or aggregate region) environmental figures
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegionRecord {
    #[serde(rename = "Area_or_Country")]
    pub label: String,
    /// MJ per kWh
    #[serde(rename = "PE_MJ_per_kWh")]
    pub primary_energy: f64,
    /// kg Sb-eq per kWh
    #[serde(rename = "ADPe_kg_Sb_eq_per_kWh")]
    pub depletion_impact: f64,
}

/// Average energy for one AI task
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskEnergy {
    #[serde(rename = "Task")]
    pub task: String,
    #[serde(rename = "Average_Wh")]
    pub average_wh: f64,
}

pub fn load_region_records(path: &Path) -> Result<Vec<RegionRecord>> {
    let records = read_region_records(open(path)?, path)?;
    info!(count = records.len(), path = %path.display(), "loaded region records");
    Ok(records)
}

pub fn read_region_records<R: Read>(reader: R, origin: &Path) -> Result<Vec<RegionRecord>> {
    read_rows(reader, origin, "region records", |r: &RegionRecord| {
        !r.label.is_empty() && r.primary_energy.is_finite() && r.depletion_impact.is_finite()
    })
}

pub fn load_task_energy(path: &Path) -> Result<Vec<TaskEnergy>> {
    let tasks = read_task_energy(open(path)?, path)?;
    info!(count = tasks.len(), path = %path.display(), "loaded task energy rows");
    Ok(tasks)
}

pub fn read_task_energy<R: Read>(reader: R, origin: &Path) -> Result<Vec<TaskEnergy>> {
    read_rows(reader, origin, "task rows", |t: &TaskEnergy| {
        !t.task.is_empty() && t.average_wh.is_finite() && t.average_wh >= 0.0
    })
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Deserialize every row, skipping rows that fail to parse or validate.
/// I/O failures abort; a table with no usable rows is an error.
fn read_rows<T, R, F>(reader: R, origin: &Path, what: &'static str, valid: F) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
    F: Fn(&T) -> bool,
{
    let mut csv = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut rows = Vec::new();

    for (idx, row) in csv.deserialize::<T>().enumerate() {
        match row {
            Ok(row) if valid(&row) => rows.push(row),
            Ok(_) => {
                let path = origin.display();
                warn!(line = idx + 2, %path, "skipping row with invalid values");
            }
            Err(e) if e.is_io_error() => {
                return Err(LoadError::Csv {
                    path: origin.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                let path = origin.display();
                warn!(line = idx + 2, %path, "skipping unparseable row: {e}");
            }
        }
    }

    if rows.is_empty() {
        return Err(LoadError::Empty {
            what,
            path: origin.to_path_buf(),
        });
    }
    Ok(rows)
}
