//! eta-project: scenario and table file formats.
//!
//! A scenario (YAML or JSON) names a table file next to it; loading both
//! gives everything [`eta_sim::simulate`] needs.

pub mod schema;
pub mod validate;

use std::path::{Path, PathBuf};

use eta_sim::RunRequest;
use eta_tables::{TableBundle, TableSet};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

pub use schema::*;
pub use validate::{ValidationError, validate_scenario};

/// Newest scenario format version understood by this crate.
pub const LATEST_VERSION: u32 = 1;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unsupported file format: {}", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Table error: {0}")]
    Table(#[from] eta_tables::TableError),

    #[error("Simulation error: {0}")]
    Sim(#[from] eta_sim::SimError),
}

/// On-disk encoding, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> ProjectResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(ProjectError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    fn parse<T: DeserializeOwned>(self, content: &str) -> ProjectResult<T> {
        Ok(match self {
            Self::Yaml => serde_yaml::from_str(content)?,
            Self::Json => serde_json::from_str(content)?,
        })
    }

    fn render<T: Serialize>(self, value: &T) -> ProjectResult<String> {
        Ok(match self {
            Self::Yaml => serde_yaml::to_string(value)?,
            Self::Json => serde_json::to_string_pretty(value)?,
        })
    }
}

fn load_as(path: &Path, format: FileFormat) -> ProjectResult<Scenario> {
    let content = std::fs::read_to_string(path)?;
    let scenario: Scenario = format.parse(&content)?;
    validate_scenario(&scenario)?;
    Ok(scenario)
}

fn save_as(path: &Path, scenario: &Scenario, format: FileFormat) -> ProjectResult<()> {
    validate_scenario(scenario)?;
    std::fs::write(path, format.render(scenario)?)?;
    Ok(())
}

pub fn load_yaml(path: &Path) -> ProjectResult<Scenario> {
    load_as(path, FileFormat::Yaml)
}

pub fn save_yaml(path: &Path, scenario: &Scenario) -> ProjectResult<()> {
    save_as(path, scenario, FileFormat::Yaml)
}

pub fn load_json(path: &Path) -> ProjectResult<Scenario> {
    load_as(path, FileFormat::Json)
}

pub fn save_json(path: &Path, scenario: &Scenario) -> ProjectResult<()> {
    save_as(path, scenario, FileFormat::Json)
}

/// Load a scenario, picking YAML or JSON from the extension.
pub fn load_scenario(path: &Path) -> ProjectResult<Scenario> {
    load_as(path, FileFormat::from_path(path)?)
}

/// Read a raw table file without building lookup tables.
pub fn load_table_set(path: &Path) -> ProjectResult<TableSet> {
    let format = FileFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    format.parse(&content)
}

/// Read a table file and build the validated bundle.
pub fn load_tables(path: &Path) -> ProjectResult<TableBundle> {
    let set = load_table_set(path)?;
    let bundle = TableBundle::from_set(&set)?;
    debug!(
        path = %path.display(),
        track_length_m = bundle.track.length(),
        engine_rpm_max = bundle.thermal_rpm_max(),
        "loaded tables"
    );
    Ok(bundle)
}

pub fn save_table_set(path: &Path, set: &TableSet) -> ProjectResult<()> {
    let format = FileFormat::from_path(path)?;
    TableBundle::from_set(set)?;
    std::fs::write(path, format.render(set)?)?;
    Ok(())
}

/// A scenario with its tables loaded and its run request checked.
#[derive(Debug, Clone)]
pub struct LoadedScenario {
    pub scenario: Scenario,
    pub tables_path: PathBuf,
    pub request: RunRequest,
    pub tables: TableBundle,
}

/// Load a scenario and its table file, and validate the run request.
pub fn load_run(path: &Path) -> ProjectResult<LoadedScenario> {
    let scenario = load_scenario(path)?;
    let tables_path = scenario.tables_path(path);
    let tables = load_tables(&tables_path)?;
    let request = scenario.to_request();
    request.validate()?;
    Ok(LoadedScenario {
        scenario,
        tables_path,
        request,
        tables,
    })
}
