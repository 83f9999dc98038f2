//! Input tables for the center of gravity model.
//!
//! A data set is four tables (`sites`, `distance`, `parameters`, `solutions`)
//! stored either as one JSON file or as a directory of CSV files. The same row
//! types are used for both formats, so column names match across them.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::path::Path;

/// Whether a site may host a center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CenterStatus {
    #[serde(rename = "Can Be Center")]
    CanBeCenter,
    #[default]
    #[serde(rename = "Pure Demand Point")]
    PureDemandPoint,
}

/// Row of the `sites` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Demand", default, deserialize_with = "blank_as_default")]
    pub demand: f64,
    #[serde(rename = "Center Status", default, deserialize_with = "blank_as_default")]
    pub center_status: CenterStatus,
}

/// Row of the `distance` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceRow {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Destination")]
    pub destination: String,
    #[serde(rename = "Distance")]
    pub distance: f64,
}

/// A parameter value: numbers and flags share one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl ParamValue {
    /// Numeric view, also accepting numbers that arrived as text (CSV)
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Number(v) => Some(*v),
            ParamValue::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s.trim()),
            ParamValue::Number(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(v) => write!(f, "{}", v),
            ParamValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Row of the `parameters` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRow {
    #[serde(rename = "Parameter")]
    pub parameter: String,
    #[serde(rename = "Value")]
    pub value: ParamValue,
}

fn default_centroids() -> f64 {
    1.0
}

/// Blank CSV cells and JSON nulls take the field default
fn blank_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn blank_as_default_centroids<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_else(default_centroids))
}

/// Row of the `solutions` table (one model per row in a batch solve)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(
        rename = "Number of Centroids",
        default = "default_centroids",
        deserialize_with = "blank_as_default_centroids"
    )]
    pub number_of_centroids: f64,
}

/// All input tables of a data set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputTables {
    #[serde(default)]
    pub sites: Vec<SiteRow>,
    #[serde(default)]
    pub distance: Vec<DistanceRow>,
    #[serde(default)]
    pub parameters: Vec<ParameterRow>,
    #[serde(default)]
    pub solutions: Vec<SolutionRow>,
}

impl InputTables {
    /// Load a data set, picking the format from the path.
    ///
    /// Files ending in `.json` are read as JSON, anything else as a
    /// directory of CSV files.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        if is_json_path(path) {
            Self::from_json_file(path)
        } else {
            Self::from_csv_dir(path)
        }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let file = File::open(&path)
            .map_err(|e| format!("Cannot open file {:?}: {}", path.as_ref(), e))?;
        serde_json::from_reader(file)
            .map_err(|e| format!("Invalid JSON data set {:?}: {}", path.as_ref(), e))
    }

    pub fn from_csv_dir<P: AsRef<Path>>(dir: P) -> Result<Self, String> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(format!("{:?} is not a directory of CSV tables", dir));
        }
        Ok(InputTables {
            sites: read_csv_table(dir, "sites")?,
            distance: read_csv_table(dir, "distance")?,
            parameters: read_csv_table(dir, "parameters")?,
            solutions: read_csv_table(dir, "solutions")?,
        })
    }

    pub fn to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let path = path.as_ref();
        if is_json_path(path) {
            write_json(path, self)
        } else {
            self.to_csv_dir(path)
        }
    }

    pub fn to_csv_dir<P: AsRef<Path>>(&self, dir: P) -> Result<(), String> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .map_err(|e| format!("Failed to create directory {:?}: {}", dir, e))?;
        write_csv_table(dir, "sites", &self.sites)?;
        write_csv_table(dir, "distance", &self.distance)?;
        write_csv_table(dir, "parameters", &self.parameters)?;
        write_csv_table(dir, "solutions", &self.solutions)
    }

    /// Look up a parameter row by name
    pub fn parameter(&self, name: &str) -> Option<&ParamValue> {
        self.parameters
            .iter()
            .find(|row| row.parameter == name)
            .map(|row| &row.value)
    }

    /// Set (or replace) a parameter row
    pub fn set_parameter(&mut self, name: &str, value: ParamValue) {
        match self.parameters.iter_mut().find(|row| row.parameter == name) {
            Some(row) => row.value = value,
            None => self.parameters.push(ParameterRow {
                parameter: name.to_string(),
                value,
            }),
        }
    }
}

pub(crate) fn is_json_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create directory {:?}: {}", parent, e))?;
    }
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize {:?}: {}", path, e))?;
    fs::write(path, json).map_err(|e| format!("Failed to write {:?}: {}", path, e))
}

/// Missing table files read as empty tables
fn read_csv_table<T: for<'de> Deserialize<'de>>(dir: &Path, table: &str) -> Result<Vec<T>, String> {
    let path = dir.join(format!("{}.csv", table));
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&path)
        .map_err(|e| format!("Cannot open {:?}: {}", path, e))?;
    reader
        .deserialize()
        .enumerate()
        .map(|(i, row)| row.map_err(|e| format!("{}.csv row {}: {}", table, i + 1, e)))
        .collect()
}

pub(crate) fn write_csv_table<T: Serialize>(dir: &Path, table: &str, rows: &[T]) -> Result<(), String> {
    let path = dir.join(format!("{}.csv", table));
    let mut writer = csv::Writer::from_path(&path)
        .map_err(|e| format!("Cannot create {:?}: {}", path, e))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| format!("Failed to write {:?}: {}", path, e))?;
    }
    writer
        .flush()
        .map_err(|e| format!("Failed to write {:?}: {}", path, e))
}
