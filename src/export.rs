//! CSV and JSON export of a snapshot.
//!
//! Export files are named `turbidity-sensors-YYYY-MM-DD.{csv,json}`. The JSON
//! document can be loaded back with [`parse_snapshot`], which is what the
//! replay [`FileSource`](crate::FileSource) uses.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{SensorRecord, Snapshot};

/// Column headers of the CSV export, in order.
pub const CSV_HEADERS: [&str; 9] = [
    "Sensor ID",
    "Sensor Name",
    "Latitude",
    "Longitude",
    "Turbidity (NTU)",
    "Status",
    "Battery Level (%)",
    "Water Temperature (°C)",
    "Last Updated",
];

/// Errors that can occur while exporting or reading back an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown export format: {0}")]
    UnknownFormat(String),

    #[error("No sensor data to export")]
    EmptySnapshot,
}

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

/// Top-level JSON export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub export_date: DateTime<Utc>,
    pub total_sensors: usize,
    pub sensors: Vec<SensorRecord>,
}

impl ExportDocument {
    pub fn new(records: &[SensorRecord], exported_at: DateTime<Utc>) -> Self {
        Self {
            export_date: exported_at,
            total_sensors: records.len(),
            sensors: records.to_vec(),
        }
    }
}

/// Either a full export document or a bare list of records.
#[derive(Deserialize)]
#[serde(untagged)]
enum ReplayFile {
    Document(ExportDocument),
    Records(Vec<SensorRecord>),
}

/// ISO-8601 timestamp with millisecond precision, as written to CSV.
fn iso_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Render records as CSV: a header row, then one row per record, every field
/// quoted. A missing battery reading is an empty field.
pub fn to_csv(records: &[SensorRecord]) -> String {
    let header = CSV_HEADERS.iter().map(|h| quote(h)).collect::<Vec<_>>().join(",");

    let rows = records.iter().map(|r| {
        [
            r.id.clone(),
            r.name.clone(),
            r.location.lat.to_string(),
            r.location.lng.to_string(),
            r.turbidity.to_string(),
            r.status.as_str().to_string(),
            r.battery_level.map(|b| b.to_string()).unwrap_or_default(),
            r.water_temperature.to_string(),
            iso_timestamp(r.last_updated),
        ]
        .iter()
        .map(|f| quote(f))
        .collect::<Vec<_>>()
        .join(",")
    });

    std::iter::once(header).chain(rows).collect::<Vec<_>>().join("\n")
}

/// Render records as a pretty-printed JSON export document.
pub fn to_json(records: &[SensorRecord], exported_at: DateTime<Utc>) -> Result<String, ExportError> {
    let document = ExportDocument::new(records, exported_at);
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Parse an export document (or a bare record list) back into a snapshot.
pub fn parse_snapshot(content: &str) -> Result<Snapshot, ExportError> {
    let file: ReplayFile = serde_json::from_str(content)?;
    Ok(match file {
        ReplayFile::Document(doc) => doc.sensors,
        ReplayFile::Records(records) => records,
    })
}

/// Render records in the requested format.
pub fn render(
    format: ExportFormat,
    records: &[SensorRecord],
    exported_at: DateTime<Utc>,
) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => Ok(to_csv(records)),
        ExportFormat::Json => to_json(records, exported_at),
    }
}

/// Dated file name for an export, e.g. `turbidity-sensors-2025-06-01.csv`.
pub fn file_name(format: ExportFormat, date: DateTime<Utc>) -> String {
    format!(
        "turbidity-sensors-{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Write an export to `path`. An empty snapshot is refused.
pub fn write_to(
    path: &Path,
    format: ExportFormat,
    records: &[SensorRecord],
    exported_at: DateTime<Utc>,
) -> Result<(), ExportError> {
    if records.is_empty() {
        return Err(ExportError::EmptySnapshot);
    }
    let content = render(format, records, exported_at)?;
    let mut file = fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Write a dated export into `dir`, creating the directory if needed.
///
/// Returns the path written.
pub fn write_dated(
    dir: &Path,
    format: ExportFormat,
    records: &[SensorRecord],
    exported_at: DateTime<Utc>,
) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name(format, exported_at));
    write_to(&path, format, records, exported_at)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::seed::default_fleet;
    use crate::data::{Coordinate, SensorStatus};
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap()
    }

    fn records() -> Vec<SensorRecord> {
        vec![
            SensorRecord::new(
                "sensor-001",
                "Sensor 1",
                Coordinate::new(52.190591, 0.104566),
                60.0,
                18.5,
                SensorStatus::Online,
                fixed_time(),
            )
            .with_battery(87),
            SensorRecord::new(
                "sensor-002",
                "Mill \"Pond\"",
                Coordinate::new(52.181721, 0.098732),
                45.2,
                17.2,
                SensorStatus::Offline,
                fixed_time(),
            ),
        ]
    }

    #[test]
    fn test_csv_header_and_rows() {
        let csv = to_csv(&records());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("\"Sensor ID\",\"Sensor Name\",\"Latitude\""));
        assert_eq!(
            lines[1],
            "\"sensor-001\",\"Sensor 1\",\"52.190591\",\"0.104566\",\"60\",\"online\",\"87\",\"18.5\",\"2025-06-01T12:30:00.000Z\""
        );
    }

    #[test]
    fn test_csv_escapes_quotes_and_blank_battery() {
        let csv = to_csv(&records());
        let row = csv.lines().nth(2).unwrap();
        assert!(row.contains("\"Mill \"\"Pond\"\"\""));
        assert!(row.contains("\"offline\",\"\",\"17.2\""));
    }

    #[test]
    fn test_csv_of_empty_snapshot_is_header_only() {
        let csv = to_csv(&[]);
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_json_document_shape() {
        let json = to_json(&records(), fixed_time()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["exportDate"], "2025-06-01T12:30:00Z");
        assert_eq!(value["totalSensors"], 2);
        assert_eq!(value["sensors"][0]["lastUpdated"], "2025-06-01T12:30:00Z");
        assert_eq!(value["sensors"][0]["batteryLevel"], 87);
    }

    #[test]
    fn test_json_round_trip_preserves_fields() {
        let original = default_fleet(Utc::now());
        let json = to_json(&original, Utc::now()).unwrap();
        let parsed = parse_snapshot(&json).unwrap();

        assert_eq!(parsed.len(), original.len());
        for (a, b) in original.iter().zip(&parsed) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.name, b.name);
            assert_eq!(a.status, b.status);
            assert_eq!(a.battery_level, b.battery_level);
            assert_eq!(a.last_updated, b.last_updated);
            assert!((a.turbidity - b.turbidity).abs() < 1e-9);
            assert!((a.water_temperature - b.water_temperature).abs() < 1e-9);
            assert!((a.location.lat - b.location.lat).abs() < 1e-9);
            assert!((a.location.lng - b.location.lng).abs() < 1e-9);
        }
    }

    #[test]
    fn test_parse_bare_record_list() {
        let json = serde_json::to_string(&records()).unwrap();
        let parsed = parse_snapshot(&json).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_snapshot("nope"), Err(ExportError::Json(_))));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            file_name(ExportFormat::Csv, fixed_time()),
            "turbidity-sensors-2025-06-01.csv"
        );
        assert_eq!(
            file_name(ExportFormat::Json, fixed_time()),
            "turbidity-sensors-2025-06-01.json"
        );
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ExportFormat::from_path(Path::new("out/data.JSON")),
            Some(ExportFormat::Json)
        );
        assert_eq!(ExportFormat::from_path(Path::new("data.csv")), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::from_path(Path::new("data.txt")), None);
        assert_eq!(ExportFormat::from_path(Path::new("data")), None);
    }

    #[test]
    fn test_write_dated_creates_directory() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("exports");

        let path = write_dated(&target, ExportFormat::Json, &records(), fixed_time()).unwrap();

        assert_eq!(path, target.join("turbidity-sensors-2025-06-01.json"));
        let content = fs::read_to_string(&path).unwrap();
        let ids: Vec<String> = parse_snapshot(&content).unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["sensor-001", "sensor-002"]);
    }

    #[test]
    fn test_write_refuses_empty_snapshot() {
        let dir = tempdir().unwrap();
        let err = write_dated(dir.path(), ExportFormat::Csv, &[], fixed_time()).unwrap_err();
        assert!(matches!(err, ExportError::EmptySnapshot));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let err = write_to(&path, ExportFormat::Csv, &records(), fixed_time()).unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
    }
}
