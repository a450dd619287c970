//! Reads the operator's GPS CSV into ordered coordinate records.

use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::types::CoordinateRecord;

const LATITUDE_COLUMN: &str = "latitude";
const LONGITUDE_COLUMN: &str = "longitude";
const TREE_ID_COLUMN: &str = "tree_id";

pub fn read_coordinates(path: &Path) -> Result<Vec<CoordinateRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|err| {
            PipelineError::InputFormat(format!("failed to open {}: {err}", path.display()))
        })?;

    let headers = reader
        .headers()
        .map_err(|err| PipelineError::InputFormat(format!("failed to read header row: {err}")))?
        .clone();

    let lat_idx = required_column(&headers, LATITUDE_COLUMN)?;
    let lon_idx = required_column(&headers, LONGITUDE_COLUMN)?;
    let tree_id_idx = find_column(&headers, TREE_ID_COLUMN);

    let mut records = Vec::new();
    for (row_index, row) in reader.records().enumerate() {
        // Header is row 0 in the file, so data rows start at 1.
        let line = row_index + 1;
        let row = row
            .map_err(|err| PipelineError::InputFormat(format!("row {line}: {err}")))?;

        let latitude = parse_coordinate_cell(&row, lat_idx, LATITUDE_COLUMN, line)?;
        let longitude = parse_coordinate_cell(&row, lon_idx, LONGITUDE_COLUMN, line)?;

        if !(-90.0..=90.0).contains(&latitude) {
            return Err(PipelineError::InputFormat(format!(
                "row {line}: latitude {latitude} outside [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(PipelineError::InputFormat(format!(
                "row {line}: longitude {longitude} outside [-180, 180]"
            )));
        }

        let tree_id = tree_id_idx
            .and_then(|idx| row.get(idx))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string());

        records.push(CoordinateRecord {
            latitude,
            longitude,
            tree_id,
        });
    }

    Ok(records)
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
}

fn required_column(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    find_column(headers, name).ok_or_else(|| {
        PipelineError::InputFormat(format!("required column '{name}' not found in header"))
    })
}

fn parse_coordinate_cell(
    row: &csv::StringRecord,
    idx: usize,
    column: &str,
    line: usize,
) -> Result<f64> {
    let raw = row.get(idx).ok_or_else(|| {
        PipelineError::InputFormat(format!("row {line}: missing value for column '{column}'"))
    })?;
    raw.trim().parse::<f64>().map_err(|err| {
        PipelineError::InputFormat(format!(
            "row {line}: failed to parse column '{column}' as float: {err}"
        ))
    })
}
