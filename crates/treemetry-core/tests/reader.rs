use std::io::Write;

use tempfile::NamedTempFile;
use treemetry_core::reader::read_coordinates;
use treemetry_core::PipelineError;

fn csv_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write csv");
    file
}

#[test]
fn reads_records_in_input_order() {
    let file = csv_file(
        "latitude,longitude,tree_id\n\
         37.77,-122.42,T-0001\n\
         -33.86,151.21,T-0002\n\
         51.50,-0.12,\n",
    );

    let records = read_coordinates(file.path()).expect("valid input");
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].latitude, 37.77);
    assert_eq!(records[0].tree_id.as_deref(), Some("T-0001"));
    assert_eq!(records[1].longitude, 151.21);
    assert_eq!(records[2].tree_id, None);
}

#[test]
fn header_match_is_case_insensitive_and_tree_id_optional() {
    let file = csv_file("Latitude,LONGITUDE\n10.0,20.0\n");

    let records = read_coordinates(file.path()).expect("valid input");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].latitude, 10.0);
    assert_eq!(records[0].tree_id, None);
}

#[test]
fn missing_required_column_is_an_input_format_error() {
    let file = csv_file("latitude,tree_id\n37.77,T-0001\n");

    let err = read_coordinates(file.path()).unwrap_err();
    assert!(matches!(err, PipelineError::InputFormat(_)));
    assert!(err.to_string().contains("longitude"));
}

#[test]
fn latitude_out_of_range_is_an_input_format_error() {
    let file = csv_file("latitude,longitude\n91.0,0.0\n");

    let err = read_coordinates(file.path()).unwrap_err();
    assert!(matches!(err, PipelineError::InputFormat(_)));
}

#[test]
fn longitude_out_of_range_is_an_input_format_error() {
    let file = csv_file("latitude,longitude\n0.0,-180.5\n");

    let err = read_coordinates(file.path()).unwrap_err();
    assert!(matches!(err, PipelineError::InputFormat(_)));
}

#[test]
fn unparseable_coordinate_is_an_input_format_error() {
    let file = csv_file("latitude,longitude\nnorth,0.0\n");

    let err = read_coordinates(file.path()).unwrap_err();
    assert!(matches!(err, PipelineError::InputFormat(_)));
    assert!(err.to_string().contains("row 1"));
}

#[test]
fn empty_file_with_header_yields_no_records() {
    let file = csv_file("latitude,longitude\n");

    let records = read_coordinates(file.path()).expect("header-only input");
    assert!(records.is_empty());
}
