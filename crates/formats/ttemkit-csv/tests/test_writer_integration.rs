//! Integration tests for CSV reading and writing through the file system

use std::fs::{self, File};
use std::io::BufWriter;
use std::sync::Arc;

use arrow_array::{ArrayRef, Float64Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use tempfile::TempDir;
use ttemkit_core_common::{GeoTable, TableReader, TableWriter};
use ttemkit_csv::{CsvReader, CsvTableWriter};

fn well_table() -> GeoTable {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Bore", DataType::Utf8, false),
        Field::new("X", DataType::Float64, false),
        Field::new("Y", DataType::Float64, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec!["A", "B"])),
        Arc::new(Float64Array::from(vec![-97.25, -97.5])),
        Arc::new(Float64Array::from(vec![41.5, 41.75])),
    ];
    let batch = RecordBatch::try_new(schema, columns).unwrap();
    GeoTable::try_new(batch, "X", "Y", "EPSG:4326").unwrap()
}

#[test]
fn test_written_csv_reads_back() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("wells.csv");

    {
        let file = File::create(&path).unwrap();
        let mut writer = BufWriter::new(file);
        CsvTableWriter::default()
            .write_table(&mut writer, &well_table())
            .unwrap();
    }

    let table = CsvReader::default().read_path(&path).unwrap();
    assert_eq!(table.headers, vec!["Bore", "X", "Y", "geometry"]);
    assert_eq!(table.len(), 2);
    assert_eq!(table.records[0].get(0), Some("A"));
    assert_eq!(table.records[1].get(1), Some("-97.5"));
    assert!(table.records[1].get(3).unwrap().starts_with("POINT"));
}

#[test]
fn test_read_lithology_sheet() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("lithology.csv");
    fs::write(
        &path,
        "Bore,Depth_top,Depth_bottom,Keyword\nA,0,2,fine grain\nA,2,5,coarse grain\n",
    )
    .unwrap();

    let table = CsvReader::default().read_path(&path).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.column_index("keyword"), Some(3));
    assert_eq!(table.records[1].get(3), Some("coarse grain"));
}
