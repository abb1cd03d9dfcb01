use std::fs;
use std::path::Path;

use tempfile::TempDir;
use ttemkit_core::{
    DoiSource, GrainClass, MatchPolicy, PipelineConfig, ResampleFactor, SoundingFormatter,
    SoundingOptions, SoundingSource, TtemError, WellFormatter, WellSource, export,
};

const SOUNDING_HEADER: &str = "/ ID Line_No Layer_No UTMX UTMY Elevation_Cell Resistivity \
    Resistivity_STD Conductivity Depth_top Depth_bottom Thickness Thickness_STD Elevation_End";

fn write_survey(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let mut text = format!("/ Aarhus Workbench export\n{SOUNDING_HEADER}\n");
    for (id, x) in [(1, 500_000.0), (2, 500_100.0)] {
        for (layer, top, thickness) in [(1, 0.0, 1.0), (2, 1.0, 2.0), (3, 3.0, 3.0)] {
            let elevation = 1500.0 - top;
            text.push_str(&format!(
                "{id} 100 {layer} {x} 4500000 {elevation} {res} 1.05 {cond} {top} {bottom} {thickness} 1.1 0\n",
                res = 10 * layer,
                cond = 100 / layer,
                bottom = top + thickness,
            ));
        }
    }
    let survey = dir.join("survey.xyz");
    fs::write(&survey, text).unwrap();

    let doi = dir.join("survey_doi.xyz");
    fs::write(&doi, "/ DOI grid\n/ UTMX UTMY Value\n500000 4500000 1498\n").unwrap();
    (survey, doi)
}

#[test]
fn test_sounding_pipeline_from_files() {
    let dir = TempDir::new().unwrap();
    let (survey, doi) = write_survey(dir.path());

    let options = SoundingOptions::new()
        .with_doi_source(DoiSource::File(doi))
        .with_resample(ResampleFactor::new(1).unwrap())
        .with_crs("EPSG:32614");
    let soundings = SoundingFormatter::new(vec![SoundingSource::File(survey)], options).unwrap();

    // station 2 has no DOI value and is dropped; station 1 keeps layers 1 and 2
    assert_eq!(soundings.drop_report().groups().len(), 1);
    assert_eq!(soundings.drop_report().total_rows(), 3);
    assert_eq!(soundings.records().len(), 3);
    assert!(soundings.records().iter().all(|r| r.id == 1));
    assert!(soundings.records().iter().all(|r| (r.thickness - 1.0).abs() < 1e-9));

    let summary = soundings.summary();
    assert_eq!(summary.len(), 1);
    assert!((summary[0].depth_bottom_max - 3.0).abs() < 1e-9);

    let csv_path = dir.path().join("soundings.csv");
    export(&soundings.to_geo_table().unwrap(), &csv_path).unwrap();
    let csv = fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("ID,Line_No,Layer_No,UTMX,UTMY"));
    assert_eq!(csv.lines().count(), 4);

    let json_path = dir.path().join("stations.geojson");
    export(&soundings.summary_geo_table().unwrap(), &json_path).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(value["features"].as_array().unwrap().len(), 1);
    assert_eq!(
        value["crs"]["properties"]["name"],
        "urn:ogc:def:crs:EPSG::32614"
    );
}

#[test]
fn test_sounding_pipeline_strict_doi() {
    let dir = TempDir::new().unwrap();
    let (survey, doi) = write_survey(dir.path());

    let options = SoundingOptions::new()
        .with_doi_source(DoiSource::File(doi))
        .with_match_policy(MatchPolicy::Strict);
    let err = SoundingFormatter::new(vec![SoundingSource::File(survey)], options).unwrap_err();
    assert!(matches!(err, TtemError::Join(_)));
    assert!(err.is_recoverable());
}

#[test]
fn test_well_pipeline_from_directory() {
    let dir = TempDir::new().unwrap();
    let wells = dir.path().join("wells");
    fs::create_dir(&wells).unwrap();
    fs::write(
        wells.join("lithology.csv"),
        "Well Name,Top,Bottom,Soil Type\nA,0,2,fine grain\nA,2,3,coarse grain\nB,0,1,clay\n",
    )
    .unwrap();
    fs::write(
        wells.join("locations.csv"),
        "Well Name,Lat,Lon,Elev\nA,41.0,-97.0,500\nB,41.1,-97.1,510\n",
    )
    .unwrap();
    fs::write(wells.join("notes.txt"), "ignored").unwrap();

    let config = PipelineConfig::from_toml(
        "[columns]\nbore = [\"Well Name\"]\nkeyword = [\"Soil Type\"]\n",
    )
    .unwrap();
    let mut formatter = WellFormatter::new(
        vec![WellSource::Directory(wells)],
        config.well_options(),
    )
    .unwrap();

    assert_eq!(formatter.records().len(), 3);
    assert!(formatter.drop_report().is_empty());
    assert_eq!(formatter.records()[1].grain, GrainClass::Coarse);

    formatter.reproject("EPSG:32614").unwrap();
    assert_eq!(formatter.crs().name(), "EPSG:32614");
    assert!(formatter.records()[0].x > 600_000.0);

    let resampled = formatter.resample(ResampleFactor::new(2).unwrap());
    assert_eq!(resampled.len(), 8);

    let out = dir.path().join("wells.csv");
    export(&formatter.to_geo_table().unwrap(), &out).unwrap();
    let csv = fs::read_to_string(&out).unwrap();
    assert!(csv.starts_with("Bore,Depth_top,Depth_bottom"));
    assert_eq!(csv.lines().count(), 4);
}
