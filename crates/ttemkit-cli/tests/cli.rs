use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn ttemkit() -> Command {
    Command::cargo_bin("ttemkit").unwrap()
}

fn write_survey(dir: &Path) {
    let mut text = String::from(
        "/ Aarhus Workbench export\n/ ID Line_No Layer_No UTMX UTMY Elevation_Cell Resistivity \
         Resistivity_STD Conductivity Depth_top Depth_bottom Thickness Thickness_STD Elevation_End\n",
    );
    for (id, x) in [(1, 500_000), (2, 500_100)] {
        text.push_str(&format!(
            "{id} 100 1 {x} 4500000 1500 10 1.05 100 0 1 1 1.1 1499\n\
             {id} 100 2 {x} 4500000 1499 20 1.05 50 1 3 2 1.1 1497\n\
             {id} 100 3 {x} 4500000 1497 30 9999 33 3 6 3 1.1 1494\n"
        ));
    }
    fs::write(dir.join("survey.xyz"), text).unwrap();
    fs::write(
        dir.join("doi.xyz"),
        "/ UTMX UTMY Value\n500000 4500000 1500\n500100 4500000 1400\n",
    )
    .unwrap();
}

fn write_wells(dir: &Path) {
    fs::write(
        dir.join("lithology.csv"),
        "Bore,Depth_top,Depth_bottom,Keyword\nA,0,2,fine grain\nA,2,3,coarse grain\nB,0,1,mix grain\n",
    )
    .unwrap();
    fs::write(
        dir.join("locations.csv"),
        "Bore,Latitude,Longitude,Elevation\nA,41.0,-97.0,500\n",
    )
    .unwrap();
}

#[test]
fn test_drivers_lists_available_formats() {
    ttemkit()
        .arg("drivers")
        .assert()
        .success()
        .stdout(predicate::str::contains("GeoJSON"))
        .stdout(predicate::str::contains("XYZ"))
        .stdout(predicate::str::contains("FlatGeobuf").not());

    ttemkit()
        .args(["drivers", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FlatGeobuf"))
        .stdout(predicate::str::contains("Planned"));
}

#[test]
fn test_drivers_filtered_by_capability() {
    ttemkit()
        .args(["drivers", "--writable"])
        .assert()
        .success()
        .stdout(predicate::str::contains("GeoJSON"))
        .stdout(predicate::str::contains("XYZ").not());

    ttemkit()
        .args(["drivers", "--readable"])
        .assert()
        .success()
        .stdout(predicate::str::contains("XYZ"))
        .stdout(predicate::str::contains("GeoJSON").not());

    ttemkit()
        .args(["drivers", "--all", "--writable"])
        .assert()
        .failure();
}

#[test]
fn test_missing_input_suggests_checking_path() {
    let dir = TempDir::new().unwrap();

    ttemkit()
        .current_dir(dir.path())
        .args(["sounding", "missing.xyz", "-o", "layers.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"))
        .stderr(predicate::str::contains("Check that the file path is correct"));
}

#[test]
fn test_sounding_command_exports_layers_and_summary() {
    let dir = TempDir::new().unwrap();
    write_survey(dir.path());
    let output = dir.path().join("layers.csv");
    let summary = dir.path().join("stations.geojson");

    ttemkit()
        .current_dir(dir.path())
        .args([
            "sounding",
            "survey.xyz",
            "--doi",
            "doi.xyz",
            "--crs",
            "EPSG:32614",
            "-o",
        ])
        .arg(&output)
        .arg("--summary-output")
        .arg(&summary)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 3 layers"))
        .stdout(predicate::str::contains("Wrote 2 stations"));

    let csv = fs::read_to_string(&output).unwrap();
    assert_eq!(csv.lines().count(), 4);

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&summary).unwrap()).unwrap();
    assert_eq!(value["features"].as_array().unwrap().len(), 2);
}

#[test]
fn test_sounding_unknown_extension_suggests_drivers() {
    let dir = TempDir::new().unwrap();
    write_survey(dir.path());

    ttemkit()
        .current_dir(dir.path())
        .args(["sounding", "survey.xyz", "-o", "layers.kml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ttemkit drivers"));
}

#[test]
fn test_sounding_rejects_zero_resample_factor() {
    let dir = TempDir::new().unwrap();
    write_survey(dir.path());

    ttemkit()
        .current_dir(dir.path())
        .args(["sounding", "survey.xyz", "--resample", "0", "-o", "layers.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid resample factor 0"));
    assert!(!dir.path().join("layers.csv").exists());
}

#[test]
fn test_well_command_from_directory() {
    let dir = TempDir::new().unwrap();
    let logs = dir.path().join("logs");
    fs::create_dir(&logs).unwrap();
    write_wells(&logs);
    let output = dir.path().join("wells.geojson");

    ttemkit()
        .arg("well")
        .arg(&logs)
        .args(["--reproject", "EPSG:32614", "--resample", "2", "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 6 intervals"))
        .stdout(predicate::str::contains("1 group(s), 1 row(s) dropped"));

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let features = value["features"].as_array().unwrap();
    assert_eq!(features.len(), 6);
    assert_eq!(features[0]["properties"]["Bore"], "A");
}

#[test]
fn test_well_strict_fails_on_missing_location() {
    let dir = TempDir::new().unwrap();
    write_wells(dir.path());

    ttemkit()
        .current_dir(dir.path())
        .args([
            "well",
            "lithology.csv",
            "locations.csv",
            "--strict",
            "-o",
            "wells.csv",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Suggestion"));
}

#[test]
fn test_config_aliases_are_applied() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("lithology.csv"),
        "Hole,Top,Bottom,Soil\nA,0,1,fine grain\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("locations.csv"),
        "Hole,Lat,Lon,Elev\nA,41.0,-97.0,500\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("ttemkit.toml"),
        "[columns]\nbore = [\"hole\"]\nkeyword = [\"soil\"]\n",
    )
    .unwrap();

    ttemkit()
        .current_dir(dir.path())
        .args([
            "--config",
            "ttemkit.toml",
            "well",
            ".",
            "-o",
            "wells.csv",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 1 intervals"));
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.toml"), "colour = \"red\"\n").unwrap();

    ttemkit()
        .current_dir(dir.path())
        .args(["--config", "bad.toml", "drivers"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}

#[test]
fn test_water_level_skips_invalid_wells() {
    ttemkit()
        .args(["water-level", "Parowan", "Cedar City"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no water levels retrieved for 2 well(s)"));
}

#[test]
fn test_named_driver_overrides_extension() {
    let dir = TempDir::new().unwrap();
    write_wells(dir.path());

    ttemkit()
        .current_dir(dir.path())
        .args(["well", ".", "--driver", "GeoJSON", "-o", "wells.out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(GeoJSON)"));
    assert!(
        fs::read_to_string(dir.path().join("wells.out"))
            .unwrap()
            .contains("FeatureCollection")
    );

    ttemkit()
        .current_dir(dir.path())
        .args(["well", ".", "--driver", "KML", "-o", "wells.kml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Driver 'KML' not found"));
}
