use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn spotter() -> Command {
    Command::cargo_bin("spotter_cli").unwrap()
}

#[test]
fn import_then_export_roundtrip() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let input = tmp.child("in.csv");
    input
        .write_str("id,lat,lon,elev\n1,45.0,9.0,100.0\n2,46.0,10.0,101.5\n")
        .unwrap();
    let project = tmp.child("project.json");
    let output = tmp.child("out.csv");

    spotter()
        .args([
            "import-csv",
            project.path().to_str().unwrap(),
            input.path().to_str().unwrap(),
            "--layer",
            "pts",
            "--id",
            "id",
            "--x",
            "lon",
            "--y",
            "lat",
            "--elev",
            "elev",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("imported 2 point(s)"));
    project.assert(predicate::path::exists());

    spotter()
        .args([
            "export-csv",
            project.path().to_str().unwrap(),
            output.path().to_str().unwrap(),
            "--layer",
            "pts",
            "--fields",
            "id,lat,lon,elev",
        ])
        .assert()
        .success();
    output.assert(predicate::str::contains("id,lat,lon,elev"));
    output.assert(predicate::str::contains("45.00000000"));
}

#[test]
fn rejected_import_reports_invalid_rows() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let input = tmp.child("in.csv");
    input
        .write_str("id,lat,lon\n1,45.0,9.0\n2,95.0,9.0\n3,46.0,10.0\n")
        .unwrap();
    let project = tmp.child("project.json");

    spotter()
        .args([
            "import-csv",
            project.path().to_str().unwrap(),
            input.path().to_str().unwrap(),
            "--layer",
            "pts",
            "--id",
            "id",
            "--x",
            "lon",
            "--y",
            "lat",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 invalid row(s) out of 3"));
    project.assert(predicate::path::missing());
}

#[test]
fn extract_merges_drawing_vertices() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let input = tmp.child("in.csv");
    input.write_str("id,lat,lon\n1,0.0,0.0\n").unwrap();
    let project = tmp.child("project.json");
    let drawing = tmp.child("drawing.json");
    drawing
        .write_str(
            r#"[{"crs": {"definition": "EPSG:4326", "epsg": 4326},
                 "geometry": {"kind": "polygon", "vertices": [
                   {"x": 0.0, "y": 0.0},
                   {"x": 0.01, "y": 0.0},
                   {"x": 0.01, "y": 0.01},
                   {"x": 0.0, "y": 0.0}]}}]"#,
        )
        .unwrap();

    spotter()
        .args([
            "import-csv",
            project.path().to_str().unwrap(),
            input.path().to_str().unwrap(),
            "--layer",
            "pts",
            "--id",
            "id",
            "--x",
            "lon",
            "--y",
            "lat",
        ])
        .assert()
        .success();

    spotter()
        .args([
            "extract",
            project.path().to_str().unwrap(),
            "--layer",
            "pts",
            "--from",
            drawing.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 vertex(es) added, 1 skipped"));

    spotter()
        .args(["next-number", project.path().to_str().unwrap(), "--layer", "pts"])
        .assert()
        .success()
        .stdout(predicate::str::diff("4\n"));
}

#[test]
fn rebase_reports_when_nothing_is_in_radius() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let input = tmp.child("in.csv");
    input.write_str("id,lat,lon,elev\n1,0.0,0.0,10.0\n").unwrap();
    let project = tmp.child("project.json");

    spotter()
        .args([
            "import-csv",
            project.path().to_str().unwrap(),
            input.path().to_str().unwrap(),
            "--layer",
            "pts",
            "--id",
            "id",
            "--x",
            "lon",
            "--y",
            "lat",
            "--elev",
            "elev",
        ])
        .assert()
        .success();

    spotter()
        .args([
            "rebase",
            project.path().to_str().unwrap(),
            "--layer",
            "pts",
            "--x",
            "10000",
            "--y",
            "0",
            "--elevation",
            "15",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("closest is"));
}
