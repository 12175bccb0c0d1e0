//! Command-line tests
//!
//! Runs the `bac-mapper` binary on small clone tables written to temporary
//! files and checks what it prints.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

const CLONES: &str = "\
name\tlibrary\tfragments\tsequenced\tattributes
T1\tRP11\t1100,1200,1300,1400,1500\tyes\tlocation=1000-13000
T2\tRP11\t1300,1400,1500,1600,1700\tno\t
T3\tRP11\t1500,1600,1700,1800,1900\tno\t
lonely\tRP11\t5000,7000,9000\tno\t
";

fn table(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(suffix).expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp file");
    file
}

fn bac_mapper() -> Command {
    Command::cargo_bin("bac-mapper").expect("binary builds")
}

#[test]
fn test_pairs_tsv_lists_confirmed_overlaps() {
    let clones = table(CLONES, ".tsv");

    bac_mapper()
        .args(["pairs", "--format", "tsv"])
        .arg(clones.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("clone_a\tclone_b\tmatched"))
        .stdout(predicate::str::contains("T1\tT2\t3\t0.6000"))
        .stdout(predicate::str::contains("T2\tT3\t3"))
        .stdout(predicate::str::contains("lonely").not());
}

#[test]
fn test_assemble_text_shows_segment_and_unplaced() {
    let clones = table(CLONES, ".tsv");

    bac_mapper()
        .arg("assemble")
        .arg(clones.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Segment 1 (3 clones"))
        .stdout(predicate::str::contains("lonely (no confirmed overlap)"));
}

#[test]
fn test_assemble_tsv_reports_placements() {
    let clones = table(CLONES, ".tsv");

    bac_mapper()
        .args(["assemble", "--format", "tsv"])
        .arg(clones.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("T1\tRP11\t1\t0\t6500\ttrue\t7000"))
        .stdout(predicate::str::contains("lonely\tRP11\t\t\t\tfalse\t"));
}

#[test]
fn test_assemble_json_is_parseable() {
    let clones = table(CLONES, ".tsv");

    let output = bac_mapper()
        .args(["assemble", "--format", "json"])
        .arg(clones.path())
        .output()
        .expect("binary runs");
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert!(json["created_at"].is_string());
    assert_eq!(json["map"]["segments"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["map"]["unplaced"][0]["id"], "lonely");
}

#[test]
fn test_coverage_of_region() {
    let clones = table(CLONES, ".tsv");

    bac_mapper()
        .args(["coverage", "--region-length", "24600"])
        .arg(clones.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Placed clones: 3"))
        .stdout(predicate::str::contains("Segments: 1"))
        .stdout(predicate::str::contains("Region coverage: 50.00%"));
}

#[test]
fn test_coverage_of_empty_table() {
    let clones = table("name\tlibrary\tfragments\n", ".tsv");

    bac_mapper()
        .arg("coverage")
        .arg(clones.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Input clones: 0"))
        .stdout(predicate::str::contains("Average clone length: n/a"));
}

#[test]
fn test_clone_without_fragments_is_reported() {
    let clones = table("A\tRP11\t100,200,300\nempty\tRP11\t\n", ".tsv");

    bac_mapper()
        .args(["pairs"])
        .arg(clones.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Problems:"))
        .stdout(predicate::str::contains("empty"));
}

#[test]
fn test_csv_input_with_relative_tolerance() {
    let csv = "A,RP11,1000 2000 3000 4000\nB,RP11,1010 2020 3030 9000\n";
    let clones = table(csv, ".csv");

    bac_mapper()
        .args(["pairs", "--format", "tsv", "--tolerance-fraction", "0.02"])
        .arg(clones.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("A\tB\t3"));
}

#[test]
fn test_cross_library_needs_opt_in() {
    let clones = table("A\tRP11\t100,200,300\nB\tCTD\t100,200,300\n", ".tsv");
    let libraries = table("RP11\tHindIII\nCTD\tHindIII\n", ".tsv");

    bac_mapper()
        .args(["pairs", "--format", "tsv"])
        .arg(clones.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("A\tB").not());

    bac_mapper()
        .args(["pairs", "--format", "tsv", "--cross-library", "--libraries"])
        .arg(libraries.path())
        .arg(clones.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("A\tB\t3"));
}

#[test]
fn test_conflicting_tolerances_rejected() {
    let clones = table(CLONES, ".tsv");

    bac_mapper()
        .args(["pairs", "--tolerance-bp", "10", "--tolerance-fraction", "0.01"])
        .arg(clones.path())
        .assert()
        .failure();
}

#[test]
fn test_missing_clone_table_fails() {
    bac_mapper()
        .args(["assemble", "/nonexistent/clones.tsv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Reading clone table"));
}
