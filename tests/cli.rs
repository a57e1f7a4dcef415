extern crate assert_cmd;
extern crate image;
extern crate predicates;
extern crate tempfile;

use assert_cmd::prelude::*;
use image::GenericImageView;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn renders_a_ppm_of_the_requested_size() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("small.ppm");
    Command::cargo_bin("mandel")
        .unwrap()
        .args(&["-o", out.to_str().unwrap(), "-s", "64x36", "-t", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("RESOLUTION:       64x36"))
        .stdout(predicate::str::contains("MAX_ITER:         50"));
    let img = image::open(&out).unwrap();
    assert_eq!(img.dimensions(), (64, 36));
}

#[test]
fn replays_events_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("events.ppm");
    Command::cargo_bin("mandel")
        .unwrap()
        .args(&[
            "-o",
            out.to_str().unwrap(),
            "-s",
            "48x32",
            "--single",
            "-z",
            "24,16",
            "-z",
            "10,10",
            "--more",
            "--more",
            "--less",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("MODE:             SINGLE-CORE"))
        .stdout(predicate::str::contains("WORKERS:          1"))
        .stdout(predicate::str::contains("MAX_ITER:         60"));
    assert!(out.exists());
}

#[test]
fn reset_returns_to_the_default_bound() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("reset.ppm");
    Command::cargo_bin("mandel")
        .unwrap()
        .args(&["-o", out.to_str().unwrap(), "-s", "32x16", "-i", "200", "--reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MAX_ITER:         50"));
}

#[test]
fn rejects_a_malformed_size() {
    Command::cargo_bin("mandel")
        .unwrap()
        .args(&["-o", "never.ppm", "-s", "64"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not parse output image size"));
}

#[test]
fn rejects_a_malformed_zoom_before_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("zoom.ppm");
    Command::cargo_bin("mandel")
        .unwrap()
        .args(&["-o", out.to_str().unwrap(), "-s", "32x16", "-z", "16;8"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not parse zoom pixel"));
    assert!(!out.exists());
}

#[test]
fn reports_an_unrenderable_view() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("tiny.ppm");
    Command::cargo_bin("mandel")
        .unwrap()
        .args(&["-o", out.to_str().unwrap(), "-s", "3x3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Render failure"));
    assert!(!out.exists());
}
