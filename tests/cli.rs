mod common;

use assert_cmd::Command;
use predicates::prelude::*;

use common::{fixture, write_image_with_sidecar, KNEE_FIXTURE_DEGREES};

fn goniometry() -> Command {
    let mut cmd = Command::cargo_bin("goniometry").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("GONIOMETRY_CONFIG");
    cmd
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout is JSON")
}

#[test]
fn runs() {
    goniometry().assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = goniometry();
    cmd.arg("-V");
    cmd.assert().success().stdout("goniometry 0.1.0\n");
}

// Keypoints subcommand tests

#[test]
fn keypoints_lists_sided_names_in_operand_order() {
    let mut cmd = goniometry();
    cmd.args(["keypoints", "--metric", "knee", "--side", "left"]);
    cmd.assert()
        .success()
        .stdout("LEFT_HIP\nLEFT_KNEE\nLEFT_ANKLE\n");
}

#[test]
fn keypoints_unknown_metric_fails() {
    let mut cmd = goniometry();
    cmd.args(["keypoints", "--metric", "elbow"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown metric 'elbow'"));
}

// Angle subcommand tests

#[test]
fn angle_from_pixel_landmarks() {
    let mut cmd = goniometry();
    cmd.arg("angle")
        .arg(fixture("knee_pixel.landmarks.json"))
        .args(["--metric", "knee"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("knee (right): 147.99°"))
        .stdout(predicate::str::contains("vertex (100.0, 200.0)"));
}

#[test]
fn angle_json_output_has_degrees_and_operands() {
    let mut cmd = goniometry();
    cmd.arg("angle")
        .arg(fixture("knee_pixel.landmarks.json"))
        .args(["--metric", "hipFlexion", "--side", "left", "--output", "json"]);
    let value = stdout_json(&mut cmd);

    assert_eq!(value["metric"], "hipFlexion");
    assert_eq!(value["side"], "left");
    assert_eq!(value["operands"]["last"]["x"], 200.0);
    let degrees = value["degrees"].as_f64().unwrap();
    assert!((0.0..=180.0).contains(&degrees));
}

#[test]
fn angle_normalized_landmarks_need_dimensions() {
    let mut cmd = goniometry();
    cmd.arg("angle")
        .arg(fixture("knee_normalized.landmarks.json"))
        .args(["--metric", "knee"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--width and --height"));

    let mut cmd = goniometry();
    cmd.arg("angle")
        .arg(fixture("knee_normalized.landmarks.json"))
        .args(["--metric", "knee", "--width", "200", "--height", "400", "--output", "json"]);
    let value = stdout_json(&mut cmd);
    assert!((value["degrees"].as_f64().unwrap() - KNEE_FIXTURE_DEGREES).abs() < 1e-9);
}

#[test]
fn angle_missing_landmark_fails() {
    let mut cmd = goniometry();
    cmd.arg("angle")
        .arg(fixture("knee_normalized.landmarks.json"))
        .args(["--metric", "ankle", "--width", "10", "--height", "10"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Missing landmark RIGHT_FOOT_INDEX"));
}

#[test]
fn angle_no_pose_fails() {
    let mut cmd = goniometry();
    cmd.arg("angle")
        .arg(fixture("no_pose.landmarks.json"))
        .args(["--metric", "knee", "--width", "10", "--height", "10"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("No pose detected"));
}

#[test]
fn angle_nonexistent_file_fails() {
    let mut cmd = goniometry();
    cmd.args(["angle", "nonexistent.landmarks.json", "--metric", "knee"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read landmarks from nonexistent.landmarks.json"));
}

// Measure subcommand tests

#[test]
fn measure_reports_every_metric_independently() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let knee = write_image_with_sidecar(temp.path(), "knee", Some("knee_normalized.landmarks.json"));
    let ankle = write_image_with_sidecar(temp.path(), "ankle", Some("knee_normalized.landmarks.json"));
    let popliteal = write_image_with_sidecar(temp.path(), "popliteal", Some("no_pose.landmarks.json"));
    let r1 = write_image_with_sidecar(temp.path(), "r1", None);

    let mut cmd = goniometry();
    cmd.arg("measure")
        .arg("--knee")
        .arg(&knee)
        .arg("--ankle")
        .arg(&ankle)
        .arg("--popliteal")
        .arg(&popliteal)
        .arg("--r1")
        .arg(&r1)
        .args(["--encoding", "png"]);
    let value = stdout_json(&mut cmd);

    let knee = &value["knee"];
    assert!((knee["angle"].as_f64().unwrap() - KNEE_FIXTURE_DEGREES).abs() < 1e-9);
    assert!(knee["error"].is_null());
    assert!(knee["image"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));

    assert_eq!(value["ankle"]["error_kind"], "MissingLandmark");
    assert_eq!(value["popliteal"]["error"], "No pose detected");
    assert!(value["popliteal"]["image"].is_string());
    assert_eq!(value["R1"]["error_kind"], "ProviderFailure");

    for metric in ["hipFlexion", "R2"] {
        assert!(value[metric]["angle"].is_null());
        assert_eq!(value[metric]["error"], "No image provided");
    }
}

#[test]
fn measure_reads_sidecars_from_landmarks_dir() {
    let images = tempfile::tempdir().expect("create temp dir");
    let sidecars = tempfile::tempdir().expect("create temp dir");
    let knee = write_image_with_sidecar(images.path(), "knee", None);
    std::fs::copy(
        fixture("knee_normalized.landmarks.json"),
        sidecars.path().join("knee.landmarks.json"),
    )
    .unwrap();

    let mut cmd = goniometry();
    cmd.arg("measure")
        .arg("--knee")
        .arg(&knee)
        .arg("--landmarks-dir")
        .arg(sidecars.path())
        .args(["--output", "csv", "--no-images"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("metric,side,angle,error_kind,error\n"))
        .stdout(predicate::str::contains("knee,right,147.99"))
        .stdout(predicate::str::contains("R2,right,,NoImageProvided,No image provided"));
}

#[test]
fn measure_config_file_disables_images() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let knee = write_image_with_sidecar(temp.path(), "knee", Some("knee_normalized.landmarks.json"));
    let config = temp.path().join("goniometry.yaml");
    std::fs::write(&config, "include_images: false\nconcurrent: true\n").unwrap();

    let mut cmd = goniometry();
    cmd.arg("measure").arg("--knee").arg(&knee).arg("--config").arg(&config);
    let value = stdout_json(&mut cmd);
    assert!(value["knee"]["angle"].is_number());
    assert!(value["knee"]["image"].is_null());
}

#[test]
fn measure_text_output_summarises() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let knee = write_image_with_sidecar(temp.path(), "knee", Some("knee_normalized.landmarks.json"));

    let mut cmd = goniometry();
    cmd.arg("measure")
        .arg("--knee")
        .arg(&knee)
        .args(["--output", "text", "--no-images"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Measured 1 of 6 metric(s) on the right side"))
        .stdout(predicate::str::contains("[NoImageProvided]"));
}

#[test]
fn measure_without_images_fails() {
    let mut cmd = goniometry();
    cmd.arg("measure");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("No images provided"));
}

#[test]
fn measure_rejects_bad_side_and_format() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let knee = write_image_with_sidecar(temp.path(), "knee", Some("knee_normalized.landmarks.json"));

    let mut cmd = goniometry();
    cmd.arg("measure").arg("--knee").arg(&knee).args(["--side", "up"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid side 'up'"));

    let mut cmd = goniometry();
    cmd.arg("measure").arg("--knee").arg(&knee).args(["--output", "xml"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported format"));
}

#[test]
fn measure_unreadable_image_fails_only_its_metric() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let knee = write_image_with_sidecar(temp.path(), "knee", Some("knee_normalized.landmarks.json"));
    let missing = temp.path().join("missing").join("ankle.jpg");

    let mut cmd = goniometry();
    cmd.arg("measure")
        .arg("--knee")
        .arg(&knee)
        .arg("--ankle")
        .arg(&missing);
    let json = stdout_json(&mut cmd);
    assert!((json["knee"]["angle"].as_f64().unwrap() - KNEE_FIXTURE_DEGREES).abs() < 1e-9);
    assert_eq!(json["ankle"]["error_kind"], "ProviderFailure");
    assert!(json["ankle"]["error"].as_str().unwrap().contains("ankle.jpg"));
}

#[test]
fn measure_with_only_unreadable_images_still_reports_per_metric() {
    let mut cmd = goniometry();
    cmd.args(["measure", "--knee", "does/not/exist.jpg", "--output", "csv"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("knee,right,,ProviderFailure,"))
        .stdout(predicate::str::contains("does/not/exist.jpg"));
}
