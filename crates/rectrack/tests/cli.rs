use assert_cmd::Command;
use predicates::prelude::*;
use rectrack::core::{FrameDimensions, Quad, Rect};
use rectrack::{ReplayConfig, ReplayFrame, ReplayReport};

fn rectrack() -> Command {
    Command::cargo_bin("rectrack").unwrap()
}

fn write_gradient(path: &std::path::Path) {
    let img = image::GrayImage::from_fn(100, 80, |x, y| image::Luma([(x * 2 + y) as u8]));
    img.save(path).unwrap();
}

#[test]
fn rectify_writes_cropped_image() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.png");
    let output = dir.path().join("out.png");
    write_gradient(&input);

    rectrack()
        .args(["rectify", "--image"])
        .arg(&input)
        .args(["--quad", "0.2,0.125", "0.6,0.125", "0.6,0.625", "0.2,0.625"])
        .arg("--out")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote 40x40"));

    let out = image::open(&output).unwrap().to_luma8();
    assert_eq!(out.dimensions(), (40, 40));
    assert_eq!(out.get_pixel(0, 0).0[0], (20 * 2 + 10) as u8);
}

#[test]
fn rectify_honors_orientation() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.png");
    let output = dir.path().join("out.png");
    write_gradient(&input);

    rectrack()
        .args(["rectify", "--image"])
        .arg(&input)
        .args(["--quad", "0.1,0.1", "0.6,0.1", "0.6,0.35", "0.1,0.35"])
        .args(["--orientation", "right", "--out"])
        .arg(&output)
        .assert()
        .success();

    let out = image::open(&output).unwrap().to_luma8();
    assert_eq!(out.dimensions(), (20, 50));
}

#[test]
fn rectify_rejects_quad_outside_image() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.png");
    write_gradient(&input);

    rectrack()
        .args(["rectify", "--image"])
        .arg(&input)
        .args(["--quad", "0.1,0.1", "1.4,0.1", "0.9,0.9", "0.1,0.9"])
        .arg("--out")
        .arg(dir.path().join("out.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside"));
}

#[test]
fn rectify_rejects_malformed_corner() {
    rectrack()
        .args(["rectify", "--image", "in.png", "--out", "out.png"])
        .args(["--quad", "0.1;0.1", "0.9,0.1", "0.9,0.9", "0.1,0.9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected x,y"));
}

#[test]
fn replay_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let doc = Quad::from_rect(Rect::new(0.1, 0.1, 0.5, 0.5), 0.9);
    let script = ReplayConfig {
        frame_size: FrameDimensions::new(64, 48),
        frames: vec![
            ReplayFrame {
                image: None,
                candidates: vec![doc],
            };
            3
        ],
        session: Default::default(),
        output_path: None,
        preview_dir: None,
    };
    let config = dir.path().join("replay.json");
    let report_path = dir.path().join("report.json");
    script.write_json(&config).unwrap();

    rectrack()
        .args(["replay", "--config"])
        .arg(&config)
        .arg("--out")
        .arg(&report_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 locked"));

    let raw = std::fs::read_to_string(&report_path).unwrap();
    let report: ReplayReport = serde_json::from_str(&raw).unwrap();
    assert_eq!(report.frames.len(), 3);
    assert_eq!(report.locked_frames, 2);
}

#[test]
fn replay_with_missing_config_fails() {
    rectrack()
        .args(["replay", "--config", "/nonexistent/replay.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn replay_previews_land_next_to_config() {
    let dir = tempfile::tempdir().unwrap();
    let elsewhere = tempfile::tempdir().unwrap();
    let doc = Quad::from_rect(Rect::new(0.1, 0.1, 0.5, 0.5), 0.9);
    let mut session = rectrack::RectrackConfig::default();
    session.mode = rectrack::PresentationMode::RectifiedPreview;
    let script = ReplayConfig {
        frame_size: FrameDimensions::new(64, 48),
        frames: vec![
            ReplayFrame {
                image: None,
                candidates: vec![doc],
            };
            2
        ],
        session,
        output_path: None,
        preview_dir: Some("previews".into()),
    };
    let config = dir.path().join("replay.json");
    script.write_json(&config).unwrap();

    rectrack()
        .current_dir(elsewhere.path())
        .args(["replay", "--config"])
        .arg(&config)
        .arg("--out")
        .arg(dir.path().join("report.json"))
        .assert()
        .success();

    assert!(dir.path().join("previews/preview_0000.png").is_file());
    assert!(!elsewhere.path().join("previews").exists());
}
