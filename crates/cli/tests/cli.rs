// ABOUTME: Integration tests for the carousel CLI binary.
// ABOUTME: Tests HTML conversion, JSON reports, resize and click replay, and error exits.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn carousel_cmd() -> Command {
    Command::cargo_bin("carousel").unwrap()
}

fn article_page(count: usize) -> String {
    let cards: String = (1..=count)
        .map(|n| format!(r#"<article class="article-card">Story {n}</article>"#))
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Blog</title></head>
<body>
<div class="article-grid" id="latest">{cards}</div>
</body>
</html>"#
    )
}

fn write_page(dir: &TempDir, html: &str) -> std::path::PathBuf {
    let path = dir.path().join("page.html");
    fs::write(&path, html).unwrap();
    path
}

#[test]
fn converts_grid_to_slide_structure() {
    let temp_dir = TempDir::new().unwrap();
    let page = write_page(&temp_dir, &article_page(6));

    carousel_cmd()
        .arg("--html")
        .arg(&page)
        .assert()
        .success()
        .stdout(predicate::str::contains("swiper-wrapper"))
        .stdout(predicate::str::contains("carousel-initialized"))
        .stdout(predicate::str::contains("swiper-pagination-bullet-active"));
}

#[test]
fn grid_that_fits_is_printed_unchanged() {
    let temp_dir = TempDir::new().unwrap();
    let page = write_page(&temp_dir, &article_page(3));

    carousel_cmd()
        .arg("--html")
        .arg(&page)
        .arg("--width")
        .arg("1300")
        .assert()
        .success()
        .stdout(predicate::str::contains("Story 3"))
        .stdout(predicate::str::contains("swiper-wrapper").not());
}

#[test]
fn json_report_replays_clicks() {
    let temp_dir = TempDir::new().unwrap();
    let page = write_page(&temp_dir, &article_page(10));

    let output = carousel_cmd()
        .arg("--html")
        .arg(&page)
        .arg("--json")
        .arg("--click")
        .arg("next")
        .arg("--click")
        .arg("bullet:2")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["converter"], "article-slider");
    assert_eq!(report["scan"]["transformed"], 1);
    assert_eq!(report["clicks"][0]["outcome"]["advanced"], "next");
    assert_eq!(report["clicks"][1]["outcome"]["seeked"], 8);
    let instance = &report["instances"][0];
    assert_eq!(instance["pagination_groups"], serde_json::json!([0, 4, 8]));
    assert_eq!(instance["nav_state"], "end");
}

#[test]
fn resize_past_capacity_reverts() {
    let temp_dir = TempDir::new().unwrap();
    let page = write_page(&temp_dir, &article_page(5));

    let output = carousel_cmd()
        .arg("--html")
        .arg(&page)
        .arg("--json")
        .arg("--resize")
        .arg("1600")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["scan"]["transformed"], 1);
    assert_eq!(report["resizes"][0]["report"]["reverted"], 1);
    assert_eq!(report["instances"], serde_json::json!([]));
}

#[test]
fn custom_config_and_output_file() {
    let temp_dir = TempDir::new().unwrap();
    let page = write_page(
        &temp_dir,
        r#"<html><body><ul class="tiles"><li>a</li><li>b</li><li>c</li></ul></body></html>"#,
    );
    let config = temp_dir.path().join("tiles.json");
    fs::write(
        &config,
        r#"{
            "name": "tile-slider",
            "container_selector": ".tiles",
            "item_selector": "li",
            "breakpoints": [{"min_width": 0, "slides_per_view": 1}]
        }"#,
    )
    .unwrap();
    let out = temp_dir.path().join("out.html");

    carousel_cmd()
        .arg("--html")
        .arg(&page)
        .arg("--config")
        .arg(&config)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains("tile-slider-1-wrapper"));
}

#[test]
fn config_without_zero_width_entry_fails() {
    let temp_dir = TempDir::new().unwrap();
    let page = write_page(&temp_dir, &article_page(6));
    let config = temp_dir.path().join("bad.json");
    fs::write(
        &config,
        r#"{
            "name": "bad",
            "container_selector": ".article-grid",
            "item_selector": ".article-card",
            "breakpoints": [{"min_width": 768, "slides_per_view": 2}]
        }"#,
    )
    .unwrap();

    carousel_cmd()
        .arg("--html")
        .arg(&page)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("configuration error"));
}

#[test]
fn missing_html_file_fails() {
    carousel_cmd()
        .arg("--html")
        .arg("/nonexistent/page.html")
        .assert()
        .failure()
        .stderr(predicate::str::contains("file not found"));
}

#[test]
fn unknown_preset_fails() {
    let temp_dir = TempDir::new().unwrap();
    let page = write_page(&temp_dir, &article_page(6));

    carousel_cmd()
        .arg("--html")
        .arg(&page)
        .arg("--preset")
        .arg("banners")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown preset"))
        .stderr(predicate::str::contains("available: articles, products"));
}
