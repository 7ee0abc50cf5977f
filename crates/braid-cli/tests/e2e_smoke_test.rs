use std::fs;

use tempfile::tempdir;

use braid_cli::{Args, run};

const CHART: &str = r#"{
    "streams": [
        {"name": "literature", "start": 1896, "end": 1920,
         "values": {"1896": 14.0, "1920": 30.0}},
        {"name": "vaudeville", "start": 1899, "end": 1915,
         "parent_start": "literature", "parent_end": "literature"}
    ],
    "links": [
        {"from": "literature", "to": "vaudeville", "start": 1905},
        {"from": "vaudeville", "to": "literature", "start": 1912, "merge": true}
    ],
    "tags": [
        {"stream": "literature", "time": 1900, "text": "first issue"},
        {"stream": "vaudeville", "time": 1910, "text": "peak", "placement": "inner"}
    ]
}"#;

#[test]
fn e2e_refines_chart_to_layout_json() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let input_path = temp_dir.path().join("chart.json");
    let output_path = temp_dir.path().join("layout.json");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&input_path, CHART).expect("Failed to write chart");
    fs::write(
        &config_path,
        r#"
        [simulation]
        time_scale = 10.0
        viewport = { height = 400.0 }
        "#,
    )
    .expect("Failed to write config");

    let args = Args {
        input: input_path.to_string_lossy().to_string(),
        output: output_path.to_string_lossy().to_string(),
        config: Some(config_path.to_string_lossy().to_string()),
        steps: 0,
        log_level: "off".to_string(),
    };

    run(&args).expect("Refinement run failed");

    let output = fs::read_to_string(&output_path).expect("Failed to read layout");
    let placed: serde_json::Value = serde_json::from_str(&output).expect("Output is not JSON");
    let placed = placed.as_array().expect("Output is not an array");

    // 25 literature nodes, 17 vaudeville nodes, 1 port, 2 tags of 4
    assert_eq!(placed.len(), 25 + 17 + 1 + 8);

    for node in placed {
        let x = node["x"].as_f64().unwrap();
        let y = node["y"].as_f64().unwrap();
        let height = node["height"].as_f64().unwrap();
        assert!(x.is_finite() && y.is_finite());
        assert!(y >= height / 2.0 && y <= 400.0 - height / 2.0);
    }

    // time-pinned nodes land at time * time_scale
    let first = placed
        .iter()
        .find(|node| node["id"] == "literature@1896")
        .expect("stream node missing from output");
    assert_eq!(first["x"].as_f64().unwrap(), 18960.0);
}

#[test]
fn e2e_missing_input_fails() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let args = Args {
        input: temp_dir
            .path()
            .join("does-not-exist.json")
            .to_string_lossy()
            .to_string(),
        output: temp_dir.path().join("out.json").to_string_lossy().to_string(),
        config: None,
        steps: 0,
        log_level: "off".to_string(),
    };

    assert!(run(&args).is_err());
}

#[test]
fn e2e_malformed_chart_fails() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let input_path = temp_dir.path().join("broken.json");
    fs::write(&input_path, "{ not json").expect("Failed to write input");

    let args = Args {
        input: input_path.to_string_lossy().to_string(),
        output: temp_dir.path().join("out.json").to_string_lossy().to_string(),
        config: None,
        steps: 0,
        log_level: "off".to_string(),
    };

    assert!(run(&args).is_err());
}
