//! Integration tests for the chart-schema binary

use std::process::Command;

/// Helper to run chart-schema
fn chart_schema(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_chart-schema"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute chart-schema")
}

/// Get a fixture chart path
fn fixture(name: &str) -> String {
    format!("{}/../../fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("Output should be valid JSON")
}

mod schema_output {
    use super::*;

    #[test]
    fn test_basic_chart() {
        let output = chart_schema(&[&fixture("basic")]);

        assert!(output.status.success(), "Expected success for basic chart");
        let json = stdout_json(&output);

        assert_eq!(
            json["$schema"],
            "https://json-schema.org/draft/2020-12/schema"
        );
        assert_eq!(json["type"], "object");
        assert_eq!(json["properties"]["podAnnotations"]["type"], "object");
        assert_eq!(json["properties"]["env"]["type"], "array");
        assert_eq!(
            json["properties"]["image"]["properties"]["repository"],
            serde_json::json!({})
        );
    }

    #[test]
    fn test_subcharts_nested_under_their_names() {
        let output = chart_schema(&[&fixture("with-subcharts")]);

        assert!(output.status.success());
        let json = stdout_json(&output);
        let properties = json["properties"].as_object().unwrap();

        assert!(properties.contains_key("redis"));
        assert!(properties.contains_key("api"), "alias should name the subchart");
        assert!(!properties.contains_key("backend"));
        assert!(!properties.contains_key("metrics"));
        assert_eq!(
            json["properties"]["redis"]["properties"]["auth"]["properties"]["password"],
            serde_json::json!({})
        );
    }

    #[test]
    fn test_no_subcharts_flag() {
        let output = chart_schema(&[&fixture("with-subcharts"), "--no-subcharts"]);

        assert!(output.status.success());
        let json = stdout_json(&output);
        let keys: Vec<_> = json["properties"].as_object().unwrap().keys().cloned().collect();

        assert_eq!(keys, vec!["global", "ingress"]);
    }

    #[test]
    fn test_output_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("values.schema.json");

        let output = chart_schema(&[&fixture("basic"), "-o", target.to_str().unwrap()]);

        assert!(output.status.success());
        assert!(output.stdout.is_empty());

        let written = std::fs::read_to_string(&target).unwrap();
        let json: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(json["type"], "object");
        assert!(written.ends_with("}\n"));
    }
}

mod paths_output {
    use super::*;

    #[test]
    fn test_paths_listing() {
        let output = chart_schema(&[&fixture("basic"), "--paths"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        let lines: Vec<_> = stdout.lines().collect();

        assert!(lines.contains(&"image\tobject"));
        assert!(lines.contains(&"image.tag\tunknown"));
        assert!(lines.contains(&"env\tarray"));
        assert!(lines.contains(&"podAnnotations\tmap"));

        let mut sorted = lines.clone();
        sorted.sort();
        assert_eq!(lines, sorted, "paths should be listed in order");
    }

    #[test]
    fn test_paths_include_subcharts() {
        let output = chart_schema(&[&fixture("with-subcharts"), "--paths"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);

        assert!(stdout.lines().any(|l| l == "api\tobject"));
        assert!(stdout.lines().any(|l| l == "api.ports\tarray"));
        assert!(stdout.lines().any(|l| l == "redis.sentinel.quorum\tunknown"));
    }
}

mod errors {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_chart_fails() {
        let output = chart_schema(&[&fixture("empty")]);

        assert_eq!(output.status.code(), Some(7));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(
            stderr.contains("No value paths found"),
            "Expected empty schema error. Got: {}",
            stderr
        );
        assert!(output.stdout.is_empty());
    }

    #[test]
    fn test_subchart_without_references_fails() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("templates")).unwrap();
        fs::create_dir_all(dir.path().join("charts/redis/templates")).unwrap();
        fs::write(
            dir.path().join("Chart.yaml"),
            r#"apiVersion: v2
name: app
version: 0.1.0
dependencies:
  - name: redis
    version: 1.0.0
"#,
        )
        .unwrap();
        fs::write(dir.path().join("templates/cm.yaml"), "{{ .Release.Name }}").unwrap();
        fs::write(
            dir.path().join("charts/redis/Chart.yaml"),
            "apiVersion: v2\nname: redis\nversion: 1.0.0\n",
        )
        .unwrap();
        fs::write(dir.path().join("charts/redis/templates/svc.yaml"), "{{ .Chart.Name }}")
            .unwrap();

        for extra in [None, Some("--paths")] {
            let mut args = vec![dir.path().to_str().unwrap()];
            args.extend(extra);
            let output = chart_schema(&args);

            assert_eq!(output.status.code(), Some(7), "args: {:?}", args);
            assert!(output.stdout.is_empty());
        }
    }

    #[test]
    fn test_missing_chart() {
        let output = chart_schema(&[&fixture("does-not-exist")]);

        assert_eq!(output.status.code(), Some(3));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Chart not found"));
    }

    #[test]
    fn test_missing_templates_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Chart.yaml"), "apiVersion: v2\nname: x\nversion: 0.1.0\n")
            .unwrap();

        let output = chart_schema(&[dir.path().to_str().unwrap()]);

        assert_eq!(output.status.code(), Some(3));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("templates directory not found"));
    }

    #[test]
    fn test_remote_dependency_without_helm() {
        let dir = TempDir::new().unwrap();
        let empty_path = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("templates")).unwrap();
        fs::write(
            dir.path().join("Chart.yaml"),
            r#"apiVersion: v2
name: remote
version: 0.1.0
dependencies:
  - name: postgresql
    version: 12.0.0
    repository: https://charts.example.com
"#,
        )
        .unwrap();
        fs::write(dir.path().join("templates/cm.yaml"), "{{ .Values.enabled }}").unwrap();

        let output = Command::new(env!("CARGO_BIN_EXE_chart-schema"))
            .arg(dir.path())
            .env("PATH", empty_path.path())
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(6));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("helm not found"));

        // Without subcharts the build step is skipped
        let output = Command::new(env!("CARGO_BIN_EXE_chart-schema"))
            .arg(dir.path())
            .arg("--no-subcharts")
            .env("PATH", empty_path.path())
            .output()
            .unwrap();
        assert!(output.status.success());
    }

    #[test]
    fn test_missing_argument_is_usage_error() {
        let output = chart_schema(&[]);
        assert_eq!(output.status.code(), Some(2));
    }
}
