// Scenario files played end to end

use pagelift::config::Config;
use pagelift::replay::{self, ReplayOptions, Scenario};
use std::io::Write;

const SCENARIO: &str = r#"
name = "checkout"
duration_ms = 1500

[viewport]
width = 1024
height = 700

[config.buttons]
flair = "off"

[config.announcer]
clear_delay_ms = 400

[[elements]]
id = "header"
tag = "header"
classes = ["main-header"]
rect = { x = 0, y = 0, width = 1024, height = 60 }

[[elements]]
id = "pay"
tag = "button"
classes = ["btn"]
text = "Pay"
rect = { x = 20, y = 1000, width = 120, height = 40 }

[[events]]
at_ms = 100
type = "scroll"
y = 600

[[events]]
at_ms = 400
type = "click"
target = "pay"

[[events]]
at_ms = 500
type = "announce"
message = "Payment sent"
"#;

fn write_scenario(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_replay_from_file() {
    let file = write_scenario(SCENARIO);
    let scenario = Scenario::load(file.path()).unwrap();
    let report = replay::run(scenario, Config::default(), ReplayOptions::default())
        .await
        .unwrap();

    assert_eq!(report.scenario, "checkout");
    assert_eq!(report.duration_ms, 1500);
    assert_eq!(report.classes_added("revealed"), vec!["pay"]);
    assert_eq!(report.classes_added("scrolled"), vec!["header"]);

    // Ripple created at 400 and removed at 1000
    let counts = report.mutation_counts();
    assert_eq!(counts.get("remove"), Some(&1));

    let nav = report.navigation.unwrap();
    assert!(nav.scrolled);
    assert_eq!(nav.last_y, 600.0);
}

#[tokio::test]
async fn test_report_serializes_to_json() {
    let scenario = Scenario::parse(SCENARIO).unwrap();
    let report = replay::run(scenario, Config::default(), ReplayOptions::default())
        .await
        .unwrap();

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["scenario"], "checkout");
    assert_eq!(json["elements"]["pay"], report.elements["pay"].0);
    assert_eq!(json["startup"]["is_mobile"], false);

    let ops: Vec<&str> = json["mutations"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["op"].as_str())
        .collect();
    assert!(ops.contains(&"add_class"));
    assert!(ops.contains(&"set_text"));
}

#[tokio::test]
async fn test_announcement_uses_scenario_config() {
    let scenario = Scenario::parse(SCENARIO).unwrap();
    let report = replay::run(scenario, Config::default(), ReplayOptions::default())
        .await
        .unwrap();

    let cleared_at: Vec<u64> = report
        .mutations
        .iter()
        .filter_map(|m| match &m.kind {
            pagelift::host::MutationKind::SetText { text } if text.is_empty() => Some(m.at_ms),
            _ => None,
        })
        .collect();
    assert_eq!(cleared_at, vec![900]);
}

#[test]
fn test_missing_file_reports_path() {
    let err = Scenario::load(std::path::Path::new("/nonexistent/trace.toml")).unwrap_err();
    assert!(format!("{:#}", err).contains("/nonexistent/trace.toml"));
}

#[test]
fn test_bad_scenario_reports_path() {
    let file = write_scenario("[[events]]\nat_ms = \"soon\"\n");
    let err = Scenario::load(file.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("Invalid scenario"));
}
