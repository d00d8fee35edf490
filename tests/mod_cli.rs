use bookshelf::cli::{Command, run};
use bookshelf::config::{AppConfig, StoreConfig};
use bookshelf::render::OutputMode;
use bookshelf::runner::run_with_config;

// Nothing listens on port 1; the short selection timeout keeps these tests fast.
const UNREACHABLE: &str = "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=300&connectTimeoutMS=300";

fn unreachable_config(output: OutputMode) -> AppConfig {
    AppConfig {
        store: StoreConfig::new(UNREACHABLE, "library", "books"),
        output,
        ..Default::default()
    }
}

#[tokio::test]
async fn unreachable_store_is_logged_not_raised() {
    let cfg = unreachable_config(OutputMode::Human);
    let mut out = Vec::new();
    let report = run_with_config(&cfg, &mut out).await;

    let failure = report.failure.as_ref().expect("connect should fail");
    assert_eq!(failure.index, 0);
    assert_eq!(failure.label, "connect");
    assert!(failure.error.is_store());
    assert!(report.steps.is_empty());
    assert!(report.released);
    assert!(String::from_utf8(out).unwrap().contains("[0] connect"));
}

#[tokio::test]
async fn run_command_succeeds_even_when_the_store_is_down() {
    let cfg = unreachable_config(OutputMode::Json);
    let mut out = Vec::new();
    run(&cfg, Command::Run, &mut out).await.unwrap();
    let line: serde_json::Value = serde_json::from_str(String::from_utf8(out).unwrap().trim()).unwrap();
    assert_eq!(line["step"], 0);
    assert!(line["error"].is_string());
}

#[tokio::test]
async fn seed_command_reports_connection_errors() {
    let cfg = unreachable_config(OutputMode::Human);
    let err = run(&cfg, Command::Seed { reset: true }, &mut Vec::new()).await.unwrap_err();
    assert!(err.is_store());
}

#[tokio::test]
async fn malformed_uri_fails_without_panicking() {
    let cfg = AppConfig {
        store: StoreConfig::new("not-a-uri", "library", "books"),
        ..Default::default()
    };
    let report = run_with_config(&cfg, &mut Vec::new()).await;
    assert_eq!(report.failure.map(|f| f.index), Some(0));
}

#[tokio::test]
async fn plan_command_lists_without_connecting() {
    let cfg = unreachable_config(OutputMode::Plain);
    let mut out = Vec::new();
    run(&cfg, Command::Plan, &mut out).await.unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 17);
    assert!(text.lines().next().unwrap().starts_with("step=1 kind=find"));
    assert!(text.contains("kind=explain"));
}
