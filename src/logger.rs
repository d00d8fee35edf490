//! `log4rs` setup: stderr console output, plus rolling files when a log directory is set.
//!
//! Results are printed to stdout by the runner, so nothing here ever writes to stdout.

use crate::config::AppConfig;
use crate::errors::ShelfError;
use crate::runner::OPS_TARGET;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::Path;
use std::sync::Mutex;

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_RETENTION: usize = 7;

static HANDLE: Mutex<Option<log4rs::Handle>> = Mutex::new(None);

pub fn parse_level(level: Option<&str>) -> LevelFilter {
    match level.unwrap_or("info").to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn rolling(dir: &Path, name: &str, keep: u32) -> Result<RollingFileAppender, ShelfError> {
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", dir.join(format!("{name}.{{}}.log")).display()), keep)
        .map_err(|e| ShelfError::Logging(e.to_string()))?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    Ok(RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(dir.join(format!("{name}.log")), Box::new(policy))?)
}

/// Build the logging config.
/// - dir: when set, `app.log` receives everything and `ops.log` the per-step timings
/// - level: error|warn|info|debug|trace (default info)
/// - retention: number of rolled files to keep (default 7)
pub fn build_config(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<usize>,
) -> Result<Config, ShelfError> {
    let lvl = parse_level(level);
    let keep = retention.unwrap_or(DEFAULT_RETENTION) as u32;
    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build();
    let mut builder = Config::builder().appender(Appender::builder().build("console", Box::new(console)));
    let mut root = Root::builder().appender("console");
    if let Some(base) = dir {
        std::fs::create_dir_all(base)?;
        builder = builder
            .appender(Appender::builder().build("app", Box::new(rolling(base, "app", keep)?)))
            .appender(Appender::builder().build("ops", Box::new(rolling(base, "ops", keep)?)))
            .logger(Logger::builder().appender("ops").additive(false).build(OPS_TARGET, lvl));
        root = root.appender("app");
    }
    builder
        .build(root.build(lvl))
        .map_err(|e| ShelfError::Logging(e.to_string()))
}

/// Configure logging for the process. Calling it again replaces the active config.
pub fn configure_logging(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<usize>,
) -> Result<(), ShelfError> {
    install(build_config(dir, level, retention)?)
}

fn install(config: Config) -> Result<(), ShelfError> {
    let mut guard = HANDLE.lock().map_err(|_| ShelfError::Logging("logger lock poisoned".into()))?;
    match guard.as_ref() {
        Some(handle) => handle.set_config(config),
        None => {
            let handle = log4rs::init_config(config).map_err(|e| ShelfError::Logging(e.to_string()))?;
            *guard = Some(handle);
        }
    }
    Ok(())
}

/// Read a log4rs config file; the format follows the extension (`.yaml`, `.yml`, `.toml`).
pub fn load_file(path: &Path) -> Result<Config, ShelfError> {
    log4rs::config::load_config_file(path, log4rs::config::Deserializers::default())
        .map_err(|e| ShelfError::Logging(format!("{}: {e}", path.display())))
}

/// Initialize logging from a log4rs config file.
pub fn init_path(path: &Path) -> Result<(), ShelfError> {
    install(load_file(path)?)
}

/// Initialize logging the way `cfg` asks: from `log_config` if set, otherwise programmatically.
pub fn init(cfg: &AppConfig) -> Result<(), ShelfError> {
    match &cfg.log_config {
        Some(path) => init_path(path),
        None => configure_logging(cfg.log_dir.as_deref(), cfg.log_level.as_deref(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names() {
        assert_eq!(parse_level(None), LevelFilter::Info);
        assert_eq!(parse_level(Some("DEBUG")), LevelFilter::Debug);
        assert_eq!(parse_level(Some("warn")), LevelFilter::Warn);
        assert_eq!(parse_level(Some("nonsense")), LevelFilter::Info);
    }

    #[test]
    fn toml_and_yaml_files_load() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("log4rs.toml");
        std::fs::write(
            &toml_path,
            "[appenders.stderr]\nkind = \"console\"\n\n[root]\nlevel = \"warn\"\nappenders = [\"stderr\"]\n",
        )
        .unwrap();
        let config = load_file(&toml_path).unwrap();
        assert_eq!(config.root().level(), LevelFilter::Warn);
        assert_eq!(config.appenders().len(), 1);

        let yaml_path = dir.path().join("log4rs.yaml");
        std::fs::write(
            &yaml_path,
            "appenders:\n  stderr:\n    kind: console\nroot:\n  level: debug\n  appenders:\n    - stderr\n",
        )
        .unwrap();
        assert_eq!(load_file(&yaml_path).unwrap().root().level(), LevelFilter::Debug);
    }

    #[test]
    fn unreadable_log_file_is_a_logging_error() {
        let err = load_file(Path::new("/definitely/not/here/log4rs.toml")).unwrap_err();
        assert!(matches!(err, ShelfError::Logging(_)));
    }

    #[test]
    fn console_only_config_builds() {
        assert!(build_config(None, Some("trace"), None).is_ok());
    }
}
