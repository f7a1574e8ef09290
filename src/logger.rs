use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::Encode;
use log4rs::encode::json::JsonEncoder;
use log4rs::encode::pattern::PatternEncoder;
use serde::Serialize;
use std::path::Path;

use crate::config::ServiceConfig;

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE: u64 = 10 * 1024 * 1024;
const RETENTION: u32 = 7;

fn level_filter(level: Option<&str>) -> LevelFilter {
    match level.unwrap_or("info").to_ascii_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

fn encoder(json: bool) -> Box<dyn Encode> {
    if json { Box::new(JsonEncoder::new()) } else { Box::new(PatternEncoder::new(PATTERN)) }
}

/// Installs the process logger: stderr always, plus `{dir}/app.log` (rolled at 10 MiB,
/// 7 files kept) when `dir` is given. `json` selects structured output.
///
/// If a logger is already installed the existing one is kept.
///
/// # Errors
/// Returns an error if the log directory or file appender cannot be created.
pub fn configure_logging(
    dir: Option<&Path>,
    level: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let lvl = level_filter(level);
    let stderr = ConsoleAppender::builder().target(Target::Stderr).encoder(encoder(json)).build();
    let mut builder =
        Config::builder().appender(Appender::builder().build("stderr", Box::new(stderr)));
    let mut root = Root::builder().appender("stderr");

    if let Some(base) = dir {
        std::fs::create_dir_all(base)?;
        let roller = FixedWindowRoller::builder()
            .build(&format!("{}", base.join("app.{}.log").display()), RETENTION)?;
        let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
        let file = RollingFileAppender::builder()
            .encoder(encoder(json))
            .build(base.join("app.log"), Box::new(policy))?;
        builder = builder.appender(Appender::builder().build("app", Box::new(file)));
        root = root.appender("app");
    }

    let config = builder.build(root.build(lvl))?;
    if log4rs::init_config(config).is_err() {
        log::debug!("logger already initialized; keeping existing configuration");
    }
    Ok(())
}

/// Configures logging from a loaded [`ServiceConfig`]; production means JSON.
///
/// # Errors
/// See [`configure_logging`].
pub fn configure_from_config(cfg: &ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    configure_logging(cfg.log_dir.as_deref(), cfg.log_level.as_deref(), cfg.is_production())
}

/// Configures logging from `NEXUSQUERY_LOG_DIR`, `NEXUSQUERY_LOG_LEVEL` and `NEXUSQUERY_ENV`.
///
/// # Errors
/// See [`configure_logging`].
pub fn configure_from_env() -> Result<(), Box<dyn std::error::Error>> {
    let dir = std::env::var("NEXUSQUERY_LOG_DIR").ok().map(std::path::PathBuf::from);
    let level = std::env::var("NEXUSQUERY_LOG_LEVEL").ok();
    let json = std::env::var("NEXUSQUERY_ENV").is_ok_and(|e| e == "production");
    configure_logging(dir.as_deref(), level.as_deref(), json)
}

/// Logs `value` as pretty-printed JSON at info level.
pub fn log_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => log::info!("Results: {s}"),
        Err(e) => log::error!("json encoding failed: {e}"),
    }
}
