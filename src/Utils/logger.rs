//! Logger set-up shared by the demos and by sessions built from a configuration
//! document. Wraps `simplelog::CombinedLogger` with a terminal logger and an
//! optional file logger.
use crate::symbolic::eval_errors::EvalError;
use chrono::Local;
use log::info;
use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;

/// Maps a loglevel name to a filter. `None` means logging is disabled.
pub fn parse_loglevel(level: &str) -> Result<Option<LevelFilter>, EvalError> {
    let log_option = match level {
        "off" | "none" => return Ok(None),
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => {
            return Err(EvalError::Config(format!(
                "loglevel must be off, none, trace, debug, info, warn or error, got {}",
                level
            )));
        }
    };
    Ok(Some(log_option))
}

/// `log_<date>_<time>.txt` in the working directory
pub fn default_log_file_name() -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("log_{}.txt", date_and_time)
}

/// Installs the global logger. Returns `Ok(true)` when this call installed it,
/// `Ok(false)` when logging is off or a logger was already installed.
pub fn init_logger(level: &str, log_file: Option<&str>) -> Result<bool, EvalError> {
    let log_option = match parse_loglevel(level)? {
        Some(filter) => filter,
        None => return Ok(false),
    };
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        log_option,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(name) = log_file {
        let file = File::create(name).map_err(|e| EvalError::Logger(e.to_string()))?;
        loggers.push(WriteLogger::new(log_option, Config::default(), file));
    }
    match CombinedLogger::init(loggers) {
        Ok(()) => {
            info!("Logger started with loglevel: {}", log_option);
            Ok(true)
        }
        // another logger is already set
        Err(_) => Ok(false),
    }
}
