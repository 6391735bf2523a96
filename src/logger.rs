use std::fs::OpenOptions;
use std::path::Path;

use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode, ThreadLogMode, WriteLogger};

use crate::error::{Error, Result};

/// Installs the global logger: stderr by default, or appending to `file`.
pub fn init_logger(level: LevelFilter, file: Option<&Path>) -> Result<()> {
    match file {
        Some(path) => init_file_logger(level, path),
        None => init_term_logger(level),
    }
}

fn prepare_logger_config() -> simplelog::Config {
    simplelog::ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(LevelFilter::Error)
        .set_thread_mode(ThreadLogMode::Names)
        .build()
}

fn init_term_logger(level: LevelFilter) -> Result<()> {
    TermLogger::init(
        level,
        prepare_logger_config(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .map_err(|e| Error::Logger(e.to_string()))
}

fn init_file_logger(level: LevelFilter, filename: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(filename)
        .map_err(|e| Error::Logger(format!("cannot open {}: {}", filename.display(), e)))?;

    WriteLogger::init(level, prepare_logger_config(), file).map_err(|e| Error::Logger(e.to_string()))
}
