//! Logging bootstrap.
//!
//! Everything goes through the `log` facade; `env_logger` writes to stderr.
//! `RUST_LOG`, when set, is applied after the mode defaults.

use crate::config::DebugMode;
use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;

/// Module whose warnings are expected noise while running in test mode
const CSV_REPO_TARGET: &str = "taskbuddy::repo::csv_repo";

/// Root level for a debug mode
pub fn level_for(mode: DebugMode) -> LevelFilter {
    match mode {
        DebugMode::Dev => LevelFilter::Debug,
        DebugMode::Test | DebugMode::Prod => LevelFilter::Info,
    }
}

fn builder_for(mode: DebugMode) -> Builder {
    let mut builder = Builder::new();
    builder.filter_level(level_for(mode));
    if mode == DebugMode::Test {
        builder.filter_module(CSV_REPO_TARGET, LevelFilter::Error);
    }
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} - {} - {} - {}:{} - {}",
            record.level(),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.target(),
            record.file().unwrap_or("?"),
            record.line().unwrap_or(0),
            record.args()
        )
    });
    builder
}

/// Install the global logger for `mode`.
///
/// Only the first call in a process takes effect; later calls are ignored.
pub fn setup_logging(mode: DebugMode) {
    if builder_for(mode).try_init().is_ok() {
        log::debug!("Logging configured for '{}' mode.", mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_per_mode() {
        assert_eq!(level_for(DebugMode::Dev), LevelFilter::Debug);
        assert_eq!(level_for(DebugMode::Test), LevelFilter::Info);
        assert_eq!(level_for(DebugMode::Prod), LevelFilter::Info);
    }

    #[test]
    fn test_setup_is_idempotent() {
        setup_logging(DebugMode::Test);
        setup_logging(DebugMode::Dev);
    }
}
