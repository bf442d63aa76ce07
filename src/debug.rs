//! Logging bridge for termdeck
//!
//! Routes every `log::info!()` / `log::debug!()` etc. to a debug file so
//! diagnostic output never lands on the terminals the multiplexer hosts:
//!
//! - `/tmp/termdeck_debug.log` on Unix/macOS
//! - `%TEMP%\termdeck_debug.log` on Windows
//!
//! When `RUST_LOG` is set the same lines are mirrored to stderr.
//! Precedence for the level: the explicit level passed to
//! [`init_log_bridge`] (CLI flag), then `RUST_LOG`, then the config value
//! applied later through [`set_level`].

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use termdeck_config::LogLevel;

struct LogBridge {
    file: Mutex<Option<File>>,
    mirror_stderr: bool,
}

static BRIDGE: OnceLock<LogBridge> = OnceLock::new();

/// Path of the debug log file
pub fn log_path() -> PathBuf {
    #[cfg(unix)]
    let path = PathBuf::from("/tmp/termdeck_debug.log");
    #[cfg(not(unix))]
    let path = std::env::temp_dir().join("termdeck_debug.log");
    path
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S%.6f").to_string()
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            timestamp(),
            record.level(),
            record.target(),
            record.args()
        );
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.write_all(line.as_bytes());
        }
        if self.mirror_stderr {
            eprint!("{}", line);
        }
    }

    fn flush(&self) {
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.flush();
        }
    }
}

fn open_log_file() -> Option<File> {
    // Silently run without a file: the hosted terminals must never see our errors
    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .create(true)
        .open(log_path())
        .ok()?;
    let _ = writeln!(
        file,
        "{}\ntermdeck {} debug session started at {}\n{}",
        "=".repeat(80),
        crate::VERSION,
        chrono::Local::now().to_rfc3339(),
        "=".repeat(80)
    );
    Some(file)
}

fn env_level() -> Option<log::LevelFilter> {
    let value = std::env::var("RUST_LOG").ok()?;
    // Only the bare global level is honoured; module directives are ignored
    let global = value.split(',').find(|part| !part.contains('='))?;
    LogLevel::from_name(global).map(LogLevel::to_level_filter)
}

/// Install the bridge as the global logger
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_log_bridge(level: Option<LogLevel>) {
    let filter = level
        .map(LogLevel::to_level_filter)
        .or_else(env_level)
        .unwrap_or(log::LevelFilter::Warn);

    let mut installed = false;
    let bridge = BRIDGE.get_or_init(|| {
        installed = true;
        LogBridge {
            file: Mutex::new(if filter == log::LevelFilter::Off {
                None
            } else {
                open_log_file()
            }),
            mirror_stderr: std::env::var_os("RUST_LOG").is_some(),
        }
    });
    if !installed {
        return;
    }
    if log::set_logger(bridge).is_ok() {
        log::set_max_level(filter);
    }
}

/// Apply the config's level once the config is loaded
///
/// Ignored when the level was already fixed by the CLI or `RUST_LOG`.
pub fn set_level(config_level: LogLevel, fixed_by_caller: bool) {
    if fixed_by_caller || env_level().is_some() {
        return;
    }
    if let Some(bridge) = BRIDGE.get()
        && config_level != LogLevel::Off
    {
        let mut file = bridge.file.lock();
        if file.is_none() {
            *file = open_log_file();
        }
    }
    log::set_max_level(config_level.to_level_filter());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_is_in_temp() {
        let path = log_path();
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("termdeck_debug.log")
        );
    }

    #[test]
    fn test_timestamp_has_micros() {
        let stamp = timestamp();
        let (_, fraction) = stamp.rsplit_once('.').unwrap();
        assert_eq!(fraction.len(), 6);
    }
}
