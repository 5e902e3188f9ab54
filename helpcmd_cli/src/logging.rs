//! env_logger setup: `info` by default, `RUST_LOG` overrides, optionally
//! appended to a log file.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

pub const LOG_FILE: &str = "helpcmd.log";

/// `YYYY-MM-DD HH:MM:SS [LEVEL] message`
pub fn format_line(timestamp: &DateTime<Local>, level: log::Level, message: &str) -> String {
    format!("{} [{}] {}", timestamp.format("%Y-%m-%d %H:%M:%S"), level, message)
}

pub fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{}",
            format_line(&Local::now(), record.level(), &record.args().to_string())
        )
    });

    if let Some(path) = log_file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {:?}", parent))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {:?}", path))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.try_init().context("Logger already initialized")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_line() {
        let ts = Local.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(
            format_line(&ts, log::Level::Warn, "Command returned 1: ping"),
            "2025-03-14 09:26:53 [WARN] Command returned 1: ping"
        );
    }
}
