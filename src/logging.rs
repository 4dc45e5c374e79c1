//! Diagnostics go through `tracing` to stderr. Level priority:
//! `--log-level`, then the `PIPESH_LOG` environment variable, then `warn`.

use std::io::IsTerminal;

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

const LOG_ENV: &str = "PIPESH_LOG";

pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
	let level = match cli_level {
		Some(lvl) => level_from_log_level(lvl),
		None => std::env::var(LOG_ENV)
			.ok()
			.and_then(|s| parse_level_str(&s))
			.unwrap_or(Level::WARN),
	};

	fmt()
		.with_max_level(level)
		.with_target(false)
		.with_ansi(std::io::stderr().is_terminal())
		.with_writer(std::io::stderr)
		.try_init()
		.map_err(|e| anyhow!("cannot initialise logging: {}", e))
}

fn level_from_log_level(lvl: LogLevel) -> Level {
	match lvl {
		LogLevel::Error => Level::ERROR,
		LogLevel::Warn => Level::WARN,
		LogLevel::Info => Level::INFO,
		LogLevel::Debug => Level::DEBUG,
		LogLevel::Trace => Level::TRACE,
	}
}

fn parse_level_str(s: &str) -> Option<Level> {
	match s.trim().to_lowercase().as_str() {
		"error" => Some(Level::ERROR),
		"warn" | "warning" => Some(Level::WARN),
		"info" => Some(Level::INFO),
		"debug" => Some(Level::DEBUG),
		"trace" => Some(Level::TRACE),
		_ => None,
	}
}
