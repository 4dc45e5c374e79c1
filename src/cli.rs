use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `pipesh`.
#[derive(Debug, Clone, Parser)]
#[command(name = "pipesh", version, about = "A small shell that runs pipelines of external commands.", long_about = None)]
pub struct CliArgs {
	/// Read commands from this file instead of standard input (batch mode).
	#[arg(value_name = "SCRIPT")]
	pub script: Option<PathBuf>,

	/// Logging level (error, warn, info, debug, trace).
	///
	/// If omitted, `PIPESH_LOG` or a default level will be used.
	#[arg(long, value_enum, value_name = "LEVEL")]
	pub log_level: Option<LogLevel>,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
	Error,
	Warn,
	Info,
	Debug,
	Trace,
}

pub fn parse() -> CliArgs {
	CliArgs::parse()
}
