use std::{ffi, io};

use nix::errno::Errno;
use thiserror::Error;

/// Errors that leave the shell unable to guarantee its descriptor and signal
/// invariants. The driver terminates on any of these.
#[derive(Error, Debug)]
pub enum ShellError {
	#[error("pipe: {0}")]
	Pipe(#[source] Errno),

	#[error("sigprocmask: {0}")]
	SignalMask(#[source] Errno),

	#[error("sigaction: {0}")]
	SignalHandler(#[source] Errno),

	#[error("read: {0}")]
	Input(#[from] io::Error),
}

/// Errors raised inside a freshly forked child while it prepares its stage.
/// They are reported by the child itself and only terminate that child.
#[derive(Error, Debug)]
pub enum ExecError {
	#[error("dup2: {0}")]
	Dup(#[source] Errno),

	#[error("{path}: {source}")]
	Redirect { path: String, source: io::Error },

	#[error("sigprocmask: {0}")]
	SignalMask(#[source] Errno),

	#[error("signal: {0}")]
	SignalDisposition(#[source] Errno),

	#[error("{name}: {source}")]
	Exec { name: String, source: Errno },

	#[error("nul char in argument: {0}")]
	Nul(#[from] ffi::NulError),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
	#[error("invalid null command")]
	NullCommand,

	#[error("missing name for redirect")]
	EmptyRedirect,

	#[error("{0}: bad input redirection")]
	DuplicateInput(String),

	#[error("{0}: bad output redirection")]
	DuplicateOutput(String),

	#[error("background execution is not supported")]
	Background,
}
