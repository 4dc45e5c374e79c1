use std::convert::Infallible;
use std::ffi::{CString, OsStr};
use std::fs;
use std::io::{self, Write};
use std::os::fd::AsRawFd;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::OpenOptionsExt;

use nix::unistd::{self, ForkResult, Pid};
use tracing::debug;

use crate::error::ExecError;
use crate::pipes::PipeSet;
use crate::signal::{self, SignalGate};
use crate::types::Stage;

/// Mode requested for files created by output redirection, before the umask.
const OUTPUT_MODE: u32 = 0o777;

fn redirect_error(path: &[u8], source: io::Error) -> ExecError {
	ExecError::Redirect { path: String::from_utf8_lossy(path).into_owned(), source: source }
}

fn open_input(path: &[u8]) -> Result<fs::File, ExecError> {
	fs::OpenOptions::new()
		.read(true)
		.open(OsStr::from_bytes(path))
		.map_err(|e| redirect_error(path, e))
}

fn open_output(path: &[u8]) -> Result<fs::File, ExecError> {
	fs::OpenOptions::new()
		.write(true)
		.create(true)
		.truncate(true)
		.mode(OUTPUT_MODE)
		.open(OsStr::from_bytes(path))
		.map_err(|e| redirect_error(path, e))
}

fn dup_onto(fd: libc::c_int, target: libc::c_int) -> Result<(), ExecError> {
	unistd::dup2(fd, target).map_err(ExecError::Dup)?;
	Ok(())
}

/// Runs in the child: wires the stage's standard streams, drops every
/// inherited pipe, reopens the gate and replaces the process image.
fn do_exec_stage(stage: &Stage, index: usize, pipes: &mut PipeSet, gate: &mut SignalGate) -> Result<Infallible, ExecError> {
	if let Some(fd) = pipes.stdin_for(index) {
		dup_onto(fd, libc::STDIN_FILENO)?;
	}
	if let Some(fd) = pipes.stdout_for(index) {
		dup_onto(fd, libc::STDOUT_FILENO)?;
	}

	// Explicit redirection wins over the pipe wiring above.
	if let Some(path) = stage.input {
		let file = open_input(path)?;
		dup_onto(file.as_raw_fd(), libc::STDIN_FILENO)?;
	}
	if let Some(path) = stage.output {
		let file = open_output(path)?;
		dup_onto(file.as_raw_fd(), libc::STDOUT_FILENO)?;
	}

	pipes.close_inherited();
	signal::restore_pipe_signal().map_err(ExecError::SignalDisposition)?;
	gate.release().map_err(ExecError::SignalMask)?;

	let argv: Result<Vec<CString>, _> = stage.argv().map(CString::new).collect();
	let argv: Vec<CString> = argv?;
	unistd::execvp(&argv[0], &argv).map_err(|e| ExecError::Exec {
		name: String::from_utf8_lossy(stage.name).into_owned(),
		source: e,
	})
}

fn exec_stage(stage: &Stage, index: usize, pipes: &mut PipeSet, gate: &mut SignalGate) -> ! {
	let e = match do_exec_stage(stage, index, pipes, gate) {
		Ok(never) => match never {},
		Err(e) => e,
	};
	let _ = writeln!(&mut io::stderr(), "{}", e);
	// Skip atexit handlers and buffered output belonging to the parent.
	unsafe { libc::_exit(libc::EXIT_FAILURE) }
}

/// Forks the process for stage `index`. Only the parent returns.
///
/// The caller must hold `gate` closed so the child starts with the
/// interrupt signal blocked.
pub fn launch(stage: &Stage, index: usize, pipes: &mut PipeSet, gate: &mut SignalGate) -> nix::Result<Pid> {
	match unsafe { unistd::fork() }? {
		ForkResult::Parent { child } => {
			debug!(pid = child.as_raw(), stage = index, program = %String::from_utf8_lossy(stage.name), "stage launched");
			Ok(child)
		},
		ForkResult::Child => exec_stage(stage, index, pipes, gate),
	}
}
