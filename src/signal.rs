use libc::c_int;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, SigmaskHow, Signal};
use tracing::trace;

use crate::error::ShellError;

/// Keeps a signal blocked while stages are being forked and wired.
///
/// A forked child inherits both the blocked mask and its own copy of the
/// gate, and releases that copy right before `execvp`. The parent releases
/// its gate once every stage exists.
#[derive(Debug)]
pub struct SignalGate {
	previous: SigSet,
	released: bool,
}

impl SignalGate {
	pub fn block(sig: Signal) -> Result<SignalGate, ShellError> {
		let mut set = SigSet::empty();
		set.add(sig);
		let mut previous = SigSet::empty();
		signal::sigprocmask(SigmaskHow::SIG_BLOCK, Some(&set), Some(&mut previous))
			.map_err(ShellError::SignalMask)?;
		trace!(signal = ?sig, "signal gate closed");
		Ok(SignalGate { previous: previous, released: false })
	}

	/// Restores the mask that was in place before `block`.
	pub fn release(&mut self) -> nix::Result<()> {
		if self.released {
			return Ok(());
		}
		signal::sigprocmask(SigmaskHow::SIG_SETMASK, Some(&self.previous), None)?;
		self.released = true;
		Ok(())
	}
}

impl Drop for SignalGate {
	fn drop(&mut self) {
		let _ = self.release();
	}
}

extern "C" fn ignore_interrupt(_: c_int) {}

/// Installs a handler for SIGINT that does nothing.
///
/// The shell survives the interrupt while blocking reads and waits return
/// `EINTR`, since `SA_RESTART` is not set. A caught signal is reset to its
/// default action by `execve`, so launched programs still die from it.
pub fn install_interrupt_handler() -> Result<(), ShellError> {
	let action = SigAction::new(SigHandler::Handler(ignore_interrupt), SaFlags::empty(), SigSet::empty());
	unsafe { signal::sigaction(Signal::SIGINT, &action) }.map_err(ShellError::SignalHandler)?;
	Ok(())
}

/// Puts SIGPIPE back to its default action.
///
/// The Rust runtime ignores SIGPIPE in the shell, and an ignored signal stays
/// ignored across `execve`, so a stage writing into a closed pipe would never
/// be killed by it.
pub fn restore_pipe_signal() -> nix::Result<()> {
	unsafe { signal::signal(Signal::SIGPIPE, SigHandler::SigDfl) }?;
	Ok(())
}
