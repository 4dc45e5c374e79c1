use std::io::{self, Write};

use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::wait::{self, WaitStatus};
use tracing::debug;

pub trait Waiter {
	fn wait(&mut self) -> nix::Result<WaitStatus>;
}

/// Waits on any child of the shell. The shell never runs anything in the
/// background, so every child belongs to the pipeline being reaped.
pub struct SystemWaiter;

impl Waiter for SystemWaiter {
	fn wait(&mut self) -> nix::Result<WaitStatus> {
		wait::wait()
	}
}

pub trait WaitStatusExt {
	fn killed_by(self) -> Option<Signal>;
}

impl WaitStatusExt for WaitStatus {
	fn killed_by(self) -> Option<Signal> {
		match self {
			WaitStatus::Signaled(_, sig, _) => Some(sig),
			_ => None,
		}
	}
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReapReport {
	pub statuses: Vec<WaitStatus>,
	/// Waits that failed for a reason other than `EINTR`. Each one still
	/// counted against the expected number of children.
	pub failures: usize,
}

impl ReapReport {
	pub fn signaled(&self, sig: Signal) -> usize {
		self.statuses.iter().filter(|s| s.killed_by() == Some(sig)).count()
	}
}

/// Blocks until `expected` terminations have been accounted for.
///
/// An interrupted wait is retried. Any other failure is reported and still
/// decrements the count, so a failing wait can end the loop early.
pub fn reap<W: Waiter>(expected: usize, waiter: &mut W) -> ReapReport {
	let mut report = ReapReport::default();
	let mut remaining = expected;
	while remaining > 0 {
		match waiter.wait() {
			Ok(status) => {
				match status.killed_by() {
					Some(sig) => debug!(pid = ?status.pid(), signal = ?sig, "stage killed by signal"),
					None => debug!(pid = ?status.pid(), status = ?status, "stage exited"),
				}
				report.statuses.push(status);
			},
			Err(Errno::EINTR) => { continue; },
			Err(e) => {
				let _ = writeln!(&mut io::stderr(), "wait: {}", e);
				report.failures += 1;
			},
		}
		remaining -= 1;
	}
	report
}

#[cfg(test)]
mod tests {
	use super::*;
	use nix::unistd::Pid;
	use std::collections::VecDeque;

	struct ScriptedWaiter {
		script: VecDeque<nix::Result<WaitStatus>>,
		calls: usize,
	}

	impl ScriptedWaiter {
		fn new(script: Vec<nix::Result<WaitStatus>>) -> ScriptedWaiter {
			ScriptedWaiter { script: script.into(), calls: 0 }
		}
	}

	impl Waiter for ScriptedWaiter {
		fn wait(&mut self) -> nix::Result<WaitStatus> {
			self.calls += 1;
			self.script.pop_front().expect("waited more often than scripted")
		}
	}

	fn exited(pid: i32, code: i32) -> nix::Result<WaitStatus> {
		Ok(WaitStatus::Exited(Pid::from_raw(pid), code))
	}

	fn killed(pid: i32, sig: Signal) -> nix::Result<WaitStatus> {
		Ok(WaitStatus::Signaled(Pid::from_raw(pid), sig, false))
	}

	#[test]
	fn nothing_to_reap() {
		let mut waiter = ScriptedWaiter::new(vec![]);
		let report = reap(0, &mut waiter);
		assert_eq!(report, ReapReport::default());
		assert_eq!(waiter.calls, 0);
	}

	#[test]
	fn reaps_exactly_expected_count() {
		let mut waiter = ScriptedWaiter::new(vec![exited(11, 0), exited(12, 1), exited(13, 0), exited(99, 0)]);
		let report = reap(3, &mut waiter);
		assert_eq!(report.statuses.len(), 3);
		assert_eq!(report.failures, 0);
		assert_eq!(waiter.calls, 3);
	}

	#[test]
	fn interrupted_wait_is_retried_not_counted() {
		let mut waiter = ScriptedWaiter::new(vec![
			Err(Errno::EINTR),
			exited(11, 0),
			Err(Errno::EINTR),
			Err(Errno::EINTR),
			killed(12, Signal::SIGINT),
		]);
		let report = reap(2, &mut waiter);
		assert_eq!(waiter.calls, 5);
		assert_eq!(report.statuses.len(), 2);
		assert_eq!(report.failures, 0);
		assert_eq!(report.signaled(Signal::SIGINT), 1);
	}

	#[test]
	fn other_wait_failures_still_decrement() {
		// Two children are expected but only one is ever observed: the
		// ECHILD failure is counted as a completion.
		let mut waiter = ScriptedWaiter::new(vec![Err(Errno::ECHILD), exited(11, 0), exited(12, 0)]);
		let report = reap(2, &mut waiter);
		assert_eq!(waiter.calls, 2);
		assert_eq!(report.failures, 1);
		assert_eq!(report.statuses, vec![WaitStatus::Exited(Pid::from_raw(11), 0)]);
	}

	#[test]
	fn counts_children_killed_by_signal() {
		let mut waiter = ScriptedWaiter::new(vec![
			killed(11, Signal::SIGINT),
			killed(12, Signal::SIGPIPE),
			killed(13, Signal::SIGINT),
			exited(14, 0),
		]);
		let report = reap(4, &mut waiter);
		assert_eq!(report.signaled(Signal::SIGINT), 2);
		assert_eq!(report.signaled(Signal::SIGPIPE), 1);
		assert_eq!(report.statuses[3].pid(), Some(Pid::from_raw(14)));
		assert_eq!(report.statuses[3].killed_by(), None);
	}
}
