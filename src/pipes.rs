use std::os::fd::{AsRawFd, OwnedFd, RawFd};

use nix::fcntl::OFlag;
use nix::unistd;
use tracing::trace;

use crate::error::ShellError;

/// The anonymous pipes connecting the stages of one pipeline.
///
/// Pipe `i` carries the output of stage `i` into stage `i + 1`. Every
/// descriptor is owned here, so whatever has not been closed explicitly is
/// closed when the set is dropped, on every path out of the engine.
#[derive(Debug)]
pub struct PipeSet {
	pipes: Vec<(OwnedFd, OwnedFd)>,
}

impl PipeSet {
	pub fn new(stage_count: usize) -> Result<PipeSet, ShellError> {
		let count = stage_count.saturating_sub(1);
		let mut pipes = Vec::new();
		pipes.try_reserve_exact(count).map_err(|_| ShellError::Pipe(nix::errno::Errno::ENOMEM))?;
		for _ in 0 .. count {
			// On failure the pipes created so far are dropped, and closed, with `pipes`.
			let (read, write) = unistd::pipe2(OFlag::O_CLOEXEC).map_err(ShellError::Pipe)?;
			trace!(read = read.as_raw_fd(), write = write.as_raw_fd(), "pipe created");
			pipes.push((read, write));
		}
		Ok(PipeSet { pipes: pipes })
	}

	pub fn len(&self) -> usize {
		self.pipes.len()
	}

	pub fn descriptor_count(&self) -> usize {
		self.pipes.len() * 2
	}

	/// Read end that stage `index` takes as standard input, if it has one.
	pub fn stdin_for(&self, index: usize) -> Option<RawFd> {
		if index == 0 {
			return None;
		}
		self.pipes.get(index - 1).map(|&(ref read, _)| read.as_raw_fd())
	}

	/// Write end that stage `index` takes as standard output, if it has one.
	pub fn stdout_for(&self, index: usize) -> Option<RawFd> {
		self.pipes.get(index).map(|&(_, ref write)| write.as_raw_fd())
	}

	/// Closes both ends of every pipe. Used by a child once it has duplicated
	/// the ends it needs onto its standard streams.
	pub fn close_inherited(&mut self) {
		self.pipes.clear();
	}

	/// Closes the parent's copies once every stage has been forked.
	pub fn close(self) {
		trace!(descriptors = self.descriptor_count(), "closing pipes in parent");
		drop(self);
	}
}
