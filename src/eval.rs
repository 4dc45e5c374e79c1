use std::io::{self, Write};

use nix::sys::signal::Signal;
use tracing::debug;

use crate::builtin;
use crate::error::ShellError;
use crate::launcher;
use crate::pipes::PipeSet;
use crate::reaper::{self, ReapReport};
use crate::signal::SignalGate;
use crate::types::Pipeline;

#[derive(Debug)]
pub enum EvalResult {
	/// The first stage was a builtin; it ran in the shell and nothing was forked.
	Builtin(u8),
	Done(ReapReport),
}

/// Forks one child per stage, left to right. Returns how many were started;
/// a fork failure is reported and stops the launch of further stages.
fn spawn_stages(pipeline: &Pipeline, pipes: &mut PipeSet, gate: &mut SignalGate) -> usize {
	let mut spawned = 0;
	for (index, stage) in pipeline.stages.iter().enumerate() {
		match launcher::launch(stage, index, pipes, gate) {
			Ok(_) => { spawned += 1; },
			Err(e) => {
				let _ = writeln!(&mut io::stderr(), "fork: {}", e);
				break;
			},
		}
	}
	spawned
}

/// Runs one pipeline to completion.
///
/// Only the first stage is checked for a builtin. When it matches, the
/// builtin runs and every later stage is ignored.
pub fn eval(pipeline: &Pipeline) -> Result<EvalResult, ShellError> {
	let stages = &pipeline.stages;
	assert!(!stages.is_empty());

	if let Some(func) = builtin::match_builtin(stages[0].name) {
		if stages.len() > 1 {
			debug!(ignored = stages.len() - 1, "builtin in first stage, ignoring the rest");
		}
		return Ok(EvalResult::Builtin(func(&stages[0].arguments)));
	}

	let mut pipes = PipeSet::new(stages.len())?;
	debug!(stages = pipeline.len(), pipes = pipes.len(), "launching pipeline");

	let mut gate = SignalGate::block(Signal::SIGINT)?;
	let spawned = spawn_stages(pipeline, &mut pipes, &mut gate);
	pipes.close();
	gate.release().map_err(ShellError::SignalMask)?;

	let report = reaper::reap(spawned, &mut reaper::SystemWaiter);
	debug!(spawned, interrupted = report.signaled(Signal::SIGINT), failures = report.failures, "pipeline reaped");
	Ok(EvalResult::Done(report))
}
