mod builtin;
mod cli;
mod error;
mod eval;
mod input;
mod launcher;
mod logging;
mod parser;
mod pipes;
mod reaper;
mod signal;
mod types;

use std::{fs, io, process};
use std::io::{BufRead, IsTerminal, Write};

use tracing::debug;

use crate::error::ShellError;
use crate::input::Line;

const PROMPT: &[u8] = b"pipesh> ";

struct Session {
	/// Commands come from a script file rather than the user.
	batch: bool,
	/// Both stdin and stdout are terminals, so prompting makes sense.
	interactive: bool,
}

fn repl<R: BufRead>(session: &Session, reader: &mut R) -> Result<(), ShellError> {
	let mut stdout = io::stdout();
	let show_prompt = session.interactive && !session.batch;
	loop {
		if show_prompt {
			let _ = stdout.write_all(PROMPT);
			let _ = stdout.flush();
		}

		let line = match input::read_line(reader)? {
			Line::Eof => { return Ok(()); },
			Line::Interrupted => {
				if session.batch {
					return Ok(());
				}
				if session.interactive {
					let _ = stdout.write_all(b"\n");
					let _ = stdout.flush();
				}
				continue;
			},
			Line::Text(line) => line,
		};

		let pipeline = match parser::parse(&line) {
			Ok(Some(pipeline)) => pipeline,
			Ok(None) => { continue; },
			Err(e) => {
				let _ = writeln!(&mut io::stderr(), "{}", e);
				continue;
			},
		};
		match eval::eval(&pipeline)? {
			eval::EvalResult::Builtin(status) => debug!(status, "builtin finished"),
			eval::EvalResult::Done(report) => debug!(reaped = report.statuses.len(), "pipeline finished"),
		}
	}
}

fn run(args: cli::CliArgs) -> Result<(), ShellError> {
	signal::install_interrupt_handler()?;
	let interactive = io::stdin().is_terminal() && io::stdout().is_terminal();

	match args.script {
		Some(path) => {
			let file = match fs::File::open(&path) {
				Ok(file) => file,
				Err(e) => {
					let _ = writeln!(&mut io::stderr(), "{}: {}", path.display(), e);
					process::exit(1);
				},
			};
			let session = Session { batch: true, interactive: interactive };
			repl(&session, &mut io::BufReader::new(file))
		},
		None => {
			let session = Session { batch: false, interactive: interactive };
			let stdin = io::stdin();
			let mut stdin_locked = stdin.lock();
			repl(&session, &mut stdin_locked)
		},
	}
}

fn main() {
	let args = cli::parse();
	if let Err(e) = logging::init_logging(args.log_level) {
		let _ = writeln!(&mut io::stderr(), "{:#}", e);
		process::exit(1);
	}

	if let Err(e) = run(args) {
		let _ = writeln!(&mut io::stderr(), "pipesh: {}", e);
		process::exit(1);
	}
	process::exit(0);
}
