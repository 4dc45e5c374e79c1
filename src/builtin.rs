use std::env;
use std::ffi::OsStr;
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;

use nix::errno::Errno;
use nix::unistd::{self, User};
use tracing::debug;

pub type Builtin = fn(&[&[u8]]) -> u8;

#[derive(Debug, PartialEq, Eq)]
pub enum CdTarget<'a> {
	Home,
	Path(&'a [u8]),
}

#[derive(Debug, PartialEq, Eq)]
pub struct CdRequest<'a> {
	pub target: CdTarget<'a>,
	/// More than one destination was given. The usage text is printed but
	/// the change to the last destination still happens.
	pub show_usage: bool,
}

impl<'a> CdRequest<'a> {
	pub fn from_arguments(arguments: &[&'a [u8]]) -> CdRequest<'a> {
		let target = match arguments.last() {
			Some(&path) => CdTarget::Path(path),
			None => CdTarget::Home,
		};
		CdRequest { target: target, show_usage: arguments.len() > 1 }
	}
}

/// `$HOME` first, then the home directory from the password database.
fn change_to_home() -> nix::Result<()> {
	if let Some(home) = env::var_os("HOME") {
		match unistd::chdir(home.as_os_str()) {
			Ok(()) => { return Ok(()); },
			Err(e) => debug!(home = ?home, error = %e, "cannot change to $HOME, trying passwd entry"),
		}
	}
	match User::from_uid(unistd::getuid())? {
		Some(user) => unistd::chdir(&user.dir),
		None => Err(Errno::ENOENT),
	}
}

pub fn builtin_cd(arguments: &[&[u8]]) -> u8 {
	let request = CdRequest::from_arguments(arguments);
	let mut stderr = io::stderr();
	if request.show_usage {
		let _ = writeln!(&mut stderr, "usage: cd [ destdir ]");
	}
	let r = match request.target {
		CdTarget::Home => change_to_home().map_err(|e| format!("cd: {}", e)),
		CdTarget::Path(path) => unistd::chdir(path)
			.map_err(|e| format!("cd: {}: {}", OsStr::from_bytes(path).to_string_lossy(), e)),
	};
	match r {
		Ok(()) => 0,
		Err(msg) => {
			let _ = writeln!(&mut stderr, "{}", msg);
			1
		},
	}
}

pub fn match_builtin(name: &[u8]) -> Option<Builtin> {
	match name {
		b"cd" => Some(builtin_cd),
		_ => None,
	}
}
