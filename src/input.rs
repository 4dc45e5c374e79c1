use std::io;
use std::io::BufRead;

#[derive(Debug, PartialEq, Eq)]
pub enum Line {
	Text(Vec<u8>),
	/// A signal arrived while waiting for input; partial input is dropped.
	Interrupted,
	Eof,
}

/// Reads up to and including the next newline.
///
/// Unlike `BufRead::read_until` this does not retry on `EINTR`, which is how
/// the driver learns that the user pressed the interrupt key at the prompt.
pub fn read_line<R: BufRead>(reader: &mut R) -> io::Result<Line> {
	let mut line: Vec<u8> = vec![];
	loop {
		let (done, used) = {
			let available = match reader.fill_buf() {
				Ok(buf) => buf,
				Err(ref e) if e.kind() == io::ErrorKind::Interrupted => { return Ok(Line::Interrupted); },
				Err(e) => { return Err(e); },
			};
			if available.is_empty() {
				return Ok(if line.is_empty() { Line::Eof } else { Line::Text(line) });
			}
			match available.iter().position(|&c| c == b'\n') {
				Some(n) => {
					line.extend_from_slice(&available[.. n + 1]);
					(true, n + 1)
				},
				None => {
					line.extend_from_slice(available);
					(false, available.len())
				},
			}
		};
		reader.consume(used);
		if done {
			return Ok(Line::Text(line));
		}
	}
}
