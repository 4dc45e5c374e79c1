use crate::error::ParseError;
use crate::types::*;

type ParseResult<T> = Result<T, ParseError>;

struct Parser<'a> {
	line: &'a [u8],
	i: usize,
}

impl<'a> Parser<'a> {
	fn proceed_while<F>(&mut self, f: F) where F: Fn(u8) -> bool {
		while let Some(c) = self.line.get(self.i) {
			if !f(*c) { break; }
			self.i += 1;
		}
	}

	fn is_whitespace(c: u8) -> bool {
		matches!(c, b' ' | b'\t' | b'\n' | b'\r')
	}

	fn is_letter(c: u8) -> bool {
		match c {
			b'>' | b'<' | b'&' | b'|' => false,
			_ => !Parser::is_whitespace(c),
		}
	}

	fn skip_whitespaces(&mut self) {
		self.proceed_while(Parser::is_whitespace);
	}

	fn read_word(&mut self) -> &'a [u8] {
		let orig = self.i;
		self.proceed_while(Parser::is_letter);
		&self.line[orig .. self.i]
	}

	fn is_at_end(&self) -> bool {
		self.i >= self.line.len()
	}

	/// Consumes one `<path` or `>path` if present. Returns whether it did.
	fn parse_redirect(&mut self, stage: &mut Stage<'a>) -> ParseResult<bool> {
		let is_input = match self.line.get(self.i) {
			Some(&b'<') => true,
			Some(&b'>') => false,
			_ => { return Ok(false); },
		};
		self.i += 1;

		self.skip_whitespaces();
		let target = self.read_word();
		if target.is_empty() {
			return Err(ParseError::EmptyRedirect);
		}

		let name = String::from_utf8_lossy(stage.name).into_owned();
		let slot = if is_input { &mut stage.input } else { &mut stage.output };
		if slot.is_some() {
			return Err(if is_input { ParseError::DuplicateInput(name) } else { ParseError::DuplicateOutput(name) });
		}
		*slot = Some(target);
		Ok(true)
	}

	fn parse_stage(&mut self) -> ParseResult<Stage<'a>> {
		let mut stage = Stage::new(b"", vec![]);

		loop {
			self.skip_whitespaces();
			if self.parse_redirect(&mut stage)? {
				continue;
			}
			let word = self.read_word();
			if word.is_empty() {
				break;
			}
			if stage.name.is_empty() {
				stage.name = word;
			} else {
				stage.arguments.push(word);
			}
		}

		if stage.name.is_empty() {
			return Err(ParseError::NullCommand);
		}
		Ok(stage)
	}

	fn parse_pipeline(&mut self) -> ParseResult<Pipeline<'a>> {
		let mut stages: Vec<Stage<'a>> = vec![];

		loop {
			stages.push(self.parse_stage()?);
			match self.line.get(self.i) {
				Some(&b'|') => { self.i += 1; },
				Some(&b'&') => { return Err(ParseError::Background); },
				_ => { break; },
			}
		}
		Ok(Pipeline { stages: stages })
	}
}

/// Parses one input line. A line holding only whitespace yields `Ok(None)`.
pub fn parse<'a>(line: &'a [u8]) -> ParseResult<Option<Pipeline<'a>>> {
	let mut parser: Parser<'a> = Parser { line: line, i: 0 };
	parser.skip_whitespaces();
	if parser.is_at_end() {
		return Ok(None);
	}
	parser.parse_pipeline().map(Some)
}
