#[derive(Debug, PartialEq, Eq)]
pub struct Stage<'a> {
	pub name: &'a [u8],
	pub arguments: Vec<&'a [u8]>,
	pub input: Option<&'a [u8]>,
	pub output: Option<&'a [u8]>,
}

impl<'a> Stage<'a> {
	pub fn new(name: &'a [u8], arguments: Vec<&'a [u8]>) -> Stage<'a> {
		Stage { name: name, arguments: arguments, input: None, output: None }
	}

	/// Program name followed by its arguments, as handed to `execvp`.
	pub fn argv(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
		std::iter::once(self.name).chain(self.arguments.iter().cloned())
	}
}

#[derive(Debug, PartialEq, Eq)]
pub struct Pipeline<'a> {
	pub stages: Vec<Stage<'a>>,
}

impl<'a> Pipeline<'a> {
	pub fn len(&self) -> usize {
		self.stages.len()
	}
}
