use std::fmt::{self, Display, Formatter};

/// One step of the path from a call frame down to a nested value
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Segment {
	/// A positional call argument
	Argument(usize),
	/// The value written to a property
	Property(String),
	/// An array or tuple element
	Index(usize),
	/// A map entry
	Key(String),
	/// A struct field, by host name
	Field(String),
	/// An enum variant payload
	Variant(String),
}

/// Where a decoded value sits inside a call, reported with type errors
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Position(Vec<Segment>);

impl Position {
	/// The position of a value decoded on its own
	pub fn root() -> Self {
		Self(Vec::new())
	}

	/// The position of the argument at `index`
	pub fn argument(index: usize) -> Self {
		Self(vec![Segment::Argument(index)])
	}

	/// The position of a value assigned to a property
	pub fn property(name: impl Into<String>) -> Self {
		Self(vec![Segment::Property(name.into())])
	}

	pub fn index(&self, index: usize) -> Self {
		self.push(Segment::Index(index))
	}

	pub fn key(&self, key: impl Into<String>) -> Self {
		self.push(Segment::Key(key.into()))
	}

	pub fn field(&self, name: impl Into<String>) -> Self {
		self.push(Segment::Field(name.into()))
	}

	pub fn variant(&self, name: impl Into<String>) -> Self {
		self.push(Segment::Variant(name.into()))
	}

	pub fn segments(&self) -> &[Segment] {
		&self.0
	}

	/// The innermost segment, if any
	pub fn last(&self) -> Option<&Segment> {
		self.0.last()
	}

	fn push(&self, segment: Segment) -> Self {
		let mut path = self.0.clone();
		path.push(segment);
		Self(path)
	}
}

impl Display for Position {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		if self.0.is_empty() {
			return f.write_str("value");
		}
		for segment in &self.0 {
			match segment {
				Segment::Argument(i) => write!(f, "argument {i}")?,
				Segment::Property(name) => write!(f, "property {name}")?,
				Segment::Index(i) => write!(f, "[{i}]")?,
				Segment::Key(key) | Segment::Field(key) | Segment::Variant(key) => {
					write!(f, ".{key}")?
				}
			}
		}
		Ok(())
	}
}
