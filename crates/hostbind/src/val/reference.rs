use std::any::TypeId;
use std::fmt::{self, Display, Formatter};

/// A reference to a host function, valid for the lifetime of the host that issued it
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FunctionRef(pub(crate) u64);

impl FunctionRef {
	pub fn id(&self) -> u64 {
		self.0
	}
}

impl Display for FunctionRef {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "function#{}", self.0)
	}
}

/// A reference to the promise returned by an asynchronous call
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PromiseRef(pub(crate) u64);

impl PromiseRef {
	pub fn id(&self) -> u64 {
		self.0
	}
}

impl Display for PromiseRef {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "promise#{}", self.0)
	}
}

/// The runtime type tag carried by every object handle.
///
/// Two tags are equal only when they were created for the same native type,
/// the class name is kept for error messages.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TypeTag {
	name: &'static str,
	id: TypeId,
}

impl TypeTag {
	/// Create the tag for the native type `T`, exposed to the host under `name`
	pub fn of<T: 'static>(name: &'static str) -> Self {
		Self {
			name,
			id: TypeId::of::<T>(),
		}
	}

	/// The class name the host sees
	pub fn name(&self) -> &'static str {
		self.name
	}
}

impl Display for TypeTag {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

/// An opaque handle bound to exactly one wrapped native instance.
///
/// Identifiers are never reused by the host that issued them, so a handle
/// outliving its instance can always be detected.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ObjectHandle {
	pub(crate) id: u64,
	pub(crate) tag: TypeTag,
}

impl ObjectHandle {
	pub fn id(&self) -> u64 {
		self.id
	}

	pub fn tag(&self) -> TypeTag {
		self.tag
	}
}

impl Display for ObjectHandle {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{}#{}", self.tag.name, self.id)
	}
}
