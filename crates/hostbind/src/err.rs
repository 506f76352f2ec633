//! Failures crossing the boundary, and the payload shapes they are delivered as.
//!
//! Every message below is matched verbatim by host code: changing the
//! wording of a variant is a breaking change.

use std::fmt::{self, Display, Formatter};

use thiserror::Error;

use crate::codec::{HostType, Position};
use crate::val::HostValue;

/// The classification of an [`Error`]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
	/// Too few arguments for the declared parameters
	Arity,
	/// A value did not match its declared type
	Type,
	/// A native validation or execution failure
	Domain,
	/// A bare tag raised by native code
	Unit,
}

/// An error raised while binding, converting or running a native export
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
	/// Fewer arguments were supplied than there are required parameters
	#[error("{expected} args expected but {present} is present")]
	Arity {
		expected: usize,
		present: usize,
	},

	/// A parameter past the end of the supplied arguments was requested
	#[error("trying to get arg at: {index} but only {len} args passed")]
	ArgIndex {
		index: usize,
		len: usize,
	},

	/// A parameter of a special kind, such as a callback, was not supplied
	#[error("expected argument of type: {0}")]
	ExpectedArgument(String),

	/// A host value did not match the declared type
	#[error("invalid type, expected: {expected}, actual: {actual}")]
	InvalidType {
		position: Position,
		expected: String,
		actual: String,
	},

	/// An array decoded against a tuple had the wrong length
	#[error("{0}Tuple must have exactly length {0}")]
	TupleLength(usize),

	/// A host value named a variant the enum does not declare
	#[error("unknown variant: {variant} for enum: {name}")]
	UnknownVariant {
		name: String,
		variant: String,
	},

	/// A native value did not match the descriptor it was encoded or extracted with
	#[error("cannot convert native {found} into {expected}")]
	Conversion {
		expected: String,
		found: &'static str,
	},

	/// A native function failed with a message
	#[error("{0}")]
	Domain(String),

	/// A native function failed with a structured payload
	#[error("{}", describe_custom(.0))]
	Custom(HostValue),

	/// A native function failed with a bare tag
	#[error("{0}")]
	Unit(String),

	/// No export with this name is installed
	#[error("function: {0} is not exported")]
	UnknownFunction(String),

	/// The function reference does not belong to this host, or was released
	#[error("function reference: {0} is not callable")]
	UnknownCallable(u64),

	/// No class with this name is registered
	#[error("class: {0} is not registered")]
	UnknownClass(String),

	/// The class has no constructor entry point
	#[error("class: {0} cannot be constructed from the host")]
	NoConstructor(String),

	/// The class has no property with this name
	#[error("property: {property} is not defined on class: {class}")]
	UnknownProperty {
		class: String,
		property: String,
	},

	/// The property has no setter
	#[error("property: {property} on class: {class} is read-only")]
	ReadOnly {
		class: String,
		property: String,
	},

	/// The property has no getter
	#[error("property: {property} on class: {class} is write-only")]
	WriteOnly {
		class: String,
		property: String,
	},

	/// The class has no method with this name
	#[error("method: {method} is not defined on class: {class}")]
	UnknownMethod {
		class: String,
		method: String,
	},

	/// A property or method was used on a value which is not a wrapped object
	#[error("expected a wrapped object, actual: {0}")]
	NotAnObject(String),

	/// The handle was released, its instance is gone
	#[error("object: {0} has already been released")]
	Released(String),

	/// The handle was not issued by this host
	#[error("object: {0} does not exist")]
	UnknownHandle(String),

	/// The promise was not issued by this host
	#[error("promise: {0} does not exist")]
	UnknownPromise(u64),

	/// A stream was opened with more items than the configured ceiling
	#[error("count: {count} should be less than or equal to {ceiling}")]
	StreamCeiling {
		count: usize,
		ceiling: usize,
	},

	/// The stream session does not exist
	#[error("stream session: {0} does not exist")]
	UnknownStream(u64),

	/// The stream session was already started
	#[error("stream session: {0} has already been started")]
	StreamStarted(u64),

	/// The worker runtime could not be started
	#[error("the worker runtime could not be started: {0}")]
	Runtime(String),

	/// A worker task panicked before delivering its result
	#[error("the worker task failed: {0}")]
	Worker(String),

	/// The handoff queue was closed before the delivery could be made
	#[error("the handoff queue has been closed")]
	HandoffClosed,
}

fn describe_custom(payload: &HostValue) -> String {
	match payload {
		HostValue::String(tag) => tag.clone(),
		HostValue::Object(object) if object.len() == 1 => {
			object.keys().next().map(str::to_owned).unwrap_or_default()
		}
		other => other.clone().into_json_value().to_string(),
	}
}

impl Error {
	/// A domain error carrying a plain message
	pub fn domain(message: impl Display) -> Self {
		Error::Domain(message.to_string())
	}

	/// A domain error carrying an enum-derived payload
	///
	/// Unit variants become a bare [`Error::Unit`] tag, tuple and struct
	/// variants keep their encoded shape.
	pub fn custom<T: HostType>(value: T) -> Self {
		match value.into_host() {
			Ok(HostValue::String(tag)) => Error::Unit(tag),
			Ok(payload) => Error::Custom(payload),
			Err(e) => e,
		}
	}

	/// A type error for `actual` found where `expected` was declared
	pub fn invalid_type(
		position: Position,
		expected: impl Into<String>,
		actual: impl Into<String>,
	) -> Self {
		Error::InvalidType {
			position,
			expected: expected.into(),
			actual: actual.into(),
		}
	}

	/// Classify this error
	pub fn kind(&self) -> ErrorKind {
		match self {
			Error::Arity {
				..
			}
			| Error::ArgIndex {
				..
			} => ErrorKind::Arity,
			Error::ExpectedArgument(_)
			| Error::InvalidType {
				..
			}
			| Error::TupleLength(_)
			| Error::UnknownVariant {
				..
			}
			| Error::Conversion {
				..
			}
			| Error::NotAnObject(_) => ErrorKind::Type,
			Error::Unit(_) => ErrorKind::Unit,
			_ => ErrorKind::Domain,
		}
	}

	/// The value delivered to the host when this error is thrown or rejected
	///
	/// Generic failures are `{message}`, enum-derived failures keep their
	/// encoded shape: a bare string for unit variants, `{variant: [..]}` for
	/// tuple variants and `{variant: {..}}` for struct variants.
	pub fn to_host_value(&self) -> HostValue {
		match self {
			Error::Unit(tag) => HostValue::String(tag.clone()),
			Error::Custom(payload) => payload.clone(),
			other => host_object! { "message" => other.to_string() },
		}
	}
}

/// A failure as the host observes it
#[derive(Clone, Debug, PartialEq)]
pub struct Exception {
	/// The native error
	pub error: Error,
	/// The value thrown to, or rejected into, the host
	pub payload: HostValue,
}

impl Exception {
	/// The `message` property of the payload, for generic failures
	pub fn message(&self) -> Option<&str> {
		self.payload.get("message").as_str()
	}

	pub fn kind(&self) -> ErrorKind {
		self.error.kind()
	}
}

impl From<Error> for Exception {
	fn from(error: Error) -> Self {
		let payload = error.to_host_value();
		Self {
			error,
			payload,
		}
	}
}

impl Display for Exception {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		Display::fmt(&self.error, f)
	}
}

impl std::error::Error for Exception {}
