//! The open value model of the host calling environment.

/// Byte buffer values
pub mod bytes;
/// JSON rendering of host values
pub mod into_json;
/// Insertion-ordered object values
pub mod object;
/// Opaque references handed out by the host
pub mod reference;

use std::fmt::{self, Display, Formatter};
use std::ops::Index;

pub use num_bigint::BigInt;

pub use self::bytes::Bytes;
pub use self::object::Object;
pub use self::reference::{FunctionRef, ObjectHandle, PromiseRef, TypeTag};
use crate::cnf::SAFE_INTEGER_THRESHOLD;

static UNDEFINED: HostValue = HostValue::Undefined;

/// The kind of a host value, as reported in type errors
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum HostKind {
	Null,
	Undefined,
	Boolean,
	Number,
	BigInt,
	String,
	Bytes,
	Array,
	Object,
	Function,
}

impl HostKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			HostKind::Null => "null",
			HostKind::Undefined => "undefined",
			HostKind::Boolean => "boolean",
			HostKind::Number => "number",
			HostKind::BigInt => "bigint",
			HostKind::String => "string",
			HostKind::Bytes => "bytes",
			HostKind::Array => "array",
			HostKind::Object => "object",
			HostKind::Function => "function",
		}
	}
}

impl Display for HostKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A value as seen by the host calling environment
///
/// This is a closed tagged union: every value crossing the boundary is one
/// of these variants, and native types are matched against it through a
/// [`TypeDescriptor`](crate::kind::TypeDescriptor).
#[derive(Clone, Debug, Default, PartialEq)]
pub enum HostValue {
	/// The null value
	Null,
	/// The absence of a value
	#[default]
	Undefined,
	/// A boolean value
	Bool(bool),
	/// A double precision number
	Number(f64),
	/// An arbitrary-precision signed integer
	BigInt(BigInt),
	/// A string value
	String(String),
	/// A byte buffer
	Bytes(Bytes),
	/// An ordered sequence of values
	Array(Vec<HostValue>),
	/// An insertion-ordered mapping of strings to values
	Object(Object),
	/// A reference to a host function
	Callable(FunctionRef),
	/// A wrapped native instance
	Handle(ObjectHandle),
	/// The result of an asynchronous call
	Promise(PromiseRef),
}

impl HostValue {
	/// Returns the kind of this value
	pub fn kind(&self) -> HostKind {
		match self {
			HostValue::Null => HostKind::Null,
			HostValue::Undefined => HostKind::Undefined,
			HostValue::Bool(_) => HostKind::Boolean,
			HostValue::Number(_) => HostKind::Number,
			HostValue::BigInt(_) => HostKind::BigInt,
			HostValue::String(_) => HostKind::String,
			HostValue::Bytes(_) => HostKind::Bytes,
			HostValue::Array(_) => HostKind::Array,
			HostValue::Object(_) | HostValue::Handle(_) | HostValue::Promise(_) => HostKind::Object,
			HostValue::Callable(_) => HostKind::Function,
		}
	}

	/// Check if this value is null or undefined
	pub fn is_nullish(&self) -> bool {
		matches!(self, HostValue::Null | HostValue::Undefined)
	}

	pub fn is_undefined(&self) -> bool {
		matches!(self, HostValue::Undefined)
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			HostValue::Bool(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_f64(&self) -> Option<f64> {
		match self {
			HostValue::Number(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			HostValue::String(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_array(&self) -> Option<&[HostValue]> {
		match self {
			HostValue::Array(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_object(&self) -> Option<&Object> {
		match self {
			HostValue::Object(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_callable(&self) -> Option<FunctionRef> {
		match self {
			HostValue::Callable(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_handle(&self) -> Option<ObjectHandle> {
		match self {
			HostValue::Handle(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_promise(&self) -> Option<PromiseRef> {
		match self {
			HostValue::Promise(v) => Some(*v),
			_ => None,
		}
	}

	/// Get a property of an object value
	///
	/// Returns `Undefined` when this is not an object or the key is missing,
	/// the way a host property lookup does.
	pub fn get(&self, key: &str) -> &HostValue {
		match self {
			HostValue::Object(v) => v.get(key).unwrap_or(&UNDEFINED),
			_ => &UNDEFINED,
		}
	}
}

impl Index<usize> for HostValue {
	type Output = HostValue;

	fn index(&self, index: usize) -> &Self::Output {
		match self {
			HostValue::Array(v) => v.get(index).unwrap_or(&UNDEFINED),
			_ => &UNDEFINED,
		}
	}
}

impl Index<&str> for HostValue {
	type Output = HostValue;

	fn index(&self, index: &str) -> &Self::Output {
		self.get(index)
	}
}

impl From<bool> for HostValue {
	fn from(v: bool) -> Self {
		HostValue::Bool(v)
	}
}

impl From<f64> for HostValue {
	fn from(v: f64) -> Self {
		HostValue::Number(v)
	}
}

impl From<i32> for HostValue {
	fn from(v: i32) -> Self {
		HostValue::Number(v as f64)
	}
}

impl From<u32> for HostValue {
	fn from(v: u32) -> Self {
		HostValue::Number(v as f64)
	}
}

impl From<i64> for HostValue {
	fn from(v: i64) -> Self {
		if v.unsigned_abs() >= SAFE_INTEGER_THRESHOLD {
			HostValue::BigInt(BigInt::from(v))
		} else {
			HostValue::Number(v as f64)
		}
	}
}

impl From<u64> for HostValue {
	fn from(v: u64) -> Self {
		if v >= SAFE_INTEGER_THRESHOLD {
			HostValue::BigInt(BigInt::from(v))
		} else {
			HostValue::Number(v as f64)
		}
	}
}

impl From<BigInt> for HostValue {
	fn from(v: BigInt) -> Self {
		HostValue::BigInt(v)
	}
}

impl From<&str> for HostValue {
	fn from(v: &str) -> Self {
		HostValue::String(v.to_owned())
	}
}

impl From<String> for HostValue {
	fn from(v: String) -> Self {
		HostValue::String(v)
	}
}

impl From<Bytes> for HostValue {
	fn from(v: Bytes) -> Self {
		HostValue::Bytes(v)
	}
}

impl From<Vec<HostValue>> for HostValue {
	fn from(v: Vec<HostValue>) -> Self {
		HostValue::Array(v)
	}
}

impl From<Object> for HostValue {
	fn from(v: Object) -> Self {
		HostValue::Object(v)
	}
}

impl From<FunctionRef> for HostValue {
	fn from(v: FunctionRef) -> Self {
		HostValue::Callable(v)
	}
}

impl From<ObjectHandle> for HostValue {
	fn from(v: ObjectHandle) -> Self {
		HostValue::Handle(v)
	}
}

impl From<PromiseRef> for HostValue {
	fn from(v: PromiseRef) -> Self {
		HostValue::Promise(v)
	}
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
	fn from(v: Option<T>) -> Self {
		match v {
			Some(v) => v.into(),
			None => HostValue::Null,
		}
	}
}

impl FromIterator<HostValue> for HostValue {
	fn from_iter<I: IntoIterator<Item = HostValue>>(iter: I) -> Self {
		HostValue::Array(iter.into_iter().collect())
	}
}
