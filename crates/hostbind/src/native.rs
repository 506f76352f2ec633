//! The closed value model on the native side of the boundary.

use indexmap::IndexMap;
use uuid::Uuid;

use crate::val::{BigInt, Bytes, FunctionRef, HostValue, ObjectHandle, Object};

/// A value decoded against a [`TypeDescriptor`](crate::kind::TypeDescriptor)
///
/// Every variant corresponds to exactly one descriptor, so matching on a
/// native value never needs to look at the host representation again.
#[derive(Clone, Debug, PartialEq)]
pub enum NativeValue {
	Unit,
	Bool(bool),
	Int32(i32),
	UInt32(u32),
	Int64(i64),
	UInt64(u64),
	Float64(f64),
	BigInt(BigInt),
	String(String),
	Bytes(Bytes),
	Uuid(Uuid),
	Callback(FunctionRef),
	Handle(ObjectHandle),
	/// A host value passed through untouched
	Dynamic(HostValue),
	Option(Option<Box<NativeValue>>),
	Array(Vec<NativeValue>),
	Map(IndexMap<String, NativeValue>),
	Tuple(Vec<NativeValue>),
	/// Struct fields keyed by their native name, in declaration order
	Struct(IndexMap<String, NativeValue>),
	Enum(EnumValue),
}

/// A decoded enum value
#[derive(Clone, Debug, PartialEq)]
pub struct EnumValue {
	pub variant: String,
	pub payload: VariantPayload,
}

#[derive(Clone, Debug, PartialEq)]
pub enum VariantPayload {
	Unit,
	Tuple(Vec<NativeValue>),
	Struct(IndexMap<String, NativeValue>),
}

impl EnumValue {
	pub fn unit(variant: impl Into<String>) -> Self {
		Self {
			variant: variant.into(),
			payload: VariantPayload::Unit,
		}
	}

	pub fn tuple(variant: impl Into<String>, items: Vec<NativeValue>) -> Self {
		Self {
			variant: variant.into(),
			payload: VariantPayload::Tuple(items),
		}
	}

	pub fn structure(
		variant: impl Into<String>,
		fields: impl IntoIterator<Item = (String, NativeValue)>,
	) -> Self {
		Self {
			variant: variant.into(),
			payload: VariantPayload::Struct(fields.into_iter().collect()),
		}
	}
}

impl NativeValue {
	/// The native type name, as quoted in conversion errors
	pub fn type_name(&self) -> &'static str {
		match self {
			NativeValue::Unit => "unit",
			NativeValue::Bool(_) => "bool",
			NativeValue::Int32(_) => "i32",
			NativeValue::UInt32(_) => "u32",
			NativeValue::Int64(_) => "i64",
			NativeValue::UInt64(_) => "u64",
			NativeValue::Float64(_) => "f64",
			NativeValue::BigInt(_) => "bigint",
			NativeValue::String(_) => "string",
			NativeValue::Bytes(_) => "bytes",
			NativeValue::Uuid(_) => "uuid",
			NativeValue::Callback(_) => "callback",
			NativeValue::Handle(_) => "handle",
			NativeValue::Dynamic(_) => "any",
			NativeValue::Option(_) => "option",
			NativeValue::Array(_) => "array",
			NativeValue::Map(_) => "map",
			NativeValue::Tuple(_) => "tuple",
			NativeValue::Struct(_) => "struct",
			NativeValue::Enum(_) => "enum",
		}
	}

	/// Encode this value without a descriptor
	///
	/// Struct fields keep their native names. Use
	/// [`encode`](crate::codec::encode) when the descriptor carries renames.
	pub fn into_host(self) -> HostValue {
		match self {
			NativeValue::Unit => HostValue::Null,
			NativeValue::Bool(v) => HostValue::Bool(v),
			NativeValue::Int32(v) => HostValue::from(v),
			NativeValue::UInt32(v) => HostValue::from(v),
			NativeValue::Int64(v) => HostValue::from(v),
			NativeValue::UInt64(v) => HostValue::from(v),
			NativeValue::Float64(v) => HostValue::Number(v),
			NativeValue::BigInt(v) => HostValue::BigInt(v),
			NativeValue::String(v) => HostValue::String(v),
			NativeValue::Bytes(v) => HostValue::Bytes(Bytes::copy_from_slice(&v)),
			NativeValue::Uuid(v) => HostValue::String(v.hyphenated().to_string()),
			NativeValue::Callback(v) => HostValue::Callable(v),
			NativeValue::Handle(v) => HostValue::Handle(v),
			NativeValue::Dynamic(v) => v,
			NativeValue::Option(v) => match v {
				Some(v) => v.into_host(),
				None => HostValue::Null,
			},
			NativeValue::Array(v) | NativeValue::Tuple(v) => {
				HostValue::Array(v.into_iter().map(NativeValue::into_host).collect())
			}
			NativeValue::Map(v) | NativeValue::Struct(v) => {
				let object = v.into_iter().map(|(k, v)| (k, v.into_host())).collect::<Object>();
				HostValue::Object(object)
			}
			NativeValue::Enum(v) => {
				let payload = match v.payload {
					VariantPayload::Unit => return HostValue::String(v.variant),
					VariantPayload::Tuple(items) => {
						HostValue::Array(items.into_iter().map(NativeValue::into_host).collect())
					}
					VariantPayload::Struct(fields) => HostValue::Object(
						fields.into_iter().map(|(k, v)| (k, v.into_host())).collect::<Object>(),
					),
				};
				let mut object = Object::new();
				object.insert(v.variant, payload);
				HostValue::Object(object)
			}
		}
	}
}
