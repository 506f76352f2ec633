//! The bidirectional value codec.
//!
//! [`decode`] checks a [`HostValue`] against a [`TypeDescriptor`] and
//! produces the matching [`NativeValue`]. [`encode`] goes the other way and
//! applies the field renames and wide integer rules the descriptor implies.

pub mod convert;
mod number;
pub mod position;

use indexmap::IndexMap;
use uuid::Uuid;

pub use self::convert::HostType;
pub use self::position::{Position, Segment};
use crate::err::Error;
use crate::kind::{EnumDescriptor, FieldDescriptor, TypeDescriptor, VariantDescriptor};
use crate::native::{EnumValue, NativeValue, VariantPayload};
use crate::val::{HostValue, Object};

fn mismatch(position: Position, ty: &TypeDescriptor, actual: &HostValue) -> Error {
	Error::invalid_type(position, ty.host_label(), actual.kind().as_str())
}

/// Decode a host value against a declared type.
///
/// Fails with a type error at the innermost position that does not match.
pub fn decode(
	value: HostValue,
	ty: &TypeDescriptor,
	position: Position,
) -> Result<NativeValue, Error> {
	trace!("Decoding {} as {ty} at {position}", value.kind());
	match ty {
		TypeDescriptor::Dynamic => Ok(NativeValue::Dynamic(value)),
		TypeDescriptor::Unit => match value {
			v if v.is_nullish() => Ok(NativeValue::Unit),
			other => Err(mismatch(position, ty, &other)),
		},
		TypeDescriptor::Bool => match value {
			HostValue::Bool(v) => Ok(NativeValue::Bool(v)),
			other => Err(mismatch(position, ty, &other)),
		},
		TypeDescriptor::Int32
		| TypeDescriptor::UInt32
		| TypeDescriptor::Int64
		| TypeDescriptor::UInt64
		| TypeDescriptor::Float64
		| TypeDescriptor::BigInt => number::decode(value, ty, position),
		TypeDescriptor::String => match value {
			HostValue::String(v) => Ok(NativeValue::String(v)),
			other => Err(mismatch(position, ty, &other)),
		},
		TypeDescriptor::Bytes => match value {
			HostValue::Bytes(v) => Ok(NativeValue::Bytes(v)),
			other => Err(mismatch(position, ty, &other)),
		},
		TypeDescriptor::Uuid => match value {
			HostValue::String(v) => Uuid::parse_str(&v)
				.map(NativeValue::Uuid)
				.map_err(|_| Error::invalid_type(position, "uuid", "string")),
			other => Err(mismatch(position, ty, &other)),
		},
		TypeDescriptor::Callback => match value {
			HostValue::Callable(v) => Ok(NativeValue::Callback(v)),
			other => Err(mismatch(position, ty, &other)),
		},
		TypeDescriptor::Handle(tag) => match value {
			HostValue::Handle(v) if v.tag() == *tag => Ok(NativeValue::Handle(v)),
			HostValue::Handle(v) => Err(Error::invalid_type(position, tag.name(), v.tag().name())),
			other => Err(mismatch(position, ty, &other)),
		},
		TypeDescriptor::Option(inner) => {
			if value.is_nullish() {
				Ok(NativeValue::Option(None))
			} else {
				decode(value, inner, position).map(|v| NativeValue::Option(Some(Box::new(v))))
			}
		}
		TypeDescriptor::Array(inner) => match value {
			HostValue::Array(items) => items
				.into_iter()
				.enumerate()
				.map(|(i, v)| decode(v, inner, position.index(i)))
				.collect::<Result<Vec<_>, _>>()
				.map(NativeValue::Array),
			other => Err(mismatch(position, ty, &other)),
		},
		TypeDescriptor::Map(inner) => match value {
			HostValue::Object(object) => decode_map(object, inner, &position).map(NativeValue::Map),
			other => Err(mismatch(position, ty, &other)),
		},
		TypeDescriptor::Tuple(items) => match value {
			HostValue::Array(values) => {
				decode_tuple(values, items, &position).map(NativeValue::Tuple)
			}
			other => Err(mismatch(position, ty, &other)),
		},
		TypeDescriptor::Struct(desc) => match value {
			HostValue::Object(object) => {
				decode_fields(object, &desc.fields, &position).map(NativeValue::Struct)
			}
			other => Err(mismatch(position, ty, &other)),
		},
		TypeDescriptor::Enum(desc) => decode_enum(value, desc, position),
	}
}

fn decode_tuple(
	values: Vec<HostValue>,
	items: &[TypeDescriptor],
	position: &Position,
) -> Result<Vec<NativeValue>, Error> {
	if values.len() != items.len() {
		return Err(Error::TupleLength(items.len()));
	}
	values
		.into_iter()
		.zip(items)
		.enumerate()
		.map(|(i, (v, ty))| decode(v, ty, position.index(i)))
		.collect()
}

fn decode_map(
	object: Object,
	inner: &TypeDescriptor,
	position: &Position,
) -> Result<IndexMap<String, NativeValue>, Error> {
	// A dynamic value type is fixed by the first entry
	let mut inferred: Option<TypeDescriptor> = None;
	let mut out = IndexMap::with_capacity(object.len());
	for (key, value) in object {
		let ty = match inner {
			TypeDescriptor::Dynamic => &*inferred.get_or_insert_with(|| infer(&value)),
			declared => declared,
		};
		let value = match (inner, ty) {
			// Nested containers of a dynamic map only have to match by kind
			(TypeDescriptor::Dynamic, TypeDescriptor::Array(_) | TypeDescriptor::Map(_))
				if infer(&value) == *ty =>
			{
				NativeValue::Dynamic(value)
			}
			_ => decode(value, ty, position.key(key.as_str()))?,
		};
		out.insert(key, value);
	}
	Ok(out)
}

fn decode_fields(
	mut object: Object,
	fields: &[FieldDescriptor],
	position: &Position,
) -> Result<IndexMap<String, NativeValue>, Error> {
	let mut out = IndexMap::with_capacity(fields.len());
	for field in fields {
		let key = field.host_name();
		let value = object.remove(key).unwrap_or_default();
		out.insert(field.name.clone(), decode(value, &field.ty, position.field(key))?);
	}
	Ok(out)
}

fn decode_enum(
	value: HostValue,
	desc: &EnumDescriptor,
	position: Position,
) -> Result<NativeValue, Error> {
	let unknown = |variant: String| Error::UnknownVariant {
		name: desc.name.clone(),
		variant,
	};
	match value {
		HostValue::String(name) => match desc.variant(&name) {
			Some(VariantDescriptor::Unit(_)) => Ok(NativeValue::Enum(EnumValue::unit(name))),
			Some(_) => Err(Error::invalid_type(position, "object", "string")),
			None => Err(unknown(name)),
		},
		HostValue::Object(object) if object.len() == 1 => {
			let mut entries = object.into_iter();
			let Some((name, payload)) = entries.next() else {
				return Err(Error::invalid_type(position, desc.name.as_str(), "object"));
			};
			let position = position.variant(name.as_str());
			let payload = match (desc.variant(&name), payload) {
				(Some(VariantDescriptor::Tuple(_, items)), HostValue::Array(values)) => {
					VariantPayload::Tuple(decode_tuple(values, items, &position)?)
				}
				(Some(VariantDescriptor::Struct(_, fields)), HostValue::Object(object)) => {
					VariantPayload::Struct(decode_fields(object, fields, &position)?)
				}
				(Some(VariantDescriptor::Tuple(..)), other) => {
					return Err(Error::invalid_type(position, "array", other.kind().as_str()));
				}
				(Some(VariantDescriptor::Struct(..)), other) => {
					return Err(Error::invalid_type(position, "object", other.kind().as_str()));
				}
				(Some(VariantDescriptor::Unit(_)), _) => {
					return Err(Error::invalid_type(position, "string", "object"));
				}
				(None, _) => return Err(unknown(name)),
			};
			Ok(NativeValue::Enum(EnumValue {
				variant: name,
				payload,
			}))
		}
		other => Err(Error::invalid_type(position, desc.name.as_str(), other.kind().as_str())),
	}
}

/// Encode a native value as the declared type.
///
/// This is total for any native value matching the descriptor, a mismatch
/// between the two is a conversion error in native code.
pub fn encode(value: NativeValue, ty: &TypeDescriptor) -> Result<HostValue, Error> {
	trace!("Encoding {} as {ty}", value.type_name());
	match (ty, value) {
		(_, NativeValue::Dynamic(v)) => Ok(v),
		(TypeDescriptor::Dynamic, v) => Ok(v.into_host()),
		(TypeDescriptor::Option(inner), NativeValue::Option(v)) => match v {
			Some(v) => encode(*v, inner),
			None => Ok(HostValue::Null),
		},
		(TypeDescriptor::Array(inner), NativeValue::Array(items)) => items
			.into_iter()
			.map(|v| encode(v, inner))
			.collect::<Result<Vec<_>, _>>()
			.map(HostValue::Array),
		(TypeDescriptor::Map(inner), NativeValue::Map(entries)) => entries
			.into_iter()
			.map(|(k, v)| Ok((k, encode(v, inner)?)))
			.collect::<Result<Object, Error>>()
			.map(HostValue::Object),
		(TypeDescriptor::Tuple(types), NativeValue::Tuple(items)) if types.len() == items.len() => {
			items
				.into_iter()
				.zip(types)
				.map(|(v, ty)| encode(v, ty))
				.collect::<Result<Vec<_>, _>>()
				.map(HostValue::Array)
		}
		(TypeDescriptor::Struct(desc), NativeValue::Struct(fields)) => {
			encode_fields(fields, &desc.fields).map(HostValue::Object)
		}
		(TypeDescriptor::Enum(desc), NativeValue::Enum(value)) => encode_enum(value, desc),
		(ty, value) if is_scalar_of(ty, &value) => Ok(value.into_host()),
		(ty, value) => Err(Error::Conversion {
			expected: ty.to_string(),
			found: value.type_name(),
		}),
	}
}

fn is_scalar_of(ty: &TypeDescriptor, value: &NativeValue) -> bool {
	match (ty, value) {
		(TypeDescriptor::Handle(tag), NativeValue::Handle(h)) => h.tag() == *tag,
		(ty, value) => matches!(
			(ty, value),
			(TypeDescriptor::Unit, NativeValue::Unit)
				| (TypeDescriptor::Bool, NativeValue::Bool(_))
				| (TypeDescriptor::Int32, NativeValue::Int32(_))
				| (TypeDescriptor::UInt32, NativeValue::UInt32(_))
				| (TypeDescriptor::Int64, NativeValue::Int64(_))
				| (TypeDescriptor::UInt64, NativeValue::UInt64(_))
				| (TypeDescriptor::Float64, NativeValue::Float64(_))
				| (TypeDescriptor::BigInt, NativeValue::BigInt(_))
				| (TypeDescriptor::String, NativeValue::String(_))
				| (TypeDescriptor::Bytes, NativeValue::Bytes(_))
				| (TypeDescriptor::Uuid, NativeValue::Uuid(_))
				| (TypeDescriptor::Callback, NativeValue::Callback(_))
		),
	}
}

fn encode_fields(
	mut fields: IndexMap<String, NativeValue>,
	descs: &[FieldDescriptor],
) -> Result<Object, Error> {
	let mut object = Object::new();
	for field in descs {
		let value = fields.shift_remove(&field.name).unwrap_or(NativeValue::Option(None));
		object.insert(field.host_name(), encode(value, &field.ty)?);
	}
	Ok(object)
}

fn encode_enum(value: EnumValue, desc: &EnumDescriptor) -> Result<HostValue, Error> {
	let Some(variant) = desc.variant(&value.variant) else {
		return Err(Error::UnknownVariant {
			name: desc.name.clone(),
			variant: value.variant,
		});
	};
	let payload = match (variant, value.payload) {
		(VariantDescriptor::Unit(_), VariantPayload::Unit) => {
			return Ok(HostValue::String(value.variant));
		}
		(VariantDescriptor::Tuple(_, types), VariantPayload::Tuple(items))
			if types.len() == items.len() =>
		{
			items
				.into_iter()
				.zip(types)
				.map(|(v, ty)| encode(v, ty))
				.collect::<Result<Vec<_>, _>>()
				.map(HostValue::Array)?
		}
		(VariantDescriptor::Struct(_, descs), VariantPayload::Struct(fields)) => {
			HostValue::Object(encode_fields(fields, descs)?)
		}
		_ => {
			return Err(Error::Conversion {
				expected: format!("{}::{}", desc.name, value.variant),
				found: "enum",
			});
		}
	};
	let mut object = Object::new();
	object.insert(value.variant, payload);
	Ok(HostValue::Object(object))
}

/// Infer the descriptor a host value would decode against, used to fix the
/// value type of dynamically typed maps.
///
/// Arrays and objects infer a container of [`TypeDescriptor::Dynamic`], their
/// contents are not inspected.
pub fn infer(value: &HostValue) -> TypeDescriptor {
	match value {
		HostValue::Null | HostValue::Undefined => TypeDescriptor::Unit,
		HostValue::Bool(_) => TypeDescriptor::Bool,
		HostValue::Number(_) => TypeDescriptor::Float64,
		HostValue::BigInt(_) => TypeDescriptor::BigInt,
		HostValue::String(_) => TypeDescriptor::String,
		HostValue::Bytes(_) => TypeDescriptor::Bytes,
		HostValue::Array(_) => TypeDescriptor::array(TypeDescriptor::Dynamic),
		HostValue::Object(_) => TypeDescriptor::map(TypeDescriptor::Dynamic),
		HostValue::Callable(_) => TypeDescriptor::Callback,
		HostValue::Handle(h) => TypeDescriptor::Handle(h.tag()),
		HostValue::Promise(_) => TypeDescriptor::Dynamic,
	}
}
