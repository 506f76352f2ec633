use std::collections::HashMap;
use std::hash::BuildHasher;

use indexmap::IndexMap;
use uuid::Uuid;

use super::{Position, decode, encode};
use crate::err::Error;
use crate::kind::TypeDescriptor;
use crate::native::NativeValue;
use crate::val::{BigInt, Bytes, FunctionRef, HostValue};

/// A native type which can cross the boundary
///
/// Implementors declare their [`TypeDescriptor`] and convert to and from the
/// matching [`NativeValue`]. Host conversion goes through the codec, so
/// renames, exactness checks and the wide integer rule all apply.
pub trait HostType: Sized {
	/// The declared type of this native type
	fn descriptor() -> TypeDescriptor;

	/// Extract this type from a value decoded against its descriptor
	fn from_native(value: NativeValue) -> Result<Self, Error>;

	/// Convert this type into a native value matching its descriptor
	fn into_native(self) -> NativeValue;

	/// Decode a host value into this type
	fn from_host(value: HostValue) -> Result<Self, Error> {
		Self::from_host_at(value, Position::root())
	}

	/// Decode a host value into this type, reporting errors at `position`
	fn from_host_at(value: HostValue, position: Position) -> Result<Self, Error> {
		Self::from_native(decode(value, &Self::descriptor(), position)?)
	}

	/// Encode this type as a host value
	fn into_host(self) -> Result<HostValue, Error> {
		encode(self.into_native(), &Self::descriptor())
	}
}

impl Error {
	/// A conversion error for a native value which does not match `T`
	pub fn unexpected<T: HostType>(found: &NativeValue) -> Self {
		Error::Conversion {
			expected: T::descriptor().to_string(),
			found: found.type_name(),
		}
	}
}

macro_rules! impl_scalar {
	($($t:ty => $variant:ident),+ $(,)?) => {
		$(
			impl HostType for $t {
				fn descriptor() -> TypeDescriptor {
					TypeDescriptor::$variant
				}

				fn from_native(value: NativeValue) -> Result<Self, Error> {
					match value {
						NativeValue::$variant(v) => Ok(v),
						other => Err(Error::unexpected::<Self>(&other)),
					}
				}

				fn into_native(self) -> NativeValue {
					NativeValue::$variant(self)
				}
			}
		)+
	};
}

impl_scalar! {
	bool => Bool,
	i32 => Int32,
	u32 => UInt32,
	i64 => Int64,
	u64 => UInt64,
	f64 => Float64,
	BigInt => BigInt,
	String => String,
	Bytes => Bytes,
	Uuid => Uuid,
}

impl HostType for FunctionRef {
	fn descriptor() -> TypeDescriptor {
		TypeDescriptor::Callback
	}

	fn from_native(value: NativeValue) -> Result<Self, Error> {
		match value {
			NativeValue::Callback(v) => Ok(v),
			other => Err(Error::unexpected::<Self>(&other)),
		}
	}

	fn into_native(self) -> NativeValue {
		NativeValue::Callback(self)
	}
}

impl HostType for HostValue {
	fn descriptor() -> TypeDescriptor {
		TypeDescriptor::Dynamic
	}

	fn from_native(value: NativeValue) -> Result<Self, Error> {
		match value {
			NativeValue::Dynamic(v) => Ok(v),
			other => Ok(other.into_host()),
		}
	}

	fn into_native(self) -> NativeValue {
		NativeValue::Dynamic(self)
	}
}

impl HostType for () {
	fn descriptor() -> TypeDescriptor {
		TypeDescriptor::Unit
	}

	fn from_native(value: NativeValue) -> Result<Self, Error> {
		match value {
			NativeValue::Unit => Ok(()),
			other => Err(Error::unexpected::<Self>(&other)),
		}
	}

	fn into_native(self) -> NativeValue {
		NativeValue::Unit
	}
}

impl<T: HostType> HostType for Option<T> {
	fn descriptor() -> TypeDescriptor {
		TypeDescriptor::option(T::descriptor())
	}

	fn from_native(value: NativeValue) -> Result<Self, Error> {
		match value {
			NativeValue::Option(Some(v)) => T::from_native(*v).map(Some),
			NativeValue::Option(None) => Ok(None),
			other => Err(Error::unexpected::<Self>(&other)),
		}
	}

	fn into_native(self) -> NativeValue {
		NativeValue::Option(self.map(|v| Box::new(v.into_native())))
	}
}

impl<T: HostType> HostType for Vec<T> {
	fn descriptor() -> TypeDescriptor {
		TypeDescriptor::array(T::descriptor())
	}

	fn from_native(value: NativeValue) -> Result<Self, Error> {
		match value {
			NativeValue::Array(items) => items.into_iter().map(T::from_native).collect(),
			other => Err(Error::unexpected::<Self>(&other)),
		}
	}

	fn into_native(self) -> NativeValue {
		NativeValue::Array(self.into_iter().map(T::into_native).collect())
	}
}

impl<T: HostType, S: BuildHasher + Default> HostType for HashMap<String, T, S> {
	fn descriptor() -> TypeDescriptor {
		TypeDescriptor::map(T::descriptor())
	}

	fn from_native(value: NativeValue) -> Result<Self, Error> {
		match value {
			NativeValue::Map(entries) => {
				entries.into_iter().map(|(k, v)| Ok((k, T::from_native(v)?))).collect()
			}
			other => Err(Error::unexpected::<Self>(&other)),
		}
	}

	fn into_native(self) -> NativeValue {
		NativeValue::Map(self.into_iter().map(|(k, v)| (k, v.into_native())).collect())
	}
}

impl<T: HostType> HostType for IndexMap<String, T> {
	fn descriptor() -> TypeDescriptor {
		TypeDescriptor::map(T::descriptor())
	}

	fn from_native(value: NativeValue) -> Result<Self, Error> {
		match value {
			NativeValue::Map(entries) => {
				entries.into_iter().map(|(k, v)| Ok((k, T::from_native(v)?))).collect()
			}
			other => Err(Error::unexpected::<Self>(&other)),
		}
	}

	fn into_native(self) -> NativeValue {
		NativeValue::Map(self.into_iter().map(|(k, v)| (k, v.into_native())).collect())
	}
}

macro_rules! impl_tuple {
	($len:literal => $($t:ident : $v:ident),+) => {
		impl<$($t: HostType),+> HostType for ($($t,)+) {
			fn descriptor() -> TypeDescriptor {
				TypeDescriptor::Tuple(vec![$($t::descriptor()),+])
			}

			fn from_native(value: NativeValue) -> Result<Self, Error> {
				match value {
					NativeValue::Tuple(items) if items.len() == $len => {
						let mut items = items.into_iter();
						Ok(($($t::from_native(items.next().ok_or(Error::TupleLength($len))?)?,)+))
					}
					other => Err(Error::unexpected::<Self>(&other)),
				}
			}

			fn into_native(self) -> NativeValue {
				let ($($v,)+) = self;
				NativeValue::Tuple(vec![$($v.into_native()),+])
			}
		}
	};
}

impl_tuple!(1 => A: a);
impl_tuple!(2 => A: a, B: b);
impl_tuple!(3 => A: a, B: b, C: c);
impl_tuple!(4 => A: a, B: b, C: c, D: d);

/// The fields of a decoded struct, taken out one by one by native name
pub struct Fields(IndexMap<String, NativeValue>);

impl Fields {
	/// Take the field stored under the native name `name`
	pub fn take<T: HostType>(&mut self, name: &str) -> Result<T, Error> {
		match self.0.shift_remove(name) {
			Some(v) => T::from_native(v),
			// Missing optional fields are absent
			None => T::from_native(NativeValue::Option(None)),
		}
	}
}

impl NativeValue {
	/// Build a struct value from native field names and values
	pub fn structure<I, K>(fields: I) -> NativeValue
	where
		I: IntoIterator<Item = (K, NativeValue)>,
		K: Into<String>,
	{
		NativeValue::Struct(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
	}

	/// Open a decoded struct for field extraction
	pub fn into_fields<T: HostType>(self) -> Result<Fields, Error> {
		match self {
			NativeValue::Struct(fields) => Ok(Fields(fields)),
			other => Err(Error::unexpected::<T>(&other)),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use num_traits::{Num, One};

	use super::*;
	use crate::kind::StructDescriptor;

	#[derive(Debug, PartialEq)]
	struct Point {
		x_pos: i32,
		label: Option<String>,
	}

	impl HostType for Point {
		fn descriptor() -> TypeDescriptor {
			StructDescriptor::new("Point")
				.field("x_pos", TypeDescriptor::Int32)
				.field("label", TypeDescriptor::option(TypeDescriptor::String))
				.camel_case()
				.into()
		}

		fn from_native(value: NativeValue) -> Result<Self, Error> {
			let mut fields = value.into_fields::<Self>()?;
			Ok(Self {
				x_pos: fields.take("x_pos")?,
				label: fields.take("label")?,
			})
		}

		fn into_native(self) -> NativeValue {
			NativeValue::structure([
				("x_pos", self.x_pos.into_native()),
				("label", self.label.into_native()),
			])
		}
	}

	#[test]
	fn derived_structs_round_trip() {
		let point = Point {
			x_pos: -4,
			label: None,
		};
		let host = point.into_host().unwrap();
		assert_eq!(host, host_object! { "xPos" => -4, "label" => HostValue::Null });
		let back = Point::from_host(host_object! { "xPos" => 3, "label" => "a" }).unwrap();
		assert_eq!(
			back,
			Point {
				x_pos: 3,
				label: Some("a".to_owned())
			}
		);
	}

	#[test]
	fn tuples_decode_positionally() {
		let value = HostValue::Array(vec!["hello".into(), vec![3.into(), 5.into()].into()]);
		let (text, numbers) = <(String, Vec<i32>)>::from_host(value).unwrap();
		assert_eq!(text, "hello");
		assert_eq!(numbers, vec![3, 5]);
		let err = <(String, Vec<i32>)>::from_host(HostValue::Array(vec!["hello".into()]))
			.unwrap_err();
		assert_eq!(err.to_string(), "2Tuple must have exactly length 2");
	}

	#[test]
	fn hash_maps_round_trip() {
		let mut map = HashMap::new();
		map.insert("a".to_owned(), 1.5f64);
		let host = map.clone().into_host().unwrap();
		assert_eq!(HashMap::<String, f64>::from_host(host).unwrap(), map);
	}

	#[test]
	fn bigint_320_bit_round_trip() {
		let max = BigInt::from_str_radix(&"F".repeat(80), 16).unwrap();
		assert_eq!(max.bits(), 320);
		let host = max.clone().into_host().unwrap();
		assert_eq!(BigInt::from_host(host).unwrap(), max);
		let negated = BigInt::from_host(HostValue::BigInt(-max.clone())).unwrap();
		assert_eq!(negated.magnitude(), max.magnitude());
		assert_eq!(negated.sign(), num_bigint::Sign::Minus);
		assert_eq!(&max * 2 - &max, max);
		assert!((&max + BigInt::one()).bits() > 320);
	}
}
