use serde_json::{Map, Number as JsonNumber, Value as JsonValue};

use super::{BigInt, HostValue, Object};
use crate::cnf::SAFE_INTEGER_THRESHOLD;

impl HostValue {
	/// Converts the value into a json representation of the value.
	///
	/// Arbitrary-precision integers render as decimal strings, byte buffers
	/// as arrays of octets, and opaque references (functions, handles,
	/// promises) as null.
	pub fn into_json_value(self) -> JsonValue {
		match self {
			HostValue::Null
			| HostValue::Undefined
			| HostValue::Callable(_)
			| HostValue::Handle(_)
			| HostValue::Promise(_) => JsonValue::Null,
			HostValue::Bool(boolean) => JsonValue::Bool(boolean),
			HostValue::Number(number) => {
				// Integral doubles render without a fraction
				if number.fract() == 0.0 && number.abs() < SAFE_INTEGER_THRESHOLD as f64 {
					JsonValue::Number(JsonNumber::from(number as i64))
				} else if let Some(number) = JsonNumber::from_f64(number) {
					JsonValue::Number(number)
				} else {
					JsonValue::Null
				}
			}
			HostValue::BigInt(int) => JsonValue::String(int.to_string()),
			HostValue::String(string) => JsonValue::String(string),
			HostValue::Bytes(bytes) => {
				JsonValue::Array(bytes.iter().map(|x| JsonValue::Number((*x).into())).collect())
			}
			HostValue::Array(array) => {
				JsonValue::Array(array.into_iter().map(HostValue::into_json_value).collect())
			}
			HostValue::Object(object) => {
				let mut map = Map::with_capacity(object.len());
				for (k, v) in object {
					map.insert(k, v.into_json_value());
				}
				JsonValue::Object(map)
			}
		}
	}

	/// Converts a json value into a host value.
	///
	/// Integers whose magnitude reaches 2^53 become arbitrary-precision
	/// integers instead of losing precision as doubles.
	pub fn from_json_value(value: JsonValue) -> HostValue {
		match value {
			JsonValue::Null => HostValue::Null,
			JsonValue::Bool(boolean) => HostValue::Bool(boolean),
			JsonValue::Number(number) => {
				if let Some(int) = number.as_i64() {
					HostValue::from(int)
				} else if let Some(int) = number.as_u64() {
					HostValue::BigInt(BigInt::from(int))
				} else {
					HostValue::Number(number.as_f64().unwrap_or(f64::NAN))
				}
			}
			JsonValue::String(string) => HostValue::String(string),
			JsonValue::Array(array) => {
				HostValue::Array(array.into_iter().map(HostValue::from_json_value).collect())
			}
			JsonValue::Object(map) => HostValue::Object(
				map.into_iter()
					.map(|(k, v)| (k, HostValue::from_json_value(v)))
					.collect::<Object>(),
			),
		}
	}
}
