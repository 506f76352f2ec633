//! Exact numeric conversions between host numbers and native widths.

use num_traits::ToPrimitive;

use super::Position;
use crate::cnf::SAFE_INTEGER_THRESHOLD;
use crate::err::Error;
use crate::kind::TypeDescriptor;
use crate::native::NativeValue;
use crate::val::HostValue;

/// Returns the integral value of `n` when it is finite, has no fraction and
/// lies within `[min, max]`.
fn integral(n: f64, min: f64, max: f64) -> Option<f64> {
	(n.is_finite() && n.fract() == 0.0 && n >= min && n <= max).then_some(n)
}

/// Decode a host value into one of the fixed-width numeric descriptors.
///
/// A value of the wrong host kind reports the host kind the descriptor
/// expects, a number which cannot be represented exactly reports the
/// native width instead.
pub(super) fn decode(
	value: HostValue,
	ty: &TypeDescriptor,
	position: Position,
) -> Result<NativeValue, Error> {
	let inexact = |actual: &str| Error::invalid_type(position.clone(), ty.to_string(), actual);
	let mismatch = |actual: &HostValue| {
		Error::invalid_type(position.clone(), ty.host_label(), actual.kind().as_str())
	};
	let safe = SAFE_INTEGER_THRESHOLD as f64;
	match (ty, value) {
		(TypeDescriptor::Int32, HostValue::Number(n)) => {
			integral(n, i32::MIN as f64, i32::MAX as f64)
				.map(|n| NativeValue::Int32(n as i32))
				.ok_or_else(|| inexact("number"))
		}
		(TypeDescriptor::UInt32, HostValue::Number(n)) => integral(n, 0.0, u32::MAX as f64)
			.map(|n| NativeValue::UInt32(n as u32))
			.ok_or_else(|| inexact("number")),
		(TypeDescriptor::Int64, HostValue::Number(n)) => {
			integral(n, -safe + 1.0, safe - 1.0)
				.map(|n| NativeValue::Int64(n as i64))
				.ok_or_else(|| inexact("number"))
		}
		(TypeDescriptor::UInt64, HostValue::Number(n)) => integral(n, 0.0, safe - 1.0)
			.map(|n| NativeValue::UInt64(n as u64))
			.ok_or_else(|| inexact("number")),
		(TypeDescriptor::Int64, HostValue::BigInt(n)) => {
			n.to_i64().map(NativeValue::Int64).ok_or_else(|| inexact("bigint"))
		}
		(TypeDescriptor::UInt64, HostValue::BigInt(n)) => {
			n.to_u64().map(NativeValue::UInt64).ok_or_else(|| inexact("bigint"))
		}
		(TypeDescriptor::Float64, HostValue::Number(n)) if n.is_finite() => {
			Ok(NativeValue::Float64(n))
		}
		(TypeDescriptor::Float64, HostValue::Number(_)) => Err(inexact("number")),
		(TypeDescriptor::BigInt, HostValue::BigInt(n)) => Ok(NativeValue::BigInt(n)),
		(_, other) => Err(mismatch(&other)),
	}
}
