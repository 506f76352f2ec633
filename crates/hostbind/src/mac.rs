/// Parses an environment variable into a lazily initialised static.
///
/// Falls back to the given default (or the type's default) when the
/// variable is missing or cannot be parsed.
#[macro_export]
macro_rules! lazy_env_parse {
	// With no default specified
	($key:expr_2021, $t:ty) => {
		std::sync::LazyLock::new(|| {
			std::env::var($key).ok().and_then(|s| s.parse::<$t>().ok()).unwrap_or_default()
		})
	};
	// With a closure for the default value
	($key:expr_2021, $t:ty, || $default:expr_2021) => {
		std::sync::LazyLock::new(|| {
			std::env::var($key).ok().and_then(|s| s.parse::<$t>().ok()).unwrap_or_else(|| $default)
		})
	};
	// With a static expression for the default value
	($key:expr_2021, $t:ty, $default:expr_2021) => {
		std::sync::LazyLock::new(|| {
			std::env::var($key).ok().and_then(|s| s.parse::<$t>().ok()).unwrap_or($default)
		})
	};
}

/// Creates a host object from key-value pairs, preserving insertion order.
///
/// ```
/// use hostbind::{host_object, HostValue};
///
/// let value = host_object! { "message" => "failed", "code" => 5 };
/// assert_eq!(value["code"], HostValue::Number(5.0));
/// ```
#[macro_export]
macro_rules! host_object {
	($($k:expr_2021 => $v:expr_2021),* $(,)?) => {{
		#[allow(unused_mut)]
		let mut object = $crate::val::Object::new();
		$(object.insert($k, $crate::val::HostValue::from($v));)*
		$crate::val::HostValue::Object(object)
	}};
}

#[cfg(test)]
mod test {
	use crate::val::HostValue;

	#[test]
	fn host_object_keeps_insertion_order() {
		let value = host_object! { "b" => 1, "a" => "x" };
		let HostValue::Object(object) = value else {
			panic!("expected an object");
		};
		let keys: Vec<&str> = object.keys().collect();
		assert_eq!(keys, vec!["b", "a"]);
	}

	#[test]
	fn lazy_env_parse_falls_back_to_default() {
		let value: std::sync::LazyLock<usize> =
			lazy_env_parse!("HOSTBIND_TEST_MACRO_UNSET_VARIABLE", usize, 42);
		assert_eq!(*value, 42);
	}
}
