mod common;

use hostbind::{BigInt, Error, ErrorKind, HostValue, Position, host_object};
use hostbind_demo::{bigint, json, promise, stream, tuples};
use num_traits::Num;

use crate::common::{DELAY, host, recorder};

#[test]
fn wide_bigints_keep_every_bit() {
	let mut host = host(bigint::module());
	let value = BigInt::from_str_radix(&"F".repeat(80), 16).unwrap();
	let arg = || vec![HostValue::BigInt(value.clone())];
	assert_eq!(host.call("doNothing", arg()).unwrap(), HostValue::BigInt(value.clone()));
	assert_eq!(host.call("goNegative", arg()).unwrap(), HostValue::BigInt(-value.clone()));
	assert_eq!(host.call("multiplyBigInt", arg()).unwrap(), HostValue::BigInt(value.clone() * 2));
}

#[test]
fn tuples_are_checked_element_by_element() {
	let mut host = host(tuples::module());
	let input: HostValue = vec!["hello".into(), vec![3.into(), 5.into(), 7.into()].into()].into();
	let output = host.call("capitalizeAndSquare", vec![input]).unwrap();
	let expected: HostValue =
		vec!["HELLO".into(), vec![9.into(), 25.into(), 49.into()].into()].into();
	assert_eq!(output, expected);

	let large: HostValue = vec!["hello".into(), vec![46341.into()].into()].into();
	let err = host.call("capitalizeAndSquare", vec![large]).unwrap_err();
	assert_eq!(err.message(), Some("square of 46341 overflows"));
	assert_eq!(err.kind(), ErrorKind::Domain);

	let short: HostValue = vec!["hello".into()].into();
	let err = host.call("capitalizeAndSquare", vec![short]).unwrap_err();
	assert_eq!(err.message(), Some("2Tuple must have exactly length 2"));

	let wrong: HostValue = vec![5.into(), vec![1.into(), 2.into(), 3.into()].into()].into();
	let err = host.call("capitalizeAndSquare", vec![wrong]).unwrap_err();
	assert_eq!(err.message(), Some("invalid type, expected: string, actual: number"));
	assert_eq!(err.kind(), ErrorKind::Type);
	assert!(matches!(
		err.error,
		Error::InvalidType { position, .. } if position == Position::argument(0).index(0)
	));
}

#[test_log::test]
fn store_reads_back_what_was_put() {
	let mut host = host(promise::module_with(DELAY));
	let store = host.construct("NativeStore", vec![]).unwrap();
	let get = host.call_method(&store, "get", vec![]).unwrap();
	assert_eq!(host.run_until_settled(&get).unwrap(), HostValue::from("unknown"));
	let put = host.call_method(&store, "put", vec!["hello world".into()]).unwrap();
	assert_eq!(host.run_until_settled(&put).unwrap(), HostValue::Null);
	let get = host.call_method(&store, "get", vec![]).unwrap();
	assert_eq!(host.run_until_settled(&get).unwrap(), HostValue::from("hello world"));
}

#[test_log::test]
fn concurrent_store_calls_see_whole_values() {
	let mut host = host(promise::module_with(DELAY));
	let store = host.construct("NativeStore", vec![]).unwrap();
	let values = ["first value", "second value", "third value"];
	let mut pending = Vec::new();
	for value in values {
		pending.push(host.call_method(&store, "put", vec![value.into()]).unwrap());
		pending.push(host.call_method(&store, "get", vec![]).unwrap());
	}
	host.run_until_idle();
	for promise in pending.iter().skip(1).step_by(2) {
		let read = host.run_until_settled(promise).unwrap();
		let read = read.as_str().unwrap().to_owned();
		assert!(read == "unknown" || values.contains(&read.as_str()), "torn read: {read}");
	}
	let get = host.call_method(&store, "get", vec![]).unwrap();
	let last = host.run_until_settled(&get).unwrap();
	assert!(values.contains(&last.as_str().unwrap()));
}

#[test_log::test]
fn streams_emit_in_order_then_complete() {
	let mut host = host(stream::module());
	let factory = host.construct("StreamFactory", vec![]).unwrap();
	let (cb, calls) = recorder(&mut host);
	host.call_method(&factory, "stream", vec![10.into(), cb]).unwrap();
	host.run_until_idle();
	assert!(calls.borrow().iter().all(|args| args[0] == HostValue::from("data")));
	let emitted: Vec<f64> = calls.borrow().iter().map(|args| args[1].as_f64().unwrap()).collect();
	assert_eq!(emitted, (0..10).map(f64::from).collect::<Vec<_>>());
	assert_eq!(emitted.iter().sum::<f64>(), 45.0);
}

#[test]
fn streams_over_the_ceiling_fail_before_emitting() {
	let mut host = host(stream::module());
	let factory = host.construct("StreamFactory", vec![]).unwrap();
	let (cb, calls) = recorder(&mut host);
	let err = host.call_method(&factory, "stream", vec![20.into(), cb]).unwrap_err();
	assert_eq!(err.message(), Some("count: 20 should be less than or equal to 10"));
	host.run_until_idle();
	assert!(calls.borrow().is_empty());
}

#[test_log::test]
fn enum_errors_keep_their_shape_across_both_paths() {
	let mut host = host(json::module_with(DELAY));
	let err = host.call("failWithFields", vec![987.into()]).unwrap_err();
	assert_eq!(err.payload, host_object! { "withFields" => host_object! { "val" => 987 } });
	assert_eq!(err.kind(), ErrorKind::Domain);

	let promise = host.call("failLater", vec![]).unwrap();
	assert!(promise.as_promise().is_some());
	let err = host.run_until_settled(&promise).unwrap_err();
	assert_eq!(err.payload, HostValue::from("unitErrorType"));
	assert_eq!(err.kind(), ErrorKind::Unit);
}
