mod common;

use hostbind::{Bytes, ErrorKind, HostValue, host_object};
use hostbind_demo::{
	array, async_cb, buffer, callback, class, cleanup, function, hash, identifier, json, option,
	param, promise,
};
use rstest::rstest;

use crate::common::{DELAY, host, recorder};

#[test]
fn plain_functions() {
	let mut host = host(function::module());
	assert_eq!(host.call("hello", vec![2.into()]).unwrap(), HostValue::from("hello world 2"));
	assert_eq!(host.call("sum", vec![1.into(), 2.into(), 3.into()]).unwrap(), HostValue::from(3));
	let err = host.call("sum", vec![1.into()]).unwrap_err();
	assert_eq!(err.message(), Some("2 args expected but 1 is present"));
	let err = host.call("sum", vec![1.into(), "2".into()]).unwrap_err();
	assert_eq!(err.message(), Some("invalid type, expected: number, actual: string"));
}

#[test]
fn overflowing_sums_fail_as_domain_errors() {
	let mut host = host(function::module());
	let err = host.call("sum", vec![i32::MAX.into(), 1.into()]).unwrap_err();
	assert_eq!(err.message(), Some("sum of 2147483647 and 1 overflows"));
	assert_eq!(err.kind(), ErrorKind::Domain);
	let mut host = crate::common::host(array::module());
	let err = host.call("sumArray", vec![vec![i32::MAX.into(), 1.into()].into()]).unwrap_err();
	assert_eq!(err.message(), Some("sum of the array overflows"));
}

#[test]
fn arrays() {
	let mut host = host(array::module());
	let made = host.call("makeArray", vec![3.into()]).unwrap();
	assert_eq!(made, vec![0.into(), 1.into(), 2.into()].into());
	assert_eq!(host.call("sumArray", vec![made]).unwrap(), HostValue::from(3));
	let err = host.call("sumArray", vec![vec![1.into(), "x".into()].into()]).unwrap_err();
	assert_eq!(err.message(), Some("invalid type, expected: number, actual: string"));
}

#[rstest]
#[case::both(vec![2.into(), 3.into()], 5)]
#[case::first(vec![2.into()], 2)]
#[case::second(vec![HostValue::Undefined, 3.into()], 3)]
#[case::neither(vec![], 1)]
fn optional_arguments(#[case] args: Vec<HostValue>, #[case] expected: i32) {
	let mut host = host(option::module());
	assert_eq!(host.call("test", args).unwrap(), HostValue::from(expected));
}

#[test]
fn hashes() {
	let mut host = host(hash::module());
	let made = host.call("makeHash", vec![]).unwrap();
	assert_eq!(made["foo"], HostValue::Bool(true));
	assert_eq!(made["bar"], HostValue::Bool(false));
	let sum = host.call("sumHash", vec![host_object! { "a" => 1, "b" => 2 }]).unwrap();
	assert_eq!(sum, HostValue::from(3));
	let err = host.call("sumHash", vec![host_object! { "a" => 1, "b" => "2" }]).unwrap_err();
	assert_eq!(err.message(), Some("invalid type, expected: number, actual: string"));
}

#[test]
fn uuids_round_trip_through_text() {
	let mut host = host(identifier::module());
	let made = host.call("makeUuid", vec![]).unwrap();
	assert_eq!(made, HostValue::from("f7509856-9ae5-4c07-976d-a5b3f983e4af"));
	assert_eq!(host.call("takeUuid", vec![made]).unwrap(), HostValue::Null);
	let err = host.call("takeUuid", vec!["not-a-uuid".into()]).unwrap_err();
	assert_eq!(err.message(), Some("invalid type, expected: uuid, actual: string"));
}

#[test]
fn buffers() {
	let mut host = host(buffer::module());
	let bytes = host.call("test", vec![5.into()]).unwrap();
	assert_eq!(bytes, HostValue::Bytes(Bytes::new(br#"{"a":"b","b":5}"#.to_vec())));
	let record = host.call("test2", vec![5.into()]).unwrap();
	assert_eq!(record["comment"], HostValue::from("array buffer is cool!"));
	assert_eq!(record["buffer"], bytes);
	let reply = host.call("test3", vec![Bytes::new(b"hello".to_vec()).into()]).unwrap();
	assert_eq!(reply, HostValue::from("reply hello"));
	let reply = host
		.call("test4", vec![Bytes::new(b"a".to_vec()).into(), Bytes::new(b"b".to_vec()).into()])
		.unwrap();
	assert_eq!(reply, HostValue::from("reply a b"));
	let err = host.call("test3", vec![Bytes::new(vec![0xff]).into()]).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Domain);
}

#[test]
fn json_shapes() {
	let mut host = host(json::module_with(DELAY));
	let call = |host: &mut hostbind::Host, name: &str| host.call(name, vec![]).unwrap();
	assert_eq!(call(&mut host, "customJson"), host_object! { "customFieldName" => 10.0 });
	assert_eq!(
		call(&mut host, "standardJson"),
		host_object! { "someName" => "John", "aNumber" => 1337 }
	);
	assert_eq!(call(&mut host, "multilevelJson"), host_object! { "val" => "hello" });
	assert_eq!(call(&mut host, "unitStruct"), HostValue::Null);
	assert_eq!(
		call(&mut host, "withMessage"),
		host_object! { "withMessage" => vec![HostValue::from("test"), HostValue::from(321)] }
	);
	assert_eq!(
		call(&mut host, "withFields"),
		host_object! { "withFields" => host_object! { "val" => 123 } }
	);
	assert_eq!(call(&mut host, "withUnit"), HostValue::from("unitErrorType"));
	let value = host_object! { "someName" => "Jane", "aNumber" => 7, "extra" => true };
	let echoed = host.call("echoJson", vec![value]).unwrap();
	assert_eq!(echoed, host_object! { "someName" => "Jane", "aNumber" => 7 });
	let err = host.call("echoJson", vec![host_object! { "someName" => "Jane" }]).unwrap_err();
	assert_eq!(err.message(), Some("invalid type, expected: number, actual: undefined"));
}

#[rstest]
#[case::number(vec![3.into()], 30)]
#[case::object(vec![host_object! { "val" => 4, "name" => "four" }], 40)]
#[case::nothing(vec![], 0)]
#[case::null(vec![HostValue::Null], 0)]
fn number_or_object_parameter(#[case] args: Vec<HostValue>, #[case] expected: i32) {
	let mut host = host(param::module());
	assert_eq!(host.call("add", args).unwrap(), HostValue::from(expected));
}

#[rstest]
#[case::missing_val(host_object! { "name" => "x" }, "val is not found")]
#[case::wrong_kind(HostValue::from("x"), "not valid format")]
fn invalid_number_or_object(#[case] arg: HostValue, #[case] message: &str) {
	let mut host = host(param::module());
	assert_eq!(host.call("add", vec![arg]).unwrap_err().message(), Some(message));
}

#[test]
fn synchronous_callbacks() {
	let mut host = host(callback::module());
	let (cb, calls) = recorder(&mut host);
	host.call("hello", vec![2.into(), cb]).unwrap();
	assert_eq!(*calls.borrow(), vec![vec![HostValue::from("argument is: 2")]]);
	let err = host.call("hello", vec![2.into(), 3.into()]).unwrap_err();
	assert_eq!(err.message(), Some("expected argument of type: callback"));
}

#[test_log::test]
fn async_callbacks_run_on_the_host_turn() {
	let mut host = host(async_cb::module_with(DELAY));
	let (cb, calls) = recorder(&mut host);
	host.call("basic", vec![3.into(), cb.clone()]).unwrap();
	host.call("hello", vec![0.into(), cb]).unwrap();
	assert!(calls.borrow().is_empty());
	host.run_until_idle();
	let calls = calls.borrow();
	assert_eq!(calls.len(), 2);
	assert!(calls.contains(&vec![HostValue::from(3), HostValue::from(6)]));
	assert!(calls.contains(&vec![HostValue::from(10.0), HostValue::from("hello world")]));
}

#[test_log::test]
fn promises_resolve_and_reject() {
	let mut host = host(promise::module_with(DELAY));
	let ok = host.call("hello", vec![5.into()]).unwrap();
	let failed = host.call("hello2", vec![(-1).into()]).unwrap();
	let slept = host.call("justSleep", vec![1.into()]).unwrap();
	assert_eq!(host.run_until_settled(&ok).unwrap(), HostValue::from(15));
	let err = host.run_until_settled(&failed).unwrap_err();
	assert_eq!(err.payload, host_object! { "message" => "arg is negative" });
	assert_eq!(host.run_until_settled(&slept).unwrap(), HostValue::Undefined);
}

#[test]
fn rejected_arguments_never_schedule_work() {
	let mut host = host(promise::module_with(DELAY));
	let err = host.call("hello2", vec!["a".into()]).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Type);
	let err = host.call("justSleep", vec![(-1).into()]).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Type);
	let store = host.construct("NativeStore", vec![]).unwrap();
	let err = host.call_method(&store, "put", vec![1.into()]).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Type);
	assert_eq!(host.outstanding(), 0);

	let mut host = crate::common::host(class::module_with(DELAY));
	let obj = host.construct("MyObject", vec![10.into()]).unwrap();
	let err = host.call_method(&obj, "multiply2", vec!["x".into()]).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Type);
	assert_eq!(host.outstanding(), 0);
}

#[test]
fn class_accessors_and_methods() {
	let mut host = host(class::module_with(DELAY));
	let obj = host.construct("MyObject", vec![10.into()]).unwrap();
	assert_eq!(host.get_property(&obj, "value").unwrap(), HostValue::from(10));
	assert_eq!(host.call_method(&obj, "plusOne", vec![]).unwrap(), HostValue::from(11));
	assert_eq!(host.get_property(&obj, "isPositive").unwrap(), HostValue::Bool(true));
	host.set_property(&obj, "value3", (-4).into()).unwrap();
	assert_eq!(host.get_property(&obj, "isPositive").unwrap(), HostValue::Bool(false));
	host.set_property(&obj, "value4", 2.into()).unwrap();
	host.call_method(&obj, "value2", vec![6.into()]).unwrap();
	assert_eq!(host.get_property(&obj, "value").unwrap(), HostValue::from(6));
	host.call_method(&obj, "changeValue", vec![8.into()]).unwrap();
	let score = host.call_method(&obj, "plusScore", vec![host_object! { "score" => 2 }]).unwrap();
	assert_eq!(score, HostValue::from(10));
	host.set_property(&obj, "clear", true.into()).unwrap();
	assert_eq!(host.get_property(&obj, "value").unwrap(), HostValue::from(0));

	let err = host.call_method(&obj, "plusScore", vec![host_object! {}]).unwrap_err();
	assert_eq!(err.message(), Some("invalid type, expected: number, actual: undefined"));
	let err = host.set_property(&obj, "value", 1.into()).unwrap_err();
	assert_eq!(err.message(), Some("property: value on class: MyObject is read-only"));
}

#[test]
fn class_methods_take_and_return_objects() {
	let mut host = host(class::module_with(DELAY));
	let obj = host.construct("MyObject", vec![3.into()]).unwrap();
	let doubled = host.call_method(&obj, "multiply", vec![(-2).into()]).unwrap();
	assert_eq!(host.get_property(&doubled, "value").unwrap(), HostValue::from(-6));
	assert_eq!(host.get_property(&obj, "value").unwrap(), HostValue::from(3));

	let test = host.construct("TestObject", vec![]).unwrap();
	assert_eq!(host.call_method(&obj, "plusTest", vec![test.clone()]).unwrap(), HostValue::from(3));
	host.set_property(&test, "value", 4.into()).unwrap();
	assert_eq!(host.call_method(&obj, "plusTest", vec![test]).unwrap(), HostValue::from(7));
	let err = host.call_method(&obj, "plusTest", vec![doubled]).unwrap_err();
	assert_eq!(err.message(), Some("invalid type, expected: TestObject, actual: MyObject"));
}

#[test_log::test]
fn async_class_methods() {
	let mut host = host(class::module_with(DELAY));
	let obj = host.construct("MyObject", vec![3.into()]).unwrap();
	let sum = host.call_method(&obj, "plusTwo", vec![2.into()]).unwrap();
	assert_eq!(host.run_until_settled(&sum).unwrap(), HostValue::from(5));
	let product = host.call_method(&obj, "multiply2", vec![4.into()]).unwrap();
	let product = host.run_until_settled(&product).unwrap();
	assert_eq!(host.get_property(&product, "value").unwrap(), HostValue::from(12));

	let (cb, calls) = recorder(&mut host);
	host.call_method(&obj, "sleep", vec![cb]).unwrap();
	host.run_until_idle();
	assert_eq!(*calls.borrow(), vec![vec![HostValue::from("hello world")]]);

	let created = host.call("create", vec![9.into()]).unwrap();
	let created = host.run_until_settled(&created).unwrap();
	assert_eq!(host.get_property(&created, "value2").unwrap(), HostValue::from(9));
}

#[test]
fn released_objects_fail_as_domain_errors() {
	let mut host = host(class::module_with(DELAY));
	let obj = host.construct("MyObject", vec![3.into()]).unwrap();
	host.release(&obj).unwrap();
	let err = host.call_method(&obj, "plusOne", vec![]).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Domain);
	assert_eq!(err.message(), Some("object: MyObject#1 has already been released"));
}

#[test]
fn cleanup_hooks_run_at_shutdown() {
	let before = cleanup::cleanups();
	let mut host = host(cleanup::module());
	host.call("init", vec![]).unwrap();
	assert_eq!(cleanup::cleanups(), before);
	host.shutdown();
	assert_eq!(cleanup::cleanups(), before + 1);
}
