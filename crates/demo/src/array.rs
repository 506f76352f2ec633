//! Arrays in and out.

use hostbind::{Error, Module, NativeFunction, ParamSpec};

pub fn module() -> Module {
	Module::new()
		.function(
			NativeFunction::builder("makeArray")
				.param(ParamSpec::of::<i32>("count"))
				.returning(|mut args| Ok((0..args.next::<i32>()?).collect::<Vec<i32>>())),
		)
		.function(
			NativeFunction::builder("sumArray")
				.param(ParamSpec::of::<Vec<i32>>("array"))
				.returning(|mut args| {
					args.next::<Vec<i32>>()?
						.into_iter()
						.try_fold(0i32, |sum, n| sum.checked_add(n))
						.ok_or_else(|| Error::domain("sum of the array overflows"))
				}),
		)
}
