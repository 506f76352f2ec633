//! Plain synchronous functions.

use hostbind::{Error, Module, NativeFunction, ParamSpec};

pub fn module() -> Module {
	Module::new()
		.function(
			NativeFunction::builder("hello")
				.param(ParamSpec::of::<i32>("count"))
				.returning(|mut args| Ok(format!("hello world {}", args.next::<i32>()?))),
		)
		.function(
			NativeFunction::builder("sum")
				.param(ParamSpec::of::<i32>("first"))
				.param(ParamSpec::of::<i32>("second"))
				.returning(|mut args| {
					let first: i32 = args.next()?;
					let second: i32 = args.next()?;
					first.checked_add(second).ok_or_else(|| {
						Error::domain(format!("sum of {first} and {second} overflows"))
					})
				}),
		)
}
