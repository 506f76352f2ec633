//! Optional parameters.

use hostbind::{Module, NativeFunction, ParamSpec};

/// Sums both arguments when present, otherwise returns whichever is, or 1
fn test(a: Option<i32>, b: Option<i32>) -> i32 {
	match (a, b) {
		(Some(a), Some(b)) => a + b,
		(a, b) => a.unwrap_or(b.unwrap_or(1)),
	}
}

pub fn module() -> Module {
	Module::new().function(
		NativeFunction::builder("test")
			.param(ParamSpec::of::<Option<i32>>("a"))
			.param(ParamSpec::of::<Option<i32>>("b"))
			.returning(|mut args| Ok(test(args.next()?, args.next()?))),
	)
}
