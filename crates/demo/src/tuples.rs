//! Tuples decoded from fixed-length arrays.

use hostbind::{Error, Module, NativeFunction, ParamSpec};

fn capitalize_and_square(
	(text, numbers): (String, Vec<i32>),
) -> Result<(String, Vec<i32>), Error> {
	let squares = numbers
		.into_iter()
		.map(|n| {
			n.checked_mul(n).ok_or_else(|| Error::domain(format!("square of {n} overflows")))
		})
		.collect::<Result<_, _>>()?;
	Ok((text.to_ascii_uppercase(), squares))
}

pub fn module() -> Module {
	Module::new().function(
		NativeFunction::builder("capitalizeAndSquare")
			.param(ParamSpec::of::<(String, Vec<i32>)>("value"))
			.returning(|mut args| capitalize_and_square(args.next()?)),
	)
}
