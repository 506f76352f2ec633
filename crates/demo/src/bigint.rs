//! Arbitrary precision integers.

use hostbind::{BigInt, Module, NativeFunction, ParamSpec};

pub fn module() -> Module {
	Module::new()
		.function(
			NativeFunction::builder("multiplyBigInt")
				.param(ParamSpec::of::<BigInt>("arg"))
				.returning(|mut args| {
					let arg: BigInt = args.next()?;
					trace!("bigint arg: {arg}");
					Ok(arg * 2)
				}),
		)
		.function(
			NativeFunction::builder("doNothing")
				.param(ParamSpec::of::<BigInt>("arg"))
				.returning(|mut args| args.next::<BigInt>()),
		)
		.function(
			NativeFunction::builder("goNegative")
				.param(ParamSpec::of::<BigInt>("arg"))
				.returning(|mut args| Ok(-args.next::<BigInt>()?)),
		)
		.function(
			NativeFunction::builder("returnU64")
				.param(ParamSpec::of::<u32>("arg"))
				.returning(|mut args| Ok(u64::from(args.next::<u32>()?))),
		)
}
