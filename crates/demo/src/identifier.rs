//! UUIDs, carried as their hyphenated text.

use hostbind::{Error, Module, NativeFunction, ParamSpec};
use uuid::Uuid;

/// The identifier handed out by `makeUuid`
pub const KNOWN: Uuid = Uuid::from_u128(0xf7509856_9ae5_4c07_976d_a5b3f983e4af);

pub fn module() -> Module {
	Module::new()
		.function(NativeFunction::builder("makeUuid").returning(|_| Ok(KNOWN)))
		.function(
			NativeFunction::builder("takeUuid").param(ParamSpec::of::<Uuid>("uuid")).returning(
				|mut args| {
					let uuid: Uuid = args.next()?;
					if uuid != KNOWN {
						return Err(Error::domain(format!("unexpected uuid: {uuid}")));
					}
					Ok(())
				},
			),
		)
}
