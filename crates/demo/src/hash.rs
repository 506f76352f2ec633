//! String-keyed maps.

use std::collections::HashMap;

use hostbind::{Module, NativeFunction, ParamSpec};

pub fn module() -> Module {
	Module::new()
		.function(NativeFunction::builder("makeHash").returning(|_| {
			let mut hash = HashMap::new();
			hash.insert("foo".to_owned(), true);
			hash.insert("bar".to_owned(), false);
			Ok(hash)
		}))
		.function(
			NativeFunction::builder("sumHash")
				.param(ParamSpec::of::<HashMap<String, i32>>("hash"))
				.returning(|mut args| {
					Ok(args.next::<HashMap<String, i32>>()?.values().sum::<i32>())
				}),
		)
}
