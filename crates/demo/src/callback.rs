//! Host functions invoked synchronously.

use hostbind::{FunctionRef, HostValue, Module, NativeFunction, ParamSpec};

pub fn module() -> Module {
	Module::new().function(
		NativeFunction::builder("hello")
			.param(ParamSpec::of::<f64>("first"))
			.param(ParamSpec::callback("second"))
			.handler(|host, mut args| {
				let first: f64 = args.next()?;
				let second: FunctionRef = args.next()?;
				host.invoke(second, vec![format!("argument is: {first}").into()])?;
				Ok(HostValue::Undefined)
			}),
	)
}
