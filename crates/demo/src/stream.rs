//! Paced emission of a counter into a host callback.

use hostbind::{ClassDef, Error, FunctionRef, HostValue, Module, NativeClass, ParamSpec};

pub struct StreamFactory;

impl NativeClass for StreamFactory {
	const CLASS_NAME: &'static str = "StreamFactory";
}

impl StreamFactory {
	fn class() -> ClassDef<Self> {
		ClassDef::new().constructor(vec![], |_, _| Ok(Self)).method(
			"stream",
			vec![ParamSpec::of::<i32>("count"), ParamSpec::callback("cb")],
			|host, this, mut args| {
				let count: i32 = args.next()?;
				let cb: FunctionRef = args.next()?;
				let count = usize::try_from(count)
					.map_err(|_| Error::domain(format!("count: {count} should not be negative")))?;
				let session = host.open_stream(Some(this.handle()), count)?;
				host.start_event_stream(session, "data", cb)?;
				Ok(HostValue::Undefined)
			},
		)
	}
}

pub fn module() -> Module {
	Module::new().class(StreamFactory::class())
}
