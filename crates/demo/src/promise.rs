//! Promise-returning functions, and a store object with async accessors.

use std::time::Duration;

use hostbind::{ClassDef, Error, HostValue, Module, NativeClass, NativeFunction, ParamSpec};
use tokio::time::sleep;

use crate::default_delay;

/// A string shared between concurrent async calls
#[derive(Debug)]
pub struct NativeStore {
	val: String,
}

impl NativeClass for NativeStore {
	const CLASS_NAME: &'static str = "NativeStore";
}

impl NativeStore {
	fn class(delay: Duration) -> ClassDef<Self> {
		ClassDef::new()
			.constructor(vec![], |_, _| {
				Ok(Self {
					val: "unknown".to_owned(),
				})
			})
			.method("get", vec![], |host, this, _| {
				let store = this.shared();
				Ok(host.submit_value(async move {
					sleep(Duration::from_micros(1)).await;
					let val = store.lock().val.clone();
					Ok(val)
				}))
			})
			.method("put", vec![ParamSpec::of::<String>("value")], move |host, this, mut args| {
				let value: String = args.next()?;
				let store = this.shared();
				Ok(host.submit_value(async move {
					sleep(delay / 2).await;
					store.lock().val = value;
					Ok(())
				}))
			})
	}
}

pub fn module() -> Module {
	module_with(default_delay())
}

pub fn module_with(delay: Duration) -> Module {
	Module::new()
		.class(NativeStore::class(delay))
		.function(NativeFunction::builder("hello").param(ParamSpec::of::<f64>("arg")).spawn(
			move |mut args| {
				let arg: f64 = args.next()?;
				Ok(async move {
					sleep(delay).await;
					debug!("Woke, adding 10 to {arg}");
					Ok(arg + 10.0)
				})
			},
		))
		.function(NativeFunction::builder("hello2").param(ParamSpec::of::<f64>("arg")).spawn(
			move |mut args| {
				let arg: f64 = args.next()?;
				Ok(async move {
					sleep(delay).await;
					if arg < 0.0 {
						return Err(Error::domain("arg is negative"));
					}
					Ok(arg + 10.0)
				})
			},
		))
		.function(NativeFunction::builder("justSleep").param(ParamSpec::of::<u32>("seconds")).spawn(
			move |mut args| {
				let seconds: u32 = args.next()?;
				let wait = delay.checked_mul(seconds).ok_or_else(|| {
					Error::domain(format!("seconds: {seconds} is too long to wait"))
				})?;
				Ok(async move {
					sleep(wait).await;
					Ok(HostValue::Undefined)
				})
			},
		))
}
