//! Async work completing into a host callback.

use std::time::Duration;

use hostbind::{Error, FunctionRef, HostValue, Module, NativeFunction, ParamSpec};
use tokio::time::sleep;

use crate::default_delay;

pub fn module() -> Module {
	module_with(default_delay())
}

pub fn module_with(delay: Duration) -> Module {
	Module::new()
		.function(
			NativeFunction::builder("basic")
				.param(ParamSpec::of::<i32>("seconds"))
				.param(ParamSpec::callback("cb"))
				.handler(move |host, mut args| {
					let seconds: i32 = args.next()?;
					let cb: FunctionRef = args.next()?;
					let work = async move {
						sleep(delay).await;
						Ok(seconds)
					};
					host.submit_callback(work, cb, |_, seconds: i32| {
						let seconds = f64::from(seconds);
						Ok(vec![seconds.into(), (seconds * 2.0).into()])
					});
					Ok(HostValue::Undefined)
				}),
		)
		.function(
			NativeFunction::builder("hello")
				.param(ParamSpec::of::<u32>("seconds"))
				.param(ParamSpec::callback("cb"))
				.handler(move |host, mut args| {
					let seconds: u32 = args.next()?;
					let cb: FunctionRef = args.next()?;
					let wait = delay.checked_mul(seconds).ok_or_else(|| {
						Error::domain(format!("seconds: {seconds} is too long to wait"))
					})?;
					let work = async move {
						sleep(wait).await;
						Ok(())
					};
					host.submit_callback(work, cb, |_, ()| {
						Ok(vec![HostValue::from(10.0), HostValue::from("hello world")])
					});
					Ok(HostValue::Undefined)
				}),
		)
}
