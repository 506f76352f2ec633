//! Native classes: constructors, accessors, methods and async methods.

use std::time::Duration;

use hostbind::{
	ClassDef, Error, FunctionRef, Host, HostType, HostValue, Module, NativeClass, NativeFunction,
	ParamSpec, Position, TypeDescriptor,
};
use tokio::time::sleep;

use crate::default_delay;

/// A value which may be set after construction
pub struct TestObject {
	val: Option<f64>,
}

impl NativeClass for TestObject {
	const CLASS_NAME: &'static str = "TestObject";
}

impl TestObject {
	fn value2(&self) -> f64 {
		self.val.unwrap_or(0.0)
	}

	fn class() -> ClassDef<Self> {
		ClassDef::new()
			.constructor(vec![], |_, _| {
				Ok(Self {
					val: None,
				})
			})
			.setter("value", |this: &mut Self, val: f64| {
				this.val.replace(val);
			})
			.getter("value2", Self::value2)
			.method("test", vec![], |_, _, _| Ok(HostValue::Number(0.0)))
	}
}

pub struct MyObject {
	val: f64,
}

impl NativeClass for MyObject {
	const CLASS_NAME: &'static str = "MyObject";
}

impl MyObject {
	fn class(delay: Duration) -> ClassDef<Self> {
		ClassDef::new()
			.constructor(vec![ParamSpec::of::<f64>("val")], |_, mut args| {
				Ok(Self {
					val: args.next()?,
				})
			})
			.getter("value", |this: &Self| this.val)
			.getter("isPositive", |this: &Self| this.val > 0.0)
			.setter("value3", |this: &mut Self, val: f64| this.val = val)
			.setter("value4", |this: &mut Self, val: f64| this.val = val)
			.setter("clear", |this: &mut Self, clear: bool| {
				if clear {
					this.val = 0.0;
				}
			})
			.method("plusOne", vec![], |_, this, _| {
				let val = this.lock().val;
				Ok((val + 1.0).into())
			})
			.method("value2", vec![ParamSpec::of::<f64>("val")], |_, this, mut args| {
				this.lock().val = args.next()?;
				Ok(HostValue::Undefined)
			})
			.method("changeValue", vec![ParamSpec::of::<f64>("val")], |_, this, mut args| {
				this.lock().val = args.next()?;
				Ok(HostValue::Undefined)
			})
			.method(
				"plusScore",
				vec![ParamSpec::required("config", TypeDescriptor::Dynamic)],
				|_, this, mut args| {
					let config: HostValue = args.next()?;
					let at = Position::argument(0).field("score");
					let score = f64::from_host_at(config.get("score").clone(), at)?;
					let val = this.lock().val;
					Ok((val + score).into())
				},
			)
			.method(
				"plusTest",
				vec![ParamSpec::instance::<TestObject>("config")],
				|host, this, mut args| {
					let config = args.next_instance::<TestObject>(host)?;
					let score = config.lock().value2();
					let val = this.lock().val;
					Ok((val + score).into())
				},
			)
			.method("multiply", vec![ParamSpec::of::<f64>("arg")], |host, this, mut args| {
				let arg: f64 = args.next()?;
				let val = this.lock().val * arg;
				host.new_instance(Self {
					val,
				})
			})
			.method("plusTwo", vec![ParamSpec::of::<f64>("arg")], move |host, this, mut args| {
				let arg: f64 = args.next()?;
				let shared = this.shared();
				Ok(host.submit_value(async move {
					sleep(delay).await;
					let val = shared.lock().val;
					Ok(val + arg)
				}))
			})
			.method("multiply2", vec![ParamSpec::of::<f64>("arg")], move |host, this, mut args| {
				let arg: f64 = args.next()?;
				let shared = this.shared();
				let work = async move {
					sleep(delay).await;
					let val = shared.lock().val;
					Ok(val * arg)
				};
				Ok(host.submit(work, |host, val: f64| {
					host.new_instance(Self {
						val,
					})
				}))
			})
			.method("sleep", vec![ParamSpec::callback("cb")], move |host, _, mut args| {
				let cb: FunctionRef = args.next()?;
				let work = async move {
					sleep(delay).await;
					Ok("hello world".to_owned())
				};
				host.submit_callback(work, cb, |_, msg: String| Ok(vec![msg.into()]));
				Ok(HostValue::Undefined)
			})
			.method("test", vec![], |_, _, _| Ok(HostValue::Number(0.0)))
	}
}

/// Create a `TestObject` holding `val`, asynchronously
fn create(host: &mut Host, val: f64) -> HostValue {
	host.submit(async move { Ok::<_, Error>(val) }, |host, val: f64| {
		host.new_instance(TestObject {
			val: Some(val),
		})
	})
}

pub fn module() -> Module {
	module_with(default_delay())
}

pub fn module_with(delay: Duration) -> Module {
	Module::new()
		.class(TestObject::class())
		.class(MyObject::class(delay))
		.function(
			NativeFunction::builder("create")
				.param(ParamSpec::of::<f64>("val"))
				.handler(|host, mut args| Ok(create(host, args.next()?))),
		)
}
