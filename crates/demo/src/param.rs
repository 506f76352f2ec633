//! A parameter accepting either a number or an object.

use hostbind::codec::Position;
use hostbind::{Error, HostType, HostValue, Module, NativeFunction, ParamSpec, TypeDescriptor};

#[derive(Debug, Default, PartialEq)]
struct Json {
	val: i32,
	name: Option<String>,
}

#[derive(Debug, PartialEq)]
enum MyParam {
	Val(i32),
	Json(Json),
}

impl MyParam {
	fn from_host(value: HostValue) -> Result<Self, Error> {
		let at = Position::argument(0);
		match value {
			HostValue::Number(_) => i32::from_host_at(value, at).map(Self::Val),
			HostValue::Object(object) => {
				let Some(val) = object.get("val") else {
					return Err(Error::domain("val is not found"));
				};
				Ok(Self::Json(Json {
					val: i32::from_host_at(val.clone(), at.field("val"))?,
					name: Option::<String>::from_host_at(
						object.get("name").cloned().unwrap_or_default(),
						at.field("name"),
					)?,
				}))
			}
			_ => Err(Error::domain("not valid format")),
		}
	}
}

fn add(arg: Option<MyParam>) -> i32 {
	match arg {
		Some(MyParam::Val(val)) => val * 10,
		Some(MyParam::Json(json)) => {
			if let Some(name) = &json.name {
				trace!("Adding the value of {name}");
			}
			json.val * 10
		}
		None => 0,
	}
}

pub fn module() -> Module {
	Module::new().function(
		NativeFunction::builder("add")
			.param(ParamSpec::optional("arg", TypeDescriptor::Dynamic))
			.returning(|mut args| {
				let arg = args.next::<Option<HostValue>>()?.map(MyParam::from_host).transpose()?;
				Ok(add(arg))
			}),
	)
}
