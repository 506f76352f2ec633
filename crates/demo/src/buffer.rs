//! Byte buffers.

use hostbind::kind::StructDescriptor;
use hostbind::{
	Bytes, Error, HostType, Module, NativeFunction, NativeValue, ParamSpec, TypeDescriptor,
};
use serde::Serialize;

#[derive(Serialize)]
struct MyStruct {
	a: String,
	b: i32,
}

/// A buffer next to a comment
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
	pub buffer: Bytes,
	pub comment: String,
}

impl HostType for Record {
	fn descriptor() -> TypeDescriptor {
		StructDescriptor::new("Record")
			.field("buffer", TypeDescriptor::Bytes)
			.field("comment", TypeDescriptor::String)
			.into()
	}

	fn from_native(value: NativeValue) -> Result<Self, Error> {
		let mut fields = value.into_fields::<Self>()?;
		Ok(Self {
			buffer: fields.take("buffer")?,
			comment: fields.take("comment")?,
		})
	}

	fn into_native(self) -> NativeValue {
		NativeValue::structure([
			("buffer", self.buffer.into_native()),
			("comment", self.comment.into_native()),
		])
	}
}

fn json_bytes(b: i32) -> Result<Bytes, Error> {
	let my_struct = MyStruct {
		a: "b".to_owned(),
		b,
	};
	serde_json::to_vec(&my_struct)
		.map(Bytes::new)
		.map_err(|e| Error::domain(format!("serialization error: {e}")))
}

fn utf8(data: Bytes) -> Result<String, Error> {
	String::from_utf8(data.into_vec()).map_err(Error::domain)
}

pub fn module() -> Module {
	Module::new()
		.function(
			NativeFunction::builder("test")
				.param(ParamSpec::of::<i32>("b"))
				.returning(|mut args| json_bytes(args.next()?)),
		)
		.function(NativeFunction::builder("test2").param(ParamSpec::of::<i32>("b")).returning(
			|mut args| {
				Ok(Record {
					buffer: json_bytes(args.next()?)?,
					comment: "array buffer is cool!".to_owned(),
				})
			},
		))
		.function(
			NativeFunction::builder("test3")
				.param(ParamSpec::of::<Bytes>("data"))
				.returning(|mut args| Ok(format!("reply {}", utf8(args.next()?)?))),
		)
		.function(
			NativeFunction::builder("test4")
				.param(ParamSpec::of::<Bytes>("data"))
				.param(ParamSpec::of::<Bytes>("foo"))
				.returning(|mut args| {
					let message = utf8(args.next()?)?;
					let foo = utf8(args.next()?)?;
					Ok(format!("reply {message} {foo}"))
				}),
		)
}
