//! Structs and enums crossing the boundary as objects.

use hostbind::kind::{EnumDescriptor, FieldDescriptor, StructDescriptor};
use hostbind::{
	EnumValue, Error, HostType, Module, NativeFunction, NativeValue, ParamSpec, TypeDescriptor,
	VariantPayload,
};
use tokio::time::sleep;

use crate::default_delay;

/// Fields are renamed to camel case
#[derive(Clone, Debug, PartialEq)]
pub struct StandardJson {
	pub some_name: String,
	pub a_number: i64,
}

impl HostType for StandardJson {
	fn descriptor() -> TypeDescriptor {
		StructDescriptor::new("StandardJson")
			.field("some_name", TypeDescriptor::String)
			.field("a_number", TypeDescriptor::Int64)
			.camel_case()
			.into()
	}

	fn from_native(value: NativeValue) -> Result<Self, Error> {
		let mut fields = value.into_fields::<Self>()?;
		Ok(Self {
			some_name: fields.take("some_name")?,
			a_number: fields.take("a_number")?,
		})
	}

	fn into_native(self) -> NativeValue {
		NativeValue::structure([
			("some_name", self.some_name.into_native()),
			("a_number", self.a_number.into_native()),
		])
	}
}

/// A newtype, encoded as the value it wraps
#[derive(Clone, Debug, PartialEq)]
pub struct Inner(pub String);

impl HostType for Inner {
	fn descriptor() -> TypeDescriptor {
		TypeDescriptor::String
	}

	fn from_native(value: NativeValue) -> Result<Self, Error> {
		String::from_native(value).map(Self)
	}

	fn into_native(self) -> NativeValue {
		self.0.into_native()
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Outer {
	pub val: Inner,
}

impl HostType for Outer {
	fn descriptor() -> TypeDescriptor {
		StructDescriptor::new("Outer").field("val", Inner::descriptor()).into()
	}

	fn from_native(value: NativeValue) -> Result<Self, Error> {
		let mut fields = value.into_fields::<Self>()?;
		Ok(Self {
			val: fields.take("val")?,
		})
	}

	fn into_native(self) -> NativeValue {
		NativeValue::structure([("val", self.val.into_native())])
	}
}

/// A field published under a name of its own
#[derive(Clone, Debug, PartialEq)]
pub struct CustomJson {
	pub val: f64,
}

impl HostType for CustomJson {
	fn descriptor() -> TypeDescriptor {
		StructDescriptor::new("CustomJson")
			.renamed_field("val", "customFieldName", TypeDescriptor::Float64)
			.into()
	}

	fn from_native(value: NativeValue) -> Result<Self, Error> {
		let mut fields = value.into_fields::<Self>()?;
		Ok(Self {
			val: fields.take("val")?,
		})
	}

	fn into_native(self) -> NativeValue {
		NativeValue::structure([("val", self.val.into_native())])
	}
}

/// The failures raised by this module
#[derive(Clone, Debug, PartialEq)]
pub enum ErrorType {
	WithMessage(String, u64),
	WithFields {
		val: u64,
	},
	UnitErrorType,
}

impl HostType for ErrorType {
	fn descriptor() -> TypeDescriptor {
		EnumDescriptor::new("ErrorType")
			.tuple("withMessage", vec![TypeDescriptor::String, TypeDescriptor::UInt64])
			.structure("withFields", vec![FieldDescriptor::new("val", TypeDescriptor::UInt64)])
			.unit("unitErrorType")
			.into()
	}

	fn from_native(value: NativeValue) -> Result<Self, Error> {
		let EnumValue {
			variant,
			payload,
		} = match value {
			NativeValue::Enum(value) => value,
			other => return Err(Error::unexpected::<Self>(&other)),
		};
		match (variant.as_str(), payload) {
			("withMessage", VariantPayload::Tuple(items)) => {
				let (message, code) = <(String, u64)>::from_native(NativeValue::Tuple(items))?;
				Ok(Self::WithMessage(message, code))
			}
			("withFields", VariantPayload::Struct(fields)) => {
				let mut fields = NativeValue::Struct(fields).into_fields::<Self>()?;
				Ok(Self::WithFields {
					val: fields.take("val")?,
				})
			}
			("unitErrorType", VariantPayload::Unit) => Ok(Self::UnitErrorType),
			_ => Err(Error::UnknownVariant {
				name: "ErrorType".to_owned(),
				variant: variant.clone(),
			}),
		}
	}

	fn into_native(self) -> NativeValue {
		let value = match self {
			Self::WithMessage(message, code) => {
				EnumValue::tuple("withMessage", vec![message.into_native(), code.into_native()])
			}
			Self::WithFields {
				val,
			} => EnumValue::structure("withFields", [("val".to_owned(), val.into_native())]),
			Self::UnitErrorType => EnumValue::unit("unitErrorType"),
		};
		NativeValue::Enum(value)
	}
}

pub fn module() -> Module {
	module_with(default_delay())
}

pub fn module_with(delay: std::time::Duration) -> Module {
	Module::new()
		.function(NativeFunction::builder("customJson").returning(|_| {
			Ok(CustomJson {
				val: 10.0,
			})
		}))
		.function(NativeFunction::builder("standardJson").returning(|_| {
			Ok(StandardJson {
				some_name: "John".to_owned(),
				a_number: 1337,
			})
		}))
		.function(NativeFunction::builder("multilevelJson").returning(|_| {
			Ok(Outer {
				val: Inner("hello".to_owned()),
			})
		}))
		.function(NativeFunction::builder("unitStruct").returning(|_| Ok(())))
		.function(
			NativeFunction::builder("withMessage")
				.returning(|_| Ok(ErrorType::WithMessage("test".to_owned(), 321))),
		)
		.function(NativeFunction::builder("withFields").returning(|_| {
			Ok(ErrorType::WithFields {
				val: 123,
			})
		}))
		.function(NativeFunction::builder("withUnit").returning(|_| Ok(ErrorType::UnitErrorType)))
		.function(
			NativeFunction::builder("echoJson")
				.param(ParamSpec::of::<StandardJson>("value"))
				.returning(|mut args| args.next::<StandardJson>()),
		)
		.function(
			NativeFunction::builder("failWithFields").param(ParamSpec::of::<u64>("val")).returning(
				|mut args| -> Result<(), Error> {
					Err(Error::custom(ErrorType::WithFields {
						val: args.next()?,
					}))
				},
			),
		)
		.function(NativeFunction::builder("failLater").spawn(move |_| {
			Ok(async move {
				sleep(delay).await;
				Err::<(), _>(Error::custom(ErrorType::UnitErrorType))
			})
		}))
}
