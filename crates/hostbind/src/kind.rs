use std::fmt::{self, Display, Formatter};

use crate::val::TypeTag;

/// The declared native type a host value is decoded into, or encoded from.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum TypeDescriptor {
	/// Any host value, passed through untouched.
	Dynamic,
	/// A unit struct, encoded as null.
	Unit,
	/// Boolean type.
	Bool,
	/// 32-bit signed integer type.
	Int32,
	/// 32-bit unsigned integer type.
	UInt32,
	/// 64-bit signed integer type.
	Int64,
	/// 64-bit unsigned integer type.
	UInt64,
	/// 64-bit floating point type.
	Float64,
	/// Arbitrary-precision signed integer type.
	BigInt,
	/// String type.
	String,
	/// Byte buffer type.
	Bytes,
	/// UUID type, exchanged in its canonical hyphenated text form.
	Uuid,
	/// A host function reference.
	Callback,
	/// A wrapped instance of one native class.
	Handle(TypeTag),
	/// An optional type, null and undefined decode as absent.
	Option(Box<TypeDescriptor>),
	/// A homogeneous array type.
	Array(Box<TypeDescriptor>),
	/// A homogeneous map type with string keys.
	Map(Box<TypeDescriptor>),
	/// A fixed-arity tuple type.
	Tuple(Vec<TypeDescriptor>),
	/// A struct with named, optionally renamed, fields.
	Struct(StructDescriptor),
	/// An enum with unit, tuple and struct variants.
	Enum(EnumDescriptor),
}

impl TypeDescriptor {
	pub fn option(inner: TypeDescriptor) -> Self {
		TypeDescriptor::Option(Box::new(inner))
	}

	pub fn array(inner: TypeDescriptor) -> Self {
		TypeDescriptor::Array(Box::new(inner))
	}

	pub fn map(inner: TypeDescriptor) -> Self {
		TypeDescriptor::Map(Box::new(inner))
	}

	pub fn is_dynamic(&self) -> bool {
		matches!(self, TypeDescriptor::Dynamic)
	}

	/// The host kind a value must have to decode against this descriptor,
	/// as quoted in type errors.
	pub fn host_label(&self) -> String {
		match self {
			TypeDescriptor::Dynamic => "any".to_owned(),
			TypeDescriptor::Unit => "null".to_owned(),
			TypeDescriptor::Bool => "boolean".to_owned(),
			TypeDescriptor::Int32
			| TypeDescriptor::UInt32
			| TypeDescriptor::Int64
			| TypeDescriptor::UInt64
			| TypeDescriptor::Float64 => "number".to_owned(),
			TypeDescriptor::BigInt => "bigint".to_owned(),
			TypeDescriptor::String | TypeDescriptor::Uuid => "string".to_owned(),
			TypeDescriptor::Bytes => "bytes".to_owned(),
			TypeDescriptor::Callback => "function".to_owned(),
			TypeDescriptor::Handle(tag) => tag.name().to_owned(),
			TypeDescriptor::Option(inner) => inner.host_label(),
			TypeDescriptor::Array(_) | TypeDescriptor::Tuple(_) => "array".to_owned(),
			TypeDescriptor::Map(_) | TypeDescriptor::Struct(_) => "object".to_owned(),
			TypeDescriptor::Enum(e) => e.name.clone(),
		}
	}
}

impl Display for TypeDescriptor {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			TypeDescriptor::Dynamic => f.write_str("any"),
			TypeDescriptor::Unit => f.write_str("unit"),
			TypeDescriptor::Bool => f.write_str("bool"),
			TypeDescriptor::Int32 => f.write_str("i32"),
			TypeDescriptor::UInt32 => f.write_str("u32"),
			TypeDescriptor::Int64 => f.write_str("i64"),
			TypeDescriptor::UInt64 => f.write_str("u64"),
			TypeDescriptor::Float64 => f.write_str("f64"),
			TypeDescriptor::BigInt => f.write_str("bigint"),
			TypeDescriptor::String => f.write_str("string"),
			TypeDescriptor::Bytes => f.write_str("bytes"),
			TypeDescriptor::Uuid => f.write_str("uuid"),
			TypeDescriptor::Callback => f.write_str("callback"),
			TypeDescriptor::Handle(tag) => f.write_str(tag.name()),
			TypeDescriptor::Option(k) => write!(f, "option<{k}>"),
			TypeDescriptor::Array(k) => write!(f, "array<{k}>"),
			TypeDescriptor::Map(k) => write!(f, "map<string, {k}>"),
			TypeDescriptor::Tuple(k) => {
				f.write_str("(")?;
				for (i, k) in k.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{k}")?;
				}
				f.write_str(")")
			}
			TypeDescriptor::Struct(s) => f.write_str(&s.name),
			TypeDescriptor::Enum(e) => f.write_str(&e.name),
		}
	}
}

/// A named struct field with an optional host-side name
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldDescriptor {
	pub name: String,
	pub rename: Option<String>,
	pub ty: TypeDescriptor,
}

impl FieldDescriptor {
	pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
		Self {
			name: name.into(),
			rename: None,
			ty,
		}
	}

	pub fn renamed(mut self, rename: impl Into<String>) -> Self {
		self.rename = Some(rename.into());
		self
	}

	/// The key this field is stored under in a host object
	pub fn host_name(&self) -> &str {
		self.rename.as_deref().unwrap_or(&self.name)
	}
}

/// The fields of a struct, in declaration order
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StructDescriptor {
	pub name: String,
	pub fields: Vec<FieldDescriptor>,
}

impl StructDescriptor {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			fields: Vec::new(),
		}
	}

	/// Add a field stored under its native name
	pub fn field(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
		self.fields.push(FieldDescriptor::new(name, ty));
		self
	}

	/// Add a field stored under another host name
	pub fn renamed_field(
		mut self,
		name: impl Into<String>,
		rename: impl Into<String>,
		ty: TypeDescriptor,
	) -> Self {
		self.fields.push(FieldDescriptor::new(name, ty).renamed(rename));
		self
	}

	/// Rename every field without an explicit rename to camelCase
	pub fn camel_case(mut self) -> Self {
		for field in self.fields.iter_mut() {
			if field.rename.is_none() {
				let rename = camel_case(&field.name);
				if rename != field.name {
					field.rename = Some(rename);
				}
			}
		}
		self
	}
}

impl From<StructDescriptor> for TypeDescriptor {
	fn from(v: StructDescriptor) -> Self {
		TypeDescriptor::Struct(v)
	}
}

/// One variant of an enum
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VariantDescriptor {
	Unit(String),
	Tuple(String, Vec<TypeDescriptor>),
	Struct(String, Vec<FieldDescriptor>),
}

impl VariantDescriptor {
	pub fn name(&self) -> &str {
		match self {
			VariantDescriptor::Unit(name)
			| VariantDescriptor::Tuple(name, _)
			| VariantDescriptor::Struct(name, _) => name,
		}
	}
}

/// The variants of an enum, in declaration order
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnumDescriptor {
	pub name: String,
	pub variants: Vec<VariantDescriptor>,
}

impl EnumDescriptor {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			variants: Vec::new(),
		}
	}

	pub fn unit(mut self, name: impl Into<String>) -> Self {
		self.variants.push(VariantDescriptor::Unit(name.into()));
		self
	}

	pub fn tuple(mut self, name: impl Into<String>, items: Vec<TypeDescriptor>) -> Self {
		self.variants.push(VariantDescriptor::Tuple(name.into(), items));
		self
	}

	pub fn structure(mut self, name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
		self.variants.push(VariantDescriptor::Struct(name.into(), fields));
		self
	}

	pub fn variant(&self, name: &str) -> Option<&VariantDescriptor> {
		self.variants.iter().find(|v| v.name() == name)
	}
}

impl From<EnumDescriptor> for TypeDescriptor {
	fn from(v: EnumDescriptor) -> Self {
		TypeDescriptor::Enum(v)
	}
}

/// Converts a snake_case or PascalCase name to camelCase
pub fn camel_case(name: &str) -> String {
	let mut out = String::with_capacity(name.len());
	let mut upper = false;
	for (i, c) in name.chars().enumerate() {
		if c == '_' {
			upper = !out.is_empty();
		} else if upper {
			out.extend(c.to_uppercase());
			upper = false;
		} else if i == 0 {
			out.extend(c.to_lowercase());
		} else {
			out.push(c);
		}
	}
	out
}
