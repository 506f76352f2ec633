//! Call frames and the argument binder.

use std::collections::VecDeque;

use crate::class::{NativeClass, Shared};
use crate::codec::{HostType, Position, decode};
use crate::err::Error;
use crate::host::Host;
use crate::kind::TypeDescriptor;
use crate::native::NativeValue;
use crate::val::{HostValue, ObjectHandle};

/// The declaration of one positional parameter
#[derive(Clone, Debug, PartialEq)]
pub struct ParamSpec {
	pub name: String,
	pub ty: TypeDescriptor,
	pub optional: bool,
	pub default: Option<HostValue>,
}

impl ParamSpec {
	/// A parameter which must be supplied
	pub fn required(name: impl Into<String>, ty: TypeDescriptor) -> Self {
		Self {
			name: name.into(),
			ty,
			optional: false,
			default: None,
		}
	}

	/// A parameter which binds to absent when missing, null or undefined
	pub fn optional(name: impl Into<String>, ty: TypeDescriptor) -> Self {
		Self {
			name: name.into(),
			ty,
			optional: true,
			default: None,
		}
	}

	/// A parameter which must hold a host function
	pub fn callback(name: impl Into<String>) -> Self {
		Self::required(name, TypeDescriptor::Callback)
	}

	/// A parameter of the native type `T`, optional when `T` is an `Option`
	pub fn of<T: HostType>(name: impl Into<String>) -> Self {
		match T::descriptor() {
			TypeDescriptor::Option(inner) => Self::optional(name, *inner),
			ty => Self::required(name, ty),
		}
	}

	/// A parameter holding a wrapped instance of `T`
	pub fn instance<T: NativeClass>(name: impl Into<String>) -> Self {
		Self::required(name, T::descriptor())
	}

	/// Bind to `value` when the argument is missing, null or undefined
	pub fn with_default(mut self, value: impl Into<HostValue>) -> Self {
		self.optional = true;
		self.default = Some(value.into());
		self
	}

	pub fn is_required(&self) -> bool {
		!self.optional
	}

	/// The descriptor the bound value is decoded against
	fn bound_type(&self) -> TypeDescriptor {
		match (self.optional, &self.default) {
			(true, None) => TypeDescriptor::option(self.ty.clone()),
			_ => self.ty.clone(),
		}
	}
}

/// The positional arguments of a host call, and the bound `this` if any
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallFrame {
	args: Vec<HostValue>,
	this: Option<ObjectHandle>,
}

impl CallFrame {
	pub fn new(args: Vec<HostValue>) -> Self {
		Self {
			args,
			this: None,
		}
	}

	pub fn with_this(mut self, this: ObjectHandle) -> Self {
		self.this = Some(this);
		self
	}

	pub fn len(&self) -> usize {
		self.args.len()
	}

	pub fn is_empty(&self) -> bool {
		self.args.is_empty()
	}

	pub fn this(&self) -> Option<ObjectHandle> {
		self.this
	}

	/// The argument at `index`, which must have been supplied
	pub fn arg_at(&self, index: usize) -> Result<&HostValue, Error> {
		self.args.get(index).ok_or(Error::ArgIndex {
			index,
			len: self.args.len(),
		})
	}
}

/// Arguments which passed the binder, in parameter order
#[derive(Debug, Default)]
pub struct BoundArgs {
	values: VecDeque<NativeValue>,
	this: Option<ObjectHandle>,
	taken: usize,
	supplied: usize,
}

impl BoundArgs {
	/// Take the next bound argument as the native type `T`
	pub fn next<T: HostType>(&mut self) -> Result<T, Error> {
		T::from_native(self.next_native()?)
	}

	/// Take the next bound argument as a native value
	pub fn next_native(&mut self) -> Result<NativeValue, Error> {
		let index = self.taken;
		let value = self.values.pop_front().ok_or(Error::ArgIndex {
			index,
			len: self.supplied,
		})?;
		self.taken += 1;
		Ok(value)
	}

	/// Take the next bound argument as a wrapped instance of `T`
	pub fn next_instance<T: NativeClass>(&mut self, host: &Host) -> Result<Shared<T>, Error> {
		match self.next_native()? {
			NativeValue::Handle(handle) => host.handles().get::<T>(handle),
			other => Err(Error::Conversion {
				expected: T::CLASS_NAME.to_owned(),
				found: other.type_name(),
			}),
		}
	}

	/// The number of arguments not taken yet
	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// The number of arguments the host supplied
	pub fn supplied(&self) -> usize {
		self.supplied
	}

	pub fn this(&self) -> Option<ObjectHandle> {
		self.this
	}
}

/// Validate a call frame against a parameter list.
///
/// Arity is checked first, then each parameter is decoded in order so the
/// first mismatch is the one reported. Extra trailing arguments are ignored.
pub fn bind(frame: CallFrame, params: &[ParamSpec]) -> Result<BoundArgs, Error> {
	let present = frame.len();
	let expected = params.iter().filter(|p| p.is_required()).count();
	trace!("Binding {present} arguments to {} parameters", params.len());
	if present < expected {
		return Err(Error::Arity {
			expected,
			present,
		});
	}
	let mut args = frame.args.into_iter();
	let mut values = VecDeque::with_capacity(params.len());
	for (index, param) in params.iter().enumerate() {
		let value = match args.next() {
			Some(value) => value,
			None if param.is_required() => {
				return Err(Error::ArgIndex {
					index,
					len: present,
				});
			}
			None => HostValue::Undefined,
		};
		let value = match &param.default {
			Some(default) if value.is_nullish() => default.clone(),
			_ => value,
		};
		let ty = param.bound_type();
		let native = match (&param.ty, value) {
			(TypeDescriptor::Callback, HostValue::Callable(f)) => match ty {
				TypeDescriptor::Option(_) => {
					NativeValue::Option(Some(Box::new(NativeValue::Callback(f))))
				}
				_ => NativeValue::Callback(f),
			},
			(TypeDescriptor::Callback, v) if param.optional && v.is_nullish() => {
				NativeValue::Option(None)
			}
			(TypeDescriptor::Callback, _) => {
				return Err(Error::ExpectedArgument("callback".to_owned()));
			}
			(_, value) => decode(value, &ty, Position::argument(index))?,
		};
		values.push_back(native);
	}
	Ok(BoundArgs {
		values,
		this: frame.this,
		taken: 0,
		supplied: present,
	})
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;
	use crate::val::FunctionRef;

	fn sum_params() -> Vec<ParamSpec> {
		vec![ParamSpec::of::<i32>("first"), ParamSpec::of::<i32>("second")]
	}

	#[test]
	fn binds_in_order_and_ignores_extra_arguments() {
		let frame = CallFrame::new(vec![1.into(), 2.into(), "extra".into()]);
		let mut args = bind(frame, &sum_params()).unwrap();
		assert_eq!(args.next::<i32>().unwrap(), 1);
		assert_eq!(args.next::<i32>().unwrap(), 2);
		assert!(args.is_empty());
		assert_eq!(args.supplied(), 3);
	}

	#[rstest]
	#[case::none(vec![], "2 args expected but 0 is present")]
	#[case::one(vec![1.into()], "2 args expected but 1 is present")]
	fn too_few_arguments(#[case] args: Vec<HostValue>, #[case] expected: &str) {
		let err = bind(CallFrame::new(args), &sum_params()).unwrap_err();
		assert_eq!(err.to_string(), expected);
	}

	#[test]
	fn reports_the_first_mismatch() {
		let frame = CallFrame::new(vec![1.into(), "2".into()]);
		let err = bind(frame, &sum_params()).unwrap_err();
		assert_eq!(err.to_string(), "invalid type, expected: number, actual: string");
		assert!(matches!(
			err,
			Error::InvalidType { position, .. } if position == Position::argument(1)
		));
	}

	#[test]
	fn zero_parameters_accept_zero_arguments() {
		let args = bind(CallFrame::default(), &[]).unwrap();
		assert!(args.is_empty());
	}

	#[test]
	fn optional_parameters_bind_to_absent_or_default() {
		let params = vec![
			ParamSpec::optional("a", TypeDescriptor::Int32),
			ParamSpec::optional("b", TypeDescriptor::Int32).with_default(1),
		];
		let mut args = bind(CallFrame::new(vec![HostValue::Null]), &params).unwrap();
		assert_eq!(args.next::<Option<i32>>().unwrap(), None);
		assert_eq!(args.next::<i32>().unwrap(), 1);
		let mut args = bind(CallFrame::new(vec![4.into(), 5.into()]), &params).unwrap();
		assert_eq!(args.next::<Option<i32>>().unwrap(), Some(4));
		assert_eq!(args.next::<i32>().unwrap(), 5);
	}

	#[test]
	fn required_after_optional_reports_the_index() {
		let params = vec![
			ParamSpec::optional("a", TypeDescriptor::Int32),
			ParamSpec::of::<i32>("b"),
		];
		let err = bind(CallFrame::new(vec![1.into()]), &params).unwrap_err();
		assert_eq!(err.to_string(), "trying to get arg at: 1 but only 1 args passed");
	}

	#[test]
	fn callbacks_must_be_callable() {
		let params = vec![ParamSpec::of::<i32>("value"), ParamSpec::callback("cb")];
		let err = bind(CallFrame::new(vec![2.into(), 3.into()]), &params).unwrap_err();
		assert_eq!(err.to_string(), "expected argument of type: callback");
		let mut args =
			bind(CallFrame::new(vec![2.into(), FunctionRef(9).into()]), &params).unwrap();
		assert_eq!(args.next::<i32>().unwrap(), 2);
		assert_eq!(args.next::<FunctionRef>().unwrap(), FunctionRef(9));
	}

	#[test]
	fn taking_past_the_end_reports_the_index() {
		let mut args = bind(CallFrame::new(vec![1.into()]), &[ParamSpec::of::<i32>("a")]).unwrap();
		args.next::<i32>().unwrap();
		let err = args.next::<i32>().unwrap_err();
		assert_eq!(err.to_string(), "trying to get arg at: 1 but only 1 args passed");
	}
}
