//! Native exports and the modules grouping them.

use std::fmt;
use std::future::Future;
use std::rc::Rc;

use crate::args::{BoundArgs, CallFrame, ParamSpec, bind};
use crate::class::{ClassDef, ClassDispatch, NativeClass};
use crate::codec::HostType;
use crate::err::Error;
use crate::host::Host;
use crate::val::HostValue;

type Handler = Rc<dyn Fn(&mut Host, BoundArgs) -> Result<HostValue, Error>>;

/// What a host call to an export returns
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ReturnShape {
	/// The result is returned directly
	Value,
	/// A promise is returned, settled once the work completes
	Promise,
}

/// A function exported to the host
#[derive(Clone)]
pub struct NativeFunction {
	name: String,
	params: Vec<ParamSpec>,
	returns: ReturnShape,
	handler: Handler,
}

impl fmt::Debug for NativeFunction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NativeFunction")
			.field("name", &self.name)
			.field("params", &self.params)
			.field("returns", &self.returns)
			.finish_non_exhaustive()
	}
}

impl NativeFunction {
	/// Start declaring an export called `name`
	pub fn builder(name: impl Into<String>) -> FunctionBuilder {
		FunctionBuilder {
			name: name.into(),
			params: Vec::new(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn params(&self) -> &[ParamSpec] {
		&self.params
	}

	pub fn returns(&self) -> ReturnShape {
		self.returns
	}

	/// Bind the call frame and run the handler
	///
	/// Binding always happens first, so an asynchronous export fails
	/// synchronously on bad arguments without scheduling any work.
	pub fn invoke(&self, host: &mut Host, frame: CallFrame) -> Result<HostValue, Error> {
		let args = bind(frame, &self.params)?;
		(self.handler)(host, args)
	}
}

/// Declares the parameters of an export, then its handler
pub struct FunctionBuilder {
	name: String,
	params: Vec<ParamSpec>,
}

impl FunctionBuilder {
	pub fn param(mut self, param: ParamSpec) -> Self {
		self.params.push(param);
		self
	}

	fn build(self, returns: ReturnShape, handler: Handler) -> NativeFunction {
		NativeFunction {
			name: self.name,
			params: self.params,
			returns,
			handler,
		}
	}

	/// A synchronous handler with access to the host
	pub fn handler<F>(self, f: F) -> NativeFunction
	where
		F: Fn(&mut Host, BoundArgs) -> Result<HostValue, Error> + 'static,
	{
		self.build(ReturnShape::Value, Rc::new(f))
	}

	/// A synchronous handler returning a native value
	pub fn returning<F, R>(self, f: F) -> NativeFunction
	where
		F: Fn(BoundArgs) -> Result<R, Error> + 'static,
		R: HostType,
	{
		self.build(
			ReturnShape::Value,
			Rc::new(move |_: &mut Host, args: BoundArgs| f(args)?.into_host()),
		)
	}

	/// An asynchronous handler: `f` validates and prepares on the host
	/// thread, the returned future runs on a worker
	pub fn spawn<F, Fut, R>(self, f: F) -> NativeFunction
	where
		F: Fn(BoundArgs) -> Result<Fut, Error> + 'static,
		Fut: Future<Output = Result<R, Error>> + Send + 'static,
		R: HostType + Send + 'static,
	{
		self.build(
			ReturnShape::Promise,
			Rc::new(move |host: &mut Host, args: BoundArgs| Ok(host.submit_value(f(args)?))),
		)
	}

	/// An asynchronous handler whose work is a blocking closure
	pub fn spawn_blocking<F, W, R>(self, f: F) -> NativeFunction
	where
		F: Fn(BoundArgs) -> Result<W, Error> + 'static,
		W: FnOnce() -> Result<R, Error> + Send + 'static,
		R: HostType + Send + 'static,
	{
		self.build(
			ReturnShape::Promise,
			Rc::new(move |host: &mut Host, args: BoundArgs| Ok(host.submit_blocking(f(args)?))),
		)
	}
}

/// A group of exports installed into a host at once
#[derive(Default)]
pub struct Module {
	pub(crate) functions: Vec<NativeFunction>,
	pub(crate) classes: Vec<Rc<dyn ClassDispatch>>,
	pub(crate) cleanup: Vec<Box<dyn FnOnce()>>,
}

impl Module {
	pub fn new() -> Self {
		Self::default()
	}

	/// Export a function
	pub fn function(mut self, function: NativeFunction) -> Self {
		self.functions.push(function);
		self
	}

	/// Export a class
	pub fn class<T: NativeClass>(mut self, def: ClassDef<T>) -> Self {
		self.classes.push(Rc::new(def));
		self
	}

	/// Run `hook` once when the host shuts down
	pub fn cleanup_hook<F: FnOnce() + 'static>(mut self, hook: F) -> Self {
		self.cleanup.push(Box::new(hook));
		self
	}
}
