//! The host calling environment.
//!
//! [`Host`] owns everything the host can observe: installed exports,
//! registered classes, function references, object handles and promises.
//! It is deliberately not `Send`, worker threads only ever see plain
//! identifiers and `Send` payloads.

use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::args::CallFrame;
use crate::bridge::Bridge;
use crate::class::{ClassDef, ClassDispatch, HandleTable, NativeClass, Shared};
use crate::err::{Error, Exception};
use crate::module::{Module, NativeFunction};
use crate::options::HostOptions;
use crate::val::{FunctionRef, HostValue, ObjectHandle};

type HostFn = Rc<dyn Fn(&mut Host, Vec<HostValue>) -> Result<HostValue, Error>>;

/// A single-threaded host environment with its async bridge
pub struct Host {
	options: HostOptions,
	functions: IndexMap<String, Rc<NativeFunction>>,
	classes: HashMap<&'static str, Rc<dyn ClassDispatch>>,
	callables: HashMap<u64, HostFn>,
	next_callable: u64,
	handles: HandleTable,
	pub(crate) bridge: Bridge,
	uncaught: Vec<Exception>,
	cleanup: Vec<Box<dyn FnOnce()>>,
}

impl Host {
	/// Create a host configured from the environment
	pub fn new() -> Result<Self, Error> {
		Self::with_options(HostOptions::default())
	}

	pub fn with_options(options: HostOptions) -> Result<Self, Error> {
		Ok(Self {
			bridge: Bridge::new(&options)?,
			options,
			functions: IndexMap::new(),
			classes: HashMap::new(),
			callables: HashMap::new(),
			next_callable: 0,
			handles: HandleTable::default(),
			uncaught: Vec::new(),
			cleanup: Vec::new(),
		})
	}

	pub fn options(&self) -> &HostOptions {
		&self.options
	}

	/// Install every export of a module
	pub fn install(&mut self, module: Module) {
		for function in module.functions {
			self.register_function(function);
		}
		for class in module.classes {
			debug!("Registered class {}", class.name());
			self.classes.insert(class.name(), class);
		}
		self.cleanup.extend(module.cleanup);
	}

	pub fn register_function(&mut self, function: NativeFunction) {
		debug!("Exported function {}", function.name());
		self.functions.insert(function.name().to_owned(), Rc::new(function));
	}

	pub fn register_class<T: NativeClass>(&mut self, def: ClassDef<T>) {
		debug!("Registered class {}", T::CLASS_NAME);
		self.classes.insert(T::CLASS_NAME, Rc::new(def));
	}

	/// The installed exports, in installation order
	pub fn exports(&self) -> impl Iterator<Item = &NativeFunction> {
		self.functions.values().map(|f| f.as_ref())
	}

	/// Call an export by name
	pub fn call(&mut self, name: &str, args: Vec<HostValue>) -> Result<HostValue, Exception> {
		let function = self
			.functions
			.get(name)
			.cloned()
			.ok_or_else(|| Error::UnknownFunction(name.to_owned()))?;
		trace!("Calling {name} with {} arguments", args.len());
		Ok(function.invoke(self, CallFrame::new(args))?)
	}

	/// Construct an instance of a registered class
	pub fn construct(&mut self, class: &str, args: Vec<HostValue>) -> Result<HostValue, Exception> {
		let dispatch =
			self.classes.get(class).cloned().ok_or_else(|| Error::UnknownClass(class.to_owned()))?;
		Ok(dispatch.construct(self, CallFrame::new(args))?)
	}

	/// Read a property of a wrapped object
	pub fn get_property(
		&mut self,
		target: &HostValue,
		property: &str,
	) -> Result<HostValue, Exception> {
		let (handle, dispatch) = self.dispatch(target)?;
		Ok(dispatch.get(self, handle, property)?)
	}

	/// Assign a property of a wrapped object
	pub fn set_property(
		&mut self,
		target: &HostValue,
		property: &str,
		value: HostValue,
	) -> Result<(), Exception> {
		let (handle, dispatch) = self.dispatch(target)?;
		Ok(dispatch.set(self, handle, property, value)?)
	}

	/// Call a method of a wrapped object
	pub fn call_method(
		&mut self,
		target: &HostValue,
		method: &str,
		args: Vec<HostValue>,
	) -> Result<HostValue, Exception> {
		let (handle, dispatch) = self.dispatch(target)?;
		Ok(dispatch.call(self, method, CallFrame::new(args).with_this(handle))?)
	}

	fn dispatch(&self, target: &HostValue) -> Result<(ObjectHandle, Rc<dyn ClassDispatch>), Error> {
		let HostValue::Handle(handle) = target else {
			return Err(Error::NotAnObject(target.kind().to_string()));
		};
		let dispatch = self
			.classes
			.get(handle.tag().name())
			.cloned()
			.ok_or_else(|| Error::UnknownClass(handle.tag().name().to_owned()))?;
		Ok((*handle, dispatch))
	}

	/// Create a host function backed by a native closure
	pub fn create_function<F>(&mut self, f: F) -> HostValue
	where
		F: Fn(&mut Host, Vec<HostValue>) -> Result<HostValue, Error> + 'static,
	{
		self.next_callable += 1;
		self.callables.insert(self.next_callable, Rc::new(f));
		HostValue::Callable(FunctionRef(self.next_callable))
	}

	/// Invoke a host function on the host thread
	pub fn invoke(
		&mut self,
		callback: FunctionRef,
		args: Vec<HostValue>,
	) -> Result<HostValue, Error> {
		let f = self
			.callables
			.get(&callback.id())
			.cloned()
			.ok_or(Error::UnknownCallable(callback.id()))?;
		f(self, args)
	}

	/// Forget a host function, later invocations fail
	pub fn release_function(&mut self, callback: FunctionRef) -> bool {
		self.callables.remove(&callback.id()).is_some()
	}

	/// Wrap a natively created instance of a registered class
	pub fn new_instance<T: NativeClass>(&mut self, instance: T) -> Result<HostValue, Error> {
		if !self.classes.contains_key(T::CLASS_NAME) {
			return Err(Error::UnknownClass(T::CLASS_NAME.to_owned()));
		}
		Ok(HostValue::Handle(self.handles.wrap(instance)))
	}

	/// Dereference a handle value as an instance of `T`
	pub fn unwrap<T: NativeClass>(&self, value: &HostValue) -> Result<Shared<T>, Error> {
		match value {
			HostValue::Handle(handle) => self.handles.get::<T>(*handle),
			other => Err(Error::NotAnObject(other.kind().to_string())),
		}
	}

	pub fn handles(&self) -> &HandleTable {
		&self.handles
	}

	pub fn handles_mut(&mut self) -> &mut HandleTable {
		&mut self.handles
	}

	/// Add a reference to a handle value
	pub fn retain(&mut self, value: &HostValue) -> Result<usize, Error> {
		let handle = value.as_handle().ok_or_else(|| Error::NotAnObject(value.kind().to_string()))?;
		self.handles.retain(handle)
	}

	/// Drop a reference to a handle value
	pub fn release(&mut self, value: &HostValue) -> Result<usize, Error> {
		let handle = value.as_handle().ok_or_else(|| Error::NotAnObject(value.kind().to_string()))?;
		self.handles.release(handle)
	}

	/// Finalize a handle value which became unreachable
	pub fn finalize(&mut self, value: &HostValue) -> bool {
		value.as_handle().is_some_and(|handle| self.handles.finalize(handle))
	}

	/// Take the failures which had no caller to be reported to
	pub fn take_uncaught(&mut self) -> Vec<Exception> {
		std::mem::take(&mut self.uncaught)
	}

	pub(crate) fn report(&mut self, error: Error) {
		warn!("Uncaught exception delivered to the host: {error}");
		self.uncaught.push(error.into());
	}

	/// Run `hook` once when the host shuts down
	pub fn add_cleanup_hook<F: FnOnce() + 'static>(&mut self, hook: F) {
		self.cleanup.push(Box::new(hook));
	}

	/// Shut the host down, running cleanup hooks in reverse order of registration
	pub fn shutdown(self) {
		drop(self);
	}
}

impl Drop for Host {
	fn drop(&mut self) {
		while let Some(hook) = self.cleanup.pop() {
			hook();
		}
		debug!("Host shut down with {} live objects", self.handles.live());
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;

	use super::*;
	use crate::args::ParamSpec;
	use crate::err::ErrorKind;

	struct Counter {
		value: f64,
	}

	impl NativeClass for Counter {
		const CLASS_NAME: &'static str = "Counter";
	}

	fn counter_class() -> ClassDef<Counter> {
		ClassDef::new()
			.constructor(vec![ParamSpec::of::<f64>("value")], |_, mut args| {
				Ok(Counter {
					value: args.next()?,
				})
			})
			.getter("value", |this: &Counter| this.value)
			.setter("reset", |this: &mut Counter, clear: bool| {
				if clear {
					this.value = 0.0;
				}
			})
			.method("plusOne", vec![], |_, this, _| {
				let mut this = this.lock();
				this.value += 1.0;
				Ok(this.value.into())
			})
			.method("copy", vec![], |host, this, _| {
				let value = this.lock().value;
				Ok(host.new_instance(Counter {
					value,
				})?)
			})
	}

	fn host() -> Host {
		let mut host = Host::new().unwrap();
		host.install(Module::new().class(counter_class()).function(
			NativeFunction::builder("sum")
				.param(ParamSpec::of::<i32>("first"))
				.param(ParamSpec::of::<i32>("second"))
				.returning(|mut args| Ok(args.next::<i32>()? + args.next::<i32>()?)),
		));
		host
	}

	#[test]
	fn calls_exports_by_name() {
		let mut host = host();
		assert_eq!(host.call("sum", vec![1.into(), 2.into()]).unwrap(), HostValue::Number(3.0));
		let err = host.call("sum", vec![1.into()]).unwrap_err();
		assert_eq!(err.message(), Some("2 args expected but 1 is present"));
		assert_eq!(err.kind(), ErrorKind::Arity);
		let err = host.call("nope", vec![]).unwrap_err();
		assert_eq!(err.message(), Some("function: nope is not exported"));
	}

	#[test]
	fn dispatches_properties_and_methods() {
		let mut host = host();
		let counter = host.construct("Counter", vec![5.into()]).unwrap();
		assert_eq!(host.get_property(&counter, "value").unwrap(), HostValue::Number(5.0));
		assert_eq!(host.call_method(&counter, "plusOne", vec![]).unwrap(), HostValue::Number(6.0));
		host.set_property(&counter, "reset", true.into()).unwrap();
		assert_eq!(host.get_property(&counter, "value").unwrap(), HostValue::Number(0.0));
		let err = host.set_property(&counter, "value", 1.into()).unwrap_err();
		assert_eq!(err.message(), Some("property: value on class: Counter is read-only"));
		let err = host.get_property(&counter, "reset").unwrap_err();
		assert_eq!(err.message(), Some("property: reset on class: Counter is write-only"));
		let err = host.set_property(&counter, "reset", 1.into()).unwrap_err();
		assert_eq!(err.message(), Some("invalid type, expected: boolean, actual: number"));
		let err = host.call_method(&counter, "missing", vec![]).unwrap_err();
		assert_eq!(err.kind(), ErrorKind::Domain);
	}

	#[test]
	fn methods_can_return_fresh_objects() {
		let mut host = host();
		let counter = host.construct("Counter", vec![2.into()]).unwrap();
		let copy = host.call_method(&counter, "copy", vec![]).unwrap();
		assert_ne!(copy, counter);
		assert_eq!(host.get_property(&copy, "value").unwrap(), HostValue::Number(2.0));
		assert_eq!(host.handles().live(), 2);
	}

	#[test]
	fn released_objects_cannot_be_used() {
		let mut host = host();
		let counter = host.construct("Counter", vec![2.into()]).unwrap();
		assert_eq!(host.release(&counter).unwrap(), 0);
		let err = host.call_method(&counter, "plusOne", vec![]).unwrap_err();
		assert_eq!(err.kind(), ErrorKind::Domain);
		assert!(matches!(err.error, Error::Released(_)));
		assert!(!host.finalize(&counter));
	}

	#[test]
	fn cleanup_hooks_run_once_in_reverse_order() {
		let order = Rc::new(RefCell::new(Vec::new()));
		let mut host = Host::new().unwrap();
		for i in 0..3 {
			let order = order.clone();
			host.add_cleanup_hook(move || order.borrow_mut().push(i));
		}
		host.shutdown();
		assert_eq!(*order.borrow(), vec![2, 1, 0]);
	}

	#[test]
	fn released_functions_are_not_callable() {
		let mut host = host();
		let f = host.create_function(|_, args| Ok(args.into_iter().next().unwrap_or_default()));
		let f = f.as_callable().unwrap();
		assert_eq!(host.invoke(f, vec![4.into()]).unwrap(), HostValue::Number(4.0));
		assert!(host.release_function(f));
		assert_eq!(host.invoke(f, vec![]).unwrap_err(), Error::UnknownCallable(f.id()));
	}

	#[test]
	fn unregistered_classes_are_domain_errors() {
		let mut host = Host::new().unwrap();
		let err = host.construct("Counter", vec![]).unwrap_err();
		assert_eq!(err.message(), Some("class: Counter is not registered"));
		assert!(host.new_instance(Counter { value: 1.0 }).is_err());
	}
}
