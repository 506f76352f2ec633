//! Native instances exposed to the host as opaque handles.
//!
//! A [`ClassDef`] is the dispatch table of one native type: an optional
//! constructor, a set of properties with independent getters and setters,
//! and methods. Instances live in the host's [`HandleTable`] behind an
//! `Arc<Mutex<T>>`, so async work can keep using an instance while the host
//! thread goes on with other calls.

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{Mutex, MutexGuard};

use crate::args::{BoundArgs, CallFrame, ParamSpec, bind};
use crate::codec::{HostType, Position, decode};
use crate::err::Error;
use crate::host::Host;
use crate::kind::TypeDescriptor;
use crate::native::NativeValue;
use crate::val::{HostValue, ObjectHandle, TypeTag};

/// A native type which can be wrapped into an object handle
pub trait NativeClass: Sized + Send + 'static {
	/// The name the host knows this class by
	const CLASS_NAME: &'static str;

	/// The runtime type tag carried by handles to this class
	fn tag() -> TypeTag {
		TypeTag::of::<Self>(Self::CLASS_NAME)
	}

	/// The descriptor of a parameter holding an instance of this class
	fn descriptor() -> TypeDescriptor {
		TypeDescriptor::Handle(Self::tag())
	}
}

/// A wrapped instance, shared between the host thread and async work
pub type Shared<T> = Arc<Mutex<T>>;

enum Slot {
	Live {
		instance: Arc<dyn Any + Send + Sync>,
		refs: usize,
	},
	Released,
}

/// The instances currently wrapped by a host
///
/// Handle identifiers are never reused: a released slot stays behind as a
/// tombstone so that later access fails with a domain error.
#[derive(Default)]
pub struct HandleTable {
	next: u64,
	slots: HashMap<u64, Slot>,
}

impl HandleTable {
	/// Wrap a native instance, the returned handle holds one reference
	pub fn wrap<T: NativeClass>(&mut self, instance: T) -> ObjectHandle {
		self.next += 1;
		let id = self.next;
		let instance: Arc<dyn Any + Send + Sync> = Arc::new(Mutex::new(instance));
		self.slots.insert(
			id,
			Slot::Live {
				instance,
				refs: 1,
			},
		);
		trace!("Wrapped a {} instance as handle {id}", T::CLASS_NAME);
		ObjectHandle {
			id,
			tag: T::tag(),
		}
	}

	/// Dereference a handle, checking its type tag first
	pub fn get<T: NativeClass>(&self, handle: ObjectHandle) -> Result<Shared<T>, Error> {
		if handle.tag() != T::tag() {
			return Err(Error::invalid_type(
				Position::root(),
				T::CLASS_NAME,
				handle.tag().name(),
			));
		}
		match self.slots.get(&handle.id()) {
			Some(Slot::Live {
				instance,
				..
			}) => instance.clone().downcast::<Mutex<T>>().map_err(|_| {
				Error::invalid_type(Position::root(), T::CLASS_NAME, handle.tag().name())
			}),
			Some(Slot::Released) => Err(Error::Released(handle.to_string())),
			None => Err(Error::UnknownHandle(handle.to_string())),
		}
	}

	/// Add a reference to a live handle, returning the new count
	pub fn retain(&mut self, handle: ObjectHandle) -> Result<usize, Error> {
		match self.slots.get_mut(&handle.id()) {
			Some(Slot::Live {
				refs,
				..
			}) => {
				*refs += 1;
				Ok(*refs)
			}
			Some(Slot::Released) => Err(Error::Released(handle.to_string())),
			None => Err(Error::UnknownHandle(handle.to_string())),
		}
	}

	/// Drop a reference to a live handle, returning the remaining count
	///
	/// The instance is dropped when the count reaches zero.
	pub fn release(&mut self, handle: ObjectHandle) -> Result<usize, Error> {
		let remaining = match self.slots.get_mut(&handle.id()) {
			Some(Slot::Live {
				refs,
				..
			}) => {
				*refs -= 1;
				*refs
			}
			Some(Slot::Released) => return Err(Error::Released(handle.to_string())),
			None => return Err(Error::UnknownHandle(handle.to_string())),
		};
		if remaining == 0 {
			self.slots.insert(handle.id(), Slot::Released);
			debug!("Released object {handle}");
		}
		Ok(remaining)
	}

	/// Drop the instance regardless of its reference count
	///
	/// This is the host-driven finalizer, it is a no-op on handles which were
	/// already released. Returns whether an instance was dropped.
	pub fn finalize(&mut self, handle: ObjectHandle) -> bool {
		match self.slots.get(&handle.id()) {
			Some(Slot::Live {
				..
			}) => {
				self.slots.insert(handle.id(), Slot::Released);
				debug!("Finalized object {handle}");
				true
			}
			_ => false,
		}
	}

	pub fn is_live(&self, handle: ObjectHandle) -> bool {
		matches!(self.slots.get(&handle.id()), Some(Slot::Live { .. }))
	}

	/// The reference count of a live handle
	pub fn ref_count(&self, handle: ObjectHandle) -> Option<usize> {
		match self.slots.get(&handle.id()) {
			Some(Slot::Live {
				refs,
				..
			}) => Some(*refs),
			_ => None,
		}
	}

	/// The number of live instances
	pub fn live(&self) -> usize {
		self.slots.values().filter(|s| matches!(s, Slot::Live { .. })).count()
	}
}

/// The instance a property or method is dispatched on
pub struct This<T> {
	handle: ObjectHandle,
	instance: Shared<T>,
}

impl<T: NativeClass> This<T> {
	fn resolve(host: &Host, handle: ObjectHandle) -> Result<Self, Error> {
		Ok(Self {
			handle,
			instance: host.handles().get::<T>(handle)?,
		})
	}

	pub fn handle(&self) -> ObjectHandle {
		self.handle
	}

	/// Lock the instance for the duration of the returned guard
	pub fn lock(&self) -> MutexGuard<'_, T> {
		self.instance.lock()
	}

	/// A shared reference to the instance, for use by async work
	pub fn shared(&self) -> Shared<T> {
		self.instance.clone()
	}
}

type Constructor<T> = Rc<dyn Fn(&mut Host, BoundArgs) -> Result<T, Error>>;
type Getter<T> = Rc<dyn Fn(&mut Host, &This<T>) -> Result<HostValue, Error>>;
type Setter<T> = Rc<dyn Fn(&mut Host, &This<T>, NativeValue) -> Result<(), Error>>;
type Method<T> = Rc<dyn Fn(&mut Host, This<T>, BoundArgs) -> Result<HostValue, Error>>;

struct Property<T> {
	getter: Option<Getter<T>>,
	setter: Option<(TypeDescriptor, Setter<T>)>,
}

impl<T> Default for Property<T> {
	fn default() -> Self {
		Self {
			getter: None,
			setter: None,
		}
	}
}

/// The dispatch table of a native class
pub struct ClassDef<T: NativeClass> {
	constructor: Option<(Vec<ParamSpec>, Constructor<T>)>,
	properties: IndexMap<String, Property<T>>,
	methods: IndexMap<String, (Vec<ParamSpec>, Method<T>)>,
}

impl<T: NativeClass> Default for ClassDef<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: NativeClass> ClassDef<T> {
	pub fn new() -> Self {
		Self {
			constructor: None,
			properties: IndexMap::new(),
			methods: IndexMap::new(),
		}
	}

	/// Set the constructor-style entry point
	pub fn constructor<F>(mut self, params: Vec<ParamSpec>, f: F) -> Self
	where
		F: Fn(&mut Host, BoundArgs) -> Result<T, Error> + 'static,
	{
		let constructor: Constructor<T> = Rc::new(f);
		self.constructor = Some((params, constructor));
		self
	}

	/// Add a getter returning a value computed from the instance
	pub fn getter<R, F>(mut self, name: &str, f: F) -> Self
	where
		R: HostType,
		F: Fn(&T) -> R + 'static,
	{
		let getter: Getter<T> =
			Rc::new(move |_: &mut Host, this: &This<T>| f(&this.lock()).into_host());
		self.properties.entry(name.to_owned()).or_default().getter = Some(getter);
		self
	}

	/// Add a setter running native logic on the instance
	pub fn setter<V, F>(self, name: &str, f: F) -> Self
	where
		V: HostType,
		F: Fn(&mut T, V) + 'static,
	{
		self.try_setter(name, move |this: &mut T, value: V| {
			f(this, value);
			Ok(())
		})
	}

	/// Add a setter which may reject the assigned value
	pub fn try_setter<V, F>(mut self, name: &str, f: F) -> Self
	where
		V: HostType,
		F: Fn(&mut T, V) -> Result<(), Error> + 'static,
	{
		let setter: Setter<T> = Rc::new(move |_: &mut Host, this: &This<T>, value: NativeValue| {
			f(&mut this.lock(), V::from_native(value)?)
		});
		self.properties.entry(name.to_owned()).or_default().setter =
			Some((V::descriptor(), setter));
		self
	}

	/// Add a method, its arguments are bound against `params`
	pub fn method<F>(mut self, name: &str, params: Vec<ParamSpec>, f: F) -> Self
	where
		F: Fn(&mut Host, This<T>, BoundArgs) -> Result<HostValue, Error> + 'static,
	{
		let method: Method<T> = Rc::new(f);
		self.methods.insert(name.to_owned(), (params, method));
		self
	}

	fn unknown_property(property: &str) -> Error {
		Error::UnknownProperty {
			class: T::CLASS_NAME.to_owned(),
			property: property.to_owned(),
		}
	}
}

/// A class definition with its native type erased
pub(crate) trait ClassDispatch {
	fn name(&self) -> &'static str;

	fn construct(&self, host: &mut Host, frame: CallFrame) -> Result<HostValue, Error>;

	fn get(&self, host: &mut Host, handle: ObjectHandle, property: &str)
	-> Result<HostValue, Error>;

	fn set(
		&self,
		host: &mut Host,
		handle: ObjectHandle,
		property: &str,
		value: HostValue,
	) -> Result<(), Error>;

	fn call(&self, host: &mut Host, method: &str, frame: CallFrame) -> Result<HostValue, Error>;
}

impl<T: NativeClass> ClassDispatch for ClassDef<T> {
	fn name(&self) -> &'static str {
		T::CLASS_NAME
	}

	fn construct(&self, host: &mut Host, frame: CallFrame) -> Result<HostValue, Error> {
		let Some((params, constructor)) = &self.constructor else {
			return Err(Error::NoConstructor(T::CLASS_NAME.to_owned()));
		};
		let args = bind(frame, params)?;
		let instance = constructor(host, args)?;
		Ok(HostValue::Handle(host.handles_mut().wrap(instance)))
	}

	fn get(
		&self,
		host: &mut Host,
		handle: ObjectHandle,
		property: &str,
	) -> Result<HostValue, Error> {
		let entry = self.properties.get(property).ok_or_else(|| Self::unknown_property(property))?;
		let Some(getter) = &entry.getter else {
			return Err(Error::WriteOnly {
				class: T::CLASS_NAME.to_owned(),
				property: property.to_owned(),
			});
		};
		let this = This::<T>::resolve(host, handle)?;
		getter(host, &this)
	}

	fn set(
		&self,
		host: &mut Host,
		handle: ObjectHandle,
		property: &str,
		value: HostValue,
	) -> Result<(), Error> {
		let entry = self.properties.get(property).ok_or_else(|| Self::unknown_property(property))?;
		let Some((ty, setter)) = &entry.setter else {
			return Err(Error::ReadOnly {
				class: T::CLASS_NAME.to_owned(),
				property: property.to_owned(),
			});
		};
		let this = This::<T>::resolve(host, handle)?;
		let value = decode(value, ty, Position::property(property))?;
		setter(host, &this, value)
	}

	fn call(&self, host: &mut Host, method: &str, frame: CallFrame) -> Result<HostValue, Error> {
		let Some((params, f)) = self.methods.get(method) else {
			return Err(Error::UnknownMethod {
				class: T::CLASS_NAME.to_owned(),
				method: method.to_owned(),
			});
		};
		let Some(handle) = frame.this() else {
			return Err(Error::NotAnObject("undefined".to_owned()));
		};
		let this = This::<T>::resolve(host, handle)?;
		let args = bind(frame, params)?;
		f(host, this, args)
	}
}
