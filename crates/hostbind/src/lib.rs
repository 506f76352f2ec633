//! Native bindings for a single-threaded host runtime.
//!
//! A native module exports functions and classes to a [`Host`]. Host values
//! are decoded into native values against declared types as they cross the
//! boundary, native results and errors are encoded back. Asynchronous work
//! runs on a pool of worker threads and is handed back to the host thread,
//! which is the only thread ever touching host state.
//!
//! ```
//! use hostbind::{Host, HostValue, Module, NativeFunction, ParamSpec};
//!
//! let mut host = Host::new().unwrap();
//! host.install(Module::new().function(
//! 	NativeFunction::builder("sum")
//! 		.param(ParamSpec::of::<i32>("first"))
//! 		.param(ParamSpec::of::<i32>("second"))
//! 		.returning(|mut args| Ok(args.next::<i32>()? + args.next::<i32>()?)),
//! ));
//! let sum = host.call("sum", vec![1.into(), 2.into()]).unwrap();
//! assert_eq!(sum, HostValue::Number(3.0));
//! ```

#[macro_use]
extern crate tracing;

#[macro_use]
mod mac;

pub mod args;
pub mod bridge;
pub mod class;
pub mod cnf;
pub mod codec;
pub mod err;
pub mod host;
pub mod kind;
pub mod module;
pub mod native;
pub mod options;
pub mod stream;
pub mod val;

pub use self::args::{BoundArgs, CallFrame, ParamSpec};
pub use self::bridge::{AsyncTask, TaskState};
pub use self::class::{ClassDef, HandleTable, NativeClass, Shared, This};
pub use self::codec::{HostType, Position};
pub use self::err::{Error, ErrorKind, Exception};
pub use self::host::Host;
pub use self::kind::{EnumDescriptor, FieldDescriptor, StructDescriptor, TypeDescriptor};
pub use self::module::{FunctionBuilder, Module, NativeFunction, ReturnShape};
pub use self::native::{EnumValue, NativeValue, VariantPayload};
pub use self::options::HostOptions;
pub use self::stream::{StreamSession, StreamState};
pub use self::val::{
	BigInt, Bytes, FunctionRef, HostKind, HostValue, Object, ObjectHandle, PromiseRef, TypeTag,
};

