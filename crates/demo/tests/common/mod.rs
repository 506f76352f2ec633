#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use hostbind::{Host, HostOptions, HostValue, Module};

/// The delay used by demo exports under test
pub const DELAY: Duration = Duration::from_millis(10);

/// A host with `module` installed, pacing streams quickly
pub fn host(module: Module) -> Host {
	let options = HostOptions::default()
		.with_worker_threads(2)
		.with_stream_interval(Duration::from_millis(2))
		.with_stream_ceiling(10);
	let mut host = Host::with_options(options).unwrap();
	host.install(module);
	host
}

/// A host function recording the arguments of every call
pub fn recorder(host: &mut Host) -> (HostValue, Rc<RefCell<Vec<Vec<HostValue>>>>) {
	let calls = Rc::new(RefCell::new(Vec::new()));
	let sink = calls.clone();
	let f = host.create_function(move |_, args| {
		sink.borrow_mut().push(args);
		Ok(HostValue::Undefined)
	});
	(f, calls)
}
