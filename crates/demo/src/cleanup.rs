//! Cleanup hooks registered from an export.

use std::sync::atomic::{AtomicUsize, Ordering};

use hostbind::{HostValue, Module, NativeFunction};

static CLEANUPS: AtomicUsize = AtomicUsize::new(0);

/// The number of cleanup hooks run so far in this process
pub fn cleanups() -> usize {
	CLEANUPS.load(Ordering::SeqCst)
}

pub fn module() -> Module {
	Module::new().function(NativeFunction::builder("init").handler(|host, _| {
		host.add_cleanup_hook(|| {
			info!("Cleaning up the demo module");
			CLEANUPS.fetch_add(1, Ordering::SeqCst);
		});
		debug!("Initialised the demo module");
		Ok(HostValue::Undefined)
	}))
}
