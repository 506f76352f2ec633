use std::time::Duration;

use crate::cnf::{HANDOFF_CAPACITY, STREAM_INTERVAL_MS, STREAM_MAX_COUNT, WORKER_THREADS};

/// Configuration for a host and its async bridge
///
/// The defaults come from the `HOSTBIND_*` environment variables, see [`crate::cnf`].
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct HostOptions {
	pub worker_threads: usize,
	pub handoff_capacity: usize,
	pub stream_interval: Duration,
	pub stream_ceiling: usize,
}

impl Default for HostOptions {
	fn default() -> Self {
		Self {
			worker_threads: *WORKER_THREADS,
			handoff_capacity: *HANDOFF_CAPACITY,
			stream_interval: Duration::from_millis(*STREAM_INTERVAL_MS),
			stream_ceiling: *STREAM_MAX_COUNT,
		}
	}
}

impl HostOptions {
	pub fn with_worker_threads(mut self, threads: usize) -> Self {
		self.worker_threads = threads.max(1);
		self
	}
	pub fn with_handoff_capacity(mut self, capacity: usize) -> Self {
		self.handoff_capacity = capacity.max(1);
		self
	}
	pub fn with_stream_interval(mut self, interval: Duration) -> Self {
		self.stream_interval = interval;
		self
	}
	pub fn with_stream_ceiling(mut self, ceiling: usize) -> Self {
		self.stream_ceiling = ceiling;
		self
	}
}
