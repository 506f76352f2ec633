use std::sync::LazyLock;

/// The magnitude from which wide integers are carried as arbitrary-precision
/// integers rather than doubles (2^53).
pub const SAFE_INTEGER_THRESHOLD: u64 = 1 << 53;

/// Specifies how many worker threads the bridge runtime starts
pub static WORKER_THREADS: LazyLock<usize> =
	lazy_env_parse!("HOSTBIND_WORKER_THREADS", usize, || num_cpus::get().max(1));

/// Specifies how many deliveries can wait in the handoff queue before workers back off
pub static HANDOFF_CAPACITY: LazyLock<usize> =
	lazy_env_parse!("HOSTBIND_HANDOFF_CAPACITY", usize, 1024);

/// Specifies the pacing interval between two stream emissions (default: 100 milliseconds)
pub static STREAM_INTERVAL_MS: LazyLock<u64> =
	lazy_env_parse!("HOSTBIND_STREAM_INTERVAL_MS", u64, 100);

/// Specifies the largest item count a stream session may be opened with
pub static STREAM_MAX_COUNT: LazyLock<usize> =
	lazy_env_parse!("HOSTBIND_STREAM_MAX_COUNT", usize, 10);
