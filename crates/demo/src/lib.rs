//! Example exports built on `hostbind`.
//!
//! Each submodule builds one [`Module`](hostbind::Module), to be installed
//! into a [`Host`](hostbind::Host) on its own or next to the others.
//! Exports which wait before completing use the delay configured by
//! `HOSTBIND_DEMO_DELAY_MS`, or the one passed to their `module_with`.

#[macro_use]
extern crate tracing;

pub mod array;
pub mod async_cb;
pub mod bigint;
pub mod buffer;
pub mod callback;
pub mod class;
pub mod cleanup;
pub mod function;
pub mod hash;
pub mod identifier;
pub mod json;
pub mod option;
pub mod param;
pub mod promise;
pub mod stream;
pub mod tuples;

use std::sync::LazyLock;
use std::time::Duration;

/// The delay used by exports simulating slow work
pub static DELAY_MS: LazyLock<u64> =
	hostbind::lazy_env_parse!("HOSTBIND_DEMO_DELAY_MS", u64, 1000);

pub(crate) fn default_delay() -> Duration {
	Duration::from_millis(*DELAY_MS)
}
