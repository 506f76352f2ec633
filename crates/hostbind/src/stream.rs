//! Time-paced delivery of sequential values to a host callback.

use std::time::Duration;

use futures::{Stream, StreamExt};

use crate::bridge::{DeliverArgs, Handoff};
use crate::codec::HostType;
use crate::err::Error;
use crate::host::Host;
use crate::val::{FunctionRef, HostValue, ObjectHandle};

/// The lifecycle of a stream session
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StreamState {
	Active,
	Completed,
	Errored,
}

/// One opened stream, owned by the async bridge
#[derive(Clone, Debug, PartialEq)]
pub struct StreamSession {
	pub id: u64,
	/// The object the stream was opened on, if any
	pub handle: Option<ObjectHandle>,
	pub max_count: usize,
	/// The number of items delivered to the callback so far
	pub emitted: usize,
	pub state: StreamState,
	started: bool,
}

impl StreamSession {
	pub(crate) fn new(id: u64, handle: Option<ObjectHandle>, max_count: usize) -> Self {
		Self {
			id,
			handle,
			max_count,
			emitted: 0,
			state: StreamState::Active,
			started: false,
		}
	}
}

/// Emits `0..count`, waiting `interval` before each item
pub fn paced_counter(
	count: usize,
	interval: Duration,
) -> impl Stream<Item = Result<i64, Error>> + Send + 'static {
	futures::stream::iter(0..count as i64).then(move |i| async move {
		tokio::time::sleep(interval).await;
		Ok(i)
	})
}

impl Host {
	/// Open a stream session of `max_count` items
	///
	/// The count is checked against the configured ceiling before anything
	/// is scheduled.
	pub fn open_stream(
		&mut self,
		handle: Option<ObjectHandle>,
		max_count: usize,
	) -> Result<u64, Error> {
		let ceiling = self.options().stream_ceiling;
		if max_count > ceiling {
			return Err(Error::StreamCeiling {
				count: max_count,
				ceiling,
			});
		}
		let id = self.bridge.open_session(handle, max_count);
		debug!("Opened stream session {id} for {max_count} items");
		Ok(id)
	}

	/// Start emitting `0..max_count` into `callback`, paced by the configured interval
	pub fn start_stream(&mut self, session: u64, callback: FunctionRef) -> Result<(), Error> {
		let (count, interval) = self.paced_source(session)?;
		self.pump(session, callback, None, paced_counter(count, interval))
	}

	/// Like [`Host::start_stream`], invoking `callback(event, value)` for each item
	pub fn start_event_stream(
		&mut self,
		session: u64,
		event: &str,
		callback: FunctionRef,
	) -> Result<(), Error> {
		let (count, interval) = self.paced_source(session)?;
		self.pump(session, callback, Some(event.to_owned()), paced_counter(count, interval))
	}

	/// Start emitting the items of `source` into `callback`
	///
	/// Each item invokes the callback once, on the host thread. A source
	/// error, or a callback which raises, ends the session as errored.
	pub fn start_stream_with<S, T>(
		&mut self,
		session: u64,
		callback: FunctionRef,
		source: S,
	) -> Result<(), Error>
	where
		S: Stream<Item = Result<T, Error>> + Send + 'static,
		T: HostType + Send + 'static,
	{
		self.pump(session, callback, None, source)
	}

	fn paced_source(&self, session: u64) -> Result<(usize, Duration), Error> {
		let count = self.stream_session(session).ok_or(Error::UnknownStream(session))?.max_count;
		Ok((count, self.options().stream_interval))
	}

	fn pump<S, T>(
		&mut self,
		session: u64,
		callback: FunctionRef,
		event: Option<String>,
		source: S,
	) -> Result<(), Error>
	where
		S: Stream<Item = Result<T, Error>> + Send + 'static,
		T: HostType + Send + 'static,
	{
		let entry = self.bridge.sessions.get_mut(&session).ok_or(Error::UnknownStream(session))?;
		if entry.started {
			return Err(Error::StreamStarted(session));
		}
		entry.started = true;
		self.bridge.begin();
		let sender = self.bridge.sender();
		let pump = async move {
			let mut source = Box::pin(source);
			while let Some(item) = source.next().await {
				let value = item?;
				let event = event.clone();
				let args: DeliverArgs =
					Box::new(move |_: &mut Host| -> Result<Vec<HostValue>, Error> {
						let mut args = Vec::with_capacity(2);
						if let Some(event) = event {
							args.push(HostValue::from(event));
						}
						args.push(value.into_host()?);
						Ok(args)
					});
				let handoff = Handoff::Invoke {
					callback,
					args: Ok(args),
					session: Some(session),
				};
				sender.send(handoff).await.map_err(|_| Error::HandoffClosed)?;
			}
			Ok::<(), Error>(())
		};
		self.bridge.run(pump, None, move |outcome: Result<(), Error>| match outcome {
			Ok(()) => Handoff::Complete(session),
			Err(error) => Handoff::Fail {
				session,
				error,
			},
		});
		Ok(())
	}

	/// Forget a stream session
	///
	/// Items still in flight for a released session are dropped on delivery.
	/// Returns whether a session was removed.
	pub fn release_stream(&mut self, session: u64) -> bool {
		let removed = self.bridge.sessions.remove(&session).is_some();
		if removed {
			debug!("Released stream session {session}");
		}
		removed
	}

	/// The session with the given identifier
	pub fn stream_session(&self, session: u64) -> Option<&StreamSession> {
		self.bridge.sessions.get(&session)
	}
}
