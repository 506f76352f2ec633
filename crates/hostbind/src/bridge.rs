//! Offloading native work to worker threads and settling it on the host.
//!
//! Workers never see the [`Host`]: everything they produce travels as a
//! [`Handoff`] through a bounded queue, and is only turned into host values
//! when the host drains the queue between turns.

use std::collections::HashMap;
use std::future::Future;

use async_channel::{Receiver, Sender};
use tokio::runtime::{Handle, Runtime};

use crate::codec::HostType;
use crate::err::{Error, Exception};
use crate::host::Host;
use crate::options::HostOptions;
use crate::stream::{StreamSession, StreamState};
use crate::val::{FunctionRef, HostValue, ObjectHandle, PromiseRef};

/// Produces the settled value on the host thread
pub(crate) type Deliver = Box<dyn FnOnce(&mut Host) -> Result<HostValue, Error> + Send>;

/// Produces callback arguments on the host thread
pub(crate) type DeliverArgs = Box<dyn FnOnce(&mut Host) -> Result<Vec<HostValue>, Error> + Send>;

/// A message from a worker to the host thread
pub(crate) enum Handoff {
	/// A task was picked up by a worker
	Started(u64),
	/// A task finished, successfully or not
	Settle {
		task: u64,
		outcome: Result<Deliver, Error>,
	},
	/// A host callback must be invoked, once for a callback-style task or
	/// once per item for a stream session
	Invoke {
		callback: FunctionRef,
		args: Result<DeliverArgs, Error>,
		session: Option<u64>,
	},
	/// A stream session emitted its last item
	Complete(u64),
	/// A stream session source failed
	Fail {
		session: u64,
		error: Error,
	},
}

/// The lifecycle of an asynchronous task
#[derive(Clone, Debug, PartialEq)]
pub enum TaskState {
	Pending,
	Running,
	Resolved(HostValue),
	Rejected(Exception),
}

impl TaskState {
	pub fn is_settled(&self) -> bool {
		matches!(self, TaskState::Resolved(_) | TaskState::Rejected(_))
	}
}

/// An asynchronous task and the promise it settles
#[derive(Clone, Debug, PartialEq)]
pub struct AsyncTask {
	pub id: PromiseRef,
	pub state: TaskState,
}

/// The worker runtime, the handoff queue, and the task and session tables
pub struct Bridge {
	runtime: Option<Runtime>,
	handle: Handle,
	sender: Sender<Handoff>,
	receiver: Receiver<Handoff>,
	tasks: HashMap<u64, AsyncTask>,
	pub(crate) sessions: HashMap<u64, StreamSession>,
	next_id: u64,
	outstanding: usize,
}

impl Bridge {
	pub(crate) fn new(options: &HostOptions) -> Result<Self, Error> {
		let runtime = tokio::runtime::Builder::new_multi_thread()
			.worker_threads(options.worker_threads.max(1))
			.thread_name("hostbind-worker")
			.enable_time()
			.build()
			.map_err(|e| Error::Runtime(e.to_string()))?;
		let handle = runtime.handle().clone();
		let (sender, receiver) = async_channel::bounded(options.handoff_capacity.max(1));
		debug!(
			"Started the bridge with {} worker threads and a handoff capacity of {}",
			options.worker_threads, options.handoff_capacity
		);
		Ok(Self {
			runtime: Some(runtime),
			handle,
			sender,
			receiver,
			tasks: HashMap::new(),
			sessions: HashMap::new(),
			next_id: 0,
			outstanding: 0,
		})
	}

	pub(crate) fn next_id(&mut self) -> u64 {
		self.next_id += 1;
		self.next_id
	}

	/// The number of tasks and sessions which will still deliver
	pub fn outstanding(&self) -> usize {
		self.outstanding
	}

	pub(crate) fn begin(&mut self) {
		self.outstanding += 1;
	}

	fn finish(&mut self) {
		self.outstanding = self.outstanding.saturating_sub(1);
	}

	pub(crate) fn sender(&self) -> Sender<Handoff> {
		self.sender.clone()
	}

	pub(crate) fn try_recv(&self) -> Option<Handoff> {
		self.receiver.try_recv().ok()
	}

	pub(crate) fn recv_blocking(&self) -> Result<Handoff, Error> {
		self.receiver.recv_blocking().map_err(|_| Error::HandoffClosed)
	}

	/// Run `work` on the worker runtime and send `finish(outcome)` to the host
	///
	/// A panicking task is reported as a failed outcome, so every started
	/// piece of work delivers exactly once.
	pub(crate) fn run<F, T, D>(&self, work: F, started: Option<u64>, finish: D)
	where
		F: Future<Output = Result<T, Error>> + Send + 'static,
		T: Send + 'static,
		D: FnOnce(Result<T, Error>) -> Handoff + Send + 'static,
	{
		let sender = self.sender.clone();
		let work = self.handle.spawn(work);
		self.handle.spawn(async move {
			if let Some(task) = started {
				if sender.send(Handoff::Started(task)).await.is_err() {
					warn!("The handoff queue was closed before task {task} was marked running");
				}
			}
			let outcome = match work.await {
				Ok(outcome) => outcome,
				Err(e) => Err(Error::Worker(e.to_string())),
			};
			if sender.send(finish(outcome)).await.is_err() {
				error!("The handoff queue was closed before a result could be delivered");
			}
		});
	}

	/// Run a blocking closure on the worker runtime's blocking pool
	pub(crate) fn run_blocking<W, T, D>(&self, work: W, started: Option<u64>, finish: D)
	where
		W: FnOnce() -> Result<T, Error> + Send + 'static,
		T: Send + 'static,
		D: FnOnce(Result<T, Error>) -> Handoff + Send + 'static,
	{
		let work = self.handle.spawn_blocking(work);
		self.run(
			async move {
				match work.await {
					Ok(outcome) => outcome,
					Err(e) => Err(Error::Worker(e.to_string())),
				}
			},
			started,
			finish,
		)
	}

	fn create_task(&mut self) -> u64 {
		let id = self.next_id();
		self.tasks.insert(
			id,
			AsyncTask {
				id: PromiseRef(id),
				state: TaskState::Pending,
			},
		);
		self.begin();
		id
	}

	fn settle(&mut self, id: u64, state: TaskState) {
		match self.tasks.get_mut(&id) {
			Some(task) if task.state.is_settled() => {
				warn!("Ignoring a second settlement of promise {id}");
			}
			Some(task) => {
				debug!("Settled promise {id}");
				task.state = state;
			}
			None => warn!("Ignoring the settlement of unknown promise {id}"),
		}
	}

	pub(crate) fn task(&self, id: PromiseRef) -> Option<&AsyncTask> {
		self.tasks.get(&id.id())
	}

	pub(crate) fn open_session(&mut self, handle: Option<ObjectHandle>, max_count: usize) -> u64 {
		let id = self.next_id();
		self.sessions.insert(id, StreamSession::new(id, handle, max_count));
		id
	}

	fn forget_task(&mut self, id: u64) -> bool {
		let removed = self.tasks.remove(&id);
		if let Some(task) = &removed {
			if !task.state.is_settled() {
				debug!("Released promise {id} before it settled, its result will be dropped");
			}
		}
		removed.is_some()
	}
}

impl Drop for Bridge {
	fn drop(&mut self) {
		if let Some(runtime) = self.runtime.take() {
			// Work still in flight is abandoned, it can no longer be delivered
			runtime.shutdown_background();
		}
	}
}

impl Host {
	/// Submit asynchronous work, returning the promise it settles
	///
	/// `work` runs on a worker thread; `encoder` runs on the host thread when
	/// the result is delivered, and may touch host state (for example to
	/// wrap a new object).
	pub fn submit<F, T, E>(&mut self, work: F, encoder: E) -> HostValue
	where
		F: Future<Output = Result<T, Error>> + Send + 'static,
		T: Send + 'static,
		E: FnOnce(&mut Host, T) -> Result<HostValue, Error> + Send + 'static,
	{
		let id = self.bridge.create_task();
		trace!("Submitting task {id}");
		self.bridge.run(work, Some(id), move |outcome: Result<T, Error>| Handoff::Settle {
			task: id,
			outcome: outcome.map(|value| {
				Box::new(move |host: &mut Host| encoder(host, value)) as Deliver
			}),
		});
		HostValue::Promise(PromiseRef(id))
	}

	/// Submit asynchronous work whose result converts on its own
	pub fn submit_value<F, T>(&mut self, work: F) -> HostValue
	where
		F: Future<Output = Result<T, Error>> + Send + 'static,
		T: HostType + Send + 'static,
	{
		self.submit(work, |_, value: T| value.into_host())
	}

	/// Submit a blocking closure, returning the promise it settles
	pub fn submit_blocking<W, T>(&mut self, work: W) -> HostValue
	where
		W: FnOnce() -> Result<T, Error> + Send + 'static,
		T: HostType + Send + 'static,
	{
		let id = self.bridge.create_task();
		trace!("Submitting blocking task {id}");
		self.bridge.run_blocking(work, Some(id), move |outcome: Result<T, Error>| {
			Handoff::Settle {
				task: id,
				outcome: outcome.map(|value| {
					Box::new(move |_: &mut Host| value.into_host()) as Deliver
				}),
			}
		});
		HostValue::Promise(PromiseRef(id))
	}

	/// Submit asynchronous work which invokes `callback` on completion
	///
	/// The callback runs on the host thread with the arguments produced by
	/// `encoder`. A failure is reported as an uncaught exception.
	pub fn submit_callback<F, T, E>(&mut self, work: F, callback: FunctionRef, encoder: E)
	where
		F: Future<Output = Result<T, Error>> + Send + 'static,
		T: Send + 'static,
		E: FnOnce(&mut Host, T) -> Result<Vec<HostValue>, Error> + Send + 'static,
	{
		self.bridge.begin();
		trace!("Submitting callback task for {callback}");
		self.bridge.run(work, None, move |outcome: Result<T, Error>| Handoff::Invoke {
			callback,
			args: outcome.map(|value| {
				Box::new(move |host: &mut Host| encoder(host, value)) as DeliverArgs
			}),
			session: None,
		});
	}

	/// The task behind a promise value
	pub fn promise(&self, promise: &HostValue) -> Option<&AsyncTask> {
		promise.as_promise().and_then(|id| self.bridge.task(id))
	}

	/// The state of the task behind a promise value
	pub fn promise_state(&self, promise: &HostValue) -> Option<&TaskState> {
		self.promise(promise).map(|task| &task.state)
	}

	/// Forget the task behind a promise value
	///
	/// A task released before it settles still runs to completion, its
	/// result is dropped on delivery. Returns whether a task was removed.
	pub fn release_promise(&mut self, promise: &HostValue) -> bool {
		promise.as_promise().is_some_and(|id| self.bridge.forget_task(id.id()))
	}

	/// The number of tasks and stream sessions which will still deliver
	pub fn outstanding(&self) -> usize {
		self.bridge.outstanding()
	}

	/// Deliver every handoff currently queued, without waiting
	///
	/// Returns the number of deliveries made.
	pub fn run_pending(&mut self) -> usize {
		let mut delivered = 0;
		while let Some(handoff) = self.bridge.try_recv() {
			self.deliver(handoff);
			delivered += 1;
		}
		delivered
	}

	/// Wait for and deliver handoffs until no task or session is outstanding
	pub fn run_until_idle(&mut self) {
		while self.bridge.outstanding() > 0 {
			match self.bridge.recv_blocking() {
				Ok(handoff) => self.deliver(handoff),
				Err(e) => {
					error!("Stopped waiting for outstanding work: {e}");
					break;
				}
			}
		}
		self.run_pending();
	}

	/// Wait for and deliver handoffs until `promise` is settled
	///
	/// Any other value is returned as it is, like awaiting a non-promise.
	pub fn run_until_settled(&mut self, promise: &HostValue) -> Result<HostValue, Exception> {
		let Some(id) = promise.as_promise() else {
			return Ok(promise.clone());
		};
		loop {
			match self.bridge.task(id).map(|task| &task.state) {
				None => return Err(Error::UnknownPromise(id.id()).into()),
				Some(TaskState::Resolved(value)) => return Ok(value.clone()),
				Some(TaskState::Rejected(exception)) => return Err(exception.clone()),
				Some(TaskState::Pending | TaskState::Running) => {}
			}
			if self.bridge.outstanding() == 0 {
				return Err(Error::HandoffClosed.into());
			}
			let handoff = self.bridge.recv_blocking()?;
			self.deliver(handoff);
		}
	}

	fn deliver(&mut self, handoff: Handoff) {
		match handoff {
			Handoff::Started(id) => {
				if let Some(task) = self.bridge.tasks.get_mut(&id) {
					if task.state == TaskState::Pending {
						task.state = TaskState::Running;
					}
				}
			}
			Handoff::Settle {
				task,
				outcome,
			} => {
				self.bridge.finish();
				let state = match outcome.and_then(|deliver| deliver(self)) {
					Ok(value) => TaskState::Resolved(value),
					Err(error) => TaskState::Rejected(error.into()),
				};
				self.bridge.settle(task, state);
			}
			Handoff::Invoke {
				callback,
				args,
				session: None,
			} => {
				self.bridge.finish();
				let result = args.and_then(|args| args(self));
				if let Err(error) = result.and_then(|args| self.invoke(callback, args)) {
					self.report(error);
				}
			}
			Handoff::Invoke {
				callback,
				args,
				session: Some(session),
			} => {
				let active = self
					.bridge
					.sessions
					.get(&session)
					.is_some_and(|s| s.state == StreamState::Active);
				if !active {
					warn!("Dropping an emission for inactive stream session {session}");
					return;
				}
				let result = args.and_then(|args| args(self));
				match result.and_then(|args| self.invoke(callback, args)) {
					Ok(_) => {
						if let Some(s) = self.bridge.sessions.get_mut(&session) {
							s.emitted += 1;
						}
					}
					Err(error) => {
						if let Some(s) = self.bridge.sessions.get_mut(&session) {
							s.state = StreamState::Errored;
						}
						self.report(error);
					}
				}
			}
			Handoff::Complete(session) => {
				self.bridge.finish();
				if let Some(s) = self.bridge.sessions.get_mut(&session) {
					if s.state == StreamState::Active {
						debug!("Stream session {session} completed after {} items", s.emitted);
						s.state = StreamState::Completed;
					}
				}
			}
			Handoff::Fail {
				session,
				error,
			} => {
				self.bridge.finish();
				if let Some(s) = self.bridge.sessions.get_mut(&session) {
					s.state = StreamState::Errored;
				}
				self.report(error);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::*;

	fn host() -> Host {
		Host::with_options(HostOptions::default().with_worker_threads(2)).unwrap()
	}

	#[test_log::test]
	fn settles_on_the_host_turn() {
		let mut host = host();
		let promise = host.submit_value(async { Ok(5 + 10) });
		assert!(!host.promise_state(&promise).unwrap().is_settled());
		assert_eq!(host.run_until_settled(&promise).unwrap(), HostValue::Number(15.0));
		assert_eq!(host.bridge.outstanding(), 0);
	}

	#[test_log::test]
	fn settles_in_completion_order() {
		let mut host = host();
		let slow = host.submit_value(async {
			tokio::time::sleep(Duration::from_millis(300)).await;
			Ok("slow".to_owned())
		});
		let fast = host.submit_value(async { Ok("fast".to_owned()) });
		assert_eq!(host.run_until_settled(&fast).unwrap(), HostValue::from("fast"));
		assert!(!host.promise_state(&slow).unwrap().is_settled());
		host.run_until_idle();
		assert_eq!(host.promise_state(&slow), Some(&TaskState::Resolved("slow".into())));
	}

	#[test_log::test]
	fn released_promises_leave_the_task_table() {
		let mut host = host();
		let promises: Vec<HostValue> =
			(0..50).map(|i| host.submit_value(async move { Ok(i) })).collect();
		host.run_until_idle();
		assert_eq!(host.bridge.tasks.len(), 50);
		for promise in &promises {
			assert!(host.release_promise(promise));
		}
		assert!(host.bridge.tasks.is_empty());
		assert!(!host.release_promise(&promises[0]));
		assert!(host.promise_state(&promises[0]).is_none());
	}

	#[test_log::test]
	fn a_promise_released_while_pending_drops_its_result() {
		let mut host = host();
		let promise = host.submit_value(async {
			tokio::time::sleep(Duration::from_millis(20)).await;
			Ok(1)
		});
		assert!(host.release_promise(&promise));
		host.run_until_idle();
		assert_eq!(host.outstanding(), 0);
		assert!(host.bridge.tasks.is_empty());
		let err = host.run_until_settled(&promise).unwrap_err();
		assert!(matches!(err.error, Error::UnknownPromise(_)));
	}

	#[test_log::test]
	fn failures_reject_with_the_encoded_payload() {
		let mut host = host();
		let promise = host.submit_value(async { Err::<f64, _>(Error::domain("arg is negative")) });
		let exception = host.run_until_settled(&promise).unwrap_err();
		assert_eq!(exception.message(), Some("arg is negative"));
	}

	#[test_log::test]
	fn panicking_work_still_settles() {
		let mut host = host();
		let promise = host.submit_value(async {
			if true {
				panic!("worker exploded");
			}
			Ok(1)
		});
		let exception = host.run_until_settled(&promise).unwrap_err();
		assert!(matches!(exception.error, Error::Worker(_)));
	}

	#[test_log::test]
	fn blocking_work_runs_off_the_host_thread() {
		let mut host = host();
		let promise = host.submit_blocking(|| {
			std::thread::sleep(Duration::from_millis(20));
			Ok(std::thread::current().name().map(str::to_owned))
		});
		let value = host.run_until_settled(&promise).unwrap();
		assert_eq!(value, HostValue::from("hostbind-worker"));
	}

	#[test_log::test]
	fn callbacks_run_on_the_host_thread() {
		let mut host = host();
		let host_thread = std::thread::current().id();
		let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
		let sink = seen.clone();
		let callback = host.create_function(move |_, args| {
			assert_eq!(std::thread::current().id(), host_thread);
			sink.borrow_mut().extend(args);
			Ok(HostValue::Undefined)
		});
		let callback = callback.as_callable().unwrap();
		host.submit_callback(async { Ok(3.0) }, callback, |_, seconds: f64| {
			Ok(vec![seconds.into(), (seconds * 2.0).into()])
		});
		host.run_until_idle();
		assert_eq!(*seen.borrow(), vec![HostValue::Number(3.0), HostValue::Number(6.0)]);
	}
}
