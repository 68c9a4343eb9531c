use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::channel::{Receiver, Sender};
use crate::signal::Signal;

/// One pending operation inside a descriptor.
trait Case {
    /// Claims the operation if its channel can service it right now,
    /// re-checking readiness under the channel's own mutex. On success
    /// the value is delivered and the case callback runs.
    fn fire(&mut self) -> bool;

    /// Non-claiming readiness probe, used to close the race between a
    /// failed scan and parking.
    fn is_ready(&self) -> bool;

    fn subscribe(&self, signal: &Arc<Signal>);

    fn unsubscribe(&self, signal: &Arc<Signal>);
}

struct RecvCase<'a, T, const N: usize> {
    source: Receiver<T, N>,
    slot: &'a mut T,
    after: Option<Box<dyn FnOnce() + 'a>>,
}

impl<T, const N: usize> Case for RecvCase<'_, T, N> {
    fn fire(&mut self) -> bool {
        match self.source.core.try_take() {
            Some(value) => {
                *self.slot = value;
                if let Some(after) = self.after.take() {
                    after();
                }
                true
            }
            None => false,
        }
    }

    fn is_ready(&self) -> bool {
        self.source.core.is_recv_ready()
    }

    fn subscribe(&self, signal: &Arc<Signal>) {
        self.source.core.subscribe(signal);
    }

    fn unsubscribe(&self, signal: &Arc<Signal>) {
        self.source.core.unsubscribe(signal);
    }
}

struct RecvWithCase<'a, T, const N: usize> {
    source: Receiver<T, N>,
    deliver: Option<Box<dyn FnOnce(T) + 'a>>,
}

impl<T, const N: usize> Case for RecvWithCase<'_, T, N> {
    fn fire(&mut self) -> bool {
        match self.source.core.try_take() {
            Some(value) => {
                let deliver = self.deliver.take().expect("case fired twice");
                deliver(value);
                true
            }
            None => false,
        }
    }

    fn is_ready(&self) -> bool {
        self.source.core.is_recv_ready()
    }

    fn subscribe(&self, signal: &Arc<Signal>) {
        self.source.core.subscribe(signal);
    }

    fn unsubscribe(&self, signal: &Arc<Signal>) {
        self.source.core.unsubscribe(signal);
    }
}

struct SendCase<'a, T, const N: usize> {
    target: Sender<T, N>,
    value: Option<T>,
    after: Option<Box<dyn FnOnce() + 'a>>,
}

impl<T, const N: usize> Case for SendCase<'_, T, N> {
    fn fire(&mut self) -> bool {
        let value = match self.value.take() {
            Some(value) => value,
            None => return false,
        };
        match self.target.core.send_if_ready(value) {
            Ok(()) => {
                if let Some(after) = self.after.take() {
                    after();
                }
                true
            }
            Err(value) => {
                self.value = Some(value);
                false
            }
        }
    }

    fn is_ready(&self) -> bool {
        self.target.core.is_send_ready()
    }

    fn subscribe(&self, signal: &Arc<Signal>) {
        self.target.core.subscribe(signal);
    }

    fn unsubscribe(&self, signal: &Arc<Signal>) {
        self.target.core.unsubscribe(signal);
    }
}

/// A set of candidate channel operations of which exactly one fires.
///
/// Cases are added by the chaining factories and examined in insertion
/// order; when several are ready at once, the first declared wins. The
/// descriptor is consumed by exactly one completion call: [`wait`],
/// [`wait_for`] or [`try_once`]. Cases that do not fire take nothing from
/// their channels and deposit nothing into them.
///
/// A descriptor must not contain both ends of the same channel: a fired
/// send case performs the full send, including the rendezvous
/// acknowledgement, which a receive case in the same descriptor can never
/// provide.
///
/// [`wait`]: Select::wait
/// [`wait_for`]: Select::wait_for
/// [`try_once`]: Select::try_once
///
/// # Example
///
/// ```
/// use gochan::{Channel, Select};
///
/// let ready = Channel::<u32, 1>::new();
/// let idle = Channel::<u32>::new();
/// ready.send(42);
///
/// let mut got = 0;
/// Select::new()
///     .recv_only(&ready, &mut got)
///     .recv_with(&idle, |_| unreachable!())
///     .wait();
/// assert_eq!(got, 42);
/// ```
pub struct Select<'a> {
    cases: Vec<Box<dyn Case + 'a>>,
}

impl<'a> Select<'a> {
    /// Creates an empty descriptor.
    pub fn new() -> Self {
        Self { cases: Vec::new() }
    }

    /// Adds a receive case that stores the value through `slot`.
    pub fn recv_only<T: 'a, const N: usize>(
        self,
        source: impl Into<Receiver<T, N>>,
        slot: &'a mut T,
    ) -> Self {
        self.push(RecvCase {
            source: source.into(),
            slot,
            after: None,
        })
    }

    /// Adds a receive case that stores the value through `slot` and then
    /// runs `after`.
    pub fn recv_then<T: 'a, const N: usize>(
        self,
        source: impl Into<Receiver<T, N>>,
        slot: &'a mut T,
        after: impl FnOnce() + 'a,
    ) -> Self {
        self.push(RecvCase {
            source: source.into(),
            slot,
            after: Some(Box::new(after)),
        })
    }

    /// Adds a receive case that hands the value to `deliver`.
    pub fn recv_with<T: 'a, const N: usize>(
        self,
        source: impl Into<Receiver<T, N>>,
        deliver: impl FnOnce(T) + 'a,
    ) -> Self {
        self.push(RecvWithCase {
            source: source.into(),
            deliver: Some(Box::new(deliver)),
        })
    }

    /// Adds a send case transmitting `value`.
    pub fn send_only<T: 'a, const N: usize>(
        self,
        target: impl Into<Sender<T, N>>,
        value: T,
    ) -> Self {
        self.push(SendCase {
            target: target.into(),
            value: Some(value),
            after: None,
        })
    }

    /// Adds a send case transmitting `value`, running `after` once the
    /// send has completed.
    pub fn send_then<T: 'a, const N: usize>(
        self,
        target: impl Into<Sender<T, N>>,
        value: T,
        after: impl FnOnce() + 'a,
    ) -> Self {
        self.push(SendCase {
            target: target.into(),
            value: Some(value),
            after: Some(Box::new(after)),
        })
    }

    fn push(mut self, case: impl Case + 'a) -> Self {
        self.cases.push(Box::new(case));
        self
    }

    /// One scan over the cases in insertion order; true once a case fires.
    fn fire_one(&mut self) -> bool {
        self.cases.iter_mut().any(|case| case.fire())
    }

    /// Blocks until exactly one case fires.
    ///
    /// A descriptor with no cases blocks forever.
    pub fn wait(mut self) {
        let waiter = Arc::new(Signal::new());
        loop {
            if self.fire_one() {
                return;
            }
            for case in &self.cases {
                case.subscribe(&waiter);
            }
            // Re-check readiness; a deposit may have landed between the
            // failed scan and the subscription.
            if !self.cases.iter().any(|case| case.is_ready()) {
                waiter.wait();
            }
            for case in &self.cases {
                case.unsubscribe(&waiter);
            }
            waiter.reset();
        }
    }

    /// Like [`wait`](Select::wait), but gives up once `timeout` has
    /// elapsed. Returns true if a case fired, false on timeout; on
    /// timeout no case has fired and no channel has been touched.
    pub fn wait_for(mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let waiter = Arc::new(Signal::new());
        loop {
            if self.fire_one() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            for case in &self.cases {
                case.subscribe(&waiter);
            }
            let expired = if self.cases.iter().any(|case| case.is_ready()) {
                false
            } else {
                !waiter.wait_deadline(deadline)
            };
            for case in &self.cases {
                case.unsubscribe(&waiter);
            }
            waiter.reset();
            if expired {
                return false;
            }
        }
    }

    /// Examines each case at most once and returns whether one fired.
    ///
    /// Never blocks while scanning; note that a fired send case still
    /// performs the full send, so on a synchronous channel it waits for
    /// its receiver like any other send.
    pub fn try_once(mut self) -> bool {
        self.fire_one()
    }
}

impl Default for Select<'_> {
    fn default() -> Self {
        Self::new()
    }
}
