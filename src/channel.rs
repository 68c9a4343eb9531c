use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use crate::signal::Signal;

/// Channel state guarded by the core mutex.
///
/// Elements are tagged with the depositing thread so a receiver draining a
/// full buffer can assert it is not taking its own in-flight handoff.
struct State<T> {
    buffer: VecDeque<(ThreadId, T)>,
    /// True from a sender's deposit until that sender has observed the
    /// buffer drop back below full.
    send_in_progress: bool,
}

/// The queue shared by every handle of one channel.
///
/// Senders are serialised at the handoff boundary by `send_in_progress`:
/// only one sender at a time is past its deposit and awaiting
/// acknowledgement, so insertion order equals deposit completion order and
/// the buffer never holds more than `N + 1` elements.
pub(crate) struct Core<T, const N: usize> {
    state: Mutex<State<T>>,
    /// Senders gated before their deposit.
    send_begin: Condvar,
    /// The one sender awaiting acknowledgement of its deposit.
    send_end: Condvar,
    /// Receivers waiting for the buffer to become non-empty.
    readable: Condvar,
    /// Select waiters watching this channel.
    subscribers: Mutex<Vec<Arc<Signal>>>,
}

impl<T, const N: usize> Core<T, N> {
    fn new() -> Self {
        Self {
            state: Mutex::new(State {
                buffer: VecDeque::new(),
                send_in_progress: false,
            }),
            send_begin: Condvar::new(),
            send_end: Condvar::new(),
            readable: Condvar::new(),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Blocking send: deposit, then wait for acknowledgement.
    fn send(&self, value: T) {
        let mut state = self.state.lock();
        self.send_begin
            .wait_while(&mut state, |s| s.buffer.len() > N || s.send_in_progress);
        state.buffer.push_back((thread::current().id(), value));
        state.send_in_progress = true;
        drop(state);
        // Wake waiters only after the lock is released.
        self.readable.notify_one();
        self.notify_subscribers();

        self.acknowledge();
    }

    /// Deposits only if a sender could proceed right now, otherwise hands
    /// the value back untouched. On success the full acknowledgement phase
    /// runs, exactly as for a blocking send. This is select's claim step.
    pub(crate) fn send_if_ready(&self, value: T) -> Result<(), T> {
        let mut state = self.state.lock();
        if state.buffer.len() > N || state.send_in_progress {
            return Err(value);
        }
        state.buffer.push_back((thread::current().id(), value));
        state.send_in_progress = true;
        drop(state);
        self.readable.notify_one();
        self.notify_subscribers();

        self.acknowledge();
        Ok(())
    }

    /// Acknowledgement step of a send: wait until the deposited element
    /// no longer overflows the buffer, then release the next gated
    /// sender.
    ///
    /// `send_in_progress` is set by the caller, so no other sender can
    /// refill the buffer in between; `!full` alone is a sufficient
    /// condition here.
    fn acknowledge(&self) {
        let mut state = self.state.lock();
        self.send_end.wait_while(&mut state, |s| s.buffer.len() > N);
        state.send_in_progress = false;
        drop(state);
        self.send_begin.notify_one();
        self.notify_subscribers();
    }

    /// The dequeue shared by every receive variant.
    fn take(&self) -> T {
        let mut state = self.state.lock();
        self.readable.wait_while(&mut state, |s| s.buffer.is_empty());
        let value = Self::pop(&mut state);
        drop(state);
        self.send_end.notify_one();
        self.notify_subscribers();
        value
    }

    /// Dequeues without blocking, or returns `None` if the buffer is
    /// empty. Select's claim step for receive cases.
    pub(crate) fn try_take(&self) -> Option<T> {
        let mut state = self.state.lock();
        if state.buffer.is_empty() {
            return None;
        }
        let value = Self::pop(&mut state);
        drop(state);
        self.send_end.notify_one();
        self.notify_subscribers();
        Some(value)
    }

    fn pop(state: &mut State<T>) -> T {
        let was_full = state.buffer.len() > N;
        let (sender, value) = state
            .buffer
            .pop_front()
            .expect("dequeue from an empty buffer");
        // Draining a full buffer must never hand a synchronous handoff
        // back to the thread that deposited it.
        debug_assert!(
            !was_full || sender != thread::current().id(),
            "received own in-flight handoff"
        );
        debug_assert!(state.buffer.len() <= N);
        value
    }

    pub(crate) fn is_recv_ready(&self) -> bool {
        !self.state.lock().buffer.is_empty()
    }

    pub(crate) fn is_send_ready(&self) -> bool {
        let state = self.state.lock();
        state.buffer.len() <= N && !state.send_in_progress
    }

    pub(crate) fn subscribe(&self, signal: &Arc<Signal>) {
        self.subscribers.lock().push(signal.clone());
    }

    pub(crate) fn unsubscribe(&self, signal: &Arc<Signal>) {
        self.subscribers.lock().retain(|s| !Arc::ptr_eq(s, signal));
    }

    /// Wakes every subscribed select waiter. Subscribers re-register on
    /// their next pass, so the list is drained rather than walked.
    fn notify_subscribers(&self) {
        let drained = std::mem::take(&mut *self.subscribers.lock());
        for signal in drained {
            signal.notify();
        }
    }
}

/// A typed, first-class channel carrying values of `T`.
///
/// `N` is the buffer capacity: `0` (the default) gives a synchronous
/// channel on which every send rendezvous with a receive; `N > 0` gives a
/// bounded asynchronous channel whose senders block only when the buffer
/// is full. Cloning a handle aliases the same underlying queue; two
/// handles are equal iff they do. The queue is torn down when the last
/// handle is dropped. Channels cannot be closed and are never nil.
///
/// # Example
///
/// ```
/// use gochan::Channel;
///
/// let c = Channel::<char, 3>::new();
/// c.send('A');
/// c.send('B');
/// assert_eq!(c.recv(), 'A');
/// assert_eq!(c.recv(), 'B');
/// ```
pub struct Channel<T, const N: usize = 0> {
    core: Arc<Core<T, N>>,
}

impl<T, const N: usize> Channel<T, N> {
    /// Creates a channel with an empty buffer.
    pub fn new() -> Self {
        Self {
            core: Arc::new(Core::new()),
        }
    }

    /// Sends a value into the channel.
    ///
    /// On a synchronous channel this returns only after a receiver has
    /// taken the value; on a buffered channel it returns as soon as the
    /// value fits into free buffer space, and otherwise blocks until room
    /// is made.
    pub fn send(&self, value: T) {
        self.core.send(value);
    }

    /// Receives the next value, blocking until one is available.
    pub fn recv(&self) -> T {
        self.core.take()
    }

    /// Receives the next value into an existing slot.
    ///
    /// Ordering and acknowledgement are identical to [`recv`](Self::recv);
    /// only the delivery differs.
    pub fn recv_into(&self, slot: &mut T) {
        *slot = self.core.take();
    }

    /// Receives the next value boxed on the heap.
    ///
    /// Ordering and acknowledgement are identical to [`recv`](Self::recv);
    /// only the delivery differs.
    pub fn recv_boxed(&self) -> Box<T> {
        Box::new(self.core.take())
    }
}

impl<T, const N: usize> Clone for Channel<T, N> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<T, const N: usize> Default for Channel<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> PartialEq for Channel<T, N> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }
}

impl<T, const N: usize> Eq for Channel<T, N> {}

impl<T, const N: usize> fmt::Debug for Channel<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Channel").field(&Arc::as_ptr(&self.core)).finish()
    }
}

/// Send-only view of a channel.
///
/// A narrowed clone: it shares the queue and reference count of the
/// channel it was constructed from and compares equal to it. Lets a
/// function signature express that it only ever sends.
pub struct Sender<T, const N: usize = 0> {
    pub(crate) core: Arc<Core<T, N>>,
}

impl<T, const N: usize> Sender<T, N> {
    /// Sends a value into the channel. See [`Channel::send`].
    pub fn send(&self, value: T) {
        self.core.send(value);
    }
}

impl<T, const N: usize> Clone for Sender<T, N> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<T, const N: usize> From<Channel<T, N>> for Sender<T, N> {
    fn from(channel: Channel<T, N>) -> Self {
        Self { core: channel.core }
    }
}

impl<T, const N: usize> From<&Channel<T, N>> for Sender<T, N> {
    fn from(channel: &Channel<T, N>) -> Self {
        Self {
            core: channel.core.clone(),
        }
    }
}

impl<T, const N: usize> From<&Sender<T, N>> for Sender<T, N> {
    fn from(sender: &Sender<T, N>) -> Self {
        sender.clone()
    }
}

impl<T, const N: usize> PartialEq for Sender<T, N> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }
}

impl<T, const N: usize> Eq for Sender<T, N> {}

impl<T, const N: usize> PartialEq<Channel<T, N>> for Sender<T, N> {
    fn eq(&self, other: &Channel<T, N>) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }
}

impl<T, const N: usize> PartialEq<Sender<T, N>> for Channel<T, N> {
    fn eq(&self, other: &Sender<T, N>) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }
}

impl<T, const N: usize> fmt::Debug for Sender<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Sender").field(&Arc::as_ptr(&self.core)).finish()
    }
}

/// Receive-only view of a channel.
///
/// A narrowed clone: it shares the queue and reference count of the
/// channel it was constructed from and compares equal to it.
pub struct Receiver<T, const N: usize = 0> {
    pub(crate) core: Arc<Core<T, N>>,
}

impl<T, const N: usize> Receiver<T, N> {
    /// Receives the next value, blocking until one is available.
    pub fn recv(&self) -> T {
        self.core.take()
    }

    /// Receives the next value into an existing slot.
    pub fn recv_into(&self, slot: &mut T) {
        *slot = self.core.take();
    }

    /// Receives the next value boxed on the heap.
    pub fn recv_boxed(&self) -> Box<T> {
        Box::new(self.core.take())
    }
}

impl<T, const N: usize> Clone for Receiver<T, N> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<T, const N: usize> From<Channel<T, N>> for Receiver<T, N> {
    fn from(channel: Channel<T, N>) -> Self {
        Self { core: channel.core }
    }
}

impl<T, const N: usize> From<&Channel<T, N>> for Receiver<T, N> {
    fn from(channel: &Channel<T, N>) -> Self {
        Self {
            core: channel.core.clone(),
        }
    }
}

impl<T, const N: usize> From<&Receiver<T, N>> for Receiver<T, N> {
    fn from(receiver: &Receiver<T, N>) -> Self {
        receiver.clone()
    }
}

impl<T, const N: usize> PartialEq for Receiver<T, N> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }
}

impl<T, const N: usize> Eq for Receiver<T, N> {}

impl<T, const N: usize> PartialEq<Channel<T, N>> for Receiver<T, N> {
    fn eq(&self, other: &Channel<T, N>) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }
}

impl<T, const N: usize> PartialEq<Receiver<T, N>> for Channel<T, N> {
    fn eq(&self, other: &Receiver<T, N>) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }
}

impl<T, const N: usize> fmt::Debug for Receiver<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Receiver").field(&Arc::as_ptr(&self.core)).finish()
    }
}
