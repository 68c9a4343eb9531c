use crossbeam_utils::Backoff;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, Thread};
use std::time::Instant;

/// A one-shot wakeup flag owned by the thread that created it.
///
/// Select waiters subscribe a `Signal` on every channel they watch; a
/// channel notifies its subscribers after each transition that could make
/// a pending case ready. Waits spin briefly before parking so that short
/// rendezvous never pay the park/unpark round-trip.
pub(crate) struct Signal {
    state: AtomicUsize,
    thread: Thread,
}

impl Signal {
    /// Creates a signal for the current thread.
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicUsize::new(0),
            thread: thread::current(),
        }
    }

    /// Blocks the owning thread until the signal is notified.
    pub(crate) fn wait(&self) {
        let backoff = Backoff::new();
        while self.state.load(Ordering::Acquire) == 0 {
            if backoff.is_completed() {
                thread::park();
            } else {
                backoff.snooze();
            }
        }
    }

    /// Blocks the owning thread until the signal is notified or the
    /// deadline passes. Returns true if the signal was notified.
    pub(crate) fn wait_deadline(&self, deadline: Instant) -> bool {
        while self.state.load(Ordering::Acquire) == 0 {
            let now = Instant::now();
            if now >= deadline {
                return self.state.load(Ordering::Acquire) != 0;
            }
            thread::park_timeout(deadline - now);
        }
        true
    }

    /// Notifies the signal, waking the owning thread.
    pub(crate) fn notify(&self) {
        self.state.store(1, Ordering::Release);
        self.thread.unpark();
    }

    /// Rearms a consumed signal so it can be waited on again.
    pub(crate) fn reset(&self) {
        self.state.store(0, Ordering::Release);
    }
}
