use std::panic;
use std::thread::{self, JoinHandle};

/// Joins the guarded thread when the guard leaves scope.
///
/// Holding workers in guards keeps an assertion failure on the owning
/// thread from leaking a running worker: unwinding joins the worker
/// before its stack frame disappears. A worker panic is re-raised on
/// join unless the guard is itself dropping during a panic.
///
/// # Example
///
/// ```
/// use gochan::{Channel, ThreadGuard};
/// use std::thread;
///
/// let c = Channel::<char>::new();
/// let tx = c.clone();
/// let _worker = ThreadGuard::new(thread::spawn(move || tx.send('A')));
/// assert_eq!(c.recv(), 'A');
/// ```
pub struct ThreadGuard<T = ()> {
    handle: Option<JoinHandle<T>>,
}

impl<T> ThreadGuard<T> {
    /// Takes ownership of a running thread.
    pub fn new(handle: JoinHandle<T>) -> Self {
        Self {
            handle: Some(handle),
        }
    }
}

impl<T> From<JoinHandle<T>> for ThreadGuard<T> {
    fn from(handle: JoinHandle<T>) -> Self {
        Self::new(handle)
    }
}

impl<T> Drop for ThreadGuard<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(payload) = handle.join() {
                // A second panic during unwinding would abort.
                if !thread::panicking() {
                    panic::resume_unwind(payload);
                }
            }
        }
    }
}
