//! Go-style channel synchronization between OS threads.
//!
//! This crate ports the communicating-sequential-processes rendezvous of
//! the Go language to plain threads: a typed, first-class [`Channel`]
//! transports values between threads, and a [`Select`] descriptor waits
//! on one of several pending channel operations. Unlike Go, channels
//! cannot be nil and cannot be closed.
//!
//! # Key Features
//!
//! - **Two modes, one implementation**: a capacity of `0` (the default)
//!   gives a synchronous channel whose sends return only after their value
//!   has been taken; a capacity of `N > 0` gives a bounded channel whose
//!   senders block only when the buffer is full.
//! - **First-class handles**: channels are cheap reference-shared values;
//!   cloning a handle aliases the same queue, and handles compare equal
//!   iff they do.
//! - **Directional views**: [`Sender`] and [`Receiver`] narrow a handle
//!   to one direction for use in function signatures.
//! - **Select**: a builder-style descriptor over any mix of send and
//!   receive cases, completed by `wait`, `wait_for` or `try_once`;
//!   exactly one case fires and the rest touch nothing.
//! - **FIFO delivery**: per channel, values are received in deposit
//!   order regardless of how many senders and receivers compete.
//!
//! # Example
//!
//! ```
//! use gochan::{Channel, ThreadGuard};
//! use std::thread;
//!
//! let c = Channel::<char>::new();
//!
//! let tx = c.clone();
//! let worker = thread::spawn(move || {
//!     tx.send('A');
//!     assert_eq!(tx.recv(), 'B');
//! });
//! let _worker = ThreadGuard::new(worker);
//!
//! assert_eq!(c.recv(), 'A');
//! c.send('B');
//! ```

#![warn(missing_docs)]

/// Channel core, handles and directional views.
pub mod channel;
/// Scoped joining of worker threads.
pub mod guard;
/// Select multiplexer over pending channel operations.
pub mod select;
mod signal;

pub use channel::{Channel, Receiver, Sender};
pub use guard::ThreadGuard;
pub use select::Select;

/// Creates a channel carrying values of type `T` with capacity `N`.
///
/// Equivalent to [`Channel::new`]; `N = 0` gives a synchronous channel.
///
/// ```
/// let c = gochan::channel::<i32, 2>();
/// c.send(1);
/// c.send(2);
/// assert_eq!(c.recv(), 1);
/// ```
pub fn channel<T, const N: usize>() -> Channel<T, N> {
    Channel::new()
}

// Handles must stay usable from any thread whenever the element is Send.
const fn assert_send_sync<T: Send + Sync>() {}
const _: () = {
    assert_send_sync::<Channel<String, 1>>();
    assert_send_sync::<Sender<String, 1>>();
    assert_send_sync::<Receiver<String, 1>>();
};
