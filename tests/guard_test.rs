use gochan::ThreadGuard;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn guard_joins_on_scope_exit() {
    let finished = Arc::new(AtomicBool::new(false));
    {
        let flag = finished.clone();
        let _guard = ThreadGuard::new(thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            flag.store(true, Ordering::SeqCst);
        }));
    }
    assert!(finished.load(Ordering::SeqCst));
}

#[test]
fn guard_reraises_a_worker_panic() {
    let result = panic::catch_unwind(|| {
        let _guard = ThreadGuard::new(thread::spawn(|| panic!("worker failed")));
    });
    assert!(result.is_err());
}

#[test]
fn guard_converts_from_a_join_handle() {
    let flag = Arc::new(AtomicBool::new(false));
    {
        let set = flag.clone();
        let _guard: ThreadGuard = thread::spawn(move || set.store(true, Ordering::SeqCst)).into();
    }
    assert!(flag.load(Ordering::SeqCst));
}
