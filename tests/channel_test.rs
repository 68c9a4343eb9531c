use gochan::{channel, Channel, Receiver, Sender, ThreadGuard};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn ping_pong() {
    let c = Channel::<char>::new();

    let ca = c.clone();
    let a = thread::spawn(move || {
        ca.send('A');
        assert_eq!(ca.recv(), 'B');
    });
    let _a = ThreadGuard::new(a);

    let cb = c.clone();
    let b = thread::spawn(move || {
        assert_eq!(cb.recv(), 'A');
        cb.send('B');
    });
    let _b = ThreadGuard::new(b);
}

#[test]
fn competing_senders_and_receivers() {
    let c = Channel::<char>::new();
    let mut guards = Vec::new();

    for ch in ['A', 'B'] {
        let tx = c.clone();
        guards.push(ThreadGuard::new(thread::spawn(move || tx.send(ch))));
    }
    for _ in 0..2 {
        let rx = c.clone();
        guards.push(ThreadGuard::new(thread::spawn(move || {
            let r = rx.recv();
            assert!(r == 'A' || r == 'B');
        })));
    }
}

#[test]
fn clone_aliases_the_same_queue() {
    let c = Channel::<i32>::new();
    let d = c.clone();
    assert_eq!(c, d);

    let e = Channel::<i32>::new();
    assert_ne!(c, e);

    let f = e.clone();
    assert_eq!(e, f);
    assert_ne!(d, f);
}

#[test]
fn equality_is_an_equivalence() {
    let c = Channel::<i32>::new();
    let d = c.clone();
    let e = d.clone();

    assert_eq!(c, c);
    assert_eq!(c, d);
    assert_eq!(d, c);
    assert_eq!(d, e);
    assert_eq!(c, e);

    // Stable across reassignment.
    let mut g = Channel::<i32>::new();
    assert_ne!(c, g);
    g = c.clone();
    assert_eq!(c, g);
}

#[test]
fn directional_views_compare_equal_to_their_source() {
    let c = Channel::<i32>::new();
    let rx = Receiver::from(&c);
    let tx = Sender::from(&c);

    assert_eq!(c, rx);
    assert_eq!(rx, c);
    assert_eq!(c, tx);
    assert_eq!(tx, c);

    let other = Channel::<i32>::new();
    assert_ne!(other, rx);
    assert_ne!(other, tx);
    assert_eq!(Receiver::from(&c), rx);
    assert_eq!(Sender::from(&c), tx);
}

#[test]
fn directional_views_carry_a_value_across_threads() {
    let done = Arc::new(AtomicBool::new(false));
    let c = Channel::<i32>::new();

    let tx = Sender::from(&c);
    let f = thread::spawn(move || tx.send(7));

    let rx = Receiver::from(&c);
    let flag = done.clone();
    let g = thread::spawn(move || {
        assert_eq!(rx.recv(), 7);
        flag.store(true, Ordering::SeqCst);
    });

    f.join().unwrap();
    g.join().unwrap();
    assert!(done.load(Ordering::SeqCst));
}

#[test]
fn channels_are_first_class_payloads() {
    let c = Channel::<Channel<bool>>::new();
    let done = Channel::<bool>::new();

    let rx = Receiver::from(&c);
    let f = thread::spawn(move || {
        let inner = rx.recv();
        inner.send(true);
    });
    let _f = ThreadGuard::new(f);

    c.send(done.clone());
    assert!(done.recv());
}

#[test]
fn recv_into_stores_through_the_slot() {
    let c = Channel::<String>::new();
    let tx = c.clone();
    let f = thread::spawn(move || tx.send(String::from("seven")));
    let _f = ThreadGuard::new(f);

    let mut slot = String::new();
    c.recv_into(&mut slot);
    assert_eq!(slot, "seven");
}

#[test]
fn recv_boxed_delivers_on_the_heap() {
    let c = Channel::<String>::new();
    let tx = Sender::from(&c);
    let f = thread::spawn(move || tx.send(String::from("seven")));
    let _f = ThreadGuard::new(f);

    let rx = Receiver::from(&c);
    assert_eq!(*rx.recv_boxed(), "seven");
}

#[test]
fn buffered_burst_is_nonblocking_and_ordered() {
    let c = Channel::<char, 3>::new();
    c.send('A');
    c.send('B');
    c.send('C');

    assert_eq!(c.recv(), 'A');
    assert_eq!(c.recv(), 'B');
    assert_eq!(c.recv(), 'C');
}

#[test]
fn buffered_elements_cross_threads_in_order() {
    let c = Channel::<char, 3>::new();
    c.send('A');
    c.send('B');
    c.send('C');

    let rx = c.clone();
    let f = thread::spawn(move || {
        assert_eq!(rx.recv(), 'A');
        assert_eq!(rx.recv(), 'B');
        assert_eq!(rx.recv(), 'C');
    });
    let _f = ThreadGuard::new(f);
}

#[test]
#[cfg_attr(miri, ignore)]
fn synchronous_send_blocks_until_received() {
    let c = Channel::<i32>::new();
    let sent = Arc::new(AtomicBool::new(false));

    let tx = c.clone();
    let flag = sent.clone();
    let f = thread::spawn(move || {
        tx.send(1);
        flag.store(true, Ordering::SeqCst);
    });

    thread::sleep(Duration::from_millis(50));
    assert!(!sent.load(Ordering::SeqCst));

    assert_eq!(c.recv(), 1);
    f.join().unwrap();
    assert!(sent.load(Ordering::SeqCst));
}

#[test]
#[cfg_attr(miri, ignore)]
fn synchronous_send_waits_for_its_receiver() {
    let c = Channel::<i32>::new();
    let rx = c.clone();
    let f = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        assert_eq!(rx.recv(), 3);
    });
    let _f = ThreadGuard::new(f);

    let start = Instant::now();
    c.send(3);
    assert!(start.elapsed() >= Duration::from_millis(50));
}

#[test]
#[cfg_attr(miri, ignore)]
fn bounded_channel_blocks_the_overflowing_send() {
    let c = Channel::<usize, 2>::new();
    c.send(0);
    c.send(1);

    let third_done = Arc::new(AtomicBool::new(false));
    let tx = c.clone();
    let flag = third_done.clone();
    let f = thread::spawn(move || {
        tx.send(2);
        flag.store(true, Ordering::SeqCst);
    });

    thread::sleep(Duration::from_millis(50));
    assert!(!third_done.load(Ordering::SeqCst));

    assert_eq!(c.recv(), 0);
    f.join().unwrap();
    assert!(third_done.load(Ordering::SeqCst));
    assert_eq!(c.recv(), 1);
    assert_eq!(c.recv(), 2);
}

#[test]
fn fifo_order_is_preserved() {
    let c = Channel::<usize, 8>::new();
    let tx = c.clone();
    let f = thread::spawn(move || {
        for i in 0..100 {
            tx.send(i);
        }
    });
    let _f = ThreadGuard::new(f);

    for i in 0..100 {
        assert_eq!(c.recv(), i);
    }
}

#[test]
fn many_senders_drain_completely() {
    let c = Channel::<usize, 4>::new();
    let mut guards = Vec::new();

    for t in 0..4 {
        let tx = c.clone();
        guards.push(ThreadGuard::new(thread::spawn(move || {
            for i in 0..50 {
                tx.send(t * 50 + i);
            }
        })));
    }

    let mut received: Vec<usize> = (0..200).map(|_| c.recv()).collect();
    received.sort_unstable();
    for (i, &item) in received.iter().enumerate() {
        assert_eq!(item, i);
    }
}

#[test]
fn free_constructor_builds_a_working_channel() {
    let c = channel::<u8, 1>();
    c.send(5);
    assert_eq!(c.recv(), 5);

    let d: Channel<u8> = Channel::default();
    let e = d.clone();
    assert_eq!(d, e);
}
