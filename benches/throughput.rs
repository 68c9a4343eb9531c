//! Throughput benchmarks for the buffered and rendezvous send paths.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use gochan::{Channel, ThreadGuard};
use std::thread;

const BURST: u64 = 64;

fn bench_buffered_burst(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffered_burst");
    group.throughput(Throughput::Elements(BURST));

    group.bench_function("send_recv_64", |b| {
        let chan = Channel::<u64, 64>::new();
        b.iter(|| {
            for i in 0..BURST {
                chan.send(black_box(i));
            }
            for _ in 0..BURST {
                black_box(chan.recv());
            }
        });
    });

    group.finish();
}

fn bench_rendezvous(c: &mut Criterion) {
    let mut group = c.benchmark_group("rendezvous");

    group.bench_function("ping_pong", |b| {
        let ping = Channel::<u64>::new();
        let pong = Channel::<u64>::new();

        let (req, resp) = (ping.clone(), pong.clone());
        let echo = thread::spawn(move || loop {
            let v = req.recv();
            if v == u64::MAX {
                break;
            }
            resp.send(v);
        });
        let _echo = ThreadGuard::new(echo);

        b.iter(|| {
            ping.send(black_box(1));
            black_box(pong.recv());
        });

        ping.send(u64::MAX);
    });

    group.finish();
}

criterion_group!(benches, bench_buffered_burst, bench_rendezvous);
criterion_main!(benches);
