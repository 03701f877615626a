//! Randomized schedules over the queue contracts.
//!
//! Run with `RUSTFLAGS="--cfg shuttle" cargo test -p tether-fifo --test shuttle_queues`.

#![cfg(shuttle)]

use shuttle::sync::{Arc, Mutex};
use shuttle::thread;
use tether_fifo::{ByteRing, ElementFifo};

const ITERATIONS: usize = 1_000;

#[test]
fn byte_ring_spsc_under_random_schedules() {
    shuttle::check_random(
        || {
            let ring = Arc::new(Mutex::new(ByteRing::<4>::new()));
            let total = 12u8;

            let producer = {
                let ring = Arc::clone(&ring);
                thread::spawn(move || {
                    let data: Vec<u8> = (0..total).collect();
                    let mut sent = 0;
                    while sent < data.len() {
                        sent += ring.lock().unwrap().enqueue(&data[sent..]);
                        thread::yield_now();
                    }
                })
            };

            let mut received = Vec::new();
            while received.len() < usize::from(total) {
                let mut buf = [0u8; 3];
                let n = ring.lock().unwrap().dequeue(&mut buf);
                received.extend_from_slice(&buf[..n]);
                thread::yield_now();
            }
            producer.join().unwrap();

            assert_eq!(received, (0..total).collect::<Vec<_>>());
        },
        ITERATIONS,
    );
}

#[test]
fn element_fifo_eviction_under_random_schedules() {
    shuttle::check_random(
        || {
            let fifo = Arc::new(Mutex::new(ElementFifo::new(1, 3).unwrap()));

            let handles: Vec<_> = (0..2u32)
                .map(|t| {
                    let fifo = Arc::clone(&fifo);
                    thread::spawn(move || {
                        for i in 0..4 {
                            fifo.lock().unwrap().enqueue(t * 100 + i).unwrap();
                            thread::yield_now();
                        }
                    })
                })
                .collect();
            for h in handles {
                h.join().unwrap();
            }

            let mut fifo = fifo.lock().unwrap();
            assert_eq!(fifo.len(), 3);
            assert_eq!(fifo.capacity(), 3);

            // Whatever survived keeps each producer's own order.
            let mut last = [None::<u32>; 2];
            while let Some(v) = fifo.dequeue() {
                let t = (v / 100) as usize;
                if let Some(prev) = last[t] {
                    assert!(v > prev);
                }
                last[t] = Some(v);
            }
        },
        ITERATIONS,
    );
}
