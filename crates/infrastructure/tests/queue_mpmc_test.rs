//! Concurrency tests for the lock-free FIFO: exactly-once delivery and
//! per-producer ordering under producer/consumer contention.

use ember_dns_infrastructure::LockFreeQueue;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

const PRODUCERS: usize = 4;
const CONSUMERS: usize = 4;
const ITEMS_PER_PRODUCER: usize = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Tagged {
    producer: usize,
    sequence: usize,
}

#[test]
fn elements_dequeue_exactly_once_across_consumers() {
    let queue = Arc::new(LockFreeQueue::new());
    let producing = Arc::new(AtomicBool::new(true));
    let collected: Arc<Mutex<Vec<Tagged>>> = Arc::new(Mutex::new(Vec::new()));

    let mut handles = Vec::new();
    for producer in 0..PRODUCERS {
        let queue = Arc::clone(&queue);
        handles.push(thread::spawn(move || {
            for sequence in 0..ITEMS_PER_PRODUCER {
                queue.enqueue(Tagged { producer, sequence });
            }
        }));
    }

    let mut consumers = Vec::new();
    for _ in 0..CONSUMERS {
        let queue = Arc::clone(&queue);
        let producing = Arc::clone(&producing);
        let collected = Arc::clone(&collected);
        consumers.push(thread::spawn(move || {
            let mut local = Vec::new();
            loop {
                match queue.dequeue() {
                    Some(item) => local.push(item),
                    None if producing.load(Ordering::Acquire) => thread::yield_now(),
                    None => break,
                }
            }
            collected.lock().unwrap().extend(local);
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
    producing.store(false, Ordering::Release);
    for consumer in consumers {
        consumer.join().unwrap();
    }

    let collected = collected.lock().unwrap();
    assert_eq!(collected.len(), PRODUCERS * ITEMS_PER_PRODUCER);

    // No element lost or duplicated.
    let unique: HashSet<Tagged> = collected.iter().copied().collect();
    assert_eq!(unique.len(), PRODUCERS * ITEMS_PER_PRODUCER);
}

#[test]
fn per_producer_order_is_preserved_for_a_single_consumer() {
    let queue = Arc::new(LockFreeQueue::new());

    let mut handles = Vec::new();
    for producer in 0..PRODUCERS {
        let queue = Arc::clone(&queue);
        handles.push(thread::spawn(move || {
            for sequence in 0..ITEMS_PER_PRODUCER {
                queue.enqueue(Tagged { producer, sequence });
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let mut last_seen = vec![None::<usize>; PRODUCERS];
    let mut total = 0usize;
    while let Some(item) = queue.dequeue() {
        total += 1;
        if let Some(previous) = last_seen[item.producer] {
            assert!(
                item.sequence > previous,
                "producer {} emitted {} after {}",
                item.producer,
                item.sequence,
                previous
            );
        }
        last_seen[item.producer] = Some(item.sequence);
    }
    assert_eq!(total, PRODUCERS * ITEMS_PER_PRODUCER);
}

#[test]
fn dequeue_count_never_exceeds_enqueue_count() {
    let queue = Arc::new(LockFreeQueue::new());

    let producer_queue = Arc::clone(&queue);
    let producer = thread::spawn(move || {
        for i in 0..10_000u32 {
            producer_queue.enqueue(i);
        }
    });

    // Consume concurrently with production; every dequeue must yield a
    // value that was actually enqueued, and the total can only reach the
    // enqueued count.
    let mut received = 0usize;
    while received < 10_000 {
        if queue.dequeue().is_some() {
            received += 1;
        }
    }
    producer.join().unwrap();
    assert_eq!(queue.dequeue(), None);
}

#[test]
fn heap_payloads_are_not_corrupted_under_contention() {
    let queue = Arc::new(LockFreeQueue::new());
    let mut handles = Vec::new();
    for producer in 0..PRODUCERS {
        let queue = Arc::clone(&queue);
        handles.push(thread::spawn(move || {
            for sequence in 0..1_000 {
                queue.enqueue(format!("{producer}:{sequence}"));
            }
        }));
    }

    let mut consumers = Vec::new();
    for _ in 0..2 {
        let queue = Arc::clone(&queue);
        consumers.push(thread::spawn(move || {
            let mut seen = 0usize;
            while seen < (PRODUCERS * 1_000) / 2 {
                if let Some(item) = queue.dequeue() {
                    let (producer, sequence) = item.split_once(':').unwrap();
                    assert!(producer.parse::<usize>().unwrap() < PRODUCERS);
                    assert!(sequence.parse::<usize>().unwrap() < 1_000);
                    seen += 1;
                }
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
    for consumer in consumers {
        consumer.join().unwrap();
    }
}
