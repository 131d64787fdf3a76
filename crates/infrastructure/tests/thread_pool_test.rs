use ember_dns_infrastructure::ThreadPool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn every_submitted_task_runs_before_the_pool_is_gone() {
    let counter = Arc::new(AtomicUsize::new(0));
    {
        let pool = ThreadPool::with_threads(4, Duration::from_micros(100)).unwrap();
        for _ in 0..2_000 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
    }
    assert_eq!(counter.load(Ordering::SeqCst), 2_000);
}

#[test]
fn tasks_submitted_from_many_threads_all_run() {
    let counter = Arc::new(AtomicUsize::new(0));
    {
        let pool = Arc::new(ThreadPool::with_threads(2, Duration::ZERO).unwrap());
        let mut submitters = Vec::new();
        for _ in 0..4 {
            let pool = Arc::clone(&pool);
            let counter = Arc::clone(&counter);
            submitters.push(std::thread::spawn(move || {
                for _ in 0..500 {
                    let counter = Arc::clone(&counter);
                    pool.submit(move || {
                        counter.fetch_add(1, Ordering::SeqCst);
                    });
                }
            }));
        }
        for submitter in submitters {
            submitter.join().unwrap();
        }
    }
    assert_eq!(counter.load(Ordering::SeqCst), 2_000);
}

#[test]
fn awaitable_tasks_resolve_with_their_value() {
    let pool = ThreadPool::with_threads(2, Duration::ZERO).unwrap();
    let handles: Vec<_> = (0..16u64)
        .map(|i| pool.submit_with_result(move || i * i))
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.wait().unwrap(), (i * i) as u64);
    }
}

#[test]
fn awaitable_tasks_resolve_with_the_panic_payload() {
    let pool = ThreadPool::with_threads(1, Duration::ZERO).unwrap();
    let handle = pool.submit_with_result(|| -> () { panic!("task exploded") });
    let err = handle.wait().unwrap_err();
    assert_eq!(err.downcast_ref::<&str>(), Some(&"task exploded"));
}

#[test]
fn tasks_after_a_panicked_task_still_run() {
    let pool = ThreadPool::with_threads(2, Duration::ZERO).unwrap();
    let probe = pool.submit_with_result(|| -> () { panic!("first") });
    assert!(probe.wait().is_err());
    let after = pool.submit_with_result(|| 1 + 1);
    assert_eq!(after.wait().unwrap(), 2);
}
