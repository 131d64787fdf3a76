//! Fixed-size worker pool draining the lock-free task queue.

use super::queue::LockFreeQueue;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Receiver side of an awaitable submission. Resolves with the closure's
/// value, or with the panic payload if the closure panicked.
pub struct TaskHandle<R> {
    receiver: mpsc::Receiver<thread::Result<R>>,
}

impl<R> TaskHandle<R> {
    /// Blocks until the task has run.
    pub fn wait(self) -> thread::Result<R> {
        match self.receiver.recv() {
            Ok(result) => result,
            Err(_) => Err(Box::new("task was dropped before completion")),
        }
    }
}

/// Thread pool with a fixed worker count, fed by the shared lock-free queue.
///
/// Workers that find the queue empty sleep for the configured poll latency,
/// or yield to the scheduler when the latency is zero. Dropping the pool
/// signals `done`, lets every worker finish the task it holds plus one final
/// drain of the queue, and joins them; the join cannot be skipped on any
/// exit path.
pub struct ThreadPool {
    queue: Arc<LockFreeQueue<Task>>,
    done: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    /// One worker per available core, with at least one worker.
    pub fn new(poll_latency: Duration) -> io::Result<ThreadPool> {
        let threads = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        ThreadPool::with_threads(threads, poll_latency)
    }

    pub fn with_threads(threads: usize, poll_latency: Duration) -> io::Result<ThreadPool> {
        let threads = threads.max(1);
        let queue = Arc::new(LockFreeQueue::new());
        let done = Arc::new(AtomicBool::new(false));
        let mut workers = Vec::with_capacity(threads);
        for i in 0..threads {
            let queue = Arc::clone(&queue);
            let done = Arc::clone(&done);
            let handle = thread::Builder::new()
                .name(format!("worker-{i}"))
                .spawn(move || worker_loop(&queue, &done, poll_latency))?;
            workers.push(handle);
        }
        Ok(ThreadPool {
            queue,
            done,
            workers,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Enqueues a task. The pool does not catch panics on this path; tasks
    /// are expected to handle their own failures.
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue.enqueue(Box::new(task));
    }

    /// Enqueues a task whose result can be awaited through the returned
    /// handle.
    pub fn submit_with_result<F, R>(&self, task: F) -> TaskHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (sender, receiver) = mpsc::sync_channel(1);
        self.submit(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(task));
            let _ = sender.send(result);
        });
        TaskHandle { receiver }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.done.store(true, Ordering::Release);
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop(queue: &LockFreeQueue<Task>, done: &AtomicBool, poll_latency: Duration) {
    while !done.load(Ordering::Acquire) {
        match queue.dequeue() {
            Some(task) => task(),
            None if poll_latency.is_zero() => thread::yield_now(),
            None => thread::sleep(poll_latency),
        }
    }
    // Stop was signalled: drain what is left so no accepted task is lost.
    while let Some(task) = queue.dequeue() {
        task();
    }
}
