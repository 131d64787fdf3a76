pub mod pool;
pub mod queue;

pub use pool::{TaskHandle, ThreadPool};
pub use queue::LockFreeQueue;
