//! Fixed-size worker pool with a completion barrier.
//!
//! A [`Pool`] owns a set of worker threads that drain a shared FIFO of
//! tasks. The worker function is fixed at construction; producers hand
//! tasks over with [`Pool::submit`] and may block on [`Pool::wait_for_all`]
//! until every submitted task has finished executing.
//!
//! The barrier is the reason this pool exists: a producer that shares
//! borrowed data with its tasks can release that data the moment
//! `wait_for_all` returns, because at that point no worker holds a task.
//!
//! Workers are joined gracefully when the pool is dropped.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

/// Configuration for a [`Pool`].
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of worker threads.
    pub num_workers: usize,
    /// Optional thread name prefix (workers will be named "{prefix}-{id}").
    pub thread_name_prefix: Option<String>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_workers: 4,
            thread_name_prefix: Some("softpipe-worker".to_string()),
        }
    }
}

struct State<T> {
    queue: VecDeque<T>,
    /// Tasks popped from the queue but not yet finished.
    in_flight: usize,
    shutdown: bool,
}

struct Shared<T> {
    state: Mutex<State<T>>,
    /// Signaled when a task is pushed or shutdown is requested.
    work_ready: Condvar,
    /// Signaled when the queue drains and the last in-flight task returns.
    all_done: Condvar,
}

/// A pool of worker threads executing tasks of type `T`.
///
/// All workers run the same worker function, supplied once at
/// construction. Tasks are processed in FIFO submission order, but
/// concurrently; nothing is guaranteed about completion order.
pub struct Pool<T> {
    shared: Arc<Shared<T>>,
    workers: Vec<JoinHandle<()>>,
    num_workers: usize,
}

impl<T> Pool<T>
where
    T: Send + 'static,
{
    /// Create a new pool.
    ///
    /// `worker_fn` is called on a worker thread for each submitted task.
    ///
    /// # Panics
    ///
    /// Panics if `config.num_workers` is zero or a worker thread cannot
    /// be spawned.
    pub fn new<F>(config: PoolConfig, worker_fn: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        assert!(config.num_workers > 0, "pool needs at least one worker");

        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                queue: VecDeque::new(),
                in_flight: 0,
                shutdown: false,
            }),
            work_ready: Condvar::new(),
            all_done: Condvar::new(),
        });
        let worker_fn = Arc::new(worker_fn);

        let mut workers = Vec::with_capacity(config.num_workers);
        for worker_id in 0..config.num_workers {
            let shared = Arc::clone(&shared);
            let worker_fn = Arc::clone(&worker_fn);

            let mut builder = thread::Builder::new();
            if let Some(prefix) = &config.thread_name_prefix {
                builder = builder.name(format!("{}-{}", prefix, worker_id));
            }

            let handle = builder
                .spawn(move || Self::worker_loop(shared, worker_fn))
                .expect("failed to spawn worker thread");
            workers.push(handle);
        }

        log::debug!("worker pool started with {} workers", config.num_workers);

        Self {
            shared,
            workers,
            num_workers: config.num_workers,
        }
    }

    fn worker_loop(shared: Arc<Shared<T>>, worker_fn: Arc<dyn Fn(T) + Send + Sync>) {
        loop {
            let task = {
                let mut state = shared.state.lock().unwrap();
                loop {
                    if let Some(task) = state.queue.pop_front() {
                        state.in_flight += 1;
                        break task;
                    }
                    if state.shutdown {
                        return;
                    }
                    state = shared.work_ready.wait(state).unwrap();
                }
            };

            worker_fn(task);

            let mut state = shared.state.lock().unwrap();
            state.in_flight -= 1;
            if state.in_flight == 0 && state.queue.is_empty() {
                shared.all_done.notify_all();
            }
        }
    }

    /// Enqueue a task. Never blocks on workers; may allocate.
    pub fn submit(&self, task: T) {
        let mut state = self.shared.state.lock().unwrap();
        state.queue.push_back(task);
        drop(state);
        self.shared.work_ready.notify_one();
    }

    /// Block until every task submitted so far has finished executing.
    ///
    /// Returns immediately if the pool is idle. Tasks submitted by other
    /// threads while this call is blocked are waited for as well; callers
    /// that interleave draws must serialize them externally.
    pub fn wait_for_all(&self) {
        let mut state = self.shared.state.lock().unwrap();
        while !(state.queue.is_empty() && state.in_flight == 0) {
            state = self.shared.all_done.wait(state).unwrap();
        }
    }

    /// Number of worker threads.
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }
}

impl<T> Drop for Pool<T> {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock().unwrap();
            state.shutdown = true;
        }
        self.shared.work_ready.notify_all();

        while let Some(handle) = self.workers.pop() {
            let _ = handle.join();
        }
        log::debug!("worker pool shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn executes_every_task() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);

        let config = PoolConfig {
            num_workers: 2,
            thread_name_prefix: Some("test-pool".to_string()),
        };
        let pool = Pool::new(config, move |_task: ()| {
            counter_clone.fetch_add(1, Ordering::Relaxed);
        });

        for _ in 0..10 {
            pool.submit(());
        }
        pool.wait_for_all();

        assert_eq!(counter.load(Ordering::Relaxed), 10);
    }

    #[test]
    fn barrier_waits_for_in_flight_tasks() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);

        let pool = Pool::new(PoolConfig::default(), move |_task: ()| {
            thread::sleep(Duration::from_millis(5));
            counter_clone.fetch_add(1, Ordering::Relaxed);
        });

        for _ in 0..16 {
            pool.submit(());
        }
        pool.wait_for_all();

        // The barrier must not return while any task is still running.
        assert_eq!(counter.load(Ordering::Relaxed), 16);
    }

    #[test]
    fn barrier_on_idle_pool_returns_immediately() {
        let pool = Pool::new(PoolConfig::default(), |_task: ()| {});
        pool.wait_for_all();
    }

    #[test]
    fn tasks_run_in_parallel() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);

        let config = PoolConfig {
            num_workers: 4,
            thread_name_prefix: None,
        };
        let pool = Pool::new(config, move |_task: ()| {
            thread::sleep(Duration::from_millis(10));
            counter_clone.fetch_add(1, Ordering::Relaxed);
        });

        let start = std::time::Instant::now();
        for _ in 0..40 {
            pool.submit(());
        }
        pool.wait_for_all();
        let elapsed = start.elapsed();

        // 40 tasks at 10ms across 4 workers is ~100ms; a serial pool
        // would need 400ms.
        assert!(elapsed < Duration::from_millis(300));
        assert_eq!(counter.load(Ordering::Relaxed), 40);
    }

    #[test]
    fn drop_joins_workers() {
        let pool = Pool::new(PoolConfig::default(), |_task: ()| {
            thread::sleep(Duration::from_millis(10));
        });
        for _ in 0..4 {
            pool.submit(());
        }
        // Dropping must not hang or leak threads.
        drop(pool);
    }
}
