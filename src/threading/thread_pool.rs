use log::debug;
use rayon::ThreadPoolBuilder;

// A wrapper around Rayon's ThreadPool that provides a clean interface for
// background terrain generation work.
pub struct ThreadPool {
    pool: rayon::ThreadPool,
    num_threads: usize,
}

impl ThreadPool {
    // Create a new ThreadPool with the specified number of threads.
    // If size is 0, num_cpus decides (all cores minus one for the consumer).
    pub fn new(size: usize) -> ThreadPool {
        let num_threads = if size > 0 {
            size
        } else {
            std::cmp::max(1, num_cpus::get().saturating_sub(1))
        };

        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .expect("failed to build worker thread pool");

        debug!("created thread pool with {} threads", num_threads);

        ThreadPool { pool, num_threads }
    }

    // Execute a job in the thread pool, fire and forget.
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.pool.spawn(f);
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    #[test]
    fn zero_size_defaults_to_at_least_one_thread() {
        let pool = ThreadPool::new(0);
        assert!(pool.num_threads() >= 1);
    }

    #[test]
    fn execute_runs_the_job() {
        let pool = ThreadPool::new(2);
        let (tx, rx) = channel();
        pool.execute(move || {
            let _ = tx.send(21 * 2);
        });
        assert_eq!(rx.recv().ok(), Some(42));
    }
}
