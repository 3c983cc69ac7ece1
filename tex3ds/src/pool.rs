//! Fixed-size worker pool.
//!
//! The only parallelism in the pipeline: a set of worker threads pulling
//! jobs from a single bounded FIFO queue. Producers block while the queue
//! holds more than twice the pool size, which keeps tile extraction from
//! racing far ahead of encoding. There is no cancellation; dropping the
//! pool flips a quit flag, lets the workers drain the queue, and joins
//! them, so `drop` doubles as a completion barrier.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

struct State {
    jobs: VecDeque<Job>,
    quit: bool,
}

struct Shared {
    state: Mutex<State>,
    new_job: Condvar,
    job_taken: Condvar,
    limit: usize,
}

/// A pool of worker threads over one bounded job queue.
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Pool sized to the hardware concurrency, floor of one.
    pub fn new() -> Self {
        let threads = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::with_threads(threads)
    }

    /// Pool with an explicit thread count.
    pub fn with_threads(threads: usize) -> Self {
        let threads = threads.max(1);
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                jobs: VecDeque::new(),
                quit: false,
            }),
            new_job: Condvar::new(),
            job_taken: Condvar::new(),
            limit: threads * 2,
        });

        let workers = (0..threads)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || worker(shared))
            })
            .collect();

        Self { shared, workers }
    }

    /// Number of worker threads.
    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }

    /// Queue a job, blocking while the queue is over its soft bound.
    pub fn execute(&self, job: impl FnOnce() + Send + 'static) {
        {
            let mut state = self.shared.state.lock().expect("pool mutex poisoned");

            while state.jobs.len() > self.shared.limit {
                state = self
                    .shared
                    .job_taken
                    .wait(state)
                    .expect("pool mutex poisoned");
            }

            state.jobs.push_back(Box::new(job));
        }

        self.shared.new_job.notify_one();
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock().expect("pool mutex poisoned");
            state.quit = true;
        }

        self.shared.new_job.notify_all();

        for worker in self.workers.drain(..) {
            // A panicking job already aborted the pipeline's invariants;
            // propagate it.
            if worker.join().is_err() {
                panic!("worker thread panicked");
            }
        }
    }
}

fn worker(shared: Arc<Shared>) {
    loop {
        let job = {
            let mut state = shared.state.lock().expect("pool mutex poisoned");

            while !state.quit && state.jobs.is_empty() {
                state = shared.new_job.wait(state).expect("pool mutex poisoned");
            }

            // Drain remaining jobs even when quitting, so dropping the
            // pool acts as a barrier.
            match state.jobs.pop_front() {
                Some(job) => job,
                None => return,
            }
        };

        shared.job_taken.notify_one();

        job();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_thread_count_floor_is_one() {
        let pool = WorkerPool::with_threads(0);
        assert_eq!(pool.thread_count(), 1);
    }

    #[test]
    fn test_runs_all_jobs() {
        let counter = Arc::new(AtomicUsize::new(0));

        let pool = WorkerPool::with_threads(4);
        for _ in 0..100 {
            let counter = Arc::clone(&counter);
            pool.execute(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        drop(pool);

        assert_eq!(counter.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn test_drop_waits_for_queued_jobs() {
        let counter = Arc::new(AtomicUsize::new(0));

        let pool = WorkerPool::with_threads(1);
        for _ in 0..10 {
            let counter = Arc::clone(&counter);
            pool.execute(move || {
                thread::sleep(Duration::from_millis(1));
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        drop(pool);

        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_jobs_run_concurrently() {
        // Two jobs that each wait for the other would deadlock on a
        // single thread.
        let barrier = Arc::new(std::sync::Barrier::new(2));

        let pool = WorkerPool::with_threads(2);
        for _ in 0..2 {
            let barrier = Arc::clone(&barrier);
            pool.execute(move || {
                barrier.wait();
            });
        }
        drop(pool);
    }

    #[test]
    fn test_producer_backpressure_does_not_deadlock() {
        let pool = WorkerPool::with_threads(2);
        for _ in 0..1000 {
            pool.execute(|| {});
        }
        drop(pool);
    }
}
