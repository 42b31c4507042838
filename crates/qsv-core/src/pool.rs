//! Fixed-size worker pool that runs one range job at a time.
//!
//! `dispatch(total, chunk, f)` calls `f(start, end)` once for each
//! `[start, end)` in a partition of `[0, total)` into chunks of `chunk`
//! items, spread over the pool's workers and the calling thread.
//!
//! # Protocol
//!
//! ```text
//!  caller                         workers (long-lived)
//!  ──────                         ───────────────────
//!  publish Arc<Job> × N ───────▶  recv() wakes each worker once
//!  drain(): claim chunks          drain(): claim chunks via
//!           via cursor                     cursor.fetch_add(chunk)
//!                                 check_in(): pending -= 1
//!  wait on done  ◀───────────────  last one sends on done
//! ```
//!
//! Every participant claims chunks from the shared atomic cursor until it
//! passes `total`, so faster threads take more chunks. Exactly one job is
//! in flight: `dispatch` takes `&mut self` and does not return before the
//! last worker checked in.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use tracing::{debug, trace, warn};

use crate::error::{SimError, SimResult};

/// Range function with its borrow lifetime erased.
type RangeFn = dyn Fn(usize, usize) + Sync;

/// One published job.
struct Job {
    /// Only dereferenced while the publishing `dispatch` call is blocked.
    range_fn: *const RangeFn,
    total: usize,
    chunk: usize,
    cursor: AtomicUsize,
    /// Workers that have not checked in yet.
    pending: AtomicUsize,
    /// First panic payload raised by a worker.
    panic: Mutex<Option<Box<dyn Any + Send>>>,
    done: Sender<()>,
}

// SAFETY: `range_fn` points to a `Sync` closure that outlives every access
// (see `WorkerPool::dispatch`).
unsafe impl Send for Job {}
unsafe impl Sync for Job {}

impl Job {
    /// Claim and run chunks until the domain is exhausted.
    fn drain(&self) {
        // SAFETY: the publishing `dispatch` call keeps the closure alive
        // until every participant has returned from `drain`.
        let range_fn = unsafe { &*self.range_fn };
        loop {
            let start = self.cursor.fetch_add(self.chunk, Ordering::Relaxed);
            if start >= self.total {
                break;
            }
            let end = (start + self.chunk).min(self.total);
            range_fn(start, end);
        }
    }

    fn record_panic(&self, payload: Box<dyn Any + Send>) {
        if let Ok(mut slot) = self.panic.lock() {
            slot.get_or_insert(payload);
        }
    }

    /// Report that this worker will not touch the job again.
    fn check_in(&self) {
        if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            // The receiver lives in `dispatch`, which is still waiting.
            let _ = self.done.send(());
        }
    }
}

/// Pool of long-lived worker threads.
pub struct WorkerPool {
    /// Job fan-out; `None` once shut down.
    jobs: Option<Sender<Arc<Job>>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `num_threads` workers (at least one).
    ///
    /// If any spawn fails, the workers started so far are stopped and
    /// joined before the error is returned.
    pub fn new(num_threads: usize) -> SimResult<Self> {
        let num_threads = num_threads.max(1);
        let (tx, rx) = unbounded::<Arc<Job>>();
        let mut workers = Vec::with_capacity(num_threads);

        for index in 0..num_threads {
            let rx = rx.clone();
            let spawned = thread::Builder::new()
                .name(format!("qsv-worker-{index}"))
                .spawn(move || worker_loop(&rx));

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(source) => {
                    drop(tx);
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(SimError::PoolSpawn { index, source });
                }
            }
        }

        debug!(threads = num_threads, "worker pool started");
        Ok(Self {
            jobs: Some(tx),
            workers,
        })
    }

    /// Number of worker threads (0 after shutdown).
    pub fn num_threads(&self) -> usize {
        self.workers.len()
    }

    /// Run `range_fn` over `[0, total)` in chunks of `chunk` items.
    ///
    /// Runs inline on the calling thread when the pool has a single worker,
    /// has been shut down, or the domain fits in one chunk. A `chunk` of
    /// zero is treated as one.
    ///
    /// # Panics
    ///
    /// Re-raises a panic from `range_fn` after all participants are done.
    pub fn dispatch<F>(&mut self, total: usize, chunk: usize, range_fn: F)
    where
        F: Fn(usize, usize) + Sync,
    {
        let chunk = chunk.max(1);
        let jobs = match &self.jobs {
            Some(jobs) if self.workers.len() > 1 && total > chunk => jobs,
            _ => {
                range_fn(0, total);
                return;
            }
        };

        let participants = self.workers.len();
        let (done_tx, done_rx) = bounded(1);
        let borrowed: &(dyn Fn(usize, usize) + Sync) = &range_fn;
        // SAFETY: only the lifetime is erased. This function blocks on
        // `done_rx` until every worker has checked in, and no worker touches
        // the pointer after checking in, so it is never dereferenced after
        // `range_fn` is dropped.
        let erased = unsafe {
            std::mem::transmute::<&(dyn Fn(usize, usize) + Sync), *const RangeFn>(borrowed)
        };

        let job = Arc::new(Job {
            range_fn: erased,
            total,
            chunk,
            cursor: AtomicUsize::new(0),
            pending: AtomicUsize::new(participants),
            panic: Mutex::new(None),
            done: done_tx,
        });

        trace!(total, chunk, participants, "dispatching range job");
        for _ in 0..participants {
            if jobs.send(Arc::clone(&job)).is_err() {
                // No worker will ever receive this token; account for it here.
                job.check_in();
            }
        }

        let caller_panic = panic::catch_unwind(AssertUnwindSafe(|| job.drain())).err();
        // `range_fn` must outlive every worker's use of it, even when unwinding.
        let _ = done_rx.recv();

        if let Some(payload) = caller_panic {
            panic::resume_unwind(payload);
        }
        let worker_panic = job.panic.lock().ok().and_then(|mut slot| slot.take());
        if let Some(payload) = worker_panic {
            panic::resume_unwind(payload);
        }
    }

    /// Stop and join every worker. Later dispatches run inline.
    pub fn shutdown(&mut self) {
        if self.jobs.take().is_none() {
            return;
        }
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!("worker thread exited with a panic");
            }
        }
        debug!("worker pool stopped");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(jobs: &Receiver<Arc<Job>>) {
    // `recv` fails once the pool drops its sender.
    while let Ok(job) = jobs.recv() {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| job.drain())) {
            job.record_panic(payload);
        }
        job.check_in();
    }
}
