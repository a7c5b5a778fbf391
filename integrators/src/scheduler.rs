//! Slice Scheduler

use crate::SlabIntegrator;
use cloud_core::error::*;
use cloud_core::math::*;
use cloud_core::table::{Table, TableLayout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Lifecycle of a scattering order job.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JobState {
    /// Workers have not been started.
    NotStarted,

    /// Workers are computing slices.
    SlicesRemaining,

    /// Every slice was computed.
    AllSlicesComputed,

    /// A slice failed or a worker panicked.
    Aborted,
}

/// Progress after a depth slice was computed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SliceProgress {
    /// Scattering order.
    pub order: usize,

    /// Depth slice index.
    pub slice: usize,

    /// Index of the worker that computed the slice.
    pub worker: usize,

    /// Number of slices computed so far.
    pub completed: usize,

    /// Total number of slices.
    pub total: usize,

    /// Time since the job started.
    pub elapsed: Duration,

    /// Estimated time until all slices are computed.
    pub eta: Duration,
}

/// Events reported while a job runs.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ProgressEvent {
    /// The job entered a new state.
    State {
        /// Scattering order.
        order: usize,

        /// The new state.
        state: JobState,

        /// Total number of slices.
        slices: usize,
    },

    /// A slice was computed.
    Slice(SliceProgress),
}

/// Receives progress events. Events are delivered on the thread that runs
/// the job.
pub trait ProgressSink {
    /// Handles a progress event.
    ///
    /// * `event` - The event.
    fn report(&self, event: &ProgressEvent);
}

impl<F: Fn(&ProgressEvent)> ProgressSink for F {
    fn report(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// A sink that ignores all events.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _event: &ProgressEvent) {}
}

/// A computed slice, or the error that stopped it, sent back by a worker.
struct SliceResult {
    /// Index of the worker.
    worker: usize,

    /// Depth slice index.
    slice: usize,

    /// The slice coefficients.
    data: Result<Vec<Float>>,
}

/// Raises the abort flag if the owning worker unwinds.
struct AbortOnPanic<'a>(&'a AtomicBool);

impl<'a> Drop for AbortOnPanic<'a> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.store(true, Ordering::SeqCst);
        }
    }
}

/// Computes the depth slices of a table on a fixed pool of worker threads.
#[derive(Copy, Clone, Debug)]
pub struct SliceScheduler {
    /// Number of worker threads.
    n_threads: usize,
}

impl Default for SliceScheduler {
    fn default() -> Self {
        Self::new(4)
    }
}

impl SliceScheduler {
    /// Create a new `SliceScheduler`.
    ///
    /// * `n_threads` - Number of worker threads; at least 1 is used.
    pub fn new(n_threads: usize) -> Self {
        Self {
            n_threads: n_threads.max(1),
        }
    }

    /// Returns the number of worker threads.
    pub fn threads(&self) -> usize {
        self.n_threads
    }

    /// Computes every slice of a table. Workers claim slice indices from a
    /// channel and send finished slices back to this thread, which stores
    /// them. The first error stops further slices from being claimed and is
    /// returned.
    ///
    /// * `layout`     - Table dimensions.
    /// * `integrator` - Computes the cells.
    /// * `sink`       - Receives progress events.
    pub fn run(&self, layout: &TableLayout, integrator: &dyn SlabIntegrator, sink: &dyn ProgressSink) -> Result<Table> {
        let order = integrator.order();
        let total = layout.depth;
        let n_threads = self.n_threads.min(total.max(1));
        let state = |state: JobState| ProgressEvent::State {
            order,
            state,
            slices: total,
        };

        sink.report(&state(JobState::NotStarted));
        info!("Computing scattering order {order}: {total} slices on {n_threads} threads");

        let start = Instant::now();
        let abort = AtomicBool::new(false);
        let mut table = Table::new(*layout);
        let mut first_error: Option<Error> = None;

        thread::scope(|scope| {
            let (tx_worker, rx_worker) = crossbeam_channel::bounded::<usize>(total);
            let (tx_result, rx_result) = crossbeam_channel::unbounded::<SliceResult>();

            // Queue all work up front.
            for slice in 0..total {
                if tx_worker.send(slice).is_err() {
                    break;
                }
            }
            drop(tx_worker);

            // Spawn worker threads.
            let abort = &abort;
            let handles: Vec<_> = (0..n_threads)
                .map(|worker| {
                    let rx_worker = rx_worker.clone();
                    let tx_result = tx_result.clone();
                    scope.spawn(move || {
                        let _guard = AbortOnPanic(abort);
                        for slice in rx_worker.iter() {
                            if abort.load(Ordering::SeqCst) {
                                break;
                            }
                            let data = integrator.compute_slice(layout, slice);
                            if data.is_err() {
                                abort.store(true, Ordering::SeqCst);
                            }
                            if tx_result.send(SliceResult { worker, slice, data }).is_err() {
                                break;
                            }
                        }
                    })
                })
                .collect();
            drop(rx_worker); // Drop extra since we've cloned one for each worker.
            drop(tx_result);

            sink.report(&state(JobState::SlicesRemaining));

            // Collect slices until every worker is done.
            let mut completed = 0;
            for result in rx_result.iter() {
                match result.data {
                    Ok(data) => {
                        table.set_slice(result.slice, &data);
                        completed += 1;

                        let elapsed = start.elapsed();
                        let eta = elapsed.mul_f64((total - completed) as f64 / completed as f64);
                        debug!(
                            "Order {order} slice {} computed by worker {} ({completed}/{total})",
                            result.slice, result.worker
                        );
                        sink.report(&ProgressEvent::Slice(SliceProgress {
                            order,
                            slice: result.slice,
                            worker: result.worker,
                            completed,
                            total,
                            elapsed,
                            eta,
                        }));
                    }
                    Err(e) => {
                        warn!(
                            "Order {order} slice {} failed on worker {}: {e}",
                            result.slice, result.worker
                        );
                        first_error.get_or_insert(e);
                    }
                }
            }

            for (worker, handle) in handles.into_iter().enumerate() {
                if handle.join().is_err() {
                    first_error.get_or_insert(Error::WorkerPanicked(worker));
                }
            }
        });

        match first_error {
            Some(e) => {
                sink.report(&state(JobState::Aborted));
                Err(e)
            }
            None => {
                info!(
                    "Scattering order {order} computed in {:.1}s",
                    start.elapsed().as_secs_f64()
                );
                sink.report(&state(JobState::AllSlicesComputed));
                Ok(table)
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
