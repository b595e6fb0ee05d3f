//! Progress reporting and background execution of field computations.
//!
//! A computation is a synchronous row-major loop that calls a progress
//! callback every few tens of thousands of pixels. [`spawn_calculation`]
//! moves such a job onto its own named thread and hands back a
//! [`Calculation`] that yields zero or more [`CalculationState::Progress`]
//! events followed by exactly one [`CalculationState::Finished`].

use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use crate::error::EngineError;

/// Pixels between progress reports while tracing streamlines.
pub const LIC_PROGRESS_INTERVAL: usize = 25_000;

/// Pixels between progress reports in the escape-time loops.
pub const MANDELBROT_PROGRESS_INTERVAL: usize = 50_000;

/// Progress events buffered before further ones are dropped.
const PROGRESS_CAPACITY: usize = 64;

/// Integer percentage of `done` out of `total`, rounded, capped at 100.
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (100.0 * done as f64 / total as f64).round().min(100.0) as u8
}

/// Counts processed pixels and fires the progress callback once more than
/// `interval` pixels have gone by.
#[derive(Debug, Clone)]
pub struct ProgressCounter {
    interval: usize,
    total: usize,
    count: usize,
}

impl ProgressCounter {
    pub fn new(interval: usize, total: usize) -> Self {
        Self {
            interval,
            total,
            count: 0,
        }
    }

    /// Records one pixel. `done` is the caller's position (start of the
    /// current row) used for the reported percentage.
    #[inline]
    pub fn tick(&mut self, done: usize, progress: &mut dyn FnMut(u8)) {
        self.count += 1;
        if self.count > self.interval {
            self.count = 0;
            progress(percent(done, self.total));
        }
    }
}

/// One message from a background calculation.
#[derive(Debug)]
pub enum CalculationState<T> {
    Progress { percent: u8 },
    Finished(T),
}

/// Handle to a computation running on its own thread.
///
/// Dropping the handle (or calling [`Calculation::cancel`]) abandons the
/// computation: the worker finishes its loop, its result is discarded, and
/// the thread exits. There is no cooperative cancellation.
pub struct Calculation<T> {
    name: String,
    receiver: mpsc::Receiver<CalculationState<Result<T, EngineError>>>,
    handle: Option<JoinHandle<()>>,
}

/// Runs `job` on a thread named `name`.
///
/// The job receives a progress callback; progress events are advisory and
/// silently dropped while the channel is full. The final result is always
/// delivered unless the handle has been dropped.
pub fn spawn_calculation<T, F>(name: &str, job: F) -> Result<Calculation<T>, EngineError>
where
    T: Send + 'static,
    F: FnOnce(&mut dyn FnMut(u8)) -> Result<T, EngineError> + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel::<CalculationState<Result<T, EngineError>>>(PROGRESS_CAPACITY);
    let thread_name = name.to_owned();
    let handle = thread::Builder::new()
        .name(thread_name.clone())
        .spawn(move || {
            let progress_tx = tx.clone();
            let mut report = move |percent: u8| {
                let _ = progress_tx.try_send(CalculationState::Progress { percent });
            };
            let result = job(&mut report);
            if tx.send(CalculationState::Finished(result)).is_err() {
                tracing::debug!(calculation = %thread_name, "result discarded: handle dropped");
            }
        })
        .map_err(|e| EngineError::Io(format!("failed to spawn calculation thread: {e}")))?;
    tracing::debug!(calculation = name, "calculation spawned");
    Ok(Calculation {
        name: name.to_owned(),
        receiver: rx,
        handle: Some(handle),
    })
}

impl<T> Calculation<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Blocks for the next message. `None` once the worker is gone.
    pub fn recv(&self) -> Option<CalculationState<Result<T, EngineError>>> {
        self.receiver.recv().ok()
    }

    /// Drains progress into `on_progress` and returns the result.
    ///
    /// A worker that exits without a result (it panicked) yields
    /// `EngineError::WorkerDisconnected`.
    pub fn wait(mut self, mut on_progress: impl FnMut(u8)) -> Result<T, EngineError> {
        loop {
            match self.receiver.recv() {
                Ok(CalculationState::Progress { percent }) => on_progress(percent),
                Ok(CalculationState::Finished(result)) => {
                    if let Some(handle) = self.handle.take() {
                        let _ = handle.join();
                    }
                    return result;
                }
                Err(_) => {
                    tracing::warn!(calculation = %self.name, "worker disconnected without a result");
                    return Err(EngineError::WorkerDisconnected);
                }
            }
        }
    }

    /// Abandons the computation without waiting for it.
    pub fn cancel(self) {
        tracing::debug!(calculation = %self.name, "calculation cancelled");
    }
}
