//! Background execution of a run with progress reporting.
//!
//! A run executes synchronously from start to finish on one worker thread.
//! Interactive callers keep their own thread free by spawning the run as a
//! [`Task`] and polling [`Task::latest_progress`] while it works; progress
//! crosses threads over a channel, so the worker never blocks on a slow
//! consumer and the consumer never touches shared mutable state.

use std::sync::mpsc;
use std::thread::{self, JoinHandle};

/// Sends progress percentages out of a running job.
///
/// Handed to the job closure by [`Task::spawn`]. If the receiving task
/// handle has been dropped, sends are silently discarded and the job keeps
/// running to completion.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: mpsc::Sender<f32>,
}

impl ProgressSender {
    /// Report a progress percentage in `[0, 100]`.
    pub fn send(&self, percent: f32) {
        let _ = self.tx.send(percent);
    }
}

/// Handle to a run executing on a background worker thread.
///
/// The handle is the only link to the worker: poll [`Task::is_finished`]
/// and [`Task::latest_progress`] without blocking, then take the outcome
/// with [`Task::join`].
#[derive(Debug)]
pub struct Task<T> {
    handle: JoinHandle<T>,
    progress: mpsc::Receiver<f32>,
}

impl<T: Send + 'static> Task<T> {
    /// Run `job` on a background thread, handing it a progress sender.
    pub fn spawn<F>(job: F) -> Self
    where
        F: FnOnce(ProgressSender) -> T + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || job(ProgressSender { tx }));
        Self {
            handle,
            progress: rx,
        }
    }

    /// Newest progress percentage reported since the last poll, if any.
    ///
    /// Drains the channel, so intermediate values a slow poller missed are
    /// discarded in favor of the most recent one.
    #[must_use]
    pub fn latest_progress(&self) -> Option<f32> {
        self.progress.try_iter().last()
    }

    /// Whether the worker thread has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the job completes and return its outcome.
    ///
    /// # Panics
    ///
    /// Re-raises a panic that escaped the job itself.
    pub fn join(self) -> T {
        match self.handle.join() {
            Ok(value) => value,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}
