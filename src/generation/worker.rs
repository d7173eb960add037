// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Background jobs.
//!
//! A [`Job`] runs one blocking closure on its own thread and hands the
//! result back through a channel. The UI polls it once per frame, so the
//! event loop never blocks on a network call.

use crate::error::GenerationError;
use std::sync::mpsc::{channel, Receiver, TryRecvError};

use super::GenerationResult;

/// A pending result produced on a worker thread.
pub struct Job<T> {
    label: String,
    receiver: Receiver<GenerationResult<T>>,
}

impl<T: Send + 'static> Job<T> {
    /// Start `work` on a new thread.
    pub fn spawn<F>(label: impl Into<String>, work: F) -> Self
    where
        F: FnOnce() -> GenerationResult<T> + Send + 'static,
    {
        let label = label.into();
        let (sender, receiver) = channel();
        log::debug!("Starting job: {label}");
        std::thread::spawn(move || {
            let _ = sender.send(work());
        });
        Self { label, receiver }
    }

    /// Text shown while the job is running.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Non-blocking poll. `None` while the job is still running; a worker
    /// that died without answering is reported as [`GenerationError::WorkerLost`].
    pub fn try_take(&self) -> Option<GenerationResult<T>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(GenerationError::WorkerLost)),
        }
    }

    /// Block until the job finishes.
    pub fn wait(self) -> GenerationResult<T> {
        self.receiver.recv().unwrap_or(Err(GenerationError::WorkerLost))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_wait_returns_result() {
        let job = Job::spawn("double", || Ok(21 * 2));
        assert_eq!(job.label(), "double");
        assert_eq!(job.wait(), Ok(42));
    }

    #[test]
    fn test_try_take_polls_until_done() {
        let (gate_tx, gate_rx) = channel::<()>();
        let job = Job::spawn("gated", move || {
            let _ = gate_rx.recv();
            Ok("done")
        });
        assert!(job.try_take().is_none());

        gate_tx.send(()).unwrap();
        let mut result = None;
        for _ in 0..200 {
            result = job.try_take();
            if result.is_some() {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(result, Some(Ok("done")));
    }

    #[test]
    fn test_panicking_worker_is_reported() {
        let job: Job<u32> = Job::spawn("boom", || panic!("worker failed"));
        assert_eq!(job.wait(), Err(GenerationError::WorkerLost));
    }
}
