/*
 * completion.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! One-shot completion handles for asynchronous callbacks.
//!
//! An async callback receives a [`Done`] handle and may fulfill it from any
//! thread. The compile step blocks on the matching [`Pending`] until the
//! first fulfillment arrives; later ones are dropped.

use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use crate::error::{RenderError, RenderResult};

/// Fulfillment side of a one-shot completion. Cloning shares the slot.
#[derive(Debug)]
pub struct Done<T> {
    slot: Arc<Mutex<Option<oneshot::Sender<T>>>>,
    label: &'static str,
}

impl<T> Clone for Done<T> {
    fn clone(&self) -> Self {
        Done {
            slot: Arc::clone(&self.slot),
            label: self.label,
        }
    }
}

impl<T> Done<T> {
    /// Deliver the result. Only the first call has any effect.
    pub fn complete(&self, value: T) {
        let sender = match self.slot.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match sender {
            // The receiver may already be gone if the job failed meanwhile.
            Some(sender) => {
                let _ = sender.send(value);
            }
            None => {
                tracing::debug!(callback = self.label, "ignoring repeated completion");
            }
        }
    }
}

/// Waiting side of a one-shot completion.
#[derive(Debug)]
pub struct Pending<T> {
    receiver: oneshot::Receiver<T>,
    label: &'static str,
}

impl<T> Pending<T> {
    /// Block until the callback completes.
    ///
    /// Must be called off the async executor: jobs run on their own thread
    /// or under `spawn_blocking`.
    ///
    /// # Errors
    ///
    /// Fails with [`RenderError::Worker`] when every [`Done`] handle was
    /// dropped without delivering a result.
    pub fn wait(self) -> RenderResult<T> {
        self.receiver.blocking_recv().map_err(|_| {
            RenderError::Worker(format!(
                "{} completion handle was dropped without a result",
                self.label
            ))
        })
    }
}

/// Create a connected handle pair. `label` names the callback in logs and
/// errors.
pub fn channel<T>(label: &'static str) -> (Done<T>, Pending<T>) {
    let (sender, receiver) = oneshot::channel();
    (
        Done {
            slot: Arc::new(Mutex::new(Some(sender))),
            label,
        },
        Pending { receiver, label },
    )
}
