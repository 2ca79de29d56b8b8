//! Cancellation signals threaded through a walk.
//!
//! A [`Context`] carries any number of cancel signals (one per
//! [`Context::with_cancel`] in its ancestry) and an optional deadline. The
//! traversal thread consults it only when handing an entry to a consumer.

use crate::error::WalkError;
use crossbeam_channel::{Receiver, Select, SendError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Cancel signal and deadline for a walk. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct Context {
    // Each receiver disconnects when its CancelHandle fires; nothing is ever
    // sent on these channels.
    signals: Vec<Receiver<()>>,
    deadline: Option<Instant>,
}

/// Cancels the [`Context`] it was created with.
///
/// Clones share the same signal. Dropping the last clone cancels too, so a
/// handle held for the duration of a walk acts as a guard.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<Mutex<Option<Sender<()>>>>,
}

impl CancelHandle {
    /// Fires the signal. Calling it again has no effect.
    pub fn cancel(&self) {
        let mut guard = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        guard.take();
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derives a child context with its own cancel signal. Cancelling the
    /// parent still cancels the child.
    pub fn with_cancel(&self) -> (Context, CancelHandle) {
        let (tx, rx) = crossbeam_channel::bounded(0);
        let mut child = self.clone();
        child.signals.push(rx);
        let handle = CancelHandle {
            tx: Arc::new(Mutex::new(Some(tx))),
        };
        (child, handle)
    }

    /// Derives a child context that expires at `deadline`, or at the
    /// parent's deadline if that comes first.
    pub fn with_deadline(&self, deadline: Instant) -> Context {
        let mut child = self.clone();
        child.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        child
    }

    /// A timeout too large to represent as an [`Instant`] leaves the
    /// deadline unchanged.
    pub fn with_timeout(&self, timeout: Duration) -> Context {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.clone(),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Non-blocking check: `Some` once any signal fired or the deadline
    /// passed.
    pub fn err(&self) -> Option<WalkError> {
        let cancelled = self
            .signals
            .iter()
            .any(|rx| matches!(rx.try_recv(), Err(TryRecvError::Disconnected)));
        if cancelled {
            return Some(WalkError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(WalkError::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.err().is_some()
    }

    /// Sends `value` on `tx`. Blocks until a receiver takes it or the
    /// context is done, whichever comes first.
    pub(crate) fn send<T>(&self, tx: &Sender<T>, value: T) -> Result<(), WalkError> {
        if let Some(err) = self.err() {
            return Err(err);
        }
        let timer = match self.deadline {
            Some(deadline) => crossbeam_channel::at(deadline),
            None => crossbeam_channel::never(),
        };

        let mut sel = Select::new();
        let send_index = sel.send(tx);
        let timer_index = sel.recv(&timer);
        // Signal operations are registered after these two, in order.
        for rx in &self.signals {
            sel.recv(rx);
        }

        let op = sel.select();
        let index = op.index();
        if index == send_index {
            op.send(tx, value).map_err(|SendError(_)| WalkError::Detached)
        } else if index == timer_index {
            let _ = op.recv(&timer);
            Err(WalkError::DeadlineExceeded)
        } else {
            let _ = op.recv(&self.signals[index - timer_index - 1]);
            Err(WalkError::Cancelled)
        }
    }
}
