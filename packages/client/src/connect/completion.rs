//! Single-delivery completion channels
//!
//! A spawned attempt reports through exactly one sink: a oneshot channel
//! behind [`PendingConnection`] or a callback pair behind [`CancelHandle`].
//! The sink sits in a mutex-guarded slot that is emptied by whichever of
//! "deliver" or "cancel" gets there first, so the caller observes exactly one
//! of the two.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use futures::future::AbortHandle;
use tokio::sync::oneshot;

use crate::error::{Stage, TaggedError};

type Completion<T> = Result<T, TaggedError>;

pub(crate) enum Sink<T> {
    Channel(oneshot::Sender<Completion<T>>),
    Callbacks {
        on_connected: Box<dyn FnOnce(T) + Send>,
        on_failed: Box<dyn FnOnce(TaggedError) + Send>,
    },
}

pub(crate) struct CompletionSlot<T> {
    sink: Mutex<Option<Sink<T>>>,
}

impl<T> CompletionSlot<T> {
    pub(crate) fn new(sink: Sink<T>) -> Self {
        Self {
            sink: Mutex::new(Some(sink)),
        }
    }

    /// Deliver `result` unless something already emptied the slot.
    ///
    /// Channel sends happen under the lock so a concurrent cancel either
    /// wins outright or finds the value already in the channel. Callbacks
    /// run after the lock is released.
    pub(crate) fn deliver(&self, result: Completion<T>) -> bool {
        let mut guard = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.take() {
            Some(Sink::Channel(tx)) => {
                // The receiver may already be gone; the result is dropped with it.
                let _ = tx.send(result);
                true
            }
            Some(Sink::Callbacks {
                on_connected,
                on_failed,
            }) => {
                drop(guard);
                match result {
                    Ok(stream) => on_connected(stream),
                    Err(err) => on_failed(err),
                }
                true
            }
            None => false,
        }
    }

    /// Empty the slot on behalf of a cancellation. Returns false if a result
    /// was delivered first.
    pub(crate) fn claim(&self) -> bool {
        self.sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
    }
}

/// Type-erased view of a slot for [`CancelHandle`].
trait Claim: Send + Sync {
    fn claim(&self) -> bool;
}

impl<T: Send> Claim for CompletionSlot<T> {
    fn claim(&self) -> bool {
        CompletionSlot::claim(self)
    }
}

/// Stage an attempt is currently in, shared with its delivery guard.
#[derive(Debug, Default)]
pub(crate) struct StageProbe(AtomicU8);

impl StageProbe {
    pub(crate) fn set(&self, stage: Stage) {
        let raw = match stage {
            Stage::Dial => 0,
            Stage::Socks => 1,
            Stage::Ssl => 2,
        };
        self.0.store(raw, Ordering::Release);
    }

    pub(crate) fn get(&self) -> Stage {
        match self.0.load(Ordering::Acquire) {
            0 => Stage::Dial,
            1 => Stage::Socks,
            _ => Stage::Ssl,
        }
    }
}

/// Delivers `Interrupted` if the attempt task ends without reporting,
/// e.g. when the runtime shuts down or a collaborator panics.
pub(crate) struct DeliveryGuard<T> {
    pub(crate) slot: Arc<CompletionSlot<T>>,
    pub(crate) probe: Arc<StageProbe>,
}

impl<T> Drop for DeliveryGuard<T> {
    fn drop(&mut self) {
        let stage = self.probe.get();
        if self.slot.deliver(Err(TaggedError::interrupted(stage))) {
            tracing::warn!(
                target: "sockslane::connect",
                %stage,
                "connection attempt ended without a result"
            );
        }
    }
}

/// Result of cancelling a [`PendingConnection`].
#[derive(Debug)]
pub enum CancelOutcome<T> {
    /// The attempt was stopped; its transport is closed and no result will follow.
    Cancelled,
    /// The attempt had already finished.
    Resolved(Completion<T>),
}

impl<T> CancelOutcome<T> {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CancelOutcome::Cancelled)
    }
}

/// A spawned connection attempt.
///
/// Await it for the result. Dropping it before it resolves cancels the
/// attempt.
pub struct PendingConnection<T> {
    rx: oneshot::Receiver<Completion<T>>,
    slot: Arc<CompletionSlot<T>>,
    probe: Arc<StageProbe>,
    abort: AbortHandle,
}

impl<T> PendingConnection<T> {
    pub(crate) fn new(
        rx: oneshot::Receiver<Completion<T>>,
        slot: Arc<CompletionSlot<T>>,
        probe: Arc<StageProbe>,
        abort: AbortHandle,
    ) -> Self {
        Self {
            rx,
            slot,
            probe,
            abort,
        }
    }

    /// Stage the attempt is currently in.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.probe.get()
    }

    /// Stop the attempt, closing its transport if one was dialed.
    pub fn cancel(mut self) -> CancelOutcome<T> {
        if self.slot.claim() {
            self.abort.abort();
            tracing::debug!(
                target: "sockslane::connect",
                stage = %self.probe.get(),
                "connection attempt cancelled"
            );
            return CancelOutcome::Cancelled;
        }
        match self.rx.try_recv() {
            Ok(result) => CancelOutcome::Resolved(result),
            Err(_) => CancelOutcome::Resolved(Err(TaggedError::interrupted(self.probe.get()))),
        }
    }
}

impl<T> Future for PendingConnection<T> {
    type Output = Completion<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(TaggedError::interrupted(this.probe.get()))),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> Drop for PendingConnection<T> {
    fn drop(&mut self) {
        if self.slot.claim() {
            self.abort.abort();
        }
    }
}

/// Cancels a callback-based attempt. Dropping the handle does not cancel.
#[derive(Clone)]
pub struct CancelHandle {
    slot: Arc<dyn Claim>,
    abort: AbortHandle,
}

impl CancelHandle {
    pub(crate) fn new<T: Send + 'static>(slot: Arc<CompletionSlot<T>>, abort: AbortHandle) -> Self {
        Self { slot, abort }
    }

    /// Stop the attempt. Returns true if no callback has fired or will fire.
    pub fn cancel(&self) -> bool {
        if self.slot.claim() {
            self.abort.abort();
            tracing::debug!(target: "sockslane::connect", "connection attempt cancelled");
            true
        } else {
            false
        }
    }
}

impl std::fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelHandle")
            .field("aborted", &self.abort.is_aborted())
            .finish()
    }
}
