//! Background connection attempts
//!
//! Runs `establish` on the tokio runtime and reports through a completion
//! slot, either a [`PendingConnection`] future or a callback pair.

use std::sync::Arc;

use futures::future::{AbortHandle, Abortable};
use tokio::sync::oneshot;

use super::core::Socks5Connector;
use super::proxy::EstablishedStream;
use crate::connect::completion::{
    CancelHandle, CompletionSlot, DeliveryGuard, PendingConnection, Sink, StageProbe,
};
use crate::connect::deadline::Deadline;
use crate::connect::request::ConnectionRequest;
use crate::connect::tcp::Dialer;
use crate::connect::tls::TlsUpgrader;
use crate::connect::types::Tunnel;
use crate::error::TaggedError;

impl<D, U, L> Socks5Connector<D, U, L>
where
    D: Dialer,
    U: TlsUpgrader<Tunnel<D::Transport>>,
    L: Deadline,
{
    /// Start an attempt in the background.
    ///
    /// Must be called from within a tokio runtime. The returned handle
    /// resolves exactly once; dropping it cancels the attempt.
    pub fn spawn(&self, request: ConnectionRequest) -> PendingConnection<EstablishedStream<D, U>> {
        let (tx, rx) = oneshot::channel();
        let slot = Arc::new(CompletionSlot::new(Sink::Channel(tx)));
        let probe = Arc::new(StageProbe::default());
        let abort = self.launch(request, Arc::clone(&slot), Arc::clone(&probe));
        PendingConnection::new(rx, slot, probe, abort)
    }

    /// Start an attempt in the background and report through callbacks.
    ///
    /// Exactly one of `on_connected` and `on_failed` runs, once, on a runtime
    /// worker thread, unless the attempt is cancelled first, in which case
    /// neither runs.
    pub fn establish_with<C, F>(
        &self,
        request: ConnectionRequest,
        on_connected: C,
        on_failed: F,
    ) -> CancelHandle
    where
        C: FnOnce(EstablishedStream<D, U>) + Send + 'static,
        F: FnOnce(TaggedError) + Send + 'static,
    {
        let slot = Arc::new(CompletionSlot::new(Sink::Callbacks {
            on_connected: Box::new(on_connected),
            on_failed: Box::new(on_failed),
        }));
        let abort = self.launch(request, Arc::clone(&slot), Arc::new(StageProbe::default()));
        CancelHandle::new(slot, abort)
    }

    fn launch(
        &self,
        request: ConnectionRequest,
        slot: Arc<CompletionSlot<EstablishedStream<D, U>>>,
        probe: Arc<StageProbe>,
    ) -> AbortHandle {
        let (abort, registration) = AbortHandle::new_pair();
        let connector = self.clone();

        tokio::spawn(async move {
            let guard = DeliveryGuard {
                slot: Arc::clone(&slot),
                probe: Arc::clone(&probe),
            };
            let attempt = Abortable::new(connector.establish_tracked(request, &probe), registration);
            match attempt.await {
                Ok(result) => {
                    if let Err(err) = &result {
                        tracing::info!(
                            target: "sockslane::connect",
                            stage = %err.stage(),
                            error = %err,
                            "connection attempt failed"
                        );
                    }
                    if !slot.deliver(result) {
                        tracing::debug!(
                            target: "sockslane::connect",
                            "attempt finished after cancellation, discarding result"
                        );
                    }
                }
                Err(_aborted) => {
                    tracing::debug!(
                        target: "sockslane::connect",
                        stage = %probe.get(),
                        "attempt aborted"
                    );
                }
            }
            drop(guard);
        });

        abort
    }
}
