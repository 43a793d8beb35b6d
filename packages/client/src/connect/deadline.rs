//! Deadline hook for connection attempts
//!
//! A [`Deadline`] yields a future that completes when the attempt should give
//! up. The orchestrator creates it once per attempt and races every stage
//! against it, so expiry is reported with the stage that was in progress.

use std::future::Future;
use std::time::Duration;

pub trait Deadline: Send + Sync + 'static {
    fn expired(&self) -> impl Future<Output = ()> + Send;
}

/// Never expires.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDeadline;

impl Deadline for NoDeadline {
    fn expired(&self) -> impl Future<Output = ()> + Send {
        std::future::pending()
    }
}

/// Expires the given duration after the attempt starts.
impl Deadline for Duration {
    fn expired(&self) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(*self)
    }
}

impl<D: Deadline> Deadline for Option<D> {
    fn expired(&self) -> impl Future<Output = ()> + Send {
        let inner = self.as_ref().map(Deadline::expired);
        async move {
            match inner {
                Some(expired) => expired.await,
                None => std::future::pending().await,
            }
        }
    }
}
