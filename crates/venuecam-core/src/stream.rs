// ── Reactive dashboard stream ──
//
// Subscription type for consuming published dashboard snapshots.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::refresh::DashboardSnapshot;

/// A subscription to published dashboard snapshots.
///
/// Provides point-in-time access plus change notification via
/// [`changed()`](Self::changed) or by converting into a `Stream`.
pub struct DashboardStream {
    current: Arc<DashboardSnapshot>,
    receiver: watch::Receiver<Arc<DashboardSnapshot>>,
}

impl DashboardStream {
    pub(crate) fn new(mut receiver: watch::Receiver<Arc<DashboardSnapshot>>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// The snapshot seen most recently through this subscription.
    pub fn current(&self) -> &Arc<DashboardSnapshot> {
        &self.current
    }

    /// Wait for the next publish. `None` once the scheduler is gone.
    pub async fn changed(&mut self) -> Option<Arc<DashboardSnapshot>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` that yields the current snapshot first.
    pub fn into_stream(self) -> DashboardWatchStream {
        DashboardWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct DashboardWatchStream {
    inner: WatchStream<Arc<DashboardSnapshot>>,
}

impl Stream for DashboardWatchStream {
    type Item = Arc<DashboardSnapshot>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
