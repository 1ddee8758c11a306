// ── Collection subscriptions ──
//
// Point-in-time access plus change notification for one collection.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::store::CollectionSnapshot;

/// A subscription to one collection's published state.
pub struct CollectionStream {
    current: CollectionSnapshot,
    receiver: watch::Receiver<CollectionSnapshot>,
}

impl CollectionStream {
    pub(crate) fn new(receiver: watch::Receiver<CollectionSnapshot>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at subscription (or the last `changed`).
    pub fn current(&self) -> &CollectionSnapshot {
        &self.current
    }

    /// The latest published snapshot.
    pub fn latest(&self) -> CollectionSnapshot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change. `None` once the collection is gone.
    pub async fn changed(&mut self) -> Option<CollectionSnapshot> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> CollectionWatchStream {
        CollectionWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding a snapshot per published change.
pub struct CollectionWatchStream {
    inner: WatchStream<CollectionSnapshot>,
}

impl Stream for CollectionWatchStream {
    type Item = CollectionSnapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
