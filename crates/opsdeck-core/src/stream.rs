// ── Reactive entity streams ──
//
// Subscription types for consuming collection changes from a repository.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// A subscription to a collection of entities.
///
/// Provides both point-in-time snapshot access and change notification via
/// [`changed()`](Self::changed) or by converting into a `Stream`.
pub struct EntityStream<T: Clone + Send + Sync + 'static> {
    current: Arc<Vec<Arc<T>>>,
    receiver: watch::Receiver<Arc<Vec<Arc<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> EntityStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<Arc<Vec<Arc<T>>>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation time (or at the last `changed()`).
    pub fn current(&self) -> &Arc<Vec<Arc<T>>> {
        &self.current
    }

    /// The latest snapshot, which may be newer than `current()`.
    pub fn latest(&self) -> Arc<Vec<Arc<T>>> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` once the owning repository has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<Vec<Arc<T>>>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> EntityWatchStream<T> {
        EntityWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct EntityWatchStream<T: Clone + Send + Sync + 'static> {
    inner: WatchStream<Arc<Vec<Arc<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> Stream for EntityWatchStream<T> {
    type Item = Arc<Vec<Arc<T>>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio_stream::StreamExt;

    use crate::model::{CallFlowMenu, EntityId};
    use crate::store::{InMemoryRepository, Repository};

    #[tokio::test]
    async fn watch_stream_yields_latest_snapshot() {
        let repo = InMemoryRepository::<CallFlowMenu>::new();
        let mut stream = repo.subscribe().into_stream();
        assert!(stream.next().await.unwrap().is_empty());

        repo.create(CallFlowMenu {
            id: EntityId::from("a"),
            ..CallFlowMenu::placeholder()
        })
        .unwrap();
        assert_eq!(stream.next().await.unwrap().len(), 1);
    }

    #[test]
    fn changed_waits_for_a_write() {
        let repo = InMemoryRepository::<CallFlowMenu>::new();
        let mut stream = repo.subscribe();
        let mut changed = tokio_test::task::spawn(stream.changed());
        tokio_test::assert_pending!(changed.poll());

        repo.create(CallFlowMenu::placeholder()).unwrap();
        assert!(changed.is_woken());
        let snapshot = tokio_test::assert_ready!(changed.poll()).unwrap();
        assert_eq!(snapshot.len(), 1);
    }

    #[tokio::test]
    async fn changed_ends_when_repository_dropped() {
        let repo = InMemoryRepository::<CallFlowMenu>::new();
        let mut stream = repo.subscribe();
        drop(repo);
        assert!(stream.changed().await.is_none());
    }
}
