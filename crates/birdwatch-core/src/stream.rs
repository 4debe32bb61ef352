// ── Reactive query observers ──
//
// Subscription types for consuming query state changes from the DataStore.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::store::{QueryResult, QueryState};

/// A mounted subscription to one query key.
///
/// Provides both point-in-time access and change notification via
/// `changed()` or by converting to a `Stream`. While at least one observer
/// for a key is alive, invalidating that key triggers a background refetch.
pub struct QueryObserver<T: Send + Sync + 'static> {
    current: QueryResult<T>,
    receiver: watch::Receiver<QueryState<T>>,
}

impl<T: Send + Sync + 'static> QueryObserver<T> {
    pub(crate) fn new(receiver: watch::Receiver<QueryState<T>>) -> Self {
        let current = QueryResult::from(&*receiver.borrow());
        Self { current, receiver }
    }

    /// The result captured at creation or at the last `changed()`.
    pub fn current(&self) -> &QueryResult<T> {
        &self.current
    }

    /// The latest result (may have changed since creation).
    pub fn latest(&self) -> QueryResult<T> {
        QueryResult::from(&*self.receiver.borrow())
    }

    /// Whether a fetch for this key is in flight right now.
    pub fn is_fetching(&self) -> bool {
        self.receiver.borrow().is_fetching
    }

    /// Wait for the next change, returning the new result.
    /// Returns `None` once the entry has been dropped (session cleared).
    pub async fn changed(&mut self) -> Option<QueryResult<T>> {
        self.receiver.changed().await.ok()?;
        let result = QueryResult::from(&*self.receiver.borrow_and_update());
        self.current = result.clone();
        Some(result)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> QueryWatchStream<T> {
        QueryWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields the current result first, then one per state change.
pub struct QueryWatchStream<T: Send + Sync + 'static> {
    inner: WatchStream<QueryState<T>>,
}

impl<T: Send + Sync + 'static> Stream for QueryWatchStream<T> {
    type Item = QueryResult<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner)
            .poll_next(cx)
            .map(|state| state.map(|s| QueryResult::from(&s)))
    }
}
