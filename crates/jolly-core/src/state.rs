//! Runtime state shared between live event handling and the backfill.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio_util::sync::CancellationToken;

/// Resolved channel plus the backfill cancellation token, behind one lock.
///
/// The engine is ready once the channel has been published; there is no
/// way back to not-ready.
#[derive(Debug, Default)]
pub struct RuntimeState {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    channel_id: Option<u64>,
    cancel: Option<CancellationToken>,
}

impl RuntimeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the resolved channel. Only the first call takes effect;
    /// returns false if a channel was already published.
    pub fn publish(&self, channel_id: u64) -> bool {
        let mut inner = self.write();
        if inner.channel_id.is_some() {
            return false;
        }
        inner.channel_id = Some(channel_id);
        true
    }

    /// The monitored channel, or `None` while not ready.
    pub fn channel_id(&self) -> Option<u64> {
        self.read().channel_id
    }

    pub fn is_ready(&self) -> bool {
        self.channel_id().is_some()
    }

    /// Create the backfill cancellation token. Returns `None` if a
    /// backfill was already started.
    pub fn begin_backfill(&self) -> Option<CancellationToken> {
        let mut inner = self.write();
        if inner.cancel.is_some() {
            return None;
        }
        let token = CancellationToken::new();
        inner.cancel = Some(token.clone());
        Some(token)
    }

    /// Signal the running backfill to stop. A no-op when none was started,
    /// and safe to call repeatedly.
    pub fn cancel(&self) {
        if let Some(token) = self.read().cancel.as_ref() {
            token.cancel();
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_by_default() {
        let state = RuntimeState::new();
        assert!(!state.is_ready());
        assert_eq!(state.channel_id(), None);
    }

    #[test]
    fn test_publish_once() {
        let state = RuntimeState::new();
        assert!(state.publish(10));
        assert!(!state.publish(20));
        assert_eq!(state.channel_id(), Some(10));
        assert!(state.is_ready());
    }

    #[test]
    fn test_begin_backfill_once() {
        let state = RuntimeState::new();
        let token = state.begin_backfill().unwrap();
        assert!(state.begin_backfill().is_none());
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_without_backfill_is_noop() {
        let state = RuntimeState::new();
        state.cancel();
        state.cancel();
        assert!(state.begin_backfill().is_some());
    }

    #[test]
    fn test_cancel_twice() {
        let state = RuntimeState::new();
        let token = state.begin_backfill().unwrap();
        state.cancel();
        state.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_concurrent_readers_see_published_channel() {
        let state = std::sync::Arc::new(RuntimeState::new());
        let writer = {
            let state = state.clone();
            std::thread::spawn(move || state.publish(5))
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let state = state.clone();
                std::thread::spawn(move || {
                    // Either not yet published or exactly the published value.
                    matches!(state.channel_id(), None | Some(5))
                })
            })
            .collect();

        assert!(writer.join().unwrap());
        for r in readers {
            assert!(r.join().unwrap());
        }
        assert_eq!(state.channel_id(), Some(5));
    }
}
