use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use pp_core::passport::PassportState;

/// Shared passport context containing state and dispatch lock.
///
/// ## Lock Ordering
/// When acquiring both locks, acquire `dispatch_lock` first, then `state`.
/// - `dispatch_lock`: held only while a transition is computed and stored.
///   Side effects run after it is released.
/// - `state`: used for both reading (`get_state`) and writing.
pub struct PassportContext {
    state: Mutex<PassportState>,
    dispatch_lock: Mutex<()>,
    /// Every stored state is also published here for observers.
    published: watch::Sender<PassportState>,
}

impl PassportContext {
    pub fn new(initial_state: PassportState) -> Self {
        let (published, _) = watch::channel(initial_state.clone());
        Self {
            state: Mutex::new(initial_state),
            dispatch_lock: Mutex::new(()),
            published,
        }
    }

    /// Returns the context wrapped in Arc for shared ownership.
    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Lightweight read; does NOT acquire `dispatch_lock`.
    pub async fn get_state(&self) -> PassportState {
        self.state.lock().await.clone()
    }

    /// Returns a guard that releases the lock when dropped.
    pub async fn acquire_dispatch_lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.dispatch_lock.lock().await
    }

    /// Store and publish. Only call while holding `dispatch_lock`.
    pub async fn set_state(&self, state: PassportState) {
        let mut guard = self.state.lock().await;
        *guard = state.clone();
        self.published.send_replace(state);
    }

    pub fn subscribe(&self) -> watch::Receiver<PassportState> {
        self.published.subscribe()
    }
}

impl Default for PassportContext {
    fn default() -> Self {
        Self::new(PassportState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pp_core::passport::PassportStage;

    #[tokio::test]
    async fn set_state_is_visible_to_subscribers() {
        let context = PassportContext::default();
        let mut rx = context.subscribe();

        let next = PassportState {
            stage: PassportStage::Uploading,
            ..PassportState::default()
        };
        {
            let _guard = context.acquire_dispatch_lock().await;
            context.set_state(next.clone()).await;
        }

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), next);
        assert_eq!(context.get_state().await, next);
    }
}
