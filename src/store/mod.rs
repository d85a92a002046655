//! Application State Store
//!
//! A small reducer store: state changes only through dispatched actions and
//! every change is pushed to subscribers as a fresh snapshot. The subscriber
//! registry sits behind a std mutex so a dropped [`Subscription`] can remove
//! itself synchronously.

pub mod app;
pub mod toast;

pub use app::{AppAction, AppStore, Theme, UiState};
pub use toast::{Toast, ToastAction, ToastState, ToastUpdate, ToastVariant, TOAST_LIMIT, TOAST_REMOVE_DELAY};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// Identifier handed out by [`Store::subscribe`]
pub type SubscriberId = String;

type Registry<S> = Mutex<HashMap<SubscriberId, mpsc::UnboundedSender<S>>>;

fn lock<S>(registry: &Registry<S>) -> MutexGuard<'_, HashMap<SubscriberId, mpsc::UnboundedSender<S>>> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// State that evolves through a reducer
pub trait Reducible: Clone + Send + Sync {
    type Action: Send;

    /// Apply an action in place
    fn reduce(&mut self, action: Self::Action);
}

/// Live subscription to store snapshots
///
/// Dropping it unsubscribes.
pub struct Subscription<S> {
    pub id: SubscriberId,
    receiver: mpsc::UnboundedReceiver<S>,
    registry: Weak<Registry<S>>,
}

impl<S> Subscription<S> {
    /// Next snapshot, or `None` once unsubscribed
    pub async fn next(&mut self) -> Option<S> {
        self.receiver.recv().await
    }

    /// Snapshot already delivered, without waiting
    pub fn try_next(&mut self) -> Option<S> {
        self.receiver.try_recv().ok()
    }
}

impl<S> Drop for Subscription<S> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).remove(&self.id);
        }
    }
}

/// Reducer store with snapshot subscribers
pub struct Store<S: Reducible> {
    state: RwLock<S>,
    subscribers: Arc<Registry<S>>,
}

impl<S: Reducible + Default> Default for Store<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: Reducible> Store<S> {
    pub fn new(initial: S) -> Self {
        Self {
            state: RwLock::new(initial),
            subscribers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Current state
    pub async fn snapshot(&self) -> S {
        self.state.read().await.clone()
    }

    /// Apply an action and notify subscribers; returns the new state
    ///
    /// Snapshots are sent while the write guard is held, so every subscriber
    /// sees them in dispatch order.
    pub async fn dispatch(&self, action: S::Action) -> S {
        let mut state = self.state.write().await;
        state.reduce(action);
        let snapshot = state.clone();

        lock(&self.subscribers).retain(|id, sender| {
            let alive = sender.send(snapshot.clone()).is_ok();
            if !alive {
                tracing::debug!(subscriber = %id, "Dropping closed store subscriber");
            }
            alive
        });
        drop(state);

        snapshot
    }

    /// Register for snapshots after every dispatch
    pub fn subscribe(&self) -> Subscription<S> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = Uuid::new_v4().to_string();
        lock(&self.subscribers).insert(id.clone(), sender);

        Subscription {
            id,
            receiver,
            registry: Arc::downgrade(&self.subscribers),
        }
    }

    /// Stop delivering snapshots to `id`; returns whether it was registered
    pub fn unsubscribe(&self, id: &str) -> bool {
        lock(&self.subscribers).remove(id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.subscribers).len()
    }
}
