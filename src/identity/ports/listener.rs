//! Session-change subscriptions.
//!
//! Providers push `(event, session)` notifications to registered listeners.
//! Registering returns a [`Subscription`]; dropping it or calling
//! [`Subscription::unsubscribe`] removes the listener.

use crate::identity::domain::{AuthChangeEvent, Session};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Callback invoked for every session-change notification.
pub type AuthStateListener = Arc<dyn Fn(AuthChangeEvent, Option<Session>) + Send + Sync>;

/// Handle that keeps a listener registered until it is dropped.
#[must_use = "dropping a subscription unregisters its listener"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Creates a handle that runs `cancel` once when unsubscribed.
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Creates a handle with nothing to release.
    pub const fn detached() -> Self {
        Self { cancel: None }
    }

    /// Unregisters the listener now.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Thread-safe set of session-change listeners shared by provider adapters.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    state: Arc<Mutex<RegistryState>>,
}

#[derive(Default)]
struct RegistryState {
    next_id: u64,
    listeners: Vec<(u64, AuthStateListener)>,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` and returns the handle that removes it.
    pub fn subscribe(&self, listener: AuthStateListener) -> Subscription {
        let id = {
            let mut state = lock(&self.state);
            let id = state.next_id;
            state.next_id = state.next_id.wrapping_add(1);
            state.listeners.push((id, listener));
            id
        };

        let registry: Weak<Mutex<RegistryState>> = Arc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = registry.upgrade() {
                lock(&state)
                    .listeners
                    .retain(|(listener_id, _)| *listener_id != id);
            }
        })
    }

    /// Delivers a notification to every registered listener.
    ///
    /// Listeners run outside the registry lock so they may subscribe or
    /// unsubscribe re-entrantly.
    pub fn notify(&self, event: AuthChangeEvent, session: Option<&Session>) {
        let listeners: Vec<AuthStateListener> = lock(&self.state)
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(event, session.cloned());
        }
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.state).listeners.len()
    }

    /// Returns `true` when no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

fn lock(state: &Mutex<RegistryState>) -> MutexGuard<'_, RegistryState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
