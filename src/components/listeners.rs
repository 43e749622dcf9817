//! Lifecycle management for the received/responded listener pair.
//!
//! Exactly one subscription pair may be live per process. Re-subscribing
//! replaces the previous pair (the old handlers stop firing), and the handle
//! returned to the caller releases the underlying OS listeners on dispose or
//! drop, whichever comes first.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::backends::{ListenerApi, ListenerToken};
use crate::components::request::{DeliveredNotification, NotificationResponse};

/// Handler invoked when a notification is presented while the process runs.
pub type ReceivedHandler = Arc<dyn Fn(DeliveredNotification) + Send + Sync>;

/// Handler invoked when the user acts on a presented notification.
pub type ResponseHandler = Arc<dyn Fn(NotificationResponse) + Send + Sync>;

struct ActivePair {
    generation: u64,
    received: ListenerToken,
    responded: ListenerToken,
}

struct HubShared {
    api: Arc<dyn ListenerApi>,
    slot: Mutex<Option<ActivePair>>,
    generation: AtomicU64,
}

impl HubShared {
    fn remove_pair(&self, pair: ActivePair) {
        self.api.remove_listener(pair.received);
        self.api.remove_listener(pair.responded);
    }
}

/// Owns the single active subscription pair for this process.
pub struct ListenerHub {
    shared: Arc<HubShared>,
}

impl ListenerHub {
    pub fn new(api: Arc<dyn ListenerApi>) -> Self {
        Self {
            shared: Arc::new(HubShared {
                api,
                slot: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Registers the handler pair with the OS, displacing any previous pair.
    ///
    /// Last subscriber wins: the prior handlers are unregistered before the
    /// new ones attach, and the prior guard becomes inert.
    pub fn subscribe(
        &self,
        on_received: ReceivedHandler,
        on_responded: ResponseHandler,
    ) -> ListenerGuard {
        let mut slot = self.shared.slot.lock();
        if let Some(previous) = slot.take() {
            tracing::debug!(
                generation = previous.generation,
                "replacing active listener subscription"
            );
            self.shared.remove_pair(previous);
        }

        let generation = self.shared.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let received = self.shared.api.add_received_listener(on_received);
        let responded = self.shared.api.add_response_listener(on_responded);
        *slot = Some(ActivePair {
            generation,
            received,
            responded,
        });

        ListenerGuard {
            shared: Arc::clone(&self.shared),
            generation,
        }
    }

    /// Whether a subscription pair is currently live.
    pub fn has_active_subscription(&self) -> bool {
        self.shared.slot.lock().is_some()
    }
}

/// Disposable handle for a subscription pair.
///
/// `dispose` is idempotent, and dropping the guard disposes it, so the OS
/// listeners are released on every exit path. A guard that has been displaced
/// by a later `subscribe` does nothing on dispose.
pub struct ListenerGuard {
    shared: Arc<HubShared>,
    generation: u64,
}

impl ListenerGuard {
    pub fn dispose(&self) {
        let mut slot = self.shared.slot.lock();
        if slot.as_ref().is_some_and(|pair| pair.generation == self.generation)
            && let Some(pair) = slot.take()
        {
            self.shared.remove_pair(pair);
            tracing::debug!(generation = self.generation, "listener subscription disposed");
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.dispose();
    }
}
