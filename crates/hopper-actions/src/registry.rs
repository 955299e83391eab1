//! Process-wide sharing of one [`RuleStore`].
//!
//! The registry holds only a weak reference, so the store lives exactly as
//! long as some [`RuleStoreHandle`] does. The first
//! [`acquire`](RuleStoreRegistry::acquire) builds and loads the store and
//! subscribes it to the channel; dropping the last handle tears it down and
//! unsubscribes.

use std::sync::{Arc, Weak};

use hopper_settings::ConfigChannel;
use parking_lot::{Mutex, MutexGuard};
use tracing::debug;

use crate::store::RuleStore;

/// Hands out shared references to a single lazily-loaded [`RuleStore`].
pub struct RuleStoreRegistry {
    channel: Arc<dyn ConfigChannel>,
    live: Mutex<Weak<Mutex<RuleStore>>>,
}

impl RuleStoreRegistry {
    /// Registry for stores backed by `channel`.
    pub fn new(channel: Arc<dyn ConfigChannel>) -> Self {
        Self {
            channel,
            live: Mutex::new(Weak::new()),
        }
    }

    /// The shared store, creating and loading it if none is alive.
    pub fn acquire(&self) -> RuleStoreHandle {
        let mut live = self.live.lock();
        if let Some(shared) = live.upgrade() {
            return RuleStoreHandle { shared };
        }

        let mut store = RuleStore::new(Arc::clone(&self.channel));
        store.load();
        let shared = Arc::new(Mutex::new(store));

        let weak = Arc::downgrade(&shared);
        let watch_id = self.channel.watch(Box::new(move |key, value| {
            // removals never delete rules from the live set
            let Some(value) = value else {
                return;
            };
            if let Some(store) = weak.upgrade() {
                let _ = store.lock().apply_external_change(key, value);
            }
        }));
        shared.lock().attach_watch(watch_id);

        *live = Arc::downgrade(&shared);
        debug!(rules = shared.lock().len(), "rule store allocated");
        RuleStoreHandle { shared }
    }

    /// Give back a handle. Equivalent to dropping it.
    pub fn release(&self, handle: RuleStoreHandle) {
        drop(handle);
    }

    /// Whether a store is currently alive.
    pub fn is_live(&self) -> bool {
        self.live.lock().strong_count() > 0
    }
}

/// Shared reference to the live [`RuleStore`].
///
/// Cloning a handle takes another reference.
#[derive(Clone)]
pub struct RuleStoreHandle {
    shared: Arc<Mutex<RuleStore>>,
}

impl RuleStoreHandle {
    /// Exclusive access to the store.
    pub fn lock(&self) -> MutexGuard<'_, RuleStore> {
        self.shared.lock()
    }

    /// Number of handles currently sharing the store.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.shared)
    }

    /// Whether two handles refer to the same store.
    pub fn same_store(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl std::fmt::Debug for RuleStoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleStoreHandle")
            .field("ref_count", &self.ref_count())
            .finish_non_exhaustive()
    }
}
