use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::permission::PermissionSnapshot;

/// Callback invoked with each newly published snapshot.
pub type SnapshotHandler = Arc<dyn Fn(&Arc<PermissionSnapshot>) + Send + Sync>;

/// Handle returned by [`PermissionProvider::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Read channel for the current [`PermissionSnapshot`].
///
/// One owner (the [`SessionGate`](crate::gate::SessionGate)) writes; any
/// number of consumers read. A snapshot is replaced as a whole `Arc`, so a
/// reader never observes a half-updated view.
///
/// Lifecycle:
/// - empty until the first authenticated session is resolved,
/// - replaced whenever the permission payload changes,
/// - reset to [`PermissionSnapshot::denied`] on a definitive sign-out.
pub struct PermissionProvider {
    current: RwLock<Option<Arc<PermissionSnapshot>>>,
    handlers: RwLock<BTreeMap<SubscriptionId, SnapshotHandler>>,
    next_id: AtomicU64,
}

impl PermissionProvider {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
            handlers: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Current snapshot, `None` before the first session resolution.
    pub fn current(&self) -> Option<Arc<PermissionSnapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Query the current snapshot; `false` when there is none.
    pub fn has_permission(&self, module: &str, action: &str) -> bool {
        self.current()
            .is_some_and(|snap| snap.has_permission(module, action))
    }

    pub fn is_admin(&self) -> bool {
        self.current().is_some_and(|snap| snap.is_admin())
    }

    /// Register a handler called synchronously after every publish.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&Arc<PermissionSnapshot>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(handler));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }

    /// Replace the snapshot and notify subscribers.
    pub(crate) fn publish(&self, snapshot: Arc<PermissionSnapshot>) {
        {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            *current = Some(Arc::clone(&snapshot));
        }
        // Clone handlers out so a handler may subscribe/unsubscribe.
        let handlers: Vec<SnapshotHandler> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for handler in handlers {
            handler(&snapshot);
        }
    }

    /// Collapse to the all-denied fallback.
    pub(crate) fn reset(&self) {
        self.publish(Arc::new(PermissionSnapshot::denied()));
    }
}

impl Default for PermissionProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience query for UI code: `false` when no provider or snapshot exists.
pub fn use_permission(provider: Option<&PermissionProvider>, module: &str, action: &str) -> bool {
    provider.is_some_and(|p| p.has_permission(module, action))
}
