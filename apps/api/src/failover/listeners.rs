//! Status subscription: synchronous publish-subscribe over `ServiceStatus` snapshots.
//!
//! Listeners run on the thread that performed the transition, after the status
//! lock is released, one transition at a time. A panicking listener is caught
//! and logged; the remaining listeners still receive the snapshot.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tracing::error;

use crate::failover::types::ServiceStatus;

type Listener = Arc<dyn Fn(&ServiceStatus) + Send + Sync>;

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

fn lock(table: &Mutex<ListenerTable>) -> MutexGuard<'_, ListenerTable> {
    table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
pub struct StatusListeners {
    table: Arc<Mutex<ListenerTable>>,
}

/// Handle returned by `subscribe`. Dropping it keeps the listener registered;
/// call `unsubscribe` to remove it.
pub struct Subscription {
    id: u64,
    table: Weak<Mutex<ListenerTable>>,
}

impl Subscription {
    /// Removes the listener. Returns false if it was already gone.
    pub fn unsubscribe(self) -> bool {
        let Some(table) = self.table.upgrade() else {
            return false;
        };
        let mut table = lock(&table);
        let before = table.entries.len();
        table.entries.retain(|(id, _)| *id != self.id);
        table.entries.len() != before
    }
}

impl StatusListeners {
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ServiceStatus) + Send + Sync + 'static,
    {
        let mut table = lock(&self.table);
        let id = table.next_id;
        table.next_id += 1;
        table.entries.push((id, Arc::new(listener)));
        Subscription {
            id,
            table: Arc::downgrade(&self.table),
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.table).entries.len()
    }

    /// Delivers `status` to every listener in registration order.
    pub fn notify(&self, status: &ServiceStatus) {
        // Snapshot the list so listeners may subscribe/unsubscribe re-entrantly.
        let listeners: Vec<Listener> = lock(&self.table)
            .entries
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        for listener in listeners {
            let outcome =
                std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| listener(status)));
            if let Err(panic) = outcome {
                error!(
                    "Status listener panicked: {}",
                    panic_message(panic.as_ref())
                );
            }
        }
    }
}

pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
