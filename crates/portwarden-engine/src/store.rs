//! Userspace policy store with whole-snapshot replacement.
//!
//! The kernel side keeps its policy in per-scalar BPF array maps; this is
//! the userspace counterpart, used by the dry-run evaluator and by tests
//! of the engine's concurrency contract. The snapshot is swapped as a
//! whole under a single-writer discipline, so a reader can never observe
//! a torn value — at worst it sees the previous complete snapshot.

use std::sync::Arc;

use arc_swap::ArcSwap;
use portwarden_common::constants::COMM_LEN;

use crate::policy::PolicySnapshot;

/// Atomically swappable [`PolicySnapshot`] holder.
///
/// Readers call [`load`](Self::load) once per event; the control plane is
/// the sole writer and replaces the snapshot by value.
#[derive(Debug)]
pub struct PolicyStore {
    snapshot: ArcSwap<PolicySnapshot>,
}

impl PolicyStore {
    /// Creates a store with neither dimension configured.
    #[must_use]
    pub fn new() -> Self {
        Self::with_snapshot(PolicySnapshot::EMPTY)
    }

    /// Creates a store holding `snapshot`.
    #[must_use]
    pub fn with_snapshot(snapshot: PolicySnapshot) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(snapshot),
        }
    }

    /// Returns the current snapshot by value.
    #[must_use]
    pub fn load(&self) -> PolicySnapshot {
        **self.snapshot.load()
    }

    /// Replaces the whole snapshot atomically.
    pub fn replace(&self, snapshot: PolicySnapshot) {
        self.snapshot.store(Arc::new(snapshot));
    }

    /// Updates the port dimension, leaving the comm dimension as-is.
    pub fn set_allowed_port(&self, allowed_port: Option<u16>) {
        let _ = self.snapshot.rcu(|current| PolicySnapshot {
            allowed_port,
            ..**current
        });
    }

    /// Updates the comm dimension, leaving the port dimension as-is.
    pub fn set_allowed_comm(&self, allowed_comm: Option<[u8; COMM_LEN]>) {
        let _ = self.snapshot.rcu(|current| PolicySnapshot {
            allowed_comm,
            ..**current
        });
    }
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portwarden_common::types::comm_bytes;

    #[test]
    fn new_store_is_empty() {
        let store = PolicyStore::new();
        assert_eq!(store.load(), PolicySnapshot::EMPTY);
    }

    #[test]
    fn replace_swaps_the_whole_snapshot() {
        let store = PolicyStore::new();
        let snapshot = PolicySnapshot {
            allowed_port: Some(4040),
            allowed_comm: comm_bytes("curl"),
        };
        store.replace(snapshot);
        assert_eq!(store.load(), snapshot);
    }

    #[test]
    fn per_dimension_updates_preserve_the_other_dimension() {
        let store = PolicyStore::with_snapshot(PolicySnapshot {
            allowed_port: Some(4040),
            allowed_comm: comm_bytes("curl"),
        });

        store.set_allowed_port(Some(8080));
        assert_eq!(store.load().allowed_port, Some(8080));
        assert_eq!(store.load().allowed_comm, comm_bytes("curl"));

        store.set_allowed_comm(None);
        assert_eq!(store.load().allowed_port, Some(8080));
        assert_eq!(store.load().allowed_comm, None);
    }

    #[test]
    fn clearing_a_dimension_is_a_legitimate_state() {
        let store = PolicyStore::with_snapshot(PolicySnapshot {
            allowed_port: Some(4040),
            allowed_comm: comm_bytes("curl"),
        });
        store.set_allowed_port(None);
        assert_eq!(store.load().allowed_port, None);
    }
}
