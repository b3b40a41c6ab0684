// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generic in-memory registry keyed by [`RecordId`].

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::id::RecordId;

/// Concurrent map from fresh identifiers to records.
///
/// Operations on the same id serialize through the owning shard lock; ids on
/// different shards never contend. Only [`KeyedRegistry::drain`] walks the
/// whole key set.
pub struct KeyedRegistry<T> {
    entries: DashMap<RecordId, T>,
}

impl<T> Default for KeyedRegistry<T> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<T> KeyedRegistry<T> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `payload` under a freshly generated id and returns the id.
    pub fn create(&self, payload: T) -> RecordId {
        loop {
            let id = RecordId::generate();
            match self.entries.entry(id.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(payload);
                    return id;
                }
                // 128-bit collision; draw again rather than overwrite.
                Entry::Occupied(_) => continue,
            }
        }
    }

    /// Mutates the record in place. Returns false if `id` is unknown.
    pub fn update(&self, id: &str, f: impl FnOnce(&mut T)) -> bool {
        match self.entries.get_mut(id) {
            Some(mut guard) => {
                f(guard.value_mut());
                true
            }
            None => false,
        }
    }

    /// Removes and returns the record for `id`, if present.
    pub fn remove(&self, id: &str) -> Option<T> {
        self.entries.remove(id).map(|(_, record)| record)
    }

    /// Removes the record for `id`. Idempotent: unknown ids return false.
    pub fn delete(&self, id: &str) -> bool {
        self.remove(id).is_some()
    }

    /// Snapshot of the live ids at the time of the call.
    pub fn ids(&self) -> Vec<RecordId> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Removes every record, returning them with their ids.
    ///
    /// Keys are snapshotted first; records inserted concurrently after the
    /// snapshot stay in the map.
    pub fn drain(&self) -> Vec<(RecordId, T)> {
        self.ids()
            .into_iter()
            .filter_map(|id| self.entries.remove(id.as_str()))
            .collect()
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no records are live.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Clone> KeyedRegistry<T> {
    /// Returns a copy of the record for `id`, if present.
    pub fn get(&self, id: &str) -> Option<T> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn create_then_get_returns_payload() {
        let registry = KeyedRegistry::new();
        let id = registry.create("payload".to_string());
        assert_eq!(registry.get(id.as_str()).as_deref(), Some("payload"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn get_unknown_id_is_absent() {
        let registry: KeyedRegistry<u32> = KeyedRegistry::new();
        assert!(registry.get("does-not-exist").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn delete_is_idempotent() {
        let registry = KeyedRegistry::new();
        let id = registry.create(7u32);
        assert!(registry.delete(id.as_str()));
        assert!(!registry.delete(id.as_str()));
        assert!(!registry.delete("never-existed"));
        assert!(registry.is_empty());
    }

    #[test]
    fn update_mutates_in_place() {
        let registry = KeyedRegistry::new();
        let id = registry.create(1u32);
        assert!(registry.update(id.as_str(), |v| *v += 41));
        assert_eq!(registry.get(id.as_str()), Some(42));
        assert!(!registry.update("missing", |v| *v = 0));
    }

    #[test]
    fn drain_empties_registry() {
        let registry = KeyedRegistry::new();
        let ids: Vec<_> = (0..5u32).map(|n| registry.create(n)).collect();
        let mut drained = registry.drain();
        drained.sort_by_key(|(_, n)| *n);
        assert_eq!(drained.len(), 5);
        assert_eq!(drained[0].0, ids[0]);
        assert!(registry.is_empty());
        assert!(registry.drain().is_empty());
    }

    #[test]
    fn concurrent_creates_and_deletes_stay_consistent() {
        let registry = Arc::new(KeyedRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    let mut kept = Vec::new();
                    for n in 0..200u32 {
                        let id = registry.create(worker * 1000 + n);
                        if n % 2 == 0 {
                            assert!(registry.delete(id.as_str()));
                        } else {
                            kept.push(id);
                        }
                    }
                    kept
                })
            })
            .collect();

        let kept: Vec<RecordId> = handles
            .into_iter()
            .flat_map(|h| h.join().expect("worker panicked"))
            .collect();
        assert_eq!(registry.len(), kept.len());
        assert_eq!(kept.len(), 8 * 100);
        for id in &kept {
            assert!(registry.get(id.as_str()).is_some());
        }
    }
}
