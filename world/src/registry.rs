//! Authoritative entity collections keyed by typed identifiers.

use std::collections::{btree_map, BTreeMap};

use lane_defence_core::EntityKey;

/// Ordered collection that allocates identifiers for the entities it stores.
///
/// Identifiers increase monotonically and are never handed out twice, even
/// after [`Registry::clear`].
#[derive(Clone, Debug)]
pub(crate) struct Registry<K, V> {
    entries: BTreeMap<K, V>,
    next_id: u32,
}

impl<K: EntityKey, V> Registry<K, V> {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Allocates a fresh identifier and stores the entity built from it.
    pub(crate) fn insert_with(&mut self, build: impl FnOnce(K) -> V) -> K {
        let id = K::from_raw(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let _ = self.entries.insert(id, build(id));
        id
    }

    pub(crate) fn get(&self, id: K) -> Option<&V> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: K) -> Option<&mut V> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn contains(&self, id: K) -> bool {
        self.entries.contains_key(&id)
    }

    pub(crate) fn remove(&mut self, id: K) -> Option<V> {
        self.entries.remove(&id)
    }

    /// Identifiers in ascending order, detached from the collection so the
    /// caller may mutate entries while walking them.
    pub(crate) fn ids(&self) -> Vec<K> {
        self.entries.keys().copied().collect()
    }

    pub(crate) fn values(&self) -> btree_map::Values<'_, K, V> {
        self.entries.values()
    }

    pub(crate) fn values_mut(&mut self) -> btree_map::ValuesMut<'_, K, V> {
        self.entries.values_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drops every entry while keeping the identifier counter.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Removes every entry matching `reject`, returning them in id order.
    pub(crate) fn drain_where(&mut self, mut reject: impl FnMut(&V) -> bool) -> Vec<V> {
        let doomed: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, value)| reject(value))
            .map(|(id, _)| *id)
            .collect();
        doomed
            .into_iter()
            .filter_map(|id| self.entries.remove(&id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::TowerId;

    #[test]
    fn registry_starts_empty_with_zero_identifier() {
        let mut registry: Registry<TowerId, &str> = Registry::new();
        assert_eq!(registry.len(), 0);
        assert_eq!(registry.insert_with(|_| "first"), TowerId::new(0));
    }

    #[test]
    fn identifiers_survive_clear() {
        let mut registry: Registry<TowerId, u8> = Registry::new();
        let first = registry.insert_with(|_| 1);
        registry.clear();
        let second = registry.insert_with(|_| 2);

        assert_ne!(first, second);
        assert!(!registry.contains(first));
        assert_eq!(registry.get(second), Some(&2));
    }

    #[test]
    fn drain_where_removes_matching_entries_in_order() {
        let mut registry: Registry<TowerId, u8> = Registry::new();
        for value in [3, 8, 5, 9] {
            let _ = registry.insert_with(|_| value);
        }

        let removed = registry.drain_where(|value| *value > 4);

        assert_eq!(removed, vec![8, 5, 9]);
        assert_eq!(registry.values().copied().collect::<Vec<_>>(), vec![3]);
    }
}
