//! In-memory entity storage.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use uuid::Uuid;

/// A stored record with a stable identifier.
pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
}

#[derive(Debug)]
struct Slot<T> {
    seq: u64,
    value: T,
}

/// Concurrent map of entities that lists in insertion order.
#[derive(Debug)]
pub struct Repository<T> {
    items: DashMap<Uuid, Slot<T>>,
    next_seq: AtomicU64,
}

impl<T: Entity> Default for Repository<T> {
    fn default() -> Self {
        Self {
            items: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value`, replacing any entity with the same id.
    pub fn insert(&self, value: T) -> T {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.items.insert(
            value.id(),
            Slot {
                seq,
                value: value.clone(),
            },
        );
        value
    }

    pub fn get(&self, id: Uuid) -> Option<T> {
        self.items.get(&id).map(|slot| slot.value.clone())
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.items.contains_key(&id)
    }

    /// All entities, oldest first.
    pub fn list(&self) -> Vec<T> {
        self.find(|_| true)
    }

    /// Entities matching `predicate`, oldest first.
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        let mut found: Vec<(u64, T)> = self
            .items
            .iter()
            .filter(|slot| predicate(&slot.value))
            .map(|slot| (slot.seq, slot.value.clone()))
            .collect();
        found.sort_by_key(|(seq, _)| *seq);
        found.into_iter().map(|(_, value)| value).collect()
    }

    /// Apply `change` to the entity in place. The id cannot change.
    pub fn update(&self, id: Uuid, change: impl FnOnce(&mut T)) -> Option<T> {
        let mut slot = self.items.get_mut(&id)?;
        change(&mut slot.value);
        Some(slot.value.clone())
    }

    pub fn remove(&self, id: Uuid) -> Option<T> {
        self.items.remove(&id).map(|(_, slot)| slot.value)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: Uuid,
        text: &'static str,
    }

    impl Entity for Note {
        fn id(&self) -> Uuid {
            self.id
        }
    }

    fn note(text: &'static str) -> Note {
        Note {
            id: Uuid::new_v4(),
            text,
        }
    }

    #[test]
    fn test_list_in_insertion_order() {
        let repo = Repository::new();
        for text in ["a", "b", "c", "d"] {
            repo.insert(note(text));
        }
        let texts: Vec<_> = repo.list().into_iter().map(|n| n.text).collect();
        assert_eq!(texts, ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_update_and_remove() {
        let repo = Repository::new();
        let stored = repo.insert(note("draft"));

        let updated = repo.update(stored.id, |n| n.text = "final").unwrap();
        assert_eq!(updated.text, "final");
        assert_eq!(repo.get(stored.id).unwrap().text, "final");

        assert!(repo.remove(stored.id).is_some());
        assert!(repo.get(stored.id).is_none());
        assert!(repo.update(stored.id, |_| {}).is_none());
        assert!(repo.is_empty());
    }

    #[test]
    fn test_find() {
        let repo = Repository::new();
        repo.insert(note("keep"));
        repo.insert(note("drop"));
        repo.insert(note("keep"));
        assert_eq!(repo.find(|n| n.text == "keep").len(), 2);
    }
}
