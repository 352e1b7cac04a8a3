//! Bounded in-process tier

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::CachedEmbedding;

/// Outcome of a local table read
#[derive(Debug, Clone, PartialEq)]
pub enum LocalLookup {
    /// Live entry; its hit count has been incremented
    Hit(Vec<f32>),
    /// Entry was past its TTL and has been removed
    Expired,
    Absent,
}

#[derive(Debug, Clone)]
struct Slot {
    entry: CachedEmbedding,
    inserted: u64,
}

/// Capacity-bounded map from exact key to [`CachedEmbedding`]
///
/// When full, inserting a new key evicts the entry with the lowest hit count,
/// breaking ties by insertion order (oldest first). Expiry is lazy: entries
/// are only checked when read.
#[derive(Debug)]
pub struct LocalEmbeddingTable {
    slots: HashMap<String, Slot>,
    capacity: usize,
    next_insert: u64,
}

impl LocalEmbeddingTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: HashMap::with_capacity(capacity.min(4096)),
            capacity,
            next_insert: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    /// Reads `key`, counting the hit or dropping the entry if expired
    pub fn get(&mut self, key: &str, now: DateTime<Utc>) -> LocalLookup {
        let expired = match self.slots.get(key) {
            Some(slot) => slot.entry.is_expired_at(now),
            None => return LocalLookup::Absent,
        };

        if expired {
            self.slots.remove(key);
            return LocalLookup::Expired;
        }

        match self.slots.get_mut(key) {
            Some(slot) => {
                slot.entry.record_hit();
                LocalLookup::Hit(slot.entry.vector().to_vec())
            }
            None => LocalLookup::Absent,
        }
    }

    /// Reads `key` without touching hit counts or expiry
    pub fn peek(&self, key: &str) -> Option<&CachedEmbedding> {
        self.slots.get(key).map(|slot| &slot.entry)
    }

    /// Inserts or replaces `key`, returning the key evicted to make room
    pub fn insert(&mut self, key: String, entry: CachedEmbedding) -> Option<String> {
        if self.capacity == 0 {
            return None;
        }

        let mut evicted = None;

        if !self.slots.contains_key(&key) && self.slots.len() >= self.capacity {
            evicted = self.least_used_key();

            if let Some(victim) = &evicted {
                self.slots.remove(victim);
            }
        }

        let inserted = self.next_insert;
        self.next_insert += 1;
        self.slots.insert(key, Slot { entry, inserted });

        evicted
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Iterates `(key, entry)` pairs in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CachedEmbedding)> {
        self.slots.iter().map(|(key, slot)| (key.as_str(), &slot.entry))
    }

    fn least_used_key(&self) -> Option<String> {
        self.slots
            .iter()
            .min_by_key(|(_, slot)| (slot.entry.hit_count(), slot.inserted))
            .map(|(key, _)| key.clone())
    }
}
