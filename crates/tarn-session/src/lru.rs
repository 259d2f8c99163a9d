//! Bounded LRU cache with O(1) operations.
//!
//! Uses a HashMap for key→slot lookup and an arena-backed doubly-linked
//! list for recency ordering. The list head is the least recently used
//! entry, the tail the most recently used. Removed slots are recycled
//! through a free list so steady-state churn never reallocates. No
//! `unsafe`: links are indices into a `Vec`, not pointers, and values sit
//! in an `Option` so removal can take them out of the arena safely.
//!
//! This structure has no concurrency control of its own; the store in
//! [`crate::store`] wraps it in a mutex.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;

use crate::error::{Error, Result};

/// Sentinel index for null links.
const NIL: usize = usize::MAX;

/// A slot in the arena-backed recency list.
struct Slot<K, V> {
    key: K,
    /// `None` only while the slot sits on the free list.
    value: Option<V>,
    /// Towards the least-recently-used end.
    prev: usize,
    /// Towards the most-recently-used end.
    next: usize,
}

/// A capacity-bounded map with least-recently-used eviction.
///
/// Both reads ([`get`](Self::get)) and writes ([`set`](Self::set)) promote
/// the touched key to most-recently-used. When an insert pushes the size
/// past the fixed capacity, the least-recently-used entry is removed
/// silently. [`contains`](Self::contains) and [`items`](Self::items) never
/// reorder.
pub struct LruCache<K, V> {
    map: HashMap<K, usize>,
    slots: Vec<Slot<K, V>>,
    free: Vec<usize>,
    /// Least recently used entry, or `NIL` when empty.
    head: usize,
    /// Most recently used entry, or `NIL` when empty.
    tail: usize,
    capacity: usize,
}

impl<K: Eq + Hash + Clone, V> LruCache<K, V> {
    /// Create an empty cache holding at most `capacity` entries.
    pub fn new(capacity: NonZeroUsize) -> Self {
        let capacity = capacity.get();
        Self {
            map: HashMap::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            capacity,
        }
    }

    /// Maximum number of entries, fixed at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Test membership without touching the recency order.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Look up a key, promoting it to most-recently-used.
    pub fn get<Q>(&mut self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + fmt::Display + ?Sized,
    {
        let idx = *self
            .map
            .get(key)
            .ok_or_else(|| Error::NotFound(key.to_string()))?;
        self.promote(idx);
        self.slots[idx]
            .value
            .as_ref()
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    /// Look up a key mutably, promoting it to most-recently-used.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + fmt::Display + ?Sized,
    {
        let idx = *self
            .map
            .get(key)
            .ok_or_else(|| Error::NotFound(key.to_string()))?;
        self.promote(idx);
        self.slots[idx]
            .value
            .as_mut()
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    /// Insert or replace a key at the most-recently-used position.
    ///
    /// An existing value is replaced wholesale, never merged. If the insert
    /// pushes the size past capacity, the least-recently-used entry is
    /// dropped with no notification.
    pub fn set(&mut self, key: K, value: V) {
        if let Some(&idx) = self.map.get(&key) {
            self.slots[idx].value = Some(value);
            self.promote(idx);
            return;
        }

        let idx = self.alloc(key.clone(), value);
        self.map.insert(key, idx);
        self.push_tail(idx);

        if self.map.len() > self.capacity {
            self.evict_lru();
        }
    }

    /// Remove a key unconditionally, returning its value.
    pub fn delete<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + fmt::Display + ?Sized,
    {
        let idx = self
            .map
            .remove(key)
            .ok_or_else(|| Error::NotFound(key.to_string()))?;
        self.unlink(idx);
        self.free.push(idx);
        self.slots[idx]
            .value
            .take()
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    /// Snapshot of all entries, ordered least- to most-recently-used.
    pub fn items(&self) -> Vec<(K, V)>
    where
        V: Clone,
    {
        let mut out = Vec::with_capacity(self.map.len());
        let mut idx = self.head;
        while idx != NIL {
            let slot = &self.slots[idx];
            if let Some(value) = &slot.value {
                out.push((slot.key.clone(), value.clone()));
            }
            idx = slot.next;
        }
        out
    }

    /// Take a slot from the free list or grow the arena.
    fn alloc(&mut self, key: K, value: V) -> usize {
        let slot = Slot {
            key,
            value: Some(value),
            prev: NIL,
            next: NIL,
        };
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = slot;
                idx
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        }
    }

    /// Detach a slot from the recency list, fixing up neighbours.
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.slots[idx].prev, self.slots[idx].next);
        if prev == NIL {
            self.head = next;
        } else {
            self.slots[prev].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.slots[next].prev = prev;
        }
        self.slots[idx].prev = NIL;
        self.slots[idx].next = NIL;
    }

    /// Append a detached slot at the most-recently-used end.
    fn push_tail(&mut self, idx: usize) {
        self.slots[idx].prev = self.tail;
        self.slots[idx].next = NIL;
        if self.tail == NIL {
            self.head = idx;
        } else {
            self.slots[self.tail].next = idx;
        }
        self.tail = idx;
    }

    /// Move an in-list slot to the most-recently-used position.
    fn promote(&mut self, idx: usize) {
        if self.tail == idx {
            return;
        }
        self.unlink(idx);
        self.push_tail(idx);
    }

    /// Drop the least-recently-used entry. Silent: no error, no output.
    fn evict_lru(&mut self) {
        let idx = self.head;
        if idx == NIL {
            return;
        }
        self.unlink(idx);
        self.map.remove(&self.slots[idx].key);
        self.slots[idx].value = None;
        self.free.push(idx);
    }
}

impl<K, V> fmt::Debug for LruCache<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        let mut idx = self.head;
        while idx != NIL {
            let slot = &self.slots[idx];
            if let Some(value) = &slot.value {
                map.entry(&slot.key, value);
            }
            idx = slot.next;
        }
        map.finish()
    }
}
