//! Core LRU structures: hash index plus recency-ordered list
//!
//! The list lives in a slab of slots addressed by stable indices,
//! giving O(1) unlink of an arbitrary node without raw pointers.

use std::collections::HashMap;
use std::hash::Hash;

use ahash::RandomState;

use crate::error::{Error, Result};

/// Node in the recency list
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Fixed-capacity LRU store holding the index and the recency list as one
/// unit. Head of the list is the most recently used entry, tail is the
/// eviction victim. Not synchronized; `HotCache` wraps it in a lock.
pub(crate) struct LruCache<K, V> {
    /// Key -> slot of the node holding it
    index: HashMap<K, usize, RandomState>,

    /// Slab of list nodes; `None` marks a recycled slot
    slots: Vec<Option<Node<K, V>>>,

    /// Most recently used
    head: Option<usize>,

    /// Least recently used, evicted first
    tail: Option<usize>,

    /// Slots freed by eviction, reused before the slab grows
    free: Vec<usize>,

    capacity: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a store holding at most `capacity` entries.
    ///
    /// Index and slab space are reserved up front, so neither structure
    /// reallocates after construction. A capacity too large to reserve
    /// surfaces as `Error::OutOfMemory` rather than an allocation abort.
    pub(crate) fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }

        let mut index = HashMap::with_hasher(RandomState::new());
        index.try_reserve(capacity)?;

        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity)?;

        Ok(Self {
            index,
            slots,
            head: None,
            tail: None,
            free: Vec::new(),
            capacity,
        })
    }

    /// Insert a new entry at the head of the recency list.
    ///
    /// Fails with `Error::KeyExists` if the key is already present,
    /// before either structure is touched. When the store is full the
    /// tail entry is evicted first and handed back to the caller.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Result<Option<(K, V)>> {
        if self.index.contains_key(&key) {
            return Err(Error::KeyExists);
        }

        let evicted = if self.index.len() == self.capacity {
            self.evict_lru()
        } else {
            None
        };

        let slot = self.alloc_slot(Node {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        });
        self.push_front(slot);
        self.index.insert(key, slot);

        Ok(evicted)
    }

    /// Look up a key, promoting its entry to most recently used.
    pub(crate) fn get(&mut self, key: &K) -> Option<&V> {
        let slot = *self.index.get(key)?;
        self.promote(slot);
        self.slots[slot].as_ref().map(|node| &node.value)
    }

    /// Number of live entries
    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    /// Re-link an existing node at the head of the list
    fn promote(&mut self, slot: usize) {
        if self.head == Some(slot) {
            return;
        }

        self.unlink(slot);
        self.push_front(slot);
    }

    /// Link an unlinked node in front of the current head
    fn push_front(&mut self, slot: usize) {
        let old_head = self.head;

        if let Some(node) = &mut self.slots[slot] {
            node.prev = None;
            node.next = old_head;
        }

        if let Some(head_slot) = old_head {
            if let Some(head) = &mut self.slots[head_slot] {
                head.prev = Some(slot);
            }
        }

        self.head = Some(slot);
        if self.tail.is_none() {
            self.tail = Some(slot);
        }
    }

    /// Detach a node from the list, patching neighbors and head/tail
    fn unlink(&mut self, slot: usize) {
        let (prev, next) = match &self.slots[slot] {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(prev_slot) => {
                if let Some(prev_node) = &mut self.slots[prev_slot] {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(next_slot) => {
                if let Some(next_node) = &mut self.slots[next_slot] {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    /// Remove the tail entry from both structures, returning it
    fn evict_lru(&mut self) -> Option<(K, V)> {
        let tail_slot = self.tail?;

        self.unlink(tail_slot);
        let node = self.slots[tail_slot].take()?;
        self.index.remove(&node.key);
        self.free.push(tail_slot);

        Some((node.key, node.value))
    }

    /// Place a node in a recycled or fresh slot
    fn alloc_slot(&mut self, node: Node<K, V>) -> usize {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }
}
