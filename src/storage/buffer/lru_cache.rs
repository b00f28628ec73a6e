//! Bounded LRU cache.
//!
//! Entries live in a slab of nodes addressed by `usize` handles and are
//! threaded on a doubly-linked list between two sentinel nodes. The node
//! after `HEAD` is the most recently used entry, the node before `TAIL` is
//! the eviction candidate. A hash index maps each key to its handle, so
//! get/put/remove are O(1) on average.
//!
//! The cache never evicts on its own: `put` of a new key into a full cache
//! fails with `CacheError::Full`, and the owner evicts explicitly with
//! `peek_eviction_candidate` + `remove` after it has flushed the victim.
//!
//! Every operation except `peek`/`len` relinks the list, including `get`, so
//! shared use must go through a single lock around the whole cache.

use std::collections::HashMap;
use std::hash::Hash;

use crate::storage::buffer::error::CacheError;

const HEAD: usize = 0;
const TAIL: usize = 1;

#[derive(Debug)]
struct Node<K, V> {
    /// `None` for the sentinels and for recycled slots
    entry: Option<(K, V)>,
    prev: usize,
    next: usize,
}

#[derive(Debug)]
pub struct LruCache<K, V> {
    capacity: usize,
    index: HashMap<K, usize>,
    nodes: Vec<Node<K, V>>,
    free: Vec<usize>,
}

impl<K: Eq + Hash + Clone, V> LruCache<K, V> {
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        if capacity == 0 {
            return Err(CacheError::ZeroCapacity);
        }

        let mut nodes = Vec::with_capacity(capacity + 2);
        nodes.push(Node { entry: None, prev: HEAD, next: TAIL });
        nodes.push(Node { entry: None, prev: HEAD, next: TAIL });

        Ok(Self {
            capacity,
            index: HashMap::with_capacity(capacity),
            nodes,
            free: Vec::new(),
        })
    }

    /// Look up `key` and mark it most recently used
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.touch(idx);
        self.nodes[idx].entry.as_ref().map(|(_, v)| v)
    }

    /// Look up `key` without changing recency order
    pub fn peek(&self, key: &K) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.nodes[idx].entry.as_ref().map(|(_, v)| v)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Insert or overwrite `key`, making it most recently used.
    ///
    /// Returns the previous value when the key was already present.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>, CacheError> {
        if let Some(&idx) = self.index.get(&key) {
            let old = self.nodes[idx].entry.replace((key, value)).map(|(_, v)| v);
            self.touch(idx);
            return Ok(old);
        }

        if self.is_full() {
            return Err(CacheError::Full { capacity: self.capacity });
        }

        let node = Node {
            entry: Some((key.clone(), value)),
            prev: HEAD,
            next: HEAD,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        self.link_front(idx);
        self.index.insert(key, idx);
        Ok(None)
    }

    /// Remove `key`, returning its value. No-op when absent.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.index.remove(key)?;
        self.unlink(idx);
        let entry = self.nodes[idx].entry.take();
        self.free.push(idx);
        entry.map(|(_, v)| v)
    }

    /// The least recently used key, if any
    pub fn peek_eviction_candidate(&self) -> Option<&K> {
        let idx = self.nodes[TAIL].prev;
        if idx == HEAD {
            return None;
        }
        self.nodes[idx].entry.as_ref().map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True when a new key cannot be added without removing one first
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    /// All cached values, in no particular order
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.index
            .values()
            .filter_map(|&idx| self.nodes[idx].entry.as_ref().map(|(_, v)| v))
    }

    /// Keys from most to least recently used
    pub fn keys_by_recency(&self) -> impl Iterator<Item = &K> {
        std::iter::successors(Some(self.nodes[HEAD].next), |&idx| Some(self.nodes[idx].next))
            .take_while(|&idx| idx != TAIL)
            .filter_map(|idx| self.nodes[idx].entry.as_ref().map(|(k, _)| k))
    }

    fn touch(&mut self, idx: usize) {
        if self.nodes[HEAD].next != idx {
            self.unlink(idx);
            self.link_front(idx);
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }

    fn link_front(&mut self, idx: usize) {
        let first = self.nodes[HEAD].next;
        self.nodes[idx].prev = HEAD;
        self.nodes[idx].next = first;
        self.nodes[first].prev = idx;
        self.nodes[HEAD].next = idx;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl<K: Eq + Hash + Clone + std::fmt::Debug, V> LruCache<K, V> {
        /// Walk the list both ways and compare against the index
        fn assert_consistent(&self) {
            let forward: Vec<usize> =
                std::iter::successors(Some(self.nodes[HEAD].next), |&idx| Some(self.nodes[idx].next))
                    .take_while(|&idx| idx != TAIL)
                    .collect();
            let mut backward: Vec<usize> =
                std::iter::successors(Some(self.nodes[TAIL].prev), |&idx| Some(self.nodes[idx].prev))
                    .take_while(|&idx| idx != HEAD)
                    .collect();
            backward.reverse();

            assert_eq!(forward, backward);
            assert_eq!(forward.len(), self.index.len());
            assert!(self.len() <= self.capacity);
            for idx in forward {
                let (key, _) = self.nodes[idx].entry.as_ref().expect("linked node without entry");
                assert_eq!(self.index.get(key), Some(&idx));
            }
        }
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(LruCache::<u32, u32>::new(0), Err(CacheError::ZeroCapacity)));
    }

    #[test]
    fn test_get_promotes() {
        let mut cache = LruCache::new(3).unwrap();
        cache.put("a", 1).unwrap();
        cache.put("b", 2).unwrap();
        cache.put("c", 3).unwrap();
        assert_eq!(cache.peek_eviction_candidate(), Some(&"a"));

        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(cache.peek_eviction_candidate(), Some(&"b"));
        assert_eq!(cache.keys_by_recency().copied().collect::<Vec<_>>(), vec!["a", "c", "b"]);
        cache.assert_consistent();
    }

    #[test]
    fn test_peek_does_not_promote() {
        let mut cache = LruCache::new(2).unwrap();
        cache.put(1, "one").unwrap();
        cache.put(2, "two").unwrap();
        assert_eq!(cache.peek(&1), Some(&"one"));
        assert_eq!(cache.peek_eviction_candidate(), Some(&1));
    }

    #[test]
    fn test_put_existing_overwrites_in_place() {
        let mut cache = LruCache::new(2).unwrap();
        cache.put(1, 10).unwrap();
        cache.put(2, 20).unwrap();
        // full, but overwriting an existing key is allowed
        assert_eq!(cache.put(1, 11).unwrap(), Some(10));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.peek_eviction_candidate(), Some(&2));
        assert_eq!(cache.peek(&1), Some(&11));
        cache.assert_consistent();
    }

    #[test]
    fn test_full_cache_rejects_new_key() {
        let mut cache = LruCache::new(2).unwrap();
        cache.put('a', 1).unwrap();
        cache.put('b', 2).unwrap();
        assert!(cache.is_full());
        assert!(matches!(cache.put('c', 3), Err(CacheError::Full { capacity: 2 })));
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&'c'));

        let victim = *cache.peek_eviction_candidate().unwrap();
        assert_eq!(victim, 'a');
        assert_eq!(cache.remove(&victim), Some(1));
        cache.put('c', 3).unwrap();
        assert_eq!(cache.keys_by_recency().copied().collect::<Vec<_>>(), vec!['c', 'b']);
        cache.assert_consistent();
    }

    #[test]
    fn test_remove_recycles_slots() {
        let mut cache = LruCache::new(4).unwrap();
        for round in 0..10 {
            for k in 0..4 {
                cache.put(k, round).unwrap();
            }
            for k in 0..4 {
                assert_eq!(cache.remove(&k), Some(round));
            }
            assert!(cache.is_empty());
            assert_eq!(cache.peek_eviction_candidate(), None);
        }
        // 2 sentinels + at most 4 live nodes
        assert_eq!(cache.nodes.len(), 6);
        assert_eq!(cache.remove(&0), None);
        cache.assert_consistent();
    }

    #[test]
    fn test_values_unordered() {
        let mut cache = LruCache::new(3).unwrap();
        cache.put(1, 'x').unwrap();
        cache.put(2, 'y').unwrap();
        let mut values: Vec<char> = cache.values().copied().collect();
        values.sort();
        assert_eq!(values, vec!['x', 'y']);
    }
}
